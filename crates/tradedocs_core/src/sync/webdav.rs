//! WebDAV client for cloud backup.
//!
//! # Responsibility
//! - Speak the minimal WebDAV subset the backup flow needs: MKCOL, PUT,
//!   PROPFIND Depth:1 and GET, over HTTP Basic Auth.
//!
//! # Invariants
//! - Only `.dsp`/`.json` leaves below the configured directory count as
//!   backups; collection hrefs are filtered out of listings.
//! - MKCOL against an existing collection (405) is treated as success.

use crate::sync::{RemoteBackupStore, SyncError, SyncResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

const CONNECT_TIMEOUT_MS: u64 = 10_000;
const REQUEST_TIMEOUT_MS: u64 = 60_000;

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:"><D:prop><D:getlastmodified/></D:prop></D:propfind>"#;

/// Matches `<href>`/`<D:href>`/`<d:href>` elements regardless of prefix.
static HREF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:[a-z0-9]+:)?href>([^<]+)</(?:[a-z0-9]+:)?href>")
        .expect("href pattern must compile")
});

/// Connection settings for one WebDAV endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDavConfig {
    /// Server root, e.g. `https://dav.example.com/dav`.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Directory below `base_url` holding backups, e.g. `tradedocs`.
    pub remote_dir: String,
}

impl WebDavConfig {
    fn validate(&self) -> SyncResult<()> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(SyncError::InvalidConfig("base_url must not be empty".into()));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(SyncError::InvalidConfig(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.remote_dir.trim().trim_matches('/').is_empty() {
            return Err(SyncError::InvalidConfig(
                "remote_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Synchronous WebDAV transport for backup files.
pub struct WebDavClient {
    config: WebDavConfig,
    agent: ureq::Agent,
}

impl WebDavClient {
    pub fn new(config: WebDavConfig) -> SyncResult<Self> {
        config.validate()?;
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(CONNECT_TIMEOUT_MS))
            .timeout_read(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .timeout_write(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build();
        Ok(Self { config, agent })
    }

    fn dir_url(&self) -> String {
        join_url(&self.config.base_url, &[&self.config.remote_dir])
    }

    fn file_url(&self, file_name: &str) -> String {
        join_url(&self.config.base_url, &[&self.config.remote_dir, file_name])
    }

    fn auth_header(&self) -> String {
        basic_auth_header(&self.config.username, &self.config.password)
    }
}

impl RemoteBackupStore for WebDavClient {
    fn ensure_remote_dir(&self) -> SyncResult<()> {
        let url = self.dir_url();
        let result = self
            .agent
            .request("MKCOL", &url)
            .set("authorization", &self.auth_header())
            .call();
        match result {
            Ok(_) => Ok(()),
            // 405 Method Not Allowed: the collection already exists.
            Err(ureq::Error::Status(405, _)) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(SyncError::Http {
                status,
                context: "mkcol".to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(SyncError::Transport(transport.to_string()))
            }
        }
    }

    fn upload(&self, file_name: &str, body: &str) -> SyncResult<()> {
        let url = self.file_url(file_name);
        info!("event=webdav_upload module=sync status=start file={file_name}");
        let result = self
            .agent
            .put(&url)
            .set("authorization", &self.auth_header())
            .set("content-type", "application/json")
            .send_string(body);
        match result {
            Ok(_) => {
                info!("event=webdav_upload module=sync status=ok file={file_name}");
                Ok(())
            }
            Err(ureq::Error::Status(status, _)) => {
                warn!(
                    "event=webdav_upload module=sync status=error file={file_name} http_status={status}"
                );
                Err(SyncError::Http {
                    status,
                    context: "put".to_string(),
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!(
                    "event=webdav_upload module=sync status=error file={file_name} error={transport}"
                );
                Err(SyncError::Transport(transport.to_string()))
            }
        }
    }

    fn list_backups(&self) -> SyncResult<Vec<String>> {
        let url = self.dir_url();
        let response = self
            .agent
            .request("PROPFIND", &url)
            .set("authorization", &self.auth_header())
            .set("depth", "1")
            .set("content-type", "application/xml")
            .send_string(PROPFIND_BODY)
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => SyncError::Http {
                    status,
                    context: "propfind".to_string(),
                },
                ureq::Error::Transport(transport) => {
                    SyncError::Transport(transport.to_string())
                }
            })?;

        let body = response
            .into_string()
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        Ok(backup_names_from_listing(&body))
    }

    fn download(&self, file_name: &str) -> SyncResult<String> {
        let url = self.file_url(file_name);
        let response = self
            .agent
            .get(&url)
            .set("authorization", &self.auth_header())
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(404, _) => SyncError::BackupNotFound(file_name.to_string()),
                ureq::Error::Status(status, _) => SyncError::Http {
                    status,
                    context: "get".to_string(),
                },
                ureq::Error::Transport(transport) => {
                    SyncError::Transport(transport.to_string())
                }
            })?;
        response
            .into_string()
            .map_err(|err| SyncError::Transport(err.to_string()))
    }
}

/// Builds the `Authorization: Basic …` header value.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64.encode(format!("{username}:{password}"))
    )
}

/// Joins a base URL and path segments with single slashes.
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        let trimmed = segment.trim_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(trimmed);
    }
    url
}

/// Extracts backup file names from a PROPFIND Depth:1 response body.
///
/// Keeps `.dsp`/`.json` leaves only and returns them name-sorted
/// descending, so stamp-named backups come newest first.
pub fn backup_names_from_listing(xml: &str) -> Vec<String> {
    let mut names: Vec<String> = HREF_PATTERN
        .captures_iter(xml)
        .filter_map(|capture| {
            let href = capture.get(1)?.as_str().trim();
            let leaf = href.trim_end_matches('/').rsplit('/').next()?;
            if href.ends_with('/') || leaf.is_empty() {
                return None; // collection entry, not a file
            }
            let lower = leaf.to_ascii_lowercase();
            if lower.ends_with(".dsp") || lower.ends_with(".json") {
                Some(leaf.to_string())
            } else {
                None
            }
        })
        .collect();
    names.sort_unstable_by(|a, b| b.cmp(a));
    names.dedup();
    names
}
