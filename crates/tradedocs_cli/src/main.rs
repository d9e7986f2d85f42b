//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tradedocs_core` linkage and
//!   schema bootstrap.
//! - Keep output deterministic for quick local sanity checks.

use tradedocs_core::db::migrations::latest_version;
use tradedocs_core::Storage;

fn main() {
    println!("tradedocs_core version={}", tradedocs_core::core_version());
    match Storage::open_in_memory() {
        Ok(_) => println!("tradedocs_core schema_version={}", latest_version()),
        Err(err) => println!("tradedocs_core storage_error={err}"),
    }
}
