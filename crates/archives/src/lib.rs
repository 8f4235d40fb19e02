//! Acquisition and integrity checks for the raw EEG / EOG / EMG archives.
//!
//! fetch -> checksum -> extract -> file-count verification.

pub mod digest;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod schema;
pub mod verify;

pub use digest::{sha256_file, verify_integrity, Hash32};
pub use error::{AcquireError, Result};
pub use extract::{extract, sanitize_member_path, ArchiveFormat};
pub use fetch::{Fetcher, RetryPolicy};
pub use pipeline::{acquire_and_verify_all, AcquisitionReport};
pub use schema::*;
pub use verify::{count_files, verify_extraction, ExtractionCheck};
