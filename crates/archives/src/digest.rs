//! Streaming SHA-256 over archive files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::{AcquireError, Result};

pub type Hash32 = [u8; 32];

const CHUNK: usize = 64 * 1024;

/// Hash a reader in fixed-size chunks; never holds more than one chunk.
pub fn sha256_reader<R: Read>(mut reader: R) -> std::io::Result<Hash32> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Lowercase hex digest of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String> {
    let f = File::open(path).map_err(|e| open_error(path, e))?;
    let hash = sha256_reader(BufReader::new(f)).map_err(|e| AcquireError::io(path, e))?;
    Ok(hex::encode(hash))
}

pub fn digests_match(actual_hex: &str, expected_hex: &str) -> bool {
    actual_hex.trim().eq_ignore_ascii_case(expected_hex.trim())
}

/// `Ok(false)` on mismatch; whether that is fatal is up to the caller.
pub fn verify_integrity(path: &Path, expected_hex: &str) -> Result<bool> {
    let actual = sha256_file(path)?;
    let ok = digests_match(&actual, expected_hex);
    if ok {
        tracing::debug!(path = %path.display(), "checksum ok");
    } else {
        tracing::warn!(
            path = %path.display(),
            expected = %expected_hex,
            actual = %actual,
            "checksum mismatch"
        );
    }
    Ok(ok)
}

pub(crate) fn open_error(path: &Path, e: std::io::Error) -> AcquireError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AcquireError::NotFound { path: path.to_path_buf() }
    } else {
        AcquireError::io(path, e)
    }
}
