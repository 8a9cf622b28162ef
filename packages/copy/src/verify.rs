//! Post-copy validation.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::CopyError;

const HASH_CHUNK: usize = 256 * 1024;
const DIGEST_PREFIX_LEN: usize = 12;

/// Hex SHA-256 digest of a file, read in 256 KiB chunks.
///
/// # Errors
///
/// * If the file cannot be opened or read
pub fn sha256_file(path: &Path) -> Result<String, CopyError> {
    let to_error = |e| CopyError::HashError {
        path: path.to_path_buf(),
        io_error: e,
    };

    let mut file = File::open(path).map_err(to_error)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0_u8; HASH_CHUNK];

    loop {
        let read = file.read(&mut buf).map_err(to_error)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Hash `source` and `target` in parallel and compare the digests.
pub(crate) fn verify_digests(source: &Path, target: &Path) -> Result<(), CopyError> {
    let (source_digest, target_digest) =
        rayon::join(|| sha256_file(source), || sha256_file(target));
    let (source_digest, target_digest) = (source_digest?, target_digest?);

    if source_digest == target_digest {
        log::trace!("Digest match for {}: {source_digest}", target.display());
        return Ok(());
    }

    Err(CopyError::ChecksumMismatch {
        source_digest: source_digest[..DIGEST_PREFIX_LEN].to_string(),
        target_digest: target_digest[..DIGEST_PREFIX_LEN].to_string(),
    })
}

/// Check that `target` exists and holds exactly `expected` bytes.
pub(crate) fn verify_size(target: &Path, expected: u64) -> Result<(), CopyError> {
    let actual = fs::metadata(target).ok().map(|m| m.len());
    if actual == Some(expected) {
        return Ok(());
    }

    Err(CopyError::SizeMismatch {
        path: target.to_path_buf(),
        expected,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sha256_known_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, "abc").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_spans_multiple_chunks() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        let mut data = vec![7_u8; HASH_CHUNK * 2 + 17];
        fs::write(&a, &data).unwrap();
        *data.last_mut().unwrap() = 8;
        fs::write(&b, &data).unwrap();

        assert_ne!(sha256_file(&a).unwrap(), sha256_file(&b).unwrap());
    }

    #[test]
    fn test_verify_digests_single_byte_difference() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src.bin");
        let target = dir.path().join("dst.bin");
        fs::write(&source, b"recording-data").unwrap();
        fs::write(&target, b"recording-dato").unwrap();

        let err = verify_digests(&source, &target).unwrap_err();
        match err {
            CopyError::ChecksumMismatch {
                source_digest,
                target_digest,
            } => {
                assert_eq!(source_digest.len(), 12);
                assert_eq!(target_digest.len(), 12);
                assert_ne!(source_digest, target_digest);
            }
            other => panic!("unexpected error: {other}"),
        }

        fs::write(&target, b"recording-data").unwrap();
        assert!(verify_digests(&source, &target).is_ok());
    }

    #[test]
    fn test_verify_size() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("dst.bin");

        assert!(matches!(
            verify_size(&target, 3),
            Err(CopyError::SizeMismatch { actual: None, .. })
        ));

        fs::write(&target, "abcd").unwrap();
        assert!(matches!(
            verify_size(&target, 3),
            Err(CopyError::SizeMismatch {
                actual: Some(4),
                ..
            })
        ));
        assert!(verify_size(&target, 4).is_ok());
    }

    #[test]
    fn test_hash_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            sha256_file(&dir.path().join("missing")),
            Err(CopyError::HashError { .. })
        ));
    }
}
