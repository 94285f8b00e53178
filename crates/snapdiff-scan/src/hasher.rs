//! Streaming SHA-256 content hashing.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Bytes read per chunk while hashing.
pub const HASH_CHUNK_SIZE: usize = 80 * 1024;

/// Errors while hashing a single file.
#[derive(Debug, Error)]
pub enum HashError {
    /// Cancellation was requested between two chunks.
    #[error("hashing cancelled")]
    Cancelled,

    /// The file could not be opened or read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Hash a file's contents, returning the lowercase hex digest.
pub fn hash_file(path: &Path, cancel: &CancellationToken) -> Result<String, HashError> {
    let mut file = File::open(path)?;
    hash_reader(&mut file, cancel)
}

/// Hash everything `reader` yields, checking `cancel` before each chunk.
pub fn hash_reader<R: Read>(reader: &mut R, cancel: &CancellationToken) -> Result<String, HashError> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        if cancel.is_cancelled() {
            return Err(HashError::Cancelled);
        }

        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_known_digests() {
        let cancel = CancellationToken::new();
        assert_eq!(hash_reader(&mut Cursor::new(b""), &cancel).unwrap(), EMPTY_SHA256);
        assert_eq!(hash_reader(&mut Cursor::new(b"abc"), &cancel).unwrap(), ABC_SHA256);
    }

    #[test]
    fn test_hash_file_spanning_many_chunks() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.bin");
        let data: Vec<u8> = (0..HASH_CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let cancel = CancellationToken::new();
        let from_file = hash_file(&path, &cancel).unwrap();
        let from_memory = hash_reader(&mut Cursor::new(&data), &cancel).unwrap();

        assert_eq!(from_file, from_memory);
        assert_eq!(from_file.len(), 64);
    }

    #[test]
    fn test_cancelled_token_stops_hashing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = hash_reader(&mut Cursor::new(b"abc"), &cancel);
        assert!(matches!(result, Err(HashError::Cancelled)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let result = hash_file(&temp.path().join("missing"), &cancel);
        assert!(matches!(result, Err(HashError::Io(_))));
    }
}
