//! Length-prefixed file pair record
//!
//! ```text
//! [len1: i32 LE][len2: i32 LE][file1: len1 bytes][file2: len2 bytes]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use gerber_core::{DomainError, FilePair};

const HEADER_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt staging record: {0}")]
    Corrupt(String),

    #[error("File too large to stage: {0} bytes")]
    TooLarge(usize),
}

impl From<StagingError> for DomainError {
    fn from(e: StagingError) -> Self {
        DomainError::IoFailure(e.to_string())
    }
}

pub fn encode(files: &FilePair) -> Result<Bytes, StagingError> {
    let len1 = length_prefix(files.file1.len())?;
    let len2 = length_prefix(files.file2.len())?;

    let mut buf = BytesMut::with_capacity(HEADER_LEN + files.file1.len() + files.file2.len());
    buf.put_i32_le(len1);
    buf.put_i32_le(len2);
    buf.put_slice(&files.file1);
    buf.put_slice(&files.file2);
    Ok(buf.freeze())
}

/// The record must be exactly header plus both payloads.
pub fn decode(mut record: Bytes) -> Result<FilePair, StagingError> {
    if record.len() < HEADER_LEN {
        return Err(StagingError::Corrupt(format!(
            "record of {} bytes has no header",
            record.len()
        )));
    }

    let len1 = payload_len(record.get_i32_le())?;
    let len2 = payload_len(record.get_i32_le())?;

    if record.len() != len1 + len2 {
        return Err(StagingError::Corrupt(format!(
            "header announces {} + {} bytes, record holds {}",
            len1,
            len2,
            record.len()
        )));
    }

    let file1 = record.split_to(len1);
    Ok(FilePair { file1, file2: record })
}

fn length_prefix(len: usize) -> Result<i32, StagingError> {
    i32::try_from(len).map_err(|_| StagingError::TooLarge(len))
}

fn payload_len(raw: i32) -> Result<usize, StagingError> {
    usize::try_from(raw).map_err(|_| StagingError::Corrupt(format!("negative length {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_little_endian_lengths_then_payloads() {
        let encoded = encode(&FilePair::new(b"abc".to_vec(), b"Z".to_vec())).unwrap();
        assert_eq!(
            encoded.as_ref(),
            &[3, 0, 0, 0, 1, 0, 0, 0, b'a', b'b', b'c', b'Z'][..]
        );
    }

    #[test]
    fn test_empty_blobs_survive() {
        let pair = FilePair::new(Vec::new(), b"back".to_vec());
        assert_eq!(decode(encode(&pair).unwrap()).unwrap(), pair);

        let empty = FilePair::default();
        assert_eq!(encode(&empty).unwrap().len(), HEADER_LEN);
        assert_eq!(decode(encode(&empty).unwrap()).unwrap(), empty);
    }

    #[test]
    fn test_truncated_record_is_corrupt() {
        let encoded = encode(&FilePair::new(vec![7u8; 10], vec![9u8; 10])).unwrap();
        let truncated = encoded.slice(..encoded.len() - 1);
        assert!(matches!(decode(truncated), Err(StagingError::Corrupt(_))));
        assert!(matches!(decode(Bytes::from_static(&[1, 0])), Err(StagingError::Corrupt(_))));
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() {
        let mut raw = BytesMut::from(encode(&FilePair::new(b"a".to_vec(), b"b".to_vec())).unwrap().as_ref());
        raw.put_u8(0xFF);
        assert!(matches!(decode(raw.freeze()), Err(StagingError::Corrupt(_))));
    }

    #[test]
    fn test_negative_length_is_corrupt() {
        let mut raw = BytesMut::new();
        raw.put_i32_le(-1);
        raw.put_i32_le(0);
        assert!(matches!(decode(raw.freeze()), Err(StagingError::Corrupt(_))));
    }
}
