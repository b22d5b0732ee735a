//! Bot API `file_id` decoding.
//!
//! A `file_id` is url-safe base64 over a zero-run-length-encoded buffer:
//! `<i32 type><i32 dc>[file reference]<i64 media id><i64 access hash>...<version bytes>`.
//! Only the media id is extracted; it is the same for every `file_id` that points
//! at one stored object, which makes it usable as a remote file identifier.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use filelink_core::RemoteFileId;

use crate::traits::{MessagingError, MessagingResult};

const WEB_LOCATION_FLAG: i32 = 1 << 24;
const FILE_REFERENCE_FLAG: i32 = 1 << 25;

/// Extract the numeric media id from a Bot API `file_id`.
pub fn decode_media_id(file_id: &str) -> MessagingResult<RemoteFileId> {
    let raw = URL_SAFE_NO_PAD
        .decode(file_id.trim_end_matches('='))
        .map_err(|e| MessagingError::Decode(format!("file_id is not base64: {}", e)))?;
    let mut data = rle_decode(&raw);

    let major = *data
        .last()
        .ok_or_else(|| MessagingError::Decode("empty file_id".to_string()))?;
    let trailer = if major < 4 { 1 } else { 2 };
    data.truncate(data.len().saturating_sub(trailer));

    let mut reader = Reader::new(&data);
    let type_id = reader.read_i32()?;
    let _dc_id = reader.read_i32()?;

    if type_id & WEB_LOCATION_FLAG != 0 {
        return Err(MessagingError::Decode(
            "web location file_id has no media id".to_string(),
        ));
    }
    if type_id & FILE_REFERENCE_FLAG != 0 {
        reader.skip_tl_bytes()?;
    }

    let media_id = reader.read_i64()?;
    Ok(RemoteFileId::new(media_id))
}

/// Expand `0x00 <count>` pairs into `count` zero bytes.
fn rle_decode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut zero_pending = false;
    for &byte in data {
        if zero_pending {
            out.extend(std::iter::repeat(0u8).take(byte as usize));
            zero_pending = false;
        } else if byte == 0 {
            zero_pending = true;
        } else {
            out.push(byte);
        }
    }
    if zero_pending {
        out.push(0);
    }
    out
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> MessagingResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| MessagingError::Decode("file_id is truncated".to_string()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_i32(&mut self) -> MessagingResult<i32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(buf))
    }

    fn read_i64(&mut self) -> MessagingResult<i64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(buf))
    }

    /// Skip a TL-serialized byte string including its padding.
    fn skip_tl_bytes(&mut self) -> MessagingResult<()> {
        let first = self.take(1)?[0];
        let (len, header) = if first == 254 {
            let b = self.take(3)?;
            (
                b[0] as usize | (b[1] as usize) << 8 | (b[2] as usize) << 16,
                4,
            )
        } else {
            (first as usize, 1)
        };
        self.take(len)?;
        let padding = (4 - (len + header) % 4) % 4;
        self.take(padding)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT_TYPE: i32 = 5;
    const PHOTO_TYPE: i32 = 2;

    fn rle_encode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut zeros = 0u8;
        for &byte in data {
            if byte == 0 {
                if zeros == u8::MAX {
                    out.extend_from_slice(&[0, zeros]);
                    zeros = 0;
                }
                zeros += 1;
            } else {
                if zeros > 0 {
                    out.extend_from_slice(&[0, zeros]);
                    zeros = 0;
                }
                out.push(byte);
            }
        }
        if zeros > 0 {
            out.extend_from_slice(&[0, zeros]);
        }
        out
    }

    fn tl_bytes(value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let header = if value.len() <= 253 {
            out.push(value.len() as u8);
            1
        } else {
            out.push(254);
            out.extend_from_slice(&(value.len() as u32).to_le_bytes()[..3]);
            4
        };
        out.extend_from_slice(value);
        out.resize(out.len() + (4 - (value.len() + header) % 4) % 4, 0);
        out
    }

    fn encode(type_id: i32, file_reference: Option<&[u8]>, media_id: i64, access_hash: i64) -> String {
        let mut buf = Vec::new();
        let flags = if file_reference.is_some() {
            FILE_REFERENCE_FLAG
        } else {
            0
        };
        buf.extend_from_slice(&(type_id | flags).to_le_bytes());
        buf.extend_from_slice(&4i32.to_le_bytes());
        if let Some(reference) = file_reference {
            buf.extend_from_slice(&tl_bytes(reference));
        }
        buf.extend_from_slice(&media_id.to_le_bytes());
        buf.extend_from_slice(&access_hash.to_le_bytes());
        buf.extend_from_slice(&[30, 4]);
        URL_SAFE_NO_PAD.encode(rle_encode(&buf))
    }

    #[test]
    fn test_decode_document_with_file_reference() {
        let file_id = encode(DOCUMENT_TYPE, Some(&[1, 0, 0, 7, 9]), 5_264_183_012_345_678_901, 77);
        assert_eq!(
            decode_media_id(&file_id).unwrap(),
            RemoteFileId::new(5_264_183_012_345_678_901)
        );
    }

    #[test]
    fn test_decode_without_file_reference() {
        let file_id = encode(PHOTO_TYPE, None, 123_456, -1);
        assert_eq!(decode_media_id(&file_id).unwrap(), RemoteFileId::new(123_456));
    }

    #[test]
    fn test_decode_negative_media_id() {
        let file_id = encode(DOCUMENT_TYPE, Some(b"ref"), -42, 0);
        assert_eq!(decode_media_id(&file_id).unwrap(), RemoteFileId::new(-42));
    }

    #[test]
    fn test_decode_long_file_reference() {
        let reference = vec![0xAB; 300];
        let file_id = encode(DOCUMENT_TYPE, Some(&reference), 987_654_321, 5);
        assert_eq!(decode_media_id(&file_id).unwrap(), RemoteFileId::new(987_654_321));
    }

    #[test]
    fn test_padding_is_accepted() {
        let file_id = format!("{}==", encode(DOCUMENT_TYPE, None, 31, 0));
        assert_eq!(decode_media_id(&file_id).unwrap(), RemoteFileId::new(31));
    }

    #[test]
    fn test_web_location_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(DOCUMENT_TYPE | WEB_LOCATION_FLAG).to_le_bytes());
        buf.extend_from_slice(&4i32.to_le_bytes());
        buf.extend_from_slice(&[30, 4]);
        let file_id = URL_SAFE_NO_PAD.encode(rle_encode(&buf));
        assert!(matches!(decode_media_id(&file_id), Err(MessagingError::Decode(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decode_media_id("").is_err());
        assert!(decode_media_id("!!!not base64!!!").is_err());
        assert!(decode_media_id("AQID").is_err());
    }

    #[test]
    fn test_rle_decode_expands_zero_runs() {
        assert_eq!(rle_decode(&[1, 0, 3, 2]), vec![1, 0, 0, 0, 2]);
        assert_eq!(rle_decode(&[0, 0]), Vec::<u8>::new());
    }
}
