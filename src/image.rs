use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// 5 MiB, the upload cap of the web form this service backs.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Label for bare base64 uploads that carry no media type of their own.
pub const DEFAULT_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image is {size} bytes, limit is {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("image payload is unreadable: {0}")]
    Unreadable(String),
}

/// A decoded and size-checked image submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub mime: String,
    pub bytes: Vec<u8>,
    encoded: String,
}

impl ImageUpload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.encoded)
    }
}

fn split_data_url(raw: &str) -> Result<(&str, &str), ImageError> {
    let Some(rest) = raw.strip_prefix("data:") else {
        return Ok((DEFAULT_MIME, raw));
    };
    let Some((meta, payload)) = rest.split_once(',') else {
        return Err(ImageError::Unreadable("data url has no payload".into()));
    };
    let Some(mime) = meta.strip_suffix(";base64") else {
        return Err(ImageError::Unreadable(
            "data url is not base64 encoded".into(),
        ));
    };
    let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
    Ok((mime, payload))
}

fn decoded_len(payload: &str) -> Result<usize, ImageError> {
    if payload.len() % 4 != 0 {
        return Err(ImageError::Unreadable(
            "base64 length is not a multiple of 4".into(),
        ));
    }
    let pad = payload
        .bytes()
        .rev()
        .take_while(|b| *b == b'=')
        .count()
        .min(2);
    Ok(payload.len() / 4 * 3 - pad)
}

/// Decode `raw` (a `data:` url or bare base64) and enforce `limit` on the
/// decoded size. The size is computed from the encoded length first, so an
/// oversize payload is rejected before anything is decoded.
pub fn decode_image(raw: &str, limit: usize) -> Result<ImageUpload, ImageError> {
    let (mime, payload) = split_data_url(raw)?;
    if payload.is_empty() {
        return Err(ImageError::Unreadable("image payload is empty".into()));
    }

    let size = decoded_len(payload)?;
    if size > limit {
        return Err(ImageError::PayloadTooLarge { size, limit });
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ImageError::Unreadable(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ImageError::Unreadable("image payload is empty".into()));
    }

    Ok(ImageUpload {
        mime: mime.to_string(),
        bytes,
        encoded: payload.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn bare_base64_defaults_to_jpeg() {
        let raw = b64(b"\xff\xd8\xff\xe0fake");
        let img = decode_image(&raw, DEFAULT_MAX_IMAGE_BYTES).expect("decode");
        assert_eq!(img.mime, "image/jpeg");
        assert_eq!(img.len(), 8);
        assert_eq!(img.data_url(), format!("data:image/jpeg;base64,{raw}"));
    }

    #[test]
    fn data_url_keeps_its_mime() {
        let raw = format!("data:image/png;base64,{}", b64(b"\x89PNG"));
        let img = decode_image(&raw, DEFAULT_MAX_IMAGE_BYTES).expect("decode");
        assert_eq!(img.mime, "image/png");
        assert_eq!(img.bytes, b"\x89PNG");
        assert_eq!(img.data_url(), raw);
    }

    #[test]
    fn limit_is_inclusive() {
        let raw = b64(&[7u8; 10]);
        assert!(decode_image(&raw, 10).is_ok());
        assert_eq!(
            decode_image(&raw, 9),
            Err(ImageError::PayloadTooLarge { size: 10, limit: 9 })
        );
    }

    #[test]
    fn unreadable_payloads() {
        for raw in [
            "",
            "data:image/png;base64,",
            "data:image/png,plain",
            "data:image/png;base64",
            "abc",
            "ab!d",
            "====",
        ] {
            assert!(
                matches!(
                    decode_image(raw, DEFAULT_MAX_IMAGE_BYTES),
                    Err(ImageError::Unreadable(_))
                ),
                "{raw:?} should be unreadable"
            );
        }
    }

    #[test]
    fn oversize_rejected_without_truncation() {
        let raw = b64(&vec![0u8; 4096]);
        let err = decode_image(&raw, 1024).unwrap_err();
        assert_eq!(
            err,
            ImageError::PayloadTooLarge {
                size: 4096,
                limit: 1024
            }
        );
    }
}
