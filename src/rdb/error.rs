//! Decoding of provider error responses.

use serde::Deserialize;

use crate::control_plane::ProviderError;

/// Code used when the request never reached the provider.
pub(super) const TRANSPORT_CODE: &str = "transport";
/// Code used when a success response cannot be decoded.
pub(super) const DECODE_CODE: &str = "decode";
/// Code used when a request URL cannot be built from the base URL.
pub(super) const INVALID_URL_CODE: &str = "invalid_url";

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    etype: String,
    #[serde(default)]
    message: String,
}

/// Converts a non-success response into a [`ProviderError`].
///
/// Bodies shaped as `{"type": ..., "message": ...}` keep the provider's code;
/// anything else is reported as `http_<status>` with the raw body.
pub(super) fn from_response(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(decoded) => ProviderError::new(decoded.etype, decoded.message),
        Err(_) => ProviderError::new(format!("http_{status}"), body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_typed_error_body() {
        let err = from_response(
            409,
            r#"{"type":"already_exists","message":"instance t1 already exists"}"#,
        );
        assert_eq!(
            err,
            ProviderError::new("already_exists", "instance t1 already exists")
        );
    }

    #[test]
    fn falls_back_to_status_code() {
        let err = from_response(502, "bad gateway\n");
        assert_eq!(err, ProviderError::new("http_502", "bad gateway"));
    }
}
