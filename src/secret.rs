//! Wrapper for credentials that must never reach logs.
//!
//! [`Secret`] redacts itself in `Debug`, `Display`, and `Serialize` output and
//! zeroes its memory on drop. Call sites read the value with
//! [`Secret::expose`], which keeps every access visible in review.

use std::fmt;

use serde::{Serialize, Serializer};
use zeroize::Zeroize;

/// Placeholder printed wherever a secret would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// Sensitive value with redacted formatting.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
    T: Zeroize,
{
    inner: T,
}

/// Secret string, the common case for passwords and API tokens.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
    T: Zeroize,
{
    /// Wraps a sensitive value.
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns the wrapped value.
    pub const fn expose(&self) -> &T {
        &self.inner
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl<T> Clone for Secret<T>
where
    T: Zeroize + Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&REDACTED).finish()
    }
}

impl<T> fmt::Display for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> PartialEq for Secret<T>
where
    T: Zeroize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl<T> Serialize for Secret<T>
where
    T: Zeroize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

/// Serializes the exposed value of a secret string.
///
/// Only wire payloads that must carry the credential to the provider use this
/// through `#[serde(serialize_with = "...")]`.
///
/// # Errors
///
/// Propagates serializer failures.
pub fn serialize_exposed<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_is_redacted() {
        let secret = SecretString::from("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(\"[REDACTED]\")");
        assert_eq!(secret.to_string(), REDACTED);
    }

    #[test]
    fn default_serialization_is_redacted() {
        let secret = SecretString::from("hunter2");
        let json = serde_json::to_string(&secret).expect("serialize secret");
        assert_eq!(json, "\"[REDACTED]\"");
    }

    #[test]
    fn explicit_serialization_exposes_value() {
        #[derive(Serialize)]
        struct Payload {
            #[serde(serialize_with = "serialize_exposed")]
            password: SecretString,
        }

        let payload = Payload {
            password: SecretString::from("hunter2"),
        };
        let json = serde_json::to_string(&payload).expect("serialize payload");
        assert_eq!(json, r#"{"password":"hunter2"}"#);
    }
}
