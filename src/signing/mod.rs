//! 请求签名：TC3-HMAC-SHA256 规范请求签名算法。
//!
//! Canonical-request signing for the backend that does not accept a static
//! bearer token.
//!
//! The algorithm is fully deterministic: the only time inputs are the
//! `timestamp` and `date` fields on [`SigningContext`], so fixed vectors can be
//! verified without touching the wall clock.
//!
//! ```text
//! canonical_request = POST \n / \n \n <name:value\n ...> \n <names;...> \n hex(sha256(payload))
//! credential_scope  = <date>/<service>/tc3_request
//! string_to_sign    = TC3-HMAC-SHA256 \n <timestamp> \n <credential_scope> \n hex(sha256(canonical_request))
//! signing_key       = HMAC(HMAC(HMAC("TC3" + secret_key, date), service), "tc3_request")
//! signature         = hex(HMAC(signing_key, string_to_sign))
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const REQUEST_TERMINATOR: &str = "tc3_request";
const SECRET_KEY_PREFIX: &str = "TC3";
const HTTP_METHOD: &str = "POST";
const CANONICAL_URI: &str = "/";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("missing signing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid signing date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("no headers selected for signing")]
    NoSignedHeaders,

    #[error("invalid HMAC key: {0}")]
    InvalidKey(String),
}

/// One header that participates in the canonical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeader {
    /// Lowercased header name.
    pub name: String,
    pub value: String,
}

impl SignedHeader {
    pub fn new(name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_ascii_lowercase(),
            value: value.as_ref().trim().to_string(),
        }
    }
}

/// Per-request signing input. Built fresh for every call and never reused,
/// since the timestamp is part of what the backend authenticates.
#[derive(Clone)]
pub struct SigningContext {
    pub secret_id: String,
    pub secret_key: String,
    pub service: String,
    pub canonical_uri: String,
    /// Signed headers in the exact order they are canonicalized.
    pub signed_headers: Vec<SignedHeader>,
    pub payload: Vec<u8>,
    /// Unix seconds.
    pub timestamp: i64,
    /// UTC calendar date, `YYYY-MM-DD`.
    pub date: String,
}

impl std::fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningContext")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("service", &self.service)
            .field("canonical_uri", &self.canonical_uri)
            .field("signed_headers", &self.signed_headers)
            .field("payload_len", &self.payload.len())
            .field("timestamp", &self.timestamp)
            .field("date", &self.date)
            .finish()
    }
}

/// Result of signing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Lowercase hex HMAC.
    pub signature: String,
    /// Full value for the `Authorization` header.
    pub authorization: String,
    pub credential_scope: String,
    /// `;`-joined signed header names.
    pub signed_header_names: String,
}

impl SigningContext {
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            service: service.into(),
            canonical_uri: CANONICAL_URI.to_string(),
            signed_headers: Vec::new(),
            payload: Vec::new(),
            timestamp: 0,
            date: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.signed_headers.push(SignedHeader::new(name, value));
        self
    }

    /// Path the request is actually sent to. Empty means `/`.
    pub fn with_canonical_uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.canonical_uri = if uri.is_empty() { CANONICAL_URI.to_string() } else { uri };
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Use an explicit timestamp/date pair.
    pub fn with_time(mut self, timestamp: i64, date: impl Into<String>) -> Self {
        self.timestamp = timestamp;
        self.date = date.into();
        self
    }

    /// Derive both time fields from one UTC instant.
    pub fn at(self, instant: DateTime<Utc>) -> Self {
        let date = instant.format(DATE_FORMAT).to_string();
        self.with_time(instant.timestamp(), date)
    }

    pub fn signed_header_names(&self) -> String {
        self.signed_headers
            .iter()
            .map(|h| h.name.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn canonical_request(&self) -> String {
        let mut canonical_headers = String::new();
        for h in &self.signed_headers {
            canonical_headers.push_str(&h.name);
            canonical_headers.push(':');
            canonical_headers.push_str(&h.value);
            canonical_headers.push('\n');
        }

        // Query string is always empty for POST.
        format!(
            "{}\n{}\n\n{}\n{}\n{}",
            HTTP_METHOD,
            self.canonical_uri,
            canonical_headers,
            self.signed_header_names(),
            sha256_hex(&self.payload)
        )
    }

    pub fn credential_scope(&self) -> String {
        format!("{}/{}/{}", self.date, self.service, REQUEST_TERMINATOR)
    }

    pub fn string_to_sign(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            self.timestamp,
            self.credential_scope(),
            sha256_hex(self.canonical_request().as_bytes())
        )
    }

    fn validate(&self) -> Result<(), SigningError> {
        if self.secret_id.trim().is_empty() {
            return Err(SigningError::MissingCredential("secret_id"));
        }
        if self.secret_key.trim().is_empty() {
            return Err(SigningError::MissingCredential("secret_key"));
        }
        if self.signed_headers.is_empty() {
            return Err(SigningError::NoSignedHeaders);
        }
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|_| SigningError::InvalidDate(self.date.clone()))?;
        Ok(())
    }

    /// Compute the signature and `Authorization` header value.
    pub fn sign(&self) -> Result<Signature, SigningError> {
        self.validate()?;

        let signing_key = derive_signing_key(&self.secret_key, &self.date, &self.service)?;
        let signature = hex::encode(hmac_sha256(&signing_key, self.string_to_sign().as_bytes())?);
        let credential_scope = self.credential_scope();
        let signed_header_names = self.signed_header_names();

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.secret_id, credential_scope, signed_header_names, signature
        );

        Ok(Signature {
            signature,
            authorization,
            credential_scope,
            signed_header_names,
        })
    }
}

/// Lowercase hex SHA-256.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn hmac_sha256(key: &[u8], msg: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(msg);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Three-stage derived key: date, then service, then the fixed terminator.
pub fn derive_signing_key(
    secret_key: &str,
    date: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(
        format!("{}{}", SECRET_KEY_PREFIX, secret_key).as_bytes(),
        date.as_bytes(),
    )?;
    let k_service = hmac_sha256(&k_date, service.as_bytes())?;
    hmac_sha256(&k_service, REQUEST_TERMINATOR.as_bytes())
}
