//! # Blob Storage
//!
//! Bucketed object storage with time-limited presigned URLs.
//!
//! Signatures are `SHA-256(secret || bucket/key/expiry)` encoded as URL-safe
//! base64 without padding. Presigning does not check that the object exists.

use std::collections::{BTreeMap, HashMap};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Blob storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("URL expired")]
    UrlExpired,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid expiry: {0} seconds")]
    InvalidExpiry(i64),
}

/// Object storage contract
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Read an object
    fn get(&self, bucket: &str, key: &str) -> BlobResult<Vec<u8>>;

    /// Write an object, creating the bucket if needed
    fn put(&self, bucket: &str, key: &str, data: &[u8]) -> BlobResult<()>;

    /// Presign a GET for `expires_in` seconds
    fn presign(&self, bucket: &str, key: &str, expires_in: i64) -> BlobResult<PresignedUrl>;
}

/// A presigned object URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    pub base_url: String,
    pub bucket: String,
    pub key: String,
    pub expires_at: DateTime<Utc>,
    pub signature: String,
}

impl PresignedUrl {
    /// Path component, `/<bucket>/<key>`
    pub fn path(&self) -> String {
        format!("/{}/{}", self.bucket, self.key)
    }

    fn query(&self) -> String {
        format!(
            "signature={}&expires={}",
            self.signature,
            self.expires_at.timestamp()
        )
    }

    /// Full URL on the store's own host
    pub fn to_url(&self) -> String {
        format!("{}{}?{}", self.base_url, self.path(), self.query())
    }

    /// Full URL with the path served under `/blob`
    pub fn to_public_url(&self) -> String {
        format!("{}/blob{}?{}", self.base_url, self.path(), self.query())
    }
}

/// In-process blob store
#[derive(Debug)]
pub struct InMemoryBlobStore {
    base_url: String,
    secret: Vec<u8>,
    buckets: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new(base_url: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.to_vec(),
            buckets: RwLock::new(HashMap::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check a presigned URL against the clock and this store's secret
    pub fn verify(&self, url: &PresignedUrl) -> BlobResult<()> {
        if Utc::now() > url.expires_at {
            return Err(BlobError::UrlExpired);
        }

        let expected = self.sign(&url.bucket, &url.key, url.expires_at);
        if !bool::from(expected.as_bytes().ct_eq(url.signature.as_bytes())) {
            return Err(BlobError::InvalidSignature);
        }

        Ok(())
    }

    fn sign(&self, bucket: &str, key: &str, expires_at: DateTime<Utc>) -> String {
        let message = format!("{}/{}/{}", bucket, key, expires_at.timestamp());
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(message.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, bucket: &str, key: &str) -> BlobResult<Vec<u8>> {
        let buckets = self.buckets.read();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| BlobError::BucketNotFound(bucket.to_string()))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put(&self, bucket: &str, key: &str, data: &[u8]) -> BlobResult<()> {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn presign(&self, bucket: &str, key: &str, expires_in: i64) -> BlobResult<PresignedUrl> {
        if expires_in <= 0 {
            return Err(BlobError::InvalidExpiry(expires_in));
        }

        let expires_at = Utc::now() + Duration::seconds(expires_in);
        Ok(PresignedUrl {
            base_url: self.base_url.clone(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            expires_at,
            signature: self.sign(bucket, key, expires_at),
        })
    }
}
