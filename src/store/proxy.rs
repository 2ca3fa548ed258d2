//! Proxy datasets
//!
//! A `ProxyDataset` stands in for an asset whose bytes live in blob storage.
//! The object sits in the bucket named after the owning node and under the
//! key `<dataset>/<asset>`.

use serde::{Deserialize, Serialize};

use super::blob::{BlobResult, BlobStore};
use super::uid::Uid;

/// Reference to an asset held in blob storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDataset {
    pub asset_name: String,
    pub dataset_name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
    pub fqn: String,
    pub node_id: Uid,
    /// Last presigned URL, empty until one is generated
    #[serde(default)]
    pub url: String,
}

impl ProxyDataset {
    pub fn new(
        asset_name: impl Into<String>,
        dataset_name: impl Into<String>,
        shape: Vec<usize>,
        dtype: impl Into<String>,
        fqn: impl Into<String>,
        node_id: Uid,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            dataset_name: dataset_name.into(),
            shape,
            dtype: dtype.into(),
            fqn: fqn.into(),
            node_id,
            url: String::new(),
        }
    }

    /// Object key, `<dataset>/<asset>`
    pub fn name(&self) -> String {
        format!("{}/{}", self.dataset_name, self.asset_name)
    }

    pub fn data_fully_qualified_name(&self) -> &str {
        &self.fqn
    }

    /// Bucket holding the object
    pub fn bucket(&self) -> String {
        self.node_id.no_dash()
    }

    /// Read the object's bytes
    pub fn fetch(&self, store: &dyn BlobStore) -> BlobResult<Vec<u8>> {
        store.get(&self.bucket(), &self.name()).inspect_err(|e| {
            tracing::warn!(dataset = %self.name(), error = %e, "Failed to get data from proxy object");
        })
    }

    /// Presign a download URL and store it in `url`.
    ///
    /// A public URL serves the same path under `/blob`.
    pub fn generate_presigned_url(
        &mut self,
        store: &dyn BlobStore,
        expires_in: i64,
        public_url: bool,
    ) -> BlobResult<&str> {
        let presigned = store.presign(&self.bucket(), &self.name(), expires_in)?;
        self.url = if public_url {
            presigned.to_public_url()
        } else {
            presigned.to_url()
        };
        Ok(&self.url)
    }
}
