//! Filesystem backend for the staff directory's blob store.
//!
//! Blobs live under a root directory and are served back by the HTTP layer
//! at `<public base URL>/<path>`.

pub mod error;

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use staffdir_core::store::{BlobRef, BlobStore};

pub use error::{Error, Result};

/// A [`BlobStore`] writing into a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root:            PathBuf,
  public_base_url: String,
}

impl FsBlobStore {
  /// `public_base_url` is the URL prefix under which `root` is served, e.g.
  /// `http://localhost:8080/files`.
  pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
    let public_base_url = public_base_url.into().trim_end_matches('/').to_owned();
    Self { root: root.into(), public_base_url }
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Resolve a blob path under the root, refusing anything that could escape
  /// it.
  fn resolve(&self, path: &str) -> Result<PathBuf> {
    let relative = Path::new(path);
    let plain = !path.is_empty()
      && !path.contains('\\')
      && relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
      return Err(Error::InvalidPath(path.to_owned()));
    }
    Ok(self.root.join(relative))
  }
}

impl BlobStore for FsBlobStore {
  type Error = Error;

  async fn put(
    &self,
    path: String,
    bytes: Bytes,
    content_type: Option<String>,
  ) -> Result<BlobRef> {
    let target = self.resolve(&path)?;
    if let Some(parent) = target.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &bytes).await?;

    tracing::debug!(
      %path,
      size = bytes.len(),
      content_type = content_type.as_deref().unwrap_or("unknown"),
      "blob stored"
    );
    Ok(BlobRef { path })
  }

  fn url(&self, blob: &BlobRef) -> String {
    format!("{}/{}", self.public_base_url, blob.path)
  }
}
