//! Error type for `staffdir-blob-fs`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid blob path: {0:?}")]
  InvalidPath(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
