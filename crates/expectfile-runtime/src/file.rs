//! Files whose contents may be async readers.

use std::fmt;
use std::path::PathBuf;

use tokio::io::AsyncRead;

use expectfile_core::path::relative_to;

/// Contents of an async observed file.
pub enum AsyncContents {
    Null,
    Buffer(Vec<u8>),
    Stream(Box<dyn AsyncRead + Send + Unpin>),
}

impl AsyncContents {
    pub fn is_stream(&self) -> bool {
        matches!(self, AsyncContents::Stream(_))
    }
}

impl fmt::Debug for AsyncContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncContents::Null => write!(f, "Null"),
            AsyncContents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            AsyncContents::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// A file flowing through the async stage.
#[derive(Debug)]
pub struct AsyncFile {
    pub path: PathBuf,
    pub base: Option<PathBuf>,
    pub contents: AsyncContents,
}

impl AsyncFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base: None,
            contents: AsyncContents::Null,
        }
    }

    pub fn with_bytes(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            base: None,
            contents: AsyncContents::Buffer(bytes.into()),
        }
    }

    pub fn with_reader(
        path: impl Into<PathBuf>,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            base: None,
            contents: AsyncContents::Stream(Box::new(reader)),
        }
    }

    pub fn in_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// The normalized, base-relative path used as the expectation key.
    pub fn relative_path(&self) -> String {
        relative_to(&self.path, self.base.as_deref())
    }
}
