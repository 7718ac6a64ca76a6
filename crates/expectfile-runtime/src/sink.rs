//! Downstream sinks for the async stage.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::file::AsyncFile;
use crate::RuntimeError;

/// Receives every file after reconciliation.
#[async_trait]
pub trait FileSink: Send {
    async fn emit(&mut self, file: AsyncFile) -> Result<(), RuntimeError>;
}

#[async_trait]
impl FileSink for mpsc::Sender<AsyncFile> {
    async fn emit(&mut self, file: AsyncFile) -> Result<(), RuntimeError> {
        self.send(file)
            .await
            .map_err(|_| RuntimeError::DownstreamClosed)
    }
}

/// Collects forwarded files in arrival order.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub files: Vec<AsyncFile>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(AsyncFile::relative_path).collect()
    }
}

#[async_trait]
impl FileSink for CollectSink {
    async fn emit(&mut self, file: AsyncFile) -> Result<(), RuntimeError> {
        self.files.push(file);
        Ok(())
    }
}

/// Drops every file.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

#[async_trait]
impl FileSink for DiscardSink {
    async fn emit(&mut self, _file: AsyncFile) -> Result<(), RuntimeError> {
        Ok(())
    }
}
