//! Async pipeline stage.
//!
//! Wraps a [`Reconciler`] so it can sit in an async file stream. Files are
//! still processed one at a time in arrival order; the only await point per
//! file is draining a streamed body that a content matcher needs.

use std::error::Error as StdError;
use std::io::Cursor;
use std::mem;

use futures::{Stream, StreamExt};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use expectfile_core::{Probe, Reconciler, RunReport};

use crate::config::RuntimeConfig;
use crate::file::{AsyncContents, AsyncFile};
use crate::sink::FileSink;
use crate::RuntimeError;

/// Async pass-through stage around a reconciler.
pub struct PipelineStage {
    reconciler: Reconciler,
    config: RuntimeConfig,
}

impl PipelineStage {
    pub fn new(reconciler: Reconciler, config: RuntimeConfig) -> Self {
        Self { reconciler, config }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Drain a streamed body into a buffer in place.
    ///
    /// Returns the failure note when the read fails or times out. In that
    /// case the bytes read so far are chained in front of the rest of the
    /// reader, so downstream still sees the whole body.
    async fn drain(&self, contents: &mut AsyncContents) -> Result<(), String> {
        if !contents.is_stream() {
            return Ok(());
        }
        let AsyncContents::Stream(mut reader) = mem::replace(contents, AsyncContents::Null) else {
            return Ok(());
        };

        let mut bytes = Vec::new();
        let result = {
            let read = reader.read_to_end(&mut bytes);
            match self.config.drain_timeout {
                Some(limit) => match tokio::time::timeout(limit, read).await {
                    Ok(r) => r.map_err(|e| format!("read failed: {}", e)),
                    Err(_) => Err(format!(
                        "content drain timed out after {}",
                        humantime::format_duration(limit)
                    )),
                },
                None => read.await.map_err(|e| format!("read failed: {}", e)),
            }
        };

        match result {
            Ok(_) => {
                *contents = AsyncContents::Buffer(bytes);
                Ok(())
            }
            Err(reason) => {
                *contents = AsyncContents::Stream(Box::new(Cursor::new(bytes).chain(reader)));
                Err(reason)
            }
        }
    }

    /// Reconcile one file and hand it back.
    pub async fn process(&mut self, mut file: AsyncFile) -> Result<AsyncFile, RuntimeError> {
        let path = file.relative_path();

        if !self.reconciler.needs_content(&path) {
            self.reconciler.observe(&path, Probe::Absent)?;
            return Ok(file);
        }

        let drained = self.drain(&mut file.contents).await;
        match (drained, &file.contents) {
            (Err(reason), _) => {
                tracing::warn!(path = %path, reason = %reason, "Failed to drain file contents");
                self.reconciler.observe(&path, Probe::Unreadable(&reason))?;
            }
            (Ok(()), AsyncContents::Buffer(bytes)) => match std::str::from_utf8(bytes) {
                Ok(text) => self.reconciler.observe(&path, Probe::Text(text))?,
                Err(err) => {
                    let reason = format!("invalid UTF-8: {}", err);
                    tracing::warn!(path = %path, error = %err, "Content is not valid UTF-8");
                    self.reconciler.observe(&path, Probe::Unreadable(&reason))?;
                }
            },
            (Ok(()), _) => self.reconciler.observe(&path, Probe::Absent)?,
        }

        Ok(file)
    }

    /// End of input.
    pub fn finalize(mut self) -> Result<RunReport, RuntimeError> {
        Ok(self.reconciler.finalize()?)
    }

    /// Drive the stage over an upstream stream, forwarding every file to
    /// `sink`.
    ///
    /// An upstream error ends the run and is returned unchanged, without
    /// finalization.
    pub async fn run<S, E, K>(
        mut self,
        upstream: S,
        sink: &mut K,
    ) -> Result<RunReport, RuntimeError>
    where
        S: Stream<Item = Result<AsyncFile, E>>,
        E: Into<Box<dyn StdError + Send + Sync>>,
        K: FileSink + ?Sized,
    {
        futures::pin_mut!(upstream);

        while let Some(item) = upstream.next().await {
            let file = item.map_err(|e| RuntimeError::Upstream(e.into()))?;
            let file = self.process(file).await?;
            sink.emit(file).await?;
        }

        tracing::debug!("Upstream ended, finalizing");
        self.finalize()
    }

    /// Drive the stage between two channels.
    pub async fn run_channel<E>(
        self,
        mut upstream: mpsc::Receiver<Result<AsyncFile, E>>,
        mut downstream: mpsc::Sender<AsyncFile>,
    ) -> Result<RunReport, RuntimeError>
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let stream = futures::stream::poll_fn(move |cx| upstream.poll_recv(cx));
        self.run(stream, &mut downstream).await
    }
}
