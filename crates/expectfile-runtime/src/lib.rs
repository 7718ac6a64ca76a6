//! # expectfile-runtime
//!
//! Async pipeline stage for expectfile.
//!
//! `expectfile-core` reconciles files synchronously. This crate puts the
//! same reconciler inside an async file stream whose contents may be
//! `tokio` readers, draining a body only when a content matcher needs it.
//!
//! ## Ordering
//!
//! Files are processed strictly one at a time in arrival order. Draining a
//! streamed body is the only await point, and by default it has no timeout:
//! a body that never completes stalls the run. Set
//! [`RuntimeConfig::drain_timeout`] to bound it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use expectfile_runtime::{PipelineStage, RuntimeConfig, CollectSink};
//!
//! let stage = PipelineStage::new(reconciler, RuntimeConfig::new().with_drain_timeout_str("30s")?);
//! let mut sink = CollectSink::new();
//! let report = stage.run(upstream, &mut sink).await?;
//! ```

use std::error::Error as StdError;

use thiserror::Error;

use expectfile_core::EngineError;

pub mod config;
pub mod file;
pub mod sink;
pub mod stage;

pub use config::RuntimeConfig;
pub use file::{AsyncContents, AsyncFile};
pub use sink::{CollectSink, DiscardSink, FileSink};
pub use stage::PipelineStage;

/// Errors from the async stage.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// An upstream producer error, passed through unchanged.
    #[error(transparent)]
    Upstream(Box<dyn StdError + Send + Sync>),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Downstream receiver closed")]
    DownstreamClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_message_passes_through() {
        let err: RuntimeError = EngineError::Failed { count: 3 }.into();
        assert_eq!(err.to_string(), "Failed 3 expectations");
    }
}
