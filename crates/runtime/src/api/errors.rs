//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and configuration so clients can
//! bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use autocast_core::ConfigError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("automation worker command channel closed")]
    CommandChannelClosed,

    #[error("automation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("automation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a host to be configured before building")]
    MissingHost,

    #[error("invalid controller configuration")]
    InvalidConfig(#[source] ConfigError),

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}
