use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Rejections raised while validating a [`LoaderConfig`](crate::config::LoaderConfig)
/// or assembling a [`Loader`](crate::loader::Loader).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("result property must not be empty")]
    EmptyResultProperty,
    #[error("request kind must not be empty")]
    EmptyRequestKind,
    #[error("lazy load trigger event must not be empty")]
    EmptyTriggerEvent,
    #[error("a transport is required to build a loader")]
    MissingTransport,
    #[error("a load mask is configured but no mask factory was provided")]
    MissingMaskFactory,
}

/// Failure reported by a [`Renderer`](crate::loader::Renderer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("renderer failed: {0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The raw failure payload of a transport.
///
/// The loader never interprets it: it is forwarded untouched to the
/// `on_failure` callback together with the parameters of the failed request.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("request failed ({status_text})")]
pub struct TransportError {
    /// Protocol status code, when the transport has one
    pub status: Option<u16>,
    /// Short textual classification such as `"error"`, `"timeout"` or `"parsererror"`
    pub status_text: String,
    /// Human readable description of the underlying failure
    pub message: Option<String>,
    /// Whatever body came back with the failure
    pub body: Option<Value>,
}

impl TransportError {
    pub fn new(status_text: impl Into<String>) -> Self {
        Self {
            status: None,
            status_text: status_text.into(),
            message: None,
            body: None,
        }
    }
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The success path had a value to write but the target is gone or was never set
    #[error("target is not available, cannot write property `{0}`")]
    TargetUnavailable(String),
}

pub type Result<T, E = LoaderError> = core::result::Result<T, E>;
