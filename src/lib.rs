//! # widget-loader
//!
//! Asynchronous content loading for UI widgets.
//!
//! A [`Loader`](loader::Loader) is attached to a widget (its [`Target`](target::Target)).
//! Given an address it fetches data through a [`Transport`](transport::Transport),
//! merges request parameters across calls, optionally shows a busy
//! [`Mask`](mask::Mask) over the widget and writes the rendered result into a
//! named attribute of the target. Failures are routed to a callback.
//!
//! ## Core Concepts
//!
//! - [`LoaderConfig`](config::LoaderConfig): the declarative options, loadable from JSON
//! - [`LoaderBuilder`](loader::LoaderBuilder): attaches the target, transport, mask factory and callbacks
//! - [`Target`](target::Target): the widget receiving the result, with [`WidgetTarget`](target::WidgetTarget) as an in-memory implementation
//! - [`Transport`](transport::Transport): the request contract, with [`FileTransport`](transport::FileTransport) reading local files
//! - [`Mask`](mask::Mask)/[`MaskFactory`](mask::MaskFactory): the busy indicator
//!
//! Everything is single threaded: requests are spawned with
//! `tokio::task::spawn_local` and complete on the same [`tokio::task::LocalSet`].

pub mod config;
pub mod error;
pub mod loader;
pub mod mask;
pub mod params;
pub mod target;
pub mod transport;
mod utils;

pub use utils::log_error;

/// Prelude module that re-exports commonly used types and traits.
///
/// ```rust
/// use widget_loader::prelude::*;
/// ```
pub mod prelude {
    pub use super::config::{LazyLoad, LoaderConfig, Method, RequestOptions};
    pub use super::error::{ConfigError, LoaderError, RenderError, TransportError};
    pub use super::loader::{LoadHandle, Loader, LoaderBuilder};
    pub use super::mask::{LogMaskFactory, Mask, MaskConfig, MaskFactory, MaskOptions};
    pub use super::params::{to_params, Params};
    pub use super::target::{Target, WidgetTarget};
    pub use super::transport::{FileTransport, Request, Transport};
}
