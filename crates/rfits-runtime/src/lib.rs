#![forbid(unsafe_code)]

//! RapidFits Runtime
//!
//! This crate ties the pure state of `rfits-core` to the renderer and image
//! loader boundaries of `rfits-backend`.
//!
//! # Key Components
//!
//! - [`ViewerSession`] - owns view, stretch, interaction and histogram state
//! - [`CommandDispatch`] - fire-and-forget delivery with redundancy suppression
//! - [`RenderDispatcher`] - synchronous dispatch on the caller's thread
//! - [`ThreadedDispatcher`] / [`RenderThread`] - dispatch through a dedicated
//!   render thread with latest-wins coalescing
//! - [`ViewerConfig`] - every tunable, loadable from TOML/JSON (feature `config`)
//!
//! # How it fits in the system
//! Input events and slider values enter through the session. The session
//! updates its state with `rfits-core`, then pushes the result to the renderer
//! through a dispatcher. Widgets read the session's histogram and stretch to
//! draw the histogram panel.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod render_thread;
pub mod session;

pub use config::{DispatchConfig, ViewerConfig};
pub use dispatcher::{CommandDispatch, DispatchOutcome, DispatchStats, RenderDispatcher};
pub use error::{ConfigError, ViewerError};
pub use render_thread::{RenderMsg, RenderThread, SinkFailure, ThreadedDispatcher};
pub use session::{FileSelection, ViewerSession};
