//! Streams a remote text file into a display, chunk by chunk, with
//! pause/resume over HTTP byte ranges.
//!
//! A [`DownloadController`] owns the session and runs one background loop at
//! a time. The loop reports through [`DownloadEvent`]s on a channel; the UI
//! side applies them to a [`DisplaySink`] with [`display::dispatch`].

pub mod api;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod source;

pub use config::ViewerConfig;
pub use display::{DisplaySink, Transcript};
pub use engine::controller::DownloadController;
pub use engine::decode::DecodePolicy;
pub use engine::events::DownloadEvent;
pub use error::DownloadError;
pub use source::http_source::HttpSource;
pub use source::traits::TextSource;
