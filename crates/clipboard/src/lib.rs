//! Clipboard fragment orchestration.
//!
//! A web office suite's clipboard service hands out short-lived URLs to
//! clipboard fragments. [`ClipboardClient`] checks that a URL points at an
//! allow-listed host, downloads the fragment once and runs it through
//! [`ppt_pptx::PowerPointProcessor`].

pub mod client;
pub mod config;

pub use client::ClipboardClient;
pub use config::ClipboardConfig;
