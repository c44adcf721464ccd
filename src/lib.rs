//! hexlens - Byte-region classifier and windowed hex inspector
//!
//! This library provides shared functionality for hexlens (TUI inspector) and hlx (CLI tool).

pub mod app;
pub mod buffer;
pub mod cipher;
pub mod config;
pub mod edit;
pub mod encoding;
pub mod error;
pub mod region;
pub mod render;
pub mod session;
pub mod signature;
pub mod ui;
pub mod window;

pub use error::{InspectError, Result};
