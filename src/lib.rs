//! heicdrop - HEIC to JPEG conversion queue
//!
//! This library crate exposes the intake gateway, the conversion queue, and
//! the capabilities they drive, for the CLI and for integration testing.

pub mod config;
pub mod convert;
pub mod display;
pub mod intake;
pub mod notifications;
pub mod queue;
pub mod save;
pub mod source;
pub mod watch;
