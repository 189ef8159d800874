//! # heicdrop-codec
//!
//! HEIC decoding and JPEG encoding for heicdrop.
//!
//! Decoding is delegated to libheif's command-line decoder (`heif-dec` or
//! `heif-convert`), which writes a lossless PNG into a temporary
//! [`Workspace`]. The PNG is then loaded and encoded as JPEG in-process with
//! the `image` crate.
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use heicdrop_codec::{quality_percent, HeifDecoder};
//!
//! # async fn run() -> heicdrop_codec::Result<()> {
//! let decoder = HeifDecoder::discover(None)?;
//! let source = std::fs::read("IMG_0001.heic")?;
//! let jpeg = decoder.to_jpeg(&source, quality_percent(0.92)).await?;
//! std::fs::write("IMG_0001.jpeg", &jpeg)?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod heif;
pub mod jpeg;
pub mod tools;
pub mod workspace;

// Re-exports
pub use error::{Error, Result};
pub use heif::HeifDecoder;
pub use jpeg::{encode_jpeg, quality_percent};
pub use tools::{check_tool, check_tools, find_decoder, require_tool, ToolInfo};
pub use workspace::Workspace;
