//! Heicdrop-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across heicdrop:
//!
//! - **Typed IDs**: Queue entry identifiers and the dedup key used to suppress
//!   duplicate concurrent conversions
//! - **Core Types**: Entry status, notice kinds, and intake trigger sources
//! - **Path Utilities**: Source-format detection by name, media type, and
//!   file signature, plus output name derivation
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use heicdrop_common::{DedupKey, EntryStatus, Error, Result};
//! use heicdrop_common::paths::{has_heic_extension, output_file_name};
//!
//! let key = DedupKey::new("photo.heic", 1_700_000_000_000);
//! assert_eq!(key.to_string(), "photo.heic-1700000000000");
//!
//! assert!(EntryStatus::Complete.is_terminal());
//!
//! assert!(has_heic_extension("IMG_0001.HEIC"));
//! assert_eq!(output_file_name("IMG_0001.HEIC"), "IMG_0001.jpeg");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("photo.heic"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
