//! The conversion capability.
//!
//! [`Converter`] is the seam between the queue and whatever actually decodes
//! HEIC. [`HeifConverter`] is the production implementation backed by
//! `heicdrop-codec`.

use async_trait::async_trait;
use bytes::Bytes;
use heicdrop_codec::{quality_percent, HeifDecoder};
use heicdrop_common::paths::JPEG_MEDIA_TYPE;
use std::path::PathBuf;

/// Quality factor requested for every conversion, on a 0-1 scale.
pub const TARGET_QUALITY: f32 = 0.92;

/// Message used when a failure carries no usable cause.
pub const UNSUPPORTED_MESSAGE: &str = "This file type may not be supported.";

/// Output encodings a converter can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
}

impl TargetFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Jpeg => JPEG_MEDIA_TYPE,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutput {
    Single(Bytes),
    /// The source held several top-level images, primary first.
    Multiple(Vec<Bytes>),
}

impl ConversionOutput {
    /// The image to keep. Only the first of several images is used.
    pub fn into_primary(self) -> Option<Bytes> {
        match self {
            Self::Single(bytes) => Some(bytes),
            Self::Multiple(images) => images.into_iter().next(),
        }
    }
}

/// A conversion failure with an optional human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct ConvertError {
    cause: Option<String>,
}

impl ConvertError {
    /// A failure with a cause. Blank causes count as no cause.
    pub fn new(cause: impl Into<String>) -> Self {
        let cause = cause.into();
        let cause = cause.trim();
        Self {
            cause: (!cause.is_empty()).then(|| cause.to_string()),
        }
    }

    /// A failure with no known cause.
    pub fn unknown() -> Self {
        Self { cause: None }
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// The cause, or [`UNSUPPORTED_MESSAGE`] when there is none.
    pub fn message(&self) -> &str {
        self.cause.as_deref().unwrap_or(UNSUPPORTED_MESSAGE)
    }
}

impl From<heicdrop_codec::Error> for ConvertError {
    fn from(err: heicdrop_codec::Error) -> Self {
        match err.cause() {
            Some(cause) => Self::new(cause),
            None => Self::unknown(),
        }
    }
}

/// Transcodes source image bytes to a target format.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(
        &self,
        source: Bytes,
        target: TargetFormat,
        quality: f32,
    ) -> Result<ConversionOutput, ConvertError>;
}

/// Converter backed by libheif's command-line decoder.
///
/// The decoder is located on every call, so installing libheif while a drop
/// folder is being watched takes effect without a restart.
#[derive(Debug, Clone, Default)]
pub struct HeifConverter {
    configured: Option<PathBuf>,
}

impl HeifConverter {
    /// `configured` overrides the `PATH` lookup of `heif-dec`/`heif-convert`.
    pub fn new(configured: Option<PathBuf>) -> Self {
        Self { configured }
    }
}

#[async_trait]
impl Converter for HeifConverter {
    async fn convert(
        &self,
        source: Bytes,
        target: TargetFormat,
        quality: f32,
    ) -> Result<ConversionOutput, ConvertError> {
        // PATH lookup and existence checks touch the filesystem
        let configured = self.configured.clone();
        let decoder =
            tokio::task::spawn_blocking(move || HeifDecoder::discover(configured.as_deref()))
                .await
                .map_err(|e| ConvertError::new(e.to_string()))??;
        tracing::debug!(
            "Converting {} bytes to {} with {}",
            source.len(),
            target.media_type(),
            decoder.tool().display()
        );

        let image = match target {
            TargetFormat::Jpeg => decoder.to_jpeg(&source, quality_percent(quality)).await?,
        };

        Ok(ConversionOutput::Single(Bytes::from(image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_primary() {
        let single = ConversionOutput::Single(Bytes::from_static(b"one"));
        assert_eq!(single.into_primary(), Some(Bytes::from_static(b"one")));

        let multiple = ConversionOutput::Multiple(vec![
            Bytes::from_static(b"first"),
            Bytes::from_static(b"second"),
        ]);
        assert_eq!(multiple.into_primary(), Some(Bytes::from_static(b"first")));

        assert_eq!(ConversionOutput::Multiple(vec![]).into_primary(), None);
    }

    #[test]
    fn test_convert_error_message() {
        assert_eq!(ConvertError::new("bad header").message(), "bad header");
        assert_eq!(ConvertError::new("  \n").message(), UNSUPPORTED_MESSAGE);
        assert_eq!(ConvertError::unknown().to_string(), UNSUPPORTED_MESSAGE);
        assert_eq!(ConvertError::unknown().cause(), None);
    }

    #[test]
    fn test_convert_error_from_codec() {
        let err = ConvertError::from(heicdrop_codec::Error::tool_failed("heif-dec", "bad header"));
        assert_eq!(err.message(), "bad header");

        let err = ConvertError::from(heicdrop_codec::Error::NoOutput {
            tool: "heif-dec".to_string(),
        });
        assert_eq!(err.message(), UNSUPPORTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_heif_converter_missing_decoder() {
        let converter = HeifConverter::new(Some(PathBuf::from("/nonexistent/heif-dec")));
        let err = converter
            .convert(Bytes::from_static(b"x"), TargetFormat::Jpeg, TARGET_QUALITY)
            .await
            .unwrap_err();
        assert!(err.message().contains("/nonexistent/heif-dec"));
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "current_thread")]
    async fn test_heif_converter_returns_single_jpeg() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([9, 9, 9]))
            .save_with_format(&fixture, image::ImageFormat::Png)
            .unwrap();
        let script = dir.path().join("fake-heif-dec");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncp '{}' \"$2\"\n", fixture.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let converter = HeifConverter::new(Some(script));
        let output = converter
            .convert(Bytes::from_static(b"x"), TargetFormat::Jpeg, TARGET_QUALITY)
            .await
            .unwrap();
        let ConversionOutput::Single(jpeg) = output else {
            panic!("expected a single image");
        };
        assert_eq!(
            image::guess_format(&jpeg).unwrap(),
            image::ImageFormat::Jpeg
        );
    }
}
