//! JPEG encoding.

use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::Path;

/// Convert a 0.0-1.0 quality factor to the encoder's 1-100 scale.
///
/// # Examples
///
/// ```
/// use heicdrop_codec::quality_percent;
///
/// assert_eq!(quality_percent(0.92), 92);
/// assert_eq!(quality_percent(0.0), 1);
/// assert_eq!(quality_percent(3.0), 100);
/// ```
pub fn quality_percent(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 100;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode an image as baseline JPEG.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
        encoder.encode_image(&rgb)?;
    }
    Ok(buf)
}

/// Load a decoded image from disk and encode it as JPEG.
pub fn transcode_file(path: &Path, quality: u8) -> Result<Vec<u8>> {
    let img = image::open(path)?;
    encode_jpeg(&img, quality)
}
