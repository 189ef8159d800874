//! Source-format detection and output naming.
//!
//! A file qualifies as HEIC when its name ends in `.heic` (any case) or its
//! declared media type is `image/heic`. Declared media types for files on disk
//! come from [`sniff_media_type`], which reads the ISO-BMFF `ftyp` box.

/// Extension of the accepted source format, without the dot.
pub const HEIC_EXTENSION: &str = "heic";

/// Canonical media type of the accepted source format.
pub const HEIC_MEDIA_TYPE: &str = "image/heic";

/// Extension given to converted output files, without the dot.
pub const JPEG_EXTENSION: &str = "jpeg";

/// Media type of converted output.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// `ftyp` brands that identify HEVC-coded HEIF still images and sequences.
const HEIC_BRANDS: &[&[u8; 4]] = &[b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx"];

/// Check if a file name ends with the HEIC extension, ignoring case.
///
/// # Examples
///
/// ```
/// use heicdrop_common::paths::has_heic_extension;
///
/// assert!(has_heic_extension("IMG_0001.heic"));
/// assert!(has_heic_extension("IMG_0001.HEIC"));
/// assert!(!has_heic_extension("IMG_0001.heif"));
/// assert!(!has_heic_extension("heic"));
/// ```
pub fn has_heic_extension(name: &str) -> bool {
    name.to_lowercase().ends_with(".heic")
}

/// Check if a declared media type is exactly the canonical HEIC type.
pub fn is_heic_media_type(media_type: Option<&str>) -> bool {
    media_type == Some(HEIC_MEDIA_TYPE)
}

/// Derive the converted file name from a source file name.
///
/// Everything from the last `.` onwards is replaced with `.jpeg`. Names with no
/// `.`, or whose only `.` is the first character, keep their full name.
///
/// # Examples
///
/// ```
/// use heicdrop_common::paths::output_file_name;
///
/// assert_eq!(output_file_name("photo.heic"), "photo.jpeg");
/// assert_eq!(output_file_name("holiday.2024.HEIC"), "holiday.2024.jpeg");
/// assert_eq!(output_file_name("scan"), "scan.jpeg");
/// assert_eq!(output_file_name(".heic"), ".heic.jpeg");
/// ```
pub fn output_file_name(source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(idx) if idx > 0 => &source_name[..idx],
        _ => source_name,
    };
    format!("{}.{}", stem, JPEG_EXTENSION)
}

/// Guess the media type of a file from its leading bytes.
///
/// Returns `Some("image/heic")` when the first box is an `ftyp` box whose major
/// or compatible brands include a HEIC brand. Only the first box is inspected;
/// pass at least its first 32 bytes for reliable results.
pub fn sniff_media_type(header: &[u8]) -> Option<&'static str> {
    if header.len() < 12 || &header[4..8] != b"ftyp" {
        return None;
    }

    let box_size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let end = if box_size == 0 {
        header.len()
    } else {
        box_size.min(header.len())
    };

    // major brand at 8..12, minor version at 12..16, compatible brands after
    let mut brands = vec![&header[8..12]];
    let mut offset = 16;
    while offset + 4 <= end {
        brands.push(&header[offset..offset + 4]);
        offset += 4;
    }

    brands
        .iter()
        .any(|brand| HEIC_BRANDS.iter().any(|known| &known[..] == *brand))
        .then_some(HEIC_MEDIA_TYPE)
}
