//! Symbolic texture options and the facts derived from them.
//!
//! The encoders resolve metadata strings like "Trilinear" or "RGBA_8" through
//! these types before writing a packed texture, and the runtime resolves the
//! numeric values it finds in a packed header back through the same types.
//! Both sides therefore agree on channel counts, mip chains and wire values
//! without depending on each other.

use serde::{Deserialize, Serialize};

/// Pixel format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
    Rgb8,
    Rgb16,
    Rgb16F,
    Rgb32,
    Rgb32F,
    Rgba8,
    Rgba16,
    Rgba16F,
    Rgba32,
    Rgba32F,
    Depth24,
    Srgb8,
    Srgba8,
}

impl TextureFormat {
    /// Parses the canonical, case-sensitive name of a [`TextureFormat`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use forge_shared::texture::TextureFormat;
    /// assert_eq!(TextureFormat::from_name("RGBA_8"), Some(TextureFormat::Rgba8));
    /// assert_eq!(TextureFormat::from_name("rgba_8"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RGB_8" => Some(Self::Rgb8),
            "RGB_16" => Some(Self::Rgb16),
            "RGB_16F" => Some(Self::Rgb16F),
            "RGB_32" => Some(Self::Rgb32),
            "RGB_32F" => Some(Self::Rgb32F),
            "RGBA_8" => Some(Self::Rgba8),
            "RGBA_16" => Some(Self::Rgba16),
            "RGBA_16F" => Some(Self::Rgba16F),
            "RGBA_32" => Some(Self::Rgba32),
            "RGBA_32F" => Some(Self::Rgba32F),
            "DEPTH_24" => Some(Self::Depth24),
            "sRGB_8" => Some(Self::Srgb8),
            "sRGBA_8" => Some(Self::Srgba8),
            _ => None,
        }
    }

    /// Returns the canonical name, the inverse of [`TextureFormat::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rgb8 => "RGB_8",
            Self::Rgb16 => "RGB_16",
            Self::Rgb16F => "RGB_16F",
            Self::Rgb32 => "RGB_32",
            Self::Rgb32F => "RGB_32F",
            Self::Rgba8 => "RGBA_8",
            Self::Rgba16 => "RGBA_16",
            Self::Rgba16F => "RGBA_16F",
            Self::Rgba32 => "RGBA_32",
            Self::Rgba32F => "RGBA_32F",
            Self::Depth24 => "DEPTH_24",
            Self::Srgb8 => "sRGB_8",
            Self::Srgba8 => "sRGBA_8",
        }
    }

    /// Stable value written into packed texture headers.
    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Rgb8 => 0,
            Self::Rgb16 => 1,
            Self::Rgb16F => 2,
            Self::Rgb32 => 3,
            Self::Rgb32F => 4,
            Self::Rgba8 => 5,
            Self::Rgba16 => 6,
            Self::Rgba16F => 7,
            Self::Rgba32 => 8,
            Self::Rgba32F => 9,
            Self::Depth24 => 10,
            Self::Srgb8 => 11,
            Self::Srgba8 => 12,
        }
    }

    /// Inverse of [`TextureFormat::to_u32`].
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Rgb8),
            1 => Some(Self::Rgb16),
            2 => Some(Self::Rgb16F),
            3 => Some(Self::Rgb32),
            4 => Some(Self::Rgb32F),
            5 => Some(Self::Rgba8),
            6 => Some(Self::Rgba16),
            7 => Some(Self::Rgba16F),
            8 => Some(Self::Rgba32),
            9 => Some(Self::Rgba32F),
            10 => Some(Self::Depth24),
            11 => Some(Self::Srgb8),
            12 => Some(Self::Srgba8),
            _ => None,
        }
    }

    /// Checks whether this is one of the depth formats.
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::Depth24)
    }
}

/// Wrap behavior of a texture along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureWrap {
    Clamp,
    ClampWithBorder,
    Repeat,
    RepeatMirrored,
    RepeatMirroredOnce,
}

impl TextureWrap {
    /// Parses the canonical, case-sensitive name of a [`TextureWrap`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Clamp" => Some(Self::Clamp),
            "ClampWithBorder" => Some(Self::ClampWithBorder),
            "Repeat" => Some(Self::Repeat),
            "RepeatMirrored" => Some(Self::RepeatMirrored),
            "RepeatMirroredOnce" => Some(Self::RepeatMirroredOnce),
            _ => None,
        }
    }

    /// Returns the canonical name, the inverse of [`TextureWrap::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clamp => "Clamp",
            Self::ClampWithBorder => "ClampWithBorder",
            Self::Repeat => "Repeat",
            Self::RepeatMirrored => "RepeatMirrored",
            Self::RepeatMirroredOnce => "RepeatMirroredOnce",
        }
    }

    /// Stable value written into packed texture headers.
    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Clamp => 0,
            Self::ClampWithBorder => 1,
            Self::Repeat => 2,
            Self::RepeatMirrored => 3,
            Self::RepeatMirroredOnce => 4,
        }
    }

    /// Inverse of [`TextureWrap::to_u32`].
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Clamp),
            1 => Some(Self::ClampWithBorder),
            2 => Some(Self::Repeat),
            3 => Some(Self::RepeatMirrored),
            4 => Some(Self::RepeatMirroredOnce),
            _ => None,
        }
    }
}

/// Sampling filter of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFilter {
    Point,
    Linear,
    Bilinear,
    Trilinear,
}

impl TextureFilter {
    /// Parses the canonical, case-sensitive name of a [`TextureFilter`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(Self::Point),
            "Linear" => Some(Self::Linear),
            "Bilinear" => Some(Self::Bilinear),
            "Trilinear" => Some(Self::Trilinear),
            _ => None,
        }
    }

    /// Returns the canonical name, the inverse of [`TextureFilter::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Linear => "Linear",
            Self::Bilinear => "Bilinear",
            Self::Trilinear => "Trilinear",
        }
    }

    /// Stable value written into packed texture headers.
    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Point => 0,
            Self::Linear => 1,
            Self::Bilinear => 2,
            Self::Trilinear => 3,
        }
    }

    /// Inverse of [`TextureFilter::to_u32`].
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Point),
            1 => Some(Self::Linear),
            2 => Some(Self::Bilinear),
            3 => Some(Self::Trilinear),
            _ => None,
        }
    }
}

/// Returns the number of color channels of the given [`TextureFormat`].
pub fn count_channels(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::Depth24 => 1,
        TextureFormat::Rgb8
        | TextureFormat::Rgb16
        | TextureFormat::Rgb16F
        | TextureFormat::Rgb32
        | TextureFormat::Rgb32F
        | TextureFormat::Srgb8 => 3,
        TextureFormat::Rgba8
        | TextureFormat::Rgba16
        | TextureFormat::Rgba16F
        | TextureFormat::Rgba32
        | TextureFormat::Rgba32F
        | TextureFormat::Srgba8 => 4,
    }
}

/// Checks whether the given [`TextureFilter`] samples from mip levels beyond the base level.
pub fn uses_mip_maps(filter: TextureFilter) -> bool {
    matches!(filter, TextureFilter::Trilinear)
}

/// Returns the number of mip levels of a full chain for the given dimensions.
///
/// Non-mipmapping filters only ever sample the base level, so the count is 1 for them.
///
/// # Examples
///
/// ```
/// # use forge_shared::texture::{count_mip_levels, TextureFilter};
/// assert_eq!(count_mip_levels(256, 256, TextureFilter::Trilinear), 9);
/// assert_eq!(count_mip_levels(256, 256, TextureFilter::Point), 1);
/// ```
pub fn count_mip_levels(width: u32, height: u32, filter: TextureFilter) -> u32 {
    if !uses_mip_maps(filter) {
        return 1;
    }
    let extent = width.max(height).max(1);
    // floor(log2(extent)) + 1
    32 - extent.leading_zeros()
}

/// Folds the sRGB metadata flag into the stored format.
pub fn resolve_format(format: TextureFormat, srgb: bool) -> TextureFormat {
    if !srgb {
        return format;
    }
    match format {
        TextureFormat::Rgb8 => TextureFormat::Srgb8,
        TextureFormat::Rgba8 => TextureFormat::Srgba8,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts() {
        assert_eq!(count_channels(TextureFormat::Depth24), 1);
        assert_eq!(count_channels(TextureFormat::Rgb8), 3);
        assert_eq!(count_channels(TextureFormat::Srgb8), 3);
        assert_eq!(count_channels(TextureFormat::Rgba32F), 4);
        assert_eq!(count_channels(TextureFormat::Srgba8), 4);
    }

    #[test]
    fn mip_levels() {
        assert_eq!(count_mip_levels(256, 256, TextureFilter::Trilinear), 9);
        assert_eq!(count_mip_levels(256, 256, TextureFilter::Point), 1);
        assert_eq!(count_mip_levels(256, 256, TextureFilter::Bilinear), 1);
        assert_eq!(count_mip_levels(512, 64, TextureFilter::Trilinear), 10);
        assert_eq!(count_mip_levels(1, 1, TextureFilter::Trilinear), 1);
        assert_eq!(count_mip_levels(3, 2, TextureFilter::Trilinear), 2);
    }

    #[test]
    fn name_parsing_is_case_sensitive() {
        assert_eq!(TextureWrap::from_name("Clamp"), Some(TextureWrap::Clamp));
        assert_eq!(TextureWrap::from_name("clamp"), None);
        assert_eq!(TextureFilter::from_name("Trilinear"), Some(TextureFilter::Trilinear));
        assert_eq!(TextureFilter::from_name("TRILINEAR"), None);
        assert_eq!(TextureFormat::from_name("sRGBA_8"), Some(TextureFormat::Srgba8));
        assert_eq!(TextureFormat::from_name("SRGBA_8"), None);
    }

    #[test]
    fn names_round_trip() {
        for value in 0.. {
            let Some(format) = TextureFormat::from_u32(value) else {
                break;
            };
            assert_eq!(TextureFormat::from_name(format.name()), Some(format));
            assert_eq!(format.to_u32(), value);
        }
        for value in 0.. {
            let Some(wrap) = TextureWrap::from_u32(value) else {
                break;
            };
            assert_eq!(TextureWrap::from_name(wrap.name()), Some(wrap));
            assert_eq!(wrap.to_u32(), value);
        }
        for value in 0.. {
            let Some(filter) = TextureFilter::from_u32(value) else {
                break;
            };
            assert_eq!(TextureFilter::from_name(filter.name()), Some(filter));
            assert_eq!(filter.to_u32(), value);
        }
    }

    #[test]
    fn srgb_resolution() {
        assert_eq!(resolve_format(TextureFormat::Rgb8, true), TextureFormat::Srgb8);
        assert_eq!(resolve_format(TextureFormat::Rgba8, true), TextureFormat::Srgba8);
        assert_eq!(resolve_format(TextureFormat::Rgba8, false), TextureFormat::Rgba8);
        assert_eq!(resolve_format(TextureFormat::Rgba16F, true), TextureFormat::Rgba16F);
    }
}
