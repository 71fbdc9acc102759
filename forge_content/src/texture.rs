//! Encoder that packs source images into the binary texture format.
//!
//! ## Binary layout (little-endian, after the [`PackedHeader`])
//!
//! | Field     | Type | Description                                    |
//! |-----------|------|------------------------------------------------|
//! | format    | u32  | [`TextureFormat`] wire value (sRGB resolved)   |
//! | width     | u32  | base level width                               |
//! | height    | u32  | base level height                              |
//! | wrap_x    | u32  | [`TextureWrap`] wire value                     |
//! | wrap_y    | u32  | [`TextureWrap`] wire value                     |
//! | filter    | u32  | [`TextureFilter`] wire value                   |
//! | mip_count | u32  | payload blocks that follow                     |
//!
//! One payload block per mip level follows, finest first. A block holds
//! `channels * width * height` bytes for the level's dimensions; every level
//! halves the previous dimensions (minimum 1).
//!
//! ## Metadata schema
//!
//! Version 2 (current): `format`, `wrap_x`, `wrap_y`, `filter` (canonical
//! names, case-sensitive), `srgb` (bool), `generate_mipmaps` (bool).
//! Version 1 had a single `wrap` applied to both axes and no `srgb` flag;
//! the 1 -> 2 migration splits the key and adds the flag at its default.

use std::path::Path;

use forge_shared::{
    log::{info, trace},
    byteorder::{LittleEndian, WriteBytesExt},
    texture::{count_channels, count_mip_levels, resolve_format, TextureFilter, TextureFormat, TextureWrap},
};
use image::{imageops, imageops::FilterType, GenericImageView, RgbaImage};

use crate::{
    common::{Error, Result},
    encoder::{check_current_version, Encoder},
    meta_table::{MetaTable, VERSION_KEY},
    packed_file::{self, AssetKind, PackedHeader},
};

pub const TEXTURE_ENCODER_VERSION: u32 = 2;

pub const KEY_FORMAT: &str = "format";
pub const KEY_WRAP_X: &str = "wrap_x";
pub const KEY_WRAP_Y: &str = "wrap_y";
pub const KEY_FILTER: &str = "filter";
pub const KEY_SRGB: &str = "srgb";
pub const KEY_GENERATE_MIPMAPS: &str = "generate_mipmaps";

/// Key under which version 1 stored the wrap mode for both axes.
const KEY_WRAP_V1: &str = "wrap";

/// Packs image sources into the binary texture format.
pub struct TextureEncoder;

impl Encoder for TextureEncoder {
    fn current_version(&self) -> u32 {
        TEXTURE_ENCODER_VERSION
    }

    fn get_default(&self) -> MetaTable {
        let mut metadata = MetaTable::new();
        metadata.set_value(VERSION_KEY, TEXTURE_ENCODER_VERSION);
        metadata.set_value(KEY_FORMAT, TextureFormat::Rgba8.name());
        metadata.set_value(KEY_WRAP_X, TextureWrap::Clamp.name());
        metadata.set_value(KEY_WRAP_Y, TextureWrap::Clamp.name());
        metadata.set_value(KEY_FILTER, TextureFilter::Trilinear.name());
        metadata.set_value(KEY_SRGB, false);
        metadata.set_value(KEY_GENERATE_MIPMAPS, true);
        metadata
    }

    fn validate(&self, metadata: &MetaTable, loaded_version: u32) -> Result<()> {
        check_current_version(loaded_version, TEXTURE_ENCODER_VERSION)?;
        for key in [KEY_FORMAT, KEY_WRAP_X, KEY_WRAP_Y, KEY_FILTER, KEY_SRGB, KEY_GENERATE_MIPMAPS] {
            if !metadata.has_setting(key) {
                return Err(Error::Validation(format!("missing setting '{key}'")));
            }
        }
        source_format(metadata)?;
        parse_wrap(metadata, KEY_WRAP_X)?;
        parse_wrap(metadata, KEY_WRAP_Y)?;
        parse_filter(metadata)?;
        Ok(())
    }

    fn upgrade(&self, metadata: &mut MetaTable, loaded_version: u32) -> Result<()> {
        if loaded_version == 0 || loaded_version > TEXTURE_ENCODER_VERSION {
            return Err(Error::Version {
                found: loaded_version,
                current: TEXTURE_ENCODER_VERSION,
            });
        }
        for version in loaded_version..TEXTURE_ENCODER_VERSION {
            match version {
                // 1 -> 2: the single "wrap" split into "wrap_x"/"wrap_y"; "srgb" was introduced.
                1 => {
                    let wrap = if metadata.has_setting(KEY_WRAP_V1) {
                        metadata.get_string(KEY_WRAP_V1)
                    } else {
                        TextureWrap::Clamp.name().to_owned()
                    };
                    metadata.remove(KEY_WRAP_V1);
                    metadata.set_value(KEY_WRAP_X, wrap.as_str());
                    metadata.set_value(KEY_WRAP_Y, wrap);
                    metadata.set_default_value(KEY_SRGB, false);
                }
                _ => unreachable!("no migration from version {version}"),
            }
            metadata.set_value(VERSION_KEY, version + 1);
        }
        Ok(())
    }

    fn convert(&self, source: &Path, destination: &Path, metadata: &MetaTable) -> Result<()> {
        info!("Packing texture '{}' into '{}'", source.display(), destination.display());

        let image = image::open(source)
            .map_err(|err| Error::Format(format!("failed to decode image '{}': {err}", source.display())))?;

        let format = source_format(metadata)?;
        let stored_format = resolve_format(format, metadata.get_bool(KEY_SRGB));
        let channels = count_channels(stored_format);
        let wrap_x = parse_wrap(metadata, KEY_WRAP_X)?;
        let wrap_y = parse_wrap(metadata, KEY_WRAP_Y)?;
        let filter = parse_filter(metadata)?;

        let (width, height) = image.dimensions();
        let mip_count = if metadata.get_bool(KEY_GENERATE_MIPMAPS) {
            count_mip_levels(width, height, filter)
        } else {
            1
        };
        trace!("Texture '{}' is {width}x{height} with {mip_count} mip levels", source.display());

        let base = image.to_rgba8();
        packed_file::write_atomically(destination, |writer| {
            PackedHeader::new(AssetKind::Texture, TEXTURE_ENCODER_VERSION).write(&mut *writer)?;
            writer.write_u32::<LittleEndian>(stored_format.to_u32())?;
            writer.write_u32::<LittleEndian>(width)?;
            writer.write_u32::<LittleEndian>(height)?;
            writer.write_u32::<LittleEndian>(wrap_x.to_u32())?;
            writer.write_u32::<LittleEndian>(wrap_y.to_u32())?;
            writer.write_u32::<LittleEndian>(filter.to_u32())?;
            writer.write_u32::<LittleEndian>(mip_count)?;

            let mut level = base;
            for level_index in 0..mip_count {
                write_level(&mut *writer, &level, channels)?;
                if level_index + 1 < mip_count {
                    let next_width = (level.width() / 2).max(1);
                    let next_height = (level.height() / 2).max(1);
                    level = imageops::resize(&level, next_width, next_height, FilterType::Triangle);
                }
            }
            Ok(())
        })
    }
}

/// Parses the metadata format and checks that it can be produced from an
/// image source. Only the 8-bit color formats can; depth and the wider
/// formats have no image-file representation in this pipeline.
fn source_format(metadata: &MetaTable) -> Result<TextureFormat> {
    let name = metadata.get_string(KEY_FORMAT);
    let format =
        TextureFormat::from_name(&name).ok_or_else(|| Error::Validation(format!("unknown texture format '{name}'")))?;
    if format.is_depth() {
        return Err(Error::Validation(format!(
            "depth format '{name}' cannot be encoded from an image source"
        )));
    }
    match format {
        TextureFormat::Rgb8 | TextureFormat::Rgba8 | TextureFormat::Srgb8 | TextureFormat::Srgba8 => Ok(format),
        _ => Err(Error::Validation(format!(
            "format '{name}' cannot be encoded from an 8-bit image source"
        ))),
    }
}

fn parse_wrap(metadata: &MetaTable, key: &str) -> Result<TextureWrap> {
    let name = metadata.get_string(key);
    TextureWrap::from_name(&name).ok_or_else(|| Error::Validation(format!("unknown wrap mode '{name}' in '{key}'")))
}

fn parse_filter(metadata: &MetaTable) -> Result<TextureFilter> {
    let name = metadata.get_string(KEY_FILTER);
    TextureFilter::from_name(&name).ok_or_else(|| Error::Validation(format!("unknown filter '{name}'")))
}

fn write_level(writer: &mut impl std::io::Write, level: &RgbaImage, channels: u32) -> Result<()> {
    if channels == 4 {
        writer.write_all(level.as_raw())?;
    } else {
        for pixel in level.pixels() {
            writer.write_all(&pixel.0[..3])?;
        }
    }
    Ok(())
}
