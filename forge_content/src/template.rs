//! Encoder for opaque template assets.
//!
//! Templates are authored as arbitrary files that the runtime interprets
//! itself. The encoder only frames the source bytes with a [`PackedHeader`]
//! so that the loader-side kind and version checks apply, the payload is
//! copied through unchanged.

use std::{fs::File, io::BufReader, path::Path};

use forge_shared::log::info;

use crate::{
    common::Result,
    encoder::{check_current_version, Encoder},
    meta_table::{MetaTable, VERSION_KEY},
    packed_file::{self, AssetKind, PackedHeader},
};

pub const TEMPLATE_ENCODER_VERSION: u32 = 1;

/// Passes template sources through behind the packed file frame.
pub struct TemplateEncoder;

impl Encoder for TemplateEncoder {
    fn current_version(&self) -> u32 {
        TEMPLATE_ENCODER_VERSION
    }

    fn get_default(&self) -> MetaTable {
        let mut metadata = MetaTable::new();
        metadata.set_value(VERSION_KEY, TEMPLATE_ENCODER_VERSION);
        metadata
    }

    fn validate(&self, _metadata: &MetaTable, loaded_version: u32) -> Result<()> {
        check_current_version(loaded_version, TEMPLATE_ENCODER_VERSION)
    }

    fn convert(&self, source: &Path, destination: &Path, metadata: &MetaTable) -> Result<()> {
        self.validate(metadata, metadata.version()?)?;
        info!("Packing template '{}' into '{}'", source.display(), destination.display());
        let mut reader = BufReader::new(File::open(source)?);
        packed_file::write_atomically(destination, |writer| {
            PackedHeader::new(AssetKind::Template, TEMPLATE_ENCODER_VERSION).write(&mut *writer)?;
            std::io::copy(&mut reader, writer)?;
            Ok(())
        })
    }
}
