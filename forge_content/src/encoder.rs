//! The conversion contract every asset kind implements, and the registry that
//! maps source file extensions to the encoder responsible for them.
//!
//! The canonical lifecycle for a single asset is:
//!
//! 1. obtain metadata from the existing sidecar, or [`Encoder::get_default`]
//! 2. when the loaded version differs from the current one, [`Encoder::upgrade`]
//! 3. [`Encoder::validate`]; abort for this asset when it fails
//! 4. [`Encoder::convert`]
//!
//! [`prepare_metadata`] implements steps 1-3 over a sidecar path so that every
//! driver runs them in the same order.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use forge_shared::log::info;

use crate::{
    common::{extract_extension_from_path, Error, Result},
    meta_table::{MetaTable, VERSION_KEY},
};

/// Converter for one asset kind.
///
/// Implementations are stateless over explicit arguments, which is what makes
/// it safe to run `convert` for distinct assets from parallel threads.
pub trait Encoder: Send + Sync {
    /// The schema generation this encoder writes.
    fn current_version(&self) -> u32;

    /// Returns a fresh metadata table carrying the current version under
    /// [`VERSION_KEY`] and every recognized option key at its default.
    fn get_default(&self) -> MetaTable;

    /// Checks that `loaded_version` is current and that every required key is
    /// present with a legal value. Must only be called after any required
    /// [`Encoder::upgrade`].
    fn validate(&self, metadata: &MetaTable, loaded_version: u32) -> Result<()>;

    /// Migrates `metadata` in place from `loaded_version` up to the current
    /// version, one generation at a time. Fails without touching the table
    /// when `loaded_version` is newer than current or not a known generation.
    ///
    /// The default implementation is for encoders without any migrations: it
    /// accepts the current version as a no-op and rejects everything else.
    fn upgrade(&self, metadata: &mut MetaTable, loaded_version: u32) -> Result<()> {
        let _ = metadata;
        check_current_version(loaded_version, self.current_version())
    }

    /// Reads the source asset, applies the options selected by `metadata` and
    /// writes the packed binary to `destination`. Implementations write
    /// through [`crate::packed_file::write_atomically`], so a failed
    /// conversion never leaves a partial file behind.
    fn convert(&self, source: &Path, destination: &Path, metadata: &MetaTable) -> Result<()>;
}

/// Returns [`Error::Version`] unless `loaded_version` equals `current_version`.
pub(crate) fn check_current_version(loaded_version: u32, current_version: u32) -> Result<()> {
    if loaded_version == current_version {
        Ok(())
    } else {
        Err(Error::Version {
            found: loaded_version,
            current: current_version,
        })
    }
}

/// Maps source file extensions to encoders.
///
/// Adding an asset kind means implementing [`Encoder`] and registering it
/// here; no type hierarchy is involved.
#[derive(Default)]
pub struct EncoderRegistry {
    encoders: BTreeMap<String, Arc<dyn Encoder>>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an encoder for the given source file extension (without the
    /// dot, matched case-insensitively).
    pub fn register(&mut self, extension: impl Into<String>, encoder: Arc<dyn Encoder>) -> Result<()> {
        let extension = extension.into().to_lowercase();
        if self.encoders.contains_key(&extension) {
            return Err(Error::ExtensionAlreadyRegistered(extension));
        }
        self.encoders.insert(extension, encoder);
        Ok(())
    }

    /// Returns the encoder registered for the extension.
    pub fn find(&self, extension: &str) -> Option<Arc<dyn Encoder>> {
        self.encoders.get(&extension.to_lowercase()).cloned()
    }

    /// Returns the encoder responsible for the given source path.
    pub fn find_for_path(&self, path: &Path) -> Result<Arc<dyn Encoder>> {
        let extension = extract_extension_from_path(path)?;
        self.find(&extension).ok_or(Error::ExtensionNotRegistered(extension))
    }

    /// Returns a snapshot of the registered extensions, sorted.
    pub fn extensions(&self) -> Vec<String> {
        self.encoders.keys().cloned().collect()
    }
}

/// Loads the sidecar at `sidecar_path` (creating it from the defaults when it
/// does not exist), migrates it to the current version when necessary and
/// validates it. A migrated table is saved back to the sidecar so that the
/// upgrade runs once, not on every conversion.
pub fn prepare_metadata(encoder: &dyn Encoder, sidecar_path: &Path) -> Result<MetaTable> {
    let mut metadata = if sidecar_path.exists() {
        let mut metadata = MetaTable::new();
        metadata.load(sidecar_path)?;
        metadata
    } else {
        info!("Creating default sidecar '{}'", sidecar_path.display());
        let metadata = encoder.get_default();
        metadata.save(sidecar_path)?;
        metadata
    };

    let loaded_version = metadata.version()?;
    if loaded_version != encoder.current_version() {
        info! {
            "Upgrading sidecar '{}' from version {loaded_version} to {current}",
            sidecar_path.display(),
            current = encoder.current_version()
        }
        encoder.upgrade(&mut metadata, loaded_version)?;
        metadata.save(sidecar_path)?;
    }

    let version = metadata.version()?;
    encoder.validate(&metadata, version)?;
    Ok(metadata)
}

/// Validates and converts in one step. The metadata must already be at the
/// current version (see [`prepare_metadata`]).
pub fn pack_asset(encoder: &dyn Encoder, source: &Path, destination: &Path, metadata: &MetaTable) -> Result<()> {
    encoder.validate(metadata, metadata.version()?)?;
    encoder.convert(source, destination, metadata)
}
