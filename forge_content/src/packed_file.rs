//! Framing shared by every packed binary resource.
//!
//! Every file an [`Encoder`](crate::Encoder) produces starts with the same
//! little-endian frame:
//!
//! | Field   | Type   | Size (bytes) | Description                          |
//! |---------|--------|--------------|--------------------------------------|
//! | Magic   | u8[16] | 16           | 7d3a91c4-620e-4b8a-9f51-276ce804b5d2 |
//! | Kind    | u32    | 4            | Asset kind discriminant              |
//! | Version | u32    | 4            | Schema generation of the payload     |
//!
//! The kind-specific payload follows directly after the frame. Readers reject
//! a wrong magic or kind as corrupt and an unknown version as incompatible;
//! the version in the frame is the same schema generation that the producing
//! encoder carries in its metadata.

use std::{
    fs::{self, File},
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use forge_shared::byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::common::{Error, Result};

/* UUID string: 7d3a91c4-620e-4b8a-9f51-276ce804b5d2 */
pub const MAGIC: [u8; 16] = [
    0x7d, 0x3a, 0x91, 0xc4, 0x62, 0x0e, 0x4b, 0x8a, 0x9f, 0x51, 0x27, 0x6c, 0xe8, 0x04, 0xb5, 0xd2,
];

/// Kind of asset stored in a packed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Mesh,
    Texture,
    Template,
}

impl AssetKind {
    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Mesh => 0,
            Self::Texture => 1,
            Self::Template => 2,
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Mesh),
            1 => Some(Self::Texture),
            2 => Some(Self::Template),
            _ => None,
        }
    }
}

/// Frame at the beginning of every packed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedHeader {
    pub kind: AssetKind,
    pub version: u32,
}

impl PackedHeader {
    pub fn new(kind: AssetKind, version: u32) -> Self {
        Self { kind, version }
    }

    /// Reads and checks the frame. A wrong magic or an unknown kind means the
    /// file is not a packed resource at all and is reported as [`Error::Format`].
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 16];
        reader
            .read_exact(&mut magic)
            .map_err(|_| Error::Format("failed to read the magic number".to_owned()))?;
        if magic != MAGIC {
            return Err(Error::Format("invalid magic number".to_owned()));
        }

        let kind = reader
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::Format("failed to read the asset kind".to_owned()))?;
        let kind = AssetKind::from_u32(kind).ok_or_else(|| Error::Format(format!("unknown asset kind {kind}")))?;

        let version = reader
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::Format("failed to read the version number".to_owned()))?;

        Ok(Self { kind, version })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u32::<LittleEndian>(self.kind.to_u32())?;
        writer.write_u32::<LittleEndian>(self.version)?;
        Ok(())
    }

    /// Checks kind and version against what a reader expects. Version checks
    /// run against the list of generations the reader knows how to decode.
    pub fn check(&self, kind: AssetKind, supported_versions: &[u32], current_version: u32) -> Result<()> {
        if self.kind != kind {
            return Err(Error::Format(format!(
                "expected a {kind:?} resource but found {actual:?}",
                actual = self.kind
            )));
        }
        if !supported_versions.contains(&self.version) {
            return Err(Error::Version {
                found: self.version,
                current: current_version,
            });
        }
        Ok(())
    }
}

/// Writes `destination` through a sibling temporary file that is renamed over
/// the destination only after `write_fn` succeeded. A failing `write_fn`
/// leaves no file behind and an already existing destination untouched.
pub fn write_atomically(destination: &Path, write_fn: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    let temporary_path = temporary_path_for(destination)?;

    let result = File::create(&temporary_path).map_err(Error::from).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_fn(&mut writer)?;
        writer.flush()?;
        Ok(())
    });

    if let Err(err) = result {
        let _ = fs::remove_file(&temporary_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temporary_path, destination) {
        let _ = fs::remove_file(&temporary_path);
        return Err(err.into());
    }

    Ok(())
}

fn temporary_path_for(destination: &Path) -> Result<PathBuf> {
    let file_name = destination
        .file_name()
        .and_then(|file_name| file_name.to_str())
        .ok_or_else(|| Error::InvalidPath(destination.to_owned()))?;
    Ok(destination.with_file_name(format!("{file_name}.tmp")))
}
