//! Runtime loader for packed mesh binaries.
//!
//! Reads the format documented in [`crate::mesh`] but shares no code with the
//! encoder; the file layout is the contract between the two. The loader sizes
//! its buffers exactly from the counts and attribute flags in the header and
//! treats any shortfall in the payload as corruption.
//!
//! Attribute streams are kept in bind slot order (position = 0, uv = 1,
//! normal = 2, tangent = 3), ready to be uploaded as one block.

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use forge_shared::{
    byteorder::{LittleEndian, ReadBytesExt},
    log::info,
    nalgebra::Vector3,
};

use crate::{
    common::{Error, Result},
    packed_file::{AssetKind, PackedHeader},
};

/// Binary versions this loader can decode. Version 1 predates the tangent
/// stream and has only two flag bytes.
pub const SUPPORTED_VERSIONS: [u32; 2] = [1, 2];
pub const CURRENT_VERSION: u32 = 2;

/// A mesh decoded from a packed binary, ready for upload.
///
/// `Default` is the unloaded state; [`Model::load`] is the only way to a
/// loaded one.
#[derive(Debug, Default)]
pub struct Model {
    min_bounds: Vector3<f32>,
    max_bounds: Vector3<f32>,
    has_uvs: bool,
    has_normals: bool,
    has_tangents: bool,
    num_vertices: u32,
    num_faces: u32,
    vertex_data: Vec<f32>,
    index_data: Vec<u32>,
    loaded: bool,
}

impl Model {
    /// Loads a packed mesh binary.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let header = PackedHeader::read(&mut reader)?;
        header.check(AssetKind::Mesh, &SUPPORTED_VERSIONS, CURRENT_VERSION)?;

        let has_uvs = read_flag(&mut reader)?;
        let has_normals = read_flag(&mut reader)?;
        let has_tangents = if header.version >= 2 { read_flag(&mut reader)? } else { false };

        let num_vertices = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let num_faces = reader.read_u32::<LittleEndian>().map_err(truncated)?;

        let mut bounds = [0f32; 6];
        reader.read_f32_into::<LittleEndian>(&mut bounds).map_err(truncated)?;
        let min_bounds = Vector3::new(bounds[0], bounds[1], bounds[2]);
        let max_bounds = Vector3::new(bounds[3], bounds[4], bounds[5]);

        let floats_per_vertex =
            3 + if has_uvs { 2 } else { 0 } + if has_normals { 3 } else { 0 } + if has_tangents { 3 } else { 0 };
        let vertex_floats = u64::from(num_vertices) * floats_per_vertex;
        let index_count = u64::from(num_faces) * 3;

        // The counts come from an untrusted file; check them against the
        // actual file size before sizing any buffer from them.
        let flag_bytes = if header.version >= 2 { 3 } else { 2 };
        let header_len = 24 + flag_bytes + 8 + 24;
        let declared_len = header_len + (vertex_floats + index_count) * 4;
        if declared_len > file_len {
            return Err(Error::Format(format!(
                "header declares {declared_len} bytes but the file has only {file_len}"
            )));
        }

        let mut vertex_data = vec![0f32; vertex_floats as usize];
        reader.read_f32_into::<LittleEndian>(&mut vertex_data).map_err(truncated)?;

        let mut index_data = vec![0u32; index_count as usize];
        reader.read_u32_into::<LittleEndian>(&mut index_data).map_err(truncated)?;

        let mut trailing = [0u8; 1];
        if reader.read(&mut trailing)? != 0 {
            return Err(Error::Format("unexpected data after the index stream".to_owned()));
        }
        for index in &index_data {
            if *index >= num_vertices {
                return Err(Error::Format(format!(
                    "index {index} is out of range for {num_vertices} vertices"
                )));
            }
        }

        info! {
            "Loaded model '{}' with {num_vertices} vertices and {num_faces} faces",
            path.display()
        }

        Ok(Self {
            min_bounds,
            max_bounds,
            has_uvs,
            has_normals,
            has_tangents,
            num_vertices,
            num_faces,
            vertex_data,
            index_data,
            loaded: true,
        })
    }

    /// Releases the vertex and index storage. Calling this on an already
    /// unloaded model is a no-op.
    pub fn unload(&mut self) {
        self.vertex_data = Vec::new();
        self.index_data = Vec::new();
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Extent minimum of each axis in local space.
    pub fn min_bounds(&self) -> Vector3<f32> {
        self.min_bounds
    }

    /// Extent maximum of each axis in local space.
    pub fn max_bounds(&self) -> Vector3<f32> {
        self.max_bounds
    }

    pub fn has_uvs(&self) -> bool {
        self.has_uvs
    }

    pub fn has_normals(&self) -> bool {
        self.has_normals
    }

    pub fn has_tangents(&self) -> bool {
        self.has_tangents
    }

    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    pub fn num_faces(&self) -> u32 {
        self.num_faces
    }

    /// Attribute streams concatenated in bind slot order.
    pub fn vertex_data(&self) -> &[f32] {
        &self.vertex_data
    }

    /// Triangle list indices into the vertex streams.
    pub fn index_data(&self) -> &[u32] {
        &self.index_data
    }
}

fn read_flag<R: Read>(mut reader: R) -> Result<bool> {
    let value = reader.read_u8().map_err(truncated)?;
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::Format(format!("invalid attribute flag {other}"))),
    }
}

fn truncated(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::Format("file is truncated relative to the counts in its header".to_owned())
    } else {
        Error::Io(err)
    }
}
