//! Encoder that packs Wavefront OBJ geometry into the binary mesh format.
//!
//! ## Binary layout (little-endian, after the [`PackedHeader`])
//!
//! | Field        | Type          | Description                             |
//! |--------------|---------------|-----------------------------------------|
//! | has_uvs      | u8            | 1 when the UV stream is present         |
//! | has_normals  | u8            | 1 when the normal stream is present     |
//! | has_tangents | u8            | 1 when the tangent stream is present    |
//! | num_vertices | u32           | vertices in every attribute stream      |
//! | num_faces    | u32           | triangles in the index stream           |
//! | min_bounds   | f32[3]        | local-space AABB minimum                |
//! | max_bounds   | f32[3]        | local-space AABB maximum                |
//! | positions    | f32[3 * n]    | bind slot 0                             |
//! | uvs          | f32[2 * n]    | bind slot 1, only when has_uvs          |
//! | normals      | f32[3 * n]    | bind slot 2, only when has_normals      |
//! | tangents     | f32[3 * n]    | bind slot 3, only when has_tangents     |
//! | indices      | u32[3 * f]    | triangle list                           |
//!
//! Version 1 files predate the tangent stream and have no `has_tangents`
//! byte; the runtime loader still accepts them.
//!
//! ## Metadata schema
//!
//! Version 2 (current): `uniform_scale` (float), `generate_normals` (bool),
//! `generate_tangents` (bool). Version 1 stored the scale under `scale` and
//! had no tangent toggle; the 1 -> 2 migration renames the key and adds the
//! toggle at its default.

use std::{collections::BTreeMap, fs, path::Path};

use forge_shared::{
    bounding_box::AABB,
    byteorder::{LittleEndian, WriteBytesExt},
    log::{info, trace, warn},
    nalgebra::{Vector2, Vector3},
};

use crate::{
    common::{Error, Result},
    encoder::{check_current_version, Encoder},
    meta_table::{MetaTable, VERSION_KEY},
    packed_file::{self, AssetKind, PackedHeader},
};

pub const MESH_ENCODER_VERSION: u32 = 2;

pub const KEY_UNIFORM_SCALE: &str = "uniform_scale";
pub const KEY_GENERATE_NORMALS: &str = "generate_normals";
pub const KEY_GENERATE_TANGENTS: &str = "generate_tangents";

/// Key under which version 1 stored the scale factor.
const KEY_SCALE_V1: &str = "scale";

/// Packs `.obj` sources into the binary mesh format.
pub struct MeshEncoder;

impl Encoder for MeshEncoder {
    fn current_version(&self) -> u32 {
        MESH_ENCODER_VERSION
    }

    fn get_default(&self) -> MetaTable {
        let mut metadata = MetaTable::new();
        metadata.set_value(VERSION_KEY, MESH_ENCODER_VERSION);
        metadata.set_value(KEY_UNIFORM_SCALE, 1.0f32);
        metadata.set_value(KEY_GENERATE_NORMALS, true);
        metadata.set_value(KEY_GENERATE_TANGENTS, false);
        metadata
    }

    fn validate(&self, metadata: &MetaTable, loaded_version: u32) -> Result<()> {
        check_current_version(loaded_version, MESH_ENCODER_VERSION)?;
        for key in [KEY_UNIFORM_SCALE, KEY_GENERATE_NORMALS, KEY_GENERATE_TANGENTS] {
            if !metadata.has_setting(key) {
                return Err(Error::Validation(format!("missing setting '{key}'")));
            }
        }
        let scale = metadata.get_float(KEY_UNIFORM_SCALE)?;
        if scale <= 0.0 {
            return Err(Error::Validation(format!(
                "'{KEY_UNIFORM_SCALE}' must be positive, got {scale}"
            )));
        }
        Ok(())
    }

    fn upgrade(&self, metadata: &mut MetaTable, loaded_version: u32) -> Result<()> {
        if loaded_version == 0 || loaded_version > MESH_ENCODER_VERSION {
            return Err(Error::Version {
                found: loaded_version,
                current: MESH_ENCODER_VERSION,
            });
        }
        for version in loaded_version..MESH_ENCODER_VERSION {
            match version {
                // 1 -> 2: "scale" became "uniform_scale"; tangent generation was introduced.
                1 => {
                    if metadata.has_setting(KEY_SCALE_V1) {
                        let scale = metadata.get_string(KEY_SCALE_V1);
                        metadata.remove(KEY_SCALE_V1);
                        metadata.set_value(KEY_UNIFORM_SCALE, scale);
                    } else {
                        metadata.set_default_value(KEY_UNIFORM_SCALE, 1.0f32);
                    }
                    metadata.set_default_value(KEY_GENERATE_TANGENTS, false);
                }
                _ => unreachable!("no migration from version {version}"),
            }
            metadata.set_value(VERSION_KEY, version + 1);
        }
        Ok(())
    }

    fn convert(&self, source: &Path, destination: &Path, metadata: &MetaTable) -> Result<()> {
        info!("Packing mesh '{}' into '{}'", source.display(), destination.display());

        let text = fs::read_to_string(source)?;
        let obj = parse_obj(&text)?;
        let mut buffers = build_buffers(&obj)?;

        let scale = metadata.get_float(KEY_UNIFORM_SCALE)?;
        if scale != 1.0 {
            for position in &mut buffers.positions {
                *position *= scale;
            }
        }

        if buffers.normals.is_empty() && metadata.get_bool(KEY_GENERATE_NORMALS) {
            trace!("Generating normals for '{}'", source.display());
            buffers.normals = generate_normals(&buffers.positions, &buffers.indices);
        }

        if metadata.get_bool(KEY_GENERATE_TANGENTS) {
            if buffers.uvs.is_empty() || buffers.normals.is_empty() {
                warn! {
                    "Cannot generate tangents for '{}' without texture coordinates and normals",
                    source.display()
                }
            } else {
                trace!("Generating tangents for '{}'", source.display());
                buffers.tangents = generate_tangents(&buffers.positions, &buffers.uvs, &buffers.indices);
            }
        }

        let bounds = AABB::from_slice(&buffers.positions);
        let num_vertices = buffers.positions.len() as u32;
        let num_faces = (buffers.indices.len() / 3) as u32;
        trace!("Mesh '{}' has {num_vertices} vertices and {num_faces} faces", source.display());

        packed_file::write_atomically(destination, |writer| {
            PackedHeader::new(AssetKind::Mesh, MESH_ENCODER_VERSION).write(&mut *writer)?;

            writer.write_u8(u8::from(!buffers.uvs.is_empty()))?;
            writer.write_u8(u8::from(!buffers.normals.is_empty()))?;
            writer.write_u8(u8::from(!buffers.tangents.is_empty()))?;
            writer.write_u32::<LittleEndian>(num_vertices)?;
            writer.write_u32::<LittleEndian>(num_faces)?;
            for component in bounds.min.iter().chain(bounds.max.iter()) {
                writer.write_f32::<LittleEndian>(*component)?;
            }

            // Attribute streams in bind slot order.
            for position in &buffers.positions {
                writer.write_f32::<LittleEndian>(position.x)?;
                writer.write_f32::<LittleEndian>(position.y)?;
                writer.write_f32::<LittleEndian>(position.z)?;
            }
            for uv in &buffers.uvs {
                writer.write_f32::<LittleEndian>(uv.x)?;
                writer.write_f32::<LittleEndian>(uv.y)?;
            }
            for normal in &buffers.normals {
                writer.write_f32::<LittleEndian>(normal.x)?;
                writer.write_f32::<LittleEndian>(normal.y)?;
                writer.write_f32::<LittleEndian>(normal.z)?;
            }
            for tangent in &buffers.tangents {
                writer.write_f32::<LittleEndian>(tangent.x)?;
                writer.write_f32::<LittleEndian>(tangent.y)?;
                writer.write_f32::<LittleEndian>(tangent.z)?;
            }

            for index in &buffers.indices {
                writer.write_u32::<LittleEndian>(*index)?;
            }
            Ok(())
        })
    }
}

/// Reference of one face corner into the OBJ attribute lists, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct VertexRef {
    position: u32,
    uv: Option<u32>,
    normal: Option<u32>,
}

/// Geometry as it appears in the OBJ file, before vertex unification.
struct ObjSource {
    positions: Vec<Vector3<f32>>,
    uvs: Vec<Vector2<f32>>,
    normals: Vec<Vector3<f32>>,
    faces: Vec<[VertexRef; 3]>,
}

/// Unified geometry: one index per vertex, all streams equally long.
struct MeshBuffers {
    positions: Vec<Vector3<f32>>,
    uvs: Vec<Vector2<f32>>,
    normals: Vec<Vector3<f32>>,
    tangents: Vec<Vector3<f32>>,
    indices: Vec<u32>,
}

fn parse_obj(text: &str) -> Result<ObjSource> {
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut normals = Vec::new();
    let mut faces = Vec::new();

    for (line_index, line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => positions.push(parse_vector3(&mut tokens, line_number)?),
            Some("vt") => uvs.push(parse_vector2(&mut tokens, line_number)?),
            Some("vn") => normals.push(parse_vector3(&mut tokens, line_number)?),
            Some("f") => {
                let corners = tokens
                    .map(|token| parse_vertex_ref(token, line_number))
                    .collect::<Result<Vec<_>>>()?;
                let [a, b, c] = corners[..] else {
                    return Err(Error::Format(format!(
                        "line {line_number}: only triangle faces are supported, found {} corners",
                        corners.len()
                    )));
                };
                faces.push([a, b, c]);
            }
            // Object names, groups, smoothing groups and material statements
            // carry no geometry and are skipped.
            _ => continue,
        }
    }

    for face in &faces {
        for corner in face {
            if corner.position as usize >= positions.len() {
                return Err(Error::Format(format!(
                    "face references position {} but only {} positions exist",
                    corner.position + 1,
                    positions.len()
                )));
            }
            if let Some(uv) = corner.uv {
                if uv as usize >= uvs.len() {
                    return Err(Error::Format(format!(
                        "face references texture coordinate {} but only {} exist",
                        uv + 1,
                        uvs.len()
                    )));
                }
            }
            if let Some(normal) = corner.normal {
                if normal as usize >= normals.len() {
                    return Err(Error::Format(format!(
                        "face references normal {} but only {} normals exist",
                        normal + 1,
                        normals.len()
                    )));
                }
            }
        }
    }

    Ok(ObjSource {
        positions,
        uvs,
        normals,
        faces,
    })
}

fn parse_f32<'a>(tokens: &mut impl Iterator<Item = &'a str>, line_number: usize) -> Result<f32> {
    let token = tokens
        .next()
        .ok_or_else(|| Error::Format(format!("line {line_number}: missing component")))?;
    token
        .parse()
        .map_err(|_| Error::Format(format!("line {line_number}: '{token}' is not a number")))
}

fn parse_vector3<'a>(tokens: &mut impl Iterator<Item = &'a str>, line_number: usize) -> Result<Vector3<f32>> {
    let x = parse_f32(tokens, line_number)?;
    let y = parse_f32(tokens, line_number)?;
    let z = parse_f32(tokens, line_number)?;
    Ok(Vector3::new(x, y, z))
}

fn parse_vector2<'a>(tokens: &mut impl Iterator<Item = &'a str>, line_number: usize) -> Result<Vector2<f32>> {
    let x = parse_f32(tokens, line_number)?;
    let y = parse_f32(tokens, line_number)?;
    Ok(Vector2::new(x, y))
}

/// Parses one face corner: `v`, `v/vt`, `v//vn` or `v/vt/vn` with 1-based indices.
fn parse_vertex_ref(token: &str, line_number: usize) -> Result<VertexRef> {
    let mut parts = token.split('/');
    let position = parse_obj_index(parts.next(), token, line_number)?
        .ok_or_else(|| Error::Format(format!("line {line_number}: face corner '{token}' has no position")))?;
    let uv = parse_obj_index(parts.next(), token, line_number)?;
    let normal = parse_obj_index(parts.next(), token, line_number)?;
    if parts.next().is_some() {
        return Err(Error::Format(format!(
            "line {line_number}: face corner '{token}' has too many components"
        )));
    }
    Ok(VertexRef { position, uv, normal })
}

fn parse_obj_index(part: Option<&str>, token: &str, line_number: usize) -> Result<Option<u32>> {
    match part {
        None | Some("") => Ok(None),
        Some(part) => {
            let index: u32 = part
                .parse()
                .map_err(|_| Error::Format(format!("line {line_number}: invalid index in face corner '{token}'")))?;
            if index == 0 {
                return Err(Error::Format(format!(
                    "line {line_number}: face corner '{token}' uses index 0, OBJ indices start at 1"
                )));
            }
            Ok(Some(index - 1))
        }
    }
}

/// Unifies the per-attribute OBJ indices into a single vertex stream. Corners
/// with the same position/uv/normal triple share one vertex.
fn build_buffers(obj: &ObjSource) -> Result<MeshBuffers> {
    if obj.faces.is_empty() {
        return Err(Error::Format("mesh contains no faces".to_owned()));
    }

    let corners = obj.faces.iter().flatten();
    let has_uvs = corners.clone().all(|corner| corner.uv.is_some()) && !obj.uvs.is_empty();
    let has_normals = corners.clone().all(|corner| corner.normal.is_some()) && !obj.normals.is_empty();
    if !has_uvs && corners.clone().any(|corner| corner.uv.is_some()) {
        return Err(Error::Format("faces reference texture coordinates inconsistently".to_owned()));
    }
    if !has_normals && corners.clone().any(|corner| corner.normal.is_some()) {
        return Err(Error::Format("faces reference normals inconsistently".to_owned()));
    }

    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();
    let mut index_mapping = BTreeMap::new();

    for face in &obj.faces {
        for corner in face {
            let next_index = index_mapping.len() as u32;
            let index = *index_mapping.entry(*corner).or_insert_with(|| {
                positions.push(obj.positions[corner.position as usize]);
                if let Some(uv) = corner.uv {
                    uvs.push(obj.uvs[uv as usize]);
                }
                if let Some(normal) = corner.normal {
                    normals.push(obj.normals[normal as usize]);
                }
                next_index
            });
            indices.push(index);
        }
    }

    Ok(MeshBuffers {
        positions,
        uvs,
        normals,
        tangents: Vec::new(),
        indices,
    })
}

/// Smooth per-vertex normals from accumulated face normals. The unnormalized
/// cross product weights each face by its area.
fn generate_normals(positions: &[Vector3<f32>], indices: &[u32]) -> Vec<Vector3<f32>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];
    for triangle in indices.chunks_exact(3) {
        let (i0, i1, i2) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
        let face_normal = (positions[i1] - positions[i0]).cross(&(positions[i2] - positions[i0]));
        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }
    normals
        .into_iter()
        .map(|normal| normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros))
        .collect()
}

/// Per-vertex tangents from the UV-space edge deltas of every triangle.
fn generate_tangents(positions: &[Vector3<f32>], uvs: &[Vector2<f32>], indices: &[u32]) -> Vec<Vector3<f32>> {
    let mut tangents = vec![Vector3::zeros(); positions.len()];
    for triangle in indices.chunks_exact(3) {
        let (i0, i1, i2) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
        let edge1 = positions[i1] - positions[i0];
        let edge2 = positions[i2] - positions[i0];
        let delta_uv1 = uvs[i1] - uvs[i0];
        let delta_uv2 = uvs[i2] - uvs[i0];

        let determinant = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if determinant.abs() <= f32::EPSILON {
            // Degenerate UV mapping, no tangent direction to extract.
            continue;
        }
        let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) / determinant;
        tangents[i0] += tangent;
        tangents[i1] += tangent;
        tangents[i2] += tangent;
    }
    tangents
        .into_iter()
        .map(|tangent| tangent.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use forge_test::setup_logger;
    use tempdir::TempDir;

    use crate::model::Model;

    use super::*;

    /// Two triangles forming a unit quad in the XY plane.
    const QUAD_OBJ: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3
f 1/1 3/3 4/4
";

    fn write_source(root: &TempDir, content: &str) -> std::path::PathBuf {
        let path = root.path().join("quad.obj");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn convert_and_load_round_trip() {
        setup_logger();
        let root = TempDir::new("mesh").unwrap();
        let source = write_source(&root, QUAD_OBJ);
        let destination = root.path().join("quad.model");

        let metadata = MeshEncoder.get_default();
        MeshEncoder.convert(&source, &destination, &metadata).unwrap();

        let model = Model::load(&destination).unwrap();
        assert!(model.has_uvs());
        assert!(model.has_normals());
        assert!(!model.has_tangents());
        assert_eq!(model.num_vertices(), 4);
        assert_eq!(model.num_faces(), 2);
        assert_eq!(model.min_bounds(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(model.max_bounds(), Vector3::new(1.0, 1.0, 0.0));

        // position (3) + uv (2) + normal (3) floats per vertex
        assert_eq!(model.vertex_data().len(), 4 * 8);
        assert_eq!(model.index_data(), &[0, 1, 2, 0, 2, 3]);

        // The quad lies in the XY plane, so every generated normal is +Z.
        let normals_start = 4 * 3 + 4 * 2;
        for normal in model.vertex_data()[normals_start..].chunks_exact(3) {
            assert_eq!(normal, &[0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn uniform_scale_scales_positions_and_bounds() {
        setup_logger();
        let root = TempDir::new("mesh").unwrap();
        let source = write_source(&root, QUAD_OBJ);
        let destination = root.path().join("quad.model");

        let mut metadata = MeshEncoder.get_default();
        metadata.set_value(KEY_UNIFORM_SCALE, 2.5f32);
        MeshEncoder.convert(&source, &destination, &metadata).unwrap();

        let model = Model::load(&destination).unwrap();
        assert_eq!(model.max_bounds(), Vector3::new(2.5, 2.5, 0.0));
    }

    #[test]
    fn tangents_are_generated_on_request() {
        setup_logger();
        let root = TempDir::new("mesh").unwrap();
        let source = write_source(&root, QUAD_OBJ);
        let destination = root.path().join("quad.model");

        let mut metadata = MeshEncoder.get_default();
        metadata.set_value(KEY_GENERATE_TANGENTS, true);
        MeshEncoder.convert(&source, &destination, &metadata).unwrap();

        let model = Model::load(&destination).unwrap();
        assert!(model.has_tangents());
        assert_eq!(model.vertex_data().len(), 4 * 11);

        // UVs follow the positions, so the tangent points along +X.
        let tangents_start = 4 * 3 + 4 * 2 + 4 * 3;
        for tangent in model.vertex_data()[tangents_start..].chunks_exact(3) {
            assert_eq!(tangent, &[1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn conversion_is_deterministic() {
        setup_logger();
        let root = TempDir::new("mesh").unwrap();
        let source = write_source(&root, QUAD_OBJ);
        let first = root.path().join("first.model");
        let second = root.path().join("second.model");

        let metadata = MeshEncoder.get_default();
        MeshEncoder.convert(&source, &first, &metadata).unwrap();
        MeshEncoder.convert(&source, &second, &metadata).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn failed_conversion_leaves_the_previous_file_untouched() {
        setup_logger();
        let root = TempDir::new("mesh").unwrap();
        let source = write_source(&root, QUAD_OBJ);
        let destination = root.path().join("quad.model");

        let metadata = MeshEncoder.get_default();
        MeshEncoder.convert(&source, &destination, &metadata).unwrap();
        let packed = fs::read(&destination).unwrap();

        fs::write(&source, "v 0 0\nf 1 2 3\n").unwrap();
        assert!(MeshEncoder.convert(&source, &destination, &metadata).is_err());
        assert_eq!(fs::read(&destination).unwrap(), packed);
    }

    #[test]
    fn failed_conversion_creates_no_file() {
        setup_logger();
        let root = TempDir::new("mesh").unwrap();
        let source = write_source(&root, "f 1/1 2/2\n");
        let destination = root.path().join("quad.model");

        assert!(MeshEncoder.convert(&source, &destination, &MeshEncoder.get_default()).is_err());
        assert!(!destination.exists());
    }

    #[test]
    fn quads_are_rejected() {
        let result = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let result = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 4\n");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn corners_with_different_attributes_are_split() {
        let obj = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3\nf 1/4 2/2 3/3\n").unwrap();
        let buffers = build_buffers(&obj).unwrap();
        // Corner 1/4 shares the position of 1/1 but not the UV.
        assert_eq!(buffers.positions.len(), 4);
        assert_eq!(buffers.indices.len(), 6);
    }

    #[test]
    fn default_metadata_validates() {
        let metadata = MeshEncoder.get_default();
        MeshEncoder.validate(&metadata, metadata.version().unwrap()).unwrap();
    }

    #[test]
    fn validation_rejects_newer_versions_and_missing_keys() {
        let metadata = MeshEncoder.get_default();
        assert!(matches!(
            MeshEncoder.validate(&metadata, MESH_ENCODER_VERSION + 1),
            Err(Error::Version { .. })
        ));

        let mut incomplete = metadata.clone();
        incomplete.remove(KEY_GENERATE_NORMALS);
        assert!(matches!(
            MeshEncoder.validate(&incomplete, MESH_ENCODER_VERSION),
            Err(Error::Validation(_))
        ));

        let mut negative_scale = metadata;
        negative_scale.set_value(KEY_UNIFORM_SCALE, -1.0f32);
        assert!(matches!(
            MeshEncoder.validate(&negative_scale, MESH_ENCODER_VERSION),
            Err(Error::Validation(_))
        ));
    }

    /// Builds a metadata table as a given historic version wrote it.
    fn metadata_at_version(version: u32) -> MetaTable {
        match version {
            1 => {
                let mut metadata = MetaTable::new();
                metadata.set_value(VERSION_KEY, 1u32);
                metadata.set_value(KEY_SCALE_V1, 2.0f32);
                metadata.set_value(KEY_GENERATE_NORMALS, true);
                metadata
            }
            _ => panic!("no fixture for version {version}"),
        }
    }

    #[test]
    fn migration_closure() {
        for version in 1..MESH_ENCODER_VERSION {
            let mut metadata = metadata_at_version(version);
            MeshEncoder.upgrade(&mut metadata, version).unwrap();
            assert_eq!(metadata.version().unwrap(), MESH_ENCODER_VERSION);
            MeshEncoder.validate(&metadata, MESH_ENCODER_VERSION).unwrap();
        }
    }

    #[test]
    fn migration_preserves_the_scale_value() {
        let mut metadata = metadata_at_version(1);
        MeshEncoder.upgrade(&mut metadata, 1).unwrap();
        assert_eq!(metadata.get_float(KEY_UNIFORM_SCALE).unwrap(), 2.0);
        assert!(!metadata.has_setting(KEY_SCALE_V1));
        assert!(!metadata.get_bool(KEY_GENERATE_TANGENTS));
    }

    #[test]
    fn upgrade_rejects_unknown_versions() {
        let mut metadata = metadata_at_version(1);
        assert!(matches!(
            MeshEncoder.upgrade(&mut metadata, MESH_ENCODER_VERSION + 1),
            Err(Error::Version { .. })
        ));
        assert!(matches!(
            MeshEncoder.upgrade(&mut metadata, 0),
            Err(Error::Version { .. })
        ));
        // The failed upgrades did not touch the table.
        assert_eq!(metadata, metadata_at_version(1));
    }
}
