//! # Overview
//!
//! Crate for packing source assets into versioned binary resources and for
//! loading those binaries back at runtime.
//!
//! The offline side is built around the [`Encoder`] trait: one implementation
//! per asset kind turns a source file (a mesh, an image, an opaque template)
//! into a packed binary, driven by a [`MetaTable`] sidecar that carries the
//! encoding options together with a schema version. When the schema of an
//! encoder evolves, old sidecars are migrated in place by `upgrade` before
//! they are validated and converted. An [`EncoderRegistry`] maps source file
//! extensions to encoders so that a driver never has to know the concrete
//! types.
//!
//! The runtime side consists of the loaders in [`model`] and [`sound`]. They
//! read only the packed binary formats and never call into encoder code; the
//! file format is the contract between the two halves, which is why it is
//! versioned in every header (see [`packed_file`]).
//!
//! ```text
//!  source asset + sidecar          packed binary            runtime object
//!  hero.obj, hero.obj.meta  --->   hero.model       --->    Model
//!        (Encoder::convert)            (Model::load)
//! ```

mod common;

pub mod encoder;
pub mod mesh;
pub mod meta_table;
pub mod model;
pub mod packed_file;
pub mod sound;
pub mod template;
pub mod texture;

pub use common::{Error, Result};
pub use encoder::{Encoder, EncoderRegistry};
pub use meta_table::MetaTable;
