pub mod bounding_box;
pub mod texture;

pub use byteorder;
pub use float_cmp;
pub use log;
pub use nalgebra;
pub use thiserror;
