//! GPU-facing data layer: the fixed binary record layout shared with the
//! path-tracing shader, and the buffer abstraction records are written through.

pub mod buffer;
pub mod layout;

pub use buffer::{CpuStagingBuffer, GpuBuffer};
pub use layout::{
    CELL_STRIDE, CUBOID_STRIDE, CellRecord, CuboidRecord, MATERIAL_STRIDE, MaterialRecord,
    ObjectRecord, SPHERE_STRIDE, SceneBufferLayout, SphereRecord,
};

use crate::error::{PathlightError, Result};

/// Validates the face set of a cubemap environment texture: exactly six faces,
/// every face square, every face the same size. Returns the edge length.
///
/// Decoding itself happens in background workers (see [`crate::tasks`]); this
/// check runs before any GPU allocation so a bad asset set fails at setup.
pub fn validate_cubemap_faces(face_dims: &[(u32, u32)]) -> Result<u32> {
    if face_dims.len() != 6 {
        return Err(PathlightError::Asset(format!(
            "cubemap needs exactly 6 faces, got {}",
            face_dims.len()
        )));
    }
    let edge = face_dims[0].0;
    for (i, &(w, h)) in face_dims.iter().enumerate() {
        if w != h {
            return Err(PathlightError::Asset(format!(
                "cubemap face {i} is {w}x{h}, faces must be square"
            )));
        }
        if w != edge {
            return Err(PathlightError::Asset(format!(
                "cubemap face {i} is {w}x{h}, expected {edge}x{edge} like face 0"
            )));
        }
    }
    Ok(edge)
}
