//! Pose Assembler.
//!
//! The knowledge base describes each fixed object by a 4x4 homogeneous
//! transform bound cell by cell to `M00`..`M33`, plus its `Width`, `Height`
//! and `Depth`.  Twelve cells are consumed: the rotation block
//! (`M00`..`M22`, row-major) and the translation column (`M03`, `M13`,
//! `M23`).  The bottom row `M30`..`M33` is always `0 0 0 1` and is ignored.

use knowledge_perception::transform::Quaternion;
use knowledge_types::{BoundingBox, KnowledgeError, Point3, Pose};

use crate::binding::{QueryBinding, decode};

/// Rotation block cells, row-major.
pub const ROTATION_VARIABLES: [[&str; 3]; 3] = [
    ["M00", "M01", "M02"],
    ["M10", "M11", "M12"],
    ["M20", "M21", "M22"],
];

/// Translation column cells (x, y, z).
pub const TRANSLATION_VARIABLES: [&str; 3] = ["M03", "M13", "M23"];

/// Dimension variables (width, height, depth).
pub const DIMENSION_VARIABLES: [&str; 3] = ["Width", "Height", "Depth"];

/// Assemble the pose encoded by the transform cells of `binding`.
///
/// Fails with [`KnowledgeError::DecodeTypeMismatch`] if any of the twelve
/// consumed cells is missing or not numeric.
pub fn assemble_pose(binding: &QueryBinding) -> Result<Pose, KnowledgeError> {
    let mut rotation = [[0.0; 3]; 3];
    for (r, row) in ROTATION_VARIABLES.iter().enumerate() {
        for (c, variable) in row.iter().enumerate() {
            rotation[r][c] = decode(binding, variable)?;
        }
    }

    let [tx, ty, tz] = TRANSLATION_VARIABLES;
    let position = Point3::new(decode(binding, tx)?, decode(binding, ty)?, decode(binding, tz)?);

    Ok(Pose {
        position,
        orientation: Quaternion::from_rotation_matrix(rotation).into(),
    })
}

/// Copy `Width`/`Height`/`Depth` out of `binding`.
pub fn assemble_bounding_box(binding: &QueryBinding) -> Result<BoundingBox, KnowledgeError> {
    let [w, h, d] = DIMENSION_VARIABLES;
    Ok(BoundingBox {
        width: decode(binding, w)?,
        height: decode(binding, h)?,
        depth: decode(binding, d)?,
    })
}
