//! Transform Frame (TF) Engine.
//!
//! Maintains a graph of named reference frames and the 3-D rigid-body
//! transforms (translation + quaternion rotation) that relate them.  Given any
//! two frame names the engine composes a chain of transforms via BFS to
//! produce the combined [`Transform3D`].  Edges may be walked in either
//! direction; walking an edge backwards uses its inverse.
//!
//! Frame names are compared without their leading `/`, so `"/map"` and
//! `"map"` name the same frame.
//!
//! # Example
//!
//! ```rust
//! use knowledge_perception::transform::{TfEngine, Transform3D, Vec3, Quaternion};
//!
//! let mut tf = TfEngine::new();
//!
//! // base_link is 1 m forward of odom_combined, same orientation.
//! tf.set_transform("/odom_combined", "/base_link",
//!     Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity()));
//!
//! // camera is 0.5 m forward of base_link, same orientation.
//! tf.set_transform("/base_link", "/camera",
//!     Transform3D::new(Vec3::new(0.5, 0.0, 0.0), Quaternion::identity()));
//!
//! let t = tf.lookup("/odom_combined", "/camera").unwrap();
//! assert!((t.translation.x - 1.5).abs() < 1e-9);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use chrono::{Duration, Utc};
use knowledge_types::{KnowledgeError, Point3, StampedPoint};
use tracing::debug;

use crate::frame_stage::TransformLookup;

// ────────────────────────────────────────────────────────────────────────────
// Primitive types
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D translation vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

impl From<Vec3> for Point3 {
    fn from(v: Vec3) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Recover the rotation encoded by a row-major 3x3 rotation matrix.
    ///
    /// Branches on the largest of the trace and the three diagonal entries
    /// so the square root is always taken of a value ≥ 1, which keeps the
    /// conversion stable near the identity and near 180° rotations.  The
    /// result is normalised and has `w >= 0`.
    pub fn from_rotation_matrix(m: [[f64; 3]; 3]) -> Self {
        let trace = m[0][0] + m[1][1] + m[2][2];
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (m[2][1] - m[1][2]) / s,
                (m[0][2] - m[2][0]) / s,
                (m[1][0] - m[0][1]) / s,
            )
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            Self::new(
                (m[2][1] - m[1][2]) / s,
                0.25 * s,
                (m[0][1] + m[1][0]) / s,
                (m[0][2] + m[2][0]) / s,
            )
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            Self::new(
                (m[0][2] - m[2][0]) / s,
                (m[0][1] + m[1][0]) / s,
                0.25 * s,
                (m[1][2] + m[2][1]) / s,
            )
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            Self::new(
                (m[1][0] - m[0][1]) / s,
                (m[0][2] + m[2][0]) / s,
                (m[1][2] + m[2][1]) / s,
                0.25 * s,
            )
        };

        let q = q.normalize();
        // q and -q encode the same rotation; pick the w >= 0 hemisphere.
        if q.w < 0.0 {
            Self::new(-q.w, -q.x, -q.y, -q.z)
        } else {
            q
        }
    }

    /// Row-major 3x3 rotation matrix equivalent to this quaternion.
    pub fn to_rotation_matrix(self) -> [[f64; 3]; 3] {
        let Self { w, x, y, z } = self;
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - z * w),
                2.0 * (x * z + y * w),
            ],
            [
                2.0 * (x * y + z * w),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - x * w),
            ],
            [
                2.0 * (x * z - y * w),
                2.0 * (y * z + x * w),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }

    /// Euclidean norm |q|.
    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scale to unit length.  A zero quaternion becomes the identity.
    pub fn normalize(self) -> Self {
        let n = self.norm();
        if n <= f64::EPSILON {
            return Self::identity();
        }
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }
}

impl From<Quaternion> for knowledge_types::Quaternion {
    fn from(q: Quaternion) -> Self {
        knowledge_types::Quaternion {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<knowledge_types::Quaternion> for Quaternion {
    fn from(q: knowledge_types::Quaternion) -> Self {
        Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transform3D
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body 3-D transform: rotation followed by translation.
///
/// Represents the pose of frame B relative to frame A: to convert a point
/// expressed in frame B into frame A, rotate it by `rotation` then add
/// `translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Transform3D {
    /// Create a transform from a translation and rotation.
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// Compose two transforms: `self` applied first, then `other`.
    ///
    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        let translated = self.translation.add(self.rotation.rotate(other.translation));
        let rotated = self.rotation.mul(other.rotation);
        Self::new(translated, rotated)
    }

    /// T_B_A from T_A_B.
    pub fn inverse(self) -> Self {
        let rotation = self.rotation.conjugate();
        Self::new(rotation.rotate(self.translation.neg()), rotation)
    }

    /// Map a point expressed in frame B into frame A.
    pub fn apply(self, point: Vec3) -> Vec3 {
        self.rotation.rotate(point).add(self.translation)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TfEngine
// ────────────────────────────────────────────────────────────────────────────

/// A graph of named reference frames and the [`Transform3D`]s that relate
/// them.
///
/// [`TfEngine::lookup`] performs BFS to find the shortest path between two
/// frames and returns the composed transform.  [`TfEngine`] also implements
/// [`TransformLookup`], so it can stand in for an external transform service.
#[derive(Debug, Default)]
pub struct TfEngine {
    /// `edges[parent][child] = T_parent_child`
    edges: HashMap<String, HashMap<String, Transform3D>>,
    /// `reverse[child][parent] = T_parent_child`
    reverse: HashMap<String, HashMap<String, Transform3D>>,
    /// Stamps older (or further in the future) than this are rejected.
    max_stamp_age: Option<Duration>,
}

impl TfEngine {
    /// Create an empty TF engine that accepts points of any age.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject points whose stamp is more than `max_age` away from now,
    /// mimicking the bounded history of a buffered transform listener.
    pub fn with_max_stamp_age(mut self, max_age: Duration) -> Self {
        self.max_stamp_age = Some(max_age);
        self
    }

    /// Register or update the pose of `child_frame` in `parent_frame`.
    pub fn set_transform(&mut self, parent_frame: &str, child_frame: &str, transform: Transform3D) {
        let parent = canonical_frame(parent_frame).to_string();
        let child = canonical_frame(child_frame).to_string();
        self.edges
            .entry(parent.clone())
            .or_default()
            .insert(child.clone(), transform);
        self.reverse
            .entry(child)
            .or_default()
            .insert(parent, transform);
    }

    /// Every frame that appears in at least one edge, sorted by name.
    pub fn frames(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.edges.keys().chain(self.reverse.keys()).collect();
        names.into_iter().map(|n| format!("/{n}")).collect()
    }

    /// Compute T_target_source: the transform that maps points expressed in
    /// `source_frame` into `target_frame`.
    ///
    /// Returns `None` if the two frames are not connected.
    pub fn lookup(&self, target_frame: &str, source_frame: &str) -> Option<Transform3D> {
        let start = canonical_frame(target_frame);
        let goal = canonical_frame(source_frame);
        if start == goal {
            return Some(Transform3D::identity());
        }

        // BFS; each queue item carries T_start_current.
        let mut queue: VecDeque<(&str, Transform3D)> = VecDeque::new();
        let mut visited: HashSet<&str> = HashSet::new();

        queue.push_back((start, Transform3D::identity()));
        visited.insert(start);

        while let Some((current, accumulated)) = queue.pop_front() {
            let forward = self
                .edges
                .get(current)
                .into_iter()
                .flatten()
                .map(|(next, tf)| (next.as_str(), *tf));
            let backward = self
                .reverse
                .get(current)
                .into_iter()
                .flatten()
                .map(|(next, tf)| (next.as_str(), tf.inverse()));

            for (next, edge_tf) in forward.chain(backward) {
                if !visited.insert(next) {
                    continue;
                }
                let composed = accumulated.compose(edge_tf);
                if next == goal {
                    return Some(composed);
                }
                queue.push_back((next, composed));
            }
        }

        None
    }

    fn check_stamp(&self, target_frame: &str, point: &StampedPoint) -> Result<(), KnowledgeError> {
        let Some(max_age) = self.max_stamp_age else {
            return Ok(());
        };
        let age = Utc::now() - point.header.stamp;
        let reason = if age > max_age {
            format!(
                "stamp {} is older than the {} ms transform history",
                point.header.stamp,
                max_age.num_milliseconds()
            )
        } else if age < -max_age {
            format!("stamp {} would require extrapolation into the future", point.header.stamp)
        } else {
            return Ok(());
        };
        Err(unavailable(point, target_frame, reason))
    }
}

impl TransformLookup for TfEngine {
    fn transform_point(
        &self,
        target_frame: &str,
        point: &StampedPoint,
    ) -> Result<StampedPoint, KnowledgeError> {
        self.check_stamp(target_frame, point)?;

        let source_frame = point.header.frame_id.as_str();
        if source_frame.is_empty() {
            return Err(unavailable(point, target_frame, "point has no frame_id".to_string()));
        }

        let tf = self.lookup(target_frame, source_frame).ok_or_else(|| {
            unavailable(
                point,
                target_frame,
                format!("frames '{source_frame}' and '{target_frame}' are not connected"),
            )
        })?;

        let mapped = tf.apply(point.point.into());
        debug!(
            source = source_frame,
            target = target_frame,
            x = mapped.x,
            y = mapped.y,
            z = mapped.z,
            "transformed point"
        );
        Ok(StampedPoint::new(target_frame, point.header.stamp, mapped.into()))
    }
}

/// Frame name without its leading `/`.
pub fn canonical_frame(name: &str) -> &str {
    name.trim_start_matches('/')
}

fn unavailable(point: &StampedPoint, target_frame: &str, reason: String) -> KnowledgeError {
    KnowledgeError::TransformUnavailable {
        source_frame: point.header.frame_id.clone(),
        target_frame: target_frame.to_string(),
        reason,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

    fn assert_matrix_close(a: [[f64; 3]; 3], b: [[f64; 3]; 3]) {
        for r in 0..3 {
            for c in 0..3 {
                assert!(
                    (a[r][c] - b[r][c]).abs() < 1e-9,
                    "cell ({r},{c}): {} vs {}",
                    a[r][c],
                    b[r][c]
                );
            }
        }
    }

    fn rot_x(a: f64) -> [[f64; 3]; 3] {
        [[1.0, 0.0, 0.0], [0.0, a.cos(), -a.sin()], [0.0, a.sin(), a.cos()]]
    }

    fn rot_y(a: f64) -> [[f64; 3]; 3] {
        [[a.cos(), 0.0, a.sin()], [0.0, 1.0, 0.0], [-a.sin(), 0.0, a.cos()]]
    }

    fn rot_z(a: f64) -> [[f64; 3]; 3] {
        [[a.cos(), -a.sin(), 0.0], [a.sin(), a.cos(), 0.0], [0.0, 0.0, 1.0]]
    }

    fn matmul(a: [[f64; 3]; 3], b: [[f64; 3]; 3]) -> [[f64; 3]; 3] {
        let mut out = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                out[r][c] = (0..3).map(|k| a[r][k] * b[k][c]).sum();
            }
        }
        out
    }

    // ── Quaternion ──────────────────────────────────────────────────────────

    #[test]
    fn quaternion_identity_rotate_is_noop() {
        let q = Quaternion::identity();
        let r = q.rotate(Vec3::new(1.0, 2.0, 3.0));
        assert!((r.x - 1.0).abs() < 1e-12);
        assert!((r.y - 2.0).abs() < 1e-12);
        assert!((r.z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_y() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let r = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-12, "x should be ~0, got {}", r.x);
        assert!((r.y - 1.0).abs() < 1e-12, "y should be ~1, got {}", r.y);
        assert!(r.z.abs() < 1e-12);
    }

    #[test]
    fn quaternion_conjugate_is_inverse() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let prod = q.mul(q.conjugate());
        assert!((prod.w - 1.0).abs() < 1e-12);
        assert!(prod.x.abs() < 1e-12);
        assert!(prod.y.abs() < 1e-12);
        assert!(prod.z.abs() < 1e-12);
    }

    #[test]
    fn identity_matrix_gives_identity_quaternion() {
        let q = Quaternion::from_rotation_matrix(rot_z(0.0));
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn yaw_matrix_gives_yaw_quaternion() {
        let q = Quaternion::from_rotation_matrix(rot_z(FRAC_PI_2));
        assert!((q.w - FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((q.z - FRAC_1_SQRT_2).abs() < 1e-12);
        assert!(q.x.abs() < 1e-12 && q.y.abs() < 1e-12);
    }

    #[test]
    fn matrix_roundtrip_for_assorted_rotations() {
        let cases = [
            rot_x(0.3),
            rot_y(-1.1),
            rot_z(2.5),
            rot_x(1e-9),
            matmul(rot_z(0.7), matmul(rot_y(-0.4), rot_x(1.9))),
            matmul(rot_x(PI - 1e-7), rot_z(0.2)),
        ];
        for m in cases {
            let q = Quaternion::from_rotation_matrix(m);
            assert!((q.norm() - 1.0).abs() < 1e-12, "norm {}", q.norm());
            assert!(q.w >= 0.0);
            assert_matrix_close(q.to_rotation_matrix(), m);
        }
    }

    #[test]
    fn half_turns_about_each_axis_are_stable() {
        for (m, axis) in [(rot_x(PI), 0), (rot_y(PI), 1), (rot_z(PI), 2)] {
            let q = Quaternion::from_rotation_matrix(m);
            let parts = [q.x, q.y, q.z];
            assert!(q.w.abs() < 1e-9, "w should vanish for a half turn");
            assert!((parts[axis].abs() - 1.0).abs() < 1e-9);
            assert_matrix_close(q.to_rotation_matrix(), m);
        }
    }

    // ── Transform3D ─────────────────────────────────────────────────────────

    #[test]
    fn transform_identity_compose_is_noop() {
        let t = Transform3D::new(Vec3::new(1.0, 2.0, 3.0), Quaternion::identity());
        let composed = Transform3D::identity().compose(t);
        assert_eq!(composed.translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn transform_inverse_undoes_apply() {
        let q = Quaternion::from_rotation_matrix(matmul(rot_z(0.8), rot_x(-0.3)));
        let t = Transform3D::new(Vec3::new(0.4, -1.2, 2.0), q);
        let p = Vec3::new(3.0, 1.0, -0.5);
        let back = t.inverse().apply(t.apply(p));
        assert!((back.x - p.x).abs() < 1e-12);
        assert!((back.y - p.y).abs() < 1e-12);
        assert!((back.z - p.z).abs() < 1e-12);
    }

    // ── TfEngine ────────────────────────────────────────────────────────────

    #[test]
    fn lookup_same_frame_returns_identity() {
        let tf = TfEngine::new();
        assert_eq!(tf.lookup("/map", "map"), Some(Transform3D::identity()));
    }

    #[test]
    fn lookup_composed_chain() {
        let mut tf = TfEngine::new();
        tf.set_transform(
            "/odom_combined",
            "/base_link",
            Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity()),
        );
        tf.set_transform(
            "/base_link",
            "/camera",
            Transform3D::new(Vec3::new(0.5, 0.0, 0.0), Quaternion::identity()),
        );
        let t = tf.lookup("/odom_combined", "/camera").unwrap();
        assert!((t.translation.x - 1.5).abs() < 1e-12);
    }

    #[test]
    fn lookup_walks_edges_backwards() {
        let mut tf = TfEngine::new();
        tf.set_transform(
            "/odom_combined",
            "/base_link",
            Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity()),
        );
        let t = tf.lookup("/base_link", "/odom_combined").unwrap();
        assert!((t.translation.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn lookup_no_path_returns_none() {
        let mut tf = TfEngine::new();
        tf.set_transform("/map", "/odom_combined", Transform3D::identity());
        tf.set_transform("/kitchen", "/fridge", Transform3D::identity());
        assert!(tf.lookup("/map", "/fridge").is_none());
        assert!(tf.lookup("/map", "/ghost_frame").is_none());
    }

    #[test]
    fn set_transform_overrides_previous() {
        let mut tf = TfEngine::new();
        tf.set_transform(
            "/map",
            "/sensor",
            Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity()),
        );
        tf.set_transform(
            "/map",
            "/sensor",
            Transform3D::new(Vec3::new(5.0, 0.0, 0.0), Quaternion::identity()),
        );
        assert!((tf.lookup("/map", "/sensor").unwrap().translation.x - 5.0).abs() < 1e-12);
        assert!((tf.lookup("/sensor", "/map").unwrap().translation.x + 5.0).abs() < 1e-12);
    }

    #[test]
    fn lookup_respects_rotation_in_chain() {
        // base_link sits at the origin rotated 90° about Z; the camera is 1 m
        // along base_link's local +X, so it ends up at (0, 1, 0).
        let q90z = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let mut tf = TfEngine::new();
        tf.set_transform("/odom_combined", "/base_link", Transform3D::new(Vec3::zero(), q90z));
        tf.set_transform(
            "/base_link",
            "/camera",
            Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity()),
        );
        let t = tf.lookup("/odom_combined", "/camera").unwrap();
        assert!(t.translation.x.abs() < 1e-12, "x={}", t.translation.x);
        assert!((t.translation.y - 1.0).abs() < 1e-12, "y={}", t.translation.y);
    }

    #[test]
    fn frames_lists_both_ends_of_every_edge() {
        let mut tf = TfEngine::new();
        tf.set_transform("/odom_combined", "/camera", Transform3D::identity());
        assert_eq!(tf.frames(), vec!["/camera", "/odom_combined"]);
    }

    #[test]
    fn transform_point_maps_into_target_frame() {
        let mut tf = TfEngine::new();
        tf.set_transform(
            "/odom_combined",
            "/camera",
            Transform3D::new(Vec3::new(0.0, 0.0, 1.0), Quaternion::identity()),
        );
        let input = StampedPoint::new("/camera", Utc::now(), Point3::new(1.0, 2.0, 0.0));
        let out = tf.transform_point("/odom_combined", &input).unwrap();
        assert_eq!(out.header.frame_id, "/odom_combined");
        assert_eq!(out.header.stamp, input.header.stamp);
        assert_eq!(out.point, Point3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn transform_point_unknown_frame_is_unavailable() {
        let tf = TfEngine::new();
        let input = StampedPoint::new("/camera", Utc::now(), Point3::default());
        let err = tf.transform_point("/odom_combined", &input).unwrap_err();
        assert!(matches!(err, KnowledgeError::TransformUnavailable { .. }));
    }

    #[test]
    fn transform_point_rejects_stale_and_future_stamps() {
        let mut tf = TfEngine::new().with_max_stamp_age(Duration::seconds(10));
        tf.set_transform("/odom_combined", "/camera", Transform3D::identity());

        let stale = StampedPoint::new("/camera", Utc::now() - Duration::seconds(60), Point3::default());
        assert!(tf.transform_point("/odom_combined", &stale).is_err());

        let future = StampedPoint::new("/camera", Utc::now() + Duration::seconds(60), Point3::default());
        assert!(tf.transform_point("/odom_combined", &future).is_err());

        let fresh = StampedPoint::new("/camera", Utc::now(), Point3::default());
        assert!(tf.transform_point("/odom_combined", &fresh).is_ok());
    }
}
