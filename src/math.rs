//! Math types for Pathlight

pub use glam::{IVec3, Mat4, Vec2, Vec3, Vec4};

/// Axis-aligned bounding box stored as component-wise min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Degenerate box (min = `f32::MAX`, max = `f32::MIN`) that acts as the
    /// identity for [`Aabb::union`] folds. Contains nothing and overlaps
    /// nothing.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self {
            min: center - size * 0.5,
            max: center + size * 0.5,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest box containing both operands.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Inclusive per-axis interval overlap. Zero-extent boxes (and shared faces)
    /// count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// World-space ray. `direction` is expected to be normalized by the caller;
/// intersection `t` values are distances only under that assumption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test against an AABB. Returns the entry/exit parameters `(t1, t2)`
    /// with `t1 <= t2`, or `None` when the ray misses. Component-wise min/max of
    /// the two slab solutions keeps the result correct for negative direction
    /// components; zero components produce infinities that fall out of the
    /// min/max reduction.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let t0s = (aabb.min - self.origin) / self.direction;
        let t1s = (aabb.max - self.origin) / self.direction;

        let smaller = t0s.min(t1s);
        let bigger = t0s.max(t1s);

        let t1 = smaller.x.max(smaller.y).max(smaller.z);
        let t2 = bigger.x.min(bigger.y).min(bigger.z);
        (t1 <= t2).then_some((t1, t2))
    }

    /// Builds the world-space picking ray through a screen position given in
    /// normalized device coordinates ([-1, 1] on both axes).
    pub fn from_ndc(inv_projection: Mat4, inv_view: Mat4, eye: Vec3, ndc: Vec2) -> Self {
        let mut ray_eye = inv_projection * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        ray_eye.z = -1.0;
        ray_eye.w = 0.0;
        let direction = (inv_view * ray_eye).truncate().normalize();
        Self {
            origin: eye,
            direction,
        }
    }
}

/// The `t` a hit reports as its distance: `t1` unless the origin is inside the
/// surface (negative entry), in which case the exit `t2`.
pub fn smallest_positive(t1: f32, t2: f32) -> f32 {
    if t1 < 0.0 { t2 } else { t1 }
}
