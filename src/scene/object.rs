//! Scene object model: sphere and cuboid primitives as a closed tagged
//! variant, plus the per-object GPU serialization contract.

use crate::gpu::{CuboidRecord, GpuBuffer, ObjectRecord, SceneBufferLayout, SphereRecord};
use crate::math::{Aabb, Ray, Vec3};
use crate::scene::Material;

/// Exact geometry queries shared by every primitive kind.
///
/// `intersect_ray` returns both real roots `(t1, t2)` of the surface equation,
/// unclamped: negative values mean the intersection lies behind the origin and
/// are the caller's to filter (a negative `t1` with positive `t2` is the
/// origin-inside-object case).
pub trait Geometry {
    fn aabb(&self) -> Aabb;
    fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Geometry for Sphere {
    fn aabb(&self) -> Aabb {
        Aabb {
            min: self.center - Vec3::splat(self.radius),
            max: self.center + Vec3::splat(self.radius),
        }
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        let to_origin = ray.origin - self.center;
        let b = ray.direction.dot(to_origin);
        let c = to_origin.dot(to_origin) - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        Some((-b - root, -b + root))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Cuboid {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }
}

impl Geometry for Cuboid {
    fn aabb(&self) -> Aabb {
        Aabb {
            min: self.center - self.half_extents,
            max: self.center + self.half_extents,
        }
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        ray.intersects_aabb(&self.aabb())
    }
}

/// Closed set of primitive kinds. Exhaustive matching everywhere; no dynamic
/// dispatch in the intersection loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Cuboid(Cuboid),
}

impl Shape {
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Sphere(sphere) => sphere.center,
            Self::Cuboid(cuboid) => cuboid.center,
        }
    }

    pub fn set_center(&mut self, center: Vec3) {
        match self {
            Self::Sphere(sphere) => sphere.center = center,
            Self::Cuboid(cuboid) => cuboid.center = center,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sphere(_) => "sphere",
            Self::Cuboid(_) => "cuboid",
        }
    }
}

impl Geometry for Shape {
    fn aabb(&self) -> Aabb {
        match self {
            Self::Sphere(sphere) => sphere.aabb(),
            Self::Cuboid(cuboid) => cuboid.aabb(),
        }
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        match self {
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
            Self::Cuboid(cuboid) => cuboid.intersect_ray(ray),
        }
    }
}

/// A primitive placed in the scene: shape, material, and its dense per-kind
/// `instance` slot, which fixes the object's byte offset in the GPU buffer
/// for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub shape: Shape,
    pub material: Material,
    instance: u32,
}

impl SceneObject {
    pub(crate) fn new(shape: Shape, material: Material, instance: u32) -> Self {
        Self {
            shape,
            material,
            instance,
        }
    }

    /// Zero-based slot within this object's kind array.
    pub fn instance(&self) -> u32 {
        self.instance
    }

    pub fn position(&self) -> Vec3 {
        self.shape.center()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.shape.set_center(position);
    }

    pub fn buffer_offset(&self, layout: &SceneBufferLayout) -> usize {
        match self.shape {
            Shape::Sphere(_) => layout.sphere_offset(self.instance),
            Shape::Cuboid(_) => layout.cuboid_offset(self.instance),
        }
    }

    /// Serializes into the fixed-order record the shader expects.
    pub fn gpu_record(&self) -> ObjectRecord {
        let material = self.material.gpu_data();
        match self.shape {
            Shape::Sphere(sphere) => ObjectRecord::Sphere(SphereRecord {
                center: sphere.center.to_array(),
                radius: sphere.radius,
                material,
            }),
            Shape::Cuboid(cuboid) => {
                let aabb = cuboid.aabb();
                ObjectRecord::Cuboid(CuboidRecord {
                    min: aabb.min.to_array(),
                    _pad0: 0.0,
                    max: aabb.max.to_array(),
                    _pad1: 0.0,
                    material,
                })
            }
        }
    }

    /// Writes this object's record at its assigned offset. There is no dirty
    /// tracking: every field edit must be followed by an upload, or the GPU
    /// keeps rendering the stale record with nothing to flag it.
    pub fn upload(&self, layout: &SceneBufferLayout, buffer: &mut impl GpuBuffer) {
        let record = self.gpu_record();
        buffer.sub_data(self.buffer_offset(layout), record.as_bytes());
    }
}

impl Geometry for SceneObject {
    fn aabb(&self) -> Aabb {
        self.shape.aabb()
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        self.shape.intersect_ray(ray)
    }
}
