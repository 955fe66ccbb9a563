//! Binary layout of the records the shader reads from the scene uniform block.
//!
//! This is the compatibility-critical surface of the whole system: every field
//! here is mirrored by a struct declaration in the compute shader, with no
//! versioning. Fields are grouped into vec4s (16-byte units) per std140 uniform
//! block rules, and every record stride is a vec4 multiple. Reordering or adding
//! a field on one side without the other silently corrupts the scene on the GPU.
//!
//! The records are `#[repr(C)]` bytemuck Pods so a record *is* its wire format;
//! the `const` assertions pin each stride at compile time.

use crate::math::{Aabb, Vec3};
use bytemuck::{Pod, Zeroable};

pub const MATERIAL_STRIDE: usize = 64;
pub const SPHERE_STRIDE: usize = 80;
pub const CUBOID_STRIDE: usize = 96;
pub const CELL_STRIDE: usize = 32;

const _: () = assert!(size_of::<MaterialRecord>() == MATERIAL_STRIDE);
const _: () = assert!(size_of::<SphereRecord>() == SPHERE_STRIDE);
const _: () = assert!(size_of::<CuboidRecord>() == CUBOID_STRIDE);
const _: () = assert!(size_of::<CellRecord>() == CELL_STRIDE);
const _: () = assert!(SPHERE_STRIDE % 16 == 0 && CUBOID_STRIDE % 16 == 0);

/// Material block embedded in every object record: four vec4 groups.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialRecord {
    pub albedo: [f32; 3],
    pub specular_chance: f32,
    pub emissive: [f32; 3],
    pub specular_roughness: f32,
    pub refraction_color: [f32; 3],
    pub refraction_chance: f32,
    pub refraction_roughness: f32,
    pub ior: f32,
    pub _pad: [f32; 2],
}

/// `{center.xyz, radius}` followed by the material block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereRecord {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: MaterialRecord,
}

/// `{min.xyz, _}, {max.xyz, _}` followed by the material block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CuboidRecord {
    pub min: [f32; 3],
    pub _pad0: f32,
    pub max: [f32; 3],
    pub _pad1: f32,
    pub material: MaterialRecord,
}

/// Spatial grid cell as the traversal shader sees it: the cell AABB with its
/// half-open `[start, end)` range into the shared index array packed into the
/// w components.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CellRecord {
    pub min: [f32; 3],
    pub start: f32,
    pub max: [f32; 3],
    pub end: f32,
}

impl CellRecord {
    pub fn new(aabb: &Aabb, start: u32, end: u32) -> Self {
        Self {
            min: aabb.min.to_array(),
            start: start as f32,
            max: aabb.max.to_array(),
            end: end as f32,
        }
    }
}

/// Tagged serialized object record. The discriminant never reaches the GPU;
/// sphere and cuboid records live in separate regions of the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectRecord {
    Sphere(SphereRecord),
    Cuboid(CuboidRecord),
}

impl ObjectRecord {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Sphere(record) => bytemuck::bytes_of(record),
            Self::Cuboid(record) => bytemuck::bytes_of(record),
        }
    }
}

/// Byte layout of the scene buffer: one fixed-stride record array per object
/// kind, spheres first, cuboids after. Capacities are fixed at scene creation.
///
/// Offsets are pure arithmetic; staying inside `capacity()` is the caller's
/// obligation (instances are handed out densely by the scene, which enforces
/// the per-kind maxima at `add_*` time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneBufferLayout {
    pub max_spheres: usize,
    pub max_cuboids: usize,
}

impl SceneBufferLayout {
    pub fn new(max_spheres: usize, max_cuboids: usize) -> Self {
        Self {
            max_spheres,
            max_cuboids,
        }
    }

    pub fn sphere_offset(&self, instance: u32) -> usize {
        debug_assert!((instance as usize) < self.max_spheres);
        instance as usize * SPHERE_STRIDE
    }

    pub fn cuboid_base(&self) -> usize {
        self.max_spheres * SPHERE_STRIDE
    }

    pub fn cuboid_offset(&self, instance: u32) -> usize {
        debug_assert!((instance as usize) < self.max_cuboids);
        self.cuboid_base() + instance as usize * CUBOID_STRIDE
    }

    /// Total byte size the backing buffer must be allocated with.
    pub fn capacity(&self) -> usize {
        self.cuboid_base() + self.max_cuboids * CUBOID_STRIDE
    }
}
