//! Surface materials for path-traced objects.
//!
//! A material describes one BSDF lobe mix: a specular chance, a refraction
//! chance, and an implicit diffuse remainder, so the three always sum to
//! exactly 1. The chance fields are private and every way of setting them
//! clamps rather than errors; the shader relies on the sum invariant and has
//! no way to report a violation.

use crate::gpu::MaterialRecord;
use crate::math::Vec3;

/// Surface material, embedded in every object's GPU record.
///
/// Invariants (maintained by construction and all setters):
/// - `specular_chance + refraction_chance <= 1`, the remainder is diffuse
/// - `ior >= 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub albedo: Vec3,
    pub emissive: Vec3,
    /// Absorbance color applied to light travelling inside the medium
    pub refraction_color: Vec3,
    pub specular_roughness: f32,
    pub refraction_roughness: f32,
    specular_chance: f32,
    refraction_chance: f32,
    ior: f32,
}

impl Material {
    /// Plain white diffuse surface.
    pub const ZERO: Self = Self {
        albedo: Vec3::ONE,
        emissive: Vec3::ZERO,
        refraction_color: Vec3::ZERO,
        specular_roughness: 0.0,
        refraction_roughness: 0.0,
        specular_chance: 0.0,
        refraction_chance: 0.0,
        ior: 1.0,
    };

    /// Perfect mirror.
    pub const MIRROR: Self = Self {
        specular_chance: 1.0,
        ..Self::ZERO
    };

    /// Clear glass.
    pub const GLASS: Self = Self {
        albedo: Vec3::ZERO,
        refraction_chance: 1.0,
        ior: 1.5,
        ..Self::ZERO
    };

    /// White area light.
    pub const LIGHT: Self = Self {
        emissive: Vec3::ONE,
        ..Self::ZERO
    };

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        albedo: Vec3,
        emissive: Vec3,
        refraction_color: Vec3,
        specular_chance: f32,
        specular_roughness: f32,
        ior: f32,
        refraction_chance: f32,
        refraction_roughness: f32,
    ) -> Self {
        let specular_chance = specular_chance.clamp(0.0, 1.0);
        let mut material = Self {
            albedo,
            emissive,
            refraction_color,
            specular_roughness,
            refraction_roughness,
            specular_chance,
            refraction_chance: refraction_chance.clamp(0.0, 1.0 - specular_chance),
            ior: ior.max(1.0),
        };
        material.assert_invariants();
        material
    }

    pub fn specular_chance(&self) -> f32 {
        self.specular_chance
    }

    pub fn refraction_chance(&self) -> f32 {
        self.refraction_chance
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// Clamped into `[0, 1 - refraction_chance]`.
    pub fn set_specular_chance(&mut self, chance: f32) {
        self.specular_chance = chance.clamp(0.0, 1.0 - self.refraction_chance);
        self.assert_invariants();
    }

    /// Clamped into `[0, 1 - specular_chance]`.
    pub fn set_refraction_chance(&mut self, chance: f32) {
        self.refraction_chance = chance.clamp(0.0, 1.0 - self.specular_chance);
        self.assert_invariants();
    }

    /// Floored at 1.0 (vacuum).
    pub fn set_ior(&mut self, ior: f32) {
        self.ior = ior.max(1.0);
        self.assert_invariants();
    }

    /// Implicit diffuse remainder, `1 - specular_chance - refraction_chance`.
    pub fn diffuse_chance(&self) -> f32 {
        1.0 - self.specular_chance - self.refraction_chance
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.0..=1.0).contains(&self.specular_chance) {
            return Err("specular chance must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.refraction_chance) {
            return Err("refraction chance must be between 0.0 and 1.0");
        }
        if self.specular_chance + self.refraction_chance > 1.0 + f32::EPSILON {
            return Err("specular and refraction chances must not sum above 1.0");
        }
        if self.ior < 1.0 {
            return Err("index of refraction must be at least 1.0");
        }
        Ok(())
    }

    fn assert_invariants(&self) {
        debug_assert!(self.validate().is_ok(), "{:?}", self.validate());
    }

    /// Serializes into the shader's material block (four vec4 groups, see
    /// [`crate::gpu::layout`]).
    pub fn gpu_data(&self) -> MaterialRecord {
        MaterialRecord {
            albedo: self.albedo.to_array(),
            specular_chance: self.specular_chance,
            emissive: self.emissive.to_array(),
            specular_roughness: self.specular_roughness,
            refraction_color: self.refraction_color.to_array(),
            refraction_chance: self.refraction_chance,
            refraction_roughness: self.refraction_roughness,
            ior: self.ior,
            _pad: [0.0; 2],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_clamps_chances() {
        let material = Material::new(
            Vec3::ONE,
            Vec3::ZERO,
            Vec3::ZERO,
            0.7,
            0.0,
            1.3,
            0.9, // would push the sum to 1.6
            0.0,
        );
        assert_eq!(material.specular_chance(), 0.7);
        assert!((material.refraction_chance() - 0.3).abs() < 1e-6);
        assert!(material.validate().is_ok());
    }

    #[test]
    fn test_setters_keep_sum_at_most_one() {
        let mut material = Material::ZERO;
        material.set_specular_chance(0.6);
        material.set_refraction_chance(0.8);
        assert!((material.refraction_chance() - 0.4).abs() < 1e-6);

        material.set_specular_chance(2.0);
        assert!((material.specular_chance() - 0.6).abs() < 1e-6);
        assert!(
            material.specular_chance() + material.refraction_chance() <= 1.0 + f32::EPSILON
        );
        assert!(material.diffuse_chance().abs() < 1e-6);
    }

    #[test]
    fn test_ior_floor() {
        let mut material = Material::GLASS;
        material.set_ior(0.4);
        assert_eq!(material.ior(), 1.0);
        material.set_ior(2.4);
        assert_eq!(material.ior(), 2.4);
    }

    #[test]
    fn test_presets_valid() {
        for preset in [Material::ZERO, Material::MIRROR, Material::GLASS, Material::LIGHT] {
            assert!(preset.validate().is_ok());
        }
    }

    #[test]
    fn test_gpu_data_group_order() {
        let material = Material::new(
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(0.4, 0.5, 0.6),
            Vec3::new(0.7, 0.8, 0.9),
            0.25,
            0.5,
            1.33,
            0.25,
            0.75,
        );

        let record = material.gpu_data();
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&record));
        assert_eq!(
            floats,
            &[
                0.1, 0.2, 0.3, 0.25, // albedo | specular chance
                0.4, 0.5, 0.6, 0.5, // emissive | specular roughness
                0.7, 0.8, 0.9, 0.25, // refraction color | refraction chance
                0.75, 1.33, 0.0, 0.0, // refraction roughness, ior, padding
            ]
        );
    }
}
