//! Configuration for Pathlight

/// Configuration descriptor for a Pathlight scene.
///
/// Capacities are fixed for the lifetime of the scene: the GPU buffer is sized
/// once from `max_spheres`/`max_cuboids` and never grows. The sampling fields
/// are the image-affecting render parameters; editing any of them through
/// [`crate::scene::PathlightScene`] restarts progressive accumulation.
#[derive(Debug, Clone)]
pub struct PathlightSceneDesc {
    /// Maximum number of sphere records the GPU buffer is sized for
    pub max_spheres: usize,
    /// Maximum number of cuboid records the GPU buffer is sized for
    pub max_cuboids: usize,
    /// Cell counts of the uniform spatial grid per axis (width, height, depth)
    pub grid_dims: (u32, u32, u32),
    /// Samples traced per pixel per frame
    pub samples_per_pixel: u32,
    /// Maximum path-tracing bounce depth
    pub ray_depth: u32,
    /// Distance to the focal plane (world units)
    pub focal_length: f32,
    /// Aperture diameter for depth of field (0 disables)
    pub aperture_diameter: f32,
}

impl Default for PathlightSceneDesc {
    fn default() -> Self {
        Self {
            max_spheres: 256,
            max_cuboids: 64,
            grid_dims: (4, 4, 3),
            samples_per_pixel: 1,
            ray_depth: 8,
            focal_length: 20.0,
            aperture_diameter: 0.14,
        }
    }
}

impl PathlightSceneDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_spheres(mut self, max: usize) -> Self {
        self.max_spheres = max;
        self
    }

    pub fn max_cuboids(mut self, max: usize) -> Self {
        self.max_cuboids = max;
        self
    }

    pub fn grid_dims(mut self, width: u32, height: u32, depth: u32) -> Self {
        self.grid_dims = (width, height, depth);
        self
    }

    pub fn samples_per_pixel(mut self, ssp: u32) -> Self {
        self.samples_per_pixel = ssp;
        self
    }

    pub fn ray_depth(mut self, depth: u32) -> Self {
        self.ray_depth = depth;
        self
    }

    pub fn focal_length(mut self, length: f32) -> Self {
        self.focal_length = length;
        self
    }

    pub fn aperture_diameter(mut self, diameter: f32) -> Self {
        self.aperture_diameter = diameter;
        self
    }
}
