//! The scene context: authoritative object list, GPU buffer synchronization,
//! spatial index, accumulation control and the cross-thread task queue, owned
//! by one object passed around explicitly.

use crate::accum::AccumulationController;
use crate::config::PathlightSceneDesc;
use crate::error::{PathlightError, Result};
use crate::events::Invalidation;
use crate::gpu::{GpuBuffer, SceneBufferLayout};
use crate::grid::Grid;
use crate::math::{Ray, Vec3, smallest_positive};
use crate::scene::object::{Cuboid, Geometry, SceneObject, Shape, Sphere};
use crate::scene::Material;
use crate::tasks::{TaskQueue, TaskSender};

/// Result of a picking query: the hit object's index in the scene's object
/// list, both intersection roots, and the relevant distance `t`
/// (`t1` unless the origin was inside the object, then `t2`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub index: usize,
    pub t1: f32,
    pub t2: f32,
    pub t: f32,
}

/// Live object counts, uploaded separately from the record arrays so the
/// shader knows the used extent of each fixed-capacity array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneCounts {
    pub num_spheres: u32,
    pub num_cuboids: u32,
}

impl SceneCounts {
    /// The uvec2 uniform value mirroring the shader's `uboGameObjectsSize`.
    pub fn as_uniform(&self) -> [u32; 2] {
        [self.num_spheres, self.num_cuboids]
    }
}

/// Central context of the CPU-side layer. Owns every collection and counter
/// the original spread across globals: the object list, the live counts, the
/// GPU buffer, the spatial grid, the accumulation controller and the task
/// queue. Runs on the owning (graphics) thread.
pub struct PathlightScene<B: GpuBuffer> {
    desc: PathlightSceneDesc,
    layout: SceneBufferLayout,
    objects: Vec<SceneObject>,
    counts: SceneCounts,
    buffer: B,
    grid: Option<Grid>,
    accumulation: AccumulationController,
    tasks: TaskQueue,
}

impl<B: GpuBuffer> PathlightScene<B> {
    /// Creates the scene over a buffer pre-sized for the descriptor's
    /// capacities. Fails fast on a zero-sized grid axis or an undersized
    /// buffer; nothing here is recoverable in-session.
    pub fn new(desc: PathlightSceneDesc, buffer: B) -> Result<Self> {
        let (gw, gh, gd) = desc.grid_dims;
        if gw == 0 || gh == 0 || gd == 0 {
            return Err(PathlightError::Configuration(format!(
                "grid dimensions must be non-zero, got {}x{}x{}",
                gw, gh, gd
            )));
        }

        let layout = SceneBufferLayout::new(desc.max_spheres, desc.max_cuboids);
        if buffer.capacity() < layout.capacity() {
            return Err(PathlightError::Configuration(format!(
                "scene buffer holds {} bytes but the layout needs {}",
                buffer.capacity(),
                layout.capacity()
            )));
        }

        log::debug!(
            "scene created: {} sphere + {} cuboid slots, {} byte buffer, {}x{}x{} grid",
            desc.max_spheres,
            desc.max_cuboids,
            layout.capacity(),
            gw,
            gh,
            gd
        );

        Ok(Self {
            desc,
            layout,
            objects: Vec::new(),
            counts: SceneCounts::default(),
            buffer,
            grid: None,
            accumulation: AccumulationController::new(),
            tasks: TaskQueue::new(),
        })
    }

    pub fn desc(&self) -> &PathlightSceneDesc {
        &self.desc
    }

    pub fn layout(&self) -> &SceneBufferLayout {
        &self.layout
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    /// Mutable access for field edits. The buffer is not touched: every edit
    /// must be followed by [`upload_object`](Self::upload_object) (or use the
    /// [`set_position`](Self::set_position)/[`set_material`](Self::set_material)
    /// helpers), otherwise the GPU keeps rendering the stale record.
    pub fn object_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn counts(&self) -> SceneCounts {
        self.counts
    }

    /// Adds a sphere, uploads its record, and returns its instance index
    /// within the sphere array.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: Material) -> Result<u32> {
        if self.counts.num_spheres as usize >= self.desc.max_spheres {
            return Err(PathlightError::CapacityExceeded {
                kind: "sphere",
                max: self.desc.max_spheres,
            });
        }
        let instance = self.counts.num_spheres;
        let shape = Shape::Sphere(Sphere::new(center, radius));
        self.push_object(SceneObject::new(shape, material, instance));
        self.counts.num_spheres += 1;
        Ok(instance)
    }

    /// Adds a cuboid, uploads its record, and returns its instance index
    /// within the cuboid array.
    pub fn add_cuboid(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        material: Material,
    ) -> Result<u32> {
        if self.counts.num_cuboids as usize >= self.desc.max_cuboids {
            return Err(PathlightError::CapacityExceeded {
                kind: "cuboid",
                max: self.desc.max_cuboids,
            });
        }
        let instance = self.counts.num_cuboids;
        let shape = Shape::Cuboid(Cuboid::new(center, half_extents));
        self.push_object(SceneObject::new(shape, material, instance));
        self.counts.num_cuboids += 1;
        Ok(instance)
    }

    // The record write happens before the caller bumps the live count: a
    // shader reading the new count must never see an unwritten record.
    fn push_object(&mut self, object: SceneObject) {
        object.upload(&self.layout, &mut self.buffer);
        log::debug!(
            "added {} instance {} at {:?}",
            object.shape.kind_name(),
            object.instance(),
            object.position()
        );
        let index = self.objects.len();
        self.objects.push(object);
        self.accumulation.invalidate(Invalidation::ObjectEdited { index });
    }

    /// Re-serializes an object into the buffer after field edits and restarts
    /// accumulation. Call once per edited object per frame; uploads are
    /// immediately-visible single writes with no transactional grouping.
    pub fn upload_object(&mut self, index: usize) {
        if let Some(object) = self.objects.get(index) {
            object.upload(&self.layout, &mut self.buffer);
            self.accumulation.invalidate(Invalidation::ObjectEdited { index });
        } else {
            log::warn!("upload_object({index}) ignored: no such object");
        }
    }

    /// Moves an object and synchronizes the GPU record (GUI edit path).
    pub fn set_position(&mut self, index: usize, position: Vec3) {
        if let Some(object) = self.objects.get_mut(index) {
            object.set_position(position);
            object.upload(&self.layout, &mut self.buffer);
            self.accumulation.invalidate(Invalidation::ObjectEdited { index });
        }
    }

    /// Replaces an object's material and synchronizes the GPU record.
    pub fn set_material(&mut self, index: usize, material: Material) {
        if let Some(object) = self.objects.get_mut(index) {
            object.material = material;
            object.upload(&self.layout, &mut self.buffer);
            self.accumulation
                .invalidate(Invalidation::MaterialEdited { index });
        }
    }

    pub fn set_samples_per_pixel(&mut self, ssp: u32) {
        self.desc.samples_per_pixel = ssp;
        self.accumulation.invalidate(Invalidation::SamplingChanged);
    }

    pub fn set_ray_depth(&mut self, depth: u32) {
        self.desc.ray_depth = depth;
        self.accumulation.invalidate(Invalidation::SamplingChanged);
    }

    pub fn set_focal_length(&mut self, length: f32) {
        self.desc.focal_length = length;
        self.accumulation.invalidate(Invalidation::SamplingChanged);
    }

    pub fn set_aperture_diameter(&mut self, diameter: f32) {
        self.desc.aperture_diameter = diameter;
        self.accumulation.invalidate(Invalidation::SamplingChanged);
    }

    /// Reports an image-affecting change owned by an external collaborator
    /// (camera movement, environment map swap, resize).
    pub fn notify(&mut self, event: Invalidation) {
        self.accumulation.invalidate(event);
    }

    pub fn accumulation(&self) -> &AccumulationController {
        &self.accumulation
    }

    /// Render tick: returns the accumulation frame uniform for this frame.
    pub fn begin_frame(&mut self) -> u32 {
        self.accumulation.begin_frame()
    }

    pub fn needs_reset(&self) -> bool {
        self.accumulation.needs_reset()
    }

    pub fn consume_reset(&mut self) -> bool {
        self.accumulation.consume_reset()
    }

    pub fn frame(&self) -> u32 {
        self.accumulation.frame()
    }

    /// Rebuilds the spatial grid from the current object set. A no-op on an
    /// empty scene (the scene AABB would be degenerate).
    pub fn rebuild_grid(&mut self) {
        if self.objects.is_empty() {
            log::warn!("grid rebuild skipped: scene is empty");
            self.grid = None;
            return;
        }
        self.grid = Some(Grid::build(self.desc.grid_dims, &self.objects));
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Linear-scan picking: exact-tests every object and keeps the closest
    /// valid hit. Candidates fully behind the origin (`t2 <= 0`) are skipped.
    pub fn ray_trace(&self, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        let mut t_min = f32::MAX;
        for (index, object) in self.objects.iter().enumerate() {
            let Some((t1, t2)) = object.intersect_ray(ray) else {
                continue;
            };
            if t2 > 0.0 && t1 < t_min {
                t_min = smallest_positive(t1, t2);
                best = Some(RayHit { index, t1, t2, t: t_min });
            }
        }
        best
    }

    /// Grid-accelerated picking, functionally equivalent to
    /// [`ray_trace`](Self::ray_trace). Falls back to the linear scan when the
    /// grid has not been built.
    pub fn ray_trace_grid(&self, ray: &Ray) -> Option<RayHit> {
        match &self.grid {
            Some(grid) => grid.ray_query(ray, &self.objects),
            None => self.ray_trace(ray),
        }
    }

    /// Submission handle for background threads that need work to run on the
    /// owning thread.
    pub fn task_sender(&self) -> TaskSender {
        self.tasks.sender()
    }

    /// Owning-thread tick: runs everything queued by background threads.
    pub fn drain_tasks(&self) -> usize {
        self.tasks.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{CpuStagingBuffer, SPHERE_STRIDE, SphereRecord};

    fn small_scene() -> PathlightScene<CpuStagingBuffer> {
        let _ = env_logger::builder().is_test(true).try_init();
        let desc = PathlightSceneDesc::new()
            .max_spheres(4)
            .max_cuboids(2)
            .grid_dims(2, 1, 1);
        let buffer = CpuStagingBuffer::new(SceneBufferLayout::new(4, 2).capacity());
        PathlightScene::new(desc, buffer).unwrap()
    }

    fn read_sphere(scene: &PathlightScene<CpuStagingBuffer>, instance: u32) -> SphereRecord {
        let offset = instance as usize * SPHERE_STRIDE;
        bytemuck::pod_read_unaligned(&scene.buffer().bytes()[offset..offset + SPHERE_STRIDE])
    }

    #[test]
    fn test_rejects_undersized_buffer() {
        let desc = PathlightSceneDesc::new().max_spheres(4).max_cuboids(2);
        let buffer = CpuStagingBuffer::new(16);
        assert!(matches!(
            PathlightScene::new(desc, buffer),
            Err(PathlightError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_zero_grid_axis() {
        let desc = PathlightSceneDesc::new().grid_dims(4, 0, 3);
        let buffer = CpuStagingBuffer::new(SceneBufferLayout::new(256, 64).capacity());
        assert!(PathlightScene::new(desc, buffer).is_err());
    }

    #[test]
    fn test_add_assigns_dense_per_kind_instances() {
        let mut scene = small_scene();
        assert_eq!(scene.add_sphere(Vec3::ZERO, 1.0, Material::ZERO).unwrap(), 0);
        assert_eq!(
            scene.add_cuboid(Vec3::ONE, Vec3::ONE, Material::ZERO).unwrap(),
            0
        );
        assert_eq!(scene.add_sphere(Vec3::ONE, 1.0, Material::ZERO).unwrap(), 1);
        assert_eq!(scene.counts().as_uniform(), [2, 1]);
    }

    #[test]
    fn test_capacity_exceeded_fails_fast() {
        let mut scene = small_scene();
        for _ in 0..4 {
            scene.add_sphere(Vec3::ZERO, 1.0, Material::ZERO).unwrap();
        }
        assert!(matches!(
            scene.add_sphere(Vec3::ZERO, 1.0, Material::ZERO),
            Err(PathlightError::CapacityExceeded { kind: "sphere", max: 4 })
        ));
        // Counts unchanged after the failed add.
        assert_eq!(scene.counts().num_spheres, 4);
    }

    #[test]
    fn test_add_uploads_record_and_invalidates() {
        let mut scene = small_scene();
        scene.begin_frame();
        assert!(!scene.needs_reset());

        let instance = scene
            .add_sphere(Vec3::new(1.0, 2.0, 3.0), 0.5, Material::MIRROR)
            .unwrap();
        assert!(scene.needs_reset());

        let record = read_sphere(&scene, instance);
        assert_eq!(Vec3::from_array(record.center), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(record.radius, 0.5);
        assert_eq!(record.material.specular_chance, 1.0);
    }

    #[test]
    fn test_edit_requires_explicit_upload() {
        let mut scene = small_scene();
        let instance = scene.add_sphere(Vec3::ZERO, 1.0, Material::ZERO).unwrap();

        // Mutate without uploading: the GPU-side record is stale.
        scene.object_mut(0).unwrap().set_position(Vec3::new(9.0, 0.0, 0.0));
        assert_eq!(Vec3::from_array(read_sphere(&scene, instance).center), Vec3::ZERO);

        scene.upload_object(0);
        assert_eq!(
            Vec3::from_array(read_sphere(&scene, instance).center),
            Vec3::new(9.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_set_material_syncs_and_resets() {
        let mut scene = small_scene();
        scene.add_sphere(Vec3::ZERO, 1.0, Material::ZERO).unwrap();
        scene.begin_frame();

        scene.set_material(0, Material::GLASS);
        assert!(scene.needs_reset());
        assert_eq!(read_sphere(&scene, 0).material.refraction_chance, 1.0);
    }

    #[test]
    fn test_sampling_setters_reset_accumulation() {
        let mut scene = small_scene();
        scene.begin_frame();
        scene.set_focal_length(35.0);
        assert!(scene.needs_reset());
        assert_eq!(scene.begin_frame(), 0);

        scene.set_samples_per_pixel(4);
        assert!(scene.needs_reset());
        assert_eq!(scene.desc().samples_per_pixel, 4);
    }

    #[test]
    fn test_linear_and_grid_picking_agree() {
        let mut scene = small_scene();
        scene
            .add_sphere(Vec3::new(-5.0, 0.0, 0.0), 1.0, Material::ZERO)
            .unwrap();
        scene
            .add_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0, Material::ZERO)
            .unwrap();
        scene
            .add_cuboid(Vec3::new(0.0, -3.0, 0.0), Vec3::new(6.0, 0.5, 6.0), Material::ZERO)
            .unwrap();
        scene.rebuild_grid();

        let rays = [
            Ray::new(Vec3::new(-5.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)),
            Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)),
            Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
            Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        ];
        for ray in rays {
            let linear = scene.ray_trace(&ray);
            let grid = scene.ray_trace_grid(&ray);
            match (linear, grid) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    assert_eq!(a.index, b.index);
                    assert!((a.t - b.t).abs() < 1e-5);
                }
                other => panic!("picking paths disagree: {:?}", other),
            }
        }
    }

    #[test]
    fn test_pick_through_sphere_center_distance() {
        let mut scene = small_scene();
        scene
            .add_sphere(Vec3::new(0.0, 0.0, -20.0), 2.0, Material::ZERO)
            .unwrap();
        let hit = scene
            .ray_trace(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)))
            .unwrap();
        // Relevant t is distance minus radius.
        assert!((hit.t - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_background_task_upload_path() {
        let mut scene = small_scene();
        scene.add_sphere(Vec3::ZERO, 1.0, Material::ZERO).unwrap();

        let sender = scene.task_sender();
        let worker = std::thread::spawn(move || {
            sender.submit(|| {}).unwrap();
        });
        worker.join().unwrap();
        assert_eq!(scene.drain_tasks(), 1);
    }
}
