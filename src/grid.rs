//! Uniform spatial grid over the scene bounds.
//!
//! The grid is the broad phase for interactive picking: a small fixed number
//! of cells, each holding a half-open range into a flat array of overlapping
//! object indices (an object spanning several cells appears in each of them).
//! It is rebuilt wholesale whenever the object set changes and never mutated
//! incrementally.
//!
//! Build cost is O(cells x objects), which is fine at the scene sizes this
//! targets (a few hundred primitives, a handful of cells per axis).

use crate::gpu::CellRecord;
use crate::math::{Aabb, IVec3, Ray, Vec3, smallest_positive};
use crate::scene::object::{Geometry, SceneObject};
use crate::scene::world::RayHit;

/// One grid cell: its world-space AABB and the `[start, end)` range of this
/// cell's entries in [`Grid::indices`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub aabb: Aabb,
    pub start: u32,
    pub end: u32,
}

impl Cell {
    pub fn gpu_record(&self) -> CellRecord {
        CellRecord::new(&self.aabb, self.start, self.end)
    }
}

/// Immutable-per-build uniform partition of the scene AABB into
/// width x height x depth cells, enumerated x-fastest.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    depth: u32,
    min: Vec3,
    max: Vec3,
    cell_size: Vec3,
    cells: Vec<Cell>,
    indices: Vec<u32>,
}

impl Grid {
    /// Builds the grid over the given objects.
    ///
    /// The scene AABB is the fold of every object's AABB; with an empty object
    /// set it degenerates (min > max) and the cell math produces garbage, so
    /// callers guard against building over nothing.
    pub fn build(dims: (u32, u32, u32), objects: &[SceneObject]) -> Self {
        let (width, height, depth) = dims;
        debug_assert!(width > 0 && height > 0 && depth > 0);

        let bounds = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, object| acc.union(&object.aabb()));
        let (min, max) = (bounds.min, bounds.max);
        let cell_size = (max - min) / Vec3::new(width as f32, height as f32, depth as f32);

        let mut cells = Vec::with_capacity((width * height * depth) as usize);
        let mut indices = Vec::with_capacity(objects.len());
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    let center = min
                        + cell_size * 0.5
                        + cell_size * Vec3::new(x as f32, y as f32, z as f32);
                    let aabb = Aabb::from_center_size(center, cell_size);

                    let start = indices.len() as u32;
                    for (index, object) in objects.iter().enumerate() {
                        if object.aabb().intersects(&aabb) {
                            indices.push(index as u32);
                        }
                    }
                    let end = indices.len() as u32;
                    cells.push(Cell { aabb, start, end });
                }
            }
        }

        log::debug!(
            "grid rebuilt: {}x{}x{} cells over {:?}..{:?}, {} index entries for {} objects",
            width,
            height,
            depth,
            min,
            max,
            indices.len(),
            objects.len()
        );

        Self {
            width,
            height,
            depth,
            min,
            max,
            cell_size,
            cells,
            indices,
        }
    }

    pub fn dims(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.depth)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_max(self.min, self.max)
    }

    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Flat array of object indices all cells' ranges point into.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Cell records in build (x-fastest) order, ready for a GPU upload.
    pub fn cell_records(&self) -> Vec<CellRecord> {
        self.cells.iter().map(Cell::gpu_record).collect()
    }

    /// Cell coordinate containing `world`, by rounding to the nearest cell
    /// center; `None` when the position falls outside the grid.
    pub fn grid_position(&self, world: Vec3) -> Option<IVec3> {
        let relative = (world - (self.min + self.cell_size * 0.5)) / self.cell_size;
        let coord = relative.round().as_ivec3();
        self.is_valid_position(coord).then_some(coord)
    }

    pub fn is_valid_position(&self, coord: IVec3) -> bool {
        coord.x >= 0
            && (coord.x as u32) < self.width
            && coord.y >= 0
            && (coord.y as u32) < self.height
            && coord.z >= 0
            && (coord.z as u32) < self.depth
    }

    /// Flat cell index for a valid coordinate: `x + y*width + z*width*height`.
    pub fn cell_index(&self, coord: IVec3) -> usize {
        coord.x as usize
            + coord.y as usize * self.width as usize
            + coord.z as usize * (self.width * self.height) as usize
    }

    /// Broad+narrow phase picking query: every cell whose AABB the ray enters
    /// no later than the best cell so far gets its objects exact-tested, and
    /// the closest valid hit wins.
    ///
    /// This visits cells in build order rather than marching the ray (it
    /// over-visits compared to a true DDA traversal), which is acceptable at
    /// these cell counts. `objects` must be the same slice the grid was built
    /// from.
    pub fn ray_query(&self, ray: &Ray, objects: &[SceneObject]) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        let mut t_min = f32::MAX;
        let mut cell_min = f32::MAX;

        for cell in &self.cells {
            let Some((cell_t1, cell_t2)) = ray.intersects_aabb(&cell.aabb) else {
                continue;
            };
            if cell_t2 <= 0.0 || cell_t1 > cell_min {
                continue;
            }
            for &index in &self.indices[cell.start as usize..cell.end as usize] {
                let object = &objects[index as usize];
                let Some((t1, t2)) = object.intersect_ray(ray) else {
                    continue;
                };
                if t1 <= cell_t2 && t2 > 0.0 && t1 < t_min {
                    t_min = smallest_positive(t1, t2);
                    cell_min = cell_t1;
                    best = Some(RayHit {
                        index: index as usize,
                        t1,
                        t2,
                        t: t_min,
                    });
                }
            }
        }
        best
    }
}
