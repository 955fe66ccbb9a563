//! Pathlight: the CPU-side layer of a real-time GPU path-tracing visualizer.
//!
//! The path tracing itself runs in a compute shader; this crate owns
//! everything the shader depends on from the CPU side:
//!
//! - an authoritative scene of sphere and cuboid primitives, kept synchronized
//!   with a fixed-layout GPU buffer through partial uploads ([`scene`], [`gpu`])
//! - a uniform spatial grid for broad-phase picking queries ([`grid`])
//! - the accumulation frame counter governing when the progressively refined
//!   image restarts ([`accum`], [`events`])
//! - a task queue so background workers can run code on the owning graphics
//!   thread ([`tasks`])
//!
//! Window plumbing, GL object lifecycles, GUI layout and image decoding are
//! external collaborators and live outside this crate.

pub mod accum;
pub mod config;
pub mod error;
pub mod events;
pub mod gpu;
pub mod grid;
pub mod math;
pub mod scene;
pub mod tasks;

pub use accum::AccumulationController;
pub use config::PathlightSceneDesc;
pub use error::{PathlightError, Result};
pub use events::Invalidation;
pub use gpu::{CpuStagingBuffer, GpuBuffer, SceneBufferLayout};
pub use grid::Grid;
pub use math::{Aabb, Ray};
pub use scene::{Material, PathlightScene, RayHit, SceneObject, Shape};
pub use tasks::{TaskHandle, TaskQueue, TaskSender};
