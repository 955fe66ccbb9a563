//! Invalidation events for Pathlight
//!
//! Every input change that affects the rendered image must be reported to the
//! accumulation controller before the next frame, otherwise the GPU running
//! average silently blends samples from different scene states.

/// An image-affecting input change that forces progressive accumulation to
/// restart from frame zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Camera position or orientation changed
    CameraMoved,
    /// An object's geometry (position, radius, extents) was edited
    ObjectEdited { index: usize },
    /// An object's material was edited
    MaterialEdited { index: usize },
    /// A sampling parameter changed (samples/pixel, ray depth, focal length,
    /// aperture diameter)
    SamplingChanged,
    /// The environment map was swapped
    EnvironmentChanged,
    /// The output image was resized
    Resized { width: u32, height: u32 },
}

impl Invalidation {
    /// Index of the edited object, for the per-object edit events.
    pub fn object_index(&self) -> Option<usize> {
        match self {
            Self::ObjectEdited { index } | Self::MaterialEdited { index } => Some(*index),
            _ => None,
        }
    }

    /// True for events produced by editing scene objects, as opposed to
    /// camera/render-parameter changes.
    pub fn is_scene_edit(&self) -> bool {
        matches!(self, Self::ObjectEdited { .. } | Self::MaterialEdited { .. })
    }
}
