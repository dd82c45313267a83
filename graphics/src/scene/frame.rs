//! Per-frame uniform inputs.

use glam::{Mat4, Vec3, Vec4};

/// A light in the active light list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParameters {
    /// Screen-space or world-space position, as the consuming material expects.
    pub position: Vec3,
    pub color: Vec4,
    pub radius: f32,
}

impl LightParameters {
    pub fn new(position: Vec3, color: Vec4, radius: f32) -> Self {
        Self {
            position,
            color,
            radius,
        }
    }
}

impl Default for LightParameters {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec4::ONE, 1.0)
    }
}

/// Values shared by every draw of a frame.
///
/// Written once by the frame driver in
/// [`Renderer::begin_frame`](super::Renderer::begin_frame) and read-only for
/// the rest of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    /// Monotonic seconds since start.
    pub time: f32,
    pub view_proj: Mat4,
    pub lights: Vec<LightParameters>,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            view_proj: Mat4::IDENTITY,
            lights: Vec::new(),
        }
    }
}

impl FrameUniforms {
    pub fn new(time: f32, view_proj: Mat4) -> Self {
        Self {
            time,
            view_proj,
            lights: Vec::new(),
        }
    }

    pub fn with_light(mut self, light: LightParameters) -> Self {
        self.lights.push(light);
        self
    }

    pub fn light(&self, index: usize) -> Option<&LightParameters> {
        self.lights.get(index)
    }
}
