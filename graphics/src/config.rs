//! Renderer configuration.

/// Uniform names the frame driver fills automatically.
///
/// Frame values come from [`FrameUniforms`](crate::scene::FrameUniforms),
/// instance values from the [`Drawable`](crate::scene::Drawable), and light
/// values from the light the drawable references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinUniformNames {
    pub view_proj: String,
    pub time: String,
    pub model: String,
    /// Receives the drawable's tint, when it has one.
    pub color: String,
    pub light_position: String,
    pub light_color: String,
    pub light_radius: String,
}

impl Default for BuiltinUniformNames {
    fn default() -> Self {
        Self {
            view_proj: "u_view_proj".to_string(),
            time: "u_time".to_string(),
            model: "u_model".to_string(),
            color: "u_color".to_string(),
            light_position: "u_light_position".to_string(),
            light_color: "u_light_color".to_string(),
            light_radius: "u_light_radius".to_string(),
        }
    }
}

/// Configuration for a [`Renderer`](crate::scene::Renderer).
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Expected number of opaque drawables per frame.
    pub opaque_capacity: usize,
    /// Expected number of blended or alpha-tested drawables per frame.
    pub transparent_capacity: usize,
    /// Expected number of materials.
    pub material_capacity: usize,
    /// Poll the backend for asynchronous errors at the start of each frame.
    pub poll_errors: bool,
    pub uniform_names: BuiltinUniformNames,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            opaque_capacity: 256,
            transparent_capacity: 64,
            material_capacity: 16,
            poll_errors: true,
            uniform_names: BuiltinUniformNames::default(),
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket_capacity(mut self, opaque: usize, transparent: usize) -> Self {
        self.opaque_capacity = opaque;
        self.transparent_capacity = transparent;
        self
    }

    pub fn with_material_capacity(mut self, capacity: usize) -> Self {
        self.material_capacity = capacity;
        self
    }

    pub fn with_error_polling(mut self, enabled: bool) -> Self {
        self.poll_errors = enabled;
        self
    }

    pub fn with_uniform_names(mut self, names: BuiltinUniformNames) -> Self {
        self.uniform_names = names;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let names = BuiltinUniformNames::default();
        assert_eq!(names.view_proj, "u_view_proj");
        assert_eq!(names.light_radius, "u_light_radius");
    }

    #[test]
    fn test_builder() {
        let config = RendererConfig::new()
            .with_bucket_capacity(8, 2)
            .with_error_polling(false);
        assert_eq!(config.opaque_capacity, 8);
        assert_eq!(config.transparent_capacity, 2);
        assert!(!config.poll_errors);
    }
}
