//! Built-in GLSL sources.
//!
//! Include modules are resolved by [`ShaderCompiler`](super::ShaderCompiler)
//! through `#include "lumen/<name>.glsl"`. The stage pairs below back the
//! built-in material set in [`crate::materials::MaterialKind`].
//!
//! Uniform layout shared by every built-in material:
//!
//! | set | binding | contents |
//! |-----|---------|----------|
//! | 0 | 0 | `Frame { u_view_proj, u_time }` |
//! | 1 | 0 | `Object { u_model, .. }` |
//! | 1 | 1 | `Light { u_light_position, u_light_radius, u_light_color }` |
//! | 1 | 2 | `Glyph { u_color }` |
//! | 2 | 0, 1 | `u_texture`, `u_sampler` |

/// Per-frame uniform block.
const FRAME_MODULE: &str = r#"
layout(set = 0, binding = 0) uniform Frame {
    mat4 u_view_proj;
    float u_time;
};
"#;

/// Fixed directional light for the per-vertex lit materials.
const LIGHTING_MODULE: &str = r#"
const vec3 LIGHT_DIRECTION = vec3(0.267261, 0.534522, 0.801784);
const float AMBIENT = 0.2;
"#;

/// Collection of includable shader modules.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    modules: Vec<(&'static str, &'static str)>,
}

impl ShaderLibrary {
    /// The standard Lumen library: `lumen/frame.glsl`, `lumen/lighting.glsl`.
    pub fn standard() -> Self {
        Self {
            modules: vec![
                ("lumen/frame.glsl", FRAME_MODULE),
                ("lumen/lighting.glsl", LIGHTING_MODULE),
            ],
        }
    }

    /// All `(path, source)` pairs.
    pub fn modules(&self) -> &[(&'static str, &'static str)] {
        &self.modules
    }
}

// =============================================================================
// Flat lit: per-vertex lambert with a uniform color
// =============================================================================

pub const FLAT_LIT_VERTEX: &str = r#"#version 450
#include "lumen/frame.glsl"
#include "lumen/lighting.glsl"

layout(set = 1, binding = 0) uniform Object {
    mat4 u_model;
    vec4 u_color;
};

layout(location = 0) in vec3 position;
layout(location = 1) in vec3 normal;

layout(location = 0) out vec4 v_color;

void main() {
    vec3 world_normal = normalize((u_model * vec4(normal, 0.0)).xyz);
    float lambert = max(dot(world_normal, LIGHT_DIRECTION), 0.0);
    v_color = vec4(u_color.rgb * (AMBIENT + lambert), u_color.a);
    gl_Position = u_view_proj * u_model * vec4(position, 1.0);
}
"#;

pub const FLAT_LIT_FRAGMENT: &str = r#"#version 450

layout(location = 0) in vec4 v_color;

layout(location = 0) out vec4 out_color;

void main() {
    out_color = v_color;
}
"#;

// =============================================================================
// Textured lit: per-vertex lambert modulating a texture
// =============================================================================

pub const TEXTURED_LIT_VERTEX: &str = r#"#version 450
#include "lumen/frame.glsl"
#include "lumen/lighting.glsl"

layout(set = 1, binding = 0) uniform Object {
    mat4 u_model;
};

layout(location = 0) in vec3 position;
layout(location = 1) in vec3 normal;
layout(location = 2) in vec2 uv;

layout(location = 0) out vec2 v_uv;
layout(location = 1) out float v_light;

void main() {
    vec3 world_normal = normalize((u_model * vec4(normal, 0.0)).xyz);
    v_light = AMBIENT + max(dot(world_normal, LIGHT_DIRECTION), 0.0);
    v_uv = uv;
    gl_Position = u_view_proj * u_model * vec4(position, 1.0);
}
"#;

pub const TEXTURED_LIT_FRAGMENT: &str = r#"#version 450

layout(set = 2, binding = 0) uniform texture2D u_texture;
layout(set = 2, binding = 1) uniform sampler u_sampler;

layout(location = 0) in vec2 v_uv;
layout(location = 1) in float v_light;

layout(location = 0) out vec4 out_color;

void main() {
    vec4 texel = texture(sampler2D(u_texture, u_sampler), v_uv);
    out_color = vec4(texel.rgb * v_light, texel.a);
}
"#;

// =============================================================================
// Vertex color: unlit, vec4 color attribute
// =============================================================================

pub const VERTEX_COLOR_VERTEX: &str = r#"#version 450
#include "lumen/frame.glsl"

layout(set = 1, binding = 0) uniform Object {
    mat4 u_model;
};

layout(location = 0) in vec3 position;
layout(location = 1) in vec4 color;

layout(location = 0) out vec4 v_color;

void main() {
    v_color = color;
    gl_Position = u_view_proj * u_model * vec4(position, 1.0);
}
"#;

pub const VERTEX_COLOR_FRAGMENT: &str = r#"#version 450

layout(location = 0) in vec4 v_color;

layout(location = 0) out vec4 out_color;

void main() {
    out_color = v_color;
}
"#;

// =============================================================================
// Rainbow: hue cycling over uv and time
// =============================================================================

pub const RAINBOW_VERTEX: &str = r#"#version 450
#include "lumen/frame.glsl"

layout(set = 1, binding = 0) uniform Object {
    mat4 u_model;
};

layout(location = 0) in vec3 position;
layout(location = 1) in vec2 uv;

layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = uv;
    gl_Position = u_view_proj * u_model * vec4(position, 1.0);
}
"#;

pub const RAINBOW_FRAGMENT: &str = r#"#version 450
#include "lumen/frame.glsl"

layout(location = 0) in vec2 v_uv;

layout(location = 0) out vec4 out_color;

void main() {
    vec3 phase = vec3(v_uv.x, v_uv.y, v_uv.x) + vec3(0.0, 2.0, 4.0);
    out_color = vec4(0.5 + 0.5 * cos(u_time + phase), 1.0);
}
"#;

// =============================================================================
// Point light: screen-space 1/distance attenuation, blended
// =============================================================================

pub const POINT_LIGHT_VERTEX: &str = r#"#version 450
#include "lumen/frame.glsl"

layout(set = 1, binding = 0) uniform Object {
    mat4 u_model;
};

layout(location = 0) in vec3 position;

void main() {
    gl_Position = u_view_proj * u_model * vec4(position, 1.0);
}
"#;

pub const POINT_LIGHT_FRAGMENT: &str = r#"#version 450

layout(set = 1, binding = 1) uniform Light {
    vec2 u_light_position;
    float u_light_radius;
    vec4 u_light_color;
};

layout(location = 0) out vec4 out_color;

void main() {
    float d = distance(gl_FragCoord.xy, u_light_position);
    // unclamped: brightness grows without bound as d approaches zero
    float attenuation = u_light_radius * (1.0 / d);
    out_color = vec4(u_light_color.rgb, u_light_color.a * attenuation);
}
"#;

// =============================================================================
// Glyph: coverage mask, alpha-tested, tinted by an optional color
// =============================================================================

pub const GLYPH_VERTEX: &str = r#"#version 450
#include "lumen/frame.glsl"

layout(set = 1, binding = 0) uniform Object {
    mat4 u_model;
};

layout(location = 0) in vec3 position;
layout(location = 1) in vec2 uv;

layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = uv;
    gl_Position = u_view_proj * u_model * vec4(position, 1.0);
}
"#;

pub const GLYPH_FRAGMENT: &str = r#"#version 450

layout(set = 1, binding = 2) uniform Glyph {
    vec4 u_color;
};
layout(set = 2, binding = 0) uniform texture2D u_texture;
layout(set = 2, binding = 1) uniform sampler u_sampler;

layout(location = 0) in vec2 v_uv;

layout(location = 0) out vec4 out_color;

void main() {
    float coverage = texture(sampler2D(u_texture, u_sampler), v_uv).r;
    if (coverage < 0.5) {
        discard;
    }
    out_color = vec4(u_color.rgb, u_color.a * coverage);
}
"#;

// =============================================================================
// Noise: screen-space hash animated by time
// =============================================================================

pub const NOISE_VERTEX: &str = r#"#version 450
#include "lumen/frame.glsl"

layout(set = 1, binding = 0) uniform Object {
    mat4 u_model;
};

layout(location = 0) in vec3 position;

void main() {
    gl_Position = u_view_proj * u_model * vec4(position, 1.0);
}
"#;

pub const NOISE_FRAGMENT: &str = r#"#version 450
#include "lumen/frame.glsl"

layout(location = 0) out vec4 out_color;

void main() {
    vec2 seed = gl_FragCoord.xy + vec2(u_time);
    float n = fract(sin(dot(seed, vec2(12.9898, 78.233))) * 43758.5453);
    out_color = vec4(n, n, n, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_library_modules() {
        let library = ShaderLibrary::standard();
        let paths: Vec<_> = library.modules().iter().map(|(p, _)| *p).collect();
        assert_eq!(paths, vec!["lumen/frame.glsl", "lumen/lighting.glsl"]);
    }
}
