//! The built-in material set.
//!
//! Seven forward, single-pass techniques. Each is a tagged variant with a
//! GLSL pair from [`crate::shader::library`] and a descriptor that declares
//! exactly the attributes and uniforms its program consumes.

use std::sync::Arc;

use glam::Vec4;

use crate::backend::GpuBackend;
use crate::error::ProgramError;
use crate::program::{MaterialId, MaterialSource, ProgramCatalog};
use crate::shader::library;

use super::material::{BlendState, MaterialDescriptor, MaterialDescriptorBuilder};
use super::uniforms::{UniformSpec, UniformType};

/// Default glyph tint: opaque black.
pub const GLYPH_DEFAULT_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Built-in rendering techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Per-vertex lambert with a uniform color (default white).
    FlatLit,
    /// Per-vertex lambert modulating a texture.
    TexturedLit,
    /// Unlit, vec4 per-vertex color.
    VertexColor,
    /// Hue cycling over uv and time.
    Rainbow,
    /// Screen-space point light, `1/distance` attenuation, blended.
    PointLight,
    /// Coverage-mask glyphs, alpha-tested, optional tint (default black).
    Glyph,
    /// Screen-space hash noise animated by time.
    Noise,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 7] = [
        Self::FlatLit,
        Self::TexturedLit,
        Self::VertexColor,
        Self::Rainbow,
        Self::PointLight,
        Self::Glyph,
        Self::Noise,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlatLit => "flat_lit",
            Self::TexturedLit => "textured_lit",
            Self::VertexColor => "vertex_color",
            Self::Rainbow => "rainbow",
            Self::PointLight => "point_light",
            Self::Glyph => "glyph",
            Self::Noise => "noise",
        }
    }

    pub fn material_id(&self) -> MaterialId {
        MaterialId::new(self.name())
    }

    pub fn source(&self) -> MaterialSource {
        let (vertex, fragment) = match self {
            Self::FlatLit => (library::FLAT_LIT_VERTEX, library::FLAT_LIT_FRAGMENT),
            Self::TexturedLit => (library::TEXTURED_LIT_VERTEX, library::TEXTURED_LIT_FRAGMENT),
            Self::VertexColor => (library::VERTEX_COLOR_VERTEX, library::VERTEX_COLOR_FRAGMENT),
            Self::Rainbow => (library::RAINBOW_VERTEX, library::RAINBOW_FRAGMENT),
            Self::PointLight => (library::POINT_LIGHT_VERTEX, library::POINT_LIGHT_FRAGMENT),
            Self::Glyph => (library::GLYPH_VERTEX, library::GLYPH_FRAGMENT),
            Self::Noise => (library::NOISE_VERTEX, library::NOISE_FRAGMENT),
        };
        MaterialSource::new(vertex, fragment).with_label(self.name())
    }

    /// Build this technique's descriptor.
    pub fn descriptor(&self) -> Arc<MaterialDescriptor> {
        let base = transformed(MaterialDescriptor::builder(self.material_id()))
            .with_label(self.name());
        let builder = match self {
            Self::FlatLit => base
                .with_attribute("normal", 3)
                .with_uniform("u_color", UniformSpec::with_default(Vec4::ONE)),
            Self::TexturedLit => sampled(base.with_attribute("normal", 3).with_attribute("uv", 2)),
            Self::VertexColor => base.with_attribute("color", 4),
            Self::Rainbow => base
                .with_attribute("uv", 2)
                .with_required_uniform("u_time", UniformType::Float),
            Self::PointLight => base
                .with_required_uniform("u_light_position", UniformType::Vec2)
                .with_required_uniform("u_light_radius", UniformType::Float)
                .with_required_uniform("u_light_color", UniformType::Vec4)
                .with_blend(BlendState::alpha_blending()),
            Self::Glyph => sampled(base.with_attribute("uv", 2))
                .with_uniform("u_color", UniformSpec::with_default(GLYPH_DEFAULT_COLOR))
                .with_alpha_test(None),
            Self::Noise => base.with_required_uniform("u_time", UniformType::Float),
        };
        builder.build()
    }
}

/// Every built-in program positions vertices with the frame's view-projection
/// and the drawable's model matrix.
fn transformed(builder: MaterialDescriptorBuilder) -> MaterialDescriptorBuilder {
    builder
        .with_attribute("position", 3)
        .with_required_uniform("u_view_proj", UniformType::Mat4)
        .with_required_uniform("u_model", UniformType::Mat4)
}

fn sampled(builder: MaterialDescriptorBuilder) -> MaterialDescriptorBuilder {
    builder
        .with_required_uniform("u_texture", UniformType::Texture2d)
        .with_required_uniform("u_sampler", UniformType::Sampler)
}

/// Register every built-in material's source with `catalog` and build its
/// program eagerly, so shader problems surface at start-up.
pub fn register_builtin_materials<B: GpuBackend>(
    catalog: &mut ProgramCatalog,
    backend: &mut B,
) -> Result<(), ProgramError> {
    for kind in MaterialKind::ALL {
        catalog.register(kind.material_id(), kind.source(), backend);
        catalog.get_or_compile(&kind.material_id(), backend)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderCompiler;

    #[test]
    fn test_builtin_sources_compile() {
        let compiler = ShaderCompiler::with_standard_library();
        for kind in MaterialKind::ALL {
            let compiled = compiler.compile_pair(&kind.material_id(), &kind.source());
            assert!(compiled.is_ok(), "{}: {:?}", kind.name(), compiled.err());
        }
    }

    #[test]
    fn test_descriptors_match_declared_interfaces() {
        let compiler = ShaderCompiler::with_standard_library();
        for kind in MaterialKind::ALL {
            let compiled = compiler
                .compile_pair(&kind.material_id(), &kind.source())
                .unwrap();
            let descriptor = kind.descriptor();

            for attribute in descriptor.attributes() {
                let input = compiled.vertex.interface.input(&attribute.name);
                assert_eq!(
                    input.map(|i| i.components),
                    Some(attribute.components),
                    "{}: attribute {}",
                    kind.name(),
                    attribute.name
                );
            }
            for (name, spec) in descriptor.uniforms() {
                let declared = compiled
                    .vertex
                    .interface
                    .uniform(name)
                    .or_else(|| compiled.fragment.interface.uniform(name));
                assert_eq!(
                    declared.map(|u| u.ty),
                    Some(spec.ty),
                    "{}: uniform {}",
                    kind.name(),
                    name
                );
            }
        }
    }

    #[test]
    fn test_bucket_classification() {
        let transparent: Vec<_> = MaterialKind::ALL
            .iter()
            .filter(|k| k.descriptor().is_transparent())
            .copied()
            .collect();
        assert_eq!(transparent, vec![MaterialKind::PointLight, MaterialKind::Glyph]);
    }

    #[test]
    fn test_glyph_color_is_optional() {
        let glyph = MaterialKind::Glyph.descriptor();
        let spec = glyph.uniform("u_color").unwrap();
        assert!(!spec.is_required());
        assert_eq!(glyph.default_value("u_color"), Some(GLYPH_DEFAULT_COLOR.into()));
        assert!(glyph.render_state().alpha_test);
    }
}
