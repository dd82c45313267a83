//! GLSL front-end: include resolution, parsing and interface reflection.
//!
//! The [`ShaderCompiler`] resolves `#include` directives, parses each stage
//! with naga's GLSL front-end, validates the IR and reflects the stage's
//! declared interface ([`StageInterface`]). Compilation touches no GPU state,
//! so [`ShaderCompiler::compile_pair`] may run on any thread; the result is
//! handed back to the draw thread and linked there by the program catalog.
//!
//! # Example
//!
//! ```ignore
//! use lumen_graphics::shader::ShaderCompiler;
//! use lumen_graphics::program::{MaterialId, MaterialSource};
//!
//! let compiler = ShaderCompiler::with_standard_library();
//! let compiled = compiler.compile_pair(
//!     &MaterialId::new("vertex_color"),
//!     &MaterialSource::new(VERTEX_COLOR_VERTEX, VERTEX_COLOR_FRAGMENT),
//! )?;
//! assert_eq!(compiled.vertex.interface.input("color").unwrap().components, 4);
//! ```

mod interface;
pub mod library;

use std::collections::{HashMap, HashSet};

use lumen_core::profiling::profile_scope;

use crate::error::ProgramError;
use crate::program::{MaterialId, MaterialSource};

pub use interface::{StageInterface, StageVariable, UniformDecl, UniformLocation};
pub use library::ShaderLibrary;

/// Shader stage in the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// One parsed and reflected stage.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    /// Source with includes expanded; this is what the backend compiles.
    pub source: String,
    pub interface: StageInterface,
}

/// A vertex/fragment pair ready to be linked on the draw thread.
#[derive(Debug, Clone)]
pub struct CompiledSource {
    pub material: MaterialId,
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
}

/// Reasons a single stage failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StageFailure {
    Empty,
    Diagnostics(String),
}

/// GLSL front-end with a set of includable modules.
#[derive(Debug, Clone, Default)]
pub struct ShaderCompiler {
    /// Registered include sources: path -> source text.
    includes: HashMap<String, String>,
}

static_assertions::assert_impl_all!(ShaderCompiler: Send, Sync);
static_assertions::assert_impl_all!(CompiledSource: Send);

impl ShaderCompiler {
    /// Create a new compiler with no include modules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler with the standard library pre-loaded.
    pub fn with_standard_library() -> Self {
        let mut compiler = Self::new();
        compiler.add_library(&ShaderLibrary::standard());
        compiler
    }

    /// Make every module of `library` available to `#include`.
    pub fn add_library(&mut self, library: &ShaderLibrary) {
        for (path, source) in library.modules() {
            self.register_include(path, source);
        }
    }

    /// Register a single include source under the path used in
    /// `#include "path"` directives.
    pub fn register_include(&mut self, path: &str, source: &str) {
        self.includes.insert(path.to_string(), source.to_string());
    }

    /// Parse, validate and reflect both stages of a material.
    ///
    /// Pure: no GPU objects are created, so this is safe to call off the draw
    /// thread.
    pub fn compile_pair(
        &self,
        material: &MaterialId,
        source: &MaterialSource,
    ) -> Result<CompiledSource, ProgramError> {
        profile_scope!("compile_pair");

        let vertex = self.compile_stage(material, ShaderStage::Vertex, source.vertex())?;
        let fragment = self.compile_stage(material, ShaderStage::Fragment, source.fragment())?;
        log::debug!(
            "Compiled material `{}`: {} inputs, {} varyings",
            material,
            vertex.interface.inputs.len(),
            fragment.interface.inputs.len()
        );
        Ok(CompiledSource {
            material: material.clone(),
            vertex,
            fragment,
        })
    }

    fn compile_stage(
        &self,
        material: &MaterialId,
        stage: ShaderStage,
        source: &str,
    ) -> Result<CompiledStage, ProgramError> {
        self.compile(stage, source).map_err(|failure| match failure {
            StageFailure::Empty => ProgramError::MissingStage {
                material: material.clone(),
                stage,
            },
            StageFailure::Diagnostics(diagnostics) => {
                log::error!(
                    "Material `{}` {} stage failed to compile:\n{}",
                    material,
                    stage,
                    diagnostics
                );
                ProgramError::Compile {
                    material: material.clone(),
                    stage,
                    diagnostics,
                }
            }
        })
    }

    fn compile(&self, stage: ShaderStage, source: &str) -> Result<CompiledStage, StageFailure> {
        if source.trim().is_empty() {
            return Err(StageFailure::Empty);
        }

        let mut included = HashSet::new();
        let resolved = self
            .resolve_includes(source, &mut included)
            .map_err(StageFailure::Diagnostics)?;

        let options = naga::front::glsl::Options {
            stage: stage.to_naga(),
            defines: naga::FastHashMap::default(),
        };
        let mut frontend = naga::front::glsl::Frontend::default();
        let module = frontend.parse(&options, &resolved).map_err(|errors| {
            StageFailure::Diagnostics(format!("GLSL parse error:\n{errors}"))
        })?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| StageFailure::Diagnostics(format!("Validation error: {e}")))?;

        let interface = interface::reflect(&module, stage).map_err(StageFailure::Diagnostics)?;

        Ok(CompiledStage {
            stage,
            source: resolved,
            interface,
        })
    }

    /// Resolve `#include "path"` directives recursively.
    fn resolve_includes(
        &self,
        source: &str,
        included: &mut HashSet<String>,
    ) -> Result<String, String> {
        let mut result = String::with_capacity(source.len());

        for line in source.lines() {
            if let Some(path) = parse_include_directive(line.trim()) {
                if !included.insert(path.to_string()) {
                    continue;
                }
                let include_source = self
                    .includes
                    .get(path)
                    .ok_or_else(|| format!("Include not found: \"{path}\""))?;
                let resolved = self.resolve_includes(include_source, included)?;
                result.push_str(&resolved);
            } else {
                result.push_str(line);
            }
            result.push('\n');
        }

        Ok(result)
    }
}

/// Parse a `#include "path"` directive, returning the path if found.
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#include")?.trim();
    if let Some(inner) = rest.strip_prefix('"') {
        inner.strip_suffix('"')
    } else if let Some(inner) = rest.strip_prefix('<') {
        inner.strip_suffix('>')
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::library::*;
    use super::*;
    use crate::materials::UniformType;

    fn compile(vertex: &str, fragment: &str) -> Result<CompiledSource, ProgramError> {
        ShaderCompiler::with_standard_library()
            .compile_pair(&MaterialId::new("test"), &MaterialSource::new(vertex, fragment))
    }

    #[test]
    fn test_reflects_vertex_inputs_and_varyings() {
        let compiled = compile(TEXTURED_LIT_VERTEX, TEXTURED_LIT_FRAGMENT).unwrap();
        let vertex = &compiled.vertex.interface;

        let names: Vec<_> = vertex.inputs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["position", "normal", "uv"]);
        assert_eq!(vertex.input("uv").unwrap().components, 2);
        assert_eq!(vertex.input("normal").unwrap().location, 1);

        assert_eq!(vertex.output("v_uv").unwrap().components, 2);
        assert_eq!(vertex.output("v_light").unwrap().components, 1);
        assert!(vertex.output("gl_Position").is_none());

        let fragment = &compiled.fragment.interface;
        assert_eq!(fragment.input("v_light").unwrap().components, 1);
        assert_eq!(fragment.output("out_color").unwrap().components, 4);
    }

    #[test]
    fn test_reflects_uniform_blocks_and_handles() {
        let compiled = compile(GLYPH_VERTEX, GLYPH_FRAGMENT).unwrap();

        let vertex = &compiled.vertex.interface;
        let view_proj = vertex.uniform("u_view_proj").unwrap();
        assert_eq!(view_proj.ty, UniformType::Mat4);
        assert_eq!(view_proj.location, UniformLocation::block_member(0, 0, 0));
        assert_eq!(
            vertex.uniform("u_time").unwrap().location,
            UniformLocation::block_member(0, 0, 1)
        );

        let fragment = &compiled.fragment.interface;
        assert_eq!(fragment.uniform("u_color").unwrap().ty, UniformType::Vec4);
        let texture = fragment.uniform("u_texture").unwrap();
        assert_eq!(texture.ty, UniformType::Texture2d);
        assert_eq!(texture.location, UniformLocation::resource(2, 0));
        assert_eq!(fragment.uniform("u_sampler").unwrap().ty, UniformType::Sampler);
    }

    #[test]
    fn test_includes_are_expanded_once() {
        let compiled = compile(RAINBOW_VERTEX, RAINBOW_FRAGMENT).unwrap();
        assert!(!compiled.vertex.source.contains("#include"));
        assert_eq!(compiled.vertex.source.matches("uniform Frame").count(), 1);
    }

    #[test]
    fn test_empty_stage_is_missing() {
        let err = compile(VERTEX_COLOR_VERTEX, "   \n").unwrap_err();
        assert_eq!(
            err,
            ProgramError::MissingStage {
                material: MaterialId::new("test"),
                stage: ShaderStage::Fragment,
            }
        );
        assert!(err.is_compile_error());
    }

    #[test]
    fn test_syntax_error_is_compile_error() {
        let err = compile("#version 450\nvoid main() { gl_Position = ; }\n", FLAT_LIT_FRAGMENT)
            .unwrap_err();
        assert!(matches!(
            err,
            ProgramError::Compile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_include_is_compile_error() {
        let vertex = "#version 450\n#include \"lumen/nope.glsl\"\nvoid main() {}\n";
        let err = compile(vertex, FLAT_LIT_FRAGMENT).unwrap_err();
        match err {
            ProgramError::Compile { diagnostics, .. } => {
                assert!(diagnostics.contains("lumen/nope.glsl"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_include_directive() {
        assert_eq!(
            parse_include_directive(r#"#include "foo/bar.glsl""#),
            Some("foo/bar.glsl")
        );
        assert_eq!(
            parse_include_directive(r#"#include <foo/bar.glsl>"#),
            Some("foo/bar.glsl")
        );
        assert_eq!(parse_include_directive("#define FOO"), None);
    }
}
