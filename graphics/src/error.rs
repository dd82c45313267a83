//! Error types for the rendering core.
//!
//! Errors fall in two tiers. [`ProgramError`] is material-level: it is
//! returned synchronously when a material is built and is fatal for that
//! material id only. [`DrawError`] is per-draw: the scheduler logs it, skips
//! the drawable and carries on with the frame.

use thiserror::Error;

use crate::backend::BackendError;
use crate::program::MaterialId;
use crate::shader::ShaderStage;

/// Why a vertex/fragment pair failed to link.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkFailure {
    #[error("fragment input `{name}` is not written by the vertex stage")]
    MissingVarying { name: String },
    #[error("varying `{name}` has {vertex} components when written, {fragment} when read")]
    VaryingMismatch {
        name: String,
        vertex: u32,
        fragment: u32,
    },
    #[error("varying `{name}` is written at location {vertex} but read at location {fragment}")]
    VaryingLocation {
        name: String,
        vertex: u32,
        fragment: u32,
    },
    #[error("uniform `{name}` is declared as {vertex} by one stage and {fragment} by the other")]
    UniformConflict {
        name: String,
        vertex: String,
        fragment: String,
    },
    #[error("driver rejected program: {0}")]
    Backend(String),
}

/// Material-level failure reported by the program catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgramError {
    #[error("material `{material}` has no {stage} stage source")]
    MissingStage {
        material: MaterialId,
        stage: ShaderStage,
    },
    #[error("failed to compile {stage} stage of material `{material}`:\n{diagnostics}")]
    Compile {
        material: MaterialId,
        stage: ShaderStage,
        diagnostics: String,
    },
    #[error("failed to link material `{material}`: {failure}")]
    Link {
        material: MaterialId,
        failure: LinkFailure,
    },
    #[error("material `{0}` is not registered")]
    UnknownMaterial(MaterialId),
    #[error("backend error while building material `{material}`: {source}")]
    Backend {
        material: MaterialId,
        #[source]
        source: BackendError,
    },
}

impl ProgramError {
    /// Stage-level failure: syntax error, missing entry point or missing stage.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::Compile { .. } | Self::MissingStage { .. })
    }

    /// Interface mismatch between the stages, or a driver link rejection.
    pub fn is_link_error(&self) -> bool {
        matches!(self, Self::Link { .. })
    }

    pub fn material(&self) -> &MaterialId {
        match self {
            Self::MissingStage { material, .. }
            | Self::Compile { material, .. }
            | Self::Link { material, .. }
            | Self::Backend { material, .. } => material,
            Self::UnknownMaterial(material) => material,
        }
    }
}

/// Per-draw failure. Fatal for one draw in one frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("attribute `{attribute}` is missing from the {missing_from}")]
    MissingAttribute {
        attribute: String,
        missing_from: AttributeSource,
    },
    #[error("attribute `{attribute}` expects {expected} components, the {found_in} has {found}")]
    AttributeMismatch {
        attribute: String,
        expected: u32,
        found: u32,
        found_in: AttributeSource,
    },
    #[error("invalid vertex layout: {0}")]
    InvalidLayout(String),
    #[error("required uniform `{0}` has no value or no location")]
    MissingUniform(String),
    #[error("uniform `{name}` expects {expected} but was given {found}")]
    UniformTypeMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("sampler uniform `{0}` has no texture bound")]
    UnboundSampler(String),
    #[error("light index {index} is out of range ({available} active lights)")]
    InvalidLight { index: usize, available: usize },
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Which side of an attribute binding lacked or disagreed on an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSource {
    /// The linked program's vertex inputs.
    Program,
    /// The mesh's vertex layout.
    Mesh,
}

impl std::fmt::Display for AttributeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Program => f.write_str("program"),
            Self::Mesh => f.write_str("mesh layout"),
        }
    }
}

/// Misuse of the draw scheduler's frame state machine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("drawables can only be submitted while collecting (scheduler is {0:?})")]
    NotCollecting(crate::scene::FrameState),
    #[error("cannot {operation} while the scheduler is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: crate::scene::FrameState,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let compile = ProgramError::Compile {
            material: MaterialId::new("flat"),
            stage: ShaderStage::Vertex,
            diagnostics: "unexpected token".into(),
        };
        assert!(compile.is_compile_error());
        assert!(!compile.is_link_error());

        let link = ProgramError::Link {
            material: MaterialId::new("flat"),
            failure: LinkFailure::MissingVarying {
                name: "v_uv".into(),
            },
        };
        assert!(link.is_link_error());
        assert!(!link.is_compile_error());
        assert_eq!(link.material().as_str(), "flat");
    }

    #[test]
    fn test_error_display() {
        let err = DrawError::AttributeMismatch {
            attribute: "color".into(),
            expected: 4,
            found: 3,
            found_in: AttributeSource::Mesh,
        };
        assert_eq!(
            err.to_string(),
            "attribute `color` expects 4 components but the mesh layout provides 3"
        );

        let err = LinkFailure::MissingVarying {
            name: "v_uv".into(),
        };
        assert_eq!(
            err.to_string(),
            "fragment input `v_uv` is not written by the vertex stage"
        );
    }
}
