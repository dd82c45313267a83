//! Stage interface reflection.
//!
//! After a stage parses, its declared interface is read straight out of the
//! naga IR: vertex inputs and inter-stage varyings come from the entry point's
//! arguments and result members that carry a `location` binding, uniforms from
//! the module's uniform blocks and texture/sampler handles.

use naga::{AddressSpace, Binding, Module, ScalarKind, TypeInner, VectorSize};

use crate::materials::UniformType;

use super::ShaderStage;

/// Where a uniform lives: a `(group, binding)` resource slot and, for members
/// of a uniform block, the member index inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
    pub member: Option<u32>,
}

impl UniformLocation {
    /// A member of the uniform block bound at `(group, binding)`.
    pub const fn block_member(group: u32, binding: u32, member: u32) -> Self {
        Self {
            group,
            binding,
            member: Some(member),
        }
    }

    /// A standalone resource (texture or sampler) bound at `(group, binding)`.
    pub const fn resource(group: u32, binding: u32) -> Self {
        Self {
            group,
            binding,
            member: None,
        }
    }
}

/// A `location`-bound stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageVariable {
    pub name: String,
    pub location: u32,
    /// 1 for scalars, 2..=4 for vectors.
    pub components: u32,
}

/// A uniform declared by a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub ty: UniformType,
    pub location: UniformLocation,
}

/// The declared interface of one shader stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageInterface {
    /// Vertex attributes (vertex stage) or varyings (fragment stage).
    pub inputs: Vec<StageVariable>,
    /// Varyings written by the vertex stage or fragment color outputs.
    /// Built-ins such as `gl_Position` are not included.
    pub outputs: Vec<StageVariable>,
    pub uniforms: Vec<UniformDecl>,
}

impl StageInterface {
    pub fn input(&self, name: &str) -> Option<&StageVariable> {
        self.inputs.iter().find(|v| v.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&StageVariable> {
        self.outputs.iter().find(|v| v.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformDecl> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Read the interface of `stage` out of a parsed module.
pub(crate) fn reflect(module: &Module, stage: ShaderStage) -> Result<StageInterface, String> {
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.to_naga())
        .ok_or_else(|| format!("no `main` entry point for the {stage} stage"))?;

    let mut interface = StageInterface::default();

    for argument in &entry.function.arguments {
        let Some(Binding::Location { location, .. }) = argument.binding else {
            continue;
        };
        let name = argument
            .name
            .clone()
            .ok_or_else(|| format!("unnamed input at location {location}"))?;
        let components = component_count(module, argument.ty)
            .ok_or_else(|| format!("input `{name}` has an unsupported type"))?;
        interface.inputs.push(StageVariable {
            name,
            location,
            components,
        });
    }

    if let Some(result) = &entry.function.result {
        if let TypeInner::Struct { members, .. } = &module.types[result.ty].inner {
            for member in members {
                let Some(Binding::Location { location, .. }) = member.binding else {
                    continue;
                };
                let name = member
                    .name
                    .clone()
                    .ok_or_else(|| format!("unnamed output at location {location}"))?;
                let components = component_count(module, member.ty)
                    .ok_or_else(|| format!("output `{name}` has an unsupported type"))?;
                interface.outputs.push(StageVariable {
                    name,
                    location,
                    components,
                });
            }
        }
    }

    for (_, global) in module.global_variables.iter() {
        let resource = match global.space {
            AddressSpace::Uniform | AddressSpace::Handle => global.binding.clone(),
            _ => continue,
        };
        let label = global.name.as_deref().unwrap_or("<anonymous>");
        let resource = resource
            .ok_or_else(|| format!("uniform `{label}` needs an explicit layout(set, binding)"))?;

        match &module.types[global.ty].inner {
            TypeInner::Struct { members, .. } if global.space == AddressSpace::Uniform => {
                for (index, member) in members.iter().enumerate() {
                    let name = member
                        .name
                        .clone()
                        .ok_or_else(|| format!("unnamed member in uniform block `{label}`"))?;
                    let ty = uniform_type(module, member.ty)
                        .ok_or_else(|| format!("uniform `{name}` has an unsupported type"))?;
                    interface.uniforms.push(UniformDecl {
                        name,
                        ty,
                        location: UniformLocation::block_member(
                            resource.group,
                            resource.binding,
                            index as u32,
                        ),
                    });
                }
            }
            _ => {
                let name = global
                    .name
                    .clone()
                    .ok_or_else(|| "unnamed uniform resource".to_string())?;
                let ty = uniform_type(module, global.ty)
                    .ok_or_else(|| format!("uniform `{name}` has an unsupported type"))?;
                interface.uniforms.push(UniformDecl {
                    name,
                    ty,
                    location: UniformLocation::resource(resource.group, resource.binding),
                });
            }
        }
    }

    Ok(interface)
}

fn component_count(module: &Module, ty: naga::Handle<naga::Type>) -> Option<u32> {
    match module.types[ty].inner {
        TypeInner::Scalar(_) => Some(1),
        TypeInner::Vector { size, .. } => Some(size as u32),
        _ => None,
    }
}

fn uniform_type(module: &Module, ty: naga::Handle<naga::Type>) -> Option<UniformType> {
    match module.types[ty].inner {
        TypeInner::Scalar(scalar) => match scalar.kind {
            ScalarKind::Float => Some(UniformType::Float),
            ScalarKind::Sint => Some(UniformType::Int),
            _ => None,
        },
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float => match size {
            VectorSize::Bi => Some(UniformType::Vec2),
            VectorSize::Tri => Some(UniformType::Vec3),
            VectorSize::Quad => Some(UniformType::Vec4),
        },
        TypeInner::Matrix {
            columns, rows, ..
        } => match (columns, rows) {
            (VectorSize::Tri, VectorSize::Tri) => Some(UniformType::Mat3),
            (VectorSize::Quad, VectorSize::Quad) => Some(UniformType::Mat4),
            _ => None,
        },
        TypeInner::Image {
            dim: naga::ImageDimension::D2,
            arrayed: false,
            ..
        } => Some(UniformType::Texture2d),
        TypeInner::Sampler { .. } => Some(UniformType::Sampler),
        _ => None,
    }
}
