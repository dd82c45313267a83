//! Interface linking: matching vertex outputs against fragment inputs and
//! merging the two stages' uniform declarations.

use std::collections::HashMap;

use crate::error::LinkFailure;
use crate::shader::{StageInterface, UniformDecl, UniformLocation};

use super::{AttributeSlot, UniformSlot};

/// Name → slot maps of a linked program.
#[derive(Debug, Default)]
pub(crate) struct LinkedInterface {
    pub attributes: HashMap<String, AttributeSlot>,
    pub uniforms: HashMap<String, UniformSlot>,
}

/// Check that every fragment input is written by the vertex stage at the
/// same location with the same arity, then build the program's attribute
/// and uniform maps. No two uniforms may share a location.
pub(crate) fn link_interfaces(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<LinkedInterface, LinkFailure> {
    for input in &fragment.inputs {
        let output = vertex
            .output(&input.name)
            .ok_or_else(|| LinkFailure::MissingVarying {
                name: input.name.clone(),
            })?;
        if output.components != input.components {
            return Err(LinkFailure::VaryingMismatch {
                name: input.name.clone(),
                vertex: output.components,
                fragment: input.components,
            });
        }
        if output.location != input.location {
            return Err(LinkFailure::VaryingLocation {
                name: input.name.clone(),
                vertex: output.location,
                fragment: input.location,
            });
        }
    }

    let mut linked = LinkedInterface::default();

    for input in &vertex.inputs {
        linked.attributes.insert(
            input.name.clone(),
            AttributeSlot {
                location: input.location,
                components: input.components,
            },
        );
    }

    let mut occupied: HashMap<UniformLocation, &UniformDecl> = HashMap::new();
    for decl in vertex.uniforms.iter().chain(&fragment.uniforms) {
        match occupied.get(&decl.location) {
            Some(other) if other.name != decl.name => {
                return Err(LinkFailure::UniformConflict {
                    name: decl.name.clone(),
                    vertex: format!("`{}` {}", other.name, describe(other)),
                    fragment: format!("`{}` {}", decl.name, describe(decl)),
                });
            }
            Some(_) => {}
            None => {
                occupied.insert(decl.location, decl);
            }
        }
    }

    for decl in &vertex.uniforms {
        linked.uniforms.insert(decl.name.clone(), slot(decl));
    }
    for decl in &fragment.uniforms {
        match vertex.uniform(&decl.name) {
            Some(other) if other.ty != decl.ty || other.location != decl.location => {
                return Err(LinkFailure::UniformConflict {
                    name: decl.name.clone(),
                    vertex: describe(other),
                    fragment: describe(decl),
                });
            }
            Some(_) => {}
            None => {
                linked.uniforms.insert(decl.name.clone(), slot(decl));
            }
        }
    }

    Ok(linked)
}

fn slot(decl: &UniformDecl) -> UniformSlot {
    UniformSlot {
        location: decl.location,
        ty: decl.ty,
    }
}

fn describe(decl: &UniformDecl) -> String {
    let location = decl.location;
    match location.member {
        Some(member) => format!(
            "{} (set {}, binding {}, member {})",
            decl.ty, location.group, location.binding, member
        ),
        None => format!(
            "{} (set {}, binding {})",
            decl.ty, location.group, location.binding
        ),
    }
}
