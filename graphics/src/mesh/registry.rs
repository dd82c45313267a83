//! Attribute layout registry.
//!
//! Binding a mesh to a program means finding, for every attribute the
//! material requires, the program's input location and the mesh's buffer
//! placement, and checking that all three agree on the component count.
//! The result only depends on the program, the descriptor's attribute list
//! and the layout, so it is computed once and cached under those.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AttributeSource, DrawError};
use crate::materials::{AttributeRequirement, MaterialDescriptor};
use crate::program::{Program, ProgramId};

use super::{VertexAttributeFormat, VertexLayout};

/// One enabled vertex input slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub name: String,
    /// Input location in the program.
    pub location: u32,
    pub components: u32,
    pub format: VertexAttributeFormat,
    /// Byte offset within the vertex.
    pub offset: u32,
    pub buffer_index: u32,
    pub stride: u32,
}

/// The vertex input configuration for one (program, attribute list, layout).
#[derive(Debug, PartialEq, Eq)]
pub struct BoundLayout {
    program: ProgramId,
    bindings: Vec<AttributeBinding>,
}

impl BoundLayout {
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Bindings in the order the descriptor lists its attributes.
    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    pub fn binding(&self, name: &str) -> Option<&AttributeBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

#[derive(Debug)]
struct Entry {
    attributes: Vec<AttributeRequirement>,
    layout: Arc<VertexLayout>,
    bound: Arc<BoundLayout>,
}

/// Cache of bound layouts, per program.
///
/// Entries are keyed by attribute content rather than descriptor identity,
/// so rebuilding an equal descriptor every frame reuses the cached binding.
#[derive(Debug, Default)]
pub struct AttributeLayoutRegistry {
    cache: HashMap<ProgramId, Vec<Entry>>,
}

impl AttributeLayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: HashMap::with_capacity(capacity),
        }
    }

    /// Resolve every attribute `descriptor` requires against `program` and
    /// `layout`.
    ///
    /// Fails with [`DrawError::InvalidLayout`] when `layout` does not
    /// validate, with [`DrawError::MissingAttribute`] when either side lacks
    /// an attribute and with [`DrawError::AttributeMismatch`] when component
    /// counts disagree. Nothing is truncated or padded. Failures are not
    /// cached: a corrected layout binds on the next call.
    pub fn bind_attributes(
        &mut self,
        program: &Program,
        descriptor: &MaterialDescriptor,
        layout: &Arc<VertexLayout>,
    ) -> Result<Arc<BoundLayout>, DrawError> {
        let attributes = descriptor.attributes();
        if let Some(entries) = self.cache.get(&program.id()) {
            let mut candidates = entries.iter().filter(|e| e.attributes == attributes);
            let hit = candidates
                .clone()
                .find(|e| Arc::ptr_eq(&e.layout, layout))
                .or_else(|| candidates.find(|e| *e.layout == **layout));
            if let Some(entry) = hit {
                return Ok(Arc::clone(&entry.bound));
            }
        }

        let bound = Arc::new(resolve(program, descriptor, layout)?);
        log::debug!(
            "Bound {} attributes of `{}` to layout {:?}",
            bound.bindings.len(),
            descriptor.material(),
            layout.label
        );
        self.cache.entry(program.id()).or_default().push(Entry {
            attributes: attributes.to_vec(),
            layout: Arc::clone(layout),
            bound: Arc::clone(&bound),
        });
        Ok(bound)
    }

    /// Drop every binding that references `program`.
    pub fn forget_program(&mut self, program: ProgramId) {
        self.cache.remove(&program);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached bound layouts.
    pub fn len(&self) -> usize {
        self.cache.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn resolve(
    program: &Program,
    descriptor: &MaterialDescriptor,
    layout: &VertexLayout,
) -> Result<BoundLayout, DrawError> {
    layout.validate().map_err(DrawError::InvalidLayout)?;

    let mut bindings = Vec::with_capacity(descriptor.attributes().len());

    for required in descriptor.attributes() {
        let slot = program
            .attribute(&required.name)
            .ok_or_else(|| DrawError::MissingAttribute {
                attribute: required.name.clone(),
                missing_from: AttributeSource::Program,
            })?;
        if slot.components != required.components {
            return Err(DrawError::AttributeMismatch {
                attribute: required.name.clone(),
                expected: required.components,
                found: slot.components,
                found_in: AttributeSource::Program,
            });
        }

        let attribute = layout
            .attribute(&required.name)
            .ok_or_else(|| DrawError::MissingAttribute {
                attribute: required.name.clone(),
                missing_from: AttributeSource::Mesh,
            })?;
        let components = attribute.format.components();
        if components != required.components {
            return Err(DrawError::AttributeMismatch {
                attribute: required.name.clone(),
                expected: required.components,
                found: components,
                found_in: AttributeSource::Mesh,
            });
        }

        bindings.push(AttributeBinding {
            name: required.name.clone(),
            location: slot.location,
            components,
            format: attribute.format,
            offset: attribute.offset,
            buffer_index: attribute.buffer_index,
            stride: layout.buffer_stride(attribute.buffer_index as usize),
        });
    }

    Ok(BoundLayout {
        program: program.id(),
        bindings,
    })
}
