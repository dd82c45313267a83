//! Program catalog: the single owner of every linked program.
//!
//! The catalog maps a [`MaterialId`] to its registered source and, once built,
//! to either a linked [`Program`] or the [`ProgramError`] that prevented it.
//! Both outcomes are cached: a material that failed is not recompiled until
//! its source is registered again.

use std::collections::HashMap;
use std::sync::Arc;

use lumen_core::profiling::profile_scope;

use crate::backend::GpuBackend;
use crate::error::{LinkFailure, ProgramError};
use crate::shader::{CompiledSource, ShaderCompiler, ShaderStage};

use super::{link_interfaces, MaterialId, MaterialSource, Program, ProgramId, ShaderObject};

#[derive(Debug)]
enum Entry {
    Ready(Arc<Program>),
    Failed(ProgramError),
}

/// Cache of linked programs keyed by material id.
#[derive(Debug)]
pub struct ProgramCatalog {
    compiler: ShaderCompiler,
    sources: HashMap<MaterialId, MaterialSource>,
    entries: HashMap<MaterialId, Entry>,
    next_id: u32,
    compile_count: u64,
}

impl Default for ProgramCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramCatalog {
    /// Create a catalog whose compiler knows the standard include library.
    pub fn new() -> Self {
        Self::with_compiler(ShaderCompiler::with_standard_library())
    }

    pub fn with_compiler(compiler: ShaderCompiler) -> Self {
        Self {
            compiler,
            sources: HashMap::new(),
            entries: HashMap::new(),
            next_id: 0,
            compile_count: 0,
        }
    }

    pub fn with_capacity(compiler: ShaderCompiler, capacity: usize) -> Self {
        Self {
            sources: HashMap::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
            ..Self::with_compiler(compiler)
        }
    }

    /// The front-end used by [`get_or_compile`](Self::get_or_compile).
    ///
    /// Clone it to compile on another thread, then hand the result to
    /// [`link_compiled`](Self::link_compiled).
    pub fn compiler(&self) -> &ShaderCompiler {
        &self.compiler
    }

    pub fn compiler_mut(&mut self) -> &mut ShaderCompiler {
        &mut self.compiler
    }

    /// Register (or replace) the source of a material.
    ///
    /// Any program or cached failure for `id` is dropped; a linked program is
    /// destroyed on the backend. Returns the id of the released program.
    pub fn register<B: GpuBackend>(
        &mut self,
        id: impl Into<MaterialId>,
        source: MaterialSource,
        backend: &mut B,
    ) -> Option<ProgramId> {
        let id = id.into();
        log::debug!("Registering material `{}`", id);
        self.sources.insert(id.clone(), source);
        match self.entries.remove(&id) {
            Some(Entry::Ready(program)) => {
                release(&program, backend);
                Some(program.id())
            }
            Some(Entry::Failed(_)) | None => None,
        }
    }

    pub fn source(&self, id: &MaterialId) -> Option<&MaterialSource> {
        self.sources.get(id)
    }

    pub fn contains(&self, id: &MaterialId) -> bool {
        self.sources.contains_key(id)
    }

    /// Return the linked program for `id`, building it on first use.
    ///
    /// A cached failure is returned as-is without recompiling.
    pub fn get_or_compile<B: GpuBackend>(
        &mut self,
        id: &MaterialId,
        backend: &mut B,
    ) -> Result<Arc<Program>, ProgramError> {
        match self.entries.get(id) {
            Some(Entry::Ready(program)) => {
                log::trace!("Program cache hit for `{}`", id);
                return Ok(Arc::clone(program));
            }
            Some(Entry::Failed(error)) => return Err(error.clone()),
            None => {}
        }

        let source = self
            .sources
            .get(id)
            .ok_or_else(|| ProgramError::UnknownMaterial(id.clone()))?;

        profile_scope!("get_or_compile");
        self.compile_count += 1;
        let result = self
            .compiler
            .compile_pair(id, source)
            .and_then(|compiled| self.link(compiled, backend));
        self.store(id.clone(), result)
    }

    /// Link a pair compiled elsewhere (usually another thread).
    ///
    /// The material must be registered. If it already has a linked program,
    /// that program is returned and `compiled` is discarded.
    pub fn link_compiled<B: GpuBackend>(
        &mut self,
        compiled: CompiledSource,
        backend: &mut B,
    ) -> Result<Arc<Program>, ProgramError> {
        let id = compiled.material.clone();
        if !self.sources.contains_key(&id) {
            return Err(ProgramError::UnknownMaterial(id));
        }
        if let Some(Entry::Ready(program)) = self.entries.get(&id) {
            return Ok(Arc::clone(program));
        }

        let result = self.link(compiled, backend);
        self.store(id, result)
    }

    pub fn get(&self, id: &MaterialId) -> Option<&Arc<Program>> {
        match self.entries.get(id) {
            Some(Entry::Ready(program)) => Some(program),
            _ => None,
        }
    }

    /// The cached failure for `id`, if its last build failed.
    pub fn failure(&self, id: &MaterialId) -> Option<&ProgramError> {
        match self.entries.get(id) {
            Some(Entry::Failed(error)) => Some(error),
            _ => None,
        }
    }

    /// Destroy every linked program and forget cached failures. Sources stay
    /// registered, so the next request rebuilds.
    pub fn release_all<B: GpuBackend>(&mut self, backend: &mut B) {
        let mut released = 0;
        for (_, entry) in self.entries.drain() {
            if let Entry::Ready(program) = entry {
                release(&program, backend);
                released += 1;
            }
        }
        if released > 0 {
            log::debug!("Released {} programs", released);
        }
    }

    /// Number of registered materials.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Number of currently linked programs.
    pub fn program_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, Entry::Ready(_)))
            .count()
    }

    /// How many times a material has been compiled through this catalog.
    pub fn compile_count(&self) -> u64 {
        self.compile_count
    }

    fn store(
        &mut self,
        id: MaterialId,
        result: Result<Program, ProgramError>,
    ) -> Result<Arc<Program>, ProgramError> {
        match result {
            Ok(program) => {
                let program = Arc::new(program);
                self.entries.insert(id, Entry::Ready(Arc::clone(&program)));
                Ok(program)
            }
            Err(error) => {
                self.entries.insert(id, Entry::Failed(error.clone()));
                Err(error)
            }
        }
    }

    fn link<B: GpuBackend>(
        &mut self,
        compiled: CompiledSource,
        backend: &mut B,
    ) -> Result<Program, ProgramError> {
        let CompiledSource {
            material,
            vertex,
            fragment,
        } = compiled;

        let linked = link_interfaces(&vertex.interface, &fragment.interface).map_err(|failure| {
            log::error!("Material `{}` failed to link: {}", material, failure);
            ProgramError::Link {
                material: material.clone(),
                failure,
            }
        })?;

        let backend_error = |source| ProgramError::Backend {
            material: material.clone(),
            source,
        };

        let vertex_handle = backend
            .create_shader(ShaderStage::Vertex, &vertex.source)
            .map_err(backend_error)?;
        let fragment_handle = match backend.create_shader(ShaderStage::Fragment, &fragment.source) {
            Ok(handle) => handle,
            Err(source) => {
                backend.destroy_shader(vertex_handle);
                return Err(backend_error(source));
            }
        };
        let handle = match backend.link_program(vertex_handle, fragment_handle) {
            Ok(handle) => handle,
            Err(error) => {
                backend.destroy_shader(vertex_handle);
                backend.destroy_shader(fragment_handle);
                log::error!(
                    "Material `{}` was rejected by {}: {}",
                    material,
                    backend.name(),
                    error
                );
                return Err(ProgramError::Link {
                    material,
                    failure: LinkFailure::Backend(error.to_string()),
                });
            }
        };

        let id = ProgramId::new(self.next_id);
        self.next_id += 1;
        log::debug!("Linked material `{}` as {:?} ({:?})", material, id, handle);

        Ok(Program {
            id,
            material,
            handle,
            vertex: ShaderObject {
                stage: ShaderStage::Vertex,
                source: vertex.source,
                handle: vertex_handle,
            },
            fragment: ShaderObject {
                stage: ShaderStage::Fragment,
                source: fragment.source,
                handle: fragment_handle,
            },
            attributes: linked.attributes,
            uniforms: linked.uniforms,
        })
    }
}

fn release<B: GpuBackend>(program: &Program, backend: &mut B) {
    backend.destroy_program(program.handle);
    backend.destroy_shader(program.vertex.handle);
    backend.destroy_shader(program.fragment.handle);
}
