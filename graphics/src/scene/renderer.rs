//! Frame driver tying the rendering core together.

use std::sync::Arc;

use lumen_core::profiling::{frame_mark, profile_plot, profile_scope};

use crate::backend::{BackendError, GpuBackend, VertexInput};
use crate::config::RendererConfig;
use crate::error::{DrawError, ProgramError, SchedulerError};
use crate::materials::{register_builtin_materials, DrawUniforms, RenderState, UniformBinder};
use crate::mesh::AttributeLayoutRegistry;
use crate::program::{MaterialId, MaterialSource, Program, ProgramCatalog, ProgramId};
use crate::shader::{CompiledSource, ShaderCompiler};

use super::drawable::{Drawable, RenderBucket};
use super::frame::FrameUniforms;
use super::scheduler::{DrawScheduler, FrameState, QueuedDraw, SkippedDraw};

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub issued: usize,
    pub skipped: Vec<SkippedDraw>,
    /// Number of `use_program` calls issued.
    pub program_switches: usize,
    /// Asynchronous backend errors polled when the frame began.
    pub backend_errors: Vec<BackendError>,
}

impl FrameReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Owns the backend and every core component, and drives frames.
///
/// # Lifecycle
///
/// ```ignore
/// let mut renderer = Renderer::new(backend, RendererConfig::default());
/// renderer.register_builtin_materials()?;
///
/// // Each frame:
/// renderer.begin_frame(FrameUniforms::new(clock.elapsed_seconds(), view_proj));
/// renderer.submit(drawable)?;
/// let report = renderer.end_frame()?;
/// ```
///
/// Every program is released when the renderer is dropped.
pub struct Renderer<B: GpuBackend> {
    backend: B,
    config: RendererConfig,
    catalog: ProgramCatalog,
    registry: AttributeLayoutRegistry,
    binder: UniformBinder,
    scheduler: DrawScheduler,
    frame: FrameUniforms,
    frame_count: u64,
    backend_errors: Vec<BackendError>,
}

impl<B: GpuBackend> Renderer<B> {
    pub fn new(backend: B, config: RendererConfig) -> Self {
        Self::with_compiler(backend, config, ShaderCompiler::with_standard_library())
    }

    pub fn with_compiler(backend: B, config: RendererConfig, compiler: ShaderCompiler) -> Self {
        log::info!("Creating renderer on {} backend", backend.name());
        Self {
            catalog: ProgramCatalog::with_capacity(compiler, config.material_capacity),
            registry: AttributeLayoutRegistry::with_capacity(config.material_capacity),
            binder: UniformBinder::new(),
            scheduler: DrawScheduler::with_capacity(
                config.opaque_capacity,
                config.transparent_capacity,
            ),
            frame: FrameUniforms::default(),
            frame_count: 0,
            backend_errors: Vec::new(),
            backend,
            config,
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    #[inline]
    pub fn binder(&self) -> &UniformBinder {
        &self.binder
    }

    #[inline]
    pub fn registry(&self) -> &AttributeLayoutRegistry {
        &self.registry
    }

    #[inline]
    pub fn scheduler(&self) -> &DrawScheduler {
        &self.scheduler
    }

    #[inline]
    pub fn frame_state(&self) -> FrameState {
        self.scheduler.state()
    }

    /// Number of frames ended so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The values of the current frame.
    pub fn frame_uniforms(&self) -> &FrameUniforms {
        &self.frame
    }

    /// Register or replace a material's source. Cached state for a replaced
    /// program is dropped.
    pub fn register_material(&mut self, id: impl Into<MaterialId>, source: MaterialSource) {
        if let Some(released) = self.catalog.register(id, source, &mut self.backend) {
            self.forget_program(released);
        }
    }

    /// Register and build every built-in material.
    pub fn register_builtin_materials(&mut self) -> Result<(), ProgramError> {
        register_builtin_materials(&mut self.catalog, &mut self.backend)
    }

    /// Build a material now, surfacing compile and link errors to the caller.
    pub fn build_material(&mut self, id: &MaterialId) -> Result<Arc<Program>, ProgramError> {
        self.catalog.get_or_compile(id, &mut self.backend)
    }

    /// Link a pair compiled on another thread with [`compiler`](Self::compiler).
    pub fn link_compiled(
        &mut self,
        compiled: CompiledSource,
    ) -> Result<Arc<Program>, ProgramError> {
        self.catalog.link_compiled(compiled, &mut self.backend)
    }

    pub fn compiler(&self) -> &ShaderCompiler {
        self.catalog.compiler()
    }

    /// Start a frame: poll asynchronous backend errors, install this frame's
    /// uniforms and reset the scheduler.
    pub fn begin_frame(&mut self, frame: FrameUniforms) {
        if self.scheduler.state() != FrameState::Issued && !self.scheduler.is_empty() {
            log::warn!(
                "Frame {} began with {} drawables from an unfinished frame; discarding them",
                self.frame_count,
                self.scheduler.len()
            );
        }

        self.backend_errors.clear();
        if self.config.poll_errors {
            while let Some(error) = self.backend.poll_error() {
                log::error!("{} backend error: {}", self.backend.name(), error);
                self.backend_errors.push(error);
            }
        }

        self.frame = frame;
        self.scheduler.reset();
    }

    /// Queue a drawable for this frame.
    pub fn submit(&mut self, drawable: Drawable) -> Result<RenderBucket, SchedulerError> {
        self.scheduler.submit(drawable)
    }

    /// Sort, issue and finish the frame.
    pub fn end_frame(&mut self) -> Result<FrameReport, SchedulerError> {
        profile_scope!("end_frame");

        let catalog = &mut self.catalog;
        let backend = &mut self.backend;
        self.scheduler.sort_opaque(|drawable| {
            catalog
                .get_or_compile(drawable.material.material(), backend)
                .ok()
                .map(|program| program.id())
        })?;
        self.scheduler.sort_transparent()?;

        let mut context = DrawContext {
            backend: &mut self.backend,
            catalog: &mut self.catalog,
            registry: &mut self.registry,
            binder: &mut self.binder,
            config: &self.config,
            frame: &self.frame,
            current_program: None,
            current_state: None,
            program_switches: 0,
        };
        let summary = self.scheduler.issue(|queued| context.issue(queued))?;
        let program_switches = context.program_switches;

        let report = FrameReport {
            frame: self.frame_count,
            issued: summary.issued,
            skipped: summary.skipped,
            program_switches,
            backend_errors: std::mem::take(&mut self.backend_errors),
        };
        log::debug!(
            "Frame {}: {} issued, {} skipped, {} program switches",
            report.frame,
            report.issued,
            report.skipped.len(),
            report.program_switches
        );

        profile_plot!("issued draws", report.issued);
        profile_plot!("skipped draws", report.skipped.len());
        self.frame_count = self.frame_count.wrapping_add(1);
        frame_mark!();
        Ok(report)
    }

    /// Destroy every program. Materials stay registered and rebuild on demand.
    pub fn release_all(&mut self) {
        self.catalog.release_all(&mut self.backend);
        self.registry.clear();
        self.binder.clear();
    }

    fn forget_program(&mut self, program: ProgramId) {
        self.registry.forget_program(program);
        self.binder.forget_program(program);
    }
}

impl<B: GpuBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.catalog.release_all(&mut self.backend);
    }
}

/// Borrowed state for issuing one frame's draws.
struct DrawContext<'a, B: GpuBackend> {
    backend: &'a mut B,
    catalog: &'a mut ProgramCatalog,
    registry: &'a mut AttributeLayoutRegistry,
    binder: &'a mut UniformBinder,
    config: &'a RendererConfig,
    frame: &'a FrameUniforms,
    current_program: Option<ProgramId>,
    current_state: Option<RenderState>,
    program_switches: usize,
}

impl<B: GpuBackend> DrawContext<'_, B> {
    fn issue(&mut self, queued: &QueuedDraw) -> Result<(), DrawError> {
        let drawable = &queued.drawable;
        let descriptor = &drawable.material;
        let mesh = &drawable.mesh;

        let program = self
            .catalog
            .get_or_compile(descriptor.material(), self.backend)?;

        let light = drawable
            .light
            .map(|index| {
                self.frame.light(index).ok_or(DrawError::InvalidLight {
                    index,
                    available: self.frame.lights.len(),
                })
            })
            .transpose()?;

        let bound = self
            .registry
            .bind_attributes(&program, descriptor, mesh.layout())?;

        let uniforms = DrawUniforms {
            frame: self.frame,
            names: &self.config.uniform_names,
            model: drawable.model,
            tint: drawable.tint,
            values: &drawable.uniforms,
            light,
        };
        self.binder
            .bind_draw(self.backend, &program, descriptor, &uniforms)?;

        if self.current_program != Some(program.id()) {
            self.backend.use_program(program.handle());
            self.current_program = Some(program.id());
            self.program_switches += 1;
        }

        let state = *descriptor.render_state();
        if self.current_state != Some(state) {
            self.backend.set_render_state(&state);
            self.current_state = Some(state);
        }

        self.backend.set_vertex_input(VertexInput {
            attributes: bound.bindings(),
            vertex_buffers: mesh.vertex_buffers(),
            index_buffer: mesh.index_buffer(),
        });
        self.backend.draw(mesh.draw_call());
        Ok(())
    }
}
