//! Dummy GPU backend for testing and development.
//!
//! This backend performs no GPU work. It hands out monotonically increasing
//! handles, validates them, and records every command so tests can assert
//! the exact sequence of state changes and draws a frame produced.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::materials::{RenderState, UniformValue};
use crate::mesh::{AttributeBinding, IndexFormat};
use crate::shader::{ShaderStage, UniformLocation};

use super::{
    BackendError, BackendResult, BufferHandle, DrawCall, GpuBackend, ProgramHandle, ShaderHandle,
    VertexInput,
};

/// A command received by the [`DummyBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    CreateShader {
        shader: ShaderHandle,
        stage: ShaderStage,
    },
    DestroyShader(ShaderHandle),
    LinkProgram {
        program: ProgramHandle,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    },
    DestroyProgram(ProgramHandle),
    UseProgram(ProgramHandle),
    SetVertexInput {
        attributes: Vec<AttributeBinding>,
        vertex_buffers: Vec<BufferHandle>,
        index_buffer: Option<(BufferHandle, IndexFormat)>,
    },
    SetUniform {
        program: ProgramHandle,
        location: UniformLocation,
        value: UniformValue,
    },
    SetRenderState(RenderState),
    Draw(DrawCall),
}

/// Recording GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    next_id: u64,
    shaders: HashSet<ShaderHandle>,
    programs: HashSet<ProgramHandle>,
    current_program: Option<ProgramHandle>,
    render_state: RenderState,
    uniforms: HashMap<(ProgramHandle, UniformLocation), UniformValue>,
    commands: Vec<BackendCommand>,
    pending_errors: VecDeque<BackendError>,
    fail_next_link: Option<String>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Queue an error that the next `poll_error` calls will report, simulating
    /// an asynchronous GPU fault.
    pub fn inject_error(&mut self, error: BackendError) {
        self.pending_errors.push_back(error);
    }

    /// Make the next `link_program` call fail with the given driver message.
    pub fn fail_next_link(&mut self, message: impl Into<String>) {
        self.fail_next_link = Some(message.into());
    }

    /// All commands received so far.
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Every recorded draw paired with the program current when it was issued.
    pub fn draws(&self) -> Vec<(ProgramHandle, DrawCall)> {
        let mut current = None;
        let mut draws = Vec::new();
        for command in &self.commands {
            match command {
                BackendCommand::UseProgram(program) => current = Some(*program),
                BackendCommand::Draw(call) => {
                    if let Some(program) = current {
                        draws.push((program, *call));
                    }
                }
                _ => {}
            }
        }
        draws
    }

    /// Every recorded draw paired with the render state it was issued under.
    pub fn draw_states(&self) -> Vec<(RenderState, DrawCall)> {
        let mut current = RenderState::default();
        let mut draws = Vec::new();
        for command in &self.commands {
            match command {
                BackendCommand::SetRenderState(state) => current = *state,
                BackendCommand::Draw(call) => draws.push((current, *call)),
                _ => {}
            }
        }
        draws
    }

    /// Number of recorded `SetUniform` commands.
    pub fn uniform_push_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, BackendCommand::SetUniform { .. }))
            .count()
    }

    /// The value last uploaded to `location` of `program`.
    pub fn uniform(
        &self,
        program: ProgramHandle,
        location: UniformLocation,
    ) -> Option<&UniformValue> {
        self.uniforms.get(&(program, location))
    }

    pub fn live_shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    fn invalid(&mut self, kind: &'static str, id: u64) {
        log::trace!("DummyBackend: invalid {} handle {}", kind, id);
        self.pending_errors
            .push_back(BackendError::InvalidHandle { kind, id });
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> BackendResult<ShaderHandle> {
        let shader = ShaderHandle::from_raw(self.allocate());
        log::trace!(
            "DummyBackend: creating {} shader {:?} ({} bytes)",
            stage,
            shader,
            source.len()
        );
        self.shaders.insert(shader);
        self.commands
            .push(BackendCommand::CreateShader { shader, stage });
        Ok(shader)
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        log::trace!("DummyBackend: destroying shader {:?}", shader);
        if !self.shaders.remove(&shader) {
            self.invalid("shader", shader.raw());
        }
        self.commands.push(BackendCommand::DestroyShader(shader));
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> BackendResult<ProgramHandle> {
        for shader in [vertex, fragment] {
            if !self.shaders.contains(&shader) {
                return Err(BackendError::InvalidHandle {
                    kind: "shader",
                    id: shader.raw(),
                });
            }
        }
        if let Some(message) = self.fail_next_link.take() {
            log::trace!("DummyBackend: simulated link failure: {}", message);
            return Err(BackendError::Gpu(message));
        }

        let program = ProgramHandle::from_raw(self.allocate());
        log::trace!(
            "DummyBackend: linking program {:?} ({:?} + {:?})",
            program,
            vertex,
            fragment
        );
        self.programs.insert(program);
        self.commands.push(BackendCommand::LinkProgram {
            program,
            vertex,
            fragment,
        });
        Ok(program)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        log::trace!("DummyBackend: destroying program {:?}", program);
        if !self.programs.remove(&program) {
            self.invalid("program", program.raw());
        }
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.uniforms.retain(|(p, _), _| *p != program);
        self.commands.push(BackendCommand::DestroyProgram(program));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        log::trace!("DummyBackend: use program {:?}", program);
        if !self.programs.contains(&program) {
            self.invalid("program", program.raw());
        }
        self.current_program = Some(program);
        self.commands.push(BackendCommand::UseProgram(program));
    }

    fn set_vertex_input(&mut self, input: VertexInput<'_>) {
        log::trace!(
            "DummyBackend: vertex input with {} attributes over {} buffers",
            input.attributes.len(),
            input.vertex_buffers.len()
        );
        self.commands.push(BackendCommand::SetVertexInput {
            attributes: input.attributes.to_vec(),
            vertex_buffers: input.vertex_buffers.to_vec(),
            index_buffer: input.index_buffer,
        });
    }

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        location: UniformLocation,
        value: &UniformValue,
    ) {
        log::trace!(
            "DummyBackend: set uniform {:?} of {:?} to {:?}",
            location,
            program,
            value
        );
        if !self.programs.contains(&program) {
            self.invalid("program", program.raw());
            return;
        }
        self.uniforms.insert((program, location), *value);
        self.commands.push(BackendCommand::SetUniform {
            program,
            location,
            value: *value,
        });
    }

    fn set_render_state(&mut self, state: &RenderState) {
        log::trace!("DummyBackend: render state {:?}", state);
        self.render_state = *state;
        self.commands.push(BackendCommand::SetRenderState(*state));
    }

    fn draw(&mut self, call: DrawCall) {
        log::trace!(
            "DummyBackend: draw {:?} x{} (indexed: {})",
            call.topology,
            call.count,
            call.indexed
        );
        if self.current_program.is_none() {
            self.pending_errors
                .push_back(BackendError::Gpu("draw without a current program".into()));
        }
        self.commands.push(BackendCommand::Draw(call));
    }

    fn poll_error(&mut self) -> Option<BackendError> {
        self.pending_errors.pop_front()
    }
}
