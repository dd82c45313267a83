//! Uniform binder.
//!
//! Resolves a draw's uniforms by name against the linked program and pushes
//! typed values to the backend. The binder shadows every value it has pushed
//! per (program, location) and skips redundant pushes.
//!
//! Values for a draw are looked up in this order:
//!
//! 1. the drawable's explicit [`UniformValues`]
//! 2. per-instance built-ins (model matrix, tint)
//! 3. the referenced light's parameters
//! 4. frame values (view-projection, time)
//! 5. the descriptor's declared default

use std::collections::HashMap;

use glam::{Mat4, Vec4};

use lumen_core::profiling::profile_scope;

use crate::backend::GpuBackend;
use crate::config::BuiltinUniformNames;
use crate::error::DrawError;
use crate::program::{Program, ProgramId};
use crate::scene::{FrameUniforms, LightParameters};
use crate::shader::UniformLocation;

use super::material::MaterialDescriptor;
use super::uniforms::{UniformType, UniformValue, UniformValues};

/// Everything a single draw can source uniform values from.
#[derive(Debug, Clone, Copy)]
pub struct DrawUniforms<'a> {
    pub frame: &'a FrameUniforms,
    pub names: &'a BuiltinUniformNames,
    pub model: Mat4,
    pub tint: Option<Vec4>,
    pub values: &'a UniformValues,
    pub light: Option<&'a LightParameters>,
}

impl<'a> DrawUniforms<'a> {
    /// Resolve `name` as a `ty` uniform, without defaults.
    fn resolve(&self, name: &str, ty: UniformType) -> Result<Option<UniformValue>, DrawError> {
        if let Some(value) = self.values.get(name) {
            return check(name, ty, *value).map(Some);
        }

        let names = self.names;
        let builtin = if name == names.model {
            Some(UniformValue::Mat4(self.model))
        } else if name == names.color {
            self.tint.map(UniformValue::Vec4)
        } else if name == names.light_position {
            self.light.map(|l| UniformValue::Vec3(l.position))
        } else if name == names.light_color {
            self.light.map(|l| UniformValue::Vec4(l.color))
        } else if name == names.light_radius {
            self.light.map(|l| UniformValue::Float(l.radius))
        } else {
            frame_value(self.frame, names, name)
        };

        builtin
            .map(|value| {
                value
                    .convert_to(ty)
                    .ok_or_else(|| mismatch(name, ty, value.ty()))
            })
            .transpose()
    }
}

fn frame_value(
    frame: &FrameUniforms,
    names: &BuiltinUniformNames,
    name: &str,
) -> Option<UniformValue> {
    if name == names.view_proj {
        Some(UniformValue::Mat4(frame.view_proj))
    } else if name == names.time {
        Some(UniformValue::Float(frame.time))
    } else {
        None
    }
}

fn check(name: &str, ty: UniformType, value: UniformValue) -> Result<UniformValue, DrawError> {
    if value.ty() == ty {
        Ok(value)
    } else {
        Err(mismatch(name, ty, value.ty()))
    }
}

fn mismatch(name: &str, expected: UniformType, found: UniformType) -> DrawError {
    DrawError::UniformTypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Pushes uniform values, skipping those the GPU already holds.
#[derive(Debug, Default)]
pub struct UniformBinder {
    shadow: HashMap<(ProgramId, UniformLocation), UniformValue>,
    pushed: u64,
    skipped: u64,
}

impl UniformBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one named value to `program`.
    ///
    /// Returns whether a backend call was made (`false` when the shadow
    /// already held `value`).
    pub fn push<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        program: &Program,
        name: &str,
        value: UniformValue,
    ) -> Result<bool, DrawError> {
        let slot = program
            .uniform(name)
            .ok_or_else(|| DrawError::MissingUniform(name.to_string()))?;
        let value = check(name, slot.ty, value)?;
        Ok(self.write(backend, program, slot.location, value))
    }

    /// Push the frame values `program` declares. Uniforms the program does
    /// not declare are ignored.
    pub fn push_frame<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        program: &Program,
        frame: &FrameUniforms,
        names: &BuiltinUniformNames,
    ) -> Result<(), DrawError> {
        let mut writes = Vec::with_capacity(2);
        for name in [&names.view_proj, &names.time] {
            let Some(slot) = program.uniform(name) else {
                continue;
            };
            if let Some(value) = frame_value(frame, names, name) {
                writes.push((slot.location, check(name, slot.ty, value)?));
            }
        }
        for (location, value) in writes {
            self.write(backend, program, location, value);
        }
        Ok(())
    }

    /// Resolve, validate and push every uniform a draw needs.
    ///
    /// The descriptor's uniforms are mandatory unless they carry a default.
    /// Uniforms the program declares but the descriptor does not list are
    /// filled when a value is available; textures and samplers among them
    /// must always be bound. Nothing is pushed unless the whole set
    /// validates.
    pub fn bind_draw<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        program: &Program,
        descriptor: &MaterialDescriptor,
        draw: &DrawUniforms<'_>,
    ) -> Result<(), DrawError> {
        profile_scope!("bind_draw");

        let mut writes: Vec<(UniformLocation, UniformValue)> = Vec::new();

        for (name, spec) in descriptor.uniforms() {
            let Some(slot) = program.uniform(name) else {
                if spec.is_required() {
                    return Err(DrawError::MissingUniform(name.to_string()));
                }
                continue;
            };
            if slot.ty != spec.ty {
                return Err(mismatch(name, slot.ty, spec.ty));
            }
            let value = match draw.resolve(name, slot.ty)? {
                Some(value) => value,
                None if slot.ty.is_sampling() => {
                    return Err(DrawError::UnboundSampler(name.to_string()))
                }
                None => spec
                    .default
                    .ok_or_else(|| DrawError::MissingUniform(name.to_string()))?,
            };
            writes.push((slot.location, value));
        }

        for (name, slot) in program.uniforms() {
            if descriptor.uniform(name).is_some() {
                continue;
            }
            match draw.resolve(name, slot.ty)? {
                Some(value) => writes.push((slot.location, value)),
                None if slot.ty.is_sampling() => {
                    return Err(DrawError::UnboundSampler(name.to_string()))
                }
                None => {}
            }
        }

        for (location, value) in writes {
            self.write(backend, program, location, value);
        }
        Ok(())
    }

    /// Forget the shadow state of a released program.
    pub fn forget_program(&mut self, program: ProgramId) {
        self.shadow.retain(|(p, _), _| *p != program);
    }

    /// Forget all shadow state, forcing every value to be pushed again.
    pub fn clear(&mut self) {
        self.shadow.clear();
    }

    /// The value last pushed to `location` of `program`.
    pub fn shadowed(&self, program: ProgramId, location: UniformLocation) -> Option<&UniformValue> {
        self.shadow.get(&(program, location))
    }

    /// Number of backend uniform pushes issued.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Number of pushes skipped because the value was already current.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn write<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        program: &Program,
        location: UniformLocation,
        value: UniformValue,
    ) -> bool {
        let key = (program.id(), location);
        if self.shadow.get(&key) == Some(&value) {
            self.skipped += 1;
            return false;
        }
        backend.set_uniform(program.handle(), location, &value);
        self.shadow.insert(key, value);
        self.pushed += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Vec2, Vec3};

    use super::*;
    use crate::backend::{DummyBackend, SamplerHandle, TextureHandle};
    use crate::materials::{MaterialKind, GLYPH_DEFAULT_COLOR};
    use crate::program::ProgramCatalog;

    struct Fixture {
        backend: DummyBackend,
        program: Arc<Program>,
        descriptor: Arc<MaterialDescriptor>,
        frame: FrameUniforms,
        names: BuiltinUniformNames,
    }

    impl Fixture {
        fn new(kind: MaterialKind) -> Self {
            let mut backend = DummyBackend::new();
            let mut catalog = ProgramCatalog::new();
            catalog.register(kind.material_id(), kind.source(), &mut backend);
            let program = catalog.get_or_compile(&kind.material_id(), &mut backend).unwrap();
            backend.clear_commands();
            Self {
                backend,
                program,
                descriptor: kind.descriptor(),
                frame: FrameUniforms::new(2.5, Mat4::IDENTITY),
                names: BuiltinUniformNames::default(),
            }
        }

        fn bind(&mut self, values: &UniformValues, tint: Option<Vec4>) -> Result<(), DrawError> {
            let mut binder = UniformBinder::new();
            self.bind_with(&mut binder, values, tint)
        }

        fn bind_with(
            &mut self,
            binder: &mut UniformBinder,
            values: &UniformValues,
            tint: Option<Vec4>,
        ) -> Result<(), DrawError> {
            let draw = DrawUniforms {
                frame: &self.frame,
                names: &self.names,
                model: Mat4::from_translation(Vec3::X),
                tint,
                values,
                light: None,
            };
            binder.bind_draw(&mut self.backend, &self.program, &self.descriptor, &draw)
        }

        fn value(&self, name: &str) -> Option<UniformValue> {
            let slot = self.program.uniform(name)?;
            self.backend.uniform(self.program.handle(), slot.location).copied()
        }
    }

    fn glyph_resources() -> UniformValues {
        UniformValues::new()
            .with("u_texture", TextureHandle::from_raw(10))
            .with("u_sampler", SamplerHandle::from_raw(11))
    }

    #[test]
    fn test_glyph_default_color() {
        let mut fixture = Fixture::new(MaterialKind::Glyph);
        fixture.bind(&glyph_resources(), None).unwrap();

        assert_eq!(
            fixture.value("u_color"),
            Some(UniformValue::Vec4(GLYPH_DEFAULT_COLOR))
        );
        assert_eq!(fixture.value("u_time"), Some(UniformValue::Float(2.5)));
    }

    #[test]
    fn test_glyph_without_texture_is_unbound() {
        let mut fixture = Fixture::new(MaterialKind::Glyph);
        let values = UniformValues::new().with("u_sampler", SamplerHandle::from_raw(1));

        assert_eq!(
            fixture.bind(&values, None).unwrap_err(),
            DrawError::UnboundSampler("u_texture".into())
        );
        assert_eq!(fixture.backend.uniform_push_count(), 0);
    }

    #[test]
    fn test_missing_required_uniform() {
        let mut fixture = Fixture::new(MaterialKind::PointLight);
        let error = fixture.bind(&UniformValues::new(), None).unwrap_err();

        assert!(matches!(error, DrawError::MissingUniform(name) if name.starts_with("u_light")));
        assert_eq!(fixture.backend.uniform_push_count(), 0);
    }

    #[test]
    fn test_light_position_narrowed_to_declared_type() {
        let mut fixture = Fixture::new(MaterialKind::PointLight);
        let light = LightParameters::new(Vec3::new(0.25, 0.5, 9.0), Vec4::ONE, 0.1);
        let values = UniformValues::new();
        let draw = DrawUniforms {
            frame: &fixture.frame,
            names: &fixture.names,
            model: Mat4::IDENTITY,
            tint: None,
            values: &values,
            light: Some(&light),
        };
        let mut binder = UniformBinder::new();
        binder
            .bind_draw(&mut fixture.backend, &fixture.program, &fixture.descriptor, &draw)
            .unwrap();

        assert_eq!(
            fixture.value("u_light_position"),
            Some(UniformValue::Vec2(Vec2::new(0.25, 0.5)))
        );
        assert_eq!(fixture.value("u_light_radius"), Some(UniformValue::Float(0.1)));
    }

    #[test]
    fn test_explicit_value_type_mismatch() {
        let mut fixture = Fixture::new(MaterialKind::FlatLit);
        let values = UniformValues::new().with("u_color", Vec3::ONE);

        assert_eq!(
            fixture.bind(&values, None).unwrap_err(),
            DrawError::UniformTypeMismatch {
                name: "u_color".into(),
                expected: "vec4".into(),
                found: "vec3".into(),
            }
        );
    }

    #[test]
    fn test_redundant_pushes_are_skipped() {
        let mut fixture = Fixture::new(MaterialKind::VertexColor);
        let mut binder = UniformBinder::new();
        let values = UniformValues::new();

        fixture.bind_with(&mut binder, &values, None).unwrap();
        let first = fixture.backend.uniform_push_count();
        assert!(first > 0);

        fixture.bind_with(&mut binder, &values, None).unwrap();
        assert_eq!(fixture.backend.uniform_push_count(), first);
        assert_eq!(binder.skipped(), first as u64);
    }

    #[test]
    fn test_default_restored_after_override() {
        let mut fixture = Fixture::new(MaterialKind::Glyph);
        let mut binder = UniformBinder::new();
        let resources = glyph_resources();
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);

        fixture.bind_with(&mut binder, &resources, Some(red)).unwrap();
        assert_eq!(fixture.value("u_color"), Some(UniformValue::Vec4(red)));

        fixture.bind_with(&mut binder, &resources, None).unwrap();
        assert_eq!(
            fixture.value("u_color"),
            Some(UniformValue::Vec4(GLYPH_DEFAULT_COLOR))
        );

        let before = fixture.backend.uniform_push_count();
        fixture.bind_with(&mut binder, &resources, None).unwrap();
        assert_eq!(fixture.backend.uniform_push_count(), before);
    }

    #[test]
    fn test_push_unknown_name() {
        let mut fixture = Fixture::new(MaterialKind::Noise);
        let mut binder = UniformBinder::new();
        let result = binder.push(
            &mut fixture.backend,
            &fixture.program,
            "u_nope",
            UniformValue::Float(1.0),
        );
        assert_eq!(result, Err(DrawError::MissingUniform("u_nope".into())));
    }

    #[test]
    fn test_push_frame() {
        let mut fixture = Fixture::new(MaterialKind::Noise);
        let mut binder = UniformBinder::new();
        binder
            .push_frame(&mut fixture.backend, &fixture.program, &fixture.frame, &fixture.names)
            .unwrap();

        assert_eq!(fixture.value("u_time"), Some(UniformValue::Float(2.5)));
        assert_eq!(
            fixture.value("u_view_proj"),
            Some(UniformValue::Mat4(Mat4::IDENTITY))
        );
        let repeated = binder.push(&mut fixture.backend, &fixture.program, "u_time", 2.5f32.into());
        assert_eq!(repeated, Ok(false));
    }
}
