//! Material descriptors.
//!
//! A [`MaterialDescriptor`] is the declarative contract between a drawable
//! and a program: which material (program) to use, which attributes the
//! mesh must provide with what arity, which uniforms the draw must supply
//! (or may omit, when a default exists), and the blend/alpha-test state.
//!
//! Descriptors are immutable once built and shared via `Arc` by every
//! drawable that uses them.

use std::sync::Arc;

use crate::program::MaterialId;

use super::uniforms::{UniformSpec, UniformType, UniformValue};

/// Blend factor for blending operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    #[default]
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Blend operation for combining colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// source + destination
    #[default]
    Add,
    /// source - destination
    Subtract,
    /// destination - source
    ReverseSubtract,
}

/// Blend component configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// Standard "over" compositing.
    pub const OVER: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };

    /// Over compositing of premultiplied colors.
    pub const PREMULTIPLIED: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };

    pub const ADDITIVE: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    };
}

/// Blend state for color blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub color: BlendComponent,
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Create a standard alpha blending state (src over dst).
    pub fn alpha_blending() -> Self {
        Self {
            color: BlendComponent::OVER,
            alpha: BlendComponent::OVER,
        }
    }

    /// Create a premultiplied alpha blending state.
    pub fn premultiplied_alpha() -> Self {
        Self {
            color: BlendComponent::PREMULTIPLIED,
            alpha: BlendComponent::PREMULTIPLIED,
        }
    }

    /// Create an additive blending state.
    pub fn additive() -> Self {
        Self {
            color: BlendComponent::ADDITIVE,
            alpha: BlendComponent::ADDITIVE,
        }
    }
}

bitflags::bitflags! {
    /// Color channels written by a draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const COLOR = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
        const ALL = Self::COLOR.bits() | Self::ALPHA.bits();
    }
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Compare function for depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

/// What a stencil test does to the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    #[default]
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    Invert,
}

/// Stencil test and update applied to every fragment of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilState {
    pub compare: CompareFunction,
    pub reference: u32,
    pub read_mask: u32,
    pub write_mask: u32,
    /// Applied when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Applied when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Applied when both tests pass.
    pub pass_op: StencilOperation,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            reference: 0,
            read_mask: !0,
            write_mask: !0,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        }
    }
}

impl StencilState {
    /// Unconditionally write `reference` wherever the draw covers.
    pub fn write(reference: u32) -> Self {
        Self {
            reference,
            pass_op: StencilOperation::Replace,
            ..Self::default()
        }
    }

    /// Only draw where the stored value compares `compare` against
    /// `reference`. The stencil buffer is left untouched.
    pub fn test(compare: CompareFunction, reference: u32) -> Self {
        Self {
            compare,
            reference,
            write_mask: 0,
            ..Self::default()
        }
    }
}

/// Depth test state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    pub compare: CompareFunction,
    pub write_enabled: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Less,
            write_enabled: true,
        }
    }
}

/// Fixed-function state a material draws with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    /// `None` disables blending.
    pub blend: Option<BlendState>,
    /// Whether fragments are discarded by coverage rather than blended.
    pub alpha_test: bool,
    /// Alpha threshold for fixed-function alpha testing; `None` when the
    /// shader discards on its own.
    pub alpha_cutoff: Option<f32>,
    pub write_mask: ColorWriteMask,
    /// `None` disables the stencil test.
    pub stencil: Option<StencilState>,
    /// `None` disables the depth test.
    pub depth: Option<DepthState>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl RenderState {
    pub const OPAQUE: Self = Self {
        blend: None,
        alpha_test: false,
        alpha_cutoff: None,
        write_mask: ColorWriteMask::ALL,
        stencil: None,
        depth: None,
    };

    /// Drawn in the ordered (blended/alpha-tested) bucket.
    pub fn is_transparent(&self) -> bool {
        self.blend.is_some() || self.alpha_test
    }
}

/// A vertex attribute a material requires, with its component count
/// (2 for vec2, 3 for vec3, 4 for vec4).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeRequirement {
    pub name: String,
    pub components: u32,
}

/// Declarative description of how a drawable is rendered.
///
/// # Example
///
/// ```ignore
/// let glyph = MaterialDescriptor::builder("glyph")
///     .with_attribute("position", 3)
///     .with_attribute("uv", 2)
///     .with_uniform("u_color", UniformSpec::with_default(Vec4::W))
///     .with_uniform("u_texture", UniformSpec::required(UniformType::Texture2d))
///     .with_alpha_test(None)
///     .build();
/// ```
#[derive(Debug)]
pub struct MaterialDescriptor {
    material: MaterialId,
    attributes: Vec<AttributeRequirement>,
    uniforms: Vec<(String, UniformSpec)>,
    render_state: RenderState,
    label: Option<String>,
}

static_assertions::assert_impl_all!(MaterialDescriptor: Send, Sync);

impl MaterialDescriptor {
    /// Start describing a material that renders with `material`'s program.
    pub fn builder(material: impl Into<MaterialId>) -> MaterialDescriptorBuilder {
        MaterialDescriptorBuilder {
            material: material.into(),
            attributes: Vec::new(),
            uniforms: Vec::new(),
            render_state: RenderState::OPAQUE,
            label: None,
        }
    }

    /// The catalog key of the program this descriptor renders with.
    pub fn material(&self) -> &MaterialId {
        &self.material
    }

    /// Required attributes, in declaration order.
    pub fn attributes(&self) -> &[AttributeRequirement] {
        &self.attributes
    }

    /// Uniform specifications, in declaration order.
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformSpec)> {
        self.uniforms.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformSpec> {
        self.uniforms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Declared default of an optional uniform.
    pub fn default_value(&self, name: &str) -> Option<UniformValue> {
        self.uniform(name).and_then(|spec| spec.default)
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn is_transparent(&self) -> bool {
        self.render_state.is_transparent()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Builder for [`MaterialDescriptor`].
#[derive(Debug, Clone)]
pub struct MaterialDescriptorBuilder {
    material: MaterialId,
    attributes: Vec<AttributeRequirement>,
    uniforms: Vec<(String, UniformSpec)>,
    render_state: RenderState,
    label: Option<String>,
}

impl MaterialDescriptorBuilder {
    /// Require attribute `name` with `components` components. Declaring the
    /// same name again replaces the earlier requirement.
    pub fn with_attribute(mut self, name: impl Into<String>, components: u32) -> Self {
        let name = name.into();
        self.attributes.retain(|a| a.name != name);
        self.attributes.push(AttributeRequirement { name, components });
        self
    }

    /// Declare uniform `name`. Declaring the same name again replaces it.
    pub fn with_uniform(mut self, name: impl Into<String>, spec: UniformSpec) -> Self {
        let name = name.into();
        match self.uniforms.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = spec,
            None => self.uniforms.push((name, spec)),
        }
        self
    }

    /// Shorthand for a required uniform.
    pub fn with_required_uniform(self, name: impl Into<String>, ty: UniformType) -> Self {
        self.with_uniform(name, UniformSpec::required(ty))
    }

    pub fn with_blend(mut self, blend: BlendState) -> Self {
        self.render_state.blend = Some(blend);
        self
    }

    /// Mark the material alpha-tested, optionally with a fixed-function cutoff.
    pub fn with_alpha_test(mut self, cutoff: Option<f32>) -> Self {
        self.render_state.alpha_test = true;
        self.render_state.alpha_cutoff = cutoff;
        self
    }

    pub fn with_write_mask(mut self, mask: ColorWriteMask) -> Self {
        self.render_state.write_mask = mask;
        self
    }

    pub fn with_stencil(mut self, stencil: StencilState) -> Self {
        self.render_state.stencil = Some(stencil);
        self
    }

    pub fn with_depth_test(mut self, depth: DepthState) -> Self {
        self.render_state.depth = Some(depth);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn build(self) -> Arc<MaterialDescriptor> {
        Arc::new(MaterialDescriptor {
            material: self.material,
            attributes: self.attributes,
            uniforms: self.uniforms,
            render_state: self.render_state,
            label: self.label,
        })
    }
}
