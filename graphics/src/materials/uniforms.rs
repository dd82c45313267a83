//! Typed uniform values and per-material uniform specifications.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::backend::{SamplerHandle, TextureHandle};

/// GLSL type of a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    Texture2d,
    Sampler,
}

impl UniformType {
    /// Textures and samplers must always have a resource bound.
    pub fn is_sampling(&self) -> bool {
        matches!(self, Self::Texture2d | Self::Sampler)
    }

    /// The GLSL spelling of this type.
    pub fn glsl_name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Texture2d => "texture2D",
            Self::Sampler => "sampler",
        }
    }
}

impl std::fmt::Display for UniformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// A typed uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    Texture(TextureHandle),
    Sampler(SamplerHandle),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            Self::Float(_) => UniformType::Float,
            Self::Int(_) => UniformType::Int,
            Self::Vec2(_) => UniformType::Vec2,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Vec4(_) => UniformType::Vec4,
            Self::Mat3(_) => UniformType::Mat3,
            Self::Mat4(_) => UniformType::Mat4,
            Self::Texture(_) => UniformType::Texture2d,
            Self::Sampler(_) => UniformType::Sampler,
        }
    }

    /// Raw bytes for plain-data values, as a backend uploads them.
    /// `None` for texture and sampler bindings.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Float(v) => Some(bytemuck::bytes_of(v)),
            Self::Int(v) => Some(bytemuck::bytes_of(v)),
            Self::Vec2(v) => Some(bytemuck::bytes_of(v)),
            Self::Vec3(v) => Some(bytemuck::bytes_of(v)),
            Self::Vec4(v) => Some(bytemuck::bytes_of(v)),
            Self::Mat3(v) => Some(bytemuck::bytes_of(v)),
            Self::Mat4(v) => Some(bytemuck::bytes_of(v)),
            Self::Texture(_) | Self::Sampler(_) => None,
        }
    }

    /// Narrow or widen a vector to `ty`.
    ///
    /// Used for frame-driven values whose width depends on how a shader
    /// declares them (a light position may be `vec2` or `vec3`). Missing
    /// components are filled from `(0, 0, 0, 1)`.
    pub fn convert_to(self, ty: UniformType) -> Option<Self> {
        if self.ty() == ty {
            return Some(self);
        }
        let v = match self {
            Self::Vec2(v) => v.extend(0.0).extend(1.0),
            Self::Vec3(v) => v.extend(1.0),
            Self::Vec4(v) => v,
            _ => return None,
        };
        match ty {
            UniformType::Vec2 => Some(Self::Vec2(v.truncate().truncate())),
            UniformType::Vec3 => Some(Self::Vec3(v.truncate())),
            UniformType::Vec4 => Some(Self::Vec4(v)),
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_value!(
    f32 => Float,
    i32 => Int,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat3 => Mat3,
    Mat4 => Mat4,
    TextureHandle => Texture,
    SamplerHandle => Sampler,
);

/// Expected type of a material uniform, with an optional default.
///
/// A uniform with a default is optional: when a draw supplies no value the
/// default is what the GPU sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSpec {
    pub ty: UniformType,
    pub default: Option<UniformValue>,
}

impl UniformSpec {
    /// A uniform every draw must provide.
    pub fn required(ty: UniformType) -> Self {
        Self { ty, default: None }
    }

    /// An optional uniform falling back to `default`.
    pub fn with_default(default: impl Into<UniformValue>) -> Self {
        let default = default.into();
        Self {
            ty: default.ty(),
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// An ordered set of named uniform values supplied per drawable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformValues {
    values: Vec<(String, UniformValue)>,
}

impl UniformValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<UniformValue> {
        let index = self.values.iter().position(|(n, _)| n == name)?;
        Some(self.values.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(UniformValue::from(1.0f32).ty(), UniformType::Float);
        assert_eq!(UniformValue::from(Mat4::IDENTITY).ty(), UniformType::Mat4);
        assert_eq!(
            UniformValue::from(TextureHandle::from_raw(3)).ty(),
            UniformType::Texture2d
        );
        assert!(UniformType::Sampler.is_sampling());
        assert!(!UniformType::Vec4.is_sampling());
    }

    #[test]
    fn test_as_bytes() {
        assert_eq!(UniformValue::Mat4(Mat4::IDENTITY).as_bytes().map(<[u8]>::len), Some(64));
        assert_eq!(UniformValue::Vec3(Vec3::ONE).as_bytes().map(<[u8]>::len), Some(12));
        assert_eq!(UniformValue::Sampler(SamplerHandle::from_raw(1)).as_bytes(), None);
    }

    #[test]
    fn test_convert_vectors() {
        let position = UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            position.convert_to(UniformType::Vec2),
            Some(UniformValue::Vec2(Vec2::new(1.0, 2.0)))
        );
        assert_eq!(
            position.convert_to(UniformType::Vec4),
            Some(UniformValue::Vec4(Vec4::new(1.0, 2.0, 3.0, 1.0)))
        );
        assert_eq!(position.convert_to(UniformType::Mat4), None);
        assert_eq!(UniformValue::Float(1.0).convert_to(UniformType::Vec2), None);
    }

    #[test]
    fn test_spec_defaults() {
        let spec = UniformSpec::with_default(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(spec.ty, UniformType::Vec4);
        assert!(!spec.is_required());
        assert!(UniformSpec::required(UniformType::Float).is_required());
    }

    #[test]
    fn test_values_replace_in_place() {
        let mut values = UniformValues::new().with("a", 1.0f32).with("b", 2.0f32);
        values.set("a", 3.0f32);
        let names: Vec<_> = values.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(values.get("a"), Some(&UniformValue::Float(3.0)));
        assert_eq!(values.remove("b"), Some(UniformValue::Float(2.0)));
        assert_eq!(values.len(), 1);
    }
}
