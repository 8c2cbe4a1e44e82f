//! Named, typed behavior fields
//!
//! Scene documents configure behaviors through `field: value` pairs. Each
//! behavior kind declares a [`FieldSchema`]: a table of field names, their
//! types and a typed setter. Unknown names and mismatched types are caught
//! when the scene is loaded instead of surfacing later as missing state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::foundation::math::Vec3;

/// Loosely typed value read from a scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `true` / `false`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// Three-element numeric array
    Vec3([f32; 3]),
    /// String literal
    Text(String),
}

impl FieldValue {
    /// Short name of the stored variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Vec3(_) => "vec3",
            Self::Text(_) => "text",
        }
    }

    /// Boolean value; no coercion from numbers or strings
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float value; integer literals are accepted
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f as f32),
            Self::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    /// Vector value
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3([x, y, z]) => Some(Vec3::new(*x, *y, *z)),
            _ => None,
        }
    }

    /// String value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec3> for FieldValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3([value.x, value.y, value.z])
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f32`
    Float,
    /// `Vec3`
    Vec3,
    /// `String`
    Text,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec3 => "vec3",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Field assignment failures
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// The behavior declares no field with this name
    #[error("{behavior} has no field named '{field}'")]
    Unknown {
        /// Behavior kind
        behavior: &'static str,
        /// Field name as written in the document
        field: String,
    },

    /// The value's type does not match the declared field type
    #[error("{behavior}.{field} expects {expected}, got {found}")]
    TypeMismatch {
        /// Behavior kind
        behavior: &'static str,
        /// Field name
        field: String,
        /// Declared type
        expected: FieldType,
        /// Type of the supplied value
        found: &'static str,
    },
}

enum Setter<T> {
    Bool(fn(&mut T, bool)),
    Int(fn(&mut T, i64)),
    Float(fn(&mut T, f32)),
    Vec3(fn(&mut T, Vec3)),
    Text(fn(&mut T, String)),
}

impl<T> Setter<T> {
    fn field_type(&self) -> FieldType {
        match self {
            Self::Bool(_) => FieldType::Bool,
            Self::Int(_) => FieldType::Int,
            Self::Float(_) => FieldType::Float,
            Self::Vec3(_) => FieldType::Vec3,
            Self::Text(_) => FieldType::Text,
        }
    }

    /// Returns false when the value cannot be converted
    fn apply(&self, target: &mut T, value: &FieldValue) -> bool {
        match self {
            Self::Bool(set) => value.as_bool().map(|v| set(target, v)).is_some(),
            Self::Int(set) => value.as_int().map(|v| set(target, v)).is_some(),
            Self::Float(set) => value.as_float().map(|v| set(target, v)).is_some(),
            Self::Vec3(set) => value.as_vec3().map(|v| set(target, v)).is_some(),
            Self::Text(set) => value.as_text().map(|v| set(target, v.to_string())).is_some(),
        }
    }
}

struct FieldSpec<T> {
    name: &'static str,
    setter: Setter<T>,
}

/// Typed setter table for one behavior kind.
///
/// ```
/// use scene_engine::ecs::FieldSchema;
///
/// #[derive(Default)]
/// struct Spinner { speed: f32 }
///
/// let schema = FieldSchema::<Spinner>::new("Spinner").float("speed", |s, v| s.speed = v);
/// let mut spinner = Spinner::default();
/// schema.apply(&mut spinner, "speed", &2.5f64.into()).unwrap();
/// assert_eq!(spinner.speed, 2.5);
/// ```
pub struct FieldSchema<T> {
    behavior: &'static str,
    fields: Vec<FieldSpec<T>>,
}

impl<T> FieldSchema<T> {
    /// Create an empty schema for the named behavior kind
    pub fn new(behavior: &'static str) -> Self {
        Self {
            behavior,
            fields: Vec::new(),
        }
    }

    fn with(mut self, name: &'static str, setter: Setter<T>) -> Self {
        // Later declarations replace earlier ones
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldSpec { name, setter });
        self
    }

    /// Declare a boolean field
    pub fn boolean(self, name: &'static str, set: fn(&mut T, bool)) -> Self {
        self.with(name, Setter::Bool(set))
    }

    /// Declare an integer field
    pub fn int(self, name: &'static str, set: fn(&mut T, i64)) -> Self {
        self.with(name, Setter::Int(set))
    }

    /// Declare a float field (integer literals are accepted)
    pub fn float(self, name: &'static str, set: fn(&mut T, f32)) -> Self {
        self.with(name, Setter::Float(set))
    }

    /// Declare a vector field
    pub fn vec3(self, name: &'static str, set: fn(&mut T, Vec3)) -> Self {
        self.with(name, Setter::Vec3(set))
    }

    /// Declare a string field
    pub fn text(self, name: &'static str, set: fn(&mut T, String)) -> Self {
        self.with(name, Setter::Text(set))
    }

    /// Assign one named value to `target`
    pub fn apply(&self, target: &mut T, name: &str, value: &FieldValue) -> Result<(), FieldError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FieldError::Unknown {
                behavior: self.behavior,
                field: name.to_string(),
            })?;

        if field.setter.apply(target, value) {
            Ok(())
        } else {
            Err(FieldError::TypeMismatch {
                behavior: self.behavior,
                field: name.to_string(),
                expected: field.setter.field_type(),
                found: value.type_name(),
            })
        }
    }

    /// Declared fields in declaration order
    pub fn descriptors(&self) -> Vec<(&'static str, FieldType)> {
        self.fields
            .iter()
            .map(|f| (f.name, f.setter.field_type()))
            .collect()
    }

    /// Behavior kind this schema belongs to
    pub fn behavior(&self) -> &'static str {
        self.behavior
    }
}
