//! Runtime values produced by the engine.

use super::{ArrayValue, Primitive, TypeDescriptor};
use crate::registry::ClassDef;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// OBJECT
// =============================================================================

/// Anything an initializer can produce.
///
/// Blanket-implemented for every `Debug + Send + Sync + 'static` type, so
/// registered initializers just return their own structs.
pub trait Object: Any + fmt::Debug + Send + Sync {
    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> Object for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object built by a registered initializer, tagged with its class.
#[derive(Clone)]
pub struct Instance {
    class: Arc<ClassDef>,
    data: Arc<dyn Object>,
}

impl Instance {
    /// Wrap an initializer's output.
    #[must_use]
    pub fn new(class: Arc<ClassDef>, data: Arc<dyn Object>) -> Self {
        Self { class, data }
    }

    /// The class this instance was built from.
    #[must_use]
    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }

    /// Borrow the wrapped value as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        // Deref first: `Arc<dyn Object>` is itself an `Object`.
        (*self.data).as_any().downcast_ref::<T>()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.class.name(), self.data)
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// A node of a resolved object graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Boolean(bool),
    String(String),
    Array(ArrayValue),
    Object(Instance),
}

impl Value {
    /// The runtime type of this value. Null has the null type.
    #[must_use]
    pub fn runtime_type(&self) -> TypeDescriptor {
        match self {
            Self::Null => TypeDescriptor::Null,
            Self::String(_) => TypeDescriptor::String,
            Self::Array(array) => array.runtime_type(),
            Self::Object(instance) => TypeDescriptor::Class(Arc::clone(instance.class())),
            other => match other.primitive() {
                Some(p) => TypeDescriptor::Primitive(p),
                None => TypeDescriptor::Any,
            },
        }
    }

    /// The primitive kind of a scalar value.
    #[must_use]
    pub const fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Byte(_) => Some(Primitive::Byte),
            Self::Short(_) => Some(Primitive::Short),
            Self::Int(_) => Some(Primitive::Int),
            Self::Long(_) => Some(Primitive::Long),
            Self::Float(_) => Some(Primitive::Float),
            Self::Double(_) => Some(Primitive::Double),
            Self::Char(_) => Some(Primitive::Char),
            Self::Boolean(_) => Some(Primitive::Boolean),
            _ => None,
        }
    }

    /// Check for null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert this value for a slot declared as `target`.
    ///
    /// Returns `None` when the value cannot be passed there: null into a
    /// primitive, a narrowing primitive conversion, or an unrelated type.
    #[must_use]
    pub fn coerce_to(&self, target: &TypeDescriptor) -> Option<Value> {
        match target {
            TypeDescriptor::Primitive(p) => self.widen(*p),
            _ if self.is_null() => Some(Self::Null),
            TypeDescriptor::Any => Some(self.clone()),
            _ => target
                .is_assignable_from(&self.runtime_type())
                .then(|| self.clone()),
        }
    }

    /// Widen a primitive value to `target`.
    #[must_use]
    pub fn widen(&self, target: Primitive) -> Option<Value> {
        let source = self.primitive()?;
        if !source.widens_to(target) {
            return None;
        }
        let widened = match (self, target) {
            (v, t) if source == t => v.clone(),
            (Self::Byte(b), Primitive::Short) => Self::Short(i16::from(*b)),
            (Self::Byte(b), Primitive::Int) => Self::Int(i32::from(*b)),
            (Self::Byte(b), Primitive::Long) => Self::Long(i64::from(*b)),
            (Self::Byte(b), Primitive::Float) => Self::Float(f32::from(*b)),
            (Self::Byte(b), Primitive::Double) => Self::Double(f64::from(*b)),
            (Self::Short(s), Primitive::Int) => Self::Int(i32::from(*s)),
            (Self::Short(s), Primitive::Long) => Self::Long(i64::from(*s)),
            (Self::Short(s), Primitive::Float) => Self::Float(f32::from(*s)),
            (Self::Short(s), Primitive::Double) => Self::Double(f64::from(*s)),
            (Self::Char(c), Primitive::Int) => Self::Int(u32::from(*c) as i32),
            (Self::Char(c), Primitive::Long) => Self::Long(i64::from(u32::from(*c))),
            (Self::Char(c), Primitive::Float) => Self::Float(u32::from(*c) as f32),
            (Self::Char(c), Primitive::Double) => Self::Double(f64::from(u32::from(*c))),
            (Self::Int(i), Primitive::Long) => Self::Long(i64::from(*i)),
            (Self::Int(i), Primitive::Float) => Self::Float(*i as f32),
            (Self::Int(i), Primitive::Double) => Self::Double(f64::from(*i)),
            (Self::Long(l), Primitive::Float) => Self::Float(*l as f32),
            (Self::Long(l), Primitive::Double) => Self::Double(*l as f64),
            (Self::Float(x), Primitive::Double) => Self::Double(f64::from(*x)),
            _ => return None,
        };
        Some(widened)
    }

    /// Integer payload.
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Long payload.
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Double payload.
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Boolean payload.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Char payload.
    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// String payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Array payload.
    #[must_use]
    pub const fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Instance payload.
    #[must_use]
    pub const fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Borrow an object payload as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_instance()?.downcast_ref::<T>()
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ArrayValue> for Value {
    fn from(v: ArrayValue) -> Self {
        Self::Array(v)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_types() {
        assert_eq!(Value::Null.runtime_type(), TypeDescriptor::Null);
        assert_eq!(
            Value::Int(3).runtime_type(),
            TypeDescriptor::Primitive(Primitive::Int)
        );
        assert_eq!(Value::from("x").runtime_type(), TypeDescriptor::String);
    }

    #[test]
    fn widening_conversions() {
        assert_eq!(Value::Int(7).widen(Primitive::Long), Some(Value::Long(7)));
        assert_eq!(Value::Byte(-2).widen(Primitive::Int), Some(Value::Int(-2)));
        assert_eq!(Value::Char('A').widen(Primitive::Int), Some(Value::Int(65)));
        assert_eq!(Value::Float(1.5).widen(Primitive::Double), Some(Value::Double(1.5)));
        assert_eq!(Value::Long(7).widen(Primitive::Int), None);
        assert_eq!(Value::from("7").widen(Primitive::Int), None);
    }

    #[test]
    fn coerce_rejects_null_for_primitives() {
        let int = TypeDescriptor::Primitive(Primitive::Int);
        assert_eq!(Value::Null.coerce_to(&int), None);
        assert_eq!(Value::Null.coerce_to(&TypeDescriptor::String), Some(Value::Null));
    }

    #[derive(Debug, PartialEq)]
    struct Marker(u8);

    #[test]
    fn instance_downcasts_to_its_own_type() {
        let class = ClassDef::builder("demo.Marker").build();
        let instance = Instance::new(Arc::clone(&class), Arc::new(Marker(7)));

        assert_eq!(instance.downcast_ref::<Marker>(), Some(&Marker(7)));
        assert_eq!(instance.downcast_ref::<String>(), None);

        let value = Value::Object(instance);
        assert_eq!(value.downcast_ref::<Marker>().map(|m| m.0), Some(7));
        assert_eq!(value.runtime_type(), TypeDescriptor::Class(class));
    }

    #[test]
    fn coerce_any_accepts_scalars() {
        assert_eq!(
            Value::Int(1).coerce_to(&TypeDescriptor::Any),
            Some(Value::Int(1))
        );
        assert_eq!(Value::Int(1).coerce_to(&TypeDescriptor::String), None);
    }
}
