//! Decoded variable values

use num_complex::{Complex32, Complex64};

use crate::cube::NumericCube;

/// A decoded variable value.
///
/// Undefined variables are stored as `None` in the variable table rather than
/// as a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Complex64(Complex32),
    Complex128(Complex64),
    String(String),
    Cube(NumericCube),
}

impl Value {
    /// Short type name, as a listing would show it
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Byte(_) => "byte",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::UInt16(_) => "uint16",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::Complex64(_) => "complex64",
            Self::Complex128(_) => "complex128",
            Self::String(_) => "string",
            Self::Cube(_) => "cube",
        }
    }

    /// Numeric value widened to f64. Complex values, strings and cubes return `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Byte(v) => Some(v as f64),
            Self::Int16(v) => Some(v as f64),
            Self::Int32(v) => Some(v as f64),
            Self::Int64(v) => Some(v as f64),
            Self::UInt16(v) => Some(v as f64),
            Self::UInt32(v) => Some(v as f64),
            Self::UInt64(v) => Some(v as f64),
            Self::Float32(v) => Some(v as f64),
            Self::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_cube(&self) -> Option<&NumericCube> {
        match self {
            Self::Cube(cube) => Some(cube),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::UInt32(u32::MAX).as_f64(), Some(4294967295.0));
        assert_eq!(Value::Int16(-3).as_f64(), Some(-3.0));
        assert_eq!(Value::String("x".into()).as_f64(), None);
        assert_eq!(Value::Complex64(Complex32::new(1.0, 2.0)).as_f64(), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Cube(NumericCube::new(1, 1, 1)).type_name(), "cube");
        assert_eq!(Value::Complex128(Complex64::new(0.0, 1.0)).type_name(), "complex128");
    }
}
