//! Element type codes and scalar decoding

use std::io::{Read, Seek};

use num_complex::{Complex32, Complex64};

use crate::cursor::ByteCursor;
use crate::error::{Feature, SavError};
use crate::value::Value;

/// Element type code carried by type and tag descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Undefined,
    Byte,
    Int16,
    Int32,
    Float32,
    Float64,
    Complex64,
    String,
    Structure,
    Complex128,
    Pointer,
    ObjectReference,
    UInt16,
    UInt32,
    Int64,
    UInt64,
}

impl TypeCode {
    /// Map a raw type code, failing on values outside the table
    pub fn from_raw(code: i32) -> Result<Self, SavError> {
        Ok(match code {
            0 => Self::Undefined,
            1 => Self::Byte,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Float32,
            5 => Self::Float64,
            6 => Self::Complex64,
            7 => Self::String,
            8 => Self::Structure,
            9 => Self::Complex128,
            10 => Self::Pointer,
            11 => Self::ObjectReference,
            12 => Self::UInt16,
            13 => Self::UInt32,
            14 => Self::Int64,
            15 => Self::UInt64,
            other => return Err(SavError::UnknownTypeCode(other)),
        })
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Undefined => 0,
            Self::Byte => 1,
            Self::Int16 => 2,
            Self::Int32 => 3,
            Self::Float32 => 4,
            Self::Float64 => 5,
            Self::Complex64 => 6,
            Self::String => 7,
            Self::Structure => 8,
            Self::Complex128 => 9,
            Self::Pointer => 10,
            Self::ObjectReference => 11,
            Self::UInt16 => 12,
            Self::UInt32 => 13,
            Self::Int64 => 14,
            Self::UInt64 => 15,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Byte => "byte",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::String => "string",
            Self::Structure => "structure",
            Self::Complex128 => "complex128",
            Self::Pointer => "pointer",
            Self::ObjectReference => "object reference",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
        }
    }
}

/// Decode one scalar of the given type at the cursor.
///
/// 16-bit integers occupy a 4-byte slot on disk; only the low half carries the
/// value. Byte scalars are preceded by a length word that must be 1, and are
/// padded to a 4-byte boundary.
pub fn read_scalar<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    code: TypeCode,
) -> Result<Value, SavError> {
    Ok(match code {
        TypeCode::Byte => {
            let len = cursor.read_i32()?;
            if len != 1 {
                return Err(SavError::BadByteScalar(len));
            }
            let value = cursor.read_u8()?;
            cursor.align4()?;
            Value::Byte(value)
        }
        TypeCode::Int16 => {
            cursor.skip(2)?;
            Value::Int16(cursor.read_i16()?)
        }
        TypeCode::UInt16 => {
            cursor.skip(2)?;
            Value::UInt16(cursor.read_u16()?)
        }
        TypeCode::Int32 => Value::Int32(cursor.read_i32()?),
        TypeCode::UInt32 => Value::UInt32(cursor.read_u32()?),
        TypeCode::Int64 => Value::Int64(cursor.read_i64()?),
        TypeCode::UInt64 => Value::UInt64(cursor.read_u64()?),
        TypeCode::Float32 => Value::Float32(cursor.read_f32()?),
        TypeCode::Float64 => Value::Float64(cursor.read_f64()?),
        TypeCode::Complex64 => {
            let re = cursor.read_f32()?;
            let im = cursor.read_f32()?;
            Value::Complex64(Complex32::new(re, im))
        }
        TypeCode::Complex128 => {
            let re = cursor.read_f64()?;
            let im = cursor.read_f64()?;
            Value::Complex128(Complex64::new(re, im))
        }
        TypeCode::String => Value::String(cursor.read_string_data()?),
        TypeCode::Structure => return Err(SavError::Unsupported(Feature::StructureValue)),
        TypeCode::Pointer => return Err(SavError::Unsupported(Feature::Pointer)),
        TypeCode::ObjectReference => {
            return Err(SavError::Unsupported(Feature::ObjectReference));
        }
        // Undefined values never reach the value decoder
        TypeCode::Undefined => return Err(SavError::UnknownTypeCode(0)),
    })
}
