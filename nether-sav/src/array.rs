//! Array payload reconstruction

use std::io::{Read, Seek};

use byteorder::{BigEndian, ByteOrder};

use crate::codec::TypeCode;
use crate::config::DecodeConfig;
use crate::cube::NumericCube;
use crate::cursor::ByteCursor;
use crate::descriptor::ArrayDescriptor;
use crate::error::{Feature, SavError};

/// Cube extents for an array descriptor.
///
/// Size-1 axes are dropped, the rest reversed, and the first three become
/// (x, y, z), each defaulting to 1.
pub fn normalized_extents(desc: &ArrayDescriptor) -> Result<(usize, usize, usize), SavError> {
    let mut dims = Vec::with_capacity(desc.dims.len());
    for &d in &desc.dims {
        if d < 1 {
            return Err(SavError::InvalidCount {
                what: "array dimension",
                value: d as i64,
            });
        }
        if d != 1 {
            dims.push(d as usize);
        }
    }
    if dims.len() > 3 {
        return Err(SavError::Unsupported(Feature::TooManyAxes(dims.len())));
    }
    dims.reverse();

    let axis = |i: usize| dims.get(i).copied().unwrap_or(1);
    Ok((axis(0), axis(1), axis(2)))
}

/// Read an array payload into a cube.
///
/// Only 4-byte float payloads are reconstructed; other element types fail
/// before any payload byte is consumed. Values are assigned with z outermost,
/// then x, then y innermost. The cursor is 4-byte aligned afterwards.
pub fn read_array<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    typecode: TypeCode,
    desc: &ArrayDescriptor,
    config: &DecodeConfig,
) -> Result<NumericCube, SavError> {
    if typecode != TypeCode::Float32 {
        return Err(SavError::Unsupported(Feature::ArrayElementType(
            typecode.name(),
        )));
    }

    let byte_length = u64::try_from(desc.byte_length).map_err(|_| SavError::InvalidCount {
        what: "array byte length",
        value: desc.byte_length as i64,
    })?;
    if byte_length > config.max_array_bytes {
        return Err(SavError::LimitExceeded {
            what: "Array payload",
            value: byte_length,
            limit: config.max_array_bytes,
        });
    }

    let (width, height, depth) = normalized_extents(desc)?;
    let elements = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(depth))
        .ok_or(SavError::InvalidCount {
            what: "array element count",
            value: desc.element_count as i64,
        })?;
    if byte_length % 4 != 0 || (byte_length / 4) < elements as u64 {
        return Err(SavError::BadByteLength {
            byte_length: byte_length as i64,
            elements,
        });
    }

    let bytes = cursor.read_bytes(byte_length as usize)?;
    let mut values = vec![0f32; bytes.len() / 4];
    BigEndian::read_f32_into(&bytes, &mut values);
    tracing::trace!(width, height, depth, "Array payload");

    let mut cube = NumericCube::new(width, height, depth);
    let mut next = values.iter();
    for z in 0..depth {
        for x in 0..width {
            for y in 0..height {
                // Length was checked against the extents above
                let value = next.next().copied().unwrap_or_default();
                cube.set(x, y, z, value as f64)?;
            }
        }
    }

    cursor.align4()?;
    Ok(cube)
}
