//! Record framing and typed record bodies

use std::io::{Read, Seek};

use serde::Serialize;

use crate::array::read_array;
use crate::codec::{read_scalar, TypeCode};
use crate::config::DecodeConfig;
use crate::cursor::ByteCursor;
use crate::descriptor::{read_type_descriptor, StructCache};
use crate::error::{Feature, SavError};
use crate::value::Value;
use crate::{NEXT_HIGH_SHIFT, TIMESTAMP_RESERVED, VAR_START};

/// Record kinds, by their code in the record header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    StartMarker,
    CommonVariable,
    Variable,
    SystemVariable,
    EndMarker,
    Timestamp,
    Compiled,
    Identification,
    Version,
    HeapHeader,
    HeapData,
    Promote64,
    Notice,
    Description,
}

impl RecordKind {
    pub fn from_code(code: i32) -> Result<Self, SavError> {
        Ok(match code {
            0 => Self::StartMarker,
            1 => Self::CommonVariable,
            2 => Self::Variable,
            3 => Self::SystemVariable,
            6 => Self::EndMarker,
            10 => Self::Timestamp,
            12 => Self::Compiled,
            13 => Self::Identification,
            14 => Self::Version,
            15 => Self::HeapHeader,
            16 => Self::HeapData,
            17 => Self::Promote64,
            19 => Self::Notice,
            20 => Self::Description,
            other => return Err(SavError::UnknownRecordType(other)),
        })
    }

    pub fn code(self) -> i32 {
        match self {
            Self::StartMarker => 0,
            Self::CommonVariable => 1,
            Self::Variable => 2,
            Self::SystemVariable => 3,
            Self::EndMarker => 6,
            Self::Timestamp => 10,
            Self::Compiled => 12,
            Self::Identification => 13,
            Self::Version => 14,
            Self::HeapHeader => 15,
            Self::HeapData => 16,
            Self::Promote64 => 17,
            Self::Notice => 19,
            Self::Description => 20,
        }
    }
}

/// Fixed 16-byte record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub kind: RecordKind,
    /// Offset of the header itself
    pub start: u64,
    /// Absolute offset of the following record
    pub next: u64,
}

impl RecordHeader {
    /// Read a header at the cursor
    pub fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self, SavError> {
        let start = cursor.position();
        let kind = RecordKind::from_code(cursor.read_i32()?)?;
        let low = cursor.read_u32()? as u64;
        let high = cursor.read_u32()? as u64;
        cursor.skip(4)?;

        let next = low + (high << NEXT_HIGH_SHIFT);
        if kind != RecordKind::EndMarker && next <= start {
            return Err(SavError::InvalidRecordOffset { start, next });
        }
        Ok(Self { kind, start, next })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    pub date: String,
    pub user: String,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub format: i32,
    pub arch: String,
    pub os: String,
    pub release: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identification {
    pub author: String,
    pub title: String,
    pub idcode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonBlock {
    pub name: String,
    pub varnames: Vec<String>,
}

/// Decoded body of one record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    /// Named variable; `None` when undefined
    Variable { name: String, value: Option<Value> },
    /// Heap slot addressed by index
    HeapData { index: i32, value: Option<Value> },
    Timestamp(Timestamp),
    Version(VersionInfo),
    Identification(Identification),
    Notice(String),
    Description(String),
    /// Heap indices in use
    HeapHeader(Vec<i32>),
    CommonBlock(CommonBlock),
    EndMarker,
    /// Recognized and intentionally not decoded
    Skipped,
}

/// One decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub header: RecordHeader,
    pub body: RecordBody,
}

/// Read the body of a record whose header was just consumed
pub(crate) fn read_body<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    header: &RecordHeader,
    cache: &mut StructCache,
    config: &DecodeConfig,
) -> Result<RecordBody, SavError> {
    Ok(match header.kind {
        RecordKind::Variable => {
            let name = cursor.read_string()?;
            let value = read_value(cursor, header, cache, config)?;
            RecordBody::Variable { name, value }
        }
        RecordKind::HeapData => {
            let index = cursor.read_i32()?;
            cursor.skip(4)?;
            let value = read_value(cursor, header, cache, config)?;
            RecordBody::HeapData { index, value }
        }
        RecordKind::Timestamp => {
            cursor.skip(TIMESTAMP_RESERVED)?;
            RecordBody::Timestamp(Timestamp {
                date: cursor.read_string()?,
                user: cursor.read_string()?,
                host: cursor.read_string()?,
            })
        }
        RecordKind::Version => RecordBody::Version(VersionInfo {
            format: cursor.read_i32()?,
            arch: cursor.read_string()?,
            os: cursor.read_string()?,
            release: cursor.read_string()?,
        }),
        RecordKind::Identification => RecordBody::Identification(Identification {
            author: cursor.read_string()?,
            title: cursor.read_string()?,
            idcode: cursor.read_string()?,
        }),
        RecordKind::Notice => RecordBody::Notice(cursor.read_string()?),
        RecordKind::Description => RecordBody::Description(cursor.read_string_data()?),
        RecordKind::HeapHeader => {
            let count = read_count(cursor, "heap index count")?;
            let mut indices = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                indices.push(cursor.read_i32()?);
            }
            RecordBody::HeapHeader(indices)
        }
        RecordKind::CommonVariable => {
            let count = read_count(cursor, "common block variable count")?;
            let name = cursor.read_string()?;
            let mut varnames = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                varnames.push(cursor.read_string()?);
            }
            RecordBody::CommonBlock(CommonBlock { name, varnames })
        }
        RecordKind::EndMarker => RecordBody::EndMarker,
        RecordKind::SystemVariable => {
            tracing::warn!(offset = header.start, "Skipping SYSTEM_VARIABLE record");
            RecordBody::Skipped
        }
        kind @ (RecordKind::StartMarker | RecordKind::Compiled | RecordKind::Promote64) => {
            return Err(SavError::Unsupported(Feature::RecordKind(kind)));
        }
    })
}

/// Type descriptor plus value payload shared by variable and heap records
fn read_value<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    header: &RecordHeader,
    cache: &mut StructCache,
    config: &DecodeConfig,
) -> Result<Option<Value>, SavError> {
    let desc = read_type_descriptor(cursor, cache, config)?;

    if desc.typecode == TypeCode::Undefined {
        // Undefined values are legal only when nothing follows the descriptor
        let position = cursor.position();
        if position != header.next {
            return Err(SavError::UndefinedValueOffset {
                position,
                next: header.next,
            });
        }
        return Ok(None);
    }

    let var_start = cursor.read_i32()?;
    if var_start != VAR_START {
        return Err(SavError::BadVarStart(var_start));
    }

    if desc.is_structure {
        return Err(SavError::Unsupported(Feature::StructureValue));
    }
    let value = match &desc.array_desc {
        Some(array) => Value::Cube(read_array(cursor, desc.typecode, array, config)?),
        None => read_scalar(cursor, desc.typecode)?,
    };
    Ok(Some(value))
}

fn read_count<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    what: &'static str,
) -> Result<usize, SavError> {
    let raw = cursor.read_i32()?;
    usize::try_from(raw).map_err(|_| SavError::InvalidCount {
        what,
        value: raw as i64,
    })
}
