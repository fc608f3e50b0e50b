//! Error types for SAVE file decoding

use std::fmt;
use std::io;

use crate::record::RecordKind;

/// Broad classification of a [`SavError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent bytes
    Format,
    /// Recognized construct this decoder does not implement
    Unsupported,
    /// Internal invariant of the stream violated
    Consistency,
    /// Caller-supplied cube range outside the cube extents
    Range,
    /// Underlying reader failed
    Io,
    /// Decoder configuration could not be parsed
    Config,
}

/// Constructs the format defines but this decoder refuses to decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    /// Type descriptor with the system-variable flag set
    SystemVariable,
    /// Variable whose value is a structure
    StructureValue,
    /// Heap pointer element
    Pointer,
    /// Object reference element
    ObjectReference,
    /// Experimental 64-bit array descriptor (start marker 18)
    Array64,
    /// Array payload whose element type is not 4-byte float
    ArrayElementType(&'static str),
    /// Array with more than three non-degenerate axes
    TooManyAxes(usize),
    /// Record kind with no decoder
    RecordKind(RecordKind),
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemVariable => write!(f, "system variables"),
            Self::StructureValue => write!(f, "structure values"),
            Self::Pointer => write!(f, "pointer values"),
            Self::ObjectReference => write!(f, "object reference values"),
            Self::Array64 => write!(f, "experimental 64-bit array encoding (ARRSTART=18)"),
            Self::ArrayElementType(name) => write!(f, "arrays of {}", name),
            Self::TooManyAxes(n) => write!(f, "arrays with {} non-degenerate axes (max 3)", n),
            Self::RecordKind(kind) => write!(f, "record kind {:?}", kind),
        }
    }
}

/// Errors that can occur while decoding a SAVE file or querying a cube
#[derive(Debug, thiserror::Error)]
pub enum SavError {
    /// Leading signature is not "SR"
    #[error("Invalid signature: {0:02X?} (expected 'SR')")]
    BadSignature([u8; 2]),

    /// Array descriptor start marker is neither 8 nor 18
    #[error("Unknown array start marker: {0}")]
    UnknownArrayStart(i32),

    /// Struct descriptor does not start with 9
    #[error("Malformed struct start: {0} (expected 9)")]
    MalformedStructStart(i32),

    /// Value payload does not start with 7
    #[error("VARSTART is {0} (expected 7)")]
    BadVarStart(i32),

    /// Record type code outside the known table
    #[error("Unknown record type: {0}")]
    UnknownRecordType(i32),

    /// Element type code outside the known table
    #[error("Unknown type code: {0}")]
    UnknownTypeCode(i32),

    /// Byte scalar not preceded by a length of 1
    #[error("Byte scalar has length prefix {0} (expected 1)")]
    BadByteScalar(i32),

    /// Stream ended before a fixed-width read completed
    #[error("Truncated stream: wanted {wanted} bytes at offset 0x{offset:08X}")]
    Truncated { offset: u64, wanted: usize },

    /// Text field is not valid UTF-8
    #[error("Invalid UTF-8 text at offset 0x{0:08X}")]
    InvalidText(u64),

    /// Array payload length disagrees with its dimensions
    #[error("Array byte length {byte_length} does not fit {elements} elements")]
    BadByteLength { byte_length: i64, elements: usize },

    /// A count, length or dimension is negative or zero where it cannot be
    #[error("Invalid {what}: {value}")]
    InvalidCount { what: &'static str, value: i64 },

    /// Next-record offset does not move forward
    #[error("Invalid next-record offset 0x{next:08X} for record at 0x{start:08X}")]
    InvalidRecordOffset { start: u64, next: u64 },

    /// Size exceeds a configured decoder limit
    #[error("{what} of {value} exceeds the configured limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        value: u64,
        limit: u64,
    },

    /// Recognized but unimplemented construct
    #[error("Unsupported: {0}")]
    Unsupported(Feature),

    /// Predefined struct reference with no earlier definition
    #[error("Predefined struct '{0}' has no earlier definition")]
    UndefinedStruct(String),

    /// Undefined (type code 0) value whose record does not end where the header says
    #[error("Unexpected type code 0: cursor at 0x{position:08X}, next record at 0x{next:08X}")]
    UndefinedValueOffset { position: u64, next: u64 },

    /// Cube access or sub-range outside the cube extents
    #[error("Index out of range on {axis} axis: {min}..={max} (extent {extent})")]
    OutOfRange {
        axis: char,
        min: i64,
        max: i64,
        extent: usize,
    },

    /// Axis range text is neither "n" nor "min:max"
    #[error("Invalid axis range: '{0}'")]
    BadRangeSyntax(String),

    /// Configuration text could not be parsed
    #[error("Invalid decoder config: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error from the underlying reader
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error raised while decoding a specific record
    #[error("In {kind:?} record at 0x{offset:08X}: {source}")]
    InRecord {
        offset: u64,
        kind: RecordKind,
        #[source]
        source: Box<SavError>,
    },
}

impl SavError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadSignature(_)
            | Self::UnknownArrayStart(_)
            | Self::MalformedStructStart(_)
            | Self::BadVarStart(_)
            | Self::UnknownRecordType(_)
            | Self::UnknownTypeCode(_)
            | Self::BadByteScalar(_)
            | Self::Truncated { .. }
            | Self::InvalidText(_)
            | Self::BadByteLength { .. }
            | Self::InvalidCount { .. }
            | Self::InvalidRecordOffset { .. }
            | Self::LimitExceeded { .. } => ErrorKind::Format,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::UndefinedStruct(_) | Self::UndefinedValueOffset { .. } => {
                ErrorKind::Consistency
            }
            Self::OutOfRange { .. } | Self::BadRangeSyntax(_) => ErrorKind::Range,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::InRecord { source, .. } => source.kind(),
        }
    }

    /// Strip record context, returning the error that caused it
    pub fn root(&self) -> &SavError {
        match self {
            Self::InRecord { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SavError::UnknownArrayStart(3).to_string(),
            "Unknown array start marker: 3"
        );
        assert_eq!(
            SavError::Unsupported(Feature::Array64).to_string(),
            "Unsupported: experimental 64-bit array encoding (ARRSTART=18)"
        );
        assert_eq!(
            SavError::BadSignature(*b"XX").to_string(),
            "Invalid signature: [58, 58] (expected 'SR')"
        );
    }

    #[test]
    fn test_kind_through_record_context() {
        let err = SavError::InRecord {
            offset: 4,
            kind: RecordKind::Variable,
            source: Box::new(SavError::UndefinedStruct("POINT".to_string())),
        };
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(matches!(err.root(), SavError::UndefinedStruct(name) if name == "POINT"));
    }
}
