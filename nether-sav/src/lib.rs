//! Nether-SAV: IDL SAVE (.sav) file decoder for Nethercore
//!
//! This crate decodes the sequential-record SAVE files written by IDL into
//! a variable table, a heap table and a table of file-level metadata. It is
//! read-only: files are never written.
//!
//! # Key Features
//!
//! - **Pure Rust**: No external C/C++ dependencies
//! - **Streaming**: Records decode one at a time from any `Read + Seek` source
//! - **Recursive descriptors**: Structure definitions, inheritance and the
//!   per-file definition cache are fully parsed
//! - **Numeric cubes**: Float arrays become dense 3-axis cubes with per-slice
//!   statistics, sub-cube extraction and planes
//! - **Bounded**: Array, string and dimension-table sizes are capped by
//!   [`DecodeConfig`]
//!
//! # SAVE Format Overview
//!
//! SAVE files contain:
//! - A 2-byte signature `SR` and a 2-byte compression flag
//! - A chain of records, each with a 16-byte header holding its kind and the
//!   absolute offset of the next record
//! - Variable records: name, type descriptor, then a big-endian XDR payload
//! - Metadata records: timestamp, version, identification, notice, description
//! - An END_MARKER record
//!
//! # Usage
//!
//! ```ignore
//! use nether_sav::{SaveFile, Value};
//!
//! let file = SaveFile::open("scan.sav").unwrap();
//!
//! if let Some(Value::Cube(cube)) = file.variable("image") {
//!     println!("Shape: {:?}", cube.shape());
//!     println!("Slice 0 min/max: {:?}", cube.stats(0).unwrap());
//! }
//! println!("Written by: {:?}", file.metadata.get("user"));
//! ```
//!
//! # Format Reference
//!
//! - Craig Markwardt's unofficial SAVE file format notes
//! - <https://www.physics.wisc.edu/~craigm/idl/savefmt/>

mod array;
mod codec;
mod config;
mod cube;
mod cursor;
mod descriptor;
mod error;
mod metadata;
mod record;
mod session;
mod value;

#[cfg(test)]
mod test_support;

pub use array::{normalized_extents, read_array};
pub use codec::{read_scalar, TypeCode};
pub use config::DecodeConfig;
pub use cube::{AxisRange, NumericCube, Plane};
pub use cursor::ByteCursor;
pub use descriptor::{
    read_array_descriptor, read_struct_descriptor, read_type_descriptor, ArrayDescriptor,
    ClassInfo, StructCache, StructDescriptor, StructFlags, TagDescriptor, TypeDescriptor,
    VarFlags,
};
pub use error::{ErrorKind, Feature, SavError};
pub use metadata::{MetaValue, MetadataTable};
pub use record::{
    CommonBlock, Identification, Record, RecordBody, RecordHeader, RecordKind, Timestamp,
    VersionInfo,
};
pub use session::{read_sav, Decoder, FileHeader, SaveFile};
pub use value::Value;

// =============================================================================
// Constants
// =============================================================================

/// File signature "SR"
pub const SIGNATURE: &[u8; 2] = b"SR";

/// Compression flag value marking a compressed file
pub const COMPRESSED_FLAG: [u8; 2] = [0x00, 0x06];

/// Marker preceding every variable payload
pub const VAR_START: i32 = 7;

/// Array descriptor marker (32-bit encoding)
pub const ARRAY_START: i32 = 8;

/// Array descriptor marker for the experimental 64-bit encoding
pub const ARRAY_START_64: i32 = 18;

/// Structure descriptor marker
pub const STRUCT_START: i32 = 9;

/// Dimension table size IDL writes
pub const MAX_DIMS: u32 = 8;

/// Deepest structure nesting accepted
pub const MAX_STRUCT_DEPTH: usize = 64;

/// Reserved bytes at the start of a TIMESTAMP record body
pub const TIMESTAMP_RESERVED: usize = 1024;

/// Shift applied to the high word of a next-record offset
pub const NEXT_HIGH_SHIFT: u32 = 33;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(SIGNATURE, b"SR");
        assert_eq!(COMPRESSED_FLAG, [0, 6]);
        assert_ne!(ARRAY_START, ARRAY_START_64);
        assert!(MAX_DIMS >= 3);
    }

    #[test]
    fn test_markers() {
        assert_eq!(VAR_START, 7);
        assert_eq!(ARRAY_START, 8);
        assert_eq!(STRUCT_START, 9);
    }
}
