//! Type, array and struct descriptors
//!
//! Every value in a SAVE file is preceded by a type descriptor. Arrays carry an
//! array descriptor; structures carry an array descriptor (structures are
//! always described as arrays of records) followed by a struct descriptor,
//! which recursively describes its tags and any superclasses.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::codec::TypeCode;

mod cache;
mod grammar;

pub use cache::StructCache;
pub use grammar::{read_array_descriptor, read_struct_descriptor, read_type_descriptor};

bitflags::bitflags! {
    /// Flags word of a type or tag descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VarFlags: u32 {
        /// System variable (unsupported)
        const SYSTEM = 0x02;
        /// Value is an array
        const ARRAY = 0x04;
        /// Value is a structure
        const STRUCTURE = 0x20;
    }
}

bitflags::bitflags! {
    /// Definition flags of a struct descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StructFlags: u32 {
        /// References an earlier definition of the same name
        const PREDEF = 0x01;
        /// Has a class/superclass block
        const INHERITS = 0x02;
        /// Is itself a superclass
        const IS_SUPER = 0x04;
    }
}

/// Shape of a variable's payload
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub typecode: TypeCode,
    pub is_array: bool,
    pub is_structure: bool,
    /// Present for arrays and structures
    pub array_desc: Option<ArrayDescriptor>,
    /// Present for structures only
    pub struct_desc: Option<Arc<StructDescriptor>>,
}

/// Size and per-axis extents of an array payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    /// Always 8 for arrays this decoder reads
    pub start_marker: i32,
    /// Payload length in bytes
    pub byte_length: i32,
    pub element_count: i32,
    /// Number of meaningful axes
    pub dim_count: i32,
    /// Length of the dimension table
    pub max_dims: i32,
    /// Axis extents, `max_dims` entries; unused trailing axes are 1
    pub dims: Vec<i32>,
}

/// One tag (field) of a struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescriptor {
    pub name: String,
    /// Byte offset of the tag inside one record
    pub offset: u64,
    pub typecode: TypeCode,
    pub is_array: bool,
    pub is_structure: bool,
}

/// Schema of a structure
#[derive(Debug, Clone, PartialEq)]
pub struct StructDescriptor {
    pub name: String,
    pub tag_count: i32,
    pub byte_length: i32,
    pub predef: bool,
    pub inherits: bool,
    pub is_super: bool,
    /// Tags in declaration order
    pub tags: Vec<TagDescriptor>,
    pub array_descs: HashMap<String, ArrayDescriptor>,
    pub struct_descs: HashMap<String, Arc<StructDescriptor>>,
    /// Class block, present when `inherits` or `is_super` is set
    pub class: Option<ClassInfo>,
}

/// Object class information attached to a struct
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub class_name: String,
    pub super_class_names: Vec<String>,
    pub super_classes: Vec<Arc<StructDescriptor>>,
}

impl StructDescriptor {
    /// Look up a tag by name
    pub fn tag(&self, name: &str) -> Option<&TagDescriptor> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Array descriptor of an array-valued tag
    pub fn tag_array(&self, name: &str) -> Option<&ArrayDescriptor> {
        self.array_descs.get(name)
    }

    /// Nested struct descriptor of a struct-valued tag
    pub fn tag_struct(&self, name: &str) -> Option<&Arc<StructDescriptor>> {
        self.struct_descs.get(name)
    }
}
