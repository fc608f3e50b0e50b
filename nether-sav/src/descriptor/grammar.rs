//! Descriptor grammar
//!
//! ```text
//! type_desc   := typecode:i32 flags:i32 [array_desc [struct_desc]]
//! array_desc  := 8 pad:4 nbytes nelements ndims pad:8 nmax dims[nmax]
//! struct_desc := 9 name flags ntags nbytes
//!                  (predef: nothing more)
//!                  tag_hdr[ntags] tag_name[ntags]
//!                  array_desc per array tag, struct_desc per struct tag
//!                  [classname nsuper supername[nsuper] struct_desc[nsuper]]
//! ```

use std::io::{Read, Seek};
use std::sync::Arc;

use hashbrown::HashMap;

use super::{
    ArrayDescriptor, ClassInfo, StructCache, StructDescriptor, StructFlags, TagDescriptor,
    TypeDescriptor, VarFlags,
};
use crate::codec::TypeCode;
use crate::config::DecodeConfig;
use crate::cursor::ByteCursor;
use crate::error::{Feature, SavError};
use crate::{ARRAY_START, ARRAY_START_64, MAX_STRUCT_DEPTH, STRUCT_START};

/// Read a type descriptor and whatever array/struct descriptors it implies
pub fn read_type_descriptor<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    cache: &mut StructCache,
    config: &DecodeConfig,
) -> Result<TypeDescriptor, SavError> {
    let typecode = TypeCode::from_raw(cursor.read_i32()?)?;
    let flags = VarFlags::from_bits_truncate(cursor.read_i32()? as u32);
    if flags.contains(VarFlags::SYSTEM) {
        return Err(SavError::Unsupported(Feature::SystemVariable));
    }

    let is_array = flags.contains(VarFlags::ARRAY);
    let is_structure = flags.contains(VarFlags::STRUCTURE);
    tracing::trace!(?typecode, is_array, is_structure, "Type descriptor");

    let (array_desc, struct_desc) = if is_structure {
        let array = read_array_descriptor(cursor, config)?;
        let desc = read_struct_descriptor(cursor, cache, config)?;
        (Some(array), Some(desc))
    } else if is_array {
        (Some(read_array_descriptor(cursor, config)?), None)
    } else {
        (None, None)
    };

    Ok(TypeDescriptor {
        typecode,
        is_array,
        is_structure,
        array_desc,
        struct_desc,
    })
}

/// Read an array descriptor (32-bit encoding only)
pub fn read_array_descriptor<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    config: &DecodeConfig,
) -> Result<ArrayDescriptor, SavError> {
    let start_marker = cursor.read_i32()?;
    match start_marker {
        ARRAY_START => {}
        ARRAY_START_64 => return Err(SavError::Unsupported(Feature::Array64)),
        other => return Err(SavError::UnknownArrayStart(other)),
    }

    cursor.skip(4)?;
    let byte_length = cursor.read_i32()?;
    let element_count = cursor.read_i32()?;
    let dim_count = cursor.read_i32()?;
    cursor.skip(8)?;
    let max_dims = cursor.read_i32()?;
    if max_dims < 0 {
        return Err(SavError::InvalidCount {
            what: "dimension table length",
            value: max_dims as i64,
        });
    }
    if max_dims as u32 > config.max_dims {
        return Err(SavError::LimitExceeded {
            what: "Dimension table length",
            value: max_dims as u64,
            limit: config.max_dims as u64,
        });
    }

    let mut dims = Vec::with_capacity(max_dims as usize);
    for _ in 0..max_dims {
        dims.push(cursor.read_i32()?);
    }
    tracing::trace!(byte_length, element_count, ?dims, "Array descriptor");

    Ok(ArrayDescriptor {
        start_marker,
        byte_length,
        element_count,
        dim_count,
        max_dims,
        dims,
    })
}

/// Read a struct descriptor, resolving predefined references through `cache`
pub fn read_struct_descriptor<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    cache: &mut StructCache,
    config: &DecodeConfig,
) -> Result<Arc<StructDescriptor>, SavError> {
    read_struct_at_depth(cursor, cache, config, 0)
}

fn read_struct_at_depth<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    cache: &mut StructCache,
    config: &DecodeConfig,
    depth: usize,
) -> Result<Arc<StructDescriptor>, SavError> {
    if depth > MAX_STRUCT_DEPTH {
        return Err(SavError::LimitExceeded {
            what: "Struct nesting depth",
            value: depth as u64,
            limit: MAX_STRUCT_DEPTH as u64,
        });
    }

    let marker = cursor.read_i32()?;
    if marker != STRUCT_START {
        return Err(SavError::MalformedStructStart(marker));
    }

    let name = cursor.read_string()?;
    let flags = StructFlags::from_bits_truncate(cursor.read_i32()? as u32);
    let tag_count = cursor.read_i32()?;
    let byte_length = cursor.read_i32()?;
    tracing::trace!(%name, ?flags, tag_count, depth, "Struct descriptor");

    // A predefined reference carries nothing after its header
    if flags.contains(StructFlags::PREDEF) {
        return cache
            .get(&name)
            .cloned()
            .ok_or(SavError::UndefinedStruct(name));
    }

    let count = checked_count("tag count", tag_count)?;

    // Tag headers first, names in a second pass
    let mut tags = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        tags.push(read_tag_header(cursor)?);
    }
    for tag in &mut tags {
        tag.name = cursor.read_string()?;
    }

    let mut array_descs = HashMap::new();
    for tag in tags.iter().filter(|t| t.is_array) {
        array_descs.insert(tag.name.clone(), read_array_descriptor(cursor, config)?);
    }

    let mut struct_descs = HashMap::new();
    for tag in tags.iter().filter(|t| t.is_structure) {
        let nested = read_struct_at_depth(cursor, cache, config, depth + 1)?;
        struct_descs.insert(tag.name.clone(), nested);
    }

    let inherits = flags.contains(StructFlags::INHERITS);
    let is_super = flags.contains(StructFlags::IS_SUPER);
    let class = if inherits || is_super {
        Some(read_class_info(cursor, cache, config, depth)?)
    } else {
        None
    };

    let desc = Arc::new(StructDescriptor {
        name,
        tag_count,
        byte_length,
        predef: false,
        inherits,
        is_super,
        tags,
        array_descs,
        struct_descs,
        class,
    });
    cache.insert(Arc::clone(&desc));
    Ok(desc)
}

fn read_tag_header<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<TagDescriptor, SavError> {
    let raw_offset = cursor.read_i32()?;
    let offset = match raw_offset {
        -1 => cursor.read_u64()?,
        raw => u64::try_from(raw).map_err(|_| SavError::InvalidCount {
            what: "tag offset",
            value: raw as i64,
        })?,
    };
    let typecode = TypeCode::from_raw(cursor.read_i32()?)?;
    let flags = VarFlags::from_bits_truncate(cursor.read_i32()? as u32);

    Ok(TagDescriptor {
        name: String::new(),
        offset,
        typecode,
        is_array: flags.contains(VarFlags::ARRAY),
        is_structure: flags.contains(VarFlags::STRUCTURE),
    })
}

fn read_class_info<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
    cache: &mut StructCache,
    config: &DecodeConfig,
    depth: usize,
) -> Result<ClassInfo, SavError> {
    let class_name = cursor.read_string()?;
    let count = checked_count("superclass count", cursor.read_i32()?)?;

    let mut super_class_names = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        super_class_names.push(cursor.read_string()?);
    }
    let mut super_classes = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        super_classes.push(read_struct_at_depth(cursor, cache, config, depth + 1)?);
    }

    Ok(ClassInfo {
        class_name,
        super_class_names,
        super_classes,
    })
}

fn checked_count(what: &'static str, value: i32) -> Result<usize, SavError> {
    usize::try_from(value).map_err(|_| SavError::InvalidCount {
        what,
        value: value as i64,
    })
}
