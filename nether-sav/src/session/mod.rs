//! Record dispatch loop and the decoded file
//!
//! A [`Decoder`] owns one byte stream and everything learned from it: the
//! structure cache, the variable and heap tables and the metadata table.
//! Records are decoded one at a time with [`Decoder::next_record`] until the
//! END_MARKER record is consumed; [`Decoder::finish`] drives the loop to the
//! end and hands back a [`SaveFile`].

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use hashbrown::HashMap;

use crate::config::DecodeConfig;
use crate::cursor::ByteCursor;
use crate::descriptor::StructCache;
use crate::error::SavError;
use crate::metadata::MetadataTable;
use crate::record::{read_body, Record, RecordBody, RecordHeader, RecordKind};
use crate::value::Value;
use crate::{COMPRESSED_FLAG, SIGNATURE};


/// Signature and compression flag at the start of every file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub compressed: bool,
    pub raw_flag: [u8; 2],
}

impl FileHeader {
    fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self, SavError> {
        let mut signature = [0u8; 2];
        signature.copy_from_slice(&cursor.read_bytes(2)?);
        if &signature != SIGNATURE {
            return Err(SavError::BadSignature(signature));
        }

        let mut raw_flag = [0u8; 2];
        raw_flag.copy_from_slice(&cursor.read_bytes(2)?);
        let compressed = raw_flag == COMPRESSED_FLAG;
        if compressed {
            tracing::warn!("File is flagged as compressed; decoding records as stored");
        }
        Ok(Self {
            compressed,
            raw_flag,
        })
    }
}

/// Everything decoded from one file
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFile {
    pub header: FileHeader,
    /// Lower-cased variable name to value; `None` marks an undefined variable
    pub variables: HashMap<String, Option<Value>>,
    /// Heap index to value
    pub heap: HashMap<i32, Option<Value>>,
    pub metadata: MetadataTable,
    /// Record kinds in stream order
    pub records: Vec<RecordKind>,
}

impl SaveFile {
    /// Decode a file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SavError> {
        Self::open_with_config(path, DecodeConfig::default())
    }

    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: DecodeConfig,
    ) -> Result<Self, SavError> {
        let file = File::open(path.as_ref())?;
        Decoder::with_config(BufReader::new(file), config)?.finish()
    }

    /// Look up a defined variable, ignoring case
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables
            .get(name.to_lowercase().as_str())
            .and_then(Option::as_ref)
    }

    /// True if a variable of this name was present, even if undefined
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name.to_lowercase().as_str())
    }
}

/// Decode a complete file held in memory
pub fn read_sav(data: &[u8]) -> Result<SaveFile, SavError> {
    Decoder::new(Cursor::new(data))?.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Done,
}

/// Streaming decoder over one SAVE file
pub struct Decoder<R> {
    cursor: ByteCursor<R>,
    config: DecodeConfig,
    cache: StructCache,
    state: State,
    header: FileHeader,
    variables: HashMap<String, Option<Value>>,
    heap: HashMap<i32, Option<Value>>,
    metadata: MetadataTable,
    records: Vec<RecordKind>,
}

impl<R: Read + Seek> Decoder<R> {
    /// Start a session with default limits. Reads and validates the file header.
    pub fn new(reader: R) -> Result<Self, SavError> {
        Self::with_config(reader, DecodeConfig::default())
    }

    pub fn with_config(reader: R, config: DecodeConfig) -> Result<Self, SavError> {
        let mut cursor = ByteCursor::with_string_limit(reader, config.max_string_len);
        let header = FileHeader::read(&mut cursor)?;
        Ok(Self {
            cursor,
            config,
            cache: StructCache::new(),
            state: State::Running,
            header,
            variables: HashMap::new(),
            heap: HashMap::new(),
            metadata: MetadataTable::new(),
            records: Vec::new(),
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Decode and file the next record.
    ///
    /// Returns `Ok(None)` once END_MARKER has been consumed. Any error ends
    /// the session.
    pub fn next_record(&mut self) -> Result<Option<Record>, SavError> {
        if self.state == State::Done {
            return Ok(None);
        }
        match self.read_record() {
            Ok(record) => {
                self.file(&record);
                if record.header.kind == RecordKind::EndMarker {
                    self.state = State::Done;
                }
                Ok(Some(record))
            }
            Err(e) => {
                self.state = State::Done;
                Err(e)
            }
        }
    }

    /// Drive the loop to END_MARKER and return the decoded file
    pub fn finish(mut self) -> Result<SaveFile, SavError> {
        while self.next_record()?.is_some() {}
        Ok(SaveFile {
            header: self.header,
            variables: self.variables,
            heap: self.heap,
            metadata: self.metadata,
            records: self.records,
        })
    }

    fn read_record(&mut self) -> Result<Record, SavError> {
        let header = RecordHeader::read(&mut self.cursor)?;
        tracing::debug!(
            kind = ?header.kind,
            offset = header.start,
            next = header.next,
            "Record"
        );

        let body = read_body(&mut self.cursor, &header, &mut self.cache, &self.config)
            .and_then(|body| {
                self.cursor.seek_to(header.next)?;
                Ok(body)
            })
            .map_err(|source| SavError::InRecord {
                offset: header.start,
                kind: header.kind,
                source: Box::new(source),
            })?;
        Ok(Record { header, body })
    }

    fn file(&mut self, record: &Record) {
        self.records.push(record.header.kind);
        match &record.body {
            RecordBody::Variable { name, value } => {
                self.variables.insert(name.to_lowercase(), value.clone());
            }
            RecordBody::HeapData { index, value } => {
                self.heap.insert(*index, value.clone());
            }
            body => self.metadata.merge(body),
        }
    }
}
