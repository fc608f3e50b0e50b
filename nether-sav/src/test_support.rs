//! Big-endian stream builder for tests
//!
//! Writes SAVE records byte by byte so decoder tests can describe exactly
//! the stream they feed in.

use byteorder::{BigEndian, WriteBytesExt};

use crate::record::RecordKind;
use crate::SIGNATURE;

#[derive(Default)]
pub(crate) struct StreamBuilder {
    buf: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signature plus an uncompressed flag field
    pub fn sav() -> Self {
        let mut b = Self::new();
        b.bytes(SIGNATURE).bytes(&[0x00, 0x04]);
        b
    }

    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.write_i32::<BigEndian>(v).unwrap();
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.write_u32::<BigEndian>(v).unwrap();
        self
    }

    pub fn i64(&mut self, v: i64) -> &mut Self {
        self.buf.write_i64::<BigEndian>(v).unwrap();
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.write_f32::<BigEndian>(v).unwrap();
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.buf.write_f64::<BigEndian>(v).unwrap();
        self
    }

    pub fn align4(&mut self) -> &mut Self {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
        self
    }

    pub fn string(&mut self, s: &str) -> &mut Self {
        self.i32(s.len() as i32);
        self.bytes(s.as_bytes()).align4()
    }

    pub fn string_data(&mut self, s: &str) -> &mut Self {
        self.i32(s.len() as i32);
        if !s.is_empty() {
            self.i32(s.len() as i32);
            self.bytes(s.as_bytes()).align4();
        }
        self
    }

    pub fn type_desc(&mut self, typecode: i32, flags: i32) -> &mut Self {
        self.i32(typecode).i32(flags)
    }

    /// Array descriptor with start marker 8 and an 8-entry dimension table
    pub fn array_desc(&mut self, byte_length: i32, dims: &[i32]) -> &mut Self {
        let elements: i32 = dims.iter().product();
        self.i32(8).i32(0);
        self.i32(byte_length).i32(elements).i32(dims.len() as i32);
        self.i32(0).i32(0);
        self.i32(8);
        for i in 0..8 {
            self.i32(dims.get(i).copied().unwrap_or(1));
        }
        self
    }

    pub fn struct_start(&mut self, name: &str, flags: i32, ntags: i32, nbytes: i32) -> &mut Self {
        self.i32(9).string(name).i32(flags).i32(ntags).i32(nbytes)
    }

    pub fn tag(&mut self, offset: i32, typecode: i32, flags: i32) -> &mut Self {
        self.i32(offset).i32(typecode).i32(flags)
    }

    /// Float32 payload in the order the decoder consumes it
    pub fn floats(&mut self, values: &[f32]) -> &mut Self {
        for &v in values {
            self.f32(v);
        }
        self
    }

    /// Write a framed record whose next offset points just past its body
    pub fn record(&mut self, kind: RecordKind, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.record_skewed(kind, 0, body)
    }

    /// Write a framed record whose next offset is off by `skew` bytes
    pub fn record_skewed(
        &mut self,
        kind: RecordKind,
        skew: i64,
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        let start = self.buf.len();
        self.i32(kind.code()).u32(0).u32(0).u32(0);
        body(self);
        let next = (self.buf.len() as i64 + skew) as u32;
        self.buf[start + 4..start + 8].copy_from_slice(&next.to_be_bytes());
        self
    }

    pub fn end(&mut self) -> &mut Self {
        self.record(RecordKind::EndMarker, |_| {})
    }
}
