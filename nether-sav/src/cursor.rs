//! Position-tracking big-endian reader

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::SavError;

/// Seekable reader over a SAVE stream.
///
/// Every fixed-width read advances the position by exactly its width. A read
/// that runs out of bytes is reported as [`SavError::Truncated`], never as a
/// default value.
pub struct ByteCursor<R> {
    inner: R,
    pos: u64,
    max_string_len: u32,
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Wrap a reader positioned at the start of the stream
    pub fn new(inner: R) -> Self {
        Self::with_string_limit(inner, u32::MAX)
    }

    /// Wrap a reader, rejecting strings longer than `max_string_len`
    pub fn with_string_limit(inner: R, max_string_len: u32) -> Self {
        Self {
            inner,
            pos: 0,
            max_string_len,
        }
    }

    /// Current absolute offset
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move to an absolute offset
    pub fn seek_to(&mut self, offset: u64) -> Result<(), SavError> {
        self.pos = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Round the position up to the next multiple of 4
    pub fn align4(&mut self) -> Result<(), SavError> {
        let rem = self.pos % 4;
        if rem != 0 {
            self.seek_to(self.pos + 4 - rem)?;
        }
        Ok(())
    }

    /// Skip `len` bytes that must be present in the stream
    pub fn skip(&mut self, len: usize) -> Result<(), SavError> {
        let offset = self.pos;
        let copied = io::copy(&mut (&mut self.inner).take(len as u64), &mut io::sink())?;
        self.pos += copied;
        if copied < len as u64 {
            return Err(SavError::Truncated {
                offset,
                wanted: len,
            });
        }
        Ok(())
    }

    /// Read exactly `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, SavError> {
        let mut buf = vec![0u8; len];
        self.fixed(len, |r| r.read_exact(&mut buf))?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, SavError> {
        self.fixed(1, |r| r.read_u8())
    }

    pub fn read_i16(&mut self) -> Result<i16, SavError> {
        self.fixed(2, |r| r.read_i16::<BigEndian>())
    }

    pub fn read_u16(&mut self) -> Result<u16, SavError> {
        self.fixed(2, |r| r.read_u16::<BigEndian>())
    }

    pub fn read_i32(&mut self) -> Result<i32, SavError> {
        self.fixed(4, |r| r.read_i32::<BigEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32, SavError> {
        self.fixed(4, |r| r.read_u32::<BigEndian>())
    }

    pub fn read_i64(&mut self) -> Result<i64, SavError> {
        self.fixed(8, |r| r.read_i64::<BigEndian>())
    }

    pub fn read_u64(&mut self) -> Result<u64, SavError> {
        self.fixed(8, |r| r.read_u64::<BigEndian>())
    }

    pub fn read_f32(&mut self) -> Result<f32, SavError> {
        self.fixed(4, |r| r.read_f32::<BigEndian>())
    }

    pub fn read_f64(&mut self) -> Result<f64, SavError> {
        self.fixed(8, |r| r.read_f64::<BigEndian>())
    }

    /// Read a length-prefixed string.
    ///
    /// A zero length yields an empty string and consumes nothing further.
    pub fn read_string(&mut self) -> Result<String, SavError> {
        let len = self.read_i32()?;
        self.string_payload(len)
    }

    /// Read a string carrying two length fields (outer, then actual).
    ///
    /// Used for string scalars and free-text description records. A zero
    /// outer length is an empty string with no second length.
    pub fn read_string_data(&mut self) -> Result<String, SavError> {
        let outer = self.read_i32()?;
        if outer < 0 {
            return Err(negative_length(outer));
        }
        if outer == 0 {
            return Ok(String::new());
        }
        let len = self.read_i32()?;
        self.string_payload(len)
    }

    fn string_payload(&mut self, len: i32) -> Result<String, SavError> {
        if len < 0 {
            return Err(negative_length(len));
        }
        if len == 0 {
            return Ok(String::new());
        }
        if len as u32 > self.max_string_len {
            return Err(SavError::LimitExceeded {
                what: "String length",
                value: len as u64,
                limit: self.max_string_len as u64,
            });
        }
        let offset = self.pos;
        let bytes = self.read_bytes(len as usize)?;
        self.align4()?;
        String::from_utf8(bytes).map_err(|_| SavError::InvalidText(offset))
    }

    fn fixed<T>(
        &mut self,
        width: usize,
        read: impl FnOnce(&mut R) -> io::Result<T>,
    ) -> Result<T, SavError> {
        let offset = self.pos;
        match read(&mut self.inner) {
            Ok(value) => {
                self.pos += width as u64;
                Ok(value)
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(SavError::Truncated {
                offset,
                wanted: width,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

fn negative_length(len: i32) -> SavError {
    SavError::InvalidCount {
        what: "string length",
        value: len as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cursor(bytes: &[u8]) -> ByteCursor<Cursor<&[u8]>> {
        ByteCursor::new(Cursor::new(bytes))
    }

    #[test]
    fn test_fixed_reads_advance_by_width() {
        let data = [
            0x00, 0x00, 0x00, 0x2A, // i32 42
            0xFF, 0xFF, 0xFF, 0xFF, // u32 max
            0xFF, 0xFE, // i16 -2
        ];
        let mut c = cursor(&data);
        assert_eq!(c.read_i32().unwrap(), 42);
        assert_eq!(c.position(), 4);
        assert_eq!(c.read_u32().unwrap(), u32::MAX);
        assert_eq!(c.position(), 8);
        assert_eq!(c.read_i16().unwrap(), -2);
        assert_eq!(c.position(), 10);
    }

    #[test]
    fn test_truncated_read_is_an_error() {
        let mut c = cursor(&[0x00, 0x01]);
        let err = c.read_i32().unwrap_err();
        assert!(matches!(
            err,
            SavError::Truncated {
                offset: 0,
                wanted: 4
            }
        ));
    }

    #[test]
    fn test_align4_never_moves_backward() {
        let data = [0u8; 16];
        let mut c = cursor(&data);
        c.align4().unwrap();
        assert_eq!(c.position(), 0);
        c.read_u8().unwrap();
        c.align4().unwrap();
        assert_eq!(c.position(), 4);
        c.align4().unwrap();
        assert_eq!(c.position(), 4);
        c.read_i16().unwrap();
        c.read_u8().unwrap();
        c.align4().unwrap();
        assert_eq!(c.position(), 8);
    }

    #[test]
    fn test_read_string_aligns() {
        let data = [
            0x00, 0x00, 0x00, 0x03, b'a', b'b', b'c', 0x00, // "abc" + pad
            0x00, 0x00, 0x00, 0x07,
        ];
        let mut c = cursor(&data);
        assert_eq!(c.read_string().unwrap(), "abc");
        assert_eq!(c.position(), 8);
        assert_eq!(c.read_i32().unwrap(), 7);
    }

    #[test]
    fn test_empty_string_consumes_only_length() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09];
        let mut c = cursor(&data);
        assert_eq!(c.read_string().unwrap(), "");
        assert_eq!(c.position(), 4);
    }

    #[test]
    fn test_read_string_data_two_lengths() {
        let data = [
            0x00, 0x00, 0x00, 0x05, // outer
            0x00, 0x00, 0x00, 0x05, // actual
            b'h', b'e', b'l', b'l', b'o', 0, 0, 0,
        ];
        let mut c = cursor(&data);
        assert_eq!(c.read_string_data().unwrap(), "hello");
        assert_eq!(c.position(), 16);
    }

    #[test]
    fn test_string_limit() {
        let data = [0x00, 0x00, 0x01, 0x00];
        let mut c = ByteCursor::with_string_limit(Cursor::new(&data[..]), 16);
        assert!(matches!(
            c.read_string(),
            Err(SavError::LimitExceeded { value: 256, .. })
        ));
    }

    #[test]
    fn test_skip_past_end() {
        let mut c = cursor(&[0u8; 3]);
        assert!(matches!(c.skip(4), Err(SavError::Truncated { .. })));
    }

    #[test]
    fn test_negative_string_length() {
        let mut c = cursor(&[0xFF, 0xFF, 0xFF, 0xFE, 0, 0, 0, 0]);
        assert!(matches!(
            c.read_string(),
            Err(SavError::InvalidCount { value: -2, .. })
        ));

        let mut c = cursor(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(
            c.read_string_data(),
            Err(SavError::InvalidCount { value: -1, .. })
        ));

        // Outer length fine, actual length negative
        let mut c = cursor(&[0, 0, 0, 4, 0xFF, 0xFF, 0xFF, 0xFC]);
        assert!(matches!(
            c.read_string_data(),
            Err(SavError::InvalidCount { value: -4, .. })
        ));
    }

    #[test]
    fn test_empty_string_data() {
        let mut c = cursor(&[0, 0, 0, 0, 0, 0, 0, 9]);
        assert_eq!(c.read_string_data().unwrap(), "");
        assert_eq!(c.position(), 4);
    }
}
