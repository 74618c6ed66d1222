//! Primitive field codec: big-endian integers, fixed byte blocks, padding and
//! counted arrays.
//!
//! Every read is bounds-checked against the remaining buffer and fails with
//! `TruncatedInput` instead of reading past the end. Writes append to a `Vec<u8>`
//! and cannot fail.

use std::io::{BufRead, Cursor, Read};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use crate::error::{OfpError, Result};

/// A 48-bit hardware address, most significant byte first.
pub type MacAddr = [u8; 6];

/// Bounds-checked cursor over a borrowed message buffer.
pub struct Reader<'a> {
    bytes: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Reader<'a> {
        Reader { bytes: Cursor::new(buf) }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        let len = self.bytes.get_ref().len();
        len.saturating_sub(self.bytes.position() as usize)
    }

    fn truncated(&self, needed: usize) -> OfpError {
        OfpError::TruncatedInput {
            needed: needed,
            available: self.remaining(),
        }
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            Err(self.truncated(needed))
        } else {
            Ok(())
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        self.bytes.read_u8().map_err(|_| self.truncated(1))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        self.bytes.read_u16::<BigEndian>().map_err(|_| self.truncated(2))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        self.bytes.read_u32::<BigEndian>().map_err(|_| self.truncated(4))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        self.bytes.read_u64::<BigEndian>().map_err(|_| self.truncated(8))
    }

    /// Read a fixed-size block verbatim.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut arr = [0; N];
        self.bytes.read_exact(&mut arr).map_err(|_| self.truncated(N))?;
        Ok(arr)
    }

    pub fn read_mac(&mut self) -> Result<MacAddr> {
        self.read_array::<6>()
    }

    /// Skip `count` padding bytes. Their contents are not checked.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.bytes.consume(count);
        Ok(())
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        self.ensure(count)?;
        let buf: &'a [u8] = *self.bytes.get_ref();
        let pos = self.bytes.position() as usize;
        self.bytes.consume(count);
        Ok(&buf[pos..pos + count])
    }

    /// Borrow everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let count = self.remaining();
        let buf: &'a [u8] = *self.bytes.get_ref();
        let pos = buf.len() - count;
        self.bytes.consume(count);
        &buf[pos..]
    }

    /// Read a NUL-padded string occupying exactly `capacity` bytes.
    pub fn read_fixed_size_string(&mut self, capacity: usize) -> Result<String> {
        let raw = self.take(capacity)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(capacity);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Read `count` consecutive records. The count comes from an enclosing length
    /// field, the records do not describe themselves.
    pub fn read_counted<T, F>(&mut self, count: usize, mut parse: F) -> Result<Vec<T>>
        where F: FnMut(&mut Reader<'a>) -> Result<T>
    {
        let mut v = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            v.push(parse(self)?);
        }
        Ok(v)
    }
}

pub fn put_u8(bytes: &mut Vec<u8>, v: u8) {
    bytes.push(v);
}

pub fn put_u16(bytes: &mut Vec<u8>, v: u16) {
    let mut buf = [0; 2];
    BigEndian::write_u16(&mut buf, v);
    bytes.extend_from_slice(&buf);
}

pub fn put_u32(bytes: &mut Vec<u8>, v: u32) {
    let mut buf = [0; 4];
    BigEndian::write_u32(&mut buf, v);
    bytes.extend_from_slice(&buf);
}

pub fn put_u64(bytes: &mut Vec<u8>, v: u64) {
    let mut buf = [0; 8];
    BigEndian::write_u64(&mut buf, v);
    bytes.extend_from_slice(&buf);
}

/// Padding is always written as zeros.
pub fn write_padding_bytes(bytes: &mut Vec<u8>, count: usize) {
    let len = bytes.len();
    bytes.resize(len + count, 0);
}

/// Write `s` into a `capacity`-byte NUL-padded field, truncating on a char
/// boundary if needed.
pub fn write_fixed_size_string(bytes: &mut Vec<u8>, s: &str, capacity: usize) {
    let mut n = s.len().min(capacity);
    while !s.is_char_boundary(n) {
        n -= 1;
    }
    bytes.extend_from_slice(&s.as_bytes()[..n]);
    write_padding_bytes(bytes, capacity - n);
}

/// Reject a declared length shorter than the record's fixed part.
pub fn check_min_len(what: &'static str, length: usize, min: usize) -> Result<()> {
    if length < min {
        Err(OfpError::MalformedLength {
            what: what,
            length: length,
        })
    } else {
        Ok(())
    }
}

/// Number of `size`-byte records in a `length`-byte trailer, which must divide evenly.
pub fn element_count(what: &'static str, length: usize, size: usize) -> Result<usize> {
    if length % size != 0 {
        Err(OfpError::MalformedLength {
            what: what,
            length: length,
        })
    } else {
        Ok(length / size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_network_order() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut r = Reader::new(&buf);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x0203);
        assert_eq!(r.read_u32().unwrap(), 0x04050607);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn short_read_is_truncated_input() {
        let buf = [0xff, 0xff, 0xff];
        let mut r = Reader::new(&buf);
        assert_eq!(r.read_u32(),
                   Err(OfpError::TruncatedInput {
                       needed: 4,
                       available: 3,
                   }));
        // A failed read leaves the cursor where it was.
        assert_eq!(r.read_u16().unwrap(), 0xffff);
    }

    #[test]
    fn take_and_rest_borrow_the_input() {
        let buf = [1, 2, 3, 4, 5];
        let mut r = Reader::new(&buf);
        r.skip(1).unwrap();
        assert_eq!(r.take(2).unwrap(), &[2, 3]);
        assert_eq!(r.rest(), &[4, 5]);
        assert!(r.rest().is_empty());
    }

    #[test]
    fn fixed_size_strings_stop_at_nul() {
        let mut bytes = vec![];
        write_fixed_size_string(&mut bytes, "eth0", 16);
        assert_eq!(bytes.len(), 16);
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_fixed_size_string(16).unwrap(), "eth0");
    }

    #[test]
    fn long_strings_are_cut_on_a_char_boundary() {
        let mut bytes = vec![];
        write_fixed_size_string(&mut bytes, "port-\u{e9}", 6);
        assert_eq!(bytes, b"port-\0".to_vec());
    }

    #[test]
    fn padding_is_zeroed() {
        let mut bytes = vec![0xaa];
        write_padding_bytes(&mut bytes, 3);
        assert_eq!(bytes, vec![0xaa, 0, 0, 0]);
    }

    #[test]
    fn counted_arrays_need_whole_elements() {
        assert_eq!(element_count("ports", 96, 48), Ok(2));
        assert!(element_count("ports", 50, 48).is_err());
    }
}
