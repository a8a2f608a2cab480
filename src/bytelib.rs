//! Cursor-based byte reader/writer used by the codec.
//!
//! Mirrors the wire conventions in §4.1: big-endian fixed-width integers,
//! 16-bit length-prefixed octet strings, and a sticky error flag on the
//! reader so a decoder can run a whole structure and check for failure
//! once at the end instead of threading `Result` through every field.

/// Cursor over an immutable byte slice.
///
/// Once `error()` is set, every further read returns a zeroed value; the
/// caller is expected to check `error()` after decoding a structure rather
/// than after every single field.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    err: bool,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader {
            buf,
            pos: 0,
            err: false,
        }
    }

    pub fn error(&self) -> bool {
        self.err
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        if self.err || self.remaining() < n {
            self.err = true;
            return &[];
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        slice
    }

    pub fn read_u8(&mut self) -> u8 {
        let s = self.take(1);
        if s.len() == 1 { s[0] } else { 0 }
    }

    pub fn read_u16(&mut self) -> u16 {
        let s = self.take(2);
        if s.len() == 2 {
            u16::from_be_bytes([s[0], s[1]])
        } else {
            0
        }
    }

    pub fn read_u32(&mut self) -> u32 {
        let s = self.take(4);
        if s.len() == 4 {
            u32::from_be_bytes([s[0], s[1], s[2], s[3]])
        } else {
            0
        }
    }

    /// Reads a 16-bit length prefix followed by that many raw bytes, copied
    /// into owning storage (never aliased to the input, per §5).
    pub fn read_octets(&mut self) -> Vec<u8> {
        let len = self.read_u16() as usize;
        self.take(len).to_vec()
    }

    /// Reads exactly `n` raw bytes with no length prefix.
    pub fn read_fixed_octets(&mut self, n: usize) -> Vec<u8> {
        self.take(n).to_vec()
    }

    /// Restricts subsequent reads to the next `len` bytes and runs `f`
    /// inside that window. Honors §4.2's tolerance for trailing bytes: on
    /// return, the cursor is forced to the declared end regardless of how
    /// much `f` actually consumed, unless `f` itself ran past the window
    /// (sticky error, per "readers MUST NOT read beyond the declared
    /// length").
    pub fn with_length_prefixed<T>(&mut self, f: impl FnOnce(&mut Reader<'a>) -> T) -> Option<T> {
        let len = self.read_u16() as usize;
        if self.err || self.remaining() < len {
            self.err = true;
            return None;
        }
        let start = self.pos;
        let end = start + len;
        let mut sub = Reader {
            buf: &self.buf[..end],
            pos: start,
            err: false,
        };
        let result = f(&mut sub);
        if sub.err {
            self.err = true;
            return None;
        }
        if sub.pos > end {
            self.err = true;
            return None;
        }
        if sub.pos < end {
            log::trace!(
                "bytelib: {} trailing byte(s) within declared length, skipping to {}",
                end - sub.pos,
                end
            );
        }
        self.pos = end;
        Some(result)
    }
}

/// Fixed-capacity writer; allocates exactly the length requested at
/// construction and fails (sticky, like `Reader`) if that capacity is
/// exceeded.
pub struct Writer {
    buf: Vec<u8>,
    cap: usize,
    overflow: bool,
}

impl Writer {
    pub fn with_capacity(cap: usize) -> Self {
        Writer {
            buf: Vec::with_capacity(cap),
            cap,
            overflow: false,
        }
    }

    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn buffer(self) -> Vec<u8> {
        self.buf
    }

    fn push(&mut self, bytes: &[u8]) {
        if self.buf.len() + bytes.len() > self.cap {
            self.overflow = true;
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.push(&[v]);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.push(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.push(&v.to_be_bytes());
    }

    pub fn write_octets(&mut self, data: &[u8]) {
        self.write_u16(data.len() as u16);
        self.push(data);
    }

    pub fn write_fixed_octets(&mut self, data: &[u8]) {
        self.push(data);
    }

    /// Writes a placeholder length, runs `f` to write the body, then
    /// patches the true encoded byte length in place. This is how the
    /// codec satisfies §9's "byte-level lengths" requirement: lengths are
    /// counted from what was actually written, never computed from
    /// `size_of`-style arithmetic.
    pub fn with_length_prefixed(&mut self, f: impl FnOnce(&mut Writer)) {
        let len_pos = self.buf.len();
        self.write_u16(0);
        if self.overflow {
            return;
        }
        let body_start = self.buf.len();
        f(self);
        if self.overflow {
            return;
        }
        let body_len = self.buf.len() - body_start;
        let len_bytes = (body_len as u16).to_be_bytes();
        self.buf[len_pos] = len_bytes[0];
        self.buf[len_pos + 1] = len_bytes[1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_primitives() {
        let mut w = Writer::with_capacity(16);
        w.write_u8(0x42);
        w.write_u16(0xBEEF);
        w.write_u32(0xDEAD_BEEF);
        let buf = w.buffer();

        let mut r = Reader::new(&buf);
        assert_eq!(r.read_u8(), 0x42);
        assert_eq!(r.read_u16(), 0xBEEF);
        assert_eq!(r.read_u32(), 0xDEAD_BEEF);
        assert!(!r.error());
    }

    #[test]
    fn octets_are_length_prefixed() {
        let mut w = Writer::with_capacity(16);
        w.write_octets(&[1, 2, 3]);
        let buf = w.buffer();
        assert_eq!(buf, vec![0, 3, 1, 2, 3]);

        let mut r = Reader::new(&buf);
        assert_eq!(r.read_octets(), vec![1, 2, 3]);
    }

    #[test]
    fn reads_past_end_set_sticky_error() {
        let buf = [0u8; 1];
        let mut r = Reader::new(&buf);
        let _ = r.read_u32();
        assert!(r.error());
        // Further reads keep returning zero rather than panicking.
        assert_eq!(r.read_u8(), 0);
    }

    #[test]
    fn writer_overflow_is_sticky() {
        let mut w = Writer::with_capacity(2);
        w.write_u16(1);
        assert!(!w.overflowed());
        w.write_u8(1);
        assert!(w.overflowed());
    }

    #[test]
    fn trailing_bytes_within_declared_length_are_tolerated() {
        // declared length 4, but body only consumes 2 bytes
        let body = [0u8, 4, 0xAA, 0xBB, 0xCC, 0xCC, 0x99];
        let mut r = Reader::new(&body);
        let val = r.with_length_prefixed(|sub| sub.read_u16()).unwrap();
        assert_eq!(val, 0xAABB);
        assert!(!r.error());
        // cursor has skipped to the declared end, not just past the u16
        assert_eq!(r.position(), 6);
    }

    #[test]
    fn inner_grammar_past_declared_length_is_an_error() {
        // declared length 1, but body tries to read a u16 (2 bytes)
        let body = [0u8, 1, 0xAA];
        let mut r = Reader::new(&body);
        let val = r.with_length_prefixed(|sub| sub.read_u16());
        assert!(val.is_none());
        assert!(r.error());
    }
}
