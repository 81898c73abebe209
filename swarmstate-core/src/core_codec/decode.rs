/*
    decode.rs - Strict decoder and streaming dict consumer

    Rejects anything the encoder would never produce:
    - truncated input or trailing bytes
    - integers with leading zeros or "-0"
    - dict keys that are unsorted or duplicated
    - nesting deeper than MAX_DEPTH

    DictConsumer walks a top-level dict key by key. Keys the caller does not
    ask for are moved into an Unknowns bucket as raw bytes, so a newer
    writer's fields survive a load/dump cycle through an older reader.
*/

use super::errors::{CodecError, CodecResult};
use super::value::{Dict, RawValue, Unknowns, Value};

/// Maximum nesting of lists and dicts
pub const MAX_DEPTH: usize = 64;

/// Decode a buffer that holds exactly one value
pub fn decode(bytes: &[u8]) -> CodecResult<Value> {
    let mut reader = Reader::new(bytes);
    let value = reader.read_value(0)?;
    reader.expect_end()?;
    Ok(value)
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn peek(&self) -> CodecResult<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(CodecError::Truncated { offset: self.pos })
    }

    fn expect(&mut self, byte: u8) -> CodecResult<()> {
        let found = self.peek()?;
        if found != byte {
            return Err(CodecError::UnexpectedByte { byte: found, offset: self.pos });
        }
        self.pos += 1;
        Ok(())
    }

    fn expect_end(&self) -> CodecResult<()> {
        if self.pos != self.buf.len() {
            return Err(CodecError::TrailingData { offset: self.pos });
        }
        Ok(())
    }

    /// Slice up to (not including) `terminator`, advancing past it
    fn take_until(&mut self, terminator: u8) -> CodecResult<&'a [u8]> {
        let start = self.pos;
        let rest = &self.buf[start..];
        match rest.iter().position(|&b| b == terminator) {
            Some(len) => {
                self.pos = start + len + 1;
                Ok(&rest[..len])
            }
            None => Err(CodecError::Truncated { offset: self.buf.len() }),
        }
    }

    fn read_value(&mut self, depth: usize) -> CodecResult<Value> {
        match self.peek()? {
            b'i' => self.read_int().map(Value::Int),
            b'0'..=b'9' => self.read_bytes().map(|b| Value::Bytes(b.to_vec())),
            b'l' => self.read_list(depth),
            b'd' => self.read_dict(depth),
            byte => Err(CodecError::UnexpectedByte { byte, offset: self.pos }),
        }
    }

    /// Read one value and return its exact encoded bytes
    fn read_raw(&mut self, depth: usize) -> CodecResult<&'a [u8]> {
        let start = self.pos;
        self.read_value(depth)?;
        Ok(&self.buf[start..self.pos])
    }

    fn read_int(&mut self) -> CodecResult<i64> {
        let offset = self.pos;
        self.expect(b'i')?;
        let digits = self.take_until(b'e')?;
        parse_canonical_int(digits).ok_or(CodecError::InvalidInteger { offset })
    }

    fn read_bytes(&mut self) -> CodecResult<&'a [u8]> {
        let offset = self.pos;
        let digits = self.take_until(b':')?;
        let len = parse_canonical_len(digits).ok_or(CodecError::InvalidLength { offset })?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(CodecError::Truncated { offset: self.buf.len() })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_list(&mut self, depth: usize) -> CodecResult<Value> {
        if depth >= MAX_DEPTH {
            return Err(CodecError::TooDeep { max: MAX_DEPTH });
        }
        self.expect(b'l')?;
        let mut items = Vec::new();
        while self.peek()? != b'e' {
            items.push(self.read_value(depth + 1)?);
        }
        self.pos += 1;
        Ok(Value::List(items))
    }

    fn read_dict(&mut self, depth: usize) -> CodecResult<Value> {
        if depth >= MAX_DEPTH {
            return Err(CodecError::TooDeep { max: MAX_DEPTH });
        }
        self.expect(b'd')?;
        let mut entries = Dict::new();
        let mut last_key: Option<&[u8]> = None;
        while self.peek()? != b'e' {
            let key = self.read_key(last_key)?;
            let value = self.read_value(depth + 1)?;
            entries.insert(key.to_vec(), value);
            last_key = Some(key);
        }
        self.pos += 1;
        Ok(Value::Dict(entries))
    }

    /// Read a dict key and check it sorts strictly after `last_key`
    fn read_key(&mut self, last_key: Option<&[u8]>) -> CodecResult<&'a [u8]> {
        let offset = self.pos;
        match self.peek()? {
            b'0'..=b'9' => {}
            byte => return Err(CodecError::UnexpectedByte { byte, offset }),
        }
        let key = self.read_bytes()?;
        if let Some(last) = last_key {
            if key <= last {
                return Err(CodecError::UnsortedKeys { offset });
            }
        }
        Ok(key)
    }
}

fn parse_canonical_int(digits: &[u8]) -> Option<i64> {
    let (negative, magnitude) = match digits.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, digits),
    };
    if magnitude.is_empty() || !magnitude.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if magnitude[0] == b'0' && (magnitude.len() > 1 || negative) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

fn parse_canonical_len(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if digits[0] == b'0' && digits.len() > 1 {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Streaming reader over a top-level dict.
///
/// Keys must be requested in ascending order; every key passed over on the way
/// lands in the caller's Unknowns bucket untouched.
pub struct DictConsumer<'a> {
    reader: Reader<'a>,
    last_key: Option<&'a [u8]>,
    pending: Option<(&'a [u8], &'a [u8])>,
    done: bool,
}

impl<'a> DictConsumer<'a> {
    pub fn new(bytes: &'a [u8]) -> CodecResult<Self> {
        let mut reader = Reader::new(bytes);
        reader.expect(b'd')?;
        Ok(DictConsumer { reader, last_key: None, pending: None, done: false })
    }

    fn peek_entry(&mut self) -> CodecResult<Option<(&'a [u8], &'a [u8])>> {
        if self.pending.is_none() && !self.done {
            if self.reader.peek()? == b'e' {
                self.reader.pos += 1;
                self.done = true;
            } else {
                let key = self.reader.read_key(self.last_key)?;
                let raw = self.reader.read_raw(1)?;
                self.last_key = Some(key);
                self.pending = Some((key, raw));
            }
        }
        Ok(self.pending)
    }

    /// Advance to `key`, returning its raw encoded value if present.
    /// Keys sorting before `key` are moved into `unknowns`.
    pub fn seek(&mut self, key: &[u8], unknowns: &mut Unknowns) -> CodecResult<Option<&'a [u8]>> {
        while let Some((k, raw)) = self.peek_entry()? {
            if k < key {
                unknowns.insert(k.to_vec(), RawValue::from_validated(raw));
                self.pending = None;
            } else if k == key {
                self.pending = None;
                return Ok(Some(raw));
            } else {
                break;
            }
        }
        Ok(None)
    }

    /// Like `seek`, decoding the value
    pub fn seek_value(&mut self, key: &[u8], unknowns: &mut Unknowns) -> CodecResult<Option<Value>> {
        self.seek(key, unknowns)?.map(decode).transpose()
    }

    /// Next entry in key order as `(key, raw value)`
    pub fn next_entry(&mut self) -> CodecResult<Option<(&'a [u8], &'a [u8])>> {
        let entry = self.peek_entry()?;
        self.pending = None;
        Ok(entry)
    }

    /// Drain the remaining entries into `unknowns` and verify nothing follows the dict
    pub fn finish(mut self, unknowns: &mut Unknowns) -> CodecResult<()> {
        while let Some((k, raw)) = self.next_entry()? {
            unknowns.insert(k.to_vec(), RawValue::from_validated(raw));
        }
        self.reader.expect_end()
    }
}
