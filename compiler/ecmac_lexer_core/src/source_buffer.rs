//! The source unit (`spec.md` §3 "Source unit"): a named character
//! sequence with a path and a line counter.

/// A source file (or in-memory script) being lexed.
pub struct SourceBuffer<'a> {
    path: &'a str,
    bytes: &'a [u8],
    /// Byte offset of the start of each line, built lazily on first query
    /// (most scripts never need a line number until a diagnostic fires).
    line_starts: Vec<u32>,
}

impl<'a> SourceBuffer<'a> {
    pub fn new(path: &'a str, text: &'a str) -> Self {
        SourceBuffer {
            path,
            bytes: text.as_bytes(),
            line_starts: Vec::new(),
        }
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> u32 {
        self.bytes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn byte_at(&self, pos: u32) -> Option<u8> {
        self.bytes.get(pos as usize).copied()
    }

    fn ensure_line_starts(&mut self) {
        if !self.line_starts.is_empty() || self.bytes.is_empty() {
            if self.line_starts.is_empty() {
                self.line_starts.push(0);
            }
            return;
        }
        self.line_starts.push(0);
        for (i, &b) in self.bytes.iter().enumerate() {
            if b == b'\n' {
                self.line_starts.push((i + 1) as u32);
            }
        }
    }

    /// 1-based line number containing byte offset `pos`.
    pub fn line_at(&mut self, pos: u32) -> u32 {
        self.ensure_line_starts();
        match self.line_starts.binary_search(&pos) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_at_first_line_is_one() {
        let mut buf = SourceBuffer::new("t.js", "var x = 1;");
        assert_eq!(buf.line_at(0), 1);
    }

    #[test]
    fn line_at_counts_newlines() {
        let mut buf = SourceBuffer::new("t.js", "a;\nb;\nc;");
        let c_pos = 6;
        assert_eq!(buf.byte_at(c_pos), Some(b'c'));
        assert_eq!(buf.line_at(c_pos), 3);
    }
}
