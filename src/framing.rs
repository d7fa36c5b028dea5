/// Accumulates raw bytes and extracts complete delimiter-terminated lines.
///
/// The delimiter defaults to `\n`. A `\r` immediately before the delimiter
/// is stripped by default, so CRLF and LF input produce the same lines;
/// disable `strip_cr` to pass carriage returns through. Bytes after the
/// last delimiter stay buffered until a later `feed` completes the line.
pub struct LineFramer {
    buffer: Vec<u8>,
    delimiter: u8,
    strip_cr: bool,
}

impl LineFramer {
    pub fn new() -> LineFramer {
        LineFramer::with_delimiter(b'\n', true)
    }

    pub fn with_delimiter(delimiter: u8, strip_cr: bool) -> LineFramer {
        LineFramer {
            buffer: Vec::with_capacity(1024),
            delimiter,
            strip_cr,
        }
    }

    /// Append `bytes` and return every line completed by them, in arrival
    /// order, with the delimiter stripped. Feeding a byte sequence in one
    /// call or split across several calls yields the same lines.
    ///
    /// Lines are decoded as UTF-8; invalid sequences are replaced rather
    /// than dropped, so framing stays lossless for the delimiter scan.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == self.delimiter) {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if self.strip_cr && line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }

        lines
    }

    /// Number of buffered bytes not yet forming a complete line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        LineFramer::new()
    }
}
