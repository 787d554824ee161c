use crate::errors::{HistogramError, Result};
use std::path::Path;

/// Only 8-bit channels are supported.
pub const RGB_COMPONENT_MAX: u32 = 255;

const MAGIC: &[u8; 2] = b"P6";

/// Parsed binary PPM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpmHeader {
    pub width: usize,
    pub height: usize,
    pub max_value: u32,
    /// Byte offset of the first raster byte.
    pub data_offset: usize,
}

impl PpmHeader {
    /// Number of raster bytes that must follow the header.
    pub fn raster_len(&self) -> Option<usize> {
        self.width.checked_mul(self.height)?.checked_mul(3)
    }
}

/// Parses a `P6` header from the start of `bytes`.
///
/// Whitespace and `#` comments may appear before width, height and max value.
/// The max value is followed by exactly one whitespace byte, after which the
/// raster begins.
pub fn parse_header(path: &Path, bytes: &[u8]) -> Result<PpmHeader> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(HistogramError::InvalidMagic {
            path: path.to_path_buf(),
        });
    }

    let mut cursor = HeaderCursor {
        path,
        bytes,
        pos: MAGIC.len(),
    };

    // The magic must be separated from the width.
    if !cursor.peek().is_some_and(|b| b.is_ascii_whitespace()) {
        return Err(HistogramError::InvalidMagic {
            path: path.to_path_buf(),
        });
    }

    let width = cursor.next_number("width")?;
    let height = cursor.next_number("height")?;
    if width == 0 || height == 0 {
        return Err(cursor.malformed(format!("invalid image size {}x{}", width, height)));
    }

    let max_value = cursor.next_number("max value")?;
    if max_value != RGB_COMPONENT_MAX as usize {
        return Err(HistogramError::UnsupportedMaxValue {
            path: path.to_path_buf(),
            max_value: u32::try_from(max_value).unwrap_or(u32::MAX),
        });
    }

    match cursor.peek() {
        Some(b) if b.is_ascii_whitespace() => cursor.pos += 1,
        _ => return Err(cursor.malformed("missing whitespace after max value".to_string())),
    }

    Ok(PpmHeader {
        width,
        height,
        max_value: RGB_COMPONENT_MAX,
        data_offset: cursor.pos,
    })
}

struct HeaderCursor<'a> {
    path: &'a Path,
    bytes: &'a [u8],
    pos: usize,
}

impl HeaderCursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'#' {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_number(&mut self, field: &str) -> Result<usize> {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.malformed(format!("expected {}", field)));
        }

        // Digits only, so the slice is valid UTF-8.
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| self.malformed(format!("{} out of range", field)))
    }

    fn malformed(&self, message: String) -> HistogramError {
        HistogramError::MalformedHeader {
            path: self.path.to_path_buf(),
            message,
        }
    }
}
