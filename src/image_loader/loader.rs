use super::header::parse_header;
use crate::errors::{HistogramError, Result};
use crate::pixel_buffer::PixelBuffer;
use std::path::Path;

/// Files above this size are memory mapped instead of read into RAM.
const MMAP_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Loads a binary PPM (`P6`) image into a fully populated [`PixelBuffer`].
pub fn load(path: &Path) -> Result<PixelBuffer> {
    if !path.exists() {
        return Err(HistogramError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let io_error = |source: std::io::Error| HistogramError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file_size = std::fs::metadata(path).map_err(io_error)?.len();
    tracing::debug!(path = %path.display(), file_size, "loading image");

    let buffer = if file_size > MMAP_THRESHOLD {
        load_memory_mapped(path)?
    } else {
        let bytes = std::fs::read(path).map_err(io_error)?;
        decode_ppm(path, &bytes)?
    };

    tracing::info!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "loaded image"
    );
    Ok(buffer)
}

fn load_memory_mapped(path: &Path) -> Result<PixelBuffer> {
    use memmap2::Mmap;
    use std::fs::File;

    let io_error = |source: std::io::Error| HistogramError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    // SAFETY: the mapping is read-only and dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_error)?;
    decode_ppm(path, &mmap)
}

/// Decodes an in-memory `P6` file. `path` is only used for error reporting.
pub fn decode_ppm(path: &Path, bytes: &[u8]) -> Result<PixelBuffer> {
    let header = parse_header(path, bytes)?;
    let expected = header
        .raster_len()
        .ok_or_else(|| HistogramError::MalformedHeader {
            path: path.to_path_buf(),
            message: format!("image size {}x{} overflows", header.width, header.height),
        })?;

    let raster = &bytes[header.data_offset..];
    if raster.len() < expected {
        return Err(HistogramError::TruncatedData {
            path: path.to_path_buf(),
            expected,
            actual: raster.len(),
        });
    }

    PixelBuffer::from_rgb_bytes(header.width, header.height, &raster[..expected])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::Pixel;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let mut bytes = b"P6\n# comment\n2 1\n255\n".to_vec();
        bytes.extend_from_slice(&[255, 0, 0, 0, 128, 255]);
        let file = write_temp(&bytes);

        let buffer = load(file.path()).unwrap();
        assert_eq!(buffer.width(), 2);
        assert_eq!(buffer.height(), 1);
        assert_eq!(
            buffer.pixels(),
            &[Pixel::new(255, 0, 0), Pixel::new(0, 128, 255)]
        );
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let mut bytes = b"P6 1 1 255\n".to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
        let buffer = decode_ppm(Path::new("mem.ppm"), &bytes).unwrap();
        assert_eq!(buffer.pixels(), &[Pixel::new(1, 2, 3)]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.ppm")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
        assert!(err.is_load_error());
    }

    #[test]
    fn test_truncated_raster() {
        let mut bytes = b"P6\n2 2\n255\n".to_vec();
        bytes.extend_from_slice(&[0; 11]);
        let file = write_temp(&bytes);

        match load(file.path()).unwrap_err() {
            HistogramError::TruncatedData { expected, actual, .. } => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 11);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_memory_mapped_matches_in_memory_decode() {
        let mut bytes = b"P6\n# mapped\n3 2\n255\n".to_vec();
        bytes.extend((0..18u8).map(|i| i * 13));
        let file = write_temp(&bytes);

        let mapped = load_memory_mapped(file.path()).unwrap();
        let decoded = decode_ppm(file.path(), &bytes).unwrap();
        assert_eq!(mapped, decoded);
        assert_eq!(mapped.get(2, 1), Some(Pixel::new(195, 208, 221)));
    }

    #[test]
    fn test_memory_mapped_truncated_raster() {
        let mut bytes = b"P6\n2 2\n255\n".to_vec();
        bytes.extend_from_slice(&[0; 11]);
        let file = write_temp(&bytes);

        for err in [
            load_memory_mapped(file.path()).unwrap_err(),
            decode_ppm(file.path(), &bytes).unwrap_err(),
        ] {
            assert!(matches!(
                err,
                HistogramError::TruncatedData { expected: 12, actual: 11, .. }
            ));
        }
    }

    #[test]
    fn test_wrong_magic_from_disk() {
        let file = write_temp(b"P5\n1 1\n255\n\0");
        let err = load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_MAGIC");
    }
}
