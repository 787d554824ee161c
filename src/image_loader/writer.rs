use crate::errors::{HistogramError, Result};
use crate::pixel_buffer::PixelBuffer;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

/// Encodes a buffer as binary PPM (`P6`, max value 255).
pub fn encode_ppm(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let encode_error = |message: String| HistogramError::Encode {
        path: Path::new("<memory>").to_path_buf(),
        message,
    };

    let width = u32::try_from(buffer.width()).map_err(|e| encode_error(e.to_string()))?;
    let height = u32::try_from(buffer.height()).map_err(|e| encode_error(e.to_string()))?;

    let mut out = Vec::with_capacity(buffer.len() * 3 + 32);
    PnmEncoder::new(&mut out)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(&buffer.to_rgb_bytes(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| encode_error(e.to_string()))?;
    Ok(out)
}

/// Writes a buffer to disk as binary PPM.
pub fn write_ppm(path: &Path, buffer: &PixelBuffer) -> Result<()> {
    let bytes = encode_ppm(buffer).map_err(|e| match e {
        HistogramError::Encode { message, .. } => HistogramError::Encode {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;
    std::fs::write(path, bytes).map_err(|source| HistogramError::Io {
        path: path.to_path_buf(),
        source,
    })
}
