//! Image decoding and encoding at the edges of the compositor.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::MemeError;

/// JPEG quality used for lossy output
pub const JPEG_QUALITY: u8 = 90;

/// Decodes image bytes of any supported format into an RGBA raster.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, MemeError> {
    if bytes.len() < 4 {
        debug!("Image is too short");
        return Err(MemeError::DecodeFailed(format!(
            "{} bytes is too short to be an image",
            bytes.len()
        )));
    }

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| {
            debug!("Failed to guess image format: {}", err);
            MemeError::DecodeFailed(err.to_string())
        })?;
    let image = reader.decode().map_err(|err| {
        debug!("Failed to decode image: {}", err);
        MemeError::DecodeFailed(err.to_string())
    })?;
    Ok(image.to_rgba8())
}

/// Reads and decodes an image file.
pub fn read_image(path: &Path) -> Result<RgbaImage, MemeError> {
    let bytes = std::fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => MemeError::MissingInput(path.display().to_string()),
        _ => MemeError::Io(err),
    })?;
    decode(&bytes)
}

/// Serializes an RGBA raster as PNG or JPEG. JPEG drops the alpha channel.
pub fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, MemeError> {
    let mut output = Vec::new();
    match format {
        ImageFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
                .map_err(|err| MemeError::EncodeFailed(err.to_string()))?;
        }
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
            encoder
                .encode_image(&rgb)
                .map_err(|err| MemeError::EncodeFailed(err.to_string()))?;
        }
        other => {
            return Err(MemeError::EncodeFailed(format!(
                "unsupported output format {other:?}"
            )));
        }
    }
    Ok(output)
}

/// Encodes and writes an image, picking the format from the file extension.
pub fn write_image(image: &RgbaImage, path: &Path) -> Result<(), MemeError> {
    let bytes = encode(image, format_for_path(path)?)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Output format for a file name; only PNG and JPEG are written.
pub fn format_for_path(path: &Path) -> Result<ImageFormat, MemeError> {
    match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(format),
        _ => Err(MemeError::EncodeFailed(format!(
            "can't pick an output format for {}",
            path.display()
        ))),
    }
}

/// MIME type sent alongside inline image bytes, sniffed from the bytes themselves.
pub fn mime_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(32, 24, |x, y| Rgba([(x * 8) as u8, (y * 10) as u8, 128, 255]))
    }

    #[test]
    fn png_is_lossless() {
        let image = sample();
        let bytes = encode(&image, ImageFormat::Png).expect("encode png");
        assert_eq!(mime_type(&bytes), "image/png");
        let decoded = decode(&bytes).expect("decode png");
        assert_eq!(decoded, image);
    }

    #[test]
    fn jpeg_keeps_dimensions() {
        let bytes = encode(&sample(), ImageFormat::Jpeg).expect("encode jpeg");
        assert_eq!(mime_type(&bytes), "image/jpeg");
        let decoded = decode(&bytes).expect("decode jpeg");
        assert_eq!(decoded.dimensions(), (32, 24));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(decode(&[]), Err(MemeError::DecodeFailed(_))));
        assert!(matches!(
            decode(b"This is not an image file."),
            Err(MemeError::DecodeFailed(_))
        ));
        assert!(matches!(
            decode(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9]),
            Err(MemeError::DecodeFailed(_))
        ));
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(
            format_for_path(Path::new("out/meme_v2_1_dog.JPG")).expect("jpg"),
            ImageFormat::Jpeg
        );
        assert_eq!(
            format_for_path(Path::new("gen_cat.png")).expect("png"),
            ImageFormat::Png
        );
        assert!(format_for_path(Path::new("meme.gif")).is_err());
        assert!(format_for_path(Path::new("meme")).is_err());
    }

    #[test]
    fn missing_file_is_missing_input() {
        assert!(matches!(
            read_image(Path::new("/definitely/not/here.png")),
            Err(MemeError::MissingInput(_))
        ));
    }
}
