//! PNG `data:` URLs, the form rasters take when they leave the process (previews, stickers, cart lines).

use base64::Engine;

const PNG_PREFIX: &str = "data:image/png;base64,";

#[derive(thiserror::Error, Debug)]
pub enum DataUrlError {
    #[error("not a base64 data url")]
    NotDataUrl,
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Encode a raster as a PNG data URL.
pub fn encode_png(raster: &image::RgbaImage) -> Result<String, DataUrlError> {
    let mut png = std::io::Cursor::new(Vec::new());
    raster.write_to(&mut png, image::ImageFormat::Png)?;
    let png = png.into_inner();

    let mut url = String::with_capacity(PNG_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(&png, &mut url);
    Ok(url)
}

/// Decode any base64 image data URL the image crate understands.
pub fn decode(url: &str) -> Result<image::RgbaImage, DataUrlError> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_mime, payload)| payload)
        .ok_or(DataUrlError::NotDataUrl)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

#[cfg(test)]
mod test {
    #[test]
    fn png_survives() {
        let mut raster = image::RgbaImage::new(3, 2);
        raster.put_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
        let url = super::encode_png(&raster).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(super::decode(&url).unwrap(), raster);
    }
    #[test]
    fn rejects_other_urls() {
        assert!(matches!(
            super::decode("https://example.com/a.png"),
            Err(super::DataUrlError::NotDataUrl)
        ));
        assert!(super::decode("data:image/png;base64,@@@").is_err());
    }
    #[test]
    fn bad_base64_reports_its_cause() {
        let err = super::decode("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, super::DataUrlError::Base64(_)));
        // Transparent, so the message is the decoder's own.
        let err: &dyn std::error::Error = &err;
        assert!(err.to_string().contains("Invalid"));
    }
}
