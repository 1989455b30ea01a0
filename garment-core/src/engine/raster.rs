//! Software rasterizer for [`super::canvas::HeadlessCanvas`].
//!
//! Axis-aligned only, `angle` is ignored. Text is drawn as its filled bounding box since there is
//! no font shaping here. Good enough to show placement and color on a preview or texture.

use super::{Element, RasterError, Shape};
use crate::color::Color;

/// Pixel span covered by `[start, start + len)` logical units, clamped to `[0, limit)`.
fn span(start: f32, len: f32, scale: f32, limit: u32) -> std::ops::Range<u32> {
    let from: u32 = az::saturating_cast((start * scale).floor().max(0.0));
    let to: u32 = az::saturating_cast(((start + len) * scale).ceil().max(0.0));
    from.min(limit)..to.min(limit)
}

fn blend(raster: &mut image::RgbaImage, x: u32, y: u32, color: Color) {
    let pixel = raster.get_pixel_mut(x, y);
    pixel.0 = color.over(Color(pixel.0)).0;
}

pub(super) fn render(
    background: Color,
    elements: &[Element],
    logical: [u32; 2],
    size: [u32; 2],
) -> Result<image::RgbaImage, RasterError> {
    if size.contains(&0) {
        return Err(RasterError::EmptyTarget(size));
    }
    if logical.contains(&0) {
        return Err(RasterError::Unsized);
    }
    let mut raster = image::RgbaImage::from_pixel(size[0], size[1], image::Rgba(background.0));
    #[allow(clippy::cast_precision_loss)]
    let scale = [
        size[0] as f32 / logical[0] as f32,
        size[1] as f32 / logical[1] as f32,
    ];

    for element in elements {
        let [left, top, width, height] = [
            element.left.get(),
            element.top.get(),
            element.width.get(),
            element.height.get(),
        ];
        let xs = span(left, width, scale[0], size[0]);
        let ys = span(top, height, scale[1], size[1]);
        let fill = element.fill.fade(element.opacity.get());

        match &element.shape {
            Shape::Rect | Shape::Text { .. } => {
                for y in ys.clone() {
                    for x in xs.clone() {
                        blend(&mut raster, x, y, fill);
                    }
                }
            }
            Shape::Circle => {
                let (rx, ry) = (width / 2.0, height / 2.0);
                let (cx, cy) = (left + rx, top + ry);
                for y in ys.clone() {
                    #[allow(clippy::cast_precision_loss)]
                    let ly = (y as f32 + 0.5) / scale[1];
                    for x in xs.clone() {
                        #[allow(clippy::cast_precision_loss)]
                        let lx = (x as f32 + 0.5) / scale[0];
                        let (dx, dy) = ((lx - cx) / rx, (ly - cy) / ry);
                        if dx * dx + dy * dy <= 1.0 {
                            blend(&mut raster, x, y, fill);
                        }
                    }
                }
            }
            Shape::Triangle => {
                // Apex top-center, base along the bottom edge.
                let cx = left + width / 2.0;
                for y in ys.clone() {
                    #[allow(clippy::cast_precision_loss)]
                    let ly = (y as f32 + 0.5) / scale[1];
                    let half = (ly - top) / height * width / 2.0;
                    for x in xs.clone() {
                        #[allow(clippy::cast_precision_loss)]
                        let lx = (x as f32 + 0.5) / scale[0];
                        if (lx - cx).abs() <= half {
                            blend(&mut raster, x, y, fill);
                        }
                    }
                }
            }
            Shape::Image { src } => {
                let decoded = crate::data_url::decode(src)
                    .map_err(|e| RasterError::BadImage(element.id, e.to_string()))?;
                if !xs.is_empty() && !ys.is_empty() {
                    let fitted = image::imageops::resize(
                        &decoded,
                        xs.len().try_into().unwrap_or(u32::MAX),
                        ys.len().try_into().unwrap_or(u32::MAX),
                        image::imageops::FilterType::Nearest,
                    );
                    for (dx, dy, pixel) in fitted.enumerate_pixels() {
                        let color = Color(pixel.0).fade(element.opacity.get());
                        blend(&mut raster, xs.start + dx, ys.start + dy, color);
                    }
                }
            }
        }

        if let Some(stroke) = element.stroke {
            let stroke = stroke.fade(element.opacity.get());
            let (Some(last_x), Some(last_y)) = (xs.clone().last(), ys.clone().last()) else {
                continue;
            };
            for x in xs.clone() {
                blend(&mut raster, x, ys.start, stroke);
                if last_y != ys.start {
                    blend(&mut raster, x, last_y, stroke);
                }
            }
            for y in ys.clone().skip(1) {
                if y == last_y {
                    break;
                }
                blend(&mut raster, xs.start, y, stroke);
                if last_x != xs.start {
                    blend(&mut raster, last_x, y, stroke);
                }
            }
        }
    }
    Ok(raster)
}
