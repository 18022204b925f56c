//! Calibration preview.
//!
//! Draws the scan regions and the level arc probe points onto a screenshot so
//! the proportional layout can be checked against a new device, and dumps the
//! filtered crops exactly as Tesseract would see them.

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ocr::preprocess::{crop_rect, ColorFilter};
use crate::scan::{LevelArc, PixelRect, ScreenLayout, ScreenRegion};

pub const COLOR_TEXT_REGION: Rgba<u8> = Rgba([0, 255, 0, 255]); // Green
pub const COLOR_COST_REGION: Rgba<u8> = Rgba([255, 128, 0, 255]); // Orange
pub const COLOR_SAMPLE_REGION: Rgba<u8> = Rgba([0, 0, 255, 255]); // Blue
pub const COLOR_ARC_POINT: Rgba<u8> = Rgba([255, 0, 0, 255]); // Red

fn region_color(region: ScreenRegion) -> Rgba<u8> {
    match region {
        ScreenRegion::EvolutionCost => COLOR_COST_REGION,
        ScreenRegion::NidoranSample => COLOR_SAMPLE_REGION,
        _ => COLOR_TEXT_REGION,
    }
}

/// Renders every region and arc probe point onto a copy of the screenshot.
pub fn render_preview(screenshot: &RgbaImage, layout: &ScreenLayout, arc: &LevelArc) -> RgbaImage {
    let mut img = screenshot.clone();

    for region in ScreenRegion::ALL {
        draw_rect(&mut img, &layout.rect(region), region_color(region), 2);
    }

    for point in arc.points() {
        if point.x >= 0 && point.y >= 0 {
            draw_crosshair(&mut img, point.x as u32, point.y as u32, COLOR_ARC_POINT, 3);
        }
    }

    img
}

/// Writes each region crop, after its field's color filter, as a PNG into
/// `dir`. Returns the written paths.
pub fn dump_regions(screenshot: &RgbaImage, layout: &ScreenLayout, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for region in ScreenRegion::ALL {
        let crop = crop_rect(screenshot, &layout.rect(region));
        let outputs: Vec<(String, RgbaImage)> = match region {
            ScreenRegion::Name | ScreenRegion::CandyName => {
                vec![(region.tag().to_string(), ColorFilter::NAME.apply(&crop))]
            }
            ScreenRegion::Hp | ScreenRegion::CandyAmount => {
                vec![(region.tag().to_string(), ColorFilter::STAT_TEXT.apply(&crop))]
            }
            ScreenRegion::Cp => vec![(region.tag().to_string(), ColorFilter::CP.apply(&crop))],
            ScreenRegion::EvolutionCost => vec![
                (
                    format!("{}_affordable", region.tag()),
                    ColorFilter::COST_AFFORDABLE.apply(&crop),
                ),
                (
                    format!("{}_unaffordable", region.tag()),
                    ColorFilter::COST_UNAFFORDABLE.apply(&crop),
                ),
            ],
            ScreenRegion::NidoranSample => vec![(region.tag().to_string(), crop)],
        };

        for (name, img) in outputs {
            let path = dir.join(format!("{}.png", name));
            img.save(&path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            written.push(path);
        }
    }

    tracing::info!("Wrote {} region crops to {}", written.len(), dir.display());
    Ok(written)
}

/// Draws a rectangle border on an image.
pub fn draw_rect(img: &mut RgbaImage, rect: &PixelRect, color: Rgba<u8>, thickness: u32) {
    let (img_w, img_h) = img.dimensions();
    let mut put = |px: u32, py: u32| {
        if px < img_w && py < img_h {
            img.put_pixel(px, py, color);
        }
    };

    for t in 0..thickness.min(rect.height) {
        for dx in 0..rect.width {
            put(rect.x + dx, rect.y + t);
            put(rect.x + dx, rect.y + rect.height - 1 - t);
        }
    }
    for t in 0..thickness.min(rect.width) {
        for dy in 0..rect.height {
            put(rect.x + t, rect.y + dy);
            put(rect.x + rect.width - 1 - t, rect.y + dy);
        }
    }
}

/// Draws a crosshair at a point.
pub fn draw_crosshair(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, arm_length: u32) {
    let (img_w, img_h) = img.dimensions();

    for d in 0..=arm_length * 2 {
        let offset = d as i64 - arm_length as i64;
        let px = x as i64 + offset;
        let py = y as i64 + offset;
        if px >= 0 && (px as u32) < img_w && y < img_h {
            img.put_pixel(px as u32, y, color);
        }
        if py >= 0 && (py as u32) < img_h && x < img_w {
            img.put_pixel(x, py as u32, color);
        }
    }
}
