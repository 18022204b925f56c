//! Telling the two nidoran apart by sprite color.
//!
//! Both species read as "Nidoran" to OCR; only the gender glyph differs and
//! Tesseract drops it too often. The female sprite is noticeably more
//! blue-green, so averaging a patch of the sprite is enough.

use image::RgbaImage;

use crate::ocr::preprocess::crop_rect;
use crate::scan::regions::{ScreenLayout, ScreenRegion};

/// Name fragment that marks an ambiguous nidoran read.
pub const NIDORAN_STEM: &str = "nidora";

/// Average male sprite is ~rgb(136,165,117), female ~rgb(135,190,140).
pub const FEMALE_GREEN_LIMIT: u32 = 175;
pub const FEMALE_BLUE_LIMIT: u32 = 130;

/// True if a recognized name looks like either nidoran.
pub fn is_nidoran(name: &str) -> bool {
    name.to_lowercase().contains(NIDORAN_STEM)
}

/// Integer means of the green and blue channels.
pub fn channel_means(img: &RgbaImage) -> (u32, u32) {
    let count = (img.width() as u64 * img.height() as u64).max(1);
    let (green, blue) = img.pixels().fold((0u64, 0u64), |(g, b), p| {
        (g + p[1] as u64, b + p[2] as u64)
    });
    ((green / count) as u32, (blue / count) as u32)
}

/// Classifies averaged channels: either limit exceeded means female.
pub fn is_female_means(green: u32, blue: u32) -> bool {
    green > FEMALE_GREEN_LIMIT || blue > FEMALE_BLUE_LIMIT
}

/// Samples the sprite region of a full screenshot.
pub fn is_female(screenshot: &RgbaImage, layout: &ScreenLayout) -> bool {
    let sample = crop_rect(screenshot, &layout.rect(ScreenRegion::NidoranSample));
    let (green, blue) = channel_means(&sample);
    let female = is_female_means(green, blue);
    tracing::debug!(
        "Nidoran sample: green {} blue {} -> {}",
        green,
        blue,
        if female { "female" } else { "male" }
    );
    female
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn screenshot_with_sample(color: Rgba<u8>) -> (RgbaImage, ScreenLayout) {
        let layout = ScreenLayout::new(300, 500);
        let rect = layout.rect(ScreenRegion::NidoranSample);
        let img = ImageBuffer::from_fn(300, 500, |x, y| {
            let inside = x >= rect.x
                && x < rect.x + rect.width
                && y >= rect.y
                && y < rect.y + rect.height;
            if inside { color } else { Rgba([0, 0, 0, 255]) }
        });
        (img, layout)
    }

    #[test]
    fn test_green_above_limit_is_female() {
        let (img, layout) = screenshot_with_sample(Rgba([135, 180, 100, 255]));
        assert!(is_female(&img, &layout));
    }

    #[test]
    fn test_blue_above_limit_is_female() {
        let (img, layout) = screenshot_with_sample(Rgba([135, 150, 140, 255]));
        assert!(is_female(&img, &layout));
    }

    #[test]
    fn test_both_below_limits_is_male() {
        let (img, layout) = screenshot_with_sample(Rgba([135, 140, 100, 255]));
        assert!(!is_female(&img, &layout));
    }

    #[test]
    fn test_channel_means_average_mixed_pixels() {
        let mut img: RgbaImage = ImageBuffer::from_pixel(2, 1, Rgba([0, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([0, 200, 161, 255]));
        assert_eq!(channel_means(&img), (150, 130));
        // Exactly on the limits is still male
        assert!(!is_female_means(175, 130));
    }

    #[test]
    fn test_is_nidoran() {
        assert!(is_nidoran("Nidoran"));
        assert!(is_nidoran("NIDORANo"));
        assert!(!is_nidoran("Nidorino"));
        assert!(!is_nidoran("Pidgey"));
    }
}
