use image::{Rgba, RgbaImage};
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::scan::regions::PixelRect;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Parameters for stripping everything except one text color from a crop.
///
/// Pixels farther than `distance` (Euclidean, RGB) from `keep` become `replace`.
/// With `simple_background`, pixels identical to the crop's top-left pixel are
/// replaced without the distance check, which removes most of the work on the
/// flat backgrounds behind the name, candy and HP labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorFilter {
    pub keep: [u8; 3],
    pub replace: Rgba<u8>,
    pub distance: u32,
    pub simple_background: bool,
}

impl ColorFilter {
    /// Dark teal text of the name and candy labels.
    pub const NAME: ColorFilter = ColorFilter {
        keep: [68, 105, 108],
        replace: WHITE,
        distance: 200,
        simple_background: true,
    };

    /// Dark grey text of the HP and candy amount labels.
    pub const STAT_TEXT: ColorFilter = ColorFilter {
        keep: [55, 66, 61],
        replace: WHITE,
        distance: 200,
        simple_background: true,
    };

    /// White CP digits drawn over the creature backdrop, inverted onto black.
    pub const CP: ColorFilter = ColorFilter {
        keep: [255, 255, 255],
        replace: BLACK,
        distance: 30,
        simple_background: false,
    };

    /// Evolution cost text when the player has enough candy (~rgb 76,112,114).
    pub const COST_AFFORDABLE: ColorFilter = ColorFilter {
        keep: [80, 110, 110],
        replace: WHITE,
        distance: 45,
        simple_background: false,
    };

    /// Evolution cost text when the player lacks candy (~rgb 255,95,100).
    pub const COST_UNAFFORDABLE: ColorFilter = ColorFilter {
        keep: [255, 95, 100],
        replace: WHITE,
        distance: 30,
        simple_background: false,
    };

    /// Applies the filter to `img` in place.
    pub fn apply_in_place(&self, img: &mut RgbaImage) {
        let Some(&first) = img.pixels().next() else {
            return;
        };
        let background = if self.simple_background { first } else { self.replace };
        let distance_sq = self.distance * self.distance;

        for pixel in img.pixels_mut() {
            if *pixel == background {
                *pixel = self.replace;
                continue;
            }
            if color_distance_sq(self.keep, pixel) > distance_sq {
                *pixel = self.replace;
            }
        }
    }

    /// Applies the filter to a copy of `img`, leaving the source untouched.
    pub fn apply(&self, img: &RgbaImage) -> RgbaImage {
        let mut out = img.clone();
        self.apply_in_place(&mut out);
        out
    }
}

fn color_distance_sq(keep: [u8; 3], pixel: &Rgba<u8>) -> u32 {
    keep.iter()
        .zip(pixel.0.iter())
        .map(|(&k, &p)| {
            let d = k as i32 - p as i32;
            (d * d) as u32
        })
        .sum()
}

/// Returns true if the horizontal scanline through the vertical middle of the
/// image is pure white. Meant for crops already passed through a [`ColorFilter`]
/// whose replacement color is white.
pub fn is_only_white(img: &RgbaImage) -> bool {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return true;
    }
    let y = height / 2;
    (0..width).all(|x| {
        let p = img.get_pixel(x, y);
        p[0] == 255 && p[1] == 255 && p[2] == 255
    })
}

/// Cache fingerprint of a crop: dimensions plus the row-major pixel bytes.
pub fn hash_image(img: &RgbaImage) -> String {
    let mut hasher = DefaultHasher::new();
    img.dimensions().hash(&mut hasher);
    img.as_raw().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Crops a pixel rectangle from the screenshot, clamped to its bounds.
pub fn crop_rect(img: &RgbaImage, rect: &PixelRect) -> RgbaImage {
    let (w, h) = img.dimensions();

    let x0 = rect.x.min(w);
    let y0 = rect.y.min(h);
    let rw = rect.width.min(w - x0);
    let rh = rect.height.min(h - y0);

    image::imageops::crop_imm(img, x0, y0, rw, rh).to_image()
}
