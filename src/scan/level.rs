//! Creature level estimation from the level arc.
//!
//! The detail view shows level as a white dot on a half-circle arc rather than
//! as text. The dot's angle is proportional to the creature's CP multiplier
//! relative to the trainer's, so every reachable level maps to one fixed pixel.
//! Probing those pixels from the highest level down is cheaper and more
//! reliable than OCR.

use image::RgbaImage;
use serde::Serialize;

/// Highest creature level in the game.
pub const MAX_CREATURE_LEVEL: f64 = 40.0;

/// Highest trainer level the arc table supports.
pub const MAX_TRAINER_LEVEL: u32 = 40;

/// CP multiplier per half level, starting at level 1.0.
const CP_MULTIPLIER: [f64; 79] = [
    0.094, 0.135137432, 0.16639787, 0.192650919, 0.21573247, 0.236572661, 0.25572005,
    0.273530381, 0.29024988, 0.306057377, 0.3210876, 0.335445036, 0.34921268, 0.362457751,
    0.37523559, 0.387592406, 0.39956728, 0.411193551, 0.42250001, 0.432926419, 0.44310755,
    0.453059958, 0.46279839, 0.472336083, 0.48168495, 0.4908558, 0.49985844, 0.508701765,
    0.51739395, 0.525942511, 0.53435433, 0.542635767, 0.55079269, 0.558830576, 0.56675452,
    0.574569153, 0.58227891, 0.589887917, 0.59740001, 0.604818814, 0.61215729, 0.619399365,
    0.62656713, 0.633644533, 0.64065295, 0.647576426, 0.65443563, 0.661214806, 0.667934,
    0.674577537, 0.68116492, 0.687680648, 0.69414365, 0.700538673, 0.70688421, 0.713164996,
    0.71939909, 0.725571552, 0.7317, 0.734741009, 0.73776948, 0.740785574, 0.74378943,
    0.746781211, 0.74976104, 0.752729087, 0.75568551, 0.758630378, 0.76156384, 0.764486065,
    0.76739717, 0.770297266, 0.7731865, 0.776064962, 0.77893275, 0.781790055, 0.78463697,
    0.787473578, 0.79030001,
];

/// Degrees swept by the arc between level 1 and the trainer's own level.
const ARC_SWEEP_DEGREES: f64 = 202.037116;

/// Index into per-half-level tables: level 1.0 -> 0, 1.5 -> 1, ...
pub fn level_to_index(level: f64) -> usize {
    ((level - 1.0) * 2.0).round().max(0.0) as usize
}

fn index_to_level(index: usize) -> f64 {
    1.0 + index as f64 * 0.5
}

/// Highest creature level a trainer of `trainer_level` can reach.
pub fn max_level_for_trainer(trainer_level: u32) -> f64 {
    let trainer_level = trainer_level.clamp(1, MAX_TRAINER_LEVEL);
    (trainer_level as f64 + 1.5).min(MAX_CREATURE_LEVEL)
}

/// A pixel probed for the level marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArcPoint {
    pub level: f64,
    pub x: i32,
    pub y: i32,
}

/// Marker positions for every level reachable by one trainer on one screen size.
#[derive(Clone, Debug)]
pub struct LevelArc {
    trainer_level: u32,
    points: Vec<ArcPoint>,
}

impl LevelArc {
    pub fn new(width: u32, height: u32, trainer_level: u32) -> Self {
        let trainer_level = trainer_level.clamp(1, MAX_TRAINER_LEVEL);
        let center_x = (width / 2) as f64;
        let center_y = (height as f64 / 2.803943).floor();
        let radius = (height as f64 / 4.3760683).round();
        let trainer_multiplier = CP_MULTIPLIER[level_to_index(trainer_level as f64)];

        let max_index = level_to_index(max_level_for_trainer(trainer_level));
        let points = (0..=max_index)
            .map(|index| {
                let mut degrees =
                    (CP_MULTIPLIER[index] - CP_MULTIPLIER[0]) * ARC_SWEEP_DEGREES / trainer_multiplier;
                // Empirical nudge toward where the game actually draws the dot
                if trainer_level >= 30 {
                    degrees += 0.5;
                } else if degrees > 1.0 {
                    degrees -= 0.5;
                }
                let radians = (degrees + 180.0).to_radians();
                ArcPoint {
                    level: index_to_level(index),
                    x: (center_x + radius * radians.cos()) as i32,
                    y: (center_y + radius * radians.sin()) as i32,
                }
            })
            .collect();

        Self { trainer_level, points }
    }

    pub fn trainer_level(&self) -> u32 {
        self.trainer_level
    }

    /// Probe points ordered from level 1.0 upward.
    pub fn points(&self) -> &[ArcPoint] {
        &self.points
    }

    pub fn point_for(&self, level: f64) -> Option<ArcPoint> {
        self.points.get(level_to_index(level)).copied()
    }

    /// Returns the highest level whose marker pixel is opaque white, or 1.0.
    pub fn estimate(&self, screenshot: &RgbaImage) -> f64 {
        self.points
            .iter()
            .rev()
            .find(|p| is_marker(screenshot, p.x, p.y))
            .map(|p| p.level)
            .unwrap_or(1.0)
    }
}

fn is_marker(img: &RgbaImage, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return false;
    }
    img.get_pixel(x as u32, y as u32).0 == [255, 255, 255, 255]
}
