//! Full screenshot scan: one pipeline owns the recognizer and the cache.

use anyhow::{bail, Result};
use image::RgbaImage;

use crate::ocr::cache::{ResultCache, DEFAULT_CAPACITY};
use crate::ocr::correct::{letters_to_nums, nums_to_letters, parse_digits, remove_first_or_last_word};
use crate::ocr::engine::TextRecognizer;
use crate::ocr::preprocess::{crop_rect, hash_image, ColorFilter};
use crate::scan::evolution::{scan_evolution_cost, EvolutionCost};
use crate::scan::gender::{is_female, is_nidoran};
use crate::scan::level::LevelArc;
use crate::scan::regions::{ScreenLayout, ScreenRegion};
use crate::scan::result::ScanResult;

/// Inputs fixed for the lifetime of a pipeline.
#[derive(Clone, Debug)]
pub struct ScanSettings {
    /// Screenshot size every scanned image is expected to have.
    pub width: u32,
    pub height: u32,
    pub nidoran_female: String,
    pub nidoran_male: String,
    pub candy_amount_enabled: bool,
    /// Candy label reads "<candy> <species>" instead of "<species> <candy>".
    pub candy_word_first: bool,
    pub cache_capacity: usize,
}

impl ScanSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            nidoran_female: "Nidoran♀".to_string(),
            nidoran_male: "Nidoran♂".to_string(),
            candy_amount_enabled: false,
            candy_word_first: false,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Parses the "current/max" HP label, keeping the max.
///
/// A label with a trailing slash only ("78/") yields the single number.
pub fn parse_hp(text: &str) -> Option<u32> {
    if !text.contains('/') {
        return None;
    }
    let mut parts: Vec<&str> = text.split('/').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    let hp = match parts.as_slice() {
        [] => return None,
        [only] => only,
        [_, max, ..] => max,
    };
    parse_digits(hp)
}

/// Scans creature detail screenshots.
///
/// The pipeline is the single owner of its recognizer: `&mut self` on
/// [`scan`](Self::scan) serializes all recognition calls, and callers sharing a
/// pipeline across threads must wrap it in their own lock. The recognizer is
/// released exactly once through [`release`](Self::release); scanning
/// afterwards is an error.
pub struct ScanPipeline<R: TextRecognizer> {
    recognizer: Option<R>,
    settings: ScanSettings,
    layout: ScreenLayout,
    cache: ResultCache,
    arc: Option<LevelArc>,
}

impl<R: TextRecognizer> ScanPipeline<R> {
    pub fn new(recognizer: R, settings: ScanSettings) -> Self {
        let layout = ScreenLayout::new(settings.width, settings.height);
        if !layout.fits() {
            tracing::warn!(
                "Some scan regions fall outside a {}x{} screen and will be clamped",
                settings.width,
                settings.height
            );
        }
        let cache = ResultCache::new(settings.cache_capacity);
        tracing::info!(
            "Scan pipeline ready for {}x{} screenshots (candy amount {}, cache of {})",
            settings.width,
            settings.height,
            if settings.candy_amount_enabled { "on" } else { "off" },
            cache.capacity()
        );

        Self {
            recognizer: Some(recognizer),
            cache,
            settings,
            layout,
            arc: None,
        }
    }

    pub fn is_released(&self) -> bool {
        self.recognizer.is_none()
    }

    /// Releases the recognizer. Releasing twice is an error.
    pub fn release(&mut self) -> Result<()> {
        match self.recognizer.take() {
            Some(mut recognizer) => recognizer.release(),
            None => {
                tracing::error!("Scan pipeline released twice");
                bail!("scan pipeline already released");
            }
        }
    }

    /// Reads every field from one screenshot.
    pub fn scan(&mut self, screenshot: &RgbaImage, trainer_level: u32) -> Result<ScanResult> {
        if self.recognizer.is_none() {
            tracing::error!("Scan requested on a released pipeline");
            bail!("scan pipeline has been released");
        }
        if screenshot.dimensions() != (self.layout.width, self.layout.height) {
            tracing::warn!(
                "Screenshot is {}x{}, pipeline expects {}x{}",
                screenshot.width(),
                screenshot.height(),
                self.layout.width,
                self.layout.height
            );
        }

        let level = self.estimate_level(screenshot, trainer_level);
        let name = self.scan_name(screenshot)?;
        let candy_name = self.scan_candy_name(screenshot)?;
        let hp = self.scan_hp(screenshot)?;
        let cp = self.scan_cp(screenshot)?;
        let candy_amount = self.scan_candy_amount(screenshot)?;
        let evolution_cost = self.scan_evolution_cost(screenshot)?;

        let result = ScanResult {
            level,
            name,
            candy_name,
            hp,
            cp,
            candy_amount,
            evolution_cost,
        };
        tracing::info!(
            "Scanned {} (candy {}): level {}, HP {:?}, CP {:?}, evolution {:?}",
            result.name,
            result.candy_name,
            result.level,
            result.hp,
            result.cp,
            result.evolution_cost
        );
        Ok(result)
    }

    fn recognize(&mut self, image: &RgbaImage) -> Result<String> {
        let Some(recognizer) = self.recognizer.as_mut() else {
            bail!("scan pipeline has been released");
        };
        recognizer.set_image(image)?;
        recognizer.text()
    }

    fn crop(&self, screenshot: &RgbaImage, region: ScreenRegion) -> (RgbaImage, String) {
        let crop = crop_rect(screenshot, &self.layout.rect(region));
        let key = ResultCache::key(region.tag(), &hash_image(&crop));
        (crop, key)
    }

    fn nidoran_name(&self, screenshot: &RgbaImage) -> String {
        if is_female(screenshot, &self.layout) {
            self.settings.nidoran_female.clone()
        } else {
            self.settings.nidoran_male.clone()
        }
    }

    fn estimate_level(&mut self, screenshot: &RgbaImage, trainer_level: u32) -> f64 {
        let arc = match self.arc.take() {
            Some(arc) if arc.trainer_level() == trainer_level => arc,
            _ => LevelArc::new(self.layout.width, self.layout.height, trainer_level),
        };
        let level = arc.estimate(screenshot);
        self.arc = Some(arc);
        level
    }

    fn scan_name(&mut self, screenshot: &RgbaImage) -> Result<String> {
        let (mut crop, key) = self.crop(screenshot, ScreenRegion::Name);
        if let Some(name) = self.cache.get(&key) {
            tracing::debug!("Name cache hit: {}", name);
            return Ok(name);
        }

        ColorFilter::NAME.apply_in_place(&mut crop);
        let raw = self.recognize(&crop)?;
        let mut name = nums_to_letters(&raw.replace(' ', ""));
        tracing::debug!("Name OCR: {:?} -> {:?}", raw, name);
        if is_nidoran(&name) {
            name = self.nidoran_name(screenshot);
        }

        self.cache.put(key, name.clone());
        Ok(name)
    }

    fn scan_candy_name(&mut self, screenshot: &RgbaImage) -> Result<String> {
        let (mut crop, key) = self.crop(screenshot, ScreenRegion::CandyName);
        if let Some(candy) = self.cache.get(&key) {
            tracing::debug!("Candy name cache hit: {}", candy);
            return Ok(candy);
        }

        ColorFilter::NAME.apply_in_place(&mut crop);
        let raw = self.recognize(&crop)?;
        let words = raw.trim().replace('-', " ");
        let mut candy = nums_to_letters(remove_first_or_last_word(
            &words,
            self.settings.candy_word_first,
        ));
        tracing::debug!("Candy name OCR: {:?} -> {:?}", raw, candy);
        if is_nidoran(&candy) {
            candy = self.nidoran_name(screenshot);
        }

        self.cache.put(key, candy.clone());
        Ok(candy)
    }

    fn scan_hp(&mut self, screenshot: &RgbaImage) -> Result<Option<u32>> {
        let (mut crop, key) = self.crop(screenshot, ScreenRegion::Hp);
        let raw = match self.cache.get(&key) {
            Some(raw) => raw,
            None => {
                ColorFilter::STAT_TEXT.apply_in_place(&mut crop);
                let raw = self.recognize(&crop)?;
                tracing::debug!("HP OCR: {:?}", raw);
                self.cache.put(key, raw.clone());
                raw
            }
        };
        Ok(parse_hp(&raw))
    }

    fn scan_cp(&mut self, screenshot: &RgbaImage) -> Result<Option<u32>> {
        let (mut crop, key) = self.crop(screenshot, ScreenRegion::Cp);
        let digits = match self.cache.get(&key) {
            Some(digits) => digits,
            None => {
                ColorFilter::CP.apply_in_place(&mut crop);
                let raw = self.recognize(&crop)?;
                let digits = letters_to_nums(&raw);
                tracing::debug!("CP OCR: {:?} -> {:?}", raw, digits);
                self.cache.put(key, digits.clone());
                digits
            }
        };
        Ok(digits.parse().ok())
    }

    fn scan_candy_amount(&mut self, screenshot: &RgbaImage) -> Result<Option<u32>> {
        if !self.settings.candy_amount_enabled {
            return Ok(None);
        }

        let (mut crop, key) = self.crop(screenshot, ScreenRegion::CandyAmount);
        let raw = match self.cache.get(&key) {
            Some(raw) => raw,
            None => {
                ColorFilter::STAT_TEXT.apply_in_place(&mut crop);
                let raw = self.recognize(&crop)?;
                tracing::debug!("Candy amount OCR: {:?}", raw);
                self.cache.put(key, raw.clone());
                raw
            }
        };
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(parse_digits(&raw))
    }

    fn scan_evolution_cost(&mut self, screenshot: &RgbaImage) -> Result<EvolutionCost> {
        let crop = crop_rect(screenshot, &self.layout.rect(ScreenRegion::EvolutionCost));
        let Some(recognizer) = self.recognizer.as_mut() else {
            bail!("scan pipeline has been released");
        };
        scan_evolution_cost(&crop, recognizer, &mut self.cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::regions::PixelRect;
    use crate::scan::testing::ScriptedRecognizer;
    use image::{ImageBuffer, Rgba};

    const W: u32 = 540;
    const H: u32 = 960;

    fn fill(img: &mut RgbaImage, rect: PixelRect, color: Rgba<u8>) {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                img.put_pixel(x, y, color);
            }
        }
    }

    /// A screenshot with a distinct flat background behind every label and a
    /// few "text" pixels so each crop hashes differently.
    fn screenshot(seed: u8) -> RgbaImage {
        let layout = ScreenLayout::new(W, H);
        let mut img = ImageBuffer::from_pixel(W, H, Rgba([20, 40, 60, 255]));
        for (i, region) in ScreenRegion::ALL.iter().enumerate() {
            let rect = layout.rect(*region);
            fill(&mut img, rect, Rgba([240, 240, 240 - i as u8, 255]));
            img.put_pixel(rect.x + 2, rect.y + 2, Rgba([seed, 0, 0, 255]));
        }
        img
    }

    fn pipeline(answers: &[&str]) -> ScanPipeline<ScriptedRecognizer> {
        ScanPipeline::new(ScriptedRecognizer::new(answers), ScanSettings::new(W, H))
    }

    #[test]
    fn test_parse_hp() {
        assert_eq!(parse_hp("45/100"), Some(100));
        assert_eq!(parse_hp("78/"), Some(78));
        assert_eq!(parse_hp("no slash"), None);
        assert_eq!(parse_hp("/"), None);
        assert_eq!(parse_hp("4S/1O0"), Some(100));
        assert_eq!(parse_hp("45/HP"), None);
    }

    #[test]
    fn test_scan_assembles_all_fields() {
        // name, candy, hp, cp; the cost crop has no text so it never reaches OCR
        let mut pipeline = pipeline(&["Pidgey", "Pidgey Candy", "45/56", "CP412"]);

        let result = pipeline.scan(&screenshot(1), 20).unwrap();

        assert_eq!(result.level, 1.0);
        assert_eq!(result.name, "Pidgey");
        assert_eq!(result.candy_name, "Pidgey");
        assert_eq!(result.hp, Some(56));
        assert_eq!(result.cp, Some(412));
        assert_eq!(result.candy_amount, None);
        assert_eq!(result.evolution_cost, EvolutionCost::FullyEvolved);
    }

    #[test]
    fn test_name_corrections() {
        let mut pipeline = pipeline(&["Gyar ad05", "Gyarad05 Candy", "", ""]);
        let result = pipeline.scan(&screenshot(1), 20).unwrap();

        assert_eq!(result.name, "Gyarados");
        assert_eq!(result.candy_name, "Gyarados");
        assert_eq!(result.hp, None);
        assert_eq!(result.cp, None);
    }

    #[test]
    fn test_candy_word_first_and_dash_separator() {
        let mut settings = ScanSettings::new(W, H);
        settings.candy_word_first = true;
        let recognizer = ScriptedRecognizer::new(&["Roucool", "Bonbon-Roucool", "1/2", "3"]);
        let mut pipeline = ScanPipeline::new(recognizer, settings);

        let result = pipeline.scan(&screenshot(1), 20).unwrap();
        assert_eq!(result.candy_name, "Roucool");
    }

    #[test]
    fn test_nidoran_is_disambiguated_by_color() {
        let mut img = screenshot(1);
        let layout = ScreenLayout::new(W, H);
        fill(&mut img, layout.rect(ScreenRegion::NidoranSample), Rgba([135, 190, 140, 255]));

        let mut pipeline = pipeline(&["Nidoran", "NIDORAN Candy", "", ""]);
        let result = pipeline.scan(&img, 20).unwrap();

        assert_eq!(result.name, "Nidoran♀");
        assert_eq!(result.candy_name, "Nidoran♀");

        let mut img = screenshot(2);
        fill(&mut img, layout.rect(ScreenRegion::NidoranSample), Rgba([136, 165, 117, 255]));
        let mut pipeline = self::pipeline(&["Nidoran", "Nidoran Candy", "", ""]);
        assert_eq!(pipeline.scan(&img, 20).unwrap().name, "Nidoran♂");
    }

    #[test]
    fn test_repeat_scan_served_from_cache() {
        let mut pipeline = pipeline(&["Pidgey", "Pidgey Candy", "45/56", "412"]);
        let img = screenshot(1);

        let first = pipeline.scan(&img, 20).unwrap();
        // No answers left: any OCR call would fail the scan
        let second = pipeline.scan(&img, 20).unwrap();

        assert_eq!(first, second);
        assert_eq!(pipeline.recognizer.as_ref().unwrap().calls(), 4);
    }

    #[test]
    fn test_changed_crop_misses_cache() {
        let mut pipeline = pipeline(&[
            "Pidgey", "Pidgey Candy", "45/56", "412", "Rattata", "Rattata Candy", "10/30", "99",
        ]);

        pipeline.scan(&screenshot(1), 20).unwrap();
        let second = pipeline.scan(&screenshot(2), 20).unwrap();

        assert_eq!(second.name, "Rattata");
        assert_eq!(second.cp, Some(99));
        assert_eq!(pipeline.recognizer.as_ref().unwrap().calls(), 8);
    }

    #[test]
    fn test_candy_amount_disabled_never_reads() {
        let mut pipeline = pipeline(&["Pidgey", "Pidgey Candy", "45/56", "412"]);
        let result = pipeline.scan(&screenshot(1), 20).unwrap();

        assert_eq!(result.candy_amount, None);
        assert_eq!(pipeline.recognizer.as_ref().unwrap().calls(), 4);
    }

    #[test]
    fn test_candy_amount_enabled() {
        let mut settings = ScanSettings::new(W, H);
        settings.candy_amount_enabled = true;
        let recognizer = ScriptedRecognizer::new(&["Pidgey", "Pidgey Candy", "45/56", "412", "1O4"]);
        let mut pipeline = ScanPipeline::new(recognizer, settings);

        let result = pipeline.scan(&screenshot(1), 20).unwrap();
        assert_eq!(result.candy_amount, Some(104));
    }

    #[test]
    fn test_level_marker_is_found() {
        let mut img = screenshot(1);
        let arc = LevelArc::new(W, H, 30);
        let p = arc.point_for(25.0).unwrap();
        img.put_pixel(p.x as u32, p.y as u32, Rgba([255, 255, 255, 255]));

        let mut pipeline = pipeline(&["Pidgey", "Pidgey Candy", "45/56", "412"]);
        assert_eq!(pipeline.scan(&img, 30).unwrap().level, 25.0);
    }

    #[test]
    fn test_scan_after_release_fails() {
        let mut pipeline = pipeline(&["Pidgey"]);
        pipeline.release().unwrap();

        assert!(pipeline.is_released());
        assert!(pipeline.scan(&screenshot(1), 20).is_err());
        assert!(pipeline.release().is_err());
    }

    #[test]
    fn test_release_reaches_recognizer() {
        let recognizer = ScriptedRecognizer::new(&[]);
        let released = recognizer.release_flag();
        let mut pipeline = ScanPipeline::new(recognizer, ScanSettings::new(W, H));

        pipeline.release().unwrap();
        assert!(released.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_zero_cache_capacity_still_caches_one_entry() {
        let mut settings = ScanSettings::new(W, H);
        settings.cache_capacity = 0;
        let pipeline = ScanPipeline::new(ScriptedRecognizer::new(&[]), settings);
        assert_eq!(pipeline.cache.capacity(), 1);
    }

    #[test]
    fn test_recognizer_failure_propagates() {
        let mut pipeline = pipeline(&[]);
        assert!(pipeline.scan(&screenshot(1), 20).is_err());
    }
}
