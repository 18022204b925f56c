//! Fixed screen regions of the creature detail view.
//!
//! Every rectangle is a proportion of the full screenshot, measured once on a
//! reference 1080x1920 layout and assumed to scale linearly to any screen with
//! the same aspect ratio.

use serde::Serialize;

/// A rectangle in absolute pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How one coordinate is derived from the screen width or height.
#[derive(Clone, Copy, Debug)]
enum Span {
    /// `round(total / d)`
    Div(f64),
    /// `floor(total / d)`
    FloorDiv(f64),
    /// `floor(total * f)`
    Frac(f64),
}

impl Span {
    fn resolve(self, total: u32) -> u32 {
        let total = total as f64;
        let value = match self {
            Span::Div(d) => (total / d).round(),
            Span::FloorDiv(d) => (total / d).floor(),
            Span::Frac(f) => (total * f).floor(),
        };
        value.max(0.0) as u32
    }
}

struct RegionFormula {
    x: Span,
    y: Span,
    width: Span,
    height: Span,
}

/// The screenshot regions the scanner reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScreenRegion {
    Name,
    CandyName,
    Hp,
    Cp,
    CandyAmount,
    EvolutionCost,
    /// Patch of the creature sprite used to tell the two nidoran apart.
    NidoranSample,
}

impl ScreenRegion {
    pub const ALL: [ScreenRegion; 7] = [
        ScreenRegion::Name,
        ScreenRegion::CandyName,
        ScreenRegion::Hp,
        ScreenRegion::Cp,
        ScreenRegion::CandyAmount,
        ScreenRegion::EvolutionCost,
        ScreenRegion::NidoranSample,
    ];

    /// Tag used as the cache key prefix and in debug file names.
    pub fn tag(self) -> &'static str {
        match self {
            ScreenRegion::Name => "name",
            ScreenRegion::CandyName => "candy",
            ScreenRegion::Hp => "hp",
            ScreenRegion::Cp => "cp",
            ScreenRegion::CandyAmount => "candyAmount",
            ScreenRegion::EvolutionCost => "candyCost",
            ScreenRegion::NidoranSample => "nidoran",
        }
    }

    fn formula(self) -> RegionFormula {
        use Span::*;
        match self {
            ScreenRegion::Name => RegionFormula {
                x: FloorDiv(4.0),
                y: Div(2.22608696),
                width: Div(2.057),
                height: Div(18.2857143),
            },
            ScreenRegion::CandyName => RegionFormula {
                x: FloorDiv(2.0),
                y: Div(1.3724285),
                width: Div(2.1),
                height: Div(38.4),
            },
            ScreenRegion::Hp => RegionFormula {
                x: Div(2.8),
                y: Div(1.8962963),
                width: Div(3.5),
                height: Div(34.13333333),
            },
            ScreenRegion::Cp => RegionFormula {
                x: Div(3.0),
                y: Div(15.5151515),
                width: Div(3.84),
                height: Div(21.333333333),
            },
            ScreenRegion::CandyAmount => RegionFormula {
                x: Div(1.515),
                y: Div(1.44),
                width: Div(5.0),
                height: Div(38.4),
            },
            ScreenRegion::EvolutionCost => RegionFormula {
                x: Frac(0.625),
                y: Frac(0.86),
                width: Frac(0.2),
                height: Frac(0.05),
            },
            ScreenRegion::NidoranSample => RegionFormula {
                x: FloorDiv(3.0),
                y: FloorDiv(4.0),
                width: FloorDiv(3.0),
                height: FloorDiv(5.0),
            },
        }
    }

    /// Resolves the region for a `width` x `height` screenshot.
    pub fn rect(self, width: u32, height: u32) -> PixelRect {
        let formula = self.formula();
        PixelRect {
            x: formula.x.resolve(width),
            y: formula.y.resolve(height),
            width: formula.width.resolve(width),
            height: formula.height.resolve(height),
        }
    }
}

/// Region geometry for one screen size.
#[derive(Clone, Debug)]
pub struct ScreenLayout {
    pub width: u32,
    pub height: u32,
}

impl ScreenLayout {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self, region: ScreenRegion) -> PixelRect {
        region.rect(self.width, self.height)
    }

    /// True if every region lies inside the screen.
    pub fn fits(&self) -> bool {
        ScreenRegion::ALL.iter().all(|&r| {
            let rect = self.rect(r);
            rect.x + rect.width <= self.width && rect.y + rect.height <= self.height
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        let layout = ScreenLayout::new(1080, 1920);

        assert_eq!(
            layout.rect(ScreenRegion::Name),
            PixelRect { x: 270, y: 862, width: 525, height: 105 }
        );
        assert_eq!(
            layout.rect(ScreenRegion::Cp),
            PixelRect { x: 360, y: 124, width: 281, height: 90 }
        );
        assert_eq!(
            layout.rect(ScreenRegion::EvolutionCost),
            PixelRect { x: 675, y: 1651, width: 216, height: 96 }
        );
        assert_eq!(
            layout.rect(ScreenRegion::NidoranSample),
            PixelRect { x: 360, y: 480, width: 360, height: 384 }
        );
    }

    #[test]
    fn test_regions_scale_with_resolution() {
        let small = ScreenLayout::new(720, 1280);
        let large = ScreenLayout::new(1440, 2560);

        for region in ScreenRegion::ALL {
            let a = small.rect(region);
            let b = large.rect(region);
            // Rounding can move an edge by a pixel on either side
            assert!((b.x as i64 - 2 * a.x as i64).abs() <= 2, "{:?}", region);
            assert!((b.y as i64 - 2 * a.y as i64).abs() <= 2, "{:?}", region);
            assert!((b.width as i64 - 2 * a.width as i64).abs() <= 2, "{:?}", region);
        }
    }

    #[test]
    fn test_all_regions_fit_common_screens() {
        for (w, h) in [(720, 1280), (1080, 1920), (1440, 2560)] {
            assert!(ScreenLayout::new(w, h).fits(), "{}x{}", w, h);
        }
    }

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<&str> = ScreenRegion::ALL.iter().map(|r| r.tag()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), ScreenRegion::ALL.len());
    }
}
