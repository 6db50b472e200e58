use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::features::{FeatureCalculator, FeatureVectorBuilder};

/// A rectangular text region on a page, in page coordinates.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Zone {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A page and the zones segmented out of it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub zones: Vec<Zone>,
}

struct RelativeX;

impl FeatureCalculator<Zone, Page> for RelativeX {
    fn name(&self) -> &str {
        "relative_x"
    }
    fn compute(&self, zone: &Zone, page: &Page) -> f64 {
        zone.x / page.width
    }
}

struct RelativeY;

impl FeatureCalculator<Zone, Page> for RelativeY {
    fn name(&self) -> &str {
        "relative_y"
    }
    fn compute(&self, zone: &Zone, page: &Page) -> f64 {
        zone.y / page.height
    }
}

struct RelativeWidth;

impl FeatureCalculator<Zone, Page> for RelativeWidth {
    fn name(&self) -> &str {
        "relative_width"
    }
    fn compute(&self, zone: &Zone, page: &Page) -> f64 {
        zone.width / page.width
    }
}

struct RelativeHeight;

impl FeatureCalculator<Zone, Page> for RelativeHeight {
    fn name(&self) -> &str {
        "relative_height"
    }
    fn compute(&self, zone: &Zone, page: &Page) -> f64 {
        zone.height / page.height
    }
}

struct RelativeArea;

impl FeatureCalculator<Zone, Page> for RelativeArea {
    fn name(&self) -> &str {
        "relative_area"
    }
    fn compute(&self, zone: &Zone, page: &Page) -> f64 {
        (zone.width * zone.height) / (page.width * page.height)
    }
}

struct AspectRatio;

impl FeatureCalculator<Zone, Page> for AspectRatio {
    fn name(&self) -> &str {
        "aspect_ratio"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        zone.width / zone.height
    }
}

struct CharCount;

impl FeatureCalculator<Zone, Page> for CharCount {
    fn name(&self) -> &str {
        "char_count"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        zone.text.chars().count() as f64
    }
}

struct WordCount;

impl FeatureCalculator<Zone, Page> for WordCount {
    fn name(&self) -> &str {
        "word_count"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        zone.text.split_whitespace().count() as f64
    }
}

struct LineCount;

impl FeatureCalculator<Zone, Page> for LineCount {
    fn name(&self) -> &str {
        "line_count"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        zone.text.lines().count() as f64
    }
}

struct MeanWordLength;

impl FeatureCalculator<Zone, Page> for MeanWordLength {
    fn name(&self) -> &str {
        "mean_word_length"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        let mut words = 0;
        let mut chars = 0;
        for word in zone.text.split_whitespace() {
            words += 1;
            chars += word.chars().count();
        }
        if words == 0 {
            return 0.0;
        }
        chars as f64 / words as f64
    }
}

// Fractions are over all characters and fall back to 0 on empty text, so a
// blank zone stays finite.
struct DigitFraction;

impl FeatureCalculator<Zone, Page> for DigitFraction {
    fn name(&self) -> &str {
        "digit_fraction"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        char_fraction(&zone.text, |c| c.is_ascii_digit())
    }
}

struct UppercaseFraction;

impl FeatureCalculator<Zone, Page> for UppercaseFraction {
    fn name(&self) -> &str {
        "uppercase_fraction"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        let alphabetic = zone.text.chars().filter(|c| c.is_alphabetic()).count();
        if alphabetic == 0 {
            return 0.0;
        }
        let upper = zone.text.chars().filter(|c| c.is_uppercase()).count();
        upper as f64 / alphabetic as f64
    }
}

struct PunctuationFraction;

impl FeatureCalculator<Zone, Page> for PunctuationFraction {
    fn name(&self) -> &str {
        "punct_fraction"
    }
    fn compute(&self, zone: &Zone, _: &Page) -> f64 {
        char_fraction(&zone.text, |c| c.is_ascii_punctuation())
    }
}

struct PageZoneCount;

impl FeatureCalculator<Zone, Page> for PageZoneCount {
    fn name(&self) -> &str {
        "page_zone_count"
    }
    fn compute(&self, _: &Zone, page: &Page) -> f64 {
        page.zones.len() as f64
    }
}

fn char_fraction<P>(text: &str, pred: P) -> f64
where
    P: Fn(&char) -> bool,
{
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let hits = text.chars().filter(pred).count();
    hits as f64 / total as f64
}

/// The geometry-heavy feature set for sorting zones into top-level
/// categories.
pub fn coarse_registry() -> Result<FeatureVectorBuilder<Zone, Page>> {
    FeatureVectorBuilder::new(vec![
        Box::new(RelativeX),
        Box::new(RelativeY),
        Box::new(RelativeWidth),
        Box::new(RelativeHeight),
        Box::new(RelativeArea),
        Box::new(AspectRatio),
        Box::new(CharCount),
        Box::new(WordCount),
        Box::new(LineCount),
        Box::new(DigitFraction),
        Box::new(UppercaseFraction),
        Box::new(PunctuationFraction),
    ])
}

/// The text-density feature set for telling metadata parts apart.
pub fn metadata_registry() -> Result<FeatureVectorBuilder<Zone, Page>> {
    FeatureVectorBuilder::new(vec![
        Box::new(RelativeY),
        Box::new(RelativeHeight),
        Box::new(AspectRatio),
        Box::new(CharCount),
        Box::new(WordCount),
        Box::new(MeanWordLength),
        Box::new(DigitFraction),
        Box::new(UppercaseFraction),
        Box::new(PunctuationFraction),
        Box::new(PageZoneCount),
    ])
}
