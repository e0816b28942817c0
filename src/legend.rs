// legend.rs

use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// An RGB colour shared by the terminal map and the PNG export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const fn hex(value: u32) -> Rgb {
    Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

pub const NO_DATA: Rgb = hex(0xBBBBBB);
const HIGHLY: Rgb = hex(0x66BB6A);
const MODERATELY: Rgb = hex(0xFFEB3B);
const LESS: Rgb = hex(0xF44336);

const ADAPTATION: &[(&str, Rgb)] = &[
    ("Less Suitable", hex(0xF44336)),
    ("Moderately Suitable", hex(0xFFEB3B)),
    ("Highly Suitable", hex(0x2007FF)),
    ("Very Highly Suitable", hex(0x2E7D32)),
];

const MITIGATION: &[(&str, Rgb)] = &[
    ("Less Suitable", hex(0xD32F2F)),
    ("Moderately Suitable", hex(0xFFEB3B)),
    ("Highly Suitable", hex(0xFFC107)),
    ("Very High Suitable", hex(0x2E7D32)),
];

const REPLACEMENT: &[(&str, Rgb)] = &[
    ("Less Suitable", hex(0x8D6E63)),
    ("Moderately Suitable", hex(0xFFEB3B)),
    ("Highly Suitable", hex(0xFFB007)),
    ("Highly Suitable (On Grid)", hex(0x66BB6A)),
    ("Highly Suitable (Community Wells)", hex(0x4CAF50)),
    ("Highly Suitable (On Grid Community Wells)", hex(0x2E7D32)),
];

// Class names are cut at the shapefile's 50 character field width.
const GENERAL: &[(&str, Rgb)] = &[
    ("Less Suitable", hex(0xF44336)),
    ("Moderately Suitable", hex(0xFFEB3B)),
    ("Highly Suitable (On Grid Replacement)", hex(0xA5D6A7)),
    ("Highly Suitable (On Grid Community Wells)", hex(0x66BB6A)),
    ("Highly Suitable (Mitigation + On Grid Replacement)", hex(0x26A69A)),
    ("Highly Suitable (Mitigation + On Grid Community We", hex(0x00695C)),
    ("Highly Suitable (Mitigation)", hex(0x4DB6AC)),
    ("Highly Suitable (Adaptation + On Grid Replacement)", hex(0xB39DDB)),
    ("Highly Suitable (Adaptation + On Grid Community We", hex(0x81D4FA)),
    ("Highly Suitable (Adaptation + Mitigation + On Grid", hex(0x1976D2)),
    ("Highly Suitable (Adaptation + Mitigation)", hex(0x2196F3)),
    ("Highly Suitable (Adaptation )", hex(0x9C27B0)),
    ("Highly Suitable", hex(0xFFC107)),
];

/// Precomputed suitability classification shown on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuitabilityLayer {
    Adaptation,
    Mitigation,
    Replacement,
    General,
}

impl SuitabilityLayer {
    pub const ALL: [SuitabilityLayer; 4] = [
        SuitabilityLayer::Adaptation,
        SuitabilityLayer::Mitigation,
        SuitabilityLayer::Replacement,
        SuitabilityLayer::General,
    ];

    /// Attribute column holding the class, spelled as published.
    pub fn column(self) -> &'static str {
        match self {
            SuitabilityLayer::Adaptation => "Adaptation",
            SuitabilityLayer::Mitigation => "Mitigation",
            SuitabilityLayer::Replacement => "Replacment",
            SuitabilityLayer::General => "General_SI",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SuitabilityLayer::Adaptation => "Adaptation",
            SuitabilityLayer::Mitigation => "Mitigation",
            SuitabilityLayer::Replacement => "Replacement",
            SuitabilityLayer::General => "General SI",
        }
    }

    fn palette(self) -> &'static [(&'static str, Rgb)] {
        match self {
            SuitabilityLayer::Adaptation => ADAPTATION,
            SuitabilityLayer::Mitigation => MITIGATION,
            SuitabilityLayer::Replacement => REPLACEMENT,
            SuitabilityLayer::General => GENERAL,
        }
    }

    /// Fill colour for a class value of this layer.
    pub fn color_for(self, class: Option<&str>) -> Rgb {
        let Some(class) = class else {
            return NO_DATA;
        };
        if let Some((_, color)) = self.palette().iter().find(|(name, _)| *name == class) {
            return *color;
        }
        if class.contains("Highly Suitable") {
            HIGHLY
        } else if class.contains("Moderately Suitable") {
            MODERATELY
        } else if class.contains("Less Suitable") {
            LESS
        } else {
            NO_DATA
        }
    }
}

impl fmt::Display for SuitabilityLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for SuitabilityLayer {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adaptation" => Ok(SuitabilityLayer::Adaptation),
            "mitigation" => Ok(SuitabilityLayer::Mitigation),
            "replacement" | "replacment" => Ok(SuitabilityLayer::Replacement),
            "general" | "general_si" | "general si" => Ok(SuitabilityLayer::General),
            _ => Err(DashboardError::UnknownLayer(s.to_string())),
        }
    }
}

/// Shortens long class names for the statistics panel.
pub fn display_name(class: &str) -> String {
    const MAX: usize = 25;
    if class.chars().count() > MAX {
        let head: String = class.chars().take(MAX).collect();
        format!("{}...", head)
    } else {
        class.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_class_uses_palette() {
        assert_eq!(
            SuitabilityLayer::Mitigation.color_for(Some("Less Suitable")),
            hex(0xD32F2F)
        );
        assert_eq!(
            SuitabilityLayer::Replacement.color_for(Some("Highly Suitable (On Grid)")),
            Rgb(0x66, 0xBB, 0x6A)
        );
    }

    #[test]
    fn unknown_class_falls_back_by_substring() {
        let layer = SuitabilityLayer::Adaptation;
        assert_eq!(layer.color_for(Some("Highly Suitable (Something New)")), HIGHLY);
        assert_eq!(layer.color_for(Some("Not Moderately Suitable")), MODERATELY);
        assert_eq!(layer.color_for(Some("Barren")), NO_DATA);
        assert_eq!(layer.color_for(None), NO_DATA);
    }

    #[test]
    fn parses_layer_names() {
        assert_eq!("replacment".parse::<SuitabilityLayer>(), Ok(SuitabilityLayer::Replacement));
        assert_eq!("General SI".parse::<SuitabilityLayer>(), Ok(SuitabilityLayer::General));
        assert!("wind".parse::<SuitabilityLayer>().is_err());
    }

    #[test]
    fn truncates_long_names() {
        assert_eq!(display_name("Less Suitable"), "Less Suitable");
        assert_eq!(
            display_name("Highly Suitable (Adaptation + Mitigation)"),
            "Highly Suitable (Adaptati..."
        );
    }
}
