//! Garden styles and transformation tiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named landscape aesthetics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GardenStyle {
    #[serde(rename = "Modern Minimalist")]
    Modern,
    #[serde(rename = "Traditional English")]
    Traditional,
    #[serde(rename = "Japanese Zen")]
    Zen,
    #[serde(rename = "Mediterranean")]
    Mediterranean,
    #[serde(rename = "Tropical Lush")]
    Tropical,
    #[serde(rename = "Modern Desert")]
    Desert,
    #[serde(rename = "English Cottage")]
    Cottage,
}

impl GardenStyle {
    pub const ALL: [GardenStyle; 7] = [
        GardenStyle::Modern,
        GardenStyle::Traditional,
        GardenStyle::Zen,
        GardenStyle::Mediterranean,
        GardenStyle::Tropical,
        GardenStyle::Desert,
        GardenStyle::Cottage,
    ];

    /// Display label, also the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Self::Modern => "Modern Minimalist",
            Self::Traditional => "Traditional English",
            Self::Zen => "Japanese Zen",
            Self::Mediterranean => "Mediterranean",
            Self::Tropical => "Tropical Lush",
            Self::Desert => "Modern Desert",
            Self::Cottage => "English Cottage",
        }
    }

    /// Short single-word name accepted on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Traditional => "traditional",
            Self::Zen => "zen",
            Self::Mediterranean => "mediterranean",
            Self::Tropical => "tropical",
            Self::Desert => "desert",
            Self::Cottage => "cottage",
        }
    }
}

impl fmt::Display for GardenStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for GardenStyle {
    type Err = String;

    /// Accepts either the short key (`zen`) or the full label (`Japanese Zen`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.key().eq_ignore_ascii_case(wanted) || style.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|s| s.key()).collect();
                format!("Unknown style '{}'. Expected one of: {}", wanted, keys.join(", "))
            })
    }
}

/// How much creative latitude a generation gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DesignComplexity {
    #[serde(rename = "Simple & Low Maintenance")]
    Simple,
    #[default]
    #[serde(rename = "Balanced & Practical")]
    Balanced,
    #[serde(rename = "Luxury & High-End")]
    Premium,
}

impl DesignComplexity {
    pub const ALL: [DesignComplexity; 3] = [
        DesignComplexity::Simple,
        DesignComplexity::Balanced,
        DesignComplexity::Premium,
    ];

    /// Full label, also the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Self::Simple => "Simple & Low Maintenance",
            Self::Balanced => "Balanced & Practical",
            Self::Premium => "Luxury & High-End",
        }
    }

    /// Tier name shown in pickers
    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::Balanced => "Balanced",
            Self::Premium => "Premium",
        }
    }

    /// One-line description of how much changes
    pub fn tagline(&self) -> &'static str {
        match self {
            Self::Simple => "Least Destructive",
            Self::Balanced => "Moderate Change",
            Self::Premium => "Maximum Overhaul",
        }
    }
}

impl fmt::Display for DesignComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for DesignComplexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(wanted) || tier.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown complexity '{}'. Expected one of: simple, balanced, premium", wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_serializes_as_label() {
        let json = serde_json::to_string(&GardenStyle::Zen).unwrap();
        assert_eq!(json, "\"Japanese Zen\"");

        let style: GardenStyle = serde_json::from_str("\"Modern Desert\"").unwrap();
        assert_eq!(style, GardenStyle::Desert);
    }

    #[test]
    fn test_style_from_str_accepts_key_and_label() {
        assert_eq!("zen".parse::<GardenStyle>().unwrap(), GardenStyle::Zen);
        assert_eq!("Modern Minimalist".parse::<GardenStyle>().unwrap(), GardenStyle::Modern);
        assert_eq!("  COTTAGE ".parse::<GardenStyle>().unwrap(), GardenStyle::Cottage);
        assert!("brutalist".parse::<GardenStyle>().is_err());
    }

    #[test]
    fn test_complexity_default_is_balanced() {
        assert_eq!(DesignComplexity::default(), DesignComplexity::Balanced);
    }

    #[test]
    fn test_complexity_labels() {
        assert_eq!(DesignComplexity::Simple.tagline(), "Least Destructive");
        assert_eq!(DesignComplexity::Premium.name(), "Premium");
        assert_eq!(
            serde_json::to_string(&DesignComplexity::Balanced).unwrap(),
            "\"Balanced & Practical\""
        );
        assert_eq!("premium".parse::<DesignComplexity>().unwrap(), DesignComplexity::Premium);
    }
}
