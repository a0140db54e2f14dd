use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::SlopError;

/// How far the generated image drifts from the source photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    Mild,
    #[default]
    Medium,
    Extreme,
}

impl IntensityLevel {
    pub const ALL: [IntensityLevel; 3] = [
        IntensityLevel::Mild,
        IntensityLevel::Medium,
        IntensityLevel::Extreme,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            IntensityLevel::Mild => "mild",
            IntensityLevel::Medium => "medium",
            IntensityLevel::Extreme => "extreme",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntensityLevel::Mild => "Mild Slop",
            IntensityLevel::Medium => "Medium Slop",
            IntensityLevel::Extreme => "MAXIMUM SLOP",
        }
    }

    /// Phrase spliced into the image instruction after "make it".
    pub fn phrase(&self) -> &'static str {
        match self {
            IntensityLevel::Mild => {
                "slightly oversized, made of unusual materials like wax or clay, with minor anatomical oddities (extra fingers, slightly off proportions)"
            }
            IntensityLevel::Medium => {
                "excessively large or surrounded by impossible quantities of items, made of weird materials like shrimp, vegetables, or plastic bottles, with morphing limbs and 6-legged animals"
            }
            IntensityLevel::Extreme => {
                "completely unhinged with 8-fingered children holding 6-legged cats, everything made of cursed materials, bathed in holy light with floating vegetables, pure Facebook engagement bait energy"
            }
        }
    }

    pub fn random() -> Self {
        Self::ALL[fastrand::usize(..Self::ALL.len())]
    }
}

impl fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for IntensityLevel {
    type Err = SlopError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "mild" => Ok(IntensityLevel::Mild),
            "medium" => Ok(IntensityLevel::Medium),
            "extreme" | "maximum" => Ok(IntensityLevel::Extreme),
            _ => Err(SlopError::InvalidLevel(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn keys_parse_back() {
        for level in IntensityLevel::ALL {
            assert_eq!(level.key().parse::<IntensityLevel>().unwrap(), level);
        }
        assert_eq!(" Extreme ".parse::<IntensityLevel>().unwrap(), IntensityLevel::Extreme);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = "spicy".parse::<IntensityLevel>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLevel);
    }
}
