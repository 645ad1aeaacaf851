//! Physical units attached to measurement values.

use std::fmt;

/// Units of a single measurement value column.
///
/// Pixel sizes scale the numbers, the units stay pixel-based; a caller that
/// knows the physical meaning of the pixel size can reinterpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Units {
    /// Dimensionless value (ratios, identifiers).
    #[default]
    None,
    /// Pixel units raised to a power: `Pixels(1)` is a length, `Pixels(2)` an
    /// area, `Pixels(-1)` an inverse length.
    Pixels(i32),
    /// Grey-value (intensity) units.
    Intensity,
    /// Angle in radians.
    Radians,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::None => Ok(()),
            Self::Pixels(1) => write!(f, "px"),
            Self::Pixels(p) => write!(f, "px^{p}"),
            Self::Intensity => write!(f, "grey"),
            Self::Radians => write!(f, "rad"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Units::None.to_string(), "");
        assert_eq!(Units::Pixels(1).to_string(), "px");
        assert_eq!(Units::Pixels(2).to_string(), "px^2");
        assert_eq!(Units::Pixels(-1).to_string(), "px^-1");
        assert_eq!(Units::Intensity.to_string(), "grey");
        assert_eq!(Units::Radians.to_string(), "rad");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Units::Pixels(2)).unwrap();
        let back: Units = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Units::Pixels(2));
    }
}
