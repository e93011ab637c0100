use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::errors::FieldError;

/// Topology of the sample grid. Whatever the topology, samples are handed to the
/// evaluator as Cartesian (x, y) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum CoordinateSystem {
    /// uniform lattice, step 0.05
    #[default]
    #[strum(to_string = "Cartesian")]
    Cartesian,
    /// rings of radius 0.01..x_max, step 0.05 in radius and angle
    #[strum(to_string = "Polar")]
    Polar,
    /// log-spaced radii from 0.1, linearly spaced angles
    #[strum(to_string = "Log-Polar")]
    LogPolar,
    /// log-spaced x and y from 0.1
    #[strum(to_string = "Log-Log")]
    LogLog,
    /// lattice with steps 0.2 and 0.2*sqrt(3)
    #[strum(to_string = "Hexagonal")]
    Hexagonal,
    /// same lattice as Cartesian, x is the real part and y the imaginary part
    #[strum(to_string = "Complex Plane")]
    ComplexPlane,
}

/// "Log-Polar", "log_polar" and "LogPolar" all select the same system
fn selector_key(selector: &str) -> String {
    selector
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl CoordinateSystem {
    /// Parses a user facing selector; anything outside the six systems is a
    /// [`FieldError::Configuration`].
    pub fn from_selector(selector: &str) -> Result<Self, FieldError> {
        let key = selector_key(selector);
        CoordinateSystem::iter()
            .find(|system| selector_key(&system.to_string()) == key)
            .ok_or_else(|| {
                FieldError::Configuration(format!(
                    "Unsupported coordinate system '{}'",
                    selector
                ))
            })
    }
}

impl FromStr for CoordinateSystem {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoordinateSystem::from_selector(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        let names: Vec<String> = CoordinateSystem::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["Cartesian", "Polar", "Log-Polar", "Log-Log", "Hexagonal", "Complex Plane"]
        );
    }

    #[test]
    fn test_selectors_round_trip() {
        for system in CoordinateSystem::iter() {
            assert_eq!(CoordinateSystem::from_selector(&system.to_string()), Ok(system));
        }
    }

    #[test]
    fn test_selector_aliases() {
        assert_eq!("log_polar".parse::<CoordinateSystem>(), Ok(CoordinateSystem::LogPolar));
        assert_eq!("LOGLOG".parse::<CoordinateSystem>(), Ok(CoordinateSystem::LogLog));
        assert_eq!(
            CoordinateSystem::from_selector("complex-plane"),
            Ok(CoordinateSystem::ComplexPlane)
        );
    }

    #[test]
    fn test_unknown_selector() {
        let result = CoordinateSystem::from_selector("Spherical");
        assert!(matches!(result, Err(FieldError::Configuration(_))));
    }
}
