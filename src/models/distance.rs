//! Distance terms: "value,unit" parsing and conversion to metres.

use crate::error::SearchError;

const METRES_PER_KILOMETRE: f64 = 1000.0;
const METRES_PER_MILE: f64 = 1609.34;

/// Unit of a requested search radius.
///
/// The single-letter token `m` means miles, not metres; there is no metres
/// token. Long-standing API convention, kept for compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Kilometres,
    Miles,
}

impl DistanceUnit {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "km" | "kilometre" | "kilometres" | "kilometer" | "kilometers" => {
                Some(DistanceUnit::Kilometres)
            }
            "m" | "miles" => Some(DistanceUnit::Miles),
            _ => None,
        }
    }
}

/// A parsed search radius, e.g. `40,km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub magnitude: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    /// Parse a raw distance term: a number and a unit separated by a comma.
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        if raw.is_empty() {
            return Err(SearchError::EmptyDistance);
        }

        let lowercased = raw.to_lowercase();
        let mut tokens = lowercased.split(',');

        let (value, unit) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(value), Some(unit), None) => (value, unit),
            _ => return Err(SearchError::InvalidDistance(raw.to_string())),
        };

        let magnitude: f64 = value
            .parse()
            .map_err(|_| SearchError::InvalidDistance(raw.to_string()))?;

        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(SearchError::InvalidDistance(raw.to_string()));
        }

        let unit = DistanceUnit::from_token(unit)
            .ok_or_else(|| SearchError::InvalidDistance(raw.to_string()))?;

        Ok(Distance { magnitude, unit })
    }

    /// The radius in metres.
    pub fn as_metres(&self) -> f64 {
        match self.unit {
            DistanceUnit::Kilometres => self.magnitude * METRES_PER_KILOMETRE,
            DistanceUnit::Miles => self.magnitude * METRES_PER_MILE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_parse_kilometres() {
        let distance = Distance::parse("40,km").unwrap();
        assert_eq!(distance.magnitude, 40.0);
        assert_eq!(distance.unit, DistanceUnit::Kilometres);
        assert_eq!(distance.as_metres(), 40_000.0);
    }

    #[test]
    fn test_parse_long_unit_tokens() {
        for unit in ["kilometre", "kilometres", "kilometer", "kilometers"] {
            let distance = Distance::parse(&format!("2.5,{unit}")).unwrap();
            assert_eq!(distance.unit, DistanceUnit::Kilometres);
        }
    }

    #[test]
    fn test_single_letter_m_means_miles() {
        let distance = Distance::parse("5,m").unwrap();
        assert_eq!(distance.unit, DistanceUnit::Miles);
        assert_abs_diff_eq!(distance.as_metres(), 8046.7, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let distance = Distance::parse("3,KM").unwrap();
        assert_eq!(distance.unit, DistanceUnit::Kilometres);

        let distance = Distance::parse("3,Miles").unwrap();
        assert_eq!(distance.unit, DistanceUnit::Miles);
    }

    #[test]
    fn test_empty_term() {
        let err = Distance::parse("").unwrap_err();
        assert!(matches!(err, SearchError::EmptyDistance));
    }

    #[test]
    fn test_missing_unit() {
        let err = Distance::parse("40").unwrap_err();
        assert!(matches!(err, SearchError::InvalidDistance(_)));
    }

    #[test]
    fn test_too_many_tokens() {
        let err = Distance::parse("40,km,m").unwrap_err();
        assert!(matches!(err, SearchError::InvalidDistance(_)));
    }

    #[test]
    fn test_unrecognized_unit() {
        let err = Distance::parse("40,lightyears").unwrap_err();
        assert!(matches!(err, SearchError::InvalidDistance(_)));
    }

    #[test]
    fn test_non_numeric_magnitude() {
        let err = Distance::parse("fourty,km").unwrap_err();
        assert!(matches!(err, SearchError::InvalidDistance(_)));
    }

    #[test]
    fn test_negative_and_non_finite_magnitudes() {
        for raw in ["-1,km", "inf,km", "nan,miles"] {
            let err = Distance::parse(raw).unwrap_err();
            assert!(matches!(err, SearchError::InvalidDistance(_)), "{raw}");
        }
    }

    #[test]
    fn test_zero_magnitude_is_valid() {
        let distance = Distance::parse("0,km").unwrap();
        assert_eq!(distance.as_metres(), 0.0);
    }
}
