//! Café locations and seating ranges.
//!
//! Both are closed choice lists rendered as `<select>` options. The string
//! labels are what gets stored in the database and sent by the browser.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A submitted value that is not one of the allowed choices.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownChoice {
    /// What kind of choice was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// A district a café can be listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "Hong Kong Island")]
    HongKongIsland,
    #[serde(rename = "Kowloon")]
    Kowloon,
    #[serde(rename = "New Territories")]
    NewTerritories,
}

impl Location {
    /// Every location, in display order.
    pub const ALL: [Self; 3] = [Self::HongKongIsland, Self::Kowloon, Self::NewTerritories];

    /// The label shown to users and stored in the database.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HongKongIsland => "Hong Kong Island",
            Self::Kowloon => "Kowloon",
            Self::NewTerritories => "New Territories",
        }
    }

    /// All labels, in display order.
    #[must_use]
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.label()).collect()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Location {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.label() == s.trim())
            .ok_or_else(|| UnknownChoice {
                kind: "location",
                value: s.to_owned(),
            })
    }
}

/// The home page location filter: either every café or one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationFilter {
    All,
    Only(Location),
}

impl LocationFilter {
    /// Sentinel label for "no filter".
    pub const ALL_LABEL: &'static str = "All";

    /// Filter choices in display order, starting with the sentinel.
    #[must_use]
    pub fn labels() -> Vec<&'static str> {
        let mut labels = vec![Self::ALL_LABEL];
        labels.extend(Location::labels());
        labels
    }
}

impl FromStr for LocationFilter {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == Self::ALL_LABEL {
            return Ok(Self::All);
        }
        s.parse::<Location>().map(Self::Only)
    }
}

/// Approximate number of seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatRange {
    #[serde(rename = "0-10")]
    UpToTen,
    #[serde(rename = "10-20")]
    TenToTwenty,
    #[serde(rename = "30-50")]
    ThirtyToFifty,
}

impl SeatRange {
    /// Every range, in display order.
    pub const ALL: [Self; 3] = [Self::UpToTen, Self::TenToTwenty, Self::ThirtyToFifty];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UpToTen => "0-10",
            Self::TenToTwenty => "10-20",
            Self::ThirtyToFifty => "30-50",
        }
    }

    #[must_use]
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.label()).collect()
    }
}

impl fmt::Display for SeatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SeatRange {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.label() == s.trim())
            .ok_or_else(|| UnknownChoice {
                kind: "seat range",
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_location_roundtrips_through_label() {
        for location in Location::ALL {
            assert_eq!(location.label().parse::<Location>().unwrap(), location);
        }
    }

    #[test]
    fn test_location_rejects_unknown() {
        let err = "Macau".parse::<Location>().unwrap_err();
        assert_eq!(err.kind, "location");
        assert_eq!(err.to_string(), "'Macau' is not a valid location");
    }

    #[test]
    fn test_location_filter_all_sentinel() {
        assert_eq!("All".parse::<LocationFilter>().unwrap(), LocationFilter::All);
        assert_eq!(
            "Kowloon".parse::<LocationFilter>().unwrap(),
            LocationFilter::Only(Location::Kowloon)
        );
        assert!("all".parse::<LocationFilter>().is_err());
    }

    #[test]
    fn test_location_filter_labels_start_with_all() {
        let labels = LocationFilter::labels();
        assert_eq!(labels.first(), Some(&"All"));
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn test_seat_range_parse() {
        assert_eq!("10-20".parse::<SeatRange>().unwrap(), SeatRange::TenToTwenty);
        assert!("20-30".parse::<SeatRange>().is_err());
    }

    #[test]
    fn test_location_serde_uses_label() {
        let json = serde_json::to_string(&Location::NewTerritories).unwrap();
        assert_eq!(json, "\"New Territories\"");
    }
}
