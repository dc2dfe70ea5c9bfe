//! Coarse agro-climatic regions of India.

use serde::{Deserialize, Serialize};

/// Region tag used to key the crop and vegetation profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
}

impl Region {
    /// Classify a centroid with the fixed threshold table.
    ///
    /// Latitude bands first (above 28, below 20, middle), then longitude
    /// splits inside each band.
    pub fn classify(lat: f64, lon: f64) -> Self {
        if lat > 28.0 {
            if lon > 80.0 {
                Region::North
            } else {
                Region::East
            }
        } else if lat < 20.0 {
            if lon > 78.0 {
                Region::South
            } else {
                Region::West
            }
        } else if lon > 80.0 {
            Region::East
        } else if lon > 75.0 {
            Region::Central
        } else {
            Region::West
        }
    }

    /// All regions in table order
    pub fn all() -> &'static [Region] {
        &[
            Region::North,
            Region::South,
            Region::East,
            Region::West,
            Region::Central,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "north",
            Region::South => "south",
            Region::East => "east",
            Region::West => "west",
            Region::Central => "central",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
