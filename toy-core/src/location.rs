use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Location {
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start_byte: start,
            end_byte: end,
        }
    }

    pub fn merge(&self, other: Location) -> Location {
        Location::new(self.start_byte, other.end_byte)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_byte, self.end_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_spans_both_locations() {
        let merged = Location::new(2, 5).merge(Location::new(9, 14));
        assert_eq!(merged, Location::new(2, 14));
        assert_eq!(merged.to_string(), "2..14");
    }
}
