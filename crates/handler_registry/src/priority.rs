//! # Listener Priorities
//!
//! Priorities decide the order in which the listeners of one resolved chain
//! are delivered. Delivery runs from [`Priority::Lowest`] up to
//! [`Priority::Highest`]; [`Priority::Monitor`] runs last and is meant for
//! listeners that only observe the final outcome.
//!
//! Each priority carries a stable integer level. Registrations store the raw
//! level so that values coming from plugin metadata can be outside the known
//! range; such registrations are filtered out when they are registered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed, totally ordered set of listener priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Runs first; has the least say in the outcome
    Lowest,
    Low,
    /// Default priority
    Normal,
    High,
    /// Runs last among mutating listeners
    Highest,
    /// Observes the outcome, must not modify it
    Monitor,
}

impl Priority {
    /// All priorities in delivery order.
    pub const ALL: [Priority; 6] = [
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Highest,
        Priority::Monitor,
    ];

    /// Number of priority buckets a handler list holds.
    pub const COUNT: usize = Self::ALL.len();

    /// The stable integer level of this priority.
    pub const fn level(self) -> i32 {
        match self {
            Priority::Lowest => 5,
            Priority::Low => 4,
            Priority::Normal => 3,
            Priority::High => 2,
            Priority::Highest => 1,
            Priority::Monitor => 0,
        }
    }

    /// Maps a raw level back to a priority, `None` when out of range.
    pub fn from_level(level: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.level() == level)
    }

    /// Position of this priority in [`Priority::ALL`], used as bucket slot.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Priority::Lowest => 0,
            Priority::Low => 1,
            Priority::Normal => 2,
            Priority::High => 3,
            Priority::Highest => 4,
            Priority::Monitor => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Priority::Lowest => "LOWEST",
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Highest => "HIGHEST",
            Priority::Monitor => "MONITOR",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for Priority {
    type Error = i32;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        Self::from_level(level).ok_or(level)
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.level()
    }
}

/// Error returned when a priority name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown priority: {0}")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownPriority(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_round_trip_through_from_level() {
        for priority in Priority::ALL {
            assert_eq!(Priority::from_level(priority.level()), Some(priority));
        }
        assert_eq!(Priority::from_level(6), None);
        assert_eq!(Priority::from_level(-1), None);
        assert_eq!(Priority::try_from(42), Err(42));
    }

    #[test]
    fn test_index_matches_delivery_order() {
        for (i, priority) in Priority::ALL.iter().enumerate() {
            assert_eq!(priority.index(), i);
        }
        assert_eq!(Priority::ALL.first(), Some(&Priority::Lowest));
        assert_eq!(Priority::ALL.last(), Some(&Priority::Monitor));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("normal".parse::<Priority>(), Ok(Priority::Normal));
        assert_eq!(" MONITOR ".parse::<Priority>(), Ok(Priority::Monitor));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Priority::Highest).unwrap();
        assert_eq!(json, "\"HIGHEST\"");
        let back: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(back, Priority::Low);
    }
}
