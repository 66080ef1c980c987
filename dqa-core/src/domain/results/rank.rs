// dqa-core/src/domain/results/rank.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// Discriminants follow declaration order (Unset = 0, High = 1, Medium = 2, Low = 3).
// Sorting by rank therefore lists High before Medium before Low; it says nothing
// about severity beyond that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Rank {
    #[default]
    Unset,
    High,
    Medium,
    Low,
}

impl Rank {
    pub const ALL: [Rank; 3] = [Rank::High, Rank::Medium, Rank::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Parses a rank label. Blank or unknown text yields `None`.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Numeric level used on the resolver wire: 0 for unset, then 1 to 3.
    pub fn level(&self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    fn from_level(level: u64) -> Option<Self> {
        match level {
            0 => Some(Self::Unset),
            1 => Some(Self::High),
            2 => Some(Self::Medium),
            3 => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::Unset);
        }
        Self::from_label(s).ok_or_else(|| format!("'{}' is not a valid rank", s))
    }
}

impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.level())
    }
}

// Hand-written resolvers may answer with the label instead of the level.
impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Label(String),
            Level(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Label(label) => label.parse().map_err(serde::de::Error::custom),
            Repr::Level(level) => Self::from_level(level).ok_or_else(|| {
                serde::de::Error::custom(format!("rank level {} is out of range", level))
            }),
        }
    }
}
