use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which kind of round is being played
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Practice,
    #[default]
    Drill,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Practice => Mode::Drill,
            Mode::Drill => Mode::Practice,
        }
    }
}

/// Complexity tier of the practice text
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    #[default]
    Novice,
    Intermediate,
    Advanced,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Novice,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Master,
    ];

    /// Next tier, wrapping back to the first
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Key pool used by drill rounds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum DrillDifficulty {
    #[default]
    #[serde(rename = "HOME ROW")]
    #[strum(serialize = "HOME ROW")]
    HomeRow,
    #[serde(rename = "ALPHA")]
    #[strum(serialize = "ALPHA")]
    Alpha,
    #[serde(rename = "NUMBERS")]
    #[strum(serialize = "NUMBERS")]
    Numbers,
    #[serde(rename = "ALL")]
    #[strum(serialize = "ALL")]
    All,
}

impl DrillDifficulty {
    pub const ALL: [DrillDifficulty; 4] = [
        DrillDifficulty::HomeRow,
        DrillDifficulty::Alpha,
        DrillDifficulty::Numbers,
        DrillDifficulty::All,
    ];

    pub fn keys(self) -> &'static str {
        match self {
            DrillDifficulty::HomeRow => "asdfghjkl",
            DrillDifficulty::Alpha => "abcdefghijklmnopqrstuvwxyz",
            DrillDifficulty::Numbers => "0123456789",
            DrillDifficulty::All => "abcdefghijklmnopqrstuvwxyz0123456789[];',./",
        }
    }

    pub fn pool(self) -> Vec<char> {
        self.keys().chars().collect()
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_storage_format() {
        assert_eq!(Difficulty::Novice.to_string(), "NOVICE");
        assert_eq!(Difficulty::Master.to_string(), "MASTER");
        assert_eq!(DrillDifficulty::HomeRow.to_string(), "HOME ROW");
        assert_eq!(DrillDifficulty::Alpha.to_string(), "ALPHA");
        assert_eq!(Mode::Practice.to_string(), "PRACTICE");
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(
            serde_json::to_string(&DrillDifficulty::HomeRow).unwrap(),
            "\"HOME ROW\""
        );
        assert_eq!(
            serde_json::from_str::<Difficulty>("\"INTERMEDIATE\"").unwrap(),
            Difficulty::Intermediate
        );
        assert!(serde_json::from_str::<Difficulty>("\"EASY\"").is_err());
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(Difficulty::Master.next(), Difficulty::Novice);
        assert_eq!(Difficulty::Novice.next(), Difficulty::Intermediate);
        assert_eq!(DrillDifficulty::All.next(), DrillDifficulty::HomeRow);
    }

    #[test]
    fn test_pools() {
        assert_eq!(DrillDifficulty::HomeRow.pool().len(), 9);
        assert_eq!(DrillDifficulty::Alpha.pool().len(), 26);
        assert_eq!(DrillDifficulty::Numbers.pool().len(), 10);
        assert!(DrillDifficulty::All.pool().contains(&'/'));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Mode::default(), Mode::Drill);
        assert_eq!(Difficulty::default(), Difficulty::Novice);
        assert_eq!(DrillDifficulty::default(), DrillDifficulty::HomeRow);
        assert_eq!(Mode::Drill.toggled(), Mode::Practice);
    }
}
