use serde::{Deserialize, Serialize};

/// Coarse-grained admin ranks. Higher number, higher authority.
/// Accounts with no grant record sit at `Playable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    Playable,
    Player,
    LowWizard,
    HighWizard,
    God,
    Implementor,
}

impl Authority {
    pub fn level(self) -> i64 {
        match self {
            Authority::Playable => 0,
            Authority::Player => 1,
            Authority::LowWizard => 2,
            Authority::HighWizard => 3,
            Authority::God => 4,
            Authority::Implementor => 5,
        }
    }

    /// Unknown or out-of-range levels collapse to `Playable`.
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => Authority::Player,
            2 => Authority::LowWizard,
            3 => Authority::HighWizard,
            4 => Authority::God,
            l if l >= 5 => Authority::Implementor,
            _ => Authority::Playable,
        }
    }

    pub fn can_access(self, required: Authority) -> bool {
        self.level() >= required.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_is_ordered() {
        assert!(Authority::Implementor.can_access(Authority::God));
        assert!(Authority::God.can_access(Authority::God));
        assert!(!Authority::Playable.can_access(Authority::Player));
    }

    #[test]
    fn unknown_levels_are_playable() {
        assert_eq!(Authority::from_level(-3), Authority::Playable);
        assert_eq!(Authority::from_level(0), Authority::Playable);
        assert_eq!(Authority::from_level(99), Authority::Implementor);
    }
}
