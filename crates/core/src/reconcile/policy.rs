//! Rules for trusting a page scan.

use std::fmt;

use super::CheckerConfig;

/// Why a scanned episode number was not trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not past the user's current episode.
    NotAhead,
    /// Above the plausible ceiling for this show.
    AboveCeiling { ceiling: u32 },
    /// Too far past the current episode to be a real release.
    JumpTooLarge { jump: u32 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAhead => write!(f, "not ahead of current episode"),
            Rejection::AboveCeiling { ceiling } => write!(f, "above ceiling {}", ceiling),
            Rejection::JumpTooLarge { jump } => write!(f, "jump of {} episodes", jump),
        }
    }
}

/// Acceptance rules for fallback scan results.
///
/// Direct probe hits are always accepted; only scanned numbers go
/// through this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptancePolicy {
    pub max_episode_jump: u32,
    pub unknown_total_ceiling: u32,
}

impl AcceptancePolicy {
    pub fn from_config(config: &CheckerConfig) -> Self {
        Self {
            max_episode_jump: config.max_episode_jump,
            unknown_total_ceiling: config.unknown_total_ceiling,
        }
    }

    /// Highest episode number that may be accepted for a show with `total` episodes.
    pub fn ceiling(&self, total: u32) -> u32 {
        total.max(self.unknown_total_ceiling)
    }

    pub fn evaluate(&self, current: u32, total: u32, latest: u32) -> Result<(), Rejection> {
        if latest <= current {
            return Err(Rejection::NotAhead);
        }
        let ceiling = self.ceiling(total);
        if latest > ceiling {
            return Err(Rejection::AboveCeiling { ceiling });
        }
        let jump = latest - current;
        if jump > self.max_episode_jump {
            return Err(Rejection::JumpTooLarge { jump });
        }
        Ok(())
    }

    #[cfg(test)]
    fn accepts(&self, current: u32, total: u32, latest: u32) -> bool {
        self.evaluate(current, total, latest).is_ok()
    }
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self::from_config(&CheckerConfig::default())
    }
}
