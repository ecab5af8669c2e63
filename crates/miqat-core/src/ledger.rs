use std::sync::Arc;

use crate::domain::{evaluate_achievements, AchievementFacts, AchievementSet};
use crate::ports::{AchievementRepository, StoreError};

const MAX_ATTEMPTS: u32 = 5;

/// Grants achievements with compare-and-swap writes so two concurrent
/// evaluations never drop each other's unlocks.
pub struct AchievementLedger {
    repository: Arc<dyn AchievementRepository>,
}

impl AchievementLedger {
    pub fn new(repository: Arc<dyn AchievementRepository>) -> Self {
        Self { repository }
    }

    pub fn unlocked(&self) -> Result<AchievementSet, StoreError> {
        Ok(self.repository.load_achievements()?.value)
    }

    /// Returns only what this call newly unlocked.
    pub fn grant(&self, facts: &AchievementFacts<'_>) -> Result<AchievementSet, StoreError> {
        for _ in 0..MAX_ATTEMPTS {
            let current = self.repository.load_achievements()?;
            let delta = evaluate_achievements(facts, &current.value);

            if delta.is_empty() {
                return Ok(delta);
            }

            let merged = current.value.union(&delta);
            if self
                .repository
                .store_achievements_if_unchanged(&merged, current.version)?
            {
                return Ok(delta);
            }
        }

        Err(StoreError::Conflict {
            category: "achievements".to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }
}
