use crate::domain::AchievementSet;

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Versioned<T> {
    pub value: T,
    /// 0 when the document does not exist yet.
    pub version: u64,
}

pub trait AchievementRepository: Send + Sync {
    fn load_achievements(&self) -> Result<Versioned<AchievementSet>, StoreError>;

    /// Writes `achievements` only if the stored version still equals
    /// `expected_version`. Returns false on a lost race.
    fn store_achievements_if_unchanged(
        &self,
        achievements: &AchievementSet,
        expected_version: u64,
    ) -> Result<bool, StoreError>;
}
