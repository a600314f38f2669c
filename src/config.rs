//! Immutable gameplay tuning.
//!
//! Defaults reproduce the classic cadence: a monster every two seconds at level 1,
//! 100 ms faster per level down to a 500 ms floor, three seconds to click each one.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Period of the elapsed-time clock.
pub const CLOCK_PERIOD_MS: u64 = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("level_up_score must be greater than zero")]
    ZeroLevelUpScore,

    #[error("max_monsters must be greater than zero")]
    ZeroMaxMonsters,

    #[error("monster_lifetime_ms must be greater than zero")]
    ZeroLifetime,

    #[error("min_spawn_interval_ms must be greater than zero")]
    ZeroMinSpawnInterval,

    #[error("min_spawn_interval_ms ({min}) exceeds initial_spawn_interval_ms ({initial})")]
    MinAboveInitial { min: u64, initial: u64 },

    #[error("initial_lives must be greater than zero")]
    ZeroLives,

    #[cfg(feature = "serde_json")]
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub initial_spawn_interval_ms: u64,
    /// Subtracted from the spawn interval once per level above 1.
    pub spawn_interval_decrease_ms: u64,
    pub min_spawn_interval_ms: u64,
    pub monster_lifetime_ms: u64,
    pub points_per_monster: u32,
    pub max_monsters: usize,
    /// Points needed per level; level = score / level_up_score + 1.
    pub level_up_score: u32,
    pub initial_lives: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_spawn_interval_ms: 2_000,
            spawn_interval_decrease_ms: 100,
            min_spawn_interval_ms: 500,
            monster_lifetime_ms: 3_000,
            points_per_monster: 10,
            max_monsters: 5,
            level_up_score: 100,
            initial_lives: 3,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level_up_score == 0 {
            return Err(ConfigError::ZeroLevelUpScore);
        }
        if self.max_monsters == 0 {
            return Err(ConfigError::ZeroMaxMonsters);
        }
        if self.monster_lifetime_ms == 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        if self.min_spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroMinSpawnInterval);
        }
        if self.min_spawn_interval_ms > self.initial_spawn_interval_ms {
            return Err(ConfigError::MinAboveInitial {
                min: self.min_spawn_interval_ms,
                initial: self.initial_spawn_interval_ms,
            });
        }
        if self.initial_lives == 0 {
            return Err(ConfigError::ZeroLives);
        }
        Ok(())
    }

    /// Delay before the next spawn at `level`, clamped to the configured floor.
    pub fn spawn_interval_ms(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        let reduction = steps.saturating_mul(self.spawn_interval_decrease_ms);
        self.initial_spawn_interval_ms
            .saturating_sub(reduction)
            .max(self.min_spawn_interval_ms)
    }

    pub fn level_for_score(&self, score: u32) -> u32 {
        score / self.level_up_score.max(1) + 1
    }

    /// Parse a JSON override; absent fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
