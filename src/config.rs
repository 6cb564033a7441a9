use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::food::{FoodColor, FoodEffect, Growth, ScoreIncrement};

/// Slowest main-loop interval, used at speed 0.
pub const MAX_MAINLOOP_INTERVAL_MS: u64 = 120;

/// Fastest main-loop interval, reached at [`MAX_SPEED`].
pub const MIN_MAINLOOP_INTERVAL_MS: u64 = 20;

pub const MIN_SPEED: u32 = 1;
pub const MAX_SPEED: u32 = 20;

/// Period of the elapsed-time ticker.
pub const ELAPSED_TICK: Duration = Duration::from_secs(1);

/// Random probes tried before falling back to a full scan for a free cell.
pub const MAX_FREE_POSITION_ATTEMPTS: usize = 64;

/// Terminal columns and rows covered by one grid cell.
pub const DEFAULT_BLOCK: (u16, u16) = (2, 1);

pub const MESSAGE_PRESS_START: &str = "Press N to start";
pub const MESSAGE_GAME_OVER: &str = "GAME OVER! Press N to play again";

/// Errors raised while loading a game configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config must declare at least one food")]
    NoFoods,
}

/// One entry of the food catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSpec {
    pub color: FoodColor,
    /// Upper bound of the random delay before the food appears, in seconds.
    pub spawn_in_secs: f64,
    /// Upper bound of the random delay before an uneaten food disappears, in seconds.
    pub remove_in_secs: f64,
    pub effect: FoodEffect,
}

impl FoodSpec {
    #[must_use]
    pub fn spawn_in(&self) -> Duration {
        secs_to_duration(self.spawn_in_secs)
    }

    #[must_use]
    pub fn remove_in(&self) -> Duration {
        secs_to_duration(self.remove_in_secs)
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Tunable settings for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Viewport units per grid cell, `(columns, rows)`.
    pub block: (u16, u16),
    pub foods: Vec<FoodSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            block: DEFAULT_BLOCK,
            foods: default_foods(),
        }
    }
}

impl GameConfig {
    /// Loads a JSON config. Missing fields fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&raw).map_err(|error| match error {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        if config.foods.is_empty() {
            return Err(ConfigError::NoFoods);
        }

        Ok(config)
    }
}

/// The stock food catalog.
#[must_use]
pub fn default_foods() -> Vec<FoodSpec> {
    vec![
        FoodSpec {
            color: FoodColor::Yellow,
            spawn_in_secs: 10.0,
            remove_in_secs: 30.0,
            effect: FoodEffect::ScoreAndGrow {
                score: ScoreIncrement::Fixed(1),
                growth: Growth::Add(3),
                speed_step: 1,
            },
        },
        FoodSpec {
            color: FoodColor::Red,
            spawn_in_secs: 30.0,
            remove_in_secs: 15.0,
            effect: FoodEffect::ScoreAndGrow {
                score: ScoreIncrement::PerSegment(2),
                growth: Growth::Multiply(2),
                speed_step: 1,
            },
        },
        FoodSpec {
            color: FoodColor::Blue,
            spawn_in_secs: 30.0,
            remove_in_secs: 15.0,
            effect: FoodEffect::ScoreAndShrink {
                score: ScoreIncrement::PerSegment(2),
                divisor: 2,
            },
        },
        FoodSpec {
            color: FoodColor::Purple,
            spawn_in_secs: 180.0,
            remove_in_secs: 10.0,
            effect: FoodEffect::ResetAll {
                score: ScoreIncrement::CurrentScore,
            },
        },
        FoodSpec {
            color: FoodColor::Black,
            spawn_in_secs: 120.0,
            remove_in_secs: 30.0,
            effect: FoodEffect::InstantGameOver,
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ConfigError, GameConfig, DEFAULT_BLOCK};
    use crate::food::{FoodColor, FoodEffect};

    #[test]
    fn default_catalog_has_five_foods() {
        let config = GameConfig::default();

        assert_eq!(config.block, DEFAULT_BLOCK);
        assert_eq!(config.foods.len(), 5);
        assert_eq!(config.foods[0].spawn_in(), Duration::from_secs(10));
        assert_eq!(config.foods[4].effect, FoodEffect::InstantGameOver);
    }

    #[test]
    fn partial_json_keeps_default_foods() {
        let config = GameConfig::from_json(r#"{ "block": [3, 2] }"#).expect("config should parse");

        assert_eq!(config.block, (3, 2));
        assert_eq!(config.foods, GameConfig::default().foods);
    }

    #[test]
    fn custom_food_table_parses_tagged_effects() {
        let raw = r#"{
            "foods": [
                {
                    "color": "red",
                    "spawn_in_secs": 0.5,
                    "remove_in_secs": 2,
                    "effect": {
                        "kind": "score_and_grow",
                        "score": { "fixed": 4 },
                        "growth": { "add": 1 },
                        "speed_step": 0
                    }
                },
                { "color": "black", "spawn_in_secs": 1, "remove_in_secs": 1,
                  "effect": { "kind": "instant_game_over" } }
            ]
        }"#;

        let config = GameConfig::from_json(raw).expect("config should parse");

        assert_eq!(config.foods.len(), 2);
        assert_eq!(config.foods[0].color, FoodColor::Red);
        assert_eq!(config.foods[0].spawn_in(), Duration::from_millis(500));
    }

    #[test]
    fn empty_food_table_is_rejected() {
        let error = GameConfig::from_json(r#"{ "foods": [] }"#).expect_err("empty table");
        assert!(matches!(error, ConfigError::NoFoods));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = GameConfig::from_json("not-json").expect_err("malformed config");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn negative_delays_clamp_to_zero() {
        let mut config = GameConfig::default();
        config.foods[0].spawn_in_secs = -3.0;

        assert_eq!(config.foods[0].spawn_in(), Duration::ZERO);
    }
}
