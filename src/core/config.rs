//! Brain tuning profile loaded from TOML
//!
//! Cooldown durations, cycle cadence, and thermal attack shaping live here
//! so designers can retune the boss without touching engine code.

use crate::core::error::{KoroError, Result};
use crate::core::types::AttackIntensity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Per-attack cooldown durations, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Shared by both temperature attacks
    pub thermal_secs: f32,
    pub blackout_secs: f32,
    pub uv_light_secs: f32,
    pub shield_taunt_secs: f32,
    pub ground_hazard_secs: f32,
    pub spawn_minion_secs: f32,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            thermal_secs: 45.0,
            blackout_secs: 60.0,
            uv_light_secs: 30.0,
            shield_taunt_secs: 25.0,
            ground_hazard_secs: 40.0,
            spawn_minion_secs: 90.0,
        }
    }
}

/// How often the brain runs a decision cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Fixed interval when the LLM path is enabled
    pub llm_interval_secs: f32,
    /// Health above 75%
    pub healthy_interval_secs: f32,
    /// Health 50-75%
    pub wounded_interval_secs: f32,
    /// Health 25-50%
    pub critical_interval_secs: f32,
    /// Health below 25%
    pub desperate_interval_secs: f32,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            llm_interval_secs: 30.0,
            healthy_interval_secs: 40.0,
            wounded_interval_secs: 30.0,
            critical_interval_secs: 20.0,
            desperate_interval_secs: 12.0,
        }
    }
}

impl CadenceConfig {
    /// Interval until the next cycle. The LLM path runs on a fixed clock;
    /// the scripted path speeds up as the overseer weakens.
    pub fn interval_for(&self, reasoning: bool, health_percent: f32) -> Duration {
        let secs = if reasoning {
            self.llm_interval_secs
        } else if health_percent > 75.0 {
            self.healthy_interval_secs
        } else if health_percent > 50.0 {
            self.wounded_interval_secs
        } else if health_percent > 25.0 {
            self.critical_interval_secs
        } else {
            self.desperate_interval_secs
        };
        Duration::from_secs_f32(secs.max(0.0))
    }
}

/// Shaping of temperature attacks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalConfig {
    /// Degrees per second the environment moves toward the target
    pub rate_per_second: f32,
    /// Fraction of the normal-to-danger span targeted per intensity
    pub low_scale: f32,
    pub medium_scale: f32,
    pub high_scale: f32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            rate_per_second: 1.5,
            low_scale: 0.4,
            medium_scale: 0.7,
            high_scale: 1.0,
        }
    }
}

impl ThermalConfig {
    pub fn scale_for(&self, intensity: AttackIntensity) -> f32 {
        match intensity {
            AttackIntensity::Low => self.low_scale,
            AttackIntensity::Medium => self.medium_scale,
            AttackIntensity::High => self.high_scale,
        }
    }
}

/// Capacities of the bounded history logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub event_capacity: usize,
    pub response_capacity: usize,
    pub attack_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            event_capacity: 10,
            response_capacity: 10,
            attack_capacity: 3,
        }
    }
}

/// Complete brain tuning profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrainConfig {
    #[serde(default)]
    pub cooldowns: CooldownConfig,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub thermal: ThermalConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl BrainConfig {
    pub fn thermal_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldowns.thermal_secs.max(0.0))
    }

    pub fn blackout_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldowns.blackout_secs.max(0.0))
    }

    pub fn uv_light_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldowns.uv_light_secs.max(0.0))
    }

    pub fn shield_taunt_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldowns.shield_taunt_secs.max(0.0))
    }

    pub fn ground_hazard_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldowns.ground_hazard_secs.max(0.0))
    }

    pub fn spawn_minion_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldowns.spawn_minion_secs.max(0.0))
    }
}

/// Load a brain profile from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<BrainConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| KoroError::Config(format!("failed to read {:?}: {}", path, e)))?;

    toml::from_str(&contents)
        .map_err(|e| KoroError::Config(format!("failed to parse {:?}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sane() {
        let config = BrainConfig::default();
        assert!(config.cooldowns.thermal_secs > 0.0);
        assert!(config.history.event_capacity >= config.history.attack_capacity);
    }

    #[test]
    fn test_cadence_tiers() {
        let cadence = CadenceConfig::default();

        // LLM path is a fixed clock regardless of health
        assert_eq!(
            cadence.interval_for(true, 10.0),
            cadence.interval_for(true, 90.0)
        );

        // Scripted path speeds up as health drops
        let healthy = cadence.interval_for(false, 90.0);
        let wounded = cadence.interval_for(false, 60.0);
        let critical = cadence.interval_for(false, 40.0);
        let desperate = cadence.interval_for(false, 10.0);
        assert!(healthy > wounded);
        assert!(wounded > critical);
        assert!(critical > desperate);
    }

    #[test]
    fn test_thermal_scale_ordering() {
        let thermal = ThermalConfig::default();
        assert!(thermal.scale_for(AttackIntensity::Low) < thermal.scale_for(AttackIntensity::High));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BrainConfig = toml::from_str(
            r#"
            [cooldowns]
            thermal_secs = 10.0
            blackout_secs = 20.0
            uv_light_secs = 5.0
            shield_taunt_secs = 5.0
            ground_hazard_secs = 5.0
            spawn_minion_secs = 30.0
            "#,
        )
        .expect("partial profile should parse");

        assert_eq!(config.cooldowns.thermal_secs, 10.0);
        // Unspecified sections fall back to defaults
        assert_eq!(config.history.event_capacity, 10);
    }
}
