//! Core type definitions shared across the brain

use crate::core::error::KoroError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a player in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Operating mode of the overseer brain
///
/// Each mode maps to a fixed capability triple. Production locks the LLM and
/// TTS off no matter how the brain was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrainMode {
    /// Brain does nothing at all
    Disabled,
    /// Dev mode: scripted rotation only, TTS on for testing voice lines
    DevNoLlm,
    /// Dev mode: LLM decisions and TTS both on
    DevWithLlm,
    /// Live matches: scripted rotation, LLM and TTS locked off
    Production,
}

/// The three independent switches a mode implies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether decision cycles run at all
    pub processing: bool,
    /// Whether decisions may be delegated to the LLM
    pub reasoning: bool,
    /// Whether spoken announcements are emitted
    pub speech: bool,
}

impl BrainMode {
    /// Fixed capability triple for this mode.
    ///
    /// Production forcing reasoning and speech off is an invariant of this
    /// method, not a default that callers can override.
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Disabled => Capabilities {
                processing: false,
                reasoning: false,
                speech: false,
            },
            Self::DevNoLlm => Capabilities {
                processing: true,
                reasoning: false,
                speech: true,
            },
            Self::DevWithLlm => Capabilities {
                processing: true,
                reasoning: true,
                speech: true,
            },
            Self::Production => Capabilities {
                processing: true,
                reasoning: false,
                speech: false,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::DevNoLlm => "dev-no-llm",
            Self::DevWithLlm => "dev-with-llm",
            Self::Production => "production",
        }
    }
}

impl FromStr for BrainMode {
    type Err = KoroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "off" => Ok(Self::Disabled),
            "dev-no-llm" | "dev" => Ok(Self::DevNoLlm),
            "dev-with-llm" | "dev-llm" => Ok(Self::DevWithLlm),
            "production" | "prod" => Ok(Self::Production),
            other => Err(KoroError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for BrainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action the overseer can take in one cycle
///
/// `None` is a valid decision (do nothing) but never enters the attack
/// rotation and never dispatches. `SpawnMinion` is reachable only from the
/// scripted rotation; the LLM reply contract does not expose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossAction {
    None,
    RaiseTemperature,
    LowerTemperature,
    Blackout,
    UvLight,
    ShieldTaunt,
    GroundHazard,
    SpawnMinion,
}

impl BossAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RaiseTemperature => "raise_temperature",
            Self::LowerTemperature => "lower_temperature",
            Self::Blackout => "blackout",
            Self::UvLight => "uv_light",
            Self::ShieldTaunt => "shield_taunt",
            Self::GroundHazard => "ground_hazard",
            Self::SpawnMinion => "spawn_minion",
        }
    }

    /// Both temperature attacks, up and down
    pub fn is_thermal(self) -> bool {
        matches!(self, Self::RaiseTemperature | Self::LowerTemperature)
    }
}

impl fmt::Display for BossAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength of a temperature attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackIntensity {
    Low,
    Medium,
    High,
}

impl AttackIntensity {
    /// Intensity scales inversely with overseer health: a healthy boss toys
    /// with players, a dying one goes all-in.
    pub fn from_health_percent(health: f32) -> Self {
        if health > 70.0 {
            Self::Low
        } else if health >= 30.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Priority tag on recorded game events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPriority {
    Low,
    Medium,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_locks_reasoning_and_speech() {
        let caps = BrainMode::Production.capabilities();
        assert!(caps.processing);
        assert!(!caps.reasoning);
        assert!(!caps.speech);
    }

    #[test]
    fn test_disabled_is_fully_off() {
        let caps = BrainMode::Disabled.capabilities();
        assert!(!caps.processing);
        assert!(!caps.reasoning);
        assert!(!caps.speech);
    }

    #[test]
    fn test_dev_with_llm_enables_everything() {
        let caps = BrainMode::DevWithLlm.capabilities();
        assert!(caps.processing);
        assert!(caps.reasoning);
        assert!(caps.speech);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("prod".parse::<BrainMode>().unwrap(), BrainMode::Production);
        assert_eq!("dev".parse::<BrainMode>().unwrap(), BrainMode::DevNoLlm);
        assert_eq!(
            "dev-with-llm".parse::<BrainMode>().unwrap(),
            BrainMode::DevWithLlm
        );
        assert!("turbo".parse::<BrainMode>().is_err());
    }

    #[test]
    fn test_intensity_from_health() {
        assert_eq!(
            AttackIntensity::from_health_percent(85.0),
            AttackIntensity::Low
        );
        assert_eq!(
            AttackIntensity::from_health_percent(70.0),
            AttackIntensity::Medium
        );
        assert_eq!(
            AttackIntensity::from_health_percent(30.0),
            AttackIntensity::Medium
        );
        assert_eq!(
            AttackIntensity::from_health_percent(29.9),
            AttackIntensity::High
        );
    }

    #[test]
    fn test_thermal_actions() {
        assert!(BossAction::RaiseTemperature.is_thermal());
        assert!(BossAction::LowerTemperature.is_thermal());
        assert!(!BossAction::Blackout.is_thermal());
        assert!(!BossAction::None.is_thermal());
    }
}
