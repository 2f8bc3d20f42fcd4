//! Point-in-time game state snapshot
//!
//! Both decision paths work from the same validated, immutable view built at
//! the top of a cycle. Construction fails closed: bad upstream data means no
//! snapshot, and the caller skips the cycle without touching any state.

use crate::core::error::{KoroError, Result};
use crate::core::types::PlayerId;
use crate::history::HistoryStore;
use crate::providers::WorldView;
use serde::Serialize;

/// Overseer status block
#[derive(Debug, Clone, Serialize)]
pub struct OverseerSnapshot {
    pub health_percent: f32,
    pub internal_temperature: f32,
    pub normal_temperature: f32,
    pub critical_temperature: f32,
    pub shield_open: bool,
}

/// Arena environment block
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentSnapshot {
    pub temperature: f32,
    pub normal_temperature: f32,
    pub cold_danger: f32,
    pub heat_danger: f32,
    pub healthpack_count: u32,
    /// The single channel through which either decision path learns whether
    /// a temperature attack is currently allowed: the environment sits inside
    /// the danger band AND the shared thermal cooldown has elapsed.
    pub thermal_attack_ready: bool,
}

/// One player entry
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub health_percent: f32,
}

/// Immutable per-cycle decision input
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub overseer: OverseerSnapshot,
    pub environment: EnvironmentSnapshot,
    pub players: Vec<PlayerSnapshot>,
    pub recent_events: Vec<String>,
    pub recent_responses: Vec<String>,
    pub recent_attacks: Vec<String>,
}

impl GameSnapshot {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

fn require_finite(value: f32, field: &str) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(KoroError::InvalidSnapshot(format!(
            "{} is not a finite number: {}",
            field, value
        )))
    }
}

fn clamp_percent(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}

/// Build and validate a snapshot from the current collaborators.
///
/// `thermal_cooldown_ready` is the cooldown half of thermal eligibility; the
/// environment band check happens here so the flag callers see is complete.
pub fn build_snapshot(
    world: &WorldView<'_>,
    history: &HistoryStore,
    thermal_cooldown_ready: bool,
) -> Result<GameSnapshot> {
    let health = clamp_percent(require_finite(
        world.overseer.health_percent(),
        "overseer health",
    )?);
    let internal_temp = require_finite(
        world.overseer.internal_temperature(),
        "overseer internal temperature",
    )?;
    let (normal_limit, critical_limit) = world.overseer.temperature_limits();
    require_finite(normal_limit, "overseer normal temperature limit")?;
    require_finite(critical_limit, "overseer critical temperature limit")?;

    let env_temp = require_finite(
        world.environment.current_temperature(),
        "environment temperature",
    )?;
    let env_normal = require_finite(
        world.environment.normal_temperature(),
        "environment normal temperature",
    )?;
    let (cold_danger, heat_danger) = world.environment.danger_bounds();
    require_finite(cold_danger, "cold danger bound")?;
    require_finite(heat_danger, "heat danger bound")?;
    if cold_danger >= heat_danger {
        return Err(KoroError::InvalidSnapshot(format!(
            "danger bounds out of order: cold {} >= heat {}",
            cold_danger, heat_danger
        )));
    }

    let players = world
        .roster
        .players()
        .into_iter()
        .map(|p| {
            Ok(PlayerSnapshot {
                id: p.id,
                name: p.name,
                health_percent: clamp_percent(require_finite(
                    p.health_percent,
                    "player health",
                )?),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let in_danger_band = env_temp >= cold_danger && env_temp <= heat_danger;

    Ok(GameSnapshot {
        overseer: OverseerSnapshot {
            health_percent: health,
            internal_temperature: internal_temp,
            normal_temperature: normal_limit,
            critical_temperature: critical_limit,
            shield_open: world.overseer.shield_open(),
        },
        environment: EnvironmentSnapshot {
            temperature: env_temp,
            normal_temperature: env_normal,
            cold_danger,
            heat_danger,
            healthpack_count: world.environment.healthpack_count(),
            thermal_attack_ready: in_danger_band && thermal_cooldown_ready,
        },
        players,
        recent_events: history.event_lines(),
        recent_responses: history.response_lines(),
        recent_attacks: history.attack_names(),
    })
}
