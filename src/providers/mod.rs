//! Collaborator interfaces the session layer must implement
//!
//! The brain never reaches into global game state. Everything it reads or
//! commands goes through these seams, and the refs are handed in fresh each
//! cycle via [`WorldView`]. A collaborator that cannot honor a call returns
//! false; it never panics into the engine.

use crate::core::error::Result;
use crate::core::types::{BossAction, PlayerId};
use async_trait::async_trait;

/// Tuning knobs for a UV light barrage
#[derive(Debug, Clone, Copy)]
pub struct UvLightParams {
    pub duration_secs: f32,
    /// Beams spawned per second
    pub sample_rate: f32,
}

impl Default for UvLightParams {
    fn default() -> Self {
        Self {
            duration_secs: 8.0,
            sample_rate: 2.0,
        }
    }
}

/// The overseer entity: status queries plus attack capabilities
///
/// Capability calls return false when the entity refuses the action (its own
/// cooldown, a minion already present, shield geometry in the way). The brain
/// treats a refusal as "blocked", never as a fault.
pub trait OverseerInterface {
    fn health_percent(&self) -> f32;
    fn internal_temperature(&self) -> f32;
    /// (normal, critical) internal temperature
    fn temperature_limits(&self) -> (f32, f32);
    /// True when the shield is open and the core is exposed
    fn shield_open(&self) -> bool;
    /// True while the overseer is in a compromised structural state
    fn is_malfunctioning(&self) -> bool;

    fn begin_temperature_shift(&mut self, target: f32, rate_per_second: f32) -> bool;
    fn begin_blackout(&mut self);
    fn begin_uv_light(&mut self, params: UvLightParams) -> bool;
    fn perform_shield_taunt(&mut self);
    fn begin_ground_hazard(&mut self) -> bool;
    fn spawn_minion(&mut self) -> bool;
}

/// Arena environment readings
pub trait EnvironmentProbe {
    fn current_temperature(&self) -> f32;
    fn normal_temperature(&self) -> f32;
    /// (cold, heat) bounds beyond which thermal attacks are off the table
    fn danger_bounds(&self) -> (f32, f32);
    /// Health packs currently available in the arena
    fn healthpack_count(&self) -> u32;
}

/// One living player as the brain sees it
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub health_percent: f32,
}

/// Alive players only
pub trait PlayerRoster {
    fn players(&self) -> Vec<PlayerInfo>;
}

/// Match lifecycle, reduced to the one question the brain asks
pub trait MatchSession {
    fn is_active(&self) -> bool;
}

/// Downstream display / TTS sink
///
/// `health_percent` rides along so the voice layer can distort the overseer's
/// speech as it breaks down.
pub trait SpeechSink {
    fn announce(&mut self, message: &str, action: BossAction, health_percent: f32);
}

/// Remote reasoning service seam
///
/// [`crate::llm::client::LlmClient`] is the production implementation; tests
/// plug in scripted fakes.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Run one completion. `system` carries the persona and output contract,
    /// `user` the per-cycle situation.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// All collaborator refs for one cycle, injected by the caller
pub struct WorldView<'a> {
    pub overseer: &'a mut dyn OverseerInterface,
    pub environment: &'a dyn EnvironmentProbe,
    pub roster: &'a dyn PlayerRoster,
    pub session: &'a dyn MatchSession,
    pub speech: &'a mut dyn SpeechSink,
}
