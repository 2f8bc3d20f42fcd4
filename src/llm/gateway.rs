//! Adapters between game state and LLM text/JSON
//!
//! Defines the prompt context sent to the reasoning service and the fixed
//! reply contract expected back. A reply that fails the contract, or a
//! service that fails outright, degrades to "do nothing" - never an error the
//! cycle has to handle.

use crate::core::types::{AttackIntensity, BossAction};
use crate::providers::ReasoningService;
use crate::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};

// =========================================================================
//  INPUT SCHEMA (engine -> LLM)
// =========================================================================

/// Structured situation report serialized into the prompt
#[derive(Debug, Serialize)]
pub struct PromptContext {
    pub overseer_health_percent: f32,
    pub overseer_internal_temperature: f32,
    pub shield_open: bool,
    pub arena_temperature: f32,
    pub arena_normal_temperature: f32,
    pub arena_cold_danger: f32,
    pub arena_heat_danger: f32,
    pub healthpacks_available: u32,
    pub thermal_attack_ready: bool,
    pub player_count: usize,
    pub players: Vec<PlayerLine>,
}

#[derive(Debug, Serialize)]
pub struct PlayerLine {
    pub name: String,
    pub health_percent: f32,
}

impl PromptContext {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            overseer_health_percent: snapshot.overseer.health_percent,
            overseer_internal_temperature: snapshot.overseer.internal_temperature,
            shield_open: snapshot.overseer.shield_open,
            arena_temperature: snapshot.environment.temperature,
            arena_normal_temperature: snapshot.environment.normal_temperature,
            arena_cold_danger: snapshot.environment.cold_danger,
            arena_heat_danger: snapshot.environment.heat_danger,
            healthpacks_available: snapshot.environment.healthpack_count,
            thermal_attack_ready: snapshot.environment.thermal_attack_ready,
            player_count: snapshot.player_count(),
            players: snapshot
                .players
                .iter()
                .map(|p| PlayerLine {
                    name: p.name.clone(),
                    health_percent: p.health_percent,
                })
                .collect(),
        }
    }
}

// =========================================================================
//  OUTPUT SCHEMA (LLM -> engine)
// =========================================================================

/// Actions the reasoning service may pick. Minion spawning is deliberately
/// absent; only the scripted rotation can reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplyAction {
    None,
    RaiseTemperature,
    LowerTemperature,
    Blackout,
    UvLight,
    ShieldTaunt,
    GroundHazard,
}

impl ReplyAction {
    pub fn to_boss_action(self) -> BossAction {
        match self {
            Self::None => BossAction::None,
            Self::RaiseTemperature => BossAction::RaiseTemperature,
            Self::LowerTemperature => BossAction::LowerTemperature,
            Self::Blackout => BossAction::Blackout,
            Self::UvLight => BossAction::UvLight,
            Self::ShieldTaunt => BossAction::ShieldTaunt,
            Self::GroundHazard => BossAction::GroundHazard,
        }
    }
}

/// The reply contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainReply {
    /// Something for KORO to say out loud
    #[serde(default)]
    pub message: Option<String>,
    /// The chosen action
    pub action: ReplyAction,
    /// Meaningful for temperature attacks only
    #[serde(default)]
    pub intensity: Option<AttackIntensity>,
    /// Named player, rarely used
    #[serde(default)]
    pub target: Option<String>,
}

impl BrainReply {
    /// The safe default substituted on any failure
    pub fn none() -> Self {
        Self {
            message: None,
            action: ReplyAction::None,
            intensity: None,
            target: None,
        }
    }
}

/// Ask the reasoning service for a decision.
///
/// Transport failure, timeout, or a reply that fails the contract all degrade
/// to [`BrainReply::none`] with a warning; no retry within the cycle. The
/// caller records exactly one response per invocation, defaulted or not.
pub async fn request_decision(
    service: &dyn ReasoningService,
    snapshot: &GameSnapshot,
    history_text: &str,
) -> BrainReply {
    let context = PromptContext::from_snapshot(snapshot);
    let context_json = match serde_json::to_string_pretty(&context) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("failed to serialize prompt context: {}", e);
            return BrainReply::none();
        }
    };

    let user_prompt = format!(
        "SITUATION:\n{}\n\nHISTORY:\n{}\n\nDecide KORO's next move as JSON:",
        context_json, history_text
    );

    let response = match service.complete(DECISION_SYSTEM_PROMPT, &user_prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("reasoning service unavailable: {}", e);
            return BrainReply::none();
        }
    };

    parse_reply(&response).unwrap_or_else(|e| {
        tracing::warn!("malformed reasoning reply: {} - raw: {}", e, response);
        BrainReply::none()
    })
}

fn parse_reply(response: &str) -> Result<BrainReply, String> {
    let json = extract_json(response)?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}

/// Extract a JSON object from a reply that may carry surrounding prose
fn extract_json(response: &str) -> Result<&str, String> {
    let start = response
        .find('{')
        .ok_or_else(|| "no JSON object in response".to_string())?;
    let end = response
        .rfind('}')
        .ok_or_else(|| "no closing brace in response".to_string())?;
    if end < start {
        return Err("mismatched braces in response".to_string());
    }
    Ok(&response[start..=end])
}

/// System prompt carrying the persona and the output contract
const DECISION_SYSTEM_PROMPT: &str = r#"You are KORO, the malfunctioning overseer of a combat arena.
You decide one hostile action per cycle against the players below you.
Stay in character: cold, clinical, faintly contemptuous.

AVAILABLE ACTIONS:
- NONE: Do nothing this cycle
- RAISE_TEMPERATURE: Heat the arena (only if thermal_attack_ready is true)
- LOWER_TEMPERATURE: Freeze the arena (only if thermal_attack_ready is true)
- BLACKOUT: Kill the arena lights
- UV_LIGHT: Fire ultraviolet beams at the ground
- SHIELD_TAUNT: Open your shield and dare them to shoot
- GROUND_HAZARD: Electrify a section of the floor

RULES:
- Pick exactly one action.
- intensity (LOW|MEDIUM|HIGH) applies to temperature actions only.
- target is optional and names a single player.
- Prefer NONE over an ineligible action.

OUTPUT FORMAT (JSON only, no explanation):
{
  "message": "something to say, or null",
  "action": "ACTION_NAME",
  "intensity": "LOW|MEDIUM|HIGH or null",
  "target": "player name or null"
}

Examples:
{"message": "Let us turn up the heat.", "action": "RAISE_TEMPERATURE", "intensity": "MEDIUM", "target": null}
{"message": null, "action": "BLACKOUT", "intensity": null, "target": null}
{"message": "Your persistence is noted, and irrelevant.", "action": "NONE", "intensity": null, "target": null}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{KoroError, Result};
    use crate::snapshot::{EnvironmentSnapshot, OverseerSnapshot};
    use async_trait::async_trait;

    struct ScriptedService {
        reply: Result<String>,
    }

    #[async_trait]
    impl ReasoningService for ScriptedService {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(KoroError::Reasoning("scripted failure".into())),
            }
        }
    }

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            overseer: OverseerSnapshot {
                health_percent: 60.0,
                internal_temperature: 70.0,
                normal_temperature: 60.0,
                critical_temperature: 95.0,
                shield_open: false,
            },
            environment: EnvironmentSnapshot {
                temperature: 22.0,
                normal_temperature: 20.0,
                cold_danger: 0.0,
                heat_danger: 40.0,
                healthpack_count: 1,
                thermal_attack_ready: true,
            },
            players: vec![],
            recent_events: vec![],
            recent_responses: vec![],
            recent_attacks: vec![],
        }
    }

    #[test]
    fn test_extract_json_plain() {
        let response = r#"{"action": "BLACKOUT"}"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_extract_json_with_prose() {
        let response = "Here is my decision:\n{\"action\": \"NONE\"}\nGood luck.";
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_missing() {
        assert!(extract_json("I refuse to answer.").is_err());
    }

    #[test]
    fn test_reply_deserialization() {
        let json = r#"{
            "message": "Cold enough for you?",
            "action": "LOWER_TEMPERATURE",
            "intensity": "HIGH",
            "target": null
        }"#;
        let reply: BrainReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.action, ReplyAction::LowerTemperature);
        assert_eq!(reply.intensity, Some(AttackIntensity::High));
        assert_eq!(reply.message.as_deref(), Some("Cold enough for you?"));
    }

    #[test]
    fn test_reply_optional_fields_default() {
        let json = r#"{"action": "SHIELD_TAUNT"}"#;
        let reply: BrainReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.action, ReplyAction::ShieldTaunt);
        assert!(reply.message.is_none());
        assert!(reply.intensity.is_none());
        assert!(reply.target.is_none());
    }

    #[test]
    fn test_spawn_minion_not_in_contract() {
        let json = r#"{"action": "SPAWN_MINION"}"#;
        assert!(serde_json::from_str::<BrainReply>(json).is_err());
    }

    #[tokio::test]
    async fn test_request_decision_happy_path() {
        let service = ScriptedService {
            reply: Ok(r#"{"message": "Lights out.", "action": "BLACKOUT"}"#.into()),
        };
        let reply = request_decision(&service, &snapshot(), "").await;
        assert_eq!(reply.action, ReplyAction::Blackout);
        assert_eq!(reply.message.as_deref(), Some("Lights out."));
    }

    #[tokio::test]
    async fn test_request_decision_malformed_reply_defaults_to_none() {
        let service = ScriptedService {
            reply: Ok("I will think about it.".into()),
        };
        let reply = request_decision(&service, &snapshot(), "").await;
        assert_eq!(reply.action, ReplyAction::None);
    }

    #[tokio::test]
    async fn test_request_decision_transport_failure_defaults_to_none() {
        let service = ScriptedService {
            reply: Err(KoroError::Reasoning("down".into())),
        };
        let reply = request_decision(&service, &snapshot(), "").await;
        assert_eq!(reply.action, ReplyAction::None);
        assert!(reply.message.is_none());
    }

    #[test]
    fn test_prompt_context_from_snapshot() {
        let context = PromptContext::from_snapshot(&snapshot());
        assert_eq!(context.overseer_health_percent, 60.0);
        assert!(context.thermal_attack_ready);
        assert_eq!(context.player_count, 0);
    }
}
