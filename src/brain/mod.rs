//! The overseer brain
//!
//! Owns the operating mode, the cycle state machine, cooldown and rotation
//! state, and the interaction history. One call to [`KoroBrain::tick`] is one
//! complete decision cycle: gate, snapshot, decide (scripted or LLM),
//! dispatch. The caller drives ticks serially from the game loop; the
//! explicit in-flight flag is the only concurrency guard this design needs.

pub mod dispatch;
pub mod selector;

pub use dispatch::DispatchOutcome;
pub use selector::{AttackRotation, ChosenAction, CooldownSlot, Cooldowns};

use crate::core::config::BrainConfig;
use crate::core::types::{AttackIntensity, BossAction, BrainMode, Capabilities, EventPriority};
use crate::history::{EventPayload, HistoryStore, ResponseRecord};
use crate::llm::gateway::{request_decision, BrainReply};
use crate::providers::{ReasoningService, WorldView};
use crate::snapshot::{build_snapshot, GameSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Which path produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Scripted,
    Reasoning,
}

/// The single chosen action for a cycle, from either path
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: BossAction,
    pub intensity: Option<AttackIntensity>,
    pub message: Option<String>,
    pub target: Option<String>,
    pub source: DecisionSource,
}

impl Decision {
    fn nothing(source: DecisionSource) -> Self {
        Self {
            action: BossAction::None,
            intensity: None,
            message: None,
            target: None,
            source,
        }
    }
}

/// Cycle state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Evaluating,
    Dispatching,
}

/// What one tick call did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Processing is off in the current mode
    ProcessingDisabled,
    /// The match is not running
    MatchInactive,
    /// A cycle was already in flight
    AlreadyRunning,
    /// The cadence interval has not elapsed yet
    NotDue,
    /// Snapshot construction failed; cycle skipped, no state touched
    SnapshotUnavailable,
    /// The cycle ran and decided to do nothing
    NoAction,
    /// The cycle ran and a decision reached the dispatcher
    Dispatched(DispatchOutcome),
}

/// Mode plus capability flags, for the admin/chat surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrainStatus {
    pub mode: BrainMode,
    pub processing: bool,
    pub reasoning: bool,
    pub speech: bool,
}

/// KORO's decision engine
pub struct KoroBrain {
    mode: BrainMode,
    caps: Capabilities,
    config: BrainConfig,
    cooldowns: Cooldowns,
    rotation: AttackRotation,
    history: HistoryStore,
    minion_alive: bool,
    phase: CyclePhase,
    cycle_in_flight: bool,
    last_cycle_at: Option<Instant>,
    started_at: Instant,
    reasoning_service: Option<Box<dyn ReasoningService>>,
    rng: StdRng,
}

impl KoroBrain {
    /// Create a brain in Disabled mode with a fixed voice-line seed
    pub fn new(config: BrainConfig) -> Self {
        Self::with_seed(config, 42)
    }

    /// Create with a specific voice-line seed for reproducible runs
    pub fn with_seed(config: BrainConfig, seed: u64) -> Self {
        let history = HistoryStore::new(&config.history);
        Self {
            mode: BrainMode::Disabled,
            caps: BrainMode::Disabled.capabilities(),
            config,
            cooldowns: Cooldowns::new(),
            rotation: AttackRotation::default(),
            history,
            minion_alive: false,
            phase: CyclePhase::Idle,
            cycle_in_flight: false,
            last_cycle_at: None,
            started_at: Instant::now(),
            reasoning_service: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Attach the remote reasoning service used when the mode enables it
    pub fn with_reasoning_service(mut self, service: Box<dyn ReasoningService>) -> Self {
        self.reasoning_service = Some(service);
        self
    }

    /// Replace the default attack rotation
    pub fn with_rotation(mut self, rotation: AttackRotation) -> Self {
        self.rotation = rotation;
        self
    }

    // ---------------------------------------------------------------------
    // Mode control
    // ---------------------------------------------------------------------

    /// Switch operating mode. Total and always a full reset: every cooldown
    /// back to ready-now, rotation cursor back to zero, cadence gate cleared.
    pub fn set_mode(&mut self, mode: BrainMode) {
        tracing::info!(from = %self.mode, to = %mode, "brain mode change");
        self.mode = mode;
        self.caps = mode.capabilities();
        self.cooldowns.reset_all();
        self.rotation.reset();
        self.last_cycle_at = None;
    }

    /// Switch mode from an admin-command string. Unknown names fail safe
    /// into Disabled.
    pub fn set_mode_by_name(&mut self, name: &str) -> BrainMode {
        let mode = name.parse().unwrap_or_else(|e| {
            tracing::warn!("{}; falling back to disabled", e);
            BrainMode::Disabled
        });
        self.set_mode(mode);
        mode
    }

    /// Current mode and capability flags. No side effects.
    pub fn status(&self) -> BrainStatus {
        BrainStatus {
            mode: self.mode,
            processing: self.caps.processing,
            reasoning: self.caps.reasoning,
            speech: self.caps.speech,
        }
    }

    pub fn mode(&self) -> BrainMode {
        self.mode
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    // ---------------------------------------------------------------------
    // External notifications
    // ---------------------------------------------------------------------

    /// The spawned minion died. Safe to call at any time and idempotent;
    /// the session layer may report the same death more than once.
    pub fn notify_minion_death(&mut self) {
        if self.minion_alive {
            tracing::debug!("minion death reported");
        }
        self.minion_alive = false;
    }

    pub fn minion_alive(&self) -> bool {
        self.minion_alive
    }

    /// Clear the cadence gate so the next tick runs a cycle immediately
    pub fn force_next_cycle(&mut self) {
        self.last_cycle_at = None;
    }

    pub fn record_player_joined(&mut self, name: &str, now: Instant) {
        self.history.record_event(
            EventPayload::PlayerJoined { name: name.into() },
            format!("player {} joined the arena", name),
            EventPriority::Medium,
            self.elapsed(now),
        );
    }

    pub fn record_chat_mention(&mut self, player: &str, text: &str, now: Instant) {
        self.history.record_event(
            EventPayload::ChatMention {
                player: player.into(),
                text: text.into(),
            },
            format!("{} mentioned KORO: {}", player, text),
            EventPriority::Low,
            self.elapsed(now),
        );
    }

    pub fn record_match_status(&mut self, active: bool, now: Instant) {
        let message = if active {
            "match started"
        } else {
            "match ended"
        };
        self.history.record_event(
            EventPayload::MatchStatus { active },
            message,
            EventPriority::High,
            self.elapsed(now),
        );
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn rotation_cursor(&self) -> usize {
        self.rotation.cursor()
    }

    // ---------------------------------------------------------------------
    // The cycle
    // ---------------------------------------------------------------------

    /// Run one decision cycle if it is due.
    ///
    /// At most one cycle is ever in flight; the flag is set before any work
    /// and cleared on every exit path. The await inside (the reasoning call)
    /// is the only suspension point in the engine.
    pub async fn tick(&mut self, world: &mut WorldView<'_>, now: Instant) -> CycleOutcome {
        if !self.caps.processing {
            return CycleOutcome::ProcessingDisabled;
        }
        if self.cycle_in_flight {
            tracing::warn!("tick while a cycle is in flight; ignoring");
            return CycleOutcome::AlreadyRunning;
        }
        if !world.session.is_active() {
            return CycleOutcome::MatchInactive;
        }

        let interval = self
            .config
            .cadence
            .interval_for(self.caps.reasoning, world.overseer.health_percent());
        if let Some(last) = self.last_cycle_at {
            if now.saturating_duration_since(last) < interval {
                return CycleOutcome::NotDue;
            }
        }

        self.cycle_in_flight = true;
        self.phase = CyclePhase::Evaluating;
        let outcome = self.run_cycle(world, now).await;
        self.phase = CyclePhase::Idle;
        self.cycle_in_flight = false;
        outcome
    }

    async fn run_cycle(&mut self, world: &mut WorldView<'_>, now: Instant) -> CycleOutcome {
        // The cycle consumed its cadence slot even if it ends up a no-op
        self.last_cycle_at = Some(now);

        let thermal_ready = self.cooldowns.is_ready(CooldownSlot::Thermal, now);
        let snapshot = match build_snapshot(world, &self.history, thermal_ready) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("snapshot unavailable, skipping cycle: {}", e);
                return CycleOutcome::SnapshotUnavailable;
            }
        };

        let decision = if self.caps.reasoning {
            self.reasoned_decision(&snapshot, now).await
        } else {
            self.scripted_decision(&snapshot, now)
        };

        if decision.action == BossAction::None {
            // Nothing to dispatch, but idle chatter still gets spoken
            if let Some(message) = &decision.message {
                if self.caps.speech {
                    world
                        .speech
                        .announce(message, BossAction::None, snapshot.overseer.health_percent);
                }
            }
            return CycleOutcome::NoAction;
        }

        self.phase = CyclePhase::Dispatching;
        CycleOutcome::Dispatched(self.execute_decision(world, &decision, &snapshot, now))
    }

    /// Scripted path: walk the rotation
    fn scripted_decision(&mut self, snapshot: &GameSnapshot, now: Instant) -> Decision {
        match selector::select_action(
            &mut self.rotation,
            &self.cooldowns,
            snapshot,
            self.minion_alive,
            now,
        ) {
            Some(chosen) => Decision {
                action: chosen.action,
                intensity: chosen.intensity,
                message: None,
                target: None,
                source: DecisionSource::Scripted,
            },
            None => Decision::nothing(DecisionSource::Scripted),
        }
    }

    /// LLM path: delegate to the reasoning service. Never reachable in
    /// Production, whose capability triple pins reasoning off.
    async fn reasoned_decision(&mut self, snapshot: &GameSnapshot, now: Instant) -> Decision {
        let reply = match &self.reasoning_service {
            Some(service) => {
                request_decision(service.as_ref(), snapshot, &self.history.summary()).await
            }
            None => {
                tracing::warn!("reasoning enabled but no service configured");
                BrainReply::none()
            }
        };

        let action = reply.action.to_boss_action();
        self.history.record_response(ResponseRecord {
            message: reply.message.clone(),
            action,
            target: reply.target.clone(),
            at: self.elapsed(now),
        });

        Decision {
            action,
            intensity: reply.intensity,
            message: reply.message,
            target: reply.target,
            source: DecisionSource::Reasoning,
        }
    }

    pub(crate) fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_mode_resets_cooldowns_and_cursor() {
        let mut brain = KoroBrain::new(BrainConfig::default());
        let now = Instant::now();

        brain
            .cooldowns
            .arm(CooldownSlot::Blackout, now + Duration::from_secs(60));
        brain
            .cooldowns
            .arm(CooldownSlot::Thermal, now + Duration::from_secs(60));

        brain.set_mode(BrainMode::DevNoLlm);

        assert!(brain.cooldowns().all_ready(now));
        assert_eq!(brain.rotation_cursor(), 0);
    }

    #[test]
    fn test_production_status_locks_reasoning_and_speech() {
        let mut brain = KoroBrain::new(BrainConfig::default());
        brain.set_mode(BrainMode::Production);

        let status = brain.status();
        assert_eq!(status.mode, BrainMode::Production);
        assert!(status.processing);
        assert!(!status.reasoning);
        assert!(!status.speech);
    }

    #[test]
    fn test_unknown_mode_name_falls_back_to_disabled() {
        let mut brain = KoroBrain::new(BrainConfig::default());
        brain.set_mode(BrainMode::Production);

        let applied = brain.set_mode_by_name("hyperdrive");
        assert_eq!(applied, BrainMode::Disabled);
        assert_eq!(brain.mode(), BrainMode::Disabled);
    }

    #[test]
    fn test_minion_death_is_idempotent() {
        let mut brain = KoroBrain::new(BrainConfig::default());
        assert!(!brain.minion_alive());

        brain.notify_minion_death();
        brain.notify_minion_death();
        assert!(!brain.minion_alive());
    }

    #[test]
    fn test_event_feed_appends_records() {
        let mut brain = KoroBrain::new(BrainConfig::default());
        let now = Instant::now();

        brain.record_player_joined("alice", now);
        brain.record_chat_mention("alice", "koro is watching", now);
        brain.record_match_status(true, now);

        assert_eq!(brain.history().events().len(), 3);
    }

    #[test]
    fn test_new_brain_starts_disabled_and_idle() {
        let brain = KoroBrain::new(BrainConfig::default());
        assert_eq!(brain.mode(), BrainMode::Disabled);
        assert_eq!(brain.phase(), CyclePhase::Idle);
        assert!(!brain.status().processing);
    }
}
