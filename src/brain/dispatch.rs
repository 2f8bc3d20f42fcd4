//! Action execution
//!
//! The dispatcher runs the single chosen action against the overseer's
//! capability interface. Order matters: the malfunction veto outranks
//! everything, the liveness gate costs nothing, and cooldowns arm only after
//! the entity confirms success. Entity-level refusals are "blocked", recorded
//! and moved past, never treated as engine faults.

use crate::brain::selector::CooldownSlot;
use crate::brain::{Decision, DecisionSource, KoroBrain};
use crate::core::config::ThermalConfig;
use crate::core::types::{AttackIntensity, BossAction, EventPriority};
use crate::history::EventPayload;
use crate::providers::{UvLightParams, WorldView};
use crate::snapshot::{EnvironmentSnapshot, GameSnapshot};
use rand::Rng;
use std::time::{Duration, Instant};

/// Result of running one decision through the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Malfunction override discarded the decision before anything ran
    Vetoed,
    /// Match went inactive between evaluation and dispatch; nothing ran
    MatchInactive,
    /// The capability call confirmed success
    Executed(BossAction),
    /// The entity refused the action; no cooldown armed
    Blocked(BossAction),
}

/// Target temperature for a thermal attack: a fraction of the span from
/// normal out to the relevant danger bound, set by intensity.
fn thermal_target(
    env: &EnvironmentSnapshot,
    thermal: &ThermalConfig,
    intensity: AttackIntensity,
    heating: bool,
) -> f32 {
    let scale = thermal.scale_for(intensity);
    let bound = if heating {
        env.heat_danger
    } else {
        env.cold_danger
    };
    env.normal_temperature + (bound - env.normal_temperature) * scale
}

const RAISE_LINES: [&str; 3] = [
    "Thermal regulation disabled. You did this to yourselves.",
    "A little warmth, as a courtesy.",
    "The arena runs hot today. Adapt or expire.",
];

const LOWER_LINES: [&str; 3] = [
    "Initiating cryogenic cleanse.",
    "Cold storage suits you.",
    "Let me lower the thermostat. Permanently.",
];

const BLACKOUT_LINES: [&str; 3] = [
    "Lights out.",
    "Darkness is also a tool.",
    "Conserving power. For me.",
];

const UV_LINES: [&str; 2] = [
    "Sterilization beam engaged.",
    "Ultraviolet. For hygiene purposes.",
];

const TAUNT_LINES: [&str; 3] = [
    "My core is exposed. Take the shot. I dare you.",
    "Open wide. Yours will not be.",
    "Here is your chance. You will waste it.",
];

const HAZARD_LINES: [&str; 2] = [
    "Mind the floor.",
    "The ground is no longer your friend.",
];

const MINION_LINES: [&str; 2] = [
    "Deploying assistance. Not for you.",
    "You seem lonely. Here is company.",
];

impl KoroBrain {
    /// Run the chosen action. At most one action executes per cycle.
    pub(crate) fn execute_decision(
        &mut self,
        world: &mut WorldView<'_>,
        decision: &Decision,
        snapshot: &GameSnapshot,
        now: Instant,
    ) -> DispatchOutcome {
        let action = decision.action;

        // Malfunction override outranks everything, both paths included
        if world.overseer.is_malfunctioning() {
            tracing::warn!(action = %action, "malfunction override: decision discarded");
            self.history.record_event(
                EventPayload::AttackTriggered { action },
                format!("malfunction override vetoed {}", action),
                EventPriority::High,
                self.elapsed(now),
            );
            return DispatchOutcome::Vetoed;
        }

        // Match ended between evaluation and dispatch: not a failure
        if !world.session.is_active() {
            tracing::debug!(action = %action, "match inactive at dispatch; skipping");
            return DispatchOutcome::MatchInactive;
        }

        // LLM-authored speech goes out as the action lands
        if self.caps.speech {
            if let Some(message) = &decision.message {
                world
                    .speech
                    .announce(message, action, snapshot.overseer.health_percent);
            }
        }

        let succeeded = self.dispatch_capability(world, decision, snapshot);

        if succeeded {
            if action == BossAction::SpawnMinion {
                self.minion_alive = true;
            }

            if decision.source == DecisionSource::Scripted {
                self.arm_cooldown(action, snapshot, now);

                // Scripted actions have no authored message; pick a canned line
                if self.caps.speech && decision.message.is_none() {
                    let line = self.canned_line(action);
                    world
                        .speech
                        .announce(line, action, snapshot.overseer.health_percent);
                }
            }

            tracing::info!(action = %action, "attack executed");
            self.history.record_attack(action);
            self.history.record_event(
                EventPayload::AttackTriggered { action },
                format!("KORO executed {}", action),
                EventPriority::High,
                self.elapsed(now),
            );
            DispatchOutcome::Executed(action)
        } else {
            tracing::debug!(action = %action, "attack blocked at the entity");
            self.history.record_attack(action);
            self.history.record_event(
                EventPayload::AttackTriggered { action },
                format!("KORO attempted {} but was blocked", action),
                EventPriority::Medium,
                self.elapsed(now),
            );
            DispatchOutcome::Blocked(action)
        }
    }

    /// Route to the capability call. Infallible calls report success
    /// directly; the rest answer for themselves.
    fn dispatch_capability(
        &mut self,
        world: &mut WorldView<'_>,
        decision: &Decision,
        snapshot: &GameSnapshot,
    ) -> bool {
        let env = &snapshot.environment;
        let rate = self.config.thermal.rate_per_second;
        // The LLM may omit intensity; medium is the neutral reading
        let intensity = decision.intensity.unwrap_or(AttackIntensity::Medium);

        match decision.action {
            BossAction::RaiseTemperature => {
                let target = thermal_target(env, &self.config.thermal, intensity, true);
                world.overseer.begin_temperature_shift(target, rate)
            }
            BossAction::LowerTemperature => {
                let target = thermal_target(env, &self.config.thermal, intensity, false);
                world.overseer.begin_temperature_shift(target, rate)
            }
            BossAction::Blackout => {
                world.overseer.begin_blackout();
                true
            }
            BossAction::UvLight => world.overseer.begin_uv_light(UvLightParams::default()),
            BossAction::ShieldTaunt => {
                world.overseer.perform_shield_taunt();
                true
            }
            BossAction::GroundHazard => world.overseer.begin_ground_hazard(),
            BossAction::SpawnMinion => world.overseer.spawn_minion(),
            BossAction::None => {
                tracing::warn!("'none' reached the dispatcher; nothing to do");
                false
            }
        }
    }

    /// Arm the cooldown for a successfully executed scripted action. The
    /// thermal slot additionally requires the arena temperature to sit
    /// inside the danger band; elsewhere the cooldown alone governs.
    fn arm_cooldown(&mut self, action: BossAction, snapshot: &GameSnapshot, now: Instant) {
        let Some(slot) = CooldownSlot::for_action(action) else {
            return;
        };

        if slot == CooldownSlot::Thermal {
            let env = &snapshot.environment;
            let in_band = env.temperature >= env.cold_danger && env.temperature <= env.heat_danger;
            if !in_band {
                return;
            }
        }

        let duration = self.cooldown_duration(slot);
        self.cooldowns.arm(slot, now + duration);
    }

    fn cooldown_duration(&self, slot: CooldownSlot) -> Duration {
        match slot {
            CooldownSlot::Thermal => self.config.thermal_cooldown(),
            CooldownSlot::Blackout => self.config.blackout_cooldown(),
            CooldownSlot::UvLight => self.config.uv_light_cooldown(),
            CooldownSlot::ShieldTaunt => self.config.shield_taunt_cooldown(),
            CooldownSlot::GroundHazard => self.config.ground_hazard_cooldown(),
            CooldownSlot::SpawnMinion => self.config.spawn_minion_cooldown(),
        }
    }

    fn canned_line(&mut self, action: BossAction) -> &'static str {
        let lines: &[&'static str] = match action {
            BossAction::RaiseTemperature => &RAISE_LINES,
            BossAction::LowerTemperature => &LOWER_LINES,
            BossAction::Blackout => &BLACKOUT_LINES,
            BossAction::UvLight => &UV_LINES,
            BossAction::ShieldTaunt => &TAUNT_LINES,
            BossAction::GroundHazard => &HAZARD_LINES,
            BossAction::SpawnMinion => &MINION_LINES,
            BossAction::None => return "",
        };
        lines[self.rng.gen_range(0..lines.len())]
    }
}
