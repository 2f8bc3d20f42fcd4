//! Scripted attack selection
//!
//! The deterministic path walks a fixed attack rotation: one sweep per cycle,
//! at most one candidate per position, cursor always advancing. A candidate on
//! cooldown or failing its precondition is skipped this cycle and comes back
//! around naturally; nothing is ever starved because the cursor never stalls.

use crate::core::types::{AttackIntensity, BossAction};
use crate::snapshot::GameSnapshot;
use std::time::Instant;

/// The independently tracked cooldown groups. Both temperature attacks share
/// the Thermal slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownSlot {
    Thermal,
    Blackout,
    UvLight,
    ShieldTaunt,
    GroundHazard,
    SpawnMinion,
}

impl CooldownSlot {
    pub const COUNT: usize = 6;

    pub const ALL: [CooldownSlot; Self::COUNT] = [
        Self::Thermal,
        Self::Blackout,
        Self::UvLight,
        Self::ShieldTaunt,
        Self::GroundHazard,
        Self::SpawnMinion,
    ];

    fn index(self) -> usize {
        match self {
            Self::Thermal => 0,
            Self::Blackout => 1,
            Self::UvLight => 2,
            Self::ShieldTaunt => 3,
            Self::GroundHazard => 4,
            Self::SpawnMinion => 5,
        }
    }

    /// Cooldown group for an action; None for `BossAction::None`.
    pub fn for_action(action: BossAction) -> Option<Self> {
        match action {
            BossAction::RaiseTemperature | BossAction::LowerTemperature => Some(Self::Thermal),
            BossAction::Blackout => Some(Self::Blackout),
            BossAction::UvLight => Some(Self::UvLight),
            BossAction::ShieldTaunt => Some(Self::ShieldTaunt),
            BossAction::GroundHazard => Some(Self::GroundHazard),
            BossAction::SpawnMinion => Some(Self::SpawnMinion),
            BossAction::None => None,
        }
    }
}

/// Ready-at timestamps per slot. `None` means ready now.
///
/// A slot is armed only after its action executes successfully; selection
/// never arms anything.
#[derive(Debug, Clone, Default)]
pub struct Cooldowns {
    ready_at: [Option<Instant>; CooldownSlot::COUNT],
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self, slot: CooldownSlot, now: Instant) -> bool {
        match self.ready_at[slot.index()] {
            None => true,
            Some(ready_at) => now >= ready_at,
        }
    }

    pub fn arm(&mut self, slot: CooldownSlot, ready_at: Instant) {
        self.ready_at[slot.index()] = Some(ready_at);
    }

    pub fn ready_at(&self, slot: CooldownSlot) -> Option<Instant> {
        self.ready_at[slot.index()]
    }

    /// Every slot back to ready-now. Runs on every mode change.
    pub fn reset_all(&mut self) {
        self.ready_at = [None; CooldownSlot::COUNT];
    }

    pub fn all_ready(&self, now: Instant) -> bool {
        CooldownSlot::ALL.iter().all(|&slot| self.is_ready(slot, now))
    }
}

/// The fixed, ordered attack sequence plus its wrap-around cursor
#[derive(Debug, Clone)]
pub struct AttackRotation {
    sequence: Vec<BossAction>,
    cursor: usize,
}

impl AttackRotation {
    /// Build a rotation from an explicit sequence. `None` entries are not
    /// meaningful in a rotation and are dropped with a warning.
    pub fn new(sequence: Vec<BossAction>) -> Self {
        let sequence: Vec<_> = sequence
            .into_iter()
            .filter(|&a| {
                if a == BossAction::None {
                    tracing::warn!("dropping 'none' entry from attack rotation");
                    false
                } else {
                    true
                }
            })
            .collect();
        Self {
            sequence,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Back to the first position. Runs on every mode change.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl Default for AttackRotation {
    fn default() -> Self {
        Self::new(vec![
            BossAction::RaiseTemperature,
            BossAction::Blackout,
            BossAction::ShieldTaunt,
            BossAction::LowerTemperature,
            BossAction::UvLight,
            BossAction::GroundHazard,
            BossAction::SpawnMinion,
        ])
    }
}

/// The scripted path's pick for this cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChosenAction {
    pub action: BossAction,
    pub intensity: Option<AttackIntensity>,
}

fn is_eligible(
    candidate: BossAction,
    cooldowns: &Cooldowns,
    snapshot: &GameSnapshot,
    minion_alive: bool,
    now: Instant,
) -> bool {
    match candidate {
        BossAction::RaiseTemperature | BossAction::LowerTemperature => {
            snapshot.environment.thermal_attack_ready
        }
        BossAction::Blackout => cooldowns.is_ready(CooldownSlot::Blackout, now),
        BossAction::UvLight => cooldowns.is_ready(CooldownSlot::UvLight, now),
        BossAction::ShieldTaunt => cooldowns.is_ready(CooldownSlot::ShieldTaunt, now),
        BossAction::GroundHazard => cooldowns.is_ready(CooldownSlot::GroundHazard, now),
        BossAction::SpawnMinion => {
            !minion_alive && cooldowns.is_ready(CooldownSlot::SpawnMinion, now)
        }
        BossAction::None => {
            tracing::warn!("'none' candidate reached the rotation; skipping");
            false
        }
    }
}

/// One sweep over the rotation starting at the cursor.
///
/// Each evaluated candidate advances the cursor by exactly one position,
/// selected or not, so a skipped attack resumes from the next position on the
/// following cycle and no candidate is considered twice in one sweep. Returns
/// None if nothing in the full sweep is eligible.
pub fn select_action(
    rotation: &mut AttackRotation,
    cooldowns: &Cooldowns,
    snapshot: &GameSnapshot,
    minion_alive: bool,
    now: Instant,
) -> Option<ChosenAction> {
    let len = rotation.len();
    if len == 0 {
        return None;
    }

    for _ in 0..len {
        let candidate = rotation.sequence[rotation.cursor];
        rotation.cursor = (rotation.cursor + 1) % len;

        if is_eligible(candidate, cooldowns, snapshot, minion_alive, now) {
            let intensity = candidate
                .is_thermal()
                .then(|| AttackIntensity::from_health_percent(snapshot.overseer.health_percent));
            return Some(ChosenAction {
                action: candidate,
                intensity,
            });
        }

        tracing::debug!(action = %candidate, "rotation candidate skipped");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{EnvironmentSnapshot, GameSnapshot, OverseerSnapshot};
    use std::time::Duration;

    fn snapshot(health: f32, thermal_ready: bool) -> GameSnapshot {
        GameSnapshot {
            overseer: OverseerSnapshot {
                health_percent: health,
                internal_temperature: 50.0,
                normal_temperature: 60.0,
                critical_temperature: 95.0,
                shield_open: false,
            },
            environment: EnvironmentSnapshot {
                temperature: 20.0,
                normal_temperature: 20.0,
                cold_danger: 0.0,
                heat_danger: 40.0,
                healthpack_count: 0,
                thermal_attack_ready: thermal_ready,
            },
            players: vec![],
            recent_events: vec![],
            recent_responses: vec![],
            recent_attacks: vec![],
        }
    }

    #[test]
    fn test_healthy_boss_picks_low_intensity_thermal() {
        let mut rotation = AttackRotation::new(vec![
            BossAction::RaiseTemperature,
            BossAction::ShieldTaunt,
        ]);
        let cooldowns = Cooldowns::new();
        let now = Instant::now();

        let chosen = select_action(&mut rotation, &cooldowns, &snapshot(85.0, true), false, now)
            .expect("thermal should be eligible");

        assert_eq!(chosen.action, BossAction::RaiseTemperature);
        assert_eq!(chosen.intensity, Some(AttackIntensity::Low));
        assert_eq!(rotation.cursor(), 1);
    }

    #[test]
    fn test_thermal_skipped_when_not_ready() {
        let mut rotation = AttackRotation::new(vec![
            BossAction::RaiseTemperature,
            BossAction::ShieldTaunt,
        ]);
        let cooldowns = Cooldowns::new();
        let now = Instant::now();

        let chosen = select_action(&mut rotation, &cooldowns, &snapshot(85.0, false), false, now)
            .expect("taunt should be eligible");

        assert_eq!(chosen.action, BossAction::ShieldTaunt);
        // Both positions were evaluated: skip, then select, wrapping to 0
        assert_eq!(rotation.cursor(), 0);
    }

    #[test]
    fn test_full_sweep_with_nothing_eligible() {
        let mut rotation = AttackRotation::new(vec![
            BossAction::Blackout,
            BossAction::UvLight,
            BossAction::GroundHazard,
        ]);
        let mut cooldowns = Cooldowns::new();
        let now = Instant::now();
        let later = now + Duration::from_secs(60);

        for slot in [
            CooldownSlot::Blackout,
            CooldownSlot::UvLight,
            CooldownSlot::GroundHazard,
        ] {
            cooldowns.arm(slot, later);
        }

        let chosen = select_action(&mut rotation, &cooldowns, &snapshot(50.0, false), false, now);
        assert!(chosen.is_none());
        // Full sweep wrapped back to the start
        assert_eq!(rotation.cursor(), 0);
    }

    #[test]
    fn test_minion_alive_skips_spawn_even_when_cooldown_ready() {
        let mut rotation =
            AttackRotation::new(vec![BossAction::SpawnMinion, BossAction::ShieldTaunt]);
        let cooldowns = Cooldowns::new();
        let now = Instant::now();

        let chosen = select_action(&mut rotation, &cooldowns, &snapshot(50.0, false), true, now)
            .expect("taunt should be eligible");

        assert_eq!(chosen.action, BossAction::ShieldTaunt);
        assert_eq!(rotation.cursor(), 0);
    }

    #[test]
    fn test_spawn_minion_eligible_when_no_minion() {
        let mut rotation = AttackRotation::new(vec![BossAction::SpawnMinion]);
        let cooldowns = Cooldowns::new();
        let now = Instant::now();

        let chosen = select_action(&mut rotation, &cooldowns, &snapshot(50.0, false), false, now)
            .expect("spawn should be eligible");
        assert_eq!(chosen.action, BossAction::SpawnMinion);
        assert_eq!(chosen.intensity, None);
    }

    #[test]
    fn test_skipped_candidate_resumes_next_cycle() {
        let mut rotation = AttackRotation::new(vec![
            BossAction::RaiseTemperature,
            BossAction::ShieldTaunt,
            BossAction::Blackout,
        ]);
        let cooldowns = Cooldowns::new();
        let now = Instant::now();

        // First cycle: thermal not ready, taunt selected; cursor rests at 2
        let first = select_action(&mut rotation, &cooldowns, &snapshot(50.0, false), false, now)
            .expect("taunt");
        assert_eq!(first.action, BossAction::ShieldTaunt);
        assert_eq!(rotation.cursor(), 2);

        // Next cycle starts at blackout, not back at the skipped thermal
        let second = select_action(&mut rotation, &cooldowns, &snapshot(50.0, false), false, now)
            .expect("blackout");
        assert_eq!(second.action, BossAction::Blackout);
    }

    #[test]
    fn test_cooldown_arm_blocks_until_elapsed() {
        let mut cooldowns = Cooldowns::new();
        let now = Instant::now();
        let ready = now + Duration::from_secs(30);

        cooldowns.arm(CooldownSlot::Blackout, ready);
        assert!(!cooldowns.is_ready(CooldownSlot::Blackout, now));
        assert!(!cooldowns.is_ready(
            CooldownSlot::Blackout,
            now + Duration::from_secs(29)
        ));
        assert!(cooldowns.is_ready(CooldownSlot::Blackout, ready));
    }

    #[test]
    fn test_reset_all_restores_ready_now() {
        let mut cooldowns = Cooldowns::new();
        let now = Instant::now();
        let later = now + Duration::from_secs(300);

        for slot in CooldownSlot::ALL {
            cooldowns.arm(slot, later);
        }
        assert!(!cooldowns.all_ready(now));

        cooldowns.reset_all();
        assert!(cooldowns.all_ready(now));
    }

    #[test]
    fn test_empty_rotation_selects_nothing() {
        let mut rotation = AttackRotation::new(vec![]);
        let cooldowns = Cooldowns::new();
        let chosen = select_action(
            &mut rotation,
            &cooldowns,
            &snapshot(50.0, true),
            false,
            Instant::now(),
        );
        assert!(chosen.is_none());
    }

    #[test]
    fn test_none_entries_dropped_from_rotation() {
        let rotation = AttackRotation::new(vec![
            BossAction::None,
            BossAction::Blackout,
            BossAction::None,
        ]);
        assert_eq!(rotation.len(), 1);
    }
}
