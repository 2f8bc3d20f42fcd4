//! KORO Brain - dev driver
//!
//! Interactive harness that wires stub collaborators to the brain and drives
//! decision cycles by hand. Useful for watching the rotation, cooldowns, and
//! LLM fallback behave without booting the full game server.

use koro_brain::brain::{CycleOutcome, KoroBrain};
use koro_brain::core::config::BrainConfig;
use koro_brain::core::error::Result;
use koro_brain::core::types::{BossAction, PlayerId};
use koro_brain::llm::client::LlmClient;
use koro_brain::providers::{
    EnvironmentProbe, MatchSession, OverseerInterface, PlayerInfo, PlayerRoster, SpeechSink,
    UvLightParams, WorldView,
};

use std::io::{self, Write};
use std::time::Instant;
use tokio::runtime::Runtime;

struct SimOverseer {
    health: f32,
    malfunctioning: bool,
}

impl OverseerInterface for SimOverseer {
    fn health_percent(&self) -> f32 {
        self.health
    }
    fn internal_temperature(&self) -> f32 {
        55.0
    }
    fn temperature_limits(&self) -> (f32, f32) {
        (60.0, 95.0)
    }
    fn shield_open(&self) -> bool {
        false
    }
    fn is_malfunctioning(&self) -> bool {
        self.malfunctioning
    }
    fn begin_temperature_shift(&mut self, target: f32, rate: f32) -> bool {
        println!("[overseer] temperature shift -> {:.1} at {:.1}/s", target, rate);
        true
    }
    fn begin_blackout(&mut self) {
        println!("[overseer] blackout");
    }
    fn begin_uv_light(&mut self, params: UvLightParams) -> bool {
        println!(
            "[overseer] uv light for {:.0}s at {:.0}/s",
            params.duration_secs, params.sample_rate
        );
        true
    }
    fn perform_shield_taunt(&mut self) {
        println!("[overseer] shield taunt");
    }
    fn begin_ground_hazard(&mut self) -> bool {
        println!("[overseer] ground hazard");
        true
    }
    fn spawn_minion(&mut self) -> bool {
        println!("[overseer] minion spawned");
        true
    }
}

struct SimEnvironment;

impl EnvironmentProbe for SimEnvironment {
    fn current_temperature(&self) -> f32 {
        20.0
    }
    fn normal_temperature(&self) -> f32 {
        20.0
    }
    fn danger_bounds(&self) -> (f32, f32) {
        (0.0, 40.0)
    }
    fn healthpack_count(&self) -> u32 {
        2
    }
}

struct SimRoster {
    players: Vec<PlayerInfo>,
}

impl PlayerRoster for SimRoster {
    fn players(&self) -> Vec<PlayerInfo> {
        self.players.clone()
    }
}

struct SimSession {
    active: bool,
}

impl MatchSession for SimSession {
    fn is_active(&self) -> bool {
        self.active
    }
}

struct ConsoleSpeech;

impl SpeechSink for ConsoleSpeech {
    fn announce(&mut self, message: &str, action: BossAction, health: f32) {
        println!("[koro says | {} | hp {:.0}] {}", action, health, message);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("koro_brain=debug")
        .init();

    tracing::info!("KORO brain driver starting...");

    let rt = Runtime::new()?;

    let mut brain = KoroBrain::new(BrainConfig::default());
    match LlmClient::from_env() {
        Ok(client) => {
            brain = brain.with_reasoning_service(Box::new(client));
        }
        Err(_) => {
            tracing::warn!("KORO_LLM_API_KEY not set - dev-with-llm mode will fall back to no-op");
        }
    }
    brain.set_mode_by_name("dev");

    let mut overseer = SimOverseer {
        health: 100.0,
        malfunctioning: false,
    };
    let environment = SimEnvironment;
    let mut roster = SimRoster { players: vec![] };
    let mut session = SimSession { active: true };
    let mut speech = ConsoleSpeech;

    println!("\n=== KORO BRAIN DRIVER ===");
    println!("Commands:");
    println!("  tick / t         - Force one decision cycle");
    println!("  run <n>          - Force n cycles");
    println!("  mode <name>      - disabled | dev | dev-with-llm | prod");
    println!("  status / s       - Show mode and capability flags");
    println!("  join <name>      - Add a player");
    println!("  damage <n>       - Reduce overseer health");
    println!("  malfunction      - Toggle malfunction state");
    println!("  minion-died      - Report minion death");
    println!("  match <on|off>   - Toggle match active");
    println!("  quit / q         - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();
        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or("");
        let arg = parts.next().unwrap_or("");

        match command {
            "quit" | "q" => break,
            "tick" | "t" | "run" => {
                let count: u32 = if command == "run" {
                    arg.parse().unwrap_or(1)
                } else {
                    1
                };
                for _ in 0..count {
                    brain.force_next_cycle();
                    let outcome = {
                        let mut world = WorldView {
                            overseer: &mut overseer,
                            environment: &environment,
                            roster: &roster,
                            session: &session,
                            speech: &mut speech,
                        };
                        rt.block_on(brain.tick(&mut world, Instant::now()))
                    };
                    println!("cycle: {:?}", outcome);
                    if let CycleOutcome::Dispatched(_) = outcome {
                        println!("recent attacks: {:?}", brain.history().attack_names());
                    }
                }
            }
            "mode" => {
                let applied = brain.set_mode_by_name(arg);
                println!("mode now {}", applied);
            }
            "status" | "s" => {
                let status = brain.status();
                println!(
                    "mode={} processing={} reasoning={} speech={} minion_alive={}",
                    status.mode,
                    status.processing,
                    status.reasoning,
                    status.speech,
                    brain.minion_alive()
                );
            }
            "join" => {
                let name = if arg.is_empty() { "player" } else { arg };
                roster.players.push(PlayerInfo {
                    id: PlayerId::new(),
                    name: name.to_string(),
                    health_percent: 100.0,
                });
                brain.record_player_joined(name, Instant::now());
                println!("{} joined ({} players)", name, roster.players.len());
            }
            "damage" => {
                let amount: f32 = arg.parse().unwrap_or(10.0);
                overseer.health = (overseer.health - amount).max(0.0);
                println!("overseer health now {:.0}", overseer.health);
            }
            "malfunction" => {
                overseer.malfunctioning = !overseer.malfunctioning;
                println!("malfunctioning = {}", overseer.malfunctioning);
            }
            "minion-died" => {
                brain.notify_minion_death();
                println!("minion death reported");
            }
            "match" => {
                session.active = arg != "off";
                brain.record_match_status(session.active, Instant::now());
                println!("match active = {}", session.active);
            }
            "" => {}
            other => println!("unknown command: {}", other),
        }
    }

    tracing::info!("KORO brain driver exiting");
    Ok(())
}
