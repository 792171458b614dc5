use chrono::{SecondsFormat, Utc};
use clap::Parser;
use pacman_hunt_engine::constants::{RELEASE_ORDER, TICK_RATE};
use pacman_hunt_engine::engine::GameEngine;
use pacman_hunt_engine::error::EngineError;
use pacman_hunt_engine::level::{EngineConfig, LevelTable};
use pacman_hunt_engine::types::{GhostState, RuntimeEvent, Snapshot, Tile};
use pacman_hunt_engine::world::{Maze, WorldQuery};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Ticks after a round starts at which each ghost in `RELEASE_ORDER` may leave.
const RELEASE_DELAYS: [u64; 4] = [0, 60, 240, 480];
const BONUS_TILE: Tile = Tile::new(13, 20);
const BONUS_FOOD_EATEN: [u32; 2] = [70, 170];
const BONUS_TICKS: u64 = TICK_RATE as u64 * 19 / 2;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 3)]
    levels: u32,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_ticks: u64,
    #[arg(long)]
    level_table: Option<PathBuf>,
    #[arg(long)]
    no_overflow_bug: bool,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct LevelResultLine {
    level: u32,
    seed: u32,
    completed: bool,
    ticks: u64,
    #[serde(rename = "foodEaten")]
    food_eaten: u32,
    #[serde(rename = "energizersEaten")]
    energizers_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    deaths: u32,
    #[serde(rename = "phaseChanges")]
    phase_changes: u32,
    #[serde(rename = "maxCruiseElroy")]
    max_cruise_elroy: i8,
    #[serde(rename = "bonusesEaten")]
    bonuses_eaten: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct LevelRunResult {
    #[serde(flatten)]
    result: LevelResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "levelCount")]
    level_count: usize,
    #[serde(rename = "completedLevels")]
    completed_levels: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "totalDeaths")]
    total_deaths: u32,
    levels: Vec<LevelResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "gameLevel")]
    game_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Watches consecutive snapshots for behaviour the arcade rules forbid.
#[derive(Debug, Default)]
struct AnomalyTracker {
    previous: Option<Snapshot>,
    reverse_allowed: [bool; 4],
    max_elroy: i8,
}

impl AnomalyTracker {
    fn new_round(&mut self) {
        self.previous = None;
        self.reverse_allowed = [false; 4];
    }

    fn observe(&mut self, snapshot: &Snapshot) -> Vec<String> {
        let mut anomalies = Vec::new();

        if let Some(previous) = self.previous.as_ref() {
            for event in &snapshot.events {
                let turn_around = match event {
                    RuntimeEvent::HuntingPhaseChanged { .. } => true,
                    RuntimeEvent::FoodEaten { energizer, .. } => *energizer,
                    _ => false,
                };
                if !turn_around {
                    continue;
                }
                for ghost in &previous.ghosts {
                    if ghost.state == GhostState::Hunting {
                        self.reverse_allowed[ghost.role.index()] = true;
                    }
                }
            }

            for (before, after) in previous.ghosts.iter().zip(snapshot.ghosts.iter()) {
                let reversed = before.state == GhostState::Hunting
                    && after.state == GhostState::Hunting
                    && after.tile != before.tile
                    && after.dir == before.dir.opposite();
                if !reversed {
                    continue;
                }
                let allowed = &mut self.reverse_allowed[after.role.index()];
                if *allowed {
                    *allowed = false;
                } else {
                    anomalies.push(format!(
                        "{:?} reversed without a phase change",
                        after.role
                    ));
                }
            }
        }

        let elroy = snapshot.cruise_elroy.abs();
        if elroy < self.max_elroy {
            anomalies.push(format!(
                "cruise elroy decreased from {} to {}",
                self.max_elroy, elroy
            ));
        }
        self.max_elroy = self.max_elroy.max(elroy);

        for ghost in &snapshot.ghosts {
            let frightened = ghost.state == GhostState::Frightened;
            if frightened == ghost.target_tile.is_some() {
                anomalies.push(format!(
                    "{:?} target tile inconsistent with state {:?}",
                    ghost.role, ghost.state
                ));
            }
        }

        self.previous = Some(snapshot.clone());
        anomalies
    }
}

fn main() {
    let cli = Cli::parse();
    let started_at = timestamp();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, Utc::now().timestamp_millis()));

    let levels = match load_level_table(cli.level_table.as_deref()) {
        Ok(levels) => levels,
        Err(error) => {
            emit_log(
                "error",
                "level_table_load_failed",
                &run_id,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let config = EngineConfig {
        simulate_overflow_bug: !cli.no_overflow_bug,
        autopilot: true,
        rng_seed: seed,
    };
    let mut engine = GameEngine::new(Maze::arcade(), levels, config, 1);
    let mut has_anomaly = false;
    let mut results = Vec::new();
    let mut total_anomalies = 0usize;

    for level in 1..=cli.levels.max(1) {
        engine.start_level(level);
        emit_log(
            "info",
            "level_started",
            &run_id,
            Some(level),
            None,
            json!({
                "seed": seed,
                "foodLeft": engine.world().uneaten_food_count(),
                "elroy1DotsLeft": engine.level_data().elroy1_dots_left,
                "elroy2DotsLeft": engine.level_data().elroy2_dots_left,
                "powerTicks": engine.level_data().power_ticks(),
            }),
        );

        let run = run_level(&mut engine, level, seed, cli.max_ticks);
        for anomaly in &run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(level),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += run.anomaly_records.len();

        emit_log(
            "info",
            "level_finished",
            &run_id,
            Some(level),
            Some(run.result.ticks),
            json!({
                "completed": run.result.completed,
                "deaths": run.result.deaths,
                "ghostsEaten": run.result.ghosts_eaten,
                "anomalyCount": run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&run.result).expect("level result should serialize")
        );
        let completed = run.result.completed;
        results.push(run.result);
        if !completed {
            break;
        }
    }

    let summary = build_run_summary(run_id.clone(), started_at, timestamp(), results, total_anomalies);

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        json!({
            "levelCount": summary.level_count,
            "completedLevels": summary.completed_levels,
            "anomalyCount": summary.anomaly_count,
            "totalDeaths": summary.total_deaths,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_level(engine: &mut GameEngine, level: u32, seed: u32, max_ticks: u64) -> LevelRunResult {
    let total_food = engine.world().total_food();
    let mut tracker = AnomalyTracker::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();

    let mut ticks = 0u64;
    let mut round_ticks = 0u64;
    let mut bonus_until: Option<u64> = None;
    let mut bonuses_spawned = 0usize;
    let mut food_eaten = 0;
    let mut energizers_eaten = 0;
    let mut ghosts_eaten = 0;
    let mut deaths = 0;
    let mut phase_changes = 0;
    let mut bonuses_eaten = 0;

    while !engine.is_level_complete() {
        release_due_ghosts(engine, round_ticks);
        engine.step();
        ticks += 1;
        round_ticks += 1;

        let snapshot = engine.build_snapshot(true);
        for message in tracker.observe(&snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                ticks,
                message,
            );
        }

        for event in &snapshot.events {
            match event {
                RuntimeEvent::FoodEaten { energizer, .. } => {
                    food_eaten += 1;
                    if *energizer {
                        energizers_eaten += 1;
                    }
                }
                RuntimeEvent::GhostEaten { .. } => ghosts_eaten += 1,
                RuntimeEvent::HuntingPhaseChanged { .. } => phase_changes += 1,
                RuntimeEvent::BonusEaten { .. } => {
                    bonuses_eaten += 1;
                    bonus_until = None;
                }
                _ => {}
            }
        }

        let eaten_so_far = total_food.saturating_sub(snapshot.food_left);
        if bonuses_spawned < BONUS_FOOD_EATEN.len() && eaten_so_far >= BONUS_FOOD_EATEN[bonuses_spawned] {
            bonuses_spawned += 1;
            engine.set_bonus(Some(BONUS_TILE));
            bonus_until = Some(ticks + BONUS_TICKS);
        }
        if bonus_until.is_some_and(|until| ticks >= until) {
            engine.set_bonus(None);
            bonus_until = None;
        }

        if engine.is_pac_dead() {
            deaths += 1;
            engine.reset_round();
            tracker.new_round();
            round_ticks = 0;
        }

        if ticks >= max_ticks {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                ticks,
                "tick limit exceeded".to_string(),
            );
            break;
        }
    }

    LevelRunResult {
        result: LevelResultLine {
            level,
            seed,
            completed: engine.is_level_complete(),
            ticks,
            food_eaten,
            energizers_eaten,
            ghosts_eaten,
            deaths,
            phase_changes,
            max_cruise_elroy: tracker.max_elroy,
            bonuses_eaten,
            anomalies,
        },
        anomaly_records,
    }
}

/// Stand-in for the arcade's dot-counter release gate: fixed delays per
/// round, and revived ghosts go straight back out.
fn release_due_ghosts(engine: &mut GameEngine, round_ticks: u64) {
    for (role, delay) in RELEASE_ORDER.iter().zip(RELEASE_DELAYS) {
        if round_ticks >= delay && engine.ghost(*role).state == GhostState::Locked {
            engine.release_ghost(*role);
        }
    }
}

fn load_level_table(path: Option<&Path>) -> Result<LevelTable, EngineError> {
    match path {
        Some(path) => LevelTable::from_file(path),
        None => Ok(LevelTable::arcade()),
    }
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at: String,
    finished_at: String,
    levels: Vec<LevelResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    RunSummary {
        run_id,
        started_at,
        finished_at,
        level_count: levels.len(),
        completed_levels: levels.iter().filter(|level| level.completed).count(),
        anomaly_count,
        total_deaths: levels.iter().map(|level| level.deaths).sum(),
        levels,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    game_level: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: timestamp(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        game_level,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
