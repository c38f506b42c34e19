//! headless: runs one delivery session from JSON inputs without a UI.
//!
//! ```text
//! cargo run -p headless -- [DATA_DIR] [OUTPUT_DIR]
//! ```
//!
//! `DATA_DIR` (default `demos/headless/data`) holds:
//!
//! | File          | Required | Contents                                 |
//! |---------------|----------|------------------------------------------|
//! | `map.json`    | yes      | grid, legend and goal                    |
//! | `jobs.json`   | one of   | job records                              |
//! | `jobs.csv`    | one of   | job records, flat columns                |
//! | `weather.json`| no       | city, initial condition, Markov rows     |
//! | `config.json` | no       | partial `SessionConfig`                  |
//!
//! The player is driven by a small scripted controller; the AI uses the
//! configured difficulty.  Per-tick CSVs land in `OUTPUT_DIR`, together
//! with `scores.json` and a final `snapshot.json`.

mod player;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use cq_core::AgentId;
use cq_jobs::{JobRecord, StaticJobSource, load_jobs_csv, load_jobs_json};
use cq_map::load_map_json;
use cq_output::{CsvWriter, ScoreBoard, ScoreRecord, SessionOutputObserver};
use cq_sim::{SessionBuilder, SessionConfig};
use cq_weather::{WeatherConfig, load_weather_json};

use player::ScriptedPlayer;

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_DATA_DIR:   &str = "demos/headless/data";
const DEFAULT_OUTPUT_DIR: &str = "output/headless";

// ── Input loading ─────────────────────────────────────────────────────────────

fn load_config(dir: &Path) -> Result<SessionConfig> {
    let path = dir.join("config.json");
    if !path.exists() {
        tracing::info!("no config.json, using defaults");
        return Ok(SessionConfig::default());
    }
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_jobs(dir: &Path) -> Result<Vec<JobRecord>> {
    let json = dir.join("jobs.json");
    if json.exists() {
        return load_jobs_json(&json).with_context(|| format!("loading {}", json.display()));
    }
    let csv = dir.join("jobs.csv");
    load_jobs_csv(&csv).with_context(|| format!("loading {}", csv.display()))
}

fn load_weather(dir: &Path) -> Result<WeatherConfig> {
    let path = dir.join("weather.json");
    if !path.exists() {
        tracing::info!("no weather.json, weather stays at its initial condition");
        return Ok(WeatherConfig::default());
    }
    load_weather_json(&path).with_context(|| format!("loading {}", path.display()))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_DATA_DIR.into()));
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into()));

    // 1. Inputs.
    let config = load_config(&data_dir)?;
    let map_path = data_dir.join("map.json");
    let map = load_map_json(&map_path).with_context(|| format!("loading {}", map_path.display()))?;
    let jobs = load_jobs(&data_dir)?;
    let weather = load_weather(&data_dir)?;
    println!(
        "Map {}x{}  |  goal {:.0}  |  {} jobs  |  difficulty {}  |  seed {}",
        map.width(),
        map.height(),
        map.goal(),
        jobs.len(),
        u8::from(config.difficulty),
        config.seed,
    );

    // 2. Session.
    let mut session = SessionBuilder::new(config, map)
        .job_source(StaticJobSource::new(jobs))
        .weather(weather)
        .build()
        .context("building session")?;

    // 3. Output.
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let mut obs = SessionOutputObserver::new(CsvWriter::new(&out_dir)?);

    // 4. Run: player commands first, then one tick.
    let player = ScriptedPlayer::new();
    let t0 = Instant::now();
    while !session.is_over() {
        player.act(&mut session)?;
        session.step(&mut obs)?;
    }
    let elapsed = t0.elapsed();
    obs.finish()?;
    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!();
    println!(
        "Session over after {} ticks ({:.3} s wall): {}",
        session.current_tick().0,
        elapsed.as_secs_f64(),
        session.status(),
    );
    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>10} {:>6}",
        "Agent", "Income", "Penalties", "Bonus", "Total", "Rep"
    );
    println!("{}", "-".repeat(60));
    for agent in AgentId::ALL {
        let b = session.score(agent).breakdown();
        println!(
            "{:<8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>6}",
            agent.as_str(),
            b.base_income,
            b.penalty_total,
            b.time_bonus,
            b.total_points(),
            session.courier(agent).reputation(),
        );
    }

    // 6. Score board and final snapshot.
    let mut board = ScoreBoard::open(out_dir.join("scores.json"))?;
    let now = Utc::now();
    for agent in AgentId::ALL {
        board.append(ScoreRecord::from_session(&session, agent, agent.as_str(), now))?;
    }
    println!();
    println!("Top scores:");
    for (rank, rec) in board.top(5).iter().enumerate() {
        println!("  {}. {:<8} {:>10.2}  {}", rank + 1, rec.name, rec.total, rec.outcome);
    }

    let snapshot_path = out_dir.join("snapshot.json");
    let snapshot = serde_json::to_string_pretty(&session.snapshot())?;
    std::fs::write(&snapshot_path, snapshot).with_context(|| format!("writing {}", snapshot_path.display()))?;
    tracing::info!(path = %snapshot_path.display(), "snapshot written");

    Ok(())
}
