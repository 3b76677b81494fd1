use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mission_control::{drive, Autopilot, AutopilotConfig};
use mission_core::{replay, MissionEvent, MissionRuntime, Projection, Registry, StepStatus};
use mission_world::{
    build_runtime, create_run_dir, cross_check, generate_run_label, load_definition,
    load_event_log, load_registry, load_state, write_json,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "missionctl", about = "Mission runtime CLI")]
struct Cli {
    /// Log filter (e.g. `debug`, `mission_core=debug`). Defaults to RUST_LOG, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a mission definition.
    Validate {
        #[arg(long)]
        definition: PathBuf,
        #[arg(long)]
        registry: Option<PathBuf>,
        /// Treat registry mismatches as errors.
        #[arg(long)]
        strict: bool,
    },
    /// Run a mission headless under the autopilot.
    Run {
        #[arg(long)]
        definition: PathBuf,
        #[arg(long)]
        registry: Option<PathBuf>,
        /// Seed for the run id. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Upper bound on driver rounds.
        #[arg(long, default_value_t = 10_000)]
        ticks: u64,
        /// Mission time advanced per round.
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
        #[arg(long, default_value_t = 60)]
        print_every: u64,
        /// JSON file with autopilot tuning.
        #[arg(long)]
        autopilot: Option<PathBuf>,
        #[arg(long, default_value = "runs")]
        out_dir: PathBuf,
        /// Skip writing the run directory.
        #[arg(long)]
        no_output: bool,
    },
    /// Re-dispatch a recorded run and check it reproduces the saved state.
    Replay {
        #[arg(long)]
        definition: PathBuf,
        #[arg(long)]
        registry: Option<PathBuf>,
        /// Directory written by `run`.
        #[arg(long)]
        run_dir: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn load_optional_registry(path: Option<&Path>) -> Result<Option<Registry>> {
    path.map(load_registry).transpose()
}

fn validate(definition: &Path, registry: Option<&Path>, strict: bool) -> Result<()> {
    let definition = load_definition(definition)?;
    println!(
        "{} v{} \"{}\": {} steps, {} tools, {} checkpoints, ~{} min, {} XP",
        definition.id,
        definition.version,
        definition.title,
        definition.steps.len(),
        definition.tools.len(),
        definition.checkpoints.len(),
        definition.estimated_duration_minutes,
        definition.reward_xp,
    );

    if let Some(registry) = load_optional_registry(registry)? {
        let problems = cross_check(&definition, &registry);
        for problem in &problems {
            println!("  registry: {problem}");
        }
        if strict && !problems.is_empty() {
            bail!("{} registry mismatch(es)", problems.len());
        }
    }
    println!("OK");
    Ok(())
}

fn write_run_info(
    dir: &Path,
    label: &str,
    runtime: &MissionRuntime,
    seed: u64,
    ticks: u64,
    tick_ms: u64,
    config: &AutopilotConfig,
) -> Result<()> {
    let definition = runtime.definition();
    let info = serde_json::json!({
        "label": label,
        "run_id": runtime.run_id(),
        "seed": seed,
        "mission_id": definition.id,
        "mission_version": definition.version,
        "runner": "missionctl",
        "args": {
            "ticks": ticks,
            "tick_ms": tick_ms,
        },
        "autopilot": config,
    });
    write_json(dir.join("run_info.json"), &info)
}

#[allow(clippy::too_many_arguments)]
fn run(
    definition: &Path,
    registry: Option<&Path>,
    seed: Option<u64>,
    ticks: u64,
    tick_ms: u64,
    print_every: u64,
    autopilot: Option<&Path>,
    out_dir: &Path,
    no_output: bool,
) -> Result<()> {
    let definition = load_definition(definition)?;
    let registry = load_optional_registry(registry)?;
    let config: AutopilotConfig = match autopilot {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading autopilot config: {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing autopilot config: {}", path.display()))?
        }
        None => AutopilotConfig::default(),
    };

    let seed = seed.unwrap_or_else(rand::random);
    let mut runtime = build_runtime(definition, registry, seed);
    let mut autopilot = Autopilot::new(config.clone());
    let delta = Duration::from_millis(tick_ms);
    let print_every = print_every.max(1);

    println!(
        "Starting mission: {} run_id={} seed={seed} steps={} tick_ms={tick_ms}",
        runtime.definition().id,
        runtime.run_id(),
        runtime.definition().steps.len(),
    );
    println!("{}", "-".repeat(80));

    let mut rounds = 0;
    for round in 1..=ticks {
        let seen = runtime.event_log().len();
        let projection = drive(&mut runtime, &mut autopilot, delta);
        rounds = round;

        // Notable events print regardless of print_every.
        for entry in &runtime.event_log()[seen..] {
            for effect in &entry.effects {
                print_notable(entry.at_ms, effect);
            }
        }

        if round % print_every == 0 {
            print_status(&projection);
        }
        if projection.status.is_terminal() {
            break;
        }
    }

    let projection = runtime.projection();
    println!("{}", "-".repeat(80));
    println!("Done after {rounds} rounds. Final state:");
    print_status(&projection);
    info!(
        run_id = %runtime.run_id(),
        status = %projection.status,
        entries = runtime.event_log().len(),
        "run finished"
    );

    if !no_output {
        let label = generate_run_label(&runtime.definition().id, seed);
        let dir = create_run_dir(out_dir, &label)?;
        write_run_info(&dir, &label, &runtime, seed, ticks, tick_ms, &config)?;
        write_json(dir.join("event_log.json"), &runtime.event_log())?;
        write_json(dir.join("final_state.json"), runtime.state())?;
        println!("Run directory: {}", dir.display());
    }
    Ok(())
}

fn replay_run(definition: &Path, registry: Option<&Path>, run_dir: &Path) -> Result<()> {
    let definition = load_definition(definition)?;
    let registry = load_optional_registry(registry)?;
    let saved = load_state(run_dir.join("final_state.json"))?;
    let log = load_event_log(run_dir.join("event_log.json"))?;

    let rebuilt = replay(&definition, registry.as_ref(), saved.run_id.clone(), &log)
        .with_context(|| format!("replaying {}", run_dir.display()))?;
    if rebuilt != saved {
        bail!("replayed state differs from final_state.json");
    }
    println!(
        "Replayed {} entries for {}: state matches ({})",
        log.len(),
        saved.run_id,
        saved.status,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_notable(at_ms: u64, effect: &MissionEvent) {
    let at = at_ms / 1000;
    match effect {
        MissionEvent::CheckpointOpened { checkpoint_id } => {
            println!("*** CHECKPOINT {checkpoint_id} opened at t={at:04}s ***");
        }
        MissionEvent::StepStatusChanged {
            step_id,
            to: to @ (StepStatus::Completed | StepStatus::Skipped),
            ..
        } => {
            println!("*** STEP {step_id} {to} at t={at:04}s ***");
        }
        MissionEvent::StatusChanged { to, .. } if to.is_terminal() => {
            println!("*** MISSION {to} at t={at:04}s ***");
        }
        _ => {}
    }
}

fn print_status(projection: &Projection) {
    let secs = projection.elapsed_secs();
    let step = projection
        .active_step_id
        .as_ref()
        .map_or("-", |id| id.as_str());
    let tool = projection
        .active_tool_id
        .as_ref()
        .map_or("-", |id| id.as_str());
    let checkpoint = projection
        .checkpoint
        .as_ref()
        .map_or("-", |id| id.as_str());

    println!(
        "[t={min:02}:{sec:02}  {status:9}  phase={phase:10}]  \
         step={step:12}  steps={done}/{total}  tool={tool:10}  checkpoint={checkpoint}",
        min = secs / 60,
        sec = secs % 60,
        status = projection.status.to_string(),
        phase = projection.phase.to_string(),
        done = projection.completed_steps,
        total = projection.total_steps,
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    match cli.command {
        Commands::Validate {
            definition,
            registry,
            strict,
        } => validate(&definition, registry.as_deref(), strict)?,
        Commands::Run {
            definition,
            registry,
            seed,
            ticks,
            tick_ms,
            print_every,
            autopilot,
            out_dir,
            no_output,
        } => run(
            &definition,
            registry.as_deref(),
            seed,
            ticks,
            tick_ms,
            print_every,
            autopilot.as_deref(),
            &out_dir,
            no_output,
        )?,
        Commands::Replay {
            definition,
            registry,
            run_dir,
        } => replay_run(&definition, registry.as_deref(), &run_dir)?,
    }
    Ok(())
}
