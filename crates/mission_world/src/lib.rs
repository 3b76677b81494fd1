//! Mission loading and run assembly shared by `missionctl` and tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use mission_core::{
    generate_run_id, LayoutDescriptor, LogEntry, MissionDefinition, MissionId, MissionRuntime,
    Registry, Rejection, RuntimeState, ToolDescriptor, ValidatedDefinition,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    tools: Vec<ToolDescriptor>,
    #[serde(default)]
    layouts: Vec<LayoutDescriptor>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Load and validate a mission definition file.
pub fn load_definition(path: impl AsRef<Path>) -> Result<ValidatedDefinition> {
    let path = path.as_ref();
    let definition: MissionDefinition = read_json(path)?;
    let validated = definition
        .validate()
        .with_context(|| format!("validating {}", path.display()))?;
    info!(
        mission = %validated.id,
        version = %validated.version,
        steps = validated.steps.len(),
        tools = validated.tools.len(),
        "mission definition loaded"
    );
    Ok(validated)
}

pub fn load_registry(path: impl AsRef<Path>) -> Result<Registry> {
    let file: RegistryFile = read_json(path.as_ref())?;
    Ok(Registry::new(file.tools, file.layouts))
}

/// Report every id the definition references that the registry lacks.
///
/// Mismatches are logged, never fatal: the runtime still rejects opening an
/// unregistered tool when the registry is attached.
pub fn cross_check(definition: &MissionDefinition, registry: &Registry) -> Vec<Rejection> {
    let problems = registry.check(definition);
    for problem in &problems {
        warn!(mission = %definition.id, %problem, "registry mismatch");
    }
    problems
}

/// Fresh runtime whose run id comes from `seed`, so a seeded run can be
/// replayed under the same id.
pub fn build_runtime(
    definition: ValidatedDefinition,
    registry: Option<Registry>,
    seed: u64,
) -> MissionRuntime {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let run_id = generate_run_id(&mut rng);
    if let Some(registry) = &registry {
        cross_check(&definition, registry);
    }
    let runtime = MissionRuntime::new(definition, run_id);
    match registry {
        Some(registry) => runtime.with_registry(Arc::new(registry)),
        None => runtime,
    }
}

/// `YYYYMMDD_HHMMSS_<mission>_seed<seed>` in UTC, used for run directories.
pub fn generate_run_label(mission: &MissionId, seed: u64) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{timestamp}_{mission}_seed{seed}")
}

pub fn create_run_dir(base: impl AsRef<Path>, label: &str) -> Result<PathBuf> {
    let dir = base.as_ref().join(label);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

pub fn load_event_log(path: impl AsRef<Path>) -> Result<Vec<LogEntry>> {
    read_json(path.as_ref())
}

pub fn load_state(path: impl AsRef<Path>) -> Result<RuntimeState> {
    read_json(path.as_ref())
}

pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<()> {
    let path = path.as_ref();
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
