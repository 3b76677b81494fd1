use std::collections::VecDeque;
use std::time::Duration;

use mission_core::{
    Action, CheckpointId, Completion, MissionRuntime, MissionStatus, Phase, Projection, StepId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anything that looks at a running mission and proposes actions for it.
pub trait ActionSource {
    fn next_actions(&mut self, runtime: &MissionRuntime) -> Vec<Action>;
}

/// Feed one round of actions from `source`, then advance the clock by `delta`.
///
/// Once the mission is terminal the clock is left alone, so a driver loop can
/// keep calling this without filling the log with rejections.
pub fn drive(
    runtime: &mut MissionRuntime,
    source: &mut impl ActionSource,
    delta: Duration,
) -> Projection {
    for action in source.next_actions(runtime) {
        runtime.dispatch(action);
    }
    if runtime.state().status.is_terminal() {
        return runtime.projection();
    }
    runtime.tick(delta)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutopilotConfig {
    /// Rounds spent on a manual step before confirming it.
    pub manual_dwell_ticks: u32,
    /// Rounds an open checkpoint is left up before acknowledging it.
    pub checkpoint_dwell_ticks: u32,
    /// Rounds between emitted tool events on a `toolEvent` step.
    pub tool_event_every_ticks: u32,
    pub complete_mission: bool,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            manual_dwell_ticks: 3,
            checkpoint_dwell_ticks: 1,
            tool_event_every_ticks: 2,
            complete_mission: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Step(StepId),
    Checkpoint(CheckpointId),
}

/// Runs a mission headless:
/// 1. Start an idle mission, resume a paused one.
/// 2. Acknowledge an open checkpoint after a short dwell.
/// 3. Complete the mission once it reaches debrief.
/// 4. Otherwise work the active step according to its completion policy.
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    config: AutopilotConfig,
    waiting_on: Option<Target>,
    waited: u32,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            waiting_on: None,
            waited: 0,
        }
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    /// Count consecutive rounds spent on `target`, including this one.
    fn dwell(&mut self, target: Target) -> u32 {
        if self.waiting_on.as_ref() == Some(&target) {
            self.waited += 1;
        } else {
            self.waiting_on = Some(target);
            self.waited = 1;
        }
        self.waited
    }

    fn reset_dwell(&mut self) {
        self.waiting_on = None;
        self.waited = 0;
    }

    fn work_active_step(&mut self, runtime: &MissionRuntime, step_id: &StepId) -> Vec<Action> {
        let Some(step) = runtime.definition().step(step_id) else {
            return Vec::new();
        };
        let ready = runtime
            .state()
            .step(step_id)
            .is_some_and(|step_state| step_state.ready);

        match &step.completion {
            Completion::Manual => {
                if self.dwell(Target::Step(step_id.clone())) < self.config.manual_dwell_ticks {
                    return Vec::new();
                }
                debug!(step = %step_id, "autopilot confirming manual step");
                self.reset_dwell();
                vec![Action::CompleteCurrentStep]
            }
            Completion::Time { .. } if ready => {
                debug!(step = %step_id, "autopilot confirming timed step");
                vec![Action::CompleteCurrentStep]
            }
            Completion::Time { .. } => Vec::new(),
            Completion::ToolEvent { tool_id, name, .. } => {
                let mut actions = Vec::new();
                if !runtime.state().is_tool_open(tool_id) {
                    actions.push(Action::OpenTool {
                        tool_id: tool_id.clone(),
                    });
                }
                let every = self.config.tool_event_every_ticks.max(1);
                if self.dwell(Target::Step(step_id.clone())) >= every {
                    self.reset_dwell();
                    actions.push(Action::ToolEvent {
                        tool_id: tool_id.clone(),
                        name: name.clone(),
                    });
                }
                actions
            }
        }
    }
}

impl ActionSource for Autopilot {
    fn next_actions(&mut self, runtime: &MissionRuntime) -> Vec<Action> {
        let state = runtime.state();
        match state.status {
            MissionStatus::Idle => return vec![Action::Start],
            MissionStatus::Paused => return vec![Action::Resume],
            MissionStatus::Completed | MissionStatus::Aborted => return Vec::new(),
            MissionStatus::Active => {}
        }

        if let Some(open) = &state.checkpoint {
            let dwelt = self.dwell(Target::Checkpoint(open.id.clone()));
            if dwelt < self.config.checkpoint_dwell_ticks {
                return Vec::new();
            }
            debug!(checkpoint = %open.id, "autopilot acknowledging checkpoint");
            self.reset_dwell();
            return vec![Action::AckCheckpoint {
                checkpoint_id: open.id.clone(),
            }];
        }

        if state.phase == Phase::Debrief {
            return if self.config.complete_mission && state.all_steps_done() {
                vec![Action::CompleteMission]
            } else {
                Vec::new()
            };
        }

        match state.active_step_id.clone() {
            Some(step_id) => self.work_active_step(runtime, &step_id),
            None => Vec::new(),
        }
    }
}

/// Replays a fixed list of `(round, action)` pairs; every action whose round
/// has been reached is released on the next call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: VecDeque<(u64, Action)>,
    round: u64,
}

impl ScriptedSource {
    pub fn new(mut script: Vec<(u64, Action)>) -> Self {
        script.sort_by_key(|(round, _)| *round);
        Self {
            script: script.into(),
            round: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl ActionSource for ScriptedSource {
    fn next_actions(&mut self, _runtime: &MissionRuntime) -> Vec<Action> {
        let mut due = Vec::new();
        while self
            .script
            .front()
            .is_some_and(|(round, _)| *round <= self.round)
        {
            if let Some((_, action)) = self.script.pop_front() {
                due.push(action);
            }
        }
        self.round += 1;
        due
    }
}
