//! Step completion evaluation.
//!
//! Pure: the result depends only on the step, its current state, and the
//! signal. Time arrives as a tick delta; the evaluator never reads a clock.

use crate::{Completion, Step, StepState, StepStatus, ToolId};

/// Input the evaluator reacts to.
#[derive(Debug, Clone, Copy)]
pub enum StepSignal<'a> {
    Tick { delta_ms: u64 },
    ToolEvent { tool_id: &'a ToolId, name: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Signal did not concern this step.
    Ignored,
    /// Timer advanced without crossing anything.
    Progressed,
    /// A matching tool event was counted; carries the new count.
    Counted(u32),
    /// Timed step reached its duration and now waits for confirmation.
    Ready,
    /// Step is satisfied; the returned state is `Completed`.
    Satisfied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub state: StepState,
    pub verdict: Verdict,
}

/// Evaluate `signal` against the active step. Non-active steps are returned
/// unchanged with `Verdict::Ignored`.
pub fn evaluate(step: &Step, step_state: &StepState, signal: StepSignal<'_>) -> Evaluation {
    let mut next = step_state.clone();
    if step_state.status != StepStatus::Active {
        return Evaluation {
            state: next,
            verdict: Verdict::Ignored,
        };
    }

    let verdict = match (signal, &step.completion) {
        (
            StepSignal::Tick { delta_ms },
            Completion::Time {
                seconds,
                auto_advance,
            },
        ) => {
            next.elapsed_ms = next.elapsed_ms.saturating_add(delta_ms);
            let reached = next.elapsed_ms >= seconds.saturating_mul(1000);
            if !reached {
                Verdict::Progressed
            } else if *auto_advance {
                next.status = StepStatus::Completed;
                next.ready = false;
                Verdict::Satisfied
            } else if next.ready {
                Verdict::Progressed
            } else {
                next.ready = true;
                Verdict::Ready
            }
        }
        // Other kinds still track time on step for display.
        (StepSignal::Tick { delta_ms }, Completion::Manual | Completion::ToolEvent { .. }) => {
            next.elapsed_ms = next.elapsed_ms.saturating_add(delta_ms);
            Verdict::Progressed
        }
        (
            StepSignal::ToolEvent { tool_id, name },
            Completion::ToolEvent {
                tool_id: expected_tool,
                name: expected_name,
                count,
            },
        ) if tool_id == expected_tool && name == expected_name.as_str() => {
            let counter = next.event_counts.entry(name.to_string()).or_insert(0);
            *counter = counter.saturating_add(1);
            if *counter >= *count {
                next.status = StepStatus::Completed;
                Verdict::Satisfied
            } else {
                Verdict::Counted(*counter)
            }
        }
        (StepSignal::ToolEvent { .. }, _) => Verdict::Ignored,
    };

    Evaluation {
        state: next,
        verdict,
    }
}
