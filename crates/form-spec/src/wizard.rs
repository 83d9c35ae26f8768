use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Serializable wizard position; crosses the embedding boundary when the host
/// page owns the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub current_step: usize,
    pub step_count: usize,
}

impl WizardState {
    pub fn new(step_count: usize) -> Self {
        Self { current_step: 0, step_count: step_count.max(1) }
    }
}

type StepHook = Box<dyn FnMut(usize)>;

/// Finite-state machine over step indices `0..step_count`. Host-owned and
/// renderer-owned instances run these exact transition rules; renderers never
/// assume which mode is active. The final index is the review step, but that
/// is a renderer interpretation, not a controller state.
///
/// Scrolling the render surface to the top on a transition is the caller's
/// job; the controller only reports that the step changed.
pub struct WizardController {
    state: WizardState,
    on_step_change: Option<StepHook>,
}

impl WizardController {
    pub fn new(step_count: usize) -> Self {
        Self { state: WizardState::new(step_count), on_step_change: None }
    }

    /// Restores host-held state, clamping the step into range in case the
    /// step list changed since the state was captured.
    pub fn from_state(state: WizardState) -> Self {
        let step_count = state.step_count.max(1);
        Self {
            state: WizardState {
                current_step: state.current_step.min(step_count - 1),
                step_count,
            },
            on_step_change: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn step_count(&self) -> usize {
        self.state.step_count
    }

    pub fn is_final_step(&self) -> bool {
        self.state.current_step + 1 == self.state.step_count
    }

    /// The `onWizardStepChange` boundary: fires on every effective change,
    /// whatever the origin.
    pub fn on_step_change(&mut self, hook: impl FnMut(usize) + 'static) {
        self.on_step_change = Some(Box::new(hook));
    }

    pub fn next(&mut self) -> bool {
        let target = (self.state.current_step + 1).min(self.state.step_count - 1);
        self.apply(target)
    }

    pub fn previous(&mut self) -> bool {
        let target = self.state.current_step.saturating_sub(1);
        self.apply(target)
    }

    pub fn jump_to(&mut self, step: i64) -> bool {
        let target = step.clamp(0, self.state.step_count as i64 - 1) as usize;
        self.apply(target)
    }

    pub fn reset(&mut self) -> bool {
        self.apply(0)
    }

    /// Mid-session step-list change (template switch): adopt the new count
    /// and clamp the current step into range instead of rejecting it.
    pub fn set_step_count(&mut self, step_count: usize) -> bool {
        self.state.step_count = step_count.max(1);
        let target = self.state.current_step.min(self.state.step_count - 1);
        self.apply(target)
    }

    fn apply(&mut self, target: usize) -> bool {
        if target == self.state.current_step {
            return false;
        }
        self.state.current_step = target;
        if let Some(hook) = &mut self.on_step_change {
            hook(target);
        }
        true
    }
}

impl fmt::Debug for WizardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("state", &self.state)
            .field("hooked", &self.on_step_change.is_some())
            .finish()
    }
}
