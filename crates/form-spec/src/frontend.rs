use serde_json::Value;

use crate::render::{StepPayload, render_html, render_json_ui, render_text};

/// Abstraction over UI frontends that render the same step payload into
/// different transports.
pub trait FormFrontend {
    fn render_text_ui(&self, payload: &StepPayload) -> String;
    fn render_json_ui(&self, payload: &StepPayload) -> Value;
    fn render_html_ui(&self, payload: &StepPayload) -> String;
}

/// Default frontend implementation that reuses the existing renderer
/// functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFormFrontend;

impl FormFrontend for DefaultFormFrontend {
    fn render_text_ui(&self, payload: &StepPayload) -> String {
        render_text(payload)
    }

    fn render_json_ui(&self, payload: &StepPayload) -> Value {
        render_json_ui(payload)
    }

    fn render_html_ui(&self, payload: &StepPayload) -> String {
        render_html(payload)
    }
}
