//! Data model for one report-generation cycle. Everything here is
//! request-scoped: a new cycle starts from `ReportModel::default()` and
//! nothing survives past the response.

use serde::{Deserialize, Serialize};

/// Input to a generation cycle. Both fields are guaranteed non-empty by the
/// HTTP boundary (the same precondition the UI enforces by disabling the
/// submit action) — the prompt builders assume it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub type_of_work: String,
    pub role: String,
}

/// One row of the risk table. Fields default to empty so partially-formed
/// backend records pass through rather than failing the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskItem {
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub mitigation: String,
}

/// The assembled report. `narrative` stays empty until the narrative call
/// succeeds; `risks` stays empty until the structured call yields a
/// well-formed payload. Read-only to every consumer after assembly, and the
/// backend's risk ordering is the display ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportModel {
    pub narrative: String,
    pub risks: Vec<RiskItem>,
}

impl ReportModel {
    /// The on-screen representation. The narrative is already markdown and
    /// passes through untouched; the risk table is rendered by the view
    /// layer, not concatenated here.
    pub fn display_markdown(&self) -> &str {
        &self.narrative
    }
}
