//! Report assembly — orchestrates the two generation calls and owns the
//! partial-failure policy.
//!
//! Flow: build prompts → narrative call → risks call → Done.
//!
//! The failure policy is asymmetric and is the contract of this module:
//! a narrative failure aborts the whole cycle and leaves the report empty,
//! while a risks failure (or a payload missing the expected array field)
//! degrades to an empty risk table with the narrative intact.

use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::llm_client::{BackendError, LlmClient};
use crate::report::model::{ReportModel, ReportRequest, RiskItem};
use crate::report::prompts::{build_narrative_prompt, build_risks_prompt, RISKS_FIELD};

/// Which of the two generation calls an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCall {
    Narrative,
    Risks,
}

/// A failed generation call, tagged with the call it belongs to. Only
/// `Narrative` failures escape the assembler; `Risks` failures are absorbed.
#[derive(Debug, Error)]
#[error("{call:?} generation call failed: {source}")]
pub struct GenerationError {
    pub call: ReportCall,
    #[source]
    pub source: BackendError,
}

/// Progress of a generation cycle, published on a watch channel so any
/// observer can follow it. Dropping the receiver unsubscribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPhase {
    #[default]
    Idle,
    NarrativeInFlight,
    RisksInFlight,
    Done,
    Failed,
}

/// Orchestrates one report-generation cycle over the shared `LlmClient`.
/// The two calls run sequentially; narrative failure aborts before the risks
/// call is issued.
pub struct ReportAssembler {
    llm: LlmClient,
    phase: watch::Sender<ReportPhase>,
}

impl ReportAssembler {
    pub fn new(llm: LlmClient) -> Self {
        let (phase, _) = watch::channel(ReportPhase::Idle);
        Self { llm, phase }
    }

    /// Subscribes to phase transitions for this assembler's cycle.
    pub fn subscribe(&self) -> watch::Receiver<ReportPhase> {
        self.phase.subscribe()
    }

    /// The current phase.
    pub fn phase(&self) -> ReportPhase {
        *self.phase.borrow()
    }

    /// Runs one full generation cycle. Any previously assembled report is
    /// discarded before the first call is issued.
    pub async fn assemble(&self, request: &ReportRequest) -> Result<ReportModel, GenerationError> {
        let mut model = ReportModel::default();

        info!(
            "Generating report: type_of_work={:?} role={:?}",
            request.type_of_work, request.role
        );
        self.phase.send_replace(ReportPhase::NarrativeInFlight);

        let narrative_prompt = build_narrative_prompt(&request.type_of_work, &request.role);
        match self.llm.generate_text(&narrative_prompt).await {
            Ok(narrative) => model.narrative = narrative,
            Err(source) => {
                // Fatal: with no narrative there is nothing to show.
                self.phase.send_replace(ReportPhase::Failed);
                return Err(GenerationError {
                    call: ReportCall::Narrative,
                    source,
                });
            }
        }

        self.phase.send_replace(ReportPhase::RisksInFlight);

        let risks_prompt = build_risks_prompt(&request.type_of_work);
        match self.llm.generate_structured(&risks_prompt).await {
            Ok(payload) => model.risks = extract_risks(&payload),
            Err(source) => {
                // Non-fatal: the narrative stands on its own.
                let err = GenerationError {
                    call: ReportCall::Risks,
                    source,
                };
                warn!("{err}; continuing without risk table");
            }
        }

        self.phase.send_replace(ReportPhase::Done);
        info!(
            "Report assembled: {} narrative chars, {} risks",
            model.narrative.len(),
            model.risks.len()
        );
        Ok(model)
    }
}

/// Pulls the risk list out of a structured payload, preserving backend order.
/// A payload without the expected array field (or whose rows do not
/// deserialize) yields an empty list and a diagnostic — never an error.
fn extract_risks(payload: &Value) -> Vec<RiskItem> {
    let Some(field) = payload.get(RISKS_FIELD) else {
        warn!("Structured response is missing the {RISKS_FIELD:?} field, leaving risk table empty");
        return Vec::new();
    };

    match serde_json::from_value::<Vec<RiskItem>>(field.clone()) {
        Ok(risks) => risks,
        Err(e) => {
            warn!("Could not read {RISKS_FIELD:?} entries, leaving risk table empty: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ReportRequest {
        ReportRequest {
            type_of_work: "roof repair".to_string(),
            role: "site supervisor".to_string(),
        }
    }

    fn assembler_for(server: &MockServer) -> ReportAssembler {
        ReportAssembler::new(LlmClient::new(server.uri(), "test_key".to_string()))
    }

    async fn mount_narrative(server: &MockServer, body: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(body_partial_json(json!({"response_type": "text"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": body})))
            .mount(server)
            .await;
    }

    async fn mount_risks(server: &MockServer, result: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(body_partial_json(json!({"response_type": "json"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": result})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_both_calls_succeed() {
        let server = MockServer::start().await;
        mount_narrative(&server, "## Report\n\nWork at height is regulated.").await;
        mount_risks(
            &server,
            json!({"risks_and_mitigations": [
                {"risk": "fall from height", "mitigation": "use guard rails"}
            ]}),
        )
        .await;

        let assembler = assembler_for(&server);
        let model = assembler.assemble(&request()).await.unwrap();

        assert!(model.narrative.contains("Work at height"));
        assert_eq!(
            model.risks,
            vec![RiskItem {
                risk: "fall from height".to_string(),
                mitigation: "use guard rails".to_string(),
            }]
        );
        assert_eq!(assembler.phase(), ReportPhase::Done);
    }

    #[tokio::test]
    async fn test_narrative_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let assembler = assembler_for(&server);
        let err = assembler.assemble(&request()).await.unwrap_err();

        assert_eq!(err.call, ReportCall::Narrative);
        assert_eq!(assembler.phase(), ReportPhase::Failed);
    }

    #[tokio::test]
    async fn test_risks_failure_degrades_to_empty_table() {
        let server = MockServer::start().await;
        mount_narrative(&server, "Scaffolding must be inspected weekly.").await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(body_partial_json(json!({"response_type": "json"})))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let assembler = assembler_for(&server);
        let model = assembler.assemble(&request()).await.unwrap();

        assert!(!model.narrative.is_empty());
        assert!(model.risks.is_empty());
        assert_eq!(assembler.phase(), ReportPhase::Done);
    }

    #[tokio::test]
    async fn test_missing_risks_field_degrades_silently() {
        let server = MockServer::start().await;
        mount_narrative(&server, "Scaffolding must be inspected weekly.").await;
        mount_risks(&server, json!({})).await;

        let assembler = assembler_for(&server);
        let model = assembler.assemble(&request()).await.unwrap();

        assert!(!model.narrative.is_empty());
        assert!(model.risks.is_empty());
        assert_eq!(assembler.phase(), ReportPhase::Done);
    }

    #[tokio::test]
    async fn test_risk_rows_missing_a_field_pass_through_as_empty() {
        let server = MockServer::start().await;
        mount_narrative(&server, "Report body.").await;
        mount_risks(
            &server,
            json!({"risks_and_mitigations": [
                {"risk": "dust exposure"},
                {"mitigation": "wear gloves"}
            ]}),
        )
        .await;

        let assembler = assembler_for(&server);
        let model = assembler.assemble(&request()).await.unwrap();

        assert_eq!(model.risks.len(), 2);
        assert_eq!(model.risks[0].risk, "dust exposure");
        assert_eq!(model.risks[0].mitigation, "");
        assert_eq!(model.risks[1].risk, "");
        assert_eq!(model.risks[1].mitigation, "wear gloves");
    }

    #[tokio::test]
    async fn test_phase_transitions_are_observable() {
        let server = MockServer::start().await;
        mount_narrative(&server, "Report body.").await;
        mount_risks(&server, json!({"risks_and_mitigations": []})).await;

        let assembler = assembler_for(&server);
        let mut rx = assembler.subscribe();

        let observer = tokio::spawn(async move {
            let mut seen = vec![*rx.borrow()];
            while rx.changed().await.is_ok() {
                let phase = *rx.borrow();
                seen.push(phase);
                if matches!(phase, ReportPhase::Done | ReportPhase::Failed) {
                    break;
                }
            }
            seen
        });

        assembler.assemble(&request()).await.unwrap();
        let seen = observer.await.unwrap();

        assert_eq!(
            seen,
            vec![
                ReportPhase::Idle,
                ReportPhase::NarrativeInFlight,
                ReportPhase::RisksInFlight,
                ReportPhase::Done,
            ]
        );
    }

    #[test]
    fn test_extract_risks_preserves_backend_order() {
        let payload = json!({"risks_and_mitigations": [
            {"risk": "b", "mitigation": "2"},
            {"risk": "a", "mitigation": "1"},
            {"risk": "c", "mitigation": "3"}
        ]});
        let risks = extract_risks(&payload);
        let order: Vec<&str> = risks.iter().map(|r| r.risk.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
