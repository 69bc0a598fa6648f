//! Document export — builds the structured document for a completed report.
//!
//! This module decides document *content and structure* only. The binary
//! .docx encoding lives entirely behind the `DocumentWriter` seam; this
//! pipeline never touches the file format itself.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::model::ReportModel;

pub const DOCUMENT_TITLE: &str = "Health and Safety Report";
pub const RISKS_HEADING: &str = "Risks and Mitigations";

const RENDER_PATH: &str = "/v1/render";

/// A block-level element of the exported document, in render order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocBlock {
    Paragraph { text: String },
    Spacer,
    Heading { text: String },
    Table(DocTable),
}

/// Two-column table. The first row is the header and is rendered bold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocTable {
    pub rows: Vec<DocRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocRow {
    pub cells: [String; 2],
    pub bold: bool,
}

/// The complete structure handed to the document renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub title: String,
    pub blocks: Vec<DocBlock>,
}

/// Builds the document structure for a completed report: a title block, one
/// paragraph per narrative line (empty lines become empty paragraphs, which
/// preserves vertical spacing), a spacer, the risks heading, and the
/// two-column risk table led by its bold header row. Table rows follow the
/// report's risk ordering exactly.
pub fn build_document(model: &ReportModel) -> DocumentSpec {
    let mut blocks: Vec<DocBlock> = model
        .narrative
        .split('\n')
        .map(|line| DocBlock::Paragraph {
            text: line.to_string(),
        })
        .collect();

    blocks.push(DocBlock::Spacer);
    blocks.push(DocBlock::Heading {
        text: RISKS_HEADING.to_string(),
    });

    let mut rows = vec![DocRow {
        cells: ["Risk".to_string(), "Mitigation".to_string()],
        bold: true,
    }];
    rows.extend(model.risks.iter().map(|item| DocRow {
        cells: [item.risk.clone(), item.mitigation.clone()],
        bold: false,
    }));
    blocks.push(DocBlock::Table(DocTable { rows }));

    DocumentSpec {
        title: DOCUMENT_TITLE.to_string(),
        blocks,
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Render service error (status {status}): {message}")]
    Renderer { status: u16, message: String },
}

/// The external document-building collaborator: takes the structure above,
/// returns the binary blob. Held in `AppState` as `Arc<dyn DocumentWriter>`
/// so tests can substitute a stub.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn render(&self, spec: &DocumentSpec) -> Result<Bytes, ExportError>;
}

/// Production writer — posts the spec to the configured render service and
/// returns its binary response as-is.
pub struct HttpDocumentWriter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentWriter {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }
}

#[async_trait]
impl DocumentWriter for HttpDocumentWriter {
    async fn render(&self, spec: &DocumentSpec) -> Result<Bytes, ExportError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, RENDER_PATH))
            .json(spec)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExportError::Renderer {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::RiskItem;

    fn model() -> ReportModel {
        ReportModel {
            narrative: "Intro line\n\nFinal line".to_string(),
            risks: vec![
                RiskItem {
                    risk: "fall from height".to_string(),
                    mitigation: "use guard rails".to_string(),
                },
                RiskItem {
                    risk: "dust exposure".to_string(),
                    mitigation: "wear a mask".to_string(),
                },
            ],
        }
    }

    fn paragraphs(spec: &DocumentSpec) -> Vec<&str> {
        spec.blocks
            .iter()
            .filter_map(|b| match b {
                DocBlock::Paragraph { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn table(spec: &DocumentSpec) -> &DocTable {
        spec.blocks
            .iter()
            .find_map(|b| match b {
                DocBlock::Table(t) => Some(t),
                _ => None,
            })
            .expect("document has no table")
    }

    #[test]
    fn test_one_paragraph_per_narrative_line() {
        let spec = build_document(&model());
        // Empty lines survive as empty paragraphs.
        assert_eq!(paragraphs(&spec), vec!["Intro line", "", "Final line"]);
    }

    #[test]
    fn test_table_has_bold_header_and_one_row_per_risk() {
        let spec = build_document(&model());
        let table = table(&spec);

        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[0].bold);
        assert_eq!(table.rows[0].cells, ["Risk", "Mitigation"]);
        assert!(!table.rows[1].bold);
        assert_eq!(table.rows[1].cells, ["fall from height", "use guard rails"]);
        assert_eq!(table.rows[2].cells, ["dust exposure", "wear a mask"]);
    }

    #[test]
    fn test_block_order_is_paragraphs_spacer_heading_table() {
        let spec = build_document(&model());
        assert_eq!(spec.title, DOCUMENT_TITLE);

        let tail = &spec.blocks[spec.blocks.len() - 3..];
        assert_eq!(tail[0], DocBlock::Spacer);
        assert_eq!(
            tail[1],
            DocBlock::Heading {
                text: RISKS_HEADING.to_string()
            }
        );
        assert!(matches!(tail[2], DocBlock::Table(_)));
    }

    #[test]
    fn test_empty_report_still_produces_header_row() {
        let spec = build_document(&ReportModel::default());
        assert_eq!(paragraphs(&spec).len(), 1);
        assert_eq!(table(&spec).rows.len(), 1);
    }
}
