//! Share encoding — flattens a report into percent-encoded text and builds
//! the outbound channel URIs.
//!
//! The encoded text is embedded in URI query/body components, so every
//! structurally significant character (newlines, `&`, `?`, `#`) must be
//! escaped; `urlencoding::encode` leaves only unreserved characters raw.

use serde::Deserialize;

use crate::report::model::ReportModel;

const SHARE_HEADER: &str = "Health and Safety Report";
const RISKS_SECTION: &str = "Risks and Mitigations";

/// Fixed mail subject, pre-encoded ("Health and Safety Report").
const MAIL_SUBJECT: &str = "Health%20and%20Safety%20Report";

/// Outbound share channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareChannel {
    Email,
    Messaging,
}

/// Flattens the report into plain text — the fixed header, the narrative,
/// then a risks section with one `Risk:`/`Mitigation:` line pair per item —
/// and percent-encodes the whole result. Decoding the output reproduces the
/// concatenation exactly.
pub fn to_share_text(model: &ReportModel) -> String {
    let mut text = String::new();
    text.push_str(SHARE_HEADER);
    text.push_str("\n\n");
    text.push_str(model.display_markdown());
    text.push_str("\n\n");
    text.push_str(RISKS_SECTION);
    text.push('\n');
    for item in &model.risks {
        text.push_str("Risk: ");
        text.push_str(&item.risk);
        text.push('\n');
        text.push_str("Mitigation: ");
        text.push_str(&item.mitigation);
        text.push('\n');
    }
    urlencoding::encode(&text).into_owned()
}

/// Builds the channel-specific URI around already-encoded share text.
/// Handing the URI to the platform is the whole contract — there is no
/// delivery confirmation.
pub fn share_uri(channel: ShareChannel, encoded_text: &str) -> String {
    match channel {
        ShareChannel::Email => format!("mailto:?subject={MAIL_SUBJECT}&body={encoded_text}"),
        ShareChannel::Messaging => format!("https://wa.me/?text={encoded_text}"),
    }
}
