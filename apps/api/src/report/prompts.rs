// All prompt constants for the report pipeline.
// The risks template doubles as the schema contract: the field names it
// states are exactly what the assembler parses out of the response.

/// Narrative prompt template. Replace `{type_of_work}` and `{role}` before sending.
pub const NARRATIVE_PROMPT_TEMPLATE: &str = "Provide a report of all the UK health & safety \
    legislation that applies to {type_of_work}, with detailed advice on how a {role} might \
    safely approach the project, and a comprehensive list of risks likely to be encountered \
    with suggested mitigation strategies. Format the report in markdown.";

/// Risks prompt template. Replace `{type_of_work}` before sending.
pub const RISKS_PROMPT_TEMPLATE: &str = r#"List the most significant health and safety risks likely to be encountered during {type_of_work}, each with a suggested mitigation strategy.

Return ONLY a single JSON object with this EXACT shape:
{
  "risks_and_mitigations": [
    {"risk": "fall from height", "mitigation": "use guard rails"}
  ]
}

Each array element MUST be an object with exactly two string fields named "risk" and "mitigation".
Do NOT include any text outside the JSON object.
Do NOT use markdown code fences.
Do NOT include explanations or apologies."#;

/// Name of the array field the structured response must carry. The assembler
/// looks this up at the top level of the payload.
pub const RISKS_FIELD: &str = "risks_and_mitigations";

/// Builds the narrative prompt. Pure and deterministic; callers guarantee
/// non-empty inputs.
pub fn build_narrative_prompt(type_of_work: &str, role: &str) -> String {
    NARRATIVE_PROMPT_TEMPLATE
        .replace("{type_of_work}", type_of_work)
        .replace("{role}", role)
}

/// Builds the structured-risks prompt. Pure and deterministic.
pub fn build_risks_prompt(type_of_work: &str) -> String {
    RISKS_PROMPT_TEMPLATE.replace("{type_of_work}", type_of_work)
}
