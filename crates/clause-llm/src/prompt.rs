//! Prompt construction for clause classification

use clause_domain::traits::ClassifyRequest;
use clause_domain::{TaxonomyEntry, OTHER_LABEL};

const INSTRUCTIONS: &str = "You extract contract clause mentions from collective bargaining agreement text.
Only use clause labels from the allowed list below. Use OTHER only when no listed clause applies.
Copy extraction_text verbatim from the TEXT section; never quote the context sections.";

const OUTPUT_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"hits": [{"clause_label": "<label>", "extraction_text": "<exact span from TEXT>", "start_pos": <int>, "end_pos": <int>}]}
start_pos and end_pos are optional byte offsets into TEXT. Return {"hits": []} if nothing applies."#;

/// Build the system prompt listing the allowed labels
pub fn system_prompt(allowed_labels: &[TaxonomyEntry]) -> String {
    let mut prompt = String::new();
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\nAllowed clauses:\n");

    for entry in allowed_labels.iter().filter(|e| !e.is_other()) {
        if entry.tldr.trim().is_empty() {
            prompt.push_str(&format!("- {}\n", entry.name));
        } else {
            prompt.push_str(&format!("- {}: {}\n", entry.name, entry.tldr.trim()));
        }
    }
    prompt.push_str(&format!("- {}: use only when no listed clause applies.\n\n", OTHER_LABEL));
    prompt.push_str(OUTPUT_FORMAT);

    prompt
}

/// Build the user message: context sections around the text to classify
pub fn user_message(request: &ClassifyRequest<'_>) -> String {
    let mut message = String::new();

    if !request.left_context.trim().is_empty() {
        message.push_str("CONTEXT BEFORE (do not extract):\n---\n");
        message.push_str(request.left_context);
        message.push_str("\n---\n\n");
    }

    message.push_str("TEXT:\n---\n");
    message.push_str(request.chunk_text);
    message.push_str("\n---\n");

    if !request.right_context.trim().is_empty() {
        message.push_str("\nCONTEXT AFTER (do not extract):\n---\n");
        message.push_str(request.right_context);
        message.push_str("\n---\n");
    }

    message
}
