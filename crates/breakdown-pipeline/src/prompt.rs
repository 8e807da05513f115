//! Prompt composition for requirement breakdowns

use breakdown_domain::{ModelParameters, PromptSpec, RequirementText};

/// System instruction sent with every breakdown request
pub const SYSTEM_INSTRUCTION: &str = r#"You are a senior agile product-manager assistant.
Break the requirement text supplied by the user into a structured backlog.

Respond with a JSON array of objects. Each object must have exactly these string keys:
- "epic": the epic the story belongs to
- "story": one user story in "As a ___, I want ___ so that ___" form
- "ac": the acceptance criteria for that story
- "category": a short category such as "security", "ux" or "performance"
- "notes": leave this as an empty string

Produce one object per user story. Several stories may share an epic.
Return ONLY the JSON array: no markdown code blocks, no explanations."#;

/// Build the prompt for a requirement.
///
/// Pure: the same text and parameters always yield an identical spec. The
/// requirement is sent verbatim and is never truncated.
pub fn compose(requirement: &RequirementText, parameters: ModelParameters) -> PromptSpec {
    PromptSpec::new(SYSTEM_INSTRUCTION, requirement.as_str(), parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_content_is_verbatim() {
        let text = RequirementText::new("  As a user\nI want to log in &amp; out  ");
        let spec = compose(&text, ModelParameters::default());
        assert_eq!(spec.user_content(), "  As a user\nI want to log in &amp; out  ");
    }

    #[test]
    fn test_compose_is_deterministic() {
        let text = RequirementText::new("As a user I want to log in");
        let first = compose(&text, ModelParameters::default());
        let second = compose(&text, ModelParameters::default());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_instruction_names_every_key() {
        let spec = compose(&RequirementText::new("x"), ModelParameters::default());
        for key in ["\"epic\"", "\"story\"", "\"ac\"", "\"category\"", "\"notes\""] {
            assert!(spec.system_instruction().contains(key), "missing {}", key);
        }
        assert!(spec.system_instruction().contains("senior agile product-manager assistant"));
        assert!(spec.system_instruction().contains("JSON array"));
    }

    #[test]
    fn test_parameters_are_passed_through() {
        let parameters = ModelParameters {
            temperature: 0.6,
            max_tokens: 2048,
            top_p: 1.0,
        };
        let spec = compose(&RequirementText::new("x"), parameters);
        assert_eq!(spec.parameters(), parameters);
    }

    #[test]
    fn test_long_text_not_truncated() {
        let text = RequirementText::new("requirement ".repeat(50_000));
        let spec = compose(&text, ModelParameters::default());
        assert_eq!(spec.user_content().len(), text.len());
    }
}
