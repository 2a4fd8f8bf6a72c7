use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Templates compiled into the binary, by file name
const EMBEDDED: &[(&str, &str)] = &[
    ("coach.md", include_str!("prompts/coach.md")),
    ("dashboard.md", include_str!("prompts/dashboard.md")),
    ("analyst.md", include_str!("prompts/analyst.md")),
];

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    tera.render("inline_template", &context)
}

/// Render one of the embedded templates
pub fn load_prompt_file<T: Serialize>(name: &str, context_data: &T) -> Result<String, TeraError> {
    let template = EMBEDDED
        .iter()
        .find(|(file, _)| *file == name)
        .map(|(_, content)| *content)
        .ok_or_else(|| TeraError::msg(format!("Unknown prompt template: {}", name)))?;
    load_prompt(template, context_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let mut context = HashMap::new();
        context.insert("home", "Inter");
        context.insert("away", "AC Milan");

        let result = load_prompt("{{ home }} vs {{ away }}", &context).unwrap();
        assert_eq!(result, "Inter vs AC Milan");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let mut context = HashMap::new();
        context.insert("home", "Inter");
        assert!(load_prompt("{{ home }} vs {{ away }}", &context).is_err());
    }

    #[test]
    fn test_load_prompt_loop_and_condition() {
        let template = "{% for t in teams %}{{ t }};{% endfor %}{% if note %}!{% endif %}";
        let result = load_prompt(template, &json!({"teams": ["Roma", "Lazio"], "note": null})).unwrap();
        assert_eq!(result, "Roma;Lazio;");
    }

    #[test]
    fn test_unknown_embedded_template() {
        assert!(load_prompt_file("missing.md", &json!({})).is_err());
    }
}
