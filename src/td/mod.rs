// Thing Description construction

mod forms;
mod template;

pub use forms::{attach_forms, Form};
pub use template::{render, Bindings, TemplateError};

use crate::config::ThingConfig;
use serde_json::Value;

/// Load a thing model template from disk
pub fn load_template(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let template: Value = serde_json::from_str(&contents)?;
    Ok(template)
}

/// Produce the final Thing Description from a loaded template.
///
/// Renders the placeholder bindings, then attaches the protocol forms.
/// The result is built once at startup and shared read-only afterwards.
pub fn build_description(template: &Value, config: &ThingConfig) -> Result<Value, TemplateError> {
    let bindings = Bindings::from_config(config);
    let mut td = template::render(template, &bindings)?;
    forms::attach_forms(&mut td)?;
    Ok(td)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn test_template() -> Value {
        json!({
            "title": "{{THING_NAME}}",
            "base": "{{PROTOCOL}}://{{HOSTNAME}}:{{PORT_NUMBER}}/{{THING_NAME}}",
            "links": [
                { "rel": "collection", "href": "{{PROPERTIES}}" },
                { "rel": "collection", "href": "{{ACTIONS}}" },
                { "rel": "collection", "href": "{{EVENTS}}" }
            ],
            "properties": { "result": { "type": "integer" } },
            "actions": { "add": { "input": { "type": "integer" } } },
            "events": { "change": { "data": { "type": "integer" } } }
        })
    }

    #[test]
    fn test_load_template_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", test_template()).unwrap();

        let loaded = load_template(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded, test_template());
    }

    #[test]
    fn test_load_template_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(load_template(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_build_description_end_to_end() {
        let config = ThingConfig::default();
        let td = build_description(&test_template(), &config).unwrap();

        // Rendered and form-annotated
        assert_eq!(td["title"], "http-calculator");
        assert_eq!(td["@type"], "Thing");
        assert_eq!(td["properties"]["result"]["forms"][0]["href"], "properties/result");

        // No placeholder survives anywhere in the document
        assert!(!td.to_string().contains("{{"));
    }
}
