use crate::config::ThingConfig;
use serde_json::Value;
use std::fmt;

/// Errors raised while turning a thing model template into a Thing Description
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// The template document is not a JSON object
    NotAnObject,
    /// A required binding key has no `{{KEY}}` token in the template
    MissingPlaceholder(String),
    /// The document no longer parses after substitution
    InvalidJson(String),
    /// A top-level affordance map (properties/actions/events) is missing
    MissingAffordanceMap(&'static str),
    /// An affordance descriptor is not a JSON object
    AffordanceNotObject(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::NotAnObject => {
                write!(f, "thing model template must be a JSON object")
            }
            TemplateError::MissingPlaceholder(key) => {
                write!(f, "template has no {{{{{}}}}} placeholder", key)
            }
            TemplateError::InvalidJson(msg) => {
                write!(f, "rendered template is not valid JSON: {}", msg)
            }
            TemplateError::MissingAffordanceMap(section) => {
                write!(f, "template has no '{}' map", section)
            }
            TemplateError::AffordanceNotObject(key) => {
                write!(f, "affordance '{}' is not a JSON object", key)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Fixed placeholder bindings substituted into the thing model.
///
/// Values are spliced into the serialized JSON text, so they must not
/// contain characters that break JSON syntax (quotes, backslashes,
/// control characters). Rendering fails cleanly if they do.
#[derive(Debug, Clone)]
pub struct Bindings {
    pairs: Vec<(&'static str, String)>,
}

impl Bindings {
    pub fn from_config(config: &ThingConfig) -> Self {
        Self {
            pairs: vec![
                ("PROTOCOL", "http".to_string()),
                ("HOSTNAME", config.hostname.clone()),
                ("PROPERTIES", "properties".to_string()),
                ("ACTIONS", "actions".to_string()),
                ("EVENTS", "events".to_string()),
                ("THING_NAME", config.thing_name.clone()),
                ("PORT_NUMBER", config.port.to_string()),
            ],
        }
    }
}

/// Render the thing model template into a concrete TD skeleton.
///
/// Injects the top-level `"@type": "Thing"` marker, then replaces every
/// `{{KEY}}` token in the serialized document text with its binding value
/// and parses the result back. Every binding key must appear in the
/// template at least once.
pub fn render(template: &Value, bindings: &Bindings) -> Result<Value, TemplateError> {
    let mut template = template.clone();
    let obj = template.as_object_mut().ok_or(TemplateError::NotAnObject)?;
    obj.insert("@type".to_string(), Value::String("Thing".to_string()));

    let mut text = template.to_string();
    for (key, value) in &bindings.pairs {
        let token = format!("{{{{{}}}}}", key);
        if !text.contains(&token) {
            return Err(TemplateError::MissingPlaceholder((*key).to_string()));
        }
        text = text.replace(&token, value);
    }

    serde_json::from_str(&text).map_err(|e| TemplateError::InvalidJson(e.to_string()))
}
