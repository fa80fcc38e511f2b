use super::TemplateError;
use serde::Serialize;
use serde_json::{Map, Value};

const CONTENT_TYPE_JSON: &str = "application/json";

/// Protocol binding form attached to a single affordance.
///
/// Serialized into the TD's `forms` arrays. A fresh value is constructed
/// for every affordance key; forms are never shared between keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form {
    pub href: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub op: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subprotocol: Option<String>,
}

impl Form {
    /// Form for reading a property
    pub fn read_property(key: &str) -> Self {
        Self {
            href: format!("properties/{}", key),
            content_type: CONTENT_TYPE_JSON.to_string(),
            op: vec!["readproperty".to_string()],
            subprotocol: None,
        }
    }

    /// Form for invoking an action
    pub fn invoke_action(key: &str) -> Self {
        Self {
            href: format!("actions/{}", key),
            content_type: CONTENT_TYPE_JSON.to_string(),
            op: vec!["invokeaction".to_string()],
            subprotocol: None,
        }
    }

    /// Form for subscribing to an event over SSE
    pub fn subscribe_event(key: &str) -> Self {
        Self {
            href: format!("events/{}", key),
            content_type: CONTENT_TYPE_JSON.to_string(),
            op: vec!["subscribeevent".to_string(), "unsubscribeevent".to_string()],
            subprotocol: Some("sse".to_string()),
        }
    }
}

/// Attach protocol forms to every affordance in the rendered TD.
///
/// Properties additionally get `observable: true`. All three affordance
/// maps must be present; a descriptor that is not a JSON object fails
/// startup rather than producing a TD with silent gaps.
pub fn attach_forms(td: &mut Value) -> Result<(), TemplateError> {
    for (key, entry) in section_mut(td, "properties")? {
        let obj = descriptor_mut(key, entry)?;
        obj.insert("observable".to_string(), Value::Bool(true));
        set_forms(obj, Form::read_property(key))?;
    }

    for (key, entry) in section_mut(td, "actions")? {
        set_forms(descriptor_mut(key, entry)?, Form::invoke_action(key))?;
    }

    for (key, entry) in section_mut(td, "events")? {
        set_forms(descriptor_mut(key, entry)?, Form::subscribe_event(key))?;
    }

    Ok(())
}

fn section_mut<'a>(
    td: &'a mut Value,
    section: &'static str,
) -> Result<&'a mut Map<String, Value>, TemplateError> {
    td.get_mut(section)
        .and_then(Value::as_object_mut)
        .ok_or(TemplateError::MissingAffordanceMap(section))
}

fn descriptor_mut<'a>(
    key: &str,
    entry: &'a mut Value,
) -> Result<&'a mut Map<String, Value>, TemplateError> {
    entry
        .as_object_mut()
        .ok_or_else(|| TemplateError::AffordanceNotObject(key.to_string()))
}

/// Replace the descriptor's forms list with the single given form
fn set_forms(descriptor: &mut Map<String, Value>, form: Form) -> Result<(), TemplateError> {
    let form = serde_json::to_value(form).map_err(|e| TemplateError::InvalidJson(e.to_string()))?;
    descriptor.insert("forms".to_string(), Value::Array(vec![form]));
    Ok(())
}
