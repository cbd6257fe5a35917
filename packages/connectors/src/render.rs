//! XML request rendering
//!
//! Output layout, for every connector:
//!
//! ```text
//! <Request>
//!   <MessageType>{message type}</MessageType>
//!   <Id>MARK43GENERATEDMSGID</Id>
//!   <{purpose code tag}>..</..>      only when the connector mandates one
//!   <{tag}>{value}</{tag}>           per present field, in field order
//! </Request>
//! ```
//!
//! Rendering does not validate or match; callers go through
//! [`QueryService`](crate::service::QueryService) for that.

use std::fmt::Write as _;

use crate::config;
use crate::connector::Connector;
use crate::error::SubmissionError;
use crate::field::FieldDefinition;
use crate::types::{FieldFormat, FieldValues, JurisdictionMode};

/// Escape the five XML special characters.
pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn push_element(xml: &mut String, tag: &str, content: &str) {
    // Writing to a String cannot fail
    let _ = writeln!(xml, "{}<{tag}>{content}</{tag}>", config::XML_INDENT);
}

fn push_field(xml: &mut String, def: &FieldDefinition, values: &FieldValues) {
    let Some(value) = values.get(&def.key).map(|v| v.trim()) else {
        return;
    };
    if value.is_empty() {
        return;
    }
    push_element(xml, &def.xml_tag, &escape_xml(&def.format_value(value)));
}

/// Render a request with the fixed placeholder message id.
///
/// # Errors
///
/// Returns `SubmissionError::UnknownQueryType` if the connector has no such
/// query type.
pub fn render(
    connector: &Connector,
    query_type: &str,
    values: &FieldValues,
    mode: JurisdictionMode,
) -> Result<String, SubmissionError> {
    render_with_message_id(
        connector,
        query_type,
        values,
        mode,
        config::MESSAGE_ID_PLACEHOLDER,
    )
}

/// Render a request with a caller-supplied message id.
///
/// # Errors
///
/// See [`render`].
pub fn render_with_message_id(
    connector: &Connector,
    query_type: &str,
    values: &FieldValues,
    mode: JurisdictionMode,
    message_id: &str,
) -> Result<String, SubmissionError> {
    let spec = connector
        .query_spec(query_type)
        .ok_or_else(|| SubmissionError::UnknownQueryType {
            connector: connector.id.clone(),
            query_type: query_type.to_string(),
        })?;

    let mut xml = format!("<{}>\n", config::REQUEST_ELEMENT);
    push_element(&mut xml, "MessageType", &escape_xml(&spec.message_type));
    push_element(&mut xml, "Id", &escape_xml(message_id));

    if let Some(purpose) = connector.purpose_code() {
        push_field(&mut xml, purpose, values);
    }

    let emit_jurisdiction = connector.emits_jurisdiction(mode);
    for def in connector.ordered_fields() {
        if def.format == FieldFormat::Jurisdiction && !emit_jurisdiction {
            continue;
        }
        push_field(&mut xml, def, values);
    }

    let _ = write!(xml, "</{}>", config::REQUEST_ELEMENT);

    tracing::debug!(
        connector = %connector.id,
        query_type,
        mode = %mode,
        bytes = xml.len(),
        "Rendered request"
    );

    Ok(xml)
}
