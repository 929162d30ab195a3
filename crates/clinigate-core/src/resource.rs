//! The opaque resource record envelope.
//!
//! The authorization engine treats a clinical resource as an opaque JSON
//! body behind a small accessor surface: the declared type, identifiers by
//! system, reference strings, the endpoint address, and bundle entries.
//! Payload parsing beyond that surface belongs to the storage engine.

use crate::error::{CoreError, Result};
use crate::fhir::ResourceType;
use serde_json::{Value, json};

/// A materialized resource instance, typed by its declared `resourceType`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    resource_type: ResourceType,
    body: Value,
}

impl ResourceRecord {
    /// Wrap a JSON resource body, inferring the type from `resourceType`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not an object or carries no string
    /// `resourceType` field.
    pub fn from_json(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Err(CoreError::invalid_resource("resource body is not an object"));
        }
        let resource_type = body
            .get("resourceType")
            .and_then(Value::as_str)
            .map(ResourceType::from_name)
            .ok_or_else(|| CoreError::invalid_resource("missing resourceType field"))?;

        Ok(Self {
            resource_type,
            body,
        })
    }

    /// The declared resource type.
    #[must_use]
    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// The logical id, when present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }

    /// The raw JSON body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume the record, returning the JSON body.
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }

    /// First identifier value under the given identifier system.
    ///
    /// Returns `None` when no identifier carries the system, or when the
    /// first matching identifier has no value.
    #[must_use]
    pub fn identifier_value(&self, system: &str) -> Option<&str> {
        self.body
            .get("identifier")
            .and_then(Value::as_array)?
            .iter()
            .find(|identifier| {
                identifier.get("system").and_then(Value::as_str) == Some(system)
            })?
            .get("value")
            .and_then(Value::as_str)
    }

    /// The reference string of a reference-typed field, e.g.
    /// `practitioner.reference`.
    #[must_use]
    pub fn reference(&self, field: &str) -> Option<&str> {
        self.body
            .get(field)?
            .get("reference")
            .and_then(Value::as_str)
    }

    /// The address string of an Endpoint resource.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.body.get("address").and_then(Value::as_str)
    }

    /// The raw entries of a Bundle resource, in document order.
    #[must_use]
    pub fn entries(&self) -> Option<&Vec<Value>> {
        self.body.get("entry").and_then(Value::as_array)
    }

    /// Replace the entries of a Bundle resource, preserving order.
    pub fn set_entries(&mut self, entries: Vec<Value>) {
        if let Value::Object(body) = &mut self.body {
            body.insert("entry".to_string(), Value::Array(entries));
        }
    }

    /// Append a tag to `meta.tag`, creating the path as needed.
    pub fn add_meta_tag(&mut self, system: &str, code: &str, display: &str) {
        let tag = json!({
            "system": system,
            "code": code,
            "display": display,
        });

        let Value::Object(body) = &mut self.body else {
            return;
        };
        let meta = body
            .entry("meta")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(meta) = meta {
            let tags = meta.entry("tag").or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(tags) = tags {
                tags.push(tag);
            }
        }
    }
}
