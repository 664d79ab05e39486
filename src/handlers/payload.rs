// handlers/payload.rs - JSON body and query-string validation shared by the route handlers

use axum::extract::rejection::JsonRejection;
use axum::Json;
use indexmap::IndexMap;
use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::clause::FieldMap;
use crate::database::SqlParam;
use crate::error::{ApiError, FieldErrors};

/// A request body schema, compiled once from its JSON Schema document.
///
/// The whole document decides validity. Each property is also compiled on
/// its own so a failure can be pinned to a field, reported with that
/// property's `description`.
pub struct BodySchema {
    document: Validator,
    required: Vec<String>,
    fields: IndexMap<String, FieldRule>,
}

struct FieldRule {
    validator: Validator,
    message: String,
    kind: ParamKind,
}

/// Column type a property binds as; a JSON `null` becomes a NULL of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    Text,
    Int,
    Float,
    Bool,
}

pub type SchemaCell = Lazy<Result<BodySchema, String>>;

pub static COMPANY_NEW: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/companyNew.json")));
pub static COMPANY_UPDATE: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/companyUpdate.json")));
pub static JOB_NEW: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/jobNew.json")));
/// `id` and `companyHandle` are absent from the document: neither may change.
pub static JOB_UPDATE: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/jobUpdate.json")));
pub static USER_REGISTER: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/userRegister.json")));
pub static USER_NEW: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/userNew.json")));
pub static USER_UPDATE: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/userUpdate.json")));
pub static AUTH_TOKEN: SchemaCell = Lazy::new(|| BodySchema::load(include_str!("schemas/authToken.json")));

impl BodySchema {
    pub fn load(source: &str) -> Result<Self, String> {
        let schema: Value = serde_json::from_str(source).map_err(|e| format!("Invalid schema JSON: {}", e))?;
        let document = jsonschema::draft7::new(&schema).map_err(|e| format!("Invalid schema: {}", e))?;

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        let mut fields = IndexMap::new();
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                let validator = jsonschema::draft7::new(property).map_err(|e| format!("Invalid schema for {}: {}", name, e))?;
                let message = property
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("is invalid")
                    .to_string();
                let kind = param_kind(property).ok_or_else(|| format!("Property {} has no bindable type", name))?;

                fields.insert(name.clone(), FieldRule { validator, message, kind });
            }
        }

        Ok(Self {
            document,
            required,
            fields,
        })
    }

    fn field_errors(&self, object: &Map<String, Value>) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for (key, value) in object {
            match self.fields.get(key) {
                None => {
                    errors.insert(key.clone(), "is not allowed".to_string());
                }
                Some(rule) if !rule.validator.is_valid(value) => {
                    errors.insert(key.clone(), rule.message.clone());
                }
                Some(_) => {}
            }
        }

        for key in &self.required {
            if !object.contains_key(key) {
                errors.insert(key.clone(), "is required".to_string());
            }
        }

        errors
    }
}

fn param_kind(property: &Value) -> Option<ParamKind> {
    let declared = match property.get("type")? {
        Value::String(t) => t.as_str(),
        Value::Array(types) => types.iter().filter_map(Value::as_str).find(|t| *t != "null")?,
        _ => return None,
    };

    match declared {
        "string" => Some(ParamKind::Text),
        "integer" => Some(ParamKind::Int),
        "number" => Some(ParamKind::Float),
        "boolean" => Some(ParamKind::Bool),
        _ => None,
    }
}

fn bind(kind: ParamKind, value: &Value) -> SqlParam {
    match kind {
        ParamKind::Text => SqlParam::Text(value.as_str().map(str::to_string)),
        ParamKind::Int => SqlParam::Int(
            value
                .as_i64()
                .or_else(|| value.as_f64().map(|n| n as i64))
                .and_then(|n| i32::try_from(n).ok()),
        ),
        ParamKind::Float => SqlParam::Float(value.as_f64()),
        ParamKind::Bool => SqlParam::Bool(value.as_bool()),
    }
}

/// Unwrap the JSON extractor, turning axum's rejection into our 400 body.
pub fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Check `body` against a schema document.
///
/// Returns the fields in the order the client sent them, bound as typed
/// parameters. Every failing field is reported, not just the first.
pub fn validate_fields(body: &Value, schema: &SchemaCell) -> Result<FieldMap<SqlParam>, ApiError> {
    let schema = Lazy::force(schema).as_ref().map_err(|e| {
        tracing::error!("Request schema failed to load: {}", e);
        ApiError::internal_server_error("Request schema unavailable")
    })?;

    let object = body
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Request body must be a JSON object"))?;

    if !schema.document.is_valid(body) {
        let mut errors = schema.field_errors(object);
        if errors.is_empty() {
            errors.insert("body".to_string(), "does not match the expected shape".to_string());
        }
        return Err(ApiError::validation_error("Invalid request body", Some(errors)));
    }

    let mut fields = FieldMap::new();
    for (key, value) in object {
        if let Some(rule) = schema.fields.get(key) {
            fields.insert(key.clone(), bind(rule.kind, value));
        }
    }

    Ok(fields)
}

/// Validate against `schema`, then deserialize into a typed model.
pub fn validate_into<T: DeserializeOwned>(body: Value, schema: &SchemaCell) -> Result<T, ApiError> {
    validate_fields(&body, schema)?;
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Query-string reader for list endpoints.
pub struct QueryParams {
    params: HashMap<String, String>,
    errors: FieldErrors,
}

impl QueryParams {
    /// Every key must be one of `allowed`.
    pub fn new(params: HashMap<String, String>, allowed: &[&str]) -> Self {
        let errors = params
            .keys()
            .filter(|k| !allowed.contains(&k.as_str()))
            .map(|k| (k.clone(), "is not a valid filter".to_string()))
            .collect();

        Self { params, errors }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }

    pub fn non_negative_int(&mut self, key: &str) -> Option<i32> {
        let raw = self.params.get(key)?;
        match raw.trim().parse::<i32>() {
            Ok(n) if n >= 0 => Some(n),
            _ => {
                self.errors.insert(key.to_string(), "must be a non-negative integer".to_string());
                None
            }
        }
    }

    pub fn boolean(&mut self, key: &str) -> Option<bool> {
        let raw = self.params.get(key)?;
        match raw.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => {
                self.errors.insert(key.to_string(), "must be true or false".to_string());
                None
            }
        }
    }

    pub fn reject(&mut self, key: &str, message: &str) {
        self.errors.insert(key.to_string(), message.to_string());
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid query string", Some(self.errors)))
        }
    }
}

/// Numeric path ids; anything else is a validation error rather than a 404.
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| {
        let mut errors = FieldErrors::new();
        errors.insert("id".to_string(), "must be an integer".to_string());
        ApiError::validation_error(format!("Invalid id: {}", raw), Some(errors))
    })
}
