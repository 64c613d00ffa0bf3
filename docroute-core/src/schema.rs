//! Declarative request-body schemas and their validator.
//!
//! A [`Schema`] is an ordered set of named [`FieldRule`]s. The
//! [`SchemaValidator`] checks a JSON value against it and collects every
//! violation per field instead of stopping at the first one.
//!
//! ```ignore
//! use docroute::schema::{FieldRule, Schema, SchemaValidator};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("title", FieldRule::string().required().min_length(5))
//!     .field("status", FieldRule::string().one_of(["draft", "published"]));
//!
//! let result = SchemaValidator::validate(&json!({ "title": "hi" }), &schema);
//! assert!(!result.success);
//! ```

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

/// Error key used when the record as a whole is rejected.
pub const ROOT_KEY: &str = "$root";

/// Field name to ordered list of violation messages.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

/// The JSON type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// JSON objects and arrays.
    Object,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object() || value.is_array(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
        })
    }
}

/// Validation rule for a single field.
///
/// String constraints only apply to [`FieldType::String`] rules and number
/// constraints only to [`FieldType::Number`] rules; `allowed` applies to all.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field_type: FieldType,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Allowed values (`enum`), compared by JSON equality.
    pub allowed: Option<Vec<Value>>,
}

impl FieldRule {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            min: None,
            max: None,
            allowed: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn object() -> Self {
        Self::new(FieldType::Object)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    fn check(&self, value: &Value) -> Vec<String> {
        if !self.field_type.accepts(value) {
            return vec![format!("must be of type {}", self.field_type)];
        }

        let mut errors = Vec::new();

        match (self.field_type, value) {
            (FieldType::String, Value::String(s)) => {
                let length = s.chars().count();

                if let Some(min_length) = self.min_length.filter(|min| length < *min) {
                    errors.push(format!("must be at least {min_length} characters long"));
                }
                if let Some(max_length) = self.max_length.filter(|max| length > *max) {
                    errors.push(format!("must be at most {max_length} characters long"));
                }
                if let Some(pattern) = self.pattern.as_ref().filter(|re| !re.is_match(s)) {
                    errors.push(format!("must match pattern {}", pattern.as_str()));
                }
            }
            (FieldType::Number, Value::Number(n)) => {
                let n = n.as_f64().unwrap_or(f64::NAN);

                if let Some(min) = self.min.filter(|min| !(n >= *min)) {
                    errors.push(format!("must be at least {min}"));
                }
                if let Some(max) = self.max.filter(|max| !(n <= *max)) {
                    errors.push(format!("must be at most {max}"));
                }
            }
            _ => {}
        }

        if let Some(allowed) = self
            .allowed
            .as_ref()
            .filter(|allowed| !allowed.iter().any(|choice| same_value(choice, value)))
        {
            let choices = allowed
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");

            errors.push(format!("must be one of: {choices}"));
        }

        errors
    }
}

/// JSON equality, except that numbers compare by value (`1` equals `1.0`).
fn same_value(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Ordered mapping of field name to rule.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Adds or replaces the rule for `name`.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        let name = name.into();

        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = rule,
            None => self.fields.push((name, rule)),
        }

        self
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, rule)| rule)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ValidationResult {
    fn from_errors(errors: ValidationErrors) -> Self {
        if errors.is_empty() {
            ValidationResult { success: true, errors: None }
        } else {
            ValidationResult { success: false, errors: Some(errors) }
        }
    }

    /// Messages recorded for `field`, empty if the field passed.
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors
            .as_ref()
            .and_then(|errors| errors.get(field))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Validates JSON values against a [`Schema`].
///
/// Fields not named in the schema are never inspected. The input is not mutated.
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(record: &Value, schema: &Schema) -> ValidationResult {
        let Some(object) = record.as_object() else {
            let mut errors = ValidationErrors::new();
            errors.insert(ROOT_KEY.to_string(), vec!["must be an object".to_string()]);
            return ValidationResult::from_errors(errors);
        };

        let mut errors = ValidationErrors::new();

        for (name, rule) in schema.fields() {
            let field_errors = match object.get(name).filter(|value| !value.is_null()) {
                Some(value) => rule.check(value),
                None if rule.required => vec!["is required".to_string()],
                None => continue,
            };

            if !field_errors.is_empty() {
                errors.insert(name.to_string(), field_errors);
            }
        }

        ValidationResult::from_errors(errors)
    }
}
