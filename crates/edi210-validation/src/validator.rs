//! The schema walk itself
//!
//! A hand-rolled structural walk over `serde_json::Value`, closed at every
//! nesting level. Numeric strings are coerced to numbers and schema
//! defaults are applied while building the normalized record, mirroring
//! the lax-coercion contract of the v0.1 schema.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::outcome::{ConstraintType, FieldError, ValidationOutcome};

const SOURCE_TYPES: [&str; 5] = ["edi210", "pdf", "image", "csv", "api"];
const SIDES: [&str; 2] = ["buy", "sell"];

const TOP_KEYS: [&str; 13] = [
    "invoice_id",
    "side",
    "source",
    "carrier",
    "customer",
    "refs",
    "parties",
    "dates",
    "currency",
    "charges",
    "total",
    "metadata",
    "evidence",
];

/// Validator for the Golden Invoice v0.1 output contract.
pub struct GoldenValidator {
    date_shape: Regex,
}

impl GoldenValidator {
    /// Build a validator with its compiled date pattern.
    pub fn new() -> Self {
        Self {
            date_shape: Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"),
        }
    }

    /// Validate a batch of records, one outcome per record, in order.
    pub fn validate_all(&self, records: &[Value]) -> Vec<ValidationOutcome> {
        records.iter().map(|r| self.validate(r)).collect()
    }

    /// Validate one assembled record. Returns the coerced/normalized
    /// record on success or the ordered error list on failure.
    pub fn validate(&self, record: &Value) -> ValidationOutcome {
        let mut walk = Walk {
            errors: Vec::new(),
            date_shape: &self.date_shape,
        };

        let Some(obj) = record.as_object() else {
            walk.error("", "record must be an object", ConstraintType::Type);
            return ValidationOutcome::invalid(walk.errors);
        };

        walk.reject_unknown(obj, "", &TOP_KEYS);
        let mut out = Map::new();

        if let Some(id) = walk.required_string(obj, "", "invoice_id") {
            if id.is_empty() {
                walk.error("invoice_id", "must not be empty", ConstraintType::MinLength);
            }
            out.insert("invoice_id".into(), Value::String(id));
        }

        let side = walk
            .optional_enum(obj, "", "side", &SIDES)
            .unwrap_or_else(|| "buy".to_string());
        out.insert("side".into(), Value::String(side));

        out.insert("source".into(), walk.source(obj));
        out.insert(
            "carrier".into(),
            walk.optional_nullable_strings(obj, "carrier", &["name", "scac"]),
        );
        out.insert(
            "customer".into(),
            walk.optional_nullable_strings(obj, "customer", &["name", "account_id"]),
        );
        out.insert(
            "refs".into(),
            walk.optional_nullable_strings(obj, "refs", &["bol", "pro", "po", "load_id"]),
        );
        out.insert(
            "parties".into(),
            walk.optional_nullable_strings(obj, "parties", &["ship_from", "ship_to", "bill_to"]),
        );
        out.insert("dates".into(), walk.dates(obj));

        if let Some(currency) = walk.required_string(obj, "", "currency") {
            if currency.chars().count() != 3 {
                walk.error(
                    "currency",
                    format!("'{currency}' must be exactly 3 characters"),
                    ConstraintType::Length,
                );
            }
            out.insert("currency".into(), Value::String(currency));
        }

        out.insert("charges".into(), walk.charges(obj));

        match present(obj, "total") {
            Some(value) => {
                if let Some(total) = walk.number(value, "total") {
                    out.insert("total".into(), number_value(total));
                }
            }
            None => walk.error("total", "field is required", ConstraintType::Required),
        }

        out.insert("metadata".into(), walk.metadata(obj));
        out.insert("evidence".into(), walk.evidence(obj));

        if walk.errors.is_empty() {
            ValidationOutcome::valid(Value::Object(out))
        } else {
            debug!(errors = walk.errors.len(), "record failed validation");
            ValidationOutcome::invalid(walk.errors)
        }
    }
}

impl Default for GoldenValidator {
    fn default() -> Self {
        Self::new()
    }
}

struct Walk<'a> {
    errors: Vec<FieldError>,
    date_shape: &'a Regex,
}

impl Walk<'_> {
    fn error(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        constraint: ConstraintType,
    ) {
        self.errors.push(FieldError::new(path, message, constraint));
    }

    fn reject_unknown(&mut self, obj: &Map<String, Value>, prefix: &str, allowed: &[&str]) {
        for key in obj.keys() {
            if !allowed.contains(&key.as_str()) {
                self.error(
                    join(prefix, key),
                    format!("'{key}' is not part of the schema"),
                    ConstraintType::UnknownField,
                );
            }
        }
    }

    fn required_string(
        &mut self,
        obj: &Map<String, Value>,
        prefix: &str,
        key: &str,
    ) -> Option<String> {
        let path = join(prefix, key);
        match present(obj, key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.error(
                    path,
                    format!("expected a string, found {}", type_name(other)),
                    ConstraintType::Type,
                );
                None
            }
            None => {
                self.error(path, "field is required", ConstraintType::Required);
                None
            }
        }
    }

    fn optional_string(
        &mut self,
        obj: &Map<String, Value>,
        prefix: &str,
        key: &str,
    ) -> Option<String> {
        match present(obj, key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.error(
                    join(prefix, key),
                    format!("expected a string or null, found {}", type_name(other)),
                    ConstraintType::Type,
                );
                None
            }
            None => None,
        }
    }

    fn optional_enum(
        &mut self,
        obj: &Map<String, Value>,
        prefix: &str,
        key: &str,
        allowed: &[&str],
    ) -> Option<String> {
        let value = self.optional_string(obj, prefix, key)?;
        if allowed.contains(&value.as_str()) {
            Some(value)
        } else {
            self.error(
                join(prefix, key),
                format!("'{value}' is not one of {allowed:?}"),
                ConstraintType::Enum,
            );
            None
        }
    }

    /// Number with lax coercion: a numeric string passes and is coerced.
    fn number(&mut self, value: &Value, path: &str) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    self.error(
                        path,
                        format!("'{s}' is not a number"),
                        ConstraintType::Type,
                    );
                    None
                }
            },
            other => {
                self.error(
                    path,
                    format!("expected a number, found {}", type_name(other)),
                    ConstraintType::Type,
                );
                None
            }
        }
    }

    fn date(&mut self, obj: &Map<String, Value>, prefix: &str, key: &str) -> Value {
        let Some(raw) = self.optional_string(obj, prefix, key) else {
            return Value::Null;
        };
        let path = join(prefix, key);
        if !self.date_shape.is_match(&raw)
            || NaiveDate::parse_from_str(&raw, "%Y-%m-%d").is_err()
        {
            self.error(
                path,
                format!("'{raw}' is not a valid calendar date"),
                ConstraintType::Format,
            );
            return Value::Null;
        }
        Value::String(raw)
    }

    fn source(&mut self, obj: &Map<String, Value>) -> Value {
        let Some(value) = present(obj, "source") else {
            self.error("source", "field is required", ConstraintType::Required);
            return Value::Null;
        };
        let Some(source) = self.object(value, "source") else {
            return Value::Null;
        };
        self.reject_unknown(source, "source", &["type", "doc_uri"]);

        let mut out = Map::new();
        if let Some(kind) = self.required_string(source, "source", "type") {
            if !SOURCE_TYPES.contains(&kind.as_str()) {
                self.error(
                    "source.type",
                    format!("'{kind}' is not one of {SOURCE_TYPES:?}"),
                    ConstraintType::Enum,
                );
            }
            out.insert("type".into(), Value::String(kind));
        }
        let doc_uri = self.optional_string(source, "source", "doc_uri");
        if let Some(ref uri) = doc_uri {
            if uri.is_empty() {
                self.error("source.doc_uri", "must not be empty", ConstraintType::MinLength);
            }
        }
        out.insert("doc_uri".into(), nullable(doc_uri));
        Value::Object(out)
    }

    /// An optional sub-object whose fields are all nullable strings.
    fn optional_nullable_strings(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        fields: &[&str],
    ) -> Value {
        let Some(value) = present(obj, key) else {
            return Value::Null;
        };
        let Some(section) = self.object(value, key) else {
            return Value::Null;
        };
        self.reject_unknown(section, key, fields);

        let mut out = Map::new();
        for field in fields {
            let resolved = self.optional_string(section, key, field);
            out.insert((*field).to_string(), nullable(resolved));
        }
        Value::Object(out)
    }

    fn dates(&mut self, obj: &Map<String, Value>) -> Value {
        let Some(value) = present(obj, "dates") else {
            self.error("dates", "field is required", ConstraintType::Required);
            return Value::Null;
        };
        let Some(dates) = self.object(value, "dates") else {
            return Value::Null;
        };
        self.reject_unknown(dates, "dates", &["invoice", "pickup", "delivery"]);

        let mut out = Map::new();
        let invoice = self.date(dates, "dates", "invoice");
        if invoice.is_null() && present(dates, "invoice").is_none() {
            self.error("dates.invoice", "field is required", ConstraintType::Required);
        }
        out.insert("invoice".into(), invoice);
        out.insert("pickup".into(), self.date(dates, "dates", "pickup"));
        out.insert("delivery".into(), self.date(dates, "dates", "delivery"));
        Value::Object(out)
    }

    fn charges(&mut self, obj: &Map<String, Value>) -> Value {
        let Some(value) = present(obj, "charges") else {
            self.error("charges", "field is required", ConstraintType::Required);
            return Value::Null;
        };
        let Some(charges) = self.object(value, "charges") else {
            return Value::Null;
        };
        self.reject_unknown(
            charges,
            "charges",
            &["base_freight", "fuel_surcharge", "detention", "other"],
        );

        let mut out = Map::new();
        match present(charges, "base_freight") {
            Some(v) => {
                if let Some(n) = self.number(v, "charges.base_freight") {
                    out.insert("base_freight".into(), number_value(n));
                }
            }
            None => self.error(
                "charges.base_freight",
                "field is required",
                ConstraintType::Required,
            ),
        }
        for key in ["fuel_surcharge", "detention"] {
            let n = match present(charges, key) {
                Some(v) => self.number(v, &join("charges", key)).unwrap_or(0.0),
                None => 0.0,
            };
            out.insert(key.into(), number_value(n));
        }
        out.insert("other".into(), self.other_charges(charges));
        Value::Object(out)
    }

    fn other_charges(&mut self, charges: &Map<String, Value>) -> Value {
        let Some(value) = present(charges, "other") else {
            return Value::Array(Vec::new());
        };
        let Some(items) = value.as_array() else {
            self.error(
                "charges.other",
                format!("expected an array, found {}", type_name(value)),
                ConstraintType::Type,
            );
            return Value::Array(Vec::new());
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let prefix = format!("charges.other[{i}]");
            let Some(entry) = self.object(item, &prefix) else {
                continue;
            };
            self.reject_unknown(entry, &prefix, &["code", "desc", "amount"]);

            let mut normalized = Map::new();
            if let Some(code) = self.required_string(entry, &prefix, "code") {
                normalized.insert("code".into(), Value::String(code));
            }
            normalized.insert(
                "desc".into(),
                nullable(self.optional_string(entry, &prefix, "desc")),
            );
            match present(entry, "amount") {
                Some(v) => {
                    if let Some(n) = self.number(v, &join(&prefix, "amount")) {
                        normalized.insert("amount".into(), number_value(n));
                    }
                }
                None => self.error(
                    join(&prefix, "amount"),
                    "field is required",
                    ConstraintType::Required,
                ),
            }
            out.push(Value::Object(normalized));
        }
        Value::Array(out)
    }

    fn metadata(&mut self, obj: &Map<String, Value>) -> Value {
        let Some(value) = present(obj, "metadata") else {
            self.error("metadata", "field is required", ConstraintType::Required);
            return Value::Null;
        };
        let Some(metadata) = self.object(value, "metadata") else {
            return Value::Null;
        };
        self.reject_unknown(
            metadata,
            "metadata",
            &[
                "golden_schema_version",
                "parser_version",
                "edi_version",
                "trading_partner",
                "confidence",
            ],
        );

        let mut out = Map::new();
        let version = self
            .optional_string(metadata, "metadata", "golden_schema_version")
            .unwrap_or_else(|| "0.1".to_string());
        if version != "0.1" {
            self.error(
                "metadata.golden_schema_version",
                format!("'{version}' must be '0.1'"),
                ConstraintType::Const,
            );
        }
        out.insert("golden_schema_version".into(), Value::String(version));

        if let Some(parser) = self.required_string(metadata, "metadata", "parser_version") {
            out.insert("parser_version".into(), Value::String(parser));
        }
        for key in ["edi_version", "trading_partner"] {
            let resolved = self.optional_string(metadata, "metadata", key);
            out.insert(key.into(), nullable(resolved));
        }

        let confidence = match present(metadata, "confidence") {
            Some(v) => self.number(v, "metadata.confidence"),
            None => None,
        };
        if let Some(score) = confidence {
            if !(0.0..=1.0).contains(&score) {
                self.error(
                    "metadata.confidence",
                    format!("{score} is outside [0, 1]"),
                    ConstraintType::Range,
                );
            }
        }
        out.insert(
            "confidence".into(),
            confidence.map_or(Value::Null, number_value),
        );
        Value::Object(out)
    }

    fn evidence(&mut self, obj: &Map<String, Value>) -> Value {
        let Some(value) = present(obj, "evidence") else {
            return Value::Null;
        };
        let Some(evidence) = self.object(value, "evidence") else {
            return Value::Null;
        };
        self.reject_unknown(evidence, "evidence", &["doc_uri", "attachments"]);

        let mut out = Map::new();
        out.insert(
            "doc_uri".into(),
            nullable(self.optional_string(evidence, "evidence", "doc_uri")),
        );

        let attachments = match present(evidence, "attachments") {
            Some(Value::Array(items)) => {
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => list.push(Value::String(s.clone())),
                        other => self.error(
                            format!("evidence.attachments[{i}]"),
                            format!("expected a string, found {}", type_name(other)),
                            ConstraintType::Type,
                        ),
                    }
                }
                Value::Array(list)
            }
            Some(other) => {
                self.error(
                    "evidence.attachments",
                    format!("expected an array, found {}", type_name(other)),
                    ConstraintType::Type,
                );
                Value::Array(Vec::new())
            }
            None => Value::Array(Vec::new()),
        };
        out.insert("attachments".into(), attachments);
        Value::Object(out)
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.error(
                    path,
                    format!("expected an object, found {}", type_name(value)),
                    ConstraintType::Type,
                );
                None
            }
        }
    }
}

/// Present and non-null.
fn present<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn nullable(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::String)
}

fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
