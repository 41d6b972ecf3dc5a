use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 50;

/// Sale period the provider is asked to cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    Hours24,
    Days7,
    #[default]
    Days30,
    Days90,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Hours24,
        Timeframe::Days7,
        Timeframe::Days30,
        Timeframe::Days90,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hours24 => "24hours",
            Timeframe::Days7 => "7days",
            Timeframe::Days30 => "30days",
            Timeframe::Days90 => "90days",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// A validated property search request
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub postcode: String,
    pub limit: u32,
    pub timeframe: Timeframe,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl Query {
    /// Postcode in the form the provider expects: uppercase, no whitespace
    pub fn normalized_postcode(&self) -> String {
        normalize_postcode(&self.postcode)
    }

    /// Lookup key shared by every request that asks for the same data.
    ///
    /// Built from the typed fields in a fixed order, so key order in the
    /// request body and postcode spacing/case never split the cache.
    pub fn cache_key(&self) -> String {
        fn bound(value: Option<f64>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }

        format!(
            "{}|{}|{}|{}|{}",
            self.normalized_postcode(),
            self.limit,
            self.timeframe.as_str(),
            bound(self.price_min),
            bound(self.price_max),
        )
    }
}

pub fn normalize_postcode(raw: &str) -> String {
    raw.split_whitespace().collect::<String>().to_uppercase()
}

fn postcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z]{1,2}\d[A-Z\d]?\s?\d[A-Z]{2}$").expect("postcode pattern compiles")
    })
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidJson,
    InvalidType,
    InvalidString,
    InvalidEnumValue,
    NotInteger,
    TooSmall,
    TooBig,
}

/// One rejected field, reported back to the client verbatim
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub path: Vec<String>,
    pub code: IssueCode,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_string()],
            code,
            message: message.into(),
        }
    }

    fn root(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            code,
            message: message.into(),
        }
    }

    fn expected(field: &str, expected: &str, received: &Value) -> Self {
        let message = if received.is_null() {
            format!("Expected {}, received null", expected)
        } else {
            format!("Expected {}, received {}", expected, type_name(received))
        };
        Self::new(field, IssueCode::InvalidType, message)
    }

    fn required(field: &str) -> Self {
        Self::new(field, IssueCode::InvalidType, "Required")
    }
}

/// Every field problem found in a request, never just the first
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{} invalid request parameter(s)", .0.len())]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter_map(|e| e.path.first().map(String::as_str))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a raw request body and validate it
pub fn parse(body: &[u8]) -> Result<Query, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        ValidationError(vec![FieldError::root(
            IssueCode::InvalidJson,
            format!("Malformed JSON body: {}", e),
        )])
    })?;
    validate(&value)
}

/// Validate a decoded request body, applying defaults for omitted fields
pub fn validate(raw: &Value) -> Result<Query, ValidationError> {
    let Some(obj) = raw.as_object() else {
        return Err(ValidationError(vec![FieldError::root(
            IssueCode::InvalidType,
            format!("Expected object, received {}", type_name(raw)),
        )]));
    };

    let mut errors = Vec::new();

    let postcode = validate_postcode(obj, &mut errors);
    let limit = validate_limit(obj, &mut errors);
    let timeframe = validate_timeframe(obj, &mut errors);
    let price_min = validate_price(obj, "priceMin", &mut errors);
    let price_max = validate_price(obj, "priceMax", &mut errors);

    match (postcode, limit, timeframe) {
        (Some(postcode), Some(limit), Some(timeframe)) if errors.is_empty() => Ok(Query {
            postcode,
            limit,
            timeframe,
            price_min,
            price_max,
        }),
        _ => Err(ValidationError(errors)),
    }
}

fn validate_postcode(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match obj.get("postcode") {
        None => {
            errors.push(FieldError::required("postcode"));
            None
        }
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if postcode_pattern().is_match(trimmed) {
                Some(trimmed.to_string())
            } else {
                errors.push(FieldError::new(
                    "postcode",
                    IssueCode::InvalidString,
                    "Invalid UK postcode",
                ));
                None
            }
        }
        Some(other) => {
            errors.push(FieldError::expected("postcode", "string", other));
            None
        }
    }
}

fn validate_limit(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<u32> {
    let value = match obj.get("limit") {
        None => return Some(DEFAULT_LIMIT),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(other) => {
            errors.push(FieldError::expected("limit", "number", other));
            return None;
        }
    };

    if value.fract() != 0.0 {
        errors.push(FieldError::new(
            "limit",
            IssueCode::NotInteger,
            "Expected integer, received float",
        ));
        None
    } else if value < MIN_LIMIT as f64 {
        errors.push(FieldError::new(
            "limit",
            IssueCode::TooSmall,
            format!("Number must be greater than or equal to {}", MIN_LIMIT),
        ));
        None
    } else if value > MAX_LIMIT as f64 {
        errors.push(FieldError::new(
            "limit",
            IssueCode::TooBig,
            format!("Number must be less than or equal to {}", MAX_LIMIT),
        ));
        None
    } else {
        Some(value as u32)
    }
}

fn validate_timeframe(
    obj: &Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<Timeframe> {
    match obj.get("timeframe") {
        None => Some(Timeframe::default()),
        Some(Value::String(raw)) => {
            let parsed = Timeframe::parse(raw);
            if parsed.is_none() {
                let expected = Timeframe::ALL
                    .iter()
                    .map(|t| format!("'{}'", t.as_str()))
                    .collect::<Vec<_>>()
                    .join(" | ");
                errors.push(FieldError::new(
                    "timeframe",
                    IssueCode::InvalidEnumValue,
                    format!("Invalid enum value. Expected {}, received '{}'", expected, raw),
                ));
            }
            parsed
        }
        Some(other) => {
            errors.push(FieldError::expected("timeframe", "string", other));
            None
        }
    }
}

fn validate_price(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    match obj.get(field) {
        None => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            errors.push(FieldError::expected(field, "number", other));
            None
        }
    }
}
