//! Features
//!
//! Typed boundary between user supplied booking fields and the fixed
//! numeric layout the classifier was fitted with.
use crate::constants::{
    ADR, DEFAULT_ADR, DEFAULT_LEAD_TIME, DEFAULT_SPECIAL_REQUESTS, DEFAULT_TOTAL_NIGHTS, FEATURE_NAMES, LEAD_TIME,
    N_FEATURES, SPECIAL_REQUESTS, TOTAL_NIGHTS,
};
use crate::data::{BookingTable, Cell};
use crate::errors::CancelGuardError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw value of a booking field as it arrives from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// Booking fields collected for a single prediction request.
///
/// Every field is optional. Only the four numeric fields reach the
/// classifier, the categorical ones are carried for display and filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingFields {
    pub lead_time: Option<FieldValue>,
    pub total_nights: Option<FieldValue>,
    pub adr: Option<FieldValue>,
    pub total_of_special_requests: Option<FieldValue>,
    pub hotel: Option<String>,
    pub deposit_type: Option<String>,
    pub customer_type: Option<String>,
    pub market_segment: Option<String>,
    pub arrival_date_month: Option<String>,
}

impl BookingFields {
    /// Parse fields from a JSON object. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, CancelGuardError> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| CancelGuardError::InvalidFeatureValue {
            field: "fields".to_string(),
            value: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Parse fields from an already decoded JSON object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CancelGuardError> {
        // Serde would also read an array into the struct by position.
        if !value.is_object() {
            return Err(CancelGuardError::InvalidFeatureValue {
                field: "fields".to_string(),
                value: value.to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| CancelGuardError::InvalidFeatureValue {
            field: "fields".to_string(),
            value: e.to_string(),
        })
    }

    /// Collect the fields of one table row.
    pub fn from_table_row(table: &BookingTable, row: usize) -> Self {
        let numeric = |name: &str| match table.get(row, name) {
            Some(Cell::Number(v)) => Some(FieldValue::Number(*v)),
            Some(Cell::Text(s)) => Some(FieldValue::Text(s.clone())),
            _ => None,
        };
        let text = |name: &str| match table.get(row, name) {
            Some(Cell::Missing) | None => None,
            Some(cell) => Some(cell.to_string()),
        };
        BookingFields {
            lead_time: numeric(LEAD_TIME),
            total_nights: numeric(TOTAL_NIGHTS),
            adr: numeric(ADR),
            total_of_special_requests: numeric(SPECIAL_REQUESTS),
            hotel: text("hotel"),
            deposit_type: text("deposit_type"),
            customer_type: text("customer_type"),
            market_segment: text("market_segment"),
            arrival_date_month: text("arrival_date_month"),
        }
    }

    pub fn set_lead_time(mut self, lead_time: impl Into<FieldValue>) -> Self {
        self.lead_time = Some(lead_time.into());
        self
    }

    pub fn set_total_nights(mut self, total_nights: impl Into<FieldValue>) -> Self {
        self.total_nights = Some(total_nights.into());
        self
    }

    pub fn set_adr(mut self, adr: impl Into<FieldValue>) -> Self {
        self.adr = Some(adr.into());
        self
    }

    pub fn set_special_requests(mut self, total_of_special_requests: impl Into<FieldValue>) -> Self {
        self.total_of_special_requests = Some(total_of_special_requests.into());
        self
    }

    pub fn set_market_segment(mut self, market_segment: &str) -> Self {
        self.market_segment = Some(market_segment.to_string());
        self
    }
}

/// Fixed length numeric input of the classifier, laid out as
/// [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; N_FEATURES],
}

impl FeatureVector {
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        FeatureVector { values }
    }

    pub fn names(&self) -> [&'static str; N_FEATURES] {
        FEATURE_NAMES
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES.iter().position(|n| *n == name).map(|i| self.values[i])
    }
}

/// Build the feature vector for a prediction request.
///
/// Missing values fall back to `lead_time = 0`, `total_nights = 1`,
/// `adr = 0` and `total_of_special_requests = 0`. A value that is not
/// a finite number is rejected.
pub fn extract(fields: &BookingFields) -> Result<FeatureVector, CancelGuardError> {
    Ok(FeatureVector::new([
        coerce(LEAD_TIME, fields.lead_time.as_ref(), DEFAULT_LEAD_TIME)?,
        coerce(TOTAL_NIGHTS, fields.total_nights.as_ref(), DEFAULT_TOTAL_NIGHTS)?,
        coerce(ADR, fields.adr.as_ref(), DEFAULT_ADR)?,
        coerce(SPECIAL_REQUESTS, fields.total_of_special_requests.as_ref(), DEFAULT_SPECIAL_REQUESTS)?,
    ]))
}

/// Coerce a single field. Absent values, empty strings and numeric zero
/// take the default. Text is parsed as written, so `"0"` stays 0.
fn coerce(field: &str, value: Option<&FieldValue>, default: f64) -> Result<f64, CancelGuardError> {
    let invalid = |v: &FieldValue| CancelGuardError::InvalidFeatureValue {
        field: field.to_string(),
        value: v.to_string(),
    };
    let raw = match value {
        None => return Ok(default),
        Some(raw) => raw,
    };
    match raw {
        FieldValue::Number(v) if !v.is_finite() => Err(invalid(raw)),
        FieldValue::Number(v) if *v == 0.0 => Ok(default),
        FieldValue::Number(v) => Ok(*v),
        FieldValue::Text(s) if s.is_empty() => Ok(default),
        FieldValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(invalid(raw)),
        },
        FieldValue::Flag(_) => Err(invalid(raw)),
    }
}
