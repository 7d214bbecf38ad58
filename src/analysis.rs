//! Analysis
//!
//! Summaries of the historical bookings used by the exploration views,
//! and the values the prediction form is reset to.
use crate::constants::{
    ADR, CATEGORICAL_FIELDS, DEFAULT_SPECIAL_REQUESTS, IS_CANCELED, LEAD_TIME, MARKET_SEGMENT, TOTAL_NIGHTS,
    WEEKEND_NIGHTS, WEEK_NIGHTS,
};
use crate::data::BookingTable;
use crate::errors::CancelGuardError;
use crate::features::{BookingFields, FieldValue};
use crate::utils::precision_round;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Cancellation rate of the bookings sharing one value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRate {
    pub group: String,
    pub cancellation_rate: f64,
    pub bookings: usize,
}

/// Cancellation rate for every value of `column`, highest rate first.
///
/// Rows with a missing group or a missing label are skipped.
pub fn cancellation_rate_by(table: &BookingTable, column: &str) -> Result<Vec<GroupRate>, CancelGuardError> {
    let missing: Vec<String> = [column, IS_CANCELED]
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CancelGuardError::MissingColumns(missing));
    }
    let groups = table.column(column).unwrap_or_default();
    let labels = table.numeric_column(IS_CANCELED)?;

    let mut stats: HashMap<String, (f64, usize)> = HashMap::new();
    for (cell, label) in groups.iter().zip(labels) {
        let Some(label) = label else {
            continue;
        };
        if cell.is_missing() {
            continue;
        }
        let entry = stats.entry(cell.to_string()).or_insert((0.0, 0));
        entry.0 += label;
        entry.1 += 1;
    }

    let mut rates: Vec<GroupRate> = stats
        .into_iter()
        .map(|(group, (canceled, bookings))| GroupRate {
            group,
            cancellation_rate: canceled / bookings as f64,
            bookings,
        })
        .collect();
    rates.sort_by(|a, b| {
        b.cancellation_rate
            .total_cmp(&a.cancellation_rate)
            .then_with(|| a.group.cmp(&b.group))
    });
    Ok(rates)
}

/// The `n` market segments with the highest cancellation rate.
pub fn top_segments(table: &BookingTable, n: usize) -> Result<Vec<GroupRate>, CancelGuardError> {
    let mut rates = cancellation_rate_by(table, MARKET_SEGMENT)?;
    rates.truncate(n);
    Ok(rates)
}

/// Mean of the non-missing values of a numeric column, `None` if there are none.
pub fn numeric_mean(table: &BookingTable, column: &str) -> Result<Option<f64>, CancelGuardError> {
    let values: Vec<f64> = table.numeric_column(column)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
}

fn mean_or(table: &BookingTable, column: &str, default: f64) -> Result<f64, CancelGuardError> {
    if !table.has_column(column) {
        return Ok(default);
    }
    Ok(numeric_mean(table, column)?.unwrap_or(default))
}

/// Values the prediction form starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDefaults {
    pub lead_time: f64,
    pub total_nights: f64,
    pub adr: f64,
    pub total_of_special_requests: f64,
    /// First non-missing value of each categorical field, by field name.
    pub categorical: Vec<(String, String)>,
}

impl PredictionDefaults {
    /// Mean lead time and nights (truncated), mean rate rounded to cents,
    /// no special requests, and the first value seen of each categorical field.
    pub fn from_table(table: &BookingTable) -> Result<Self, CancelGuardError> {
        let lead_time = mean_or(table, LEAD_TIME, 0.0)?.trunc();
        let total_nights = if table.has_column(TOTAL_NIGHTS) {
            mean_or(table, TOTAL_NIGHTS, 1.0)?
        } else if table.has_column(WEEKEND_NIGHTS) && table.has_column(WEEK_NIGHTS) {
            let weekend = table.numeric_column(WEEKEND_NIGHTS)?;
            let week = table.numeric_column(WEEK_NIGHTS)?;
            let nights: Vec<f64> = weekend
                .into_iter()
                .zip(week)
                .filter_map(|(a, b)| Some(a? + b?))
                .collect();
            if nights.is_empty() {
                1.0
            } else {
                nights.iter().sum::<f64>() / nights.len() as f64
            }
        } else {
            1.0
        }
        .trunc();
        let adr = precision_round(mean_or(table, ADR, 0.0)?, 2);

        let categorical = CATEGORICAL_FIELDS
            .iter()
            .filter_map(|field| {
                let first = table.column(field)?.iter().find(|c| !c.is_missing())?;
                Some((field.to_string(), first.to_string()))
            })
            .collect();

        Ok(PredictionDefaults {
            lead_time,
            total_nights,
            adr,
            total_of_special_requests: DEFAULT_SPECIAL_REQUESTS,
            categorical,
        })
    }

    pub fn categorical_value(&self, field: &str) -> Option<&str> {
        self.categorical
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// The form values as a booking ready for prediction.
    pub fn to_fields(&self) -> BookingFields {
        let text = |field: &str| self.categorical_value(field).map(str::to_string);
        BookingFields {
            lead_time: Some(FieldValue::Number(self.lead_time)),
            total_nights: Some(FieldValue::Number(self.total_nights)),
            adr: Some(FieldValue::Number(self.adr)),
            total_of_special_requests: Some(FieldValue::Number(self.total_of_special_requests)),
            hotel: text("hotel"),
            deposit_type: text("deposit_type"),
            customer_type: text("customer_type"),
            market_segment: text(MARKET_SEGMENT),
            arrival_date_month: text("arrival_date_month"),
        }
    }
}
