pub const LEAD_TIME: &str = "lead_time";
pub const TOTAL_NIGHTS: &str = "total_nights";
pub const ADR: &str = "adr";
pub const SPECIAL_REQUESTS: &str = "total_of_special_requests";
pub const IS_CANCELED: &str = "is_canceled";
pub const WEEKEND_NIGHTS: &str = "stays_in_weekend_nights";
pub const WEEK_NIGHTS: &str = "stays_in_week_nights";
pub const MARKET_SEGMENT: &str = "market_segment";

/// Order of the values in every feature vector handed to the classifier.
pub const FEATURE_NAMES: [&str; 4] = [LEAD_TIME, TOTAL_NIGHTS, ADR, SPECIAL_REQUESTS];
pub const N_FEATURES: usize = FEATURE_NAMES.len();
pub const REQUIRED_COLUMNS: [&str; 5] = [LEAD_TIME, TOTAL_NIGHTS, ADR, SPECIAL_REQUESTS, IS_CANCELED];
pub const CATEGORICAL_FIELDS: [&str; 5] = [
    "hotel",
    "deposit_type",
    "customer_type",
    MARKET_SEGMENT,
    "arrival_date_month",
];

pub const DEFAULT_LEAD_TIME: f64 = 0.0;
pub const DEFAULT_TOTAL_NIGHTS: f64 = 1.0;
pub const DEFAULT_ADR: f64 = 0.0;
pub const DEFAULT_SPECIAL_REQUESTS: f64 = 0.0;

pub const MAX_DEPTH: usize = 8;
pub const MIN_SAMPLES_LEAF: usize = 30;
pub const MIN_SAMPLES_SPLIT: usize = 2;
pub const TEST_SIZE: f64 = 0.2;
pub const SEED: u64 = 42;
pub const DECISION_THRESHOLD: f64 = 0.5;
pub const MIN_GAIN: f64 = 1e-12;

pub const DEFAULT_DATA_PATH: &str = "hotel_booking.csv";
pub const DATA_PATH_ENV: &str = "CANCELGUARD_DATA_PATH";
pub const MISSING_TOKENS: [&str; 7] = ["NA", "N/A", "NaN", "nan", "NULL", "null", "None"];
