//! Synthetic booking tables shared by the unit tests.
use crate::constants::{ADR, IS_CANCELED, LEAD_TIME, SPECIAL_REQUESTS, TOTAL_NIGHTS};
use crate::data::BookingTable;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bookings canceled whenever `lead_time > 150`, with 5% of the labels flipped.
pub fn synthetic_bookings(rows: usize, seed: u64) -> BookingTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lead_time = Vec::with_capacity(rows);
    let mut total_nights = Vec::with_capacity(rows);
    let mut adr = Vec::with_capacity(rows);
    let mut requests = Vec::with_capacity(rows);
    let mut canceled = Vec::with_capacity(rows);
    for _ in 0..rows {
        let lt = rng.gen_range(0..=300) as f64;
        total_nights.push(rng.gen_range(1..=14) as f64);
        adr.push(rng.gen_range(20.0..=400.0));
        requests.push(rng.gen_range(0..=5) as f64);
        let label = if lt > 150.0 { 1.0 } else { 0.0 };
        canceled.push(if rng.gen_bool(0.05) { 1.0 - label } else { label });
        lead_time.push(lt);
    }
    BookingTable::from_numeric_columns(&[
        (LEAD_TIME, lead_time),
        (TOTAL_NIGHTS, total_nights),
        (ADR, adr),
        (SPECIAL_REQUESTS, requests),
        (IS_CANCELED, canceled),
    ])
    .expect("columns have equal length")
}
