//! An example using the hotel bookings dataset
use cancelguard::analysis::top_segments;
use cancelguard::{predict_for_display, BookingFields, BootstrapConfig, Dashboard, PredictionOutcome};
use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Dataset path from the command line, or CANCELGUARD_DATA_PATH, or
    // `hotel_booking.csv`.
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => BootstrapConfig::from_env().set_data_path(path),
        None => BootstrapConfig::from_env(),
    };

    let dashboard = Dashboard::start(&config)?;
    println!("Read {} bookings", dashboard.table.rows());
    let model = dashboard.state.container()?;
    println!("Holdout evaluation: {}", model.evaluation());
    println!("Feature importance: {:?}", model.feature_importance());
    println!("{}", model.tree());

    for segment in top_segments(&dashboard.table, 3)? {
        println!(
            "{:<15} {:>6.2}% of {} bookings canceled",
            segment.group,
            segment.cancellation_rate * 100.0,
            segment.bookings
        );
    }

    let booking = BookingFields::default()
        .set_lead_time(200.0)
        .set_total_nights(3.0)
        .set_adr(90.0)
        .set_special_requests(0.0);
    for fields in [dashboard.defaults.to_fields(), booking] {
        match predict_for_display(&dashboard.state, &fields) {
            PredictionOutcome::Predicted(p) => println!("Booking {}", p),
            PredictionOutcome::Failed(msg) => println!("{}", msg),
        }
    }

    Ok(())
}
