use cancelguard::constants::{ADR, IS_CANCELED, LEAD_TIME, SPECIAL_REQUESTS, TOTAL_NIGHTS};
use cancelguard::features::extract;
use cancelguard::{BookingFields, BookingTable, FeatureVector, Trainer, TrainerConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn create_bookings(n_samples: usize) -> BookingTable {
    // reproducible seed
    let mut rng = StdRng::seed_from_u64(1903);

    let mut lead_time = Vec::with_capacity(n_samples);
    let mut total_nights = Vec::with_capacity(n_samples);
    let mut adr = Vec::with_capacity(n_samples);
    let mut requests = Vec::with_capacity(n_samples);
    let mut canceled = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let lt = rng.gen_range(0..=300) as f64;
        let rq = rng.gen_range(0..=5) as f64;
        let p = (lt / 300.0) * 0.8 + if rq == 0.0 { 0.15 } else { 0.0 };
        lead_time.push(lt);
        total_nights.push(rng.gen_range(1..=14) as f64);
        adr.push(rng.gen_range(20.0..=400.0));
        requests.push(rq);
        canceled.push(if rng.gen_bool(p.min(1.0)) { 1.0 } else { 0.0 });
    }
    BookingTable::from_numeric_columns(&[
        (LEAD_TIME, lead_time),
        (TOTAL_NIGHTS, total_nights),
        (ADR, adr),
        (SPECIAL_REQUESTS, requests),
        (IS_CANCELED, canceled),
    ])
    .unwrap()
}

pub fn trainer_benchmarks(c: &mut Criterion) {
    let table = create_bookings(100_000);

    let mut trainer_group = c.benchmark_group("train_tree");
    trainer_group.warm_up_time(Duration::from_secs(5));
    trainer_group.sample_size(20);
    trainer_group.bench_function("train_tree_default", |b| {
        b.iter(|| Trainer::default().fit(black_box(&table)).unwrap())
    });
    trainer_group.bench_function("train_tree_single_thread", |b| {
        let trainer = Trainer::new(TrainerConfig::default().set_num_threads(Some(1)));
        b.iter(|| trainer.fit(black_box(&table)).unwrap())
    });
    trainer_group.finish();

    let model = Trainer::default().fit(&table).unwrap();
    println!("{}", model.evaluation());

    let fields = BookingFields::default()
        .set_lead_time(200.0)
        .set_total_nights(3.0)
        .set_adr(90.0)
        .set_special_requests(0.0);
    c.bench_function("extract", |b| b.iter(|| extract(black_box(&fields)).unwrap()));

    let features = extract(&fields).unwrap();
    c.bench_function("predict_single_row", |b| {
        b.iter(|| model.predict(black_box(&features)).unwrap())
    });

    let batch: Vec<FeatureVector> = (0..10_000)
        .map(|i| FeatureVector::new([(i % 300) as f64, 3.0, 90.0, (i % 6) as f64]))
        .collect();
    c.bench_function("predict_batch", |b| {
        b.iter(|| model.predict_batch(black_box(&batch)).unwrap())
    });
}

criterion_group!(benches, trainer_benchmarks);
criterion_main!(benches);
