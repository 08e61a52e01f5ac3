use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use crypto_perf::{
    adapters::{adapter_for, AES_CFB, AES_GCM, CHACHA20_POLY1305, DESEDE_CBC},
    timing::TrialMeter,
    AlgorithmFamily, Direction, OperationAdapter, OperationRequest, PayloadSource, Provider,
    TimedBody,
};
use std::time::Duration;

// Cost of the meter itself around an empty body
fn bench_meter_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("Meter Overhead");
    group
        .sample_size(20)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(2));

    group.bench_function("start-stop", |b| {
        b.iter(|| {
            let mut meter = TrialMeter::new();
            meter.start();
            meter.stop();
            black_box(meter.readings().unwrap())
        })
    });

    group.bench_function("time-noop", |b| {
        b.iter(|| {
            let mut meter = TrialMeter::new();
            meter.time(|| Ok(black_box(()))).unwrap();
            black_box(meter.clock_time())
        })
    });

    group.finish();
}

// One prepared trial body per family, rebuilt for every iteration as the runner does
fn bench_trial_bodies(c: &mut Criterion) {
    let payload = PayloadSource::memory((0..64 * 1024).map(|i| (i % 251) as u8).collect::<Vec<u8>>());
    let cases = [
        (AlgorithmFamily::Block, DESEDE_CBC, Provider::RustCrypto, None),
        (AlgorithmFamily::Block, AES_GCM, Provider::Ring, Some(128)),
        (AlgorithmFamily::Stream, AES_CFB, Provider::RustCrypto, None),
        (AlgorithmFamily::Stream, CHACHA20_POLY1305, Provider::RustCrypto, None),
        (AlgorithmFamily::Hash, "MD5", Provider::RustCrypto, None),
        (AlgorithmFamily::Hash, "SHA-256", Provider::Ring, None),
        (AlgorithmFamily::Hash, "SHA3-256", Provider::RustCrypto, None),
    ];

    let mut group = c.benchmark_group("Trial Bodies");
    group
        .sample_size(10)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(1));

    for (family, algorithm, provider, key_size) in cases {
        let adapter = adapter_for(family);
        let request = OperationRequest::new(algorithm, provider)
            .with_key_size(key_size)
            .with_direction(Direction::Full);
        let id = BenchmarkId::new(family.id(), request.summary_name());
        group.bench_function(id, |b| {
            b.iter_batched(
                || adapter.prepare(&request, &payload).unwrap(),
                |mut body| body.run(&payload).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    name = harness_benches;
    config = Criterion::default()
        .without_plots()
        .sample_size(10);
    targets = bench_meter_overhead, bench_trial_bodies
);

criterion_main!(harness_benches);
