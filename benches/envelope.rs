use criterion::{black_box, criterion_group, criterion_main, Criterion};

use isospec::{EnvelopeOptions, FixedEnvelope, Iso, LayeredConfig, ThresholdConfig};

fn glucose() -> Iso {
    // C6H12O6
    Iso::new(
        &[2, 2, 3],
        &[6, 12, 6],
        &[
            12.0,
            13.0033548378,
            1.00782503207,
            2.0141017778,
            15.99491461957,
            16.99913170,
            17.9991610,
        ],
        &[
            0.9893, 0.0107, 0.99985, 0.00015, 0.99757, 0.00038, 0.00205,
        ],
    )
    .unwrap()
}

fn threshold_envelope(threshold: f64) {
    FixedEnvelope::from_threshold(
        glucose(),
        ThresholdConfig {
            threshold,
            absolute: false,
        },
        EnvelopeOptions::all(),
    );
}

fn layered_envelope(target_coverage: f64) {
    FixedEnvelope::from_layered(
        glucose(),
        LayeredConfig {
            target_coverage,
            optimize: true,
        },
        EnvelopeOptions::all(),
    );
}

fn envelope_scaling(c: &mut Criterion) {
    c.bench_function("FixedEnvelope threshold glucose -20", |b| {
        b.iter(|| threshold_envelope(black_box(-20.0)))
    });

    c.bench_function("FixedEnvelope layered glucose 0.999", |b| {
        b.iter(|| layered_envelope(black_box(0.999)))
    });
}

criterion_group!(benches, envelope_scaling);
criterion_main!(benches);
