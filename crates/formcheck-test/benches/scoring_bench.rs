//! Benchmarks for formcheck scoring

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use formcheck_baseline::{extract_sample, BaselineCollector};
use formcheck_compare::{evaluate, ComparisonConfig, ComparisonContext, LoadedBaseline};
use formcheck_core::{normalize, pose_angles, AggregateMethod};
use formcheck_test::{PoseSynthesizer, SynthConfig};

fn baseline(method: AggregateMethod) -> LoadedBaseline {
    let mut synth = PoseSynthesizer::new(SynthConfig::default(), 1);
    let mut collector = BaselineCollector::new(method);
    for (i, detection) in synth.batch(25).iter().enumerate() {
        collector.add(format!("{i}"), detection);
    }
    let (baseline, _) = collector.finish().unwrap();
    LoadedBaseline::new(baseline).unwrap()
}

fn bench_normalize_and_angles(c: &mut Criterion) {
    let detection = PoseSynthesizer::new(SynthConfig::default(), 2).next_detection();
    let landmarks = detection.pose().unwrap().clone();

    c.bench_function("normalize_and_angles", |b| {
        b.iter(|| {
            let normalized = normalize(black_box(&landmarks), detection.image).unwrap();
            black_box(pose_angles(&normalized))
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let loaded = baseline(AggregateMethod::Average);
    let live = extract_sample(&PoseSynthesizer::new(SynthConfig::default(), 3).next_detection()).unwrap();
    let config = ComparisonConfig::default();

    c.bench_function("evaluate", |b| {
        b.iter(|| black_box(evaluate(black_box(&live), &loaded, config)))
    });
}

fn bench_context_compare(c: &mut Criterion) {
    let context = ComparisonContext::default();
    context.set_baseline(baseline(AggregateMethod::Median).baseline().clone()).unwrap();
    let detection = PoseSynthesizer::new(SynthConfig::default(), 4).next_detection();

    c.bench_function("context_compare", |b| {
        b.iter(|| black_box(context.compare(black_box(&detection)).unwrap()))
    });
}

fn bench_flag(c: &mut Criterion) {
    let context = ComparisonContext::default();
    context.set_baseline(baseline(AggregateMethod::Average).baseline().clone()).unwrap();
    let mut synth = PoseSynthesizer::new(SynthConfig::default(), 5);
    synth.shift(60, 40);
    let result = context.compare(&synth.next_detection()).unwrap();

    c.bench_function("comparison_flag", |b| b.iter(|| black_box(result.flag())));
}

criterion_group!(
    benches,
    bench_normalize_and_angles,
    bench_evaluate,
    bench_context_compare,
    bench_flag,
);
criterion_main!(benches);
