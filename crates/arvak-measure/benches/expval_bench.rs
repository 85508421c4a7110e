//! Benchmarks for expectation estimation
//!
//! Run with: cargo bench -p arvak-measure

use arvak_measure::observable::{BasisStateProjector, Obs, PauliZ, Tensor};
use arvak_measure::state::batch;
use arvak_measure::{expval, ExpectationEstimator, Statevector, Wires};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn prepared_state(n: usize) -> Statevector {
    let mut sv = Statevector::new(n);
    for q in 0..n {
        sv.ry(q, 0.1 + q as f64).unwrap();
    }
    for q in 1..n {
        sv.cx(q - 1, q).unwrap();
    }
    sv
}

fn zz(n: usize) -> Tensor {
    Tensor::new((0..n).map(|q| Obs::from(PauliZ::new(q)))).unwrap()
}

/// Benchmark the exact path on growing states
fn bench_process_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_state");
    let est = ExpectationEstimator::new();

    for num_qubits in &[2, 6, 10, 14] {
        let sv = prepared_state(*num_qubits);
        let order = Wires::range(*num_qubits);
        let mp = expval(zz(*num_qubits));
        group.bench_with_input(
            BenchmarkId::new("tensor_z", num_qubits),
            num_qubits,
            |b, _| {
                b.iter(|| est.process_state(black_box(&mp), sv.view(), &order).unwrap());
            },
        );
    }

    // Projector shortcut vs generic eigenvalue path
    let sv = prepared_state(10);
    let order = Wires::range(10);
    let proj = BasisStateProjector::new([1, 0, 1, 0, 1, 0, 1, 0, 1, 0], order.clone());
    let special = expval(proj.clone());
    let generic = expval(Obs::generic(std::sync::Arc::new(proj)));
    group.bench_function("projector_special", |b| {
        b.iter(|| est.process_state(black_box(&special), sv.view(), &order).unwrap());
    });
    group.bench_function("projector_generic", |b| {
        b.iter(|| est.process_state(black_box(&generic), sv.view(), &order).unwrap());
    });

    group.finish();
}

/// Benchmark the sampled path with and without binning
fn bench_process_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_samples");
    let est = ExpectationEstimator::new();
    let sv = prepared_state(4);
    let order = Wires::range(4);
    let mp = expval(zz(4));

    for shots in &[100, 1_000, 10_000] {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = sv.sample_bits(*shots, &mut rng).into_dyn();
        group.bench_with_input(BenchmarkId::new("unbinned", shots), shots, |b, _| {
            b.iter(|| {
                est.process_samples(black_box(&mp), samples.view(), &order, None, None)
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("bins_of_10", shots), shots, |b, _| {
            b.iter(|| {
                est.process_samples(black_box(&mp), samples.view(), &order, None, Some(10))
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark broadcasting over a batch of states
fn bench_batched_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched_state");
    let est = ExpectationEstimator::new();
    let order = Wires::range(8);
    let mp = expval(zz(8));

    for size in &[1, 16, 64] {
        let states: Vec<Statevector> = (0..*size).map(|_| prepared_state(8)).collect();
        let stacked = batch(&states).unwrap();
        group.bench_with_input(BenchmarkId::new("batch", size), size, |b, _| {
            b.iter(|| est.process_state(black_box(&mp), stacked.view(), &order).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_process_state,
    bench_process_samples,
    bench_batched_state
);
criterion_main!(benches);
