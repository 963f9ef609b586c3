use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};

use qotp::{
    Circuit, Instruction, KeyTable, QubitId,
    circuit::{Normalizer, StandardBasis, update_keys},
};

/// Layers of Toffolis over `width` lines, normalized to Clifford+T.
fn toffoli_ladder(width: usize, layers: usize) -> Circuit {
    let mut c = Circuit::new(width);
    for layer in 0..layers {
        for i in 0..width - 2 {
            let shift = (i + layer) % width;
            let [a, b, t] = [shift, (shift + 1) % width, (shift + 2) % width].map(QubitId);
            c.add_gate(Instruction::h(a)).unwrap();
            c.add_gate(Instruction::ccx(a, b, t)).unwrap();
        }
    }
    StandardBasis.normalize(&c).unwrap()
}

fn bench_update_keys(criterion: &mut Criterion) {
    let width = 16;
    let mut rng = StdRng::seed_from_u64(0);
    let server = toffoli_ladder(width, 64);

    // one extra line for the dummy
    let mut circuit = Circuit::new(width + 1);
    circuit.compose(&server, 0, 0).unwrap();
    let keys = KeyTable::random(width, &mut rng);

    criterion.bench_function("update_keys", |b| {
        b.iter(|| {
            let mut keys = keys.clone();
            let update = update_keys(&mut keys, black_box(&circuit), QubitId(width)).unwrap();
            black_box(update.substitutions.len())
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_update_keys
);

criterion_main!(benches);
