use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use yao_circuits::{Circuit, Gate};
use yao_garble_core::{Evaluator, Generator, WireLabels};

/// Builds a layered circuit of alternating AND and XOR gates.
fn layered(inputs: usize, layers: usize) -> Circuit {
    let mut gates = Vec::new();
    let mut prev: Vec<usize> = (0..inputs).collect();
    let mut next_wire = inputs;

    for layer in 0..layers {
        let mut current = Vec::with_capacity(inputs);
        for i in 0..inputs {
            let (x, y) = (prev[i], prev[(i + 1) % inputs]);
            let z = next_wire;
            next_wire += 1;
            gates.push(if layer % 2 == 0 {
                Gate::And { x, y, z }
            } else {
                Gate::Xor { x, y, z }
            });
            current.push(z);
        }
        prev = current;
    }

    Circuit::new(None, next_wire, (0..inputs).collect(), prev, gates).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let circ = layered(256, 64);
    let mut rng = StdRng::seed_from_u64(0);
    let labels = WireLabels::generate(&circ, &mut rng).unwrap();

    let mut gb_group = c.benchmark_group("garble");

    gb_group.bench_function("layered", |b| {
        let gen = Generator::new(&circ, &labels);
        b.iter(|| black_box(gen.garble_all().unwrap()))
    });

    gb_group.bench_function("labels", |b| {
        b.iter(|| black_box(WireLabels::generate(&circ, &mut rng).unwrap()))
    });

    drop(gb_group);

    let mut ev_group = c.benchmark_group("evaluate");

    ev_group.bench_function("layered", |b| {
        let table = Generator::new(&circ, &labels).garble_all().unwrap();
        let choices: Vec<bool> = (0..circ.inputs().len()).map(|_| rng.gen()).collect();
        let inputs: Vec<_> = circ
            .inputs()
            .iter()
            .zip(choices)
            .map(|(wire, bit)| (*wire, labels.label(*wire, bit).unwrap()))
            .collect();

        b.iter(|| {
            let mut ev = Evaluator::new(&circ, inputs.clone()).unwrap();
            ev.evaluate(0..table.len(), &table).unwrap();
            black_box(ev.outputs().unwrap())
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
