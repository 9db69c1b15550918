#[macro_use]
extern crate bencher;

use bencher::Bencher;
use qwalk::prelude::*;

fn bench_build_walk(b: &mut Bencher) {
    let config = WalkConfig::new(3).unwrap();
    b.iter(|| LineWalk::<f64>::build(config).unwrap().summary());
}

fn bench_simulate_walk(b: &mut Bencher) {
    let mut walk = LineWalk::<f64>::build(WalkConfig::default()).unwrap();
    b.iter(|| walk.simulate().unwrap().ancilla_zero_probability());
}

fn bench_edge_oracle(b: &mut Bencher) {
    b.iter(|| {
        let mut builder = LocalBuilder::<f64>::default();
        let res = builder.qubit();
        let v = builder.qudit(4).unwrap();
        let a = builder.qudit(4).unwrap();
        edge_oracle::<f64, _>(&mut builder, res, v, a).unwrap();
        builder.pipeline_depth()
    });
}

fn bench_export_qasm(b: &mut Bencher) {
    let walk = LineWalk::<f64>::build(WalkConfig::default()).unwrap();
    b.iter(|| walk.builder().to_openqasm().len());
}

benchmark_group!(
    benches,
    bench_build_walk,
    bench_simulate_walk,
    bench_edge_oracle,
    bench_export_qasm
);
benchmark_main!(benches);
