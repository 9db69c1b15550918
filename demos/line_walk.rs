use qwalk::prelude::*;
use std::env;
use tracing_subscriber::EnvFilter;

fn parse_arg(args: &[String], i: usize, default: usize) -> usize {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn main() -> Result<(), CircuitError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // line_walk [qubits] [steps] [--qasm]
    let args: Vec<String> = env::args().collect();
    let config = WalkConfig::new(parse_arg(&args, 1, 4))?.with_steps(parse_arg(&args, 2, 1))?;

    let mut walk = LineWalk::<f64>::build(config)?;
    let summary = walk.summary();
    println!(
        "{} vertices, {} steps: {} qubits, {} operations ({} controlled, at most {} controls)",
        config.size(),
        config.steps(),
        summary.qubits,
        summary.operations,
        summary.controlled_operations,
        summary.max_controls
    );

    let outcome = walk.simulate()?;
    for (vertex, p) in outcome.vertex_probabilities().iter().enumerate() {
        println!("{:>4}  {:.6}  {}", vertex, p, "#".repeat((p * 200.0).round() as usize));
    }
    println!(
        "ancillas in |0>: {:.6}",
        outcome.ancilla_zero_probability()
    );

    let counts = outcome.sample_vertices(1000);
    println!("1000 samples: {:?}", counts);

    if args.iter().any(|a| a == "--qasm") {
        print!("{}", walk.builder().to_openqasm());
    }
    Ok(())
}
