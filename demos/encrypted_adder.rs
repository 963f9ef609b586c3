use std::env;

use qotp::{
    GateType,
    backend::{ReadoutNoise, StateVector},
    circuit::StandardBasis,
    config::{QotpConfig, Tolerance},
    protocol::{Client, Server, Session, library},
};
use rand::{SeedableRng, rngs::StdRng};
use serde_json::json;

/// Noise probability for the readout-noise run
const READOUT_ERROR: f64 = 0.02;

fn main() {
    let args: Vec<String> = env::args().collect();
    let json_output = args.contains(&"--json".to_string());
    let (x, y) = (1u64, 2u64);

    let mut server = Server::new(library::two_qubit_adder().unwrap());
    let original = server.circuit.gate_count.clone();
    server.normalize(&StandardBasis).unwrap();

    if !json_output {
        println!("Running encrypted two qubit adder: {x} + {y} mod 4");
        println!(
            "Server circuit: {} gates, {} after normalization, T count {}",
            original.total_gate_count(),
            server.circuit.gate_count.total_gate_count(),
            server.circuit.t_count(&Tolerance::default())
        );
    }

    let mut rng = StdRng::seed_from_u64(0);
    let mut client = Client::with_config(QotpConfig::with_shots(1024));
    let clean = Session::new(&mut client, &server)
        .run(&[x, y], 1, &mut StateVector::seeded(0), &mut rng)
        .unwrap();

    let mut noisy_backend =
        ReadoutNoise::new(StateVector::seeded(1), READOUT_ERROR, StdRng::seed_from_u64(2)).unwrap();
    let noisy = Session::new(&mut client, &server)
        .run(&[x, y], 1, &mut noisy_backend, &mut rng)
        .unwrap();

    if json_output {
        let output = json!({
            "inputs": { "x": x, "y": y },
            "gate_count": {
                "original": original.total_gate_count(),
                "normalized": server.circuit.gate_count.total_gate_count(),
                "t": server.circuit.t_count(&Tolerance::default()),
                "cx": server.circuit.gate_count.get(GateType::Cx),
            },
            "substitutions": clean.substitutions,
            "unverified": clean.unverified,
            "shape": clean.shape.iter().map(|b| format!("{b:02x}")).collect::<String>(),
            "clean": { "value": clean.value, "counts": clean.decrypted },
            "noisy": { "readout_error": READOUT_ERROR, "value": noisy.value, "counts": noisy.decrypted },
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("\n=== CLEAN ===");
        println!("encrypted counts: {:?}", clean.counts);
        println!("decrypted counts: {:?}", clean.decrypted);
        println!("result: {:?}", clean.value);
        println!("\n=== READOUT NOISE p={READOUT_ERROR} ===");
        println!("decrypted counts: {:?}", noisy.decrypted);
        println!("result: {:?}", noisy.value);
    }
}
