use qotp::{
    backend::{Counts, ExecutionBackend, ReadoutNoise, StateVector},
    circuit::{
        Circuit, Normalizer, StandardBasis, commitment::shape_commit, compose, decrypt_counts,
        decryption::decrypt_value, encrypt, encryption::encrypt_with_keys, update_keys,
    },
    protocol::{Client, Server, Session, library},
    *,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use test_log::test;

fn trng() -> StdRng {
    StdRng::seed_from_u64(0)
}

fn keys(masks: &[(u8, u8)]) -> KeyTable {
    KeyTable::from_masks(masks.iter().copied().map(Mask::from))
}

/// Plaintext run of `server` on `value` with the same measurement layout.
fn plain_support(value: u64, width: usize, server: &Circuit) -> Counts {
    let mut c = Circuit::new(server.num_qubits.max(width));
    for i in 0..width {
        if value >> i & 1 == 1 {
            c.add_gate(Instruction::x(QubitId(i))).unwrap();
        }
    }
    c.compose(server, 0, 0).unwrap();
    StateVector::seeded(0).execute(&c, 256).unwrap()
}

/// Encrypts, composes, walks, runs and decrypts a single register starting at line 0.
fn encrypted_run(
    value: u64,
    width: usize,
    table: KeyTable,
    server: &Circuit,
) -> (Counts, KeyTable) {
    let ciphertext = encrypt_with_keys(value, width, table, 0).unwrap();
    let composition = compose(&[ciphertext], server).unwrap();

    let mut keys = composition.keys.clone();
    let update = update_keys(&mut keys, &composition.circuit, composition.dummy).unwrap();
    assert!(update.is_exact());

    let mut circuit = update.circuit;
    circuit.measure((0..width).map(QubitId)).unwrap();
    let counts = StateVector::seeded(1).execute(&circuit, 256).unwrap();
    (decrypt_counts(&keys, &counts, 0).unwrap(), keys)
}

#[test]
fn test_mask_round_trip() {
    let mut rng = trng();
    for _ in 0..32 {
        let value = rng.random_range(0..64u64);
        let ciphertext = encrypt(value, 6, 0, &mut rng).unwrap();
        let composition = compose(&[ciphertext.clone()], &Circuit::new(6)).unwrap();

        let mut keys = composition.keys.clone();
        let update = update_keys(&mut keys, &composition.circuit, composition.dummy).unwrap();
        assert_eq!(keys, composition.keys);

        let mut circuit = update.circuit;
        circuit.measure(ciphertext.range().map(QubitId)).unwrap();
        let counts = StateVector::seeded(0).execute(&circuit, 4).unwrap();
        let (measured, _) = counts.iter().next().unwrap();
        assert_eq!(decrypt_value(&keys, measured, 0), Ok(value));
    }
}

#[test]
fn test_hadamard_then_cnot_scenario() {
    let mut server = Circuit::new(2);
    server
        .extend([
            Instruction::h(QubitId(0)),
            Instruction::cx(QubitId(0), QubitId(1)),
        ])
        .unwrap();

    let (decrypted, final_keys) = encrypted_run(3, 2, keys(&[(1, 0), (0, 1)]), &server);

    assert_eq!(final_keys.get(QubitId(0)), Ok(Mask::from((0, 0))));
    assert_eq!(final_keys.get(QubitId(1)), Ok(Mask::from((0, 1))));

    // |11> -> H on line 0 -> CX: the logical outcome is "01" or "10", never "11"
    let plain = plain_support(3, 2, &server);
    assert_eq!(
        decrypted.keys().collect::<Vec<_>>(),
        plain.keys().collect::<Vec<_>>()
    );
}

#[test]
fn test_decrypt_ignores_z_component() {
    let mut server = Circuit::new(3);
    server
        .extend([
            Instruction::cx(QubitId(0), QubitId(1)),
            Instruction::s(QubitId(2)),
            Instruction::cx(QubitId(2), QubitId(0)),
        ])
        .unwrap();

    let (a, _) = encrypted_run(5, 3, keys(&[(1, 0), (0, 0), (1, 1)]), &server);
    let (b, _) = encrypted_run(5, 3, keys(&[(1, 1), (0, 1), (1, 0)]), &server);
    assert_eq!(a, b);
    assert_eq!(a.len(), 1);
}

#[test]
fn test_t_gates_decrypt_exactly() {
    // H T T T T H = H Z H = X
    let mut server = Circuit::new(1);
    server.add_gate(Instruction::h(QubitId(0))).unwrap();
    for _ in 0..4 {
        server.add_gate(Instruction::t(QubitId(0))).unwrap();
    }
    server.add_gate(Instruction::h(QubitId(0))).unwrap();

    for masks in [[(0, 0)], [(1, 0)], [(0, 1)], [(1, 1)]] {
        let table = keys(&[masks[0], (0, 0)]);
        for value in [0, 1] {
            let (decrypted, _) = encrypted_run(value, 2, table.clone(), &server);
            let expected = format!("0{}", value ^ 1);
            assert_eq!(decrypted.keys().collect::<Vec<_>>(), [&expected], "{masks:?}");
        }
    }
}

#[test]
fn test_one_line_server_gets_minimum_register() {
    let mut server = Circuit::new(1);
    server.add_gate(Instruction::h(QubitId(0))).unwrap();
    for _ in 0..4 {
        server.add_gate(Instruction::t(QubitId(0))).unwrap();
    }
    server.add_gate(Instruction::h(QubitId(0))).unwrap();

    let mut rng = trng();
    for _ in 0..8 {
        for value in [0, 1] {
            let ciphertext = encrypt(value, server.num_qubits, 0, &mut rng).unwrap();
            assert_eq!(ciphertext.width(), 2);

            let composition = compose(&[ciphertext], &server).unwrap();
            assert_eq!(composition.dummy, QubitId(2));

            let mut keys = composition.keys.clone();
            let update = update_keys(&mut keys, &composition.circuit, composition.dummy).unwrap();
            assert!(update.is_exact());
            assert_eq!(update.substitutions.len(), 4);

            let mut circuit = update.circuit;
            circuit.measure([QubitId(0), QubitId(1)]).unwrap();
            let counts = StateVector::seeded(2).execute(&circuit, 32).unwrap();
            let decrypted = decrypt_counts(&keys, &counts, 0).unwrap();
            assert_eq!(decrypted, Counts::from([(format!("0{}", value ^ 1), 32)]));
        }
    }
}

#[test]
fn test_encrypted_toffoli_truth_table() {
    let server = StandardBasis.normalize(&library::toffoli().unwrap()).unwrap();
    let mut rng = trng();

    for value in 0..8u64 {
        let table = KeyTable::random(3, &mut rng);
        let (decrypted, _) = encrypted_run(value, 3, table, &server);
        let expected = if value & 0b11 == 0b11 { value ^ 0b100 } else { value };
        assert_eq!(
            decrypted,
            Counts::from([(format!("{expected:03b}"), 256)]),
            "input {value:03b}"
        );
    }
}

#[test]
fn test_walked_shape_does_not_depend_on_keys() {
    let server = StandardBasis.normalize(&library::toffoli().unwrap()).unwrap();
    let mut wide = Circuit::new(4);
    wide.compose(&server, 0, 0).unwrap();

    let mut rng = trng();
    let mut shapes = Vec::new();
    let mut corrected_lines = Vec::new();
    for _ in 0..16 {
        let mut table = KeyTable::random(3, &mut rng);
        let update = update_keys(&mut table, &wide, QubitId(3)).unwrap();
        shapes.push(shape_commit(&update.circuit));
        corrected_lines.push(
            update
                .substitutions
                .iter()
                .map(|s| s.corrected())
                .collect::<Vec<_>>(),
        );
    }

    assert!(shapes.windows(2).all(|w| w[0] == w[1]));
    // the key draws did take different branches
    assert!(corrected_lines.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn test_session_with_readout_noise() {
    let mut server = Server::new(library::two_qubit_adder().unwrap());
    server.normalize(&StandardBasis).unwrap();

    let mut client = Client::new();
    let mut backend =
        ReadoutNoise::new(StateVector::seeded(5), 0.02, StdRng::seed_from_u64(6)).unwrap();
    let report = Session::new(&mut client, &server)
        .run(&[3, 2], 1, &mut backend, &mut trng())
        .unwrap();

    assert!(report.is_exact());
    assert_eq!(report.value, Some(1));
    assert_eq!(report.decrypted.values().sum::<usize>(), client.config.shots);
}
