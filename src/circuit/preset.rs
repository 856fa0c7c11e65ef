use super::{Circuit, Edge, Loop, VoltageSource};

const R: f64 = 1000.0;
const E1: f64 = 6.0;
const E2: f64 = 5.0;
const E3: f64 = 12.0;

pub(super) fn lab_exercise() -> Circuit {
    let edges = vec![
        Edge::new(1, 2, R),
        Edge::new(1, 3, 2.0 * R),
        Edge::new(1, 6, 2.0 * R),
        Edge::new(2, 4, R),
        Edge::new(2, 5, R),
        Edge::new(2, 7, 0.0),
        Edge::new(3, 4, R),
        Edge::new(3, 8, R),
        Edge::new(4, 7, R),
        Edge::new(5, 6, R),
        Edge::new(5, 8, R),
        Edge::new(6, 8, R),
        Edge::new(7, 8, R),
    ];

    let voltage_sources = vec![
        VoltageSource { from: 1, to: 3, emf: -E1 },
        VoltageSource { from: 1, to: 6, emf: -E2 },
        VoltageSource { from: 2, to: 7, emf: -E3 },
    ];

    let loops = vec![
        Loop::new(&[1, 2, 4, 3]),
        Loop::new(&[1, 2, 5, 6]),
        Loop::new(&[3, 4, 7, 8]),
        Loop::new(&[2, 4, 7]),
        Loop::new(&[2, 5, 8, 7]),
        Loop::new(&[5, 6, 8]),
    ];

    Circuit { num_nodes: 8, edges, voltage_sources, loops }
}
