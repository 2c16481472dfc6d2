use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mass given to links appended by [`PendulumSystem::resize`], in kg.
pub const DEFAULT_MASS: f64 = 10.0;
/// Rod length given to appended links, in m.
pub const DEFAULT_LENGTH: f64 = 1.0;
/// Initial angle given to appended links, in radians from the downward
/// vertical.
pub const DEFAULT_THETA: f64 = 2.0 * PI / 3.0;

/// Physical description of the chain: one mass and one rod length per link,
/// plus the shared gravitational acceleration.
///
/// Invariant: `masses.len() == lengths.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumParameters {
    /// Bob masses in kg.
    pub masses: Vec<f64>,
    /// Rod lengths in m.
    pub lengths: Vec<f64>,
    /// Gravitational acceleration in m/s².
    pub g: f64,
}

impl PendulumParameters {
    pub fn link_count(&self) -> usize {
        self.masses.len()
    }

    /// Full reach of the chain, the sum of all rod lengths.
    pub fn total_length(&self) -> f64 {
        self.lengths.iter().sum()
    }
}

/// Instantaneous configuration of the chain. Angles are measured from the
/// downward vertical and are not wrapped; they may grow without bound.
///
/// Invariant: `thetas.len() == omegas.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    /// Link angles in radians.
    pub thetas: Vec<f64>,
    /// Angular velocities in rad/s.
    pub omegas: Vec<f64>,
}

impl PendulumState {
    /// A motionless state at the given angles.
    pub fn at_rest(thetas: Vec<f64>) -> Self {
        let omegas = vec![0.0; thetas.len()];
        Self { thetas, omegas }
    }

    pub fn link_count(&self) -> usize {
        self.thetas.len()
    }
}

/// Parameters and state bundled so that changing the link count is a single
/// operation over all four sequences. Growing or shrinking them one array at
/// a time is exactly the mismatch the kernel rejects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumSystem {
    pub params: PendulumParameters,
    pub state: PendulumState,
}

impl Default for PendulumSystem {
    /// The two-link configuration the UI starts from.
    fn default() -> Self {
        Self {
            params: PendulumParameters {
                masses: vec![15.0, 10.0],
                lengths: vec![1.5, 1.0],
                g: 9.81,
            },
            state: PendulumState {
                thetas: vec![PI / 2.0, 2.0 * PI / 3.0],
                omegas: vec![0.0, 0.0],
            },
        }
    }
}

impl PendulumSystem {
    /// Grows or shrinks the chain to `count` links, keeping all four
    /// sequences in step. New links get the default mass, length, and angle,
    /// and start motionless.
    pub fn resize(&mut self, count: usize) {
        self.params.masses.resize(count, DEFAULT_MASS);
        self.params.lengths.resize(count, DEFAULT_LENGTH);
        self.state.thetas.resize(count, DEFAULT_THETA);
        self.state.omegas.resize(count, 0.0);
    }

    /// A fresh randomized chain: 1..=7 links, masses 1..50 kg, lengths
    /// 0.5..5 m, gravity 1..30 m/s², angles anywhere on the circle, at rest.
    pub fn randomize<R: Rng>(rng: &mut R) -> Self {
        let count = rng.gen_range(1..=7);
        let masses = (0..count).map(|_| rng.gen_range(1.0..50.0)).collect();
        let lengths = (0..count).map(|_| rng.gen_range(0.5..5.0)).collect();
        let g = rng.gen_range(1.0..30.0);
        let thetas = (0..count).map(|_| rng.gen_range(-PI..PI)).collect();

        Self {
            params: PendulumParameters { masses, lengths, g },
            state: PendulumState::at_rest(thetas),
        }
    }
}

/// Cartesian bob positions by cumulative forward kinematics: bob i sits at
/// bob i−1 plus `lengths[i] · (sin θᵢ, cos θᵢ)`, with the pivot at the
/// origin and y growing downward.
pub fn bob_positions(state: &PendulumState, params: &PendulumParameters) -> Vec<(f64, f64)> {
    let mut positions = Vec::with_capacity(state.thetas.len());
    let mut x = 0.0;
    let mut y = 0.0;
    for (theta, length) in state.thetas.iter().zip(&params.lengths) {
        x += length * theta.sin();
        y += length * theta.cos();
        positions.push((x, y));
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn resize_grows_all_four_sequences_with_defaults() {
        let mut system = PendulumSystem::default();
        system.resize(4);

        assert_eq!(system.params.masses, vec![15.0, 10.0, DEFAULT_MASS, DEFAULT_MASS]);
        assert_eq!(
            system.params.lengths,
            vec![1.5, 1.0, DEFAULT_LENGTH, DEFAULT_LENGTH]
        );
        assert_eq!(system.state.thetas.len(), 4);
        assert_eq!(system.state.thetas[2], DEFAULT_THETA);
        assert_eq!(system.state.omegas, vec![0.0; 4]);
    }

    #[test]
    fn resize_shrinks_all_four_sequences() {
        let mut system = PendulumSystem::default();
        system.resize(1);

        assert_eq!(system.params.masses, vec![15.0]);
        assert_eq!(system.params.lengths, vec![1.5]);
        assert_eq!(system.state.thetas.len(), 1);
        assert_eq!(system.state.omegas.len(), 1);
    }

    #[test]
    fn bob_positions_accumulate_down_the_chain() {
        let params = PendulumParameters {
            masses: vec![1.0, 1.0],
            lengths: vec![1.0, 2.0],
            g: 9.81,
        };
        let state = PendulumState::at_rest(vec![0.0, PI / 2.0]);

        let positions = bob_positions(&state, &params);
        // First rod hangs straight down, second sticks out horizontally.
        assert_abs_diff_eq!(positions[0].0, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(positions[0].1, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(positions[1].0, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(positions[1].1, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn randomize_respects_documented_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let system = PendulumSystem::randomize(&mut rng);
            let n = system.params.link_count();

            assert!((1..=7).contains(&n));
            assert_eq!(system.params.lengths.len(), n);
            assert_eq!(system.state.thetas.len(), n);
            assert_eq!(system.state.omegas, vec![0.0; n]);
            assert!(system.params.masses.iter().all(|m| (1.0..50.0).contains(m)));
            assert!(system.params.lengths.iter().all(|l| (0.5..5.0).contains(l)));
            assert!((1.0..30.0).contains(&system.params.g));
            assert!(system.state.thetas.iter().all(|t| (-PI..PI).contains(t)));
        }
    }
}
