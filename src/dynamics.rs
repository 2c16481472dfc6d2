use crate::error::SimError;
use crate::model::{PendulumParameters, PendulumState};
use crate::solver::{self, Matrix, SingularPolicy};

/// Backward cumulative mass sums: `tails[i] = Σ_{k ≥ i} masses[k]`, the mass
/// of link i and everything hanging below it.
///
/// Computed once per assembly in O(n); each entry is then read O(n) times
/// while the coupling matrix is filled.
pub fn tail_masses(masses: &[f64]) -> Vec<f64> {
    let mut tails = vec![0.0; masses.len()];
    let mut sum = 0.0;
    for (tail, mass) in tails.iter_mut().zip(masses).rev() {
        sum += mass;
        *tail = sum;
    }
    tails
}

/// Builds the implicit system `M · α = C` whose solution is the vector of
/// angular accelerations for the current snapshot.
///
/// Each pair of links couples through the tail mass hanging from the outer
/// of the two:
///
/// ```text
/// M[i][j] = lengths[j] · cos(θᵢ − θⱼ) · tails[max(i, j)]
/// C[i]    = −g · sin(θᵢ) · tails[i]
///           − Σⱼ lengths[j] · sin(θᵢ − θⱼ) · ωⱼ² · tails[max(i, j)]
/// ```
///
/// Pure and recomputed from scratch on every call; θ and ω differ between
/// integrator sub-stages, so nothing here may be cached.
pub fn assemble(state: &PendulumState, params: &PendulumParameters) -> (Matrix, Vec<f64>) {
    let n = params.masses.len();
    let tails = tail_masses(&params.masses);

    let mut m = Matrix::zeros(n);
    let mut c = vec![0.0; n];

    for i in 0..n {
        let mut c_i = -params.g * state.thetas[i].sin() * tails[i];
        for j in 0..n {
            let coupling = tails[i.max(j)];
            let delta = state.thetas[i] - state.thetas[j];
            m[(i, j)] = params.lengths[j] * delta.cos() * coupling;
            c_i -= params.lengths[j] * delta.sin() * state.omegas[j] * state.omegas[j] * coupling;
        }
        c[i] = c_i;
    }

    (m, c)
}

/// Angular accelerations for the current snapshot: assemble, then solve.
/// An empty chain skips the solve and yields an empty vector.
pub fn accelerations(
    state: &PendulumState,
    params: &PendulumParameters,
    policy: SingularPolicy,
) -> Result<Vec<f64>, SimError> {
    if params.masses.is_empty() {
        return Ok(Vec::new());
    }
    let (m, c) = assemble(state, params);
    solver::solve(&m, &c, policy)
}

/// Total mechanical energy (kinetic + gravitational potential) of the chain.
///
/// Bob velocities accumulate down the chain the same way positions do;
/// potential is measured against the pivot with depth positive downward, so
/// a chain hanging at rest has negative energy.
pub fn mechanical_energy(state: &PendulumState, params: &PendulumParameters) -> f64 {
    let mut vx = 0.0;
    let mut vy = 0.0;
    let mut depth = 0.0;
    let mut energy = 0.0;

    for i in 0..params.masses.len() {
        let (sin, cos) = state.thetas[i].sin_cos();
        vx += params.lengths[i] * state.omegas[i] * cos;
        vy -= params.lengths[i] * state.omegas[i] * sin;
        depth += params.lengths[i] * cos;
        energy +=
            0.5 * params.masses[i] * (vx * vx + vy * vy) - params.masses[i] * params.g * depth;
    }

    energy
}
