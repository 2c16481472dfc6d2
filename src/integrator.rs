use crate::dynamics;
use crate::error::SimError;
use crate::model::{PendulumParameters, PendulumState};
use crate::solver::SingularPolicy;

/// Slope of the first-order system at one snapshot: dθ/dt = ω and
/// dω/dt = α(θ, ω).
struct Slope {
    thetas: Vec<f64>,
    omegas: Vec<f64>,
}

fn slope(
    state: &PendulumState,
    params: &PendulumParameters,
    policy: SingularPolicy,
) -> Result<Slope, SimError> {
    Ok(Slope {
        thetas: state.omegas.clone(),
        omegas: dynamics::accelerations(state, params, policy)?,
    })
}

/// The input state displaced by `scale` times a slope.
fn displaced(state: &PendulumState, k: &Slope, scale: f64) -> PendulumState {
    PendulumState {
        thetas: state
            .thetas
            .iter()
            .zip(&k.thetas)
            .map(|(theta, d)| theta + scale * d)
            .collect(),
        omegas: state
            .omegas
            .iter()
            .zip(&k.omegas)
            .map(|(omega, d)| omega + scale * d)
            .collect(),
    }
}

/// One classical fourth-order Runge-Kutta step of size `dt`.
///
/// Pure: the inputs are untouched and a fresh state is returned. Costs
/// exactly four assemble-and-solve evaluations. Under
/// [`SingularPolicy::Reject`] a singular sub-stage aborts the whole step;
/// under the default policy the step always succeeds.
pub fn rk4_step(
    state: &PendulumState,
    params: &PendulumParameters,
    dt: f64,
    policy: SingularPolicy,
) -> Result<PendulumState, SimError> {
    let k1 = slope(state, params, policy)?;
    let k2 = slope(&displaced(state, &k1, 0.5 * dt), params, policy)?;
    let k3 = slope(&displaced(state, &k2, 0.5 * dt), params, policy)?;
    let k4 = slope(&displaced(state, &k3, dt), params, policy)?;

    let n = state.thetas.len();
    let mut thetas = Vec::with_capacity(n);
    let mut omegas = Vec::with_capacity(n);
    for i in 0..n {
        thetas.push(
            state.thetas[i]
                + dt / 6.0 * (k1.thetas[i] + 2.0 * k2.thetas[i] + 2.0 * k3.thetas[i] + k4.thetas[i]),
        );
        omegas.push(
            state.omegas[i]
                + dt / 6.0 * (k1.omegas[i] + 2.0 * k2.omegas[i] + 2.0 * k3.omegas[i] + k4.omegas[i]),
        );
    }

    Ok(PendulumState { thetas, omegas })
}
