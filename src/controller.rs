use crate::error::SimError;
use crate::integrator;
use crate::model::{PendulumParameters, PendulumState};
use crate::solver::SingularPolicy;

/// Simulated seconds advanced per tick, independent of any rendering frame
/// rate. The driving loop decides how many ticks to run per real-time frame.
pub const DT: f64 = 0.01;

/// Owns the authoritative simulation state and advances it tick by tick.
///
/// The state is replaced wholesale on every [`step`](Self::step) and
/// [`reset`](Self::reset); it is never mutated field by field from outside
/// and never aliased across callers.
#[derive(Debug, Clone)]
pub struct SimulationController {
    params: PendulumParameters,
    state: PendulumState,
    policy: SingularPolicy,
}

impl SimulationController {
    /// Rejects construction outright if state and parameters disagree on the
    /// number of links.
    pub fn new(
        params: PendulumParameters,
        state: PendulumState,
        policy: SingularPolicy,
    ) -> Result<Self, SimError> {
        check_dimensions(&params, &state)?;
        Ok(Self {
            params,
            state,
            policy,
        })
    }

    /// Advances the owned state by one tick of [`DT`] simulated seconds.
    ///
    /// The dimension invariant is re-checked first: a caller that swapped in
    /// a mismatched state via [`reset`](Self::reset) gets an error here
    /// rather than a corrupted solve.
    pub fn step(&mut self) -> Result<(), SimError> {
        check_dimensions(&self.params, &self.state)?;
        self.state = integrator::rk4_step(&self.state, &self.params, DT, self.policy)?;
        Ok(())
    }

    /// Unconditionally replaces the owned state, discarding any accumulated
    /// trajectory. Parameters are untouched.
    pub fn reset(&mut self, state: PendulumState) {
        self.state = state;
    }

    /// Stop-the-world reconfiguration: swaps parameters and state together
    /// after validating that they agree, the only safe way to change the
    /// link count.
    pub fn reconfigure(
        &mut self,
        params: PendulumParameters,
        state: PendulumState,
    ) -> Result<(), SimError> {
        check_dimensions(&params, &state)?;
        self.params = params;
        self.state = state;
        Ok(())
    }

    pub fn state(&self) -> &PendulumState {
        &self.state
    }

    pub fn params(&self) -> &PendulumParameters {
        &self.params
    }
}

fn check_dimensions(params: &PendulumParameters, state: &PendulumState) -> Result<(), SimError> {
    let n = params.masses.len();
    if params.lengths.len() != n || state.thetas.len() != n || state.omegas.len() != n {
        return Err(SimError::DimensionMismatch {
            state: state.thetas.len(),
            params: n,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PendulumSystem;

    fn two_link() -> PendulumSystem {
        PendulumSystem::default()
    }

    #[test]
    fn rejects_mismatched_construction() {
        let system = two_link();
        let short_state = PendulumState::at_rest(vec![0.5]);

        let err = SimulationController::new(system.params, short_state, SingularPolicy::default())
            .unwrap_err();
        assert_eq!(err, SimError::DimensionMismatch { state: 1, params: 2 });
    }

    #[test]
    fn step_replaces_the_owned_state() {
        let system = two_link();
        let mut controller =
            SimulationController::new(system.params, system.state.clone(), SingularPolicy::default())
                .unwrap();

        controller.step().unwrap();
        assert_ne!(*controller.state(), system.state);
        assert_eq!(controller.state().link_count(), 2);
    }

    #[test]
    fn step_rejects_state_swapped_in_with_wrong_length() {
        let system = two_link();
        let mut controller =
            SimulationController::new(system.params, system.state, SingularPolicy::default())
                .unwrap();

        controller.reset(PendulumState::at_rest(vec![0.1, 0.2, 0.3]));
        let err = controller.step().unwrap_err();
        assert_eq!(err, SimError::DimensionMismatch { state: 3, params: 2 });
    }

    #[test]
    fn reset_keeps_parameters() {
        let system = two_link();
        let mut controller =
            SimulationController::new(system.params.clone(), system.state, SingularPolicy::default())
                .unwrap();

        let replacement = PendulumState::at_rest(vec![0.0, 0.0]);
        controller.reset(replacement.clone());
        assert_eq!(*controller.state(), replacement);
        assert_eq!(*controller.params(), system.params);
    }

    #[test]
    fn reconfigure_resizes_both_sides_together() {
        let mut system = two_link();
        let mut controller = SimulationController::new(
            system.params.clone(),
            system.state.clone(),
            SingularPolicy::default(),
        )
        .unwrap();

        system.resize(4);
        controller
            .reconfigure(system.params, system.state)
            .unwrap();
        controller.step().unwrap();
        assert_eq!(controller.state().link_count(), 4);
    }

    #[test]
    fn reconfigure_rejects_one_sided_growth() {
        let system = two_link();
        let mut controller = SimulationController::new(
            system.params.clone(),
            system.state.clone(),
            SingularPolicy::default(),
        )
        .unwrap();

        // Parameters grown to four links, state left at two.
        let mut grown = system.params;
        grown.masses.extend([10.0, 10.0]);
        grown.lengths.extend([1.0, 1.0]);
        let err = controller.reconfigure(grown, system.state).unwrap_err();
        assert_eq!(err, SimError::DimensionMismatch { state: 2, params: 4 });
    }

    #[test]
    fn empty_chain_steps_without_error() {
        let params = PendulumParameters {
            masses: vec![],
            lengths: vec![],
            g: 9.81,
        };
        let mut controller = SimulationController::new(
            params,
            PendulumState::at_rest(vec![]),
            SingularPolicy::default(),
        )
        .unwrap();

        controller.step().unwrap();
        assert_eq!(controller.state().link_count(), 0);
    }
}
