// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Transient Step Orchestrator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One implicit step of the coupled conductor model.
//!
//! Sequence per step: select dt → leakage and nodal loads → element assembly
//! → time scheme → boundary pins → banded solve → distribute the solution,
//! refresh coolant and material properties, margins and diagnostics.
//! Component arrays and history are only written after the solve succeeds.

use crate::assembly::{GlobalOperators, SystemAssembler};
use crate::boundary::apply_boundary_conditions;
use crate::coupling::compute_leakage;
use crate::integration::{combine, StepHistory};
use crate::layout::EquationLayout;
use crate::radiation::jacket_radiation;
use crate::timestep::TimeStepController;
use fusion_engineering::coolant::{CoolantProperties, IdealGas};
use fusion_engineering::materials::ThermalProperties;
use fusion_engineering::strands::update_margins;
use fusion_math::banded::solve_banded;
use fusion_types::config::{ConductorConfig, LeakageConfig, TimeScheme};
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{gauss_average, CoolantFields, ConductorState, Environment};
use ndarray::{Array1, Array2};

/// Keeps the relative change estimate finite for vanishing unknowns.
const EIG_FLOOR: f64 = 1e-5;

/// Result of one call to [`TransientSolver::advance_one_step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub step_number: usize,
    /// Step actually taken [s]; zero when nothing was advanced.
    pub time_step: f64,
    /// Elapsed time after the step [s].
    pub time: f64,
    pub advanced: bool,
}

/// Per local unknown (see [`EquationLayout`]) norms of the last step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDiagnostics {
    pub solution_norm: Array1<f64>,
    pub change_norm: Array1<f64>,
    /// `max_i |Δx_i / dt| / (|x_i| + 1e-5)`, drives step adaptivity.
    pub eigenvalues: Array1<f64>,
}

impl StepDiagnostics {
    fn zeros(n: usize) -> Self {
        StepDiagnostics {
            solution_norm: Array1::zeros(n),
            change_norm: Array1::zeros(n),
            eigenvalues: Array1::zeros(n),
        }
    }
}

pub struct TransientSolver {
    state: ConductorState,
    layout: EquationLayout,
    assembler: SystemAssembler,
    controller: TimeStepController,
    scheme: TimeScheme,
    leakage: LeakageConfig,
    coolant: Box<dyn CoolantProperties>,
    history: Option<StepHistory>,
    time_step: f64,
    steps_taken: usize,
    diagnostics: StepDiagnostics,
}

impl TransientSolver {
    /// Build the initial state from `cfg` with helium as ideal-gas coolant.
    pub fn new(cfg: &ConductorConfig) -> FusionResult<Self> {
        let state = ConductorState::from_config(cfg)?;
        let layout = EquationLayout::for_state(&state)?;
        let mut solver = TransientSolver {
            assembler: SystemAssembler::new(layout, cfg.mass_lumping)?,
            controller: TimeStepController::from_config(&cfg.time),
            scheme: cfg.scheme,
            leakage: cfg.leakage,
            coolant: Box::new(IdealGas::helium()),
            history: None,
            time_step: cfg.time.stp_min,
            steps_taken: 0,
            diagnostics: StepDiagnostics::zeros(layout.dofs_per_node()),
            layout,
            state,
        };
        solver.refresh_properties()?;
        Ok(solver)
    }

    /// Replace the coolant equation of state. Only valid before the first step.
    pub fn with_coolant<C: CoolantProperties + 'static>(mut self, coolant: C) -> FusionResult<Self> {
        if self.history.is_some() {
            return Err(FusionError::ConfigError(
                "coolant cannot change after stepping has started".into(),
            ));
        }
        self.coolant = Box::new(coolant);
        self.refresh_properties()?;
        Ok(self)
    }

    pub fn state(&self) -> &ConductorState {
        &self.state
    }

    pub fn layout(&self) -> &EquationLayout {
        &self.layout
    }

    /// Last step taken [s].
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn diagnostics(&self) -> &StepDiagnostics {
        &self.diagnostics
    }

    pub fn end_time(&self) -> f64 {
        self.controller.end_time
    }

    /// Derived coolant fields, Gauss averages, material properties and margins.
    fn refresh_properties(&mut self) -> FusionResult<()> {
        for fluid in &mut self.state.fluids {
            self.coolant.refresh(&mut fluid.node)?;
        }
        self.state.update_gauss_points();
        self.refresh_solids()
    }

    fn refresh_solids(&mut self) -> FusionResult<()> {
        for solid in &mut self.state.solids {
            let (rho, cp, k) = solid.material.evaluate(&solid.gauss_temperature);
            solid.gauss_density = rho;
            solid.gauss_specific_heat = cp;
            solid.gauss_conductivity = k;
            update_margins(solid)?;
        }
        Ok(())
    }

    /// Heat input per solid and node [W/m]: deposited source, minus the heat
    /// drawn from jackets by `external_heat`, plus jacket radiation.
    pub fn nodal_loads(&self, environment: &Environment, external_heat: &Array2<f64>) -> Array2<f64> {
        let mut load = jacket_radiation(&self.state, environment);
        for (k, solid) in self.state.solids.iter().enumerate() {
            let mut column = load.column_mut(k);
            column += &solid.heat_source;
            if solid.is_jacket() {
                column -= &external_heat.column(k);
            }
        }
        load
    }

    /// Global operators at the current state.
    pub fn assemble(
        &self,
        environment: &Environment,
        external_heat: &Array2<f64>,
    ) -> FusionResult<GlobalOperators> {
        let leakage = compute_leakage(&self.state, &self.leakage)?;
        let loads = self.nodal_loads(environment, external_heat);
        self.assembler
            .assemble(&self.state, environment, &leakage, &loads)
    }

    /// Advance by one adaptively chosen step.
    ///
    /// `external_heat` has shape `(n_nodes, n_solids)`; only jacket columns are
    /// read. A step requested at or past the end time is a no-op.
    pub fn advance_one_step(
        &mut self,
        environment: &Environment,
        external_heat: &Array2<f64>,
        step_number: usize,
    ) -> FusionResult<StepOutcome> {
        let n_nodes = self.layout.n_nodes();
        let n_solids = self.layout.n_solids();
        if external_heat.dim() != (n_nodes, n_solids) {
            return Err(FusionError::ConfigError(format!(
                "external heat has shape {:?}, expected ({n_nodes}, {n_solids})",
                external_heat.dim()
            )));
        }

        let dt = self.controller.select(
            step_number,
            self.time_step,
            self.state.time,
            &self.diagnostics.eigenvalues,
            &self.layout,
        );
        if !(dt > 0.0) {
            log::warn!(
                "step {step_number} requested at t = {:.6e} s with no time left before {:.6e} s",
                self.state.time,
                self.controller.end_time
            );
            return Ok(StepOutcome {
                step_number,
                time_step: 0.0,
                time: self.state.time,
                advanced: false,
            });
        }

        let ops = self.assemble(environment, external_heat)?;
        let stiffness = ops.stiffness()?;
        let x_n = self.layout.pack(&self.state);
        let scheme = self.scheme;
        let history = self
            .history
            .get_or_insert_with(|| StepHistory::seeded(&scheme, &stiffness, &ops.load, &x_n));

        let mut system = combine(&scheme, &ops.mass, &stiffness, &ops.load, history, dt)?;
        apply_boundary_conditions(&mut system, &self.layout, &self.state)?;
        let x_new = solve_banded(system.matrix, system.known)?;

        let mut coolant = Vec::with_capacity(self.state.n_fluids());
        for (j, fluid) in self.state.fluids.iter().enumerate() {
            let mut node: CoolantFields = fluid.node.clone();
            node.velocity = self.layout.nodal_values(&x_new, self.layout.velocity(j));
            node.pressure = self.layout.nodal_values(&x_new, self.layout.pressure(j));
            node.temperature = self.layout.nodal_values(&x_new, self.layout.temperature(j));
            self.coolant.refresh(&mut node)?;
            coolant.push(node);
        }

        history.commit(stiffness, ops.load, x_new.clone());
        self.diagnostics = self.diagnostics_for(&x_n, &x_new, dt);

        for (fluid, node) in self.state.fluids.iter_mut().zip(coolant) {
            let gauss = node.gauss_average();
            fluid.temperature_change = &gauss.temperature - &fluid.gauss.temperature;
            fluid.node = node;
            fluid.gauss = gauss;
        }
        for (k, solid) in self.state.solids.iter_mut().enumerate() {
            let node = self.layout.nodal_values(&x_new, self.layout.solid(k));
            let gauss = gauss_average(&node);
            solid.temperature_change = &gauss - &solid.gauss_temperature;
            solid.node_temperature = node;
            solid.gauss_temperature = gauss;
        }
        self.refresh_solids()?;

        self.state.time += dt;
        self.time_step = dt;
        self.steps_taken += 1;

        log::debug!(
            "step {step_number}: dt = {dt:.4e} s, t = {:.6e} s, max change = {:.3e}",
            self.state.time,
            self.diagnostics.change_norm.iter().cloned().fold(0.0, f64::max)
        );

        Ok(StepOutcome {
            step_number,
            time_step: dt,
            time: self.state.time,
            advanced: true,
        })
    }

    /// Step until the end time; returns the number of steps taken by this call.
    pub fn run_until_end(
        &mut self,
        environment: &Environment,
        external_heat: &Array2<f64>,
    ) -> FusionResult<usize> {
        let mut taken = 0;
        loop {
            let outcome = self.advance_one_step(environment, external_heat, self.steps_taken + 1)?;
            if !outcome.advanced {
                break;
            }
            taken += 1;
        }
        Ok(taken)
    }

    fn diagnostics_for(&self, x_old: &Array1<f64>, x_new: &Array1<f64>, dt: f64) -> StepDiagnostics {
        let n = self.layout.dofs_per_node();
        let mut diag = StepDiagnostics::zeros(n);
        for local in 0..n {
            let new = self.layout.nodal_values(x_new, local);
            let change = &new - &self.layout.nodal_values(x_old, local);
            diag.solution_norm[local] = new.dot(&new).sqrt();
            diag.change_norm[local] = change.dot(&change).sqrt();
            diag.eigenvalues[local] = change
                .iter()
                .zip(new.iter())
                .map(|(d, x)| (d / dt).abs() / (x.abs() + EIG_FLOOR))
                .fold(0.0, f64::max);
        }
        diag
    }
}
