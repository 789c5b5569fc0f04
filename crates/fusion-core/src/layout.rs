// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Equation Layout
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ordering of unknowns in the global system.
//!
//! Per node: `[v_0..v_{nf-1}, p_0..p_{nf-1}, T_0..T_{nf-1}, Ts_0..Ts_{ns-1}]`.
//! Global index = `node · dofs_per_node + local`.

use fusion_math::banded::BandedMatrix;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::ConductorState;
use ndarray::Array1;

/// Physical meaning of a local unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DofKind {
    Velocity(usize),
    Pressure(usize),
    FluidTemperature(usize),
    SolidTemperature(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquationLayout {
    n_fluids: usize,
    n_solids: usize,
    n_nodes: usize,
}

impl EquationLayout {
    pub fn new(n_fluids: usize, n_solids: usize, n_nodes: usize) -> FusionResult<Self> {
        if n_fluids + n_solids == 0 {
            return Err(FusionError::ConfigError(
                "conductor has no components".into(),
            ));
        }
        if n_nodes < 2 {
            return Err(FusionError::ConfigError(format!(
                "need at least two nodes, got {n_nodes}"
            )));
        }
        Ok(EquationLayout {
            n_fluids,
            n_solids,
            n_nodes,
        })
    }

    pub fn for_state(state: &ConductorState) -> FusionResult<Self> {
        Self::new(state.n_fluids(), state.n_solids(), state.grid.n_nodes)
    }

    pub fn n_fluids(&self) -> usize {
        self.n_fluids
    }

    pub fn n_solids(&self) -> usize {
        self.n_solids
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn dofs_per_node(&self) -> usize {
        3 * self.n_fluids + self.n_solids
    }

    pub fn total(&self) -> usize {
        self.n_nodes * self.dofs_per_node()
    }

    /// Two-node elements couple every unknown of a node pair.
    pub fn half_bandwidth(&self) -> usize {
        2 * self.dofs_per_node() - 1
    }

    pub fn velocity(&self, fluid: usize) -> usize {
        fluid
    }

    pub fn pressure(&self, fluid: usize) -> usize {
        self.n_fluids + fluid
    }

    pub fn temperature(&self, fluid: usize) -> usize {
        2 * self.n_fluids + fluid
    }

    pub fn solid(&self, solid: usize) -> usize {
        3 * self.n_fluids + solid
    }

    pub fn global(&self, node: usize, local: usize) -> usize {
        node * self.dofs_per_node() + local
    }

    pub fn kind(&self, local: usize) -> DofKind {
        let nf = self.n_fluids;
        match local {
            l if l < nf => DofKind::Velocity(l),
            l if l < 2 * nf => DofKind::Pressure(l - nf),
            l if l < 3 * nf => DofKind::FluidTemperature(l - 2 * nf),
            l => DofKind::SolidTemperature(l - 3 * nf),
        }
    }

    /// Zero system matrix sized for this layout.
    pub fn new_matrix(&self) -> FusionResult<BandedMatrix> {
        BandedMatrix::new(self.total(), self.half_bandwidth())
    }

    /// Gather the node arrays of `state` into one solution vector.
    pub fn pack(&self, state: &ConductorState) -> Array1<f64> {
        let mut x = Array1::zeros(self.total());
        for node in 0..self.n_nodes {
            for (j, fluid) in state.fluids.iter().enumerate() {
                x[self.global(node, self.velocity(j))] = fluid.node.velocity[node];
                x[self.global(node, self.pressure(j))] = fluid.node.pressure[node];
                x[self.global(node, self.temperature(j))] = fluid.node.temperature[node];
            }
            for (k, solid) in state.solids.iter().enumerate() {
                x[self.global(node, self.solid(k))] = solid.node_temperature[node];
            }
        }
        x
    }

    /// Values of local unknown `local` at every node.
    pub fn nodal_values(&self, x: &Array1<f64>, local: usize) -> Array1<f64> {
        Array1::from_shape_fn(self.n_nodes, |node| x[self.global(node, local)])
    }
}
