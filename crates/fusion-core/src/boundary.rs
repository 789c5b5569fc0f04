// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Channel Boundary Conditions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dirichlet conditions at the channel ends.
//!
//! A pinned unknown has its equation replaced by the unit row and its known
//! term set to the prescribed value. Temperatures are pinned only where the
//! coolant enters the channel.

use crate::integration::LinearSystem;
use crate::layout::EquationLayout;
use fusion_types::config::{BoundaryMode, FlowDirection};
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{ConductorState, FluidChannel};

/// Channel end nodes `(inlet, outlet)` for the configured flow direction.
pub fn end_nodes(direction: FlowDirection, n_nodes: usize) -> (usize, usize) {
    match direction {
        FlowDirection::Forward => (0, n_nodes - 1),
        FlowDirection::Backward => (n_nodes - 1, 0),
    }
}

/// Coolant enters the channel at `node` (u > 0 at the first node, u < 0 at the last).
fn is_inflow(fluid: &FluidChannel, node: usize) -> bool {
    let u = fluid.node.velocity[node];
    if node == 0 {
        u > 0.0
    } else {
        u < 0.0
    }
}

fn pin(system: &mut LinearSystem, row: usize, value: f64, pinned: &mut Vec<usize>) {
    system.matrix.pin_row(row);
    system.known[row] = value;
    pinned.push(row);
}

/// Apply every channel's boundary mode; returns the pinned global rows.
pub fn apply_boundary_conditions(
    system: &mut LinearSystem,
    layout: &EquationLayout,
    state: &ConductorState,
) -> FusionResult<Vec<usize>> {
    let n_nodes = layout.n_nodes();
    let mut pinned = Vec::new();

    for (j, fluid) in state.fluids.iter().enumerate() {
        let (inlet, outlet) = end_nodes(fluid.flow_direction, n_nodes);
        let v = |node| layout.global(node, layout.velocity(j));
        let p = |node| layout.global(node, layout.pressure(j));
        let t = |node| layout.global(node, layout.temperature(j));

        let temperatures = |system: &mut LinearSystem, pinned: &mut Vec<usize>, t_in, t_out| {
            if is_inflow(fluid, inlet) {
                pin(system, t(inlet), t_in, pinned);
            }
            if is_inflow(fluid, outlet) {
                pin(system, t(outlet), t_out, pinned);
            }
        };

        match fluid.boundary {
            BoundaryMode::FixedPressureTemperature {
                inlet_pressure,
                outlet_pressure,
                inlet_temperature,
                outlet_temperature,
            } => {
                pin(system, p(inlet), inlet_pressure, &mut pinned);
                pin(system, p(outlet), outlet_pressure, &mut pinned);
                temperatures(system, &mut pinned, inlet_temperature, outlet_temperature);
            }
            BoundaryMode::FixedFlowPressure {
                mass_flow_rate,
                outlet_pressure,
                inlet_temperature,
                outlet_temperature,
            }
            | BoundaryMode::FixedFlowPressureAlt {
                mass_flow_rate,
                outlet_pressure,
                inlet_temperature,
                outlet_temperature,
            } => {
                let rho = fluid.node.density[inlet];
                if !(rho > 0.0) {
                    return Err(FusionError::PhysicsViolation(format!(
                        "channel '{}' has inlet density {rho}",
                        fluid.id
                    )));
                }
                let velocity = mass_flow_rate / (rho * fluid.cross_section);
                pin(system, v(inlet), velocity, &mut pinned);
                pin(system, p(outlet), outlet_pressure, &mut pinned);
                temperatures(system, &mut pinned, inlet_temperature, outlet_temperature);
            }
            BoundaryMode::ReservoirSymmetric {
                inlet_pressure,
                inlet_temperature,
                outlet_temperature,
            } => {
                pin(system, p(inlet), inlet_pressure, &mut pinned);
                pin(system, v(outlet), 0.0, &mut pinned);
                temperatures(system, &mut pinned, inlet_temperature, outlet_temperature);
            }
            BoundaryMode::Closed => {
                pin(system, v(inlet), 0.0, &mut pinned);
                pin(system, v(outlet), 0.0, &mut pinned);
            }
        }
    }
    Ok(pinned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_engineering::coolant::{CoolantProperties, IdealGas};
    use fusion_types::state::{CoolantFields, CouplingTable, Grid1D};
    use ndarray::Array1;

    fn state(boundary: BoundaryMode, direction: FlowDirection, velocity: f64) -> ConductorState {
        let mut node = CoolantFields::uniform(4, velocity, 5.0e5, 4.5);
        IdealGas::helium().refresh(&mut node).unwrap();
        let gauss = node.gauss_average();
        ConductorState {
            grid: Grid1D::uniform(1.0, 3),
            fluids: vec![FluidChannel {
                id: "he".into(),
                cross_section: 1e-4,
                hydraulic_diameter: 1e-3,
                friction_factor: 0.005,
                flow_direction: direction,
                boundary,
                node,
                gauss,
                temperature_change: Array1::zeros(3),
            }],
            solids: vec![],
            couplings: CouplingTable::new(),
            time: 0.0,
        }
    }

    fn dense_system(layout: &EquationLayout) -> LinearSystem {
        let mut matrix = layout.new_matrix().unwrap();
        for row in 0..layout.total() {
            for col in matrix.row_columns(row) {
                matrix.set(row, col, 1.0 + (row + 2 * col) as f64).unwrap();
            }
        }
        LinearSystem {
            matrix,
            known: Array1::from_elem(layout.total(), -7.0),
        }
    }

    fn fixed_pt() -> BoundaryMode {
        BoundaryMode::FixedPressureTemperature {
            inlet_pressure: 6.0e5,
            outlet_pressure: 5.0e5,
            inlet_temperature: 5.0,
            outlet_temperature: 6.0,
        }
    }

    #[test]
    fn test_pinned_row_is_unit_vector() {
        let s = state(fixed_pt(), FlowDirection::Forward, 1.0);
        let layout = EquationLayout::for_state(&s).unwrap();
        let mut sys = dense_system(&layout);
        let pinned = apply_boundary_conditions(&mut sys, &layout, &s).unwrap();

        let p_in = layout.global(0, layout.pressure(0));
        assert!(pinned.contains(&p_in));
        for col in sys.matrix.row_columns(p_in) {
            let expected = if col == p_in { 1.0 } else { 0.0 };
            assert_eq!(sys.matrix.get(p_in, col), expected);
        }
        assert_eq!(sys.known[p_in], 6.0e5);
    }

    #[test]
    fn test_temperature_pinned_only_on_inflow() {
        let s = state(fixed_pt(), FlowDirection::Forward, 1.0);
        let layout = EquationLayout::for_state(&s).unwrap();
        let mut sys = dense_system(&layout);
        let pinned = apply_boundary_conditions(&mut sys, &layout, &s).unwrap();
        let t_in = layout.global(0, layout.temperature(0));
        let t_out = layout.global(3, layout.temperature(0));
        assert!(pinned.contains(&t_in));
        assert!(!pinned.contains(&t_out));
        assert_eq!(sys.known[t_in], 5.0);
        assert_eq!(pinned.len(), 3);
    }

    #[test]
    fn test_reverse_flow_pins_outlet_temperature() {
        let s = state(fixed_pt(), FlowDirection::Forward, -1.0);
        let layout = EquationLayout::for_state(&s).unwrap();
        let mut sys = dense_system(&layout);
        let pinned = apply_boundary_conditions(&mut sys, &layout, &s).unwrap();
        let t_out = layout.global(3, layout.temperature(0));
        assert_eq!(pinned.len(), 3);
        assert_eq!(sys.known[t_out], 6.0);
    }

    #[test]
    fn test_backward_flow_swaps_ends() {
        let s = state(fixed_pt(), FlowDirection::Backward, -1.0);
        let layout = EquationLayout::for_state(&s).unwrap();
        let mut sys = dense_system(&layout);
        apply_boundary_conditions(&mut sys, &layout, &s).unwrap();
        assert_eq!(sys.known[layout.global(3, layout.pressure(0))], 6.0e5);
        assert_eq!(sys.known[layout.global(0, layout.pressure(0))], 5.0e5);
        assert_eq!(sys.known[layout.global(3, layout.temperature(0))], 5.0);
    }

    #[test]
    fn test_fixed_flow_velocity_from_mass_rate() {
        for boundary in [
            BoundaryMode::FixedFlowPressure {
                mass_flow_rate: 2e-3,
                outlet_pressure: 5.0e5,
                inlet_temperature: 4.5,
                outlet_temperature: 4.5,
            },
            BoundaryMode::FixedFlowPressureAlt {
                mass_flow_rate: 2e-3,
                outlet_pressure: 5.0e5,
                inlet_temperature: 4.5,
                outlet_temperature: 4.5,
            },
        ] {
            let s = state(boundary, FlowDirection::Forward, 0.1);
            let layout = EquationLayout::for_state(&s).unwrap();
            let mut sys = dense_system(&layout);
            apply_boundary_conditions(&mut sys, &layout, &s).unwrap();
            let rho = s.fluids[0].node.density[0];
            let v_in = sys.known[layout.global(0, layout.velocity(0))];
            assert!((v_in - 2e-3 / (rho * 1e-4)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reservoir_and_closed_pin_velocities() {
        let reservoir = BoundaryMode::ReservoirSymmetric {
            inlet_pressure: 6.0e5,
            inlet_temperature: 4.5,
            outlet_temperature: 4.5,
        };
        let s = state(reservoir, FlowDirection::Forward, 0.0);
        let layout = EquationLayout::for_state(&s).unwrap();
        let mut sys = dense_system(&layout);
        let pinned = apply_boundary_conditions(&mut sys, &layout, &s).unwrap();
        assert_eq!(pinned.len(), 2, "stagnant coolant pins no temperature");
        assert_eq!(sys.known[layout.global(3, layout.velocity(0))], 0.0);

        let s = state(BoundaryMode::Closed, FlowDirection::Forward, 0.3);
        let mut sys = dense_system(&layout);
        let pinned = apply_boundary_conditions(&mut sys, &layout, &s).unwrap();
        assert_eq!(
            pinned,
            vec![
                layout.global(0, layout.velocity(0)),
                layout.global(3, layout.velocity(0))
            ]
        );
    }
}
