// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Finite-Element Assembly
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear two-node elements for the coupled channel/solid equations.
//!
//! Each channel carries mass, momentum and energy in (v, p, T) form,
//! `M ẋ + A ∂x/∂z − ∂/∂z(K ∂x/∂z) + S x = q`, and each solid carries
//! transient conduction. Coefficients are frozen at the element Gauss point
//! (midpoint) and the local `N × N` blocks are expanded into `2N × 2N`
//! element matrices:
//!
//! - mass: `dx · [[1/3 + α, 1/6 − α], [1/6 − α, 1/3 + α]] ⊗ M`
//! - convection: `[[−1/2, 1/2], [−1/2, 1/2]] ⊗ A`
//! - diffusion: `1/dx · [[1, −1], [−1, 1]] ⊗ K`
//! - source: `dx · [[1/3, 1/6], [1/6, 1/3]] ⊗ S`
//! - load: `dx/6 · [2q₀ + q₁, q₀ + 2q₁]`
//!
//! where α blends consistent (0) and lumped (1/6) mass.

use crate::coupling::LeakageTable;
use crate::layout::EquationLayout;
use fusion_math::banded::BandedMatrix;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{ConductorState, Environment, Interface};
use ndarray::{Array1, Array2};

/// Global operators of one step, before time discretization.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalOperators {
    pub mass: BandedMatrix,
    pub convection: BandedMatrix,
    pub diffusion: BandedMatrix,
    pub source: BandedMatrix,
    pub load: Array1<f64>,
}

impl GlobalOperators {
    pub fn zeros(layout: &EquationLayout) -> FusionResult<Self> {
        let mass = layout.new_matrix()?;
        Ok(GlobalOperators {
            convection: mass.zeros_like(),
            diffusion: mass.zeros_like(),
            source: mass.zeros_like(),
            mass,
            load: Array1::zeros(layout.total()),
        })
    }

    /// `A + K + S`.
    pub fn stiffness(&self) -> FusionResult<BandedMatrix> {
        let mut total = self.convection.clone();
        total.scaled_add(1.0, &self.diffusion)?;
        total.scaled_add(1.0, &self.source)?;
        Ok(total)
    }
}

/// Local Gauss-point blocks of one element.
#[derive(Debug, Clone)]
pub struct LocalMatrices {
    pub mass: Array2<f64>,
    pub convection: Array2<f64>,
    pub diffusion: Array2<f64>,
    pub source: Array2<f64>,
    /// Load at the left and right node.
    pub load_left: Array1<f64>,
    pub load_right: Array1<f64>,
}

impl LocalMatrices {
    fn zeros(n: usize) -> Self {
        LocalMatrices {
            mass: Array2::zeros((n, n)),
            convection: Array2::zeros((n, n)),
            diffusion: Array2::zeros((n, n)),
            source: Array2::zeros((n, n)),
            load_left: Array1::zeros(n),
            load_right: Array1::zeros(n),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemAssembler {
    layout: EquationLayout,
    /// 0 = consistent, 1/6 = lumped.
    mass_lumping: f64,
}

impl SystemAssembler {
    pub fn new(layout: EquationLayout, mass_lumping: f64) -> FusionResult<Self> {
        if !(0.0..=1.0 / 6.0).contains(&mass_lumping) {
            return Err(FusionError::ConfigError(format!(
                "mass_lumping must lie in [0, 1/6], got {mass_lumping}"
            )));
        }
        Ok(SystemAssembler {
            layout,
            mass_lumping,
        })
    }

    pub fn layout(&self) -> &EquationLayout {
        &self.layout
    }

    /// Assemble every element into the banded global operators.
    ///
    /// `solid_load` holds the nodal heat input of each solid [W/m],
    /// shape `(n_nodes, n_solids)`.
    pub fn assemble(
        &self,
        state: &ConductorState,
        environment: &Environment,
        leakage: &LeakageTable,
        solid_load: &Array2<f64>,
    ) -> FusionResult<GlobalOperators> {
        let mut ops = GlobalOperators::zeros(&self.layout)?;
        for e in 0..state.grid.n_elements() {
            let local = self.local_matrices(state, environment, leakage, solid_load, e)?;
            self.scatter(&mut ops, &local, e, state.grid.dx[e])?;
        }
        Ok(ops)
    }

    /// Gauss-point blocks of element `e`.
    pub fn local_matrices(
        &self,
        state: &ConductorState,
        environment: &Environment,
        leakage: &LeakageTable,
        solid_load: &Array2<f64>,
        e: usize,
    ) -> FusionResult<LocalMatrices> {
        let lay = &self.layout;
        let n = lay.dofs_per_node();
        let dx = state.grid.dx[e];
        let mut lm = LocalMatrices::zeros(n);

        for (j, fluid) in state.fluids.iter().enumerate() {
            let g = &fluid.gauss;
            let (iv, ip, it) = (lay.velocity(j), lay.pressure(j), lay.temperature(j));
            let (u, rho, c, phi, t) = (
                g.velocity[e],
                g.density[e],
                g.speed_of_sound[e],
                g.gruneisen[e],
                g.temperature[e],
            );
            let cv = g.isochoric_specific_heat[e];

            for &i in &[iv, ip, it] {
                lm.mass[[i, i]] = 1.0;
                lm.convection[[i, i]] = u;
                lm.diffusion[[i, i]] = 0.5 * dx * u.abs();
            }
            lm.convection[[iv, ip]] = 1.0 / rho;
            lm.convection[[ip, iv]] = c * c * rho;
            lm.convection[[it, iv]] = phi * t;

            let friction = 2.0 * fluid.friction_factor * u.abs() / fluid.hydraulic_diameter;
            lm.source[[iv, iv]] = friction;
            lm.source[[ip, iv]] = -friction * phi * rho * u;
            lm.source[[it, iv]] = -friction * u / cv;
        }

        for (k, solid) in state.solids.iter().enumerate() {
            let is_ = lay.solid(k);
            let geom = solid.cross_section / solid.cos_theta;
            lm.mass[[is_, is_]] = geom * solid.gauss_density[e] * solid.gauss_specific_heat[e];
            lm.diffusion[[is_, is_]] = geom * solid.gauss_conductivity[e];
            lm.load_left[is_] = solid_load[[e, k]];
            lm.load_right[is_] = solid_load[[e + 1, k]];

            if let Some(contact) = environment.contact(k) {
                let coef = contact.exposure.coefficient(e);
                lm.source[[is_, is_]] += coef;
                lm.load_left[is_] += coef * environment.temperature;
                lm.load_right[is_] += coef * environment.temperature;
            }
        }

        let nf = state.n_fluids();
        for (pair, interface) in state.couplings.iter() {
            let (a, b) = (pair.first(), pair.second());
            match interface {
                Interface::ChannelChannel {
                    open_perimeter,
                    closed_perimeter,
                    htc_open,
                    htc_closed,
                } => {
                    let pl = leakage.get(a, b)?;
                    let (k1, k2, k3) = (pl.k1[e], pl.k2[e], pl.k3[e]);
                    let h = open_perimeter * htc_open[e] + closed_perimeter * htc_closed[e];
                    for (j, other) in [(a, b), (b, a)] {
                        let g = &state.fluids[j].gauss;
                        let area = state.fluids[j].cross_section;
                        let (u, rho, c, phi, t, cv, enth) = (
                            g.velocity[e],
                            g.density[e],
                            g.speed_of_sound[e],
                            g.gruneisen[e],
                            g.temperature[e],
                            g.isochoric_specific_heat[e],
                            g.enthalpy[e],
                        );
                        let (iv, ip, it) = (lay.velocity(j), lay.pressure(j), lay.temperature(j));
                        let (op, ot) = (lay.pressure(other), lay.temperature(other));
                        let kinetic = enth - 0.5 * u * u;

                        let momentum = (k1 * u - k2) / (area * rho);
                        lm.source[[iv, ip]] -= momentum;
                        lm.source[[iv, op]] += momentum;

                        let pressure_work = phi / area * (k3 - u * k2 - (kinetic - c * c / phi) * k1);
                        lm.source[[ip, ip]] += pressure_work;
                        lm.source[[ip, op]] -= pressure_work;
                        lm.source[[ip, it]] += phi / area * h;
                        lm.source[[ip, ot]] -= phi / area * h;

                        let energy =
                            (k3 - u * k2 - (kinetic - phi * cv * t) * k1) / (rho * cv * area);
                        lm.source[[it, ip]] += energy;
                        lm.source[[it, op]] -= energy;
                        let conduction = h / (rho * cv * area);
                        lm.source[[it, it]] += conduction;
                        lm.source[[it, ot]] -= conduction;
                    }
                }
                Interface::ChannelSolid { perimeter, htc } => {
                    // Canonical order puts the channel first.
                    let (j, k) = (a, b - nf);
                    let ph = perimeter * htc[e];
                    let g = &state.fluids[j].gauss;
                    let area = state.fluids[j].cross_section;
                    let (ip, it, is_) = (lay.pressure(j), lay.temperature(j), lay.solid(k));

                    let pressure_heat = g.gruneisen[e] / area * ph;
                    lm.source[[ip, it]] += pressure_heat;
                    lm.source[[ip, is_]] -= pressure_heat;
                    let fluid_heat = ph / (g.density[e] * g.isochoric_specific_heat[e] * area);
                    lm.source[[it, it]] += fluid_heat;
                    lm.source[[it, is_]] -= fluid_heat;

                    lm.source[[is_, is_]] += ph;
                    lm.source[[is_, it]] -= ph;
                }
                Interface::SolidSolid { perimeter, htc, .. } => {
                    let (ia, ib) = (lay.solid(a - nf), lay.solid(b - nf));
                    let ph = perimeter * htc[e];
                    lm.source[[ia, ia]] += ph;
                    lm.source[[ia, ib]] -= ph;
                    lm.source[[ib, ib]] += ph;
                    lm.source[[ib, ia]] -= ph;
                }
            }
        }
        Ok(lm)
    }

    /// Expand local blocks into element matrices and add them at offset `e · N`.
    fn scatter(
        &self,
        ops: &mut GlobalOperators,
        local: &LocalMatrices,
        e: usize,
        dx: f64,
    ) -> FusionResult<()> {
        let n = self.layout.dofs_per_node();
        let alpha = self.mass_lumping;
        let left = self.layout.global(e, 0);
        let right = left + n;
        let blocks = [(left, left), (left, right), (right, left), (right, right)];

        let mass_w = [
            dx * (1.0 / 3.0 + alpha),
            dx * (1.0 / 6.0 - alpha),
            dx * (1.0 / 6.0 - alpha),
            dx * (1.0 / 3.0 + alpha),
        ];
        let conv_w = [-0.5, 0.5, -0.5, 0.5];
        let diff_w = [1.0 / dx, -1.0 / dx, -1.0 / dx, 1.0 / dx];
        let src_w = [dx / 3.0, dx / 6.0, dx / 6.0, dx / 3.0];

        for (b, &(r0, c0)) in blocks.iter().enumerate() {
            add_block(&mut ops.mass, &local.mass, r0, c0, mass_w[b])?;
            add_block(&mut ops.convection, &local.convection, r0, c0, conv_w[b])?;
            add_block(&mut ops.diffusion, &local.diffusion, r0, c0, diff_w[b])?;
            add_block(&mut ops.source, &local.source, r0, c0, src_w[b])?;
        }

        for i in 0..n {
            let (q0, q1) = (local.load_left[i], local.load_right[i]);
            ops.load[left + i] += dx / 6.0 * (2.0 * q0 + q1);
            ops.load[right + i] += dx / 6.0 * (q0 + 2.0 * q1);
        }
        Ok(())
    }
}

fn add_block(
    target: &mut BandedMatrix,
    block: &Array2<f64>,
    row0: usize,
    col0: usize,
    weight: f64,
) -> FusionResult<()> {
    for ((r, c), &v) in block.indexed_iter() {
        if v != 0.0 {
            target.add(row0 + r, col0 + c, weight * v)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupling::compute_leakage;
    use fusion_engineering::coolant::{CoolantProperties, IdealGas};
    use fusion_types::config::{BoundaryMode, FlowDirection, LeakageConfig, MaterialConfig, SolidKind};
    use fusion_types::state::{CoolantFields, CouplingTable, FluidChannel, Grid1D, SolidComponent};

    fn one_channel_one_solid(n_el: usize) -> ConductorState {
        let n = n_el + 1;
        let mut node = CoolantFields::uniform(n, 0.5, 5.0e5, 4.5);
        IdealGas::helium().refresh(&mut node).unwrap();
        let gauss = node.gauss_average();
        let fluid = FluidChannel {
            id: "he".into(),
            cross_section: 1e-4,
            hydraulic_diameter: 1e-3,
            friction_factor: 0.005,
            flow_direction: FlowDirection::Forward,
            boundary: BoundaryMode::Closed,
            node,
            gauss,
            temperature_change: Array1::zeros(n_el),
        };
        let solid = SolidComponent {
            id: "jk".into(),
            kind: SolidKind::Jacket,
            cross_section: 2e-4,
            cos_theta: 1.0,
            material: MaterialConfig::Constant {
                density: 7900.0,
                specific_heat: 2.0,
                thermal_conductivity: 0.3,
            },
            superconductor: None,
            operating_current: 0.0,
            node_temperature: Array1::from_elem(n, 4.5),
            gauss_temperature: Array1::from_elem(n_el, 4.5),
            gauss_density: Array1::from_elem(n_el, 7900.0),
            gauss_specific_heat: Array1::from_elem(n_el, 2.0),
            gauss_conductivity: Array1::from_elem(n_el, 0.3),
            heat_source: Array1::zeros(n),
            magnetic_field: Array1::zeros(n),
            field_gradient: Array1::zeros(n),
            temperature_change: Array1::zeros(n_el),
            margins: None,
        };
        let mut couplings = CouplingTable::new();
        couplings
            .insert(
                0,
                1,
                Interface::ChannelSolid {
                    perimeter: 0.05,
                    htc: Array1::from_elem(n_el, 500.0),
                },
            )
            .unwrap();
        ConductorState {
            grid: Grid1D::uniform(1.0, n_el),
            fluids: vec![fluid],
            solids: vec![solid],
            couplings,
            time: 0.0,
        }
    }

    fn assemble(state: &ConductorState, load: &Array2<f64>, lumping: f64) -> GlobalOperators {
        let layout = EquationLayout::for_state(state).unwrap();
        let leakage = compute_leakage(state, &LeakageConfig::default()).unwrap();
        SystemAssembler::new(layout, lumping)
            .unwrap()
            .assemble(state, &Environment::isolated(4.5), &leakage, load)
            .unwrap()
    }

    #[test]
    fn test_mass_rows_sum_to_length() {
        // Row sums of the consistent mass integrate the hat function: Σ_j M_ij = ∫N_i dz.
        let state = one_channel_one_solid(4);
        let load = Array2::zeros((5, 1));
        let ops = assemble(&state, &load, 0.0);
        let layout = EquationLayout::for_state(&state).unwrap();
        let row = layout.global(2, layout.velocity(0));
        let sum: f64 = ops.mass.row_columns(row).map(|c| ops.mass.get(row, c)).sum();
        assert!((sum - 0.25).abs() < 1e-14, "interior hat integrates to dx = 0.25, got {sum}");
    }

    #[test]
    fn test_lumped_mass_is_diagonal() {
        let state = one_channel_one_solid(4);
        let load = Array2::zeros((5, 1));
        let ops = assemble(&state, &load, 1.0 / 6.0);
        let layout = EquationLayout::for_state(&state).unwrap();
        let r = layout.global(1, layout.temperature(0));
        let c = layout.global(2, layout.temperature(0));
        assert!(ops.mass.get(r, c).abs() < 1e-15);
        assert!((ops.mass.get(r, r) - 0.25).abs() < 1e-14);
    }

    #[test]
    fn test_convection_annihilates_uniform_state() {
        let state = one_channel_one_solid(6);
        let load = Array2::zeros((7, 1));
        let ops = assemble(&state, &load, 0.0);
        let layout = EquationLayout::for_state(&state).unwrap();
        let x = layout.pack(&state);
        let ax = ops.convection.matvec(&x);
        let kx = ops.diffusion.matvec(&x);
        // Interior rows only: boundary rows carry the Galerkin surface term.
        for node in 1..6 {
            for local in 0..layout.dofs_per_node() {
                let i = layout.global(node, local);
                assert!(ax[i].abs() < 1e-6 * (1.0 + x[i].abs()), "A·x[{i}] = {}", ax[i]);
                assert!(kx[i].abs() < 1e-9 * (1.0 + x[i].abs()), "K·x[{i}] = {}", kx[i]);
            }
        }
    }

    #[test]
    fn test_heat_exchange_conserves_energy_between_fluid_and_solid() {
        let state = one_channel_one_solid(3);
        let load = Array2::zeros((4, 1));
        let ops = assemble(&state, &load, 0.0);
        let layout = EquationLayout::for_state(&state).unwrap();
        let is_ = layout.global(1, layout.solid(0));
        let it = layout.global(1, layout.temperature(0));
        // Solid row: +P·h on itself, −P·h on the fluid temperature.
        assert!((ops.source.get(is_, is_) + ops.source.get(is_, it)).abs() < 1e-12);
        assert!(ops.source.get(is_, is_) > 0.0);
    }

    #[test]
    fn test_uniform_load_integrates_exactly() {
        let state = one_channel_one_solid(5);
        let load = Array2::from_elem((6, 1), 10.0);
        let ops = assemble(&state, &load, 0.0);
        let layout = EquationLayout::for_state(&state).unwrap();
        let total: f64 = (0..6)
            .map(|node| ops.load[layout.global(node, layout.solid(0))])
            .sum();
        assert!((total - 10.0).abs() < 1e-12, "∫q dz over 1 m = 10 W, got {total}");
    }

    #[test]
    fn test_reassembly_bit_identical() {
        let state = one_channel_one_solid(5);
        let load = Array2::from_elem((6, 1), 1.0);
        let first = assemble(&state, &load, 0.0);
        let second = assemble(&state, &load, 0.0);
        assert_eq!(first.mass, second.mass);
        assert_eq!(first, second);
    }
}
