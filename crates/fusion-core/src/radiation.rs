// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Jacket Radiation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Explicit radiative heat loads on jackets, evaluated at nodes from the
//! last accepted temperatures.

use fusion_types::state::{ConductorState, Environment, Interface};
use ndarray::Array2;

/// Radiative load per solid and node [W/m], shape `(n_nodes, n_solids)`.
/// Non-jacket solids receive zero.
pub fn jacket_radiation(state: &ConductorState, environment: &Environment) -> Array2<f64> {
    let n_nodes = state.grid.n_nodes;
    let nf = state.n_fluids();
    let mut load = Array2::zeros((n_nodes, state.n_solids()));

    for contact in &environment.contacts {
        let Some(jacket) = state.solids.get(contact.solid) else {
            continue;
        };
        if !jacket.is_jacket() {
            continue;
        }
        let perimeter = contact.exposure.perimeter();
        for node in 0..n_nodes {
            load[[node, contact.solid]] += perimeter
                * contact.htc_radiative[node]
                * (environment.temperature - jacket.node_temperature[node]);
        }
    }

    for (pair, interface) in state.couplings.iter() {
        let Interface::SolidSolid {
            perimeter,
            htc_radiative,
            ..
        } = interface
        else {
            continue;
        };
        let (a, b) = (pair.first() - nf, pair.second() - nf);
        if !(state.solids[a].is_jacket() && state.solids[b].is_jacket()) {
            continue;
        }
        for node in 0..n_nodes {
            let ta = state.solids[a].node_temperature[node];
            let tb = state.solids[b].node_temperature[node];
            let q = perimeter * htc_radiative[node] * (tb - ta);
            load[[node, a]] += q;
            load[[node, b]] -= q;
        }
    }
    load
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_types::config::{MaterialConfig, SolidKind};
    use fusion_types::state::{CouplingTable, EnvironmentContact, Exposure, Grid1D, SolidComponent};
    use ndarray::Array1;

    fn solid(id: &str, kind: SolidKind, t: f64) -> SolidComponent {
        SolidComponent {
            id: id.into(),
            kind,
            cross_section: 1e-4,
            cos_theta: 1.0,
            material: MaterialConfig::Constant {
                density: 7900.0,
                specific_heat: 2.0,
                thermal_conductivity: 0.3,
            },
            superconductor: None,
            operating_current: 0.0,
            node_temperature: Array1::from_elem(3, t),
            gauss_temperature: Array1::from_elem(2, t),
            gauss_density: Array1::zeros(2),
            gauss_specific_heat: Array1::zeros(2),
            gauss_conductivity: Array1::zeros(2),
            heat_source: Array1::zeros(3),
            magnetic_field: Array1::zeros(3),
            field_gradient: Array1::zeros(3),
            temperature_change: Array1::zeros(2),
            margins: None,
        }
    }

    fn state(kinds: [SolidKind; 2]) -> ConductorState {
        let mut couplings = CouplingTable::new();
        couplings
            .insert(
                0,
                1,
                Interface::SolidSolid {
                    perimeter: 0.1,
                    htc: Array1::zeros(2),
                    htc_radiative: Array1::from_elem(3, 2.0),
                },
            )
            .unwrap();
        ConductorState {
            grid: Grid1D::uniform(1.0, 2),
            fluids: vec![],
            solids: vec![solid("a", kinds[0], 10.0), solid("b", kinds[1], 30.0)],
            couplings,
            time: 0.0,
        }
    }

    fn environment() -> Environment {
        Environment {
            temperature: 300.0,
            contacts: vec![EnvironmentContact {
                solid: 1,
                exposure: Exposure::Perimeter {
                    perimeter: 0.05,
                    htc: Array1::zeros(2),
                },
                htc_radiative: Array1::from_elem(3, 4.0),
            }],
        }
    }

    #[test]
    fn test_jacket_pair_exchange_is_antisymmetric() {
        let s = state([SolidKind::Jacket, SolidKind::Jacket]);
        let q = jacket_radiation(&s, &Environment::isolated(4.5));
        // 0.1 · 2 · (30 − 10)
        assert!((q[[1, 0]] - 4.0).abs() < 1e-12);
        assert!((q[[1, 1]] + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_environment_radiation_on_exposed_jacket() {
        let s = state([SolidKind::Stabilizer, SolidKind::Jacket]);
        let q = jacket_radiation(&s, &environment());
        // 0.05 · 4 · (300 − 30); stabilizer gets nothing
        assert!((q[[0, 1]] - 54.0).abs() < 1e-12);
        assert_eq!(q[[0, 0]], 0.0);
    }

    #[test]
    fn test_no_radiation_between_non_jackets() {
        let s = state([SolidKind::Strand, SolidKind::Stabilizer]);
        let q = jacket_radiation(&s, &Environment::isolated(300.0));
        assert!(q.iter().all(|&v| v == 0.0));
    }
}
