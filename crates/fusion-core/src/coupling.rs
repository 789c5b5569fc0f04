// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Inter-Channel Leakage
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linearized mass, momentum and energy exchange through perforated walls.
//!
//! The transverse mass flux `Γ = K1·Δp` is driven by the pressure jump; the
//! upstream (higher-pressure) channel supplies density, velocity and
//! enthalpy:
//!
//! - `K1 = P_open · sqrt(2ρ_up / (k_loc · Δp))`
//! - `K2 = K1 · λ_v · u_up`
//! - `K3 = K1 · (h_up + (λ_v · u_up)² / 2)`

use fusion_types::config::LeakageConfig;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{ComponentPair, ConductorState, Interface};
use ndarray::Array1;
use std::collections::BTreeMap;

/// K1, K2, K3 at the Gauss points of one channel pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairLeakage {
    pub k1: Array1<f64>,
    pub k2: Array1<f64>,
    pub k3: Array1<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct LeakageTable {
    entries: BTreeMap<ComponentPair, PairLeakage>,
}

impl LeakageTable {
    pub fn get(&self, a: usize, b: usize) -> FusionResult<&PairLeakage> {
        let key = ComponentPair::new(a, b);
        self.entries.get(&key).ok_or(FusionError::MissingCoupling {
            first: key.first(),
            second: key.second(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Leakage coefficients for every channel-channel interface of `state`.
pub fn compute_leakage(state: &ConductorState, params: &LeakageConfig) -> FusionResult<LeakageTable> {
    let mut entries = BTreeMap::new();
    for (pair, interface) in state.couplings.iter() {
        let Interface::ChannelChannel { open_perimeter, .. } = interface else {
            continue;
        };
        let a = &state.fluids[pair.first()].gauss;
        let b = &state.fluids[pair.second()].gauss;
        let n = a.len();
        let mut k1 = Array1::zeros(n);
        let mut k2 = Array1::zeros(n);
        let mut k3 = Array1::zeros(n);
        for i in 0..n {
            let dp = (a.pressure[i] - b.pressure[i]).abs().max(params.delta_p_min);
            let up = if a.pressure[i] > b.pressure[i] { a } else { b };
            let rho = up.density[i];
            if !(rho > 0.0) {
                return Err(FusionError::PhysicsViolation(format!(
                    "non-positive upstream density {rho} at Gauss point {i}"
                )));
            }
            let u = params.lambda_v * up.velocity[i];
            k1[i] = open_perimeter * (2.0 * rho / (params.k_loc * dp)).sqrt();
            k2[i] = k1[i] * u;
            k3[i] = k1[i] * (up.enthalpy[i] + 0.5 * u * u);
        }
        entries.insert(*pair, PairLeakage { k1, k2, k3 });
    }
    Ok(LeakageTable { entries })
}
