// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Current-Sharing Temperature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Current-sharing temperature: the T at which `Jc(T, B) = Jop`.
//!
//! Bracket-and-refine march: step upward in temperature until the residual
//! `Jc − Jop` changes sign, back off one step, shrink the step tenfold and
//! repeat. Three refinements from a 0.25 K start leave a 0.25 mK step.

use crate::superconductor::{CriticalSurface, B_FLOOR};
use ndarray::Array1;
use rayon::prelude::*;

/// Initial temperature step [K].
pub const INITIAL_STEP_K: f64 = 0.25;

/// Step refinements before the march stops.
pub const MAX_REFINEMENTS: usize = 3;

/// Hard cap on residual evaluations per point.
pub const MAX_ITERATIONS: usize = 1000;

/// Outcome of one root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentSharing {
    /// Current-sharing temperature [K]; 0 when no root exists.
    pub temperature: f64,
    pub refinements: usize,
    pub iterations: usize,
}

impl CurrentSharing {
    /// Whether the march used all its refinements before the iteration cap.
    pub fn converged(&self) -> bool {
        self.refinements >= MAX_REFINEMENTS
    }

    fn sentinel() -> Self {
        CurrentSharing {
            temperature: 0.0,
            refinements: 0,
            iterations: 0,
        }
    }
}

/// Full search with diagnostics.
///
/// Returns the sentinel 0 when the field is above `Bc20` or when the
/// conductor cannot carry `jop` even at 0 K.
pub fn solve_current_sharing<S: CriticalSurface>(surface: &S, b: f64, jop: f64) -> CurrentSharing {
    if b.max(B_FLOOR) / surface.bc20() >= 1.0 {
        return CurrentSharing::sentinel();
    }
    if surface.critical_current_density(0.0, b) <= jop {
        return CurrentSharing::sentinel();
    }

    let mut t = 0.0;
    let mut dt = INITIAL_STEP_K;
    let mut refinements = 0;
    let mut iterations = 0;
    let mut above_old = true;

    while refinements < MAX_REFINEMENTS && iterations < MAX_ITERATIONS {
        let residual = surface.critical_current_density(t, b) - jop;
        let above = residual > 0.0;
        if iterations == 0 {
            above_old = above;
        }
        if above != above_old {
            t -= dt;
            dt /= 10.0;
            refinements += 1;
        } else {
            above_old = above;
        }
        t += dt;
        iterations += 1;
    }

    if refinements < MAX_REFINEMENTS {
        log::warn!(
            "current-sharing search stopped after {iterations} iterations at T = {t:.4} K (B = {b} T)"
        );
    }

    CurrentSharing {
        temperature: t - 2.0 * dt,
        refinements,
        iterations,
    }
}

/// Current-sharing temperature [K], 0 when no root exists.
pub fn current_sharing_temperature<S: CriticalSurface>(surface: &S, b: f64, jop: f64) -> f64 {
    solve_current_sharing(surface, b, jop).temperature
}

/// Pointwise current-sharing temperature over a field profile.
pub fn current_sharing_profile<S: CriticalSurface>(
    surface: &S,
    b: &Array1<f64>,
    jop: f64,
) -> Array1<f64> {
    let fields = b.to_vec();
    let tcs: Vec<f64> = fields
        .par_iter()
        .map(|&bi| current_sharing_temperature(surface, bi, jop))
        .collect();
    Array1::from(tcs)
}
