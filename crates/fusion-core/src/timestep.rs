// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Adaptive Time Step
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Step-size selection from per-unknown eigenvalue estimates.
//!
//! Each unknown proposes `eig_time / (eig + ε)`; the step grows by 20 %
//! while it is below half the smallest proposal and halves when it exceeds
//! it. The result is clipped to `[stp_min, stp_max]` and never runs past the
//! end time.

use crate::layout::{DofKind, EquationLayout};
use fusion_types::config::{Adaptivity, TimeConfig};
use ndarray::Array1;

/// Guards the division by vanishing eigenvalues.
const EIG_EPS: f64 = 1e-10;

/// Growth factor when the step is well below the proposal.
const GROWTH: f64 = 1.2;

/// Shrink factor when the step exceeds the proposal.
const SHRINK: f64 = 0.5;

/// Proposal of unknowns excluded from adaptivity [s].
const UNLIMITED: f64 = 1e10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStepController {
    pub stp_min: f64,
    pub stp_max: f64,
    pub end_time: f64,
    pub adaptivity: Adaptivity,
    pub eig_time: f64,
}

impl TimeStepController {
    pub fn from_config(cfg: &TimeConfig) -> Self {
        TimeStepController {
            stp_min: cfg.stp_min,
            stp_max: cfg.stp_max,
            end_time: cfg.end_time,
            adaptivity: cfg.adaptivity,
            eig_time: cfg.eig_time,
        }
    }

    /// Smallest per-unknown step proposal.
    pub fn optimal_step(&self, eigenvalues: &Array1<f64>, layout: &EquationLayout) -> f64 {
        eigenvalues
            .iter()
            .enumerate()
            .map(|(local, &eig)| {
                let hydraulic = matches!(
                    layout.kind(local),
                    DofKind::Velocity(_) | DofKind::Pressure(_)
                );
                if self.adaptivity == Adaptivity::TemperatureOnly && hydraulic {
                    UNLIMITED
                } else {
                    self.eig_time / (eig + EIG_EPS)
                }
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Step to take at `step_number` (1-based) from elapsed time `time`.
    pub fn select(
        &self,
        step_number: usize,
        previous: f64,
        time: f64,
        eigenvalues: &Array1<f64>,
        layout: &EquationLayout,
    ) -> f64 {
        let remaining = (self.end_time - time).max(0.0);
        if step_number <= 1 {
            return self.stp_min;
        }
        if self.adaptivity == Adaptivity::Disabled {
            return self.stp_min.min(remaining);
        }

        let optimal = self.optimal_step(eigenvalues, layout);
        let mut dt = previous;
        if dt < 0.5 * optimal {
            dt *= GROWTH;
        } else if dt > optimal {
            dt *= SHRINK;
        }
        dt.max(self.stp_min).min(self.stp_max).min(remaining)
    }
}
