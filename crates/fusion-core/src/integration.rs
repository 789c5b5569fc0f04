// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Time Integration
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Theta method and fourth-order Adams–Moulton on `M ẋ + A x = q`.
//!
//! With `A_k`, `q_k`, `x_k` the operator, load and solution `k` levels back
//! (0 = the level being solved for, whose operator is frozen at the current
//! state):
//!
//! - theta: `(M/dt + θA₀) x = M x₁/dt − (1−θ) A₀ x₁ + θ q₀ + (1−θ) q₁`
//! - AM4: `(M/dt + 9/24 A₀) x = M x₁/dt − 19/24 A₁x₁ + 5/24 A₂x₂ − 1/24 A₃x₃
//!   + 9/24 q₀ + 19/24 q₁ − 5/24 q₂ + 1/24 q₃`

use fusion_math::banded::BandedMatrix;
use fusion_math::history::HistoryRing;
use fusion_types::config::TimeScheme;
use fusion_types::error::{FusionError, FusionResult};
use ndarray::Array1;

const AM4_NEW: f64 = 9.0 / 24.0;
const AM4_OLD: [f64; 3] = [19.0 / 24.0, -5.0 / 24.0, 1.0 / 24.0];

/// Past operators, loads and solutions kept between steps.
///
/// Rings hold previous levels only; the current level is passed to
/// [`combine`] explicitly and enters the rings through [`StepHistory::commit`]
/// once its solve has succeeded.
#[derive(Debug, Clone)]
pub struct StepHistory {
    loads: HistoryRing<Array1<f64>>,
    operators: Option<HistoryRing<BandedMatrix>>,
    solutions: HistoryRing<Array1<f64>>,
}

impl StepHistory {
    /// History at the first step: every past level equals the present one.
    pub fn seeded(
        scheme: &TimeScheme,
        stiffness: &BandedMatrix,
        load: &Array1<f64>,
        solution: &Array1<f64>,
    ) -> Self {
        let operators = match scheme {
            TimeScheme::AdamsMoulton4 => Some(HistoryRing::seeded(
                scheme.operator_history_depth() - 1,
                stiffness.clone(),
            )),
            TimeScheme::Theta { .. } => None,
        };
        StepHistory {
            loads: HistoryRing::seeded(scheme.load_history_depth() - 1, load.clone()),
            operators,
            solutions: HistoryRing::seeded(scheme.solution_history_depth(), solution.clone()),
        }
    }

    /// Shift the solved level into history.
    pub fn commit(&mut self, stiffness: BandedMatrix, load: Array1<f64>, solution: Array1<f64>) {
        self.loads.push(load);
        if let Some(ops) = self.operators.as_mut() {
            ops.push(stiffness);
        }
        self.solutions.push(solution);
    }

    pub fn loads(&self) -> &HistoryRing<Array1<f64>> {
        &self.loads
    }

    pub fn operators(&self) -> Option<&HistoryRing<BandedMatrix>> {
        self.operators.as_ref()
    }

    pub fn solutions(&self) -> &HistoryRing<Array1<f64>> {
        &self.solutions
    }

    /// Most recent accepted solution.
    pub fn last_solution(&self) -> &Array1<f64> {
        self.solutions.latest()
    }
}

/// `matrix · x = known`.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub matrix: BandedMatrix,
    pub known: Array1<f64>,
}

/// Form the step system for `scheme` from the current operators and history.
pub fn combine(
    scheme: &TimeScheme,
    mass: &BandedMatrix,
    stiffness: &BandedMatrix,
    load: &Array1<f64>,
    history: &StepHistory,
    dt: f64,
) -> FusionResult<LinearSystem> {
    if !(dt > 0.0) {
        return Err(FusionError::PhysicsViolation(format!(
            "time step must be positive, got {dt}"
        )));
    }
    let x_n = history.last_solution();
    let mut known = mass.matvec(x_n) / dt;

    let mut matrix = mass.clone();
    matrix.scale(1.0 / dt);

    match *scheme {
        TimeScheme::Theta { theta } => {
            matrix.scaled_add(theta, stiffness)?;
            known.scaled_add(-(1.0 - theta), &stiffness.matvec(x_n));
            known.scaled_add(theta, load);
            known.scaled_add(1.0 - theta, &history.loads[0]);
        }
        TimeScheme::AdamsMoulton4 => {
            let ops = history.operators().ok_or_else(|| {
                FusionError::ConfigError("Adams-Moulton history lacks operators".into())
            })?;
            matrix.scaled_add(AM4_NEW, stiffness)?;
            for (age, &w) in AM4_OLD.iter().enumerate() {
                known.scaled_add(-w, &ops[age].matvec(&history.solutions[age]));
            }
            known.scaled_add(AM4_NEW, load);
            for (age, &w) in AM4_OLD.iter().enumerate() {
                known.scaled_add(w, &history.loads[age]);
            }
        }
    }
    Ok(LinearSystem { matrix, known })
}
