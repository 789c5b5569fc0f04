// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Lower bound accepted for superconductor fit parameters (Tc0, Bc20, c0).
pub const MIN_FIT_PARAMETER: f64 = 1e-6;

/// Helium specific gas constant [J/(kg·K)].
pub const R_HELIUM: f64 = 2077.1;

/// Helium adiabatic index (monatomic).
pub const GAMMA_HELIUM: f64 = 5.0 / 3.0;

/// Default pressure floor for inter-channel leakage [Pa].
pub const DEFAULT_DELTA_P_MIN: f64 = 1.0;

/// Default localized pressure-loss coefficient across perforations.
pub const DEFAULT_K_LOC: f64 = 1.0;

/// Default velocity transport factor across perforations.
pub const DEFAULT_LAMBDA_V: f64 = 0.0;
