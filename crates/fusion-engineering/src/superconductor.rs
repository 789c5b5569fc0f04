// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Superconductor Critical Surfaces
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Critical-surface fits for coated-conductor (RE-123) strands.
//!
//! `Bc(T) = Bc20·(1 − T/Tc0)^α`,
//! `Jc(T, B) = c0/B · Bc^β · b^p · (1 − b)^q` with `b = B/Bc(T)`.
//! Valid for B > 8 T and T < 40 K; outside that range the fit is only
//! used to locate the transition.

use fusion_types::config::SuperconductorConfig;
use fusion_types::constants::MIN_FIT_PARAMETER;
use fusion_types::error::{FusionError, FusionResult};
use ndarray::{Array1, Zip};

/// Temperature exponent of the critical field.
pub const RE123_ALPHA: f64 = 1.54121;

/// Critical-field exponent of Jc.
pub const RE123_BETA: f64 = 1.96679;

/// Low-field pinning exponent.
pub const RE123_P: f64 = 0.5875;

/// High-field pinning exponent.
pub const RE123_Q: f64 = 1.7;

/// Field floor used in Jc [T].
pub const B_FLOOR: f64 = 0.01;

/// Critical properties of a superconductor as a function of (T, B).
pub trait CriticalSurface: Sync {
    /// Upper critical field at temperature `t` [T].
    fn critical_field(&self, t: f64) -> f64;

    /// Critical current density [A/m²], never negative.
    fn critical_current_density(&self, t: f64, b: f64) -> f64;

    /// Temperature at which the critical field drops to `b` [K].
    fn critical_temperature(&self, b: f64) -> f64;

    /// Critical temperature at zero field [K].
    fn tc0(&self) -> f64;

    /// Upper critical field at zero temperature [T].
    fn bc20(&self) -> f64;
}

/// RE-123 critical surface with validated fit parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Re123 {
    tc0: f64,
    bc20: f64,
    c0: f64,
}

impl Re123 {
    pub fn new(tc0: f64, bc20: f64, c0: f64) -> FusionResult<Self> {
        for (name, value) in [("Tc0", tc0), ("Bc20", bc20), ("c0", c0)] {
            if !(value >= MIN_FIT_PARAMETER) {
                return Err(FusionError::ConfigError(format!(
                    "RE-123 {name} must be >= {MIN_FIT_PARAMETER}, got {value}"
                )));
            }
        }
        Ok(Re123 { tc0, bc20, c0 })
    }

    pub fn from_config(cfg: &SuperconductorConfig) -> FusionResult<Self> {
        Self::new(cfg.tc0, cfg.bc20, cfg.c0)
    }

    pub fn c0(&self) -> f64 {
        self.c0
    }
}

impl CriticalSurface for Re123 {
    fn critical_field(&self, t: f64) -> f64 {
        let t_norm = t / self.tc0;
        if t_norm < 1.0 {
            self.bc20 * (1.0 - t_norm).powf(RE123_ALPHA)
        } else {
            0.0
        }
    }

    fn critical_current_density(&self, t: f64, b: f64) -> f64 {
        if t / self.tc0 >= 1.0 {
            return 0.0;
        }
        let b_lim = b.max(B_FLOOR);
        let bc = self.critical_field(t);
        let b_red = b_lim / bc;
        if !(b_red < 1.0) {
            return 0.0;
        }
        let jc = self.c0 / b_lim
            * bc.powf(RE123_BETA)
            * b_red.powf(RE123_P)
            * (1.0 - b_red).powf(RE123_Q);
        jc.max(0.0)
    }

    fn critical_temperature(&self, b: f64) -> f64 {
        let b_red = b.max(B_FLOOR) / self.bc20;
        if b_red >= 1.0 {
            return 0.0;
        }
        self.tc0 * (1.0 - b_red.powf(1.0 / RE123_ALPHA))
    }

    fn tc0(&self) -> f64 {
        self.tc0
    }

    fn bc20(&self) -> f64 {
        self.bc20
    }
}

/// Critical field at every point of a temperature profile.
pub fn critical_field_profile<S: CriticalSurface>(surface: &S, t: &Array1<f64>) -> Array1<f64> {
    t.mapv(|ti| surface.critical_field(ti))
}

/// Critical current density at every point.
pub fn critical_current_profile<S: CriticalSurface>(
    surface: &S,
    t: &Array1<f64>,
    b: &Array1<f64>,
) -> Array1<f64> {
    let mut jc = Array1::zeros(t.len());
    Zip::from(&mut jc)
        .and(t)
        .and(b)
        .for_each(|j, &ti, &bi| *j = surface.critical_current_density(ti, bi));
    jc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re123() -> Re123 {
        Re123::new(92.0, 140.0, 3.0e7).unwrap()
    }

    #[test]
    fn test_critical_field_vanishes_above_tc0() {
        let sc = re123();
        for t in [92.0, 95.0, 150.0, 300.0] {
            assert_eq!(sc.critical_field(t), 0.0, "Bc({t}) must be zero");
        }
    }

    #[test]
    fn test_critical_field_strictly_decreasing() {
        let sc = re123();
        let mut prev = sc.critical_field(0.0);
        assert!((prev - 140.0).abs() < 1e-12);
        for k in 1..184 {
            let t = k as f64 * 0.5;
            let bc = sc.critical_field(t);
            assert!(bc < prev, "Bc({t}) = {bc} not below {prev}");
            prev = bc;
        }
    }

    #[test]
    fn test_jc_zero_beyond_transition() {
        let sc = re123();
        assert_eq!(sc.critical_current_density(92.0, 10.0), 0.0);
        let tc_b = sc.critical_temperature(10.0);
        assert_eq!(sc.critical_current_density(tc_b + 0.1, 10.0), 0.0);
        assert!(sc.critical_current_density(tc_b - 1.0, 10.0) > 0.0);
    }

    #[test]
    fn test_jc_decreases_with_field_at_high_field() {
        let sc = re123();
        let j10 = sc.critical_current_density(4.5, 10.0);
        let j15 = sc.critical_current_density(4.5, 15.0);
        assert!(j10 > j15 && j15 > 0.0, "Jc(10 T) = {j10:e}, Jc(15 T) = {j15:e}");
    }

    #[test]
    fn test_critical_temperature_inverts_critical_field() {
        let sc = re123();
        let b = 25.0;
        let tc = sc.critical_temperature(b);
        assert!((sc.critical_field(tc) - b).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_small_parameters() {
        assert!(Re123::new(0.0, 140.0, 1.0).is_err());
        assert!(Re123::new(92.0, 1e-7, 1.0).is_err());
        let err = Re123::new(92.0, 140.0, 0.0).unwrap_err();
        assert!(format!("{err}").contains("c0"));
    }

    #[test]
    fn test_profiles_match_pointwise() {
        let sc = re123();
        let t = Array1::linspace(4.0, 100.0, 25);
        let b = Array1::from_elem(25, 12.0);
        let bc = critical_field_profile(&sc, &t);
        let jc = critical_current_profile(&sc, &t, &b);
        for i in 0..25 {
            assert_eq!(bc[i], sc.critical_field(t[i]));
            assert_eq!(jc[i], sc.critical_current_density(t[i], b[i]));
        }
    }
}
