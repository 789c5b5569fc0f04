// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Solid Thermal Properties
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Density, specific heat and thermal conductivity of conductor solids.
//!
//! RE-123 fits (A.D. Berger, PSFC RR-11-15) are 5th-order polynomials valid
//! on 4–300 K; temperatures outside are clamped.

use fusion_types::config::MaterialConfig;
use ndarray::Array1;

/// Validity window of the RE-123 thermal fits [K].
const RE123_T_MIN: f64 = 4.0;
const RE123_T_MAX: f64 = 300.0;

/// Branch point of the conductivity fit [K].
const RE123_K_SPLIT: f64 = 70.0;

/// RE-123 mass density [kg/m³].
pub const RE123_DENSITY: f64 = 6380.0;

/// Conductivity coefficients, highest power first: T ≤ 70 K, T > 70 K.
const RE123_K_LOW: [f64; 6] = [
    -1.266103106492942e-5,
    0.002670105477219,
    -0.197035302542769,
    4.933962659604384,
    29.651536939501670,
    66.578192505447330,
];
const RE123_K_HIGH: [f64; 6] = [
    -1.316704893540544e-9,
    2.636151594117440e-06,
    -0.001601689632073,
    0.428760641312538,
    -53.306643333287260,
    3.682252343338599e03,
];

/// Specific-heat coefficients, highest power first.
const RE123_CP: [f64; 6] = [
    -7.567485538209158e-10,
    6.351452642016898e-07,
    -1.947975786547597e-04,
    0.023616673974415,
    0.239331954284042,
    -1.096191721280114,
];

fn horner(coeffs: &[f64; 6], t: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * t + c)
}

/// Thermal conductivity of RE-123 [W/(m·K)].
pub fn re123_thermal_conductivity(t: f64) -> f64 {
    let t = t.clamp(RE123_T_MIN, RE123_T_MAX);
    if t <= RE123_K_SPLIT {
        horner(&RE123_K_LOW, t)
    } else {
        horner(&RE123_K_HIGH, t)
    }
}

/// Isobaric specific heat of RE-123 [J/(kg·K)].
pub fn re123_specific_heat(t: f64) -> f64 {
    horner(&RE123_CP, t.clamp(RE123_T_MIN, RE123_T_MAX))
}

/// Thermal properties of a solid, pure functions of temperature.
pub trait ThermalProperties {
    fn density(&self, t: f64) -> f64;
    fn specific_heat(&self, t: f64) -> f64;
    fn thermal_conductivity(&self, t: f64) -> f64;

    /// (ρ, cp, k) at every point of a temperature profile.
    fn evaluate(&self, t: &Array1<f64>) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
        (
            t.mapv(|ti| self.density(ti)),
            t.mapv(|ti| self.specific_heat(ti)),
            t.mapv(|ti| self.thermal_conductivity(ti)),
        )
    }
}

impl ThermalProperties for MaterialConfig {
    fn density(&self, _t: f64) -> f64 {
        match *self {
            MaterialConfig::Re123 => RE123_DENSITY,
            MaterialConfig::Constant { density, .. } => density,
        }
    }

    fn specific_heat(&self, t: f64) -> f64 {
        match *self {
            MaterialConfig::Re123 => re123_specific_heat(t),
            MaterialConfig::Constant { specific_heat, .. } => specific_heat,
        }
    }

    fn thermal_conductivity(&self, t: f64) -> f64 {
        match *self {
            MaterialConfig::Re123 => re123_thermal_conductivity(t),
            MaterialConfig::Constant {
                thermal_conductivity,
                ..
            } => thermal_conductivity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re123_conductivity_clamped() {
        assert_eq!(re123_thermal_conductivity(1.0), re123_thermal_conductivity(4.0));
        assert_eq!(re123_thermal_conductivity(500.0), re123_thermal_conductivity(300.0));
    }

    #[test]
    fn test_re123_conductivity_low_branch_value() {
        // Direct evaluation of the low-temperature polynomial at 10 K.
        let t: f64 = 10.0;
        let expected = -1.266103106492942e-5 * t.powi(5) + 0.002670105477219 * t.powi(4)
            - 0.197035302542769 * t.powi(3)
            + 4.933962659604384 * t.powi(2)
            + 29.651536939501670 * t
            + 66.578192505447330;
        assert!((re123_thermal_conductivity(t) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_re123_properties_positive_in_range() {
        for k in 0..60 {
            let t = 4.0 + 5.0 * k as f64;
            assert!(re123_thermal_conductivity(t) > 0.0, "k({t}) must be positive");
            assert!(re123_specific_heat(t) > 0.0, "cp({t}) must be positive");
        }
    }

    #[test]
    fn test_constant_material_ignores_temperature() {
        let steel = MaterialConfig::Constant {
            density: 7900.0,
            specific_heat: 2.0,
            thermal_conductivity: 0.3,
        };
        let t = Array1::linspace(4.0, 50.0, 5);
        let (rho, cp, k) = steel.evaluate(&t);
        assert!(rho.iter().all(|&v| v == 7900.0));
        assert!(cp.iter().all(|&v| v == 2.0));
        assert!(k.iter().all(|&v| v == 0.3));
    }

    #[test]
    fn test_re123_config_dispatch() {
        let m = MaterialConfig::Re123;
        assert_eq!(m.density(20.0), RE123_DENSITY);
        assert_eq!(m.specific_heat(20.0), re123_specific_heat(20.0));
    }
}
