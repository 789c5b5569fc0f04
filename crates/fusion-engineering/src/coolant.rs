// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Coolant Equation of State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coolant properties as functions of pressure and temperature.

use fusion_types::constants::{GAMMA_HELIUM, R_HELIUM};
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::CoolantFields;

/// Derived coolant properties at one (p, T) point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolantPoint {
    /// [kg/m³]
    pub density: f64,
    /// [m/s]
    pub speed_of_sound: f64,
    /// Grüneisen parameter φ = (1/ρ)(∂p/∂e)_ρ.
    pub gruneisen: f64,
    /// [J/(kg·K)]
    pub isochoric_specific_heat: f64,
    /// [J/kg]
    pub enthalpy: f64,
}

pub trait CoolantProperties: Send + Sync {
    fn evaluate(&self, pressure: f64, temperature: f64) -> FusionResult<CoolantPoint>;

    /// Recompute every derived field from the primaries.
    fn refresh(&self, fields: &mut CoolantFields) -> FusionResult<()> {
        for i in 0..fields.len() {
            let point = self.evaluate(fields.pressure[i], fields.temperature[i])?;
            fields.density[i] = point.density;
            fields.speed_of_sound[i] = point.speed_of_sound;
            fields.gruneisen[i] = point.gruneisen;
            fields.isochoric_specific_heat[i] = point.isochoric_specific_heat;
            fields.enthalpy[i] = point.enthalpy;
        }
        Ok(())
    }
}

/// Calorically perfect gas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealGas {
    /// Specific gas constant [J/(kg·K)].
    pub gas_constant: f64,
    /// cp / cv.
    pub gamma: f64,
}

impl IdealGas {
    pub fn helium() -> Self {
        IdealGas {
            gas_constant: R_HELIUM,
            gamma: GAMMA_HELIUM,
        }
    }
}

impl CoolantProperties for IdealGas {
    fn evaluate(&self, pressure: f64, temperature: f64) -> FusionResult<CoolantPoint> {
        if !(pressure > 0.0) || !(temperature > 0.0) {
            return Err(FusionError::PhysicsViolation(format!(
                "coolant state out of range: p = {pressure} Pa, T = {temperature} K"
            )));
        }
        let r = self.gas_constant;
        let g = self.gamma;
        let cv = r / (g - 1.0);
        Ok(CoolantPoint {
            density: pressure / (r * temperature),
            speed_of_sound: (g * r * temperature).sqrt(),
            gruneisen: g - 1.0,
            isochoric_specific_heat: cv,
            enthalpy: g * cv * temperature,
        })
    }
}
