// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{DEFAULT_DELTA_P_MIN, DEFAULT_K_LOC, DEFAULT_LAMBDA_V, MIN_FIT_PARAMETER};
use crate::error::{FusionError, FusionResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Top-level conductor configuration.
/// Fluids are numbered first, solids follow, and interface ids refer to either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConductorConfig {
    pub name: String,
    pub grid: GridConfig,
    pub time: TimeConfig,
    pub scheme: TimeScheme,
    /// Mass-lumping blend: 0 = consistent mass, 1/6 = fully lumped.
    #[serde(default)]
    pub mass_lumping: f64,
    #[serde(default)]
    pub leakage: LeakageConfig,
    pub fluids: Vec<FluidConfig>,
    #[serde(default)]
    pub solids: Vec<SolidConfig>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Conductor length [m].
    pub length: f64,
    pub n_elements: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Minimum time step [s].
    pub stp_min: f64,
    /// Maximum time step [s].
    pub stp_max: f64,
    /// Simulation end time [s].
    pub end_time: f64,
    #[serde(default)]
    pub adaptivity: Adaptivity,
    /// Characteristic relaxation time driving adaptive steps [s].
    #[serde(default = "default_eig_time")]
    pub eig_time: f64,
}

fn default_eig_time() -> f64 {
    1e-2
}

/// Which unknowns steer the adaptive step size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adaptivity {
    /// Constant step at the configured minimum.
    Disabled,
    /// Every unknown limits the step.
    #[default]
    Full,
    /// Only temperatures limit the step.
    TemperatureOnly,
}

/// Time-integration scheme of the assembled system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum TimeScheme {
    /// theta = 1 is implicit Euler, theta = 0.5 is Crank-Nicolson.
    Theta { theta: f64 },
    AdamsMoulton4,
}

impl TimeScheme {
    pub const IMPLICIT_EULER: TimeScheme = TimeScheme::Theta { theta: 1.0 };
    pub const CRANK_NICOLSON: TimeScheme = TimeScheme::Theta { theta: 0.5 };

    /// Number of past load vectors the scheme reads.
    pub fn load_history_depth(&self) -> usize {
        match self {
            TimeScheme::Theta { .. } => 2,
            TimeScheme::AdamsMoulton4 => 4,
        }
    }

    /// Number of past operator matrices the scheme reads (0 if it reuses the current one).
    pub fn operator_history_depth(&self) -> usize {
        match self {
            TimeScheme::Theta { .. } => 0,
            TimeScheme::AdamsMoulton4 => 4,
        }
    }

    /// Number of past solutions the scheme reads.
    pub fn solution_history_depth(&self) -> usize {
        match self {
            TimeScheme::Theta { .. } => 1,
            TimeScheme::AdamsMoulton4 => 3,
        }
    }
}

/// Inter-channel leakage through perforated walls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakageConfig {
    /// Pressure-difference floor [Pa].
    #[serde(default = "default_delta_p_min")]
    pub delta_p_min: f64,
    /// Localized pressure-loss coefficient.
    #[serde(default = "default_k_loc")]
    pub k_loc: f64,
    /// Fraction of upstream velocity carried across the wall.
    #[serde(default = "default_lambda_v")]
    pub lambda_v: f64,
}

fn default_delta_p_min() -> f64 {
    DEFAULT_DELTA_P_MIN
}
fn default_k_loc() -> f64 {
    DEFAULT_K_LOC
}
fn default_lambda_v() -> f64 {
    DEFAULT_LAMBDA_V
}

impl Default for LeakageConfig {
    fn default() -> Self {
        LeakageConfig {
            delta_p_min: default_delta_p_min(),
            k_loc: default_k_loc(),
            lambda_v: default_lambda_v(),
        }
    }
}

/// Side of the conductor at which a channel enters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    /// Inlet at x = 0.
    #[default]
    Forward,
    /// Inlet at x = L.
    Backward,
}

/// Hydraulic boundary condition of a channel.
///
/// Temperatures are only imposed where the flow enters the domain.
/// Mass flow rates are signed along +x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BoundaryMode {
    FixedPressureTemperature {
        inlet_pressure: f64,
        outlet_pressure: f64,
        inlet_temperature: f64,
        outlet_temperature: f64,
    },
    FixedFlowPressure {
        mass_flow_rate: f64,
        outlet_pressure: f64,
        inlet_temperature: f64,
        outlet_temperature: f64,
    },
    /// Pressurized inlet reservoir, dead-ended outlet.
    ReservoirSymmetric {
        inlet_pressure: f64,
        inlet_temperature: f64,
        outlet_temperature: f64,
    },
    Closed,
    FixedFlowPressureAlt {
        mass_flow_rate: f64,
        outlet_pressure: f64,
        inlet_temperature: f64,
        outlet_temperature: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidConfig {
    pub id: String,
    /// Flow cross section [m²].
    pub cross_section: f64,
    /// Hydraulic diameter [m].
    pub hydraulic_diameter: f64,
    /// Fanning friction factor.
    #[serde(default = "default_friction_factor")]
    pub friction_factor: f64,
    #[serde(default)]
    pub flow_direction: FlowDirection,
    pub boundary: BoundaryMode,
    pub initial: InitialFluidState,
}

fn default_friction_factor() -> f64 {
    0.005
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitialFluidState {
    /// [m/s]
    pub velocity: f64,
    /// [Pa]
    pub pressure: f64,
    /// [K]
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolidKind {
    Strand,
    Stabilizer,
    Jacket,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialConfig {
    /// RE-123 coated conductor fits.
    Re123,
    Constant {
        /// [kg/m³]
        density: f64,
        /// [J/(kg·K)]
        specific_heat: f64,
        /// [W/(m·K)]
        thermal_conductivity: f64,
    },
}

/// Critical-surface fit of a superconducting strand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperconductorConfig {
    /// Critical temperature at zero field [K].
    #[serde(default = "default_tc0")]
    pub tc0: f64,
    /// Upper critical field at zero temperature [T].
    #[serde(default = "default_bc20")]
    pub bc20: f64,
    /// Critical-current scaling constant [A·T/m²].
    pub c0: f64,
    /// Superconductor cross section [m²].
    pub cross_section: f64,
}

fn default_tc0() -> f64 {
    92.0
}
fn default_bc20() -> f64 {
    140.0
}

impl SuperconductorConfig {
    pub fn validate(&self) -> FusionResult<()> {
        for (name, value) in [("tc0", self.tc0), ("bc20", self.bc20), ("c0", self.c0)] {
            if !(value >= MIN_FIT_PARAMETER) {
                return Err(FusionError::ConfigError(format!(
                    "superconductor {name} must be >= {MIN_FIT_PARAMETER}, got {value}"
                )));
            }
        }
        if !(self.cross_section > 0.0) {
            return Err(FusionError::ConfigError(
                "superconductor cross_section must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolidConfig {
    pub id: String,
    pub kind: SolidKind,
    /// [m²]
    pub cross_section: f64,
    /// Cosine of the cabling angle.
    #[serde(default = "default_cos_theta")]
    pub cos_theta: f64,
    pub material: MaterialConfig,
    /// [K]
    pub initial_temperature: f64,
    /// Uniform heat deposition [W/m].
    #[serde(default)]
    pub heat_source: f64,
    /// Background magnetic field [T].
    #[serde(default)]
    pub magnetic_field: f64,
    /// Relative peak-field excess across the strand.
    #[serde(default)]
    pub field_gradient: f64,
    /// Transport current [A].
    #[serde(default)]
    pub operating_current: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superconductor: Option<SuperconductorConfig>,
}

fn default_cos_theta() -> f64 {
    1.0
}

/// Thermal/hydraulic contact between two components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub first: String,
    pub second: String,
    #[serde(flatten)]
    pub kind: InterfaceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterfaceKind {
    ChannelChannel {
        /// Perforated wall perimeter [m].
        open_perimeter: f64,
        /// Solid wall perimeter [m].
        closed_perimeter: f64,
        /// [W/(m²·K)]
        htc_open: f64,
        htc_closed: f64,
    },
    ChannelSolid {
        perimeter: f64,
        htc: f64,
    },
    SolidSolid {
        perimeter: f64,
        htc: f64,
        /// Linearized radiative coefficient between jackets.
        #[serde(default)]
        htc_radiative: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// [K]
    #[serde(default = "default_environment_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub contacts: Vec<EnvironmentContactConfig>,
}

fn default_environment_temperature() -> f64 {
    300.0
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig {
            temperature: default_environment_temperature(),
            contacts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentContactConfig {
    /// Jacket id.
    pub solid: String,
    pub exposure: ExposureConfig,
    #[serde(default)]
    pub htc_radiative: f64,
}

/// Convective exposure of a jacket to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "geometry", rename_all = "snake_case")]
pub enum ExposureConfig {
    Perimeter {
        perimeter: f64,
        htc: f64,
    },
    Rectangular {
        height: f64,
        width: f64,
        htc_side: f64,
        htc_top: f64,
        htc_bottom: f64,
    },
}

fn require_positive(value: f64, what: &str) -> FusionResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(FusionError::ConfigError(format!(
            "{what} must be > 0, got {value}"
        )))
    }
}

impl ConductorConfig {
    /// Load from JSON file and validate.
    pub fn from_file(path: &str) -> FusionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Index of a component: fluids first, then solids.
    pub fn component_index(&self, id: &str) -> Option<usize> {
        self.fluids
            .iter()
            .position(|f| f.id == id)
            .or_else(|| {
                self.solids
                    .iter()
                    .position(|s| s.id == id)
                    .map(|k| k + self.fluids.len())
            })
    }

    fn resolve(&self, id: &str) -> FusionResult<usize> {
        self.component_index(id)
            .ok_or_else(|| FusionError::ConfigError(format!("unknown component id '{id}'")))
    }

    pub fn validate(&self) -> FusionResult<()> {
        require_positive(self.grid.length, "grid.length")?;
        if self.grid.n_elements == 0 {
            return Err(FusionError::ConfigError(
                "grid.n_elements must be >= 1".into(),
            ));
        }

        require_positive(self.time.stp_min, "time.stp_min")?;
        require_positive(self.time.end_time, "time.end_time")?;
        require_positive(self.time.eig_time, "time.eig_time")?;
        if self.time.stp_max < self.time.stp_min {
            return Err(FusionError::ConfigError(format!(
                "time.stp_max ({}) must be >= time.stp_min ({})",
                self.time.stp_max, self.time.stp_min
            )));
        }

        if let TimeScheme::Theta { theta } = self.scheme {
            if !(0.0..=1.0).contains(&theta) {
                return Err(FusionError::ConfigError(format!(
                    "theta must lie in [0, 1], got {theta}"
                )));
            }
        }
        if !(0.0..=1.0 / 6.0).contains(&self.mass_lumping) {
            return Err(FusionError::ConfigError(format!(
                "mass_lumping must lie in [0, 1/6], got {}",
                self.mass_lumping
            )));
        }
        require_positive(self.leakage.delta_p_min, "leakage.delta_p_min")?;
        require_positive(self.leakage.k_loc, "leakage.k_loc")?;

        if self.fluids.is_empty() {
            return Err(FusionError::ConfigError(
                "at least one fluid channel is required".into(),
            ));
        }
        let mut ids = HashSet::new();
        for fluid in &self.fluids {
            if !ids.insert(fluid.id.as_str()) {
                return Err(FusionError::ConfigError(format!(
                    "duplicate component id '{}'",
                    fluid.id
                )));
            }
            require_positive(fluid.cross_section, "fluid cross_section")?;
            require_positive(fluid.hydraulic_diameter, "fluid hydraulic_diameter")?;
            require_positive(fluid.initial.pressure, "fluid initial pressure")?;
            require_positive(fluid.initial.temperature, "fluid initial temperature")?;
        }
        for solid in &self.solids {
            if !ids.insert(solid.id.as_str()) {
                return Err(FusionError::ConfigError(format!(
                    "duplicate component id '{}'",
                    solid.id
                )));
            }
            require_positive(solid.cross_section, "solid cross_section")?;
            if !(solid.cos_theta > 0.0 && solid.cos_theta <= 1.0) {
                return Err(FusionError::ConfigError(format!(
                    "cos_theta of '{}' must lie in (0, 1]",
                    solid.id
                )));
            }
            if let MaterialConfig::Constant {
                density,
                specific_heat,
                thermal_conductivity,
            } = solid.material
            {
                require_positive(density, "material density")?;
                require_positive(specific_heat, "material specific_heat")?;
                require_positive(thermal_conductivity, "material thermal_conductivity")?;
            }
            if let Some(sc) = &solid.superconductor {
                sc.validate()?;
            }
        }

        let n_fluids = self.fluids.len();
        let mut pairs = HashSet::new();
        for interface in &self.interfaces {
            let a = self.resolve(&interface.first)?;
            let b = self.resolve(&interface.second)?;
            if a == b {
                return Err(FusionError::ConfigError(format!(
                    "interface of '{}' with itself",
                    interface.first
                )));
            }
            if !pairs.insert((a.min(b), a.max(b))) {
                return Err(FusionError::ConfigError(format!(
                    "interface '{}'-'{}' listed twice",
                    interface.first, interface.second
                )));
            }
            let fluids_involved = usize::from(a < n_fluids) + usize::from(b < n_fluids);
            let expected = match interface.kind {
                InterfaceKind::ChannelChannel { .. } => 2,
                InterfaceKind::ChannelSolid { .. } => 1,
                InterfaceKind::SolidSolid { .. } => 0,
            };
            if fluids_involved != expected {
                return Err(FusionError::ConfigError(format!(
                    "interface '{}'-'{}' does not match its component kinds",
                    interface.first, interface.second
                )));
            }
        }

        let mut exposed = HashSet::new();
        for contact in &self.environment.contacts {
            let idx = self.resolve(&contact.solid)?;
            let is_jacket = idx >= n_fluids && self.solids[idx - n_fluids].kind == SolidKind::Jacket;
            if !is_jacket {
                return Err(FusionError::ConfigError(format!(
                    "environment contact '{}' is not a jacket",
                    contact.solid
                )));
            }
            if !exposed.insert(idx) {
                return Err(FusionError::ConfigError(format!(
                    "environment contact '{}' listed twice",
                    contact.solid
                )));
            }
        }
        Ok(())
    }
}
