// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::config::{
    BoundaryMode, ConductorConfig, ExposureConfig, FlowDirection, InterfaceKind, MaterialConfig,
    SolidKind, SuperconductorConfig,
};
use crate::error::{FusionError, FusionResult};
use ndarray::Array1;
use std::collections::BTreeMap;

/// 1D finite-element mesh along the conductor axis.
#[derive(Debug, Clone)]
pub struct Grid1D {
    pub n_nodes: usize,
    pub x: Array1<f64>,       // node coordinates [n_nodes]
    pub dx: Array1<f64>,      // element lengths [n_elements]
    pub x_gauss: Array1<f64>, // element midpoints [n_elements]
}

impl Grid1D {
    pub fn uniform(length: f64, n_elements: usize) -> Self {
        let x = Array1::linspace(0.0, length, n_elements + 1);
        Self::from_nodes(x)
    }

    /// Build from strictly increasing node coordinates.
    pub fn from_coordinates(x: Array1<f64>) -> FusionResult<Self> {
        if x.len() < 2 {
            return Err(FusionError::ConfigError(
                "mesh needs at least two nodes".into(),
            ));
        }
        if x.windows(2).into_iter().any(|w| w[1] <= w[0]) {
            return Err(FusionError::ConfigError(
                "node coordinates must be strictly increasing".into(),
            ));
        }
        Ok(Self::from_nodes(x))
    }

    fn from_nodes(x: Array1<f64>) -> Self {
        let n_nodes = x.len();
        let dx = Array1::from_shape_fn(n_nodes - 1, |i| x[i + 1] - x[i]);
        let x_gauss = gauss_average(&x);
        Grid1D {
            n_nodes,
            x,
            dx,
            x_gauss,
        }
    }

    pub fn n_elements(&self) -> usize {
        self.n_nodes - 1
    }
}

/// Element-midpoint values: mean of adjacent nodes.
pub fn gauss_average(nodal: &Array1<f64>) -> Array1<f64> {
    let n = nodal.len().saturating_sub(1);
    Array1::from_shape_fn(n, |i| 0.5 * (nodal[i] + nodal[i + 1]))
}

/// Primary and derived coolant fields on a set of points.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolantFields {
    pub velocity: Array1<f64>,
    pub pressure: Array1<f64>,
    pub temperature: Array1<f64>,
    pub density: Array1<f64>,
    pub speed_of_sound: Array1<f64>,
    pub gruneisen: Array1<f64>,
    pub isochoric_specific_heat: Array1<f64>,
    pub enthalpy: Array1<f64>,
}

impl CoolantFields {
    /// Uniform primaries; derived fields stay zero until an equation of state fills them.
    pub fn uniform(n: usize, velocity: f64, pressure: f64, temperature: f64) -> Self {
        CoolantFields {
            velocity: Array1::from_elem(n, velocity),
            pressure: Array1::from_elem(n, pressure),
            temperature: Array1::from_elem(n, temperature),
            density: Array1::zeros(n),
            speed_of_sound: Array1::zeros(n),
            gruneisen: Array1::zeros(n),
            isochoric_specific_heat: Array1::zeros(n),
            enthalpy: Array1::zeros(n),
        }
    }

    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }

    pub fn gauss_average(&self) -> Self {
        CoolantFields {
            velocity: gauss_average(&self.velocity),
            pressure: gauss_average(&self.pressure),
            temperature: gauss_average(&self.temperature),
            density: gauss_average(&self.density),
            speed_of_sound: gauss_average(&self.speed_of_sound),
            gruneisen: gauss_average(&self.gruneisen),
            isochoric_specific_heat: gauss_average(&self.isochoric_specific_heat),
            enthalpy: gauss_average(&self.enthalpy),
        }
    }
}

/// Coolant channel: owns its node and Gauss-point arrays.
#[derive(Debug, Clone)]
pub struct FluidChannel {
    pub id: String,
    pub cross_section: f64,
    pub hydraulic_diameter: f64,
    pub friction_factor: f64,
    pub flow_direction: FlowDirection,
    pub boundary: BoundaryMode,
    pub node: CoolantFields,
    pub gauss: CoolantFields,
    /// Temperature change over the last step at Gauss points [K].
    pub temperature_change: Array1<f64>,
}

/// Critical properties of a strand on one set of points.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginProfile {
    pub critical_temperature: Array1<f64>,
    pub critical_current_density: Array1<f64>,
    pub current_sharing_temperature: Array1<f64>,
    /// Current sharing at the peak field B·(1 + field_gradient).
    pub minimum_current_sharing_temperature: Array1<f64>,
    /// T_cs − T.
    pub temperature_margin: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuenchMargins {
    pub node: MarginProfile,
    pub gauss: MarginProfile,
}

/// Strand, stabilizer or jacket.
#[derive(Debug, Clone)]
pub struct SolidComponent {
    pub id: String,
    pub kind: SolidKind,
    pub cross_section: f64,
    pub cos_theta: f64,
    pub material: MaterialConfig,
    pub superconductor: Option<SuperconductorConfig>,
    /// Transport current [A].
    pub operating_current: f64,
    pub node_temperature: Array1<f64>,
    pub gauss_temperature: Array1<f64>,
    pub gauss_density: Array1<f64>,
    pub gauss_specific_heat: Array1<f64>,
    pub gauss_conductivity: Array1<f64>,
    /// Deposited power per unit length at nodes [W/m].
    pub heat_source: Array1<f64>,
    pub magnetic_field: Array1<f64>,
    pub field_gradient: Array1<f64>,
    pub temperature_change: Array1<f64>,
    pub margins: Option<QuenchMargins>,
}

impl SolidComponent {
    pub fn is_jacket(&self) -> bool {
        self.kind == SolidKind::Jacket
    }
}

/// Canonical key of an interface: smaller component index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentPair(usize, usize);

impl ComponentPair {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            ComponentPair(a, b)
        } else {
            ComponentPair(b, a)
        }
    }

    pub fn first(&self) -> usize {
        self.0
    }

    pub fn second(&self) -> usize {
        self.1
    }
}

/// Contact data stored per interface, coefficients at Gauss points unless noted.
#[derive(Debug, Clone, PartialEq)]
pub enum Interface {
    ChannelChannel {
        open_perimeter: f64,
        closed_perimeter: f64,
        htc_open: Array1<f64>,
        htc_closed: Array1<f64>,
    },
    ChannelSolid {
        perimeter: f64,
        htc: Array1<f64>,
    },
    SolidSolid {
        perimeter: f64,
        htc: Array1<f64>,
        /// Radiative coefficient at nodes.
        htc_radiative: Array1<f64>,
    },
}

/// Interface coefficients keyed by canonical component pair.
#[derive(Debug, Clone, Default)]
pub struct CouplingTable {
    entries: BTreeMap<ComponentPair, Interface>,
}

impl CouplingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: usize, b: usize, interface: Interface) -> FusionResult<()> {
        let key = ComponentPair::new(a, b);
        if self.entries.contains_key(&key) {
            return Err(FusionError::ConfigError(format!(
                "interface ({}, {}) already defined",
                key.first(),
                key.second()
            )));
        }
        self.entries.insert(key, interface);
        Ok(())
    }

    pub fn get(&self, a: usize, b: usize) -> FusionResult<&Interface> {
        let key = ComponentPair::new(a, b);
        self.entries
            .get(&key)
            .ok_or(FusionError::MissingCoupling {
                first: key.first(),
                second: key.second(),
            })
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.entries.contains_key(&ComponentPair::new(a, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentPair, &Interface)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convective exposure of a jacket, coefficients at Gauss points.
#[derive(Debug, Clone, PartialEq)]
pub enum Exposure {
    Perimeter {
        perimeter: f64,
        htc: Array1<f64>,
    },
    Rectangular {
        height: f64,
        width: f64,
        htc_side: Array1<f64>,
        htc_top: Array1<f64>,
        htc_bottom: Array1<f64>,
    },
}

impl Exposure {
    /// Heat-transfer coefficient times wetted perimeter in element `e` [W/(m·K)].
    pub fn coefficient(&self, e: usize) -> f64 {
        match self {
            Exposure::Perimeter { perimeter, htc } => perimeter * htc[e],
            Exposure::Rectangular {
                height,
                width,
                htc_side,
                htc_top,
                htc_bottom,
            } => 2.0 * height * htc_side[e] + width * (htc_bottom[e] + htc_top[e]),
        }
    }

    pub fn perimeter(&self) -> f64 {
        match self {
            Exposure::Perimeter { perimeter, .. } => *perimeter,
            Exposure::Rectangular { height, width, .. } => 2.0 * (height + width),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentContact {
    /// Index into `ConductorState::solids`.
    pub solid: usize,
    pub exposure: Exposure,
    /// Radiative coefficient at nodes.
    pub htc_radiative: Array1<f64>,
}

/// External surroundings seen by the jackets.
#[derive(Debug, Clone)]
pub struct Environment {
    pub temperature: f64,
    pub contacts: Vec<EnvironmentContact>,
}

impl Environment {
    pub fn isolated(temperature: f64) -> Self {
        Environment {
            temperature,
            contacts: Vec::new(),
        }
    }

    pub fn from_config(cfg: &ConductorConfig) -> FusionResult<Self> {
        let n_el = cfg.grid.n_elements;
        let n_nodes = n_el + 1;
        let n_fluids = cfg.fluids.len();
        let mut contacts = Vec::with_capacity(cfg.environment.contacts.len());
        for contact in &cfg.environment.contacts {
            let idx = cfg
                .component_index(&contact.solid)
                .filter(|&i| i >= n_fluids)
                .ok_or_else(|| {
                    FusionError::ConfigError(format!("unknown jacket '{}'", contact.solid))
                })?;
            let exposure = match contact.exposure {
                ExposureConfig::Perimeter { perimeter, htc } => Exposure::Perimeter {
                    perimeter,
                    htc: Array1::from_elem(n_el, htc),
                },
                ExposureConfig::Rectangular {
                    height,
                    width,
                    htc_side,
                    htc_top,
                    htc_bottom,
                } => Exposure::Rectangular {
                    height,
                    width,
                    htc_side: Array1::from_elem(n_el, htc_side),
                    htc_top: Array1::from_elem(n_el, htc_top),
                    htc_bottom: Array1::from_elem(n_el, htc_bottom),
                },
            };
            contacts.push(EnvironmentContact {
                solid: idx - n_fluids,
                exposure,
                htc_radiative: Array1::from_elem(n_nodes, contact.htc_radiative),
            });
        }
        Ok(Environment {
            temperature: cfg.environment.temperature,
            contacts,
        })
    }

    pub fn contact(&self, solid: usize) -> Option<&EnvironmentContact> {
        self.contacts.iter().find(|c| c.solid == solid)
    }
}

/// Complete conductor state advanced by the transient solver.
#[derive(Debug, Clone)]
pub struct ConductorState {
    pub grid: Grid1D,
    pub fluids: Vec<FluidChannel>,
    pub solids: Vec<SolidComponent>,
    pub couplings: CouplingTable,
    /// Elapsed simulated time [s].
    pub time: f64,
}

impl ConductorState {
    pub fn from_config(cfg: &ConductorConfig) -> FusionResult<Self> {
        cfg.validate()?;
        let grid = Grid1D::uniform(cfg.grid.length, cfg.grid.n_elements);
        let n_nodes = grid.n_nodes;
        let n_el = grid.n_elements();

        let fluids = cfg
            .fluids
            .iter()
            .map(|f| {
                let node = CoolantFields::uniform(
                    n_nodes,
                    f.initial.velocity,
                    f.initial.pressure,
                    f.initial.temperature,
                );
                let gauss = node.gauss_average();
                FluidChannel {
                    id: f.id.clone(),
                    cross_section: f.cross_section,
                    hydraulic_diameter: f.hydraulic_diameter,
                    friction_factor: f.friction_factor,
                    flow_direction: f.flow_direction,
                    boundary: f.boundary,
                    node,
                    gauss,
                    temperature_change: Array1::zeros(n_el),
                }
            })
            .collect();

        let solids = cfg
            .solids
            .iter()
            .map(|s| SolidComponent {
                id: s.id.clone(),
                kind: s.kind,
                cross_section: s.cross_section,
                cos_theta: s.cos_theta,
                material: s.material,
                superconductor: s.superconductor,
                operating_current: s.operating_current,
                node_temperature: Array1::from_elem(n_nodes, s.initial_temperature),
                gauss_temperature: Array1::from_elem(n_el, s.initial_temperature),
                gauss_density: Array1::zeros(n_el),
                gauss_specific_heat: Array1::zeros(n_el),
                gauss_conductivity: Array1::zeros(n_el),
                heat_source: Array1::from_elem(n_nodes, s.heat_source),
                magnetic_field: Array1::from_elem(n_nodes, s.magnetic_field),
                field_gradient: Array1::from_elem(n_nodes, s.field_gradient),
                temperature_change: Array1::zeros(n_el),
                margins: None,
            })
            .collect();

        let mut couplings = CouplingTable::new();
        for interface in &cfg.interfaces {
            let a = cfg.component_index(&interface.first).ok_or_else(|| {
                FusionError::ConfigError(format!("unknown component id '{}'", interface.first))
            })?;
            let b = cfg.component_index(&interface.second).ok_or_else(|| {
                FusionError::ConfigError(format!("unknown component id '{}'", interface.second))
            })?;
            let entry = match interface.kind {
                InterfaceKind::ChannelChannel {
                    open_perimeter,
                    closed_perimeter,
                    htc_open,
                    htc_closed,
                } => Interface::ChannelChannel {
                    open_perimeter,
                    closed_perimeter,
                    htc_open: Array1::from_elem(n_el, htc_open),
                    htc_closed: Array1::from_elem(n_el, htc_closed),
                },
                InterfaceKind::ChannelSolid { perimeter, htc } => Interface::ChannelSolid {
                    perimeter,
                    htc: Array1::from_elem(n_el, htc),
                },
                InterfaceKind::SolidSolid {
                    perimeter,
                    htc,
                    htc_radiative,
                } => Interface::SolidSolid {
                    perimeter,
                    htc: Array1::from_elem(n_el, htc),
                    htc_radiative: Array1::from_elem(n_nodes, htc_radiative),
                },
            };
            couplings.insert(a, b, entry)?;
        }

        Ok(ConductorState {
            grid,
            fluids,
            solids,
            couplings,
            time: 0.0,
        })
    }

    pub fn n_fluids(&self) -> usize {
        self.fluids.len()
    }

    pub fn n_solids(&self) -> usize {
        self.solids.len()
    }

    /// Component index of solid `k` in the coupling table.
    pub fn solid_component(&self, k: usize) -> usize {
        self.fluids.len() + k
    }

    /// Refresh every Gauss-point average from the node arrays.
    pub fn update_gauss_points(&mut self) {
        for fluid in &mut self.fluids {
            fluid.gauss = fluid.node.gauss_average();
        }
        for solid in &mut self.solids {
            solid.gauss_temperature = gauss_average(&solid.node_temperature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_uniform_spacing() {
        let grid = Grid1D::uniform(2.0, 8);
        assert_eq!(grid.n_nodes, 9);
        assert_eq!(grid.n_elements(), 8);
        for &h in grid.dx.iter() {
            assert!((h - 0.25).abs() < 1e-14);
        }
        assert!((grid.x_gauss[0] - 0.125).abs() < 1e-14);
    }

    #[test]
    fn test_grid_rejects_non_monotonic_nodes() {
        let x = Array1::from(vec![0.0, 0.5, 0.4, 1.0]);
        assert!(Grid1D::from_coordinates(x).is_err());
    }

    #[test]
    fn test_gauss_average_of_linear_profile() {
        let nodal = Array1::from(vec![1.0, 3.0, 5.0]);
        let g = gauss_average(&nodal);
        assert_eq!(g.len(), 2);
        assert!((g[0] - 2.0).abs() < 1e-15);
        assert!((g[1] - 4.0).abs() < 1e-15);
    }

    #[test]
    fn test_coupling_table_canonical_key() {
        let mut table = CouplingTable::new();
        let iface = Interface::ChannelSolid {
            perimeter: 0.1,
            htc: Array1::from_elem(3, 500.0),
        };
        table.insert(4, 1, iface.clone()).unwrap();
        assert!(table.contains(1, 4));
        assert_eq!(table.get(1, 4).unwrap(), &iface);
        assert!(table.insert(1, 4, iface).is_err());
    }

    #[test]
    fn test_coupling_table_missing_entry() {
        let table = CouplingTable::new();
        match table.get(3, 0) {
            Err(FusionError::MissingCoupling { first, second }) => {
                assert_eq!((first, second), (0, 3));
            }
            other => panic!("expected MissingCoupling, got {other:?}"),
        }
    }

    #[test]
    fn test_rectangular_exposure_coefficient() {
        let exposure = Exposure::Rectangular {
            height: 0.02,
            width: 0.03,
            htc_side: Array1::from_elem(2, 10.0),
            htc_top: Array1::from_elem(2, 4.0),
            htc_bottom: Array1::from_elem(2, 6.0),
        };
        // 2·0.02·10 + 0.03·(6 + 4)
        assert!((exposure.coefficient(1) - 0.7).abs() < 1e-14);
        assert!((exposure.perimeter() - 0.1).abs() < 1e-14);
    }
}
