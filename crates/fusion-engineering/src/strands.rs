// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Strand Quench Margins
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Critical temperature, critical current and current-sharing margins of
//! superconducting strands, at nodes and Gauss points.

use crate::current_sharing::current_sharing_profile;
use crate::superconductor::{critical_current_profile, CriticalSurface, Re123};
use fusion_types::config::SuperconductorConfig;
use fusion_types::error::FusionResult;
use fusion_types::state::{gauss_average, MarginProfile, QuenchMargins, SolidComponent};
use ndarray::{Array1, Zip};

/// Operating current density in the superconductor [A/m²].
pub fn operating_current_density(
    sc: &SuperconductorConfig,
    operating_current: f64,
    cos_theta: f64,
) -> f64 {
    operating_current.abs() / (sc.cross_section * cos_theta)
}

/// Margins on one set of points; `gradient` raises the field to its peak value.
pub fn margin_profile<S: CriticalSurface>(
    surface: &S,
    temperature: &Array1<f64>,
    field: &Array1<f64>,
    gradient: &Array1<f64>,
    jop: f64,
) -> MarginProfile {
    let peak_field = Zip::from(field)
        .and(gradient)
        .map_collect(|&b, &a| b * (1.0 + a));
    let tcs = current_sharing_profile(surface, field, jop);
    let tcs_min = current_sharing_profile(surface, &peak_field, jop);
    let margin = &tcs - temperature;
    MarginProfile {
        critical_temperature: Array1::from_elem(temperature.len(), surface.tc0()),
        critical_current_density: critical_current_profile(surface, temperature, field),
        current_sharing_temperature: tcs,
        minimum_current_sharing_temperature: tcs_min,
        temperature_margin: margin,
    }
}

/// Re-evaluate the quench margins of a strand; a no-op for non-superconducting solids.
pub fn update_margins(solid: &mut SolidComponent) -> FusionResult<()> {
    let Some(sc) = solid.superconductor else {
        solid.margins = None;
        return Ok(());
    };
    let surface = Re123::from_config(&sc)?;
    let jop = operating_current_density(&sc, solid.operating_current, solid.cos_theta);

    let node = margin_profile(
        &surface,
        &solid.node_temperature,
        &solid.magnetic_field,
        &solid.field_gradient,
        jop,
    );

    let gauss_field = gauss_average(&solid.magnetic_field);
    let gauss_gradient = gauss_average(&solid.field_gradient).mapv(f64::abs);
    let gauss = margin_profile(
        &surface,
        &solid.gauss_temperature,
        &gauss_field,
        &gauss_gradient,
        jop,
    );

    solid.margins = Some(QuenchMargins { node, gauss });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_types::config::{MaterialConfig, SolidKind};

    fn strand(n_nodes: usize, current: f64) -> SolidComponent {
        let n_el = n_nodes - 1;
        SolidComponent {
            id: "sc".into(),
            kind: SolidKind::Strand,
            cross_section: 3e-5,
            cos_theta: 1.0,
            material: MaterialConfig::Re123,
            superconductor: Some(SuperconductorConfig {
                tc0: 92.0,
                bc20: 140.0,
                c0: 3.0e7,
                cross_section: 4e-7,
            }),
            operating_current: current,
            node_temperature: Array1::from_elem(n_nodes, 4.5),
            gauss_temperature: Array1::from_elem(n_el, 4.5),
            gauss_density: Array1::zeros(n_el),
            gauss_specific_heat: Array1::zeros(n_el),
            gauss_conductivity: Array1::zeros(n_el),
            heat_source: Array1::zeros(n_nodes),
            magnetic_field: Array1::from_elem(n_nodes, 10.0),
            field_gradient: Array1::from_elem(n_nodes, 0.1),
            temperature_change: Array1::zeros(n_el),
            margins: None,
        }
    }

    #[test]
    fn test_operating_current_density() {
        let s = strand(3, -1000.0);
        let sc = s.superconductor.unwrap();
        let j = operating_current_density(&sc, s.operating_current, 0.5);
        assert!((j - 1000.0 / (4e-7 * 0.5)).abs() < 1e-3);
    }

    #[test]
    fn test_margins_shapes_and_ordering() {
        let mut s = strand(6, 1000.0);
        update_margins(&mut s).unwrap();
        let m = s.margins.as_ref().unwrap();
        assert_eq!(m.node.current_sharing_temperature.len(), 6);
        assert_eq!(m.gauss.current_sharing_temperature.len(), 5);
        for i in 0..6 {
            let tcs = m.node.current_sharing_temperature[i];
            let tcs_min = m.node.minimum_current_sharing_temperature[i];
            assert!(tcs > 4.5, "strand should be superconducting, Tcs = {tcs}");
            assert!(tcs_min <= tcs, "peak field must not raise Tcs");
            assert!((m.node.temperature_margin[i] - (tcs - 4.5)).abs() < 1e-12);
            assert_eq!(m.node.critical_temperature[i], 92.0);
        }
    }

    #[test]
    fn test_non_superconducting_solid_has_no_margins() {
        let mut s = strand(4, 1000.0);
        s.superconductor = None;
        update_margins(&mut s).unwrap();
        assert!(s.margins.is_none());
    }
}
