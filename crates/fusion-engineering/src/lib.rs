// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fusion Engineering
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Conductor material engineering.
//!
//! - `superconductor`: RE-123 critical surface
//! - `current_sharing`: current-sharing temperature root search
//! - `materials`: solid thermal properties
//! - `coolant`: coolant equation of state
//! - `strands`: strand quench margins

pub mod coolant;
pub mod current_sharing;
pub mod materials;
pub mod strands;
pub mod superconductor;
