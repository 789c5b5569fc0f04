//! Mathematical primitives for SCPN Fusion Core.

pub mod banded;
pub mod history;
