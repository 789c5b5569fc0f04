// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Singular pivot at equation {row}: |a| = {pivot:e}")]
    SingularPivot { row: usize, pivot: f64 },

    #[error("Equation {row} has no non-zero coefficient and cannot be scaled")]
    ZeroScalingRow { row: usize },

    #[error("Entry ({row}, {col}) lies outside the band (half-bandwidth {half_bandwidth})")]
    OutsideBand {
        row: usize,
        col: usize,
        half_bandwidth: usize,
    },

    #[error("No interface coupling between components {first} and {second}")]
    MissingCoupling { first: usize, second: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FusionResult<T> = Result<T, FusionError>;
