// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Banded Gaussian Elimination
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Banded matrix storage and Gaussian elimination without pivoting.
//!
//! Storage is `(2h + 1) × n`: column `i` of the storage holds the band of
//! matrix row `i`, and entry `(i, j)` sits at band offset `h + j − i`, so the
//! diagonal is storage row `h`. Reduction overwrites the band with the unit
//! lower factor (strictly below the diagonal) and the upper factor.

use fusion_types::error::{FusionError, FusionResult};
use ndarray::{Array1, Array2};
use std::ops::Range;

/// Smallest pivot magnitude accepted during reduction and back-substitution.
pub const PIVOT_TOLERANCE: f64 = 1e-20;

#[derive(Debug, Clone, PartialEq)]
pub struct BandedMatrix {
    n: usize,
    half_bandwidth: usize,
    data: Array2<f64>,
}

impl BandedMatrix {
    /// Zero matrix of order `n` with half-bandwidth `h` (requires `h < n`).
    pub fn new(n: usize, half_bandwidth: usize) -> FusionResult<Self> {
        if n == 0 {
            return Err(FusionError::ConfigError(
                "banded system needs at least one equation".into(),
            ));
        }
        if half_bandwidth >= n {
            return Err(FusionError::ConfigError(format!(
                "half-bandwidth {half_bandwidth} must be smaller than the equation count {n}"
            )));
        }
        Ok(BandedMatrix {
            n,
            half_bandwidth,
            data: Array2::zeros((2 * half_bandwidth + 1, n)),
        })
    }

    /// Square zero matrix of the same shape.
    pub fn zeros_like(&self) -> Self {
        BandedMatrix {
            n: self.n,
            half_bandwidth: self.half_bandwidth,
            data: Array2::zeros(self.data.raw_dim()),
        }
    }

    pub fn order(&self) -> usize {
        self.n
    }

    pub fn half_bandwidth(&self) -> usize {
        self.half_bandwidth
    }

    pub fn storage(&self) -> &Array2<f64> {
        &self.data
    }

    /// Columns of row `row` that fall inside the band and the matrix.
    pub fn row_columns(&self, row: usize) -> Range<usize> {
        let lo = row.saturating_sub(self.half_bandwidth);
        let hi = (row + self.half_bandwidth + 1).min(self.n);
        lo..hi
    }

    fn offset(&self, row: usize, col: usize) -> FusionResult<usize> {
        let h = self.half_bandwidth;
        if row >= self.n || col >= self.n || row.abs_diff(col) > h {
            return Err(FusionError::OutsideBand {
                row,
                col,
                half_bandwidth: h,
            });
        }
        Ok(h + col - row)
    }

    /// Entry `(row, col)`; zero outside the band.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self.offset(row, col) {
            Ok(k) => self.data[[k, row]],
            Err(_) => 0.0,
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> FusionResult<()> {
        let k = self.offset(row, col)?;
        self.data[[k, row]] = value;
        Ok(())
    }

    pub fn add(&mut self, row: usize, col: usize, value: f64) -> FusionResult<()> {
        let k = self.offset(row, col)?;
        self.data[[k, row]] += value;
        Ok(())
    }

    /// Replace row `row` by the unit row `e_row`.
    pub fn pin_row(&mut self, row: usize) {
        let h = self.half_bandwidth;
        let mut band = self.data.column_mut(row);
        band.fill(0.0);
        band[h] = 1.0;
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    pub fn scale(&mut self, alpha: f64) {
        self.data.mapv_inplace(|v| v * alpha);
    }

    /// `self += alpha · other` (same order and bandwidth).
    pub fn scaled_add(&mut self, alpha: f64, other: &BandedMatrix) -> FusionResult<()> {
        if self.n != other.n || self.half_bandwidth != other.half_bandwidth {
            return Err(FusionError::ConfigError(format!(
                "banded shapes differ: ({}, {}) vs ({}, {})",
                self.n, self.half_bandwidth, other.n, other.half_bandwidth
            )));
        }
        self.data.scaled_add(alpha, &other.data);
        Ok(())
    }

    /// `y = A · x`.
    pub fn matvec(&self, x: &Array1<f64>) -> Array1<f64> {
        let h = self.half_bandwidth;
        Array1::from_shape_fn(self.n, |row| {
            self.row_columns(row)
                .map(|col| self.data[[h + col - row, row]] * x[col])
                .sum()
        })
    }

    /// Divide each equation and its right-hand side by the row's largest magnitude.
    pub fn scale_rows(&mut self, rhs: &mut Array1<f64>) -> FusionResult<()> {
        for row in 0..self.n {
            let mut band = self.data.column_mut(row);
            let scale = band.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if scale == 0.0 {
                return Err(FusionError::ZeroScalingRow { row });
            }
            band.mapv_inplace(|v| v / scale);
            rhs[row] /= scale;
        }
        Ok(())
    }

    /// In-place band reduction. Consumes the matrix; the factors live on in [`BandedLu`].
    pub fn factorize(mut self) -> FusionResult<BandedLu> {
        let n = self.n;
        let h = self.half_bandwidth;
        for row in 1..n {
            for p in row.saturating_sub(h)..row {
                let pivot = self.data[[h, p]];
                if pivot.abs() <= PIVOT_TOLERANCE {
                    return Err(FusionError::SingularPivot { row: p, pivot });
                }
                let q = self.data[[h + p - row, row]] / pivot;
                if q == 0.0 {
                    continue;
                }
                let last = (p + h).min(n - 1);
                for col in p + 1..=last {
                    let upper = self.data[[h + col - p, p]];
                    self.data[[h + col - row, row]] -= q * upper;
                }
                self.data[[h + p - row, row]] = q;
            }
        }
        Ok(BandedLu { factors: self })
    }
}

/// Reduced band: unit lower multipliers below the diagonal, upper factor on and above.
#[derive(Debug, Clone)]
pub struct BandedLu {
    factors: BandedMatrix,
}

impl BandedLu {
    pub fn order(&self) -> usize {
        self.factors.n
    }

    /// Forward elimination of the right-hand side followed by back-substitution.
    pub fn solve(&self, rhs: &Array1<f64>) -> FusionResult<Array1<f64>> {
        let a = &self.factors;
        let n = a.n;
        let h = a.half_bandwidth;
        if rhs.len() != n {
            return Err(FusionError::ConfigError(format!(
                "right-hand side has {} entries, system has {n}",
                rhs.len()
            )));
        }

        let mut y = rhs.clone();
        for row in 1..n {
            let mut acc = y[row];
            for p in row.saturating_sub(h)..row {
                acc -= a.data[[h + p - row, row]] * y[p];
            }
            y[row] = acc;
        }

        for row in (0..n).rev() {
            let pivot = a.data[[h, row]];
            if pivot.abs() <= PIVOT_TOLERANCE {
                return Err(FusionError::SingularPivot { row, pivot });
            }
        }

        let mut x = Array1::zeros(n);
        for row in (0..n).rev() {
            let last = (row + h).min(n - 1);
            let mut acc = y[row];
            for col in row + 1..=last {
                acc -= a.data[[h + col - row, row]] * x[col];
            }
            x[row] = acc / a.data[[h, row]];
        }
        Ok(x)
    }
}

/// Row-scale, reduce and solve `A x = b`.
pub fn solve_banded(mut a: BandedMatrix, mut rhs: Array1<f64>) -> FusionResult<Array1<f64>> {
    a.scale_rows(&mut rhs)?;
    a.factorize()?.solve(&rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laplacian(n: usize) -> BandedMatrix {
        let mut a = BandedMatrix::new(n, 1).unwrap();
        for i in 0..n {
            a.set(i, i, 2.0).unwrap();
            if i > 0 {
                a.set(i, i - 1, -1.0).unwrap();
            }
            if i + 1 < n {
                a.set(i, i + 1, -1.0).unwrap();
            }
        }
        a
    }

    #[test]
    fn test_banded_identity() {
        let n = 6;
        let mut a = BandedMatrix::new(n, 2).unwrap();
        for i in 0..n {
            a.set(i, i, 1.0).unwrap();
        }
        let b = Array1::from_shape_fn(n, |i| i as f64 + 1.0);
        let x = solve_banded(a, b.clone()).unwrap();
        for i in 0..n {
            assert!((x[i] - b[i]).abs() < 1e-14, "x[{i}] should equal b[{i}]");
        }
    }

    #[test]
    fn test_banded_laplacian_residual() {
        let n = 12;
        let a = laplacian(n);
        let b = Array1::from_shape_fn(n, |i| (i as f64 * 0.3).cos());
        let x = solve_banded(a.clone(), b.clone()).unwrap();
        let ax = a.matvec(&x);
        for i in 0..n {
            assert!(
                (ax[i] - b[i]).abs() < 1e-10,
                "Ax[{i}] = {}, expected {}",
                ax[i],
                b[i]
            );
        }
    }

    #[test]
    fn test_storage_layout_diagonal_row() {
        let mut a = BandedMatrix::new(5, 2).unwrap();
        a.set(3, 1, 7.0).unwrap();
        a.set(3, 3, 4.0).unwrap();
        assert_eq!(a.storage()[[0, 3]], 7.0);
        assert_eq!(a.storage()[[2, 3]], 4.0);
        assert_eq!(a.get(3, 1), 7.0);
        assert_eq!(a.get(4, 0), 0.0);
    }

    #[test]
    fn test_write_outside_band_rejected() {
        let mut a = BandedMatrix::new(8, 2).unwrap();
        match a.add(0, 3, 1.0) {
            Err(FusionError::OutsideBand {
                row,
                col,
                half_bandwidth,
            }) => assert_eq!((row, col, half_bandwidth), (0, 3, 2)),
            other => panic!("expected OutsideBand, got {other:?}"),
        }
    }

    #[test]
    fn test_bandwidth_not_below_order_rejected() {
        assert!(matches!(
            BandedMatrix::new(4, 4),
            Err(FusionError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_row_reported() {
        let mut a = laplacian(5);
        for col in a.row_columns(2) {
            a.set(2, col, 0.0).unwrap();
        }
        let mut b = Array1::ones(5);
        match a.scale_rows(&mut b) {
            Err(FusionError::ZeroScalingRow { row }) => assert_eq!(row, 2),
            other => panic!("expected ZeroScalingRow, got {other:?}"),
        }
    }

    #[test]
    fn test_singular_pivot_reports_row() {
        // Second leading minor vanishes: [[1, 1], [1, 1]] block.
        let mut a = BandedMatrix::new(3, 1).unwrap();
        a.set(0, 0, 1.0).unwrap();
        a.set(0, 1, 1.0).unwrap();
        a.set(1, 0, 1.0).unwrap();
        a.set(1, 1, 1.0).unwrap();
        a.set(2, 2, 1.0).unwrap();
        match a.factorize() {
            Err(FusionError::SingularPivot { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected SingularPivot, got {other:?}"),
        }
    }

    #[test]
    fn test_singular_last_pivot_caught_in_solve() {
        let mut a = BandedMatrix::new(2, 1).unwrap();
        a.set(0, 0, 2.0).unwrap();
        a.set(0, 1, 1.0).unwrap();
        a.set(1, 0, 4.0).unwrap();
        a.set(1, 1, 2.0).unwrap();
        let lu = a.factorize().unwrap();
        match lu.solve(&Array1::ones(2)) {
            Err(FusionError::SingularPivot { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected SingularPivot, got {other:?}"),
        }
    }

    #[test]
    fn test_pin_row_gives_unit_row() {
        let mut a = laplacian(6);
        a.pin_row(3);
        for col in 0..6 {
            let expected = if col == 3 { 1.0 } else { 0.0 };
            assert_eq!(a.get(3, col), expected);
        }
        assert_eq!(a.get(2, 3), -1.0, "neighbouring rows untouched");
    }

    #[test]
    fn test_scaled_add_combines_operators() {
        let mut a = laplacian(4);
        let b = laplacian(4);
        a.scaled_add(-0.5, &b).unwrap();
        assert!((a.get(1, 1) - 1.0).abs() < 1e-15);
        assert!((a.get(1, 2) + 0.5).abs() < 1e-15);
    }
}
