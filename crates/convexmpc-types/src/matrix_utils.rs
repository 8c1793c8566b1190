use nalgebra::{Cholesky, DMatrix, DVector, SymmetricEigen};

/// Check that a matrix is square and symmetric within an absolute tolerance
pub fn is_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if !matrix.is_square() {
        return false;
    }

    let n = matrix.nrows();
    (0..n).all(|row| {
        (row + 1..n).all(|col| (matrix[(row, col)] - matrix[(col, row)]).abs() <= tolerance)
    })
}

/// Smallest eigenvalue of a symmetric matrix (`+inf` for an empty matrix)
pub fn min_eigenvalue(matrix: &DMatrix<f64>) -> f64 {
    if matrix.is_empty() {
        return f64::INFINITY;
    }

    SymmetricEigen::new(matrix.clone())
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min)
}

/// Scale used to turn an absolute tolerance into a relative one
fn magnitude(matrix: &DMatrix<f64>) -> f64 {
    matrix.amax().max(1.0)
}

/// Validate that a matrix is symmetric positive semi-definite (PSD)
pub fn validate_psd(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if !is_symmetric(matrix, tolerance) {
        return false;
    }

    // Diagonal matrices only need a non-negative diagonal
    let n = matrix.nrows();
    let is_diagonal = (0..n).all(|row| (0..n).all(|col| row == col || matrix[(row, col)] == 0.0));
    if is_diagonal {
        return matrix.diagonal().iter().all(|&x| x >= -tolerance);
    }

    min_eigenvalue(matrix) >= -tolerance * magnitude(matrix)
}

/// Validate that a matrix is symmetric positive definite (PD)
///
/// Requires a successful Cholesky factorisation and a smallest eigenvalue
/// bounded away from zero relative to the matrix magnitude.
pub fn validate_pd(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if matrix.is_empty() || !is_symmetric(matrix, tolerance) {
        return false;
    }

    if Cholesky::new(matrix.clone()).is_none() {
        return false;
    }

    min_eigenvalue(matrix) > tolerance * magnitude(matrix)
}

/// Build a block-diagonal matrix from a sequence of blocks
pub fn block_diag(blocks: &[&DMatrix<f64>]) -> DMatrix<f64> {
    let rows = blocks.iter().map(|b| b.nrows()).sum();
    let cols = blocks.iter().map(|b| b.ncols()).sum();
    let mut out = DMatrix::zeros(rows, cols);

    let (mut r, mut c) = (0, 0);
    for block in blocks {
        out.view_mut((r, c), block.shape()).copy_from(*block);
        r += block.nrows();
        c += block.ncols();
    }

    out
}

/// `I_n ⊗ block`: `n` copies of `block` along the diagonal
pub fn kron_identity(n: usize, block: &DMatrix<f64>) -> DMatrix<f64> {
    let blocks = vec![block; n];
    block_diag(&blocks)
}

/// Repeat a vector `times` times end to end
pub fn tile_vector(v: &DVector<f64>, times: usize) -> DVector<f64> {
    DVector::from_iterator(
        v.len() * times,
        (0..times).flat_map(|_| v.iter().copied()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_diag_layout() {
        let a = DMatrix::from_element(1, 1, 2.0);
        let b = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let d = block_diag(&[&a, &b]);

        assert_eq!(d.nrows(), 3);
        assert_eq!(d.ncols(), 3);
        assert_eq!(d[(0, 0)], 2.0);
        assert_eq!(d[(1, 2)], 2.0);
        assert_eq!(d[(2, 1)], 3.0);
        assert_eq!(d[(0, 1)], 0.0);
        assert_eq!(d[(2, 0)], 0.0);
    }

    #[test]
    fn test_kron_identity_and_tile() {
        let r = DMatrix::from_element(1, 1, 5.0);
        let rr = kron_identity(3, &r);
        assert_eq!(rr, DMatrix::from_diagonal_element(3, 3, 5.0));

        let v = DVector::from_vec(vec![1.0, -1.0]);
        let t = tile_vector(&v, 3);
        assert_eq!(t.as_slice(), &[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
        assert_eq!(tile_vector(&v, 0).len(), 0);
    }

    #[test]
    fn test_psd_validation() {
        let positive_diag = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 2.0, 3.0]));
        assert!(validate_psd(&positive_diag, 1e-10));

        let zero_diag = DMatrix::zeros(3, 3);
        assert!(validate_psd(&zero_diag, 1e-10));

        // Eigenvalues 3 and -1
        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(!validate_psd(&indefinite, 1e-10));

        let asymmetric = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.0, 1.0]);
        assert!(!validate_psd(&asymmetric, 1e-10));
    }

    #[test]
    fn test_pd_validation() {
        assert!(validate_pd(&DMatrix::identity(2, 2), 1e-10));

        let singular = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert!(validate_psd(&singular, 1e-10));
        assert!(!validate_pd(&singular, 1e-10));

        assert!(!validate_pd(&DMatrix::zeros(0, 0), 1e-10));
    }
}
