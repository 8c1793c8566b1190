use nalgebra::{DMatrix, DVector};

/// Append-only builder for an inequality block `G z <= h`
///
/// Starts with zero rows; bound families are appended only when present, so a
/// problem without bounds yields a 0-row `G`.
#[derive(Debug, Clone)]
pub struct InequalityStack {
    cols: usize,
    blocks: Vec<(DMatrix<f64>, DVector<f64>)>,
}

impl InequalityStack {
    pub fn new(cols: usize) -> Self {
        InequalityStack {
            cols,
            blocks: Vec::new(),
        }
    }

    /// Append `rows z <= rhs`
    pub fn push(&mut self, rows: DMatrix<f64>, rhs: DVector<f64>) {
        debug_assert_eq!(rows.ncols(), self.cols);
        debug_assert_eq!(rows.nrows(), rhs.len());
        self.blocks.push((rows, rhs));
    }

    /// Append the block built from `bound` if the bound exists
    pub fn push_if_present<B>(
        &mut self,
        bound: Option<&B>,
        build: impl FnOnce(&B) -> (DMatrix<f64>, DVector<f64>),
    ) {
        if let Some(bound) = bound {
            let (rows, rhs) = build(bound);
            self.push(rows, rhs);
        }
    }

    pub fn num_rows(&self) -> usize {
        self.blocks.iter().map(|(_, rhs)| rhs.len()).sum()
    }

    /// Stack all blocks in insertion order
    pub fn finish(self) -> (DMatrix<f64>, DVector<f64>) {
        let total = self.num_rows();
        let mut g = DMatrix::zeros(total, self.cols);
        let mut h = DVector::zeros(total);

        let mut row = 0;
        for (rows, rhs) in &self.blocks {
            let m = rhs.len();
            g.rows_mut(row, m).copy_from(rows);
            h.rows_mut(row, m).copy_from(rhs);
            row += m;
        }

        (g, h)
    }
}

/// `sign * I` over columns `offset..offset + width` of a `cols`-wide row block
pub fn selection_block(cols: usize, offset: usize, width: usize, sign: f64) -> DMatrix<f64> {
    let mut block = DMatrix::zeros(width, cols);
    for i in 0..width {
        block[(i, offset + i)] = sign;
    }
    block
}
