//! Boolean CSR-matrix primitives the automaton algebra is built on.
//!
//! Matrices are stored row-compressed: one jagged row of ascending column
//! indices per matrix row. All operators work in the AND/OR semiring, so a
//! product entry is true iff some conjunction of operand entries is true;
//! there is no saturating integer arithmetic anywhere.
use std::fmt::Debug;

use fixedbitset_stack::FixedBitSet;
use jaggedarray::jagged_array::JaggedArray;
use jaggedarray::jagged_array::JaggedArrayViewTrait;

use crate::error::{Error, Result};

/// A sparse boolean matrix in CSR form.
///
/// The number of set entries ([`BoolMatrix::nnz`]) is tracked on the side; it
/// is cheap, monotone under [`BoolMatrix::or`]-accumulation and bounded by
/// `rows * cols`, which is what every fixpoint loop in this crate uses as its
/// termination witness.
#[derive(Clone)]
pub struct BoolMatrix {
    rows: usize,
    cols: usize,
    nnz: usize,
    data: JaggedArray<u32, Vec<usize>, 2>,
}

impl BoolMatrix {
    /// The all-false matrix of the given shape.
    pub fn zero(rows: usize, cols: usize) -> Self {
        let mut data = JaggedArray::<u32, Vec<usize>, 2>::new();
        for _ in 0..rows {
            data.new_row::<0>();
        }
        BoolMatrix {
            rows,
            cols,
            nnz: 0,
            data,
        }
    }

    /// The n×n identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut data = JaggedArray::<u32, Vec<usize>, 2>::new();
        for i in 0..n {
            data.new_row::<0>();
            data.push_to_last_row(i as u32);
        }
        BoolMatrix {
            rows: n,
            cols: n,
            nnz: n,
            data,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of true entries.
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// The ascending column indices of row `r`.
    pub fn row(&self, r: usize) -> &[u32] {
        self.data.view([r]).as_slice()
    }

    /// Whether entry `(r, c)` is set.
    pub fn get(&self, r: usize, c: u32) -> bool {
        self.row(r).binary_search(&c).is_ok()
    }

    /// Iterate over the true entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.rows).flat_map(move |r| self.row(r).iter().map(move |&c| (r as u32, c)))
    }

    /// OR the columns of row `r` into `acc`.
    pub fn or_into_row(&self, r: usize, acc: &mut FixedBitSet) {
        for &c in self.row(r) {
            acc.insert(c as usize);
        }
    }

    /// The OR of all rows as a single 1×cols vector.
    pub fn row_or(&self) -> FixedBitSet {
        let mut acc = FixedBitSet::with_capacity(self.cols);
        for r in 0..self.rows {
            self.or_into_row(r, &mut acc);
        }
        acc
    }

    fn push_row_from_slices(&mut self, a: &[u32], b: &[u32]) {
        // Merge of two ascending runs; duplicates collapse.
        self.data.new_row::<0>();
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let next = match (a.get(i), b.get(j)) {
                (Some(&x), Some(&y)) => {
                    if x < y {
                        i += 1;
                        x
                    } else if y < x {
                        j += 1;
                        y
                    } else {
                        i += 1;
                        j += 1;
                        x
                    }
                }
                (Some(&x), None) => {
                    i += 1;
                    x
                }
                (None, Some(&y)) => {
                    j += 1;
                    y
                }
                (None, None) => break,
            };
            self.data.push_to_last_row(next);
            self.nnz += 1;
        }
    }

    fn check_same_shape(&self, other: &Self, op: &str) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(Error::internal(format!(
                "{op} on {}x{} and {}x{} matrices",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    /// Elementwise OR.
    pub fn or(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other, "elementwise OR")?;
        let mut out = BoolMatrix {
            rows: self.rows,
            cols: self.cols,
            nnz: 0,
            data: JaggedArray::new(),
        };
        for r in 0..self.rows {
            out.push_row_from_slices(self.row(r), other.row(r));
        }
        Ok(out)
    }

    /// Boolean matrix product.
    pub fn matmul(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::internal(format!(
                "product of {}x{} and {}x{} matrices",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = BoolMatrix {
            rows: self.rows,
            cols: other.cols,
            nnz: 0,
            data: JaggedArray::new(),
        };
        let mut scratch = FixedBitSet::with_capacity(other.cols);
        for r in 0..self.rows {
            scratch.clear();
            for &mid in self.row(r) {
                for &c in other.row(mid as usize) {
                    scratch.insert(c as usize);
                }
            }
            out.data.new_row::<0>();
            for c in scratch.ones() {
                out.data.push_to_last_row(c as u32);
                out.nnz += 1;
            }
        }
        Ok(out)
    }

    /// Kronecker product. The entry `(ra·R + rb, ca·C + cb)` of the result is
    /// set iff `(ra, ca)` is set in `self` and `(rb, cb)` in `other`, where
    /// `R`/`C` are `other`'s dimensions.
    pub fn kron(&self, other: &Self) -> Self {
        let mut out = BoolMatrix {
            rows: self.rows * other.rows,
            cols: self.cols * other.cols,
            nnz: 0,
            data: JaggedArray::new(),
        };
        for ra in 0..self.rows {
            for rb in 0..other.rows {
                out.data.new_row::<0>();
                for &ca in self.row(ra) {
                    let base = ca as usize * other.cols;
                    for &cb in other.row(rb) {
                        out.data.push_to_last_row((base + cb as usize) as u32);
                        out.nnz += 1;
                    }
                }
            }
        }
        out
    }

    /// Stack side by side: `[self | other]`.
    pub fn hstack(&self, other: &Self) -> Result<Self> {
        if self.rows != other.rows {
            return Err(Error::internal(format!(
                "horizontal stack of {}-row and {}-row matrices",
                self.rows, other.rows
            )));
        }
        let mut out = BoolMatrix {
            rows: self.rows,
            cols: self.cols + other.cols,
            nnz: 0,
            data: JaggedArray::new(),
        };
        for r in 0..self.rows {
            out.data.new_row::<0>();
            for &c in self.row(r) {
                out.data.push_to_last_row(c);
                out.nnz += 1;
            }
            for &c in other.row(r) {
                out.data.push_to_last_row(c + self.cols as u32);
                out.nnz += 1;
            }
        }
        Ok(out)
    }

    /// Stack on top of each other: `[self / other]`.
    pub fn vstack(&self, other: &Self) -> Result<Self> {
        if self.cols != other.cols {
            return Err(Error::internal(format!(
                "vertical stack of {}-column and {}-column matrices",
                self.cols, other.cols
            )));
        }
        let mut out = BoolMatrix {
            rows: self.rows + other.rows,
            cols: self.cols,
            nnz: 0,
            data: JaggedArray::new(),
        };
        for r in 0..self.rows {
            out.data.new_row::<0>();
            for &c in self.row(r) {
                out.data.push_to_last_row(c);
                out.nnz += 1;
            }
        }
        for r in 0..other.rows {
            out.data.new_row::<0>();
            for &c in other.row(r) {
                out.data.push_to_last_row(c);
                out.nnz += 1;
            }
        }
        Ok(out)
    }
}

impl PartialEq for BoolMatrix {
    fn eq(&self, other: &Self) -> bool {
        if self.rows != other.rows || self.cols != other.cols || self.nnz != other.nnz {
            return false;
        }
        (0..self.rows).all(|r| self.row(r) == other.row(r))
    }
}

impl Eq for BoolMatrix {}

impl Debug for BoolMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoolMatrix")
            .field("shape", &(self.rows, self.cols))
            .field("nnz", &self.nnz)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// A coordinate-form staging buffer.
///
/// Random writes into CSR storage are expensive, so construction sites
/// collect entries here and finalise to a [`BoolMatrix`] once per label.
#[derive(Debug, Clone)]
pub struct CooMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(u32, u32)>,
}

impl CooMatrix {
    /// An empty buffer for a matrix of the given shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        CooMatrix {
            rows,
            cols,
            entries: Vec::new(),
        }
    }

    /// Record entry `(r, c)` as true. Duplicates are fine.
    pub fn set(&mut self, r: u32, c: u32) {
        debug_assert!((r as usize) < self.rows && (c as usize) < self.cols);
        self.entries.push((r, c));
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort, deduplicate and build the CSR matrix.
    pub fn finalize(mut self) -> BoolMatrix {
        self.entries.sort_unstable();
        self.entries.dedup();
        let mut out = BoolMatrix {
            rows: self.rows,
            cols: self.cols,
            nnz: 0,
            data: JaggedArray::new(),
        };
        let mut next = 0;
        for r in 0..self.rows {
            out.data.new_row::<0>();
            while next < self.entries.len() && self.entries[next].0 as usize == r {
                out.data.push_to_last_row(self.entries[next].1);
                out.nnz += 1;
                next += 1;
            }
        }
        out
    }
}
