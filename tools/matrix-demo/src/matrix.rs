//! Square-agnostic `i32` matrices over heap or paged storage.

use rand::Rng;
use uvm_pager::VmRegion;

pub trait Matrix {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> i32;
    fn set(&mut self, row: usize, col: usize, value: i32);
}

/// Reference storage the paged results are checked against.
pub struct HeapMatrix {
    rows: usize,
    cols: usize,
    elems: Vec<i32>,
}

impl HeapMatrix {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            elems: vec![0; rows * cols],
        }
    }
}

impl Matrix for HeapMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, row: usize, col: usize) -> i32 {
        self.elems[row * self.cols + col]
    }

    fn set(&mut self, row: usize, col: usize, value: i32) {
        self.elems[row * self.cols + col] = value;
    }
}

/// Row-major matrix living in the pager's range.
pub struct PagedMatrix<'a> {
    rows: usize,
    cols: usize,
    region: VmRegion<'a>,
}

impl<'a> PagedMatrix<'a> {
    /// Wraps a region of at least `rows * cols` elements.
    #[must_use]
    pub fn new(rows: usize, cols: usize, region: VmRegion<'a>) -> Self {
        debug_assert!(region.len() >= rows * cols * size_of::<i32>());
        Self { rows, cols, region }
    }
}

impl Matrix for PagedMatrix<'_> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, row: usize, col: usize) -> i32 {
        self.region.read_i32(row * self.cols + col)
    }

    fn set(&mut self, row: usize, col: usize, value: i32) {
        self.region.write_i32(row * self.cols + col, value);
    }
}

/// Fills `m` with values in `[-1000, 1000]`.
pub fn generate(m: &mut impl Matrix, rng: &mut impl Rng) {
    for r in 0..m.rows() {
        for c in 0..m.cols() {
            m.set(r, c, rng.gen_range(-1000..=1000));
        }
    }
}

pub fn copy(src: &impl Matrix, dst: &mut impl Matrix) {
    debug_assert_eq!((src.rows(), src.cols()), (dst.rows(), dst.cols()));
    for r in 0..src.rows() {
        for c in 0..src.cols() {
            dst.set(r, c, src.get(r, c));
        }
    }
}

/// `out = a * b`, calling `on_row` after each finished row.
pub fn multiply(
    a: &impl Matrix,
    b: &impl Matrix,
    out: &mut impl Matrix,
    mut on_row: impl FnMut(usize),
) {
    debug_assert_eq!(a.cols(), b.rows());
    for r in 0..a.rows() {
        for c in 0..b.cols() {
            let sum = (0..a.cols()).fold(0_i32, |acc, k| {
                acc.wrapping_add(a.get(r, k).wrapping_mul(b.get(k, c)))
            });
            out.set(r, c, sum);
        }
        on_row(r);
    }
}

#[must_use]
pub fn equal(a: &impl Matrix, b: &impl Matrix) -> bool {
    a.rows() == b.rows()
        && a.cols() == b.cols()
        && (0..a.rows()).all(|r| (0..a.cols()).all(|c| a.get(r, c) == b.get(r, c)))
}
