use super::FilterError;

/// A rectangular grid of convolution weights.
///
/// Rows are indexed by `y` and columns by `x`. The cell at
/// `(width / 2, height / 2)` is aligned with the output pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl Kernel {
    /// Create a kernel from its rows.
    ///
    /// # Arguments
    ///
    /// * `rows` - The weights, one vector per kernel row.
    ///
    /// # Errors
    ///
    /// * [`FilterError::EmptyKernel`] if there are no weights.
    /// * [`FilterError::InvalidKernelShape`] if the rows have unequal lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use convmask_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::new(vec![
    ///     vec![0.0, 1.0, 0.0],
    ///     vec![1.0, 4.0, 1.0],
    ///     vec![0.0, 1.0, 0.0],
    /// ]).unwrap();
    ///
    /// assert_eq!(kernel.center(), (1, 1));
    /// assert_eq!(kernel.normalization_factor(), 8.0);
    /// ```
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, FilterError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(FilterError::EmptyKernel);
        }

        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(FilterError::InvalidKernelShape {
                row,
                expected: width,
                found: r.len(),
            });
        }

        let height = rows.len();
        let data = rows.into_iter().flatten().collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// * [`FilterError::EmptyKernel`] if either dimension is zero.
    /// * [`FilterError::InvalidKernelShape`] if `data` does not hold exactly
    ///   `width * height` weights.
    pub fn from_shape_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self, FilterError> {
        if width == 0 || height == 0 {
            return Err(FilterError::EmptyKernel);
        }

        if data.len() != width * height {
            // report the first row that comes up short
            let row = data.len() / width;
            return Err(FilterError::InvalidKernelShape {
                row: row.min(height - 1),
                expected: width,
                found: data.len().saturating_sub(row.min(height - 1) * width),
            });
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    // caller guarantees `data.len() == width * height` with both non-zero
    pub(super) fn from_parts(width: usize, height: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The `(x, y)` cell aligned with the output pixel.
    pub fn center(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// The weight at column `x` and row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// The weights in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterate over `(x, y, weight)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &w)| (i % self.width, i / self.width, w))
    }

    /// Sum of all weights.
    pub fn weight_sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// The divisor applied to every weighted sum.
    ///
    /// This is the sum of all weights, or `1.0` when the weights sum to zero.
    /// The same factor is used for every pixel, including pixels whose
    /// neighborhood is cropped by the image border.
    pub fn normalization_factor(&self) -> f64 {
        let sum = self.weight_sum();
        if sum == 0.0 {
            1.0
        } else {
            sum
        }
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (y, row) in self.data.chunks_exact(self.width).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for (x, w) in row.iter().enumerate() {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{w}")?;
            }
        }
        Ok(())
    }
}
