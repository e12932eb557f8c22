use super::{FilterError, Kernel};

/// Create the 1x1 identity kernel.
pub fn identity() -> Kernel {
    Kernel::from_parts(1, 1, vec![1.0])
}

/// Create a box blur kernel.
///
/// # Arguments
///
/// * `width` - The number of columns.
/// * `height` - The number of rows.
///
/// # Returns
///
/// A kernel where every weight is one.
pub fn box_blur(width: usize, height: usize) -> Result<Kernel, FilterError> {
    Kernel::from_shape_vec(width, height, vec![1.0; width * height])
}

/// Create a 1D gaussian kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum to one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f64> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = kernel_size.saturating_sub(1) as f64 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f64 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f64>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create a square gaussian blur kernel.
///
/// The 2D kernel is the outer product of [`gaussian_kernel_1d`] with itself.
///
/// # Arguments
///
/// * `kernel_size` - The number of rows and columns.
/// * `sigma` - The sigma of the gaussian.
pub fn gaussian(kernel_size: usize, sigma: f64) -> Result<Kernel, FilterError> {
    let k = gaussian_kernel_1d(kernel_size, sigma);
    let data = k
        .iter()
        .flat_map(|ky| k.iter().map(move |kx| kx * ky))
        .collect();
    Kernel::from_shape_vec(kernel_size, kernel_size, data)
}

/// Create a 3x3 sharpening kernel.
pub fn sharpen() -> Kernel {
    square3([0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0])
}

/// Create a 3x3 laplacian kernel.
///
/// The weights sum to zero, so the result is not rescaled.
pub fn laplacian() -> Kernel {
    square3([0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0])
}

/// Create a 3x3 emboss kernel.
pub fn emboss() -> Kernel {
    square3([-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0])
}

fn square3(w: [f64; 9]) -> Kernel {
    Kernel::from_parts(3, 3, w.to_vec())
}
