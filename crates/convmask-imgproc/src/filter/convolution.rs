use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use convmask_image::{Image, ImageSize, PixelSource, Rgba16};

use super::{FilterError, Kernel};
use crate::parallel::{par_rows_mut, ExecutionStrategy};

/// Receives a notification every time a destination row is finished.
///
/// There is exactly one call per row and `done` is the number of rows
/// finished when that row completed. With a parallel strategy the calls come
/// from worker threads and may arrive out of order, so only the number of
/// calls is reliable. Counting calls gives a monotonic progress value.
pub trait RowProgress: Sync {
    /// Called after a row is written.
    fn row_completed(&self, done: usize, total: usize);
}

/// A [`RowProgress`] that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl RowProgress for NoProgress {
    fn row_completed(&self, _done: usize, _total: usize) {}
}

impl<F> RowProgress for F
where
    F: Fn(usize, usize) + Sync,
{
    fn row_completed(&self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Compute the filtered color of a single output pixel.
///
/// Every non-zero kernel cell `(kx, ky)` reads the source pixel at
/// `(x + kx - cx, y + ky - cy)` where `(cx, cy)` is the kernel center. Cells
/// falling outside the source are skipped, and the weighted red, green and blue
/// sums are divided by [`Kernel::normalization_factor`] without compensating
/// for the skipped cells. Results are clamped to `0..=65535` and truncated.
/// Alpha is copied from the source pixel at `(x, y)`.
///
/// The color sums are taken over alpha-premultiplied channels, so transparent
/// neighbours contribute nothing. The sum is converted back to straight color
/// against the output alpha with [`Rgba16::from_premultiplied`]. For opaque
/// images both conversions are the identity.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The convolution kernel.
/// * `x` - The column of the output pixel.
/// * `y` - The row of the output pixel.
///
/// # Errors
///
/// [`FilterError::CenterPixelUnavailable`] if `(x, y)` is outside the source.
///
/// # Examples
///
/// ```
/// use convmask_image::{Image, Rgba16};
/// use convmask_imgproc::filter::{filter_pixel, Kernel};
///
/// let src = Image::<u16, 4>::new([1, 1].into(), vec![900, 1800, 2700, 65535]).unwrap();
/// let kernel = Kernel::new(vec![vec![1.0; 3]; 3]).unwrap();
///
/// // only the center cell lands inside a 1x1 image
/// let color = filter_pixel(&src, &kernel, 0, 0).unwrap();
/// assert_eq!(color, Rgba16::new(100, 200, 300, 65535));
/// ```
pub fn filter_pixel<S>(src: &S, kernel: &Kernel, x: usize, y: usize) -> Result<Rgba16, FilterError>
where
    S: PixelSource + ?Sized,
{
    filter_pixel_impl(src, kernel, kernel.normalization_factor(), x, y)
}

fn filter_pixel_impl<S>(
    src: &S,
    kernel: &Kernel,
    norm: f64,
    x: usize,
    y: usize,
) -> Result<Rgba16, FilterError>
where
    S: PixelSource + ?Sized,
{
    let center = src
        .color_at(x, y)
        .ok_or(FilterError::CenterPixelUnavailable(x, y))?;

    let (cx, cy) = kernel.center();
    let (cols, rows) = (src.width() as isize, src.height() as isize);

    let mut acc = [0.0f64; 3];
    for (kx, ky, w) in kernel.iter() {
        if w == 0.0 {
            continue;
        }

        let sx = x as isize + kx as isize - cx as isize;
        let sy = y as isize + ky as isize - cy as isize;
        if sx < 0 || sy < 0 || sx >= cols || sy >= rows {
            continue;
        }

        let Some(color) = src.color_at(sx as usize, sy as usize) else {
            continue;
        };
        for (a, v) in acc.iter_mut().zip(color.premultiplied()) {
            *a += f64::from(v) * w;
        }
    }

    let rgb = acc.map(|sum| saturate_u16(sum / norm));
    Ok(Rgba16::from_premultiplied(rgb, center.a))
}

// below zero -> 0, at or above 65535 -> 65535, otherwise truncated
fn saturate_u16(v: f64) -> u16 {
    if v < 0.0 {
        0
    } else if v >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        v as u16
    }
}

/// Convolve an image with a kernel.
///
/// Every destination pixel is computed with [`filter_pixel`] and written
/// exactly once. Rows are distributed according to `strategy`; the result does
/// not depend on the strategy.
///
/// # Arguments
///
/// * `src` - The source image with size (W, H).
/// * `dst` - The destination image with size (W, H).
/// * `kernel` - The convolution kernel.
/// * `strategy` - How rows are scheduled.
/// * `progress` - Notified after each finished row.
///
/// PRECONDITION: `src` and `dst` must have the same size.
pub fn filter2d<S, P>(
    src: &S,
    dst: &mut Image<u16, 4>,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
    progress: &P,
) -> Result<(), FilterError>
where
    S: PixelSource + Sync + ?Sized,
    P: RowProgress + ?Sized,
{
    let size = src.size();
    if size != dst.size() {
        return Err(FilterError::ImageSizeMismatch(
            size.width,
            size.height,
            dst.width(),
            dst.height(),
        ));
    }

    let norm = kernel.normalization_factor();
    log::debug!(
        "filter2d: {}x{} image, {}x{} kernel, norm {}, strategy {}",
        size.width,
        size.height,
        kernel.width(),
        kernel.height(),
        norm,
        strategy
    );

    if size.num_pixels() == 0 {
        return Ok(());
    }

    let start = Instant::now();
    let rows_done = AtomicUsize::new(0);

    par_rows_mut(
        dst.as_slice_mut(),
        size.width * 4,
        strategy,
        |y, row| -> Result<(), FilterError> {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let color = filter_pixel_impl(src, kernel, norm, x, y)?;
                px.copy_from_slice(&<[u16; 4]>::from(color));
            }
            let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
            progress.row_completed(done, size.height);
            Ok(())
        },
    )?;

    log::debug!("filter2d: finished in {:?}", start.elapsed());

    Ok(())
}

/// The lifecycle of a [`ConvolutionPass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// The destination has been allocated but not written.
    NotStarted,
    /// Every destination pixel has been written.
    Completed,
}

/// A single full-image convolution.
///
/// The pass borrows the source and the kernel, owns a freshly allocated
/// destination of the same size, and can be run once.
///
/// # Examples
///
/// ```
/// use convmask_image::Image;
/// use convmask_imgproc::filter::{kernels, ConvolutionPass, NoProgress, PassState};
///
/// let src = Image::<u8, 3>::from_size_val([4, 3].into(), 10).unwrap();
/// let kernel = kernels::identity();
///
/// let mut pass = ConvolutionPass::new(&src, &kernel).unwrap();
/// pass.run(&NoProgress).unwrap();
/// assert_eq!(pass.state(), PassState::Completed);
///
/// let dst = pass.into_output().unwrap();
/// assert_eq!(dst.size(), src.size());
/// ```
pub struct ConvolutionPass<'a, S: ?Sized> {
    src: &'a S,
    kernel: &'a Kernel,
    dst: Image<u16, 4>,
    strategy: ExecutionStrategy,
    state: PassState,
}

impl<'a, S> ConvolutionPass<'a, S>
where
    S: PixelSource + Sync + ?Sized,
{
    /// Prepare a pass over `src` with `kernel`.
    ///
    /// # Errors
    ///
    /// Fails if the destination cannot be allocated.
    pub fn new(src: &'a S, kernel: &'a Kernel) -> Result<Self, FilterError> {
        let dst = Image::from_size_val(src.size(), 0u16)?;
        Ok(Self {
            src,
            kernel,
            dst,
            strategy: ExecutionStrategy::default(),
            state: PassState::NotStarted,
        })
    }

    /// Set how rows are scheduled.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The current state of the pass.
    pub fn state(&self) -> PassState {
        self.state
    }

    /// The size of the destination image.
    pub fn size(&self) -> ImageSize {
        self.dst.size()
    }

    /// Run the pass, filling the destination.
    ///
    /// # Errors
    ///
    /// [`FilterError::PassAlreadyCompleted`] on a second call, or any error
    /// raised by [`filter2d`].
    pub fn run<P: RowProgress + ?Sized>(&mut self, progress: &P) -> Result<(), FilterError> {
        if self.state == PassState::Completed {
            return Err(FilterError::PassAlreadyCompleted);
        }
        filter2d(self.src, &mut self.dst, self.kernel, self.strategy, progress)?;
        self.state = PassState::Completed;
        Ok(())
    }

    /// Hand over the filtered image.
    ///
    /// # Errors
    ///
    /// [`FilterError::PassNotRun`] if [`ConvolutionPass::run`] has not completed.
    pub fn into_output(self) -> Result<Image<u16, 4>, FilterError> {
        match self.state {
            PassState::Completed => Ok(self.dst),
            PassState::NotStarted => Err(FilterError::PassNotRun),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernels;
    use convmask_image::ImageError;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::sync::Mutex;

    fn gray_row(values: &[u16]) -> Result<Image<u16, 4>, ImageError> {
        let data = values
            .iter()
            .flat_map(|&v| [v, v, v, Rgba16::OPAQUE])
            .collect();
        Image::new([values.len(), 1].into(), data)
    }

    fn flat(size: ImageSize, v: u16) -> Result<Image<u16, 4>, ImageError> {
        let data = (0..size.num_pixels())
            .flat_map(|_| [v, v, v, Rgba16::OPAQUE])
            .collect();
        Image::new(size, data)
    }

    fn red(img: &Image<u16, 4>) -> Vec<u16> {
        img.as_slice().chunks_exact(4).map(|px| px[0]).collect()
    }

    fn random_rgba(size: ImageSize, seed: u64) -> Result<Image<u16, 4>, ImageError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..size.num_pixels() * 4)
            .map(|_| rng.random::<u16>())
            .collect();
        Image::new(size, data)
    }

    fn random_rgb(size: ImageSize, seed: u64) -> Result<Image<u16, 4>, ImageError> {
        let mut img = random_rgba(size, seed)?;
        img.as_slice_mut()
            .chunks_exact_mut(4)
            .for_each(|px| px[3] = Rgba16::OPAQUE);
        Ok(img)
    }

    fn run(src: &Image<u16, 4>, kernel: &Kernel) -> Result<Image<u16, 4>, FilterError> {
        let mut dst = Image::from_size_val(src.size(), 0u16)?;
        filter2d(src, &mut dst, kernel, ExecutionStrategy::Serial, &NoProgress)?;
        Ok(dst)
    }

    #[test]
    fn test_identity_kernel() -> Result<(), FilterError> {
        let src = random_rgb([7, 5].into(), 1)?;
        assert_eq!(run(&src, &kernels::identity())?, src);

        // any kernel that is zero except the center
        let kernel = Kernel::new(vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 3.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ])?;
        assert_eq!(run(&src, &kernel)?, src);
        Ok(())
    }

    #[test]
    fn test_identity_widens_u8() -> Result<(), FilterError> {
        let src = Image::<u8, 3>::new([2, 1].into(), vec![0, 128, 255, 1, 2, 3])?;
        let mut dst = Image::from_size_val(src.size(), 0u16)?;
        filter2d(
            &src,
            &mut dst,
            &kernels::identity(),
            ExecutionStrategy::AutoRows,
            &NoProgress,
        )?;

        assert_eq!(
            dst.as_slice(),
            &[0, 128 * 257, 65535, 65535, 257, 2 * 257, 3 * 257, 65535]
        );
        Ok(())
    }

    #[test]
    fn test_zero_sum_kernel() -> Result<(), FilterError> {
        let src = gray_row(&[100, 200, 400])?;
        let kernel = Kernel::new(vec![vec![-1.0, 0.0, 1.0]])?;

        let dst = run(&src, &kernel)?;
        assert_eq!(red(&dst), vec![200, 300, 0]);
        Ok(())
    }

    #[test]
    fn test_clamping() -> Result<(), FilterError> {
        let src = gray_row(&[0, 65535, 0])?;
        let kernel = Kernel::new(vec![vec![-1.0, 3.0, -1.0]])?;

        let dst = run(&src, &kernel)?;
        assert_eq!(red(&dst), vec![0, 65535, 0]);

        // normalized kernels never clamp
        let kernel = Kernel::new(vec![vec![2.0; 3]; 3])?;
        let src = flat([6, 6].into(), 30000)?;
        let dst = run(&src, &kernel)?;
        for y in 0..6 {
            for x in 0..6 {
                let inside = |v: usize| if v == 0 || v == 5 { 2 } else { 3 };
                let expected = match inside(x) * inside(y) {
                    9 => 30000,
                    6 => 20000,
                    _ => 13333,
                };
                assert_eq!(
                    dst.color_at(x, y),
                    Some(Rgba16::gray(expected)),
                    "pixel ({x}, {y})"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_truncation_and_even_width() -> Result<(), FilterError> {
        // center of a 2-wide kernel is column 1
        let src = gray_row(&[1, 2])?;
        let kernel = Kernel::new(vec![vec![1.0, 1.0]])?;

        let dst = run(&src, &kernel)?;
        assert_eq!(red(&dst), vec![0, 1]);
        Ok(())
    }

    #[test]
    fn test_non_square_kernel_center() -> Result<(), FilterError> {
        let src = Image::<u16, 1>::new([1, 3].into(), vec![10, 20, 30])?;
        let kernel = Kernel::new(vec![vec![0.0], vec![0.0], vec![1.0]])?;

        let mut dst = Image::from_size_val(src.size(), 0u16)?;
        filter2d(&src, &mut dst, &kernel, ExecutionStrategy::Serial, &NoProgress)?;
        assert_eq!(red(&dst), vec![20, 30, 0]);
        Ok(())
    }

    #[test]
    fn test_boundary_cropping() -> Result<(), FilterError> {
        let src = Image::<u16, 4>::new([1, 1].into(), vec![900, 1800, 65535, 65535])?;
        let kernel = Kernel::new(vec![vec![1.0; 3]; 3])?;

        let dst = run(&src, &kernel)?;
        assert_eq!(dst.as_slice(), &[100, 200, 7281, 65535]);
        Ok(())
    }

    #[test]
    fn test_edges_not_renormalized() -> Result<(), FilterError> {
        let src = gray_row(&[900, 900, 900])?;
        let kernel = kernels::box_blur(3, 1)?;

        let dst = run(&src, &kernel)?;
        assert_eq!(red(&dst), vec![600, 900, 600]);
        Ok(())
    }

    #[test]
    fn test_alpha_passthrough() -> Result<(), FilterError> {
        let src = random_rgba([9, 4].into(), 3)?;
        let dst = run(&src, &kernels::sharpen())?;

        for (s, d) in src.as_slice().chunks_exact(4).zip(dst.as_slice().chunks_exact(4)) {
            assert_eq!(s[3], d[3]);
        }
        Ok(())
    }

    #[test]
    fn test_transparent_neighbour_adds_nothing() -> Result<(), FilterError> {
        // transparent white, opaque black
        let src = Image::<u16, 4>::new([2, 1].into(), vec![65535, 65535, 65535, 0, 0, 0, 0, 65535])?;
        let kernel = Kernel::new(vec![vec![1.0, 1.0, 1.0]])?;

        assert_eq!(
            filter_pixel(&src, &kernel, 1, 0)?,
            Rgba16::new(0, 0, 0, 65535)
        );
        assert_eq!(filter_pixel(&src, &kernel, 0, 0)?, Rgba16::new(0, 0, 0, 0));
        Ok(())
    }

    #[test]
    fn test_partial_alpha() -> Result<(), FilterError> {
        let src = Image::<u16, 4>::new(
            [2, 1].into(),
            vec![40000, 40000, 40000, 32768, 0, 0, 0, 65535],
        )?;
        let kernel = Kernel::new(vec![vec![1.0, 1.0]])?;

        let dst = run(&src, &kernel)?;
        assert_eq!(
            dst.as_slice(),
            &[19999, 19999, 19999, 32768, 10000, 10000, 10000, 65535]
        );
        Ok(())
    }

    #[test]
    fn test_determinism_across_strategies() -> Result<(), FilterError> {
        let src = random_rgba([17, 13].into(), 4)?;
        let kernel = kernels::gaussian(5, 1.3)?;

        let mut outputs = Vec::new();
        for strategy in [
            ExecutionStrategy::Serial,
            ExecutionStrategy::AutoRows,
            ExecutionStrategy::Fixed(3),
            ExecutionStrategy::Serial,
        ] {
            let mut dst = Image::from_size_val(src.size(), 0u16)?;
            filter2d(&src, &mut dst, &kernel, strategy, &NoProgress)?;
            outputs.push(dst);
        }

        assert!(outputs.windows(2).all(|w| w[0] == w[1]));
        Ok(())
    }

    #[test]
    fn test_every_pixel_written() -> Result<(), FilterError> {
        let src = flat([5, 4].into(), 7)?;
        let mut dst = Image::from_size_val(src.size(), 1u16)?;
        filter2d(
            &src,
            &mut dst,
            &kernels::identity(),
            ExecutionStrategy::AutoRows,
            &NoProgress,
        )?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn test_progress_reports_every_row() -> Result<(), FilterError> {
        let src = random_rgba([3, 6].into(), 5)?;
        let seen = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| {
            if let Ok(mut seen) = seen.lock() {
                seen.push((done, total));
            }
        };

        let mut dst = Image::from_size_val(src.size(), 0u16)?;
        filter2d(
            &src,
            &mut dst,
            &kernels::box_blur(3, 3)?,
            ExecutionStrategy::Serial,
            &progress,
        )?;

        let seen = seen.into_inner().unwrap_or_default();
        assert_eq!(seen, (1..=6).map(|d| (d, 6)).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_progress_counts_rows_in_parallel() -> Result<(), FilterError> {
        let src = random_rgb([3, 40].into(), 7)?;
        let calls = AtomicUsize::new(0);
        let max_done = AtomicUsize::new(0);
        let progress = |done: usize, total: usize| {
            assert_eq!(total, 40);
            calls.fetch_add(1, Ordering::Relaxed);
            max_done.fetch_max(done, Ordering::Relaxed);
        };

        let mut dst = Image::from_size_val(src.size(), 0u16)?;
        filter2d(
            &src,
            &mut dst,
            &kernels::sharpen(),
            ExecutionStrategy::Fixed(4),
            &progress,
        )?;

        assert_eq!(calls.into_inner(), 40);
        assert_eq!(max_done.into_inner(), 40);
        Ok(())
    }

    #[test]
    fn test_size_mismatch() -> Result<(), FilterError> {
        let src = Image::<u16, 4>::from_size_val([3, 2].into(), 0)?;
        let mut dst = Image::from_size_val([2, 3].into(), 0u16)?;
        let res = filter2d(
            &src,
            &mut dst,
            &kernels::identity(),
            ExecutionStrategy::Serial,
            &NoProgress,
        );
        assert_eq!(res, Err(FilterError::ImageSizeMismatch(3, 2, 2, 3)));
        Ok(())
    }

    #[test]
    fn test_empty_image() -> Result<(), FilterError> {
        let src = Image::<u16, 4>::new([0, 0].into(), vec![])?;
        let dst = run(&src, &kernels::sharpen())?;
        assert!(dst.as_slice().is_empty());
        Ok(())
    }

    #[test]
    fn test_center_pixel_unavailable() -> Result<(), FilterError> {
        let src = Image::<u16, 4>::from_size_val([2, 2].into(), 0)?;
        let res = filter_pixel(&src, &kernels::identity(), 2, 0);
        assert_eq!(res, Err(FilterError::CenterPixelUnavailable(2, 0)));
        Ok(())
    }

    #[test]
    fn test_pass_lifecycle() -> Result<(), FilterError> {
        let src = random_rgba([4, 4].into(), 6)?;
        let kernel = kernels::emboss();

        let pass = ConvolutionPass::new(&src, &kernel)?;
        assert_eq!(pass.state(), PassState::NotStarted);
        assert_eq!(pass.size(), src.size());
        assert!(matches!(pass.into_output(), Err(FilterError::PassNotRun)));

        let mut pass = ConvolutionPass::new(&src, &kernel)?.with_strategy(ExecutionStrategy::Fixed(2));
        pass.run(&NoProgress)?;
        assert_eq!(pass.state(), PassState::Completed);
        assert_eq!(pass.run(&NoProgress), Err(FilterError::PassAlreadyCompleted));

        let dst = pass.into_output()?;
        assert_eq!(dst, run(&src, &kernel)?);
        Ok(())
    }
}
