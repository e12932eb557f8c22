use std::path::PathBuf;
use std::time::Instant;

use argh::FromArgs;
use convmask::{
    image::PixelSource,
    imgproc::{
        filter::{ConvolutionPass, Kernel, NoProgress},
        parallel::ExecutionStrategy,
    },
    io::{read_image_any, read_kernel_file, write_image, EncodeOptions, ImageFormat},
};

/// Apply a convolution mask read from a text file to a PNG or JPEG image
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the input image
    #[argh(positional)]
    input: PathBuf,

    /// path to write the filtered image to
    #[argh(positional)]
    output: PathBuf,

    /// path to the kernel file, one row per line, values separated by commas
    #[argh(positional)]
    kernel: PathBuf,

    /// number of worker threads, defaults to one per core
    #[argh(option, short = 't')]
    threads: Option<usize>,

    /// process the rows one after another on the main thread
    #[argh(switch, short = 's')]
    serial: bool,

    /// output format, png or jpeg; defaults to the format of the input
    #[argh(option, short = 'f')]
    format: Option<ImageFormat>,

    /// jpeg quality, from 1 to 100
    #[argh(option, short = 'q', default = "75", from_str_fn(parse_quality))]
    quality: u8,

    /// disable the progress bar
    #[argh(switch)]
    no_progress: bool,
}

fn parse_quality(value: &str) -> Result<u8, String> {
    match value.parse::<u8>() {
        Ok(q) if (1..=100).contains(&q) => Ok(q),
        _ => Err(format!("quality must be between 1 and 100, got {value}")),
    }
}

fn execution_strategy(args: &Args) -> Result<ExecutionStrategy, String> {
    match (args.serial, args.threads) {
        (true, Some(_)) => Err("--serial and --threads cannot be used together".to_string()),
        (true, None) => Ok(ExecutionStrategy::Serial),
        (false, Some(n)) => Ok(ExecutionStrategy::Fixed(n)),
        (false, None) => Ok(ExecutionStrategy::AutoRows),
    }
}

fn progress_bar(rows: usize) -> Result<indicatif::ProgressBar, Box<dyn std::error::Error>> {
    let pb = indicatif::ProgressBar::new(rows as u64);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} rows ({eta})",
            )?
            .progress_chars("##>-"),
    );
    Ok(pb)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let strategy = execution_strategy(&args)?;
    let start = Instant::now();

    let kernel = Kernel::new(read_kernel_file(&args.kernel)?)?;

    let (src, input_format) = read_image_any(&args.input)?;
    log::info!("image type: {input_format}");
    log::info!("image size: {}", src.size());
    log::info!("loaded mask ({}x{}):\n{kernel}", kernel.width(), kernel.height());

    let mut pass = ConvolutionPass::new(&src, &kernel)?.with_strategy(strategy);

    if args.no_progress {
        pass.run(&NoProgress)?;
    } else {
        let pb = progress_bar(pass.size().height)?;
        // rows may finish out of order, count calls instead of trusting `done`
        pass.run(&|_done: usize, _total: usize| pb.inc(1))?;
        pb.finish();
    }

    let dst = pass.into_output()?;

    let output_format = args.format.unwrap_or(input_format);
    let options = EncodeOptions {
        jpeg_quality: args.quality,
    };
    write_image(&args.output, &dst, output_format, &options)?;

    log::info!(
        "wrote {} image to {} in {:?}",
        output_format,
        args.output.display(),
        start.elapsed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        Args::from_args(&["convmask"], args)
    }

    #[test]
    fn positionals_required() {
        assert!(parse(&["in.png", "out.png"]).is_err());
    }

    #[test]
    fn defaults() -> Result<(), String> {
        let args = parse(&["in.png", "out.png", "mask.txt"]).map_err(|e| e.output)?;
        assert_eq!(args.kernel, PathBuf::from("mask.txt"));
        assert_eq!(args.quality, 75);
        assert_eq!(args.format, None);
        assert_eq!(execution_strategy(&args)?, ExecutionStrategy::AutoRows);
        Ok(())
    }

    #[test]
    fn options() -> Result<(), String> {
        let args = parse(&[
            "in.png", "out.jpg", "mask.txt", "--threads", "4", "--format", "jpeg", "-q", "90",
        ])
        .map_err(|e| e.output)?;
        assert_eq!(args.format, Some(ImageFormat::Jpeg));
        assert_eq!(args.quality, 90);
        assert_eq!(execution_strategy(&args)?, ExecutionStrategy::Fixed(4));
        Ok(())
    }

    #[test]
    fn serial_conflicts_with_threads() -> Result<(), String> {
        let args = parse(&["a", "b", "c", "--serial", "--threads", "2"]).map_err(|e| e.output)?;
        assert!(execution_strategy(&args).is_err());
        Ok(())
    }

    #[test]
    fn quality_out_of_range() {
        assert!(parse(&["a", "b", "c", "--quality", "0"]).is_err());
        assert!(parse(&["a", "b", "c", "--quality", "101"]).is_err());
    }
}
