//! Print the dominant colors of an image, found by k-means clustering in sRGB.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{path::Path, process::ExitCode, time::Instant};

use clap::Parser;
use colored::Colorize;
use image::{DynamicImage, GenericImageView};
use palette::Srgb;
use thiserror::Error;
use tincture::{PaletteEntry, PaletteError, Pixels, Swatch};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Record the running time of a function and log the elapsed time
macro_rules! time {
    ($name: literal, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        info!("{} took {}ms", $name, start.elapsed().as_millis());
        result
    }};
}

/// Error cases for generating and printing a palette
#[derive(Debug, Error)]
enum AppError {
    /// Failed to read or decode the image file
    #[error("Failed to load the image file: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// Palette extraction rejected the image or options
    #[error("Failed to extract a palette: {0}")]
    Palette(#[from] PaletteError),
    /// Failed to format the palette as JSON
    #[error("Failed to format the palette as JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to start the thread pool
    #[cfg(feature = "threads")]
    #[error("Failed to start the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn main() -> ExitCode {
    let options = Options::parse();

    init_logging(options.verbose);

    let result = run_generate_and_print_palette(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Send log output to stderr, showing debug output only if `verbose`
fn init_logging(verbose: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Builds a thread pool and then runs `generate_and_print_palette`
#[cfg(feature = "threads")]
fn run_generate_and_print_palette(options: &Options) -> Result<(), AppError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()?;

    pool.install(|| generate_and_print_palette(options))
}

/// Runs `generate_and_print_palette` on a single thread
#[cfg(not(feature = "threads"))]
fn run_generate_and_print_palette(options: &Options) -> Result<(), AppError> {
    generate_and_print_palette(options)
}

/// Load an image, generate its palette, and print the result using the given options
fn generate_and_print_palette(options: &Options) -> Result<(), AppError> {
    // Input
    let img = time!("Image loading", load_image(&options.image))?;
    let img = generate_thumbnail(img, options.max_size);
    let img = img.into_rgba8();

    // Processing
    let mut palette = time!(
        "Palette extraction",
        tincture::extract_palette(Pixels::from_image(&img)?, &options.palette_config())
    )?;

    info!("Found {} colors", palette.len());

    // Output
    if options.reverse {
        palette.reverse();
    }

    print_palette(&palette, options)
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, AppError> {
    Ok(image::open(path)?)
}

/// Scale the image down to fit within `max_size` x `max_size` if it is any larger
fn generate_thumbnail(image: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if max_size == 0 || (width <= max_size && height <= max_size) {
        info!("Skipping image thumbnail since the image is {width}x{height}");
        image
    } else {
        let thumb = time!("Image thumbnail", image.thumbnail(max_size, max_size));
        info!(
            "Created a thumbnail with dimensions {}x{}",
            thumb.width(),
            thumb.height()
        );
        thumb
    }
}

/// Print the given palette based off the provided options
fn print_palette(palette: &[PaletteEntry], options: &Options) -> Result<(), AppError> {
    match options.output {
        FormatOutput::Hex => color_format_print(palette, options, " ", |color| format!("#{color:X}")),

        FormatOutput::Rgb => color_format_print(palette, options, " ", |color| {
            format!("({},{},{})", color.red, color.green, color.blue)
        }),

        FormatOutput::Swatch => println!(
            "{}",
            format_line(palette, options.percentages, "", |color| {
                "   "
                    .on_truecolor(color.red, color.green, color.blue)
                    .to_string()
            })
        ),

        FormatOutput::Json => println!("{}", to_json(palette)?),
    }

    Ok(())
}

/// Format the palette as a JSON array of swatches
fn to_json(palette: &[PaletteEntry]) -> Result<String, serde_json::Error> {
    let swatches = palette
        .iter()
        .map(PaletteEntry::to_swatch)
        .collect::<Vec<Swatch>>();

    serde_json::to_string_pretty(&swatches)
}

/// Format a line of colors using the given format, optionally followed by their percentages
fn format_line(
    palette: &[PaletteEntry],
    percentages: bool,
    delimiter: &str,
    format: impl Fn(Srgb<u8>) -> String,
) -> String {
    palette
        .iter()
        .map(|entry| {
            let color = format(entry.color);
            if percentages {
                format!("{color} {}%", entry.percentage_label())
            } else {
                color
            }
        })
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Format, colorize, and then print the text for all colors
fn color_format_print(
    palette: &[PaletteEntry],
    options: &Options,
    delimiter: &str,
    format: impl Fn(Srgb<u8>) -> String,
) {
    let line = match options.colorize {
        Some(ColorizeOutput::Fg) => format_line(palette, options.percentages, delimiter, |color| {
            format(color)
                .truecolor(color.red, color.green, color.blue)
                .to_string()
        }),

        Some(ColorizeOutput::Bg) => format_line(palette, options.percentages, delimiter, |color| {
            format(color)
                .on_truecolor(color.red, color.green, color.blue)
                .to_string()
        }),

        None => format_line(palette, options.percentages, delimiter, format),
    };

    println!("{line}");
}
