//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	num::ParseFloatError,
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};
use tincture::PaletteConfig;

/// Supported output formats for the final colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
	/// JSON array of {"color", "percentage"} objects
	Json,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Print the dominant colors of an image.
///
/// Pixels are sampled, clustered with k-means in sRGB, and then any color too similar
/// to a more frequent one is dropped. Colors are printed by descending frequency.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// Print the percentage of the image covered by each color
	#[arg(short, long)]
	pub percentages: bool,

	/// Reverse the printed order of the colors
	#[arg(short, long)]
	pub reverse: bool,

	/// The (maximum) number of colors to find
	#[arg(short, default_value_t = 6)]
	pub k: u8,

	/// Only sample every nth pixel
	///
	/// Higher values are faster but may miss small areas of color.
	#[arg(short = 's', long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
	pub sample_stride: u32,

	/// Keep near white pixels instead of dropping them
	#[arg(long)]
	pub keep_white: bool,

	/// Keep near black pixels instead of dropping them
	#[arg(long)]
	pub keep_black: bool,

	/// Drop gray and other low saturation pixels
	#[arg(short = 'g', long)]
	pub ignore_gray: bool,

	/// The minimum distance between any two printed colors
	///
	/// This is the Euclidean distance between sRGB colors with components in [0, 255].
	/// Raise it to get fewer, more distinct colors.
	#[arg(short = 'd', long, default_value_t = 30.0, value_parser = parse_valid_distance)]
	pub min_distance: f64,

	/// The threshold used to determine k-means convergence
	///
	/// k-means stops once no color moves by at least this much (in sRGB units) in an iteration.
	#[arg(short = 'e', long, default_value_t = 1.0, value_parser = parse_valid_distance)]
	pub convergence_threshold: f64,

	/// The maximum number of k-means iterations
	///
	/// You can use the --verbose option to see how many iterations k-means took.
	#[arg(short = 'i', long, default_value_t = 20)]
	pub max_iter: u32,

	/// The maximum width or height, in pixels, before a thumbnail is created
	///
	/// Large images are scaled down to fit within a square of this size before sampling.
	/// Use 0 to always sample the full image.
	#[arg(short = 'm', long, default_value_t = 200)]
	pub max_size: u32,

	/// The seed value used for the random number generator
	///
	/// If not given, a different seed is used on every run.
	#[arg(long)]
	pub seed: Option<u64>,

	/// The number of threads to use
	///
	/// A value of 0 indicates to automatically choose the number of threads.
	#[cfg(feature = "threads")]
	#[arg(short, long, default_value_t = 0)]
	pub threads: u8,

	/// Print additional information, such as the number of k-means iterations
	#[arg(long)]
	pub verbose: bool,
}

impl Options {
	/// The palette extraction options
	pub fn palette_config(&self) -> PaletteConfig {
		PaletteConfig {
			color_count: self.k,
			sample_stride: self.sample_stride,
			ignore_white: !self.keep_white,
			ignore_black: !self.keep_black,
			ignore_gray: self.ignore_gray,
			min_color_distance: self.min_distance,
			max_iterations: self.max_iter,
			convergence_threshold: self.convergence_threshold,
			seed: self.seed,
		}
	}
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse a distance and ensure it is >= `0.0`
fn parse_valid_distance(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..)
}
