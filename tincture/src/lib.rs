//! Extract a small, ranked palette of dominant colors from an image.
//!
//! Pixels are sampled with a stride, translucent and (optionally) neutral samples are dropped,
//! and the remaining samples are clustered with weighted k-means in sRGB using k-means++ seeding.
//! The clusters are then ranked by size and any cluster too close to a larger one is discarded,
//! so that no two palette colors are perceptually redundant.
//!
//! # Examples
//!
//! ## Read an image file and get up to 6 dominant colors.
//!
//! ```no_run
//! use tincture::{Pixels, PaletteConfig};
//!
//! let image = image::open("some image").unwrap().into_rgba8();
//! let pixels = Pixels::from_image(&image).unwrap();
//! let palette = tincture::extract_palette(pixels, &PaletteConfig::default()).unwrap();
//!
//! for entry in palette {
//!     println!("{} {}%", entry.hex(), entry.percentage_label());
//! }
//! ```
//!
//! ## Sample once, then cluster with different parameters.
//!
//! ```no_run
//! use tincture::{Cancellation, EuclideanDistance, Pixels, PaletteConfig, SampleCounts};
//!
//! let image = image::open("some image").unwrap().into_rgba8();
//! let pixels = Pixels::from_image(&image).unwrap();
//! let config = PaletteConfig::default().with_seed(42);
//! let samples = SampleCounts::from_pixels(pixels, &config).unwrap();
//!
//! let never = Cancellation::never();
//! let few = tincture::palette_from_counts::<EuclideanDistance>(&samples, &config.clone().with_color_count(3), &never);
//! let many = tincture::palette_from_counts::<EuclideanDistance>(&samples, &config.with_color_count(8), &never);
//! ```
//!
//! # Options
//!
//! See [`PaletteConfig`] for every option and its default.
//!
//! ## Color Count
//!
//! This is the maximum number of colors in the palette.
//! k-means is run with twice as many clusters (at most 12) so that
//! deduplication has spare candidates, but the palette can still come out shorter
//! if the image does not have enough distinct colors.
//!
//! ## Minimum Color Distance
//!
//! Two palette colors are always at least this far apart (Euclidean distance in sRGB, `0..=255` per component).
//! A larger value gives fewer, more distinct colors.
//! A value larger than any possible distance (about 441.7) leaves only the most frequent color.
//!
//! ## Convergence Threshold and Max Iterations
//!
//! k-means stops once no centroid moves by at least the convergence threshold,
//! or after the maximum number of iterations, whichever comes first.
//! At least one iteration is always run. Not converging is not an error,
//! the centroids from the last iteration are used.
//!
//! ## Seed
//!
//! The initial centroids are chosen randomly.
//! Provide a seed to get the same palette for the same image every time.
//! Without a seed, a fresh one is taken from the operating system on every call.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::unreadable_literal)]

pub mod color;
mod config;
pub mod dedup;
mod entry;
mod error;
pub mod kmeans;
mod sample;

pub use color::{parse_hex, Color, ColorDifference, EuclideanDistance};
pub use config::{Cancellation, PaletteConfig, MAX_CLUSTERS};
pub use entry::{PaletteEntry, Swatch};
pub use error::PaletteError;
pub use kmeans::KmeansResult;
pub use sample::{samples, Pixels, SampleCounts};

use rand::{rngs::OsRng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

/// Extracts the dominant colors of `pixels` using Euclidean sRGB distance.
///
/// Returns an empty palette if no pixels survive sampling and filtering.
///
/// # Errors
/// Returns [`PaletteError::InvalidInput`] if `config` is invalid,
/// or [`PaletteError::RandomnessUnavailable`] if no seed was given and the OS could not provide one.
pub fn extract_palette(pixels: Pixels, config: &PaletteConfig) -> Result<Vec<PaletteEntry>, PaletteError> {
	extract_palette_with::<EuclideanDistance>(pixels, config, &Cancellation::never())
}

/// Extracts the dominant colors of `pixels` with the given color difference and cancellation.
///
/// # Errors
/// Returns [`PaletteError::InvalidInput`] if `config` is invalid,
/// [`PaletteError::RandomnessUnavailable`] if no seed was given and the OS could not provide one,
/// or [`PaletteError::Cancelled`] if `cancel` triggered.
pub fn extract_palette_with<D: ColorDifference>(
	pixels: Pixels,
	config: &PaletteConfig,
	cancel: &Cancellation,
) -> Result<Vec<PaletteEntry>, PaletteError> {
	let counts = SampleCounts::from_pixels(pixels, config)?;
	palette_from_counts::<D>(&counts, config, cancel)
}

/// Runs clustering and deduplication on samples from [`SampleCounts::from_pixels`] or [`SampleCounts::from_colors`].
///
/// Sampling is the cheap part, but this lets the same samples be clustered with different options.
/// The sampling options in `config` are ignored.
///
/// # Errors
/// Returns [`PaletteError::InvalidInput`] if `config` is invalid,
/// [`PaletteError::RandomnessUnavailable`] if no seed was given and the OS could not provide one,
/// or [`PaletteError::Cancelled`] if `cancel` triggered.
pub fn palette_from_counts<D: ColorDifference>(
	counts: &SampleCounts,
	config: &PaletteConfig,
	cancel: &Cancellation,
) -> Result<Vec<PaletteEntry>, PaletteError> {
	config.validate()?;

	if counts.is_empty() || config.color_count == 0 {
		debug!("no samples to cluster");
		return Ok(Vec::new());
	}

	let mut rng = match config.seed {
		Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
		None => Xoshiro256PlusPlus::from_rng(OsRng).map_err(PaletteError::RandomnessUnavailable)?,
	};

	let result = kmeans::run::<D>(
		counts,
		config.oversampled_k(),
		config.convergence_threshold,
		config.max_iterations,
		&mut rng,
		cancel,
	)?;

	Ok(dedup::select::<D>(&result, config.color_count, config.min_color_distance))
}
