//! Options controlling palette extraction

use crate::{color::NeutralFilter, PaletteError};
use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::Instant,
};

/// The maximum number of clusters k-means is run with
pub const MAX_CLUSTERS: u8 = 12;

/// Configuration for palette extraction.
///
/// Every field has a default and can be overridden independently.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteConfig {
	/// The (maximum) number of colors in the final palette
	pub color_count: u8,
	/// Only every `sample_stride`th pixel is sampled
	pub sample_stride: u32,
	/// Drop near white samples before clustering
	pub ignore_white: bool,
	/// Drop near black samples before clustering
	pub ignore_black: bool,
	/// Drop low chroma samples before clustering
	pub ignore_gray: bool,
	/// The minimum Euclidean sRGB distance between any two palette colors
	pub min_color_distance: f64,
	/// The maximum number of k-means iterations
	pub max_iterations: u32,
	/// k-means stops once no centroid moves by this much or more
	pub convergence_threshold: f64,
	/// Seed for choosing the initial centroids, or `None` to use a fresh seed from the OS
	pub seed: Option<u64>,
}

impl Default for PaletteConfig {
	fn default() -> Self {
		Self {
			color_count: 6,
			sample_stride: 5,
			ignore_white: true,
			ignore_black: true,
			ignore_gray: false,
			min_color_distance: 30.0,
			max_iterations: 20,
			convergence_threshold: 1.0,
			seed: None,
		}
	}
}

impl PaletteConfig {
	/// Set the number of palette colors
	#[must_use]
	pub const fn with_color_count(mut self, color_count: u8) -> Self {
		self.color_count = color_count;
		self
	}

	/// Set the pixel sampling stride
	#[must_use]
	pub const fn with_sample_stride(mut self, sample_stride: u32) -> Self {
		self.sample_stride = sample_stride;
		self
	}

	/// Set whether near white samples are dropped
	#[must_use]
	pub const fn with_ignore_white(mut self, ignore: bool) -> Self {
		self.ignore_white = ignore;
		self
	}

	/// Set whether near black samples are dropped
	#[must_use]
	pub const fn with_ignore_black(mut self, ignore: bool) -> Self {
		self.ignore_black = ignore;
		self
	}

	/// Set whether low chroma samples are dropped
	#[must_use]
	pub const fn with_ignore_gray(mut self, ignore: bool) -> Self {
		self.ignore_gray = ignore;
		self
	}

	/// Set the minimum distance between palette colors
	#[must_use]
	pub const fn with_min_color_distance(mut self, distance: f64) -> Self {
		self.min_color_distance = distance;
		self
	}

	/// Set the k-means iteration cap
	#[must_use]
	pub const fn with_max_iterations(mut self, max_iterations: u32) -> Self {
		self.max_iterations = max_iterations;
		self
	}

	/// Set the k-means convergence threshold
	#[must_use]
	pub const fn with_convergence_threshold(mut self, threshold: f64) -> Self {
		self.convergence_threshold = threshold;
		self
	}

	/// Fix the random seed for reproducible results
	#[must_use]
	pub const fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Check that every option is usable.
	///
	/// # Errors
	/// Returns [`PaletteError::InvalidInput`] for a zero sample stride
	/// or a negative or non-finite distance or threshold.
	pub fn validate(&self) -> Result<(), PaletteError> {
		if self.sample_stride == 0 {
			return Err(PaletteError::invalid_input("sample stride must be at least 1"));
		}

		if !(self.min_color_distance.is_finite() && self.min_color_distance >= 0.0) {
			return Err(PaletteError::invalid_input(format!(
				"minimum color distance must be finite and non-negative, got {}",
				self.min_color_distance
			)));
		}

		if !(self.convergence_threshold.is_finite() && self.convergence_threshold >= 0.0) {
			return Err(PaletteError::invalid_input(format!(
				"convergence threshold must be finite and non-negative, got {}",
				self.convergence_threshold
			)));
		}

		Ok(())
	}

	/// The filter for the configured ignore flags
	#[must_use]
	pub const fn neutral_filter(&self) -> NeutralFilter {
		NeutralFilter::new(self.ignore_white, self.ignore_black, self.ignore_gray)
	}

	/// The number of clusters to run k-means with before deduplication.
	///
	/// This is twice the number of requested colors, capped at [`MAX_CLUSTERS`],
	/// so that deduplication has spare candidates to choose from.
	#[must_use]
	pub fn oversampled_k(&self) -> u8 {
		self.color_count.saturating_mul(2).min(MAX_CLUSTERS)
	}
}

/// Lets a caller stop a running extraction.
///
/// k-means checks this between iterations.
/// An empty `Cancellation` never triggers.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
	/// Set to `true` to request cancellation
	flag: Option<Arc<AtomicBool>>,
	/// Cancel once this instant has passed
	deadline: Option<Instant>,
}

impl Cancellation {
	/// A cancellation that never triggers
	#[must_use]
	pub const fn never() -> Self {
		Self { flag: None, deadline: None }
	}

	/// Cancel when `flag` is set to `true`
	#[must_use]
	pub fn with_flag(mut self, flag: Arc<AtomicBool>) -> Self {
		self.flag = Some(flag);
		self
	}

	/// Cancel once `deadline` has passed
	#[must_use]
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);
		self
	}

	/// Whether cancellation has been requested or the deadline has passed
	#[must_use]
	pub fn is_cancelled(&self) -> bool {
		self.flag.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
			|| self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
	}
}
