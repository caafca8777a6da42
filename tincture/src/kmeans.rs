//! Weighted k-means clustering in sRGB with k-means++ seeding

use crate::{
	color::{widen, ColorDifference},
	Cancellation, PaletteError, SampleCounts,
};
use palette::Srgb;
use rand::Rng;
use tracing::{debug, trace};

/// An all zero vector sum
const ZERO: Srgb<f64> = Srgb::new(0.0, 0.0, 0.0);

/// Bookkeeping for each k-means data point
struct PointData {
	/// Center assignment for this data point
	assignment: Vec<u8>,
	/// Closest center found by the latest nearest center search
	nearest: Vec<u8>,
	/// Squared distance to the closest chosen centroid, used by k-means++
	weight: Vec<f64>,
}

impl PointData {
	/// Create a [`PointData`] with the given number of data points
	fn new(n: u32) -> Self {
		let n = n as usize;
		Self {
			assignment: vec![0; n],
			nearest: vec![0; n],
			weight: vec![f64::INFINITY; n],
		}
	}
}

/// Data for each center/centroid
struct CenterData {
	/// The centroid point
	centroid: Vec<Srgb<f64>>,
	/// Vector sum for all data points in this center
	sum: Vec<Srgb<f64>>,
	/// Number of samples in this center
	count: Vec<u32>,
}

impl CenterData {
	/// Create a [`CenterData`] with the given number of centers
	fn new(k: u8) -> Self {
		let k = usize::from(k);
		Self {
			centroid: Vec::with_capacity(k),
			sum: vec![ZERO; k],
			count: vec![0; k],
		}
	}
}

/// Holds all the state used by k-means
struct KmeansState {
	/// Data for each center
	centers: CenterData,
	/// Data for each point
	points: PointData,
}

impl KmeansState {
	/// Initialize a new [`KmeansState`] with `k` centers and `n` data points
	fn new(k: u8, n: u32) -> Self {
		Self {
			centers: CenterData::new(k),
			points: PointData::new(n),
		}
	}
}

/// Result from running k-means
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansResult {
	/// Final centroid colors on the `0.0..=255.0` scale, in seeding order
	pub centroids: Vec<Srgb<f64>>,
	/// Number of samples assigned to each centroid, possibly zero
	pub counts: Vec<u32>,
	/// Number of elapsed iterations
	pub iterations: u32,
	/// Whether the centroids settled before reaching the iteration cap
	pub converged: bool,
}

impl KmeansResult {
	/// Create an empty result, representing that k-means had nothing to cluster
	const fn empty() -> Self {
		Self {
			centroids: Vec::new(),
			counts: Vec::new(),
			iterations: 0,
			converged: true,
		}
	}

	/// The total number of clustered samples
	#[must_use]
	pub fn num_samples(&self) -> u32 {
		self.counts.iter().sum()
	}
}

/// Choose the starting centroids using the k-means++ algorithm.
///
/// Each sample is a candidate, so a unique color is picked with probability
/// proportional to its count times its squared distance to the closest chosen centroid.
fn kmeans_plus_plus<D: ColorDifference>(
	k: u8,
	rng: &mut impl Rng,
	data: &SampleCounts,
	centroids: &mut Vec<Srgb<f64>>,
	weights: &mut [f64],
) {
	use rand::{
		distributions::{WeightedError::*, WeightedIndex},
		prelude::Distribution,
	};

	let colors = data.colors();

	// Pick the first centroid uniformly over all samples
	let Ok(first) = WeightedIndex::new(data.counts()) else {
		return; // no samples
	};
	centroids.push(widen(colors[first.sample(rng)]));

	// Pick each next centroid with a weighted probability based off the squared distance to its closest centroid
	for i in 1..usize::from(k) {
		let centroid = centroids[i - 1];
		for (weight, &color) in weights.iter_mut().zip(colors) {
			*weight = f64::min(*weight, D::squared_distance(widen(color), centroid));
		}

		let probabilities = weights.iter().zip(data.counts()).map(|(&w, &n)| w * f64::from(n));

		match WeightedIndex::new(probabilities) {
			Ok(sampler) => centroids.push(widen(colors[sampler.sample(rng)])),
			Err(AllWeightsZero) => return, // all samples exactly match a centroid
			Err(InvalidWeight | NoItem | TooMany) => {
				unreachable!("distances are >= 0 and finite and there is at least one sample")
			},
		}
	}
}

/// Initializes the center sums and counts based off the initial assignments
fn compute_initial_sums(data: &SampleCounts, centers: &mut CenterData, assignment: &[u8]) {
	for ((color, n), &center) in data.pairs().zip(assignment) {
		let i = usize::from(center);
		let nf = f64::from(n);
		let sum = &mut centers.sum[i];
		sum.red += nf * f64::from(color.red);
		sum.green += nf * f64::from(color.green);
		sum.blue += nf * f64::from(color.blue);
		centers.count[i] += n;
	}
}

/// Find the index of the centroid closest to `color`, preferring the lowest index on ties
// i < centroids.len() <= u8::MAX
#[allow(clippy::cast_possible_truncation)]
fn nearest<D: ColorDifference>(color: Srgb<f64>, centroids: &[Srgb<f64>]) -> u8 {
	let mut min_dist = f64::INFINITY;
	let mut min_center = 0;
	for (i, &centroid) in centroids.iter().enumerate() {
		let dist = D::squared_distance(color, centroid);
		if dist < min_dist {
			min_dist = dist;
			min_center = i as u8;
		}
	}
	min_center
}

/// For each data point, find its closest center on the current thread
#[cfg_attr(all(feature = "threads", not(test)), allow(dead_code))]
fn find_nearest_serial<D: ColorDifference>(data: &SampleCounts, centroids: &[Srgb<f64>], nearest_center: &mut [u8]) {
	for (center, &color) in nearest_center.iter_mut().zip(data.colors()) {
		*center = nearest::<D>(widen(color), centroids);
	}
}

/// For each data point, find its closest center
#[cfg(not(feature = "threads"))]
fn find_nearest<D: ColorDifference>(data: &SampleCounts, centroids: &[Srgb<f64>], nearest_center: &mut [u8]) {
	find_nearest_serial::<D>(data, centroids, nearest_center);
}

/// For each data point, find its closest center
#[cfg(feature = "threads")]
fn find_nearest<D: ColorDifference>(data: &SampleCounts, centroids: &[Srgb<f64>], nearest_center: &mut [u8]) {
	use rayon::prelude::*;

	let num_points = data.colors().len();
	nearest_center
		.par_iter_mut()
		.with_min_len((num_points / rayon::current_num_threads()).max(1))
		.zip(data.colors())
		.for_each(|(center, &color)| *center = nearest::<D>(widen(color), centroids));
}

/// For each data point, update its assigned center.
///
/// Sums are moved sequentially so that the results do not depend on the number of threads.
fn update_assignments<D: ColorDifference>(data: &SampleCounts, centers: &mut CenterData, points: &mut PointData) {
	find_nearest::<D>(data, &centers.centroid, &mut points.nearest);

	for (((color, n), center), &min_center) in data.pairs().zip(&mut points.assignment).zip(&points.nearest) {
		// Move this point to its new center
		if min_center != *center {
			let nf = f64::from(n);
			let r = nf * f64::from(color.red);
			let g = nf * f64::from(color.green);
			let b = nf * f64::from(color.blue);

			let ci = usize::from(*center);

			let old_sum = &mut centers.sum[ci];
			old_sum.red -= r;
			old_sum.green -= g;
			old_sum.blue -= b;
			centers.count[ci] -= n;

			let cj = usize::from(min_center);

			let new_sum = &mut centers.sum[cj];
			new_sum.red += r;
			new_sum.green += g;
			new_sum.blue += b;
			centers.count[cj] += n;

			*center = min_center;
		}
	}
}

/// For each center, update its centroid using the vector sums and return the largest displacement.
///
/// A center without any points keeps its previous centroid.
fn update_centroids<D: ColorDifference>(centers: &mut CenterData) -> f64 {
	let mut max_delta = 0.0;
	for ((centroid, &n), sum) in centers.centroid.iter_mut().zip(&centers.count).zip(&centers.sum) {
		if n == 0 {
			continue;
		}

		let n = f64::from(n);
		let new_centroid = Srgb::new(sum.red / n, sum.green / n, sum.blue / n);

		max_delta = f64::max(max_delta, D::distance(*centroid, new_centroid));
		*centroid = new_centroid;
	}

	max_delta
}

/// Run k-means to completion on already seeded centers
fn kmeans<D: ColorDifference>(
	data: &SampleCounts,
	KmeansState { centers, points }: &mut KmeansState,
	max_iter: u32,
	convergence: f64,
	cancel: &Cancellation,
) -> Result<KmeansResult, PaletteError> {
	compute_initial_sums(data, centers, &points.assignment);

	// At least one pass is always made
	let max_iter = max_iter.max(1);

	let mut iterations = 0;
	let mut max_delta = f64::INFINITY;
	// A zero delta is a fixed point, so further passes cannot change anything
	while iterations < max_iter && max_delta >= convergence && max_delta > 0.0 {
		if cancel.is_cancelled() {
			debug!(iterations, "k-means cancelled");
			return Err(PaletteError::Cancelled { iterations });
		}

		update_assignments::<D>(data, centers, points);
		max_delta = update_centroids::<D>(centers);
		iterations += 1;

		trace!(iteration = iterations, max_delta, "k-means iteration");
	}

	let converged = max_delta < convergence || max_delta == 0.0;
	if converged {
		debug!(iterations, max_delta, "k-means converged");
	} else {
		debug!(iterations, max_delta, "k-means stopped at the iteration cap");
	}

	// Reassign against the final centroids so that the counts describe the returned colors
	update_assignments::<D>(data, centers, points);

	Ok(KmeansResult {
		centroids: centers.centroid.clone(),
		counts: centers.count.clone(),
		iterations,
		converged,
	})
}

/// Run weighted k-means on the unique colors in `data`.
///
/// `k` is clamped to the number of unique colors.
/// An empty result is returned if `data` is empty or `k` = 0.
///
/// # Errors
/// Returns [`PaletteError::Cancelled`] if `cancel` triggers between iterations.
pub fn run<D: ColorDifference>(
	data: &SampleCounts,
	k: u8,
	convergence_threshold: f64,
	max_iter: u32,
	rng: &mut impl Rng,
	cancel: &Cancellation,
) -> Result<KmeansResult, PaletteError> {
	// num_colors < 2^24, and the min is <= k
	#[allow(clippy::cast_possible_truncation)]
	let k = u32::from(k).min(data.num_colors()) as u8;

	if k == 0 || data.is_empty() {
		return Ok(KmeansResult::empty());
	}

	let mut state = KmeansState::new(k, data.num_colors());
	kmeans_plus_plus::<D>(k, rng, data, &mut state.centers.centroid, &mut state.points.weight);

	let seeded = state.centers.centroid.len();
	state.centers.sum.truncate(seeded);
	state.centers.count.truncate(seeded);

	debug!(
		k,
		seeded,
		unique = data.num_colors(),
		"chose initial centroids"
	);

	kmeans::<D>(data, &mut state, max_iter, convergence_threshold, cancel)
}
