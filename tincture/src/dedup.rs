//! Ranking of k-means clusters and removal of redundant colors

use crate::{
	color::{round, widen, ColorDifference},
	KmeansResult, PaletteEntry,
};
use std::cmp::Reverse;
use tracing::debug;

/// Rank the clusters in `result` by descending count and greedily keep each one
/// that is at least `min_distance` away from every color kept before it.
///
/// Centroids are rounded to [`crate::Color`]s before comparing distances.
/// Clusters with no samples are never kept.
/// Stops once `color_count` colors are kept or the clusters run out,
/// so fewer than `color_count` colors may be returned.
/// Ties in count keep the order of the clusters in `result`.
#[must_use]
pub fn select<D: ColorDifference>(result: &KmeansResult, color_count: u8, min_distance: f64) -> Vec<PaletteEntry> {
	let total = result.num_samples();
	let color_count = usize::from(color_count);

	let mut candidates = result
		.centroids
		.iter()
		.zip(&result.counts)
		.filter(|&(_, &count)| count > 0)
		.map(|(&centroid, &count)| (round(centroid), count))
		.collect::<Vec<_>>();

	// stable sort, so ties stay in cluster order
	candidates.sort_by_key(|&(_, count)| Reverse(count));

	let mut kept = Vec::<PaletteEntry>::with_capacity(color_count);
	for (color, count) in candidates {
		if kept.len() >= color_count {
			break;
		}

		let distinct = kept
			.iter()
			.all(|entry| D::distance(widen(entry.color), widen(color)) >= min_distance);

		if distinct {
			kept.push(PaletteEntry::new(color, count, total));
		}
	}

	debug!(
		clusters = result.centroids.len(),
		kept = kept.len(),
		requested = color_count,
		"deduplicated palette"
	);

	kept
}
