//! Pixel sampling, filtering, and grouping of identical samples

use crate::{
	color::{Color, NeutralFilter},
	PaletteConfig, PaletteError,
};
use palette::Srgb;
use std::collections::HashMap;
use tracing::debug;

/// Pixels with an alpha below this are treated as absent
pub const MIN_ALPHA: u8 = 128;

/// A validated, row-major RGBA8 pixel buffer
#[derive(Debug, Clone, Copy)]
pub struct Pixels<'a> {
	/// Width in pixels
	width: u32,
	/// Height in pixels
	height: u32,
	/// RGBA bytes, 4 per pixel
	data: &'a [u8],
}

impl<'a> Pixels<'a> {
	/// Wrap an RGBA8 buffer with the given dimensions.
	///
	/// # Errors
	/// Returns [`PaletteError::InvalidInput`] if `data` does not hold exactly `width * height` RGBA pixels,
	/// or if the image has more than `u32::MAX` pixels.
	pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, PaletteError> {
		let pixels = u64::from(width) * u64::from(height);
		if pixels > u64::from(u32::MAX) {
			return Err(PaletteError::invalid_input(format!(
				"a {width}x{height} image has more than {} pixels",
				u32::MAX
			)));
		}

		let expected = usize::try_from(pixels)
			.ok()
			.and_then(|pixels| pixels.checked_mul(4))
			.ok_or_else(|| PaletteError::invalid_input(format!("a {width}x{height} image does not fit in memory")))?;

		if data.len() == expected {
			Ok(Self { width, height, data })
		} else {
			Err(PaletteError::invalid_input(format!(
				"expected {expected} bytes for a {width}x{height} RGBA image but got {}",
				data.len()
			)))
		}
	}

	/// Borrow the pixels of a decoded image
	///
	/// # Errors
	/// Returns [`PaletteError::InvalidInput`] if the image has more than `u32::MAX` pixels.
	pub fn from_image(image: &'a image::RgbaImage) -> Result<Self, PaletteError> {
		Self::new(image.width(), image.height(), image.as_raw())
	}

	/// Width in pixels
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// Height in pixels
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The number of pixels
	#[must_use]
	pub fn len(&self) -> usize {
		self.data.len() / 4
	}

	/// Whether there are no pixels
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// The color of the pixel at `(x, y)`, ignoring alpha, or `None` if out of bounds
	#[must_use]
	pub fn color_at(&self, x: u32, y: u32) -> Option<Color> {
		if x >= self.width || y >= self.height {
			return None;
		}

		let index = (y as usize * self.width as usize + x as usize) * 4;
		self.data
			.get(index..index + 3)
			.map(|rgb| Srgb::new(rgb[0], rgb[1], rgb[2]))
	}
}

/// Lazily sample every `stride`th pixel in row-major order starting at the first,
/// dropping translucent pixels and pixels rejected by `filter`.
///
/// `stride` must be at least 1.
pub(crate) fn sample<'a>(pixels: Pixels<'a>, stride: u32, filter: NeutralFilter) -> impl Iterator<Item = Color> + 'a {
	debug_assert!(stride > 0);
	pixels
		.data
		.chunks_exact(4)
		.step_by(stride.max(1) as usize)
		.filter(|rgba| rgba[3] >= MIN_ALPHA)
		.map(|rgba| Srgb::new(rgba[0], rgba[1], rgba[2]))
		.filter(move |&color| filter.allows(color))
}

/// Lazily produce the samples of `pixels` selected by the stride and filters in `config`.
///
/// # Errors
/// Returns [`PaletteError::InvalidInput`] if `config` is invalid.
pub fn samples<'a>(
	pixels: Pixels<'a>,
	config: &PaletteConfig,
) -> Result<impl Iterator<Item = Color> + 'a, PaletteError> {
	config.validate()?;
	Ok(sample(pixels, config.sample_stride, config.neutral_filter()))
}

/// Samples grouped into unique colors and their number of occurrences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleCounts {
	/// Unique colors in order of first occurrence
	colors: Vec<Color>,
	/// The number of samples for each color
	counts: Vec<u32>,
	/// The total number of samples
	total: u32,
}

impl SampleCounts {
	/// Group the samples of `pixels` selected by `config`.
	///
	/// # Errors
	/// Returns [`PaletteError::InvalidInput`] if `config` is invalid.
	pub fn from_pixels(pixels: Pixels, config: &PaletteConfig) -> Result<Self, PaletteError> {
		let counts = Self::from_colors(samples(pixels, config)?)?;

		debug!(
			pixels = pixels.len(),
			samples = counts.num_samples(),
			unique = counts.num_colors(),
			stride = config.sample_stride,
			"sampled image"
		);

		Ok(counts)
	}

	/// Group already filtered samples.
	///
	/// # Errors
	/// Returns [`PaletteError::InvalidInput`] if there are more than `u32::MAX` samples.
	pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Result<Self, PaletteError> {
		let mut data = Self::default();

		// Packed sRGB -> data index
		let mut memo: HashMap<u32, u32> = HashMap::new();

		for color in colors {
			data.total = data
				.total
				.checked_add(1)
				.ok_or_else(|| PaletteError::invalid_input(format!("more than {} samples", u32::MAX)))?;

			let key = color.into_u32::<palette::rgb::channels::Rgba>();
			let index = *memo.entry(key).or_insert_with(|| {
				// there are only (2^8)^3 < u32::MAX possible sRGB colors
				#[allow(clippy::cast_possible_truncation)]
				let index = data.colors.len() as u32;

				data.colors.push(color);
				data.counts.push(0);
				index
			});

			data.counts[index as usize] += 1;
		}

		Ok(data)
	}

	/// The unique colors
	#[must_use]
	pub fn colors(&self) -> &[Color] {
		&self.colors
	}

	/// The number of samples for each unique color
	#[must_use]
	pub fn counts(&self) -> &[u32] {
		&self.counts
	}

	/// Iterate over each unique color and its number of samples
	pub fn pairs(&self) -> impl Iterator<Item = (Color, u32)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}

	/// The number of unique colors
	#[must_use]
	#[allow(clippy::cast_possible_truncation)]
	pub fn num_colors(&self) -> u32 {
		self.colors.len() as u32
	}

	/// The total number of samples
	#[must_use]
	pub const fn num_samples(&self) -> u32 {
		self.total
	}

	/// Whether there are no samples
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.total == 0
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;

	fn rgba(colors: &[[u8; 4]]) -> Vec<u8> {
		colors.iter().flatten().copied().collect()
	}

	#[test]
	fn rejects_mismatched_buffer_length() {
		let data = vec![0; 4 * 10 * 10 - 1];
		assert!(matches!(Pixels::new(10, 10, &data), Err(PaletteError::InvalidInput(_))));
		assert!(Pixels::new(10, 10, &[0; 400]).is_ok());
		assert!(Pixels::new(0, 0, &[]).is_ok_and(|pixels| pixels.is_empty()));
	}

	#[test]
	fn color_at_indexes_row_major() {
		let data = rgba(&[[1, 2, 3, 255], [4, 5, 6, 255], [7, 8, 9, 0], [10, 11, 12, 255]]);
		let pixels = Pixels::new(2, 2, &data).unwrap();
		assert_eq!(pixels.color_at(1, 0), Some(Srgb::new(4, 5, 6)));
		assert_eq!(pixels.color_at(0, 1), Some(Srgb::new(7, 8, 9)));
		assert_eq!(pixels.color_at(2, 0), None);
		assert_eq!(pixels.color_at(0, 2), None);
	}

	#[test]
	fn stride_starts_at_first_pixel() {
		let data = rgba(&[
			[10, 0, 0, 255],
			[20, 0, 0, 255],
			[30, 0, 0, 255],
			[40, 0, 0, 255],
			[50, 0, 0, 255],
		]);
		let pixels = Pixels::new(5, 1, &data).unwrap();
		let none = NeutralFilter::new(false, false, false);

		let reds = sample(pixels, 2, none).map(|c| c.red).collect::<Vec<_>>();
		assert_eq!(reds, [10, 30, 50]);

		let reds = sample(pixels, 1, none).map(|c| c.red).collect::<Vec<_>>();
		assert_eq!(reds, [10, 20, 30, 40, 50]);
	}

	#[test]
	fn translucent_pixels_are_absent() {
		let data = rgba(&[[200, 10, 10, 127], [200, 10, 10, 128], [0, 0, 0, 0]]);
		let pixels = Pixels::new(3, 1, &data).unwrap();
		let samples = sample(pixels, 1, NeutralFilter::new(false, false, false)).collect::<Vec<_>>();
		assert_eq!(samples, [Srgb::new(200, 10, 10)]);
	}

	#[test]
	fn filtering_is_repeatable() {
		let data = (0..64u8)
			.flat_map(|i| [i.wrapping_mul(37), i.wrapping_mul(11), i.wrapping_mul(5), 255])
			.collect::<Vec<_>>();
		let pixels = Pixels::new(8, 8, &data).unwrap();
		let config = PaletteConfig::default().with_sample_stride(3).with_ignore_gray(true);

		let first = samples(pixels, &config).unwrap().collect::<Vec<_>>();
		let second = samples(pixels, &config).unwrap().collect::<Vec<_>>();
		assert_eq!(first, second);
	}

	#[test]
	fn samples_rejects_invalid_config() {
		let pixels = Pixels::new(0, 0, &[]).unwrap();
		let config = PaletteConfig::default().with_sample_stride(0);
		assert!(samples(pixels, &config).is_err());
	}

	#[test]
	fn counts_group_identical_samples() {
		let red = Srgb::new(255, 0, 0);
		let blue = Srgb::new(0, 0, 255);
		let counts = SampleCounts::from_colors([red, blue, red, red]).unwrap();

		assert_eq!(counts.colors(), [red, blue]);
		assert_eq!(counts.counts(), [3, 1]);
		assert_eq!(counts.num_colors(), 2);
		assert_eq!(counts.num_samples(), 4);
		assert_eq!(counts.counts().iter().sum::<u32>(), counts.num_samples());
	}

	#[test]
	fn counts_from_fully_filtered_image_are_empty() {
		let data = rgba(&[[255, 255, 255, 255]; 100]);
		let pixels = Pixels::new(10, 10, &data).unwrap();
		let counts = SampleCounts::from_pixels(pixels, &PaletteConfig::default()).unwrap();
		assert!(counts.is_empty());
	}
}
