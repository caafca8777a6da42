//! Color types, color difference, and the neutral color classifiers used for filtering

use crate::PaletteError;
use palette::Srgb;

/// An 8-bit sRGB color
pub type Color = Srgb<u8>;

/// Color difference/distance between two colors
///
/// Both colors have components on the `0.0..=255.0` scale,
/// so the unrounded centroids produced during clustering can be compared directly against samples.
pub trait ColorDifference {
	/// Squared color difference
	fn squared_distance(x: Srgb<f64>, y: Srgb<f64>) -> f64;

	/// Color difference
	fn distance(x: Srgb<f64>, y: Srgb<f64>) -> f64 {
		Self::squared_distance(x, y).sqrt()
	}
}

/// Regular Euclidean distance in sRGB
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl ColorDifference for EuclideanDistance {
	fn squared_distance(x: Srgb<f64>, y: Srgb<f64>) -> f64 {
		let dr = x.red - y.red;
		let dg = x.green - y.green;
		let db = x.blue - y.blue;
		dr * dr + dg * dg + db * db
	}
}

/// Widen a [`Color`] to floating point components while keeping the `0..=255` scale
#[must_use]
pub fn widen(color: Color) -> Srgb<f64> {
	Srgb::new(f64::from(color.red), f64::from(color.green), f64::from(color.blue))
}

/// Round a floating point color on the `0.0..=255.0` scale to the nearest [`Color`]
#[must_use]
pub fn round(color: Srgb<f64>) -> Color {
	/// Round and clamp a single component
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn component(value: f64) -> u8 {
		value.round().clamp(0.0, 255.0) as u8
	}

	Srgb::new(component(color.red), component(color.green), component(color.blue))
}

/// Format a color as an uppercase `#RRGGBB` hex code
#[must_use]
pub fn to_hex(color: Color) -> String {
	format!("#{color:X}")
}

/// Parse a hex code like `#1A2B3C` or `1a2b3c` into a [`Color`]
///
/// # Errors
/// Returns [`PaletteError::InvalidInput`] if `hex` is not a valid hex code.
pub fn parse_hex(hex: &str) -> Result<Color, PaletteError> {
	hex.trim()
		.parse::<Color>()
		.map_err(|e| PaletteError::invalid_input(format!("`{hex}` is not a hex color: {e}")))
}

/// The maximum spread between the largest and smallest component for a color to count as gray
pub const GRAY_SPREAD: u8 = 20;

/// Neutrality threshold used when both white and black are ignored
pub const NEUTRAL_THRESHOLD_BOTH: u8 = 30;

/// Neutrality threshold used when only one of white or black is ignored
pub const NEUTRAL_THRESHOLD_SINGLE: u8 = 15;

/// Whether every component of `color` is strictly within `threshold` of 255
#[must_use]
pub fn is_near_white(color: Color, threshold: u8) -> bool {
	let min = u8::MAX.saturating_sub(threshold);
	color.red > min && color.green > min && color.blue > min
}

/// Whether every component of `color` is strictly within `threshold` of 0
#[must_use]
pub fn is_near_black(color: Color, threshold: u8) -> bool {
	color.red < threshold && color.green < threshold && color.blue < threshold
}

/// Whether `color` has too little chroma to be considered anything but gray
#[must_use]
pub fn is_gray(color: Color) -> bool {
	let max = color.red.max(color.green).max(color.blue);
	let min = color.red.min(color.green).min(color.blue);
	max - min < GRAY_SPREAD
}

/// Classifies colors that should be excluded before clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeutralFilter {
	/// Exclude near white colors
	white: bool,
	/// Exclude near black colors
	black: bool,
	/// Exclude low chroma colors
	gray: bool,
	/// Neutrality threshold for white and black
	threshold: u8,
}

impl NeutralFilter {
	/// Create a filter from the ignore flags.
	///
	/// The white/black threshold is wider when both are ignored than when only one is.
	#[must_use]
	pub const fn new(white: bool, black: bool, gray: bool) -> Self {
		let threshold = if white && black {
			NEUTRAL_THRESHOLD_BOTH
		} else {
			NEUTRAL_THRESHOLD_SINGLE
		};

		Self { white, black, gray, threshold }
	}

	/// The threshold applied to white and black
	#[must_use]
	pub const fn threshold(&self) -> u8 {
		self.threshold
	}

	/// Whether `color` survives this filter
	#[must_use]
	pub fn allows(&self, color: Color) -> bool {
		!((self.white && is_near_white(color, self.threshold))
			|| (self.black && is_near_black(color, self.threshold))
			|| (self.gray && is_gray(color)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	#[test]
	fn euclidean_distance_between_primaries() {
		let red = widen(Srgb::new(255, 0, 0));
		let blue = widen(Srgb::new(0, 0, 255));
		assert_relative_eq!(EuclideanDistance::squared_distance(red, blue), 2.0 * 255.0 * 255.0);
		assert_relative_eq!(EuclideanDistance::distance(red, blue), 255.0 * std::f64::consts::SQRT_2);
		assert_relative_eq!(EuclideanDistance::distance(red, red), 0.0);
	}

	#[test]
	fn round_clamps_and_rounds() {
		assert_eq!(round(Srgb::new(127.5, -3.0, 300.0)), Srgb::new(128, 0, 255));
		assert_eq!(round(Srgb::new(0.49, 10.5, 254.4)), Srgb::new(0, 11, 254));
	}

	#[test]
	fn hex_is_uppercase_and_padded() {
		assert_eq!(to_hex(Srgb::new(255, 0, 0)), "#FF0000");
		assert_eq!(to_hex(Srgb::new(10, 11, 171)), "#0A0BAB");
	}

	#[test]
	fn parse_hex_accepts_optional_hash_and_any_case() {
		assert_eq!(parse_hex("#ff0000").ok(), Some(Srgb::new(255, 0, 0)));
		assert_eq!(parse_hex("0A0BAB").ok(), Some(Srgb::new(10, 11, 171)));
		assert!(matches!(parse_hex("#zzzzzz"), Err(PaletteError::InvalidInput(_))));
	}

	#[test]
	fn near_white_and_black_are_strict() {
		assert!(is_near_white(Srgb::new(226, 240, 255), 30));
		assert!(!is_near_white(Srgb::new(225, 240, 255), 30));
		assert!(is_near_black(Srgb::new(29, 0, 14), 30));
		assert!(!is_near_black(Srgb::new(30, 0, 14), 30));
	}

	#[test]
	fn gray_uses_component_spread() {
		assert!(is_gray(Srgb::new(100, 110, 119)));
		assert!(!is_gray(Srgb::new(100, 110, 120)));
	}

	#[test]
	fn threshold_depends_on_which_flags_are_set() {
		assert_eq!(NeutralFilter::new(true, true, false).threshold(), 30);
		assert_eq!(NeutralFilter::new(true, false, false).threshold(), 15);
		assert_eq!(NeutralFilter::new(false, true, false).threshold(), 15);
	}

	#[test]
	fn filter_only_applies_enabled_classes() {
		let white_only = NeutralFilter::new(true, false, false);
		assert!(!white_only.allows(Srgb::new(250, 250, 250)));
		assert!(white_only.allows(Srgb::new(235, 235, 235)));
		assert!(white_only.allows(Srgb::new(0, 0, 0)));

		let both = NeutralFilter::new(true, true, false);
		assert!(!both.allows(Srgb::new(235, 235, 235)));
		assert!(!both.allows(Srgb::new(5, 5, 5)));
		assert!(both.allows(Srgb::new(128, 128, 128)));

		let gray = NeutralFilter::new(false, false, true);
		assert!(!gray.allows(Srgb::new(128, 128, 128)));
		assert!(gray.allows(Srgb::new(255, 0, 0)));
	}
}
