//! The ranked colors returned by palette extraction

use crate::color::{to_hex, Color};
use std::fmt::{self, Display};

/// A palette color and how much of the image it covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
	/// The color
	pub color: Color,
	/// The number of samples assigned to this color
	pub count: u32,
	/// `count` as a percentage of all samples
	pub percentage: f64,
}

impl PaletteEntry {
	/// Create an entry for `count` out of `total` samples
	#[must_use]
	pub fn new(color: Color, count: u32, total: u32) -> Self {
		let percentage = if total == 0 {
			0.0
		} else {
			f64::from(count) * 100.0 / f64::from(total)
		};

		Self { color, count, percentage }
	}

	/// The color as an uppercase `#RRGGBB` hex code
	#[must_use]
	pub fn hex(&self) -> String {
		to_hex(self.color)
	}

	/// The percentage rounded half up to one decimal place, e.g. `"42.5"`
	#[must_use]
	pub fn percentage_label(&self) -> String {
		// `{:.1}` alone rounds exact ties to even
		format!("{:.1}", (self.percentage * 10.0).round() / 10.0)
	}

	/// Convert to the display form handed to callers
	#[must_use]
	pub fn to_swatch(&self) -> Swatch {
		Swatch {
			color: self.hex(),
			percentage: self.percentage_label(),
		}
	}
}

impl Display for PaletteEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}%", self.hex(), self.percentage_label())
	}
}

/// A palette color formatted for presentation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swatch {
	/// Uppercase `#RRGGBB` hex code
	pub color: String,
	/// Percentage with one fractional digit
	pub percentage: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use palette::Srgb;

	#[test]
	fn percentage_is_share_of_total() {
		let entry = PaletteEntry::new(Srgb::new(255, 0, 0), 1, 3);
		assert_relative_eq!(entry.percentage, 100.0 / 3.0);
		assert_eq!(entry.percentage_label(), "33.3");
	}

	#[test]
	fn percentage_label_rounds_half_up() {
		let label = |count, total| PaletteEntry::new(Srgb::new(0, 0, 0), count, total).percentage_label();
		assert_eq!(label(1, 400), "0.3");
		assert_eq!(label(100, 8000), "1.3");
		assert_eq!(label(121, 400), "30.3");
		assert_eq!(label(1, 800), "0.1");
	}

	#[test]
	fn zero_total_gives_zero_percent() {
		let entry = PaletteEntry::new(Srgb::new(0, 0, 0), 0, 0);
		assert_eq!(entry.percentage_label(), "0.0");
	}

	#[test]
	fn swatch_formats_hex_and_percentage() {
		let entry = PaletteEntry::new(Srgb::new(255, 0, 0), 50, 50);
		assert_eq!(
			entry.to_swatch(),
			Swatch {
				color: "#FF0000".to_owned(),
				percentage: "100.0".to_owned(),
			}
		);
		assert_eq!(entry.to_string(), "#FF0000 100.0%");
	}
}
