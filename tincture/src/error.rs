//! Errors returned by palette extraction

use thiserror::Error;

/// Errors that can occur while extracting a palette.
///
/// An image that has no eligible pixels is not an error:
/// extraction returns an empty palette in that case.
#[derive(Debug, Error)]
pub enum PaletteError {
	/// The pixel buffer or configuration violates the input contract
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// The platform could not provide entropy to seed the random number generator
	#[error("failed to seed the random number generator: {0}")]
	RandomnessUnavailable(#[source] rand::Error),

	/// The caller cancelled extraction or its deadline passed
	#[error("palette extraction was cancelled after {iterations} k-means iterations")]
	Cancelled {
		/// The number of completed k-means iterations
		iterations: u32,
	},
}

impl PaletteError {
	/// Create an [`PaletteError::InvalidInput`] from any message
	pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
		Self::InvalidInput(message.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cancelled_message_reports_iterations() {
		let error = PaletteError::Cancelled { iterations: 3 };
		assert_eq!(
			error.to_string(),
			"palette extraction was cancelled after 3 k-means iterations"
		);
	}

	#[test]
	fn invalid_input_message() {
		let error = PaletteError::invalid_input("sample stride must be at least 1");
		assert_eq!(error.to_string(), "invalid input: sample stride must be at least 1");
	}
}
