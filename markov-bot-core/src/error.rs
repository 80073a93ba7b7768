use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the bot core.
///
/// Model errors (`Decode`, `Encode`, `GenerationExhausted`) come from the chain
/// itself. Every other variant wraps a collaborator failure together with the
/// step that was running when it happened.
#[derive(Error, Debug)]
pub enum Error {
	/// The stored bytes are not a valid chain.
	///
	/// `source` is set when the bytes are not valid `postcard` data, and empty
	/// when they decode to a shape no chain can have.
	#[error("decode chain: {context}")]
	Decode {
		context: String,
		#[source]
		source: Option<postcard::Error>,
	},

	/// The chain could not be encoded.
	#[error("encode chain: {0}")]
	Encode(#[source] postcard::Error),

	/// Every generation attempt produced fewer words than required.
	#[error("failed to generate a post: {attempts} attempts without {min_words} words")]
	GenerationExhausted { attempts: usize, min_words: usize },

	/// The paginated source failed.
	#[error("fetch statuses: {context}")]
	Fetch {
		context: String,
		#[source]
		source: Option<std::io::Error>,
	},

	/// The publisher rejected a post.
	#[error("create post: {context}")]
	Post {
		context: String,
		#[source]
		source: Option<std::io::Error>,
	},

	/// The morphological analyzer failed.
	#[error("analyze text: {0}")]
	Analyze(String),

	/// The byte-stream store failed.
	#[error("{context}")]
	Store {
		context: String,
		#[source]
		source: std::io::Error,
	},

	/// Configuration could not be read or is invalid.
	#[error("invalid configuration: {0}")]
	Config(String),

	/// I/O error with the path it concerns.
	#[error("I/O error for {path}: {err}")]
	Io {
		path: PathBuf,
		#[source]
		err: std::io::Error,
	},
}

impl Error {
	/// A decoded chain that breaks one of the chain invariants.
	pub(crate) fn malformed(context: impl Into<String>) -> Self {
		Error::Decode { context: context.into(), source: None }
	}
}

impl From<postcard::Error> for Error {
	fn from(err: postcard::Error) -> Self {
		Error::Decode {
			context: "invalid encoding".to_owned(),
			source: Some(err),
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Config(err.to_string())
	}
}

impl From<serde_yaml::Error> for Error {
	fn from(err: serde_yaml::Error) -> Self {
		Error::Config(err.to_string())
	}
}

/// Result type alias for bot operations.
pub type Result<T> = std::result::Result<T, Error>;
