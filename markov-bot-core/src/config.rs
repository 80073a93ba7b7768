use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blog::{BlogClient, FileClient, StdioClient};
use crate::error::{Error, Result};

/// Where posts are read from or published to.
///
/// Tagged by `platform` in the configuration file:
/// `{"platform": "stdio"}` or `{"platform": "file", "path": "posts.txt"}`.
/// Platform names are matched without regard to case.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PlatformConfig {
	Stdio,
	File {
		path: PathBuf,
		#[serde(default)]
		chunk_size: Option<usize>,
	},
}

impl PlatformConfig {
	/// Builds the client described by this entry.
	pub fn client(&self) -> Box<dyn BlogClient> {
		match self {
			PlatformConfig::Stdio => Box::new(StdioClient),
			PlatformConfig::File { path, chunk_size } => Box::new(FileClient::with_chunk_size(
				path,
				chunk_size.unwrap_or(FileClient::DEFAULT_CHUNK_SIZE),
			)),
		}
	}
}

/// Parameters of building the chain and generating posts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
	/// Order of the chain.
	pub state_size: usize,
	/// Maximum number of posts read while building.
	pub fetch_status_count: usize,
	/// Age in seconds after which the stored chain is rebuilt.
	pub expires_in: u64,
	/// Generated posts with fewer tokens are discarded.
	pub min_words_count: usize,
	/// Generation attempts before giving up.
	pub max_attempts: usize,
	/// Truncates generated posts to this many tokens, if set.
	pub max_words_count: Option<usize>,
}

impl Default for ChainConfig {
	fn default() -> Self {
		Self {
			state_size: 3,
			fetch_status_count: 200,
			expires_in: 60 * 60 * 24,
			min_words_count: 1,
			max_attempts: 100,
			max_words_count: None,
		}
	}
}

/// Full bot configuration, read from JSON or YAML.
///
/// ```json
/// {
///   "input": {"platform": "file", "path": "timeline.txt"},
///   "output": {"platform": "stdio"},
///   "state_size": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BotConfig {
	/// Posts used to build the chain.
	pub input: PlatformConfig,
	/// Destination of generated posts.
	pub output: PlatformConfig,
	#[serde(flatten)]
	pub chain: ChainConfig,
}

impl Default for BotConfig {
	/// Stdio in, stdio out, default chain parameters.
	fn default() -> Self {
		Self {
			input: PlatformConfig::Stdio,
			output: PlatformConfig::Stdio,
			chain: ChainConfig::default(),
		}
	}
}

impl BotConfig {
	/// Parses a JSON configuration.
	pub fn from_json(body: &str) -> Result<Self> {
		Self::from_value(serde_json::from_str(body)?)
	}

	/// Parses a YAML configuration.
	pub fn from_yaml(body: &str) -> Result<Self> {
		Self::from_value(serde_yaml::from_str(body)?)
	}

	/// Loads a configuration file: YAML for `.yml` / `.yaml`, JSON otherwise.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let body = std::fs::read_to_string(path).map_err(|err| Error::Io {
			path: path.to_path_buf(),
			err,
		})?;
		match path.extension().and_then(|ext| ext.to_str()) {
			Some("yml" | "yaml") => Self::from_yaml(&body),
			_ => Self::from_json(&body),
		}
	}

	fn from_value(mut value: serde_json::Value) -> Result<Self> {
		for key in ["input", "output"] {
			let platform = value.get_mut(key).and_then(|entry| entry.get_mut("platform"));
			if let Some(serde_json::Value::String(name)) = platform {
				*name = name.to_lowercase();
			}
		}
		Ok(serde_json::from_value(value)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn chain_defaults_apply() {
		let config = BotConfig::from_json(r#"{"input": {"platform": "stdio"}, "output": {"platform": "stdio"}}"#).unwrap();
		assert_eq!(config, BotConfig::default());
		assert_eq!(config.chain.state_size, 3);
		assert_eq!(config.chain.fetch_status_count, 200);
		assert_eq!(config.chain.expires_in, 86_400);
		assert_eq!(config.chain.min_words_count, 1);
	}

	#[test]
	fn platform_names_ignore_case() {
		let config = BotConfig::from_json(
			r#"{"input": {"platform": "File", "path": "in.txt"}, "output": {"platform": "STDIO"}}"#,
		)
		.unwrap();
		assert_eq!(config.input, PlatformConfig::File { path: "in.txt".into(), chunk_size: None });
		assert_eq!(config.output, PlatformConfig::Stdio);
	}

	#[test]
	fn yaml_is_read_like_json() {
		let config = BotConfig::from_yaml(
			"input:\n  platform: File\n  path: in.txt\noutput:\n  platform: stdio\nstate_size: 2\nexpires_in: 600\n",
		)
		.unwrap();
		assert_eq!(config.input, PlatformConfig::File { path: "in.txt".into(), chunk_size: None });
		assert_eq!(config.chain.state_size, 2);
		assert_eq!(config.chain.expires_in, 600);
		assert_eq!(config.chain.min_words_count, 1);

		assert!(matches!(BotConfig::from_yaml("input: [unclosed"), Err(Error::Config(_))));
	}

	#[test]
	fn yaml_file_is_picked_by_extension() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.yml");
		std::fs::write(&path, "input:\n  platform: stdio\noutput:\n  platform: stdio\nmin_words_count: 4\n").unwrap();
		assert_eq!(BotConfig::from_file(&path).unwrap().chain.min_words_count, 4);
	}

	#[test]
	fn chain_fields_are_read_flat() {
		let config = BotConfig::from_json(
			r#"{
				"input": {"platform": "file", "path": "in.txt", "chunk_size": 20},
				"output": {"platform": "file", "path": "out.txt"},
				"state_size": 2,
				"min_words_count": 5,
				"max_words_count": 40
			}"#,
		)
		.unwrap();
		assert_eq!(
			config.input,
			PlatformConfig::File { path: "in.txt".into(), chunk_size: Some(20) }
		);
		assert_eq!(config.output, PlatformConfig::File { path: "out.txt".into(), chunk_size: None });
		assert_eq!(config.chain.state_size, 2);
		assert_eq!(config.chain.min_words_count, 5);
		assert_eq!(config.chain.max_words_count, Some(40));
		assert_eq!(config.chain.fetch_status_count, 200);
	}

	#[test]
	fn unsupported_platform_is_rejected() {
		let err = BotConfig::from_json(r#"{"input": {"platform": "mastodon"}, "output": {"platform": "stdio"}}"#)
			.unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn missing_platform_is_rejected() {
		assert!(BotConfig::from_json(r#"{"input": {}, "output": {"platform": "stdio"}}"#).is_err());
		assert!(BotConfig::from_json(r#"{"output": {"platform": "stdio"}}"#).is_err());
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = BotConfig::from_file(dir.path().join("config.json")).unwrap_err();
		assert!(matches!(err, Error::Io { .. }));
	}

	#[test]
	fn file_is_loaded() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		std::fs::write(&path, r#"{"input": {"platform": "stdio"}, "output": {"platform": "stdio"}, "expires_in": 60}"#)
			.unwrap();
		assert_eq!(BotConfig::from_file(&path).unwrap().chain.expires_in, 60);
	}
}
