use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::io;

/// Byte-stream storage for the encoded chain.
///
/// The store knows nothing about chains: it keeps whatever bytes it is given
/// and tells when they were last written.
pub trait PersistentStore {
	/// Returns the stored bytes.
	fn load(&self) -> Result<Vec<u8>>;

	/// Replaces the stored bytes.
	fn save(&mut self, data: &[u8]) -> Result<()>;

	/// Returns when the data was last saved, or `None` if nothing is stored.
	fn mod_time(&self) -> Result<Option<SystemTime>>;
}

/// Store backed by a single file.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}

impl FileStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	fn error(&self, action: &str, source: std::io::Error) -> Error {
		Error::Store {
			context: format!("{action} {}", self.path.display()),
			source,
		}
	}
}

impl PersistentStore for FileStore {
	fn load(&self) -> Result<Vec<u8>> {
		std::fs::read(&self.path).map_err(|err| self.error("load", err))
	}

	fn save(&mut self, data: &[u8]) -> Result<()> {
		std::fs::write(&self.path, data).map_err(|err| self.error("save", err))
	}

	fn mod_time(&self) -> Result<Option<SystemTime>> {
		io::modified(&self.path).map_err(|err| self.error("stat", err))
	}
}

/// Store keeping the data in memory.
///
/// An empty store reports no modification time.
#[derive(Clone, Debug)]
pub struct MemoryStore {
	content: Vec<u8>,
	mod_time: SystemTime,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self { content: Vec::new(), mod_time: SystemTime::now() }
	}

	/// Creates a store already holding `content`, saved at `mod_time`.
	pub fn with_content(content: Vec<u8>, mod_time: SystemTime) -> Self {
		Self { content, mod_time }
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl PersistentStore for MemoryStore {
	fn load(&self) -> Result<Vec<u8>> {
		Ok(self.content.clone())
	}

	fn save(&mut self, data: &[u8]) -> Result<()> {
		self.content = data.to_vec();
		self.mod_time = SystemTime::now();
		Ok(())
	}

	fn mod_time(&self) -> Result<Option<SystemTime>> {
		Ok((!self.content.is_empty()).then_some(self.mod_time))
	}
}
