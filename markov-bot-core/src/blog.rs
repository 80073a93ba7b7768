use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::chunk::{ChunkSource, from_fn};
use crate::error::{Error, Result};
use crate::io;

/// Paginated source of posts handed out by a [`BlogClient`].
pub type PostsFetcher<'a> = Box<dyn ChunkSource<Item = String, Error = Error> + 'a>;

/// A place the bot reads posts from and publishes generated posts to.
pub trait BlogClient {
	/// Returns a fresh source of the account's posts, newest first.
	fn posts_fetcher(&mut self) -> PostsFetcher<'_>;

	/// Publishes one post.
	fn create_post(&mut self, body: &str) -> Result<()>;
}

/// Reads one post per line on stdin and publishes by printing to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdioClient;

impl BlogClient for StdioClient {
	fn posts_fetcher(&mut self) -> PostsFetcher<'_> {
		let mut lines = std::io::stdin().lock().lines();
		Box::new(from_fn(move || match lines.next() {
			None => Ok((Vec::new(), false)),
			Some(Ok(line)) => Ok((vec![line], true)),
			Some(Err(err)) => Err(Error::Fetch {
				context: "read stdin".to_owned(),
				source: Some(err),
			}),
		}))
	}

	fn create_post(&mut self, body: &str) -> Result<()> {
		writeln!(std::io::stdout(), "{body}").map_err(|err| Error::Post {
			context: "write stdout".to_owned(),
			source: Some(err),
		})
	}
}

/// Reads posts from the lines of a file and publishes by appending lines to it.
///
/// Posts are handed out in pages of `chunk_size` lines.
#[derive(Clone, Debug)]
pub struct FileClient {
	path: PathBuf,
	chunk_size: usize,
}

impl FileClient {
	/// Page size used by [`FileClient::new`].
	pub const DEFAULT_CHUNK_SIZE: usize = 100;

	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self::with_chunk_size(path, Self::DEFAULT_CHUNK_SIZE)
	}

	/// A chunk size of 0 is raised to 1.
	pub fn with_chunk_size(path: impl Into<PathBuf>, chunk_size: usize) -> Self {
		Self { path: path.into(), chunk_size: chunk_size.max(1) }
	}
}

impl BlogClient for FileClient {
	fn posts_fetcher(&mut self) -> PostsFetcher<'_> {
		let path = self.path.as_path();
		let chunk_size = self.chunk_size;
		// Read on the first pull only.
		let mut lines: Option<std::vec::IntoIter<String>> = None;
		Box::new(from_fn(move || -> Result<(Vec<String>, bool)> {
			let mut remaining = match lines.take() {
				Some(remaining) => remaining,
				None => io::read_lines(path)
					.map_err(|err| Error::Fetch {
						context: format!("read {}", path.display()),
						source: Some(err),
					})?
					.into_iter(),
			};
			let chunk: Vec<String> = remaining.by_ref().take(chunk_size).collect();
			let has_more = remaining.len() > 0;
			lines = Some(remaining);
			Ok((chunk, has_more))
		}))
	}

	fn create_post(&mut self, body: &str) -> Result<()> {
		io::append_line(&self.path, body).map_err(|err| Error::Post {
			context: format!("append to {}", self.path.display()),
			source: Some(err),
		})
	}
}

/// In-memory client: serves fixed contents as a single chunk and records
/// what gets posted.
#[derive(Clone, Debug, Default)]
pub struct RecordableClient {
	contents: Vec<String>,
	contents_fetched: bool,
	posted: Vec<String>,
}

impl RecordableClient {
	pub fn new<S: Into<String>>(contents: impl IntoIterator<Item = S>) -> Self {
		Self {
			contents: contents.into_iter().map(Into::into).collect(),
			contents_fetched: false,
			posted: Vec::new(),
		}
	}

	/// Posts published so far, oldest first.
	pub fn posted(&self) -> &[String] {
		&self.posted
	}
}

impl BlogClient for RecordableClient {
	fn posts_fetcher(&mut self) -> PostsFetcher<'_> {
		let contents = &self.contents;
		let fetched = &mut self.contents_fetched;
		Box::new(from_fn(move || {
			if *fetched {
				return Ok::<_, Error>((Vec::new(), false));
			}
			*fetched = true;
			Ok((contents.clone(), false))
		}))
	}

	fn create_post(&mut self, body: &str) -> Result<()> {
		self.posted.push(body.to_owned());
		Ok(())
	}
}
