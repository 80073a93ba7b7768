//! Turns a paginated source into a plain iterator of items.

/// A source that hands out items one page (chunk) at a time.
///
/// Each call returns the next chunk and whether another chunk may follow. A
/// chunk may be empty even when more are coming.
pub trait ChunkSource {
	type Item;
	type Error;

	/// Pulls the next chunk: `(items, has_more)`.
	fn next_chunk(&mut self) -> Result<(Vec<Self::Item>, bool), Self::Error>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
	type Item = S::Item;
	type Error = S::Error;

	fn next_chunk(&mut self) -> Result<(Vec<S::Item>, bool), S::Error> {
		(**self).next_chunk()
	}
}

/// Chunk source backed by a closure. See [`from_fn`].
#[derive(Clone, Debug)]
pub struct FromFn<F>(F);

impl<T, E, F> ChunkSource for FromFn<F>
where
	F: FnMut() -> Result<(Vec<T>, bool), E>,
{
	type Item = T;
	type Error = E;

	fn next_chunk(&mut self) -> Result<(Vec<T>, bool), E> {
		(self.0)()
	}
}

/// Makes a chunk source out of a closure returning `(items, has_more)`.
pub fn from_fn<T, E, F>(f: F) -> FromFn<F>
where
	F: FnMut() -> Result<(Vec<T>, bool), E>,
{
	FromFn(f)
}

/// Iterator over the items of a [`ChunkSource`], hiding chunk boundaries.
///
/// Chunks are pulled lazily, only once the buffered one is used up. Empty
/// chunks announcing more data are skipped over. Iteration ends once the
/// buffer is empty and the source said no more chunks follow.
///
/// A failing pull yields `Some(Err(_))` and leaves the iterator where it was:
/// the next call pulls again.
///
/// Every `ChunkIter` is single-pass; build a new one to start over.
pub struct ChunkIter<S: ChunkSource> {
	source: S,
	buffer: std::vec::IntoIter<S::Item>,
	has_more: bool,
}

impl<S: ChunkSource> ChunkIter<S> {
	/// Wraps `source`. Nothing is pulled until the first call to `next`.
	pub fn new(source: S) -> Self {
		Self {
			source,
			buffer: Vec::new().into_iter(),
			has_more: true,
		}
	}

	/// Returns `true` when no item is buffered and the source announced its last chunk.
	///
	/// Lets callers stop without another call to `next`.
	pub fn is_exhausted(&self) -> bool {
		self.buffer.len() == 0 && !self.has_more
	}

	/// Number of items already pulled but not yet returned.
	pub fn buffered(&self) -> usize {
		self.buffer.len()
	}
}

impl<S: ChunkSource> Iterator for ChunkIter<S> {
	type Item = Result<S::Item, S::Error>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(item) = self.buffer.next() {
				return Some(Ok(item));
			}
			if !self.has_more {
				return None;
			}
			match self.source.next_chunk() {
				Ok((items, has_more)) => {
					self.buffer = items.into_iter();
					self.has_more = has_more;
				}
				Err(err) => return Some(Err(err)),
			}
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let buffered = self.buffer.len();
		if self.has_more { (buffered, None) } else { (buffered, Some(buffered)) }
	}
}
