use crate::fbx::{Allocator, Result};

const MIN_CHUNK_ITEMS: usize = 16;

/// Whether a [`Buf`] supports LIFO removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufMode {
	/// Stack semantics: push, pop, and pop-into another buffer.
	Ordered,
	/// Append-only storage that can only be cleared in bulk.
	Unordered,
}

struct Chunk<T> {
	items: Vec<T>,
	cap: usize,
}

impl<T> Chunk<T> {
	fn is_full(&self) -> bool {
		self.items.len() >= self.cap
	}
}

/// Chunked growable buffer charged against an [`Allocator`].
///
/// Chunks double in size up to `max_chunk_size`; chunks emptied by `pop`
/// are parked on a free list and reused by later pushes.
pub struct Buf<T> {
	alloc: Allocator,
	mode: BufMode,
	chunks: Vec<Chunk<T>>,
	spare: Vec<Chunk<T>>,
	len: usize,
	next_chunk: usize,
	charged: usize,
}

impl<T> Buf<T> {
	/// Empty buffer accounted against `alloc`.
	pub fn new(alloc: &Allocator, mode: BufMode) -> Self {
		Self {
			alloc: alloc.clone(),
			mode,
			chunks: Vec::new(),
			spare: Vec::new(),
			len: 0,
			next_chunk: MIN_CHUNK_ITEMS,
			charged: 0,
		}
	}

	/// Buffer mode.
	pub fn mode(&self) -> BufMode {
		self.mode
	}

	/// Number of items.
	pub fn len(&self) -> usize {
		self.len
	}

	/// True when no items are stored.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Number of chunks holding items.
	pub fn num_chunks(&self) -> usize {
		self.chunks.len()
	}

	/// Number of retained empty chunks.
	pub fn num_spare_chunks(&self) -> usize {
		self.spare.len()
	}

	fn item_size() -> usize {
		std::mem::size_of::<T>().max(1)
	}

	fn max_chunk_items(&self) -> usize {
		(self.alloc.opts().max_chunk_size / Self::item_size()).max(MIN_CHUNK_ITEMS)
	}

	fn new_chunk(&mut self, cap: usize) -> Result<Chunk<T>> {
		self.alloc.alloc(Self::item_size(), cap)?;
		self.charged += cap;
		Ok(Chunk {
			items: Vec::with_capacity(cap),
			cap,
		})
	}

	fn writable_chunk(&mut self) -> Result<&mut Chunk<T>> {
		let needs_chunk = self.chunks.last().is_none_or(Chunk::is_full);
		if needs_chunk {
			let chunk = match self.spare.pop() {
				Some(chunk) => chunk,
				None => {
					let cap = self.next_chunk;
					self.next_chunk = (cap * 2).min(self.max_chunk_items());
					self.new_chunk(cap)?
				}
			};
			self.chunks.push(chunk);
		}
		let last = self.chunks.len() - 1;
		Ok(&mut self.chunks[last])
	}

	/// Append one item.
	pub fn push(&mut self, item: T) -> Result<()> {
		self.writable_chunk()?.items.push(item);
		self.len += 1;
		Ok(())
	}

	/// Append many items, giving huge batches a dedicated chunk.
	pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) -> Result<()>
	where
		I::IntoIter: ExactSizeIterator,
	{
		let items = items.into_iter();
		let count = items.len();
		if count > 0 && self.alloc.is_huge(count.saturating_mul(Self::item_size())) {
			let mut chunk = self.new_chunk(count)?;
			chunk.items.extend(items);
			self.len += chunk.items.len();
			self.chunks.push(chunk);
			return Ok(());
		}
		for item in items {
			self.push(item)?;
		}
		Ok(())
	}

	/// Remove the most recent item, `None` when empty or unordered.
	pub fn pop(&mut self) -> Option<T> {
		if self.mode == BufMode::Unordered {
			log::trace!("pop rejected on unordered buffer");
			return None;
		}
		let chunk = self.chunks.last_mut()?;
		let item = chunk.items.pop()?;
		self.len -= 1;
		if chunk.items.is_empty()
			&& let Some(empty) = self.chunks.pop()
		{
			self.spare.push(empty);
		}
		Some(item)
	}

	/// Move the most recent item onto `dst`.
	pub fn pop_into(&mut self, dst: &mut Buf<T>) -> Result<bool> {
		match self.pop() {
			Some(item) => {
				dst.push(item)?;
				Ok(true)
			}
			None => Ok(false),
		}
	}

	/// Remove the last `n` items, returned in push order.
	pub fn pop_n(&mut self, n: usize) -> Vec<T> {
		let mut out = Vec::with_capacity(n.min(self.len));
		for _ in 0..n {
			match self.pop() {
				Some(item) => out.push(item),
				None => break,
			}
		}
		out.reverse();
		out
	}

	/// Most recent item.
	pub fn last(&self) -> Option<&T> {
		self.chunks.last().and_then(|chunk| chunk.items.last())
	}

	/// Drop every item, keeping chunks for reuse.
	pub fn clear(&mut self) {
		for mut chunk in self.chunks.drain(..) {
			chunk.items.clear();
			self.spare.push(chunk);
		}
		self.len = 0;
	}

	/// Iterate items in push order.
	pub fn iter(&self) -> impl Iterator<Item = &T> {
		self.chunks.iter().flat_map(|chunk| chunk.items.iter())
	}

	/// Move all items into one contiguous vector.
	pub fn into_vec(mut self) -> Vec<T> {
		let mut out = Vec::with_capacity(self.len);
		for chunk in self.chunks.drain(..) {
			out.extend(chunk.items);
		}
		self.len = 0;
		out
	}
}

impl<T> Drop for Buf<T> {
	fn drop(&mut self) {
		self.alloc.free(Self::item_size(), self.charged);
	}
}

#[cfg(test)]
mod tests;
