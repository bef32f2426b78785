use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::fbx::{FbxError, Result};

/// Limits and growth policy for one allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorOpts {
	/// Maximum live bytes, `0` for unlimited.
	pub memory_limit: usize,
	/// Maximum number of allocations, `0` for unlimited.
	pub allocation_limit: usize,
	/// Requests at or above this size get a dedicated block.
	pub huge_threshold: usize,
	/// Upper bound for geometrically grown chunks.
	pub max_chunk_size: usize,
}

impl Default for AllocatorOpts {
	fn default() -> Self {
		Self {
			memory_limit: 0,
			allocation_limit: 0,
			huge_threshold: 0x10_0000,
			max_chunk_size: 0x100_0000,
		}
	}
}

/// Snapshot of allocator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
	/// Live bytes.
	pub bytes: usize,
	/// High-water mark of live bytes.
	pub peak_bytes: usize,
	/// Number of allocations performed.
	pub allocations: usize,
	/// Allocations routed through the huge path.
	pub huge_allocations: usize,
}

#[derive(Debug, Default)]
struct Counters {
	bytes: AtomicUsize,
	peak_bytes: AtomicUsize,
	allocations: AtomicUsize,
	huge_allocations: AtomicUsize,
}

/// Shared accounting handle enforcing memory and allocation limits.
///
/// Cloning yields another handle onto the same counters, so buffers built
/// during parsing can be handed to the scene without re-accounting.
#[derive(Debug, Clone)]
pub struct Allocator {
	opts: AllocatorOpts,
	counters: Arc<Counters>,
}

impl Default for Allocator {
	fn default() -> Self {
		Self::new(AllocatorOpts::default())
	}
}

impl Allocator {
	/// Create an allocator with the given limits.
	pub fn new(opts: AllocatorOpts) -> Self {
		Self {
			opts,
			counters: Arc::new(Counters::default()),
		}
	}

	/// Configured limits.
	pub fn opts(&self) -> &AllocatorOpts {
		&self.opts
	}

	/// Account for `count` items of `size` bytes.
	///
	/// Zero-sized requests always succeed without touching the counters.
	pub fn alloc(&self, size: usize, count: usize) -> Result<()> {
		let bytes = size.checked_mul(count).ok_or(FbxError::OutOfMemory)?;
		if bytes == 0 {
			return Ok(());
		}

		let allocations = self.counters.allocations.fetch_add(1, Ordering::Relaxed) + 1;
		if self.opts.allocation_limit > 0 && allocations > self.opts.allocation_limit {
			self.counters.allocations.fetch_sub(1, Ordering::Relaxed);
			return Err(FbxError::AllocationLimit {
				limit: self.opts.allocation_limit,
			});
		}

		let total = self.counters.bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
		if self.opts.memory_limit > 0 && total > self.opts.memory_limit {
			self.counters.bytes.fetch_sub(bytes, Ordering::Relaxed);
			self.counters.allocations.fetch_sub(1, Ordering::Relaxed);
			return Err(FbxError::MemoryLimit {
				limit: self.opts.memory_limit,
			});
		}
		self.counters.peak_bytes.fetch_max(total, Ordering::Relaxed);
		if bytes >= self.opts.huge_threshold {
			self.counters.huge_allocations.fetch_add(1, Ordering::Relaxed);
		}
		Ok(())
	}

	/// Account for growing an allocation from `old_count` to `new_count` items.
	pub fn realloc(&self, size: usize, old_count: usize, new_count: usize) -> Result<()> {
		if new_count <= old_count {
			self.free(size, old_count - new_count);
			return Ok(());
		}
		self.alloc(size, new_count - old_count)
	}

	/// Release `count` items of `size` bytes.
	pub fn free(&self, size: usize, count: usize) {
		let bytes = size.saturating_mul(count);
		if bytes == 0 {
			return;
		}
		let _ = self
			.counters
			.bytes
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| Some(live.saturating_sub(bytes)));
	}

	/// Account for a vector of `T` and hand it back.
	pub fn track<T>(&self, items: Vec<T>) -> Result<Vec<T>> {
		self.alloc(std::mem::size_of::<T>(), items.len())?;
		Ok(items)
	}

	/// Allocate a zero-initialized vector of `len` items.
	pub fn alloc_vec<T: Clone + Default>(&self, len: usize) -> Result<Vec<T>> {
		self.alloc(std::mem::size_of::<T>(), len)?;
		let mut items = Vec::new();
		items.try_reserve_exact(len).map_err(|_| FbxError::OutOfMemory)?;
		items.resize(len, T::default());
		Ok(items)
	}

	/// Whether a request of `bytes` bypasses chunk growth.
	pub fn is_huge(&self, bytes: usize) -> bool {
		bytes >= self.opts.huge_threshold
	}

	/// Current counters.
	pub fn stats(&self) -> AllocatorStats {
		AllocatorStats {
			bytes: self.counters.bytes.load(Ordering::Relaxed),
			peak_bytes: self.counters.peak_bytes.load(Ordering::Relaxed),
			allocations: self.counters.allocations.load(Ordering::Relaxed),
			huge_allocations: self.counters.huge_allocations.load(Ordering::Relaxed),
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::fbx::{Allocator, AllocatorOpts, ErrorKind};

	#[test]
	fn zero_sized_requests_always_succeed() {
		let alloc = Allocator::new(AllocatorOpts {
			memory_limit: 1,
			allocation_limit: 1,
			..AllocatorOpts::default()
		});
		for _ in 0..10 {
			alloc.alloc(0, 100).expect("zero bytes");
			alloc.alloc(8, 0).expect("zero count");
		}
		assert_eq!(alloc.stats().allocations, 0);
	}

	#[test]
	fn memory_limit_is_enforced_and_rolled_back() {
		let alloc = Allocator::new(AllocatorOpts {
			memory_limit: 100,
			..AllocatorOpts::default()
		});
		alloc.alloc(8, 10).expect("80 bytes");
		let err = alloc.alloc(8, 3).expect_err("over limit");
		assert_eq!(err.kind(), ErrorKind::MemoryLimit);
		assert_eq!(alloc.stats().bytes, 80);
		alloc.free(8, 5);
		alloc.alloc(8, 3).expect("fits after free");
	}

	#[test]
	fn allocation_limit_counts_requests() {
		let alloc = Allocator::new(AllocatorOpts {
			allocation_limit: 3,
			..AllocatorOpts::default()
		});
		for _ in 0..3 {
			alloc.alloc(1, 1).expect("within limit");
		}
		assert_eq!(alloc.alloc(1, 1).expect_err("fourth").kind(), ErrorKind::AllocationLimit);
	}

	#[test]
	fn huge_requests_are_counted_separately() {
		let alloc = Allocator::new(AllocatorOpts {
			huge_threshold: 64,
			..AllocatorOpts::default()
		});
		alloc.alloc(1, 63).expect("small");
		alloc.alloc(1, 64).expect("huge");
		let stats = alloc.stats();
		assert_eq!(stats.huge_allocations, 1);
		assert_eq!(stats.peak_bytes, 127);
		assert!(alloc.is_huge(64));
	}

	#[test]
	fn clones_share_counters() {
		let alloc = Allocator::default();
		let other = alloc.clone();
		other.alloc_vec::<u32>(4).expect("vec");
		assert_eq!(alloc.stats().bytes, 16);
	}
}
