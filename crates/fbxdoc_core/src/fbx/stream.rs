use std::borrow::Cow;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use crate::fbx::{Endianness, FbxError, Result};

/// Default refill chunk for reader-backed streams.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;
/// Default byte interval between progress callbacks.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 0x10000;

/// Snapshot passed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
	/// Bytes consumed so far.
	pub bytes_read: u64,
	/// Total input size when known, `0` otherwise.
	pub bytes_total: u64,
}

/// Progress callback verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressResult {
	/// Keep going.
	Continue,
	/// Stop as soon as possible and fail with `Cancelled`.
	Cancel,
}

/// Shared progress callback handle.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(&Progress) -> ProgressResult + Send + Sync>);

impl ProgressCallback {
	/// Wrap a closure.
	pub fn new(f: impl Fn(&Progress) -> ProgressResult + Send + Sync + 'static) -> Self {
		Self(Arc::new(f))
	}

	/// Invoke the callback.
	pub fn call(&self, progress: &Progress) -> ProgressResult {
		(self.0)(progress)
	}
}

impl fmt::Debug for ProgressCallback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ProgressCallback(..)")
	}
}

/// Periodic progress reporting state shared by the stream and inflate.
#[derive(Debug, Clone)]
pub(crate) struct ProgressTracker {
	callback: Option<ProgressCallback>,
	interval: u64,
	next_report: u64,
	bytes_total: u64,
	cancelled: bool,
}

impl ProgressTracker {
	pub(crate) fn new(callback: Option<ProgressCallback>, interval: u64, bytes_total: u64) -> Self {
		let interval = if interval == 0 { DEFAULT_PROGRESS_INTERVAL } else { interval };
		Self {
			callback,
			interval,
			next_report: interval,
			bytes_total,
			cancelled: false,
		}
	}

	pub(crate) fn cancelled(&self) -> bool {
		self.cancelled
	}

	/// Report if `bytes_read` crossed the next interval, returns `false` once cancelled.
	pub(crate) fn update(&mut self, bytes_read: u64) -> bool {
		if self.cancelled {
			return false;
		}
		let Some(callback) = &self.callback else {
			return true;
		};
		if bytes_read < self.next_report {
			return true;
		}
		self.next_report = bytes_read.saturating_add(self.interval);
		let progress = Progress {
			bytes_read,
			bytes_total: self.bytes_total,
		};
		if callback.call(&progress) == ProgressResult::Cancel {
			log::debug!("load cancelled by progress callback at byte {bytes_read}");
			self.cancelled = true;
			return false;
		}
		true
	}
}

enum Source<'a> {
	Memory,
	Reader(Box<dyn Read + 'a>),
}

/// Buffered cursor over an in-memory buffer or a pull-based reader.
pub struct InputStream<'a> {
	source: Source<'a>,
	data: Cow<'a, [u8]>,
	pos: usize,
	base_offset: u64,
	read_buffer_size: usize,
	reader_eof: bool,
	progress: ProgressTracker,
}

impl<'a> InputStream<'a> {
	/// Stream over bytes already in memory.
	pub fn from_memory(bytes: &'a [u8]) -> Self {
		Self {
			source: Source::Memory,
			data: Cow::Borrowed(bytes),
			pos: 0,
			base_offset: 0,
			read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
			reader_eof: true,
			progress: ProgressTracker::new(None, 0, bytes.len() as u64),
		}
	}

	/// Stream refilled from `reader` in `read_buffer_size` chunks.
	pub fn from_reader(reader: Box<dyn Read + 'a>, read_buffer_size: usize) -> Self {
		let read_buffer_size = if read_buffer_size == 0 { DEFAULT_READ_BUFFER_SIZE } else { read_buffer_size };
		Self {
			source: Source::Reader(reader),
			data: Cow::Owned(Vec::new()),
			pos: 0,
			base_offset: 0,
			read_buffer_size,
			reader_eof: false,
			progress: ProgressTracker::new(None, 0, 0),
		}
	}

	/// Install a progress callback fired every `interval` bytes.
	pub fn with_progress(mut self, callback: Option<ProgressCallback>, interval: u64, bytes_total: u64) -> Self {
		let total = if bytes_total == 0 && matches!(self.source, Source::Memory) {
			self.data.len() as u64
		} else {
			bytes_total
		};
		self.progress = ProgressTracker::new(callback, interval, total);
		self
	}

	/// Absolute offset of the next unread byte.
	pub fn position(&self) -> u64 {
		self.base_offset + self.pos as u64
	}

	/// Bytes currently buffered past the cursor.
	pub fn buffered(&self) -> usize {
		self.data.len() - self.pos
	}

	/// True once the cursor reached the end of input.
	pub fn is_eof(&mut self) -> Result<bool> {
		Ok(!self.fill(1)?)
	}

	/// Progress callback handle, cloned for nested decoders.
	pub(crate) fn progress_callback(&self) -> Option<ProgressCallback> {
		self.progress.callback.clone()
	}

	/// Ensure `need` bytes are buffered, returns `false` on early end of input.
	pub fn fill(&mut self, need: usize) -> Result<bool> {
		if self.progress.cancelled() {
			return Err(FbxError::Cancelled);
		}
		if self.buffered() >= need {
			return Ok(true);
		}
		let Source::Reader(reader) = &mut self.source else {
			return Ok(false);
		};
		if self.reader_eof {
			return Ok(false);
		}

		let buf = self.data.to_mut();
		if self.pos > 0 {
			buf.drain(..self.pos);
			self.base_offset += self.pos as u64;
			self.pos = 0;
		}

		while buf.len() < need {
			let start = buf.len();
			let chunk = self.read_buffer_size.max(need - start);
			buf.resize(start + chunk, 0);
			let read = loop {
				match reader.read(&mut buf[start..]) {
					Ok(read) => break read,
					Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
					Err(err) => {
						buf.truncate(start);
						return Err(err.into());
					}
				}
			};
			buf.truncate(start + read);
			if read == 0 {
				self.reader_eof = true;
				break;
			}
		}

		let end = self.base_offset + buf.len() as u64;
		if !self.progress.update(end) {
			return Err(FbxError::Cancelled);
		}
		Ok(buf.len() >= need)
	}

	/// Borrow the next `n` bytes without consuming them.
	pub fn peek(&mut self, n: usize) -> Result<Option<&[u8]>> {
		if !self.fill(n)? {
			return Ok(None);
		}
		Ok(Some(&self.data[self.pos..self.pos + n]))
	}

	/// Next byte without consuming it.
	pub fn peek_u8(&mut self) -> Result<Option<u8>> {
		if !self.fill(1)? {
			return Ok(None);
		}
		Ok(Some(self.data[self.pos]))
	}

	/// Consume and return exactly `n` bytes.
	pub fn read_exact(&mut self, n: usize) -> Result<&[u8]> {
		if !self.fill(n)? {
			return Err(FbxError::TruncatedFile {
				at: self.position(),
				need: n,
			});
		}
		let start = self.pos;
		self.pos += n;
		if matches!(self.source, Source::Memory) && !self.progress.update(self.pos as u64) {
			return Err(FbxError::Cancelled);
		}
		Ok(&self.data[start..self.pos])
	}

	/// Skip `n` bytes.
	pub fn skip(&mut self, n: u64) -> Result<()> {
		let mut left = n;
		while left > 0 {
			let step = left.min(self.read_buffer_size.max(1) as u64) as usize;
			let avail = self.buffered();
			if avail >= step {
				self.pos += step;
				left -= step as u64;
				continue;
			}
			if avail > 0 {
				self.pos += avail;
				left -= avail as u64;
				continue;
			}
			if !self.fill(1)? {
				return Err(FbxError::TruncatedFile {
					at: self.position(),
					need: left as usize,
				});
			}
		}
		Ok(())
	}

	/// Skip forward to absolute offset `target`.
	pub fn seek_forward(&mut self, target: u64) -> Result<()> {
		let pos = self.position();
		if target < pos {
			return Err(FbxError::BadNode {
				at: pos,
				reason: "end offset points backwards",
			});
		}
		self.skip(target - pos)
	}

	/// Read a single byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a `u16` in the given byte order.
	pub fn read_u16(&mut self, endianness: Endianness) -> Result<u16> {
		let raw = self.read_array::<2>()?;
		Ok(match endianness {
			Endianness::Little => u16::from_le_bytes(raw),
			Endianness::Big => u16::from_be_bytes(raw),
		})
	}

	/// Read a `u32` in the given byte order.
	pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32> {
		let raw = self.read_array::<4>()?;
		Ok(match endianness {
			Endianness::Little => u32::from_le_bytes(raw),
			Endianness::Big => u32::from_be_bytes(raw),
		})
	}

	/// Read a `u64` in the given byte order.
	pub fn read_u64(&mut self, endianness: Endianness) -> Result<u64> {
		let raw = self.read_array::<8>()?;
		Ok(match endianness {
			Endianness::Little => u64::from_le_bytes(raw),
			Endianness::Big => u64::from_be_bytes(raw),
		})
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}
}

/// `Read` adapter over the next `left` bytes of an [`InputStream`].
pub(crate) struct BoundedRead<'s, 'a> {
	stream: &'s mut InputStream<'a>,
	left: u64,
}

impl<'s, 'a> BoundedRead<'s, 'a> {
	pub(crate) fn new(stream: &'s mut InputStream<'a>, left: u64) -> Self {
		Self { stream, left }
	}

	pub(crate) fn remaining(&self) -> u64 {
		self.left
	}
}

impl Read for BoundedRead<'_, '_> {
	fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
		if self.left == 0 || out.is_empty() {
			return Ok(0);
		}
		let filled = self.stream.fill(1).map_err(|err| match err {
			FbxError::Io(err) => err,
			other => std::io::Error::other(other.to_string()),
		})?;
		if !filled {
			return Ok(0);
		}
		let take = (self.stream.buffered() as u64).min(self.left).min(out.len() as u64) as usize;
		let start = self.stream.pos;
		out[..take].copy_from_slice(&self.stream.data[start..start + take]);
		self.stream.pos += take;
		self.left -= take as u64;
		Ok(take)
	}
}

#[cfg(test)]
mod tests;
