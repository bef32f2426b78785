//! zlib/DEFLATE decoder used for compressed binary arrays.
//!
//! Huffman codes of up to [`FAST_BITS`] bits resolve through one table lookup;
//! longer codes fall back to a canonical-code walk over `past_max_code` and
//! `code_to_sorted`. Static trees are built once per process and shared
//! through [`InflateRetain`].

use std::io::Read;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::fbx::stream::ProgressTracker;
use crate::fbx::{DEFAULT_READ_BUFFER_SIZE, ProgressCallback};

const FAST_BITS: u32 = 9;
const FAST_SIZE: usize = 1 << FAST_BITS;
const MAX_CODE_LEN: usize = 15;
const NUM_LIT_SYMS: usize = 288;
const NUM_DIST_SYMS: usize = 32;
const NUM_CODE_LEN_SYMS: usize = 19;

const CODE_LEN_ORDER: [usize; NUM_CODE_LEN_SYMS] = [16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];

const LENGTH_BASE: [u16; 29] = [
	3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131, 163, 195, 227, 258,
];
const LENGTH_EXTRA: [u8; 29] = [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0];
const DIST_BASE: [u16; 30] = [
	1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537, 2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
const DIST_EXTRA: [u8; 30] = [0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13];

/// Decode failures, each with a stable negative [`code`](InflateError::code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InflateError {
	/// Compression method is not DEFLATE or FCHECK fails.
	#[error("bad zlib header")]
	BadHeader,
	/// Window size larger than 32 KiB.
	#[error("bad zlib window size")]
	BadWindowSize,
	/// Stream needs a preset dictionary.
	#[error("stream requires a preset dictionary")]
	RequiresDictionary,
	/// Reserved block type 3.
	#[error("bad block type")]
	BadBlockType,
	/// Stored block `LEN` does not match `!NLEN`.
	#[error("stored block length mismatch")]
	BadUncompressedLength,
	/// Literal would write past the destination.
	#[error("literal overflows destination")]
	LiteralOverflow,
	/// Match would write past the destination.
	#[error("match overflows destination")]
	MatchOverflow,
	/// Distance code invalid or reaching before the output start.
	#[error("bad distance")]
	BadDistance,
	/// Length or literal code invalid.
	#[error("bad length")]
	BadLength,
	/// Code-length tree over- or under-subscribed.
	#[error("bad code length tree")]
	BadCodeLengthTree,
	/// Literal/length tree over- or under-subscribed.
	#[error("bad literal tree")]
	BadLiteralTree,
	/// Distance tree over- or under-subscribed.
	#[error("bad distance tree")]
	BadDistanceTree,
	/// Repeat code without a previous length or past the end.
	#[error("bad code length repeat")]
	BadCodeLengthRepeat,
	/// Adler-32 trailer mismatch.
	#[error("checksum mismatch")]
	ChecksumMismatch,
	/// Input ended mid-stream.
	#[error("truncated deflate stream")]
	Truncated,
	/// Progress callback requested cancellation.
	#[error("cancelled")]
	Cancelled,
}

impl InflateError {
	/// Stable negative error code.
	pub fn code(self) -> i32 {
		match self {
			Self::BadHeader => -1,
			Self::BadWindowSize => -2,
			Self::RequiresDictionary => -3,
			Self::BadBlockType => -4,
			Self::BadUncompressedLength => -5,
			Self::LiteralOverflow => -6,
			Self::MatchOverflow => -7,
			Self::BadDistance => -8,
			Self::BadLength => -9,
			Self::BadCodeLengthTree => -10,
			Self::BadLiteralTree => -11,
			Self::BadDistanceTree => -12,
			Self::BadCodeLengthRepeat => -13,
			Self::ChecksumMismatch => -14,
			Self::Truncated => -15,
			Self::Cancelled => -16,
		}
	}
}

/// Description of one compressed input.
pub struct InflateInput<'a> {
	/// Initial compressed bytes.
	pub data: &'a [u8],
	/// Total compressed size including `data`, used for progress only.
	pub total_size: u64,
	/// Pull source for bytes beyond `data`.
	pub reader: Option<&'a mut dyn Read>,
	/// Refill chunk size for `reader`.
	pub buffer_size: usize,
	/// Progress callback consulted while consuming input.
	pub progress_cb: Option<ProgressCallback>,
	/// Bytes between progress callbacks.
	pub progress_interval_hint: u64,
	/// Offset added to reported progress.
	pub progress_offset: u64,
	/// Raw DEFLATE without zlib wrapper.
	pub no_header: bool,
	/// Skip Adler-32 validation.
	pub no_checksum: bool,
}

impl<'a> InflateInput<'a> {
	/// zlib stream fully contained in `data`.
	pub fn from_slice(data: &'a [u8]) -> Self {
		Self {
			data,
			total_size: data.len() as u64,
			reader: None,
			buffer_size: DEFAULT_READ_BUFFER_SIZE,
			progress_cb: None,
			progress_interval_hint: 0,
			progress_offset: 0,
			no_header: false,
			no_checksum: false,
		}
	}

	/// zlib stream pulled from `reader`.
	pub fn from_reader(reader: &'a mut dyn Read, total_size: u64) -> Self {
		Self {
			data: &[],
			total_size,
			reader: Some(reader),
			buffer_size: DEFAULT_READ_BUFFER_SIZE,
			progress_cb: None,
			progress_interval_hint: 0,
			progress_offset: 0,
			no_header: false,
			no_checksum: false,
		}
	}
}

/// Static Huffman trees cached across calls.
#[derive(Debug, Default, Clone)]
pub struct InflateRetain {
	fixed: Option<Arc<FixedTrees>>,
}

impl InflateRetain {
	/// Empty retain state, filled on first static block.
	pub fn new() -> Self {
		Self::default()
	}

	fn fixed(&mut self) -> Arc<FixedTrees> {
		Arc::clone(self.fixed.get_or_insert_with(|| Arc::clone(fixed_trees())))
	}
}

#[derive(Debug)]
struct FixedTrees {
	lit: Huffman,
	dist: Huffman,
}

fn fixed_trees() -> &'static Arc<FixedTrees> {
	static FIXED: OnceLock<Arc<FixedTrees>> = OnceLock::new();
	FIXED.get_or_init(|| {
		let mut lit_lens = [0_u8; NUM_LIT_SYMS];
		for (sym, len) in lit_lens.iter_mut().enumerate() {
			*len = match sym {
				0..=143 => 8,
				144..=255 => 9,
				256..=279 => 7,
				_ => 8,
			};
		}
		let dist_lens = [5_u8; NUM_DIST_SYMS];
		// Fixed code lengths are complete by construction.
		let lit = Huffman::build(&lit_lens).unwrap_or_default();
		let dist = Huffman::build(&dist_lens).unwrap_or_default();
		Arc::new(FixedTrees { lit, dist })
	})
}

/// Canonical Huffman decoding tables.
#[derive(Debug, Clone)]
struct Huffman {
	/// `symbol << 4 | length`, zero when the code is longer than `FAST_BITS`.
	fast: Box<[u16; FAST_SIZE]>,
	/// First code value past the codes of each bit length.
	past_max_code: [u32; MAX_CODE_LEN + 2],
	/// Added to a code of a given length to index `sorted`.
	code_to_sorted: [i32; MAX_CODE_LEN + 1],
	/// Symbols ordered by `(length, symbol)`.
	sorted: Vec<u16>,
}

impl Default for Huffman {
	fn default() -> Self {
		Self {
			fast: Box::new([0; FAST_SIZE]),
			past_max_code: [0; MAX_CODE_LEN + 2],
			code_to_sorted: [0; MAX_CODE_LEN + 1],
			sorted: Vec::new(),
		}
	}
}

enum BuildError {
	Overfull,
	Underfull,
}

impl Huffman {
	fn build(lens: &[u8]) -> std::result::Result<Self, BuildError> {
		let mut count = [0_u32; MAX_CODE_LEN + 1];
		for &len in lens {
			count[usize::from(len)] += 1;
		}
		count[0] = 0;

		let mut left = 1_i64;
		let mut max_len = 0;
		for (len, &num) in count.iter().enumerate().skip(1) {
			left = (left << 1) - i64::from(num);
			if left < 0 {
				return Err(BuildError::Overfull);
			}
			if num > 0 {
				max_len = len;
			}
		}
		// An incomplete code is only valid as a single one-bit code or an empty tree.
		if left > 0 && max_len > 1 {
			return Err(BuildError::Underfull);
		}

		let mut table = Self::default();
		let mut first_code = [0_u32; MAX_CODE_LEN + 1];
		let mut first_sorted = [0_u32; MAX_CODE_LEN + 1];
		let mut code = 0_u32;
		let mut sorted_at = 0_u32;
		for len in 1..=MAX_CODE_LEN {
			first_code[len] = code;
			first_sorted[len] = sorted_at;
			table.past_max_code[len] = code + count[len];
			table.code_to_sorted[len] = sorted_at as i32 - code as i32;
			code = (code + count[len]) << 1;
			sorted_at += count[len];
		}
		table.past_max_code[MAX_CODE_LEN + 1] = u32::MAX;

		table.sorted = vec![0; sorted_at as usize];
		let mut next_sorted = first_sorted;
		let mut next_code = first_code;
		for (sym, &len) in lens.iter().enumerate() {
			if len == 0 {
				continue;
			}
			let len = usize::from(len);
			table.sorted[next_sorted[len] as usize] = sym as u16;
			next_sorted[len] += 1;

			let code = next_code[len];
			next_code[len] += 1;
			if len as u32 <= FAST_BITS {
				let reversed = reverse_bits(code, len as u32) as usize;
				let entry = ((sym as u16) << 4) | len as u16;
				let mut fill = reversed;
				while fill < FAST_SIZE {
					table.fast[fill] = entry;
					fill += 1 << len;
				}
			}
		}

		Ok(table)
	}
}

fn reverse_bits(code: u32, len: u32) -> u32 {
	code.reverse_bits() >> (32 - len)
}

struct BitReader<'a> {
	data: &'a [u8],
	pos: usize,
	reader: Option<&'a mut dyn Read>,
	chunk: Vec<u8>,
	chunk_pos: usize,
	buffer_size: usize,
	bits: u64,
	count: u32,
	consumed: u64,
	progress_offset: u64,
	progress: ProgressTracker,
}

impl<'a> BitReader<'a> {
	fn new(input: InflateInput<'a>) -> Self {
		let progress = ProgressTracker::new(input.progress_cb, input.progress_interval_hint, input.total_size);
		Self {
			data: input.data,
			pos: 0,
			reader: input.reader,
			chunk: Vec::new(),
			chunk_pos: 0,
			buffer_size: input.buffer_size.max(64),
			bits: 0,
			count: 0,
			consumed: 0,
			progress_offset: input.progress_offset,
			progress,
		}
	}

	fn next_byte(&mut self) -> Option<u8> {
		if self.progress.cancelled() {
			return None;
		}
		let byte = if self.pos < self.data.len() {
			let byte = self.data[self.pos];
			self.pos += 1;
			byte
		} else {
			if self.chunk_pos >= self.chunk.len() && !self.pull_chunk() {
				return None;
			}
			let byte = self.chunk[self.chunk_pos];
			self.chunk_pos += 1;
			byte
		};
		self.consumed += 1;
		if !self.progress.update(self.progress_offset + self.consumed) {
			// Cancellation acts as end of input for every pending loop.
			return None;
		}
		Some(byte)
	}

	fn pull_chunk(&mut self) -> bool {
		let Some(reader) = self.reader.as_mut() else {
			return false;
		};
		self.chunk.resize(self.buffer_size, 0);
		loop {
			match reader.read(&mut self.chunk) {
				Ok(0) => {
					self.chunk.clear();
					self.chunk_pos = 0;
					return false;
				}
				Ok(read) => {
					self.chunk.truncate(read);
					self.chunk_pos = 0;
					return true;
				}
				Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(err) => {
					log::debug!("inflate reader failed: {err}");
					self.chunk.clear();
					self.chunk_pos = 0;
					return false;
				}
			}
		}
	}

	fn refill(&mut self) {
		while self.count <= 56 {
			let Some(byte) = self.next_byte() else {
				break;
			};
			self.bits |= u64::from(byte) << self.count;
			self.count += 8;
		}
	}

	fn starved(&self) -> InflateError {
		if self.progress.cancelled() { InflateError::Cancelled } else { InflateError::Truncated }
	}

	fn bits(&mut self, n: u32) -> Result<u32, InflateError> {
		if n == 0 {
			return Ok(0);
		}
		if self.count < n {
			self.refill();
			if self.count < n {
				return Err(self.starved());
			}
		}
		let value = (self.bits & ((1_u64 << n) - 1)) as u32;
		self.bits >>= n;
		self.count -= n;
		Ok(value)
	}

	fn align_to_byte(&mut self) {
		let drop = self.count % 8;
		self.bits >>= drop;
		self.count -= drop;
	}

	fn read_aligned(&mut self, out: &mut [u8]) -> Result<(), InflateError> {
		let mut at = 0;
		while at < out.len() && self.count >= 8 {
			out[at] = (self.bits & 0xff) as u8;
			self.bits >>= 8;
			self.count -= 8;
			at += 1;
		}
		while at < out.len() {
			if self.pos < self.data.len() && !self.progress.cancelled() {
				let take = (self.data.len() - self.pos).min(out.len() - at);
				out[at..at + take].copy_from_slice(&self.data[self.pos..self.pos + take]);
				self.pos += take;
				at += take;
				self.consumed += take as u64;
				if !self.progress.update(self.progress_offset + self.consumed) {
					return Err(InflateError::Cancelled);
				}
				continue;
			}
			match self.next_byte() {
				Some(byte) => {
					out[at] = byte;
					at += 1;
				}
				None => return Err(self.starved()),
			}
		}
		Ok(())
	}

	fn decode(&mut self, table: &Huffman, miss: InflateError) -> Result<u16, InflateError> {
		if self.count < MAX_CODE_LEN as u32 {
			self.refill();
		}
		let entry = table.fast[(self.bits & (FAST_SIZE as u64 - 1)) as usize];
		if entry != 0 {
			let len = u32::from(entry & 15);
			if len > self.count {
				return Err(self.starved());
			}
			self.bits >>= len;
			self.count -= len;
			return Ok(entry >> 4);
		}

		let mut code = 0_u32;
		for len in 1..=MAX_CODE_LEN {
			if len as u32 > self.count {
				return Err(self.starved());
			}
			code = (code << 1) | ((self.bits >> (len - 1)) & 1) as u32;
			if code < table.past_max_code[len] {
				let index = code as i64 + i64::from(table.code_to_sorted[len]);
				let Some(&sym) = usize::try_from(index).ok().and_then(|index| table.sorted.get(index)) else {
					return Err(miss);
				};
				self.bits >>= len;
				self.count -= len as u32;
				return Ok(sym);
			}
		}
		Err(miss)
	}
}

/// Decompress `input` into `dst`, returning the number of bytes written.
pub fn inflate(dst: &mut [u8], input: InflateInput<'_>, retain: &mut InflateRetain) -> Result<usize, InflateError> {
	let no_header = input.no_header;
	let no_checksum = input.no_checksum;
	let mut reader = BitReader::new(input);

	if !no_header {
		let cmf = reader.bits(8)?;
		let flg = reader.bits(8)?;
		if cmf & 0x0f != 8 {
			return Err(InflateError::BadHeader);
		}
		if cmf >> 4 > 7 {
			return Err(InflateError::BadWindowSize);
		}
		if (cmf * 256 + flg) % 31 != 0 {
			return Err(InflateError::BadHeader);
		}
		if flg & 0x20 != 0 {
			return Err(InflateError::RequiresDictionary);
		}
	}

	let mut out = 0_usize;
	loop {
		let last = reader.bits(1)? == 1;
		match reader.bits(2)? {
			0 => {
				reader.align_to_byte();
				let len = reader.bits(16)?;
				let nlen = reader.bits(16)?;
				if len != (!nlen & 0xffff) {
					return Err(InflateError::BadUncompressedLength);
				}
				let len = len as usize;
				if out + len > dst.len() {
					return Err(InflateError::LiteralOverflow);
				}
				reader.read_aligned(&mut dst[out..out + len])?;
				out += len;
			}
			1 => {
				let fixed = retain.fixed();
				out = decode_block(&mut reader, dst, out, &fixed.lit, &fixed.dist)?;
			}
			2 => {
				let (lit, dist) = read_dynamic_trees(&mut reader)?;
				out = decode_block(&mut reader, dst, out, &lit, &dist)?;
			}
			_ => return Err(InflateError::BadBlockType),
		}
		if last {
			break;
		}
	}

	if !no_header && !no_checksum {
		reader.align_to_byte();
		let mut trailer = [0_u8; 4];
		reader.read_aligned(&mut trailer)?;
		if u32::from_be_bytes(trailer) != adler32(&dst[..out]) {
			return Err(InflateError::ChecksumMismatch);
		}
	}

	Ok(out)
}

fn read_dynamic_trees(reader: &mut BitReader<'_>) -> Result<(Huffman, Huffman), InflateError> {
	let num_lit = reader.bits(5)? as usize + 257;
	let num_dist = reader.bits(5)? as usize + 1;
	let num_code_len = reader.bits(4)? as usize + 4;
	if num_lit > 286 {
		return Err(InflateError::BadLiteralTree);
	}
	if num_dist > 30 {
		return Err(InflateError::BadDistanceTree);
	}

	let mut code_lens = [0_u8; NUM_CODE_LEN_SYMS];
	for &sym in CODE_LEN_ORDER.iter().take(num_code_len) {
		code_lens[sym] = reader.bits(3)? as u8;
	}
	let code_len_tree = Huffman::build(&code_lens).map_err(|_| InflateError::BadCodeLengthTree)?;
	if code_len_tree.sorted.is_empty() {
		return Err(InflateError::BadCodeLengthTree);
	}

	let total = num_lit + num_dist;
	let mut lens = [0_u8; NUM_LIT_SYMS + NUM_DIST_SYMS];
	let mut at = 0;
	while at < total {
		let sym = reader.decode(&code_len_tree, InflateError::BadCodeLengthTree)?;
		let (value, repeat) = match sym {
			0..=15 => (sym as u8, 1),
			16 => {
				if at == 0 {
					return Err(InflateError::BadCodeLengthRepeat);
				}
				(lens[at - 1], 3 + reader.bits(2)? as usize)
			}
			17 => (0, 3 + reader.bits(3)? as usize),
			18 => (0, 11 + reader.bits(7)? as usize),
			_ => return Err(InflateError::BadCodeLengthTree),
		};
		if at + repeat > total {
			return Err(InflateError::BadCodeLengthRepeat);
		}
		lens[at..at + repeat].fill(value);
		at += repeat;
	}

	if lens[256] == 0 {
		return Err(InflateError::BadLiteralTree);
	}
	let lit = Huffman::build(&lens[..num_lit]).map_err(|_| InflateError::BadLiteralTree)?;
	let dist = Huffman::build(&lens[num_lit..total]).map_err(|_| InflateError::BadDistanceTree)?;
	Ok((lit, dist))
}

fn decode_block(reader: &mut BitReader<'_>, dst: &mut [u8], mut out: usize, lit: &Huffman, dist: &Huffman) -> Result<usize, InflateError> {
	loop {
		let sym = usize::from(reader.decode(lit, InflateError::BadLength)?);
		if sym < 256 {
			if out >= dst.len() {
				return Err(InflateError::LiteralOverflow);
			}
			dst[out] = sym as u8;
			out += 1;
			continue;
		}
		if sym == 256 {
			return Ok(out);
		}

		let code = sym - 257;
		if code >= LENGTH_BASE.len() {
			return Err(InflateError::BadLength);
		}
		let length = usize::from(LENGTH_BASE[code]) + reader.bits(u32::from(LENGTH_EXTRA[code]))? as usize;

		let dist_code = usize::from(reader.decode(dist, InflateError::BadDistance)?);
		if dist_code >= DIST_BASE.len() {
			return Err(InflateError::BadDistance);
		}
		let distance = usize::from(DIST_BASE[dist_code]) + reader.bits(u32::from(DIST_EXTRA[dist_code]))? as usize;

		if distance > out {
			return Err(InflateError::BadDistance);
		}
		if out + length > dst.len() {
			return Err(InflateError::MatchOverflow);
		}
		let from = out - distance;
		if distance >= length {
			dst.copy_within(from..from + length, out);
		} else {
			for i in 0..length {
				dst[out + i] = dst[from + i];
			}
		}
		out += length;
	}
}

/// Adler-32 checksum of `data`.
pub fn adler32(data: &[u8]) -> u32 {
	const MOD: u32 = 65521;
	const NMAX: usize = 5552;
	let mut a = 1_u32;
	let mut b = 0_u32;
	for chunk in data.chunks(NMAX) {
		for &byte in chunk {
			a += u32::from(byte);
			b += a;
		}
		a %= MOD;
		b %= MOD;
	}
	(b << 16) | a
}

#[cfg(test)]
mod tests;
