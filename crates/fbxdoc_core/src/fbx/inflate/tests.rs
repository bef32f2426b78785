use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::fbx::{InflateError, InflateInput, InflateRetain, ProgressCallback, ProgressResult, adler32, inflate};

fn zlib(data: &[u8], level: Compression) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), level);
	encoder.write_all(data).expect("encode");
	encoder.finish().expect("finish")
}

fn sample_text() -> Vec<u8> {
	let mut out = Vec::new();
	for i in 0..400 {
		out.extend_from_slice(format!("Vertices: {i}, {}, {} ; the quick brown fox\n", i * 7 % 13, i * 31 % 101).as_bytes());
	}
	out
}

fn noise(len: usize) -> Vec<u8> {
	let mut state = 0x1234_5678_u32;
	(0..len)
		.map(|_| {
			state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
			(state >> 24) as u8
		})
		.collect()
}

fn run(stream: &[u8], dst_len: usize) -> Result<Vec<u8>, InflateError> {
	let mut dst = vec![0_u8; dst_len];
	let written = inflate(&mut dst, InflateInput::from_slice(stream), &mut InflateRetain::new())?;
	dst.truncate(written);
	Ok(dst)
}

/// Writes DEFLATE bit fields least-significant bit first.
struct BitWriter {
	out: Vec<u8>,
	acc: u64,
	count: u32,
}

impl BitWriter {
	fn zlib() -> Self {
		let mut writer = Self {
			out: Vec::new(),
			acc: 0,
			count: 0,
		};
		writer.bits(0x78, 8);
		writer.bits(0x01, 8);
		writer
	}

	fn bits(&mut self, value: u32, count: u32) {
		self.acc |= u64::from(value) << self.count;
		self.count += count;
		while self.count >= 8 {
			self.out.push((self.acc & 0xff) as u8);
			self.acc >>= 8;
			self.count -= 8;
		}
	}

	/// Huffman codes are stored most-significant bit first.
	fn code(&mut self, code: u32, len: u32) {
		for i in (0..len).rev() {
			self.bits((code >> i) & 1, 1);
		}
	}

	fn fixed_lit(&mut self, sym: u32) {
		match sym {
			0..=143 => self.code(0x30 + sym, 8),
			144..=255 => self.code(0x190 + sym - 144, 9),
			256..=279 => self.code(sym - 256, 7),
			_ => self.code(0xc0 + sym - 280, 8),
		}
	}

	fn finish(mut self) -> Vec<u8> {
		if self.count > 0 {
			self.out.push((self.acc & 0xff) as u8);
		}
		self.out
	}
}

fn fixed_block(body: impl FnOnce(&mut BitWriter)) -> Vec<u8> {
	let mut writer = BitWriter::zlib();
	writer.bits(1, 1);
	writer.bits(1, 2);
	body(&mut writer);
	writer.finish()
}

/// Dynamic block header using a code-length code of `1 -> 0` and `18 -> 1`.
fn dynamic_block(hdist: u32, body: impl FnOnce(&mut BitWriter)) -> Vec<u8> {
	let mut writer = BitWriter::zlib();
	writer.bits(1, 1);
	writer.bits(2, 2);
	writer.bits(0, 5);
	writer.bits(hdist, 5);
	writer.bits(14, 4);
	// Order: 16 17 18 0 8 7 9 6 10 5 11 4 12 3 13 2 14 1
	for len in [0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1] {
		writer.bits(len, 3);
	}
	body(&mut writer);
	writer.finish()
}

#[test]
fn matches_reference_encoder_at_every_level() {
	let text = sample_text();
	for level in [Compression::none(), Compression::fast(), Compression::default(), Compression::best()] {
		let compressed = zlib(&text, level);
		let out = run(&compressed, text.len()).expect("valid stream");
		assert_eq!(out.len(), text.len());
		assert_eq!(out, text);
	}
}

#[test]
fn decodes_incompressible_data() {
	let data = noise(10_000);
	let compressed = zlib(&data, Compression::best());
	assert_eq!(run(&compressed, data.len()).expect("valid stream"), data);
}

#[test]
fn pull_reader_matches_slice_input() {
	let text = sample_text();
	let compressed = zlib(&text, Compression::default());
	let mut source = std::io::Cursor::new(compressed.clone());
	let mut input = InflateInput::from_reader(&mut source, compressed.len() as u64);
	input.buffer_size = 64;

	let mut dst = vec![0_u8; text.len()];
	let written = inflate(&mut dst, input, &mut InflateRetain::new()).expect("reader stream");
	assert_eq!(written, text.len());
	assert_eq!(dst, text);
}

#[test]
fn hand_built_fixed_block_with_overlapping_match() {
	let mut stream = fixed_block(|w| {
		w.fixed_lit(u32::from(b'a'));
		w.fixed_lit(u32::from(b'b'));
		// length 6 (symbol 260), distance 2 (code 1)
		w.fixed_lit(260);
		w.code(1, 5);
		w.fixed_lit(256);
	});
	stream.extend_from_slice(&adler32(b"abababab").to_be_bytes());
	assert_eq!(run(&stream, 8).expect("valid"), b"abababab");
}

#[test]
fn retain_state_is_reused_across_calls() {
	let mut retain = InflateRetain::new();
	let compressed = zlib(b"retain me retain me retain me", Compression::fast());
	for _ in 0..3 {
		let mut dst = [0_u8; 29];
		let written = inflate(&mut dst, InflateInput::from_slice(&compressed), &mut retain).expect("valid");
		assert_eq!(&dst[..written], b"retain me retain me retain me");
	}
}

#[test]
fn header_errors() {
	assert_eq!(run(&[0x78, 0x9d], 16), Err(InflateError::BadHeader));
	assert_eq!(run(&[0x79, 0x18], 16), Err(InflateError::BadHeader));
	assert_eq!(run(&[0x88, 0x1c], 16), Err(InflateError::BadWindowSize));
	assert_eq!(run(&[0x78, 0x20], 16), Err(InflateError::RequiresDictionary));
}

#[test]
fn block_level_errors() {
	assert_eq!(run(&[0x78, 0x01, 0x07], 16), Err(InflateError::BadBlockType));
	assert_eq!(run(&[0x78, 0x01, 0x01, 0x05, 0x00, 0x00, 0x00], 16), Err(InflateError::BadUncompressedLength));
	assert_eq!(
		run(&[0x78, 0x01, 0x01, 0x05, 0x00, 0xfa, 0xff, 1, 2, 3, 4, 5], 3),
		Err(InflateError::LiteralOverflow)
	);
}

#[test]
fn destination_overflow_errors() {
	let text = zlib(b"hello world", Compression::default());
	assert_eq!(run(&text, 3), Err(InflateError::LiteralOverflow));

	let stream = fixed_block(|w| {
		w.fixed_lit(u32::from(b'a'));
		w.fixed_lit(u32::from(b'b'));
		w.fixed_lit(258);
		w.code(0, 5);
	});
	assert_eq!(run(&stream, 4), Err(InflateError::MatchOverflow));
}

#[test]
fn bad_length_and_distance_codes() {
	let far = fixed_block(|w| {
		w.fixed_lit(u32::from(b'a'));
		w.fixed_lit(257);
		w.code(1, 5);
	});
	assert_eq!(run(&far, 16), Err(InflateError::BadDistance));

	let reserved_dist = fixed_block(|w| {
		w.fixed_lit(u32::from(b'a'));
		w.fixed_lit(257);
		w.code(30, 5);
	});
	assert_eq!(run(&reserved_dist, 16), Err(InflateError::BadDistance));

	let reserved_len = fixed_block(|w| w.fixed_lit(286));
	assert_eq!(run(&reserved_len, 16), Err(InflateError::BadLength));
}

#[test]
fn tree_errors() {
	let mut overfull = BitWriter::zlib();
	overfull.bits(1, 1);
	overfull.bits(2, 2);
	overfull.bits(0, 5);
	overfull.bits(0, 5);
	overfull.bits(0, 4);
	for _ in 0..4 {
		overfull.bits(1, 3);
	}
	assert_eq!(run(&overfull.finish(), 16), Err(InflateError::BadCodeLengthTree));

	let mut repeat = BitWriter::zlib();
	repeat.bits(1, 1);
	repeat.bits(2, 2);
	repeat.bits(0, 5);
	repeat.bits(0, 5);
	repeat.bits(0, 4);
	for len in [1, 1, 0, 0] {
		repeat.bits(len, 3);
	}
	repeat.code(0, 1);
	assert_eq!(run(&repeat.finish(), 16), Err(InflateError::BadCodeLengthRepeat));

	let no_end_of_block = dynamic_block(0, |w| {
		w.code(1, 1);
		w.bits(127, 7);
		w.code(1, 1);
		w.bits(109, 7);
	});
	assert_eq!(run(&no_end_of_block, 16), Err(InflateError::BadLiteralTree));

	let overfull_dist = dynamic_block(2, |w| {
		w.code(0, 1);
		w.code(1, 1);
		w.bits(127, 7);
		w.code(1, 1);
		w.bits(106, 7);
		w.code(0, 1);
		for _ in 0..3 {
			w.code(0, 1);
		}
	});
	assert_eq!(run(&overfull_dist, 16), Err(InflateError::BadDistanceTree));
}

#[test]
fn checksum_and_truncation() {
	let text = sample_text();
	let mut compressed = zlib(&text, Compression::default());

	let half = compressed[..compressed.len() / 2].to_vec();
	assert_eq!(run(&half, text.len()), Err(InflateError::Truncated));

	let last = compressed.len() - 1;
	compressed[last] ^= 0x55;
	assert_eq!(run(&compressed, text.len()), Err(InflateError::ChecksumMismatch));
}

#[test]
fn cancellation_is_prompt() {
	let data = noise(8192);
	let compressed = zlib(&data, Compression::default());
	let seen = Arc::new(AtomicU64::new(0));
	let observed = Arc::clone(&seen);

	let mut source = std::io::Cursor::new(compressed.clone());
	let mut input = InflateInput::from_reader(&mut source, compressed.len() as u64);
	input.buffer_size = 128;
	input.progress_interval_hint = 64;
	input.progress_cb = Some(ProgressCallback::new(move |progress| {
		observed.store(progress.bytes_read, Ordering::SeqCst);
		if progress.bytes_read >= 256 { ProgressResult::Cancel } else { ProgressResult::Continue }
	}));

	let mut dst = vec![0_u8; data.len()];
	let err = inflate(&mut dst, input, &mut InflateRetain::new()).expect_err("cancelled");
	assert_eq!(err, InflateError::Cancelled);
	assert!(seen.load(Ordering::SeqCst) < compressed.len() as u64);
}

#[test]
fn error_codes_are_distinct_and_negative() {
	let all = [
		InflateError::BadHeader,
		InflateError::BadWindowSize,
		InflateError::RequiresDictionary,
		InflateError::BadBlockType,
		InflateError::BadUncompressedLength,
		InflateError::LiteralOverflow,
		InflateError::MatchOverflow,
		InflateError::BadDistance,
		InflateError::BadLength,
		InflateError::BadCodeLengthTree,
		InflateError::BadLiteralTree,
		InflateError::BadDistanceTree,
		InflateError::BadCodeLengthRepeat,
		InflateError::ChecksumMismatch,
		InflateError::Truncated,
		InflateError::Cancelled,
	];
	let mut codes: Vec<i32> = all.iter().map(|err| err.code()).collect();
	assert!(codes.iter().all(|code| *code < 0));
	codes.sort_unstable();
	codes.dedup();
	assert_eq!(codes.len(), all.len());
}
