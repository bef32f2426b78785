use std::io::{BufRead, BufReader, Read};

use crate::fbx::{FbxError, Result};

const MAX_DECOMPRESSED_BYTES: usize = 1024 * 1024 * 1024;
/// zstd frame magic used by `.fbx.zst` files.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Outer compression detected on load input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Plain FBX bytes.
	None,
	/// zstd-wrapped FBX bytes.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}

	/// Detect compression from the leading bytes.
	pub fn detect(bytes: &[u8]) -> Self {
		if bytes.starts_with(&ZSTD_MAGIC) { Self::Zstd } else { Self::None }
	}
}

/// Unwrap zstd input, borrowing plain input unchanged.
pub fn decode_bytes(raw: &[u8], limit: usize) -> Result<(Compression, Option<Vec<u8>>)> {
	match Compression::detect(raw) {
		Compression::None => Ok((Compression::None, None)),
		Compression::Zstd => {
			let decoder = zstd::stream::read::Decoder::new(raw)?;
			Ok((Compression::Zstd, Some(read_limited(decoder, limit)?)))
		}
	}
}

/// Wrap `reader` in a streaming zstd decoder when its first bytes carry the zstd magic.
pub fn decode_reader<'a>(reader: Box<dyn Read + 'a>) -> Result<(Compression, Box<dyn Read + 'a>)> {
	let mut buffered = BufReader::new(reader);
	let head = buffered.fill_buf()?;
	if Compression::detect(head) == Compression::Zstd {
		let decoder = zstd::stream::read::Decoder::with_buffer(buffered)?;
		return Ok((Compression::Zstd, Box::new(decoder)));
	}
	Ok((Compression::None, Box::new(buffered)))
}

fn read_limited(mut decoder: impl Read, limit: usize) -> Result<Vec<u8>> {
	let limit = if limit == 0 { MAX_DECOMPRESSED_BYTES } else { limit.min(MAX_DECOMPRESSED_BYTES) };
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > limit {
			return Err(FbxError::DecompressedTooLarge { limit });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use std::io::Read;

	use crate::fbx::compression::{decode_bytes, decode_reader};
	use crate::fbx::{Compression, ErrorKind};

	#[test]
	fn plain_input_is_borrowed() {
		let (mode, owned) = decode_bytes(b"; FBX 7.4.0 project file", 0).expect("plain");
		assert_eq!(mode, Compression::None);
		assert!(owned.is_none());
	}

	#[test]
	fn zstd_input_is_unwrapped() {
		let packed = zstd::encode_all(&b"Kaydara FBX Binary  "[..], 3).expect("encode");
		let (mode, owned) = decode_bytes(&packed, 0).expect("zstd");
		assert_eq!(mode, Compression::Zstd);
		assert_eq!(owned.as_deref(), Some(&b"Kaydara FBX Binary  "[..]));

		let (mode, mut reader) = decode_reader(Box::new(&packed[..])).expect("reader");
		assert_eq!(mode, Compression::Zstd);
		let mut out = Vec::new();
		reader.read_to_end(&mut out).expect("read");
		assert_eq!(out, b"Kaydara FBX Binary  ");
	}

	#[test]
	fn output_limit_is_enforced() {
		let packed = zstd::encode_all(&[0_u8; 4096][..], 3).expect("encode");
		let err = decode_bytes(&packed, 1000).expect_err("too large");
		assert_eq!(err.kind(), ErrorKind::Unknown);
	}
}
