use std::sync::Arc;

use crate::fbx::bytes::Cursor;
use crate::fbx::{Endianness, Result};

use super::{CacheDataEncoding, CacheDataFormat, CacheFrame, GeometryCacheOpts, MAYA_TICKS_PER_SECOND, bad_cache};

/// Chunk framing of the two container flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
	/// `FOR4`: 32-bit sizes, 4-byte alignment.
	For4,
	/// `FOR8`: 64-bit sizes, 8-byte alignment.
	For8,
}

impl Framing {
	fn word(self) -> usize {
		match self {
			Self::For4 => 4,
			Self::For8 => 8,
		}
	}

	fn is_group(self, tag: &[u8; 4]) -> bool {
		match self {
			Self::For4 => tag == b"FOR4",
			Self::For8 => tag == b"FOR8",
		}
	}
}

/// Tag, payload offset and payload length.
struct ChunkHeader {
	tag: [u8; 4],
	offset: usize,
	len: usize,
}

fn read_header(cursor: &mut Cursor<'_>, framing: Framing) -> Result<ChunkHeader> {
	let tag = cursor.read_code4()?;
	cursor.align(framing.word())?;
	let len = match framing {
		Framing::For4 => cursor.read_u32(Endianness::Big)? as usize,
		Framing::For8 => usize::try_from(cursor.read_u64(Endianness::Big)?)
			.map_err(|_| bad_cache("chunk size does not fit in memory"))?,
	};
	if len > cursor.remaining() {
		return Err(bad_cache(format!(
			"chunk {} at {} claims {len} bytes, {} remain",
			String::from_utf8_lossy(&tag),
			cursor.pos(),
			cursor.remaining()
		)));
	}
	Ok(ChunkHeader {
		tag,
		offset: cursor.pos(),
		len,
	})
}

fn data_format(tag: &[u8; 4]) -> Option<CacheDataFormat> {
	match tag {
		b"FVCA" => Some(CacheDataFormat::Vec3Float),
		b"DVCA" => Some(CacheDataFormat::Vec3Double),
		b"FBCA" => Some(CacheDataFormat::RealFloat),
		b"DBCA" => Some(CacheDataFormat::RealDouble),
		_ => None,
	}
}

/// Values carried between chunks.
struct State<'a> {
	filename: &'a Arc<str>,
	time: f64,
	channel: Arc<str>,
	count: Option<usize>,
	scale_factor: f64,
}

fn read_chunks(
	cursor: &mut Cursor<'_>,
	bytes: &[u8],
	end: usize,
	framing: Framing,
	state: &mut State<'_>,
	frames: &mut Vec<CacheFrame>,
) -> Result<()> {
	while cursor.pos() < end {
		let header = read_header(cursor, framing)?;
		let payload = &bytes[header.offset..header.offset + header.len];
		if framing.is_group(&header.tag) {
			// Group payloads open with a type tag such as `CACH` or `MYCH`.
			cursor.skip(4)?;
			cursor.align(framing.word())?;
			read_chunks(cursor, bytes, header.offset + header.len, framing, state, frames)?;
		} else {
			match &header.tag {
				b"TIME" => {
					let tick = Cursor::new(payload).read_i32(Endianness::Big)?;
					state.time = f64::from(tick) / MAYA_TICKS_PER_SECOND;
				}
				b"CHNM" => {
					let name = payload.split(|&byte| byte == 0).next().unwrap_or_default();
					state.channel = Arc::from(String::from_utf8_lossy(name).as_ref());
					state.count = None;
				}
				b"SIZE" => {
					let count = Cursor::new(payload).read_u32(Endianness::Big)?;
					state.count = Some(count as usize);
				}
				tag => {
					if let Some(format) = data_format(tag) {
						frames.push(data_frame(state, format, &header)?);
					}
				}
			}
			cursor.skip(header.len)?;
		}
		skip_padding(cursor, framing.word())?;
	}
	Ok(())
}

/// Skip alignment padding, tolerating files that end without it.
fn skip_padding(cursor: &mut Cursor<'_>, word: usize) -> Result<()> {
	let padding = cursor.pos().next_multiple_of(word) - cursor.pos();
	cursor.skip(padding.min(cursor.remaining()))
}

fn data_frame(state: &State<'_>, format: CacheDataFormat, header: &ChunkHeader) -> Result<CacheFrame> {
	let element_bytes = format.element_bytes();
	let count = state.count.unwrap_or(header.len / element_bytes);
	let total = count * element_bytes;
	if total > header.len {
		return Err(bad_cache(format!(
			"channel {} holds {} bytes for {count} elements",
			state.channel, header.len
		)));
	}
	Ok(CacheFrame {
		channel: Arc::clone(&state.channel),
		time: state.time,
		filename: Arc::clone(state.filename),
		data_format: format,
		data_encoding: CacheDataEncoding::BigEndian,
		data_offset: header.offset as u64,
		data_count: count,
		data_element_bytes: element_bytes,
		data_total_bytes: total as u64,
		scale_factor: state.scale_factor,
	})
}

/// Index every data chunk of a Maya cache file.
///
/// `TIME` chunks set the time of the data that follows; files written one
/// per frame may carry none, in which case `default_time` applies.
pub(super) fn read_frames(
	bytes: &[u8],
	filename: &Arc<str>,
	default_time: Option<f64>,
	opts: &GeometryCacheOpts,
	frames: &mut Vec<CacheFrame>,
) -> Result<()> {
	let framing = if bytes.starts_with(b"FOR8") { Framing::For8 } else { Framing::For4 };
	let mut state = State {
		filename,
		time: default_time.unwrap_or(0.0),
		channel: Arc::from(""),
		count: None,
		scale_factor: opts.scale_factor,
	};
	let mut cursor = Cursor::new(bytes);
	let before = frames.len();
	read_chunks(&mut cursor, bytes, bytes.len(), framing, &mut state, frames)?;
	log::trace!("maya cache {filename}: {} frames", frames.len() - before);
	Ok(())
}
