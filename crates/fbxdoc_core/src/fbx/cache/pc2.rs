use std::sync::Arc;

use crate::fbx::bytes::Cursor;
use crate::fbx::{Endianness, Result};

use super::{CacheDataEncoding, CacheDataFormat, CacheFrame, GeometryCacheOpts, bad_cache};

/// `POINTCACHE2` signature including its terminator.
pub(super) const MAGIC: &[u8] = b"POINTCACHE2\0";

const HEADER_SIZE: u64 = 32;

/// One frame per sample, little-endian `f32` triples after a fixed header.
///
/// Sample `i` sits at frame `start + i * rate` of the scene frame rate.
pub(super) fn read_frames(
	bytes: &[u8],
	filename: &Arc<str>,
	channel: &str,
	opts: &GeometryCacheOpts,
	frames: &mut Vec<CacheFrame>,
) -> Result<()> {
	let mut cursor = Cursor::new(bytes);
	cursor.skip(MAGIC.len())?;
	let version = cursor.read_i32(Endianness::Little)?;
	let num_points = cursor.read_i32(Endianness::Little)?;
	let start_frame = f64::from(cursor.read_f32(Endianness::Little)?);
	let sample_rate = f64::from(cursor.read_f32(Endianness::Little)?);
	let num_samples = cursor.read_i32(Endianness::Little)?;
	if version != 1 {
		log::warn!("point cache {filename} has unexpected version {version}");
	}
	let (Ok(num_points), Ok(num_samples)) = (usize::try_from(num_points), usize::try_from(num_samples)) else {
		return Err(bad_cache(format!("point cache {filename} has a negative count")));
	};

	let element_bytes = CacheDataFormat::Vec3Float.element_bytes();
	let sample_bytes = (num_points * element_bytes) as u64;
	let available = bytes.len() as u64 - HEADER_SIZE;
	if sample_bytes * num_samples as u64 > available {
		return Err(bad_cache(format!(
			"point cache {filename} declares {num_samples} samples of {num_points} points but holds {available} bytes"
		)));
	}

	let fps = if opts.frames_per_second > 0.0 { opts.frames_per_second } else { 30.0 };
	let channel: Arc<str> = Arc::from(channel);
	frames.extend((0..num_samples).map(|index| CacheFrame {
		channel: Arc::clone(&channel),
		time: (start_frame + index as f64 * sample_rate) / fps,
		filename: Arc::clone(filename),
		data_format: CacheDataFormat::Vec3Float,
		data_encoding: CacheDataEncoding::LittleEndian,
		data_offset: HEADER_SIZE + index as u64 * sample_bytes,
		data_count: num_points,
		data_element_bytes: element_bytes,
		data_total_bytes: sample_bytes,
		scale_factor: opts.scale_factor,
	}));
	Ok(())
}
