use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use glam::DVec3;

use crate::fbx::{FbxError, Result};

use super::{CacheChannel, CacheDataEncoding, CacheDataFormat, CacheFrame, GeometryCacheDataOpts, bad_cache};

/// Read up to `max_scalars` scalar components of `frame` from disk.
fn read_scalars(frame: &CacheFrame, max_scalars: usize) -> Result<Vec<f64>> {
	let scalar_bytes = match frame.data_format {
		CacheDataFormat::RealFloat | CacheDataFormat::Vec3Float => 4,
		CacheDataFormat::RealDouble | CacheDataFormat::Vec3Double => 8,
		CacheDataFormat::Unknown => return Err(bad_cache(format!("unknown data format in {}", frame.filename))),
	};
	let big_endian = match frame.data_encoding {
		CacheDataEncoding::LittleEndian => false,
		CacheDataEncoding::BigEndian => true,
		CacheDataEncoding::Unknown => return Err(bad_cache(format!("unknown data encoding in {}", frame.filename))),
	};
	let num_scalars = (frame.data_count * frame.data_format.components()).min(max_scalars);
	let mut raw = vec![0_u8; num_scalars * scalar_bytes];

	let mut file = File::open(frame.filename.as_ref()).map_err(|err| match err.kind() {
		std::io::ErrorKind::NotFound => FbxError::FileNotFound {
			path: frame.filename.to_string(),
		},
		_ => FbxError::Io(err),
	})?;
	file.seek(SeekFrom::Start(frame.data_offset))?;
	file.read_exact(&mut raw)?;

	let scalars = raw
		.chunks_exact(scalar_bytes)
		.map(|chunk| match (scalar_bytes, big_endian) {
			(4, false) => f64::from(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])),
			(4, true) => f64::from(f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])),
			(_, false) => f64::from_le_bytes(std::array::from_fn(|i| chunk[i])),
			(_, true) => f64::from_be_bytes(std::array::from_fn(|i| chunk[i])),
		})
		.collect();
	Ok(scalars)
}

/// Multiplier for samples of `frame`.
fn sample_scale(frame: &CacheFrame, opts: &GeometryCacheDataOpts) -> f64 {
	let weight = if opts.use_weight { opts.weight } else { 1.0 };
	let scale = if opts.ignore_transform { 1.0 } else { frame.scale_factor };
	weight * scale
}

/// Read scalar samples of `frame` into `out`, returning the count written.
///
/// Triples are flattened into their components.
pub fn read_geometry_cache_real(frame: &CacheFrame, out: &mut [f64], opts: &GeometryCacheDataOpts) -> Result<usize> {
	let scalars = read_scalars(frame, out.len())?;
	let scale = sample_scale(frame, opts);
	for (dst, value) in out.iter_mut().zip(&scalars) {
		if opts.additive {
			*dst += value * scale;
		} else {
			*dst = value * scale;
		}
	}
	Ok(scalars.len())
}

/// Read vector samples of `frame` into `out`, returning the count written.
///
/// Scalar data is grouped into consecutive triples.
pub fn read_geometry_cache_vec3(frame: &CacheFrame, out: &mut [DVec3], opts: &GeometryCacheDataOpts) -> Result<usize> {
	let scalars = read_scalars(frame, out.len() * 3)?;
	let scale = sample_scale(frame, opts);
	let mut written = 0;
	for (dst, value) in out.iter_mut().zip(scalars.chunks_exact(3)) {
		let value = DVec3::new(value[0], value[1], value[2]) * scale;
		if opts.additive {
			*dst += value;
		} else {
			*dst = value;
		}
		written += 1;
	}
	Ok(written)
}

/// Blend the two frames bracketing `time` into `out`.
fn sample_channel<T>(
	channel: &CacheChannel,
	time: f64,
	out: &mut [T],
	opts: &GeometryCacheDataOpts,
	read: fn(&CacheFrame, &mut [T], &GeometryCacheDataOpts) -> Result<usize>,
) -> Result<usize> {
	let frames = &channel.frames;
	let Some(last) = frames.last() else {
		return Ok(0);
	};
	let next = frames.partition_point(|frame| frame.time <= time);
	if next == 0 {
		return read(&frames[0], out, opts);
	}
	if next == frames.len() {
		return read(last, out, opts);
	}

	let (a, b) = (&frames[next - 1], &frames[next]);
	let t = (time - a.time) / (b.time - a.time);
	if t <= f64::EPSILON {
		return read(a, out, opts);
	}
	let weight = if opts.use_weight { opts.weight } else { 1.0 };
	let first_opts = GeometryCacheDataOpts {
		use_weight: true,
		weight: weight * (1.0 - t),
		..*opts
	};
	let written = read(a, out, &first_opts)?;
	let second_opts = GeometryCacheDataOpts {
		additive: true,
		use_weight: true,
		weight: weight * t,
		..*opts
	};
	read(b, &mut out[..written], &second_opts)
}

/// Scalar samples of `channel` at `time`, linearly interpolated between frames.
pub fn sample_geometry_cache_real(
	channel: &CacheChannel,
	time: f64,
	out: &mut [f64],
	opts: &GeometryCacheDataOpts,
) -> Result<usize> {
	sample_channel(channel, time, out, opts, read_geometry_cache_real)
}

/// Vector samples of `channel` at `time`, linearly interpolated between frames.
///
/// Times outside the cached range hold the first or last frame.
pub fn sample_geometry_cache_vec3(
	channel: &CacheChannel,
	time: f64,
	out: &mut [DVec3],
	opts: &GeometryCacheDataOpts,
) -> Result<usize> {
	sample_channel(channel, time, out, opts, read_geometry_cache_vec3)
}
