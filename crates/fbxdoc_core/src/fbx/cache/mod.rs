//! Geometry cache files referenced by cache deformers.
//!
//! Loading only indexes the frames of a cache; sample data stays on disk
//! and is read on demand by [`read_geometry_cache_vec3`] and friends.

#[cfg(feature = "geometry-cache")]
mod mc;
#[cfg(feature = "geometry-cache")]
mod pc2;
mod sample;
#[cfg(feature = "geometry-cache")]
mod xml;

use std::path::Path;
use std::sync::Arc;

use crate::fbx::{FbxError, Result};

/// Sample data read by [`read_geometry_cache_real`] and [`sample_geometry_cache_vec3`].
pub use sample::{read_geometry_cache_real, read_geometry_cache_vec3, sample_geometry_cache_real, sample_geometry_cache_vec3};

/// Maya cache ticks per second.
pub(crate) const MAYA_TICKS_PER_SECOND: f64 = 6000.0;

/// Element type of stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheDataFormat {
	/// Unrecognized.
	#[default]
	Unknown,
	/// `f32` scalars.
	RealFloat,
	/// `f32` triples.
	Vec3Float,
	/// `f64` scalars.
	RealDouble,
	/// `f64` triples.
	Vec3Double,
}

impl CacheDataFormat {
	/// Bytes of one element.
	pub fn element_bytes(self) -> usize {
		match self {
			Self::Unknown => 0,
			Self::RealFloat => 4,
			Self::Vec3Float => 12,
			Self::RealDouble => 8,
			Self::Vec3Double => 24,
		}
	}

	/// Scalars per element.
	pub fn components(self) -> usize {
		match self {
			Self::Unknown => 0,
			Self::RealFloat | Self::RealDouble => 1,
			Self::Vec3Float | Self::Vec3Double => 3,
		}
	}

	/// Stable lowercase name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::RealFloat => "real_float",
			Self::Vec3Float => "vec3_float",
			Self::RealDouble => "real_double",
			Self::Vec3Double => "vec3_double",
		}
	}
}

/// Byte order of stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheDataEncoding {
	/// Unrecognized.
	#[default]
	Unknown,
	/// Little-endian.
	LittleEndian,
	/// Big-endian.
	BigEndian,
}

/// Meaning of a channel's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheInterpretation {
	/// Unrecognized.
	#[default]
	Unknown,
	/// Free-standing points.
	Points,
	/// Mesh vertex positions.
	VertexPosition,
	/// Mesh vertex normals.
	VertexNormal,
}

impl CacheInterpretation {
	/// Parse a `ChannelInterpretation` attribute.
	pub fn from_name(name: &str) -> Self {
		match name {
			"points" => Self::Points,
			"positions" => Self::VertexPosition,
			"normals" => Self::VertexNormal,
			_ => Self::Unknown,
		}
	}
}

/// Location of one sample block on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheFrame {
	/// Channel name.
	pub channel: Arc<str>,
	/// Time in seconds.
	pub time: f64,
	/// File holding the samples.
	pub filename: Arc<str>,
	/// Element type.
	pub data_format: CacheDataFormat,
	/// Byte order.
	pub data_encoding: CacheDataEncoding,
	/// Byte offset of the first element.
	pub data_offset: u64,
	/// Element count.
	pub data_count: usize,
	/// Bytes per element.
	pub data_element_bytes: usize,
	/// Bytes of the whole block.
	pub data_total_bytes: u64,
	/// Scale applied to samples unless transforms are ignored.
	pub scale_factor: f64,
}

/// Named sequence of frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheChannel {
	/// Channel name.
	pub name: Arc<str>,
	/// Parsed interpretation.
	pub interpretation: CacheInterpretation,
	/// Interpretation as written in the file.
	pub interpretation_name: Arc<str>,
	/// Frames sorted by time.
	pub frames: Vec<CacheFrame>,
}

/// Index of a loaded geometry cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryCache {
	/// Path the cache was loaded from.
	pub root_filename: Arc<str>,
	/// Channels sorted by name.
	pub channels: Vec<CacheChannel>,
}

impl GeometryCache {
	/// Channel named `name`.
	pub fn channel(&self, name: &str) -> Option<&CacheChannel> {
		self.channels.iter().find(|channel| channel.name.as_ref() == name)
	}

	/// Total frame count over every channel.
	pub fn num_frames(&self) -> usize {
		self.channels.iter().map(|channel| channel.frames.len()).sum()
	}
}

/// Options for [`load_geometry_cache`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCacheOpts {
	/// Frame rate used for PC2 sample times and per-frame file names.
	pub frames_per_second: f64,
	/// Scale applied to every sample.
	pub scale_factor: f64,
	/// Cap on indexed frames, `0` for no limit.
	pub max_frames: usize,
}

impl Default for GeometryCacheOpts {
	fn default() -> Self {
		Self {
			frames_per_second: 30.0,
			scale_factor: 1.0,
			max_frames: 0,
		}
	}
}

/// Options for reading sample data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryCacheDataOpts {
	/// Add samples to the output instead of replacing it.
	pub additive: bool,
	/// Scale samples by `weight`.
	pub use_weight: bool,
	/// Sample weight when `use_weight` is set.
	pub weight: f64,
	/// Skip the cache's `scale_factor`.
	pub ignore_transform: bool,
}

impl Default for GeometryCacheDataOpts {
	fn default() -> Self {
		Self {
			additive: false,
			use_weight: false,
			weight: 1.0,
			ignore_transform: false,
		}
	}
}

/// Index the geometry cache at `path`.
///
/// The format is detected from the file contents: `POINTCACHE2` files,
/// Maya `FOR4`/`FOR8` caches, and XML manifests naming one cache file or one
/// file per frame.
pub fn load_geometry_cache(path: impl AsRef<Path>, opts: &GeometryCacheOpts) -> Result<GeometryCache> {
	#[cfg(feature = "geometry-cache")]
	{
		load_indexed(path.as_ref(), opts)
	}
	#[cfg(not(feature = "geometry-cache"))]
	{
		let _ = (path, opts);
		Err(FbxError::FeatureDisabled {
			feature: "geometry-cache",
		})
	}
}

#[cfg(feature = "geometry-cache")]
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
	std::fs::read(path).map_err(|err| match err.kind() {
		std::io::ErrorKind::NotFound => FbxError::FileNotFound {
			path: path.display().to_string(),
		},
		_ => FbxError::Io(err),
	})
}

pub(crate) fn bad_cache(reason: impl Into<String>) -> FbxError {
	FbxError::BadCache { reason: reason.into() }
}

#[cfg(feature = "geometry-cache")]
fn load_indexed(path: &Path, opts: &GeometryCacheOpts) -> Result<GeometryCache> {
	let bytes = read_file(path)?;
	let filename: Arc<str> = Arc::from(path.display().to_string());
	let mut frames = Vec::new();
	let mut interpretations: Vec<(Arc<str>, Arc<str>)> = Vec::new();

	if bytes.starts_with(pc2::MAGIC) {
		let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
		pc2::read_frames(&bytes, &filename, &stem, opts, &mut frames)?;
		interpretations.push((Arc::from(stem), Arc::from("positions")));
	} else if bytes.starts_with(b"FOR4") || bytes.starts_with(b"FOR8") {
		mc::read_frames(&bytes, &filename, None, opts, &mut frames)?;
	} else if xml::looks_like_xml(&bytes) {
		let manifest = xml::parse_manifest(&String::from_utf8_lossy(&bytes))?;
		xml::read_frames(path, &manifest, opts, &mut frames)?;
		interpretations = manifest
			.channels
			.iter()
			.map(|channel| (Arc::clone(&channel.name), Arc::clone(&channel.interpretation)))
			.collect();
	} else {
		return Err(bad_cache(format!("{} is not a PC2, MC or XML cache", path.display())));
	}

	if opts.max_frames > 0 && frames.len() > opts.max_frames {
		return Err(bad_cache(format!("{} frames exceed the limit of {}", frames.len(), opts.max_frames)));
	}
	let cache = GeometryCache {
		root_filename: filename,
		channels: group_channels(frames, &interpretations),
	};
	log::debug!(
		"indexed geometry cache {} with {} channels and {} frames",
		cache.root_filename,
		cache.channels.len(),
		cache.num_frames()
	);
	Ok(cache)
}

/// Group frames by channel, sorting channels by name and frames by time.
fn group_channels(mut frames: Vec<CacheFrame>, interpretations: &[(Arc<str>, Arc<str>)]) -> Vec<CacheChannel> {
	frames.sort_by(|a, b| a.channel.cmp(&b.channel).then_with(|| a.time.total_cmp(&b.time)));
	let mut channels: Vec<CacheChannel> = Vec::new();
	for frame in frames {
		match channels.last_mut() {
			Some(channel) if channel.name == frame.channel => channel.frames.push(frame),
			_ => {
				let name = Arc::clone(&frame.channel);
				let interpretation_name = interpretations
					.iter()
					.find(|(channel, _)| *channel == name)
					.map_or_else(|| Arc::from(""), |(_, interpretation)| Arc::clone(interpretation));
				channels.push(CacheChannel {
					interpretation: CacheInterpretation::from_name(&interpretation_name),
					interpretation_name,
					name,
					frames: vec![frame],
				});
			}
		}
	}
	channels
}

#[cfg(test)]
mod tests;
