use std::path::PathBuf;

use fbxdoc::fbx::{
	CacheChannel, FbxError, GeometryCache, GeometryCacheDataOpts, GeometryCacheOpts, Result, load_geometry_cache,
	sample_geometry_cache_vec3,
};
use glam::DVec3;

use crate::cmd::util::{emit_json, vec3, vec3_text};

#[derive(clap::Args)]
pub struct Args {
	/// `.pc2`, `.mc`/`.mcx` or `.xml` cache file.
	pub path: PathBuf,
	/// Frame rate for point caches and per-frame file names.
	#[arg(long, default_value_t = 30.0)]
	pub fps: f64,
	/// Sample this time in seconds.
	#[arg(long)]
	pub time: Option<f64>,
	/// Channel to sample, defaulting to the first.
	#[arg(long)]
	pub channel: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List cache channels, or sample one channel at a time.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		fps,
		time,
		channel,
		json,
	} = args;

	let opts = GeometryCacheOpts {
		frames_per_second: fps,
		..GeometryCacheOpts::default()
	};
	let cache = load_geometry_cache(&path, &opts)?;
	log::debug!("{} channels, {} frames", cache.channels.len(), cache.num_frames());

	let samples = match time {
		Some(time) => Some(sample(&cache, channel.as_deref(), time)?),
		None => None,
	};

	if json {
		emit_json(&CacheJson {
			root_filename: cache.root_filename.to_string(),
			channels: cache.channels.iter().map(channel_json).collect(),
			samples,
		});
		return Ok(());
	}

	println!("{}", cache.root_filename);
	for channel in cache.channels.iter().map(channel_json) {
		println!(
			"  {} [{}] frames={} points={} time={}..{} format={}",
			channel.name,
			channel.interpretation,
			channel.frames,
			channel.points,
			channel.time_begin,
			channel.time_end,
			channel.data_format
		);
	}
	if let Some(samples) = samples {
		println!("{} at {}:", samples.channel, samples.time);
		for (index, value) in samples.values.iter().enumerate() {
			println!("  {index:>6} {}", vec3_text(DVec3::from(*value)));
		}
	}
	Ok(())
}

fn sample(cache: &GeometryCache, name: Option<&str>, time: f64) -> Result<SamplesJson> {
	let channel = match name {
		Some(name) => cache.channel(name),
		None => cache.channels.first(),
	}
	.ok_or_else(|| FbxError::BadElement {
		name: name.unwrap_or("<first>").to_owned(),
		reason: "no cache channel with this name",
	})?;

	let mut out = vec![DVec3::ZERO; point_count(channel)];
	let written = sample_geometry_cache_vec3(channel, time, &mut out, &GeometryCacheDataOpts::default())?;
	out.truncate(written);
	Ok(SamplesJson {
		channel: channel.name.to_string(),
		time,
		values: out.into_iter().map(vec3).collect(),
	})
}

fn point_count(channel: &CacheChannel) -> usize {
	channel.frames.iter().map(|frame| frame.data_count).max().unwrap_or(0)
}

fn channel_json(channel: &CacheChannel) -> ChannelJson {
	ChannelJson {
		name: channel.name.to_string(),
		interpretation: channel.interpretation_name.to_string(),
		frames: channel.frames.len(),
		points: point_count(channel),
		time_begin: channel.frames.first().map_or(0.0, |frame| frame.time),
		time_end: channel.frames.last().map_or(0.0, |frame| frame.time),
		data_format: channel.frames.first().map_or("unknown", |frame| frame.data_format.as_str()),
	}
}

#[derive(serde::Serialize)]
struct CacheJson {
	root_filename: String,
	channels: Vec<ChannelJson>,
	samples: Option<SamplesJson>,
}

#[derive(serde::Serialize)]
struct ChannelJson {
	name: String,
	interpretation: String,
	frames: usize,
	points: usize,
	time_begin: f64,
	time_end: f64,
	data_format: &'static str,
}

#[derive(serde::Serialize)]
struct SamplesJson {
	channel: String,
	time: f64,
	values: Vec<[f64; 3]>,
}

#[cfg(test)]
mod tests {
	use fbxdoc_testkit::temp_file;

	use crate::cmd::test_support::run_fbxdoc_json;

	/// Two points over two samples, moving from x=0 to x=2.
	fn point_cache() -> Vec<u8> {
		let mut bytes = b"POINTCACHE2\0".to_vec();
		bytes.extend(1_i32.to_le_bytes());
		bytes.extend(2_i32.to_le_bytes());
		bytes.extend(0.0_f32.to_le_bytes());
		bytes.extend(1.0_f32.to_le_bytes());
		bytes.extend(2_i32.to_le_bytes());
		for x in [0.0_f32, 2.0] {
			for point in [[x, 0.0, 0.0], [x, 1.0, 0.0]] {
				for value in point {
					bytes.extend(value.to_le_bytes());
				}
			}
		}
		bytes
	}

	#[test]
	fn cache_lists_point_cache_channel() {
		let path = temp_file("wave.pc2", &point_cache());
		let json = run_fbxdoc_json(&["cache", &path.display().to_string(), "--fps", "10", "--json"]);

		let channel = &json["channels"][0];
		let name = channel["name"].as_str().expect("name");
		assert!(name.ends_with("wave"), "channel named after the file stem: {name}");
		assert_eq!(channel["frames"], 2);
		assert_eq!(channel["points"], 2);
		assert_eq!(channel["data_format"], "vec3_float");
		assert!((channel["time_end"].as_f64().expect("end") - 0.1).abs() < 1e-9);
		assert!(json["samples"].is_null());
	}

	#[test]
	fn cache_samples_between_frames() {
		let path = temp_file("wave_sample.pc2", &point_cache());
		let json = run_fbxdoc_json(&[
			"cache",
			&path.display().to_string(),
			"--fps",
			"10",
			"--time",
			"0.05",
			"--json",
		]);

		let values = json["samples"]["values"].as_array().expect("values");
		assert_eq!(values.len(), 2);
		let x = values[1][0].as_f64().expect("x");
		let y = values[1][1].as_f64().expect("y");
		assert!((x - 1.0).abs() < 1e-6, "x = {x}");
		assert!((y - 1.0).abs() < 1e-6, "y = {y}");
	}
}
