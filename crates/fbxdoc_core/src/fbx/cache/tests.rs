use fbxdoc_testkit::temp_file;
use glam::DVec3;

use crate::fbx::{
	CacheDataEncoding, CacheDataFormat, CacheInterpretation, FbxError, GeometryCacheDataOpts, GeometryCacheOpts,
	load_geometry_cache, read_geometry_cache_vec3, sample_geometry_cache_real, sample_geometry_cache_vec3,
};

fn pc2(start: f32, rate: f32, samples: &[Vec<[f32; 3]>]) -> Vec<u8> {
	let num_points = samples.first().map_or(0, |sample| sample.len());
	let mut bytes = b"POINTCACHE2\0".to_vec();
	bytes.extend(1_i32.to_le_bytes());
	bytes.extend((num_points as i32).to_le_bytes());
	bytes.extend(start.to_le_bytes());
	bytes.extend(rate.to_le_bytes());
	bytes.extend((samples.len() as i32).to_le_bytes());
	for sample in samples {
		for point in sample {
			for value in point {
				bytes.extend(value.to_le_bytes());
			}
		}
	}
	bytes
}

fn chunk4(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
	let mut bytes = tag.to_vec();
	bytes.extend((payload.len() as u32).to_be_bytes());
	bytes.extend(payload);
	bytes.resize(bytes.len().next_multiple_of(4), 0);
	bytes
}

fn group4(kind: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
	let mut payload = kind.to_vec();
	payload.extend(children.concat());
	chunk4(b"FOR4", &payload)
}

fn chunk8(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
	let mut bytes = tag.to_vec();
	bytes.extend([0; 4]);
	bytes.extend((payload.len() as u64).to_be_bytes());
	bytes.extend(payload);
	bytes.resize(bytes.len().next_multiple_of(8), 0);
	bytes
}

fn group8(kind: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
	let mut payload = kind.to_vec();
	payload.extend([0; 4]);
	payload.extend(children.concat());
	chunk8(b"FOR8", &payload)
}

fn be_f32s(values: &[f32]) -> Vec<u8> {
	values.iter().flat_map(|value| value.to_be_bytes()).collect()
}

/// One-point channel frame: optional `TIME`, then name, size and data.
fn mych(tick: Option<i32>, channel: &str, point: [f32; 3]) -> Vec<u8> {
	let mut children = Vec::new();
	if let Some(tick) = tick {
		children.push(chunk4(b"TIME", &tick.to_be_bytes()));
	}
	children.push(chunk4(b"CHNM", format!("{channel}\0").as_bytes()));
	children.push(chunk4(b"SIZE", &1_u32.to_be_bytes()));
	children.push(chunk4(b"FVCA", &be_f32s(&point)));
	group4(b"MYCH", &children)
}

fn cach_header() -> Vec<u8> {
	group4(
		b"CACH",
		&[
			chunk4(b"VRSN", b"0.1\0"),
			chunk4(b"STIM", &0_i32.to_be_bytes()),
			chunk4(b"ETIM", &6000_i32.to_be_bytes()),
		],
	)
}

fn manifest(cache_type: &str, channel: &str) -> String {
	format!(
		r#"<?xml version="1.0"?>
<Autodesk_Cache_File>
  <!-- written by a test -->
  <cacheType Type="{cache_type}" Format="mcc"/>
  <time Range="0-6000"/>
  <Channels>
    <channel0 ChannelName="{channel}" ChannelType="FloatVectorArray" ChannelInterpretation="positions"/>
  </Channels>
</Autodesk_Cache_File>
"#
	)
}

fn approx(a: DVec3, b: DVec3) -> bool {
	(a - b).length() < 1e-6
}

#[test]
fn point_cache_frames_follow_start_and_rate() {
	let bytes = pc2(
		10.0,
		1.0,
		&[
			vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
			vec![[2.0, 0.0, 0.0], [3.0, 1.0, 1.0]],
			vec![[4.0, 0.0, 0.0], [5.0, 1.0, 1.0]],
		],
	);
	let path = temp_file("wave.pc2", &bytes);
	let cache = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect("pc2 loads");

	assert_eq!(cache.channels.len(), 1);
	let channel = &cache.channels[0];
	assert!(channel.name.ends_with("wave"));
	assert_eq!(channel.interpretation, CacheInterpretation::VertexPosition);
	assert_eq!(channel.frames.len(), 3);
	assert!((channel.frames[2].time - 12.0 / 30.0).abs() < 1e-9);
	assert_eq!(channel.frames[1].data_offset, 32 + 24);
	assert_eq!(channel.frames[0].data_encoding, CacheDataEncoding::LittleEndian);

	let mut out = [DVec3::ZERO; 2];
	let written = sample_geometry_cache_vec3(channel, 10.5 / 30.0, &mut out, &GeometryCacheDataOpts::default())
		.expect("sample between frames");
	assert_eq!(written, 2);
	assert!(approx(out[0], DVec3::new(1.0, 0.0, 0.0)));
	assert!(approx(out[1], DVec3::new(2.0, 1.0, 1.0)));

	let written = sample_geometry_cache_vec3(channel, 100.0, &mut out, &GeometryCacheDataOpts::default())
		.expect("sample past the end");
	assert_eq!(written, 2);
	assert!(approx(out[0], DVec3::new(4.0, 0.0, 0.0)));

	let mut flat = [0.0; 4];
	let written = sample_geometry_cache_real(channel, 0.0, &mut flat, &GeometryCacheDataOpts::default())
		.expect("scalar sample");
	assert_eq!(written, 4);
	assert_eq!(flat, [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn weighted_reads_add_onto_existing_values() {
	let path = temp_file("weighted.pc2", &pc2(0.0, 1.0, &[vec![[2.0, 4.0, 6.0]]]));
	let cache = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect("pc2 loads");
	let frame = &cache.channels[0].frames[0];

	let mut out = [DVec3::ONE];
	let opts = GeometryCacheDataOpts {
		additive: true,
		use_weight: true,
		weight: 0.5,
		ignore_transform: false,
	};
	read_geometry_cache_vec3(frame, &mut out, &opts).expect("additive read");
	assert!(approx(out[0], DVec3::new(2.0, 3.0, 4.0)));

	let scaled = load_geometry_cache(
		&path,
		&GeometryCacheOpts {
			scale_factor: 10.0,
			..GeometryCacheOpts::default()
		},
	)
	.expect("scaled load");
	let mut out = [DVec3::ZERO];
	read_geometry_cache_vec3(&scaled.channels[0].frames[0], &mut out, &GeometryCacheDataOpts::default())
		.expect("scaled read");
	assert!(approx(out[0], DVec3::new(20.0, 40.0, 60.0)));
}

#[test]
fn one_file_manifest_indexes_timed_channel_frames() {
	let mc = [
		cach_header(),
		mych(Some(0), "pSphereShape1", [0.0, 0.0, 0.0]),
		mych(Some(6000), "pSphereShape1", [2.0, 4.0, 0.0]),
	]
	.concat();
	temp_file("onefile.mc", &mc);
	let path = temp_file("onefile.xml", manifest("OneFile", "pSphereShape1").as_bytes());
	let cache = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect("manifest loads");

	let channel = cache.channel("pSphereShape1").expect("named channel");
	assert_eq!(channel.interpretation, CacheInterpretation::VertexPosition);
	assert_eq!(channel.interpretation_name.as_ref(), "positions");
	assert_eq!(channel.frames.len(), 2);
	assert_eq!(channel.frames[1].time, 1.0);
	assert_eq!(channel.frames[0].data_format, CacheDataFormat::Vec3Float);
	assert_eq!(channel.frames[0].data_encoding, CacheDataEncoding::BigEndian);

	let mut out = [DVec3::ZERO];
	sample_geometry_cache_vec3(channel, 0.25, &mut out, &GeometryCacheDataOpts::default()).expect("sample");
	assert!(approx(out[0], DVec3::new(0.5, 1.0, 0.0)));
}

#[test]
fn per_frame_manifest_reads_times_from_file_names() {
	// No TIME chunks, so the file names decide.
	let untimed = |x: f32| {
		[
			group4(b"CACH", &[chunk4(b"VRSN", b"0.1\0")]),
			mych(None, "shape", [x, 0.0, 0.0]),
		]
		.concat()
	};
	temp_file("perframeFrame1.mc", &untimed(1.0));
	temp_file("perframeFrame2Tick3000.mc", &untimed(3.0));
	temp_file("perframeFrame2.txt", b"not a cache");
	let path = temp_file("perframe.xml", manifest("OneFilePerFrame", "shape").as_bytes());

	let opts = GeometryCacheOpts {
		frames_per_second: 24.0,
		..GeometryCacheOpts::default()
	};
	let cache = load_geometry_cache(&path, &opts).expect("per-frame manifest loads");
	let channel = cache.channel("shape").expect("channel");
	assert_eq!(channel.frames.len(), 2);
	assert!((channel.frames[0].time - 1.0 / 24.0).abs() < 1e-12);
	assert!((channel.frames[1].time - (2.0 / 24.0 + 0.5)).abs() < 1e-12);
	assert_ne!(channel.frames[0].filename, channel.frames[1].filename);
}

#[test]
fn for8_container_with_double_vectors() {
	let data: Vec<u8> = [1.5_f64, -2.0, 8.0].iter().flat_map(|value| value.to_be_bytes()).collect();
	let bytes = [
		group8(b"CACH", &[chunk8(b"VRSN", b"0.1\0")]),
		group8(
			b"MYCH",
			&[
				chunk8(b"TIME", &12000_i32.to_be_bytes()),
				chunk8(b"CHNM", b"cloth\0"),
				chunk8(b"SIZE", &1_u32.to_be_bytes()),
				chunk8(b"DVCA", &data),
			],
		),
	]
	.concat();
	let path = temp_file("wide.mcx", &bytes);
	let cache = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect("FOR8 loads");

	let channel = cache.channel("cloth").expect("channel");
	assert_eq!(channel.interpretation, CacheInterpretation::Unknown);
	let frame = &channel.frames[0];
	assert_eq!(frame.time, 2.0);
	assert_eq!(frame.data_format, CacheDataFormat::Vec3Double);
	let mut out = [DVec3::ZERO];
	read_geometry_cache_vec3(frame, &mut out, &GeometryCacheDataOpts::default()).expect("read doubles");
	assert_eq!(out[0], DVec3::new(1.5, -2.0, 8.0));
}

#[test]
fn malformed_caches_are_rejected() {
	let mut truncated = pc2(0.0, 1.0, &[vec![[1.0, 2.0, 3.0]]]);
	truncated.truncate(truncated.len() - 4);
	let path = temp_file("truncated.pc2", &truncated);
	let err = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect_err("truncated pc2");
	assert!(matches!(err, FbxError::BadCache { .. }), "{err}");

	let path = temp_file("garbage.bin", b"definitely not a cache");
	let err = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect_err("garbage");
	assert!(matches!(err, FbxError::BadCache { .. }));

	let oversized = [b"FOR4".as_slice(), &1000_u32.to_be_bytes()].concat();
	let path = temp_file("oversized.mc", &oversized);
	let err = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect_err("oversized chunk");
	assert!(matches!(err, FbxError::BadCache { .. }));

	let path = temp_file("missing.xml", manifest("OneFile", "gone").as_bytes());
	let err = load_geometry_cache(&path, &GeometryCacheOpts::default()).expect_err("missing data file");
	assert!(matches!(err, FbxError::FileNotFound { .. }));

	let err = load_geometry_cache(
		fbxdoc_testkit::target_dir().join("no-such-cache.pc2"),
		&GeometryCacheOpts::default(),
	)
	.expect_err("missing cache");
	assert!(matches!(err, FbxError::FileNotFound { .. }));
}
