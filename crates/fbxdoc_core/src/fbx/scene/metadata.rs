use std::sync::Arc;

use glam::DVec3;

use crate::fbx::math::{Axis, CoordinateAxes};
use crate::fbx::{Compression, FileFormat, Props};

/// Application that wrote the file, as far as it matters for quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exporter {
	/// Unrecognized.
	#[default]
	Unknown,
	/// Autodesk FBX SDK.
	FbxSdk,
	/// Blender's binary exporter.
	BlenderBinary,
	/// Blender's legacy ASCII exporter.
	BlenderAscii,
	/// MotionBuilder.
	MotionBuilder,
	/// Unity FBX exporter.
	BcUnityExporter,
}

impl Exporter {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::FbxSdk => "fbx_sdk",
			Self::BlenderBinary => "blender_binary",
			Self::BlenderAscii => "blender_ascii",
			Self::MotionBuilder => "motion_builder",
			Self::BcUnityExporter => "bc_unity_exporter",
		}
	}

	/// Detect the exporter and its packed version from a `Creator` string.
	pub fn detect(creator: &str) -> (Self, u32) {
		const PREFIXES: &[(&str, Exporter)] = &[
			("FBX SDK/FBX Plugins version ", Exporter::FbxSdk),
			("FBX SDK/FBX Plugins build ", Exporter::FbxSdk),
			("Blender (stable FBX IO) - ", Exporter::BlenderBinary),
			("Blender version ", Exporter::BlenderAscii),
			("MotionBuilder version ", Exporter::MotionBuilder),
			("MotionBuilder/Mocap/Online version ", Exporter::MotionBuilder),
		];
		for (prefix, exporter) in PREFIXES {
			if let Some(rest) = creator.strip_prefix(prefix) {
				// Blender puts the exporter version after the last separator.
				let version_text = match exporter {
					Exporter::BlenderBinary => rest.rsplit(" - ").next().unwrap_or(rest),
					_ => rest,
				};
				return (*exporter, parse_version(version_text));
			}
		}
		if creator.contains("Unity") {
			return (Self::BcUnityExporter, 0);
		}
		(Self::Unknown, 0)
	}
}

/// Pack a leading `major.minor.patch` into `major * 1_000_000 + minor * 1000 + patch`.
pub fn parse_version(text: &str) -> u32 {
	let digits: String = text
		.trim_start()
		.chars()
		.take_while(|ch| ch.is_ascii_digit() || *ch == '.')
		.collect();
	let mut parts = digits.split('.').map(|part| part.parse::<u32>().unwrap_or(0));
	let major = parts.next().unwrap_or(0);
	let minor = parts.next().unwrap_or(0);
	let patch = parts.next().unwrap_or(0);
	major.saturating_mul(1_000_000).saturating_add(minor.saturating_mul(1000)).saturating_add(patch)
}

/// Application record of `SceneInfo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Application {
	/// Vendor.
	pub vendor: Arc<str>,
	/// Product name.
	pub name: Arc<str>,
	/// Version string.
	pub version: Arc<str>,
}

/// Category of a tolerated irregularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningKind {
	/// Index outside its buffer was clamped or dropped.
	IndexClamped,
	/// Two objects declared the same id.
	DuplicateObjectId,
	/// Connection endpoint did not resolve.
	DanglingConnection,
	/// Referenced external file could not be read.
	MissingExternalFile,
	/// Array shorter than its declared mapping.
	TruncatedArray,
	/// Polygon with fewer than three corners.
	BadFace,
	/// Invalid UTF-8 was replaced.
	BadUnicode,
	/// Keyframes out of time order were sorted.
	UnsortedKeys,
}

impl WarningKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::IndexClamped => "index_clamped",
			Self::DuplicateObjectId => "duplicate_object_id",
			Self::DanglingConnection => "dangling_connection",
			Self::MissingExternalFile => "missing_external_file",
			Self::TruncatedArray => "truncated_array",
			Self::BadFace => "bad_face",
			Self::BadUnicode => "bad_unicode",
			Self::UnsortedKeys => "unsorted_keys",
		}
	}
}

/// Aggregated warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
	/// Category.
	pub kind: WarningKind,
	/// First description seen.
	pub description: String,
	/// Occurrences.
	pub count: usize,
}

/// File-level information and load statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
	/// Container format.
	pub format: Option<FileFormat>,
	/// Outer compression.
	pub compression: Option<Compression>,
	/// Declared version, e.g. `7400`.
	pub version: u32,
	/// True for big-endian binary files.
	pub big_endian: bool,
	/// `Creator` string.
	pub creator: Arc<str>,
	/// Detected exporter.
	pub exporter: Exporter,
	/// Packed exporter version.
	pub exporter_version: u32,
	/// Path the scene was loaded from.
	pub filename: Arc<str>,
	/// Directory used to resolve relative paths.
	pub relative_root: Arc<str>,
	/// First application that wrote the file.
	pub original_application: Application,
	/// Last application that wrote the file.
	pub latest_application: Application,
	/// `SceneInfo` properties.
	pub scene_props: Props,
	/// `ActiveAnimStackName` of the document.
	pub active_anim_stack: Arc<str>,
	/// Geometry arrays were skipped.
	pub geometry_ignored: bool,
	/// Keyframe arrays were skipped.
	pub animation_ignored: bool,
	/// Embedded content was skipped.
	pub embedded_ignored: bool,
	/// Largest triangle count of any face in the scene.
	pub max_face_triangles: usize,
	/// Faces with fewer than three corners.
	pub num_bad_faces: usize,
	/// Peak temporary bytes.
	pub temp_memory_used: usize,
	/// Result bytes.
	pub result_memory_used: usize,
	/// Temporary allocations.
	pub temp_allocs: usize,
	/// Result allocations.
	pub result_allocs: usize,
	/// Tolerated irregularities.
	pub warnings: Vec<Warning>,
}

impl Metadata {
	/// Record a tolerated irregularity, aggregated per kind.
	pub(crate) fn warn(&mut self, kind: WarningKind, description: impl FnOnce() -> String) {
		if let Some(warning) = self.warnings.iter_mut().find(|warning| warning.kind == kind) {
			warning.count += 1;
			return;
		}
		let description = description();
		log::debug!("{}: {description}", kind.as_str());
		self.warnings.push(Warning {
			kind,
			description,
			count: 1,
		});
	}
}

/// `GlobalSettings` values.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
	/// Coordinate axes of the scene after conversion.
	pub axes: CoordinateAxes,
	/// Meters per scene unit after conversion.
	pub unit_meters: f64,
	/// Frame rate.
	pub frames_per_second: f64,
	/// `AmbientColor`
	pub ambient_color: DVec3,
	/// `DefaultCamera`
	pub default_camera: Arc<str>,
	/// `TimeMode`
	pub time_mode: i64,
	/// Up axis as written in the file.
	pub original_axis_up: Axis,
	/// Meters per unit as written in the file.
	pub original_unit_meters: f64,
	/// Raw properties.
	pub props: Props,
}

impl Default for SceneSettings {
	fn default() -> Self {
		Self {
			axes: CoordinateAxes::default(),
			unit_meters: 0.01,
			frames_per_second: 24.0,
			ambient_color: DVec3::ZERO,
			default_camera: Arc::from(""),
			time_mode: 0,
			original_axis_up: Axis::PositiveY,
			original_unit_meters: 0.01,
			props: Props::default(),
		}
	}
}

/// Frame rate of a `TimeMode` enum value.
pub fn frames_per_second(time_mode: i64, custom: f64) -> f64 {
	match time_mode {
		1 => 120.0,
		2 => 100.0,
		3 => 60.0,
		4 => 50.0,
		5 => 48.0,
		6 => 30.0,
		7 | 8 => 30.0,
		9 => 29.97,
		10 => 25.0,
		11 => 24.0,
		12 => 1000.0,
		13 => 23.976,
		14 if custom > 0.0 => custom,
		15 => 96.0,
		16 => 72.0,
		17 => 59.94,
		18 => 119.88,
		_ => 24.0,
	}
}

#[cfg(test)]
mod tests {
	use crate::fbx::scene::metadata::{Exporter, frames_per_second, parse_version};

	#[test]
	fn exporter_detection() {
		assert_eq!(
			Exporter::detect("FBX SDK/FBX Plugins version 2019.2"),
			(Exporter::FbxSdk, 2_019_002_000)
		);
		assert_eq!(
			Exporter::detect("Blender (stable FBX IO) - 2.80 (sub 75) - 4.14.1"),
			(Exporter::BlenderBinary, 4_014_001)
		);
		assert_eq!(Exporter::detect("Blender version 2.79"), (Exporter::BlenderAscii, 2_079_000));
		assert_eq!(Exporter::detect("Something Else").0, Exporter::Unknown);
	}

	#[test]
	fn version_packing_ignores_suffix() {
		assert_eq!(parse_version("7.4.0 project file"), 7_004_000);
		assert_eq!(parse_version(""), 0);
	}

	#[test]
	fn time_modes() {
		assert_eq!(frames_per_second(6, 0.0), 30.0);
		assert_eq!(frames_per_second(14, 12.5), 12.5);
		assert_eq!(frames_per_second(0, 0.0), 24.0);
	}
}
