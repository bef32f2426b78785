use std::path::PathBuf;

use fbxdoc::fbx::{ElementType, Result};

use crate::cmd::util::{emit_json, load_scene};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print header fields, scene settings, element counts and load warnings.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let scene = load_scene(&path, false)?;
	let meta = &scene.metadata;
	let settings = &scene.settings;
	let counts: Vec<(ElementType, usize)> = ElementType::ALL
		.iter()
		.map(|&element_type| (element_type, scene.count(element_type)))
		.filter(|&(_, count)| count > 0)
		.collect();

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			format: meta.format.map(|format| format.as_str().to_owned()),
			compression: meta.compression.map(|compression| compression.as_str().to_owned()),
			version: meta.version,
			big_endian: meta.big_endian,
			creator: meta.creator.to_string(),
			exporter: meta.exporter.as_str().to_owned(),
			exporter_version: meta.exporter_version,
			application: ApplicationJson {
				vendor: meta.latest_application.vendor.to_string(),
				name: meta.latest_application.name.to_string(),
				version: meta.latest_application.version.to_string(),
			},
			axes: AxesJson {
				right: settings.axes.right.as_str(),
				up: settings.axes.up.as_str(),
				front: settings.axes.front.as_str(),
			},
			unit_meters: settings.unit_meters,
			frames_per_second: settings.frames_per_second,
			element_count: scene.elements.len(),
			connection_count: scene.connections_src.len(),
			counts: counts
				.iter()
				.map(|&(element_type, count)| CountJson {
					element_type: element_type.as_str(),
					count,
				})
				.collect(),
			max_face_triangles: meta.max_face_triangles,
			num_bad_faces: meta.num_bad_faces,
			warnings: meta
				.warnings
				.iter()
				.map(|warning| WarningJson {
					kind: warning.kind.as_str(),
					description: warning.description.clone(),
					count: warning.count,
				})
				.collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("format: {}", meta.format.map_or("-", |format| format.as_str()));
	println!("compression: {}", meta.compression.map_or("-", |compression| compression.as_str()));
	println!("version: {}", meta.version);
	println!("big_endian: {}", meta.big_endian);
	println!("creator: {}", meta.creator);
	println!("exporter: {} {}", meta.exporter.as_str(), meta.exporter_version);
	println!(
		"axes: right={} up={} front={}",
		settings.axes.right.as_str(),
		settings.axes.up.as_str(),
		settings.axes.front.as_str()
	);
	println!("unit_meters: {}", settings.unit_meters);
	println!("frames_per_second: {}", settings.frames_per_second);
	println!("elements: {}", scene.elements.len());
	println!("connections: {}", scene.connections_src.len());

	println!("counts:");
	for (element_type, count) in counts {
		println!("  {}: {}", element_type.as_str(), count);
	}
	if !meta.warnings.is_empty() {
		println!("warnings:");
		for warning in &meta.warnings {
			println!("  {} x{}: {}", warning.kind.as_str(), warning.count, warning.description);
		}
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	format: Option<String>,
	compression: Option<String>,
	version: u32,
	big_endian: bool,
	creator: String,
	exporter: String,
	exporter_version: u32,
	application: ApplicationJson,
	axes: AxesJson,
	unit_meters: f64,
	frames_per_second: f64,
	element_count: usize,
	connection_count: usize,
	counts: Vec<CountJson>,
	max_face_triangles: usize,
	num_bad_faces: usize,
	warnings: Vec<WarningJson>,
}

#[derive(serde::Serialize)]
struct ApplicationJson {
	vendor: String,
	name: String,
	version: String,
}

#[derive(serde::Serialize)]
struct AxesJson {
	right: &'static str,
	up: &'static str,
	front: &'static str,
}

#[derive(serde::Serialize)]
struct CountJson {
	element_type: &'static str,
	count: usize,
}

#[derive(serde::Serialize)]
struct WarningJson {
	kind: &'static str,
	description: String,
	count: usize,
}

#[cfg(test)]
mod tests;
