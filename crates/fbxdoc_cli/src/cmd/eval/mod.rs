use std::path::PathBuf;

use fbxdoc::fbx::{Element, EvaluateOpts, FbxError, Result, evaluate_scene};

use crate::cmd::util::{emit_json, load_scene, vec3, vec3_text};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Time in seconds.
	#[arg(long)]
	pub time: f64,
	/// Animation stack name, defaulting to the active stack.
	#[arg(long)]
	pub stack: Option<String>,
	/// Also compute skinned vertex positions.
	#[arg(long)]
	pub skinning: bool,
	#[arg(long)]
	pub json: bool,
}

/// Pose the scene at one time and print node transforms.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		time,
		stack,
		skinning,
		json,
	} = args;

	let scene = load_scene(&path, false)?;
	let anim = match stack.as_deref() {
		Some(name) => {
			let element = scene.find_anim_stack(name).ok_or_else(|| FbxError::BadElement {
				name: name.to_owned(),
				reason: "no animation stack with this name",
			})?;
			element.as_anim_stack().map(|stack| stack.anim.clone()).unwrap_or_default()
		}
		None => scene.anim.clone(),
	};
	let opts = EvaluateOpts {
		evaluate_skinning: skinning,
		..EvaluateOpts::default()
	};
	log::debug!("evaluating {} layers at {time}", anim.layers.len());
	let posed = evaluate_scene(&scene, &anim, time, &opts)?;

	let nodes: Vec<PosedNodeJson> = posed
		.nodes_by_depth
		.iter()
		.filter_map(|&id| posed.element(id))
		.filter_map(posed_node)
		.collect();

	if json {
		emit_json(&EvalJson {
			time,
			stack,
			layers: anim.layers.len(),
			nodes,
		});
		return Ok(());
	}

	println!("time {time} ({} layers)", anim.layers.len());
	for node in nodes {
		println!(
			"  {:<24} t={} r={} s={} world={}",
			node.name,
			vec3_text(node.translation.into()),
			vec3_text(node.rotation.into()),
			vec3_text(node.scale.into()),
			vec3_text(node.world_translation.into())
		);
	}
	Ok(())
}

fn posed_node(element: &Element) -> Option<PosedNodeJson> {
	let node = element.as_node()?;
	if node.is_root {
		return None;
	}
	Some(PosedNodeJson {
		id: element.element_id,
		name: element.name.to_string(),
		translation: vec3(node.local_transform.translation),
		rotation: vec3(node.euler_rotation),
		scale: vec3(node.local_transform.scale),
		world_translation: vec3(node.node_to_world.translation),
	})
}

#[derive(serde::Serialize)]
struct EvalJson {
	time: f64,
	stack: Option<String>,
	layers: usize,
	nodes: Vec<PosedNodeJson>,
}

#[derive(serde::Serialize)]
struct PosedNodeJson {
	id: usize,
	name: String,
	translation: [f64; 3],
	rotation: [f64; 3],
	scale: [f64; 3],
	world_translation: [f64; 3],
}

#[cfg(test)]
mod tests;
