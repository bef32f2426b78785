use std::path::PathBuf;

use fbxdoc::fbx::{Element, Node, Result, Scene};

use crate::cmd::util::{emit_json, load_scene, vec3, vec3_text};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print the node hierarchy in depth order with local and world placement.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let scene = load_scene(&path, false)?;
	if json {
		let nodes: Vec<NodeJson> = ordered_nodes(&scene).map(|(element, node)| node_json(&scene, element, node)).collect();
		emit_json(&nodes);
		return Ok(());
	}

	if let Some(root) = scene.element(scene.root_node) {
		print_subtree(&scene, root, 0);
	}
	Ok(())
}

fn ordered_nodes(scene: &Scene) -> impl Iterator<Item = (&Element, &Node)> {
	scene
		.nodes_by_depth
		.iter()
		.filter_map(|&id| scene.element(id))
		.filter_map(|element| Some((element, element.as_node()?)))
}

fn print_subtree(scene: &Scene, element: &Element, depth: usize) {
	let Some(node) = element.as_node() else {
		return;
	};
	let indent = "  ".repeat(depth);
	let label = if node.is_root { "<root>" } else { &*element.name };
	let mut line = format!("{indent}{label} [{}]", node.attrib_type.as_str());
	if let Some(mesh) = node.mesh.and_then(|mesh| scene.mesh(mesh)) {
		line.push_str(&format!(" verts={} faces={}", mesh.num_vertices, mesh.num_faces));
	}
	if !node.is_root {
		line.push_str(&format!(
			" t={} world={}",
			vec3_text(node.local_transform.translation),
			vec3_text(node.node_to_world.translation)
		));
	}
	println!("{line}");
	for &child in &node.children {
		if let Some(child) = scene.element(child) {
			print_subtree(scene, child, depth + 1);
		}
	}
}

fn node_json(scene: &Scene, element: &Element, node: &Node) -> NodeJson {
	let name_of = |id: usize| scene.element(id).map_or_else(String::new, |element| element.name.to_string());
	NodeJson {
		id: element.element_id,
		name: element.name.to_string(),
		is_root: node.is_root,
		parent: node.parent,
		depth: node.node_depth,
		attrib_type: node.attrib_type.as_str(),
		mesh: node.mesh.and_then(|mesh| scene.mesh(mesh)).map(|mesh| MeshJson {
			vertices: mesh.num_vertices,
			indices: mesh.num_indices,
			faces: mesh.num_faces,
			triangles: mesh.num_triangles,
			material_parts: mesh.material_parts.len(),
		}),
		materials: node.materials.iter().map(|&id| name_of(id)).collect(),
		translation: vec3(node.local_transform.translation),
		rotation: vec3(node.euler_rotation),
		scale: vec3(node.local_transform.scale),
		world_translation: vec3(node.node_to_world.translation),
		visible: node.visible,
	}
}

#[derive(serde::Serialize)]
struct NodeJson {
	id: usize,
	name: String,
	is_root: bool,
	parent: Option<usize>,
	depth: u32,
	attrib_type: &'static str,
	mesh: Option<MeshJson>,
	materials: Vec<String>,
	translation: [f64; 3],
	rotation: [f64; 3],
	scale: [f64; 3],
	world_translation: [f64; 3],
	visible: bool,
}

#[derive(serde::Serialize)]
struct MeshJson {
	vertices: usize,
	indices: usize,
	faces: usize,
	triangles: usize,
	material_parts: usize,
}
