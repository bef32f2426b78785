use std::path::PathBuf;

use fbxdoc::fbx::{Element, ElementType, FbxError, FbxId, Result};

use crate::cmd::util::{emit_json, load_scene};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Element type label such as `mesh` or `anim_curve`.
	#[arg(long = "type")]
	pub element_type: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List scene elements, optionally of one type.
pub fn run(args: Args) -> Result<()> {
	let Args { path, element_type, json } = args;

	let filter = match element_type.as_deref() {
		Some(label) => Some(ElementType::from_label(label).ok_or_else(|| FbxError::BadElement {
			name: label.to_owned(),
			reason: "unknown element type",
		})?),
		None => None,
	};
	let scene = load_scene(&path, false)?;
	let elements: Vec<&Element> = scene
		.elements
		.iter()
		.filter(|element| filter.is_none_or(|wanted| element.element_type == wanted))
		.collect();

	if json {
		let rows: Vec<ElementJson> = elements.iter().map(|&element| element_json(element)).collect();
		emit_json(&rows);
		return Ok(());
	}

	for element in elements {
		let row = element_json(element);
		println!(
			"#{:<5} {:<18} {:<24} sub={} id={} src={} dst={}",
			row.id,
			row.element_type,
			row.name,
			row.sub_type,
			row.fbx_id.as_deref().unwrap_or("-"),
			row.sources,
			row.destinations
		);
	}
	Ok(())
}

fn element_json(element: &Element) -> ElementJson {
	ElementJson {
		id: element.element_id,
		typed_id: element.typed_id,
		element_type: element.element_type.as_str(),
		name: element.name.to_string(),
		type_name: element.type_name.to_string(),
		sub_type: element.sub_type.to_string(),
		fbx_id: element.fbx_id.as_ref().map(|id| fbx_id_text(element, id)),
		props: element.props.len(),
		instances: element.instances.clone(),
		sources: element.connections_dst.len(),
		destinations: element.connections_src.len(),
	}
}

/// Explicit ids as numbers; name-derived ids as the `Type::Name` they hash.
fn fbx_id_text(element: &Element, id: &FbxId) -> String {
	match id {
		FbxId::Explicit(value) => value.to_string(),
		FbxId::Synthetic(_) => format!("{}::{}", element.type_name, element.name),
		FbxId::Generated(value) => format!("generated:{value}"),
	}
}

#[derive(serde::Serialize)]
struct ElementJson {
	id: usize,
	typed_id: usize,
	element_type: &'static str,
	name: String,
	type_name: String,
	sub_type: String,
	fbx_id: Option<String>,
	props: usize,
	instances: Vec<usize>,
	/// Connections into this element.
	sources: usize,
	/// Connections out of this element.
	destinations: usize,
}
