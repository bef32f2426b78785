use std::path::PathBuf;

use fbxdoc::fbx::{DomNode, DomValue, FbxArray, FbxError, Result};

use crate::cmd::util::{emit_json, load_scene};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Slash-separated child names to start from, e.g. `Objects/Model`.
	#[arg(long = "node")]
	pub node_path: Option<String>,
	#[arg(long = "max-depth", default_value_t = 3)]
	pub max_depth: u32,
	#[arg(long = "max-array", default_value_t = 8)]
	pub max_array: usize,
	#[arg(long)]
	pub json: bool,
}

/// Print the retained document tree of a file.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		node_path,
		max_depth,
		max_array,
		json,
	} = args;

	let scene = load_scene(&path, true)?;
	let root = scene.dom_root.as_ref().ok_or(FbxError::BadElement {
		name: path.display().to_string(),
		reason: "document tree was not retained",
	})?;
	let start = match node_path.as_deref() {
		Some(node_path) => {
			let parts: Vec<&str> = node_path.split('/').filter(|part| !part.is_empty()).collect();
			root.find_path(&parts).ok_or_else(|| FbxError::BadElement {
				name: node_path.to_owned(),
				reason: "no document node at path",
			})?
		}
		None => root,
	};

	if json {
		emit_json(&dom_json(start, max_depth, max_array));
		return Ok(());
	}

	if start.name.is_empty() {
		for child in &start.children {
			print_node(child, 0, max_depth, max_array);
		}
	} else {
		print_node(start, 0, max_depth, max_array);
	}
	Ok(())
}

fn print_node(node: &DomNode, depth: u32, max_depth: u32, max_array: usize) {
	let indent = "  ".repeat(depth as usize);
	let values: Vec<String> = node.values.iter().map(value_text).collect();
	let array = node.array.as_ref().map(|array| array_text(array, max_array));
	match (values.is_empty(), array) {
		(_, Some(array)) => println!("{indent}{}: {array}", node.name),
		(true, None) => println!("{indent}{}", node.name),
		(false, None) => println!("{indent}{}: {}", node.name, values.join(", ")),
	}
	if node.children.is_empty() {
		return;
	}
	if depth + 1 >= max_depth {
		println!("{indent}  ... {} children", node.children.len());
		return;
	}
	for child in &node.children {
		print_node(child, depth + 1, max_depth, max_array);
	}
}

fn value_text(value: &DomValue) -> String {
	match value {
		DomValue::Number { f, i } => {
			if *f == *i as f64 {
				i.to_string()
			} else {
				f.to_string()
			}
		}
		DomValue::Str(text) => format!("{text:?}"),
		DomValue::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
	}
}

fn array_text(array: &FbxArray, max_array: usize) -> String {
	let kind = array.kind().map_or("ignored", |kind| kind.as_str());
	let head: Vec<String> = array_head(array, max_array).iter().map(f64::to_string).collect();
	let more = if array.len() > head.len() { ", ..." } else { "" };
	format!("{kind}[{}] [{}{more}]", array.len(), head.join(", "))
}

fn array_head(array: &FbxArray, max_array: usize) -> Vec<f64> {
	let values = array.as_f64();
	values.iter().take(max_array).copied().collect()
}

fn dom_json(node: &DomNode, depth_left: u32, max_array: usize) -> DomJson {
	let children = if depth_left == 0 {
		Vec::new()
	} else {
		node.children
			.iter()
			.map(|child| dom_json(child, depth_left - 1, max_array))
			.collect()
	};
	DomJson {
		name: node.name.to_string(),
		values: node.values.iter().map(value_json).collect(),
		array: node.array.as_ref().map(|array| ArrayJson {
			kind: array.kind().map_or("ignored", |kind| kind.as_str()),
			len: array.len(),
			head: array_head(array, max_array),
		}),
		child_count: node.children.len(),
		children,
	}
}

fn value_json(value: &DomValue) -> serde_json::Value {
	match value {
		DomValue::Number { f, i } if *f == *i as f64 => serde_json::Value::from(*i),
		DomValue::Number { f, .. } => serde_json::Value::from(*f),
		DomValue::Str(text) => serde_json::Value::from(text.as_ref()),
		DomValue::Blob(bytes) => serde_json::json!({ "blob_len": bytes.len() }),
	}
}

#[derive(serde::Serialize)]
struct DomJson {
	name: String,
	values: Vec<serde_json::Value>,
	array: Option<ArrayJson>,
	child_count: usize,
	children: Vec<DomJson>,
}

#[derive(serde::Serialize)]
struct ArrayJson {
	kind: &'static str,
	len: usize,
	head: Vec<f64>,
}
