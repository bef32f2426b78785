use std::path::Path;
use std::sync::Arc;

use fbxdoc::fbx::{Element, FbxError, LoadOpts, Result, Scene, load_file};
use glam::DVec3;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json encode failed: {err}"),
	}
}

/// Load `path` with default options, optionally keeping the document tree.
pub(crate) fn load_scene(path: &Path, retain_dom: bool) -> Result<Arc<Scene>> {
	log::debug!("loading {}", path.display());
	let opts = LoadOpts {
		retain_dom,
		..LoadOpts::default()
	};
	load_file(path, &opts)
}

/// Resolve an element by `#<id>` or by name, preferring nodes on name clashes.
pub(crate) fn resolve_element<'a>(scene: &'a Scene, selector: &str) -> Result<&'a Element> {
	let found = match selector.strip_prefix('#') {
		Some(id) => id.parse::<usize>().ok().and_then(|id| scene.element(id)),
		None => scene
			.find_node(selector)
			.or_else(|| scene.elements.iter().find(|element| &*element.name == selector)),
	};
	found.ok_or_else(|| FbxError::BadElement {
		name: selector.to_owned(),
		reason: "no element matches",
	})
}

/// Vector as a JSON-friendly triple.
pub(crate) fn vec3(value: DVec3) -> [f64; 3] {
	value.to_array()
}

/// Vector rendered with fixed precision for text output.
pub(crate) fn vec3_text(value: DVec3) -> String {
	format!("({:.4}, {:.4}, {:.4})", value.x, value.y, value.z)
}
