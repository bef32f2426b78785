use std::sync::Arc;

use crate::fbx::{NameEntry, Scene};

/// Build the `(name, type, id)` sorted lookup index.
pub(super) fn index_names(scene: &mut Scene) {
	let mut entries: Vec<NameEntry> = scene
		.elements
		.iter()
		.filter(|element| !element.name.is_empty())
		.map(|element| NameEntry {
			name: Arc::clone(&element.name),
			element_type: element.element_type,
			element: element.element_id,
		})
		.collect();
	entries.sort_by(|a, b| {
		(a.name.as_ref(), a.element_type, a.element).cmp(&(b.name.as_ref(), b.element_type, b.element))
	});
	scene.elements_by_name = entries;
}
