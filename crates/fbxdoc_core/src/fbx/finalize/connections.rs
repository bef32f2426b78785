use std::sync::Arc;

use crate::fbx::{Connection, Element, ElementType, Prop, PropFlags, Scene};

/// Assign `typed_id`s and fill `Scene::by_type`.
pub(super) fn index_types(scene: &mut Scene) {
	let mut by_type = vec![Vec::new(); ElementType::COUNT];
	for element in &mut scene.elements {
		let ids: &mut Vec<usize> = &mut by_type[element.element_type as usize];
		element.typed_id = ids.len();
		ids.push(element.element_id);
	}
	scene.by_type = by_type;
}

/// Build both sorted connection copies and each element's slices of them.
///
/// Sorts are stable so connections to the same endpoint keep file order,
/// which is what material slot order and layer order rely on.
pub(super) fn sort_connections(scene: &mut Scene) {
	let mut by_src = std::mem::take(&mut scene.connections_src);
	by_src.sort_by(|a, b| a.src.cmp(&b.src).then_with(|| a.src_prop.cmp(&b.src_prop)));
	let mut by_dst = by_src.clone();
	by_dst.sort_by(|a, b| a.dst.cmp(&b.dst).then_with(|| a.dst_prop.cmp(&b.dst_prop)));

	assign_ranges(&mut scene.elements, &by_src, |conn| conn.src, |element, range| {
		element.connections_src = range;
	});
	assign_ranges(&mut scene.elements, &by_dst, |conn| conn.dst, |element, range| {
		element.connections_dst = range;
	});
	log::debug!("sorted {} connections", by_src.len());
	scene.connections_src = by_src;
	scene.connections_dst = by_dst;
}

fn assign_ranges(
	elements: &mut [Element],
	sorted: &[Connection],
	key: impl Fn(&Connection) -> usize,
	mut set: impl FnMut(&mut Element, std::ops::Range<usize>),
) {
	let mut begin = 0;
	for element in elements.iter_mut() {
		let id = element.element_id;
		begin += sorted[begin..].partition_point(|conn| key(conn) < id);
		let end = begin + sorted[begin..].partition_point(|conn| key(conn) == id);
		set(element, begin..end);
		begin = end;
	}
}

/// Set `flags` on property `name`, materializing it when only a template has it.
pub(crate) fn flag_prop(element: &mut Element, name: &Arc<str>, flags: PropFlags) {
	if let Some(prop) = element.props.find_own_mut(name) {
		prop.flags |= flags;
		return;
	}
	let mut prop = match element.props.defaults.as_deref().and_then(|defaults| defaults.find(name)) {
		Some(template) => template.clone(),
		None => {
			let mut prop = Prop::new(Arc::clone(name));
			prop.flags |= PropFlags::NO_VALUE;
			prop
		}
	};
	prop.flags |= flags | PropFlags::SYNTHETIC;
	element.props.insert(prop);
}

/// Mark properties that receive an object or property connection.
pub(super) fn flag_connected_props(scene: &mut Scene) {
	let targets: Vec<(usize, Arc<str>)> = scene
		.connections_dst
		.iter()
		.filter(|conn| !conn.dst_prop.is_empty())
		.map(|conn| (conn.dst, Arc::clone(&conn.dst_prop)))
		.collect();
	for (dst, prop) in targets {
		if let Some(element) = scene.elements.get_mut(dst) {
			flag_prop(element, &prop, PropFlags::CONNECTED);
		}
	}
}
