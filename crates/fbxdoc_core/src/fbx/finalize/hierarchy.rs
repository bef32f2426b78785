use crate::fbx::{ElementType, FbxError, LoadOpts, Result, Scene};

const UNKNOWN_DEPTH: u32 = u32::MAX;
const PENDING_DEPTH: u32 = u32::MAX - 1;

/// Resolve node parents, depths, children and the depth-sorted node order.
///
/// A node's parent is the first node it connects into. Nodes without one are
/// parented to the implicit root unless `allow_nodes_out_of_root` is set.
pub(super) fn link_parents(scene: &mut Scene, opts: &LoadOpts) -> Result<()> {
	let root = scene.root_node;
	let node_ids = scene.ids_of(ElementType::Node).to_vec();
	let mut parents: Vec<Option<usize>> = vec![None; scene.elements.len()];
	for &id in &node_ids {
		if id == root {
			continue;
		}
		parents[id] = match scene.destinations_of(id, ElementType::Node).next() {
			Some(parent) => Some(parent),
			None if opts.allow_nodes_out_of_root => {
				log::trace!("node {id} has no parent, leaving it out of the root");
				None
			}
			None => Some(root),
		};
	}

	let depths = node_depths(&node_ids, &parents)?;
	let mut children: Vec<Vec<usize>> = vec![Vec::new(); scene.elements.len()];
	for &id in &node_ids {
		if let Some(parent) = parents[id] {
			children[parent].push(id);
		}
	}
	for &id in &node_ids {
		if let Some(node) = scene.elements[id].as_node_mut() {
			node.parent = parents[id];
			node.node_depth = depths[id];
			node.children = std::mem::take(&mut children[id]);
		}
	}

	let mut order = node_ids;
	order.sort_by_key(|&id| (depths[id], parents[id].map_or(0, |parent| parent + 1), id));
	scene.nodes_by_depth = order;
	Ok(())
}

/// Depth of every node, indexed by element id.
///
/// Each walk climbs parents until it meets a node of known depth, then
/// assigns depths on the way back down, so every node is visited once. A
/// parent still pending within the same walk closes a cycle.
fn node_depths(node_ids: &[usize], parents: &[Option<usize>]) -> Result<Vec<u32>> {
	let mut depths = vec![UNKNOWN_DEPTH; parents.len()];
	let mut chain = Vec::new();
	for &start in node_ids {
		let mut current = start;
		let mut depth = loop {
			match depths[current] {
				PENDING_DEPTH => return Err(FbxError::NodeCycle { element_id: current }),
				UNKNOWN_DEPTH => {}
				known => break known + 1,
			}
			depths[current] = PENDING_DEPTH;
			chain.push(current);
			match parents[current] {
				Some(parent) => current = parent,
				None => break 0,
			}
		};
		while let Some(id) = chain.pop() {
			depths[id] = depth;
			depth += 1;
		}
	}
	Ok(depths)
}

/// Attach attributes and materials to nodes and record attribute instances.
pub(super) fn attach_attributes(scene: &mut Scene) {
	let node_ids = scene.ids_of(ElementType::Node).to_vec();
	let mut links = Vec::with_capacity(node_ids.len());
	for &id in &node_ids {
		let mut attribs: Vec<usize> = Vec::new();
		for conn in scene.connections_dst_of(id, Some("")) {
			let is_attrib = conn.src_prop.is_empty()
				&& scene
					.element(conn.src)
					.is_some_and(|element| element.element_type.is_node_attribute());
			if is_attrib && !attribs.contains(&conn.src) {
				attribs.push(conn.src);
			}
		}
		let materials: Vec<usize> = scene.sources_of(id, ElementType::Material).collect();
		let types: Vec<ElementType> = attribs
			.iter()
			.map(|&attrib| scene.elements[attrib].element_type)
			.collect();
		links.push((id, attribs, types, materials));
	}

	for (id, attribs, types, materials) in links {
		for &attrib in &attribs {
			scene.elements[attrib].instances.push(id);
		}
		let Some(node) = scene.elements[id].as_node_mut() else {
			continue;
		};
		let first_of = |wanted: ElementType| {
			attribs
				.iter()
				.zip(&types)
				.find(|(_, element_type)| **element_type == wanted)
				.map(|(&attrib, _)| attrib)
		};
		node.mesh = first_of(ElementType::Mesh);
		node.light = first_of(ElementType::Light);
		node.camera = first_of(ElementType::Camera);
		node.bone = first_of(ElementType::Bone);
		node.attrib = attribs.first().copied();
		node.attrib_type = types.first().copied().unwrap_or(ElementType::Empty);
		node.all_attribs = attribs;
		node.materials = materials;
	}
}
