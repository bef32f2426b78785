use crate::fbx::Mesh;

/// Half-edge record for one polygon corner.
///
/// Corner `index` is the half-edge leaving its vertex towards the next corner
/// of the same face. Missing links are `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopoEdge {
	/// Mesh index of the corner.
	pub index: u32,
	/// Next corner of the face.
	pub next: u32,
	/// Previous corner of the face.
	pub prev: u32,
	/// Opposite half-edge in the adjacent face, `u32::MAX` on boundaries.
	pub twin: u32,
	/// Index into `Mesh::edges`, `u32::MAX` when the mesh has no such edge.
	pub edge: u32,
	/// Face owning the corner.
	pub face: u32,
	/// More than two corners share the edge.
	pub non_manifold: bool,
}

impl TopoEdge {
	const NONE: u32 = u32::MAX;
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
	(a.min(b), a.max(b))
}

/// Build corner adjacency for every face of `mesh`.
///
/// Twins are found by sorting corners by their vertex pair. Exactly two
/// corners on a pair become twins; three or more are all flagged
/// non-manifold and left without a twin.
pub fn compute_topology(mesh: &Mesh) -> Vec<TopoEdge> {
	let mut topo: Vec<TopoEdge> = (0..mesh.num_indices as u32)
		.map(|index| TopoEdge {
			index,
			next: TopoEdge::NONE,
			prev: TopoEdge::NONE,
			twin: TopoEdge::NONE,
			edge: TopoEdge::NONE,
			face: TopoEdge::NONE,
			non_manifold: false,
		})
		.collect();

	for (face_index, face) in mesh.faces.iter().enumerate() {
		let count = face.num_indices;
		for offset in 0..count {
			let index = (face.index_begin + offset) as usize;
			let Some(corner) = topo.get_mut(index) else {
				continue;
			};
			corner.face = face_index as u32;
			corner.next = face.index_begin + (offset + 1) % count;
			corner.prev = face.index_begin + (offset + count - 1) % count;
		}
	}

	let vertex = |index: u32| mesh.vertex_indices.get(index as usize).copied().unwrap_or(u32::MAX);
	let mut order: Vec<(u32, u32, u32)> = topo
		.iter()
		.filter(|corner| corner.next != TopoEdge::NONE)
		.map(|corner| {
			let (a, b) = edge_key(vertex(corner.index), vertex(corner.next));
			(a, b, corner.index)
		})
		.collect();
	order.sort_unstable();

	for group in order.chunk_by(|x, y| (x.0, x.1) == (y.0, y.1)) {
		match group {
			[_] => {}
			[(_, _, a), (_, _, b)] => {
				topo[*a as usize].twin = *b;
				topo[*b as usize].twin = *a;
			}
			many => {
				for (_, _, index) in many {
					topo[*index as usize].non_manifold = true;
				}
			}
		}
	}

	if !mesh.edges.is_empty() {
		let mut edges: Vec<((u32, u32), u32)> = mesh
			.edges
			.iter()
			.enumerate()
			.map(|(edge_index, edge)| (edge_key(vertex(edge.a), vertex(edge.b)), edge_index as u32))
			.collect();
		edges.sort_unstable();
		for corner in &mut topo {
			if corner.next == TopoEdge::NONE {
				continue;
			}
			let key = edge_key(vertex(corner.index), vertex(corner.next));
			if let Ok(found) = edges.binary_search_by(|(edge, _)| edge.cmp(&key)) {
				corner.edge = edges[found].1;
			}
		}
	}
	topo
}

/// Next half-edge leaving the same vertex, rotating across the previous edge.
pub fn topo_next_vertex_edge(topo: &[TopoEdge], index: u32) -> Option<u32> {
	let prev = topo.get(index as usize)?.prev;
	let twin = topo.get(prev as usize)?.twin;
	(twin != TopoEdge::NONE).then_some(twin)
}

/// Previous half-edge leaving the same vertex, rotating across this edge.
pub fn topo_prev_vertex_edge(topo: &[TopoEdge], index: u32) -> Option<u32> {
	let twin = topo.get(index as usize)?.twin;
	let next = topo.get(twin as usize)?.next;
	(next != TopoEdge::NONE).then_some(next)
}
