use glam::DVec3;

use crate::fbx::geometry::topology::TopoEdge;
use crate::fbx::{Face, Mesh, VertexAttrib};

/// Area-weighted face normal by Newell's method.
///
/// The length is twice the polygon area; degenerate faces return zero.
pub fn weighted_face_normal(positions: &VertexAttrib<DVec3>, face: Face) -> DVec3 {
	if face.num_indices < 3 {
		return DVec3::ZERO;
	}
	let begin = face.index_begin as usize;
	let origin = positions.get(begin);
	let mut normal = DVec3::ZERO;
	for offset in 1..face.num_indices as usize - 1 {
		let a = positions.get(begin + offset) - origin;
		let b = positions.get(begin + offset + 1) - origin;
		normal += a.cross(b);
	}
	normal
}

/// Decide whether shading is continuous across half-edge `index`.
struct Smoothness<'a> {
	mesh: &'a Mesh,
	topo: &'a [TopoEdge],
	assume_smooth: bool,
}

impl Smoothness<'_> {
	fn is_smooth(&self, index: u32) -> bool {
		let Some(corner) = self.topo.get(index as usize) else {
			return false;
		};
		if corner.twin == u32::MAX || corner.non_manifold {
			return false;
		}
		if !self.mesh.edge_smoothing.is_empty() && corner.edge != u32::MAX {
			return self.mesh.edge_smoothing.get(corner.edge as usize).copied().unwrap_or(false);
		}
		if !self.mesh.face_smoothing.is_empty() {
			let twin_face = self.topo.get(corner.twin as usize).map_or(u32::MAX, |twin| twin.face);
			let smooth = |face: u32| self.mesh.face_smoothing.get(face as usize).copied().unwrap_or(false);
			return smooth(corner.face) && smooth(twin_face);
		}
		if self.mesh.vertex_normal.exists {
			// Compare the normals on both sides at both ends of the edge.
			let Some(twin) = self.topo.get(corner.twin as usize) else {
				return false;
			};
			let normal = |index: u32| self.mesh.vertex_normal.get(index as usize);
			let same = |a: DVec3, b: DVec3| a.abs_diff_eq(b, 1e-9);
			return same(normal(corner.index), normal(twin.next)) && same(normal(corner.next), normal(twin.index));
		}
		self.assume_smooth
	}
}

/// Assign a normal index to every mesh index.
///
/// Corners around a vertex share an index while the edges between them are
/// smooth. Edge smoothness comes from `edge_smoothing`, else `face_smoothing`,
/// else continuity of existing normals, else `assume_smooth`.
pub fn generate_normal_mapping(mesh: &Mesh, topo: &[TopoEdge], assume_smooth: bool) -> Vec<u32> {
	let smoothness = Smoothness {
		mesh,
		topo,
		assume_smooth,
	};
	let mut mapping = vec![u32::MAX; mesh.num_indices];
	let mut next_index = 0_u32;
	let limit = mesh.num_indices;

	for start in 0..mesh.num_indices as u32 {
		if mapping[start as usize] != u32::MAX || topo.get(start as usize).is_none_or(|corner| corner.next == u32::MAX) {
			continue;
		}

		// Rotate backwards to the first corner after a hard edge.
		let mut first = start;
		for _ in 0..limit {
			if !smoothness.is_smooth(first) {
				break;
			}
			let Some(prev) = super::topo_prev_vertex_edge(topo, first) else {
				break;
			};
			if prev == start {
				break;
			}
			first = prev;
		}

		// Walk forwards assigning one shared index until the next hard edge.
		let mut corner = first;
		for _ in 0..limit {
			let Some(slot) = mapping.get_mut(corner as usize) else {
				break;
			};
			if *slot != u32::MAX {
				break;
			}
			*slot = next_index;
			let prev = topo[corner as usize].prev;
			if !smoothness.is_smooth(prev) {
				break;
			}
			match super::topo_next_vertex_edge(topo, corner) {
				Some(next) => corner = next,
				None => break,
			}
		}
		next_index += 1;
	}

	// Corners of degenerate faces still need a slot.
	for slot in &mut mapping {
		if *slot == u32::MAX {
			*slot = next_index;
			next_index += 1;
		}
	}
	mapping
}

/// Accumulate area-weighted face normals into `normals` through `mapping`.
///
/// `normals` must hold one entry per distinct mapping index; entries are
/// overwritten and normalized.
pub fn compute_normals(mesh: &Mesh, positions: &VertexAttrib<DVec3>, mapping: &[u32], normals: &mut [DVec3]) {
	normals.fill(DVec3::ZERO);
	for face in &mesh.faces {
		let normal = weighted_face_normal(positions, *face);
		for index in face.range() {
			if let Some(slot) = mapping.get(index).and_then(|&slot| normals.get_mut(slot as usize)) {
				*slot += normal;
			}
		}
	}
	for normal in normals.iter_mut() {
		*normal = normal.normalize_or_zero();
	}
}

/// Generate per-corner normals for `mesh` and store them as `vertex_normal`.
pub(crate) fn generate_mesh_normals(mesh: &mut Mesh) {
	let topo = super::compute_topology(mesh);
	let mapping = generate_normal_mapping(mesh, &topo, true);
	let count = mapping.iter().map(|&index| index as usize + 1).max().unwrap_or(0);
	let mut normals = vec![DVec3::ZERO; count];
	compute_normals(mesh, &mesh.vertex_position, &mapping, &mut normals);
	mesh.vertex_normal = VertexAttrib {
		exists: true,
		values: normals,
		indices: crate::fbx::IndexSource::Explicit(mapping),
		unique_per_vertex: false,
	};
	mesh.generated_normals = true;
}
