use std::ops::{Add, Mul, Range};

use glam::DVec3;
use smallvec::{SmallVec, smallvec};

use crate::fbx::geometry::{generate_mesh_normals, require_feature};
use crate::fbx::{
	Edge, Face, FbxError, IndexSource, Map, Mesh, MeshPart, Result, SkinDeformer, SubdivisionBoundary,
	SubdivisionResult, SubdivisionWeight, SubdivisionWeightRange, VertexAttrib, hash_u64,
};

/// Options for [`subdivide_mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubdivideOpts {
	/// Boundary rule, `None` to use the mesh's own.
	pub boundary: Option<SubdivisionBoundary>,
	/// Drop normals from the result.
	pub ignore_normals: bool,
	/// Interpolate existing normals instead of regenerating them.
	pub interpolate_normals: bool,
	/// Record which source vertices contribute to each output vertex.
	pub evaluate_source_vertices: bool,
	/// Cap on source vertices per output vertex, `0` for no cap.
	pub max_source_vertices: usize,
	/// Cap on skin clusters per output vertex, `0` for no cap.
	pub max_skin_weights: usize,
}

/// Sparse linear combination of input vertices or skin clusters.
type Stencil = SmallVec<[(u32, f64); 8]>;

/// Values that can be blended by [`weighted_sum`].
trait Weighted: Copy + Default + Add<Output = Self> + Mul<f64, Output = Self> {}

impl<T: Copy + Default + Add<Output = T> + Mul<f64, Output = T>> Weighted for T {}

fn weighted_sum<T: Weighted>(terms: impl IntoIterator<Item = (T, f64)>) -> T {
	terms
		.into_iter()
		.fold(T::default(), |sum, (value, weight)| sum + value * weight)
}

fn add_scaled(dst: &mut Stencil, src: &[(u32, f64)], scale: f64) {
	dst.extend(src.iter().map(|&(index, weight)| (index, weight * scale)));
}

/// Merge duplicate entries and drop zero weights.
fn compact(stencil: &mut Stencil) {
	stencil.sort_unstable_by_key(|&(index, _)| index);
	let mut out: Stencil = SmallVec::with_capacity(stencil.len());
	for &(index, weight) in stencil.iter() {
		match out.last_mut() {
			Some(last) if last.0 == index => last.1 += weight,
			_ => out.push((index, weight)),
		}
	}
	out.retain(|entry| entry.1 != 0.0);
	*stencil = out;
}

fn lerp(a: &[(u32, f64)], b: &[(u32, f64)], t: f64) -> Stencil {
	let mut out = Stencil::new();
	add_scaled(&mut out, a, 1.0 - t);
	add_scaled(&mut out, b, t);
	compact(&mut out);
	out
}

/// Keep the `max` heaviest entries, rescaled to the original total.
fn truncate(stencil: &mut Stencil, max: usize) {
	if max == 0 || stencil.len() <= max {
		return;
	}
	let total: f64 = stencil.iter().map(|entry| entry.1).sum();
	stencil.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
	stencil.truncate(max);
	let kept: f64 = stencil.iter().map(|entry| entry.1).sum();
	if kept != 0.0 {
		for entry in stencil.iter_mut() {
			entry.1 *= total / kept;
		}
	}
	stencil.sort_unstable_by_key(|&(index, _)| index);
}

/// Express `stencil` over the lists of its input vertices.
fn compose(stencil: &[(u32, f64)], lists: &[Stencil], max: usize) -> Stencil {
	let mut out = Stencil::new();
	for &(index, weight) in stencil {
		if let Some(list) = lists.get(index as usize) {
			add_scaled(&mut out, list, weight);
		}
	}
	compact(&mut out);
	truncate(&mut out, max);
	out
}

fn pair_hash(a: u32, b: u32) -> u32 {
	hash_u64((u64::from(a) << 32) | u64::from(b))
}

struct CageEdge {
	a: u32,
	b: u32,
	faces: SmallVec<[u32; 2]>,
	crease: f64,
	smooth: bool,
	visible: bool,
}

impl CageEdge {
	fn other(&self, vertex: u32) -> u32 {
		if self.a == vertex { self.b } else { self.a }
	}
}

/// Adjacency of one subdivision level's input.
struct Cage<'a> {
	mesh: &'a Mesh,
	edges: Vec<CageEdge>,
	/// Edge leaving each corner towards the next corner of its face.
	corner_edge: Vec<u32>,
	vertex_edges: Vec<SmallVec<[u32; 6]>>,
	vertex_faces: Vec<SmallVec<[u32; 6]>>,
	vertex_crease: Vec<f64>,
	/// Faces with at least three corners.
	faces: Vec<u32>,
}

impl<'a> Cage<'a> {
	fn build(mesh: &'a Mesh) -> Result<Self> {
		let num_vertices = mesh.vertices.len();
		let mut edge_map: Map<(u32, u32), u32> = Map::with_capacity(mesh.num_indices);
		let mut edges: Vec<CageEdge> = Vec::with_capacity(mesh.num_indices);
		let mut corner_edge = vec![u32::MAX; mesh.vertex_indices.len()];
		let mut vertex_faces = vec![SmallVec::new(); num_vertices];
		let mut faces = Vec::with_capacity(mesh.faces.len());

		for (face_index, face) in mesh.faces.iter().enumerate() {
			if face.num_indices < 3 {
				continue;
			}
			let range = face.range();
			if range.end > mesh.vertex_indices.len() {
				return Err(FbxError::BadIndex {
					what: "subdivision face",
					index: range.end as i64,
					len: mesh.vertex_indices.len(),
				});
			}
			faces.push(face_index as u32);
			let count = face.num_indices as usize;
			for offset in 0..count {
				let corner = range.start + offset;
				let next = range.start + (offset + 1) % count;
				let (a, b) = (mesh.vertex_indices[corner], mesh.vertex_indices[next]);
				if a as usize >= num_vertices || b as usize >= num_vertices {
					return Err(FbxError::BadIndex {
						what: "subdivision vertex",
						index: i64::from(a.max(b)),
						len: num_vertices,
					});
				}
				let key = (a.min(b), a.max(b));
				let id = *edge_map.get_or_insert_with(pair_hash(key.0, key.1), key, || {
					edges.push(CageEdge {
						a: key.0,
						b: key.1,
						faces: SmallVec::new(),
						crease: 0.0,
						smooth: true,
						visible: true,
					});
					(edges.len() - 1) as u32
				});
				edges[id as usize].faces.push(face_index as u32);
				corner_edge[corner] = id;
				let incident: &mut SmallVec<[u32; 6]> = &mut vertex_faces[a as usize];
				if incident.last() != Some(&(face_index as u32)) {
					incident.push(face_index as u32);
				}
			}
		}

		for (index, edge) in mesh.edges.iter().enumerate() {
			let vertex = |corner: u32| mesh.vertex_indices.get(corner as usize).copied();
			let (Some(a), Some(b)) = (vertex(edge.a), vertex(edge.b)) else {
				continue;
			};
			let key = (a.min(b), a.max(b));
			if let Some(&id) = edge_map.find(pair_hash(key.0, key.1), &key) {
				let cage_edge = &mut edges[id as usize];
				cage_edge.crease = mesh.edge_crease.get(index).copied().unwrap_or(0.0).clamp(0.0, 1.0);
				cage_edge.smooth = mesh.edge_smoothing.get(index).copied().unwrap_or(true);
				cage_edge.visible = mesh.edge_visibility.get(index).copied().unwrap_or(true);
			}
		}

		let mut vertex_edges = vec![SmallVec::new(); num_vertices];
		for (id, edge) in edges.iter().enumerate() {
			vertex_edges[edge.a as usize].push(id as u32);
			vertex_edges[edge.b as usize].push(id as u32);
		}

		let mut vertex_crease = vec![0.0; num_vertices];
		if mesh.vertex_crease.exists {
			for (corner, &vertex) in mesh.vertex_indices.iter().enumerate() {
				let crease = &mut vertex_crease[vertex as usize];
				*crease = f64::max(*crease, mesh.vertex_crease.get(corner).clamp(0.0, 1.0));
			}
		}

		Ok(Self {
			mesh,
			edges,
			corner_edge,
			vertex_edges,
			vertex_faces,
			vertex_crease,
			faces,
		})
	}

	fn face_stencil(&self, face: u32) -> Stencil {
		let face = self.mesh.face(face as usize);
		let weight = 1.0 / f64::from(face.num_indices);
		self.mesh.vertex_indices[face.range()]
			.iter()
			.map(|&vertex| (vertex, weight))
			.collect()
	}

	fn edge_stencil(&self, edge: &CageEdge, boundary: SubdivisionBoundary) -> Stencil {
		let mid: Stencil = smallvec![(edge.a, 0.5), (edge.b, 0.5)];
		if edge.faces.len() != 2 || boundary == SubdivisionBoundary::SharpInterior || edge.crease >= 1.0 {
			return mid;
		}
		let mut smooth: Stencil = smallvec![(edge.a, 0.25), (edge.b, 0.25)];
		for &face in &edge.faces {
			add_scaled(&mut smooth, &self.face_stencil(face), 0.25);
		}
		compact(&mut smooth);
		if edge.crease > 0.0 { lerp(&smooth, &mid, edge.crease) } else { smooth }
	}

	fn vertex_stencil(&self, vertex: u32, boundary: SubdivisionBoundary) -> Stencil {
		let identity: Stencil = smallvec![(vertex, 1.0)];
		let incident = &self.vertex_edges[vertex as usize];
		let faces = &self.vertex_faces[vertex as usize];
		if incident.is_empty() || faces.is_empty() || boundary == SubdivisionBoundary::SharpInterior {
			return identity;
		}

		let boundary_edges: SmallVec<[u32; 4]> = incident
			.iter()
			.copied()
			.filter(|&edge| self.edges[edge as usize].faces.len() == 1)
			.collect();
		let sharp_rule = |a: u32, b: u32| -> Stencil {
			let a = self.edges[a as usize].other(vertex);
			let b = self.edges[b as usize].other(vertex);
			let mut out: Stencil = smallvec![(vertex, 0.75), (a, 0.125), (b, 0.125)];
			compact(&mut out);
			out
		};

		let result = if !boundary_edges.is_empty() {
			let pinned = match boundary {
				SubdivisionBoundary::Legacy | SubdivisionBoundary::SharpBoundary => true,
				SubdivisionBoundary::Default | SubdivisionBoundary::SharpCorners => {
					boundary_edges.len() != 2 || faces.len() == 1
				}
				SubdivisionBoundary::SharpNone | SubdivisionBoundary::SharpInterior => boundary_edges.len() != 2,
			};
			if pinned { identity.clone() } else { sharp_rule(boundary_edges[0], boundary_edges[1]) }
		} else {
			let n = incident.len() as f64;
			let mut smooth = Stencil::new();
			for &face in faces {
				add_scaled(&mut smooth, &self.face_stencil(face), 1.0 / (faces.len() as f64 * n));
			}
			for &edge in incident {
				let other = self.edges[edge as usize].other(vertex);
				smooth.push((vertex, 1.0 / (n * n)));
				smooth.push((other, 1.0 / (n * n)));
			}
			smooth.push((vertex, (n - 3.0) / n));
			compact(&mut smooth);

			let creased: SmallVec<[(u32, f64); 4]> = incident
				.iter()
				.filter_map(|&edge| {
					let info = &self.edges[edge as usize];
					let crease = if info.faces.len() > 2 { 1.0 } else { info.crease };
					(crease > 0.0).then_some((edge, crease))
				})
				.collect();
			let sharpness = creased.iter().map(|entry| entry.1).sum::<f64>() / creased.len().max(1) as f64;
			match creased.len() {
				0 | 1 => smooth,
				2 => lerp(&smooth, &sharp_rule(creased[0].0, creased[1].0), sharpness),
				_ => lerp(&smooth, &identity, sharpness),
			}
		};

		let crease = self.vertex_crease[vertex as usize];
		if crease > 0.0 { lerp(&result, &identity, crease) } else { result }
	}
}

/// Where an output corner came from.
#[derive(Clone, Copy)]
enum CornerSource {
	/// Input corner.
	Vertex(u32),
	/// Midpoint of two input corners of the same face.
	Edge(u32, u32),
	/// Center of an input face.
	Face(u32),
}

/// Bilinear face-varying interpolation of `attrib` onto the output corners.
///
/// Edge midpoints are shared between faces that share both value indices,
/// so attribute seams survive subdivision.
fn subdivide_attrib<T: Weighted>(attrib: &VertexAttrib<T>, mesh: &Mesh, corners: &[CornerSource]) -> VertexAttrib<T> {
	if !attrib.exists {
		return VertexAttrib::default();
	}
	let value_index = |corner: u32| attrib.indices.get(corner as usize).unwrap_or(0);
	let mut values = attrib.values.clone();
	let mut edge_values: Map<(u32, u32), u32> = Map::with_capacity(corners.len() / 2);
	let mut face_values = vec![u32::MAX; mesh.faces.len()];
	let mut indices = Vec::with_capacity(corners.len());
	for &source in corners {
		let index = match source {
			CornerSource::Vertex(corner) => value_index(corner),
			CornerSource::Edge(a, b) => {
				let (a, b) = (value_index(a), value_index(b));
				let key = (a.min(b), a.max(b));
				*edge_values.get_or_insert_with(pair_hash(key.0, key.1), key, || {
					let value = |index: u32| values.get(index as usize).copied().unwrap_or_default();
					let mid = weighted_sum([(value(key.0), 0.5), (value(key.1), 0.5)]);
					values.push(mid);
					(values.len() - 1) as u32
				})
			}
			CornerSource::Face(face) => {
				let slot = &mut face_values[face as usize];
				if *slot == u32::MAX {
					let range = mesh.face(face as usize).range();
					let weight = 1.0 / range.len() as f64;
					let center = weighted_sum(range.map(|corner| {
						let value = attrib.values.get(value_index(corner as u32) as usize);
						(value.copied().unwrap_or_default(), weight)
					}));
					values.push(center);
					*slot = (values.len() - 1) as u32;
				}
				*slot
			}
		};
		indices.push(index);
	}
	VertexAttrib {
		exists: true,
		values,
		indices: IndexSource::Explicit(indices),
		unique_per_vertex: attrib.unique_per_vertex,
	}
}

/// Output of one level: the mesh and the stencil of every output vertex.
struct Level {
	mesh: Mesh,
	stencils: Vec<Stencil>,
}

fn subdivide_level(mesh: &Mesh, opts: &SubdivideOpts) -> Result<Level> {
	let boundary = opts.boundary.unwrap_or(mesh.subdivision_boundary);
	let cage = Cage::build(mesh)?;
	let num_vertices = mesh.vertices.len();
	let edge_base = num_vertices as u32;
	let face_base = edge_base + cage.edges.len() as u32;

	let mut stencils: Vec<Stencil> = Vec::with_capacity(face_base as usize + cage.faces.len());
	stencils.extend((0..num_vertices as u32).map(|vertex| cage.vertex_stencil(vertex, boundary)));
	stencils.extend(cage.edges.iter().map(|edge| cage.edge_stencil(edge, boundary)));
	stencils.extend(cage.faces.iter().map(|&face| cage.face_stencil(face)));

	let vertices: Vec<DVec3> = stencils
		.iter()
		.map(|stencil| weighted_sum(stencil.iter().map(|&(index, weight)| (mesh.vertices[index as usize], weight))))
		.collect();

	let mut out = Mesh {
		subdivision_preview_levels: mesh.subdivision_preview_levels,
		subdivision_render_levels: mesh.subdivision_render_levels,
		subdivision_display_mode: mesh.subdivision_display_mode,
		subdivision_boundary: mesh.subdivision_boundary,
		from_tessellated_nurbs: mesh.from_tessellated_nurbs,
		..Mesh::default()
	};
	let mut sources = Vec::with_capacity(cage.faces.len() * 4 * 4);
	// Output corner runs per input edge, `None` for edges inside a face.
	let mut corner_parent_edge: Vec<Option<u32>> = Vec::with_capacity(sources.capacity());
	let mut child_faces: Vec<Range<u32>> = vec![0..0; mesh.faces.len()];

	for (face_point, &face_index) in cage.faces.iter().enumerate() {
		let face = mesh.face(face_index as usize);
		let begin = face.index_begin;
		let count = face.num_indices;
		let first_child = out.faces.len() as u32;
		for offset in 0..count {
			let corner = begin + offset;
			let next = begin + (offset + 1) % count;
			let prev = begin + (offset + count - 1) % count;
			let edge_next = cage.corner_edge[corner as usize];
			let edge_prev = cage.corner_edge[prev as usize];
			out.faces.push(Face {
				index_begin: out.vertex_indices.len() as u32,
				num_indices: 4,
			});
			out.vertex_indices.extend_from_slice(&[
				mesh.vertex_indices[corner as usize],
				edge_base + edge_next,
				face_base + face_point as u32,
				edge_base + edge_prev,
			]);
			sources.extend_from_slice(&[
				CornerSource::Vertex(corner),
				CornerSource::Edge(corner, next),
				CornerSource::Face(face_index),
				CornerSource::Edge(prev, corner),
			]);
			corner_parent_edge.extend_from_slice(&[Some(edge_next), None, None, Some(edge_prev)]);
			let parent = face_index as usize;
			if let Some(&material) = mesh.face_material.get(parent) {
				out.face_material.push(material);
			}
			if let Some(&smooth) = mesh.face_smoothing.get(parent) {
				out.face_smoothing.push(smooth);
			}
			if let Some(&group) = mesh.face_group.get(parent) {
				out.face_group.push(group);
			}
			if let Some(&hole) = mesh.face_hole.get(parent) {
				out.face_hole.push(hole);
			}
		}
		child_faces[face_index as usize] = first_child..out.faces.len() as u32;
	}

	out.num_vertices = vertices.len();
	out.num_indices = out.vertex_indices.len();
	out.vertices = vertices;
	out.update_face_stats();
	out.vertex_first_index = vec![u32::MAX; out.num_vertices];
	for (corner, &vertex) in out.vertex_indices.iter().enumerate() {
		let first = &mut out.vertex_first_index[vertex as usize];
		if *first == u32::MAX {
			*first = corner as u32;
		}
	}
	out.vertex_position = VertexAttrib {
		exists: true,
		values: out.vertices.clone(),
		indices: IndexSource::Explicit(out.vertex_indices.clone()),
		unique_per_vertex: true,
	};

	build_edges(&mut out, mesh, &cage, &corner_parent_edge);

	out.vertex_uv = subdivide_attrib(&mesh.vertex_uv, mesh, &sources);
	out.vertex_tangent = subdivide_attrib(&mesh.vertex_tangent, mesh, &sources);
	out.vertex_bitangent = subdivide_attrib(&mesh.vertex_bitangent, mesh, &sources);
	out.vertex_color = subdivide_attrib(&mesh.vertex_color, mesh, &sources);
	out.uv_sets = mesh
		.uv_sets
		.iter()
		.map(|set| {
			let mut set = set.clone();
			set.vertex_uv = subdivide_attrib(&set.vertex_uv, mesh, &sources);
			set.vertex_tangent = subdivide_attrib(&set.vertex_tangent, mesh, &sources);
			set.vertex_bitangent = subdivide_attrib(&set.vertex_bitangent, mesh, &sources);
			set
		})
		.collect();
	out.color_sets = mesh
		.color_sets
		.iter()
		.map(|set| {
			let mut set = set.clone();
			set.vertex_color = subdivide_attrib(&set.vertex_color, mesh, &sources);
			set
		})
		.collect();

	if mesh.vertex_crease.exists {
		// Creases stick to the input vertices; new vertices start smooth.
		let mut creases = vec![0.0; out.num_vertices];
		creases[..num_vertices].copy_from_slice(&cage.vertex_crease);
		out.vertex_crease = VertexAttrib {
			exists: true,
			values: creases,
			indices: IndexSource::Explicit(out.vertex_indices.clone()),
			unique_per_vertex: true,
		};
	}

	if mesh.vertex_normal.exists && !opts.ignore_normals {
		if opts.interpolate_normals {
			out.vertex_normal = subdivide_attrib(&mesh.vertex_normal, mesh, &sources);
			for normal in &mut out.vertex_normal.values {
				*normal = normal.normalize_or_zero();
			}
		} else {
			generate_mesh_normals(&mut out);
		}
	}

	out.material_parts = mesh
		.material_parts
		.iter()
		.map(|part| {
			let faces: Vec<u32> = part
				.face_indices
				.iter()
				.filter_map(|face| child_faces.get(face as usize).cloned())
				.flatten()
				.collect();
			MeshPart {
				index: part.index,
				material: part.material,
				num_faces: faces.len(),
				num_triangles: faces.len() * 2,
				face_indices: IndexSource::Explicit(faces).canonicalize(),
				..MeshPart::default()
			}
		})
		.collect();

	log::trace!(
		"subdivided {} faces into {} faces with {} vertices",
		mesh.num_faces,
		out.num_faces,
		out.num_vertices
	);
	Ok(Level { mesh: out, stencils })
}

/// Unique output edges with creases, smoothing and visibility inherited from
/// the input edge they split. Edges inside an input face are smooth, visible
/// and uncreased.
fn build_edges(out: &mut Mesh, mesh: &Mesh, cage: &Cage<'_>, corner_parent_edge: &[Option<u32>]) {
	let mut seen: Map<(u32, u32), ()> = Map::with_capacity(out.num_indices);
	let has_crease = !mesh.edge_crease.is_empty();
	let has_smoothing = !mesh.edge_smoothing.is_empty();
	let has_visibility = !mesh.edge_visibility.is_empty();
	for face in &out.faces {
		let range = face.range();
		for corner in range.clone() {
			let next = if corner + 1 == range.end { range.start } else { corner + 1 };
			let (a, b) = (out.vertex_indices[corner], out.vertex_indices[next]);
			let key = (a.min(b), a.max(b));
			let hash = pair_hash(key.0, key.1);
			if seen.find(hash, &key).is_some() {
				continue;
			}
			seen.insert(hash, key, ());
			out.edges.push(Edge {
				a: corner as u32,
				b: next as u32,
			});
			let parent = corner_parent_edge[corner].map(|edge| &cage.edges[edge as usize]);
			if has_crease {
				out.edge_crease.push(parent.map_or(0.0, |edge| edge.crease));
			}
			if has_smoothing {
				out.edge_smoothing.push(parent.is_none_or(|edge| edge.smooth));
			}
			if has_visibility {
				out.edge_visibility.push(parent.is_none_or(|edge| edge.visible));
			}
		}
	}
	out.num_edges = out.edges.len();
}

fn skin_lists(skin: &SkinDeformer, num_vertices: usize) -> Vec<Stencil> {
	(0..num_vertices)
		.map(|vertex| {
			let Some(entry) = skin.vertices.get(vertex) else {
				return Stencil::new();
			};
			let begin = entry.weight_begin as usize;
			let end = (begin + entry.num_weights as usize).min(skin.weights.len());
			skin.weights
				.get(begin..end)
				.unwrap_or_default()
				.iter()
				.map(|weight| (weight.cluster_index, weight.weight))
				.collect()
		})
		.collect()
}

/// Flatten per-vertex lists, heaviest weight first.
fn flatten(lists: Vec<Stencil>) -> (Vec<SubdivisionWeightRange>, Vec<SubdivisionWeight>) {
	let mut ranges = Vec::with_capacity(lists.len());
	let mut weights = Vec::new();
	for mut list in lists {
		list.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
		ranges.push(SubdivisionWeightRange {
			weight_begin: weights.len() as u32,
			num_weights: list.len() as u32,
		});
		weights.extend(list.iter().map(|&(index, weight)| SubdivisionWeight { index, weight }));
	}
	(ranges, weights)
}

fn subdivide(mesh: &Mesh, skin: Option<&SkinDeformer>, level: u32, opts: &SubdivideOpts) -> Result<Mesh> {
	require_feature(cfg!(feature = "subdivision"), "subdivision")?;
	if level == 0 {
		return Ok(mesh.clone());
	}
	let num_vertices = mesh.vertices.len();
	let mut source_lists: Option<Vec<Stencil>> = opts
		.evaluate_source_vertices
		.then(|| (0..num_vertices as u32).map(|vertex| smallvec![(vertex, 1.0)]).collect());
	let mut skin_weights = skin.map(|skin| skin_lists(skin, num_vertices));

	let mut current: Option<Mesh> = None;
	for _ in 0..level {
		let Level { mesh: next, stencils } = subdivide_level(current.as_ref().unwrap_or(mesh), opts)?;
		if let Some(lists) = &mut source_lists {
			*lists = stencils
				.iter()
				.map(|stencil| compose(stencil, lists, opts.max_source_vertices))
				.collect();
		}
		if let Some(lists) = &mut skin_weights {
			*lists = stencils
				.iter()
				.map(|stencil| compose(stencil, lists, opts.max_skin_weights))
				.collect();
		}
		current = Some(next);
	}

	let Some(mut out) = current else {
		return Ok(mesh.clone());
	};
	if source_lists.is_some() || skin_weights.is_some() {
		let mut result = SubdivisionResult::default();
		if let Some(lists) = source_lists {
			(result.source_vertex_ranges, result.source_vertex_weights) = flatten(lists);
		}
		if let Some(lists) = skin_weights {
			(result.skin_cluster_ranges, result.skin_cluster_weights) = flatten(lists);
		}
		out.subdivision_result = Some(result);
	}
	log::debug!(
		"subdivided mesh {level} levels: {} -> {} faces",
		mesh.num_faces,
		out.num_faces
	);
	Ok(out)
}

/// Catmull-Clark subdivide `mesh` `level` times.
///
/// Level `0` returns a copy. Faces with fewer than three corners are
/// dropped. Each input face of `n` corners becomes `n` quads; output vertices
/// are ordered input vertices first, then one per input edge, then one per
/// face. Face-varying attributes are interpolated bilinearly while positions
/// follow the smooth masks, blended towards sharp masks by edge and vertex
/// creases. Deformer links are not carried over since the vertex set changes.
pub fn subdivide_mesh(mesh: &Mesh, level: u32, opts: &SubdivideOpts) -> Result<Mesh> {
	subdivide(mesh, None, level, opts)
}

/// [`subdivide_mesh`] that also propagates the vertex weights of `skin`.
///
/// The per-vertex cluster weights end up in
/// [`SubdivisionResult::skin_cluster_weights`], capped at
/// `opts.max_skin_weights` and renormalized after truncation.
pub fn subdivide_mesh_with_skin(mesh: &Mesh, skin: &SkinDeformer, level: u32, opts: &SubdivideOpts) -> Result<Mesh> {
	subdivide(mesh, Some(skin), level, opts)
}
