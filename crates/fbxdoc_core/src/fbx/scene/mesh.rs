use std::sync::Arc;

use glam::{DVec2, DVec3, DVec4};

/// Index buffer of a vertex attribute.
///
/// `AllZero` and `Consecutive` stand in for buffers whose content is implied
/// by their length, so constant and one-to-one attributes never allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSource {
	/// Every index is `0`.
	AllZero(usize),
	/// Index `i` is `i`.
	Consecutive(usize),
	/// Stored indices.
	Explicit(Vec<u32>),
}

impl Default for IndexSource {
	fn default() -> Self {
		Self::Explicit(Vec::new())
	}
}

impl IndexSource {
	/// Number of indices.
	pub fn len(&self) -> usize {
		match self {
			Self::AllZero(len) | Self::Consecutive(len) => *len,
			Self::Explicit(indices) => indices.len(),
		}
	}

	/// True without indices.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Index at `i`, `None` past the end.
	pub fn get(&self, i: usize) -> Option<u32> {
		if i >= self.len() {
			return None;
		}
		Some(match self {
			Self::AllZero(_) => 0,
			Self::Consecutive(_) => i as u32,
			Self::Explicit(indices) => indices[i],
		})
	}

	/// Iterate the indices.
	pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
		(0..self.len()).filter_map(|i| self.get(i))
	}

	/// Materialize into a vector.
	pub fn to_vec(&self) -> Vec<u32> {
		self.iter().collect()
	}

	/// Collapse explicit buffers matching a shared pattern.
	pub fn canonicalize(self) -> Self {
		match self {
			Self::Explicit(indices) => {
				if indices.iter().all(|&index| index == 0) && !indices.is_empty() {
					Self::AllZero(indices.len())
				} else if indices.iter().enumerate().all(|(i, &index)| index as usize == i) && !indices.is_empty() {
					Self::Consecutive(indices.len())
				} else {
					Self::Explicit(indices)
				}
			}
			other => other,
		}
	}
}

/// Per-index vertex attribute: values plus an index per mesh corner.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttrib<T> {
	/// True when the attribute was present or generated.
	pub exists: bool,
	/// Attribute values.
	pub values: Vec<T>,
	/// Value index per mesh index.
	pub indices: IndexSource,
	/// True when the same vertex always maps to the same value.
	pub unique_per_vertex: bool,
}

impl<T> Default for VertexAttrib<T> {
	fn default() -> Self {
		Self {
			exists: false,
			values: Vec::new(),
			indices: IndexSource::default(),
			unique_per_vertex: false,
		}
	}
}

impl<T: Copy + Default> VertexAttrib<T> {
	/// Value at mesh index `index`, default when out of range.
	pub fn get(&self, index: usize) -> T {
		self.indices
			.get(index)
			.and_then(|value_index| self.values.get(value_index as usize))
			.copied()
			.unwrap_or_default()
	}

	/// Number of mesh indices covered.
	pub fn len(&self) -> usize {
		self.indices.len()
	}

	/// True without indices.
	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}
}

/// One polygon as a slice of the mesh index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Face {
	/// First mesh index.
	pub index_begin: u32,
	/// Corner count.
	pub num_indices: u32,
}

impl Face {
	/// Mesh index range of the face.
	pub fn range(self) -> std::ops::Range<usize> {
		self.index_begin as usize..(self.index_begin + self.num_indices) as usize
	}
}

/// Mesh edge as a pair of mesh indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edge {
	/// First mesh index.
	pub a: u32,
	/// Second mesh index.
	pub b: u32,
}

/// Named UV set with its tangent frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UvSet {
	/// Set name.
	pub name: Arc<str>,
	/// Declaration order.
	pub index: usize,
	/// Texture coordinates.
	pub vertex_uv: VertexAttrib<DVec2>,
	/// Tangents.
	pub vertex_tangent: VertexAttrib<DVec3>,
	/// Bitangents.
	pub vertex_bitangent: VertexAttrib<DVec3>,
}

/// Named vertex color set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorSet {
	/// Set name.
	pub name: Arc<str>,
	/// Declaration order.
	pub index: usize,
	/// Colors.
	pub vertex_color: VertexAttrib<DVec4>,
}

/// Faces of a mesh sharing one material slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshPart {
	/// Material slot index.
	pub index: usize,
	/// Material element, when the slot is bound.
	pub material: Option<usize>,
	/// Faces using this slot.
	pub face_indices: IndexSource,
	/// Face count.
	pub num_faces: usize,
	/// Triangles after triangulation.
	pub num_triangles: usize,
	/// Faces with no corners.
	pub num_empty_faces: usize,
	/// Faces with one corner.
	pub num_point_faces: usize,
	/// Faces with two corners.
	pub num_line_faces: usize,
}

/// Boundary rule for subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubdivisionBoundary {
	/// Sharp corners with smooth boundary edges.
	#[default]
	Default,
	/// Pre-2014 rule: boundary vertices stay sharp.
	Legacy,
	/// Corners of valence two stay fixed.
	SharpCorners,
	/// Boundaries are smoothed without corner pinning.
	SharpNone,
	/// Every boundary edge is sharp.
	SharpBoundary,
	/// Every edge is sharp.
	SharpInterior,
}

impl SubdivisionBoundary {
	/// Map the `BoundaryRule` enum property.
	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => Self::SharpCorners,
			2 => Self::SharpBoundary,
			3 => Self::SharpNone,
			_ => Self::Default,
		}
	}
}

/// How a subdivision surface should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubdivisionDisplayMode {
	/// Not subdivided.
	#[default]
	Disabled,
	/// Cage only.
	Hull,
	/// Cage and smooth.
	HullAndSmooth,
	/// Smooth only.
	Smooth,
}

impl SubdivisionDisplayMode {
	/// Map the `PreviewDivisionLevels` display enum.
	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => Self::Hull,
			2 => Self::HullAndSmooth,
			3 => Self::Smooth,
			_ => Self::Disabled,
		}
	}
}

/// Weighted contribution of a source vertex or skin cluster.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubdivisionWeight {
	/// Source vertex or cluster index.
	pub index: u32,
	/// Normalized weight.
	pub weight: f64,
}

/// Slice into [`SubdivisionResult`] weight arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubdivisionWeightRange {
	/// First weight.
	pub weight_begin: u32,
	/// Weight count.
	pub num_weights: u32,
}

/// Provenance of subdivided vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubdivisionResult {
	/// Source vertex weights per output vertex.
	pub source_vertex_ranges: Vec<SubdivisionWeightRange>,
	/// Flattened source vertex weights.
	pub source_vertex_weights: Vec<SubdivisionWeight>,
	/// Skin cluster weights per output vertex.
	pub skin_cluster_ranges: Vec<SubdivisionWeightRange>,
	/// Flattened skin cluster weights.
	pub skin_cluster_weights: Vec<SubdivisionWeight>,
}

/// Polygon mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
	/// Unique vertex count.
	pub num_vertices: usize,
	/// Polygon corner count.
	pub num_indices: usize,
	/// Polygon count.
	pub num_faces: usize,
	/// Triangles after triangulating every face.
	pub num_triangles: usize,
	/// Edge count.
	pub num_edges: usize,
	/// Largest triangle count of a single face.
	pub max_face_triangles: usize,
	/// Faces with no corners.
	pub num_empty_faces: usize,
	/// Faces with one corner.
	pub num_point_faces: usize,
	/// Faces with two corners.
	pub num_line_faces: usize,
	/// Polygons as index ranges.
	pub faces: Vec<Face>,
	/// Smoothing flag per face.
	pub face_smoothing: Vec<bool>,
	/// Material slot per face.
	pub face_material: Vec<u32>,
	/// Polygon group per face.
	pub face_group: Vec<u32>,
	/// Hole flag per face.
	pub face_hole: Vec<bool>,
	/// Edges.
	pub edges: Vec<Edge>,
	/// Smoothing flag per edge.
	pub edge_smoothing: Vec<bool>,
	/// Crease per edge.
	pub edge_crease: Vec<f64>,
	/// Visibility per edge.
	pub edge_visibility: Vec<bool>,
	/// Vertex per mesh index.
	pub vertex_indices: Vec<u32>,
	/// Unique vertex positions.
	pub vertices: Vec<DVec3>,
	/// First mesh index referring to each vertex, `u32::MAX` when unused.
	pub vertex_first_index: Vec<u32>,
	/// Positions.
	pub vertex_position: VertexAttrib<DVec3>,
	/// Normals.
	pub vertex_normal: VertexAttrib<DVec3>,
	/// Canonical UV set.
	pub vertex_uv: VertexAttrib<DVec2>,
	/// Canonical tangents.
	pub vertex_tangent: VertexAttrib<DVec3>,
	/// Canonical bitangents.
	pub vertex_bitangent: VertexAttrib<DVec3>,
	/// Canonical colors.
	pub vertex_color: VertexAttrib<DVec4>,
	/// Vertex creases.
	pub vertex_crease: VertexAttrib<f64>,
	/// All UV sets.
	pub uv_sets: Vec<UvSet>,
	/// All color sets.
	pub color_sets: Vec<ColorSet>,
	/// Material parts.
	pub material_parts: Vec<MeshPart>,
	/// Skin deformers.
	pub skin_deformers: Vec<usize>,
	/// Blend deformers.
	pub blend_deformers: Vec<usize>,
	/// Cache deformers.
	pub cache_deformers: Vec<usize>,
	/// Deformers in connection order.
	pub all_deformers: Vec<usize>,
	/// Viewport subdivision level.
	pub subdivision_preview_levels: u32,
	/// Render subdivision level.
	pub subdivision_render_levels: u32,
	/// Display mode.
	pub subdivision_display_mode: SubdivisionDisplayMode,
	/// Boundary rule.
	pub subdivision_boundary: SubdivisionBoundary,
	/// True when normals were generated by the loader.
	pub generated_normals: bool,
	/// Provenance after subdivision.
	pub subdivision_result: Option<SubdivisionResult>,
	/// True for meshes produced from NURBS surfaces.
	pub from_tessellated_nurbs: bool,
	/// Deformed vertex positions in world space, empty until skinning is evaluated.
	pub skinned_positions: Vec<DVec3>,
}

impl Mesh {
	/// Face `index`, default when out of range.
	pub fn face(&self, index: usize) -> Face {
		self.faces.get(index).copied().unwrap_or_default()
	}

	/// Position of mesh index `index`.
	pub fn position(&self, index: usize) -> DVec3 {
		self.vertex_position.get(index)
	}

	/// Recompute face statistics from `faces`.
	pub fn update_face_stats(&mut self) {
		self.num_faces = self.faces.len();
		self.num_triangles = 0;
		self.max_face_triangles = 0;
		self.num_empty_faces = 0;
		self.num_point_faces = 0;
		self.num_line_faces = 0;
		for face in &self.faces {
			match face.num_indices {
				0 => self.num_empty_faces += 1,
				1 => self.num_point_faces += 1,
				2 => self.num_line_faces += 1,
				n => {
					let tris = n as usize - 2;
					self.num_triangles += tris;
					self.max_face_triangles = self.max_face_triangles.max(tris);
				}
			}
		}
	}
}
