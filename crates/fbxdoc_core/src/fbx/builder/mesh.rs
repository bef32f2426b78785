use std::sync::Arc;

use glam::{DVec2, DVec3, DVec4};

use crate::fbx::builder::SceneBuilder;
use crate::fbx::names as n;
use crate::fbx::{
	ColorSet, Edge, Face, FbxArray, FbxNode, IndexSource, Mesh, Result, SubdivisionBoundary, SubdivisionDisplayMode,
	Symbol, UvSet, VertexAttrib, WarningKind,
};

/// `MappingInformationType` of a layer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mapping {
	PolygonVertex,
	Vertex,
	Polygon,
	Edge,
	AllSame,
}

impl Mapping {
	fn from_symbol(symbol: Option<Symbol>) -> Option<Self> {
		Some(match symbol? {
			n::BY_POLYGON_VERTEX => Self::PolygonVertex,
			n::BY_VERTEX | n::BY_VERTICE => Self::Vertex,
			n::BY_POLYGON => Self::Polygon,
			n::BY_EDGE => Self::Edge,
			n::ALL_SAME => Self::AllSame,
			_ => return None,
		})
	}
}

/// Corner to face lookup shared by every layer of one mesh.
struct Corners {
	face: Vec<u32>,
}

impl SceneBuilder<'_, '_> {
	/// Polygon mesh from a `Geometry` or legacy `Model` node.
	pub(super) fn read_mesh(&mut self, node: &FbxNode, name: &str) -> Result<Mesh> {
		let mut mesh = Mesh::default();
		let positions = node.child_array(n::VERTICES);
		let polygons = node.child_array(n::POLYGON_VERTEX_INDEX);
		self.read_subdivision(node, &mut mesh);

		if let (Some(FbxArray::Ignored { count }), _) | (_, Some(FbxArray::Ignored { count })) = (positions, polygons) {
			// Geometry skipped on request: keep the declared sizes only.
			log::trace!("mesh {name}: geometry ignored ({count} values)");
			mesh.num_vertices = positions.map_or(0, FbxArray::len) / 3;
			mesh.num_indices = polygons.map_or(0, FbxArray::len);
			return Ok(mesh);
		}

		mesh.vertices = positions.map_or_else(Vec::new, |array| {
			array
				.as_f64()
				.chunks_exact(3)
				.map(DVec3::from_slice)
				.collect()
		});
		mesh.num_vertices = mesh.vertices.len();
		let raw = polygons.map(|array| array.as_i32().into_owned()).unwrap_or_default();
		self.read_faces(&mut mesh, &raw, name)?;

		let corners = Corners {
			face: mesh
				.faces
				.iter()
				.enumerate()
				.flat_map(|(face, info)| std::iter::repeat_n(face as u32, info.num_indices as usize))
				.collect(),
		};
		self.read_edges(node, &mut mesh)?;
		self.read_layers(node, &mut mesh, &corners)?;
		log::trace!(
			"mesh {name}: {} vertices, {} faces, {} uv sets",
			mesh.num_vertices,
			mesh.num_faces,
			mesh.uv_sets.len()
		);
		Ok(mesh)
	}

	/// A negative index `!i` closes the current polygon at vertex `i`.
	fn read_faces(&mut self, mesh: &mut Mesh, raw: &[i32], name: &str) -> Result<()> {
		let mut begin = 0_u32;
		mesh.vertex_indices.reserve(raw.len());
		for (corner, &index) in raw.iter().enumerate() {
			let (vertex, closes) = if index < 0 { (!index, true) } else { (index, false) };
			let vertex = self.fix_index(i64::from(vertex), mesh.num_vertices, "vertex")?;
			mesh.vertex_indices.push(vertex);
			if closes {
				let end = corner as u32 + 1;
				mesh.faces.push(Face {
					index_begin: begin,
					num_indices: end - begin,
				});
				begin = end;
			}
		}
		if (begin as usize) < raw.len() {
			self.tolerate(WarningKind::BadFace, || format!("mesh {name}: last polygon is not terminated"))?;
			mesh.faces.push(Face {
				index_begin: begin,
				num_indices: raw.len() as u32 - begin,
			});
		}

		mesh.num_indices = mesh.vertex_indices.len();
		mesh.update_face_stats();
		let bad_faces = mesh.num_empty_faces + mesh.num_point_faces + mesh.num_line_faces;
		if bad_faces > 0 {
			self.warn(WarningKind::BadFace, || format!("mesh {name}: {bad_faces} faces with fewer than three corners"));
		}

		mesh.vertex_first_index = vec![u32::MAX; mesh.num_vertices];
		for (corner, &vertex) in mesh.vertex_indices.iter().enumerate() {
			if let Some(first) = mesh.vertex_first_index.get_mut(vertex as usize)
				&& *first == u32::MAX
			{
				*first = corner as u32;
			}
		}
		mesh.vertex_position = VertexAttrib {
			exists: true,
			values: mesh.vertices.clone(),
			indices: IndexSource::Explicit(mesh.vertex_indices.clone()),
			unique_per_vertex: true,
		};
		Ok(())
	}

	/// `Edges` lists the corner that starts each edge; the edge ends at the next corner of the face.
	fn read_edges(&mut self, node: &FbxNode, mesh: &mut Mesh) -> Result<()> {
		let Some(edges) = node.child_array(n::EDGES) else {
			return Ok(());
		};
		let mut next = vec![0_u32; mesh.num_indices];
		for face in &mesh.faces {
			for corner in face.range() {
				let following = if corner + 1 == face.range().end { face.index_begin as usize } else { corner + 1 };
				next[corner] = following as u32;
			}
		}
		for &corner in edges.as_i32().iter() {
			let corner = self.fix_index(i64::from(corner), mesh.num_indices, "edge")?;
			let Some(&b) = next.get(corner as usize) else {
				continue;
			};
			mesh.edges.push(Edge { a: corner, b });
		}
		mesh.num_edges = mesh.edges.len();
		Ok(())
	}

	fn read_subdivision(&self, node: &FbxNode, mesh: &mut Mesh) {
		let level = |name: Symbol| node.child_i64(name).map_or(0, |level| level.clamp(0, 16) as u32);
		mesh.subdivision_preview_levels = level(n::PREVIEW_DIVISION_LEVELS);
		mesh.subdivision_render_levels = level(n::RENDER_DIVISION_LEVELS);
		mesh.subdivision_display_mode = SubdivisionDisplayMode::from_i64(node.child_i64(n::SMOOTHNESS).unwrap_or(0));
		mesh.subdivision_boundary = SubdivisionBoundary::from_i64(node.child_i64(n::BOUNDARY_RULE).unwrap_or(0));
	}

	fn read_layers(&mut self, node: &FbxNode, mesh: &mut Mesh, corners: &Corners) -> Result<()> {
		let mut tangents = Vec::new();
		let mut bitangents = Vec::new();
		for layer in &node.children {
			let set_index = layer.value_i64(0).unwrap_or(0).max(0) as usize;
			match layer.name {
				n::LAYER_ELEMENT_NORMAL if !mesh.vertex_normal.exists => {
					mesh.vertex_normal = self.read_attrib(layer, n::NORMALS, n::NORMALS_INDEX, 3, mesh, corners, DVec3::from_slice)?;
				}
				n::LAYER_ELEMENT_TANGENT => {
					let attrib = self.read_attrib(layer, n::TANGENTS, n::TANGENTS_INDEX, 3, mesh, corners, DVec3::from_slice)?;
					tangents.push((set_index, attrib));
				}
				n::LAYER_ELEMENT_BINORMAL => {
					let attrib = self.read_attrib(layer, n::BINORMALS, n::BINORMALS_INDEX, 3, mesh, corners, DVec3::from_slice)?;
					bitangents.push((set_index, attrib));
				}
				n::LAYER_ELEMENT_UV => {
					let vertex_uv = self.read_attrib(layer, n::UV, n::UV_INDEX, 2, mesh, corners, DVec2::from_slice)?;
					mesh.uv_sets.push(UvSet {
						name: self.layer_name(layer),
						index: set_index,
						vertex_uv,
						..UvSet::default()
					});
				}
				n::LAYER_ELEMENT_COLOR => {
					let vertex_color = self.read_attrib(layer, n::COLORS, n::COLOR_INDEX, 4, mesh, corners, DVec4::from_slice)?;
					mesh.color_sets.push(ColorSet {
						name: self.layer_name(layer),
						index: set_index,
						vertex_color,
					});
				}
				n::LAYER_ELEMENT_VERTEX_CREASE if !mesh.vertex_crease.exists => {
					mesh.vertex_crease =
						self.read_attrib(layer, n::VERTEX_CREASE, n::INDEX, 1, mesh, corners, |value| value[0])?;
				}
				n::LAYER_ELEMENT_MATERIAL if mesh.face_material.is_empty() => {
					if let Some(values) = self.read_per_face(layer, n::MATERIALS, mesh) {
						mesh.face_material = values.into_iter().map(|value| value.max(0.0) as u32).collect();
					}
				}
				n::LAYER_ELEMENT_POLYGON_GROUP if mesh.face_group.is_empty() => {
					if let Some(values) = self.read_per_face(layer, n::POLYGON_GROUP, mesh) {
						mesh.face_group = values.into_iter().map(|value| value.max(0.0) as u32).collect();
					}
				}
				n::LAYER_ELEMENT_HOLE if mesh.face_hole.is_empty() => {
					if let Some(values) = self.read_per_face(layer, n::HOLE, mesh) {
						mesh.face_hole = values.into_iter().map(|value| value != 0.0).collect();
					}
				}
				n::LAYER_ELEMENT_SMOOTHING => {
					if mapping_of(layer) == Some(Mapping::Edge) {
						if mesh.edge_smoothing.is_empty()
							&& let Some(values) = self.read_per_edge(layer, n::SMOOTHING, mesh)
						{
							mesh.edge_smoothing = values.into_iter().map(|value| value != 0.0).collect();
						}
					} else if mesh.face_smoothing.is_empty()
						&& let Some(values) = self.read_per_face(layer, n::SMOOTHING, mesh)
					{
						mesh.face_smoothing = values.into_iter().map(|value| value != 0.0).collect();
					}
				}
				n::LAYER_ELEMENT_EDGE_CREASE if mesh.edge_crease.is_empty() => {
					if let Some(values) = self.read_per_edge(layer, n::EDGE_CREASE, mesh) {
						mesh.edge_crease = values.into_iter().map(|value| value.clamp(0.0, 1.0)).collect();
					}
				}
				n::LAYER_ELEMENT_VISIBILITY if mesh.edge_visibility.is_empty() => {
					if let Some(values) = self.read_per_edge(layer, n::VISIBILITY, mesh) {
						mesh.edge_visibility = values.into_iter().map(|value| value != 0.0).collect();
					}
				}
				_ => {}
			}
		}

		mesh.uv_sets.sort_by_key(|set| set.index);
		mesh.color_sets.sort_by_key(|set| set.index);
		for (set_index, attrib) in tangents {
			match mesh.uv_sets.iter_mut().find(|set| set.index == set_index) {
				Some(set) if !set.vertex_tangent.exists => set.vertex_tangent = attrib,
				Some(_) => {}
				None if !mesh.vertex_tangent.exists => mesh.vertex_tangent = attrib,
				None => {}
			}
		}
		for (set_index, attrib) in bitangents {
			match mesh.uv_sets.iter_mut().find(|set| set.index == set_index) {
				Some(set) if !set.vertex_bitangent.exists => set.vertex_bitangent = attrib,
				Some(_) => {}
				None if !mesh.vertex_bitangent.exists => mesh.vertex_bitangent = attrib,
				None => {}
			}
		}
		if let Some(first) = mesh.uv_sets.first() {
			mesh.vertex_uv = first.vertex_uv.clone();
			if first.vertex_tangent.exists {
				mesh.vertex_tangent = first.vertex_tangent.clone();
			}
			if first.vertex_bitangent.exists {
				mesh.vertex_bitangent = first.vertex_bitangent.clone();
			}
		}
		if let Some(first) = mesh.color_sets.first() {
			mesh.vertex_color = first.vertex_color.clone();
		}
		Ok(())
	}

	fn layer_name(&self, layer: &FbxNode) -> Arc<str> {
		layer
			.child_str(n::NAME)
			.map_or_else(|| Arc::from(""), |symbol| self.parser.pool().arc(symbol))
	}

	/// Decode a per-corner attribute into values plus one index per mesh corner.
	#[allow(clippy::too_many_arguments)]
	fn read_attrib<T: Copy + Default>(
		&mut self,
		layer: &FbxNode,
		values_name: Symbol,
		index_name: Symbol,
		width: usize,
		mesh: &Mesh,
		corners: &Corners,
		convert: fn(&[f64]) -> T,
	) -> Result<VertexAttrib<T>> {
		let Some(values) = layer.child_array(values_name) else {
			return Ok(VertexAttrib::default());
		};
		let values: Vec<T> = values.as_f64().chunks_exact(width).map(convert).collect();
		let Some(mapping) = mapping_of(layer) else {
			log::trace!("layer {} has no usable mapping", self.parser.pool().get(layer.name));
			return Ok(VertexAttrib::default());
		};
		let index = layer
			.child_array(index_name)
			.filter(|_| layer.child_str(n::REFERENCE_INFORMATION_TYPE) != Some(n::DIRECT))
			.map(|array| array.as_i32().into_owned());

		let num_indices = mesh.num_indices;
		let (mut slots, unique_per_vertex): (Vec<usize>, bool) = match mapping {
			Mapping::PolygonVertex => ((0..num_indices).collect(), false),
			Mapping::Vertex => (mesh.vertex_indices.iter().map(|&vertex| vertex as usize).collect(), true),
			Mapping::Polygon => (corners.face.iter().map(|&face| face as usize).collect(), false),
			Mapping::AllSame => {
				if values.is_empty() {
					return Ok(VertexAttrib::default());
				}
				return Ok(VertexAttrib {
					exists: true,
					values,
					indices: IndexSource::AllZero(num_indices),
					unique_per_vertex: true,
				});
			}
			Mapping::Edge => {
				log::trace!("per-edge mapping is not meaningful for corner attributes");
				return Ok(VertexAttrib::default());
			}
		};
		if slots.len() < num_indices {
			slots.resize(num_indices, usize::MAX);
		}

		let mut indices = Vec::with_capacity(num_indices);
		for slot in slots {
			let raw = match &index {
				Some(index) => index.get(slot).map_or(-1, |&value| i64::from(value)),
				None if slot == usize::MAX => -1,
				None => slot as i64,
			};
			indices.push(self.fix_index(raw, values.len(), "attribute")?);
		}
		Ok(VertexAttrib {
			exists: true,
			values,
			indices: IndexSource::Explicit(indices).canonicalize(),
			unique_per_vertex,
		})
	}

	/// One value per face, sampled from whatever mapping the layer uses.
	fn read_per_face(&mut self, layer: &FbxNode, values_name: Symbol, mesh: &Mesh) -> Option<Vec<f64>> {
		let values = layer.child_array(values_name)?.as_f64().into_owned();
		let mapping = mapping_of(layer)?;
		let index = self.reference_index(layer, values_name);
		let lookup = |slot: usize| -> Option<f64> {
			let slot = match &index {
				Some(index) => usize::try_from(*index.get(slot)?).ok()?,
				None => slot,
			};
			values.get(slot).copied()
		};

		let num_faces = mesh.faces.len();
		let sampled: Vec<Option<f64>> = match mapping {
			Mapping::Polygon => (0..num_faces).map(lookup).collect(),
			Mapping::AllSame => vec![lookup(0); num_faces],
			Mapping::PolygonVertex => mesh.faces.iter().map(|face| lookup(face.index_begin as usize)).collect(),
			Mapping::Vertex => mesh
				.faces
				.iter()
				.map(|face| {
					let vertex = *mesh.vertex_indices.get(face.index_begin as usize)?;
					lookup(vertex as usize)
				})
				.collect(),
			Mapping::Edge => return None,
		};
		Some(self.fill_missing(sampled, layer))
	}

	fn read_per_edge(&mut self, layer: &FbxNode, values_name: Symbol, mesh: &Mesh) -> Option<Vec<f64>> {
		let values = layer.child_array(values_name)?.as_f64().into_owned();
		let index = self.reference_index(layer, values_name);
		let lookup = |slot: usize| -> Option<f64> {
			let slot = match &index {
				Some(index) => usize::try_from(*index.get(slot)?).ok()?,
				None => slot,
			};
			values.get(slot).copied()
		};
		let sampled: Vec<Option<f64>> = match mapping_of(layer)? {
			Mapping::Edge => (0..mesh.num_edges).map(lookup).collect(),
			Mapping::AllSame => vec![lookup(0); mesh.num_edges],
			_ => return None,
		};
		Some(self.fill_missing(sampled, layer))
	}

	fn reference_index(&self, layer: &FbxNode, values_name: Symbol) -> Option<Vec<i32>> {
		if layer.child_str(n::REFERENCE_INFORMATION_TYPE) == Some(n::DIRECT) {
			return None;
		}
		// Per-element layers name their index array `<Values>Index`, rarely present.
		let index_name = format!("{}Index", self.parser.pool().get(values_name));
		let symbol = crate::fbx::find_canonical(index_name.as_bytes())?;
		Some(layer.child_array(symbol)?.as_i32().into_owned())
	}

	fn fill_missing(&mut self, sampled: Vec<Option<f64>>, layer: &FbxNode) -> Vec<f64> {
		let missing = sampled.iter().filter(|value| value.is_none()).count();
		if missing > 0 {
			let name = self.parser.pool().get(layer.name).to_owned();
			self.warn(WarningKind::TruncatedArray, || format!("{name}: {missing} entries missing"));
		}
		sampled.into_iter().map(|value| value.unwrap_or(0.0)).collect()
	}
}

fn mapping_of(layer: &FbxNode) -> Option<Mapping> {
	Mapping::from_symbol(layer.child_str(n::MAPPING_INFORMATION_TYPE))
}
