use glam::{DVec2, DVec3};

use crate::fbx::geometry::{evaluate_nurbs_curve, evaluate_nurbs_surface, require_feature};
use crate::fbx::{
	Face, FbxError, IndexSource, LineCurve, LineSegment, Map, Mesh, NurbsBasis, NurbsCurve, NurbsSurface,
	NurbsTopology, Result, VertexAttrib, hash_u64,
};

/// Options for [`tessellate_nurbs_curve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TessellateCurveOpts {
	/// Steps per knot span, `0` for the default of 4.
	pub span_subdivision: u32,
}

/// Options for [`tessellate_nurbs_surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TessellateSurfaceOpts {
	/// Steps per knot span along U, `0` to use the surface's own setting.
	pub span_subdivision_u: u32,
	/// Steps per knot span along V, `0` to use the surface's own setting.
	pub span_subdivision_v: u32,
}

/// Evaluation parameters: every span split into `steps` equal parts.
fn parameters(basis: &NurbsBasis, steps: u32) -> Vec<f64> {
	let steps = steps.max(1);
	let mut out = Vec::with_capacity(basis.spans.len().saturating_sub(1) * steps as usize + 1);
	for pair in basis.spans.windows(2) {
		let (a, b) = (pair[0], pair[1]);
		for step in 0..steps {
			out.push(a + (b - a) * f64::from(step) / f64::from(steps));
		}
	}
	if let Some(&last) = basis.spans.last() {
		out.push(last);
	}
	out
}

fn check_basis(basis: &NurbsBasis) -> Result<()> {
	if basis.valid && basis.spans.len() >= 2 {
		Ok(())
	} else {
		Err(FbxError::BadNurbs { reason: "invalid basis" })
	}
}

/// Convert `curve` to a polyline.
///
/// Closed and periodic curves end on their first point instead of
/// duplicating it.
pub fn tessellate_nurbs_curve(curve: &NurbsCurve, opts: &TessellateCurveOpts) -> Result<LineCurve> {
	require_feature(cfg!(feature = "tessellation"), "tessellation")?;
	check_basis(&curve.basis)?;
	let steps = if opts.span_subdivision == 0 { 4 } else { opts.span_subdivision };
	let mut params = parameters(&curve.basis, steps);
	let closed = curve.basis.topology != NurbsTopology::Open;
	if closed {
		params.pop();
	}

	let mut control_points = Vec::with_capacity(params.len());
	for &u in &params {
		let point = evaluate_nurbs_curve(curve, u)?;
		control_points.push(point.position);
	}
	let mut point_indices: Vec<u32> = (0..control_points.len() as u32).collect();
	if closed && !point_indices.is_empty() {
		point_indices.push(0);
	}
	let segments = vec![LineSegment {
		index_begin: 0,
		num_indices: point_indices.len() as u32,
	}];
	Ok(LineCurve {
		color: DVec3::ONE,
		control_points,
		point_indices,
		segments,
		from_tessellated_nurbs: true,
	})
}

/// Spatial hash welding points closer than one quantization cell.
///
/// Coordinates are quantized against a fixed exponent derived from the
/// largest magnitude; a point is looked up in the up to eight cells it could
/// round into.
struct Welder {
	cell: f64,
	cells: Map<(i64, i64, i64), Vec<u32>>,
	positions: Vec<DVec3>,
}

impl Welder {
	fn new(max_extent: f64) -> Self {
		let exponent = max_extent.max(1.0).log2().ceil();
		Self {
			cell: 2_f64.powf(exponent - 24.0),
			cells: Map::new(),
			positions: Vec::new(),
		}
	}

	fn key_hash(key: (i64, i64, i64)) -> u32 {
		let mixed = (key.0 as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
			^ (key.1 as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f)
			^ (key.2 as u64).wrapping_mul(0x1656_67b1_9e37_79f9);
		hash_u64(mixed)
	}

	fn insert(&mut self, position: DVec3) -> u32 {
		let scaled = position / self.cell;
		let base = scaled.floor();
		let frac = scaled - base;
		let base = (base.x as i64, base.y as i64, base.z as i64);
		// Neighbor cell per axis on the side the point is closest to.
		let side = |f: f64| if f < 0.5 { -1 } else { 1 };
		let offsets = (side(frac.x), side(frac.y), side(frac.z));
		let tolerance = self.cell * self.cell;
		for corner in 0..8 {
			let key = (
				base.0 + if corner & 1 != 0 { offsets.0 } else { 0 },
				base.1 + if corner & 2 != 0 { offsets.1 } else { 0 },
				base.2 + if corner & 4 != 0 { offsets.2 } else { 0 },
			);
			if let Some(bucket) = self.cells.find(Self::key_hash(key), &key) {
				for &index in bucket {
					if self.positions[index as usize].distance_squared(position) <= tolerance {
						return index;
					}
				}
			}
		}
		let index = self.positions.len() as u32;
		self.positions.push(position);
		self.cells
			.get_or_insert_with(Self::key_hash(base), base, Vec::new)
			.push(index);
		index
	}
}

/// Convert `surface` to a polygon mesh.
///
/// Points on the parameter grid are welded, so wrapped edges of closed and
/// periodic surfaces share vertices. Quads whose corners collapse become
/// triangles and fully degenerate quads are dropped.
pub fn tessellate_nurbs_surface(surface: &NurbsSurface, opts: &TessellateSurfaceOpts) -> Result<Mesh> {
	require_feature(cfg!(feature = "tessellation"), "tessellation")?;
	check_basis(&surface.basis_u)?;
	check_basis(&surface.basis_v)?;
	let steps_u = if opts.span_subdivision_u == 0 { surface.span_subdivision_u } else { opts.span_subdivision_u };
	let steps_v = if opts.span_subdivision_v == 0 { surface.span_subdivision_v } else { opts.span_subdivision_v };
	let params_u = parameters(&surface.basis_u, steps_u);
	let params_v = parameters(&surface.basis_v, steps_v);
	let (num_u, num_v) = (params_u.len(), params_v.len());

	let mut grid = Vec::with_capacity(num_u * num_v);
	for &v in &params_v {
		for &u in &params_u {
			grid.push((DVec2::new(u, v), evaluate_nurbs_surface(surface, u, v)?));
		}
	}
	let max_extent = grid
		.iter()
		.map(|(_, point)| point.position.abs().max_element())
		.fold(0.0, f64::max);
	let mut welder = Welder::new(max_extent);
	let ids: Vec<u32> = grid.iter().map(|(_, point)| welder.insert(point.position)).collect();

	let mut normals = vec![DVec3::ZERO; welder.positions.len()];
	let mut uvs = vec![DVec2::ZERO; welder.positions.len()];
	for ((uv, point), &id) in grid.iter().zip(&ids) {
		normals[id as usize] += point.normal;
		uvs[id as usize] = *uv;
	}
	for normal in &mut normals {
		*normal = normal.normalize_or_zero();
		if surface.flip_normals {
			*normal = -*normal;
		}
	}

	let mut mesh = Mesh {
		from_tessellated_nurbs: true,
		..Mesh::default()
	};
	for row in 0..num_v.saturating_sub(1) {
		for column in 0..num_u.saturating_sub(1) {
			let at = |r: usize, c: usize| ids[r * num_u + c];
			let mut corners = [at(row, column), at(row, column + 1), at(row + 1, column + 1), at(row + 1, column)];
			if surface.flip_normals {
				corners.reverse();
			}
			let mut unique: Vec<u32> = Vec::with_capacity(4);
			for corner in corners {
				if unique.last() != Some(&corner) && unique.first() != Some(&corner) {
					unique.push(corner);
				}
			}
			if unique.len() < 3 {
				continue;
			}
			mesh.faces.push(Face {
				index_begin: mesh.vertex_indices.len() as u32,
				num_indices: unique.len() as u32,
			});
			mesh.vertex_indices.extend_from_slice(&unique);
		}
	}

	mesh.num_vertices = welder.positions.len();
	mesh.num_indices = mesh.vertex_indices.len();
	mesh.vertices = welder.positions;
	mesh.update_face_stats();
	mesh.vertex_first_index = vec![u32::MAX; mesh.num_vertices];
	for (corner, &vertex) in mesh.vertex_indices.iter().enumerate() {
		let first = &mut mesh.vertex_first_index[vertex as usize];
		if *first == u32::MAX {
			*first = corner as u32;
		}
	}
	let per_vertex = IndexSource::Explicit(mesh.vertex_indices.clone());
	mesh.vertex_position = VertexAttrib {
		exists: true,
		values: mesh.vertices.clone(),
		indices: per_vertex.clone(),
		unique_per_vertex: true,
	};
	mesh.vertex_normal = VertexAttrib {
		exists: true,
		values: normals,
		indices: per_vertex.clone(),
		unique_per_vertex: true,
	};
	mesh.vertex_uv = VertexAttrib {
		exists: true,
		values: uvs,
		indices: per_vertex,
		unique_per_vertex: true,
	};
	mesh.face_material = vec![0; mesh.num_faces];
	log::debug!(
		"tessellated nurbs surface into {} vertices and {} faces",
		mesh.num_vertices,
		mesh.num_faces
	);
	Ok(mesh)
}
