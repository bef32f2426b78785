use glam::{DVec3, DVec4};

use crate::fbx::geometry::setup_nurbs_basis;
use crate::fbx::{
	Edge, Face, FbxError, IndexSource, Mesh, NurbsBasis, NurbsCurve, NurbsSurface, NurbsTopology, SkinDeformer,
	SkinVertex, SkinWeight, SubdivideOpts, SubdivisionBoundary, TessellateCurveOpts, TessellateSurfaceOpts,
	VertexAttrib, VertexStream, compute_normals, compute_topology, evaluate_nurbs_basis, evaluate_nurbs_curve,
	generate_indices, generate_normal_mapping, subdivide_mesh, subdivide_mesh_with_skin, tessellate_nurbs_curve,
	tessellate_nurbs_surface, topo_next_vertex_edge, triangulate_face,
};

fn mesh_from(positions: &[DVec3], faces: &[&[u32]]) -> Mesh {
	let mut mesh = Mesh::default();
	for face in faces {
		mesh.faces.push(Face {
			index_begin: mesh.vertex_indices.len() as u32,
			num_indices: face.len() as u32,
		});
		mesh.vertex_indices.extend_from_slice(face);
	}
	mesh.vertices = positions.to_vec();
	mesh.num_vertices = positions.len();
	mesh.num_indices = mesh.vertex_indices.len();
	mesh.vertex_position = VertexAttrib {
		exists: true,
		values: positions.to_vec(),
		indices: IndexSource::Explicit(mesh.vertex_indices.clone()),
		unique_per_vertex: true,
	};
	mesh.update_face_stats();
	mesh
}

fn unit_quad() -> Mesh {
	mesh_from(
		&[
			DVec3::new(0.0, 0.0, 0.0),
			DVec3::new(1.0, 0.0, 0.0),
			DVec3::new(1.0, 1.0, 0.0),
			DVec3::new(0.0, 1.0, 0.0),
		],
		&[&[0, 1, 2, 3]],
	)
}

fn cube() -> Mesh {
	let p = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
	mesh_from(
		&[
			p(-1.0, -1.0, -1.0),
			p(1.0, -1.0, -1.0),
			p(1.0, 1.0, -1.0),
			p(-1.0, 1.0, -1.0),
			p(-1.0, -1.0, 1.0),
			p(1.0, -1.0, 1.0),
			p(1.0, 1.0, 1.0),
			p(-1.0, 1.0, 1.0),
		],
		&[
			&[0, 3, 2, 1],
			&[4, 5, 6, 7],
			&[0, 1, 5, 4],
			&[2, 3, 7, 6],
			&[0, 4, 7, 3],
			&[1, 2, 6, 5],
		],
	)
}

fn distinct(mapping: &[u32]) -> usize {
	let mut sorted = mapping.to_vec();
	sorted.sort_unstable();
	sorted.dedup();
	sorted.len()
}

#[test]
fn shared_edge_pairs_twins() {
	let mesh = mesh_from(
		&[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ONE],
		&[&[0, 1, 2], &[2, 1, 3]],
	);
	let topo = compute_topology(&mesh);
	assert_eq!(topo.len(), 6);
	// Corner 1 runs 1 -> 2, corner 3 runs 2 -> 1.
	assert_eq!(topo[1].twin, 3);
	assert_eq!(topo[3].twin, 1);
	assert_eq!(topo[0].twin, u32::MAX);
	assert_eq!(topo[4].face, 1);
	assert_eq!((topo[4].prev, topo[4].next), (3, 5));
	assert!(topo.iter().all(|corner| !corner.non_manifold));
}

#[test]
fn three_faces_on_one_edge_are_non_manifold() {
	let mesh = mesh_from(
		&[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z, DVec3::NEG_Y],
		&[&[0, 1, 2], &[1, 0, 3], &[0, 1, 4]],
	);
	let topo = compute_topology(&mesh);
	for corner in [0, 3, 6] {
		assert!(topo[corner].non_manifold, "corner {corner}");
		assert_eq!(topo[corner].twin, u32::MAX);
	}
	assert!(!topo[1].non_manifold);
}

#[test]
fn topology_links_mesh_edges() {
	let mut mesh = unit_quad();
	mesh.edges = vec![Edge { a: 2, b: 3 }, Edge { a: 0, b: 1 }];
	let topo = compute_topology(&mesh);
	assert_eq!(topo[0].edge, 1);
	assert_eq!(topo[2].edge, 0);
	assert_eq!(topo[1].edge, u32::MAX);
}

#[test]
fn closed_cube_rotates_around_every_vertex() {
	let mesh = cube();
	let topo = compute_topology(&mesh);
	assert!(topo.iter().all(|corner| corner.twin != u32::MAX));
	// Three faces meet at each cube vertex.
	let start = 0_u32;
	let mut corner = start;
	let mut steps = 0;
	loop {
		corner = topo_next_vertex_edge(&topo, corner).expect("closed ring");
		steps += 1;
		assert_eq!(mesh.vertex_indices[corner as usize], mesh.vertex_indices[start as usize]);
		if corner == start {
			break;
		}
	}
	assert_eq!(steps, 3);
}

#[test]
fn smooth_cube_shares_one_normal_per_vertex() {
	let mesh = cube();
	let topo = compute_topology(&mesh);
	let mapping = generate_normal_mapping(&mesh, &topo, true);
	assert_eq!(mapping.len(), 24);
	assert_eq!(distinct(&mapping), 8);

	let mut normals = vec![DVec3::ZERO; 8];
	compute_normals(&mesh, &mesh.vertex_position, &mapping, &mut normals);
	// Corner 6 of the top face sits on vertex (1, 1, 1).
	let corner = mesh.vertex_indices.iter().position(|&vertex| vertex == 6).expect("vertex 6");
	let normal = normals[mapping[corner] as usize];
	assert!(normal.abs_diff_eq(DVec3::ONE.normalize(), 1e-9), "{normal}");
}

#[test]
fn hard_faces_split_normals() {
	let mut mesh = cube();
	mesh.face_smoothing = vec![false; 6];
	let topo = compute_topology(&mesh);
	let mapping = generate_normal_mapping(&mesh, &topo, true);
	assert_eq!(distinct(&mapping), 24);

	let mut normals = vec![DVec3::ZERO; 24];
	compute_normals(&mesh, &mesh.vertex_position, &mapping, &mut normals);
	assert!(normals[mapping[4] as usize].abs_diff_eq(DVec3::Z, 1e-9));
}

#[test]
fn edge_smoothing_overrides_face_smoothing() {
	let mut mesh = mesh_from(
		&[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ONE],
		&[&[0, 1, 2], &[2, 1, 3]],
	);
	mesh.face_smoothing = vec![true, true];
	mesh.edges = vec![Edge { a: 1, b: 2 }];
	mesh.edge_smoothing = vec![false];
	let topo = compute_topology(&mesh);
	let mapping = generate_normal_mapping(&mesh, &topo, true);
	assert_eq!(distinct(&mapping), 6);
}

#[test]
fn generate_indices_merges_equal_vertices() {
	let mut positions: Vec<u8> = [1_u8, 2, 1, 3, 1, 2].to_vec();
	let mut colors: Vec<u8> = [7_u8, 8, 7, 9, 7, 8].to_vec();
	let mut indices = [0_u32; 3];
	let mut streams = [
		VertexStream {
			data: &mut positions,
			vertex_size: 2,
		},
		VertexStream {
			data: &mut colors,
			vertex_size: 2,
		},
	];
	let unique = generate_indices(&mut streams, &mut indices).expect("indices");
	assert_eq!(unique, 2);
	assert_eq!(indices, [0, 1, 0]);
	assert_eq!(&positions[..4], &[1, 2, 1, 3]);
	assert_eq!(&colors[..4], &[7, 8, 7, 9]);
}

#[test]
fn generate_indices_rejects_bad_streams() {
	let mut data = [0_u8; 4];
	let mut indices = [0_u32; 2];
	let mut zero = [VertexStream {
		data: &mut data,
		vertex_size: 0,
	}];
	assert!(matches!(generate_indices(&mut zero, &mut indices), Err(FbxError::ZeroVertexSize)));

	let mut short = [VertexStream {
		data: &mut data,
		vertex_size: 4,
	}];
	assert!(matches!(
		generate_indices(&mut short, &mut indices),
		Err(FbxError::BadIndex { what: "vertex stream", .. })
	));
}

#[test]
fn triangle_and_quad_fast_paths() {
	let mesh = mesh_from(
		&[DVec3::ZERO, DVec3::X, DVec3::Y],
		&[&[0, 1, 2]],
	);
	let mut out = [0_u32; 6];
	assert_eq!(triangulate_face(&mut out, &mesh, mesh.faces[0]), 1);
	assert_eq!(&out[..3], &[0, 1, 2]);

	// With corner 2 lifted the halves only agree when split along 1-3.
	let folded = mesh_from(
		&[
			DVec3::new(0.0, 0.0, 0.0),
			DVec3::new(1.0, 0.0, 0.0),
			DVec3::new(1.0, 1.0, 2.0),
			DVec3::new(0.0, 1.0, 0.0),
		],
		&[&[0, 1, 2, 3]],
	);
	assert_eq!(triangulate_face(&mut out, &folded, folded.faces[0]), 2);
	let mut used: Vec<u32> = out.to_vec();
	used.sort_unstable();
	assert_eq!(used, vec![0, 1, 1, 2, 3, 3]);

	assert_eq!(triangulate_face(&mut out[..3], &folded, folded.faces[0]), 0);
}

#[test]
fn concave_polygon_ear_clips_inside_outline() {
	// Arrow shape with a reflex vertex at index 4.
	let points = [
		DVec3::new(0.0, 0.0, 0.0),
		DVec3::new(4.0, 0.0, 0.0),
		DVec3::new(4.0, 4.0, 0.0),
		DVec3::new(2.0, 4.0, 0.0),
		DVec3::new(2.0, 1.0, 0.0),
		DVec3::new(0.0, 4.0, 0.0),
	];
	let mesh = mesh_from(&points, &[&[0, 1, 2, 3, 4, 5]]);
	let mut out = [0_u32; 12];
	assert_eq!(triangulate_face(&mut out, &mesh, mesh.faces[0]), 4);

	let mut area = 0.0;
	for tri in out.chunks(3) {
		let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.position(i as usize));
		let signed = (b - a).cross(c - a).z * 0.5;
		assert!(signed > 0.0, "triangle {tri:?} flipped or degenerate");
		area += signed;
	}
	// Square of 16 minus the notch of 3.
	assert!((area - 13.0).abs() < 1e-9, "area {area}");
}

fn open_basis(order: u32, knots: &[f64], num_control_points: usize) -> NurbsBasis {
	let mut basis = NurbsBasis {
		order,
		topology: NurbsTopology::Open,
		knot_vector: knots.to_vec(),
		..NurbsBasis::default()
	};
	setup_nurbs_basis(&mut basis, num_control_points);
	basis
}

#[test]
fn basis_setup_validates_knots() {
	let basis = open_basis(3, &[0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0], 4);
	assert!(basis.valid);
	assert_eq!((basis.t_min, basis.t_max), (0.0, 1.0));
	assert_eq!(basis.spans, vec![0.0, 0.5, 1.0]);
	assert_eq!(basis.num_wrap_control_points, 0);

	assert!(!open_basis(3, &[0.0, 0.0, 0.0, 1.0, 1.0], 4).valid);
	assert!(!open_basis(3, &[0.0, 0.0, 1.0, 0.5, 1.0, 1.0, 1.0], 4).valid);
	// Extra knots on an open basis would need wrapping.
	assert!(!open_basis(2, &[0.0, 0.0, 1.0, 2.0, 2.0], 2).valid);

	let mut periodic = NurbsBasis {
		order: 2,
		topology: NurbsTopology::Periodic,
		knot_vector: vec![0.0, 1.0, 2.0, 3.0, 4.0],
		..NurbsBasis::default()
	};
	setup_nurbs_basis(&mut periodic, 2);
	assert!(periodic.valid);
	assert_eq!(periodic.num_wrap_control_points, 1);
}

#[test]
fn basis_weights_partition_unity() {
	let basis = open_basis(4, &[0.0, 0.0, 0.0, 0.0, 0.3, 0.7, 1.0, 1.0, 1.0, 1.0], 6);
	assert!(basis.valid);
	let mut weights = [0.0; 4];
	let mut derivatives = [0.0; 4];
	for step in 0..=20 {
		let u = f64::from(step) / 20.0;
		let base = evaluate_nurbs_basis(&basis, u, &mut weights, Some(&mut derivatives)).expect("basis");
		assert!(base + 4 <= 6);
		let sum: f64 = weights.iter().sum();
		assert!((sum - 1.0).abs() < 1e-12, "u {u} sum {sum}");
		let derivative_sum: f64 = derivatives.iter().sum();
		assert!(derivative_sum.abs() < 1e-9, "u {u} derivative sum {derivative_sum}");
	}

	let mut short = [0.0; 2];
	assert!(matches!(
		evaluate_nurbs_basis(&basis, 0.5, &mut short, None),
		Err(FbxError::BadNurbs { .. })
	));
	let invalid = NurbsBasis::default();
	assert!(matches!(
		evaluate_nurbs_basis(&invalid, 0.5, &mut weights, None),
		Err(FbxError::BadNurbs { .. })
	));
}

#[test]
fn linear_curve_interpolates_control_points() {
	let curve = NurbsCurve {
		basis: open_basis(2, &[0.0, 0.0, 1.0, 2.0, 2.0], 3),
		control_points: vec![
			DVec4::new(0.0, 0.0, 0.0, 1.0),
			DVec4::new(2.0, 0.0, 0.0, 1.0),
			DVec4::new(2.0, 2.0, 0.0, 1.0),
		],
	};
	let point = evaluate_nurbs_curve(&curve, 0.5).expect("point");
	assert!(point.position.abs_diff_eq(DVec3::new(1.0, 0.0, 0.0), 1e-12));
	assert!(point.derivative.abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), 1e-12));
	let point = evaluate_nurbs_curve(&curve, 1.5).expect("point");
	assert!(point.position.abs_diff_eq(DVec3::new(2.0, 1.0, 0.0), 1e-12));

	let line = tessellate_nurbs_curve(&curve, &TessellateCurveOpts { span_subdivision: 2 }).expect("line");
	assert!(line.from_tessellated_nurbs);
	assert_eq!(line.control_points.len(), 5);
	assert_eq!(line.point_indices, vec![0, 1, 2, 3, 4]);
	assert_eq!(line.segments.len(), 1);
	assert!(line.control_points[4].abs_diff_eq(DVec3::new(2.0, 2.0, 0.0), 1e-12));
}

#[test]
fn rational_weights_pull_towards_control_point() {
	let mut curve = NurbsCurve {
		basis: open_basis(3, &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 3),
		control_points: vec![
			DVec4::new(0.0, 0.0, 0.0, 1.0),
			DVec4::new(1.0, 1.0, 0.0, 1.0),
			DVec4::new(2.0, 0.0, 0.0, 1.0),
		],
	};
	let plain = evaluate_nurbs_curve(&curve, 0.5).expect("point").position;
	curve.control_points[1].w = 4.0;
	let heavy = evaluate_nurbs_curve(&curve, 0.5).expect("point").position;
	assert!((plain.y - 0.5).abs() < 1e-12);
	assert!(heavy.y > plain.y);
	assert!((heavy.x - 1.0).abs() < 1e-12);
}

#[test]
fn bilinear_surface_tessellates_to_grid() {
	let surface = NurbsSurface {
		basis_u: open_basis(2, &[0.0, 0.0, 1.0, 1.0], 2),
		basis_v: open_basis(2, &[0.0, 0.0, 1.0, 1.0], 2),
		num_control_points_u: 2,
		num_control_points_v: 2,
		span_subdivision_u: 2,
		span_subdivision_v: 2,
		control_points: vec![
			DVec4::new(0.0, 0.0, 0.0, 1.0),
			DVec4::new(1.0, 0.0, 0.0, 1.0),
			DVec4::new(0.0, 1.0, 0.0, 1.0),
			DVec4::new(1.0, 1.0, 0.0, 1.0),
		],
		..NurbsSurface::default()
	};
	let mesh = tessellate_nurbs_surface(&surface, &TessellateSurfaceOpts::default()).expect("mesh");
	assert!(mesh.from_tessellated_nurbs);
	assert_eq!(mesh.num_vertices, 9);
	assert_eq!(mesh.num_faces, 4);
	assert!(mesh.faces.iter().all(|face| face.num_indices == 4));
	assert!(mesh.vertex_normal.values.iter().all(|normal| normal.abs_diff_eq(DVec3::Z, 1e-12)));

	let flipped = NurbsSurface {
		flip_normals: true,
		..surface.clone()
	};
	let mesh = tessellate_nurbs_surface(
		&flipped,
		&TessellateSurfaceOpts {
			span_subdivision_u: 1,
			span_subdivision_v: 1,
		},
	)
	.expect("mesh");
	assert_eq!(mesh.num_faces, 1);
	assert!(mesh.vertex_normal.values.iter().all(|normal| normal.abs_diff_eq(DVec3::NEG_Z, 1e-12)));
}

#[test]
fn collapsed_surface_row_becomes_triangles() {
	// Both top control points coincide, so the top row of quads collapses.
	let surface = NurbsSurface {
		basis_u: open_basis(2, &[0.0, 0.0, 1.0, 1.0], 2),
		basis_v: open_basis(2, &[0.0, 0.0, 1.0, 1.0], 2),
		num_control_points_u: 2,
		num_control_points_v: 2,
		span_subdivision_u: 1,
		span_subdivision_v: 1,
		control_points: vec![
			DVec4::new(0.0, 0.0, 0.0, 1.0),
			DVec4::new(1.0, 0.0, 0.0, 1.0),
			DVec4::new(0.5, 1.0, 0.0, 1.0),
			DVec4::new(0.5, 1.0, 0.0, 1.0),
		],
		..NurbsSurface::default()
	};
	let mesh = tessellate_nurbs_surface(&surface, &TessellateSurfaceOpts::default()).expect("mesh");
	assert_eq!(mesh.num_vertices, 3);
	assert_eq!(mesh.faces, vec![Face { index_begin: 0, num_indices: 3 }]);
}

#[test]
fn invalid_surface_basis_is_rejected() {
	let surface = NurbsSurface::default();
	assert!(matches!(
		tessellate_nurbs_surface(&surface, &TessellateSurfaceOpts::default()),
		Err(FbxError::BadNurbs { .. })
	));
}

#[test]
fn subdivided_quad_has_four_quads_and_nine_vertices() {
	let mesh = unit_quad();
	let out = subdivide_mesh(&mesh, 1, &SubdivideOpts::default()).expect("subdivide");
	assert_eq!(out.num_faces, 4);
	assert_eq!(out.num_vertices, 9);
	assert!(out.faces.iter().all(|face| face.num_indices == 4));
	// Boundary corners stay put, the face point lands in the middle.
	assert_eq!(out.vertices[..4], mesh.vertices[..]);
	assert!(out.vertices[8].abs_diff_eq(DVec3::new(0.5, 0.5, 0.0), 1e-12));
	assert_eq!(out.num_edges, 12);

	let twice = subdivide_mesh(&mesh, 2, &SubdivideOpts::default()).expect("subdivide");
	assert_eq!(twice.num_faces, 16);
	assert_eq!(twice.num_vertices, 25);

	let same = subdivide_mesh(&mesh, 0, &SubdivideOpts::default()).expect("subdivide");
	assert_eq!(same, mesh);
}

#[test]
fn smooth_cube_shrinks_towards_center() {
	let mesh = cube();
	let out = subdivide_mesh(&mesh, 1, &SubdivideOpts::default()).expect("subdivide");
	assert_eq!(out.num_faces, 24);
	assert_eq!(out.num_vertices, 8 + 12 + 6);
	// Catmull-Clark moves a cube corner to 5/9 of its distance.
	assert!(out.vertices[6].abs_diff_eq(DVec3::splat(5.0 / 9.0), 1e-12), "{}", out.vertices[6]);
	// Face points stay on the faces, edge points move in.
	assert!(out.vertices[8 + 12 + 1].abs_diff_eq(DVec3::new(0.0, 0.0, 1.0), 1e-12));
	for edge_point in &out.vertices[8..20] {
		assert!((edge_point.length() - (2.0_f64 * 0.75 * 0.75).sqrt()).abs() < 1e-12, "{edge_point}");
	}

	let sharp = subdivide_mesh(
		&mesh,
		1,
		&SubdivideOpts {
			boundary: Some(SubdivisionBoundary::SharpInterior),
			..SubdivideOpts::default()
		},
	)
	.expect("subdivide");
	assert_eq!(sharp.vertices[6], DVec3::ONE);
}

#[test]
fn vertex_crease_pins_corner() {
	let mut mesh = cube();
	mesh.vertex_crease = VertexAttrib {
		exists: true,
		values: vec![0.0, 1.0],
		indices: IndexSource::Explicit(
			mesh.vertex_indices
				.iter()
				.map(|&vertex| u32::from(vertex == 6))
				.collect(),
		),
		unique_per_vertex: true,
	};
	let out = subdivide_mesh(&mesh, 1, &SubdivideOpts::default()).expect("subdivide");
	assert_eq!(out.vertices[6], DVec3::ONE);
	assert!(out.vertices[0].abs_diff_eq(DVec3::splat(-5.0 / 9.0), 1e-12));
	assert!(out.vertex_crease.exists);
}

#[test]
fn uvs_keep_seams_and_midpoints() {
	let mut mesh = unit_quad();
	mesh.vertex_uv = VertexAttrib {
		exists: true,
		values: mesh.vertices.iter().map(|p| p.truncate()).collect(),
		indices: IndexSource::Consecutive(4),
		unique_per_vertex: true,
	};
	let out = subdivide_mesh(&mesh, 1, &SubdivideOpts::default()).expect("subdivide");
	assert!(out.vertex_uv.exists);
	assert_eq!(out.vertex_uv.len(), 16);
	// The second corner of every output quad is an edge midpoint.
	let midpoint = out.vertex_uv.get(1);
	assert!(midpoint.abs_diff_eq(glam::DVec2::new(0.5, 0.0), 1e-12), "{midpoint}");
	assert!(out.vertex_uv.get(2).abs_diff_eq(glam::DVec2::splat(0.5), 1e-12));
	// Four corners, four midpoints and one center.
	assert_eq!(out.vertex_uv.values.len(), 9);
}

#[test]
fn source_vertices_and_skin_weights_propagate() {
	let mesh = unit_quad();
	let skin = SkinDeformer {
		vertices: (0..4)
			.map(|vertex| SkinVertex {
				weight_begin: vertex,
				num_weights: 1,
				dq_weight: 0.0,
			})
			.collect(),
		weights: vec![
			SkinWeight {
				cluster_index: 0,
				weight: 1.0,
			},
			SkinWeight {
				cluster_index: 1,
				weight: 1.0,
			},
			SkinWeight {
				cluster_index: 2,
				weight: 1.0,
			},
			SkinWeight {
				cluster_index: 3,
				weight: 1.0,
			},
		],
		..SkinDeformer::default()
	};
	let opts = SubdivideOpts {
		evaluate_source_vertices: true,
		max_skin_weights: 2,
		..SubdivideOpts::default()
	};
	let out = subdivide_mesh_with_skin(&mesh, &skin, 1, &opts).expect("subdivide");
	let result = out.subdivision_result.as_ref().expect("result");
	assert_eq!(result.source_vertex_ranges.len(), 9);

	let face_point = result.source_vertex_ranges[8];
	assert_eq!(face_point.num_weights, 4);
	let weights = &result.source_vertex_weights[face_point.weight_begin as usize..][..4];
	assert!(weights.iter().all(|entry| (entry.weight - 0.25).abs() < 1e-12));

	for range in &result.skin_cluster_ranges {
		assert!(range.num_weights <= 2);
		let weights = &result.skin_cluster_weights[range.weight_begin as usize..][..range.num_weights as usize];
		let total: f64 = weights.iter().map(|entry| entry.weight).sum();
		assert!((total - 1.0).abs() < 1e-12, "total {total}");
		assert!(weights.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
	}
	let corner = result.skin_cluster_ranges[2];
	assert_eq!(corner.num_weights, 1);
	assert_eq!(result.skin_cluster_weights[corner.weight_begin as usize].index, 2);
}

#[test]
fn subdivision_regenerates_normals() {
	let mut mesh = cube();
	mesh.vertex_normal = VertexAttrib {
		exists: true,
		values: vec![DVec3::Z],
		indices: IndexSource::AllZero(24),
		unique_per_vertex: false,
	};
	let out = subdivide_mesh(&mesh, 1, &SubdivideOpts::default()).expect("subdivide");
	assert!(out.generated_normals);
	assert!(out.vertex_normal.values.iter().all(|normal| (normal.length() - 1.0).abs() < 1e-9));

	let interpolated = subdivide_mesh(
		&mesh,
		1,
		&SubdivideOpts {
			interpolate_normals: true,
			..SubdivideOpts::default()
		},
	)
	.expect("subdivide");
	assert!(!interpolated.generated_normals);
	assert!(interpolated.vertex_normal.values.iter().all(|normal| *normal == DVec3::Z));

	let dropped = subdivide_mesh(
		&mesh,
		1,
		&SubdivideOpts {
			ignore_normals: true,
			..SubdivideOpts::default()
		},
	)
	.expect("subdivide");
	assert!(!dropped.vertex_normal.exists);
}
