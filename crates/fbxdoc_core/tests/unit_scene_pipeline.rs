#![allow(missing_docs)]

use fbxdoc::fbx::math::CoordinateAxes;
use fbxdoc::fbx::{
	AnimCurve, Interpolation, Keyframe, LoadOpts, Scene, SubdivideOpts, Tangent, evaluate_curve, load_memory,
	subdivide_mesh,
};
use fbxdoc_testkit::{Array, BinaryWriter, Node, binary_object_name};
use glam::DVec3;

fn mesh_scene(vertices: Vec<f64>, polygons: Vec<i32>, opts: &LoadOpts) -> std::sync::Arc<Scene> {
	let bytes = BinaryWriter::new(7400).write(&[
		Node::new("FBXHeaderExtension").child(Node::new("FBXVersion").value(7400_i32)),
		Node::new("Objects").children([
			Node::new("Model")
				.value(10_i64)
				.value(binary_object_name("Model::Shape").as_str())
				.value("Mesh"),
			Node::new("Geometry")
				.value(11_i64)
				.value(binary_object_name("Geometry::Shape").as_str())
				.value("Mesh")
				.child(Node::new("Vertices").array(Array::F64(vertices)))
				.child(Node::new("PolygonVertexIndex").array(Array::I32(polygons))),
		]),
		Node::new("Connections").children([
			Node::new("C").value("OO").value(10_i64).value(0_i64),
			Node::new("C").value("OO").value(11_i64).value(10_i64),
		]),
	]);
	load_memory(&bytes, opts).expect("scene loads")
}

#[test]
fn cubic_curve_hits_its_keys_and_stays_between_them() {
	let curve = AnimCurve {
		keyframes: vec![
			Keyframe {
				time: 0.0,
				value: 0.0,
				interpolation: Interpolation::Cubic,
				right: Tangent { dx: 1.0, dy: 1.0 },
				..Keyframe::default()
			},
			Keyframe {
				time: 1.0,
				value: 10.0,
				interpolation: Interpolation::Cubic,
				left: Tangent { dx: 1.0, dy: 0.0 },
				..Keyframe::default()
			},
		],
		..AnimCurve::default()
	};

	assert_eq!(evaluate_curve(&curve, 0.0, 0.0), 0.0);
	assert_eq!(evaluate_curve(&curve, 1.0, 0.0), 10.0);
	let mid = evaluate_curve(&curve, 0.5, 0.0);
	assert!(mid > 0.0 && mid < 10.0, "mid = {mid}");
	assert_eq!(evaluate_curve(&curve, 2.0, 0.0), 10.0, "holds the last key");
	assert_eq!(evaluate_curve(&AnimCurve::default(), 0.5, 7.0), 7.0);
}

#[test]
fn loaded_quad_subdivides_into_four_quads() {
	let scene = mesh_scene(
		vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
		vec![0, 1, 2, !3],
		&LoadOpts::default(),
	);
	let (_, mesh) = scene.meshes().next().expect("mesh");
	let out = subdivide_mesh(mesh, 1, &SubdivideOpts::default()).expect("quad subdivides");

	assert_eq!(out.num_faces, 4);
	assert_eq!(out.num_vertices, 9);
	assert!(out.faces.iter().all(|face| face.num_indices == 4));
	assert!(out.vertices.iter().any(|vertex| vertex.abs_diff_eq(DVec3::new(0.5, 0.5, 0.0), 1e-12)));
	assert!(out.vertices.iter().all(|vertex| vertex.z == 0.0), "planar input stays planar");
}

#[test]
fn y_up_scene_converts_to_z_up() {
	let opts = LoadOpts {
		target_axes: Some(CoordinateAxes::RIGHT_HANDED_Z_UP),
		..LoadOpts::default()
	};
	let scene = mesh_scene(vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, !2], &opts);
	assert_eq!(scene.settings.axes, CoordinateAxes::RIGHT_HANDED_Z_UP);

	let root = scene.root().expect("root node");
	let point = root.node_to_parent.transform_point3(DVec3::new(1.0, 2.0, 3.0));
	assert!(point.abs_diff_eq(DVec3::new(1.0, -3.0, 2.0), 1e-12), "point = {point}");

	let node = scene.find_node("Shape").and_then(|element| element.as_node()).expect("mesh node");
	let (_, mesh) = scene.meshes().next().expect("mesh");
	assert_eq!(mesh.vertices[0], DVec3::new(1.0, 2.0, 3.0), "vertex data keeps file axes");
	let world = node.geometry_to_world.transform_point3(mesh.vertices[0]);
	assert!(world.abs_diff_eq(DVec3::new(1.0, -3.0, 2.0), 1e-12), "world = {world}");
}

#[test]
fn matching_axes_leave_the_root_untouched() {
	let opts = LoadOpts {
		target_axes: Some(CoordinateAxes::RIGHT_HANDED_Y_UP),
		..LoadOpts::default()
	};
	let scene = mesh_scene(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, !2], &opts);
	let root = scene.root().expect("root node");
	assert_eq!(root.node_to_parent, glam::DAffine3::IDENTITY);
}
