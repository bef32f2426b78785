#![allow(missing_docs)]

use std::io::Cursor;

use fbxdoc::fbx::{
	Compression, ElementType, Face, FbxError, FileFormat, LoadOpts, Scene, load_file, load_memory, load_stream,
};
use fbxdoc_testkit::{Array, AsciiWriter, BinaryWriter, Node, binary_object_name, temp_file};
use glam::DVec3;

fn triangle_document() -> Vec<Node> {
	vec![
		Node::new("FBXHeaderExtension").child(Node::new("FBXVersion").value(7400_i32)),
		Node::new("Objects").children([
			Node::new("Model")
				.value(10_i64)
				.value(binary_object_name("Model::Tri").as_str())
				.value("Mesh"),
			Node::new("Geometry")
				.value(11_i64)
				.value(binary_object_name("Geometry::Tri").as_str())
				.value("Mesh")
				.child(Node::new("Vertices").array(Array::F64(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])))
				.child(Node::new("PolygonVertexIndex").array(Array::I32(vec![0, 1, !2]))),
		]),
		Node::new("Connections").children([
			Node::new("C").value("OO").value(10_i64).value(0_i64),
			Node::new("C").value("OO").value(11_i64).value(10_i64),
		]),
	]
}

fn assert_triangle(scene: &Scene) {
	// The implicit root plus the model.
	assert_eq!(scene.count(ElementType::Node), 2);
	assert_eq!(scene.count(ElementType::Mesh), 1);

	let (_, mesh) = scene.meshes().next().expect("mesh element");
	assert_eq!(mesh.num_vertices, 3);
	assert_eq!(mesh.num_faces, 1);
	assert_eq!(mesh.num_triangles, 1);
	assert_eq!(
		mesh.faces[0],
		Face {
			index_begin: 0,
			num_indices: 3
		}
	);
	assert_eq!(mesh.vertices[1], DVec3::X);

	let node = scene.find_node("Tri").expect("model node");
	let instance = node.as_node().expect("node data");
	assert_eq!(instance.mesh.and_then(|mesh| scene.mesh(mesh)), Some(mesh));
}

#[test]
fn binary_triangle_loads_from_memory() {
	let bytes = BinaryWriter::new(7400).write(&triangle_document());
	let scene = load_memory(&bytes, &LoadOpts::default()).expect("triangle loads");
	assert_triangle(&scene);
	assert_eq!(scene.metadata.format, Some(FileFormat::Binary));
	assert_eq!(scene.metadata.version, 7400);
	assert_eq!(scene.metadata.compression, Some(Compression::None));
}

#[test]
fn ascii_triangle_matches_binary() {
	let text = AsciiWriter::new(7400).write(&triangle_document());
	let scene = load_memory(text.as_bytes(), &LoadOpts::default()).expect("ascii triangle loads");
	assert_triangle(&scene);
	assert_eq!(scene.metadata.format, Some(FileFormat::Ascii));
}

#[test]
fn zstd_wrapped_file_loads_through_reader() {
	let bytes = BinaryWriter::new(7400).write(&triangle_document());
	let packed = zstd::encode_all(bytes.as_slice(), 3).expect("zstd encodes");

	let path = temp_file("triangle.fbx.zst", &packed);
	let scene = load_file(&path, &LoadOpts::default()).expect("file loads");
	assert_triangle(&scene);
	assert_eq!(scene.metadata.compression, Some(Compression::Zstd));
	assert_eq!(scene.metadata.filename.as_ref(), path.display().to_string());

	let scene = load_stream(Box::new(Cursor::new(packed)), &LoadOpts::default()).expect("stream loads");
	assert_triangle(&scene);
}

#[test]
fn missing_file_is_reported_by_path() {
	let err = load_file("does/not/exist.fbx", &LoadOpts::default()).expect_err("missing file fails");
	assert!(matches!(err.root(), FbxError::FileNotFound { path } if path.ends_with("exist.fbx")), "{err}");
}

#[test]
fn ignored_geometry_keeps_declared_sizes() {
	let bytes = BinaryWriter::new(7400).write(&triangle_document());
	let opts = LoadOpts {
		ignore_geometry: true,
		..LoadOpts::default()
	};
	let scene = load_memory(&bytes, &opts).expect("triangle loads");
	assert!(scene.metadata.geometry_ignored);
	let (_, mesh) = scene.meshes().next().expect("mesh element");
	assert!(mesh.vertices.is_empty());
	assert!(mesh.faces.is_empty());
	assert_eq!((mesh.num_vertices, mesh.num_indices), (3, 3), "declared sizes survive");
}
