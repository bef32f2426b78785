use fbxdoc_testkit::{Array, AsciiWriter, BinaryWriter, Node, binary_object_name};

use crate::fbx::names as n;
use crate::fbx::{
	Allocator, ErrorKind, FbxArray, FbxError, FbxNode, FileFormat, InputStream, ParseOpts, ParseState, Parser, StringPool,
	UnicodeErrorHandling,
};

fn parser(bytes: &[u8], opts: ParseOpts) -> Parser<'_> {
	let alloc = Allocator::default();
	let pool = StringPool::new(&alloc, UnicodeErrorHandling::default());
	Parser::new(InputStream::from_memory(bytes), pool, &alloc, opts).expect("parser opens")
}

fn parse_all(parser: &mut Parser<'_>) -> Vec<FbxNode> {
	let mut nodes = Vec::new();
	while let Some(node) = parser.parse_node(0, ParseState::Root, true).expect("node parses") {
		nodes.push(node);
	}
	nodes
}

fn mesh_document() -> Vec<Node> {
	vec![
		Node::new("Objects").child(
			Node::new("Geometry")
				.value(42_i64)
				.value(binary_object_name("Geometry::Quad").as_str())
				.value("Mesh")
				.child(Node::new("Vertices").array(Array::F64(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0])))
				.child(Node::new("PolygonVertexIndex").deflate_array(Array::I32(vec![0, 1, -3]))),
		),
	]
}

#[test]
fn ascii_model_node_with_children() {
	let text = "; FBX 7.4.0 project file\nModel: \"Model::Foo\", \"Mesh\" {\n\tVersion: 232\n}\n";
	let mut parser = parser(text.as_bytes(), ParseOpts::default());
	assert_eq!(parser.format(), FileFormat::Ascii);
	assert_eq!(parser.version(), 7400);

	let nodes = parse_all(&mut parser);
	assert_eq!(nodes.len(), 1);
	let model = &nodes[0];
	assert_eq!(model.name, n::MODEL);
	let pool = parser.pool();
	assert_eq!(pool.get(model.value_str(0).expect("name value")), "Model::Foo");
	assert_eq!(pool.get(model.value_str(1).expect("sub-type value")), "Mesh");
	assert_eq!(model.child_i64(n::VERSION), Some(232));
}

#[test]
fn ascii_version_comment_and_entities() {
	let text = "; FBX 7.7.0 project file\nCreator: \"a&quot;b&lf;c & d\"\n";
	let mut parser = parser(text.as_bytes(), ParseOpts::default());
	assert_eq!(parser.version(), 7700);
	let nodes = parse_all(&mut parser);
	let creator = nodes[0].value_str(0).expect("string value");
	assert_eq!(parser.pool().get(creator), "a\"b\nc & d");
}

#[test]
fn ascii_without_comment_has_no_version() {
	let mut parser = parser(b"Creator: \"x\"\n", ParseOpts::default());
	assert_eq!(parser.version(), 0);
	assert_eq!(parse_all(&mut parser).len(), 1);
}

#[test]
fn ascii_and_binary_documents_agree() {
	let document = mesh_document();
	let binary = BinaryWriter::new(7400).write(&document);
	let ascii = AsciiWriter::new(7400).write(&[Node::new("Objects").child(
		Node::new("Geometry")
			.value(42_i64)
			.value("Geometry::Quad")
			.value("Mesh")
			.child(Node::new("Vertices").array(Array::F64(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0])))
			.child(Node::new("PolygonVertexIndex").array(Array::I32(vec![0, 1, -3]))),
	)]);

	for bytes in [binary, ascii.into_bytes()] {
		let mut parser = parser(&bytes, ParseOpts::default());
		let nodes = parse_all(&mut parser);
		let geometry = &nodes[0].children[0];
		assert_eq!(geometry.value_i64(0), Some(42));
		assert_eq!(parser.pool().get(geometry.value_str(1).expect("name")), "Geometry::Quad");
		assert_eq!(
			geometry.child_array(n::VERTICES).map(|array| array.as_f64().len()),
			Some(9)
		);
		assert_eq!(
			geometry.child_array(n::POLYGON_VERTEX_INDEX),
			Some(&FbxArray::I32(vec![0, 1, -3]))
		);
	}
}

#[test]
fn wide_big_endian_records_parse() {
	let writer = BinaryWriter {
		version: 7500,
		big_endian: true,
	};
	let bytes = writer.write(&mesh_document());
	let mut parser = parser(&bytes, ParseOpts::default());
	assert_eq!(parser.version(), 7500);
	let nodes = parse_all(&mut parser);
	let geometry = &nodes[0].children[0];
	assert_eq!(
		geometry.child_array(n::VERTICES).map(|array| array.as_f64()[3]),
		Some(1.0)
	);
}

#[test]
fn non_recursive_walk_visits_children_in_order() {
	let bytes = BinaryWriter::new(7400).write(&[
		Node::new("Objects").children([
			Node::new("Model").value(1_i64).child(Node::new("Version").value(232)),
			Node::new("Material").value(2_i64),
		]),
		Node::new("Connections"),
	]);
	let mut parser = parser(&bytes, ParseOpts::default());

	let objects = parser.parse_node(0, ParseState::Root, false).expect("parses").expect("objects");
	assert_eq!(objects.name, n::OBJECTS);
	assert!(objects.children.is_empty());

	let state = ParseState::Root.child(n::OBJECTS);
	let mut ids = Vec::new();
	while let Some(object) = parser.parse_node(1, state, true).expect("object parses") {
		ids.push(object.value_i64(0).expect("id"));
		if object.name == n::MODEL {
			assert_eq!(object.child_i64(n::VERSION), Some(232));
		}
	}
	assert_eq!(ids, vec![1, 2]);

	let connections = parser.parse_node(0, ParseState::Root, true).expect("parses").expect("connections");
	assert_eq!(connections.name, n::CONNECTIONS);
	assert!(parser.parse_node(0, ParseState::Root, true).expect("sentinel").is_none());
}

#[test]
fn skip_children_resumes_at_next_sibling() {
	let text = "Objects: {\n\tModel: 1 {\n\t\tVersion: 232\n\t}\n}\nConnections: {\n}\n";
	let mut parser = parser(text.as_bytes(), ParseOpts::default());
	parser.parse_node(0, ParseState::Root, false).expect("parses").expect("objects");
	parser.skip_children(0).expect("skips");
	let next = parser.parse_node(0, ParseState::Root, true).expect("parses").expect("connections");
	assert_eq!(next.name, n::CONNECTIONS);
}

#[test]
fn ignored_geometry_keeps_counts() {
	let bytes = BinaryWriter::new(7400).write(&mesh_document());
	let opts = ParseOpts {
		ignore_geometry: true,
		..ParseOpts::default()
	};
	let mut parser = parser(&bytes, opts);
	let nodes = parse_all(&mut parser);
	let geometry = &nodes[0].children[0];
	assert_eq!(geometry.child_array(n::VERTICES), Some(&FbxArray::Ignored { count: 9 }));
	assert_eq!(
		geometry.child_array(n::POLYGON_VERTEX_INDEX),
		Some(&FbxArray::Ignored { count: 3 })
	);
}

#[test]
fn legacy_scalar_runs_become_arrays() {
	let bytes = BinaryWriter::new(6100).write(&[Node::new("Objects").child(
		Node::new("Model")
			.value(binary_object_name("Model::Tri").as_str())
			.value("Mesh")
			.child(Node::new("Vertices").values([0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 2.0, 2.0]))
			.child(Node::new("PolygonVertexIndex").values([0, 1, -3])),
	)]);
	let mut parser = parser(&bytes, ParseOpts::default());
	let nodes = parse_all(&mut parser);
	let model = &nodes[0].children[0];
	assert_eq!(parser.pool().get(model.value_str(0).expect("name")), "Model::Tri");
	assert_eq!(model.child_array(n::VERTICES).map(FbxArray::len), Some(12));
	assert_eq!(
		model.child_array(n::POLYGON_VERTEX_INDEX),
		Some(&FbxArray::I32(vec![0, 1, -3]))
	);
}

#[test]
fn nesting_beyond_cap_fails() {
	let depth = 70;
	let mut text = String::new();
	for _ in 0..depth {
		text.push_str("Node: {\n");
	}
	for _ in 0..depth {
		text.push_str("}\n");
	}
	let mut parser = parser(text.as_bytes(), ParseOpts::default());
	let err = parser.parse_node(0, ParseState::Root, true).expect_err("too deep");
	assert!(matches!(err, FbxError::NodeDepthExceeded { max_depth: 64 }));
}

#[test]
fn garbage_is_not_fbx() {
	let alloc = Allocator::default();
	let pool = StringPool::new(&alloc, UnicodeErrorHandling::default());
	let result = Parser::new(InputStream::from_memory(b"hello world"), pool, &alloc, ParseOpts::default());
	let err = result.err().expect("rejected");
	assert_eq!(err.kind(), ErrorKind::NotFbx);
}

#[test]
fn strict_ascii_requires_known_start() {
	let alloc = Allocator::default();
	let opts = ParseOpts {
		strict: true,
		..ParseOpts::default()
	};
	let pool = StringPool::new(&alloc, UnicodeErrorHandling::default());
	let result = Parser::new(InputStream::from_memory(b"Foo: 1\n"), pool, &alloc, opts);
	assert!(matches!(result, Err(FbxError::NotFbx)));

	let pool = StringPool::new(&alloc, UnicodeErrorHandling::default());
	assert!(Parser::new(InputStream::from_memory(b"Objects: {\n}\n"), pool, &alloc, opts).is_ok());
}

#[test]
fn truncated_binary_reports_offset() {
	let mut bytes = BinaryWriter::new(7400).write(&mesh_document());
	bytes.truncate(60);
	let mut parser = parser(&bytes, ParseOpts::default());
	let err = parser.parse_node(0, ParseState::Root, true).expect_err("truncated");
	assert_eq!(err.kind(), ErrorKind::TruncatedFile);
}
