#![allow(missing_docs)]

use fbxdoc::fbx::names as n;
use fbxdoc::fbx::{
	Allocator, FbxNode, FbxValue, FileFormat, InputStream, LoadOpts, ParseOpts, ParseState, Parser, StringPool,
	UnicodeErrorHandling, load_memory,
};

const MODEL_SNIPPET: &str = "Model: \"Model::Foo\", \"Mesh\" {\n\tVersion: 232\n}\n";

fn parse_ascii(text: &str) -> (Vec<FbxNode>, StringPool) {
	let alloc = Allocator::default();
	let pool = StringPool::new(&alloc, UnicodeErrorHandling::default());
	let mut parser =
		Parser::new(InputStream::from_memory(text.as_bytes()), pool, &alloc, ParseOpts::default()).expect("parser opens");
	assert_eq!(parser.format(), FileFormat::Ascii);
	let mut nodes = Vec::new();
	while let Some(node) = parser.parse_node(0, ParseState::Root, true).expect("node parses") {
		nodes.push(node);
	}
	(nodes, parser.into_pool())
}

#[test]
fn model_snippet_tokenizes_into_one_node() {
	let (nodes, pool) = parse_ascii(MODEL_SNIPPET);
	assert_eq!(nodes.len(), 1);

	let model = &nodes[0];
	assert_eq!(pool.get(model.name), "Model");
	assert_eq!(model.values.len(), 2);
	assert_eq!(model.value_str(0).map(|symbol| pool.get(symbol)), Some("Model::Foo"));
	assert_eq!(model.value_str(1).map(|symbol| pool.get(symbol)), Some("Mesh"));

	assert_eq!(model.children.len(), 1);
	let version = &model.children[0];
	assert_eq!(version.name, n::VERSION);
	assert_eq!(version.values.as_slice(), [FbxValue::int(232)]);
	assert!(version.array.is_none());
}

#[test]
fn retained_dom_mirrors_the_snippet() {
	let text = format!("; FBX 7.4.0 project file\nObjects: {{\n{MODEL_SNIPPET}}}\n");
	let opts = LoadOpts {
		retain_dom: true,
		..LoadOpts::default()
	};
	let scene = load_memory(text.as_bytes(), &opts).expect("snippet loads");
	let dom = scene.dom_root.as_ref().expect("dom retained");

	let model = dom.find_path(&["Objects", "Model"]).expect("model in dom");
	assert_eq!(model.values.len(), 2);
	assert_eq!(model.values[0].as_str(), Some("Model::Foo"));
	assert_eq!(model.values[1].as_str(), Some("Mesh"));
	assert_eq!(model.find("Version").and_then(|version| version.values[0].as_i64()), Some(232));

	let foo = scene.find_node("Foo").expect("model without an id still becomes a node");
	assert_eq!(scene.element_dom(foo.element_id).map(|node| &*node.name), Some("Model"));
}

#[test]
fn dom_is_dropped_by_default() {
	let text = format!("; FBX 7.4.0 project file\nObjects: {{\n{MODEL_SNIPPET}}}\n");
	let scene = load_memory(text.as_bytes(), &LoadOpts::default()).expect("snippet loads");
	assert!(scene.dom_root.is_none());
}
