use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use fbxdoc_testkit::{
	Array, BinaryWriter, Node, binary_object_name, stdout_json, target_dir as workspace_target_dir, temp_file,
};

static FBXDOC_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn run_fbxdoc(args: &[&str]) -> Output {
	Command::new(fbxdoc_bin()).args(args).output().expect("fbxdoc command executes")
}

pub(crate) fn run_fbxdoc_json(args: &[&str]) -> serde_json::Value {
	stdout_json(&run_fbxdoc(args))
}

fn object(class: &str, id: i64, name: &str, sub_type: &str) -> Node {
	Node::new(class)
		.value(id)
		.value(binary_object_name(&format!("{class}::{name}")).as_str())
		.value(sub_type)
}

fn connect(kind: &str, src: i64, dst: i64) -> Node {
	Node::new("C").value(kind).value(src).value(dst)
}

/// Cube node with a quad mesh and a material, its X translation animated
/// from 0 to 10 over one second.
pub(crate) fn scene_file(name: &str) -> String {
	let curve = object("AnimationCurve", 23, "", "")
		.child(Node::new("KeyTime").array(Array::I64(vec![0, 46_186_158_000])))
		.child(Node::new("KeyValueFloat").array(Array::F32(vec![0.0, 10.0])))
		.child(Node::new("KeyAttrFlags").array(Array::I32(vec![0x4])))
		.child(Node::new("KeyAttrRefCount").array(Array::I32(vec![2])));
	let bytes = BinaryWriter::new(7400).write(&[
		Node::new("FBXHeaderExtension").child(Node::new("FBXVersion").value(7400_i32)),
		Node::new("Objects").children([
			object("Model", 10, "Cube", "Mesh").child(Node::properties70([Node::prop(
				"Lcl Translation",
				"Lcl Translation",
				"",
				"A",
				[0.0, 1.0, 0.0],
			)])),
			object("Geometry", 11, "Cube", "Mesh")
				.child(Node::new("Vertices").array(Array::F64(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0])))
				.child(Node::new("PolygonVertexIndex").array(Array::I32(vec![0, 1, 2, -4]))),
			object("Material", 12, "Paint", "").child(Node::properties70([Node::prop(
				"DiffuseColor",
				"Color",
				"",
				"A",
				[1.0, 0.0, 0.0],
			)])),
			object("AnimationStack", 20, "Take", ""),
			object("AnimationLayer", 21, "Base", ""),
			object("AnimationCurveNode", 22, "T", "").child(Node::properties70([
				Node::prop("d|X", "Number", "", "A", [0.0]),
				Node::prop("d|Y", "Number", "", "A", [1.0]),
				Node::prop("d|Z", "Number", "", "A", [0.0]),
			])),
			curve,
		]),
		Node::new("Connections").children([
			connect("OO", 10, 0),
			connect("OO", 11, 10),
			connect("OO", 12, 10),
			connect("OO", 21, 20),
			connect("OO", 22, 21),
			connect("OP", 22, 10).value("Lcl Translation"),
			connect("OP", 23, 22).value("d|X"),
		]),
	]);
	temp_file(name, &bytes).to_string_lossy().into_owned()
}

fn fbxdoc_bin() -> &'static PathBuf {
	FBXDOC_BIN.get_or_init(resolve_fbxdoc_bin)
}

fn resolve_fbxdoc_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_fbxdoc") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "fbxdoc.exe" } else { "fbxdoc" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "fbxdoc"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build fbxdoc binary at {}", bin.display());

	bin
}
