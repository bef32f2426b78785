//! Shared test helpers for workspace crates.
//!
//! The writers build small binary and ASCII FBX documents in memory so tests
//! never depend on fixture files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Output;

use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Write `bytes` to a uniquely named file under the target directory.
pub fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
	let dir = target_dir().join("fbxdoc-test-files");
	std::fs::create_dir_all(&dir).expect("temp dir is creatable");
	let path = dir.join(format!("{}-{name}", std::process::id()));
	std::fs::write(&path, bytes).expect("temp file is writable");
	path
}

/// Parse the stdout of a successful command as JSON.
pub fn stdout_json(output: &Output) -> serde_json::Value {
	assert!(
		output.status.success(),
		"command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

/// zlib-compress `data` with the reference encoder.
pub fn zlib_compress(data: &[u8]) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data).expect("in-memory write succeeds");
	encoder.finish().expect("in-memory finish succeeds")
}

/// Scalar property of a synthetic node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// `Y`
	I16(i16),
	/// `C`
	Bool(bool),
	/// `I`
	I32(i32),
	/// `L`
	I64(i64),
	/// `F`
	F32(f32),
	/// `D`
	F64(f64),
	/// `S`, written verbatim in binary.
	Str(String),
	/// `R`
	Raw(Vec<u8>),
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::I32(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::I64(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::F64(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

/// Array property of a synthetic node.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
	/// `b`
	Bool(Vec<bool>),
	/// `i`
	I32(Vec<i32>),
	/// `l`
	I64(Vec<i64>),
	/// `f`
	F32(Vec<f32>),
	/// `d`
	F64(Vec<f64>),
}

impl Array {
	fn code(&self) -> u8 {
		match self {
			Self::Bool(_) => b'b',
			Self::I32(_) => b'i',
			Self::I64(_) => b'l',
			Self::F32(_) => b'f',
			Self::F64(_) => b'd',
		}
	}

	fn len(&self) -> usize {
		match self {
			Self::Bool(values) => values.len(),
			Self::I32(values) => values.len(),
			Self::I64(values) => values.len(),
			Self::F32(values) => values.len(),
			Self::F64(values) => values.len(),
		}
	}

	fn bytes(&self, big_endian: bool) -> Vec<u8> {
		macro_rules! encode {
			($values:expr) => {
				$values
					.iter()
					.flat_map(|value| if big_endian { value.to_be_bytes() } else { value.to_le_bytes() })
					.collect()
			};
		}
		match self {
			Self::Bool(values) => values.iter().map(|&value| u8::from(value)).collect(),
			Self::I32(values) => encode!(values),
			Self::I64(values) => encode!(values),
			Self::F32(values) => encode!(values),
			Self::F64(values) => encode!(values),
		}
	}

	fn ascii_items(&self) -> Vec<String> {
		match self {
			Self::Bool(values) => values.iter().map(|&value| u8::from(value).to_string()).collect(),
			Self::I32(values) => values.iter().map(ToString::to_string).collect(),
			Self::I64(values) => values.iter().map(ToString::to_string).collect(),
			Self::F32(values) => values.iter().map(|value| format_float(f64::from(*value))).collect(),
			Self::F64(values) => values.iter().map(|value| format_float(*value)).collect(),
		}
	}
}

fn format_float(value: f64) -> String {
	if value.fract() == 0.0 && value.abs() < 1e15 {
		format!("{value:.1}")
	} else {
		format!("{value}")
	}
}

/// Node of a synthetic document.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
	/// Node name.
	pub name: String,
	/// Scalar properties.
	pub values: Vec<Value>,
	/// Array property and whether it is DEFLATE-encoded.
	pub array: Option<(Array, bool)>,
	/// Children.
	pub children: Vec<Node>,
}

impl Node {
	/// Node without properties or children.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			values: Vec::new(),
			array: None,
			children: Vec::new(),
		}
	}

	/// Append a scalar property.
	pub fn value(mut self, value: impl Into<Value>) -> Self {
		self.values.push(value.into());
		self
	}

	/// Append several scalar properties.
	pub fn values<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
		self.values.extend(values.into_iter().map(Into::into));
		self
	}

	/// Set a raw-encoded array property.
	pub fn array(mut self, array: Array) -> Self {
		self.array = Some((array, false));
		self
	}

	/// Set a DEFLATE-encoded array property.
	pub fn deflate_array(mut self, array: Array) -> Self {
		self.array = Some((array, true));
		self
	}

	/// Append a child node.
	pub fn child(mut self, child: Node) -> Self {
		self.children.push(child);
		self
	}

	/// Append several child nodes.
	pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
		self.children.extend(children);
		self
	}

	/// `Properties70` block from `P` records.
	pub fn properties70(props: impl IntoIterator<Item = Node>) -> Self {
		Self::new("Properties70").children(props)
	}

	/// `P: name, type, label, flags, values...` record.
	pub fn prop<V: Into<Value>>(name: &str, ty: &str, label: &str, flags: &str, values: impl IntoIterator<Item = V>) -> Self {
		Self::new("P").value(name).value(ty).value(label).value(flags).values(values)
	}
}

/// Binary name spelling of an ASCII `Class::Name` string.
pub fn binary_object_name(class_and_name: &str) -> String {
	match class_and_name.split_once("::") {
		Some((class, name)) => format!("{name}\0\u{1}{class}"),
		None => class_and_name.to_owned(),
	}
}

/// Writer for binary FBX documents.
#[derive(Debug, Clone, Copy)]
pub struct BinaryWriter {
	/// Header version; `>= 7500` uses 64-bit records.
	pub version: u32,
	/// Write big-endian records.
	pub big_endian: bool,
}

impl BinaryWriter {
	/// Little-endian writer for `version`.
	pub fn new(version: u32) -> Self {
		Self { version, big_endian: false }
	}

	/// Serialize `nodes` as a complete document.
	pub fn write(&self, nodes: &[Node]) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(b"Kaydara FBX Binary  \x00\x1a");
		out.push(u8::from(self.big_endian));
		self.put_u32(&mut out, self.version);
		for node in nodes {
			self.write_node(&mut out, node);
		}
		self.write_null(&mut out);
		out
	}

	fn wide(&self) -> bool {
		self.version >= 7500
	}

	fn put_u32(&self, out: &mut Vec<u8>, value: u32) {
		out.extend_from_slice(&if self.big_endian { value.to_be_bytes() } else { value.to_le_bytes() });
	}

	fn put_word(&self, out: &mut Vec<u8>, value: u64) {
		if self.wide() {
			out.extend_from_slice(&if self.big_endian { value.to_be_bytes() } else { value.to_le_bytes() });
		} else {
			self.put_u32(out, value as u32);
		}
	}

	fn patch_word(&self, out: &mut [u8], at: usize, value: u64) {
		if self.wide() {
			let bytes = if self.big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
			out[at..at + 8].copy_from_slice(&bytes);
		} else {
			let value = value as u32;
			let bytes = if self.big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
			out[at..at + 4].copy_from_slice(&bytes);
		}
	}

	fn write_null(&self, out: &mut Vec<u8>) {
		let len = if self.wide() { 25 } else { 13 };
		out.extend(std::iter::repeat_n(0_u8, len));
	}

	fn write_node(&self, out: &mut Vec<u8>, node: &Node) {
		let word = if self.wide() { 8 } else { 4 };
		let header_at = out.len();
		self.put_word(out, 0);
		self.put_word(out, (node.values.len() + usize::from(node.array.is_some())) as u64);
		self.put_word(out, 0);
		out.push(node.name.len() as u8);
		out.extend_from_slice(node.name.as_bytes());

		let values_at = out.len();
		for value in &node.values {
			self.write_value(out, value);
		}
		if let Some((array, deflate)) = &node.array {
			self.write_array(out, array, *deflate);
		}
		let values_len = (out.len() - values_at) as u64;

		if !node.children.is_empty() {
			for child in &node.children {
				self.write_node(out, child);
			}
			self.write_null(out);
		}
		let end = out.len() as u64;
		self.patch_word(out, header_at, end);
		self.patch_word(out, header_at + 2 * word, values_len);
	}

	fn write_value(&self, out: &mut Vec<u8>, value: &Value) {
		let be = self.big_endian;
		match value {
			Value::I16(v) => {
				out.push(b'Y');
				out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() });
			}
			Value::Bool(v) => {
				out.push(b'C');
				out.push(u8::from(*v));
			}
			Value::I32(v) => {
				out.push(b'I');
				out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() });
			}
			Value::I64(v) => {
				out.push(b'L');
				out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() });
			}
			Value::F32(v) => {
				out.push(b'F');
				out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() });
			}
			Value::F64(v) => {
				out.push(b'D');
				out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() });
			}
			Value::Str(text) => {
				out.push(b'S');
				self.put_u32(out, text.len() as u32);
				out.extend_from_slice(text.as_bytes());
			}
			Value::Raw(bytes) => {
				out.push(b'R');
				self.put_u32(out, bytes.len() as u32);
				out.extend_from_slice(bytes);
			}
		}
	}

	fn write_array(&self, out: &mut Vec<u8>, array: &Array, deflate: bool) {
		let raw = array.bytes(self.big_endian);
		let (encoding, payload) = if deflate { (1, zlib_compress(&raw)) } else { (0, raw) };
		out.push(array.code());
		self.put_u32(out, array.len() as u32);
		self.put_u32(out, encoding);
		self.put_u32(out, payload.len() as u32);
		out.extend_from_slice(&payload);
	}
}

/// Writer for ASCII FBX documents.
#[derive(Debug, Clone, Copy)]
pub struct AsciiWriter {
	/// Version written in the magic comment, `None` to omit it.
	pub version: Option<u32>,
}

impl AsciiWriter {
	/// Writer emitting the `; FBX x.y.z project file` comment.
	pub fn new(version: u32) -> Self {
		Self { version: Some(version) }
	}

	/// Serialize `nodes` as a complete document.
	pub fn write(&self, nodes: &[Node]) -> String {
		let mut out = String::new();
		if let Some(version) = self.version {
			out.push_str(&format!(
				"; FBX {}.{}.{} project file\n",
				version / 1000,
				version % 1000 / 100,
				version % 100 / 10
			));
		}
		for node in nodes {
			write_ascii_node(&mut out, node, 0);
		}
		out
	}
}

/// Quote a string value, writing binary `Name\0\x01Class` names as `Class::Name`.
fn quote(text: &str) -> String {
	let text = match text.split_once("\0\u{1}") {
		Some((name, class)) => format!("{class}::{name}"),
		None => text.to_owned(),
	};
	format!("\"{}\"", text.replace('"', "&quot;"))
}

fn write_ascii_node(out: &mut String, node: &Node, depth: usize) {
	let indent = "\t".repeat(depth);
	out.push_str(&format!("{indent}{}: ", node.name));
	let mut items: Vec<String> = node
		.values
		.iter()
		.map(|value| match value {
			Value::I16(v) => v.to_string(),
			Value::Bool(v) => if *v { "T" } else { "F" }.to_owned(),
			Value::I32(v) => v.to_string(),
			Value::I64(v) => v.to_string(),
			Value::F32(v) => format_float(f64::from(*v)),
			Value::F64(v) => format_float(*v),
			Value::Str(text) => quote(text),
			Value::Raw(bytes) => quote(&String::from_utf8_lossy(bytes)),
		})
		.collect();

	if let Some((array, _)) = &node.array {
		items.push(format!("*{} {{\n{indent}\ta: {}\n{indent}}}", array.len(), array.ascii_items().join(",")));
	}
	out.push_str(&items.join(", "));

	if node.children.is_empty() {
		out.push('\n');
		return;
	}
	out.push_str(" {\n");
	for child in &node.children {
		write_ascii_node(out, child, depth + 1);
	}
	out.push_str(&format!("{indent}}}\n"));
}

#[cfg(test)]
mod tests {
	use super::{Array, AsciiWriter, BinaryWriter, Node, binary_object_name};

	#[test]
	fn binary_document_has_header_and_sentinel() {
		let bytes = BinaryWriter::new(7400).write(&[Node::new("Creator").value("test")]);
		assert!(bytes.starts_with(b"Kaydara FBX Binary  \x00\x1a\x00"));
		assert_eq!(&bytes[23..27], &7400_u32.to_le_bytes());
		assert!(bytes.ends_with(&[0_u8; 13]));
	}

	#[test]
	fn ascii_array_uses_count_block() {
		let text = AsciiWriter::new(7400).write(&[Node::new("Vertices").array(Array::F64(vec![0.0, 1.5]))]);
		assert!(text.starts_with("; FBX 7.4.0 project file\n"));
		assert!(text.contains("Vertices: *2 {\n\ta: 0.0,1.5\n}"));
	}

	#[test]
	fn object_names_swap_for_binary() {
		assert_eq!(binary_object_name("Model::Cube"), "Cube\0\u{1}Model");
		assert_eq!(binary_object_name("plain"), "plain");
	}

	#[test]
	fn ascii_writes_class_first_object_names() {
		let object = Node::new("Model").value(10_i64).value(binary_object_name("Model::Cube").as_str());
		let text = AsciiWriter::new(7400).write(&[object]);
		assert!(text.contains("Model: 10, \"Model::Cube\""), "text: {text}");
		assert!(!text.contains('\0'));
	}
}
