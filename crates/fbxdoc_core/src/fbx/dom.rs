use std::sync::Arc;

use crate::fbx::{FbxArray, FbxNode, FbxValue, StringPool};

/// Scalar value of a retained DOM node.
#[derive(Debug, Clone, PartialEq)]
pub enum DomValue {
	/// Number in both views.
	Number {
		/// Float view.
		f: f64,
		/// Integer view.
		i: i64,
	},
	/// Sanitized string.
	Str(Arc<str>),
	/// Raw bytes.
	Blob(Arc<[u8]>),
}

impl DomValue {
	/// Integer view of a number.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Number { i, .. } => Some(*i),
			_ => None,
		}
	}

	/// Float view of a number.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number { f, .. } => Some(*f),
			_ => None,
		}
	}

	/// String view.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(text) => Some(text),
			_ => None,
		}
	}
}

/// Lossless copy of one document node kept after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
	/// Node name.
	pub name: Arc<str>,
	/// Inline values.
	pub values: Vec<DomValue>,
	/// Array payload.
	pub array: Option<FbxArray>,
	/// Child nodes.
	pub children: Vec<DomNode>,
}

impl DomNode {
	/// Copy `node` and its subtree, resolving symbols through `pool`.
	pub fn from_node(node: &FbxNode, pool: &StringPool) -> Self {
		Self {
			name: pool.arc(node.name),
			values: node
				.values
				.iter()
				.map(|value| match value {
					FbxValue::Number { f, i } => DomValue::Number { f: *f, i: *i },
					FbxValue::Str(symbol) => DomValue::Str(pool.arc(*symbol)),
					FbxValue::Blob(bytes) => DomValue::Blob(Arc::clone(bytes)),
				})
				.collect(),
			array: node.array.clone(),
			children: node.children.iter().map(|child| Self::from_node(child, pool)).collect(),
		}
	}

	/// Root node holding top-level nodes as children.
	pub fn root(children: Vec<DomNode>) -> Self {
		Self {
			name: Arc::from(""),
			values: Vec::new(),
			array: None,
			children,
		}
	}

	/// First direct child named `name`.
	pub fn find(&self, name: &str) -> Option<&DomNode> {
		self.children.iter().find(|child| &*child.name == name)
	}

	/// Follow a path of child names.
	pub fn find_path(&self, path: &[&str]) -> Option<&DomNode> {
		path.iter().try_fold(self, |node, name| node.find(name))
	}

	/// Total number of nodes in this subtree, including `self`.
	pub fn count(&self) -> usize {
		1 + self.children.iter().map(DomNode::count).sum::<usize>()
	}
}

#[cfg(test)]
mod tests {
	use crate::fbx::{Allocator, DomNode, DomValue, FbxArray, FbxNode, FbxValue, StringPool, UnicodeErrorHandling};

	#[test]
	fn copies_subtree_with_resolved_names() {
		let mut pool = StringPool::new(&Allocator::default(), UnicodeErrorHandling::default());
		let objects = pool.intern(b"Objects").expect("intern");
		let model = pool.intern(b"Model").expect("intern");
		let name = pool.intern(b"Model::Cube").expect("intern");
		let vertices = pool.intern(b"Vertices").expect("intern");

		let mut child = FbxNode::new(model);
		child.values.push(FbxValue::int(42));
		child.values.push(FbxValue::Str(name));
		let mut array = FbxNode::new(vertices);
		array.array = Some(FbxArray::F64(vec![0.0, 1.0]));
		child.children.push(array);
		let mut root = FbxNode::new(objects);
		root.children.push(child);

		let dom = DomNode::root(vec![DomNode::from_node(&root, &pool)]);
		let node = dom.find_path(&["Objects", "Model"]).expect("model");
		assert_eq!(node.values[0].as_i64(), Some(42));
		assert_eq!(node.values[1], DomValue::Str("Model::Cube".into()));
		assert_eq!(node.find("Vertices").and_then(|v| v.array.as_ref()).map(FbxArray::len), Some(2));
		assert_eq!(dom.count(), 4);
	}
}
