use std::borrow::Cow;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::fbx::Symbol;

/// Inline values kept per node; extra scalars are read and dropped.
pub const MAX_NON_ARRAY_VALUES: usize = 8;

/// Element type of a typed array payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
	/// One byte per element, non-zero is true.
	Bool,
	/// Signed bytes.
	I8,
	/// 32-bit signed integers.
	I32,
	/// 64-bit signed integers.
	I64,
	/// 32-bit floats.
	F32,
	/// 64-bit floats.
	F64,
}

impl ArrayKind {
	/// Binary type code (`b c i l f d`).
	pub fn from_code(code: u8) -> Option<Self> {
		Some(match code {
			b'b' => Self::Bool,
			b'c' => Self::I8,
			b'i' => Self::I32,
			b'l' => Self::I64,
			b'f' => Self::F32,
			b'd' => Self::F64,
			_ => return None,
		})
	}

	/// Binary type code.
	pub fn code(self) -> u8 {
		match self {
			Self::Bool => b'b',
			Self::I8 => b'c',
			Self::I32 => b'i',
			Self::I64 => b'l',
			Self::F32 => b'f',
			Self::F64 => b'd',
		}
	}

	/// Size of one stored element in bytes.
	pub fn elem_size(self) -> usize {
		match self {
			Self::Bool | Self::I8 => 1,
			Self::I32 | Self::F32 => 4,
			Self::I64 | Self::F64 => 8,
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::I8 => "i8",
			Self::I32 => "i32",
			Self::I64 => "i64",
			Self::F32 => "f32",
			Self::F64 => "f64",
		}
	}
}

/// Typed array payload of one node.
#[derive(Debug, Clone, PartialEq)]
pub enum FbxArray {
	/// Booleans.
	Bool(Vec<bool>),
	/// Signed bytes.
	I8(Vec<i8>),
	/// 32-bit integers.
	I32(Vec<i32>),
	/// 64-bit integers.
	I64(Vec<i64>),
	/// 32-bit floats.
	F32(Vec<f32>),
	/// 64-bit floats.
	F64(Vec<f64>),
	/// Array skipped on request, only the count survives.
	Ignored {
		/// Declared element count.
		count: usize,
	},
}

macro_rules! convert_array {
	($array:expr, $ty:ty, $map:expr) => {{
		let map = $map;
		match $array {
			FbxArray::Bool(v) => v.iter().map(|&x| map(f64::from(u8::from(x)), i64::from(x))).collect::<Vec<$ty>>(),
			FbxArray::I8(v) => v.iter().map(|&x| map(f64::from(x), i64::from(x))).collect(),
			FbxArray::I32(v) => v.iter().map(|&x| map(f64::from(x), i64::from(x))).collect(),
			FbxArray::I64(v) => v.iter().map(|&x| map(x as f64, x)).collect(),
			FbxArray::F32(v) => v.iter().map(|&x| map(f64::from(x), x as i64)).collect(),
			FbxArray::F64(v) => v.iter().map(|&x| map(x, x as i64)).collect(),
			FbxArray::Ignored { .. } => Vec::new(),
		}
	}};
}

impl FbxArray {
	/// Element count, including ignored arrays.
	pub fn len(&self) -> usize {
		match self {
			Self::Bool(v) => v.len(),
			Self::I8(v) => v.len(),
			Self::I32(v) => v.len(),
			Self::I64(v) => v.len(),
			Self::F32(v) => v.len(),
			Self::F64(v) => v.len(),
			Self::Ignored { count } => *count,
		}
	}

	/// True when the array has no elements.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Stored element kind, `None` for ignored arrays.
	pub fn kind(&self) -> Option<ArrayKind> {
		Some(match self {
			Self::Bool(_) => ArrayKind::Bool,
			Self::I8(_) => ArrayKind::I8,
			Self::I32(_) => ArrayKind::I32,
			Self::I64(_) => ArrayKind::I64,
			Self::F32(_) => ArrayKind::F32,
			Self::F64(_) => ArrayKind::F64,
			Self::Ignored { .. } => return None,
		})
	}

	/// Convert to `kind`, returning `self` unchanged when it already matches.
	pub fn convert(self, kind: ArrayKind) -> Self {
		if self.kind().is_none_or(|stored| stored == kind) {
			return self;
		}
		match kind {
			ArrayKind::Bool => Self::Bool(convert_array!(&self, bool, |f: f64, _i: i64| f != 0.0)),
			ArrayKind::I8 => Self::I8(convert_array!(&self, i8, |_f: f64, i: i64| i as i8)),
			ArrayKind::I32 => Self::I32(convert_array!(&self, i32, |_f: f64, i: i64| i as i32)),
			ArrayKind::I64 => Self::I64(convert_array!(&self, i64, |_f: f64, i: i64| i)),
			ArrayKind::F32 => Self::F32(convert_array!(&self, f32, |f: f64, _i: i64| f as f32)),
			ArrayKind::F64 => Self::F64(convert_array!(&self, f64, |f: f64, _i: i64| f)),
		}
	}

	/// Values as `f64`, borrowing when no conversion is needed.
	pub fn as_f64(&self) -> Cow<'_, [f64]> {
		match self {
			Self::F64(v) => Cow::Borrowed(v),
			other => Cow::Owned(convert_array!(other, f64, |f: f64, _i: i64| f)),
		}
	}

	/// Values as `f32`, borrowing when no conversion is needed.
	pub fn as_f32(&self) -> Cow<'_, [f32]> {
		match self {
			Self::F32(v) => Cow::Borrowed(v),
			other => Cow::Owned(convert_array!(other, f32, |f: f64, _i: i64| f as f32)),
		}
	}

	/// Values as `i32`, borrowing when no conversion is needed.
	pub fn as_i32(&self) -> Cow<'_, [i32]> {
		match self {
			Self::I32(v) => Cow::Borrowed(v),
			other => Cow::Owned(convert_array!(other, i32, |_f: f64, i: i64| i as i32)),
		}
	}

	/// Values as `i64`, borrowing when no conversion is needed.
	pub fn as_i64(&self) -> Cow<'_, [i64]> {
		match self {
			Self::I64(v) => Cow::Borrowed(v),
			other => Cow::Owned(convert_array!(other, i64, |_f: f64, i: i64| i)),
		}
	}

	/// Values as booleans.
	pub fn as_bool(&self) -> Cow<'_, [bool]> {
		match self {
			Self::Bool(v) => Cow::Borrowed(v),
			other => Cow::Owned(convert_array!(other, bool, |f: f64, _i: i64| f != 0.0)),
		}
	}
}

/// One inline scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum FbxValue {
	/// Numeric value readable as either float or integer.
	Number {
		/// Float view.
		f: f64,
		/// Integer view.
		i: i64,
	},
	/// Interned string.
	Str(Symbol),
	/// Raw bytes kept verbatim.
	Blob(Arc<[u8]>),
}

impl FbxValue {
	/// Number from an integer literal.
	pub fn int(i: i64) -> Self {
		Self::Number { f: i as f64, i }
	}

	/// Number from a float literal.
	pub fn float(f: f64) -> Self {
		let i = if f.is_finite() { f as i64 } else { 0 };
		Self::Number { f, i }
	}
}

/// Parsed document node.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxNode {
	/// Interned node name.
	pub name: Symbol,
	/// Inline scalar values.
	pub values: SmallVec<[FbxValue; MAX_NON_ARRAY_VALUES]>,
	/// Array payload, exclusive with `values`.
	pub array: Option<FbxArray>,
	/// Child nodes in file order.
	pub children: Vec<FbxNode>,
}

impl FbxNode {
	/// Node without values or children.
	pub fn new(name: Symbol) -> Self {
		Self {
			name,
			values: SmallVec::new(),
			array: None,
			children: Vec::new(),
		}
	}

	/// First child named `name`.
	pub fn child(&self, name: Symbol) -> Option<&FbxNode> {
		self.children.iter().find(|child| child.name == name)
	}

	/// All children named `name`.
	pub fn children_named(&self, name: Symbol) -> impl Iterator<Item = &FbxNode> {
		self.children.iter().filter(move |child| child.name == name)
	}

	/// Value slot as integer.
	pub fn value_i64(&self, index: usize) -> Option<i64> {
		match self.values.get(index)? {
			FbxValue::Number { i, .. } => Some(*i),
			_ => None,
		}
	}

	/// Value slot as float.
	pub fn value_f64(&self, index: usize) -> Option<f64> {
		match self.values.get(index)? {
			FbxValue::Number { f, .. } => Some(*f),
			_ => None,
		}
	}

	/// Value slot as string symbol.
	pub fn value_str(&self, index: usize) -> Option<Symbol> {
		match self.values.get(index)? {
			FbxValue::Str(symbol) => Some(*symbol),
			_ => None,
		}
	}

	/// Value slot as raw bytes.
	pub fn value_blob(&self, index: usize) -> Option<&Arc<[u8]>> {
		match self.values.get(index)? {
			FbxValue::Blob(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// First integer value of child `name`.
	pub fn child_i64(&self, name: Symbol) -> Option<i64> {
		self.child(name)?.value_i64(0)
	}

	/// First float value of child `name`.
	pub fn child_f64(&self, name: Symbol) -> Option<f64> {
		self.child(name)?.value_f64(0)
	}

	/// First string value of child `name`.
	pub fn child_str(&self, name: Symbol) -> Option<Symbol> {
		self.child(name)?.value_str(0)
	}

	/// Array payload of child `name`.
	pub fn child_array(&self, name: Symbol) -> Option<&FbxArray> {
		self.child(name)?.array.as_ref()
	}
}
