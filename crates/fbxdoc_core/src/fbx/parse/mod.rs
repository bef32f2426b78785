//! Pull parser over binary and ASCII FBX documents.
//!
//! [`Parser::parse_node`] returns one node per call. In recursive mode the node
//! comes back with its whole subtree; in non-recursive mode only its values are
//! read and the caller walks the children with further calls at `depth + 1`
//! until `None` marks the end of the child list.

mod ascii;
mod binary;
mod node;
mod state;

use crate::fbx::{
	Allocator, Buf, BufMode, FbxError, FbxHeader, FileFormat, InflateRetain, InputStream, Result, StringPool, Symbol,
};

pub use node::{ArrayKind, FbxArray, FbxNode, FbxValue, MAX_NON_ARRAY_VALUES};
pub use state::{ArrayRequest, ParseState};

use ascii::Lexer;

/// Hard cap on node nesting.
pub const MAX_NODE_DEPTH: u32 = 64;

/// Parser behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOpts {
	/// Replace geometry arrays with [`FbxArray::Ignored`].
	pub ignore_geometry: bool,
	/// Replace keyframe arrays with [`FbxArray::Ignored`].
	pub ignore_animation: bool,
	/// Drop embedded file content.
	pub ignore_embedded: bool,
	/// Reject ASCII input that does not start like an FBX document.
	pub strict: bool,
}

/// Child list left open by a non-recursive parse.
#[derive(Debug, Clone, Copy)]
enum OpenNode {
	/// Binary record ending at an absolute offset.
	Binary { end: u64 },
	/// ASCII node, `block` when a `{` was consumed.
	Ascii { block: bool },
}

/// Pull parser producing [`FbxNode`] trees.
pub struct Parser<'a> {
	stream: InputStream<'a>,
	format: FileFormat,
	header: Option<FbxHeader>,
	version: u32,
	pool: StringPool,
	alloc: Allocator,
	opts: ParseOpts,
	stack: Buf<FbxNode>,
	open: Vec<OpenNode>,
	retain: InflateRetain,
	lexer: Lexer,
}

impl<'a> Parser<'a> {
	/// Detect the format of `stream` and read its header.
	pub fn new(mut stream: InputStream<'a>, pool: StringPool, alloc: &Allocator, opts: ParseOpts) -> Result<Self> {
		stream.fill(FbxHeader::SIZE)?;
		let head = stream.peek(stream.buffered().min(FbxHeader::SIZE))?.unwrap_or_default();
		let format = FileFormat::detect(head);

		let mut header = None;
		let mut version = 0;
		if format == FileFormat::Binary {
			let parsed = FbxHeader::parse(head)?;
			stream.skip(FbxHeader::SIZE as u64)?;
			version = parsed.version;
			header = Some(parsed);
		}

		let mut parser = Self {
			stream,
			format,
			header,
			version,
			pool,
			alloc: alloc.clone(),
			opts,
			stack: Buf::new(alloc, BufMode::Ordered),
			open: Vec::new(),
			retain: InflateRetain::new(),
			lexer: Lexer::new(),
		};
		if format == FileFormat::Ascii {
			parser.ascii_prologue()?;
		}
		log::debug!("detected {} fbx, version {}", format.as_str(), parser.version);
		Ok(parser)
	}

	/// Detected container format.
	pub fn format(&self) -> FileFormat {
		self.format
	}

	/// Binary header, `None` for ASCII input.
	pub fn header(&self) -> Option<FbxHeader> {
		self.header
	}

	/// Declared version, `0` when an ASCII file has no magic comment.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// String pool shared with the scene builder.
	pub fn pool(&self) -> &StringPool {
		&self.pool
	}

	/// Mutable string pool access.
	pub fn pool_mut(&mut self) -> &mut StringPool {
		&mut self.pool
	}

	/// Give back the string pool once parsing is done.
	pub fn into_pool(self) -> StringPool {
		self.pool
	}

	/// Absolute input offset.
	pub fn position(&self) -> u64 {
		self.stream.position()
	}

	/// Parse the next node at `depth` whose parent context is `parent`.
	///
	/// Returns `None` at the end of the current sibling list. At `depth > 0`
	/// the list is the child list of the node last opened non-recursively.
	pub fn parse_node(&mut self, depth: u32, parent: ParseState, recursive: bool) -> Result<Option<FbxNode>> {
		if depth > MAX_NODE_DEPTH {
			return Err(FbxError::NodeDepthExceeded { max_depth: MAX_NODE_DEPTH });
		}
		if depth as usize != self.open.len() {
			return Err(FbxError::BadNode {
				at: self.position(),
				reason: "depth does not match open nodes",
			});
		}

		let node = match self.format {
			FileFormat::Binary => {
				let parent_end = match self.open.last() {
					Some(OpenNode::Binary { end }) => Some(*end),
					_ => None,
				};
				self.binary_node(depth, parent, parent_end, recursive)?
			}
			FileFormat::Ascii => {
				let in_block = matches!(self.open.last(), Some(OpenNode::Ascii { block: true }));
				let has_children = depth == 0 || in_block;
				if has_children { self.ascii_node(depth, parent, recursive)? } else { None }
			}
		};

		if node.is_none() && depth > 0 {
			self.close_open()?;
		}
		Ok(node)
	}

	/// Skip the remaining children of the node last opened non-recursively.
	pub fn skip_children(&mut self, depth: u32) -> Result<()> {
		while self.open.len() > depth as usize {
			match self.open.last().copied() {
				Some(OpenNode::Binary { end }) => {
					self.stream.seek_forward(end)?;
					self.open.pop();
				}
				Some(OpenNode::Ascii { block: true }) => {
					let level = self.open.len() as u32;
					// Children are parsed recursively and dropped.
					while self.parse_node(level, ParseState::Unknown, true)?.is_some() {}
				}
				Some(OpenNode::Ascii { block: false }) => {
					self.open.pop();
				}
				None => break,
			}
		}
		Ok(())
	}

	fn close_open(&mut self) -> Result<()> {
		if let Some(OpenNode::Binary { end }) = self.open.pop() {
			self.stream.seek_forward(end)?;
		}
		Ok(())
	}

	fn intern(&mut self, bytes: &[u8]) -> Result<Symbol> {
		self.pool.intern(bytes)
	}

	fn ignores(&self, parent: ParseState, name: Symbol) -> bool {
		(self.opts.ignore_geometry && parent.is_geometry() && parent.is_array_node(name))
			|| (self.opts.ignore_animation && parent.is_animation() && parent.is_array_node(name))
	}

	/// Push finished children onto the parse stack and collect them in order.
	fn collect_children(&mut self, mut next: impl FnMut(&mut Self) -> Result<Option<FbxNode>>) -> Result<Vec<FbxNode>> {
		let base = self.stack.len();
		while let Some(child) = next(self)? {
			self.stack.push(child)?;
		}
		Ok(self.stack.pop_n(self.stack.len() - base))
	}
}

#[cfg(test)]
mod tests;
