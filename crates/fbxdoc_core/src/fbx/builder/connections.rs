use std::sync::Arc;

use crate::fbx::builder::SceneBuilder;
use crate::fbx::builder::legacy::is_node_prop;
use crate::fbx::names as n;
use crate::fbx::{Connection, ElementType, FbxId, FbxNode, FbxValue, Result, WarningKind, hash_u64};

/// Connection between two ids not yet resolved to elements.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingConnection {
	pub(crate) src: FbxId,
	pub(crate) dst: FbxId,
	pub(crate) src_prop: Arc<str>,
	pub(crate) dst_prop: Arc<str>,
}

impl SceneBuilder<'_, '_> {
	/// `C` (7.x) or `Connect` (legacy) record.
	///
	/// The first value names the kind: `OO` object to object, `OP` object to
	/// property, `PO` property to object and `PP` property to property.
	pub(super) fn read_connection(&mut self, node: &FbxNode, _dom_node: Option<usize>) -> Result<()> {
		if node.name != n::C && node.name != n::CONNECT {
			return Ok(());
		}
		let Some(kind) = node.value_str(0) else {
			return Ok(());
		};
		let (src, src_prop, dst, dst_prop) = match kind {
			n::OO => (1, None, 2, None),
			n::OP => (1, None, 2, Some(3)),
			n::PO => (1, Some(2), 3, None),
			n::PP => (1, Some(2), 3, Some(4)),
			_ => {
				log::trace!("unknown connection kind {}", self.parser.pool().get(kind));
				return Ok(());
			}
		};
		let (Some(src), Some(dst)) = (connection_id(node, src), connection_id(node, dst)) else {
			log::trace!("connection without endpoints");
			return Ok(());
		};
		let pool = self.parser.pool();
		let prop = |index: Option<usize>| {
			index
				.and_then(|index| node.value_str(index))
				.map_or_else(|| Arc::from(""), |symbol| pool.arc(symbol))
		};
		let pending = PendingConnection {
			src,
			dst,
			src_prop: prop(src_prop),
			dst_prop: prop(dst_prop),
		};
		self.pending.push(pending);
		Ok(())
	}

	/// Resolve every pending connection to element indices, dropping dangling ones.
	pub(super) fn resolve_connections(&mut self) -> Result<Vec<Connection>> {
		let pending = std::mem::take(&mut self.pending);
		let mut connections = Vec::with_capacity(pending.len());
		for conn in pending {
			let (Some(src), Some(dst)) = (self.lookup(conn.src), self.lookup(conn.dst)) else {
				log::trace!("dangling connection {:?} -> {:?}", conn.src, conn.dst);
				self.warn(WarningKind::DanglingConnection, || {
					format!("connection {:?} -> {:?} references an unknown object", conn.src, conn.dst)
				});
				continue;
			};
			if src == dst {
				log::trace!("dropping self connection of element {src}");
				continue;
			}
			let (src, dst) = self.redirect_legacy(src, &conn.src_prop, dst, &conn.dst_prop);
			connections.push(Connection {
				src,
				dst,
				src_prop: conn.src_prop,
				dst_prop: conn.dst_prop,
			});
		}
		Ok(connections)
	}

	/// Legacy files address a model and its attribute by the same name; move the
	/// endpoint to the attribute when the connection is about attribute data.
	fn redirect_legacy(&self, src: usize, src_prop: &str, dst: usize, dst_prop: &str) -> (usize, usize) {
		if self.legacy_attribs.is_empty() {
			return (src, dst);
		}
		let attrib_of = |element: usize| self.legacy_attribs.find(hash_u64(element as u64), &element).copied();
		let src_type = self.elements.get(src).map_or(ElementType::Unknown, |element| element.element_type);

		let mut dst_out = dst;
		if let Some(attrib) = attrib_of(dst) {
			let deformer = matches!(
				src_type,
				ElementType::SkinDeformer | ElementType::BlendDeformer | ElementType::CacheDeformer
			);
			if (dst_prop.is_empty() && deformer) || (!dst_prop.is_empty() && !is_node_prop(dst_prop)) {
				dst_out = attrib;
			}
		}
		let mut src_out = src;
		if let Some(attrib) = attrib_of(src)
			&& !src_prop.is_empty()
			&& !is_node_prop(src_prop)
		{
			src_out = attrib;
		}
		(src_out, dst_out)
	}
}

fn connection_id(node: &FbxNode, index: usize) -> Option<FbxId> {
	match node.values.get(index)? {
		FbxValue::Number { i, .. } => Some(FbxId::Explicit(*i as u64)),
		FbxValue::Str(symbol) => Some(FbxId::Synthetic(*symbol)),
		FbxValue::Blob(_) => None,
	}
}
