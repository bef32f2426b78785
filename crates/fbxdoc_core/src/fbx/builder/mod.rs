//! First loading pass: document nodes to unresolved scene elements.
//!
//! Objects are streamed one at a time from the parser so geometry never sits
//! in memory twice. Connections are collected as raw ids and resolved once
//! every object has been declared; everything that needs the full graph is
//! left to the finalize pass.

mod anim;
mod connections;
mod header;
mod legacy;
mod mesh;
mod objects;
mod props;

use std::sync::Arc;

use crate::fbx::names as n;
use crate::fbx::{
	DEFAULT_ASCII_VERSION, DomNode, Element, ElementData, ElementType, Endianness, FbxError, FbxId, FbxNode,
	IndexErrorHandling, LoadOpts, Map, Metadata, Node, ParseState, Parser, Props, Result, ResultExt, Scene,
	SceneSettings, WarningKind,
};

pub(crate) use connections::PendingConnection;

/// `Definitions` property template.
struct Template {
	object_type: Arc<str>,
	class: Arc<str>,
	props: Arc<Props>,
}

/// Identity of an object as declared in `Objects`.
pub(super) struct ObjectHead {
	id: FbxId,
	name: Arc<str>,
	type_name: Arc<str>,
	sub_type: Arc<str>,
}

/// Pose entry waiting for its node id to resolve.
struct PendingBonePose {
	pose: usize,
	node: FbxId,
	matrix: glam::DAffine3,
}

pub(crate) struct SceneBuilder<'a, 'o> {
	parser: Parser<'a>,
	opts: &'o LoadOpts,
	version: u32,
	elements: Vec<Element>,
	ids: Map<FbxId, usize>,
	templates: Vec<Template>,
	pending: Vec<PendingConnection>,
	bone_poses: Vec<PendingBonePose>,
	/// Legacy model element to the attribute split off it.
	legacy_attribs: Map<usize, usize>,
	dom: Vec<DomNode>,
	metadata: Metadata,
	settings: SceneSettings,
	next_generated: u32,
}

impl<'a, 'o> SceneBuilder<'a, 'o> {
	pub(crate) fn new(parser: Parser<'a>, opts: &'o LoadOpts) -> Self {
		let version = parser.version();
		Self {
			parser,
			opts,
			version,
			elements: Vec::new(),
			ids: Map::new(),
			templates: Vec::new(),
			pending: Vec::new(),
			bone_poses: Vec::new(),
			legacy_attribs: Map::new(),
			dom: Vec::new(),
			metadata: Metadata::default(),
			settings: SceneSettings::default(),
			next_generated: 0,
		}
	}

	pub(crate) fn build(mut self) -> Result<Scene> {
		self.metadata.format = Some(self.parser.format());
		self.metadata.big_endian = self
			.parser
			.header()
			.is_some_and(|header| header.endianness == Endianness::Big);
		self.metadata.geometry_ignored = self.opts.ignore_geometry;
		self.metadata.animation_ignored = self.opts.ignore_animation;
		self.metadata.embedded_ignored = self.opts.ignore_embedded;
		if let Some(filename) = &self.opts.filename {
			self.metadata.filename = Arc::from(filename.as_str());
			let root = std::path::Path::new(filename)
				.parent()
				.map(|dir| dir.display().to_string())
				.unwrap_or_default();
			self.metadata.relative_root = Arc::from(root);
		}
		self.push_root()?;

		while let Some(node) = self.parser.parse_node(0, ParseState::Root, false)? {
			let state = ParseState::Root.child(node.name);
			match node.name {
				n::OBJECTS => {
					if self.version == 0 {
						self.version = DEFAULT_ASCII_VERSION;
					}
					self.read_streamed(node, state, Self::read_object).context("read Objects")?;
				}
				n::CONNECTIONS => self
					.read_streamed(node, state, Self::read_connection)
					.context("read Connections")?,
				n::TAKES => self.read_streamed(node, state, Self::read_take).context("read Takes")?,
				_ => {
					let node = self.finish_node(node, state)?;
					let name = self.parser.pool().arc(node.name);
					self.read_section(&node).with_context(|| format!("read {name}"))?;
					if self.opts.retain_dom {
						self.dom.push(DomNode::from_node(&node, self.parser.pool()));
					}
				}
			}
		}
		if self.version == 0 {
			self.version = DEFAULT_ASCII_VERSION;
		}
		self.metadata.version = self.version;

		let connections = self.resolve_connections()?;
		self.resolve_bone_poses();
		log::debug!(
			"built {} elements and {} connections from version {} document",
			self.elements.len(),
			connections.len(),
			self.version
		);

		Ok(Scene {
			metadata: self.metadata,
			settings: self.settings,
			root_node: 0,
			elements: self.elements,
			connections_src: connections,
			dom_root: self.opts.retain_dom.then(|| DomNode::root(self.dom)),
			..Scene::default()
		})
	}

	/// Read the children of a top-level node one by one.
	fn read_streamed(
		&mut self,
		header: FbxNode,
		state: ParseState,
		read: fn(&mut Self, &FbxNode, Option<usize>) -> Result<()>,
	) -> Result<()> {
		let mut retained = Vec::new();
		while let Some(child) = self.parser.parse_node(1, state, true)? {
			let dom_node = if self.opts.retain_dom {
				retained.push(DomNode::from_node(&child, self.parser.pool()));
				Some(retained.len() - 1)
			} else {
				None
			};
			read(self, &child, dom_node)?;
		}
		if self.opts.retain_dom {
			let mut dom = DomNode::from_node(&header, self.parser.pool());
			dom.children = retained;
			self.dom.push(dom);
		}
		Ok(())
	}

	/// Collect the children of a node returned by a non-recursive parse.
	fn finish_node(&mut self, mut node: FbxNode, state: ParseState) -> Result<FbxNode> {
		while let Some(child) = self.parser.parse_node(1, state, true)? {
			node.children.push(child);
		}
		Ok(node)
	}

	fn push_root(&mut self) -> Result<()> {
		let root = Element {
			element_id: 0,
			typed_id: 0,
			name: Arc::from(""),
			element_type: ElementType::Node,
			type_name: Arc::from("Model"),
			sub_type: Arc::from(""),
			fbx_id: Some(FbxId::Explicit(0)),
			props: Props::default(),
			instances: Vec::new(),
			connections_src: 0..0,
			connections_dst: 0..0,
			dom_node: None,
			data: ElementData::Node(Node {
				is_root: true,
				..Node::default()
			}),
		};
		self.elements.push(root);
		self.register_id(FbxId::Explicit(0), 0)?;
		let scene = self.parser.pool_mut().intern_str("Model::Scene")?;
		self.register_id(FbxId::Synthetic(scene), 0)
	}

	/// Append an element and make its id resolvable.
	fn push_element(
		&mut self,
		head: ObjectHead,
		element_type: ElementType,
		mut props: Props,
		data: ElementData,
		dom_node: Option<usize>,
	) -> Result<usize> {
		let element_id = self.elements.len();
		if props.defaults.is_none() {
			props.defaults = self.find_template(&head.type_name, &head.sub_type);
		}
		self.elements.push(Element {
			element_id,
			typed_id: 0,
			name: head.name,
			element_type,
			type_name: head.type_name,
			sub_type: head.sub_type,
			fbx_id: Some(head.id),
			props,
			instances: Vec::new(),
			connections_src: 0..0,
			connections_dst: 0..0,
			dom_node,
			data,
		});
		self.register_id(head.id, element_id)?;
		Ok(element_id)
	}

	fn register_id(&mut self, id: FbxId, element: usize) -> Result<()> {
		if self.ids.find(id.map_hash(), &id).is_some() {
			return self.tolerate(WarningKind::DuplicateObjectId, || {
				format!("object id {id:?} declared twice, keeping the first")
			});
		}
		self.ids.insert(id.map_hash(), id, element);
		Ok(())
	}

	fn lookup(&self, id: FbxId) -> Option<usize> {
		self.ids.find(id.map_hash(), &id).copied()
	}

	fn generated_id(&mut self) -> FbxId {
		let id = FbxId::Generated(self.next_generated);
		self.next_generated += 1;
		id
	}

	fn find_template(&self, type_name: &str, sub_type: &str) -> Option<Arc<Props>> {
		let mut candidates = self
			.templates
			.iter()
			.filter(|template| template.object_type.as_ref() == type_name);
		let first = candidates.clone().next()?;
		if let Some(exact) = candidates.find(|template| template.class.as_ref() == sub_type) {
			return Some(Arc::clone(&exact.props));
		}
		// These types share one template whatever their sub-type.
		if matches!(type_name, "Material" | "Model" | "AnimationStack" | "AnimationLayer") {
			return Some(Arc::clone(&first.props));
		}
		None
	}

	/// Record a tolerated irregularity, aggregated per kind.
	fn warn(&mut self, kind: WarningKind, description: impl FnOnce() -> String) {
		self.metadata.warn(kind, description);
	}

	/// Warn, or fail in strict mode.
	fn tolerate(&mut self, kind: WarningKind, description: impl FnOnce() -> String) -> Result<()> {
		if self.opts.strict {
			return Err(FbxError::BadElement {
				name: description(),
				reason: kind.as_str(),
			});
		}
		self.warn(kind, description);
		Ok(())
	}

	/// Apply the index error policy to `index` into a buffer of `len` items.
	fn fix_index(&mut self, index: i64, len: usize, what: &'static str) -> Result<u32> {
		if index >= 0 && (index as u64) < len as u64 {
			return Ok(index as u32);
		}
		match self.opts.index_error_handling {
			IndexErrorHandling::Clamp => {
				self.warn(WarningKind::IndexClamped, || format!("{what} index {index} out of {len}"));
				Ok(if len == 0 { u32::MAX } else { (len - 1) as u32 })
			}
			IndexErrorHandling::NoIndex => {
				self.warn(WarningKind::IndexClamped, || format!("{what} index {index} out of {len}"));
				Ok(u32::MAX)
			}
			IndexErrorHandling::AbortLoading => Err(FbxError::BadIndex { what, index, len }),
			IndexErrorHandling::UnsafeIgnore => Ok(index as u32),
		}
	}

	fn resolve_bone_poses(&mut self) {
		for pending in std::mem::take(&mut self.bone_poses) {
			let Some(bone_node) = self.lookup(pending.node) else {
				log::trace!("pose entry references unknown node {:?}", pending.node);
				continue;
			};
			if let Some(pose) = self.elements.get_mut(pending.pose).and_then(Element::as_pose_mut) {
				pose.bone_poses.push(crate::fbx::BonePose {
					bone_node,
					bone_to_world: pending.matrix,
				});
			}
		}
	}
}
