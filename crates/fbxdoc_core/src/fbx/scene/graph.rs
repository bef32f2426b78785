use std::sync::Arc;

use crate::fbx::scene::anim::{Anim, AnimStack};
use crate::fbx::scene::element::{Connection, Element, ElementType};
use crate::fbx::scene::metadata::{Metadata, SceneSettings};
use crate::fbx::scene::mesh::Mesh;
use crate::fbx::scene::node::Node;
use crate::fbx::{DomNode, Prop};

/// Element reachable by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
	/// Element name.
	pub name: Arc<str>,
	/// Element type.
	pub element_type: ElementType,
	/// Element id.
	pub element: usize,
}

/// Fully resolved scene.
///
/// Elements reference each other by dense `element_id`. Connections are kept
/// twice, sorted by source and by destination, and every element records its
/// slice of both lists.
#[derive(Debug, Clone, Default)]
pub struct Scene {
	/// File information and load statistics.
	pub metadata: Metadata,
	/// `GlobalSettings`.
	pub settings: SceneSettings,
	/// Implicit root node element.
	pub root_node: usize,
	/// Every element, indexed by `element_id`.
	pub elements: Vec<Element>,
	/// Connections sorted by `(src, src_prop)`.
	pub connections_src: Vec<Connection>,
	/// Connections sorted by `(dst, dst_prop)`.
	pub connections_dst: Vec<Connection>,
	/// Element ids per [`ElementType`], in `typed_id` order.
	pub by_type: Vec<Vec<usize>>,
	/// Node ids sorted by depth, parents before children.
	pub nodes_by_depth: Vec<usize>,
	/// Name index sorted by `(name, type, id)`.
	pub elements_by_name: Vec<NameEntry>,
	/// Default animation, the active stack when one exists.
	pub anim: Anim,
	/// Retained document tree.
	pub dom_root: Option<DomNode>,
}

impl Scene {
	/// Element by id.
	pub fn element(&self, id: usize) -> Option<&Element> {
		self.elements.get(id)
	}

	/// Ids of every element of `element_type`.
	pub fn ids_of(&self, element_type: ElementType) -> &[usize] {
		self.by_type.get(element_type as usize).map_or(&[], Vec::as_slice)
	}

	/// Elements of `element_type` in `typed_id` order.
	pub fn elements_of(&self, element_type: ElementType) -> impl Iterator<Item = &Element> {
		self.ids_of(element_type).iter().filter_map(|&id| self.elements.get(id))
	}

	/// Number of elements of `element_type`.
	pub fn count(&self, element_type: ElementType) -> usize {
		self.ids_of(element_type).len()
	}

	/// Node payload of element `id`.
	pub fn node(&self, id: usize) -> Option<&Node> {
		self.element(id)?.as_node()
	}

	/// Mesh payload of element `id`.
	pub fn mesh(&self, id: usize) -> Option<&Mesh> {
		self.element(id)?.as_mesh()
	}

	/// Root node payload.
	pub fn root(&self) -> Option<&Node> {
		self.node(self.root_node)
	}

	/// Node elements paired with their payload.
	pub fn nodes(&self) -> impl Iterator<Item = (&Element, &Node)> {
		self.elements_of(ElementType::Node)
			.filter_map(|element| element.as_node().map(|node| (element, node)))
	}

	/// Mesh elements paired with their payload.
	pub fn meshes(&self) -> impl Iterator<Item = (&Element, &Mesh)> {
		self.elements_of(ElementType::Mesh)
			.filter_map(|element| element.as_mesh().map(|mesh| (element, mesh)))
	}

	/// Animation stacks paired with their payload.
	pub fn anim_stacks(&self) -> impl Iterator<Item = (&Element, &AnimStack)> {
		self.elements_of(ElementType::AnimStack)
			.filter_map(|element| element.as_anim_stack().map(|stack| (element, stack)))
	}

	/// Connections leaving `element`, optionally only from `prop`.
	pub fn connections_src_of(&self, element: usize, prop: Option<&str>) -> &[Connection] {
		let Some(range) = self.element(element).map(|element| element.connections_src.clone()) else {
			return &[];
		};
		let Some(slice) = self.connections_src.get(range) else {
			return &[];
		};
		match prop {
			None => slice,
			Some(prop) => {
				let begin = slice.partition_point(|conn| conn.src_prop.as_ref() < prop);
				let end = slice.partition_point(|conn| conn.src_prop.as_ref() <= prop);
				&slice[begin..end]
			}
		}
	}

	/// Connections arriving at `element`, optionally only at `prop`.
	pub fn connections_dst_of(&self, element: usize, prop: Option<&str>) -> &[Connection] {
		let Some(range) = self.element(element).map(|element| element.connections_dst.clone()) else {
			return &[];
		};
		let Some(slice) = self.connections_dst.get(range) else {
			return &[];
		};
		match prop {
			None => slice,
			Some(prop) => {
				let begin = slice.partition_point(|conn| conn.dst_prop.as_ref() < prop);
				let end = slice.partition_point(|conn| conn.dst_prop.as_ref() <= prop);
				&slice[begin..end]
			}
		}
	}

	/// Elements connected into `element` with an object endpoint, filtered by type.
	pub fn sources_of(&self, element: usize, element_type: ElementType) -> impl Iterator<Item = usize> + '_ {
		self.connections_dst_of(element, Some(""))
			.iter()
			.filter(|conn| conn.src_prop.is_empty())
			.map(|conn| conn.src)
			.filter(move |&src| self.element(src).is_some_and(|el| el.element_type == element_type))
	}

	/// Elements `element` connects into with an object endpoint, filtered by type.
	pub fn destinations_of(&self, element: usize, element_type: ElementType) -> impl Iterator<Item = usize> + '_ {
		self.connections_src_of(element, Some(""))
			.iter()
			.filter(|conn| conn.dst_prop.is_empty())
			.map(|conn| conn.dst)
			.filter(move |&dst| self.element(dst).is_some_and(|el| el.element_type == element_type))
	}

	/// First element named `name` of `element_type`.
	pub fn find_element(&self, element_type: ElementType, name: &str) -> Option<&Element> {
		let begin = self
			.elements_by_name
			.partition_point(|entry| (entry.name.as_ref(), entry.element_type) < (name, element_type));
		let entry = self.elements_by_name.get(begin)?;
		if entry.name.as_ref() == name && entry.element_type == element_type {
			self.element(entry.element)
		} else {
			None
		}
	}

	/// First node named `name`.
	pub fn find_node(&self, name: &str) -> Option<&Element> {
		self.find_element(ElementType::Node, name)
	}

	/// First animation stack named `name`.
	pub fn find_anim_stack(&self, name: &str) -> Option<&Element> {
		self.find_element(ElementType::AnimStack, name)
	}

	/// First material named `name`.
	pub fn find_material(&self, name: &str) -> Option<&Element> {
		self.find_element(ElementType::Material, name)
	}

	/// Property `name` of element `id`, including template defaults.
	pub fn find_prop(&self, id: usize, name: &str) -> Option<&Prop> {
		self.element(id)?.props.find(name)
	}

	/// Retained document node of element `id`.
	pub fn element_dom(&self, id: usize) -> Option<&DomNode> {
		let index = self.element(id)?.dom_node?;
		self.dom_root.as_ref()?.find("Objects")?.children.get(index)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use crate::fbx::scene::element::{Connection, Element, ElementData, ElementType};
	use crate::fbx::scene::graph::{NameEntry, Scene};
	use crate::fbx::Props;

	fn element(id: usize, element_type: ElementType, name: &str) -> Element {
		Element {
			element_id: id,
			typed_id: 0,
			name: Arc::from(name),
			element_type,
			type_name: Arc::from(""),
			sub_type: Arc::from(""),
			fbx_id: None,
			props: Props::default(),
			instances: Vec::new(),
			connections_src: 0..0,
			connections_dst: 0..0,
			dom_node: None,
			data: ElementData::Plain,
		}
	}

	fn conn(src: usize, dst: usize, dst_prop: &str) -> Connection {
		Connection {
			src,
			dst,
			src_prop: Arc::from(""),
			dst_prop: Arc::from(dst_prop),
		}
	}

	#[test]
	fn connection_slices_filter_by_prop() {
		let mut scene = Scene::default();
		scene.elements = vec![
			element(0, ElementType::Material, "a"),
			element(1, ElementType::Texture, "t"),
			element(2, ElementType::Texture, "u"),
		];
		scene.connections_dst = vec![conn(2, 0, ""), conn(1, 0, "DiffuseColor"), conn(2, 0, "NormalMap")];
		scene.elements[0].connections_dst = 0..3;

		assert_eq!(scene.connections_dst_of(0, None).len(), 3);
		let diffuse = scene.connections_dst_of(0, Some("DiffuseColor"));
		assert_eq!(diffuse.len(), 1);
		assert_eq!(diffuse[0].src, 1);
		assert_eq!(scene.sources_of(0, ElementType::Texture).collect::<Vec<_>>(), vec![2]);
		assert!(scene.connections_dst_of(7, None).is_empty());
	}

	#[test]
	fn name_lookup_distinguishes_types() {
		let mut scene = Scene::default();
		scene.elements = vec![element(0, ElementType::Node, "Cube"), element(1, ElementType::Mesh, "Cube")];
		scene.elements_by_name = vec![
			NameEntry {
				name: Arc::from("Cube"),
				element_type: ElementType::Node,
				element: 0,
			},
			NameEntry {
				name: Arc::from("Cube"),
				element_type: ElementType::Mesh,
				element: 1,
			},
		];
		assert_eq!(scene.find_node("Cube").map(|el| el.element_id), Some(0));
		assert_eq!(scene.find_element(ElementType::Mesh, "Cube").map(|el| el.element_id), Some(1));
		assert!(scene.find_material("Cube").is_none());
	}
}
