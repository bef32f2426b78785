use glam::{DAffine3, DVec3};

use crate::fbx::ElementType;
use crate::fbx::math::{RotationOrder, Transform};

/// How a node inherits its parent's transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritMode {
	/// Parent rotation and scale apply in full.
	#[default]
	Normal,
	/// Parent scale is not applied to the child.
	IgnoreParentScale,
	/// Parent scale applies per component after rotation.
	ComponentwiseScale,
}

impl InheritMode {
	/// Map the `InheritType` enum property.
	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => Self::ComponentwiseScale,
			2 => Self::IgnoreParentScale,
			_ => Self::Normal,
		}
	}
}

/// Transform node of the scene hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
	/// Parent node, `None` for the root.
	pub parent: Option<usize>,
	/// Child nodes in element order.
	pub children: Vec<usize>,
	/// Distance from the root.
	pub node_depth: u32,
	/// True for the implicit scene root.
	pub is_root: bool,
	/// Primary attribute element.
	pub attrib: Option<usize>,
	/// Type of `attrib`, [`ElementType::Empty`] without one.
	pub attrib_type: ElementType,
	/// Every attached attribute.
	pub all_attribs: Vec<usize>,
	/// Attached mesh.
	pub mesh: Option<usize>,
	/// Attached light.
	pub light: Option<usize>,
	/// Attached camera.
	pub camera: Option<usize>,
	/// Attached bone.
	pub bone: Option<usize>,
	/// Materials in connection order, matching mesh material indices.
	pub materials: Vec<usize>,
	/// Transform inheritance.
	pub inherit_mode: InheritMode,
	/// Euler order of `Lcl Rotation`.
	pub rotation_order: RotationOrder,
	/// `Lcl Rotation` in degrees.
	pub euler_rotation: DVec3,
	/// Local transform relative to the parent.
	pub local_transform: Transform,
	/// Geometric offset applied to attributes only.
	pub geometry_transform: Transform,
	/// Matrix form of `local_transform`.
	pub node_to_parent: DAffine3,
	/// Accumulated transform.
	pub node_to_world: DAffine3,
	/// Matrix form of `geometry_transform`.
	pub geometry_to_node: DAffine3,
	/// Attribute space to world.
	pub geometry_to_world: DAffine3,
	/// Combined `Visibility` and parent visibility.
	pub visible: bool,
	/// Extra scale folded into the local transform by unit conversion.
	pub adjust_scale: f64,
}

impl Default for Node {
	fn default() -> Self {
		Self {
			parent: None,
			children: Vec::new(),
			node_depth: 0,
			is_root: false,
			attrib: None,
			attrib_type: ElementType::Empty,
			all_attribs: Vec::new(),
			mesh: None,
			light: None,
			camera: None,
			bone: None,
			materials: Vec::new(),
			inherit_mode: InheritMode::Normal,
			rotation_order: RotationOrder::Xyz,
			euler_rotation: DVec3::ZERO,
			local_transform: Transform::IDENTITY,
			geometry_transform: Transform::IDENTITY,
			node_to_parent: DAffine3::IDENTITY,
			node_to_world: DAffine3::IDENTITY,
			geometry_to_node: DAffine3::IDENTITY,
			geometry_to_world: DAffine3::IDENTITY,
			visible: true,
			adjust_scale: 1.0,
		}
	}
}
