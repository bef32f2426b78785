use glam::{DAffine3, DMat3, DVec3};

use crate::fbx::math::{RotationOrder, Transform, euler_to_quat};
use crate::fbx::{Element, ElementData, InheritMode, Node, Props, Scene};

/// Local and geometric transforms of `node` from its properties.
///
/// Follows the FBX pivot chain
/// `T * Roff * Rp * Rpre * R * Rpost^-1 * Rp^-1 * Soff * Sp * S * Sp^-1`.
/// Only the translation picks up the pivots, so the decomposed transform
/// keeps the authored rotation and scale exactly.
pub(crate) fn read_node_transform(props: &Props, node: &mut Node) {
	let translation = props.vec3("Lcl Translation", DVec3::ZERO);
	let euler = props.vec3("Lcl Rotation", DVec3::ZERO);
	let scale = props.vec3("Lcl Scaling", DVec3::ONE);
	let order = RotationOrder::from_i64(props.int("RotationOrder", 0));
	let pre = euler_to_quat(props.vec3("PreRotation", DVec3::ZERO), RotationOrder::Xyz);
	let post = euler_to_quat(props.vec3("PostRotation", DVec3::ZERO), RotationOrder::Xyz);
	let rotation_offset = props.vec3("RotationOffset", DVec3::ZERO);
	let rotation_pivot = props.vec3("RotationPivot", DVec3::ZERO);
	let scaling_offset = props.vec3("ScalingOffset", DVec3::ZERO);
	let scaling_pivot = props.vec3("ScalingPivot", DVec3::ZERO);

	let rotation = (pre * euler_to_quat(euler, order) * post.inverse()).normalize();
	let affine = DAffine3::from_translation(translation + rotation_offset + rotation_pivot)
		* DAffine3::from_quat(rotation)
		* DAffine3::from_translation(scaling_offset + scaling_pivot - rotation_pivot)
		* DAffine3::from_scale(scale)
		* DAffine3::from_translation(-scaling_pivot);

	node.inherit_mode = InheritMode::from_i64(props.int("InheritType", 0));
	node.rotation_order = order;
	node.euler_rotation = euler;
	node.local_transform = Transform {
		translation: affine.translation,
		rotation,
		scale,
	};
	node.node_to_parent = affine;

	node.geometry_transform = Transform {
		translation: props.vec3("GeometricTranslation", DVec3::ZERO),
		rotation: euler_to_quat(props.vec3("GeometricRotation", DVec3::ZERO), RotationOrder::Xyz),
		scale: props.vec3("GeometricScaling", DVec3::ONE),
	};
	node.geometry_to_node = node.geometry_transform.to_affine();
	node.visible = props.real("Visibility", 1.0) != 0.0 && props.bool("Show", true);
}

/// Parent-relative transform composed with `parent_world` under `mode`.
fn compose_world(parent_world: &DAffine3, parent_scale: DVec3, node: &Node) -> DAffine3 {
	match node.inherit_mode {
		InheritMode::Normal => *parent_world * node.node_to_parent,
		InheritMode::IgnoreParentScale => {
			let unscale = DVec3::select(parent_scale.cmpne(DVec3::ZERO), parent_scale.recip(), DVec3::ONE);
			DAffine3 {
				matrix3: parent_world.matrix3 * DMat3::from_diagonal(unscale) * node.node_to_parent.matrix3,
				translation: parent_world.transform_point3(node.node_to_parent.translation),
			}
		}
		InheritMode::ComponentwiseScale => {
			let parent = Transform::from_affine(parent_world);
			Transform {
				translation: parent_world.transform_point3(node.local_transform.translation),
				rotation: parent.rotation * node.local_transform.rotation,
				scale: parent.scale * node.local_transform.scale,
			}
			.to_affine()
		}
	}
}

/// Accumulate world transforms and visibility in depth order.
pub(crate) fn update_world_transforms(scene: &mut Scene) {
	for index in 0..scene.nodes_by_depth.len() {
		let id = scene.nodes_by_depth[index];
		let parent = scene
			.node(id)
			.and_then(|node| node.parent)
			.and_then(|parent| scene.node(parent))
			.map(|parent| (parent.node_to_world, parent.local_transform.scale, parent.visible));
		let Some(node) = scene.elements.get_mut(id).and_then(Element::as_node_mut) else {
			continue;
		};
		match parent {
			Some((parent_world, parent_scale, parent_visible)) => {
				node.node_to_world = compose_world(&parent_world, parent_scale, node);
				node.visible &= parent_visible;
			}
			None => node.node_to_world = node.node_to_parent,
		}
		node.geometry_to_world = node.node_to_world * node.geometry_to_node;
	}
}

/// Read every node's transform properties, then accumulate.
pub(super) fn update_transforms(scene: &mut Scene) {
	for element in &mut scene.elements {
		let Element { props, data, .. } = element;
		if let ElementData::Node(node) = data
			&& !node.is_root
		{
			read_node_transform(props, node);
		}
	}
	update_world_transforms(scene);
}
