use glam::{DAffine3, DVec3};

use crate::fbx::math::{Transform, axis_conversion, round_to_nice};
use crate::fbx::{Element, ElementType, InheritMode, LoadOpts, Prop, PropFlags, Scene};

const SCALING: &str = "Lcl Scaling";

/// Fold the requested axis and unit conversion into the root node.
///
/// Children that ignore their parent's scale would lose the unit scale of
/// the root, so their `Lcl Scaling` (and its curves) absorb it instead.
pub(super) fn convert_units(scene: &mut Scene, opts: &LoadOpts) {
	let from_axes = scene.settings.axes;
	let to_axes = opts.target_axes.unwrap_or(from_axes);
	let ratio = opts
		.target_unit_meters
		.map_or(1.0, |target| round_to_nice(scene.settings.unit_meters / target));

	let mut root = DAffine3::from_mat3(axis_conversion(from_axes, to_axes));
	if ratio != 1.0 {
		root = DAffine3::from_scale(DVec3::splat(ratio)) * root;
	}
	if opts.use_root_transform {
		root = opts.root_transform.to_affine() * root;
	}
	if to_axes != from_axes || ratio != 1.0 {
		log::debug!(
			"converting axes {}/{} to {}/{}, unit ratio {ratio}",
			from_axes.up.as_str(),
			from_axes.front.as_str(),
			to_axes.up.as_str(),
			to_axes.front.as_str()
		);
	}
	scene.settings.axes = to_axes;
	if let Some(target) = opts.target_unit_meters {
		scene.settings.unit_meters = target;
	}

	let root_id = scene.root_node;
	let children = match scene.elements.get_mut(root_id).and_then(Element::as_node_mut) {
		Some(node) => {
			node.node_to_parent = root;
			node.local_transform = Transform::from_affine(&root);
			node.children.clone()
		}
		None => return,
	};
	if ratio == 1.0 {
		return;
	}

	for child in children {
		let ignores_scale = scene
			.element(child)
			.is_some_and(|element| InheritMode::from_i64(element.props.int("InheritType", 0)) == InheritMode::IgnoreParentScale);
		if !ignores_scale {
			continue;
		}
		if !opts.no_prop_unit_scaling {
			scale_prop(&mut scene.elements[child], ratio);
		}
		if !opts.no_anim_curve_unit_scaling {
			scale_curves(scene, child, ratio);
		}
	}
}

fn scale_prop(element: &mut Element, ratio: f64) {
	let scale = element.props.vec3(SCALING, DVec3::ONE) * ratio;
	let mut prop = match element.props.find(SCALING) {
		Some(prop) => prop.clone(),
		None => {
			let mut prop = Prop::vec3(SCALING, scale);
			prop.flags |= PropFlags::SYNTHETIC;
			prop
		}
	};
	prop.value_real = scale.extend(0.0);
	element.props.insert(prop);
	if let Some(node) = element.as_node_mut() {
		node.adjust_scale = ratio;
	}
}

fn scale_curves(scene: &mut Scene, node: usize, ratio: f64) {
	let values: Vec<usize> = scene
		.connections_dst_of(node, Some(SCALING))
		.iter()
		.map(|conn| conn.src)
		.filter(|&src| scene.element(src).is_some_and(|element| element.element_type == ElementType::AnimValue))
		.collect();
	let mut curves = Vec::new();
	for value in values {
		let Some(anim_value) = scene.elements[value].as_anim_value_mut() else {
			continue;
		};
		anim_value.default_value *= ratio;
		curves.extend(anim_value.curves.into_iter().flatten());
	}
	curves.sort_unstable();
	curves.dedup();
	for curve in curves {
		let Some(curve) = scene.elements[curve].as_anim_curve_mut() else {
			continue;
		};
		for key in &mut curve.keyframes {
			key.value *= ratio;
			key.left.dy *= ratio;
			key.right.dy *= ratio;
		}
		curve.update_bounds();
	}
}
