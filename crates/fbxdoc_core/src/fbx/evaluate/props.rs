use std::sync::Arc;

use glam::{DQuat, DVec3};

use crate::fbx::finalize::read_node_transform;
use crate::fbx::math::{RotationOrder, Transform, euler_to_quat, quat_pow, quat_to_euler};
use crate::fbx::{Anim, AnimLayer, ElementType, Node, Prop, PropFlags, PropOverride, Props, Scene, cmp_prop_names};

/// How a property combines across layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Composition {
	Rotation(RotationOrder),
	Scale,
	Linear,
}

impl Composition {
	fn of(scene: &Scene, element: usize, name: &str, layer: &AnimLayer) -> Self {
		match name {
			"Lcl Rotation" if layer.compose_rotation => {
				Self::Rotation(scene.node(element).map_or(RotationOrder::Xyz, |node| node.rotation_order))
			}
			"Lcl Scaling" if layer.compose_scale => Self::Scale,
			_ => Self::Linear,
		}
	}
}

/// `base^weight` keeping the sign of `base`.
fn signed_pow(base: DVec3, weight: f64) -> DVec3 {
	DVec3::new(
		base.x.abs().powf(weight).copysign(base.x),
		base.y.abs().powf(weight).copysign(base.y),
		base.z.abs().powf(weight).copysign(base.z),
	)
}

fn add_layer(current: DVec3, value: DVec3, weight: f64, composition: Composition) -> DVec3 {
	match composition {
		Composition::Rotation(order) => {
			let delta = quat_pow(euler_to_quat(value, order), weight);
			quat_to_euler(euler_to_quat(current, order) * delta, order)
		}
		Composition::Scale => current * signed_pow(value, weight),
		Composition::Linear => current + value * weight,
	}
}

fn blend_layer(current: DVec3, value: DVec3, weight: f64, composition: Composition) -> DVec3 {
	match composition {
		Composition::Rotation(order) => {
			let from: DQuat = euler_to_quat(current, order);
			let mut to = euler_to_quat(value, order);
			if from.dot(to) < 0.0 {
				to = -to;
			}
			quat_to_euler(from.slerp(to, weight), order)
		}
		Composition::Scale => signed_pow(current, 1.0 - weight) * signed_pow(value, weight),
		Composition::Linear => current.lerp(value, weight),
	}
}

/// Weight of layer `index` of `anim` at `time`.
fn layer_weight(scene: &Scene, anim: &Anim, index: usize, layer_id: usize, layer: &AnimLayer, time: f64) -> f64 {
	if let Some(&weight) = anim.layer_weights.get(index) {
		return weight;
	}
	if layer.weight_is_animated {
		return evaluate_layered(scene, anim, layer_id, "Weight", time)
			.map_or(layer.weight, |value| value.x / 100.0);
	}
	layer.weight
}

/// Combine every layer of `anim` animating `element.name`.
///
/// The first contributing layer replaces the static value; later layers add
/// to or blend with the running result, each scaled by its weight.
fn evaluate_layered(scene: &Scene, anim: &Anim, element: usize, name: &str, time: f64) -> Option<DVec3> {
	// Layer weights animating layer weights use the static weights.
	let weighting_layer = name == "Weight"
		&& scene
			.element(element)
			.is_some_and(|element| element.element_type == ElementType::AnimLayer);
	let mut result: Option<DVec3> = None;
	for (index, &layer_id) in anim.layers.iter().enumerate() {
		let Some(layer) = scene.element(layer_id).and_then(|element| element.as_anim_layer()) else {
			continue;
		};
		let Some(anim_prop) = layer.find_prop(element, name) else {
			continue;
		};
		let Some(value) = scene
			.element(anim_prop.anim_value)
			.and_then(|element| element.as_anim_value())
			.map(|value| value.evaluate_vec3(scene, time))
		else {
			continue;
		};
		let weight = if weighting_layer {
			layer.weight
		} else {
			layer_weight(scene, anim, index, layer_id, layer, time)
		};
		let composition = Composition::of(scene, element, name, layer);
		result = Some(match result {
			None if weight >= 1.0 => value,
			None => {
				let base = scene.find_prop(element, name).map_or(DVec3::ZERO, Prop::vec3_value);
				blend_layer(base, value, weight, composition)
			}
			Some(current) if layer.additive => add_layer(current, value, weight, composition),
			Some(current) => blend_layer(current, value, weight, composition),
		});
	}
	result
}

fn find_override<'a>(overrides: &'a [PropOverride], element: usize, name: &str) -> Option<&'a PropOverride> {
	overrides
		.binary_search_by(|entry| {
			entry
				.element
				.cmp(&element)
				.then_with(|| cmp_prop_names(&entry.prop_name, name))
		})
		.ok()
		.map(|index| &overrides[index])
}

/// Property `name` of `element` as animated by `anim` at `time`.
///
/// Missing properties come back with [`PropFlags::NOT_FOUND`] and a zero
/// value; overridden ones carry [`PropFlags::OVERRIDDEN`].
pub fn evaluate_prop(scene: &Scene, anim: &Anim, element: usize, name: &str, time: f64) -> Prop {
	let mut prop = scene.find_prop(element, name).cloned().unwrap_or_else(|| {
		let mut prop = Prop::new(Arc::from(name));
		prop.flags |= PropFlags::NOT_FOUND;
		prop
	});

	if let Some(entry) = find_override(&anim.prop_overrides, element, name) {
		prop.value_real = entry.value;
		prop.value_str = Arc::clone(&entry.value_str);
		prop.value_int = entry.value_int;
		prop.flags |= PropFlags::OVERRIDDEN;
		prop.flags.remove(PropFlags::NOT_FOUND);
		return prop;
	}
	if !prop.flags.contains(PropFlags::ANIMATED) {
		return prop;
	}
	if let Some(value) = evaluate_layered(scene, anim, element, name, time) {
		prop.value_real = value.extend(prop.value_real.w);
		prop.value_int = value.x.round() as i64;
	}
	prop
}

/// Every property of `element` with animated and overridden values applied.
pub fn evaluate_props(scene: &Scene, anim: &Anim, element: usize, time: f64) -> Props {
	let Some(source) = scene.element(element) else {
		return Props::default();
	};
	let mut props = source.props.clone();
	let animated: Vec<Arc<str>> = source
		.props
		.iter()
		.filter(|prop| prop.flags.contains(PropFlags::ANIMATED))
		.map(|prop| Arc::clone(&prop.name))
		.collect();
	for name in animated {
		props.insert(evaluate_prop(scene, anim, element, &name, time));
	}

	let begin = anim.prop_overrides.partition_point(|entry| entry.element < element);
	let end = anim.prop_overrides.partition_point(|entry| entry.element <= element);
	for entry in &anim.prop_overrides[begin..end] {
		props.insert(evaluate_prop(scene, anim, element, &entry.prop_name, time));
	}
	props
}

/// Sort overrides for lookup; the last override of a property wins.
pub fn prepare_prop_overrides(mut overrides: Vec<PropOverride>) -> Vec<PropOverride> {
	overrides.sort_by(|a, b| {
		a.element
			.cmp(&b.element)
			.then_with(|| cmp_prop_names(&a.prop_name, &b.prop_name))
	});
	let mut out: Vec<PropOverride> = Vec::with_capacity(overrides.len());
	for entry in overrides {
		match out.last_mut() {
			Some(last) if last.element == entry.element && last.prop_name == entry.prop_name => *last = entry,
			_ => out.push(entry),
		}
	}
	out
}

/// Local transform of `node` at `time`.
pub fn evaluate_transform(scene: &Scene, anim: &Anim, node: usize, time: f64) -> Transform {
	let props = evaluate_props(scene, anim, node, time);
	let mut evaluated = Node::default();
	read_node_transform(&props, &mut evaluated);
	evaluated.local_transform
}
