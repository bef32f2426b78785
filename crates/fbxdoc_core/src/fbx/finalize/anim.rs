use std::sync::Arc;

use crate::fbx::finalize::connections::flag_prop;
use crate::fbx::{Anim, AnimProp, ElementType, PropFlags, Scene, cmp_prop_names};

/// Component of an anim value driven by a curve connected to `prop`.
fn curve_component(prop: &str) -> usize {
	match prop {
		"d|Y" => 1,
		"d|Z" => 2,
		_ => 0,
	}
}

/// Link stacks to layers, layers to values and values to curves.
pub(super) fn link_anim(scene: &mut Scene) {
	link_curves(scene);
	link_layers(scene);
	link_stacks(scene);

	let active = &scene.metadata.active_anim_stack;
	let stack = scene
		.anim_stacks()
		.find(|(element, _)| !active.is_empty() && element.name == *active)
		.or_else(|| scene.anim_stacks().next())
		.map(|(element, stack)| (element.name.clone(), stack.anim.clone()));
	if let Some((name, anim)) = stack {
		log::debug!("default animation from stack {name:?} with {} layers", anim.layers.len());
		scene.anim = anim;
	}
}

fn link_curves(scene: &mut Scene) {
	let mut links = Vec::new();
	for &value in scene.ids_of(ElementType::AnimValue) {
		let mut curves = [None; 3];
		for conn in scene.connections_dst_of(value, None) {
			let is_curve = scene
				.element(conn.src)
				.is_some_and(|element| element.element_type == ElementType::AnimCurve);
			if !is_curve {
				continue;
			}
			let slot = &mut curves[curve_component(&conn.dst_prop)];
			if slot.is_none() {
				*slot = Some(conn.src);
			}
		}
		links.push((value, curves));
	}
	for (value, curves) in links {
		if let Some(anim_value) = scene.elements[value].as_anim_value_mut() {
			anim_value.curves = curves;
		}
	}
}

fn link_layers(scene: &mut Scene) {
	let mut links = Vec::new();
	for &layer in scene.ids_of(ElementType::AnimLayer) {
		let values: Vec<usize> = scene.sources_of(layer, ElementType::AnimValue).collect();
		let mut props: Vec<AnimProp> = Vec::new();
		for &value in &values {
			for conn in scene.connections_src_of(value, Some("")) {
				if conn.dst_prop.is_empty() {
					continue;
				}
				props.push(AnimProp {
					element: conn.dst,
					prop_name: Arc::clone(&conn.dst_prop),
					anim_value: value,
				});
			}
		}
		props.sort_by(|a, b| {
			a.element
				.cmp(&b.element)
				.then_with(|| cmp_prop_names(&a.prop_name, &b.prop_name))
		});
		props.dedup_by(|next, prev| next.element == prev.element && next.prop_name == prev.prop_name);
		links.push((layer, values, props));
	}

	for (_, _, props) in &links {
		for prop in props {
			flag_prop(&mut scene.elements[prop.element], &prop.prop_name, PropFlags::ANIMATED);
		}
	}
	for (layer, values, props) in links {
		let weight_is_animated = scene.elements[layer]
			.props
			.find_own("Weight")
			.is_some_and(|prop| prop.flags.contains(PropFlags::ANIMATED));
		if let Some(anim_layer) = scene.elements[layer].as_anim_layer_mut() {
			anim_layer.anim_values = values;
			anim_layer.anim_props = props;
			anim_layer.weight_is_animated = weight_is_animated;
		}
	}
}

fn link_stacks(scene: &mut Scene) {
	let mut links = Vec::new();
	for &stack in scene.ids_of(ElementType::AnimStack) {
		let layers: Vec<usize> = scene.sources_of(stack, ElementType::AnimLayer).collect();
		links.push((stack, curve_time_range(scene, &layers), layers));
	}
	for (stack, range, layers) in links {
		let Some(anim_stack) = scene.elements[stack].as_anim_stack_mut() else {
			continue;
		};
		if anim_stack.time_begin == 0.0
			&& anim_stack.time_end == 0.0
			&& let Some((begin, end)) = range
		{
			anim_stack.time_begin = begin;
			anim_stack.time_end = end;
		}
		anim_stack.anim = Anim {
			layers: layers.clone(),
			layer_weights: Vec::new(),
			time_begin: anim_stack.time_begin,
			time_end: anim_stack.time_end,
			prop_overrides: Vec::new(),
		};
		anim_stack.layers = layers;
	}
}

/// Key time span of every curve reachable from `layers`.
fn curve_time_range(scene: &Scene, layers: &[usize]) -> Option<(f64, f64)> {
	let mut range: Option<(f64, f64)> = None;
	let curves = layers
		.iter()
		.filter_map(|&layer| scene.element(layer)?.as_anim_layer())
		.flat_map(|layer| layer.anim_values.iter())
		.filter_map(|&value| scene.element(value)?.as_anim_value())
		.flat_map(|value| value.curves.into_iter().flatten())
		.filter_map(|curve| scene.element(curve)?.as_anim_curve());
	for curve in curves {
		if curve.keyframes.is_empty() {
			continue;
		}
		range = Some(match range {
			Some((begin, end)) => (begin.min(curve.min_time), end.max(curve.max_time)),
			None => (curve.min_time, curve.max_time),
		});
	}
	range
}
