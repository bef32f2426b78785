use crate::fbx::{Anim, BlendChannel, Scene};

use super::evaluate_prop;

/// Weight of blend channel `channel` in `0..=1` at `time`.
pub fn evaluate_blend_weight(scene: &Scene, anim: &Anim, channel: usize, time: f64) -> f64 {
	let fallback = scene
		.element(channel)
		.and_then(|element| element.as_blend_channel())
		.map_or(0.0, |channel| channel.weight);
	let prop = evaluate_prop(scene, anim, channel, "DeformPercent", time);
	if prop.flags.contains(crate::fbx::PropFlags::NOT_FOUND) {
		fallback
	} else {
		prop.real_value() / 100.0
	}
}

/// Distribute `channel.weight` over its in-between shapes.
///
/// Shapes bracketing the weight share it linearly; past the last target the
/// final pair extrapolates.
pub(crate) fn update_blend_keyframes(channel: &mut BlendChannel) {
	let weight = channel.weight;
	let keys = &mut channel.keyframes;
	for key in keys.iter_mut() {
		key.effective_weight = 0.0;
	}
	let num_keys = keys.len();
	if num_keys == 0 {
		return;
	}

	let next = keys.partition_point(|key| key.target_weight < weight);
	if next == 0 {
		let first = &mut keys[0];
		first.effective_weight = ratio(weight, first.target_weight);
	} else if next < num_keys {
		let (lo, hi) = (keys[next - 1].target_weight, keys[next].target_weight);
		let t = ratio(weight - lo, hi - lo);
		keys[next - 1].effective_weight = 1.0 - t;
		keys[next].effective_weight = t;
	} else if num_keys == 1 {
		let last = &mut keys[0];
		last.effective_weight = ratio(weight, last.target_weight);
	} else {
		let (lo, hi) = (keys[num_keys - 2].target_weight, keys[num_keys - 1].target_weight);
		let t = ratio(weight - lo, hi - lo);
		keys[num_keys - 2].effective_weight = 1.0 - t;
		keys[num_keys - 1].effective_weight = t;
	}
}

fn ratio(num: f64, den: f64) -> f64 {
	if den.abs() <= f64::EPSILON { 0.0 } else { num / den }
}
