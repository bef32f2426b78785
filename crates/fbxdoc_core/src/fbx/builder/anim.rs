use crate::fbx::builder::SceneBuilder;
use crate::fbx::names as n;
use crate::fbx::{AnimCurve, FbxNode, Interpolation, KTIME_SECOND, Keyframe, Result, Tangent, WarningKind};

const FLAG_CONSTANT: i32 = 0x2;
const FLAG_LINEAR: i32 = 0x4;
const FLAG_CONSTANT_NEXT: i32 = 0x100;
const FLAG_TANGENT_USER: i32 = 0x400;
const FLAG_TANGENT_BREAK: i32 = 0x800;
const FLAG_WEIGHTED_RIGHT: i32 = 0x0100_0000;
const FLAG_WEIGHTED_NEXT_LEFT: i32 = 0x0200_0000;

/// Tangent weight used when a key carries none.
pub(super) const DEFAULT_WEIGHT: f64 = 1.0 / 3.0;

/// Key before tangents are resolved against its neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct RawKey {
	pub time: f64,
	pub value: f64,
	pub interpolation: Interpolation,
	/// Outgoing slope and the next key's incoming slope, `None` for automatic tangents.
	pub slopes: Option<(f64, f64)>,
	/// Outgoing weight and the next key's incoming weight.
	pub weights: (f64, f64),
}

impl RawKey {
	pub(super) fn new(time: f64, value: f64, interpolation: Interpolation) -> Self {
		Self {
			time,
			value,
			interpolation,
			slopes: None,
			weights: (DEFAULT_WEIGHT, DEFAULT_WEIGHT),
		}
	}
}

impl SceneBuilder<'_, '_> {
	/// `AnimationCurve` with `KeyTime`, `KeyValueFloat` and per-key attributes.
	pub(super) fn read_anim_curve(&mut self, node: &FbxNode) -> Result<AnimCurve> {
		let times = node.child_array(n::KEY_TIME).map(|array| array.as_i64().into_owned()).unwrap_or_default();
		let values = node
			.child_array(n::KEY_VALUE_FLOAT)
			.map(|array| array.as_f64().into_owned())
			.unwrap_or_default();
		if times.len() != values.len() {
			self.tolerate(WarningKind::TruncatedArray, || {
				format!("curve has {} times and {} values", times.len(), values.len())
			})?;
		}
		let flags = node.child_array(n::KEY_ATTR_FLAGS).map(|array| array.as_i32().into_owned()).unwrap_or_default();
		let data = node
			.child_array(n::KEY_ATTR_DATA_FLOAT)
			.map(|array| array.as_f32().into_owned())
			.unwrap_or_default();
		let ref_counts = node
			.child_array(n::KEY_ATTR_REF_COUNT)
			.map(|array| array.as_i32().into_owned())
			.unwrap_or_default();

		// Attributes are run-length encoded: attribute `a` covers `ref_counts[a]` keys.
		let mut key_attrib = Vec::with_capacity(times.len());
		for (attrib, &count) in ref_counts.iter().enumerate() {
			key_attrib.extend(std::iter::repeat_n(attrib, count.max(0) as usize));
		}

		let mut keys: Vec<RawKey> = times
			.iter()
			.zip(&values)
			.enumerate()
			.map(|(index, (&time, &value))| {
				let time = time as f64 / KTIME_SECOND as f64;
				match key_attrib.get(index) {
					Some(&attrib) => decode_key(time, value, flags.get(attrib).copied().unwrap_or(0), data.get(attrib * 4..attrib * 4 + 4)),
					None => RawKey::new(time, value, Interpolation::Cubic),
				}
			})
			.collect();
		if keys.windows(2).any(|pair| pair[1].time < pair[0].time) {
			self.warn(WarningKind::UnsortedKeys, || "curve keys are not sorted by time".to_owned());
			keys.sort_by(|a, b| a.time.total_cmp(&b.time));
		}

		let mut curve = AnimCurve {
			keyframes: build_keyframes(&keys),
			..AnimCurve::default()
		};
		curve.update_bounds();
		Ok(curve)
	}
}

fn decode_key(time: f64, value: f64, flags: i32, data: Option<&[f32]>) -> RawKey {
	let interpolation = if flags & FLAG_CONSTANT != 0 {
		if flags & FLAG_CONSTANT_NEXT != 0 { Interpolation::ConstantNext } else { Interpolation::ConstantPrev }
	} else if flags & FLAG_LINEAR != 0 {
		Interpolation::Linear
	} else {
		Interpolation::Cubic
	};
	let mut key = RawKey::new(time, value, interpolation);
	let Some(data) = data else {
		return key;
	};
	if flags & (FLAG_TANGENT_USER | FLAG_TANGENT_BREAK) != 0 {
		key.slopes = Some((f64::from(data[0]), f64::from(data[1])));
	}
	// Weights are two 16-bit fixed-point fractions packed into the bits of the third float.
	let packed = data[2].to_bits();
	if flags & FLAG_WEIGHTED_RIGHT != 0 {
		key.weights.0 = f64::from(packed & 0xffff) / 9999.0;
	}
	if flags & FLAG_WEIGHTED_NEXT_LEFT != 0 {
		key.weights.1 = f64::from(packed >> 16) / 9999.0;
	}
	key
}

/// Clamped automatic slope: flat at extrema and ends, limited by the neighboring segments.
fn auto_slope(keys: &[RawKey], index: usize) -> f64 {
	let (Some(prev), Some(next)) = (index.checked_sub(1).and_then(|i| keys.get(i)), keys.get(index + 1)) else {
		return 0.0;
	};
	let key = keys[index];
	let dt = next.time - prev.time;
	if dt <= 0.0 {
		return 0.0;
	}
	let is_extremum = (key.value >= prev.value && key.value >= next.value) || (key.value <= prev.value && key.value <= next.value);
	if is_extremum {
		return 0.0;
	}
	let slope = (next.value - prev.value) / dt;
	let segment = |a: &RawKey, b: &RawKey| {
		let dt = b.time - a.time;
		if dt > 0.0 { ((b.value - a.value) / dt).abs() * 3.0 } else { 0.0 }
	};
	let limit = segment(prev, &key).min(segment(&key, next));
	slope.clamp(-limit, limit)
}

/// Resolve raw keys into keyframes with explicit tangents.
///
/// Right tangents point forward from a key, left tangents backward; both
/// store a positive time delta.
pub(super) fn build_keyframes(keys: &[RawKey]) -> Vec<Keyframe> {
	let auto: Vec<f64> = (0..keys.len()).map(|index| auto_slope(keys, index)).collect();
	let mut keyframes: Vec<Keyframe> = keys
		.iter()
		.map(|key| Keyframe {
			time: key.time,
			value: key.value,
			interpolation: key.interpolation,
			left: Tangent::default(),
			right: Tangent::default(),
		})
		.collect();

	for index in 0..keys.len() {
		let key = keys[index];
		let Some(next) = keys.get(index + 1) else {
			break;
		};
		let dt = (next.time - key.time).max(0.0);
		let (right_slope, left_slope) = match key.slopes {
			Some(slopes) => slopes,
			None => (auto[index], auto[index + 1]),
		};
		keyframes[index].right = Tangent {
			dx: key.weights.0 * dt,
			dy: key.weights.0 * dt * right_slope,
		};
		keyframes[index + 1].left = Tangent {
			dx: key.weights.1 * dt,
			dy: key.weights.1 * dt * left_slope,
		};
	}
	// Open ends mirror their only tangent.
	if let Some(first) = keyframes.first_mut() {
		first.left = first.right;
	}
	if let Some(last) = keyframes.last_mut() {
		last.right = last.left;
	}
	keyframes
}
