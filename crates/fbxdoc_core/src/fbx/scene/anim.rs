use std::sync::Arc;

use glam::DVec3;

/// FBX time ticks per second.
pub const KTIME_SECOND: i64 = 46_186_158_000;

/// Keyframe interpolation towards the next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
	/// Hold this key's value.
	ConstantPrev,
	/// Jump to the next key's value.
	ConstantNext,
	/// Straight line.
	Linear,
	/// Bezier with tangents.
	#[default]
	Cubic,
}

/// Tangent as a time/value delta.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tangent {
	/// Time delta in seconds.
	pub dx: f64,
	/// Value delta.
	pub dy: f64,
}

/// One key of an [`AnimCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keyframe {
	/// Time in seconds.
	pub time: f64,
	/// Value.
	pub value: f64,
	/// Interpolation to the next key.
	pub interpolation: Interpolation,
	/// Incoming tangent.
	pub left: Tangent,
	/// Outgoing tangent.
	pub right: Tangent,
}

/// Keyframed scalar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimCurve {
	/// Keys sorted by time.
	pub keyframes: Vec<Keyframe>,
	/// Smallest key value.
	pub min_value: f64,
	/// Largest key value.
	pub max_value: f64,
	/// First key time.
	pub min_time: f64,
	/// Last key time.
	pub max_time: f64,
}

impl AnimCurve {
	/// Update the value and time bounds from `keyframes`.
	pub fn update_bounds(&mut self) {
		let mut keys = self.keyframes.iter();
		let Some(first) = keys.next() else {
			return;
		};
		let (mut min_value, mut max_value) = (first.value, first.value);
		for key in keys {
			min_value = min_value.min(key.value);
			max_value = max_value.max(key.value);
		}
		self.min_value = min_value;
		self.max_value = max_value;
		self.min_time = first.time;
		self.max_time = self.keyframes.last().map_or(first.time, |key| key.time);
	}
}

/// Up to three curves animating one property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimValue {
	/// Value used for components without a curve.
	pub default_value: DVec3,
	/// Curve elements per component.
	pub curves: [Option<usize>; 3],
}

/// Animated property of one element within a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimProp {
	/// Animated element.
	pub element: usize,
	/// Property name.
	pub prop_name: Arc<str>,
	/// Anim value element.
	pub anim_value: usize,
}

/// Group of animated values blended as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimLayer {
	/// Layer weight in `0..=1`.
	pub weight: f64,
	/// True when `Weight` is itself animated.
	pub weight_is_animated: bool,
	/// Blend with earlier layers instead of replacing them.
	pub blended: bool,
	/// Add to earlier layers.
	pub additive: bool,
	/// Compose rotations as quaternions.
	pub compose_rotation: bool,
	/// Compose scales multiplicatively.
	pub compose_scale: bool,
	/// Anim value elements.
	pub anim_values: Vec<usize>,
	/// Animated properties sorted by element then property.
	pub anim_props: Vec<AnimProp>,
}

impl Default for AnimLayer {
	fn default() -> Self {
		Self {
			weight: 1.0,
			weight_is_animated: false,
			blended: false,
			additive: false,
			compose_rotation: true,
			compose_scale: true,
			anim_values: Vec::new(),
			anim_props: Vec::new(),
		}
	}
}

impl AnimLayer {
	/// Range of `anim_props` for `element`.
	pub fn element_props(&self, element: usize) -> &[AnimProp] {
		let begin = self.anim_props.partition_point(|prop| prop.element < element);
		let end = self.anim_props.partition_point(|prop| prop.element <= element);
		&self.anim_props[begin..end]
	}

	/// Anim prop for `element.prop_name`.
	pub fn find_prop(&self, element: usize, prop_name: &str) -> Option<&AnimProp> {
		let props = self.element_props(element);
		props
			.binary_search_by(|prop| crate::fbx::cmp_prop_names(&prop.prop_name, prop_name))
			.ok()
			.map(|index| &props[index])
	}
}

/// Value replacing a property during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PropOverride {
	/// Element id.
	pub element: usize,
	/// Property name.
	pub prop_name: Arc<str>,
	/// Replacement numeric value.
	pub value: glam::DVec4,
	/// Replacement string value.
	pub value_str: Arc<str>,
	/// Replacement integer value.
	pub value_int: i64,
}

/// Layers to evaluate together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Anim {
	/// Layer elements in stack order.
	pub layers: Vec<usize>,
	/// Weight overrides matching `layers`, empty to use each layer's own.
	pub layer_weights: Vec<f64>,
	/// Start time in seconds.
	pub time_begin: f64,
	/// End time in seconds.
	pub time_end: f64,
	/// Sorted property overrides.
	pub prop_overrides: Vec<PropOverride>,
}

/// Animation take.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimStack {
	/// Start time in seconds.
	pub time_begin: f64,
	/// End time in seconds.
	pub time_end: f64,
	/// Layer elements.
	pub layers: Vec<usize>,
	/// Descriptor evaluating this stack.
	pub anim: Anim,
}
