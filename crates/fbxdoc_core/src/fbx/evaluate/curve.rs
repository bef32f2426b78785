use glam::{DVec2, DVec3};

use crate::fbx::{AnimCurve, AnimValue, Interpolation, Keyframe, Scene};

const MAX_NEWTON_STEPS: usize = 8;
const MAX_BISECT_STEPS: usize = 64;

/// Value of `curve` at `time` seconds, `default` without keys.
///
/// Times outside the keyed range hold the first or last value.
pub fn evaluate_curve(curve: &AnimCurve, time: f64, default: f64) -> f64 {
	let keys = &curve.keyframes;
	let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
		return default;
	};
	if time <= first.time {
		return first.value;
	}
	if time >= last.time {
		return last.value;
	}

	let next = keys.partition_point(|key| key.time <= time);
	let (a, b) = (&keys[next - 1], &keys[next]);
	let dx = b.time - a.time;
	if dx <= 0.0 {
		return b.value;
	}
	let t = (time - a.time) / dx;
	match a.interpolation {
		Interpolation::ConstantPrev => a.value,
		Interpolation::ConstantNext => b.value,
		Interpolation::Linear => a.value + (b.value - a.value) * t,
		Interpolation::Cubic => cubic(a, b, dx, t),
	}
}

/// Bezier segment with time control points from the tangent lengths.
fn cubic(a: &Keyframe, b: &Keyframe, dx: f64, t: f64) -> f64 {
	let x1 = (a.right.dx / dx).clamp(0.0, 1.0);
	let x2 = (1.0 - b.left.dx / dx).clamp(0.0, 1.0);
	let u = solve_bezier_x(x1, x2, t);
	bezier(a.value, a.value + a.right.dy, b.value - b.left.dy, b.value, u)
}

fn bezier(p0: f64, p1: f64, p2: f64, p3: f64, u: f64) -> f64 {
	let v = 1.0 - u;
	v * v * v * p0 + 3.0 * v * v * u * p1 + 3.0 * v * u * u * p2 + u * u * u * p3
}

/// Parameter `u` where the time curve `(0, x1, x2, 1)` reaches `t`.
///
/// The time curve is monotonic for control points in `0..=1`, so Newton
/// steps converge quickly; bisection takes over when a step leaves the
/// bracket or the derivative vanishes.
fn solve_bezier_x(x1: f64, x2: f64, t: f64) -> f64 {
	let x_at = |u: f64| bezier(0.0, x1, x2, 1.0, u);
	let dx_at = |u: f64| {
		let v = 1.0 - u;
		3.0 * v * v * x1 + 6.0 * v * u * (x2 - x1) + 3.0 * u * u * (1.0 - x2)
	};

	let mut u = t;
	for _ in 0..MAX_NEWTON_STEPS {
		let err = x_at(u) - t;
		if err.abs() <= 4.0 * f64::EPSILON {
			return u;
		}
		let slope = dx_at(u);
		if slope.abs() < 1e-12 {
			break;
		}
		let next = u - err / slope;
		if !(0.0..=1.0).contains(&next) {
			break;
		}
		u = next;
	}

	let (mut lo, mut hi) = (0.0, 1.0);
	for _ in 0..MAX_BISECT_STEPS {
		let mid = 0.5 * (lo + hi);
		if x_at(mid) < t {
			lo = mid;
		} else {
			hi = mid;
		}
	}
	0.5 * (lo + hi)
}

impl AnimValue {
	fn component(&self, scene: &Scene, index: usize, time: f64) -> f64 {
		let default = self.default_value[index];
		self.curves[index]
			.and_then(|curve| scene.element(curve)?.as_anim_curve())
			.map_or(default, |curve| evaluate_curve(curve, time, default))
	}

	/// First component at `time`.
	pub fn evaluate_real(&self, scene: &Scene, time: f64) -> f64 {
		self.component(scene, 0, time)
	}

	/// First two components at `time`.
	pub fn evaluate_vec2(&self, scene: &Scene, time: f64) -> DVec2 {
		DVec2::new(self.component(scene, 0, time), self.component(scene, 1, time))
	}

	/// All three components at `time`.
	pub fn evaluate_vec3(&self, scene: &Scene, time: f64) -> DVec3 {
		DVec3::new(
			self.component(scene, 0, time),
			self.component(scene, 1, time),
			self.component(scene, 2, time),
		)
	}
}
