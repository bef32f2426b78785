//! Transform helpers built on `glam` doubles.

use glam::{DAffine3, DMat3, DQuat, DVec3};

/// Decomposed translation, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
	/// Translation.
	pub translation: DVec3,
	/// Rotation.
	pub rotation: DQuat,
	/// Per-axis scale.
	pub scale: DVec3,
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl Transform {
	/// Identity transform.
	pub const IDENTITY: Self = Self {
		translation: DVec3::ZERO,
		rotation: DQuat::IDENTITY,
		scale: DVec3::ONE,
	};

	/// Compose into an affine matrix.
	pub fn to_affine(self) -> DAffine3 {
		DAffine3::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
	}

	/// Decompose an affine matrix, assuming no shear.
	pub fn from_affine(affine: &DAffine3) -> Self {
		let (scale, rotation, translation) = affine.to_scale_rotation_translation();
		Self {
			translation,
			rotation,
			scale,
		}
	}
}

/// Euler rotation order, named by application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationOrder {
	/// X, then Y, then Z.
	#[default]
	Xyz,
	/// X, then Z, then Y.
	Xzy,
	/// Y, then Z, then X.
	Yzx,
	/// Y, then X, then Z.
	Yxz,
	/// Z, then X, then Y.
	Zxy,
	/// Z, then Y, then X.
	Zyx,
	/// Spherical XYZ, treated as [`RotationOrder::Xyz`].
	Spheric,
}

impl RotationOrder {
	/// Map the `RotationOrder` enum property.
	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => Self::Xzy,
			2 => Self::Yzx,
			3 => Self::Yxz,
			4 => Self::Zxy,
			5 => Self::Zyx,
			6 => Self::Spheric,
			_ => Self::Xyz,
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Xyz => "xyz",
			Self::Xzy => "xzy",
			Self::Yzx => "yzx",
			Self::Yxz => "yxz",
			Self::Zxy => "zxy",
			Self::Zyx => "zyx",
			Self::Spheric => "spheric",
		}
	}

	fn axes(self) -> [usize; 3] {
		match self {
			Self::Xyz | Self::Spheric => [0, 1, 2],
			Self::Xzy => [0, 2, 1],
			Self::Yzx => [1, 2, 0],
			Self::Yxz => [1, 0, 2],
			Self::Zxy => [2, 0, 1],
			Self::Zyx => [2, 1, 0],
		}
	}
}

/// Convert Euler angles in degrees into a quaternion.
pub fn euler_to_quat(degrees: DVec3, order: RotationOrder) -> DQuat {
	let axes = [DVec3::X, DVec3::Y, DVec3::Z];
	let angles = degrees.to_array();
	order.axes().iter().fold(DQuat::IDENTITY, |acc, &axis| {
		DQuat::from_axis_angle(axes[axis], angles[axis].to_radians()) * acc
	})
}

/// Convert a quaternion back into Euler angles in degrees.
pub fn quat_to_euler(rotation: DQuat, order: RotationOrder) -> DVec3 {
	let mat = DMat3::from_quat(rotation.normalize());
	let m = |row: usize, col: usize| mat.col(col)[row];
	let [a, b, c] = order.axes();
	// Tait-Bryan extraction; sign flips for odd permutations.
	let parity = if (b + 3 - a) % 3 == 1 { 1.0 } else { -1.0 };
	let sb = (-parity * m(c, a)).clamp(-1.0, 1.0);
	let mut out = [0.0; 3];
	out[b] = sb.asin();
	if sb.abs() < 0.999_999_9 {
		out[a] = (parity * m(c, b)).atan2(m(c, c));
		out[c] = (parity * m(b, a)).atan2(m(a, a));
	} else {
		out[a] = (-parity * m(b, c)).atan2(m(b, b));
		out[c] = 0.0;
	}
	DVec3::from_array(out.map(f64::to_degrees))
}

/// Signed coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
	/// +X
	PositiveX,
	/// -X
	NegativeX,
	/// +Y
	PositiveY,
	/// -Y
	NegativeY,
	/// +Z
	PositiveZ,
	/// -Z
	NegativeZ,
}

impl Axis {
	/// Decode the `*Axis` index and `*AxisSign` pair of `GlobalSettings`.
	pub fn from_index_sign(index: i64, sign: i64) -> Option<Self> {
		let negative = sign < 0;
		Some(match (index, negative) {
			(0, false) => Self::PositiveX,
			(0, true) => Self::NegativeX,
			(1, false) => Self::PositiveY,
			(1, true) => Self::NegativeY,
			(2, false) => Self::PositiveZ,
			(2, true) => Self::NegativeZ,
			_ => return None,
		})
	}

	/// Unit vector along the axis.
	pub fn vector(self) -> DVec3 {
		match self {
			Self::PositiveX => DVec3::X,
			Self::NegativeX => DVec3::NEG_X,
			Self::PositiveY => DVec3::Y,
			Self::NegativeY => DVec3::NEG_Y,
			Self::PositiveZ => DVec3::Z,
			Self::NegativeZ => DVec3::NEG_Z,
		}
	}

	/// Short label such as `+y`.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::PositiveX => "+x",
			Self::NegativeX => "-x",
			Self::PositiveY => "+y",
			Self::NegativeY => "-y",
			Self::PositiveZ => "+z",
			Self::NegativeZ => "-z",
		}
	}
}

/// Semantic right/up/front directions of a coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateAxes {
	/// Right direction.
	pub right: Axis,
	/// Up direction.
	pub up: Axis,
	/// Front direction, facing the viewer.
	pub front: Axis,
}

impl Default for CoordinateAxes {
	fn default() -> Self {
		Self::RIGHT_HANDED_Y_UP
	}
}

impl CoordinateAxes {
	/// `+X` right, `+Y` up, `+Z` front.
	pub const RIGHT_HANDED_Y_UP: Self = Self {
		right: Axis::PositiveX,
		up: Axis::PositiveY,
		front: Axis::PositiveZ,
	};

	/// `+X` right, `+Z` up, `-Y` front.
	pub const RIGHT_HANDED_Z_UP: Self = Self {
		right: Axis::PositiveX,
		up: Axis::PositiveZ,
		front: Axis::NegativeY,
	};

	/// True when the three axes span all dimensions.
	pub fn is_valid(self) -> bool {
		let basis = self.basis();
		basis.determinant().abs() > 0.5
	}

	/// Matrix whose columns are the right, up and front vectors.
	pub fn basis(self) -> DMat3 {
		DMat3::from_cols(self.right.vector(), self.up.vector(), self.front.vector())
	}
}

/// Linear map taking coordinates in `from` axes to `to` axes.
pub fn axis_conversion(from: CoordinateAxes, to: CoordinateAxes) -> DMat3 {
	to.basis() * from.basis().transpose()
}

/// Snap `value` to a power of ten when within relative `1e-6`.
pub fn round_to_nice(value: f64) -> f64 {
	if !value.is_finite() || value == 0.0 {
		return value;
	}
	let exponent = value.abs().log10().round();
	let nice = 10_f64.powf(exponent).copysign(value);
	if ((value - nice) / nice).abs() < 1e-6 { nice } else { value }
}

/// Scale a rotation by `weight`, slerping from identity.
pub fn quat_pow(rotation: DQuat, weight: f64) -> DQuat {
	DQuat::IDENTITY.slerp(rotation, weight)
}

#[cfg(test)]
mod tests {
	use glam::{DQuat, DVec3};

	use crate::fbx::math::{CoordinateAxes, RotationOrder, axis_conversion, euler_to_quat, quat_to_euler, round_to_nice};

	#[test]
	fn euler_xyz_applies_x_first() {
		let q = euler_to_quat(DVec3::new(90.0, 0.0, 90.0), RotationOrder::Xyz);
		let expected = DQuat::from_rotation_z(90_f64.to_radians()) * DQuat::from_rotation_x(90_f64.to_radians());
		assert!(q.abs_diff_eq(expected, 1e-12));
	}

	#[test]
	fn euler_round_trips_for_every_order() {
		let angles = DVec3::new(10.0, -35.0, 70.0);
		for order in [
			RotationOrder::Xyz,
			RotationOrder::Xzy,
			RotationOrder::Yzx,
			RotationOrder::Yxz,
			RotationOrder::Zxy,
			RotationOrder::Zyx,
		] {
			let q = euler_to_quat(angles, order);
			let back = euler_to_quat(quat_to_euler(q, order), order);
			assert!(q.dot(back).abs() > 1.0 - 1e-9, "order {}", order.as_str());
		}
	}

	#[test]
	fn y_up_to_z_up_permutes_points() {
		let mat = axis_conversion(CoordinateAxes::RIGHT_HANDED_Y_UP, CoordinateAxes::RIGHT_HANDED_Z_UP);
		let p = mat * DVec3::new(1.0, 2.0, 3.0);
		assert!(p.abs_diff_eq(DVec3::new(1.0, -3.0, 2.0), 1e-12));
	}

	#[test]
	fn nice_rounding() {
		assert_eq!(round_to_nice(0.009_999_999_9), 0.01);
		assert_eq!(round_to_nice(100.000_000_01), 100.0);
		assert_eq!(round_to_nice(0.0254), 0.0254);
	}
}
