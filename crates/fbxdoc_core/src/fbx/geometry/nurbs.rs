use glam::{DVec3, DVec4};
use smallvec::SmallVec;

use crate::fbx::geometry::require_feature;
use crate::fbx::{FbxError, NurbsBasis, NurbsCurve, NurbsSurface, NurbsTopology, Result};

/// Inline capacity for per-order scratch arrays.
type Scratch = SmallVec<[f64; 8]>;

/// Evaluated point on a NURBS curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurvePoint {
	/// Position.
	pub position: DVec3,
	/// First derivative with respect to the parameter.
	pub derivative: DVec3,
}

/// Evaluated point on a NURBS surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
	/// Position.
	pub position: DVec3,
	/// Partial derivative along U.
	pub derivative_u: DVec3,
	/// Partial derivative along V.
	pub derivative_v: DVec3,
	/// Unit normal, `derivative_u x derivative_v`.
	pub normal: DVec3,
}

/// Derive the parameter range, spans and wrapping of `basis`.
///
/// A knot vector longer than `num_control_points + order` means the last
/// control points wrap around to the first ones; this is only accepted for
/// closed and periodic bases and never by more than the degree.
pub(crate) fn setup_nurbs_basis(basis: &mut NurbsBasis, num_control_points: usize) {
	basis.valid = false;
	basis.spans.clear();
	basis.num_wrap_control_points = 0;
	let order = basis.order as usize;
	let num_knots = basis.knot_vector.len();
	if order == 0 || num_control_points == 0 || num_knots < order * 2 {
		return;
	}
	let degree = order - 1;
	let knot_control_points = num_knots - order;
	if knot_control_points < num_control_points {
		log::trace!("nurbs basis has {num_knots} knots for {num_control_points} control points");
		return;
	}
	let wrap = knot_control_points - num_control_points;
	if wrap > 0 && (basis.topology == NurbsTopology::Open || wrap > degree) {
		log::trace!("nurbs basis wraps {wrap} control points with {:?} topology", basis.topology);
		return;
	}
	if basis.knot_vector.windows(2).any(|pair| pair[1] < pair[0]) {
		log::trace!("nurbs knot vector is not sorted");
		return;
	}

	basis.num_wrap_control_points = wrap;
	basis.t_min = basis.knot_vector[degree];
	basis.t_max = basis.knot_vector[num_knots - order];
	if !(basis.t_min < basis.t_max) {
		return;
	}
	for &knot in &basis.knot_vector[degree..=num_knots - order] {
		if basis.spans.last() != Some(&knot) {
			basis.spans.push(knot);
		}
	}
	basis.valid = true;
}

/// Number of control points indexed by the basis, wrapped ones included.
fn indexed_control_points(basis: &NurbsBasis) -> usize {
	basis.knot_vector.len().saturating_sub(basis.order as usize)
}

/// Evaluate the `order` non-zero basis functions at `u`.
///
/// Writes `weights[i]` and optionally `derivatives[i]` for control point
/// `base + i`, returning `base`. Indices past the real control points wrap
/// around for closed and periodic bases. Fails with `BadNurbs` when the basis
/// is invalid or the output slices are shorter than `order`.
pub fn evaluate_nurbs_basis(
	basis: &NurbsBasis,
	u: f64,
	weights: &mut [f64],
	derivatives: Option<&mut [f64]>,
) -> Result<usize> {
	require_feature(cfg!(feature = "tessellation"), "tessellation")?;
	if !basis.valid {
		return Err(FbxError::BadNurbs { reason: "invalid basis" });
	}
	let order = basis.order as usize;
	let degree = order - 1;
	if weights.len() < order || derivatives.as_ref().is_some_and(|out| out.len() < order) {
		return Err(FbxError::BadNurbs { reason: "output shorter than order" });
	}
	let knots = &basis.knot_vector;
	let u = u.clamp(basis.t_min, basis.t_max);

	// Last span whose start is <= u, kept inside the valid range.
	let last_span = indexed_control_points(basis) - 1;
	let span = (knots.partition_point(|&knot| knot <= u).max(1) - 1).clamp(degree, last_span);

	let mut values: Scratch = SmallVec::from_elem(0.0, order);
	let mut left: Scratch = SmallVec::from_elem(0.0, order);
	let mut right: Scratch = SmallVec::from_elem(0.0, order);
	let mut lower: Scratch = SmallVec::new();
	values[0] = 1.0;
	for j in 1..=degree {
		if j == degree {
			lower = values.clone();
		}
		left[j] = u - knots[span + 1 - j];
		right[j] = knots[span + j] - u;
		let mut saved = 0.0;
		for r in 0..j {
			let denom = right[r + 1] + left[j - r];
			let temp = if denom != 0.0 { values[r] / denom } else { 0.0 };
			values[r] = saved + right[r + 1] * temp;
			saved = left[j - r] * temp;
		}
		values[j] = saved;
	}
	weights[..order].copy_from_slice(&values);

	if let Some(derivatives) = derivatives {
		let base = span - degree;
		derivatives[..order].fill(0.0);
		if degree > 0 {
			// N'(i,p) = p * (N(i,p-1) / (k[i+p] - k[i]) - N(i+1,p-1) / (k[i+p+1] - k[i+1]))
			let term = |index: usize, local: usize| {
				let value = if local >= 1 { lower.get(local - 1).copied().unwrap_or(0.0) } else { 0.0 };
				let denom = knots[index + degree] - knots[index];
				if denom != 0.0 { value / denom } else { 0.0 }
			};
			for local in 0..order {
				let index = base + local;
				let next = if local < degree {
					let value = lower.get(local).copied().unwrap_or(0.0);
					let denom = knots[index + degree + 1] - knots[index + 1];
					if denom != 0.0 { value / denom } else { 0.0 }
				} else {
					0.0
				};
				derivatives[local] = degree as f64 * (term(index, local) - next);
			}
		}
	}
	Ok(span - degree)
}

fn control_index(base: usize, local: usize, num_control_points: usize) -> usize {
	(base + local) % num_control_points.max(1)
}

/// Rational point and first derivative from homogeneous sums.
fn dehomogenize(point: DVec4, derivative: DVec4) -> (DVec3, DVec3) {
	if point.w == 0.0 {
		return (DVec3::ZERO, DVec3::ZERO);
	}
	let position = point.truncate() / point.w;
	let tangent = (derivative.truncate() - position * derivative.w) / point.w;
	(position, tangent)
}

/// Evaluate `curve` at parameter `u`.
pub fn evaluate_nurbs_curve(curve: &NurbsCurve, u: f64) -> Result<CurvePoint> {
	let order = curve.basis.order as usize;
	let mut weights: Scratch = SmallVec::from_elem(0.0, order);
	let mut derivs: Scratch = SmallVec::from_elem(0.0, order);
	let base = evaluate_nurbs_basis(&curve.basis, u, &mut weights, Some(&mut derivs))?;

	let mut point = DVec4::ZERO;
	let mut derivative = DVec4::ZERO;
	for local in 0..order {
		let control = curve.control_points[control_index(base, local, curve.control_points.len())];
		let homogeneous = (control.truncate() * control.w).extend(control.w);
		point += homogeneous * weights[local];
		derivative += homogeneous * derivs[local];
	}
	let (position, derivative) = dehomogenize(point, derivative);
	Ok(CurvePoint { position, derivative })
}

/// Evaluate `surface` at parameters `(u, v)`.
pub fn evaluate_nurbs_surface(surface: &NurbsSurface, u: f64, v: f64) -> Result<SurfacePoint> {
	let (num_u, num_v) = (surface.num_control_points_u, surface.num_control_points_v);
	if surface.control_points.len() < num_u * num_v || num_u == 0 || num_v == 0 {
		return Err(FbxError::BadNurbs {
			reason: "control point grid is incomplete",
		});
	}
	let (order_u, order_v) = (surface.basis_u.order as usize, surface.basis_v.order as usize);
	let mut weights_u: Scratch = SmallVec::from_elem(0.0, order_u);
	let mut derivs_u: Scratch = SmallVec::from_elem(0.0, order_u);
	let mut weights_v: Scratch = SmallVec::from_elem(0.0, order_v);
	let mut derivs_v: Scratch = SmallVec::from_elem(0.0, order_v);
	let base_u = evaluate_nurbs_basis(&surface.basis_u, u, &mut weights_u, Some(&mut derivs_u))?;
	let base_v = evaluate_nurbs_basis(&surface.basis_v, v, &mut weights_v, Some(&mut derivs_v))?;

	let mut point = DVec4::ZERO;
	let mut du = DVec4::ZERO;
	let mut dv = DVec4::ZERO;
	for local_v in 0..order_v {
		let row = control_index(base_v, local_v, num_v);
		for local_u in 0..order_u {
			let column = control_index(base_u, local_u, num_u);
			let control = surface.control_points[row * num_u + column];
			let homogeneous = (control.truncate() * control.w).extend(control.w);
			point += homogeneous * (weights_u[local_u] * weights_v[local_v]);
			du += homogeneous * (derivs_u[local_u] * weights_v[local_v]);
			dv += homogeneous * (weights_u[local_u] * derivs_v[local_v]);
		}
	}
	let (position, derivative_u) = dehomogenize(point, du);
	let (_, derivative_v) = dehomogenize(point, dv);
	Ok(SurfacePoint {
		position,
		derivative_u,
		derivative_v,
		normal: derivative_u.cross(derivative_v).normalize_or_zero(),
	})
}
