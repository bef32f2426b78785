use glam::{DVec3, DVec4};

/// Consecutive points of a [`LineCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSegment {
	/// First entry of `point_indices`.
	pub index_begin: u32,
	/// Point count.
	pub num_indices: u32,
}

/// Polyline curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineCurve {
	/// Display color.
	pub color: DVec3,
	/// Points.
	pub control_points: Vec<DVec3>,
	/// Point index per curve vertex.
	pub point_indices: Vec<u32>,
	/// Connected runs of `point_indices`.
	pub segments: Vec<LineSegment>,
	/// True for curves produced from NURBS.
	pub from_tessellated_nurbs: bool,
}

/// Parameter-space wrapping of a NURBS basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NurbsTopology {
	/// Clamped ends.
	#[default]
	Open,
	/// Smoothly wrapping, with repeated control points.
	Periodic,
	/// Ends meet without smooth wrapping.
	Closed,
}

impl NurbsTopology {
	/// Parse the `Form`/`FormU`/`FormV` token.
	pub fn from_form(form: &str) -> Self {
		match form {
			"Periodic" => Self::Periodic,
			"Closed" => Self::Closed,
			_ => Self::Open,
		}
	}
}

/// B-spline basis in one parameter direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NurbsBasis {
	/// Degree plus one.
	pub order: u32,
	/// Wrapping mode.
	pub topology: NurbsTopology,
	/// Knots.
	pub knot_vector: Vec<f64>,
	/// First valid parameter.
	pub t_min: f64,
	/// Last valid parameter.
	pub t_max: f64,
	/// Distinct knot values inside `[t_min, t_max]`.
	pub spans: Vec<f64>,
	/// True for 2D curves.
	pub is_2d: bool,
	/// Control points repeated at the end for periodic wrapping.
	pub num_wrap_control_points: usize,
	/// True when the knot vector matches order and control point count.
	pub valid: bool,
}

/// Rational B-spline curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NurbsCurve {
	/// Basis.
	pub basis: NurbsBasis,
	/// Homogeneous control points, `w` is the weight.
	pub control_points: Vec<DVec4>,
}

/// Rational B-spline surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NurbsSurface {
	/// Basis along U.
	pub basis_u: NurbsBasis,
	/// Basis along V.
	pub basis_v: NurbsBasis,
	/// Control points along U.
	pub num_control_points_u: usize,
	/// Control points along V.
	pub num_control_points_v: usize,
	/// Tessellation steps per span along U.
	pub span_subdivision_u: u32,
	/// Tessellation steps per span along V.
	pub span_subdivision_v: u32,
	/// Reverse face winding.
	pub flip_normals: bool,
	/// Homogeneous control points, indexed `v * num_control_points_u + u`.
	pub control_points: Vec<DVec4>,
	/// Material of the surface.
	pub material: Option<usize>,
}
