//! Derived geometry: topology, normals, index generation, triangulation,
//! subdivision and NURBS evaluation.
//!
//! Everything here works on finished [`Mesh`](crate::fbx::Mesh) and NURBS
//! payloads and never touches the parser. Subdivision, NURBS tessellation and
//! n-gon triangulation are behind cargo features; calling a compiled-out
//! operation fails with [`FbxError::FeatureDisabled`].

mod indices;
mod normals;
mod nurbs;
mod subdivide;
mod tessellate;
mod topology;
mod triangulate;

use crate::fbx::{FbxError, Result};

/// Vertex de-duplication.
pub use indices::{VertexStream, generate_indices};
/// Normal generation.
pub use normals::{compute_normals, generate_normal_mapping, weighted_face_normal};
pub(crate) use normals::generate_mesh_normals;
/// NURBS basis and point evaluation.
pub use nurbs::{CurvePoint, SurfacePoint, evaluate_nurbs_basis, evaluate_nurbs_curve, evaluate_nurbs_surface};
pub(crate) use nurbs::setup_nurbs_basis;
/// Catmull-Clark subdivision.
pub use subdivide::{SubdivideOpts, subdivide_mesh, subdivide_mesh_with_skin};
/// NURBS tessellation.
pub use tessellate::{TessellateCurveOpts, TessellateSurfaceOpts, tessellate_nurbs_curve, tessellate_nurbs_surface};
/// Corner adjacency.
pub use topology::{TopoEdge, compute_topology, topo_next_vertex_edge, topo_prev_vertex_edge};
/// Polygon triangulation.
pub use triangulate::triangulate_face;

/// Fail with `FeatureDisabled` when `enabled` is false.
fn require_feature(enabled: bool, feature: &'static str) -> Result<()> {
	if enabled {
		Ok(())
	} else {
		Err(FbxError::FeatureDisabled { feature })
	}
}

#[cfg(test)]
mod tests;
