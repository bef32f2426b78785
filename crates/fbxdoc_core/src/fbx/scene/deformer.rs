use std::sync::Arc;

use glam::{DAffine3, DVec3};

use crate::fbx::cache::GeometryCache;

/// Skinning algorithm requested by the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkinningMethod {
	/// Linear blend skinning.
	#[default]
	Linear,
	/// Rigid, one bone per vertex.
	Rigid,
	/// Dual quaternion skinning.
	DualQuaternion,
	/// Blend of linear and dual quaternion per vertex.
	BlendedDqLinear,
}

impl SkinningMethod {
	/// Parse the `SkinningType` string.
	pub fn from_name(name: &str) -> Self {
		match name {
			"Rigid" => Self::Rigid,
			"DualQuaternion" => Self::DualQuaternion,
			"Blend" => Self::BlendedDqLinear,
			_ => Self::Linear,
		}
	}
}

/// Weight list of one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkinVertex {
	/// First entry of `SkinDeformer::weights`.
	pub weight_begin: u32,
	/// Weight count.
	pub num_weights: u32,
	/// Dual quaternion blend amount.
	pub dq_weight: f64,
}

/// One cluster influence on a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkinWeight {
	/// Index into `SkinDeformer::clusters`.
	pub cluster_index: u32,
	/// Influence.
	pub weight: f64,
}

/// Skin deformer with per-vertex weights sorted descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinDeformer {
	/// Algorithm.
	pub skinning_method: SkinningMethod,
	/// Cluster elements.
	pub clusters: Vec<usize>,
	/// Weight slices per vertex.
	pub vertices: Vec<SkinVertex>,
	/// Flattened weights.
	pub weights: Vec<SkinWeight>,
	/// Largest weight count of any vertex.
	pub max_weights_per_vertex: usize,
	/// Vertices listed by `Indexes` for dual quaternion blending.
	pub dq_vertices: Vec<u32>,
	/// `BlendWeights` matching `dq_vertices`.
	pub dq_weights: Vec<f64>,
}

/// Bone influence of a skin deformer.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinCluster {
	/// Bone node.
	pub bone_node: Option<usize>,
	/// Mesh geometry space to bone space at bind time.
	pub geometry_to_bone: DAffine3,
	/// Mesh node space to bone space at bind time.
	pub mesh_node_to_bone: DAffine3,
	/// Bone space to world at bind time.
	pub bind_to_world: DAffine3,
	/// Current geometry to world through the bone.
	pub geometry_to_world: DAffine3,
	/// `Transform` matrix of the file.
	pub transform: DAffine3,
	/// `TransformLink` matrix of the file.
	pub transform_link: DAffine3,
	/// Vertex indices.
	pub vertices: Vec<u32>,
	/// Weights matching `vertices`.
	pub weights: Vec<f64>,
}

impl Default for SkinCluster {
	fn default() -> Self {
		Self {
			bone_node: None,
			geometry_to_bone: DAffine3::IDENTITY,
			mesh_node_to_bone: DAffine3::IDENTITY,
			bind_to_world: DAffine3::IDENTITY,
			geometry_to_world: DAffine3::IDENTITY,
			transform: DAffine3::IDENTITY,
			transform_link: DAffine3::IDENTITY,
			vertices: Vec::new(),
			weights: Vec::new(),
		}
	}
}

/// Blend shape deformer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendDeformer {
	/// Channel elements.
	pub channels: Vec<usize>,
}

/// Target shape of a channel at some channel weight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendKeyframe {
	/// Shape element.
	pub shape: usize,
	/// Channel weight at which the shape is fully applied.
	pub target_weight: f64,
	/// Current contribution of the shape.
	pub effective_weight: f64,
}

/// Blend shape channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendChannel {
	/// Current weight in `0..=1`.
	pub weight: f64,
	/// In-between targets sorted by `target_weight`.
	pub keyframes: Vec<BlendKeyframe>,
	/// Last keyframe shape.
	pub target_shape: Option<usize>,
	/// Raw `FullWeights` in percent.
	pub full_weights: Vec<f64>,
}

/// Sparse vertex offsets of a blend target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendShape {
	/// Affected vertices, ascending.
	pub offset_vertices: Vec<u32>,
	/// Position deltas.
	pub position_offsets: Vec<DVec3>,
	/// Normal deltas, empty when absent.
	pub normal_offsets: Vec<DVec3>,
}

impl BlendShape {
	/// Number of offsets.
	pub fn num_offsets(&self) -> usize {
		self.offset_vertices.len()
	}

	/// Position delta for `vertex`, zero when unaffected.
	pub fn vertex_offset(&self, vertex: u32) -> DVec3 {
		self.offset_vertices
			.binary_search(&vertex)
			.ok()
			.and_then(|index| self.position_offsets.get(index).copied())
			.unwrap_or(DVec3::ZERO)
	}
}

/// Geometry cache deformer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheDeformer {
	/// Cache channel name.
	pub channel: Arc<str>,
	/// Cache file element.
	pub file: Option<usize>,
}

/// On-disk format of a cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheFileFormat {
	/// Unrecognized.
	#[default]
	Unknown,
	/// 3ds Max point cache.
	Pc2,
	/// Maya cache manifest.
	Mc,
}

/// Geometry cache file reference.
#[derive(Debug, Clone, Default)]
pub struct CacheFile {
	/// Path as written by the exporter.
	pub filename: Arc<str>,
	/// Absolute path.
	pub absolute_filename: Arc<str>,
	/// Path relative to the scene file.
	pub relative_filename: Arc<str>,
	/// File format.
	pub format: CacheFileFormat,
	/// Cache loaded when external files are enabled.
	pub external_cache: Option<Arc<GeometryCache>>,
}
