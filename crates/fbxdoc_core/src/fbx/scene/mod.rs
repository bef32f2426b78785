//! Resolved scene data model.

mod anim;
mod deformer;
mod element;
mod geometry;
mod graph;
mod mesh;
mod metadata;
mod node;
mod objects;
mod props;

/// Animation stacks, layers, values and curves.
pub use anim::{
	Anim, AnimCurve, AnimLayer, AnimProp, AnimStack, AnimValue, Interpolation, KTIME_SECOND, Keyframe, PropOverride,
	Tangent,
};
/// Skin, blend shape and cache deformers.
pub use deformer::{
	BlendChannel, BlendDeformer, BlendKeyframe, BlendShape, CacheDeformer, CacheFile, CacheFileFormat, SkinCluster,
	SkinDeformer, SkinVertex, SkinWeight, SkinningMethod,
};
/// Elements, ids and connections.
pub use element::{Connection, Element, ElementData, ElementType, FbxId};
/// Curves and surfaces.
pub use geometry::{LineCurve, LineSegment, NurbsBasis, NurbsCurve, NurbsSurface, NurbsTopology};
/// Scene container and lookups.
pub use graph::{NameEntry, Scene};
/// Polygon meshes and vertex attributes.
pub use mesh::{
	ColorSet, Edge, Face, IndexSource, Mesh, MeshPart, SubdivisionBoundary, SubdivisionDisplayMode, SubdivisionResult,
	SubdivisionWeight, SubdivisionWeightRange, UvSet, VertexAttrib,
};
/// File information and global settings.
pub use metadata::{
	Application, Exporter, Metadata, SceneSettings, Warning, WarningKind, frames_per_second, parse_version,
};
/// Transform nodes.
pub use node::{InheritMode, Node};
/// Lights, cameras, materials, textures and other leaf objects.
pub use objects::{
	ApertureMode, Bone, BonePose, Camera, Constraint, ConstraintTarget, ConstraintType, DisplayLayer, GateFit, Light,
	LightDecay, LightType, LodGroup, LodLevel, Material, MaterialMap, MaterialMapKind, MaterialTexture, Pose,
	ProjectionMode, SelectionNode, SelectionSet, Shader, ShaderBinding, ShaderPropBinding, ShaderType, StereoCamera,
	Texture, TextureLayer, TextureType, Video, WrapMode,
};
/// Typed properties.
pub use props::{Prop, PropFlags, PropType, Props, cmp_prop_names, prop_name_key};
