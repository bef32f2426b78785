use std::ops::Range;
use std::sync::Arc;

use crate::fbx::scene::anim::{AnimCurve, AnimLayer, AnimStack, AnimValue};
use crate::fbx::scene::deformer::{
	BlendChannel, BlendDeformer, BlendShape, CacheDeformer, CacheFile, SkinCluster, SkinDeformer,
};
use crate::fbx::scene::geometry::{LineCurve, NurbsCurve, NurbsSurface};
use crate::fbx::scene::mesh::Mesh;
use crate::fbx::scene::node::Node;
use crate::fbx::scene::objects::{
	Bone, Camera, Constraint, DisplayLayer, Light, LodGroup, Material, Pose, SelectionNode, SelectionSet, Shader,
	ShaderBinding, StereoCamera, Texture, Video,
};
use crate::fbx::{Props, Symbol};

/// Identifier used to resolve connections while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FbxId {
	/// 64-bit id stored in the file.
	Explicit(u64),
	/// Id derived from an interned `Type::Name` string.
	Synthetic(Symbol),
	/// Id made up for loader-created elements.
	Generated(u32),
}

impl FbxId {
	/// Hash for [`Map`](crate::fbx::Map) lookups.
	pub fn map_hash(self) -> u32 {
		match self {
			Self::Explicit(id) => crate::fbx::hash_u64(id),
			Self::Synthetic(symbol) => crate::fbx::hash_u64(0x8000_0000_0000_0000 | symbol.index() as u64),
			Self::Generated(index) => crate::fbx::hash_u64(0x4000_0000_0000_0000 | u64::from(index)),
		}
	}
}

macro_rules! element_types {
	($($variant:ident => $label:literal,)*) => {
		/// Kind of a scene element.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub enum ElementType {
			$(
				#[doc = concat!("`", $label, "`")]
				$variant,
			)*
		}

		impl ElementType {
			/// Every element type in declaration order.
			pub const ALL: &'static [ElementType] = &[$(ElementType::$variant,)*];

			/// Stable snake-case label.
			pub fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $label,)*
				}
			}

			/// Inverse of [`ElementType::as_str`].
			pub fn from_label(label: &str) -> Option<Self> {
				match label {
					$($label => Some(Self::$variant),)*
					_ => None,
				}
			}
		}
	};
}

element_types! {
	Unknown => "unknown",
	Node => "node",
	Mesh => "mesh",
	Light => "light",
	Camera => "camera",
	Bone => "bone",
	Empty => "empty",
	LineCurve => "line_curve",
	NurbsCurve => "nurbs_curve",
	NurbsSurface => "nurbs_surface",
	NurbsTrimSurface => "nurbs_trim_surface",
	NurbsTrimBoundary => "nurbs_trim_boundary",
	ProceduralGeometry => "procedural_geometry",
	StereoCamera => "stereo_camera",
	CameraSwitcher => "camera_switcher",
	Marker => "marker",
	LodGroup => "lod_group",
	SkinDeformer => "skin_deformer",
	SkinCluster => "skin_cluster",
	BlendDeformer => "blend_deformer",
	BlendChannel => "blend_channel",
	BlendShape => "blend_shape",
	CacheDeformer => "cache_deformer",
	CacheFile => "cache_file",
	Material => "material",
	Texture => "texture",
	Video => "video",
	Shader => "shader",
	ShaderBinding => "shader_binding",
	AnimStack => "anim_stack",
	AnimLayer => "anim_layer",
	AnimValue => "anim_value",
	AnimCurve => "anim_curve",
	DisplayLayer => "display_layer",
	SelectionSet => "selection_set",
	SelectionNode => "selection_node",
	Character => "character",
	Constraint => "constraint",
	Pose => "pose",
	MetadataObject => "metadata_object",
}

impl ElementType {
	/// Number of element types.
	pub const COUNT: usize = Self::ALL.len();

	/// Types that can be attached to a node as its attribute.
	pub fn is_node_attribute(self) -> bool {
		matches!(
			self,
			Self::Mesh
				| Self::Light | Self::Camera
				| Self::Bone | Self::Empty
				| Self::LineCurve
				| Self::NurbsCurve
				| Self::NurbsSurface
				| Self::NurbsTrimSurface
				| Self::NurbsTrimBoundary
				| Self::ProceduralGeometry
				| Self::StereoCamera
				| Self::CameraSwitcher
				| Self::Marker | Self::LodGroup
		)
	}
}

/// Type-specific payload of an element.
#[derive(Debug, Clone)]
pub enum ElementData {
	/// Transform node.
	Node(Node),
	/// Polygon mesh.
	Mesh(Box<Mesh>),
	/// Light source.
	Light(Light),
	/// Camera.
	Camera(Camera),
	/// Skeleton bone.
	Bone(Bone),
	/// Polyline curve.
	LineCurve(LineCurve),
	/// NURBS curve.
	NurbsCurve(NurbsCurve),
	/// NURBS surface.
	NurbsSurface(NurbsSurface),
	/// Stereo camera rig.
	StereoCamera(StereoCamera),
	/// Level-of-detail group.
	LodGroup(LodGroup),
	/// Skin deformer.
	SkinDeformer(SkinDeformer),
	/// Skin cluster.
	SkinCluster(SkinCluster),
	/// Blend shape deformer.
	BlendDeformer(BlendDeformer),
	/// Blend shape channel.
	BlendChannel(BlendChannel),
	/// Blend shape target.
	BlendShape(BlendShape),
	/// Geometry cache deformer.
	CacheDeformer(CacheDeformer),
	/// Geometry cache file reference.
	CacheFile(CacheFile),
	/// Surface material.
	Material(Material),
	/// Texture.
	Texture(Texture),
	/// Video or image file.
	Video(Video),
	/// Shader.
	Shader(Shader),
	/// Shader property binding table.
	ShaderBinding(ShaderBinding),
	/// Animation stack.
	AnimStack(AnimStack),
	/// Animation layer.
	AnimLayer(AnimLayer),
	/// Animated value.
	AnimValue(AnimValue),
	/// Animation curve.
	AnimCurve(AnimCurve),
	/// Display layer.
	DisplayLayer(DisplayLayer),
	/// Selection set.
	SelectionSet(SelectionSet),
	/// Selection set entry.
	SelectionNode(SelectionNode),
	/// Constraint.
	Constraint(Constraint),
	/// Pose.
	Pose(Pose),
	/// Element carrying only properties.
	Plain,
}

/// One typed scene object.
#[derive(Debug, Clone)]
pub struct Element {
	/// Dense index into `Scene::elements`.
	pub element_id: usize,
	/// Dense index among elements of the same type.
	pub typed_id: usize,
	/// Object name without the `Type::` prefix.
	pub name: Arc<str>,
	/// Element kind.
	pub element_type: ElementType,
	/// File-level object type name, e.g. `Geometry`.
	pub type_name: Arc<str>,
	/// File-level sub-type, e.g. `Mesh`.
	pub sub_type: Arc<str>,
	/// Id the element was declared with.
	pub fbx_id: Option<FbxId>,
	/// Properties.
	pub props: Props,
	/// Nodes instancing this element.
	pub instances: Vec<usize>,
	/// Range into `Scene::connections_src`.
	pub connections_src: Range<usize>,
	/// Range into `Scene::connections_dst`.
	pub connections_dst: Range<usize>,
	/// Index of the object's node under the retained `Objects` DOM.
	pub dom_node: Option<usize>,
	/// Type-specific payload.
	pub data: ElementData,
}

macro_rules! element_accessors {
	($($get:ident, $get_mut:ident => $variant:ident($ty:ty);)*) => {
		impl Element {
			$(
				#[doc = concat!("Payload as `", stringify!($ty), "`.")]
				pub fn $get(&self) -> Option<&$ty> {
					match &self.data {
						ElementData::$variant(value) => Some(value),
						_ => None,
					}
				}

				#[doc = concat!("Mutable payload as `", stringify!($ty), "`.")]
				pub fn $get_mut(&mut self) -> Option<&mut $ty> {
					match &mut self.data {
						ElementData::$variant(value) => Some(value),
						_ => None,
					}
				}
			)*
		}
	};
}

element_accessors! {
	as_node, as_node_mut => Node(Node);
	as_light, as_light_mut => Light(Light);
	as_camera, as_camera_mut => Camera(Camera);
	as_bone, as_bone_mut => Bone(Bone);
	as_line_curve, as_line_curve_mut => LineCurve(LineCurve);
	as_nurbs_curve, as_nurbs_curve_mut => NurbsCurve(NurbsCurve);
	as_nurbs_surface, as_nurbs_surface_mut => NurbsSurface(NurbsSurface);
	as_stereo_camera, as_stereo_camera_mut => StereoCamera(StereoCamera);
	as_lod_group, as_lod_group_mut => LodGroup(LodGroup);
	as_skin_deformer, as_skin_deformer_mut => SkinDeformer(SkinDeformer);
	as_skin_cluster, as_skin_cluster_mut => SkinCluster(SkinCluster);
	as_blend_deformer, as_blend_deformer_mut => BlendDeformer(BlendDeformer);
	as_blend_channel, as_blend_channel_mut => BlendChannel(BlendChannel);
	as_blend_shape, as_blend_shape_mut => BlendShape(BlendShape);
	as_cache_deformer, as_cache_deformer_mut => CacheDeformer(CacheDeformer);
	as_cache_file, as_cache_file_mut => CacheFile(CacheFile);
	as_material, as_material_mut => Material(Material);
	as_texture, as_texture_mut => Texture(Texture);
	as_video, as_video_mut => Video(Video);
	as_shader, as_shader_mut => Shader(Shader);
	as_shader_binding, as_shader_binding_mut => ShaderBinding(ShaderBinding);
	as_anim_stack, as_anim_stack_mut => AnimStack(AnimStack);
	as_anim_layer, as_anim_layer_mut => AnimLayer(AnimLayer);
	as_anim_value, as_anim_value_mut => AnimValue(AnimValue);
	as_anim_curve, as_anim_curve_mut => AnimCurve(AnimCurve);
	as_display_layer, as_display_layer_mut => DisplayLayer(DisplayLayer);
	as_selection_set, as_selection_set_mut => SelectionSet(SelectionSet);
	as_selection_node, as_selection_node_mut => SelectionNode(SelectionNode);
	as_constraint, as_constraint_mut => Constraint(Constraint);
	as_pose, as_pose_mut => Pose(Pose);
}

impl Element {
	/// Payload as `Mesh`.
	pub fn as_mesh(&self) -> Option<&Mesh> {
		match &self.data {
			ElementData::Mesh(mesh) => Some(mesh),
			_ => None,
		}
	}

	/// Mutable payload as `Mesh`.
	pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
		match &mut self.data {
			ElementData::Mesh(mesh) => Some(mesh),
			_ => None,
		}
	}
}

/// Directed edge of the object graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
	/// Source element id.
	pub src: usize,
	/// Destination element id.
	pub dst: usize,
	/// Source property, empty for object endpoints.
	pub src_prop: Arc<str>,
	/// Destination property, empty for object endpoints.
	pub dst_prop: Arc<str>,
}
