use std::sync::Arc;

use glam::{DAffine3, DVec2, DVec3, DVec4};

/// Light emission model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
	/// Omnidirectional point.
	#[default]
	Point,
	/// Parallel rays.
	Directional,
	/// Cone.
	Spot,
	/// Emitting surface.
	Area,
	/// Emitting volume.
	Volume,
}

impl LightType {
	/// Map the `LightType` enum property.
	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => Self::Directional,
			2 => Self::Spot,
			3 => Self::Area,
			4 => Self::Volume,
			_ => Self::Point,
		}
	}
}

/// Distance falloff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightDecay {
	/// No falloff.
	#[default]
	None,
	/// `1/d`
	Linear,
	/// `1/d^2`
	Quadratic,
	/// `1/d^3`
	Cubic,
}

impl LightDecay {
	/// Map the `DecayType` enum property.
	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => Self::Linear,
			2 => Self::Quadratic,
			3 => Self::Cubic,
			_ => Self::None,
		}
	}
}

/// Light attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
	/// Linear color.
	pub color: DVec3,
	/// Intensity, `Intensity / 100`.
	pub intensity: f64,
	/// Emission direction in node space.
	pub local_direction: DVec3,
	/// Emission model.
	pub light_type: LightType,
	/// Falloff.
	pub decay: LightDecay,
	/// True for a spherical area light.
	pub area_sphere: bool,
	/// Full-intensity cone angle in degrees.
	pub inner_angle: f64,
	/// Zero-intensity cone angle in degrees.
	pub outer_angle: f64,
	/// Emits light.
	pub cast_light: bool,
	/// Casts shadows.
	pub cast_shadows: bool,
}

impl Default for Light {
	fn default() -> Self {
		Self {
			color: DVec3::ONE,
			intensity: 1.0,
			local_direction: DVec3::NEG_Y,
			light_type: LightType::Point,
			decay: LightDecay::None,
			area_sphere: false,
			inner_angle: 0.0,
			outer_angle: 45.0,
			cast_light: true,
			cast_shadows: false,
		}
	}
}

/// Camera projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
	/// Perspective.
	#[default]
	Perspective,
	/// Orthographic.
	Orthographic,
}

/// How the film aperture maps onto the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApertureMode {
	/// `FieldOfViewX` and `FieldOfViewY`.
	HorizontalAndVertical,
	/// Horizontal `FieldOfView`.
	Horizontal,
	/// Vertical `FieldOfView`.
	#[default]
	Vertical,
	/// Focal length and film size.
	FocalLength,
}

impl ApertureMode {
	/// Map the `ApertureMode` enum property.
	pub fn from_i64(value: i64) -> Self {
		match value {
			0 => Self::HorizontalAndVertical,
			1 => Self::Horizontal,
			3 => Self::FocalLength,
			_ => Self::Vertical,
		}
	}
}

/// How the film gate fits the resolution gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateFit {
	/// Both axes kept as authored.
	#[default]
	None,
	/// Match heights.
	Vertical,
	/// Match widths.
	Horizontal,
	/// Fit inside.
	Fill,
	/// Cover.
	Overscan,
	/// Stretch to both.
	Stretch,
}

impl GateFit {
	/// Map the `GateFit` enum property.
	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => Self::Vertical,
			2 => Self::Horizontal,
			3 => Self::Fill,
			4 => Self::Overscan,
			5 => Self::Stretch,
			_ => Self::None,
		}
	}
}

/// Camera attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
	/// Projection.
	pub projection_mode: ProjectionMode,
	/// Output resolution.
	pub resolution: DVec2,
	/// True when `resolution` is in pixels rather than a ratio.
	pub resolution_is_pixels: bool,
	/// Full field of view in degrees.
	pub field_of_view_deg: DVec2,
	/// Tangent of half the field of view.
	pub field_of_view_tan: DVec2,
	/// Orthographic half height.
	pub orthographic_extent: f64,
	/// Orthographic view size.
	pub orthographic_size: DVec2,
	/// Projection plane size at unit distance.
	pub projection_plane: DVec2,
	/// Width over height.
	pub aspect_ratio: f64,
	/// Near clip.
	pub near_plane: f64,
	/// Far clip.
	pub far_plane: f64,
	/// Aperture mode.
	pub aperture_mode: ApertureMode,
	/// Gate fit.
	pub gate_fit: GateFit,
	/// Focal length in millimeters.
	pub focal_length_mm: f64,
	/// Film size in inches.
	pub film_size_inch: DVec2,
	/// Horizontal film squeeze.
	pub squeeze_ratio: f64,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			projection_mode: ProjectionMode::Perspective,
			resolution: DVec2::new(640.0, 480.0),
			resolution_is_pixels: true,
			field_of_view_deg: DVec2::splat(40.0),
			field_of_view_tan: DVec2::splat(20_f64.to_radians().tan()),
			orthographic_extent: 1.0,
			orthographic_size: DVec2::ONE,
			projection_plane: DVec2::ONE,
			aspect_ratio: 4.0 / 3.0,
			near_plane: 0.1,
			far_plane: 1000.0,
			aperture_mode: ApertureMode::Vertical,
			gate_fit: GateFit::None,
			focal_length_mm: 35.0,
			film_size_inch: DVec2::new(0.816, 0.612),
			squeeze_ratio: 1.0,
		}
	}
}

/// Skeleton bone attribute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bone {
	/// Display radius.
	pub radius: f64,
	/// Display length relative to the parent.
	pub relative_length: f64,
	/// True for a root bone.
	pub is_root: bool,
}

/// Stereo camera rig.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StereoCamera {
	/// Left eye camera.
	pub left: Option<usize>,
	/// Right eye camera.
	pub right: Option<usize>,
}

/// One level of a [`LodGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LodLevel {
	/// Switch distance.
	pub distance: f64,
	/// Display override, `0` use distance, `1` show, `2` hide.
	pub display: i64,
}

/// Level-of-detail group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodGroup {
	/// Distances are relative to the bounding box.
	pub relative_distances: bool,
	/// Levels, one per child node.
	pub lod_levels: Vec<LodLevel>,
}

/// Known material shading models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaderType {
	/// Unrecognized.
	#[default]
	Unknown,
	/// Classic Lambert.
	FbxLambert,
	/// Classic Phong.
	FbxPhong,
	/// Phong written by Blender with its own conventions.
	BlenderPhong,
	/// Maya/Arnold standard surface.
	ArnoldStandardSurface,
	/// 3ds Max physical material.
	ThreeDsMaxPhysicalMaterial,
	/// 3ds Max PBR metal/roughness.
	ThreeDsMaxPbrMetalRough,
	/// 3ds Max PBR specular/glossiness.
	ThreeDsMaxPbrSpecGloss,
	/// glTF material.
	GltfMaterial,
	/// ShaderFX graph.
	ShaderfxGraph,
}

impl ShaderType {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::FbxLambert => "fbx_lambert",
			Self::FbxPhong => "fbx_phong",
			Self::BlenderPhong => "blender_phong",
			Self::ArnoldStandardSurface => "arnold_standard_surface",
			Self::ThreeDsMaxPhysicalMaterial => "3ds_max_physical_material",
			Self::ThreeDsMaxPbrMetalRough => "3ds_max_pbr_metal_rough",
			Self::ThreeDsMaxPbrSpecGloss => "3ds_max_pbr_spec_gloss",
			Self::GltfMaterial => "gltf_material",
			Self::ShaderfxGraph => "shaderfx_graph",
		}
	}
}

macro_rules! material_maps {
	($($variant:ident => $prop:literal,)*) => {
		/// Classic material channel.
		#[derive(Debug, Clone, Copy, PartialEq, Eq)]
		pub enum MaterialMapKind {
			$(
				#[doc = concat!("`", $prop, "`")]
				$variant,
			)*
		}

		impl MaterialMapKind {
			/// Every channel in declaration order.
			pub const ALL: &'static [MaterialMapKind] = &[$(MaterialMapKind::$variant,)*];

			/// Property that holds the channel value.
			pub fn prop_name(self) -> &'static str {
				match self {
					$(Self::$variant => $prop,)*
				}
			}
		}
	};
}

material_maps! {
	DiffuseColor => "DiffuseColor",
	DiffuseFactor => "DiffuseFactor",
	SpecularColor => "SpecularColor",
	SpecularFactor => "SpecularFactor",
	SpecularExponent => "ShininessExponent",
	EmissionColor => "EmissiveColor",
	EmissionFactor => "EmissiveFactor",
	AmbientColor => "AmbientColor",
	AmbientFactor => "AmbientFactor",
	TransparencyColor => "TransparentColor",
	TransparencyFactor => "TransparencyFactor",
	NormalMap => "NormalMap",
	Bump => "Bump",
	BumpFactor => "BumpFactor",
	Displacement => "DisplacementColor",
	DisplacementFactor => "DisplacementFactor",
	ReflectionColor => "ReflectionColor",
	ReflectionFactor => "ReflectionFactor",
}

impl MaterialMapKind {
	/// Number of channels.
	pub const COUNT: usize = Self::ALL.len();
}

/// Value and optional texture of one material channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialMap {
	/// Channel value.
	pub value: DVec4,
	/// Bound texture.
	pub texture: Option<usize>,
	/// True when the property was present.
	pub has_value: bool,
}

/// Texture bound to a material property.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTexture {
	/// Material property name.
	pub material_prop: Arc<str>,
	/// Shader property name, same as `material_prop` without a binding.
	pub shader_prop: Arc<str>,
	/// Texture element.
	pub texture: usize,
}

/// Surface material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
	/// `ShadingModel` string.
	pub shading_model_name: Arc<str>,
	/// Detected shading model.
	pub shader_type: ShaderType,
	/// Shader element.
	pub shader: Option<usize>,
	/// Prefix of exporter-specific properties.
	pub shader_prop_prefix: Arc<str>,
	/// Channels indexed by [`MaterialMapKind`].
	pub maps: Vec<MaterialMap>,
	/// Bound textures sorted by material property.
	pub textures: Vec<MaterialTexture>,
}

impl Material {
	/// Channel value and texture.
	pub fn map(&self, kind: MaterialMapKind) -> MaterialMap {
		self.maps.get(kind as usize).copied().unwrap_or_default()
	}
}

/// Texture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureType {
	/// Image file.
	#[default]
	File,
	/// Blend of other textures.
	Layered,
	/// Generated by a shader.
	Procedural,
}

/// UV wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
	/// Tile.
	#[default]
	Repeat,
	/// Clamp to edge.
	Clamp,
}

impl WrapMode {
	/// Map the `WrapModeU`/`WrapModeV` enum property.
	pub fn from_i64(value: i64) -> Self {
		if value == 1 { Self::Clamp } else { Self::Repeat }
	}
}

/// Layer of a layered texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureLayer {
	/// Texture element.
	pub texture: usize,
	/// `BlendModes` entry.
	pub blend_mode: i64,
	/// `Alphas` entry.
	pub alpha: f64,
}

/// Texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
	/// Source kind.
	pub texture_type: TextureType,
	/// Path as written by the exporter.
	pub filename: Arc<str>,
	/// Absolute path.
	pub absolute_filename: Arc<str>,
	/// Path relative to the scene file.
	pub relative_filename: Arc<str>,
	/// Embedded bytes taken from the video.
	pub content: Option<Arc<[u8]>>,
	/// Video element.
	pub video: Option<usize>,
	/// UV set name.
	pub uv_set: Arc<str>,
	/// Wrapping along U.
	pub wrap_u: WrapMode,
	/// Wrapping along V.
	pub wrap_v: WrapMode,
	/// UV translation.
	pub uv_translation: DVec3,
	/// UV rotation in degrees.
	pub uv_rotation: DVec3,
	/// UV scale.
	pub uv_scale: DVec3,
	/// Layers of a layered texture.
	pub layers: Vec<TextureLayer>,
}

/// Video or image file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Video {
	/// Path as written by the exporter.
	pub filename: Arc<str>,
	/// Absolute path.
	pub absolute_filename: Arc<str>,
	/// Path relative to the scene file.
	pub relative_filename: Arc<str>,
	/// Embedded bytes.
	pub content: Option<Arc<[u8]>>,
}

/// Shader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shader {
	/// Detected shader model.
	pub shader_type: ShaderType,
	/// Binding tables.
	pub bindings: Vec<usize>,
}

/// Shader to material property mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPropBinding {
	/// Shader property.
	pub shader_prop: Arc<str>,
	/// Material property.
	pub material_prop: Arc<str>,
}

/// Binding table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderBinding {
	/// Entries sorted by shader property.
	pub prop_bindings: Vec<ShaderPropBinding>,
}

/// Display layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLayer {
	/// Member nodes.
	pub nodes: Vec<usize>,
	/// `Show`
	pub visible: bool,
	/// `Freeze`
	pub frozen: bool,
	/// `Color`
	pub ui_color: DVec3,
}

impl Default for DisplayLayer {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			visible: true,
			frozen: false,
			ui_color: DVec3::splat(0.8),
		}
	}
}

/// Named selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
	/// Selection node elements.
	pub nodes: Vec<usize>,
}

/// Component selection of one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionNode {
	/// Selected node.
	pub target_node: Option<usize>,
	/// Mesh of `target_node`.
	pub target_mesh: Option<usize>,
	/// True when the whole node is selected.
	pub include_node: bool,
	/// Selected vertices.
	pub vertices: Vec<u32>,
	/// Selected edges.
	pub edges: Vec<u32>,
	/// Selected faces.
	pub faces: Vec<u32>,
}

/// Constraint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintType {
	/// Unrecognized.
	#[default]
	Unknown,
	/// Aim at a target.
	Aim,
	/// Follow a parent.
	Parent,
	/// Match position.
	Position,
	/// Match rotation.
	Rotation,
	/// Match scale.
	Scale,
	/// Inverse kinematics chain.
	SingleChainIk,
}

impl ConstraintType {
	/// Parse the sub-type string of a `Constraint` object.
	pub fn from_name(name: &str) -> Self {
		match name {
			"Aim" => Self::Aim,
			"Parent-Child" => Self::Parent,
			"Position From Positions" => Self::Position,
			"Rotation From Rotations" => Self::Rotation,
			"Scale From Scales" => Self::Scale,
			"Single Chain IK" => Self::SingleChainIk,
			_ => Self::Unknown,
		}
	}
}

/// Weighted constraint source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintTarget {
	/// Source node.
	pub node: usize,
	/// Influence in `0..=1`.
	pub weight: f64,
}

/// Constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
	/// Kind.
	pub constraint_type: ConstraintType,
	/// Constrained node.
	pub node: Option<usize>,
	/// Sources.
	pub targets: Vec<ConstraintTarget>,
	/// Overall weight in `0..=1`.
	pub weight: f64,
	/// `Active`
	pub active: bool,
}

/// Pose of one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
	/// Bone node.
	pub bone_node: usize,
	/// Bone to world.
	pub bone_to_world: DAffine3,
}

/// Stored pose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
	/// True for a bind pose.
	pub is_bind_pose: bool,
	/// Bone matrices.
	pub bone_poses: Vec<BonePose>,
}
