//! Parse contexts and their transition table.
//!
//! The same node name means different things under different parents, so the
//! parser tracks a [`ParseState`] per nesting level and asks it how the next
//! node's array payload should be typed.

use crate::fbx::names as n;
use crate::fbx::{ArrayKind, Symbol};

/// Node context used to type arrays and raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseState {
	/// Top-level node list.
	Root,
	/// `FBXHeaderExtension`.
	HeaderExtension,
	/// `FBXHeaderExtension/SceneInfo`.
	SceneInfo,
	/// `GlobalSettings`.
	GlobalSettings,
	/// `Documents`.
	Documents,
	/// `Documents/Document`.
	Document,
	/// `References`.
	References,
	/// `Definitions`.
	Definitions,
	/// `Definitions/ObjectType`.
	ObjectType,
	/// `ObjectType/PropertyTemplate`.
	PropertyTemplate,
	/// `Properties70` or `Properties60`.
	Properties,
	/// `Objects`.
	Objects,
	/// `Objects/Model`, which embeds geometry before 7000.
	Model,
	/// `Objects/Geometry`.
	Geometry,
	/// `Objects/NodeAttribute`.
	NodeAttribute,
	/// `Objects/Material`.
	Material,
	/// `Objects/Texture`.
	Texture,
	/// `Objects/Video`.
	Video,
	/// `Objects/Deformer`.
	Deformer,
	/// `Objects/Pose`.
	Pose,
	/// `Pose/PoseNode`.
	PoseNode,
	/// `Objects/AnimationStack`.
	AnimationStack,
	/// `Objects/AnimationLayer`.
	AnimationLayer,
	/// `Objects/AnimationCurveNode`.
	AnimationCurveNode,
	/// `Objects/AnimationCurve`.
	AnimationCurve,
	/// `Objects/SelectionNode`.
	SelectionNode,
	/// `Objects/Cache` and other generic objects.
	GenericObject,
	/// `LayerElementNormal`.
	LayerElementNormal,
	/// `LayerElementBinormal`.
	LayerElementBinormal,
	/// `LayerElementTangent`.
	LayerElementTangent,
	/// `LayerElementUV`.
	LayerElementUv,
	/// `LayerElementColor`.
	LayerElementColor,
	/// `LayerElementVertexCrease`.
	LayerElementVertexCrease,
	/// `LayerElementEdgeCrease`.
	LayerElementEdgeCrease,
	/// `LayerElementSmoothing`.
	LayerElementSmoothing,
	/// `LayerElementMaterial`.
	LayerElementMaterial,
	/// `LayerElementPolygonGroup`.
	LayerElementPolygonGroup,
	/// `LayerElementHole`.
	LayerElementHole,
	/// `LayerElementVisibility`.
	LayerElementVisibility,
	/// Any other `LayerElement*` block.
	LayerElementOther,
	/// `Layer` of a geometry.
	Layer,
	/// `Layer/LayerElement`.
	LayerElementRef,
	/// `Geometry/Shape` of legacy files.
	Shape,
	/// `Connections`.
	Connections,
	/// `Takes`.
	Takes,
	/// `Takes/Take`.
	Take,
	/// `Take/Model` (pre-7000 animation).
	TakeObject,
	/// `Channel` nested inside a take object.
	TakeChannel,
	/// Anything without special handling.
	Unknown,
}

/// How the parser should materialize a node's array payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayRequest {
	/// Keep the stored element type.
	Keep,
	/// Convert to the given element type.
	As(ArrayKind),
}

impl ParseState {
	/// State for a child named `name` under this state.
	pub fn child(self, name: Symbol) -> Self {
		match self {
			Self::Root => match name {
				n::FBX_HEADER_EXTENSION => Self::HeaderExtension,
				n::GLOBAL_SETTINGS => Self::GlobalSettings,
				n::DOCUMENTS => Self::Documents,
				n::REFERENCES => Self::References,
				n::DEFINITIONS => Self::Definitions,
				n::OBJECTS => Self::Objects,
				n::CONNECTIONS => Self::Connections,
				n::TAKES => Self::Takes,
				_ => Self::Unknown,
			},
			Self::HeaderExtension => match name {
				n::SCENE_INFO => Self::SceneInfo,
				_ => Self::Unknown,
			},
			Self::Documents => match name {
				n::DOCUMENT => Self::Document,
				_ => Self::Unknown,
			},
			Self::Definitions => match name {
				n::OBJECT_TYPE => Self::ObjectType,
				_ => Self::Unknown,
			},
			Self::ObjectType => match name {
				n::PROPERTY_TEMPLATE => Self::PropertyTemplate,
				_ => Self::Unknown,
			},
			Self::Objects => match name {
				n::MODEL => Self::Model,
				n::GEOMETRY => Self::Geometry,
				n::NODE_ATTRIBUTE => Self::NodeAttribute,
				n::MATERIAL => Self::Material,
				n::TEXTURE => Self::Texture,
				n::VIDEO => Self::Video,
				n::DEFORMER => Self::Deformer,
				n::POSE => Self::Pose,
				n::ANIMATION_STACK => Self::AnimationStack,
				n::ANIMATION_LAYER => Self::AnimationLayer,
				n::ANIMATION_CURVE_NODE => Self::AnimationCurveNode,
				n::ANIMATION_CURVE => Self::AnimationCurve,
				n::SELECTION_NODE => Self::SelectionNode,
				n::GLOBAL_SETTINGS => Self::GlobalSettings,
				_ => Self::GenericObject,
			},
			Self::Model | Self::Geometry => match name {
				n::LAYER_ELEMENT_NORMAL => Self::LayerElementNormal,
				n::LAYER_ELEMENT_BINORMAL => Self::LayerElementBinormal,
				n::LAYER_ELEMENT_TANGENT => Self::LayerElementTangent,
				n::LAYER_ELEMENT_UV => Self::LayerElementUv,
				n::LAYER_ELEMENT_COLOR => Self::LayerElementColor,
				n::LAYER_ELEMENT_VERTEX_CREASE => Self::LayerElementVertexCrease,
				n::LAYER_ELEMENT_EDGE_CREASE => Self::LayerElementEdgeCrease,
				n::LAYER_ELEMENT_SMOOTHING => Self::LayerElementSmoothing,
				n::LAYER_ELEMENT_MATERIAL => Self::LayerElementMaterial,
				n::LAYER_ELEMENT_POLYGON_GROUP => Self::LayerElementPolygonGroup,
				n::LAYER_ELEMENT_HOLE => Self::LayerElementHole,
				n::LAYER_ELEMENT_VISIBILITY => Self::LayerElementVisibility,
				n::LAYER_ELEMENT_TEXTURE => Self::LayerElementOther,
				n::LAYER => Self::Layer,
				n::SHAPE => Self::Shape,
				n::PROPERTIES60 | n::PROPERTIES70 => Self::Properties,
				_ => Self::Unknown,
			},
			Self::Layer => match name {
				n::LAYER_ELEMENT => Self::LayerElementRef,
				_ => Self::Unknown,
			},
			Self::Pose => match name {
				n::POSE_NODE => Self::PoseNode,
				_ => Self::Unknown,
			},
			Self::Takes => match name {
				n::TAKE => Self::Take,
				_ => Self::Unknown,
			},
			Self::Take => match name {
				n::FILE_NAME | n::LOCAL_TIME | n::REFERENCE_TIME => Self::Unknown,
				_ => Self::TakeObject,
			},
			Self::TakeObject | Self::TakeChannel => match name {
				n::CHANNEL => Self::TakeChannel,
				_ => Self::Unknown,
			},
			Self::GlobalSettings
			| Self::SceneInfo
			| Self::Document
			| Self::PropertyTemplate
			| Self::NodeAttribute
			| Self::Material
			| Self::Texture
			| Self::Video
			| Self::Deformer
			| Self::AnimationStack
			| Self::AnimationLayer
			| Self::AnimationCurveNode
			| Self::AnimationCurve
			| Self::SelectionNode
			| Self::GenericObject => match name {
				n::PROPERTIES60 | n::PROPERTIES70 => Self::Properties,
				_ => Self::Unknown,
			},
			_ => Self::Unknown,
		}
	}

	/// Array typing for a node named `name` under this state.
	pub fn array_request(self, name: Symbol) -> ArrayRequest {
		use ArrayKind::{Bool, F32, F64, I32, I64};
		let kind = match (self, name) {
			(Self::Model | Self::Geometry | Self::Shape, n::VERTICES | n::NORMALS) => F64,
			(Self::Model | Self::Geometry | Self::Shape, n::POLYGON_VERTEX_INDEX | n::EDGES | n::INDEXES) => I32,
			(Self::Model | Self::Geometry, n::POINTS | n::KNOT_VECTOR | n::KNOT_VECTOR_U | n::KNOT_VECTOR_V) => F64,
			(Self::Model | Self::Geometry, n::POINTS_INDEX) => I32,
			(Self::Deformer, n::INDEXES) => I32,
			(Self::Deformer, n::WEIGHTS | n::TRANSFORM | n::TRANSFORM_LINK | n::TRANSFORM_ASSOCIATE_MODEL | n::FULL_WEIGHTS) => F64,
			(Self::Deformer, n::BLEND_WEIGHTS) => F64,
			(Self::PoseNode, n::MATRIX) => F64,
			(Self::AnimationCurve, n::KEY_TIME) => I64,
			(Self::AnimationCurve, n::KEY_VALUE_FLOAT | n::KEY_ATTR_DATA_FLOAT) => F32,
			(Self::AnimationCurve, n::KEY_ATTR_FLAGS | n::KEY_ATTR_REF_COUNT) => I32,
			(Self::TakeChannel, n::KEY) => F64,
			(Self::SelectionNode, n::VERTEX_INDEX_ARRAY | n::EDGE_INDEX_ARRAY | n::POLYGON_INDEX_ARRAY) => I32,
			(Self::LayerElementNormal, n::NORMALS | n::NORMALS_W) => F64,
			(Self::LayerElementNormal, n::NORMALS_INDEX) => I32,
			(Self::LayerElementBinormal, n::BINORMALS | n::BINORMALS_W) => F64,
			(Self::LayerElementBinormal, n::BINORMALS_INDEX) => I32,
			(Self::LayerElementTangent, n::TANGENTS | n::TANGENTS_W) => F64,
			(Self::LayerElementTangent, n::TANGENTS_INDEX) => I32,
			(Self::LayerElementUv, n::UV) => F64,
			(Self::LayerElementUv, n::UV_INDEX) => I32,
			(Self::LayerElementColor, n::COLORS) => F64,
			(Self::LayerElementColor, n::COLOR_INDEX) => I32,
			(Self::LayerElementVertexCrease, n::VERTEX_CREASE) => F64,
			(Self::LayerElementEdgeCrease, n::EDGE_CREASE) => F64,
			(Self::LayerElementSmoothing, n::SMOOTHING) => I32,
			(Self::LayerElementMaterial, n::MATERIALS) => I32,
			(Self::LayerElementPolygonGroup, n::POLYGON_GROUP) => I32,
			(Self::LayerElementHole, n::HOLE) => Bool,
			(Self::LayerElementVisibility, n::VISIBILITY) => Bool,
			_ => return ArrayRequest::Keep,
		};
		ArrayRequest::As(kind)
	}

	/// True when the ASCII reader should collect all values of `name` into an array.
	pub fn is_array_node(self, name: Symbol) -> bool {
		self.array_request(name) != ArrayRequest::Keep
	}

	/// True for states whose arrays are geometry payload.
	pub fn is_geometry(self) -> bool {
		matches!(
			self,
			Self::Model
				| Self::Geometry
				| Self::Shape
				| Self::LayerElementNormal
				| Self::LayerElementBinormal
				| Self::LayerElementTangent
				| Self::LayerElementUv
				| Self::LayerElementColor
				| Self::LayerElementVertexCrease
				| Self::LayerElementEdgeCrease
				| Self::LayerElementSmoothing
				| Self::LayerElementMaterial
				| Self::LayerElementPolygonGroup
				| Self::LayerElementHole
				| Self::LayerElementVisibility
				| Self::LayerElementOther
		)
	}

	/// True for states whose arrays are keyframe payload.
	pub fn is_animation(self) -> bool {
		matches!(self, Self::AnimationCurve | Self::TakeObject | Self::TakeChannel)
	}

	/// True when string values named `name` must be kept as raw bytes.
	pub fn is_raw_string(self, name: Symbol) -> bool {
		matches!((self, name), (Self::Video | Self::Texture, n::CONTENT))
	}

	/// True when the node carries embedded file content.
	pub fn is_embedded(self, name: Symbol) -> bool {
		matches!((self, name), (Self::Video | Self::Texture, n::CONTENT))
	}
}

#[cfg(test)]
mod tests {
	use crate::fbx::names as n;
	use crate::fbx::{ArrayKind, ArrayRequest, ParseState};

	#[test]
	fn materials_mean_different_things_per_parent() {
		let model = ParseState::Root.child(n::OBJECTS).child(n::MODEL);
		assert_eq!(model, ParseState::Model);
		assert_eq!(model.array_request(n::MATERIALS), ArrayRequest::Keep);

		let layer = model.child(n::LAYER_ELEMENT_MATERIAL);
		assert_eq!(layer.array_request(n::MATERIALS), ArrayRequest::As(ArrayKind::I32));
	}

	#[test]
	fn geometry_arrays_are_typed() {
		let geometry = ParseState::Objects.child(n::GEOMETRY);
		assert_eq!(geometry.array_request(n::VERTICES), ArrayRequest::As(ArrayKind::F64));
		assert_eq!(geometry.array_request(n::POLYGON_VERTEX_INDEX), ArrayRequest::As(ArrayKind::I32));
		assert!(geometry.child(n::LAYER_ELEMENT_UV).is_geometry());
		assert_eq!(ParseState::Objects.child(n::ANIMATION_CURVE).array_request(n::KEY_TIME), ArrayRequest::As(ArrayKind::I64));
	}

	#[test]
	fn unknown_subtrees_stay_unknown() {
		let state = ParseState::Root.child(n::OBJECTS).child(n::CONNECTIONS);
		assert_eq!(state, ParseState::GenericObject);
		assert_eq!(state.child(n::VERTICES), ParseState::Unknown);
		assert_eq!(ParseState::Unknown.child(n::OBJECTS), ParseState::Unknown);
	}
}
