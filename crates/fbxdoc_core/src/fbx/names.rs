//! Canonical node and token names, pre-interned by every [`StringPool`](crate::fbx::StringPool).

use crate::fbx::Symbol;

/// Byte-sorted table of canonical names; symbol `i` is `KNOWN_NAMES[i]`.
pub const KNOWN_NAMES: &[&str] = &[
	"AllSame",
	"Alphas",
	"AnimationCurve",
	"AnimationCurveNode",
	"AnimationLayer",
	"AnimationStack",
	"Author",
	"BindPose",
	"BindingTable",
	"Binormals",
	"BinormalsIndex",
	"BinormalsW",
	"Blend",
	"BlendModes",
	"BlendShape",
	"BlendShapeChannel",
	"BlendWeights",
	"Boundary",
	"BoundaryRule",
	"ByEdge",
	"ByPolygon",
	"ByPolygonVertex",
	"ByVertex",
	"ByVertice",
	"C",
	"Cache",
	"Camera",
	"CameraStereo",
	"CameraSwitcher",
	"Channel",
	"Character",
	"Closed",
	"Cluster",
	"Collection",
	"CollectionExclusive",
	"Color",
	"ColorIndex",
	"Colors",
	"Comment",
	"Connect",
	"Connections",
	"Constraint",
	"Content",
	"Count",
	"CreationTime",
	"CreationTimeStamp",
	"Creator",
	"Current",
	"Default",
	"Definitions",
	"DeformPercent",
	"Deformer",
	"Dimension",
	"Dimensions",
	"Direct",
	"DisplayLayer",
	"DisplaySubdivisions",
	"Document",
	"Documents",
	"EdgeCrease",
	"EdgeIndexArray",
	"Edges",
	"Entry",
	"FBXHeaderExtension",
	"FBXHeaderVersion",
	"FBXVersion",
	"FileName",
	"Filename",
	"FlipNormals",
	"Form",
	"FormU",
	"FormV",
	"FullWeights",
	"Geometry",
	"GeometryVersion",
	"GlobalSettings",
	"Hole",
	"Implementation",
	"Index",
	"IndexToDirect",
	"Indexes",
	"IsTheNodeInSet",
	"Key",
	"KeyAttrDataFloat",
	"KeyAttrFlags",
	"KeyAttrRefCount",
	"KeyCount",
	"KeyTime",
	"KeyValue",
	"KeyValueFloat",
	"KeyVer",
	"Keywords",
	"KnotVector",
	"KnotVectorU",
	"KnotVectorV",
	"LastSaved",
	"Layer",
	"LayerElement",
	"LayerElementBinormal",
	"LayerElementColor",
	"LayerElementEdgeCrease",
	"LayerElementHole",
	"LayerElementMaterial",
	"LayerElementNormal",
	"LayerElementOther",
	"LayerElementPolygonGroup",
	"LayerElementSmoothing",
	"LayerElementTangent",
	"LayerElementTexture",
	"LayerElementUV",
	"LayerElementVertexCrease",
	"LayerElementVisibility",
	"LayeredTexture",
	"Light",
	"Limb",
	"LimbNode",
	"Line",
	"LocalTime",
	"LodGroup",
	"MappingInformationType",
	"Marker",
	"Material",
	"Materials",
	"Matrix",
	"Media",
	"Mesh",
	"MetaData",
	"Mode",
	"Model",
	"MultiLayer",
	"Name",
	"Node",
	"NodeAttribute",
	"Nodes",
	"Normals",
	"NormalsIndex",
	"NormalsW",
	"Null",
	"Nurb",
	"NurbsCurve",
	"NurbsCurveOrder",
	"NurbsSurface",
	"NurbsSurfaceOrder",
	"OO",
	"OP",
	"ObjectMetaData",
	"ObjectType",
	"Objects",
	"Open",
	"Order",
	"Original",
	"P",
	"PO",
	"PP",
	"Periodic",
	"Points",
	"PointsIndex",
	"PolygonGroup",
	"PolygonIndexArray",
	"PolygonVertexIndex",
	"Pose",
	"PoseNode",
	"PreviewDivisionLevels",
	"Properties60",
	"Properties70",
	"Property",
	"PropertyTemplate",
	"Rational",
	"ReferenceInformationType",
	"ReferenceTime",
	"References",
	"RelativeFilename",
	"RenderDivisionLevels",
	"Revision",
	"Root",
	"RootNode",
	"SceneInfo",
	"SelectionNode",
	"SelectionSet",
	"ShadingModel",
	"Shape",
	"Skeleton",
	"Skin",
	"SkinningType",
	"Smoothing",
	"Smoothness",
	"Step",
	"SubDeformer",
	"Subject",
	"Take",
	"Takes",
	"Tangents",
	"TangentsIndex",
	"TangentsW",
	"Texture",
	"TextureName",
	"Title",
	"Transform",
	"TransformAssociateModel",
	"TransformLink",
	"TrimNurbsSurface",
	"Type",
	"TypeFlags",
	"TypedIndex",
	"UV",
	"UVIndex",
	"UserData",
	"Version",
	"Version5",
	"Vertex",
	"VertexCacheDeformer",
	"VertexCrease",
	"VertexIndexArray",
	"Vertices",
	"Video",
	"Visibility",
	"Weights",
];

const fn str_eq(a: &str, b: &str) -> bool {
	let (a, b) = (a.as_bytes(), b.as_bytes());
	if a.len() != b.len() {
		return false;
	}
	let mut i = 0;
	while i < a.len() {
		if a[i] != b[i] {
			return false;
		}
		i += 1;
	}
	true
}

const fn known(name: &str) -> Symbol {
	let mut i = 0;
	while i < KNOWN_NAMES.len() {
		if str_eq(KNOWN_NAMES[i], name) {
			return Symbol(i as u32);
		}
		i += 1;
	}
	panic!("name missing from KNOWN_NAMES");
}

/// `AllSame`
pub const ALL_SAME: Symbol = known("AllSame");
/// `Alphas`
pub const ALPHAS: Symbol = known("Alphas");
/// `AnimationCurve`
pub const ANIMATION_CURVE: Symbol = known("AnimationCurve");
/// `AnimationCurveNode`
pub const ANIMATION_CURVE_NODE: Symbol = known("AnimationCurveNode");
/// `AnimationLayer`
pub const ANIMATION_LAYER: Symbol = known("AnimationLayer");
/// `AnimationStack`
pub const ANIMATION_STACK: Symbol = known("AnimationStack");
/// `Author`
pub const AUTHOR: Symbol = known("Author");
/// `BindPose`
pub const BIND_POSE: Symbol = known("BindPose");
/// `BindingTable`
pub const BINDING_TABLE: Symbol = known("BindingTable");
/// `Binormals`
pub const BINORMALS: Symbol = known("Binormals");
/// `BinormalsIndex`
pub const BINORMALS_INDEX: Symbol = known("BinormalsIndex");
/// `BinormalsW`
pub const BINORMALS_W: Symbol = known("BinormalsW");
/// `Blend`
pub const BLEND: Symbol = known("Blend");
/// `BlendModes`
pub const BLEND_MODES: Symbol = known("BlendModes");
/// `BlendShape`
pub const BLEND_SHAPE: Symbol = known("BlendShape");
/// `BlendShapeChannel`
pub const BLEND_SHAPE_CHANNEL: Symbol = known("BlendShapeChannel");
/// `BlendWeights`
pub const BLEND_WEIGHTS: Symbol = known("BlendWeights");
/// `Boundary`
pub const BOUNDARY: Symbol = known("Boundary");
/// `BoundaryRule`
pub const BOUNDARY_RULE: Symbol = known("BoundaryRule");
/// `ByEdge`
pub const BY_EDGE: Symbol = known("ByEdge");
/// `ByPolygon`
pub const BY_POLYGON: Symbol = known("ByPolygon");
/// `ByPolygonVertex`
pub const BY_POLYGON_VERTEX: Symbol = known("ByPolygonVertex");
/// `ByVertex`
pub const BY_VERTEX: Symbol = known("ByVertex");
/// `ByVertice`
pub const BY_VERTICE: Symbol = known("ByVertice");
/// `C`
pub const C: Symbol = known("C");
/// `Cache`
pub const CACHE: Symbol = known("Cache");
/// `Camera`
pub const CAMERA: Symbol = known("Camera");
/// `CameraStereo`
pub const CAMERA_STEREO: Symbol = known("CameraStereo");
/// `CameraSwitcher`
pub const CAMERA_SWITCHER: Symbol = known("CameraSwitcher");
/// `Channel`
pub const CHANNEL: Symbol = known("Channel");
/// `Character`
pub const CHARACTER: Symbol = known("Character");
/// `Closed`
pub const CLOSED: Symbol = known("Closed");
/// `Cluster`
pub const CLUSTER: Symbol = known("Cluster");
/// `Collection`
pub const COLLECTION: Symbol = known("Collection");
/// `CollectionExclusive`
pub const COLLECTION_EXCLUSIVE: Symbol = known("CollectionExclusive");
/// `Color`
pub const COLOR: Symbol = known("Color");
/// `ColorIndex`
pub const COLOR_INDEX: Symbol = known("ColorIndex");
/// `Colors`
pub const COLORS: Symbol = known("Colors");
/// `Comment`
pub const COMMENT: Symbol = known("Comment");
/// `Connect`
pub const CONNECT: Symbol = known("Connect");
/// `Connections`
pub const CONNECTIONS: Symbol = known("Connections");
/// `Constraint`
pub const CONSTRAINT: Symbol = known("Constraint");
/// `Content`
pub const CONTENT: Symbol = known("Content");
/// `Count`
pub const COUNT: Symbol = known("Count");
/// `CreationTime`
pub const CREATION_TIME: Symbol = known("CreationTime");
/// `CreationTimeStamp`
pub const CREATION_TIME_STAMP: Symbol = known("CreationTimeStamp");
/// `Creator`
pub const CREATOR: Symbol = known("Creator");
/// `Current`
pub const CURRENT: Symbol = known("Current");
/// `Default`
pub const DEFAULT: Symbol = known("Default");
/// `Definitions`
pub const DEFINITIONS: Symbol = known("Definitions");
/// `DeformPercent`
pub const DEFORM_PERCENT: Symbol = known("DeformPercent");
/// `Deformer`
pub const DEFORMER: Symbol = known("Deformer");
/// `Dimension`
pub const DIMENSION: Symbol = known("Dimension");
/// `Dimensions`
pub const DIMENSIONS: Symbol = known("Dimensions");
/// `Direct`
pub const DIRECT: Symbol = known("Direct");
/// `DisplayLayer`
pub const DISPLAY_LAYER: Symbol = known("DisplayLayer");
/// `DisplaySubdivisions`
pub const DISPLAY_SUBDIVISIONS: Symbol = known("DisplaySubdivisions");
/// `Document`
pub const DOCUMENT: Symbol = known("Document");
/// `Documents`
pub const DOCUMENTS: Symbol = known("Documents");
/// `EdgeCrease`
pub const EDGE_CREASE: Symbol = known("EdgeCrease");
/// `EdgeIndexArray`
pub const EDGE_INDEX_ARRAY: Symbol = known("EdgeIndexArray");
/// `Edges`
pub const EDGES: Symbol = known("Edges");
/// `Entry`
pub const ENTRY: Symbol = known("Entry");
/// `FBXHeaderExtension`
pub const FBX_HEADER_EXTENSION: Symbol = known("FBXHeaderExtension");
/// `FBXHeaderVersion`
pub const FBX_HEADER_VERSION: Symbol = known("FBXHeaderVersion");
/// `FBXVersion`
pub const FBX_VERSION: Symbol = known("FBXVersion");
/// `FileName`
pub const FILE_NAME: Symbol = known("FileName");
/// `Filename`
pub const FILENAME: Symbol = known("Filename");
/// `FlipNormals`
pub const FLIP_NORMALS: Symbol = known("FlipNormals");
/// `Form`
pub const FORM: Symbol = known("Form");
/// `FormU`
pub const FORM_U: Symbol = known("FormU");
/// `FormV`
pub const FORM_V: Symbol = known("FormV");
/// `FullWeights`
pub const FULL_WEIGHTS: Symbol = known("FullWeights");
/// `Geometry`
pub const GEOMETRY: Symbol = known("Geometry");
/// `GeometryVersion`
pub const GEOMETRY_VERSION: Symbol = known("GeometryVersion");
/// `GlobalSettings`
pub const GLOBAL_SETTINGS: Symbol = known("GlobalSettings");
/// `Hole`
pub const HOLE: Symbol = known("Hole");
/// `Implementation`
pub const IMPLEMENTATION: Symbol = known("Implementation");
/// `Index`
pub const INDEX: Symbol = known("Index");
/// `IndexToDirect`
pub const INDEX_TO_DIRECT: Symbol = known("IndexToDirect");
/// `Indexes`
pub const INDEXES: Symbol = known("Indexes");
/// `IsTheNodeInSet`
pub const IS_THE_NODE_IN_SET: Symbol = known("IsTheNodeInSet");
/// `Key`
pub const KEY: Symbol = known("Key");
/// `KeyAttrDataFloat`
pub const KEY_ATTR_DATA_FLOAT: Symbol = known("KeyAttrDataFloat");
/// `KeyAttrFlags`
pub const KEY_ATTR_FLAGS: Symbol = known("KeyAttrFlags");
/// `KeyAttrRefCount`
pub const KEY_ATTR_REF_COUNT: Symbol = known("KeyAttrRefCount");
/// `KeyCount`
pub const KEY_COUNT: Symbol = known("KeyCount");
/// `KeyTime`
pub const KEY_TIME: Symbol = known("KeyTime");
/// `KeyValue`
pub const KEY_VALUE: Symbol = known("KeyValue");
/// `KeyValueFloat`
pub const KEY_VALUE_FLOAT: Symbol = known("KeyValueFloat");
/// `KeyVer`
pub const KEY_VER: Symbol = known("KeyVer");
/// `Keywords`
pub const KEYWORDS: Symbol = known("Keywords");
/// `KnotVector`
pub const KNOT_VECTOR: Symbol = known("KnotVector");
/// `KnotVectorU`
pub const KNOT_VECTOR_U: Symbol = known("KnotVectorU");
/// `KnotVectorV`
pub const KNOT_VECTOR_V: Symbol = known("KnotVectorV");
/// `LastSaved`
pub const LAST_SAVED: Symbol = known("LastSaved");
/// `Layer`
pub const LAYER: Symbol = known("Layer");
/// `LayerElement`
pub const LAYER_ELEMENT: Symbol = known("LayerElement");
/// `LayerElementBinormal`
pub const LAYER_ELEMENT_BINORMAL: Symbol = known("LayerElementBinormal");
/// `LayerElementColor`
pub const LAYER_ELEMENT_COLOR: Symbol = known("LayerElementColor");
/// `LayerElementEdgeCrease`
pub const LAYER_ELEMENT_EDGE_CREASE: Symbol = known("LayerElementEdgeCrease");
/// `LayerElementHole`
pub const LAYER_ELEMENT_HOLE: Symbol = known("LayerElementHole");
/// `LayerElementMaterial`
pub const LAYER_ELEMENT_MATERIAL: Symbol = known("LayerElementMaterial");
/// `LayerElementNormal`
pub const LAYER_ELEMENT_NORMAL: Symbol = known("LayerElementNormal");
/// `LayerElementOther`
pub const LAYER_ELEMENT_OTHER: Symbol = known("LayerElementOther");
/// `LayerElementPolygonGroup`
pub const LAYER_ELEMENT_POLYGON_GROUP: Symbol = known("LayerElementPolygonGroup");
/// `LayerElementSmoothing`
pub const LAYER_ELEMENT_SMOOTHING: Symbol = known("LayerElementSmoothing");
/// `LayerElementTangent`
pub const LAYER_ELEMENT_TANGENT: Symbol = known("LayerElementTangent");
/// `LayerElementTexture`
pub const LAYER_ELEMENT_TEXTURE: Symbol = known("LayerElementTexture");
/// `LayerElementUV`
pub const LAYER_ELEMENT_UV: Symbol = known("LayerElementUV");
/// `LayerElementVertexCrease`
pub const LAYER_ELEMENT_VERTEX_CREASE: Symbol = known("LayerElementVertexCrease");
/// `LayerElementVisibility`
pub const LAYER_ELEMENT_VISIBILITY: Symbol = known("LayerElementVisibility");
/// `LayeredTexture`
pub const LAYERED_TEXTURE: Symbol = known("LayeredTexture");
/// `Light`
pub const LIGHT: Symbol = known("Light");
/// `Limb`
pub const LIMB: Symbol = known("Limb");
/// `LimbNode`
pub const LIMB_NODE: Symbol = known("LimbNode");
/// `Line`
pub const LINE: Symbol = known("Line");
/// `LocalTime`
pub const LOCAL_TIME: Symbol = known("LocalTime");
/// `LodGroup`
pub const LOD_GROUP: Symbol = known("LodGroup");
/// `MappingInformationType`
pub const MAPPING_INFORMATION_TYPE: Symbol = known("MappingInformationType");
/// `Marker`
pub const MARKER: Symbol = known("Marker");
/// `Material`
pub const MATERIAL: Symbol = known("Material");
/// `Materials`
pub const MATERIALS: Symbol = known("Materials");
/// `Matrix`
pub const MATRIX: Symbol = known("Matrix");
/// `Media`
pub const MEDIA: Symbol = known("Media");
/// `Mesh`
pub const MESH: Symbol = known("Mesh");
/// `MetaData`
pub const META_DATA: Symbol = known("MetaData");
/// `Mode`
pub const MODE: Symbol = known("Mode");
/// `Model`
pub const MODEL: Symbol = known("Model");
/// `MultiLayer`
pub const MULTI_LAYER: Symbol = known("MultiLayer");
/// `Name`
pub const NAME: Symbol = known("Name");
/// `Node`
pub const NODE: Symbol = known("Node");
/// `NodeAttribute`
pub const NODE_ATTRIBUTE: Symbol = known("NodeAttribute");
/// `Nodes`
pub const NODES: Symbol = known("Nodes");
/// `Normals`
pub const NORMALS: Symbol = known("Normals");
/// `NormalsIndex`
pub const NORMALS_INDEX: Symbol = known("NormalsIndex");
/// `NormalsW`
pub const NORMALS_W: Symbol = known("NormalsW");
/// `Null`
pub const NULL: Symbol = known("Null");
/// `Nurb`
pub const NURB: Symbol = known("Nurb");
/// `NurbsCurve`
pub const NURBS_CURVE: Symbol = known("NurbsCurve");
/// `NurbsCurveOrder`
pub const NURBS_CURVE_ORDER: Symbol = known("NurbsCurveOrder");
/// `NurbsSurface`
pub const NURBS_SURFACE: Symbol = known("NurbsSurface");
/// `NurbsSurfaceOrder`
pub const NURBS_SURFACE_ORDER: Symbol = known("NurbsSurfaceOrder");
/// `OO`
pub const OO: Symbol = known("OO");
/// `OP`
pub const OP: Symbol = known("OP");
/// `ObjectMetaData`
pub const OBJECT_META_DATA: Symbol = known("ObjectMetaData");
/// `ObjectType`
pub const OBJECT_TYPE: Symbol = known("ObjectType");
/// `Objects`
pub const OBJECTS: Symbol = known("Objects");
/// `Open`
pub const OPEN: Symbol = known("Open");
/// `Order`
pub const ORDER: Symbol = known("Order");
/// `Original`
pub const ORIGINAL: Symbol = known("Original");
/// `P`
pub const P: Symbol = known("P");
/// `PO`
pub const PO: Symbol = known("PO");
/// `PP`
pub const PP: Symbol = known("PP");
/// `Periodic`
pub const PERIODIC: Symbol = known("Periodic");
/// `Points`
pub const POINTS: Symbol = known("Points");
/// `PointsIndex`
pub const POINTS_INDEX: Symbol = known("PointsIndex");
/// `PolygonGroup`
pub const POLYGON_GROUP: Symbol = known("PolygonGroup");
/// `PolygonIndexArray`
pub const POLYGON_INDEX_ARRAY: Symbol = known("PolygonIndexArray");
/// `PolygonVertexIndex`
pub const POLYGON_VERTEX_INDEX: Symbol = known("PolygonVertexIndex");
/// `Pose`
pub const POSE: Symbol = known("Pose");
/// `PoseNode`
pub const POSE_NODE: Symbol = known("PoseNode");
/// `PreviewDivisionLevels`
pub const PREVIEW_DIVISION_LEVELS: Symbol = known("PreviewDivisionLevels");
/// `Properties60`
pub const PROPERTIES60: Symbol = known("Properties60");
/// `Properties70`
pub const PROPERTIES70: Symbol = known("Properties70");
/// `Property`
pub const PROPERTY: Symbol = known("Property");
/// `PropertyTemplate`
pub const PROPERTY_TEMPLATE: Symbol = known("PropertyTemplate");
/// `Rational`
pub const RATIONAL: Symbol = known("Rational");
/// `ReferenceInformationType`
pub const REFERENCE_INFORMATION_TYPE: Symbol = known("ReferenceInformationType");
/// `ReferenceTime`
pub const REFERENCE_TIME: Symbol = known("ReferenceTime");
/// `References`
pub const REFERENCES: Symbol = known("References");
/// `RelativeFilename`
pub const RELATIVE_FILENAME: Symbol = known("RelativeFilename");
/// `RenderDivisionLevels`
pub const RENDER_DIVISION_LEVELS: Symbol = known("RenderDivisionLevels");
/// `Revision`
pub const REVISION: Symbol = known("Revision");
/// `Root`
pub const ROOT: Symbol = known("Root");
/// `RootNode`
pub const ROOT_NODE: Symbol = known("RootNode");
/// `SceneInfo`
pub const SCENE_INFO: Symbol = known("SceneInfo");
/// `SelectionNode`
pub const SELECTION_NODE: Symbol = known("SelectionNode");
/// `SelectionSet`
pub const SELECTION_SET: Symbol = known("SelectionSet");
/// `ShadingModel`
pub const SHADING_MODEL: Symbol = known("ShadingModel");
/// `Shape`
pub const SHAPE: Symbol = known("Shape");
/// `Skeleton`
pub const SKELETON: Symbol = known("Skeleton");
/// `Skin`
pub const SKIN: Symbol = known("Skin");
/// `SkinningType`
pub const SKINNING_TYPE: Symbol = known("SkinningType");
/// `Smoothing`
pub const SMOOTHING: Symbol = known("Smoothing");
/// `Smoothness`
pub const SMOOTHNESS: Symbol = known("Smoothness");
/// `Step`
pub const STEP: Symbol = known("Step");
/// `SubDeformer`
pub const SUB_DEFORMER: Symbol = known("SubDeformer");
/// `Subject`
pub const SUBJECT: Symbol = known("Subject");
/// `Take`
pub const TAKE: Symbol = known("Take");
/// `Takes`
pub const TAKES: Symbol = known("Takes");
/// `Tangents`
pub const TANGENTS: Symbol = known("Tangents");
/// `TangentsIndex`
pub const TANGENTS_INDEX: Symbol = known("TangentsIndex");
/// `TangentsW`
pub const TANGENTS_W: Symbol = known("TangentsW");
/// `Texture`
pub const TEXTURE: Symbol = known("Texture");
/// `TextureName`
pub const TEXTURE_NAME: Symbol = known("TextureName");
/// `Title`
pub const TITLE: Symbol = known("Title");
/// `Transform`
pub const TRANSFORM: Symbol = known("Transform");
/// `TransformAssociateModel`
pub const TRANSFORM_ASSOCIATE_MODEL: Symbol = known("TransformAssociateModel");
/// `TransformLink`
pub const TRANSFORM_LINK: Symbol = known("TransformLink");
/// `TrimNurbsSurface`
pub const TRIM_NURBS_SURFACE: Symbol = known("TrimNurbsSurface");
/// `Type`
pub const TYPE: Symbol = known("Type");
/// `TypeFlags`
pub const TYPE_FLAGS: Symbol = known("TypeFlags");
/// `TypedIndex`
pub const TYPED_INDEX: Symbol = known("TypedIndex");
/// `UV`
pub const UV: Symbol = known("UV");
/// `UVIndex`
pub const UV_INDEX: Symbol = known("UVIndex");
/// `UserData`
pub const USER_DATA: Symbol = known("UserData");
/// `Version`
pub const VERSION: Symbol = known("Version");
/// `Version5`
pub const VERSION5: Symbol = known("Version5");
/// `Vertex`
pub const VERTEX: Symbol = known("Vertex");
/// `VertexCacheDeformer`
pub const VERTEX_CACHE_DEFORMER: Symbol = known("VertexCacheDeformer");
/// `VertexCrease`
pub const VERTEX_CREASE: Symbol = known("VertexCrease");
/// `VertexIndexArray`
pub const VERTEX_INDEX_ARRAY: Symbol = known("VertexIndexArray");
/// `Vertices`
pub const VERTICES: Symbol = known("Vertices");
/// `Video`
pub const VIDEO: Symbol = known("Video");
/// `Visibility`
pub const VISIBILITY: Symbol = known("Visibility");
/// `Weights`
pub const WEIGHTS: Symbol = known("Weights");
