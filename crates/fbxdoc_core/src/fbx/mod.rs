mod arena;
mod buf;
mod builder;
mod bytes;
mod cache;
mod compression;
mod dom;
mod error;
mod evaluate;
mod finalize;
mod geometry;
mod header;
mod inflate;
mod load;
mod map;
/// Transform, rotation-order and axis helpers over `glam` doubles.
pub mod math;
/// Canonical node and property names interned ahead of parsing.
pub mod names;
mod parse;
mod scene;
mod stream;
mod string_pool;

/// Allocation accounting with memory and allocation limits.
pub use arena::{Allocator, AllocatorOpts, AllocatorStats};
/// Chunked stack buffer.
pub use buf::{Buf, BufMode};
/// Geometry cache files and sampling.
pub use cache::{
	CacheChannel, CacheDataEncoding, CacheDataFormat, CacheFrame, CacheInterpretation, GeometryCache,
	GeometryCacheDataOpts, GeometryCacheOpts, load_geometry_cache, read_geometry_cache_real, read_geometry_cache_vec3,
	sample_geometry_cache_real, sample_geometry_cache_vec3,
};
/// Outer compression detection.
pub use compression::{Compression, decode_bytes, decode_reader};
/// Retained document tree.
pub use dom::{DomNode, DomValue};
/// Error and result aliases.
pub use error::{ERROR_STACK_MAX_DEPTH, ErrorFrame, ErrorKind, FbxError, Result, ResultExt, format_error};
/// Animation evaluation entry points.
pub use evaluate::{
	EvaluateOpts, EvaluatedScene, evaluate_blend_weight, evaluate_curve, evaluate_prop, evaluate_props,
	evaluate_scene, evaluate_transform, prepare_prop_overrides,
};
/// Mesh topology, normals, index generation, triangulation, subdivision and NURBS.
pub use geometry::{
	CurvePoint, SubdivideOpts, SurfacePoint, TessellateCurveOpts, TessellateSurfaceOpts, TopoEdge, VertexStream,
	compute_normals, compute_topology, evaluate_nurbs_basis, evaluate_nurbs_curve, evaluate_nurbs_surface,
	generate_indices, generate_normal_mapping, subdivide_mesh, subdivide_mesh_with_skin, tessellate_nurbs_curve,
	tessellate_nurbs_surface, topo_next_vertex_edge, topo_prev_vertex_edge, triangulate_face, weighted_face_normal,
};
/// Binary header and container format detection.
pub use header::{BINARY_MAGIC, DEFAULT_ASCII_VERSION, Endianness, FbxHeader, FileFormat};
/// DEFLATE decoder.
pub use inflate::{InflateError, InflateInput, InflateRetain, adler32, inflate};
/// Scene loading entry points and options.
pub use load::{IndexErrorHandling, LoadOpts, load_file, load_memory, load_stream};
/// Robin-Hood hash map with overflow tree.
pub use map::{MAP_MAX_SCAN, Map, hash_u64};
/// Pull parser and parsed node types.
pub use parse::{
	ArrayKind, ArrayRequest, FbxArray, FbxNode, FbxValue, MAX_NODE_DEPTH, MAX_NON_ARRAY_VALUES, ParseOpts, ParseState,
	Parser,
};
/// Resolved scene data model.
pub use scene::*;
/// Buffered input with progress reporting.
pub use stream::{
	DEFAULT_PROGRESS_INTERVAL, DEFAULT_READ_BUFFER_SIZE, InputStream, Progress, ProgressCallback, ProgressResult,
};
/// String interning and UTF-8 sanitization.
pub use string_pool::{StringPool, Symbol, UnicodeErrorHandling, find_canonical, hash_str, sanitize_utf8};
