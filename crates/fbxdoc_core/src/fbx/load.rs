use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::fbx::builder::SceneBuilder;
use crate::fbx::finalize::finalize;
use crate::fbx::math::{CoordinateAxes, Transform};
use crate::fbx::{
	Allocator, AllocatorOpts, Compression, DEFAULT_PROGRESS_INTERVAL, DEFAULT_READ_BUFFER_SIZE, FbxError, InputStream,
	ParseOpts, Parser, ProgressCallback, Result, ResultExt, Scene, StringPool, UnicodeErrorHandling, decode_bytes,
	decode_reader,
};

/// What to do with an index outside its target buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexErrorHandling {
	/// Clamp to the last valid index.
	#[default]
	Clamp,
	/// Replace with `u32::MAX`, read back as the default value.
	NoIndex,
	/// Fail the load with `BadIndex`.
	AbortLoading,
	/// Keep the raw index; requires `allow_unsafe`.
	UnsafeIgnore,
}

/// Options for [`load_memory`], [`load_file`] and [`load_stream`].
#[derive(Debug, Clone)]
pub struct LoadOpts {
	/// Limits for parse-time allocations.
	pub temp_allocator: AllocatorOpts,
	/// Limits for allocations owned by the scene.
	pub result_allocator: AllocatorOpts,
	/// Skip vertex and index arrays.
	pub ignore_geometry: bool,
	/// Skip keyframe arrays.
	pub ignore_animation: bool,
	/// Skip embedded file content.
	pub ignore_embedded: bool,
	/// Compute skinned vertex positions at load time.
	pub evaluate_skinning: bool,
	/// Apply geometry caches when evaluating skinning.
	pub evaluate_caches: bool,
	/// Read geometry cache files referenced by the scene.
	pub load_external_files: bool,
	/// Do not build per-vertex skin weight lists.
	pub skip_skin_vertices: bool,
	/// Do not apply exporter-specific fixes.
	pub disable_quirks: bool,
	/// Turn tolerated irregularities into errors.
	pub strict: bool,
	/// Permit the `UnsafeIgnore` policies.
	pub allow_unsafe: bool,
	/// Policy for out-of-range indices.
	pub index_error_handling: IndexErrorHandling,
	/// Keep skin clusters without a bone node.
	pub connect_broken_elements: bool,
	/// Leave nodes without a parent connection detached from the root.
	pub allow_nodes_out_of_root: bool,
	/// Keep material slots that have no material connected.
	pub allow_null_material: bool,
	/// Compute normals for meshes that have none.
	pub generate_missing_normals: bool,
	/// Refill chunk size for reader-backed input.
	pub read_buffer_size: usize,
	/// Progress callback.
	pub progress_cb: Option<ProgressCallback>,
	/// Bytes between progress callbacks.
	pub progress_interval_hint: u64,
	/// Convert the scene to these axes.
	pub target_axes: Option<CoordinateAxes>,
	/// Convert the scene to this many meters per unit.
	pub target_unit_meters: Option<f64>,
	/// Do not scale unit-dependent properties during conversion.
	pub no_prop_unit_scaling: bool,
	/// Do not scale animation curves during conversion.
	pub no_anim_curve_unit_scaling: bool,
	/// Apply `root_transform` to the root node.
	pub use_root_transform: bool,
	/// Extra transform of the root node.
	pub root_transform: Transform,
	/// Policy for invalid UTF-8.
	pub unicode_error_handling: UnicodeErrorHandling,
	/// Keep the document tree in `Scene::dom_root`.
	pub retain_dom: bool,
	/// Path used to resolve relative file references.
	pub filename: Option<String>,
}

impl Default for LoadOpts {
	fn default() -> Self {
		Self {
			temp_allocator: AllocatorOpts::default(),
			result_allocator: AllocatorOpts::default(),
			ignore_geometry: false,
			ignore_animation: false,
			ignore_embedded: false,
			evaluate_skinning: false,
			evaluate_caches: false,
			load_external_files: false,
			skip_skin_vertices: false,
			disable_quirks: false,
			strict: false,
			allow_unsafe: false,
			index_error_handling: IndexErrorHandling::Clamp,
			connect_broken_elements: false,
			allow_nodes_out_of_root: false,
			allow_null_material: false,
			generate_missing_normals: false,
			read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
			progress_cb: None,
			progress_interval_hint: DEFAULT_PROGRESS_INTERVAL,
			target_axes: None,
			target_unit_meters: None,
			no_prop_unit_scaling: false,
			no_anim_curve_unit_scaling: false,
			use_root_transform: false,
			root_transform: Transform::IDENTITY,
			unicode_error_handling: UnicodeErrorHandling::ReplacementCharacter,
			retain_dom: false,
			filename: None,
		}
	}
}

impl LoadOpts {
	/// Reject option combinations the loader cannot honor.
	pub fn validate(&self) -> Result<()> {
		if self.index_error_handling == IndexErrorHandling::UnsafeIgnore && !self.allow_unsafe {
			return Err(FbxError::UnsafeOptions {
				what: "index_error_handling",
			});
		}
		if self.unicode_error_handling.is_unsafe() && !self.allow_unsafe {
			return Err(FbxError::UnsafeOptions {
				what: "unicode_error_handling",
			});
		}
		if self.read_buffer_size == 0 {
			return Err(FbxError::UninitializedOptions { what: "read_buffer_size" });
		}
		if self.target_axes.is_some_and(|axes| !axes.is_valid()) {
			return Err(FbxError::UninitializedOptions { what: "target_axes" });
		}
		if self.target_unit_meters.is_some_and(|unit| !(unit > 0.0)) {
			return Err(FbxError::UninitializedOptions {
				what: "target_unit_meters",
			});
		}
		Ok(())
	}

	fn parse_opts(&self) -> ParseOpts {
		ParseOpts {
			ignore_geometry: self.ignore_geometry,
			ignore_animation: self.ignore_animation,
			ignore_embedded: self.ignore_embedded,
			strict: self.strict,
		}
	}
}

/// Load a scene from bytes in memory.
pub fn load_memory(data: &[u8], opts: &LoadOpts) -> Result<Arc<Scene>> {
	opts.validate()?;
	let (compression, decoded) = decode_bytes(data, opts.temp_allocator.memory_limit)?;
	let bytes = decoded.as_deref().unwrap_or(data);
	let stream = InputStream::from_memory(bytes).with_progress(
		opts.progress_cb.clone(),
		opts.progress_interval_hint,
		bytes.len() as u64,
	);
	load_inner(stream, compression, opts)
}

/// Load a scene from a file, remembering its path for relative references.
pub fn load_file(path: impl AsRef<Path>, opts: &LoadOpts) -> Result<Arc<Scene>> {
	opts.validate()?;
	let path = path.as_ref();
	let file = File::open(path).map_err(|err| match err.kind() {
		std::io::ErrorKind::NotFound => FbxError::FileNotFound {
			path: path.display().to_string(),
		},
		_ => FbxError::Io(err),
	})?;
	let len = file.metadata().map(|meta| meta.len()).unwrap_or(0);
	let (compression, reader) = decode_reader(Box::new(file))?;
	let total = if compression == Compression::None { len } else { 0 };
	let stream = InputStream::from_reader(reader, opts.read_buffer_size).with_progress(
		opts.progress_cb.clone(),
		opts.progress_interval_hint,
		total,
	);

	let mut opts = opts.clone();
	if opts.filename.is_none() {
		opts.filename = Some(path.display().to_string());
	}
	load_inner(stream, compression, &opts).with_context(|| format!("load {}", path.display()))
}

/// Load a scene from a reader.
pub fn load_stream<'a>(reader: Box<dyn Read + 'a>, opts: &LoadOpts) -> Result<Arc<Scene>> {
	opts.validate()?;
	let (compression, reader) = decode_reader(reader)?;
	let stream = InputStream::from_reader(reader, opts.read_buffer_size).with_progress(
		opts.progress_cb.clone(),
		opts.progress_interval_hint,
		0,
	);
	load_inner(stream, compression, opts)
}

fn load_inner(stream: InputStream<'_>, compression: Compression, opts: &LoadOpts) -> Result<Arc<Scene>> {
	let temp = Allocator::new(opts.temp_allocator);
	let result = Allocator::new(opts.result_allocator);
	let pool = StringPool::new(&result, opts.unicode_error_handling)
		.with_raw_retention(opts.unicode_error_handling.is_unsafe());

	let parser = Parser::new(stream, pool, &temp, opts.parse_opts())?;
	let mut scene = SceneBuilder::new(parser, opts).build().context("build scene")?;
	scene.metadata.compression = Some(compression);
	finalize(&mut scene, opts).context("finalize scene")?;

	let temp_stats = temp.stats();
	let result_stats = result.stats();
	scene.metadata.temp_memory_used = temp_stats.peak_bytes;
	scene.metadata.temp_allocs = temp_stats.allocations;
	scene.metadata.result_memory_used = result_stats.bytes;
	scene.metadata.result_allocs = result_stats.allocations;
	log::debug!(
		"loaded {} elements, {} connections",
		scene.elements.len(),
		scene.connections_src.len()
	);
	Ok(Arc::new(scene))
}
