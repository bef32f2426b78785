use std::fmt::Write as _;
use std::panic::Location;

use thiserror::Error;

use crate::fbx::InflateError;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, FbxError>;

/// Maximum number of context frames retained on one error.
pub const ERROR_STACK_MAX_DEPTH: usize = 16;

/// Coarse error category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Anything not covered by a more specific category.
	Unknown,
	/// Input path does not exist.
	FileNotFound,
	/// Host allocation failed.
	OutOfMemory,
	/// Configured byte limit reached.
	MemoryLimit,
	/// Configured allocation-count limit reached.
	AllocationLimit,
	/// Input ended before a complete record was read.
	TruncatedFile,
	/// Reader or filesystem failure.
	Io,
	/// Progress callback requested cancellation.
	Cancelled,
	/// Input is not recognizable as FBX.
	NotFbx,
	/// Options were not set up before use.
	UninitializedOptions,
	/// Vertex stream with zero-sized elements.
	ZeroVertexSize,
	/// String data was not valid UTF-8.
	InvalidUtf8,
	/// Requested capability was compiled out.
	FeatureDisabled,
	/// NURBS basis or control data is inconsistent.
	BadNurbs,
	/// Index out of range under abort policy.
	BadIndex,
	/// Unsafe option used without opting in.
	UnsafeOptions,
}

impl ErrorKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::FileNotFound => "file_not_found",
			Self::OutOfMemory => "out_of_memory",
			Self::MemoryLimit => "memory_limit",
			Self::AllocationLimit => "allocation_limit",
			Self::TruncatedFile => "truncated_file",
			Self::Io => "io",
			Self::Cancelled => "cancelled",
			Self::NotFbx => "not_fbx",
			Self::UninitializedOptions => "uninitialized_options",
			Self::ZeroVertexSize => "zero_vertex_size",
			Self::InvalidUtf8 => "invalid_utf8",
			Self::FeatureDisabled => "feature_disabled",
			Self::BadNurbs => "bad_nurbs",
			Self::BadIndex => "bad_index",
			Self::UnsafeOptions => "unsafe_options",
		}
	}
}

/// Errors produced while loading, building, and evaluating FBX scenes.
#[derive(Debug, Error)]
pub enum FbxError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Input path does not exist.
	#[error("file not found: {path}")]
	FileNotFound {
		/// Requested path, lossily rendered.
		path: String,
	},
	/// Host allocation failed.
	#[error("out of memory")]
	OutOfMemory,
	/// Allocator byte budget exhausted.
	#[error("memory limit exceeded (limit={limit} bytes)")]
	MemoryLimit {
		/// Configured byte limit.
		limit: usize,
	},
	/// Allocator allocation-count budget exhausted.
	#[error("allocation limit exceeded (limit={limit})")]
	AllocationLimit {
		/// Configured allocation-count limit.
		limit: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("truncated file at offset {at}, need {need} bytes")]
	TruncatedFile {
		/// Absolute stream offset of the failed read.
		at: u64,
		/// Requested bytes.
		need: usize,
	},
	/// Progress callback asked to stop.
	#[error("cancelled")]
	Cancelled,
	/// Input does not look like binary or ASCII FBX.
	#[error("not an FBX file")]
	NotFbx,
	/// Options were not initialized before use.
	#[error("uninitialized options: {what}")]
	UninitializedOptions {
		/// Offending option group.
		what: &'static str,
	},
	/// Vertex stream declared zero-sized elements.
	#[error("zero vertex size")]
	ZeroVertexSize,
	/// String bytes failed UTF-8 validation under the abort policy.
	#[error("invalid utf-8 at byte {at}")]
	InvalidUtf8 {
		/// Byte offset of the first invalid sequence within the string.
		at: usize,
	},
	/// Operation requires a compiled-out cargo feature.
	#[error("feature disabled: {feature}")]
	FeatureDisabled {
		/// Cargo feature name.
		feature: &'static str,
	},
	/// Inconsistent NURBS basis or control point data.
	#[error("bad nurbs: {reason}")]
	BadNurbs {
		/// Failed validation.
		reason: &'static str,
	},
	/// Index outside its target buffer under the abort policy.
	#[error("bad index {index} in {what} (len={len})")]
	BadIndex {
		/// Buffer being indexed.
		what: &'static str,
		/// Offending index value.
		index: i64,
		/// Length of the indexed buffer.
		len: usize,
	},
	/// Unsafe option combination without `allow_unsafe`.
	#[error("unsafe options: {what}")]
	UnsafeOptions {
		/// Option requiring opt-in.
		what: &'static str,
	},
	/// DEFLATE stream failed to decode.
	#[error("inflate: {0}")]
	Inflate(#[from] InflateError),
	/// zstd output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Binary node header is inconsistent.
	#[error("bad node record at offset {at}: {reason}")]
	BadNode {
		/// Stream offset of the record.
		at: u64,
		/// Failed check.
		reason: &'static str,
	},
	/// Nesting exceeded the hard depth cap.
	#[error("node depth exceeded (max={max_depth})")]
	NodeDepthExceeded {
		/// Depth ceiling.
		max_depth: u32,
	},
	/// Unknown binary value type code.
	#[error("bad value type {code:#04x} at offset {at}")]
	BadValueType {
		/// Type code byte.
		code: u8,
		/// Stream offset of the value.
		at: u64,
	},
	/// Array header or payload is inconsistent.
	#[error("bad array at offset {at}: {reason}")]
	BadArray {
		/// Stream offset of the array header.
		at: u64,
		/// Failed check.
		reason: &'static str,
	},
	/// ASCII tokenizer met unexpected input.
	#[error("bad ascii token at line {line}: {reason}")]
	BadAsciiToken {
		/// One-based source line.
		line: u32,
		/// Failed expectation.
		reason: &'static str,
	},
	/// Parent links form a loop.
	#[error("cycle in node hierarchy at element {element_id}")]
	NodeCycle {
		/// Element participating in the cycle.
		element_id: usize,
	},
	/// Object data violates a structural requirement.
	#[error("bad element {name}: {reason}")]
	BadElement {
		/// Element name.
		name: String,
		/// Failed check.
		reason: &'static str,
	},
	/// Geometry cache file is malformed.
	#[error("bad geometry cache: {reason}")]
	BadCache {
		/// Failed check.
		reason: String,
	},
	/// Error annotated with a loader frame.
	#[error("{description}")]
	Context {
		/// Frame description.
		description: String,
		/// Call site that recorded the frame.
		location: &'static Location<'static>,
		/// Wrapped error.
		#[source]
		source: Box<FbxError>,
	},
}

/// One entry of an error's frame stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFrame {
	/// Frame description.
	pub description: String,
	/// Source file that recorded the frame.
	pub file: &'static str,
	/// Source line that recorded the frame.
	pub line: u32,
}

impl FbxError {
	/// Map onto the coarse public taxonomy.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::FileNotFound { .. } => ErrorKind::FileNotFound,
			Self::OutOfMemory => ErrorKind::OutOfMemory,
			Self::MemoryLimit { .. } => ErrorKind::MemoryLimit,
			Self::AllocationLimit { .. } => ErrorKind::AllocationLimit,
			Self::TruncatedFile { .. } => ErrorKind::TruncatedFile,
			Self::Cancelled => ErrorKind::Cancelled,
			Self::NotFbx => ErrorKind::NotFbx,
			Self::UninitializedOptions { .. } => ErrorKind::UninitializedOptions,
			Self::ZeroVertexSize => ErrorKind::ZeroVertexSize,
			Self::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
			Self::FeatureDisabled { .. } => ErrorKind::FeatureDisabled,
			Self::BadNurbs { .. } => ErrorKind::BadNurbs,
			Self::BadIndex { .. } => ErrorKind::BadIndex,
			Self::UnsafeOptions { .. } => ErrorKind::UnsafeOptions,
			Self::Inflate(InflateError::Cancelled) => ErrorKind::Cancelled,
			Self::Inflate(InflateError::Truncated) => ErrorKind::TruncatedFile,
			Self::Context { source, .. } => source.kind(),
			_ => ErrorKind::Unknown,
		}
	}

	/// Innermost error beneath all context frames.
	pub fn root(&self) -> &FbxError {
		let mut err = self;
		while let Self::Context { source, .. } = err {
			err = source;
		}
		err
	}

	/// Human-readable description of the root cause.
	pub fn description(&self) -> String {
		self.root().to_string()
	}

	/// Context frames, deepest first.
	pub fn stack(&self) -> Vec<ErrorFrame> {
		let mut frames = Vec::new();
		let mut err = self;
		while let Self::Context {
			description,
			location,
			source,
		} = err
		{
			frames.push(ErrorFrame {
				description: description.clone(),
				file: location.file(),
				line: location.line(),
			});
			err = source;
		}
		frames.reverse();
		frames
	}

	fn depth(&self) -> usize {
		let mut depth = 0;
		let mut err = self;
		while let Self::Context { source, .. } = err {
			depth += 1;
			err = source;
		}
		depth
	}

	fn push_frame(self, description: String, location: &'static Location<'static>) -> Self {
		if self.depth() >= ERROR_STACK_MAX_DEPTH {
			return self;
		}
		Self::Context {
			description,
			location,
			source: Box::new(self),
		}
	}
}

/// Attach loader frames to fallible results.
pub trait ResultExt<T> {
	/// Record a frame with a fixed description.
	fn context(self, description: &str) -> Result<T>;
	/// Record a frame with a lazily built description.
	fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<FbxError>> ResultExt<T> for std::result::Result<T, E> {
	#[track_caller]
	fn context(self, description: &str) -> Result<T> {
		match self {
			Ok(value) => Ok(value),
			Err(err) => Err(err.into().push_frame(description.to_owned(), Location::caller())),
		}
	}

	#[track_caller]
	fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
		match self {
			Ok(value) => Ok(value),
			Err(err) => Err(err.into().push_frame(f(), Location::caller())),
		}
	}
}

/// Render the description and frame stack of `err` as text.
pub fn format_error(err: &FbxError) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{} ({})", err.description(), err.kind().as_str());
	for frame in err.stack() {
		let _ = writeln!(out, "  {}:{}: {}", frame.file, frame.line, frame.description);
	}
	out
}

#[cfg(test)]
mod tests;
