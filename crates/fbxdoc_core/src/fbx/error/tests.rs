use crate::fbx::{ERROR_STACK_MAX_DEPTH, ErrorKind, FbxError, InflateError, Result, ResultExt, format_error};

fn fails() -> Result<()> {
	Err(FbxError::TruncatedFile { at: 12, need: 4 })
}

#[test]
fn context_frames_are_reported_deepest_first() {
	let err = fails().context("read node header").context("parse objects").expect_err("must fail");

	assert_eq!(err.kind(), ErrorKind::TruncatedFile);
	assert_eq!(err.description(), "truncated file at offset 12, need 4 bytes");

	let stack = err.stack();
	assert_eq!(stack.len(), 2);
	assert_eq!(stack[0].description, "read node header");
	assert_eq!(stack[1].description, "parse objects");
	assert!(stack[0].file.ends_with("tests.rs"));
}

#[test]
fn stack_depth_is_bounded() {
	let mut result = fails();
	for level in 0..(ERROR_STACK_MAX_DEPTH + 8) {
		result = result.with_context(|| format!("level {level}"));
	}
	let err = result.expect_err("must fail");
	assert_eq!(err.stack().len(), ERROR_STACK_MAX_DEPTH);
	assert_eq!(err.stack()[0].description, "level 0");
}

#[test]
fn inflate_errors_map_onto_kinds() {
	assert_eq!(FbxError::from(InflateError::Cancelled).kind(), ErrorKind::Cancelled);
	assert_eq!(FbxError::from(InflateError::Truncated).kind(), ErrorKind::TruncatedFile);
	assert_eq!(FbxError::from(InflateError::BadHeader).kind(), ErrorKind::Unknown);
}

#[test]
fn format_error_lists_frames() {
	let err = fails().context("parse binary").expect_err("must fail");
	let text = format_error(&err);
	assert!(text.starts_with("truncated file"));
	assert!(text.contains("(truncated_file)"));
	assert!(text.contains("parse binary"));
}
