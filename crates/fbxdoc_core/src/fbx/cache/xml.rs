use std::path::Path;
use std::sync::Arc;

use crate::fbx::Result;

use super::{CacheFrame, GeometryCacheOpts, MAYA_TICKS_PER_SECOND, bad_cache, mc, read_file};

/// Channel declared by a cache manifest.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ManifestChannel {
	pub name: Arc<str>,
	pub interpretation: Arc<str>,
}

/// Parsed `Autodesk_Cache_File` manifest.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Manifest {
	pub one_file_per_frame: bool,
	pub extension: &'static str,
	pub channels: Vec<ManifestChannel>,
}

/// Start tag with its attributes.
#[derive(Debug)]
struct Tag<'a> {
	name: &'a str,
	attrs: Vec<(&'a str, String)>,
}

impl Tag<'_> {
	fn attr(&self, key: &str) -> Option<&str> {
		self.attrs.iter().find(|(name, _)| *name == key).map(|(_, value)| value.as_str())
	}
}

pub(super) fn looks_like_xml(bytes: &[u8]) -> bool {
	let bytes = bytes.strip_prefix(b"\xef\xbb\xbf".as_slice()).unwrap_or(bytes);
	bytes.iter().find(|byte| !byte.is_ascii_whitespace()) == Some(&b'<')
}

fn unescape(value: &str) -> String {
	if !value.contains('&') {
		return value.to_owned();
	}
	value
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&apos;", "'")
		.replace("&amp;", "&")
}

/// Start and empty-element tags in document order.
///
/// Declarations, comments, end tags and text are skipped; this covers the
/// flat attribute-only layout cache manifests use.
fn scan_tags(text: &str) -> Result<Vec<Tag<'_>>> {
	let mut tags = Vec::new();
	let mut rest = text;
	while let Some(start) = rest.find('<') {
		rest = &rest[start + 1..];
		if let Some(comment) = rest.strip_prefix("!--") {
			let end = comment.find("-->").ok_or_else(|| bad_cache("unterminated XML comment"))?;
			rest = &comment[end + 3..];
			continue;
		}
		let end = rest.find('>').ok_or_else(|| bad_cache("unterminated XML tag"))?;
		let body = &rest[..end];
		rest = &rest[end + 1..];
		if body.starts_with(['?', '!', '/']) {
			continue;
		}
		let body = body.strip_suffix('/').unwrap_or(body);
		let name_end = body.find(|ch: char| ch.is_whitespace()).unwrap_or(body.len());
		let mut attrs = Vec::new();
		let mut attr_text = body[name_end..].trim_start();
		while !attr_text.is_empty() {
			let eq = attr_text.find('=').ok_or_else(|| bad_cache(format!("attribute without value in <{body}>")))?;
			let key = attr_text[..eq].trim();
			let value_text = attr_text[eq + 1..].trim_start();
			let quote = value_text
				.chars()
				.next()
				.filter(|ch| *ch == '"' || *ch == '\'')
				.ok_or_else(|| bad_cache(format!("unquoted attribute {key}")))?;
			let value_end = value_text[1..]
				.find(quote)
				.ok_or_else(|| bad_cache(format!("unterminated attribute {key}")))?;
			attrs.push((key, unescape(&value_text[1..1 + value_end])));
			attr_text = value_text[value_end + 2..].trim_start();
		}
		tags.push(Tag {
			name: &body[..name_end],
			attrs,
		});
	}
	Ok(tags)
}

pub(super) fn parse_manifest(text: &str) -> Result<Manifest> {
	let tags = scan_tags(text)?;
	if !tags.iter().any(|tag| tag.name == "Autodesk_Cache_File") {
		return Err(bad_cache("XML is not an Autodesk cache manifest"));
	}
	let cache_type = tags.iter().find(|tag| tag.name == "cacheType");
	let one_file_per_frame = cache_type.and_then(|tag| tag.attr("Type")) == Some("OneFilePerFrame");
	let extension = match cache_type.and_then(|tag| tag.attr("Format")) {
		Some("mcx") => "mcx",
		_ => "mc",
	};
	let channels = tags
		.iter()
		.filter_map(|tag| {
			let name = tag.attr("ChannelName")?;
			Some(ManifestChannel {
				name: Arc::from(name),
				interpretation: Arc::from(tag.attr("ChannelInterpretation").unwrap_or("")),
			})
		})
		.collect();
	Ok(Manifest {
		one_file_per_frame,
		extension,
		channels,
	})
}

/// Time of a per-frame file named `<stem>Frame<N>[Tick<M>].<ext>`.
pub(super) fn per_frame_time(file_name: &str, stem: &str, extension: &str, fps: f64) -> Option<f64> {
	let middle = file_name
		.strip_prefix(stem)?
		.strip_prefix("Frame")?
		.strip_suffix(extension)?
		.strip_suffix('.')?;
	let (frame, tick) = match middle.split_once("Tick") {
		Some((frame, tick)) => (frame, tick.parse::<i64>().ok()?),
		None => (middle, 0),
	};
	let frame: i64 = frame.parse().ok()?;
	Some(frame as f64 / fps + tick as f64 / MAYA_TICKS_PER_SECOND)
}

/// Index the cache files a manifest refers to, beside the manifest itself.
pub(super) fn read_frames(
	path: &Path,
	manifest: &Manifest,
	opts: &GeometryCacheOpts,
	frames: &mut Vec<CacheFrame>,
) -> Result<()> {
	let dir = path.parent().unwrap_or_else(|| Path::new(""));
	let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();

	if !manifest.one_file_per_frame {
		let file = dir.join(format!("{stem}.{}", manifest.extension));
		let bytes = read_file(&file)?;
		return mc::read_frames(&bytes, &Arc::from(file.display().to_string()), None, opts, frames);
	}

	let fps = if opts.frames_per_second > 0.0 { opts.frames_per_second } else { 30.0 };
	let mut files: Vec<(f64, std::path::PathBuf)> = Vec::new();
	for entry in std::fs::read_dir(if dir.as_os_str().is_empty() { Path::new(".") } else { dir })? {
		let entry = entry?;
		let name = entry.file_name();
		if let Some(time) = per_frame_time(&name.to_string_lossy(), &stem, manifest.extension, fps) {
			files.push((time, entry.path()));
		}
	}
	files.sort_by(|a, b| a.0.total_cmp(&b.0));
	if files.is_empty() {
		log::warn!("cache manifest {} has no per-frame files", path.display());
	}
	for (time, file) in files {
		let bytes = read_file(&file)?;
		mc::read_frames(&bytes, &Arc::from(file.display().to_string()), Some(time), opts, frames)?;
	}
	Ok(())
}
