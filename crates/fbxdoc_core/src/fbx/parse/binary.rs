use std::sync::Arc;

use crate::fbx::parse::{OpenNode, Parser};
use crate::fbx::stream::BoundedRead;
use crate::fbx::{
	ArrayKind, ArrayRequest, Endianness, FbxArray, FbxError, FbxNode, FbxValue, InflateInput, MAX_NON_ARRAY_VALUES,
	ParseState, Result, inflate,
};

/// Upper bound of the DEFLATE expansion ratio, used to reject absurd counts.
const MAX_DEFLATE_RATIO: u64 = 1032;

struct RecordHeader {
	end: u64,
	num_values: u64,
	values_len: u64,
	name_len: u8,
}

impl Parser<'_> {
	fn endianness(&self) -> Endianness {
		self.header.map_or(Endianness::Little, |header| header.endianness)
	}

	fn wide_records(&self) -> bool {
		self.header.is_some_and(|header| header.wide_records())
	}

	fn read_record_header(&mut self) -> Result<Option<RecordHeader>> {
		let endianness = self.endianness();
		let size = if self.wide_records() { 25 } else { 13 };
		if !self.stream.fill(size)? {
			return Ok(None);
		}
		let header = if self.wide_records() {
			RecordHeader {
				end: self.stream.read_u64(endianness)?,
				num_values: self.stream.read_u64(endianness)?,
				values_len: self.stream.read_u64(endianness)?,
				name_len: self.stream.read_u8()?,
			}
		} else {
			RecordHeader {
				end: u64::from(self.stream.read_u32(endianness)?),
				num_values: u64::from(self.stream.read_u32(endianness)?),
				values_len: u64::from(self.stream.read_u32(endianness)?),
				name_len: self.stream.read_u8()?,
			}
		};
		Ok(Some(header))
	}

	pub(super) fn binary_node(
		&mut self,
		depth: u32,
		parent: ParseState,
		parent_end: Option<u64>,
		recursive: bool,
	) -> Result<Option<FbxNode>> {
		if parent_end.is_some_and(|end| self.position() >= end) {
			return Ok(None);
		}
		let at = self.position();
		let Some(record) = self.read_record_header()? else {
			if depth == 0 {
				return Ok(None);
			}
			return Err(FbxError::TruncatedFile { at, need: 13 });
		};
		if record.end == 0 && record.name_len == 0 {
			// NULL record closing a sibling list.
			return Ok(None);
		}
		if record.end < at {
			return Err(FbxError::BadNode {
				at,
				reason: "end offset before record start",
			});
		}

		let name_bytes = self.stream.read_exact(usize::from(record.name_len))?.to_vec();
		let name = self.intern(&name_bytes)?;
		let mut node = FbxNode::new(name);

		let values_start = self.position();
		self.read_binary_values(&mut node, parent, record.num_values)?;
		let values_end = values_start.saturating_add(record.values_len);
		let pos = self.position();
		if pos > values_end {
			return Err(FbxError::BadNode {
				at,
				reason: "values overrun declared length",
			});
		}
		self.stream.seek_forward(values_end)?;
		if record.end < values_end {
			return Err(FbxError::BadNode {
				at,
				reason: "end offset inside value data",
			});
		}

		let own = parent.child(name);
		if recursive {
			if depth + 1 > super::MAX_NODE_DEPTH && self.position() < record.end {
				return Err(FbxError::NodeDepthExceeded {
					max_depth: super::MAX_NODE_DEPTH,
				});
			}
			let end = record.end;
			node.children = self.collect_children(|parser| parser.binary_node(depth + 1, own, Some(end), true))?;
			self.stream.seek_forward(record.end)?;
		} else {
			self.open.push(OpenNode::Binary { end: record.end });
		}
		Ok(Some(node))
	}

	fn read_binary_values(&mut self, node: &mut FbxNode, parent: ParseState, num_values: u64) -> Result<()> {
		let endianness = self.endianness();
		// Legacy files spell some arrays as runs of scalars.
		let collect = parent.is_array_node(node.name);
		let ignore = self.ignores(parent, node.name);
		let mut scalars: Vec<f64> = Vec::new();
		let mut any_float = false;
		for index in 0..num_values {
			let at = self.position();
			let code = self.stream.read_u8()?;
			let value = match code {
				b'C' => FbxValue::int(i64::from(self.stream.read_u8()?)),
				b'Y' => FbxValue::int(i64::from(self.stream.read_u16(endianness)? as i16)),
				b'I' => FbxValue::int(i64::from(self.stream.read_u32(endianness)? as i32)),
				b'L' => FbxValue::int(self.stream.read_u64(endianness)? as i64),
				b'F' => FbxValue::float(f64::from(f32::from_bits(self.stream.read_u32(endianness)?))),
				b'D' => FbxValue::float(f64::from_bits(self.stream.read_u64(endianness)?)),
				b'S' | b'R' => {
					let len = self.stream.read_u32(endianness)? as usize;
					if self.opts.ignore_embedded && parent.is_embedded(node.name) {
						self.stream.skip(len as u64)?;
						log::trace!("skipped {len} bytes of embedded content");
						continue;
					}
					let bytes = self.stream.read_exact(len)?.to_vec();
					if collect {
						// Key type letters, read as their character code.
						scalars.push(f64::from(bytes.first().copied().unwrap_or(0)));
						continue;
					}
					if code == b'R' || parent.is_raw_string(node.name) {
						self.alloc.alloc(1, bytes.len())?;
						FbxValue::Blob(Arc::from(bytes))
					} else {
						FbxValue::Str(self.intern(&swap_class_name(&bytes))?)
					}
				}
				b'b' | b'c' | b'i' | b'l' | b'f' | b'd' => {
					let array = self.read_binary_array(code, parent, node.name)?;
					if index == 0 && num_values == 1 {
						node.array = Some(array);
					} else {
						log::trace!("dropped array value {index} of multi-value node");
					}
					continue;
				}
				_ => return Err(FbxError::BadValueType { code, at }),
			};
			if collect {
				if let FbxValue::Number { f, .. } = value {
					any_float |= matches!(code, b'F' | b'D');
					scalars.push(f);
				}
				continue;
			}
			if node.values.len() < MAX_NON_ARRAY_VALUES {
				node.values.push(value);
			}
		}
		if collect && node.array.is_none() {
			let array = if ignore {
				FbxArray::Ignored { count: scalars.len() }
			} else {
				self.alloc.alloc(8, scalars.len())?;
				let natural = if any_float {
					FbxArray::F64(scalars)
				} else {
					FbxArray::I64(scalars.into_iter().map(|value| value as i64).collect())
				};
				match parent.array_request(node.name) {
					ArrayRequest::Keep => natural,
					ArrayRequest::As(kind) => natural.convert(kind),
				}
			};
			node.array = Some(array);
		}
		Ok(())
	}

	fn read_binary_array(&mut self, code: u8, parent: ParseState, name: crate::fbx::Symbol) -> Result<FbxArray> {
		let endianness = self.endianness();
		let at = self.position();
		let count = self.stream.read_u32(endianness)? as usize;
		let encoding = self.stream.read_u32(endianness)?;
		let encoded_len = self.stream.read_u32(endianness)? as usize;
		let Some(stored) = ArrayKind::from_code(code) else {
			return Err(FbxError::BadValueType { code, at });
		};

		if self.ignores(parent, name) {
			self.stream.skip(encoded_len as u64)?;
			return Ok(FbxArray::Ignored { count });
		}

		let expected = count.checked_mul(stored.elem_size()).ok_or(FbxError::BadArray {
			at,
			reason: "element count overflows",
		})?;
		let bytes = match encoding {
			0 => {
				if encoded_len != expected {
					return Err(FbxError::BadArray {
						at,
						reason: "raw array size mismatch",
					});
				}
				self.stream.read_exact(expected)?.to_vec()
			}
			1 => self.inflate_array(at, encoded_len, expected)?,
			_ => {
				return Err(FbxError::BadArray {
					at,
					reason: "unknown array encoding",
				});
			}
		};

		self.alloc.alloc(stored.elem_size(), count)?;
		let array = decode_array(stored, &bytes, endianness);
		Ok(match parent.array_request(name) {
			ArrayRequest::Keep => array,
			ArrayRequest::As(kind) => array.convert(kind),
		})
	}

	fn inflate_array(&mut self, at: u64, encoded_len: usize, expected: usize) -> Result<Vec<u8>> {
		if expected as u64 > (encoded_len as u64).saturating_mul(MAX_DEFLATE_RATIO).saturating_add(64) {
			return Err(FbxError::BadArray {
				at,
				reason: "compressed array expands beyond deflate limits",
			});
		}
		let mut dst = self.alloc.alloc_vec::<u8>(expected)?;
		let progress = self.stream.progress_callback();
		let offset = self.position();

		let written = if self.stream.buffered() >= encoded_len {
			let src = self.stream.peek(encoded_len)?.unwrap_or_default();
			let mut input = InflateInput::from_slice(src);
			input.progress_cb = progress;
			input.progress_offset = offset;
			let written = inflate(&mut dst, input, &mut self.retain)?;
			self.stream.skip(encoded_len as u64)?;
			written
		} else {
			let mut reader = BoundedRead::new(&mut self.stream, encoded_len as u64);
			let mut input = InflateInput::from_reader(&mut reader, encoded_len as u64);
			input.progress_cb = progress;
			input.progress_offset = offset;
			let written = inflate(&mut dst, input, &mut self.retain);
			let left = reader.remaining();
			let written = written?;
			self.stream.skip(left)?;
			written
		};
		self.alloc.free(1, expected);

		if written != expected {
			return Err(FbxError::BadArray {
				at,
				reason: "decompressed size mismatch",
			});
		}
		Ok(dst)
	}
}

/// Turn binary `Name\0\x01Class` into the ASCII spelling `Class::Name`.
pub(crate) fn swap_class_name(bytes: &[u8]) -> std::borrow::Cow<'_, [u8]> {
	let Some(split) = bytes.windows(2).position(|pair| pair == [0, 1]) else {
		return std::borrow::Cow::Borrowed(bytes);
	};
	let (name, class) = (&bytes[..split], &bytes[split + 2..]);
	let mut out = Vec::with_capacity(bytes.len());
	out.extend_from_slice(class);
	out.extend_from_slice(b"::");
	out.extend_from_slice(name);
	std::borrow::Cow::Owned(out)
}

fn decode_array(kind: ArrayKind, bytes: &[u8], endianness: Endianness) -> FbxArray {
	macro_rules! words {
		($ty:ty, $n:literal) => {
			bytes
				.chunks_exact($n)
				.map(|chunk| {
					let mut raw = [0_u8; $n];
					raw.copy_from_slice(chunk);
					match endianness {
						Endianness::Little => <$ty>::from_le_bytes(raw),
						Endianness::Big => <$ty>::from_be_bytes(raw),
					}
				})
				.collect()
		};
	}
	match kind {
		ArrayKind::Bool => FbxArray::Bool(bytes.iter().map(|&byte| byte != 0).collect()),
		ArrayKind::I8 => FbxArray::I8(bytes.iter().map(|&byte| byte as i8).collect()),
		ArrayKind::I32 => FbxArray::I32(words!(i32, 4)),
		ArrayKind::I64 => FbxArray::I64(words!(i64, 8)),
		ArrayKind::F32 => FbxArray::F32(words!(f32, 4)),
		ArrayKind::F64 => FbxArray::F64(words!(f64, 8)),
	}
}
