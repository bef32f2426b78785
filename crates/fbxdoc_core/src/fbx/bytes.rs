use crate::fbx::{Endianness, FbxError, Result};

/// Bounded cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(FbxError::TruncatedFile {
				at: self.pos as u64,
				need: n,
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Skip `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		self.read_exact(n).map(|_| ())
	}

	/// Read a four-byte tag.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		let raw = self.read_exact(4)?;
		let mut out = [0_u8; 4];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read a `u32` using the selected endianness.
	pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(match endianness {
			Endianness::Little => u32::from_le_bytes(buf),
			Endianness::Big => u32::from_be_bytes(buf),
		})
	}

	/// Read a `u64` using the selected endianness.
	pub fn read_u64(&mut self, endianness: Endianness) -> Result<u64> {
		let raw = self.read_exact(8)?;
		let mut buf = [0_u8; 8];
		buf.copy_from_slice(raw);
		Ok(match endianness {
			Endianness::Little => u64::from_le_bytes(buf),
			Endianness::Big => u64::from_be_bytes(buf),
		})
	}

	/// Read an `i32` using the selected endianness.
	pub fn read_i32(&mut self, endianness: Endianness) -> Result<i32> {
		self.read_u32(endianness).map(|value| value as i32)
	}

	/// Read an `f32` using the selected endianness.
	pub fn read_f32(&mut self, endianness: Endianness) -> Result<f32> {
		self.read_u32(endianness).map(f32::from_bits)
	}

	/// Advance to the next multiple of `align` bytes.
	pub fn align(&mut self, align: usize) -> Result<()> {
		let aligned = self.pos.div_ceil(align) * align;
		self.skip(aligned.saturating_sub(self.pos))
	}
}

#[cfg(test)]
mod tests {
	use crate::fbx::bytes::Cursor;
	use crate::fbx::{Endianness, FbxError};

	#[test]
	fn reads_mixed_endianness_and_alignment() {
		let bytes = [1, 0, 0, 0, 0, 0, 0, 2, b'a', b'b', 0, 0, 9];
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_u32(Endianness::Little).expect("le"), 1);
		assert_eq!(cursor.read_u32(Endianness::Big).expect("be"), 2);
		cursor.skip(3).expect("skip");
		cursor.align(4).expect("align");
		assert_eq!(cursor.pos(), 12);
		assert!(matches!(
			cursor.read_u32(Endianness::Little),
			Err(FbxError::TruncatedFile { at: 12, need: 4 })
		));
	}
}
