use crate::fbx::{FbxError, Result};

/// Leading magic of every binary FBX file.
pub const BINARY_MAGIC: &[u8; 22] = b"Kaydara FBX Binary  \x00\x1a";
/// Version assumed when an ASCII file does not declare one.
pub const DEFAULT_ASCII_VERSION: u32 = 7400;

/// Byte order of binary records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
	/// Little-endian (flag byte `0`).
	Little,
	/// Big-endian (flag byte `1`).
	Big,
}

impl Endianness {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}
}

/// Container flavor detected from the leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
	/// `Kaydara FBX Binary` records.
	Binary,
	/// Human-readable text records.
	Ascii,
}

impl FileFormat {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Binary => "binary",
			Self::Ascii => "ascii",
		}
	}

	/// Binary when the 22-byte magic matches, ASCII otherwise.
	pub fn detect(bytes: &[u8]) -> Self {
		if bytes.starts_with(BINARY_MAGIC) { Self::Binary } else { Self::Ascii }
	}
}

/// Parsed binary file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbxHeader {
	/// Record byte order.
	pub endianness: Endianness,
	/// Format version, for example `7400`.
	pub version: u32,
}

impl FbxHeader {
	/// Magic plus endian flag plus version.
	pub const SIZE: usize = 27;
	/// First version using 64-bit node record headers.
	pub const WIDE_RECORD_VERSION: u32 = 7500;

	/// Parse the binary header at the beginning of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		if !bytes.starts_with(BINARY_MAGIC) {
			return Err(FbxError::NotFbx);
		}
		let header = bytes.get(0..Self::SIZE).ok_or(FbxError::TruncatedFile {
			at: bytes.len() as u64,
			need: Self::SIZE - bytes.len(),
		})?;

		let endianness = match header[22] {
			0 => Endianness::Little,
			1 => Endianness::Big,
			_ => return Err(FbxError::NotFbx),
		};
		let mut raw = [0_u8; 4];
		raw.copy_from_slice(&header[23..27]);
		let version = match endianness {
			Endianness::Little => u32::from_le_bytes(raw),
			Endianness::Big => u32::from_be_bytes(raw),
		};

		Ok(Self { endianness, version })
	}

	/// True when node records use 64-bit offsets and counts.
	pub fn wide_records(self) -> bool {
		self.version >= Self::WIDE_RECORD_VERSION
	}
}

#[cfg(test)]
mod tests {
	use crate::fbx::{BINARY_MAGIC, Endianness, FbxError, FbxHeader, FileFormat};

	fn header(endian: u8, version: [u8; 4]) -> Vec<u8> {
		let mut bytes = BINARY_MAGIC.to_vec();
		bytes.push(endian);
		bytes.extend_from_slice(&version);
		bytes
	}

	#[test]
	fn parses_little_endian_header() {
		let bytes = header(0, 7400_u32.to_le_bytes());
		let parsed = FbxHeader::parse(&bytes).expect("header parses");
		assert_eq!(parsed.endianness, Endianness::Little);
		assert_eq!(parsed.version, 7400);
		assert!(!parsed.wide_records());
		assert_eq!(FileFormat::detect(&bytes), FileFormat::Binary);
	}

	#[test]
	fn parses_big_endian_wide_header() {
		let bytes = header(1, 7500_u32.to_be_bytes());
		let parsed = FbxHeader::parse(&bytes).expect("header parses");
		assert_eq!(parsed.endianness, Endianness::Big);
		assert_eq!(parsed.version, 7500);
		assert!(parsed.wide_records());
	}

	#[test]
	fn short_header_is_truncated() {
		let bytes = &header(0, 7400_u32.to_le_bytes())[..24];
		let err = FbxHeader::parse(bytes).expect_err("too short");
		assert!(matches!(err, FbxError::TruncatedFile { at: 24, need: 3 }));
	}

	#[test]
	fn text_is_detected_as_ascii() {
		assert_eq!(FileFormat::detect(b"; FBX 7.4.0 project file"), FileFormat::Ascii);
		assert!(matches!(FbxHeader::parse(b"; FBX"), Err(FbxError::NotFbx)));
	}
}
