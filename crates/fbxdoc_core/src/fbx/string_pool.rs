//! String interning with UTF-8 sanitization.
//!
//! Every string read from a document is interned once; later comparisons are
//! plain [`Symbol`] equality. Symbols `0..KNOWN_NAMES.len()` are the canonical
//! names of [`names`](crate::fbx::names), so matching a parsed node name against
//! a well-known one never touches string bytes.

use std::sync::Arc;

use crate::fbx::names::KNOWN_NAMES;
use crate::fbx::{Allocator, FbxError, Map, Result};

/// Interned string handle, only meaningful together with its [`StringPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub(crate) u32);

impl Symbol {
	/// Dense index of this symbol within its pool.
	pub fn index(self) -> usize {
		self.0 as usize
	}

	/// True for symbols of the canonical name table.
	pub fn is_canonical(self) -> bool {
		self.index() < KNOWN_NAMES.len()
	}
}

/// What to do with bytes that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnicodeErrorHandling {
	/// Substitute U+FFFD.
	#[default]
	ReplacementCharacter,
	/// Substitute `_`.
	Underscore,
	/// Substitute `?`.
	QuestionMark,
	/// Drop the invalid bytes.
	Remove,
	/// Fail the load with `InvalidUtf8`.
	AbortLoading,
	/// Keep the raw bytes alongside lossy text; requires `allow_unsafe`.
	UnsafeIgnore,
}

impl UnicodeErrorHandling {
	/// True when the policy needs `LoadOpts::allow_unsafe`.
	pub fn is_unsafe(self) -> bool {
		self == Self::UnsafeIgnore
	}
}

/// Look up `bytes` in the canonical name table.
pub fn find_canonical(bytes: &[u8]) -> Option<Symbol> {
	KNOWN_NAMES
		.binary_search_by(|name| name.as_bytes().cmp(bytes))
		.ok()
		.map(|index| Symbol(index as u32))
}

const PRIME1: u32 = 0x9e37_79b1;
const PRIME2: u32 = 0x85eb_ca77;
const PRIME3: u32 = 0xc2b2_ae3d;
const PRIME4: u32 = 0x27d4_eb2f;
const PRIME5: u32 = 0x1656_67b1;

/// xxHash-style 32-bit hash, also reporting whether every byte is ASCII.
pub fn hash_str(bytes: &[u8]) -> (u32, bool) {
	let mut hash = PRIME5.wrapping_add(bytes.len() as u32);
	let mut high_bits = 0_u32;

	let mut words = bytes.chunks_exact(4);
	for word in &mut words {
		let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
		high_bits |= word;
		hash = hash.wrapping_add(word.wrapping_mul(PRIME3)).rotate_left(17).wrapping_mul(PRIME4);
	}
	for &byte in words.remainder() {
		high_bits |= u32::from(byte);
		hash = hash.wrapping_add(u32::from(byte).wrapping_mul(PRIME5)).rotate_left(11).wrapping_mul(PRIME1);
	}

	hash ^= hash >> 15;
	hash = hash.wrapping_mul(PRIME2);
	hash ^= hash >> 13;
	hash = hash.wrapping_mul(PRIME3);
	hash ^= hash >> 16;
	(hash, high_bits & 0x8080_8080 == 0)
}

/// Decode `bytes` as UTF-8, repairing invalid sequences according to `policy`.
///
/// Returns `None` when the bytes were already valid.
pub fn sanitize_utf8(bytes: &[u8], policy: UnicodeErrorHandling) -> Result<Option<String>> {
	let mut rest = bytes;
	let mut offset = 0;
	let mut out: Option<String> = None;
	loop {
		match std::str::from_utf8(rest) {
			Ok(valid) => {
				if let Some(out) = &mut out {
					out.push_str(valid);
				}
				return Ok(out);
			}
			Err(err) => {
				let valid_len = err.valid_up_to();
				let bad_len = err.error_len().unwrap_or(rest.len() - valid_len);
				if policy == UnicodeErrorHandling::AbortLoading {
					return Err(FbxError::InvalidUtf8 { at: offset + valid_len });
				}

				let out = out.get_or_insert_with(|| String::with_capacity(bytes.len() + 2));
				out.push_str(&String::from_utf8_lossy(&rest[..valid_len]));
				match policy {
					UnicodeErrorHandling::ReplacementCharacter | UnicodeErrorHandling::UnsafeIgnore => out.push('\u{fffd}'),
					UnicodeErrorHandling::Underscore => out.push('_'),
					UnicodeErrorHandling::QuestionMark => out.push('?'),
					UnicodeErrorHandling::Remove | UnicodeErrorHandling::AbortLoading => {}
				}
				rest = &rest[valid_len + bad_len..];
				offset += valid_len + bad_len;
			}
		}
	}
}

/// Deduplicating store of every string seen during a load.
pub struct StringPool {
	strings: Vec<Arc<str>>,
	raw: Vec<Option<Arc<[u8]>>>,
	map: Map<Box<[u8]>, u32>,
	policy: UnicodeErrorHandling,
	retain_raw: bool,
	alloc: Allocator,
}

impl StringPool {
	/// Pool seeded with the canonical name table.
	pub fn new(alloc: &Allocator, policy: UnicodeErrorHandling) -> Self {
		let mut pool = Self {
			strings: Vec::with_capacity(KNOWN_NAMES.len() * 2),
			raw: Vec::with_capacity(KNOWN_NAMES.len() * 2),
			map: Map::with_capacity(KNOWN_NAMES.len() * 2),
			policy,
			retain_raw: false,
			alloc: alloc.clone(),
		};
		for (index, name) in KNOWN_NAMES.iter().enumerate() {
			let (hash, _) = hash_str(name.as_bytes());
			pool.map.insert(hash, Box::from(name.as_bytes()), index as u32);
			pool.strings.push(Arc::from(*name));
			pool.raw.push(None);
		}
		pool
	}

	/// Keep the original bytes of strings that needed sanitizing.
	pub fn with_raw_retention(mut self, retain: bool) -> Self {
		self.retain_raw = retain;
		self
	}

	/// Active sanitization policy.
	pub fn policy(&self) -> UnicodeErrorHandling {
		self.policy
	}

	/// Number of distinct strings, canonical names included.
	pub fn len(&self) -> usize {
		self.strings.len()
	}

	/// Always false, the canonical table is pre-interned.
	pub fn is_empty(&self) -> bool {
		self.strings.is_empty()
	}

	/// Intern `bytes`, returning the same symbol for equal input.
	pub fn intern(&mut self, bytes: &[u8]) -> Result<Symbol> {
		let (hash, ascii) = hash_str(bytes);
		if let Some(&index) = self.map.find(hash, bytes) {
			return Ok(Symbol(index));
		}

		let (text, raw): (Arc<str>, Option<Arc<[u8]>>) = if ascii {
			(Arc::from(String::from_utf8_lossy(bytes).as_ref()), None)
		} else {
			match sanitize_utf8(bytes, self.policy)? {
				None => (Arc::from(String::from_utf8_lossy(bytes).as_ref()), None),
				Some(fixed) => {
					log::trace!("sanitized {} byte string with {:?}", bytes.len(), self.policy);
					let keep = self.retain_raw || self.policy == UnicodeErrorHandling::UnsafeIgnore;
					(Arc::from(fixed.as_str()), keep.then(|| Arc::from(bytes)))
				}
			}
		};

		self.alloc.alloc(1, bytes.len() + 1)?;
		let index = self.strings.len() as u32;
		self.strings.push(text);
		self.raw.push(raw);
		self.map.insert(hash, Box::from(bytes), index);
		Ok(Symbol(index))
	}

	/// Intern an already valid string.
	pub fn intern_str(&mut self, text: &str) -> Result<Symbol> {
		self.intern(text.as_bytes())
	}

	/// Symbol for `bytes` if it was interned before.
	pub fn find(&self, bytes: &[u8]) -> Option<Symbol> {
		let (hash, _) = hash_str(bytes);
		self.map.find(hash, bytes).map(|&index| Symbol(index))
	}

	/// Sanitized text of `symbol`.
	pub fn get(&self, symbol: Symbol) -> &str {
		self.strings.get(symbol.index()).map_or("", |text| text.as_ref())
	}

	/// Shared handle to the text of `symbol`.
	pub fn arc(&self, symbol: Symbol) -> Arc<str> {
		self.strings.get(symbol.index()).cloned().unwrap_or_else(|| Arc::from(""))
	}

	/// Original bytes of `symbol` when sanitizing changed them and retention is on.
	pub fn raw(&self, symbol: Symbol) -> Option<&[u8]> {
		self.raw.get(symbol.index()).and_then(|raw| raw.as_deref())
	}
}

#[cfg(test)]
mod tests;
