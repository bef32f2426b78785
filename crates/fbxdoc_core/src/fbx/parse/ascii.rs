use std::sync::Arc;

use crate::fbx::names as n;
use crate::fbx::parse::{OpenNode, Parser};
use crate::fbx::{
	ArrayKind, ArrayRequest, FbxArray, FbxError, FbxNode, FbxValue, MAX_NON_ARRAY_VALUES, ParseState, Result,
	find_canonical,
};

/// One ASCII token.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
	/// Identifier directly followed by `:`.
	Name(Vec<u8>),
	/// Identifier used as a value, like `Y` in `Shading: Y`.
	Word(Vec<u8>),
	/// Quoted string with entities decoded.
	Str(Vec<u8>),
	/// Integer literal.
	Int(i64),
	/// Float literal, including `#INF`/`#IND` spellings.
	Float(f64),
	/// `{`
	Open,
	/// `}`
	Close,
	/// `,`
	Comma,
	/// `*` introducing an array count.
	Star,
	/// End of input.
	End,
}

/// Tokenizer state kept between calls.
pub(super) struct Lexer {
	peeked: Option<Token>,
	line: u32,
}

impl Lexer {
	pub(super) fn new() -> Self {
		Self { peeked: None, line: 1 }
	}
}

/// Values of an ASCII array in both numeric views.
#[derive(Default)]
struct AsciiArray {
	floats: Vec<f64>,
	ints: Vec<i64>,
	any_float: bool,
}

impl AsciiArray {
	fn push(&mut self, value: &FbxValue) {
		if let FbxValue::Number { f, i } = value {
			self.floats.push(*f);
			self.ints.push(*i);
		}
	}

	fn finish(self, request: ArrayRequest) -> FbxArray {
		let natural = if self.any_float {
			FbxArray::F64(self.floats)
		} else {
			FbxArray::I64(self.ints)
		};
		match request {
			ArrayRequest::Keep => natural,
			ArrayRequest::As(kind) => natural.convert(kind),
		}
	}
}

fn is_ident_start(byte: u8) -> bool {
	byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'|' | b'-' | b'.')
}

fn is_number_start(byte: u8) -> bool {
	byte.is_ascii_digit() || matches!(byte, b'-' | b'+' | b'.' | b'#')
}

fn is_number(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'+' | b'.' | b'#')
}

/// Parse a numeric literal, accepting the `1.#INF`/`-1.#IND`/`#QNAN` forms.
pub(super) fn parse_number(text: &str) -> Option<Token> {
	if text.contains('#') {
		let negative = text.starts_with('-');
		let upper = text.to_ascii_uppercase();
		let value = if upper.contains("INF") {
			f64::INFINITY
		} else if upper.contains("IND") || upper.contains("NAN") {
			f64::NAN
		} else {
			return None;
		};
		return Some(Token::Float(if negative { -value } else { value }));
	}
	if let Ok(int) = text.parse::<i64>() {
		return Some(Token::Int(int));
	}
	text.parse::<f64>().ok().map(Token::Float)
}

/// Decode the `&quot;`, `&cr;` and `&lf;` entities, keeping other `&` literally.
pub(super) fn unescape(raw: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(raw.len());
	let mut rest = raw;
	while let Some((&byte, tail)) = rest.split_first() {
		if byte == b'&' {
			let entity = [(&b"&quot;"[..], b'"'), (&b"&cr;"[..], b'\r'), (&b"&lf;"[..], b'\n')]
				.into_iter()
				.find(|(name, _)| rest.starts_with(name));
			if let Some((name, replacement)) = entity {
				out.push(replacement);
				rest = &rest[name.len()..];
				continue;
			}
		}
		out.push(byte);
		rest = tail;
	}
	out
}

/// Version from a `; FBX 7.7.0 project file` magic comment.
pub(super) fn version_from_comment(line: &[u8]) -> Option<u32> {
	let text = std::str::from_utf8(line).ok()?;
	let rest = text.strip_prefix("; FBX ")?;
	let digits = rest.split_whitespace().next()?;
	let mut parts = digits.split('.').map(|part| part.parse::<u32>().ok());
	let major = parts.next()??;
	let minor = parts.next().flatten().unwrap_or(0);
	let patch = parts.next().flatten().unwrap_or(0);
	Some(major * 1000 + minor * 100 + patch * 10)
}

impl Parser<'_> {
	fn bad_token(&self, reason: &'static str) -> FbxError {
		FbxError::BadAsciiToken {
			line: self.lexer.line,
			reason,
		}
	}

	/// Read the version comment and validate the first token.
	pub(super) fn ascii_prologue(&mut self) -> Result<()> {
		let first_line = self.peek_line()?;
		let commented = first_line.first() == Some(&b';');
		if let Some(version) = version_from_comment(&first_line) {
			self.version = version;
		}

		match self.peek_token()?.clone() {
			Token::Name(name) => {
				let known = matches!(
					find_canonical(&name),
					Some(
						n::FBX_HEADER_EXTENSION
							| n::GLOBAL_SETTINGS | n::DOCUMENTS
							| n::REFERENCES | n::DEFINITIONS
							| n::OBJECTS | n::CONNECTIONS
							| n::TAKES | n::VERSION5
					)
				);
				if self.opts.strict && !commented && !known {
					return Err(FbxError::NotFbx);
				}
				Ok(())
			}
			Token::End if commented => Ok(()),
			_ => Err(FbxError::NotFbx),
		}
	}

	fn peek_line(&mut self) -> Result<Vec<u8>> {
		let mut len = 0;
		loop {
			let want = len + 64;
			let filled = self.stream.fill(want)?;
			let avail = self.stream.buffered().min(want);
			let bytes = self.stream.peek(avail)?.unwrap_or_default();
			if let Some(end) = bytes.iter().position(|&byte| byte == b'\n') {
				return Ok(bytes[..end].to_vec());
			}
			if !filled || avail > 4096 {
				return Ok(bytes.to_vec());
			}
			len = avail;
		}
	}

	fn peek_token(&mut self) -> Result<&Token> {
		let token = match self.lexer.peeked.take() {
			Some(token) => token,
			None => self.lex()?,
		};
		Ok(self.lexer.peeked.insert(token))
	}

	fn next_token(&mut self) -> Result<Token> {
		match self.lexer.peeked.take() {
			Some(token) => Ok(token),
			None => self.lex(),
		}
	}

	fn skip_space(&mut self) -> Result<()> {
		while let Some(byte) = self.stream.peek_u8()? {
			match byte {
				b'\n' => {
					self.lexer.line += 1;
					self.stream.skip(1)?;
				}
				b' ' | b'\t' | b'\r' | 0x0c | 0x0b => self.stream.skip(1)?,
				b';' => {
					while let Some(byte) = self.stream.peek_u8()? {
						if byte == b'\n' {
							break;
						}
						self.stream.skip(1)?;
					}
				}
				_ => break,
			}
		}
		Ok(())
	}

	fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		while let Some(byte) = self.stream.peek_u8()? {
			if !pred(byte) {
				break;
			}
			out.push(byte);
			self.stream.skip(1)?;
		}
		Ok(out)
	}

	fn lex(&mut self) -> Result<Token> {
		self.skip_space()?;
		let Some(byte) = self.stream.peek_u8()? else {
			return Ok(Token::End);
		};
		match byte {
			b'{' | b'}' | b',' | b'*' => {
				self.stream.skip(1)?;
				Ok(match byte {
					b'{' => Token::Open,
					b'}' => Token::Close,
					b',' => Token::Comma,
					_ => Token::Star,
				})
			}
			b'"' => {
				self.stream.skip(1)?;
				let mut raw = Vec::new();
				loop {
					let Some(byte) = self.stream.peek_u8()? else {
						return Err(self.bad_token("unterminated string"));
					};
					self.stream.skip(1)?;
					match byte {
						b'"' => break,
						b'\n' => {
							self.lexer.line += 1;
							raw.push(byte);
						}
						_ => raw.push(byte),
					}
				}
				Ok(Token::Str(unescape(&raw)))
			}
			byte if is_ident_start(byte) => {
				let ident = self.take_while(is_ident)?;
				if self.stream.peek_u8()? == Some(b':') {
					self.stream.skip(1)?;
					return Ok(Token::Name(ident));
				}
				Ok(Token::Word(ident))
			}
			byte if is_number_start(byte) => {
				let raw = self.take_while(is_number)?;
				let text = String::from_utf8_lossy(&raw);
				parse_number(&text).ok_or_else(|| self.bad_token("malformed number"))
			}
			_ => Err(self.bad_token("unexpected character")),
		}
	}

	fn ascii_value(&mut self, token: Token, parent: ParseState, name: crate::fbx::Symbol) -> Result<Option<FbxValue>> {
		Ok(Some(match token {
			Token::Int(int) => FbxValue::int(int),
			Token::Float(float) => FbxValue::float(float),
			Token::Str(bytes) => {
				if self.opts.ignore_embedded && parent.is_embedded(name) {
					return Ok(None);
				}
				if parent.is_raw_string(name) {
					self.alloc.alloc(1, bytes.len())?;
					FbxValue::Blob(Arc::from(bytes))
				} else {
					FbxValue::Str(self.intern(&bytes)?)
				}
			}
			Token::Word(bytes) => FbxValue::Str(self.intern(&bytes)?),
			_ => return Ok(None),
		}))
	}

	pub(super) fn ascii_node(&mut self, depth: u32, parent: ParseState, recursive: bool) -> Result<Option<FbxNode>> {
		let name_bytes = match self.next_token()? {
			Token::Name(bytes) => bytes,
			Token::End if depth == 0 => return Ok(None),
			Token::End => return Err(self.bad_token("unexpected end of file inside node")),
			Token::Close if depth > 0 => return Ok(None),
			_ => return Err(self.bad_token("expected node name")),
		};
		let name = self.intern(&name_bytes)?;
		let mut node = FbxNode::new(name);
		let collect_array = parent.is_array_node(name);
		let ignore = self.ignores(parent, name);
		let mut array = AsciiArray::default();
		let mut array_count = 0_usize;

		loop {
			let next = self.peek_token()?.clone();
			match next {
				Token::Star => {
					self.next_token()?;
					let count = match self.next_token()? {
						Token::Int(count) if count >= 0 => count as usize,
						_ => return Err(self.bad_token("expected array count")),
					};
					if self.next_token()? != Token::Open {
						return Err(self.bad_token("expected '{' after array count"));
					}
					self.read_ascii_array_block(&mut array)?;
					node.array = Some(if ignore {
						FbxArray::Ignored { count }
					} else {
						self.finish_ascii_array(array, parent, name)?
					});
					return self.finish_ascii_node(node, depth, parent, recursive);
				}
				Token::Int(_) | Token::Float(_) | Token::Str(_) | Token::Word(_) => {
					let token = self.next_token()?;
					if collect_array {
						array.any_float |= matches!(token, Token::Float(_));
						let value = match token {
							Token::Word(word) => FbxValue::int(i64::from(word.first().copied().unwrap_or(0))),
							other => self.ascii_value(other, parent, name)?.unwrap_or(FbxValue::int(0)),
						};
						array_count += 1;
						if !ignore {
							array.push(&value);
						}
					} else if let Some(value) = self.ascii_value(token, parent, name)?
						&& node.values.len() < MAX_NON_ARRAY_VALUES
					{
						node.values.push(value);
					}
					if self.peek_token()? == &Token::Comma {
						self.next_token()?;
						continue;
					}
					break;
				}
				_ => break,
			}
		}

		if collect_array {
			node.array = Some(if ignore {
				FbxArray::Ignored { count: array_count }
			} else {
				self.finish_ascii_array(array, parent, name)?
			});
		}
		self.finish_ascii_node(node, depth, parent, recursive)
	}

	fn finish_ascii_node(&mut self, mut node: FbxNode, depth: u32, parent: ParseState, recursive: bool) -> Result<Option<FbxNode>> {
		let block = self.peek_token()? == &Token::Open;
		if block {
			self.next_token()?;
		}
		let own = parent.child(node.name);
		if !recursive {
			self.open.push(OpenNode::Ascii { block });
			return Ok(Some(node));
		}
		if block {
			if depth + 1 > super::MAX_NODE_DEPTH {
				return Err(FbxError::NodeDepthExceeded {
					max_depth: super::MAX_NODE_DEPTH,
				});
			}
			node.children = self.collect_children(|parser| parser.ascii_node(depth + 1, own, true))?;
		}
		Ok(Some(node))
	}

	fn read_ascii_array_block(&mut self, array: &mut AsciiArray) -> Result<()> {
		loop {
			match self.next_token()? {
				Token::Close => return Ok(()),
				Token::Name(_) | Token::Comma => {}
				Token::Int(int) => array.push(&FbxValue::int(int)),
				Token::Float(float) => {
					array.any_float = true;
					array.push(&FbxValue::float(float));
				}
				Token::Word(word) => array.push(&FbxValue::int(i64::from(word.first().copied().unwrap_or(0)))),
				Token::End => return Err(self.bad_token("unexpected end of file in array")),
				_ => return Err(self.bad_token("unexpected token in array")),
			}
		}
	}

	fn finish_ascii_array(&mut self, array: AsciiArray, parent: ParseState, name: crate::fbx::Symbol) -> Result<FbxArray> {
		let out = array.finish(parent.array_request(name));
		let size = out.kind().map_or(0, ArrayKind::elem_size);
		self.alloc.alloc(size, out.len())?;
		Ok(out)
	}
}
