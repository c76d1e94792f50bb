//! Field specifications
//!
//! Every frame body is a fixed, ordered list of fields. A [`FieldSpec`] knows how to decode one
//! field from the front of a body, encode it again, and validate values assigned to it directly.

use crate::error::{Id3Error, Id3v2ErrorKind, Result};
use crate::id3::v2::util::synchsafe::{decode_syncsafe, encode_syncsafe};
use crate::macros::id3v2_err;
use crate::util::text::{TextEncoding, latin1_decode, split_terminated};

/// The value of a single frame field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
	/// An unsigned integer, used by byte, integer, varint and syncsafe fields
	Int(u64),
	/// A two's complement integer
	SignedInt(i64),
	/// The text encoding used by a frame's encoded strings
	Encoding(TextEncoding),
	/// Any kind of string
	Text(String),
	/// Raw bytes
	Binary(Vec<u8>),
	/// The elements of a repeated field
	List(Vec<FieldValue>),
	/// The records of a repeated tuple field
	Records(Vec<Vec<FieldValue>>),
}

impl FieldValue {
	/// Returns the integer, if this is an unsigned integer
	pub fn as_int(&self) -> Option<u64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}

	/// Returns the integer, if this is a signed integer
	pub fn as_signed_int(&self) -> Option<i64> {
		match self {
			Self::SignedInt(i) => Some(*i),
			_ => None,
		}
	}

	/// Returns the encoding, if this is an encoding
	pub fn as_encoding(&self) -> Option<TextEncoding> {
		match self {
			Self::Encoding(e) => Some(*e),
			_ => None,
		}
	}

	/// Returns the string, if this is text
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(t) => Some(t),
			_ => None,
		}
	}

	/// Returns the bytes, if this is binary data
	pub fn as_binary(&self) -> Option<&[u8]> {
		match self {
			Self::Binary(b) => Some(b),
			_ => None,
		}
	}

	/// Returns the elements, if this is a list
	pub fn as_list(&self) -> Option<&[FieldValue]> {
		match self {
			Self::List(l) => Some(l),
			_ => None,
		}
	}

	/// Returns the records, if this is a record list
	pub fn as_records(&self) -> Option<&[Vec<FieldValue>]> {
		match self {
			Self::Records(r) => Some(r),
			_ => None,
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<u64> for FieldValue {
	fn from(value: u64) -> Self {
		Self::Int(value)
	}
}

impl From<u32> for FieldValue {
	fn from(value: u32) -> Self {
		Self::Int(u64::from(value))
	}
}

impl From<u8> for FieldValue {
	fn from(value: u8) -> Self {
		Self::Int(u64::from(value))
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		Self::SignedInt(value)
	}
}

impl From<TextEncoding> for FieldValue {
	fn from(value: TextEncoding) -> Self {
		Self::Encoding(value)
	}
}

impl From<Vec<u8>> for FieldValue {
	fn from(value: Vec<u8>) -> Self {
		Self::Binary(value)
	}
}

impl From<&[u8]> for FieldValue {
	fn from(value: &[u8]) -> Self {
		Self::Binary(value.to_vec())
	}
}

impl From<Vec<String>> for FieldValue {
	fn from(value: Vec<String>) -> Self {
		Self::List(value.into_iter().map(FieldValue::Text).collect())
	}
}

impl From<Vec<&str>> for FieldValue {
	fn from(value: Vec<&str>) -> Self {
		Self::List(value.into_iter().map(FieldValue::from).collect())
	}
}

/// How a single field is laid out in a frame body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSpec {
	/// A single byte
	Byte,
	/// A big-endian unsigned integer of the given width in bytes
	Int(usize),
	/// A big-endian two's complement integer of the given width in bytes
	SignedInt(usize),
	/// A length byte (in bits), followed by that many bits of big-endian integer
	VarInt,
	/// A syncsafe integer of the given width in bytes
	Syncsafe(usize),
	/// A Latin-1 string of exactly the given length, such as a language code
	FixedString(usize),
	/// A null terminated Latin-1 string
	Latin1String,
	/// A null terminated Latin-1 URL
	///
	/// Some encoders put a null byte in front of the URL, a single one is skipped.
	Url,
	/// The text encoding of every [`FieldSpec::EncodedString`] in the frame
	Encoding,
	/// A string in the frame's text encoding, terminated by that encoding's terminator
	///
	/// Full text fields (comments, lyrics) use the same layout.
	EncodedString,
	/// The inner field, repeated until the body is exhausted
	Sequence(&'static FieldSpec),
	/// Records of the inner fields, repeated until the body is exhausted
	Records(&'static [FieldSpec]),
	/// The rest of the body
	Binary,
	/// A list of integers, counted and sized by two earlier integer fields
	///
	/// Elements are 1 byte wide when the `bits` field is 8, otherwise 2.
	IndexList {
		/// The field holding the element count
		count: &'static str,
		/// The field holding the bits per element
		bits: &'static str,
	},
}

/// A named field in a frame schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
	pub(crate) name: &'static str,
	pub(crate) spec: FieldSpec,
	pub(crate) optional: bool,
}

impl Field {
	pub(crate) const fn new(name: &'static str, spec: FieldSpec) -> Self {
		Self {
			name,
			spec,
			optional: false,
		}
	}

	/// Mark a trailing field as allowed to be missing
	pub(crate) const fn optional(mut self) -> Self {
		self.optional = true;
		self
	}

	/// The field's name
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// The field's layout
	pub fn spec(&self) -> FieldSpec {
		self.spec
	}

	/// Whether the field may be missing from the end of a body
	pub fn is_optional(&self) -> bool {
		self.optional
	}
}

/// The owning frame's state, as seen by a field spec
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldContext<'a> {
	pub(crate) encoding: Option<TextEncoding>,
	pub(crate) fields: &'a [Field],
	pub(crate) values: &'a [Option<FieldValue>],
}

impl FieldContext<'_> {
	fn int(&self, name: &str) -> Option<u64> {
		let index = self.fields.iter().position(|f| f.name == name)?;
		self.values.get(index)?.as_ref()?.as_int()
	}

	fn encoding(&self) -> Result<TextEncoding> {
		match self.encoding {
			Some(encoding) => Ok(encoding),
			None => id3v2_err!(BadFieldValue {
				field: "encoding",
				reason: "encoded string without an encoding"
			}),
		}
	}

	fn index_width(&self, bits: &str) -> usize {
		if self.int(bits) == Some(8) { 1 } else { 2 }
	}
}

fn bad_value(field: &'static str, reason: &'static str) -> Id3Error {
	Id3v2ErrorKind::BadFieldValue { field, reason }.into()
}

fn take(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
	if data.len() < len {
		id3v2_err!(UnexpectedEnd);
	}

	Ok(data.split_at(len))
}

fn read_uint(bytes: &[u8]) -> u64 {
	bytes.iter().fold(0, |acc, b| (acc << 8) | u64::from(*b))
}

fn write_uint(value: u64, width: usize, out: &mut Vec<u8>) {
	out.extend((0..width).rev().map(|i| (value >> (8 * i)) as u8));
}

fn fits_unsigned(value: u64, width: usize) -> bool {
	width >= 8 || value >> (8 * width) == 0
}

fn fits_signed(value: i64, width: usize) -> bool {
	if width >= 8 {
		return true;
	}

	let bits = 8 * width as u32;
	let min = -(1_i64 << (bits - 1));
	let max = (1_i64 << (bits - 1)) - 1;
	(min..=max).contains(&value)
}

fn is_latin1(text: &str) -> bool {
	text.chars().all(|c| c as u32 <= 255)
}

impl FieldSpec {
	/// Decode a value from the front of `data`, returning it and the remaining data
	pub(crate) fn decode<'d>(
		&self,
		name: &'static str,
		data: &'d [u8],
		ctx: &FieldContext<'_>,
	) -> Result<(FieldValue, &'d [u8])> {
		match *self {
			FieldSpec::Byte => {
				let (byte, rest) = take(data, 1)?;
				Ok((FieldValue::Int(u64::from(byte[0])), rest))
			},
			FieldSpec::Int(width) => {
				let (bytes, rest) = take(data, width)?;
				Ok((FieldValue::Int(read_uint(bytes)), rest))
			},
			FieldSpec::SignedInt(width) => {
				let (bytes, rest) = take(data, width)?;
				let raw = read_uint(bytes);
				let shift = 64 - 8 * width.min(8) as u32;
				// Sign extend from the field's width
				let value = ((raw << shift) as i64) >> shift;
				Ok((FieldValue::SignedInt(value), rest))
			},
			FieldSpec::VarInt => {
				let (bits, rest) = take(data, 1)?;
				let len = (usize::from(bits[0]) + 7) / 8;
				if len > 8 {
					return Err(bad_value(name, "integer wider than 64 bits"));
				}

				let (bytes, rest) = take(rest, len)?;
				Ok((FieldValue::Int(read_uint(bytes)), rest))
			},
			FieldSpec::Syncsafe(width) => {
				let (bytes, rest) = take(data, width)?;
				Ok((FieldValue::Int(decode_syncsafe(bytes)?), rest))
			},
			FieldSpec::FixedString(len) => {
				let (bytes, rest) = take(data, len)?;
				Ok((FieldValue::Text(latin1_decode(bytes)), rest))
			},
			FieldSpec::Latin1String => {
				let (text, rest) = split_terminated(data, 1);
				Ok((FieldValue::Text(latin1_decode(text)), rest))
			},
			FieldSpec::Url => {
				let data = match data {
					[0, rest @ ..] => rest,
					_ => data,
				};

				let (text, rest) = split_terminated(data, 1);
				Ok((FieldValue::Text(latin1_decode(text)), rest))
			},
			FieldSpec::Encoding => {
				let (byte, rest) = take(data, 1)?;
				match TextEncoding::from_u8(byte[0]) {
					Some(encoding) => Ok((FieldValue::Encoding(encoding), rest)),
					None => id3v2_err!(BadTextEncoding(byte[0])),
				}
			},
			FieldSpec::EncodedString => {
				let (text, rest) = ctx.encoding()?.decode_terminated(data)?;
				Ok((FieldValue::Text(text), rest))
			},
			FieldSpec::Sequence(inner) => {
				let mut values = Vec::new();
				let mut data = data;
				while !data.is_empty() {
					let (value, rest) = inner.decode(name, data, ctx)?;
					values.push(value);
					data = rest;
				}

				Ok((FieldValue::List(values), data))
			},
			FieldSpec::Records(specs) => {
				let mut records = Vec::new();
				let mut data = data;
				while !data.is_empty() {
					let mut record = Vec::with_capacity(specs.len());
					for spec in specs {
						let (value, rest) = spec.decode(name, data, ctx)?;
						record.push(value);
						data = rest;
					}

					records.push(record);
				}

				Ok((FieldValue::Records(records), data))
			},
			FieldSpec::Binary => Ok((FieldValue::Binary(data.to_vec()), &[])),
			FieldSpec::IndexList { count, bits } => {
				let Some(count) = ctx.int(count) else {
					return Err(bad_value(name, "index count is missing"));
				};

				let width = ctx.index_width(bits);
				let mut values = Vec::new();
				let mut data = data;
				for _ in 0..count {
					let (bytes, rest) = take(data, width)?;
					values.push(FieldValue::Int(read_uint(bytes)));
					data = rest;
				}

				Ok((FieldValue::List(values), data))
			},
		}
	}

	/// Encode `value`, appending it to `out`
	///
	/// `value` is expected to have passed [`FieldSpec::validate`].
	pub(crate) fn encode(
		&self,
		name: &'static str,
		value: &FieldValue,
		ctx: &FieldContext<'_>,
		out: &mut Vec<u8>,
	) -> Result<()> {
		match (*self, value) {
			(FieldSpec::Byte, FieldValue::Int(i)) if *i <= 0xFF => out.push(*i as u8),
			(FieldSpec::Int(width), FieldValue::Int(i)) if fits_unsigned(*i, width) => {
				write_uint(*i, width, out)
			},
			(FieldSpec::SignedInt(width), FieldValue::SignedInt(i)) if fits_signed(*i, width) => {
				write_uint(*i as u64, width, out)
			},
			(FieldSpec::VarInt, FieldValue::Int(i)) => {
				let len = (64 - i.leading_zeros() as usize).div_ceil(8);
				out.push((len * 8) as u8);
				write_uint(*i, len, out);
			},
			(FieldSpec::Syncsafe(width), FieldValue::Int(i)) => {
				out.extend(encode_syncsafe(*i, width)?);
			},
			(FieldSpec::FixedString(len), FieldValue::Text(text)) => {
				let encoded = TextEncoding::Latin1.encode(text, false)?;
				if encoded.len() != len {
					return Err(bad_value(name, "string has the wrong length"));
				}

				out.extend(encoded);
			},
			(FieldSpec::Latin1String | FieldSpec::Url, FieldValue::Text(text)) => {
				out.extend(TextEncoding::Latin1.encode(text, true)?);
			},
			(FieldSpec::Encoding, FieldValue::Encoding(encoding)) => out.push(*encoding as u8),
			(FieldSpec::EncodedString, FieldValue::Text(text)) => {
				out.extend(ctx.encoding()?.encode(text, true)?);
			},
			(FieldSpec::Sequence(inner), FieldValue::List(values)) => {
				for value in values {
					inner.encode(name, value, ctx, out)?;
				}
			},
			(FieldSpec::Records(specs), FieldValue::Records(records)) => {
				for record in records {
					if record.len() != specs.len() {
						return Err(bad_value(name, "record has the wrong number of values"));
					}

					for (spec, value) in specs.iter().zip(record) {
						spec.encode(name, value, ctx, out)?;
					}
				}
			},
			(FieldSpec::Binary, FieldValue::Binary(data)) => out.extend_from_slice(data),
			(FieldSpec::IndexList { bits, .. }, FieldValue::List(values)) => {
				let width = ctx.index_width(bits);
				for value in values {
					match value {
						FieldValue::Int(i) if fits_unsigned(*i, width) => {
							write_uint(*i, width, out)
						},
						_ => return Err(bad_value(name, "index doesn't fit its width")),
					}
				}
			},
			_ => return Err(bad_value(name, "value doesn't match the field type")),
		}

		Ok(())
	}

	/// Check a value being assigned to a field, returning it in its normalized form
	///
	/// Encodings may be given as integers, and sequences accept a single element in
	/// place of a list.
	pub(crate) fn validate(
		&self,
		name: &'static str,
		value: FieldValue,
		ctx: &FieldContext<'_>,
	) -> Result<FieldValue> {
		match (*self, value) {
			(FieldSpec::Byte, FieldValue::Int(i)) => {
				if i > 0xFF {
					return Err(bad_value(name, "byte out of range"));
				}

				Ok(FieldValue::Int(i))
			},
			(FieldSpec::Int(width), FieldValue::Int(i)) => {
				if !fits_unsigned(i, width) {
					return Err(bad_value(name, "integer out of range"));
				}

				Ok(FieldValue::Int(i))
			},
			(FieldSpec::SignedInt(width), FieldValue::SignedInt(i)) => {
				if !fits_signed(i, width) {
					return Err(bad_value(name, "integer out of range"));
				}

				Ok(FieldValue::SignedInt(i))
			},
			(FieldSpec::SignedInt(width), FieldValue::Int(i)) => match i64::try_from(i) {
				Ok(i) if fits_signed(i, width) => Ok(FieldValue::SignedInt(i)),
				_ => Err(bad_value(name, "integer out of range")),
			},
			(FieldSpec::VarInt, FieldValue::Int(i)) => Ok(FieldValue::Int(i)),
			(FieldSpec::Syncsafe(width), FieldValue::Int(i)) => {
				if width > 8 || i >> (7 * width) != 0 {
					return Err(bad_value(name, "integer out of range"));
				}

				Ok(FieldValue::Int(i))
			},
			(FieldSpec::FixedString(len), FieldValue::Text(text)) => {
				if !is_latin1(&text) || text.chars().count() != len {
					return Err(bad_value(name, "expected a fixed length Latin-1 string"));
				}

				Ok(FieldValue::Text(text))
			},
			(FieldSpec::Latin1String | FieldSpec::Url, FieldValue::Text(text)) => {
				if !is_latin1(&text) {
					return Err(bad_value(name, "expected a Latin-1 string"));
				}

				Ok(FieldValue::Text(text))
			},
			(FieldSpec::Encoding, FieldValue::Encoding(encoding)) => {
				Ok(FieldValue::Encoding(encoding))
			},
			(FieldSpec::Encoding, FieldValue::Int(i)) => {
				match u8::try_from(i).ok().and_then(TextEncoding::from_u8) {
					Some(encoding) => Ok(FieldValue::Encoding(encoding)),
					None => Err(bad_value(name, "unknown text encoding")),
				}
			},
			(FieldSpec::EncodedString, FieldValue::Text(text)) => Ok(FieldValue::Text(text)),
			(FieldSpec::Sequence(inner), FieldValue::List(values)) => values
				.into_iter()
				.map(|v| inner.validate(name, v, ctx))
				.collect::<Result<Vec<_>>>()
				.map(FieldValue::List),
			(FieldSpec::Sequence(inner), scalar) => {
				Ok(FieldValue::List(vec![inner.validate(name, scalar, ctx)?]))
			},
			(FieldSpec::Records(specs), FieldValue::Records(records)) => {
				let mut validated = Vec::with_capacity(records.len());
				for record in records {
					if record.len() != specs.len() {
						return Err(bad_value(name, "record has the wrong number of values"));
					}

					validated.push(
						specs
							.iter()
							.zip(record)
							.map(|(spec, v)| spec.validate(name, v, ctx))
							.collect::<Result<Vec<_>>>()?,
					);
				}

				Ok(FieldValue::Records(validated))
			},
			(FieldSpec::Binary, FieldValue::Binary(data)) => Ok(FieldValue::Binary(data)),
			(FieldSpec::IndexList { bits, .. }, FieldValue::List(values)) => {
				let width = ctx.index_width(bits);
				if values
					.iter()
					.any(|v| !matches!(v, FieldValue::Int(i) if fits_unsigned(*i, width)))
				{
					return Err(bad_value(name, "index doesn't fit its width"));
				}

				Ok(FieldValue::List(values))
			},
			_ => Err(bad_value(name, "value doesn't match the field type")),
		}
	}
}
