mod convert;
pub(crate) mod field;
pub(crate) mod flags;
pub(crate) mod id;
pub(crate) mod read;
pub(crate) mod registry;
pub(crate) mod schema;

use field::{FieldContext, FieldSpec, FieldValue};
use flags::FrameFlags;
use id::FrameId;
use schema::{ERROR_FRAME, FrameKind, FrameSchema};

use crate::error::{Diagnostics, ErrorKind, Id3Error, Id3v2ErrorKind, Result, Warning};
use crate::id3::v2::Id3v2Version;
use crate::macros::id3v2_err;
use crate::util::text::TextEncoding;

use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A single ID3v2 frame
///
/// Every frame is described by a [`FrameSchema`], which determines its fields. Field values are
/// validated as they are assigned, see [`Frame::set`].
///
/// Frames that fail to decode are kept as *error frames*, holding the raw frame data along with the
/// error. These are never written back.
///
/// # Examples
///
/// ```rust
/// use id3forge::id3::v2::Frame;
///
/// # fn main() -> id3forge::error::Result<()> {
/// let title = Frame::text("TIT2", ["Some title"])?;
/// assert_eq!(title.text_values(), ["Some title"]);
///
/// let comment = Frame::new("COMM")?
/// 	.with("lang", "eng")?
/// 	.with("desc", "")?
/// 	.with("text", "A comment")?;
/// assert_eq!(comment.get("lang").and_then(|v| v.as_text()), Some("eng"));
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Frame {
	id: FrameId,
	/// The frame's flags
	pub flags: FrameFlags,
	schema: &'static FrameSchema,
	values: Vec<Option<FieldValue>>,
	error: Option<Arc<Id3Error>>,
}

impl Frame {
	/// Create an empty frame
	///
	/// IDs without a registered schema get a generic one, see [`resolve`](crate::id3::v2::resolve).
	///
	/// # Errors
	///
	/// `id` is not a valid [`FrameId`]
	pub fn new<I>(id: I) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
	{
		let id = FrameId::new(id)?;
		let schema = registry::resolve(id.as_str());
		Ok(Self::with_schema(id, schema))
	}

	pub(crate) fn with_schema(id: FrameId, schema: &'static FrameSchema) -> Self {
		Self {
			id,
			flags: FrameFlags {
				unknown: schema.generic,
				..FrameFlags::default()
			},
			schema,
			values: vec![None; schema.fields.len()],
			error: None,
		}
	}

	/// Create a text information frame
	///
	/// The encoding is left unset, and picked when the frame is written.
	///
	/// # Errors
	///
	/// * `id` is not a valid [`FrameId`]
	/// * `id` is not a text information frame
	pub fn text<I, V, S>(id: I, values: V) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
		V: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut frame = Self::new(id)?;
		if frame.schema.kind != FrameKind::Text {
			id3v2_err!(BadFieldValue {
				field: "text",
				reason: "not a text information frame"
			});
		}

		let values = values.into_iter().map(Into::into).collect::<Vec<String>>();
		frame.set("text", values)?;
		Ok(frame)
	}

	/// Create a URL link frame
	///
	/// # Errors
	///
	/// * `id` is not a valid [`FrameId`]
	/// * `id` is not a URL link frame
	/// * `url` is not representable in Latin-1
	pub fn url<I>(id: I, url: impl Into<String>) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
	{
		let mut frame = Self::new(id)?;
		if frame.schema.kind != FrameKind::Url {
			id3v2_err!(BadFieldValue {
				field: "url",
				reason: "not a URL link frame"
			});
		}

		frame.set("url", url.into())?;
		Ok(frame)
	}

	/// Create a frame holding the raw data of a frame that failed to decode
	pub(crate) fn error_frame(id: FrameId, data: Vec<u8>, error: Id3Error) -> Self {
		let mut frame = Self::with_schema(id, &ERROR_FRAME);
		frame.values[0] = Some(FieldValue::Binary(data));
		frame.error = Some(Arc::new(error));
		frame
	}

	/// Set a field, returning the frame
	///
	/// # Errors
	///
	/// See [`Frame::set`]
	pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Result<Self> {
		self.set(name, value)?;
		Ok(self)
	}

	/// Set a field
	///
	/// The value is validated against the field's [`FieldSpec`](crate::id3::v2::FieldSpec). A single
	/// value given to a repeated field is treated as a one element list.
	///
	/// # Errors
	///
	/// * The frame has no field called `name`
	/// * The value doesn't fit the field
	pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
		let Some(index) = self.schema.field_index(name) else {
			id3v2_err!(UnknownField(name.to_owned()));
		};

		let field = self.schema.fields[index];
		let validated = field.spec.validate(field.name, value.into(), &self.context())?;
		self.values[index] = Some(validated);

		Ok(())
	}

	/// Remove a field's value, returning it
	pub fn unset(&mut self, name: &str) -> Option<FieldValue> {
		let index = self.schema.field_index(name)?;
		self.values[index].take()
	}

	/// Get a field's value
	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		let index = self.schema.field_index(name)?;
		self.values[index].as_ref()
	}

	/// The names of the frame's fields, in the order they are stored
	pub fn field_names(&self) -> impl Iterator<Item = &'static str> + use<> {
		self.schema.fields.iter().map(|f| f.name)
	}

	/// The frame's text encoding, if it has one
	pub fn encoding(&self) -> Option<TextEncoding> {
		self.get("encoding").and_then(FieldValue::as_encoding)
	}

	/// Set the frame's text encoding
	///
	/// `None` lets the encoding be chosen when the frame is written. Frames without encoded
	/// strings ignore this.
	pub fn set_encoding(&mut self, encoding: Option<TextEncoding>) {
		if let Some(index) = self.schema.field_index("encoding") {
			self.values[index] = encoding.map(FieldValue::Encoding);
		}
	}

	/// The frame's text, for frames with a `text` field
	///
	/// Text information frames may hold multiple values.
	pub fn text_values(&self) -> Vec<&str> {
		match self.get("text") {
			Some(FieldValue::List(values)) => values.iter().filter_map(FieldValue::as_text).collect(),
			Some(FieldValue::Text(text)) => vec![text.as_str()],
			_ => Vec::new(),
		}
	}

	/// The frame's ID
	pub fn id(&self) -> &FrameId {
		&self.id
	}

	/// The frame's ID as a string
	pub fn id_str(&self) -> &str {
		self.id.as_str()
	}

	/// The schema describing the frame
	pub fn schema(&self) -> &'static FrameSchema {
		self.schema
	}

	/// Whether the frame ID has no registered schema
	pub fn is_unknown(&self) -> bool {
		self.flags.unknown
	}

	/// Whether the frame failed to decode
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	/// The error that prevented the frame from being decoded
	pub fn error(&self) -> Option<&Id3Error> {
		self.error.as_deref()
	}

	/// The raw frame data of an error frame
	pub fn raw_data(&self) -> Option<&[u8]> {
		if !self.is_error() {
			return None;
		}

		self.values.first()?.as_ref()?.as_binary()
	}

	/// Whether the frame can be written as-is to a tag of `version`
	pub fn is_valid_for(&self, version: Id3v2Version) -> bool {
		!self.is_error() && self.schema.versions.contains(version) && self.id.fits(version)
	}

	fn context(&self) -> FieldContext<'_> {
		FieldContext {
			encoding: self.encoding(),
			fields: self.schema.fields,
			values: &self.values,
		}
	}

	/// Decode a frame body
	///
	/// `data` must already be stripped of all frame level transformations (compression,
	/// unsynchronisation, group identifiers).
	///
	/// # Errors
	///
	/// The data doesn't match the frame's schema
	pub fn decode_body(id: FrameId, flags: FrameFlags, data: &[u8]) -> Result<Self> {
		Self::decode_body_with(id, flags, data, &mut Diagnostics::default())
	}

	pub(crate) fn decode_body_with(
		id: FrameId,
		flags: FrameFlags,
		data: &[u8],
		diagnostics: &mut Diagnostics,
	) -> Result<Self> {
		let schema = registry::resolve(id.as_str());
		if schema.untested {
			diagnostics.warn(Warning::UntestedFrame(id.clone()));
		}

		let mut values = Vec::with_capacity(schema.fields.len());
		let mut encoding = None;
		let mut data = data;

		for field in schema.fields {
			let ctx = FieldContext {
				encoding,
				fields: schema.fields,
				values: &values,
			};

			match field.spec.decode(field.name, data, &ctx) {
				Ok((value, rest)) => {
					if let FieldValue::Encoding(e) = value {
						encoding = Some(e);
					}

					values.push(Some(value));
					data = rest;
				},
				Err(e) if field.optional && e.is_unexpected_end() => {
					log::trace!("{id}: optional field `{}` is missing", field.name);
					values.push(None);
				},
				Err(e) => return Err(e),
			}
		}

		if !data.is_empty() {
			log::debug!("{id}: ignoring {} trailing bytes", data.len());
		}

		Ok(Self {
			id,
			flags: FrameFlags {
				unknown: schema.generic,
				..flags
			},
			schema,
			values,
			error: None,
		})
	}

	/// Encode the frame body for `version`
	///
	/// Strings that can't be represented in the frame's encoding are retried with Latin-1, then
	/// UTF-16, and the frame's encoding is updated to the first that succeeds. Encodings that don't
	/// exist before ID3v2.4 are replaced with UTF-16.
	///
	/// # Errors
	///
	/// * The frame is an error frame
	/// * A required field has no value
	/// * The text can't be represented in any encoding
	pub fn encode_body(&mut self, version: Id3v2Version) -> Result<Vec<u8>> {
		if self.is_error() {
			id3v2_err!(IncompatibleFrame {
				id: self.id.to_string(),
				version
			});
		}

		if !self.schema.has_encoding() {
			return self.encode_with(None);
		}

		let current = self.encoding().map(|e| match version {
			Id3v2Version::V4 => e,
			_ => e.to_id3v23(),
		});

		let mut candidates = Vec::with_capacity(3);
		for encoding in current.into_iter().chain(TextEncoding::PREFERRED) {
			if !candidates.contains(&encoding) {
				candidates.push(encoding);
			}
		}

		for encoding in candidates {
			match self.encode_with(Some(encoding)) {
				Ok(body) => {
					if Some(encoding) != self.encoding() {
						log::debug!("{}: writing with encoding {encoding:?}", self.id);
						self.set_encoding(Some(encoding));
					}

					return Ok(body);
				},
				Err(e) if matches!(e.kind(), ErrorKind::TextEncode(_)) => {
					log::trace!("{}: {encoding:?} can't represent the text", self.id);
				},
				Err(e) => return Err(e),
			}
		}

		Err(Id3v2ErrorKind::BadFieldValue {
			field: "encoding",
			reason: "text can't be represented in any encoding",
		}
		.into())
	}

	fn encode_with(&self, encoding: Option<TextEncoding>) -> Result<Vec<u8>> {
		let ctx = FieldContext {
			encoding,
			fields: self.schema.fields,
			values: &self.values,
		};

		let mut body = Vec::new();
		for (field, value) in self.schema.fields.iter().zip(&self.values) {
			if let (FieldSpec::Encoding, Some(encoding)) = (field.spec, encoding) {
				body.push(encoding as u8);
				continue;
			}

			match value {
				Some(value) => field.spec.encode(field.name, value, &ctx, &mut body)?,
				// Optional fields only ever trail
				None if field.optional => break,
				None => id3v2_err!(BadFieldValue {
					field: field.name,
					reason: "missing value"
				}),
			}
		}

		Ok(body)
	}
}

impl PartialEq for Frame {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
			&& self.schema.id == other.schema.id
			&& self.is_error() == other.is_error()
			&& self.values == other.values
	}
}

impl Debug for Frame {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let mut s = f.debug_struct("Frame");
		s.field("id", &self.id).field("flags", &self.flags);

		if let Some(error) = &self.error {
			s.field("error", error);
		}

		for (field, value) in self.schema.fields.iter().zip(&self.values) {
			match value {
				Some(FieldValue::Binary(data)) if data.len() > 32 => {
					s.field(field.name, &format_args!("<{} bytes>", data.len()))
				},
				_ => s.field(field.name, value),
			};
		}

		s.finish()
	}
}
