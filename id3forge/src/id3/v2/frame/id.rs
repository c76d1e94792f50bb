use crate::error::{Id3Error, Id3v2ErrorKind, Result};
use crate::id3::v2::Id3v2Version;

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// An ID3v2 frame ID
///
/// ID3v2.2 IDs are 3 characters long, ID3v2.3 and ID3v2.4 IDs are 4 characters long.
/// The first character must be an uppercase letter, and the rest uppercase letters or digits.
///
/// A single trailing space is tolerated on 4 character IDs, as some encoders pad 3 character IDs
/// that way.
#[derive(PartialEq, Clone, Debug, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(Cow<'static, str>);

impl FrameId {
	/// Attempts to create a `FrameId` from an ID string
	///
	/// # Errors
	///
	/// * `id` contains invalid characters
	/// * `id` is an invalid length (must be 3 or 4)
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::id3::v2::FrameId;
	///
	/// # fn main() -> id3forge::error::Result<()> {
	/// let title = FrameId::new("TIT2")?;
	/// assert_eq!(title.as_str(), "TIT2");
	///
	/// assert!(FrameId::new("tit2").is_err());
	/// # Ok(()) }
	/// ```
	pub fn new<I>(id: I) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
	{
		let id = id.into();
		if !Self::is_valid(id.as_bytes()) {
			return Err(Id3v2ErrorKind::BadFrameId(id.as_bytes().to_vec()).into());
		}

		Ok(Self(id))
	}

	pub(crate) const fn from_static(id: &'static str) -> Self {
		Self(Cow::Borrowed(id))
	}

	/// Parse an ID straight from a frame header
	pub(crate) fn from_bytes(id: &[u8]) -> Result<Self> {
		if !Self::is_valid(id) {
			return Err(Id3Error::from(Id3v2ErrorKind::BadFrameId(id.to_vec())));
		}

		// Only ASCII made it through
		let id = id.iter().map(|b| *b as char).collect::<String>();
		Ok(Self(Cow::Owned(id)))
	}

	/// Whether `id` matches `[A-Z][A-Z0-9]{2}[A-Z0-9 ]?`
	pub(crate) fn is_valid(id: &[u8]) -> bool {
		let valid_rest = |c: &u8| c.is_ascii_uppercase() || c.is_ascii_digit();

		match id {
			[first, rest @ ..] if first.is_ascii_uppercase() => match rest {
				[a, b] => valid_rest(a) && valid_rest(b),
				[a, b, last] => valid_rest(a) && valid_rest(b) && (valid_rest(last) || *last == b' '),
				_ => false,
			},
			_ => false,
		}
	}

	/// Extracts the string from the ID
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Whether this ID has the length used by `version`
	pub fn fits(&self, version: Id3v2Version) -> bool {
		match version {
			Id3v2Version::V2 => self.0.len() == 3,
			Id3v2Version::V3 | Id3v2Version::V4 => self.0.len() == 4,
		}
	}

	/// Consumes the [`FrameId`], returning the inner value
	pub fn into_inner(self) -> Cow<'static, str> {
		self.0
	}
}

impl Display for FrameId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl AsRef<str> for FrameId {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl PartialEq<str> for FrameId {
	fn eq(&self, other: &str) -> bool {
		self.as_str() == other
	}
}

impl PartialEq<&str> for FrameId {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == *other
	}
}

impl TryFrom<&'static str> for FrameId {
	type Error = Id3Error;

	fn try_from(value: &'static str) -> Result<Self> {
		Self::new(value)
	}
}
