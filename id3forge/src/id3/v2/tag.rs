
use super::frame::Frame;
use super::frame::id::FrameId;
use super::header::{Id3v2TagFlags, Id3v2Version};
use super::read::read_from;
use super::write::order::FrameOrder;
use super::write::{Padding, create_tag};
use crate::config::{ParseOptions, WriteOptions};
use crate::error::{Diagnostics, Id3Error, Result, Warning};
use crate::id3::find_id3v2;
use crate::util::io::{FileLike, Length, Truncate, replace_region, replace_region_in_path};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// The default amount of padding added to a tag
pub const DEFAULT_PADDING: u32 = 1024;

/// The default limit on padding kept to fit a tag into its old space
pub const DEFAULT_MAX_PADDING: u32 = 10240;

/// An ID3v2 tag
///
/// A tag is an ordered collection of [`Frame`]s, along with the version it will be written as.
/// Frames are kept as they were inserted (or read), and only converted, merged, and sorted when
/// the tag is encoded. See [`Id3v2Tag::encode_with_order`].
///
/// ## Equality
///
/// Two tags are equal when they have the same version, and the frames for each ID compare equal
/// in order. The relative order of frames with different IDs, the flags, and any warnings are
/// ignored.
///
/// # Examples
///
/// ```rust
/// use id3forge::id3::v2::{Frame, Id3v2Tag, Id3v2Version};
///
/// # fn main() -> id3forge::error::Result<()> {
/// let mut tag = Id3v2Tag::new(Id3v2Version::V4);
/// tag.insert(Frame::text("TIT2", ["Title"])?);
/// tag.insert(Frame::text("TPE1", ["Artist"])?);
///
/// let bytes = tag.encode(None)?;
/// let decoded = Id3v2Tag::decode(&bytes)?;
/// assert_eq!(decoded.get_first("TIT2").unwrap().text_values(), ["Title"]);
///
/// // The frames now have an encoding, picked as they were written
/// assert_ne!(decoded, tag);
/// assert_eq!(Id3v2Tag::decode(&decoded.encode(None)?)?, decoded);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Id3v2Tag {
	version: Id3v2Version,
	flags: Id3v2TagFlags,
	frames: Vec<Frame>,
	pub(crate) size: u64,
	pub(crate) extended_padding_size: Option<u32>,
	pub(crate) crc: Option<u32>,
	pub(crate) warnings: Vec<Warning>,
	/// Padding added when the tag doesn't fit in its previous space
	///
	/// Defaults to [`DEFAULT_PADDING`].
	pub padding_default: u32,
	/// The most padding kept in order to fill the tag's previous space
	///
	/// `0` disables padding entirely. Defaults to [`DEFAULT_MAX_PADDING`].
	pub padding_max: u32,
}

impl Default for Id3v2Tag {
	fn default() -> Self {
		Self::new(Id3v2Version::V4)
	}
}

impl IntoIterator for Id3v2Tag {
	type Item = Frame;
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		self.frames.into_iter()
	}
}

impl<'a> IntoIterator for &'a Id3v2Tag {
	type Item = &'a Frame;
	type IntoIter = std::slice::Iter<'a, Frame>;

	fn into_iter(self) -> Self::IntoIter {
		self.frames.iter()
	}
}

impl Id3v2Tag {
	/// Create a new empty tag
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::id3::v2::{Id3v2Tag, Id3v2Version};
	///
	/// let tag = Id3v2Tag::new(Id3v2Version::V3);
	/// assert!(tag.is_empty());
	/// assert_eq!(tag.version(), Id3v2Version::V3);
	/// ```
	pub fn new(version: Id3v2Version) -> Self {
		Self {
			version,
			flags: Id3v2TagFlags::default(),
			frames: Vec::new(),
			size: 0,
			extended_padding_size: None,
			crc: None,
			warnings: Vec::new(),
			padding_default: DEFAULT_PADDING,
			padding_max: DEFAULT_MAX_PADDING,
		}
	}

	/// Decode a tag from the start of `bytes`
	///
	/// # Errors
	///
	/// See [`read_from`](crate::id3::v2::read_from)
	pub fn decode(bytes: &[u8]) -> Result<Self> {
		Self::decode_with_options(bytes, ParseOptions::new())
	}

	/// Decode a tag from the start of `bytes`, with the provided [`ParseOptions`]
	///
	/// # Errors
	///
	/// See [`read_from`](crate::id3::v2::read_from)
	pub fn decode_with_options(mut bytes: &[u8], parse_options: ParseOptions) -> Result<Self> {
		read_from(&mut bytes, parse_options)
	}

	/// A copy of the tag, to be written as `version`
	///
	/// Frames are converted when the tag is encoded, any that have no equivalent in `version`
	/// are dropped then.
	pub fn with_version(&self, version: Id3v2Version) -> Self {
		Self {
			version,
			..self.clone()
		}
	}

	/// The version the tag is written as
	pub fn version(&self) -> Id3v2Version {
		self.version
	}

	/// Returns the [`Id3v2TagFlags`]
	pub fn flags(&self) -> &Id3v2TagFlags {
		&self.flags
	}

	/// Returns a mutable reference to the [`Id3v2TagFlags`]
	pub fn flags_mut(&mut self) -> &mut Id3v2TagFlags {
		&mut self.flags
	}

	/// The total size of the tag when it was read, including the header and padding
	///
	/// This is `0` for tags that weren't read.
	pub fn size(&self) -> u64 {
		self.size
	}

	/// The warnings raised while reading the tag
	pub fn warnings(&self) -> &[Warning] {
		&self.warnings
	}

	/// The CRC-32 stored in the extended header, if any
	///
	/// This is not verified.
	pub fn crc(&self) -> Option<u32> {
		self.crc
	}

	/// The padding size stored in an ID3v2.3 extended header
	pub fn extended_padding_size(&self) -> Option<u32> {
		self.extended_padding_size
	}
}

impl Id3v2Tag {
	/// Append a frame
	///
	/// This never replaces existing frames, even for IDs that don't allow duplicates. Those are
	/// resolved when the tag is encoded. See [`Id3v2Tag::set`] to replace frames.
	pub fn insert(&mut self, frame: Frame) {
		self.frames.push(frame);
	}

	/// Replace every frame with the same ID as `frame`
	///
	/// The new frame takes the place of the first one it replaces.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::id3::v2::{Frame, Id3v2Tag};
	///
	/// # fn main() -> id3forge::error::Result<()> {
	/// let mut tag = Id3v2Tag::default();
	/// tag.insert(Frame::text("TIT2", ["One"])?);
	/// tag.insert(Frame::text("TIT2", ["Two"])?);
	///
	/// tag.set(Frame::text("TIT2", ["Three"])?);
	/// assert_eq!(tag.len(), 1);
	/// assert_eq!(tag.get_first("TIT2").unwrap().text_values(), ["Three"]);
	/// # Ok(()) }
	/// ```
	pub fn set(&mut self, frame: Frame) {
		let position = self.frames.iter().position(|f| f.id() == frame.id());

		let id = frame.id().clone();
		self.frames.retain(|f| *f.id() != id);

		match position {
			Some(position) => self.frames.insert(position, frame),
			None => self.frames.push(frame),
		}
	}

	/// Every frame with an ID
	pub fn get<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Frame> + 'a {
		self.frames.iter().filter(move |f| f.id_str() == id)
	}

	/// The first frame with an ID
	pub fn get_first(&self, id: &str) -> Option<&Frame> {
		self.frames.iter().find(|f| f.id_str() == id)
	}

	/// The first frame with an ID, mutably
	pub fn get_first_mut(&mut self, id: &str) -> Option<&mut Frame> {
		self.frames.iter_mut().find(|f| f.id_str() == id)
	}

	/// Remove every frame with an ID, returning them
	pub fn remove(&mut self, id: &str) -> Vec<Frame> {
		let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.frames)
			.into_iter()
			.partition(|f| f.id_str() == id);

		self.frames = kept;
		removed
	}

	/// Retains [`Frame`]s by evaluating the predicate
	pub fn retain<P>(&mut self, predicate: P)
	where
		P: FnMut(&Frame) -> bool,
	{
		self.frames.retain(predicate)
	}

	/// All frames, in insertion order
	pub fn frames(&self) -> impl Iterator<Item = &Frame> {
		self.frames.iter()
	}

	/// All frames, mutably
	pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
		self.frames.iter_mut()
	}

	/// Every distinct frame ID, in order of first appearance
	pub fn frame_ids(&self) -> Vec<&FrameId> {
		let mut ids: Vec<&FrameId> = Vec::new();
		for frame in &self.frames {
			if !ids.contains(&frame.id()) {
				ids.push(frame.id());
			}
		}

		ids
	}

	/// The number of frames
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Whether the tag has no frames
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Remove every frame
	pub fn clear(&mut self) {
		self.frames.clear();
	}
}

impl Id3v2Tag {
	/// Encode the tag using the [default frame order](FrameOrder::default)
	///
	/// `size_hint` is the size of the tag being replaced. When the new tag is smaller, it is
	/// padded to the same size as long as that takes no more than
	/// [`padding_max`](Id3v2Tag::padding_max) bytes. Otherwise,
	/// [`padding_default`](Id3v2Tag::padding_default) bytes of padding are added.
	///
	/// # Errors
	///
	/// * A frame can't be encoded (ex. a required field is missing)
	/// * The tag is too large to be stored
	pub fn encode(&self, size_hint: Option<u64>) -> Result<Vec<u8>> {
		self.encode_with_warnings(size_hint).map(|(bytes, _)| bytes)
	}

	/// Encode the tag, also returning the warnings raised
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::encode`]
	pub fn encode_with_warnings(&self, size_hint: Option<u64>) -> Result<(Vec<u8>, Vec<Warning>)> {
		self.encode_with_order(size_hint, &FrameOrder::default())
	}

	/// Encode the tag with a custom frame order
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::encode`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::error::Warning;
	/// use id3forge::id3::v2::{Frame, FrameId, FrameOrder, Id3v2Tag};
	///
	/// # fn main() -> id3forge::error::Result<()> {
	/// let mut tag = Id3v2Tag::default();
	/// tag.insert(Frame::text("TPE1", ["Artist"])?);
	/// tag.insert(Frame::text("TIT2", ["Title"])?);
	/// tag.insert(Frame::text("TIT2", ["Another title"])?);
	///
	/// let order = FrameOrder::new(["TPE1", "TIT2"])?;
	/// let (bytes, warnings) = tag.encode_with_order(None, &order)?;
	///
	/// // Duplicate text frames are merged
	/// assert_eq!(warnings, [Warning::DuplicateFrame(FrameId::new("TIT2")?)]);
	///
	/// let decoded = Id3v2Tag::decode(&bytes)?;
	/// assert_eq!(
	/// 	decoded.get_first("TIT2").unwrap().text_values(),
	/// 	["Title", "Another title"]
	/// );
	/// # Ok(()) }
	/// ```
	pub fn encode_with_order(
		&self,
		size_hint: Option<u64>,
		order: &FrameOrder,
	) -> Result<(Vec<u8>, Vec<Warning>)> {
		self.encode_padded(order, self.padding(size_hint, WriteOptions::new()))
	}

	fn padding(&self, size_hint: Option<u64>, write_options: WriteOptions) -> Padding {
		Padding {
			size_hint,
			default: write_options.padding_default.unwrap_or(self.padding_default),
			max: write_options.padding_max.unwrap_or(self.padding_max),
		}
	}

	fn encode_padded(&self, order: &FrameOrder, padding: Padding) -> Result<(Vec<u8>, Vec<Warning>)> {
		let mut diagnostics = Diagnostics::default();
		let bytes = create_tag(self, order, padding, &mut diagnostics)?;
		Ok((bytes, diagnostics.into_inner()))
	}

	/// Encode the tag, and write it to `writer`
	///
	/// # Errors
	///
	/// * See [`Id3v2Tag::encode`]
	/// * [`std::io::Error`]
	pub fn dump_to<W: Write>(&self, writer: &mut W, write_options: WriteOptions) -> Result<()> {
		let (bytes, _) =
			self.encode_padded(&FrameOrder::default(), self.padding(None, write_options))?;
		writer.write_all(&bytes)?;
		Ok(())
	}
}

impl Id3v2Tag {
	/// Write the tag to the start of the file at `path`, replacing any existing tag
	///
	/// # Errors
	///
	/// * `path` can't be opened or written
	/// * The existing tag is malformed
	/// * See [`Id3v2Tag::encode`]
	pub fn save_to_path(&self, path: impl AsRef<Path>, write_options: WriteOptions) -> Result<()> {
		let path = path.as_ref();
		let existing = existing_tag_len(&mut File::open(path)?)?;

		let bytes = self.encode_for_save(existing, write_options)?;
		replace_region_in_path(path, 0, existing, &bytes, write_options.in_place)
	}

	/// Write the tag to the start of `file`, replacing any existing tag
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::save_to_path`]
	pub fn save_to<F>(&self, file: &mut F, write_options: WriteOptions) -> Result<()>
	where
		F: FileLike,
		Id3Error: From<<F as Truncate>::Error>,
		Id3Error: From<<F as Length>::Error>,
	{
		let existing = existing_tag_len(file)?;

		let bytes = self.encode_for_save(existing, write_options)?;
		replace_region(file, 0, existing, &bytes)
	}

	fn encode_for_save(&self, existing: u64, write_options: WriteOptions) -> Result<Vec<u8>> {
		let size_hint = (existing > 0).then_some(existing);
		let (bytes, _) =
			self.encode_padded(&FrameOrder::default(), self.padding(size_hint, write_options))?;

		log::debug!(
			"Replacing {existing} byte tag with {} bytes",
			bytes.len()
		);

		Ok(bytes)
	}

	/// Remove the tag from the start of the file at `path`
	///
	/// Returns whether a tag was found.
	///
	/// # Errors
	///
	/// * `path` can't be opened or written
	/// * The existing tag is malformed
	pub fn remove_from_path(path: impl AsRef<Path>) -> Result<bool> {
		let path = path.as_ref();
		let existing = existing_tag_len(&mut File::open(path)?)?;
		if existing == 0 {
			return Ok(false);
		}

		replace_region_in_path(path, 0, existing, &[], true)?;
		Ok(true)
	}

	/// Remove the tag from the start of `file`
	///
	/// Returns whether a tag was found.
	///
	/// # Errors
	///
	/// See [`Id3v2Tag::remove_from_path`]
	pub fn remove_from<F>(file: &mut F) -> Result<bool>
	where
		F: FileLike,
		Id3Error: From<<F as Truncate>::Error>,
		Id3Error: From<<F as Length>::Error>,
	{
		let existing = existing_tag_len(file)?;
		if existing == 0 {
			return Ok(false);
		}

		replace_region(file, 0, existing, &[])?;
		Ok(true)
	}
}

// The length of the tag at the start of the file, capped to the file length
fn existing_tag_len<R>(file: &mut R) -> Result<u64>
where
	R: Read + Seek,
{
	file.rewind()?;
	let len = match find_id3v2(file) {
		Ok(len) => len,
		Err(e) if e.is_no_tag() => 0,
		Err(e) => return Err(e),
	};

	let file_len = file.seek(SeekFrom::End(0))?;
	file.rewind()?;

	Ok(len.min(file_len))
}

impl PartialEq for Id3v2Tag {
	fn eq(&self, other: &Self) -> bool {
		fn by_id(tag: &Id3v2Tag) -> BTreeMap<&FrameId, Vec<&Frame>> {
			let mut frames: BTreeMap<_, Vec<_>> = BTreeMap::new();
			for frame in &tag.frames {
				frames.entry(frame.id()).or_default().push(frame);
			}

			frames
		}

		self.version == other.version && by_id(self) == by_id(other)
	}
}
