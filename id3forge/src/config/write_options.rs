/// Options to control how id3forge writes a tag to a file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) padding_default: Option<u32>,
	pub(crate) padding_max: Option<u32>,
	pub(crate) in_place: bool,
}

impl WriteOptions {
	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			padding_default: None,
			padding_max: None,
			in_place: true,
		}
	}

	/// Override the tag's [`padding_default`](crate::id3::v2::Id3v2Tag::padding_default)
	///
	/// This is the amount of padding added after the frames whenever the tag can't be fit
	/// into the space it previously occupied.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::config::WriteOptions;
	///
	/// // I really don't want my files rewritten, so I'll double the padding size!
	/// let options = WriteOptions::new().padding_default(2048);
	/// ```
	pub fn padding_default(mut self, padding_default: u32) -> Self {
		self.padding_default = Some(padding_default);
		self
	}

	/// Override the tag's [`padding_max`](crate::id3::v2::Id3v2Tag::padding_max)
	///
	/// This is the largest amount of padding that will be kept to avoid rewriting the rest of the
	/// file. A value of `0` forces the tag to be written without any padding.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::config::WriteOptions;
	///
	/// // I don't want padding under any circumstances!
	/// let options = WriteOptions::new().padding_max(0);
	/// ```
	pub fn padding_max(mut self, padding_max: u32) -> Self {
		self.padding_max = Some(padding_max);
		self
	}

	/// Whether to shift the rest of the file in place when the tag changes size
	///
	/// When disabled, the file is instead rewritten into a temporary file in the same directory,
	/// which then replaces the original. This needs enough free space for a second copy of the file,
	/// but the original is never left half-written.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::config::WriteOptions;
	///
	/// let options = WriteOptions::new().in_place(false);
	/// ```
	pub fn in_place(mut self, in_place: bool) -> Self {
		self.in_place = in_place;
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	/// 	padding_default: None, // Use the tag's own policy
	/// 	padding_max: None,
	/// 	in_place: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
