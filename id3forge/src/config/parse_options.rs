/// Options to control how id3forge parses a tag
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) detect_itunes_frame_sizes: bool,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	parsing_mode: ParsingMode::BestAttempt,
	/// 	detect_itunes_frame_sizes: false,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			detect_itunes_frame_sizes: false,
		}
	}

	/// The parsing mode to use, see [`ParsingMode`] for details
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::config::{ParseOptions, ParsingMode};
	///
	/// // By default, `parsing_mode` is ParsingMode::BestAttempt. Here, we need absolute correctness.
	/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	/// ```
	pub fn parsing_mode(&mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		*self
	}

	/// Whether to check ID3v2.4 tags for plain 8-bit frame sizes
	///
	/// ID3v2.4 frame sizes are syncsafe, but some versions of iTunes wrote them as plain
	/// integers. With this enabled, the frames are walked under both interpretations, and the one
	/// producing more well-formed frames wins.
	///
	/// This is a heuristic, and it can pick the wrong interpretation for a well-formed tag with
	/// unlucky frame sizes, which is why it is disabled by default.
	///
	/// # Examples
	///
	/// ```rust
	/// use id3forge::config::ParseOptions;
	///
	/// // My library was tagged by an old version of iTunes
	/// let parsing_options = ParseOptions::new().detect_itunes_frame_sizes(true);
	/// ```
	pub fn detect_itunes_frame_sizes(&mut self, detect_itunes_frame_sizes: bool) -> Self {
		self.detect_itunes_frame_sizes = detect_itunes_frame_sizes;
		*self
	}
}

/// The parsing strictness mode
///
/// # Examples
///
/// ```rust,no_run
/// use id3forge::config::{ParseOptions, ParsingMode};
/// use id3forge::id3::v2::read_from_path;
///
/// # fn main() -> id3forge::error::Result<()> {
/// // We only want to read spec-compliant inputs
/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
/// let tag = read_from_path("foo.mp3", parsing_options)?;
/// # Ok(()) }
/// ```
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Will eagerly error on invalid input
	///
	/// A frame that fails to decode fails the entire read, rather than being kept as an
	/// error frame.
	Strict,
	/// Default mode, less eager to error on recoverably malformed input
	///
	/// Frames that fail to decode are kept as error frames, holding their raw data. A frame
	/// claiming more data than the tag holds ends the frame stream.
	#[default]
	BestAttempt,
	/// Least eager to error, may produce invalid/partial output
	///
	/// In addition to [`ParsingMode::BestAttempt`], a non-zero revision byte is accepted, and a
	/// frame claiming more data than the tag holds is decoded from whatever remains.
	Relaxed,
}
