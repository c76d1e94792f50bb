use crate::error::Result;
use crate::id3::v2::{Frame, FrameId};

use std::fmt::{Debug, Formatter};
use std::sync::OnceLock;

use regex::Regex;

const DEFAULT_ORDER: &[&str] = &[
	"TIT2", "TPE1", "TALB", "TRCK", "TCOM", "TPOS", "TDRC", "TYER", "TRDA", "TDAT", "TIME", "T.*",
	"COMM", "W.*", "TXXX", "WXXX", "UFID", "PCNT", "POPM", "APIC", "PIC", "GEOB", "PRIV", ".*",
];

#[derive(Clone)]
enum Pattern {
	Frame(String),
	Regex(Regex),
}

impl Pattern {
	fn compile(pattern: &str) -> Result<Self> {
		if FrameId::is_valid(pattern.as_bytes()) {
			return Ok(Self::Frame(pattern.to_owned()));
		}

		Ok(Self::Regex(Regex::new(&format!("^(?:{pattern})$"))?))
	}
}

impl Debug for Pattern {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Frame(id) => f.write_str(id),
			Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
		}
	}
}

/// The order frames are written in
///
/// A `FrameOrder` is a list of patterns, each either a frame ID, or a regular expression matched
/// against the whole ID. A frame is placed by the first pattern it matches, with exact IDs
/// taking precedence over expressions. ID3v2.2 frames also match the ID of their ID3v2.3/4
/// counterpart. Frames matching nothing go last, and ties keep the order the frames were in.
///
/// # Examples
///
/// ```rust
/// use id3forge::id3::v2::{Frame, FrameOrder};
///
/// # fn main() -> id3forge::error::Result<()> {
/// let order = FrameOrder::new(["TIT2", "T.*", "TXXX"])?;
///
/// let title = Frame::text("TIT2", ["Title"])?;
/// let artist = Frame::text("TPE1", ["Artist"])?;
/// let picture = Frame::new("APIC")?;
///
/// assert!(order.key(&title) < order.key(&artist));
/// assert!(order.key(&artist) < order.key(&picture));
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct FrameOrder {
	patterns: Vec<Pattern>,
}

impl FrameOrder {
	/// Create a `FrameOrder` from a list of patterns
	///
	/// # Errors
	///
	/// A pattern is neither a frame ID nor a valid regular expression
	pub fn new<I, S>(patterns: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|p| Pattern::compile(p.as_ref()))
			.collect::<Result<Vec<_>>>()?;

		Ok(Self { patterns })
	}

	/// The sort key of `frame`, lower keys are written first
	pub fn key(&self, frame: &Frame) -> usize {
		let id = frame.id_str();
		let exact = |target: &str| {
			self.patterns
				.iter()
				.position(|p| matches!(p, Pattern::Frame(pattern) if pattern == target))
		};

		exact(id)
			.or_else(|| frame.schema().v22_parent().and_then(exact))
			.or_else(|| {
				self.patterns
					.iter()
					.position(|p| matches!(p, Pattern::Regex(regex) if regex.is_match(id)))
			})
			.unwrap_or(self.patterns.len())
	}

	/// Stable sort `frames` by their keys
	pub(crate) fn sort(&self, frames: &mut [Frame]) {
		frames.sort_by_cached_key(|frame| self.key(frame));
	}
}

impl Default for FrameOrder {
	/// Common frames first, in roughly the order a person would look for them, then everything
	/// else
	fn default() -> Self {
		static DEFAULT: OnceLock<FrameOrder> = OnceLock::new();
		DEFAULT
			.get_or_init(|| {
				let patterns = DEFAULT_ORDER
					.iter()
					.filter_map(|p| match Pattern::compile(p) {
						Ok(pattern) => Some(pattern),
						Err(e) => {
							log::error!("Skipping frame order pattern {p:?}: {e}");
							None
						},
					})
					.collect();

				FrameOrder { patterns }
			})
			.clone()
	}
}
