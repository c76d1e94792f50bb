//! The frame schema table
//!
//! Built once, on first use, from the static declarations below. ID3v2.2 frames that share a
//! layout with their ID3v2.3/4 counterpart are declared as aliases, and copy the parent's schema.

use super::field::{Field, FieldSpec as S};
use super::schema::{FrameKind, FrameSchema, GENERIC_BINARY, GENERIC_TEXT, GENERIC_URL, VersionSet};

use std::collections::HashMap;
use std::sync::OnceLock;

const fn f(name: &'static str, spec: S) -> Field {
	Field::new(name, spec)
}

const ENCODING: Field = f("encoding", S::Encoding);
const LANG: Field = f("lang", S::FixedString(3));
const DESC: Field = f("desc", S::EncodedString);
const OWNER: Field = f("owner", S::Latin1String);
const DATA: Field = f("data", S::Binary);

#[rustfmt::skip]
static SCHEMAS: &[FrameSchema] = &[
	FrameSchema::new("UFID", "Unique file identifier", &[OWNER, DATA]).duplicates(),

	// Text information frames
	FrameSchema::text("TIT1", "Content group description"),
	FrameSchema::text("TIT2", "Title/songname/content description"),
	FrameSchema::text("TIT3", "Subtitle/Description refinement"),
	FrameSchema::text("TALB", "Album/Movie/Show title"),
	FrameSchema::text("TOAL", "Original album/movie/show title"),
	FrameSchema::text("TRCK", "Track number/Position in set"),
	FrameSchema::text("TPOS", "Part of a set"),
	FrameSchema::text("TSST", "Set subtitle").only(VersionSet::V4),
	FrameSchema::text("TSRC", "International Standard Recording Code (ISRC)"),
	FrameSchema::text("TPE1", "Lead artist/Lead performer/Soloist/Performing group"),
	FrameSchema::text("TPE2", "Band/Orchestra/Accompaniment"),
	FrameSchema::text("TPE3", "Conductor"),
	FrameSchema::text("TPE4", "Interpreted, remixed, or otherwise modified by"),
	FrameSchema::text("TOPE", "Original artist/performer"),
	FrameSchema::text("TEXT", "Lyricist/Text writer"),
	FrameSchema::text("TOLY", "Original lyricist/text writer"),
	FrameSchema::text("TCOM", "Composer"),
	FrameSchema::credits("TMCL", "Musician credits list").only(VersionSet::V4),
	FrameSchema::credits("TIPL", "Involved people list").only(VersionSet::V4),
	FrameSchema::text("TENC", "Encoded by"),
	FrameSchema::text("TBPM", "BPM"),
	FrameSchema::text("TLEN", "Length"),
	FrameSchema::text("TKEY", "Initial key"),
	FrameSchema::text("TLAN", "Language"),
	FrameSchema::text("TCON", "Content type"),
	FrameSchema::text("TFLT", "File type"),
	FrameSchema::text("TMED", "Media type"),
	FrameSchema::text("TMOO", "Mood").only(VersionSet::V4),
	FrameSchema::text("TCOP", "Copyright message"),
	FrameSchema::text("TPRO", "Produced notice").only(VersionSet::V4),
	FrameSchema::text("TPUB", "Publisher"),
	FrameSchema::text("TOWN", "File owner/licensee"),
	FrameSchema::text("TRSN", "Internet radio station name"),
	FrameSchema::text("TRSO", "Internet radio station owner"),
	FrameSchema::text("TOFN", "Original filename"),
	FrameSchema::text("TDLY", "Playlist delay"),
	FrameSchema::text("TDEN", "Encoding time").only(VersionSet::V4),
	FrameSchema::text("TDOR", "Original release time").only(VersionSet::V4),
	FrameSchema::text("TDRC", "Recording time").only(VersionSet::V4),
	FrameSchema::text("TDTG", "Tagging time").only(VersionSet::V4),
	FrameSchema::text("TSSE", "Software/Hardware and settings used for encoding"),
	FrameSchema::text("TSOA", "Album sort order").only(VersionSet::V4),
	FrameSchema::text("TSOP", "Performer sort order").only(VersionSet::V4),
	FrameSchema::text("TSOT", "Title sort order").only(VersionSet::V4),
	FrameSchema::new("TXXX", "User defined text information frame", &[
		ENCODING,
		DESC,
		f("value", S::EncodedString),
	]).duplicates(),

	// URL link frames
	FrameSchema::url("WCOM", "Commercial information").duplicates(),
	FrameSchema::url("WCOP", "Copyright/Legal information"),
	FrameSchema::url("WOAF", "Official audio file webpage"),
	FrameSchema::url("WOAR", "Official artist/performer webpage").duplicates(),
	FrameSchema::url("WOAS", "Official audio source webpage"),
	FrameSchema::url("WORS", "Official internet radio station homepage"),
	FrameSchema::url("WPAY", "Payment"),
	FrameSchema::url("WPUB", "Publishers official webpage"),
	FrameSchema::new("WXXX", "User defined URL link frame", &[
		ENCODING,
		DESC,
		f("url", S::Url),
	]).duplicates(),

	// Everything else
	FrameSchema::new("MCDI", "Music CD identifier", &[f("cd_toc", S::Binary)]),
	FrameSchema::new("ETCO", "Event timing codes", &[
		f("format", S::Byte),
		f("events", S::Records(&[S::Byte, S::Int(4)])),
	]).untested().bozo(),
	FrameSchema::new("MLLT", "MPEG location lookup table", &[
		f("frames", S::Int(2)),
		f("bytes", S::Int(3)),
		f("milliseconds", S::Int(3)),
		f("bits_for_bytes", S::Byte),
		f("bits_for_milliseconds", S::Byte),
		DATA,
	]).untested().bozo(),
	FrameSchema::new("SYTC", "Synchronised tempo codes", &[f("format", S::Byte), DATA])
		.untested()
		.bozo(),
	FrameSchema::new("USLT", "Unsynchronised lyric/text transcription", &[
		ENCODING,
		LANG,
		DESC,
		f("text", S::EncodedString),
	]).duplicates().untested(),
	FrameSchema::new("SYLT", "Synchronised lyric/text", &[
		ENCODING,
		LANG,
		f("format", S::Byte),
		f("type", S::Byte),
		DESC,
		f("data", S::Records(&[S::EncodedString, S::Int(4)])),
	]).duplicates().untested().bozo(),
	FrameSchema::new("COMM", "Comments", &[ENCODING, LANG, DESC, f("text", S::EncodedString)])
		.duplicates(),
	FrameSchema::new("RVA2", "Relative volume adjustment (2)", &[
		f("desc", S::Latin1String),
		f("adjustment", S::Records(&[S::Byte, S::SignedInt(2), S::VarInt])),
	]).only(VersionSet::V4).duplicates().untested(),
	FrameSchema::new("EQU2", "Equalisation (2)", &[
		f("method", S::Byte),
		f("desc", S::Latin1String),
		f("adjustments", S::Records(&[S::Int(2), S::SignedInt(2)])),
	]).only(VersionSet::V4).duplicates().untested().bozo(),
	FrameSchema::new("RVRB", "Reverb", &[
		f("left", S::Int(2)),
		f("right", S::Int(2)),
		f("bounce_left", S::Byte),
		f("bounce_right", S::Byte),
		f("feedback_ltl", S::Byte),
		f("feedback_ltr", S::Byte),
		f("feedback_rtr", S::Byte),
		f("feedback_rtl", S::Byte),
		f("premix_ltr", S::Byte),
		f("premix_rtl", S::Byte),
	]).untested().bozo(),
	FrameSchema::new("APIC", "Attached picture", &[
		ENCODING,
		f("mime", S::Latin1String),
		f("type", S::Byte),
		DESC,
		DATA,
	]).of_kind(FrameKind::Picture).duplicates(),
	FrameSchema::new("GEOB", "General encapsulated object", &[
		ENCODING,
		f("mime", S::Latin1String),
		f("filename", S::EncodedString),
		DESC,
		DATA,
	]).duplicates(),
	FrameSchema::new("PCNT", "Play counter", &[f("count", S::Int(4))]),
	FrameSchema::new("POPM", "Popularimeter", &[
		f("email", S::Latin1String),
		f("rating", S::Byte),
		f("count", S::Int(4)),
	]).duplicates(),
	FrameSchema::new("RBUF", "Recommended buffer size", &[
		f("size", S::Int(4)),
		f("info", S::Byte).optional(),
		f("offset", S::Int(4)).optional(),
	]).untested().bozo(),
	FrameSchema::new("AENC", "Audio encryption", &[
		OWNER,
		f("preview_start", S::Int(2)),
		f("preview_length", S::Int(2)),
		DATA,
	]).duplicates().untested().bozo(),
	FrameSchema::new("LINK", "Linked information", &[
		f("linked_frameid", S::FixedString(4)),
		f("url", S::Latin1String),
		f("data", S::Binary).optional(),
	]).duplicates().untested().bozo(),
	FrameSchema::new("POSS", "Position synchronisation frame", &[
		f("format", S::Byte),
		f("position", S::Int(4)),
	]).untested().bozo(),
	FrameSchema::new("USER", "Terms of use", &[ENCODING, LANG, f("text", S::EncodedString)])
		.duplicates(),
	FrameSchema::new("OWNE", "Ownership frame", &[
		ENCODING,
		f("price", S::Latin1String),
		f("date", S::FixedString(8)),
		f("seller", S::EncodedString),
	]).untested().bozo(),
	FrameSchema::new("COMR", "Commercial frame", &[
		ENCODING,
		f("price", S::Latin1String),
		f("valid", S::FixedString(8)),
		f("contact", S::Latin1String),
		f("format", S::Byte),
		f("seller", S::EncodedString),
		DESC,
		f("mime", S::Latin1String),
		f("logo", S::Binary),
	]).duplicates().untested().bozo(),
	FrameSchema::new("ENCR", "Encryption method registration", &[
		OWNER,
		f("symbol", S::Byte),
		DATA,
	]).duplicates().untested().bozo(),
	FrameSchema::new("GRID", "Group identification registration", &[
		OWNER,
		f("symbol", S::Byte),
		DATA,
	]).duplicates().untested().bozo(),
	FrameSchema::new("PRIV", "Private frame", &[OWNER, DATA]).duplicates(),
	FrameSchema::new("SIGN", "Signature frame", &[f("group", S::Byte), DATA])
		.only(VersionSet::V4)
		.duplicates()
		.untested()
		.bozo(),
	FrameSchema::new("SEEK", "Seek frame", &[f("offset", S::Int(4))])
		.only(VersionSet::V4)
		.untested()
		.bozo(),
	FrameSchema::new("ASPI", "Audio seek point index", &[
		f("data_start", S::Int(4)),
		f("data_length", S::Int(4)),
		f("index_points", S::Int(2)),
		f("bits_per_index", S::Byte),
		f("fractions", S::IndexList { count: "index_points", bits: "bits_per_index" }),
	]).only(VersionSet::V4).untested().bozo(),

	// Frames retired in ID3v2.4
	FrameSchema::text("TYER", "Year").only(VersionSet::V3),
	FrameSchema::text("TDAT", "Date").only(VersionSet::V3),
	FrameSchema::text("TIME", "Time").only(VersionSet::V3),
	FrameSchema::text("TORY", "Original release year").only(VersionSet::V3),
	FrameSchema::text("TRDA", "Recording dates").only(VersionSet::V3),
	FrameSchema::text("TSIZ", "Size").only(VersionSet::V3),
	FrameSchema::credits("IPLS", "Involved people list")
		.only(VersionSet::V3)
		.untested()
		.bozo(),
	FrameSchema::new("EQUA", "Equalisation", &[f("bits", S::Byte), DATA])
		.only(VersionSet::V3)
		.untested()
		.bozo(),
	FrameSchema::new("RVAD", "Relative volume adjustment", &[DATA])
		.only(VersionSet::V3)
		.untested()
		.bozo(),

	// Vendor extensions, mostly from iTunes
	FrameSchema::text("TCMP", "iTunes: Part of a compilation").nonstandard(),
	FrameSchema::text("TDES", "iTunes: Podcast description").nonstandard(),
	FrameSchema::text("TGID", "iTunes: Podcast identifier").nonstandard(),
	FrameSchema::text("TDRL", "Release time").nonstandard(),
	FrameSchema::text("TCAT", "iTunes: Podcast category").nonstandard(),
	FrameSchema::text("TKWD", "iTunes: Podcast keywords").nonstandard(),
	FrameSchema::url("WFED", "iTunes: Podcast feed").nonstandard(),
	FrameSchema::new("PCST", "iTunes: Podcast flag", &[f("value", S::Int(4))]).nonstandard(),

	// ID3v2.2 frames that differ from their counterparts
	FrameSchema::new("PIC", "Attached picture", &[
		ENCODING,
		f("format", S::FixedString(3)),
		f("type", S::Byte),
		DESC,
		DATA,
	]).only(VersionSet::V2).of_kind(FrameKind::Picture).parent("APIC").duplicates(),
	FrameSchema::new("CRM", "Encrypted meta frame", &[
		OWNER,
		f("content", S::Latin1String),
		DATA,
	]).only(VersionSet::V2).untested().bozo(),
	FrameSchema::new("LNK", "Linked information", &[
		f("frameid", S::FixedString(3)),
		f("url", S::Latin1String),
		DATA,
	]).only(VersionSet::V2).duplicates().untested().bozo(),
];

/// ID3v2.2 frames with the same layout as their ID3v2.3/4 counterpart
#[rustfmt::skip]
const V22_ALIASES: &[(&str, &str)] = &[
	("UFI", "UFID"),
	("TT1", "TIT1"), ("TT2", "TIT2"), ("TT3", "TIT3"),
	("TP1", "TPE1"), ("TP2", "TPE2"), ("TP3", "TPE3"), ("TP4", "TPE4"),
	("TCM", "TCOM"), ("TXT", "TEXT"), ("TLA", "TLAN"), ("TCO", "TCON"),
	("TAL", "TALB"), ("TPA", "TPOS"), ("TRK", "TRCK"), ("TRC", "TSRC"),
	("TYE", "TYER"), ("TDA", "TDAT"), ("TIM", "TIME"), ("TRD", "TRDA"),
	("TMT", "TMED"), ("TFT", "TFLT"), ("TBP", "TBPM"), ("TCR", "TCOP"),
	("TPB", "TPUB"), ("TEN", "TENC"), ("TSS", "TSSE"), ("TOF", "TOFN"),
	("TLE", "TLEN"), ("TSI", "TSIZ"), ("TDY", "TDLY"), ("TKE", "TKEY"),
	("TOT", "TOAL"), ("TOA", "TOPE"), ("TOL", "TOLY"), ("TOR", "TORY"),
	("TXX", "TXXX"),
	("WAF", "WOAF"), ("WAR", "WOAR"), ("WAS", "WOAS"), ("WCM", "WCOM"),
	("WCP", "WCOP"), ("WPB", "WPUB"), ("WXX", "WXXX"),
	("IPL", "IPLS"), ("MCI", "MCDI"), ("ETC", "ETCO"), ("MLL", "MLLT"),
	("STC", "SYTC"), ("ULT", "USLT"), ("SLT", "SYLT"), ("COM", "COMM"),
	("RVA", "RVAD"), ("EQU", "EQUA"), ("REV", "RVRB"), ("GEO", "GEOB"),
	("CNT", "PCNT"), ("POP", "POPM"), ("BUF", "RBUF"), ("CRA", "AENC"),
	// Vendor extensions
	("TCP", "TCMP"), ("TDS", "TDES"), ("TID", "TGID"), ("TDR", "TDRL"),
	("TCT", "TCAT"), ("TKW", "TKWD"), ("WFD", "WFED"), ("PCS", "PCST"),
];

struct Registry {
	schemas: Vec<FrameSchema>,
	by_id: HashMap<&'static str, usize>,
	/// ID3v2.3/4 ID -> its ID3v2.2 counterpart
	v22_siblings: HashMap<&'static str, usize>,
}

impl Registry {
	fn build() -> Self {
		let mut schemas = SCHEMAS.to_vec();

		for (alias, parent_id) in V22_ALIASES {
			let Some(parent) = SCHEMAS.iter().find(|s| s.id == *parent_id) else {
				log::error!("ID3v2.2 alias {alias} refers to unknown frame {parent_id}");
				continue;
			};

			schemas.push(FrameSchema {
				id: alias,
				versions: VersionSet::V2,
				parent: Some(parent.id),
				..*parent
			});
		}

		let by_id = schemas
			.iter()
			.enumerate()
			.map(|(index, schema)| (schema.id, index))
			.collect::<HashMap<_, _>>();

		let v22_siblings = schemas
			.iter()
			.enumerate()
			.filter_map(|(index, schema)| match schema.parent {
				Some(parent) if schema.versions.is_v2_only() => Some((parent, index)),
				_ => None,
			})
			.collect::<HashMap<_, _>>();

		log::debug!("Registered {} frame schemas", schemas.len());

		Self {
			schemas,
			by_id,
			v22_siblings,
		}
	}

	fn get() -> &'static Self {
		static REGISTRY: OnceLock<Registry> = OnceLock::new();
		REGISTRY.get_or_init(Self::build)
	}
}

/// Look up the schema for a frame ID
///
/// Returns `None` for IDs with no registered schema, see [`resolve`] for the fallbacks used
/// in that case.
///
/// # Examples
///
/// ```rust
/// use id3forge::id3::v2::lookup;
///
/// let comment = lookup("COMM").unwrap();
/// assert!(comment.allows_duplicates());
///
/// let title = lookup("TT2").unwrap();
/// assert_eq!(title.v22_parent(), Some("TIT2"));
///
/// assert!(lookup("ZZZZ").is_none());
/// ```
pub fn lookup(id: &str) -> Option<&'static FrameSchema> {
	let registry = Registry::get();
	registry.by_id.get(id).map(|index| &registry.schemas[*index])
}

/// Look up the schema for a frame ID, falling back to a generic one for unknown IDs
///
/// Unknown `T*` frames are read as text, unknown `W*` frames as URLs, and anything else as
/// binary data. The fallbacks can be told apart with [`FrameSchema::is_generic`].
pub fn resolve(id: &str) -> &'static FrameSchema {
	if let Some(schema) = lookup(id) {
		return schema;
	}

	match id.as_bytes().first() {
		Some(b'T') => &GENERIC_TEXT,
		Some(b'W') => &GENERIC_URL,
		_ => &GENERIC_BINARY,
	}
}

/// The ID3v2.2 counterpart of an ID3v2.3/4 frame
pub(crate) fn v22_sibling(id: &str) -> Option<&'static FrameSchema> {
	let registry = Registry::get();
	registry
		.v22_siblings
		.get(id)
		.map(|index| &registry.schemas[*index])
}

/// Every registered schema
pub fn schemas() -> impl Iterator<Item = &'static FrameSchema> {
	Registry::get().schemas.iter()
}
