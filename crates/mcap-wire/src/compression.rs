/// Compression algorithms a Chunk record may declare.
///
/// The tag travels on the wire as a string so that writers can name
/// algorithms this reader does not know; [`Compression::from_tag`]
/// returns `None` for those and the caller decides how to fail.
///
/// ```text
/// ┌──────────────┬─────────┬──────────────────────────┐
/// │ Tag          │ Variant │ Payload                  │
/// ├──────────────┼─────────┼──────────────────────────┤
/// │ "" / "none"  │ None    │ records stored verbatim  │
/// │ "lz4"        │ Lz4     │ LZ4 block format         │
/// │ "zstd"       │ Zstd    │ single zstd frame        │
/// └──────────────┴─────────┴──────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Lz4,
    Zstd,
}

impl Compression {
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "" | "none" => Some(Self::None),
            "lz4" => Some(Self::Lz4),
            "zstd" => Some(Self::Zstd),
            _ => None,
        }
    }

    /// The canonical tag written by encoders.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_none_mean_uncompressed() {
        assert_eq!(Compression::from_tag(""), Some(Compression::None));
        assert_eq!(Compression::from_tag("none"), Some(Compression::None));
    }

    #[test]
    fn canonical_tags_parse_back() {
        for c in [Compression::None, Compression::Lz4, Compression::Zstd] {
            assert_eq!(Compression::from_tag(c.tag()), Some(c));
        }
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(Compression::from_tag("bz2"), None);
        assert_eq!(Compression::from_tag("LZ4"), None);
    }
}
