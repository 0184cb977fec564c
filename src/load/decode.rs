use encoding_rs::{mem, Encoding, UTF_8};
use std::borrow::Cow;
use std::fmt;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A text encoding the loader can try.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    /// Strict UTF-8, leading BOM stripped.
    Utf8,
    /// ISO-8859-1: byte `n` is `U+00nn`, so decoding never fails.
    Latin1,
    /// Any other WHATWG encoding, decoded strictly.
    Whatwg(&'static Encoding),
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Whatwg(enc) => enc.name(),
        }
    }

    /// `None` when `bytes` are malformed for this encoding.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
            }
            TextEncoding::Latin1 => Some(mem::decode_latin1(bytes)),
            TextEncoding::Whatwg(enc) => enc.decode_without_bom_handling_and_without_replacement(bytes),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// UTF-8 first, then Latin-1.
pub fn default_encodings() -> Vec<TextEncoding> {
    vec![TextEncoding::Utf8, TextEncoding::Latin1]
}
