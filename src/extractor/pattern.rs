//! Match grammar for embedded images.
//!
//! An embedded image is `data:image/<subtype>;base64,<payload>` where the
//! subtype is one of [`ImageSubtype`] and the payload is the longest run of
//! base64 alphabet characters (`A-Z a-z 0-9 + / =`) that follows the comma.
//! Matches never overlap and are reported left to right.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

static DATA_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"data:image/(png|jpeg|jpg|gif|webp|svg\+xml);base64,([A-Za-z0-9+/=]+)").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSubtype {
    Png,
    Jpeg,
    Jpg,
    Gif,
    Webp,
    #[serde(rename = "svg+xml")]
    SvgXml,
}

impl ImageSubtype {
    pub const ALL: [ImageSubtype; 6] = [
        ImageSubtype::Png,
        ImageSubtype::Jpeg,
        ImageSubtype::Jpg,
        ImageSubtype::Gif,
        ImageSubtype::Webp,
        ImageSubtype::SvgXml,
    ];

    /// Parses the subtype exactly as written after `image/`. Case-sensitive.
    pub fn from_mime_subtype(s: &str) -> Option<Self> {
        match s {
            "png" => Some(ImageSubtype::Png),
            "jpeg" => Some(ImageSubtype::Jpeg),
            "jpg" => Some(ImageSubtype::Jpg),
            "gif" => Some(ImageSubtype::Gif),
            "webp" => Some(ImageSubtype::Webp),
            "svg+xml" => Some(ImageSubtype::SvgXml),
            _ => None,
        }
    }

    pub fn mime_subtype(&self) -> &'static str {
        match self {
            ImageSubtype::Png => "png",
            ImageSubtype::Jpeg => "jpeg",
            ImageSubtype::Jpg => "jpg",
            ImageSubtype::Gif => "gif",
            ImageSubtype::Webp => "webp",
            ImageSubtype::SvgXml => "svg+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageSubtype::SvgXml => "svg",
            other => other.mime_subtype(),
        }
    }
}

impl fmt::Display for ImageSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image/{}", self.mime_subtype())
    }
}

/// One occurrence of an embedded image inside the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage<'a> {
    pub subtype: ImageSubtype,
    pub payload: &'a str,
    /// Byte range of the whole `data:...` match in the document.
    pub span: Range<usize>,
}

impl<'a> EmbeddedImage<'a> {
    fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        let whole = caps.get(0)?;
        let subtype = ImageSubtype::from_mime_subtype(caps.get(1)?.as_str())?;
        let payload = caps.get(2)?.as_str();

        Some(Self {
            subtype,
            payload,
            span: whole.range(),
        })
    }
}

/// Iterates over every embedded image in `text`, in document order.
pub fn find_embedded_images(text: &str) -> impl Iterator<Item = EmbeddedImage<'_>> {
    DATA_URI_RE
        .captures_iter(text)
        .filter_map(|caps| EmbeddedImage::from_captures(&caps))
}

pub fn count_embedded_images(text: &str) -> usize {
    DATA_URI_RE.find_iter(text).count()
}
