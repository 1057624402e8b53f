//! Content type detection from leading bytes.
//!
//! Implements the signature table of the WHATWG MIME Sniffing Standard
//! (a subset that covers common attachment formats). The table and its
//! order mirror Go's `net/http.DetectContentType`, so a file gets the same
//! type it would get from Go-based mail tools. At most the first
//! [`SNIFF_LEN`] bytes are considered.

use crate::content_type::OCTET_STREAM;

/// Number of leading bytes examined.
pub const SNIFF_LEN: usize = 512;

const TEXT_UTF8: &str = "text/plain; charset=utf-8";

enum Signature {
    /// HTML tag, case-insensitive, after leading whitespace, followed by a
    /// space or `>`.
    Html(&'static [u8]),
    /// Pattern compared under a mask, optionally after leading whitespace.
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_ws: bool,
        content_type: &'static str,
    },
    /// Literal prefix.
    Exact(&'static [u8], &'static str),
    /// ISO base media file with an `mp4` brand.
    Mp4,
    /// No binary bytes present.
    Text,
}

const SIGNATURES: &[Signature] = &[
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"<?xml",
        skip_ws: true,
        content_type: "text/xml; charset=utf-8",
    },
    Signature::Exact(b"%PDF-", "application/pdf"),
    Signature::Exact(b"%!PS-Adobe-", "application/postscript"),
    // UTF BOMs
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFE\xFF\x00\x00",
        skip_ws: false,
        content_type: "text/plain; charset=utf-16be",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFF\xFE\x00\x00",
        skip_ws: false,
        content_type: "text/plain; charset=utf-16le",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\x00",
        pattern: b"\xEF\xBB\xBF\x00",
        skip_ws: false,
        content_type: TEXT_UTF8,
    },
    // Images
    Signature::Exact(b"\x00\x00\x01\x00", "image/x-icon"),
    Signature::Exact(b"\x00\x00\x02\x00", "image/x-icon"),
    Signature::Exact(b"BM", "image/bmp"),
    Signature::Exact(b"GIF87a", "image/gif"),
    Signature::Exact(b"GIF89a", "image/gif"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_ws: false,
        content_type: "image/webp",
    },
    Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Signature::Exact(b"\xFF\xD8\xFF", "image/jpeg"),
    // Audio and video
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_ws: false,
        content_type: "audio/aiff",
    },
    Signature::Exact(b"ID3", "audio/mpeg"),
    Signature::Exact(b"OggS\x00", "application/ogg"),
    Signature::Exact(b"MThd\x00\x00\x00\x06", "audio/midi"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_ws: false,
        content_type: "video/avi",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_ws: false,
        content_type: "audio/wave",
    },
    Signature::Mp4,
    Signature::Exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    // Fonts
    Signature::Exact(b"\x00\x01\x00\x00", "font/ttf"),
    Signature::Exact(b"OTTO", "font/otf"),
    Signature::Exact(b"ttcf", "font/collection"),
    Signature::Exact(b"wOFF", "font/woff"),
    Signature::Exact(b"wOF2", "font/woff2"),
    // Archives
    Signature::Exact(b"\x1F\x8B\x08", "application/x-gzip"),
    Signature::Exact(b"PK\x03\x04", "application/zip"),
    Signature::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Exact(b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
    Signature::Exact(b"\x00\x61\x73\x6D", "application/wasm"),
    Signature::Text,
];

/// Detects the content type of `data`.
///
/// Always returns a valid MIME type; `application/octet-stream` when nothing
/// more specific matches.
#[must_use]
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let body = skip_whitespace(data);

    SIGNATURES
        .iter()
        .find_map(|sig| sig.matches(data, body))
        .unwrap_or(OCTET_STREAM)
}

impl Signature {
    fn matches(&self, data: &[u8], body: &[u8]) -> Option<&'static str> {
        match self {
            Self::Html(tag) => {
                if body.len() < tag.len() + 1 || !body[..tag.len()].eq_ignore_ascii_case(tag) {
                    return None;
                }
                matches!(body[tag.len()], b' ' | b'>').then_some("text/html; charset=utf-8")
            }
            Self::Masked {
                mask,
                pattern,
                skip_ws,
                content_type,
            } => {
                let input = if *skip_ws { body } else { data };
                if input.len() < pattern.len() {
                    return None;
                }
                input
                    .iter()
                    .zip(mask.iter().zip(pattern.iter()))
                    .all(|(b, (m, p))| b & m == *p)
                    .then_some(*content_type)
            }
            Self::Exact(prefix, content_type) => data.starts_with(prefix).then_some(*content_type),
            Self::Mp4 => is_mp4(data).then_some("video/mp4"),
            Self::Text => (!body.iter().any(|&b| is_binary(b))).then_some(TEXT_UTF8),
        }
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

const fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    // Major brand at 8..12, compatible brands from 16 on (12..16 is the version).
    (8..box_size)
        .step_by(4)
        .filter(|&offset| offset != 12 && offset + 3 <= box_size)
        .any(|offset| &data[offset..offset + 3] == b"mp4")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_text() {
        assert_eq!(detect_content_type(b""), TEXT_UTF8);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(detect_content_type(b"Hello, World!\n"), TEXT_UTF8);
    }

    #[test]
    fn test_html() {
        assert_eq!(
            detect_content_type(b"  <html><body>hi</body></html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(detect_content_type(b"<p>para</p>"), "text/html; charset=utf-8");
    }

    #[test]
    fn test_html_needs_terminator() {
        // "<pre" is not "<p" followed by a tag terminator.
        assert_eq!(detect_content_type(b"<pre>code</pre>"), TEXT_UTF8);
    }

    #[test]
    fn test_xml() {
        assert_eq!(
            detect_content_type(b"<?xml version=\"1.0\"?><a/>"),
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn test_pdf() {
        assert_eq!(detect_content_type(b"%PDF-1.7\n..."), "application/pdf");
    }

    #[test]
    fn test_png() {
        assert_eq!(
            detect_content_type(b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR"),
            "image/png"
        );
    }

    #[test]
    fn test_jpeg() {
        assert_eq!(detect_content_type(b"\xFF\xD8\xFF\xE0\x00\x10JFIF"), "image/jpeg");
    }

    #[test]
    fn test_webp() {
        assert_eq!(detect_content_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_wave() {
        assert_eq!(detect_content_type(b"RIFF\x24\x00\x00\x00WAVEfmt "), "audio/wave");
    }

    #[test]
    fn test_utf16_bom() {
        assert_eq!(
            detect_content_type(b"\xFE\xFF\x00h\x00i"),
            "text/plain; charset=utf-16be"
        );
        assert_eq!(
            detect_content_type(b"\xFF\xFEh\x00i\x00"),
            "text/plain; charset=utf-16le"
        );
    }

    #[test]
    fn test_avi() {
        assert_eq!(detect_content_type(b"RIFF\x24\x00\x00\x00AVI LIST"), "video/avi");
    }

    #[test]
    fn test_zip() {
        assert_eq!(detect_content_type(b"PK\x03\x04\x14\x00"), "application/zip");
    }

    #[test]
    fn test_gzip() {
        assert_eq!(detect_content_type(b"\x1F\x8B\x08\x00"), "application/x-gzip");
    }

    #[test]
    fn test_mp4() {
        let mut data = vec![0x00, 0x00, 0x00, 0x18];
        data.extend_from_slice(b"ftypisom\x00\x00\x02\x00isommp41");
        assert_eq!(detect_content_type(&data), "video/mp4");
    }

    #[test]
    fn test_binary_fallback() {
        assert_eq!(detect_content_type(&[0x01, 0x02, 0x03, 0xFE]), OCTET_STREAM);
    }

    #[test]
    fn test_only_leading_bytes_considered() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(detect_content_type(&data), TEXT_UTF8);
    }
}
