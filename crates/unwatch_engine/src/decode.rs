use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::{FailureKind, FetchError};

/// Decode a page body to UTF-8: BOM, then Content-Type charset, then
/// detection over the whole body. Returns the text and the encoding name.
pub(crate) fn decode_body(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<(String, &'static str), FetchError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(FetchError::new(
            FailureKind::Decode {
                encoding: encoding.name().to_string(),
            },
            "malformed byte sequence",
        ));
    }
    Ok((text.into_owned(), encoding.name()))
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}
