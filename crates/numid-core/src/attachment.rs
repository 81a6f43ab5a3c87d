//! Inline-attachment decoding.
//!
//! A browser hands images over as `data:<mime>;base64,<payload>` strings; the
//! upstream API wants the bare payload and the MIME type as separate fields.

use numid_types::Attachment;

use crate::gemini::types::InlineData;
use crate::DEFAULT_MIME_TYPE;

/// Split a data URI into an upstream inline part.
///
/// Anything after the first comma is the payload; a string without a comma is
/// taken as a raw base64 payload. The MIME type is the explicit one when
/// non-empty, else the one named in the data-URI header, else
/// [`DEFAULT_MIME_TYPE`]. Returns `None` for an empty URI.
pub fn inline_data(data_uri: &str, mime_type: Option<&str>) -> Option<InlineData> {
    if data_uri.is_empty() {
        return None;
    }

    let (header, payload) = match data_uri.split_once(',') {
        Some((header, payload)) => (Some(header), payload),
        None => (None, data_uri),
    };

    let mime_type = mime_type
        .filter(|m| !m.is_empty())
        .or_else(|| header.and_then(header_mime))
        .unwrap_or(DEFAULT_MIME_TYPE);

    Some(InlineData {
        mime_type: mime_type.to_owned(),
        data: payload.to_owned(),
    })
}

/// [`inline_data`] for an optional message attachment.
pub fn decode(attachment: Option<&Attachment>) -> Option<InlineData> {
    let attachment = attachment?;
    inline_data(&attachment.data_uri, attachment.mime_type.as_deref())
}

/// `data:image/jpeg;base64` → `image/jpeg`.
fn header_mime(header: &str) -> Option<&str> {
    let media = header.strip_prefix("data:")?;
    let mime = media.split(';').next().unwrap_or("");
    (!mime.is_empty()).then_some(mime)
}
