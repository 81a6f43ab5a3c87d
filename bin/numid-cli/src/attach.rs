//! Image files as inline data-URI attachments.

use std::path::Path;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use numid_core::DEFAULT_MIME_TYPE;
use numid_types::Attachment;

/// MIME type from the file extension; PNG when unknown.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Read an image file into an attachment.
pub fn load(path: &Path) -> anyhow::Result<Attachment> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mime_type = mime_for(path);
    Ok(Attachment {
        data_uri: data_uri(mime_type, &bytes),
        mime_type: Some(mime_type.to_owned()),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("cat.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a/b.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("noext")), "image/png");
        assert_eq!(mime_for(Path::new("x.tiff")), "image/png");
    }

    #[test]
    fn loads_file_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let attachment = load(&path).unwrap();
        assert_eq!(attachment.data_uri, "data:image/gif;base64,R0lGODlh");
        assert_eq!(attachment.mime_type.as_deref(), Some("image/gif"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
