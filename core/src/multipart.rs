//! `multipart/form-data` encoding for file uploads.
//!
//! Every attachment becomes one part named after its file name. Parts are
//! appended in order and the body ends with a single closing delimiter.

use std::path::{Path, PathBuf};

use crate::error::Error;

/// Fixed boundary token used for every upload.
pub const BOUNDARY: &str = "WebKitFormBoundaryUmZoXOtOBNCTLyxT";

/// `Content-Type` value announcing a multipart body with `BOUNDARY`.
pub fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// A file read from disk, ready to be written as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl FileAttachment {
    /// Read `path` and resolve its base name and MIME type.
    ///
    /// The MIME type is guessed from the extension, falling back to
    /// `application/octet-stream`.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read(path).map_err(|source| Error::Attachment {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            content,
        })
    }
}

/// Read every path and encode the lot as one multipart body.
pub fn encode_files(paths: &[PathBuf]) -> Result<Vec<u8>, Error> {
    let attachments = paths
        .iter()
        .map(|path| FileAttachment::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode(&attachments))
}

/// Encode attachments as a multipart body delimited by `BOUNDARY`.
pub fn encode(attachments: &[FileAttachment]) -> Vec<u8> {
    let mut body = Vec::new();
    for attachment in attachments {
        if contains(&attachment.content, BOUNDARY.as_bytes()) {
            log::warn!(
                "attachment {} contains the multipart boundary",
                attachment.file_name
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}\"\r\n",
                name = attachment.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", attachment.mime_type).as_bytes());
        body.extend_from_slice(&attachment.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--").as_bytes());
    body
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str, mime: &str, content: &[u8]) -> FileAttachment {
        FileAttachment {
            file_name: name.to_string(),
            mime_type: mime.to_string(),
            content: content.to_vec(),
        }
    }

    #[test]
    fn single_part_layout() {
        let body = encode(&[attachment("a.txt", "text/plain", b"hello")]);
        let expected = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"a.txt\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\r\n\
             --{BOUNDARY}--"
        );
        assert_eq!(String::from_utf8(body).unwrap(), expected);
    }

    #[test]
    fn every_part_is_kept() {
        let body = encode(&[
            attachment("a.txt", "text/plain", b"first"),
            attachment("b.png", "image/png", b"second"),
            attachment("c.pdf", "application/pdf", b"third"),
        ]);
        let text = String::from_utf8(body).unwrap();
        assert_eq!(text.matches(&format!("--{BOUNDARY}\r\n")).count(), 3);
        assert_eq!(text.matches(&format!("--{BOUNDARY}--")).count(), 1);
        assert!(text.ends_with(&format!("--{BOUNDARY}--")));
        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        let third = text.find("third").unwrap();
        assert!(first < second && second < third);
        assert!(text.contains("filename=\"b.png\"\r\nContent-Type: image/png\r\n"));
    }

    #[test]
    fn no_attachments_is_just_the_terminator() {
        assert_eq!(encode(&[]), format!("--{BOUNDARY}--").into_bytes());
    }

    #[test]
    fn binary_content_is_copied_verbatim() {
        let bytes = [0u8, 159, 146, 150, b'\r', b'\n'];
        let body = encode(&[attachment("blob.bin", "application/octet-stream", &bytes)]);
        assert!(body.windows(bytes.len()).any(|w| w == bytes));
    }

    #[test]
    fn from_path_resolves_name_and_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let file = FileAttachment::from_path(&path).unwrap();
        assert_eq!(file.file_name, "invoice.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.content, b"%PDF-1.4");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.zzqx");
        std::fs::write(&path, b"?").unwrap();
        let file = FileAttachment::from_path(&path).unwrap();
        assert_eq!(file.mime_type, "application/octet-stream");
    }

    #[test]
    fn missing_file_is_an_attachment_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let err = encode_files(&[path.clone()]).unwrap_err();
        match err {
            Error::Attachment { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
