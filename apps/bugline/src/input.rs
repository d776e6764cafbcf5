//! Reading report text and attachments from disk

use crate::cli::SubmitArgs;
use crate::error::CliError;
use bugline_errors::Error;
use std::path::Path;

/// Report text from `--content` or `--content-file`; empty when neither is given
pub async fn read_content(args: &SubmitArgs) -> Result<String, CliError> {
    if let Some(content) = &args.content {
        return Ok(content.clone());
    }
    match &args.content_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path).into()),
        None => Ok(String::new()),
    }
}

/// File name and bytes of an attachment
pub async fn read_attachment(path: &Path) -> Result<(String, Vec<u8>), CliError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            CliError::InvalidArguments(format!("not a file path: {}", path.display()))
        })?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    Ok((name, bytes))
}

/// MIME type from the file extension, `application/octet-stream` when unknown
pub fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt" | "log") => "text/plain",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("shot.PNG")), "image/png");
        assert_eq!(guess_content_type(Path::new("crash.log")), "text/plain");
        assert_eq!(guess_content_type(Path::new("dump")), "application/octet-stream");
        assert_eq!(
            guess_content_type(Path::new("core.dmp")),
            "application/octet-stream"
        );
    }
}
