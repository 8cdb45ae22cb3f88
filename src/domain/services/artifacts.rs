#[cfg(test)]
#[path = "artifacts_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

const MIME_TYPES: [(&str, &str); 9] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
];

/// Files produced by workflow runs, written to the configured output
/// directory.
pub struct Artifacts {
    pub output_dir: path::PathBuf,
}

impl Default for Artifacts {
    fn default() -> Artifacts {
        return Artifacts::new(path::PathBuf::from(Config::get(ConfigKey::OutputDir)));
    }
}

impl Artifacts {
    pub fn new(output_dir: path::PathBuf) -> Artifacts {
        return Artifacts { output_dir };
    }

    pub fn mime_type(filename: &str) -> &'static str {
        let ext = filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        return MIME_TYPES
            .iter()
            .find(|(known, _)| return *known == ext)
            .map(|(_, mime)| return *mime)
            .unwrap_or("application/octet-stream");
    }

    pub fn extension(mime_type: &str) -> &'static str {
        return MIME_TYPES
            .iter()
            .find(|(_, mime)| return *mime == mime_type)
            .map(|(ext, _)| return *ext)
            .unwrap_or("bin");
    }

    /// Extension for image bytes based on their magic number.
    pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some("png");
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("jpg");
        }
        if bytes.starts_with(b"GIF8") {
            return Some("gif");
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some("webp");
        }

        return None;
    }

    pub fn filename(
        provider: &str,
        workflow_type: &str,
        extension: &str,
        created_at: DateTime<Utc>,
    ) -> String {
        return format!(
            "{}.{extension}",
            Artifacts::stem(provider, workflow_type, created_at)
        );
    }

    fn stem(provider: &str, workflow_type: &str, created_at: DateTime<Utc>) -> String {
        let timestamp = created_at.format("%Y-%m-%dT%H-%M-%S");
        return format!("{provider}-{workflow_type}-{timestamp}");
    }

    /// MIME type declared by a `data:` URL, if any.
    pub fn data_url_mime(url: &str) -> Option<&str> {
        let mime = url.strip_prefix("data:")?.split([';', ',']).next()?;
        if mime.is_empty() {
            return None;
        }

        return Some(mime);
    }

    pub async fn save(
        &self,
        provider: &str,
        workflow_type: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<path::PathBuf> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).await?;
        }

        // Names only have second precision, later saves get a numeric suffix.
        let stem = Artifacts::stem(provider, workflow_type, Utc::now());
        let mut attempt = 0;
        let (file_path, mut file) = loop {
            let name = if attempt == 0 {
                format!("{stem}.{extension}")
            } else {
                format!("{stem}-{attempt}.{extension}")
            };

            let file_path = self.output_dir.join(name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&file_path)
                .await
            {
                Ok(file) => break (file_path, file),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => return Err(err.into()),
            }
        };

        file.write_all(bytes).await?;
        file.flush().await?;

        let file_name = file_path.to_string_lossy().to_string();
        tracing::debug!(
            path = file_name.as_str(),
            mime = Artifacts::mime_type(&file_name),
            "artifact saved"
        );
        return Ok(file_path);
    }
}
