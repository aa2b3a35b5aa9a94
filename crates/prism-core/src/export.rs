//! Saving generated images to disk.

use crate::error::ExportError;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;

/// Downloads result images into a directory.
#[derive(Debug, Clone)]
pub struct ImageExporter {
    dir: PathBuf,
    client: reqwest::Client,
}

impl ImageExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch `url` and stream it to `generated-image-<unix-millis>.png`.
    ///
    /// Returns the path written. Existing files are never overwritten.
    pub async fn save(&self, url: &str) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ExportError::Write {
                path: self.dir.clone(),
                source,
            })?;

        let download_err = |message: String| ExportError::Download {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| download_err(e.to_string()))?;

        let dest = unique_path(&self.dir, &image_file_name(unix_millis()));
        let written = match stream_to_file(response, &dest, url).await {
            Ok(written) => written,
            Err(e) => {
                // Leave no truncated image behind.
                if let Err(remove_err) = tokio::fs::remove_file(&dest).await {
                    tracing::debug!("Could not remove partial {}: {remove_err}", dest.display());
                }
                return Err(e);
            }
        };

        tracing::info!("Saved {} ({:.1} KB)", dest.display(), written as f64 / 1024.0);
        Ok(dest)
    }
}

/// Write the response body to `dest`, returning the byte count.
async fn stream_to_file(
    response: reqwest::Response,
    dest: &Path,
    url: &str,
) -> Result<u64, ExportError> {
    let write_err = |source: std::io::Error| ExportError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(dest).await.map_err(write_err)?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ExportError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;
    Ok(written)
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn image_file_name(millis: u128) -> String {
    format!("generated-image-{millis}.png")
}

/// `dir/name`, or `dir/stem-N.ext` for the first N that is free.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
    (1..)
        .map(|n| {
            if ext.is_empty() {
                dir.join(format!("{stem}-{n}"))
            } else {
                dir.join(format!("{stem}-{n}.{ext}"))
            }
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_file_name() {
        assert_eq!(
            image_file_name(1_700_000_000_123),
            "generated-image-1700000000123.png"
        );
    }

    #[test]
    fn test_unique_path_free_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = unique_path(dir.path(), "generated-image-1.png");
        assert_eq!(path, dir.path().join("generated-image-1.png"));
    }

    #[test]
    fn test_unique_path_suffixes_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("generated-image-1.png"), b"x").unwrap();
        std::fs::write(dir.path().join("generated-image-1-1.png"), b"x").unwrap();

        let path = unique_path(dir.path(), "generated-image-1.png");
        assert_eq!(path, dir.path().join("generated-image-1-2.png"));
    }

    #[tokio::test]
    async fn test_save_reports_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ImageExporter::new(dir.path().join("out"));

        // Nothing listens on port 9 locally.
        let err = exporter.save("http://127.0.0.1:9/image.png").await.unwrap_err();
        assert!(matches!(err, ExportError::Download { .. }));
        // The directory is created before the download is attempted.
        assert!(dir.path().join("out").is_dir());
    }

    #[tokio::test]
    async fn test_interrupted_download_leaves_no_file() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Promise 1000 bytes, send 10, then hang up.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 1000\r\n\r\n0123456789",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let exporter = ImageExporter::new(dir.path());
        let err = exporter
            .save(&format!("http://{addr}/image.png"))
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ExportError::Download { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
