//! yt-dlp subprocess plumbing shared by the extraction-backend resolvers.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::anyhow;
use bytes::Bytes;
use futures::Stream;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

/// Locates the yt-dlp binary: an explicitly configured path wins,
/// otherwise probe `$PATH`.
pub async fn find_ytdlp(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        return None;
    }

    let bin_name = if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    };

    if let Ok(status) = tokio::process::Command::new(bin_name)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        if status.success() {
            return Some(PathBuf::from(bin_name));
        }
    }

    None
}

/// Full metadata dump for one media URL. Errors carry the trimmed
/// stderr text so callers can classify the upstream vocabulary.
pub async fn get_video_info(ytdlp: &Path, url: &str) -> anyhow::Result<serde_json::Value> {
    let output = tokio::process::Command::new(ytdlp)
        .args(["--dump-json", "--no-warnings", "--no-playlist", url])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| anyhow!("failed to run yt-dlp: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("{}", stderr.trim()));
    }

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| anyhow!("yt-dlp returned invalid JSON: {}", e))?;

    Ok(json)
}

/// Spawns yt-dlp writing the selected format to stdout and returns the
/// byte stream. The process is killed when `cancel` fires (the HTTP
/// client disconnected); its stderr is drained into the log either way.
pub async fn stream_download(
    ytdlp: &Path,
    url: &str,
    format_selector: &str,
    cancel: CancellationToken,
) -> anyhow::Result<impl Stream<Item = io::Result<Bytes>> + Send + 'static> {
    let mut child = tokio::process::Command::new(ytdlp)
        .args([
            "-f",
            format_selector,
            "--no-warnings",
            "--no-playlist",
            "-o",
            "-",
            url,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| anyhow!("failed to start yt-dlp: {}", e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("yt-dlp produced no stdout handle"))?;

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.trim().is_empty() {
                    tracing::warn!(target: "ytdlp", "{}", line.trim());
                }
            }
        });
    }

    let watched_url = url.to_string();
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("client gone, killing yt-dlp for {}", watched_url);
                let _ = child.start_kill();
                let _ = child.wait().await;
            }
            status = child.wait() => {
                match status {
                    Ok(s) if !s.success() => {
                        tracing::error!("yt-dlp exited with {} for {}", s, watched_url);
                    }
                    Err(e) => {
                        tracing::error!("yt-dlp wait failed for {}: {}", watched_url, e);
                    }
                    _ => {}
                }
            }
        }
    });

    Ok(ReaderStream::new(stdout))
}
