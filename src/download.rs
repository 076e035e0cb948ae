//! Save resolved HLS playlists as mp4 files with an external muxer ([ffmpeg](https://ffmpeg.org)).

use crate::error::{GyaoError, GyaoErrorContext};
use crate::media::StreamTarget;
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Characters which are replaced with `_` when a title is used as file name.
pub const INVALID_FILENAME_CHARS: [char; 14] = [
    ' ', '\u{3000}', '\\', '/', ':', ';', '*', '?', '"', '<', '>', '|', '%', '’',
];

/// Make `title` usable as file name on all platforms.
pub fn sanitize_title<S: AsRef<str>>(title: S) -> String {
    title
        .as_ref()
        .chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Downloads HLS playlists by invoking ffmpeg, which copies (not re-encodes) all streams into a mp4
/// container.
#[derive(Clone, Debug)]
pub struct HlsDownloader {
    program: PathBuf,
}

impl HlsDownloader {
    /// Use `ffmpeg` from `PATH`. Fails if it cannot be found.
    pub async fn locate() -> Result<HlsDownloader> {
        HlsDownloader::with_program("ffmpeg").await
    }

    /// Use the given ffmpeg executable. `program` can be a path or a name to look up in `PATH`.
    pub async fn with_program<P: AsRef<Path>>(program: P) -> Result<HlsDownloader> {
        let program = program.as_ref();

        if program.components().count() > 1 {
            if !program.is_file() {
                return Err(GyaoError::ExternalTool(
                    GyaoErrorContext::new("ffmpeg not found")
                        .with_url(program.to_string_lossy()),
                ));
            }
            return Ok(HlsDownloader {
                program: program.to_path_buf(),
            });
        }

        let lookup = if cfg!(windows) { "where" } else { "which" };
        let found = Command::new(lookup)
            .arg(program)
            .output()
            .await
            .map_err(|e| {
                GyaoError::ExternalTool(GyaoErrorContext::new(format!(
                    "failed to run '{}': {}",
                    lookup, e
                )))
            })?;
        if !found.status.success() {
            return Err(GyaoError::ExternalTool(GyaoErrorContext::new(format!(
                "{} not found",
                program.to_string_lossy()
            ))));
        }

        // `where` prints every match, the first one is what would be executed
        let path = String::from_utf8_lossy(&found.stdout)
            .lines()
            .next()
            .map(|line| PathBuf::from(line.trim()))
            .unwrap_or_else(|| program.to_path_buf());
        tracing::debug!(path = %path.display(), "found ffmpeg");

        Ok(HlsDownloader { program: path })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Path the video with `title` is saved to in `output_dir`.
    pub fn output_path<S: AsRef<str>, P: AsRef<Path>>(&self, title: S, output_dir: P) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{}.mp4", sanitize_title(title)))
    }

    /// Download `stream` to `<output_dir>/<sanitized title>.mp4` and return the path of the saved
    /// file. An existing file is never overwritten.
    pub async fn download<S: AsRef<str>, P: AsRef<Path>>(
        &self,
        stream: &StreamTarget,
        title: S,
        output_dir: P,
    ) -> Result<PathBuf> {
        let path = self.output_path(title, output_dir);
        if path.exists() {
            return Err(GyaoError::ExternalTool(
                GyaoErrorContext::new("output file already exists")
                    .with_url(path.to_string_lossy()),
            ));
        }

        tracing::debug!(playlist = %stream, path = %path.display(), "starting ffmpeg");
        let output = Command::new(&self.program)
            // ffmpeg asks before overwriting, never wait for an answer
            .arg("-n")
            .arg("-i")
            .arg(stream.as_str())
            .args(["-c", "copy", "-movflags", "faststart"])
            .arg(&path)
            .args(["-loglevel", "fatal"])
            .output()
            .await
            .map_err(|e| {
                GyaoError::ExternalTool(GyaoErrorContext::new(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                )))
            })?;

        if !output.status.success() {
            return Err(GyaoError::ExternalTool(
                GyaoErrorContext::new(format!("ffmpeg exited with {}", output.status))
                    .with_url(stream.as_str())
                    .with_value(&output.stderr),
            ));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_invalid_chars() {
        assert_eq!(
            sanitize_title("第1話 「始まり」/前編: A?B*C"),
            "第1話_「始まり」_前編__A_B_C"
        );
        assert_eq!(sanitize_title("a\u{3000}b’s|<x>\"%\\;"), "a_b_s__x_____");
    }

    #[test]
    fn sanitize_keeps_valid_title() {
        assert_eq!(sanitize_title("episode-1_final"), "episode-1_final");
    }

    #[tokio::test]
    async fn missing_program_is_external_tool_error() {
        let result = HlsDownloader::with_program("/nonexistent/dir/ffmpeg").await;
        assert!(matches!(result, Err(GyaoError::ExternalTool(_))));
    }

    #[test]
    fn output_path_uses_sanitized_title() {
        let downloader = HlsDownloader {
            program: PathBuf::from("ffmpeg"),
        };
        assert_eq!(
            downloader.output_path("a/b c", "/tmp/videos"),
            PathBuf::from("/tmp/videos/a_b_c.mp4")
        );
    }
}
