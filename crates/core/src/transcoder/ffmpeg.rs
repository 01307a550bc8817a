//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::TranscoderConfig;
use super::error::TranscodeError;
use super::options::ConversionOptions;
use super::traits::Transcoder;

/// What the ffmpeg invocation does with the input streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfmpegMode {
    /// Drop video streams and keep only the audio track.
    ExtractAudio,
    /// General audio/video conversion into the target container.
    Convert,
}

/// FFmpeg-based transcoder.
///
/// Input bytes are spooled to a temp file, ffmpeg writes the output next to
/// it, and both files are removed once the output has been read back.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
    mode: FfmpegMode,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig, mode: FfmpegMode) -> Self {
        Self { config, mode }
    }

    /// Transcoder for video to audio extraction.
    pub fn audio_extractor(config: TranscoderConfig) -> Self {
        Self::new(config, FfmpegMode::ExtractAudio)
    }

    /// Transcoder for general media conversion.
    pub fn media(config: TranscoderConfig) -> Self {
        Self::new(config, FfmpegMode::Convert)
    }

    pub fn mode(&self) -> FfmpegMode {
        self.mode
    }

    /// Audio codec ffmpeg should use for a target container, if it needs one.
    fn audio_codec(target: &str) -> Option<&'static str> {
        match target {
            "mp3" => Some("libmp3lame"),
            "ogg" | "oga" => Some("libvorbis"),
            "opus" => Some("libopus"),
            "flac" => Some("flac"),
            "wav" => Some("pcm_s16le"),
            "aac" | "m4a" => Some("aac"),
            _ => None,
        }
    }

    fn is_lossless(target: &str) -> bool {
        matches!(target, "flac" | "wav" | "alac" | "aiff")
    }

    /// Builds ffmpeg arguments for one conversion.
    fn build_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        target: &str,
        options: &ConversionOptions,
    ) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ];

        if self.mode == FfmpegMode::ExtractAudio {
            args.push("-vn".to_string());
        }

        if let Some(codec) = Self::audio_codec(target) {
            args.extend(["-c:a".to_string(), codec.to_string()]);
        }

        if Self::is_lossless(target) {
            if let Some(level) = options.compression_level() {
                args.extend(["-compression_level".to_string(), level.to_string()]);
            }
        } else if let Some(bitrate) = options.bitrate_kbps() {
            args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        args.push(output_path.to_string_lossy().to_string());

        args
    }

    fn spawn_error(&self, e: std::io::Error) -> TranscodeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranscodeError::ToolNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            TranscodeError::Io(e)
        }
    }

    /// Runs ffmpeg from `input_path` to `output_path`.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), TranscodeError> {
        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TranscodeError::process("ffmpeg stderr was not captured", None))?;
        let mut reader = BufReader::new(stderr).lines();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut error_output = String::new();

            while let Ok(Some(line)) = reader.next_line().await {
                if line.contains("Error") || line.contains("error") {
                    error_output.push_str(&line);
                    error_output.push('\n');
                }
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(TranscodeError::process(
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
                Ok(())
            }
            Ok(Err(e)) => Err(TranscodeError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                Err(TranscodeError::Timeout {
                    timeout_ms: self.config.timeout_secs.saturating_mul(1000),
                })
            }
        }
    }

    /// Checks that ffmpeg can be executed and the temp dir exists.
    pub async fn validate(&self) -> Result<(), TranscodeError> {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        tokio::fs::create_dir_all(&self.config.temp_dir).await?;

        Ok(())
    }
}

/// Temp file pair removed on drop.
struct SpoolFiles {
    input: PathBuf,
    output: PathBuf,
}

impl SpoolFiles {
    fn new(dir: &Path, target: &str) -> Self {
        let id = uuid::Uuid::new_v4();
        Self {
            input: dir.join(format!("{}.input", id)),
            output: dir.join(format!("{}.{}", id, target)),
        }
    }
}

impl Drop for SpoolFiles {
    fn drop(&mut self) {
        for path in [&self.input, &self.output] {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove temp file");
                }
            }
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        match self.mode {
            FfmpegMode::ExtractAudio => "ffmpeg-extract",
            FfmpegMode::Convert => "ffmpeg",
        }
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        let target = target_format.trim().to_ascii_lowercase();
        if target.is_empty() || !target.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TranscodeError::unsupported(target_format));
        }

        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        let files = SpoolFiles::new(&self.config.temp_dir, &target);
        tokio::fs::write(&files.input, &source).await?;

        let args = self.build_args(&files.input, &files.output, &target, options);
        debug!(transcoder = self.name(), target = %target, "Running ffmpeg");
        self.run_ffmpeg(&args).await?;

        let output = tokio::fs::read(&files.output)
            .await
            .map_err(|_| TranscodeError::process("Output file not created", None))?;

        Ok(Bytes::from(output))
    }
}
