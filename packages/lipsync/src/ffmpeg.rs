//! ffmpeg/ffprobe invocation helpers.
//!
//! All external-process work goes through here: availability probing,
//! transcoding runs with captured stderr, and best-effort stream probing.

use avatar_domain::{MediaError, Result};
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Checks that ffmpeg is runnable on this host.
pub fn check_ffmpeg() -> Result<()> {
    Command::new("ffmpeg")
        .args(["-version"])
        .output()
        .map_err(|_| {
            MediaError::Unavailable(
                "ffmpeg not found; install ffmpeg to enable lip-sync compositing".to_string(),
            )
        })?;
    Ok(())
}

/// Runs ffmpeg with `args`, failing with the tool's stderr on non-zero exit.
pub(crate) fn run_ffmpeg(args: &[&str]) -> Result<()> {
    debug!(?args, "ffmpeg");
    let output = Command::new("ffmpeg")
        .args(args)
        .output()
        .map_err(|e| MediaError::TranscodeFailed(format!("ffmpeg execution failed: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::TranscodeFailed(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Container duration via ffprobe; `None` when probing fails.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let secs: f64 = String::from_utf8_lossy(&output.stdout).trim().parse().ok()?;
    (secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}

/// Resolution of the first video stream via ffprobe; `None` when probing
/// fails or there is no video stream.
pub fn probe_dimensions(path: &Path) -> Option<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=s=x:p=0",
        ])
        .arg(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let mut parts = text.trim().split('x');
    let width = parts.next()?.trim().parse().ok()?;
    let height = parts.next()?.trim().parse().ok()?;
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_of_missing_files_are_none() {
        assert_eq!(probe_duration(Path::new("/no/such/clip.mp4")), None);
        assert_eq!(probe_dimensions(Path::new("/no/such/clip.mp4")), None);
    }
}
