use std::path::{Path, PathBuf};

use crate::error::{SpectroError, SpectroResult};

/// Stream parameters of a source video, as reported by `ffprobe`.
///
/// The frame rate is kept as an exact `num/den` rational so the encoder can
/// reproduce it without float round-tripping (`30000/1001` stays `30000/1001`).
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    /// Container-reported frame count. Often absent (and occasionally wrong),
    /// so it is only ever used for progress display, never for loop control.
    pub nb_frames: Option<u64>,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

/// Probe a video file with the system `ffprobe` binary.
pub fn probe_video(source_path: &Path) -> SpectroResult<VideoSourceInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SpectroError::probe(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SpectroError::probe(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let info = parse_probe_output(&out.stdout, source_path)?;
    tracing::debug!(
        width = info.width,
        height = info.height,
        fps = info.source_fps(),
        frames = ?info.nb_frames,
        "probed video source"
    );
    Ok(info)
}

pub(crate) fn parse_probe_output(
    stdout: &[u8],
    source_path: &Path,
) -> SpectroResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(stdout)
        .map_err(|e| SpectroError::probe(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            SpectroError::probe(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| SpectroError::probe("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| SpectroError::probe("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| SpectroError::probe("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let nb_frames = video_stream
        .nb_frames
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok());

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        nb_frames,
    })
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_parsing_accepts_rationals_and_rejects_zero() {
        assert_eq!(parse_ff_ratio("30/1"), Some((30, 1)));
        assert_eq!(parse_ff_ratio("30000/1001"), Some((30000, 1001)));
        assert_eq!(parse_ff_ratio("0/1"), None);
        assert_eq!(parse_ff_ratio("30/0"), None);
        assert_eq!(parse_ff_ratio("garbage"), None);
    }

    #[test]
    fn probe_output_parses_ntsc_stream() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio", "sample_rate": "48000"},
                {
                    "codec_type": "video",
                    "width": 640,
                    "height": 480,
                    "r_frame_rate": "30000/1001",
                    "nb_frames": "300"
                }
            ],
            "format": {"duration": "10.010000"}
        }"#;
        let info = parse_probe_output(json, Path::new("clip.mp4")).unwrap();
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 480);
        assert_eq!((info.fps_num, info.fps_den), (30000, 1001));
        assert_eq!(info.nb_frames, Some(300));
        assert!((info.duration_sec - 10.01).abs() < 1e-9);
        assert!((info.source_fps() - 29.97).abs() < 0.01);
    }

    #[test]
    fn probe_output_tolerates_missing_frame_count() {
        let json = br#"{
            "streams": [
                {"codec_type": "video", "width": 64, "height": 64, "r_frame_rate": "25/1"}
            ]
        }"#;
        let info = parse_probe_output(json, Path::new("clip.webm")).unwrap();
        assert_eq!(info.nb_frames, None);
        assert_eq!(info.duration_sec, 0.0);
    }

    #[test]
    fn probe_output_requires_a_video_stream() {
        let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
        let err = parse_probe_output(json, Path::new("tone.wav")).unwrap_err();
        assert!(err.to_string().contains("no video stream"));
    }
}
