use std::path::{Path, PathBuf};

use crate::{
    decode::FfmpegDecoder,
    encode::{EncodeConfig, FfmpegEncoder, is_ffmpeg_on_path},
    error::{SpectroError, SpectroResult},
    probe::probe_video,
    spectrum::{SpectrumPlan, replicate_to_rgb, to_luma_bt601},
};

/// One progress line per this many frames.
const PROGRESS_INTERVAL: u64 = 30;

/// What the pipeline actually wrote, for callers that want to report it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineSummary {
    pub frames: u64,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
}

/// Run the full transform pipeline: probe the input, stream-decode it frame
/// by frame, replace every frame with its centered log-magnitude spectrum,
/// and stream-encode the result to `output` with the source's resolution and
/// frame rate.
///
/// Strictly sequential with one frame in flight. On any failure the decoder
/// and encoder children are reaped and the partially written output file is
/// removed.
#[tracing::instrument]
pub fn process_video(input: &Path, output: &Path) -> SpectroResult<PipelineSummary> {
    if !is_ffmpeg_on_path() {
        return Err(SpectroError::codec(
            "ffmpeg is required for video processing, but was not found on PATH",
        ));
    }

    let source = probe_video(input)?;

    println!("processing video: {}", input.display());
    match source.nb_frames {
        Some(total) => println!(
            "resolution: {}x{}, fps: {:.3}, frames: {total}",
            source.width,
            source.height,
            source.source_fps()
        ),
        None => println!(
            "resolution: {}x{}, fps: {:.3}",
            source.width,
            source.height,
            source.source_fps()
        ),
    }

    let mut guard = OutputGuard::new(output);
    let mut decoder = FfmpegDecoder::open(&source)?;
    let mut encoder = FfmpegEncoder::new(EncodeConfig {
        width: source.width,
        height: source.height,
        fps_num: source.fps_num,
        fps_den: source.fps_den,
        out_path: output.to_path_buf(),
        overwrite: true,
    })?;
    let mut plan = SpectrumPlan::new(source.width, source.height)?;

    let mut frames = 0u64;
    while let Some(frame) = decoder.next_frame()? {
        let gray = to_luma_bt601(&frame);
        let spectrum = plan.magnitude_spectrum(&gray)?;
        encoder.write_frame(&replicate_to_rgb(&spectrum))?;

        frames += 1;
        if frames.is_multiple_of(PROGRESS_INTERVAL) {
            match source.nb_frames {
                Some(total) => println!("processed {frames}/{total} frames..."),
                None => println!("processed {frames} frames..."),
            }
        }
    }

    decoder.finish()?;
    encoder.finish()?;
    guard.keep();

    tracing::debug!(frames, "pipeline finished");
    println!(
        "processing complete: {frames} frames, output saved to: {}",
        output.display()
    );

    Ok(PipelineSummary {
        frames,
        width: source.width,
        height: source.height,
        fps_num: source.fps_num,
        fps_den: source.fps_den,
    })
}

/// Removes the (partial) output file on drop unless `keep()` was called.
struct OutputGuard {
    path: Option<PathBuf>,
}

impl OutputGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn keep(&mut self) {
        self.path.take();
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "spectroview_guard_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn output_guard_removes_file_on_drop() {
        let path = scratch_file("drop");
        std::fs::write(&path, b"partial").unwrap();

        drop(OutputGuard::new(&path));
        assert!(!path.exists());
    }

    #[test]
    fn output_guard_keeps_file_when_defused() {
        let path = scratch_file("keep");
        std::fs::write(&path, b"complete").unwrap();

        let mut guard = OutputGuard::new(&path);
        guard.keep();
        drop(guard);
        assert!(path.exists());

        std::fs::remove_file(&path).unwrap();
    }
}
