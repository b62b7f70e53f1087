//! Spectroview turns a video into a per-frame 2D FFT spectrum video plus a
//! synchronized side-by-side HTML viewer.
//!
//! # Pipeline overview
//!
//! 1. **Probe**: `ffprobe` reports dimensions, frame rate, and duration ([`probe_video`])
//! 2. **Decode**: a system `ffmpeg` child streams raw RGB frames ([`FfmpegDecoder`])
//! 3. **Transform**: grayscale → 2D FFT → centered log-magnitude → [0, 255] ([`SpectrumPlan`])
//! 4. **Encode**: a second `ffmpeg` child writes H.264/yuv420p MP4 ([`FfmpegEncoder`])
//! 5. **View**: a self-contained HTML document plays both videos in sync ([`write_viewer`])
//!
//! Everything is sequential with one frame in flight; both ffmpeg children are
//! reaped on every exit path and a failed run leaves no partial output file.
//! `ffmpeg`/`ffprobe` must be on `PATH`; there is no native FFmpeg linkage.
#![forbid(unsafe_code)]

pub mod decode;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod probe;
pub mod spectrum;
pub mod viewer;

pub use decode::FfmpegDecoder;
pub use encode::{EncodeConfig, FfmpegEncoder, ensure_parent_dir, is_ffmpeg_on_path};
pub use error::{SpectroError, SpectroResult};
pub use pipeline::{PipelineSummary, process_video};
pub use probe::{VideoSourceInfo, probe_video};
pub use spectrum::{
    SpectrumPlan, fft_shift, normalize_to_u8, replicate_to_rgb, to_luma_bt601,
};
pub use viewer::{render_viewer_html, write_viewer};
