use std::{
    path::{Path, PathBuf},
    process::Command,
};

use spectroview::{FfmpegDecoder, probe_video, process_video};

fn ffmpeg_tools_available() -> bool {
    let ffmpeg_ok = Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    let ffprobe_ok = Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    ffmpeg_ok && ffprobe_ok
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "spectroview_e2e_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn synth_clip(path: &Path, lavfi_source: &str, frames: u32) {
    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i", lavfi_source])
        .args([
            "-frames:v",
            &frames.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-c:v",
            "libx264",
        ])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "ffmpeg failed creating {}", path.display());
}

fn count_frames(path: &Path) -> u64 {
    let info = probe_video(path).unwrap();
    let mut decoder = FfmpegDecoder::open(&info).unwrap();
    let mut n = 0u64;
    while decoder.next_frame().unwrap().is_some() {
        n += 1;
    }
    decoder.finish().unwrap();
    n
}

#[test]
fn output_preserves_frame_count_dimensions_and_rate() {
    if !ffmpeg_tools_available() {
        return;
    }
    let dir = scratch_dir("parity");
    let input = dir.join("clip.mp4");
    let output = dir.join("clip_fft.mp4");
    synth_clip(&input, "testsrc=size=64x64:rate=30", 30);

    let summary = process_video(&input, &output).unwrap();
    assert_eq!(summary.frames, 30);
    assert_eq!((summary.width, summary.height), (64, 64));
    assert_eq!((summary.fps_num, summary.fps_den), (30, 1));

    let out_info = probe_video(&output).unwrap();
    assert_eq!((out_info.width, out_info.height), (64, 64));
    assert_eq!((out_info.fps_num, out_info.fps_den), (30, 1));
    assert_eq!(count_frames(&output), 30);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn rerunning_the_pipeline_yields_identical_metadata() {
    if !ffmpeg_tools_available() {
        return;
    }
    let dir = scratch_dir("idempotent");
    let input = dir.join("clip.mp4");
    synth_clip(&input, "testsrc=size=64x64:rate=30", 15);

    let out_a = dir.join("a_fft.mp4");
    let out_b = dir.join("b_fft.mp4");
    let summary_a = process_video(&input, &out_a).unwrap();
    let summary_b = process_video(&input, &out_b).unwrap();

    assert_eq!(summary_a, summary_b);
    assert_eq!(count_frames(&out_a), count_frames(&out_b));
    let info_a = probe_video(&out_a).unwrap();
    let info_b = probe_video(&out_b).unwrap();
    assert_eq!((info_a.width, info_a.height), (info_b.width, info_b.height));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn uniform_clip_concentrates_energy_at_the_center() {
    if !ffmpeg_tools_available() {
        return;
    }
    let dir = scratch_dir("uniform");
    let input = dir.join("flat.mp4");
    let output = dir.join("flat_fft.mp4");
    synth_clip(&input, "color=c=gray:size=64x64:rate=30", 5);

    process_video(&input, &output).unwrap();

    let info = probe_video(&output).unwrap();
    let mut decoder = FfmpegDecoder::open(&info).unwrap();
    let first = decoder.next_frame().unwrap().unwrap();
    while decoder.next_frame().unwrap().is_some() {}
    decoder.finish().unwrap();

    // The spectrum of a constant frame is a single DC peak at the grid
    // center; x264 recompression blurs it slightly but cannot move it.
    assert!(first.get_pixel(32, 32).0[0] > 200);
    assert!(first.get_pixel(2, 2).0[0] < 30);
    assert!(first.get_pixel(60, 60).0[0] < 30);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unreadable_input_fails_and_leaves_no_partial_output() {
    if !ffmpeg_tools_available() {
        return;
    }
    let dir = scratch_dir("garbage");
    let input = dir.join("not_a_video.mp4");
    let output = dir.join("out_fft.mp4");
    std::fs::write(&input, b"this is not a video container").unwrap();

    assert!(process_video(&input, &output).is_err());
    assert!(!output.exists());

    std::fs::remove_dir_all(&dir).unwrap();
}
