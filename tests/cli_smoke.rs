use std::{
    path::{Path, PathBuf},
    process::Command,
};

fn spectroview_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_spectroview")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "spectroview.exe"
            } else {
                "spectroview"
            });
            p
        })
}

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

fn synth_clip(path: &Path, frames: u32) {
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=size=64x64:rate=30",
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

#[test]
fn missing_input_exits_1_and_names_the_path() {
    let output = Command::new(spectroview_exe())
        .args(["--input", "missing.mp4"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing.mp4"),
        "stderr did not name the path: {stderr}"
    );
}

#[test]
fn full_run_writes_video_and_viewer() {
    if !ffmpeg_tools_available() {
        return;
    }

    let dir = std::env::temp_dir().join(format!(
        "spectroview_cli_smoke_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();

    let input = dir.join("clip.mp4");
    let output = dir.join("clip_fft.mp4");
    let html = dir.join("visualization.html");
    synth_clip(&input, 12);

    let status = Command::new(spectroview_exe())
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--html")
        .arg(&html)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(output.exists());

    let page = std::fs::read_to_string(&html).unwrap();
    assert!(page.contains(r#"src="clip.mp4""#));
    assert!(page.contains(r#"src="clip_fft.mp4""#));

    std::fs::remove_dir_all(&dir).unwrap();
}
