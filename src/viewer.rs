use std::path::Path;

use anyhow::Context as _;

use crate::error::{SpectroError, SpectroResult};

/// Substitution tokens in [`VIEWER_TEMPLATE`]. Each occurs exactly once.
const INPUT_TOKEN: &str = "INPUT_VIDEO";
const OUTPUT_TOKEN: &str = "OUTPUT_VIDEO";

/// Render the viewer document for the given video file names.
///
/// The names are inserted verbatim as same-directory relative references; the
/// document itself is fully self-contained (embedded stylesheet and script,
/// no external resources).
pub fn render_viewer_html(input_name: &str, output_name: &str) -> String {
    VIEWER_TEMPLATE
        .replace(INPUT_TOKEN, input_name)
        .replace(OUTPUT_TOKEN, output_name)
}

/// Write the viewer document to `html_path`, overwriting unconditionally.
///
/// Only the file names of the two videos are referenced; the page assumes it
/// sits in the same directory as both files. Whether they exist is deferred
/// to the browser at view time.
pub fn write_viewer(
    input_video: &Path,
    output_video: &Path,
    html_path: &Path,
) -> SpectroResult<()> {
    let input_name = video_file_name(input_video)?;
    let output_name = video_file_name(output_video)?;

    let html = render_viewer_html(&input_name, &output_name);
    std::fs::write(html_path, html)
        .with_context(|| format!("failed to write viewer '{}'", html_path.display()))?;
    Ok(())
}

fn video_file_name(path: &Path) -> SpectroResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            SpectroError::validation(format!(
                "video path '{}' has no file name",
                path.display()
            ))
        })
}

const VIEWER_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>2D FFT Video Comparison</title>
    <style>
        body {
            margin: 0;
            padding: 20px;
            background-color: #1a1a1a;
            color: #fff;
            font-family: Arial, sans-serif;
        }
        .container {
            max-width: 1800px;
            margin: 0 auto;
        }
        h1 {
            text-align: center;
            margin-bottom: 30px;
        }
        .video-container {
            display: flex;
            gap: 20px;
            justify-content: center;
            margin-bottom: 30px;
            flex-wrap: wrap;
        }
        .video-wrapper {
            flex: 1;
            min-width: 400px;
            max-width: 800px;
        }
        .video-wrapper h2 {
            text-align: center;
            margin-bottom: 10px;
            font-size: 18px;
        }
        video {
            width: 100%;
            height: auto;
            background-color: #000;
            display: block;
        }
        .controls {
            background-color: #2a2a2a;
            padding: 20px;
            border-radius: 8px;
            margin-bottom: 20px;
        }
        .control-group {
            display: flex;
            align-items: center;
            gap: 15px;
            margin-bottom: 15px;
            flex-wrap: wrap;
        }
        .control-group:last-child {
            margin-bottom: 0;
        }
        button {
            padding: 10px 20px;
            font-size: 16px;
            background-color: #4CAF50;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
            transition: background-color 0.3s;
        }
        button:hover {
            background-color: #45a049;
        }
        button:active {
            background-color: #3d8b40;
        }
        .speed-control {
            display: flex;
            align-items: center;
            gap: 10px;
        }
        .speed-btn {
            padding: 8px 15px;
            font-size: 14px;
            background-color: #2196F3;
        }
        .speed-btn:hover {
            background-color: #0b7dda;
        }
        .speed-btn.active {
            background-color: #0b7dda;
            font-weight: bold;
        }
        input[type="range"] {
            flex: 1;
            min-width: 200px;
            height: 6px;
            background: #444;
            border-radius: 3px;
            outline: none;
        }
        input[type="range"]::-webkit-slider-thumb {
            -webkit-appearance: none;
            appearance: none;
            width: 16px;
            height: 16px;
            background: #4CAF50;
            cursor: pointer;
            border-radius: 50%;
        }
        input[type="range"]::-moz-range-thumb {
            width: 16px;
            height: 16px;
            background: #4CAF50;
            cursor: pointer;
            border-radius: 50%;
            border: none;
        }
        .time-display {
            font-family: monospace;
            font-size: 16px;
            min-width: 150px;
        }
        label {
            font-weight: bold;
            min-width: 80px;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>2D FFT Video Analysis</h1>

        <div class="controls">
            <div class="control-group">
                <button id="playPauseBtn">&#9654; Play</button>
                <button id="stepBackBtn">&#9198; -1 Frame</button>
                <button id="stepFwdBtn">&#9197; +1 Frame</button>
                <div class="time-display">
                    <span id="currentTime">0:00.00</span> / <span id="duration">0:00.00</span>
                </div>
            </div>

            <div class="control-group">
                <label>Progress:</label>
                <input type="range" id="seekBar" value="0" min="0" max="100" step="0.1">
            </div>

            <div class="control-group">
                <label>Speed:</label>
                <div class="speed-control">
                    <button class="speed-btn" data-speed="0.25">0.25x</button>
                    <button class="speed-btn" data-speed="0.5">0.5x</button>
                    <button class="speed-btn active" data-speed="1">1x</button>
                    <button class="speed-btn" data-speed="1.5">1.5x</button>
                    <button class="speed-btn" data-speed="2">2x</button>
                </div>
            </div>
        </div>

        <div class="video-container">
            <div class="video-wrapper">
                <h2>Original Video</h2>
                <video id="video1" src="INPUT_VIDEO"></video>
            </div>
            <div class="video-wrapper">
                <h2>2D FFT (Log-Magnitude Spectrum)</h2>
                <video id="video2" src="OUTPUT_VIDEO"></video>
            </div>
        </div>
    </div>

    <script>
        // All playback state lives here: the element references and the
        // reentrancy flag guarding seek feedback loops.
        class PlaybackController {
            constructor() {
                this.video1 = document.getElementById('video1');
                this.video2 = document.getElementById('video2');
                this.playPauseBtn = document.getElementById('playPauseBtn');
                this.seekBar = document.getElementById('seekBar');
                this.currentTimeDisplay = document.getElementById('currentTime');
                this.durationDisplay = document.getElementById('duration');
                this.seeking = false;

                this.video1.addEventListener('timeupdate', () => {
                    this.syncFrom(this.video1);
                    this.updateProgress();
                });
                this.video2.addEventListener('timeupdate', () => {
                    this.syncFrom(this.video2);
                });
                this.video1.addEventListener('loadedmetadata', () => {
                    this.durationDisplay.textContent = this.formatTime(this.video1.duration);
                });

                // Mirror play/pause in both directions.
                this.video1.addEventListener('play', () => { this.video2.play(); });
                this.video1.addEventListener('pause', () => { this.video2.pause(); });
                this.video2.addEventListener('play', () => { this.video1.play(); });
                this.video2.addEventListener('pause', () => { this.video1.pause(); });

                this.playPauseBtn.addEventListener('click', () => this.togglePlayPause());
                document.getElementById('stepBackBtn').addEventListener('click', () => this.stepBackward());
                document.getElementById('stepFwdBtn').addEventListener('click', () => this.stepForward());
                this.seekBar.addEventListener('input', () => this.seek());

                document.querySelectorAll('.speed-btn').forEach((btn) => {
                    btn.addEventListener('click', () => this.setSpeed(parseFloat(btn.dataset.speed), btn));
                });

                document.addEventListener('keydown', (e) => {
                    switch (e.key) {
                        case ' ':
                            e.preventDefault();
                            this.togglePlayPause();
                            break;
                        case 'ArrowRight':
                            this.stepForward();
                            break;
                        case 'ArrowLeft':
                            this.stepBackward();
                            break;
                    }
                });
            }

            // Whichever video last moved drives the other; only nudge when
            // drift exceeds the tolerance so the two elements do not keep
            // correcting each other.
            syncFrom(source) {
                if (this.seeking) return;
                const target = source === this.video1 ? this.video2 : this.video1;
                if (Math.abs(source.currentTime - target.currentTime) > 0.05) {
                    target.currentTime = source.currentTime;
                }
            }

            togglePlayPause() {
                if (this.video1.paused) {
                    this.video1.play();
                    this.video2.play();
                    this.playPauseBtn.innerHTML = '&#9208; Pause';
                } else {
                    this.pauseBoth();
                }
            }

            pauseBoth() {
                this.video1.pause();
                this.video2.pause();
                this.playPauseBtn.innerHTML = '&#9654; Play';
            }

            seek() {
                this.seeking = true;
                const time = (this.seekBar.value / 100) * this.video1.duration;
                this.video1.currentTime = time;
                this.video2.currentTime = time;
                setTimeout(() => { this.seeking = false; }, 100);
            }

            updateProgress() {
                if (!this.seeking && this.video1.duration) {
                    this.seekBar.value = (this.video1.currentTime / this.video1.duration) * 100;
                    this.currentTimeDisplay.textContent = this.formatTime(this.video1.currentTime);
                }
            }

            formatTime(seconds) {
                const mins = Math.floor(seconds / 60);
                const secs = (seconds % 60).toFixed(2);
                return mins + ':' + secs.padStart(5, '0');
            }

            setSpeed(speed, activeBtn) {
                this.video1.playbackRate = speed;
                this.video2.playbackRate = speed;
                document.querySelectorAll('.speed-btn').forEach((btn) => {
                    btn.classList.remove('active');
                });
                activeBtn.classList.add('active');
            }

            // One "frame" is approximated as 1/30 s; the true source rate is
            // not propagated into this document.
            stepForward() {
                this.pauseBoth();
                const fps = 30;
                this.video1.currentTime = Math.min(this.video1.currentTime + 1 / fps, this.video1.duration);
                this.video2.currentTime = this.video1.currentTime;
            }

            stepBackward() {
                this.pauseBoth();
                const fps = 30;
                this.video1.currentTime = Math.max(this.video1.currentTime - 1 / fps, 0);
                this.video2.currentTime = this.video1.currentTime;
            }
        }

        window.addEventListener('DOMContentLoaded', () => {
            new PlaybackController();
        });
    </script>
</body>
</html>
"##;
