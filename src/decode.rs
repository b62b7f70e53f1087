use std::{
    io::{BufReader, Read},
    path::PathBuf,
    process::{Child, ChildStdout, Command, Stdio},
};

use image::RgbImage;

use crate::{
    error::{SpectroError, SpectroResult},
    probe::VideoSourceInfo,
};

/// Streaming frame reader over a system `ffmpeg` child process.
///
/// Frames arrive as packed `rgb24` raw video on the child's stdout, one
/// `width * height * 3` block per frame, in presentation order. The child is
/// spawned once and read to end-of-stream; there is no seeking.
pub struct FfmpegDecoder {
    width: u32,
    height: u32,
    source_path: PathBuf,
    stdout: Option<BufReader<ChildStdout>>,
    child: Option<Child>,
}

impl FfmpegDecoder {
    /// Spawn ffmpeg for `source` and start streaming decoded frames.
    ///
    /// We intentionally drive the system `ffmpeg` binary rather than linking
    /// a native FFmpeg crate, which would pull in dev header/lib requirements.
    pub fn open(source: &VideoSourceInfo) -> SpectroResult<Self> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args(["-v", "error", "-i"])
            .arg(&source.source_path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-an", "pipe:1"]);

        let mut child = cmd.spawn().map_err(|e| {
            SpectroError::codec(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpectroError::codec("failed to open ffmpeg stdout (unexpected)"))?;

        Ok(Self {
            width: source.width,
            height: source.height,
            source_path: source.source_path.clone(),
            stdout: Some(BufReader::new(stdout)),
            child: Some(child),
        })
    }

    /// Read the next decoded frame, or `None` on clean end-of-stream.
    ///
    /// A stream that ends mid-frame is an error, not a short final frame.
    pub fn next_frame(&mut self) -> SpectroResult<Option<RgbImage>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Err(SpectroError::codec("ffmpeg decoder is already finalized"));
        };

        let mut buf = vec![0u8; self.width as usize * self.height as usize * 3];
        if !read_frame_into(stdout, &mut buf)? {
            return Ok(None);
        }

        RgbImage::from_raw(self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| SpectroError::codec("decoded frame buffer size mismatch (unexpected)"))
    }

    /// Close the stream and reap the child, surfacing its exit status.
    pub fn finish(mut self) -> SpectroResult<()> {
        drop(self.stdout.take());
        let Some(child) = self.child.take() else {
            return Ok(());
        };

        let output = child.wait_with_output().map_err(|e| {
            SpectroError::codec(format!("failed to wait for ffmpeg decoder: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpectroError::codec(format!(
                "ffmpeg decode failed for '{}' with status {}: {}",
                self.source_path.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        // Error-path cleanup. `finish()` takes the child on the success path.
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Fill `buf` with exactly one frame from `reader`.
///
/// Returns `Ok(false)` on end-of-stream before the first byte, `Ok(true)` on a
/// complete frame, and an error if the stream ends partway through a frame.
fn read_frame_into(reader: &mut impl Read, buf: &mut [u8]) -> SpectroResult<bool> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(SpectroError::codec(format!(
                    "truncated frame from decoder: got {filled} of {} bytes",
                    buf.len()
                )));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                return Err(SpectroError::codec(format!(
                    "failed to read frame from ffmpeg stdout: {e}"
                )));
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn full_frame_reads_true() {
        let data = vec![7u8; 12];
        let mut buf = vec![0u8; 12];
        assert!(read_frame_into(&mut Cursor::new(&data), &mut buf).unwrap());
        assert_eq!(buf, data);
    }

    #[test]
    fn clean_eof_reads_false() {
        let mut buf = vec![0u8; 12];
        assert!(!read_frame_into(&mut Cursor::new(&[]), &mut buf).unwrap());
    }

    #[test]
    fn partial_frame_is_an_error() {
        let data = vec![7u8; 5];
        let mut buf = vec![0u8; 12];
        let err = read_frame_into(&mut Cursor::new(&data), &mut buf).unwrap_err();
        assert!(err.to_string().contains("truncated frame"));
    }
}
