use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "spectroview", version)]
#[command(about = "Render a video's per-frame 2D FFT spectrum and a synchronized HTML viewer")]
struct Cli {
    /// Input video file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file (per-frame log-magnitude spectrum).
    #[arg(short, long, default_value = "output_fft.mp4")]
    output: PathBuf,

    /// Output HTML viewer document.
    #[arg(long, default_value = "visualization.html")]
    html: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Checked before any child process is spawned so the failure names the
    // path instead of surfacing as an ffprobe error.
    if !cli.input.exists() {
        anyhow::bail!("input file not found: {}", cli.input.display());
    }

    let summary = spectroview::process_video(&cli.input, &cli.output)?;
    spectroview::write_viewer(&cli.input, &cli.output, &cli.html)?;

    println!("viewer saved to: {}", cli.html.display());
    println!(
        "done: {} frames at {}x{}; open {} in a browser to compare",
        summary.frames,
        summary.width,
        summary.height,
        cli.html.display()
    );
    Ok(())
}
