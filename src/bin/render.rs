//! Demo/verification CLI: renders a song blob to a WAV file and, optionally, a
//! chrome-trace-compatible JSON file. Supplements the core with the two
//! host-level behaviors `original_source`'s `PlayerTest/main.cpp` demonstrates
//! (see SPEC_FULL.md §10) — neither is part of the renderer core itself.

use std::path::PathBuf;

use clap::Parser;
use songrender::devices::demo_device_factory;
use songrender::Renderer;

#[derive(Parser)]
#[command(about = "Renders a song blob to a WAV file")]
struct Args {
    /// Path to the song blob to render.
    song: PathBuf,

    /// Number of worker threads racing to render tracks.
    #[arg(long, default_value_t = 3)]
    workers: usize,

    /// Output WAV path.
    #[arg(long, default_value = "out.wav")]
    out: PathBuf,

    /// Optional chrome-trace JSON output path (open at chrome://tracing).
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// Render duration in seconds, overriding the song's own declared length.
    #[arg(long)]
    seconds: Option<f64>,

    /// Stereo samples rendered per `render_samples` call.
    #[arg(long, default_value_t = 1024)]
    block_size: usize,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<(), String> {
    let blob = std::fs::read(&args.song).map_err(|e| format!("failed to read {}: {e}", args.song.display()))?;

    let renderer = Renderer::new(&blob, args.workers, demo_device_factory);
    let seconds = args.seconds.unwrap_or_else(|| renderer.get_length());
    let sample_rate = renderer.get_sample_rate();

    tracing::info!(
        tempo = renderer.get_tempo(),
        sample_rate,
        seconds,
        workers = args.workers,
        "rendering song"
    );

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&args.out, spec)
        .map_err(|e| format!("failed to create {}: {e}", args.out.display()))?;

    let total_stereo_samples = (seconds * sample_rate as f64) as usize * 2;
    let block_stereo_samples = args.block_size * 2;
    let mut rendered = 0usize;
    let mut buf = vec![0i16; block_stereo_samples];

    while rendered < total_stereo_samples {
        let remaining = total_stereo_samples - rendered;
        let this_block = remaining.min(block_stereo_samples);
        renderer.render_samples(&mut buf[..this_block]);
        for &sample in &buf[..this_block] {
            writer
                .write_sample(sample)
                .map_err(|e| format!("failed to write sample: {e}"))?;
        }
        rendered += this_block;
    }

    writer.finalize().map_err(|e| format!("failed to finalize WAV: {e}"))?;
    tracing::info!(path = %args.out.display(), "wrote WAV output");

    if let Some(trace_path) = args.trace_out {
        let events = renderer.trace_events();
        let json = serde_json::to_string_pretty(&events).map_err(|e| format!("failed to serialize trace: {e}"))?;
        std::fs::write(&trace_path, json).map_err(|e| format!("failed to write {}: {e}", trace_path.display()))?;
        tracing::info!(path = %trace_path.display(), events = events.len(), "wrote chrome-trace JSON");
    }

    Ok(())
}
