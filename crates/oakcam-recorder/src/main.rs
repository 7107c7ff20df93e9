//! oakcam recorder entry point.
//!
//! # Usage
//!
//! ```text
//! oakcam-recorder [--settings-dir <DIR>] <COMMAND>
//!
//! Commands:
//!   record     Record encoded streams into a new session, then convert them
//!   controls   Adjust exposure, ISO and focus from the keyboard
//!   transcode  Convert the raw streams of a recording directory to MP4
//! ```
//!
//! `record` reads each stream the device runtime writes to a file or FIFO
//! (`--mono1`, `--mono2`, `--color`) until Ctrl-C or until every stream ends,
//! then converts the session to MP4 unless `--no-transcode` is given.
//!
//! `controls` reads keystrokes from stdin (type keys, then Enter).  Without a
//! device runtime linked in, commands are logged instead of sent; manual
//! exposure and focus values are still saved to `grey.yaml` so the next
//! recording starts from them.
//!
//! # Environment variable overrides
//!
//! | Variable              | Default  | Description                        |
//! |-----------------------|----------|------------------------------------|
//! | `OAKCAM_SETTINGS_DIR` | `.`      | Directory holding the YAML files   |
//! | `OAKCAM_FFMPEG`       | `ffmpeg` | ffmpeg executable used to transcode |
//! | `RUST_LOG`            | `info`   | Log filter                         |

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use oakcam_core::{ManualControls, SettingsStore};
use oakcam_recorder::application::apply_settings::apply_settings;
use oakcam_recorder::application::control_loop::run_control_loop;
use oakcam_recorder::application::finalize_session::{finalize_session, FinalizeOptions};
use oakcam_recorder::application::record_session::record_session;
use oakcam_recorder::domain::{RecordingSession, StreamKind};
use oakcam_recorder::infrastructure::control_sink::LogControlSink;
use oakcam_recorder::infrastructure::packet_source::pipe::PipePacketSource;
use oakcam_recorder::infrastructure::packet_source::PacketSource;
use oakcam_recorder::infrastructure::transcoder::{
    FfmpegTranscoder, DEFAULT_FFMPEG, DEFAULT_FRAMERATE,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Depth-camera recording and control tools.
#[derive(Debug, Parser)]
#[command(name = "oakcam-recorder", version)]
struct Cli {
    /// Directory holding `grey.yaml` and `color.yaml`.
    #[arg(long, global = true, default_value = ".", env = "OAKCAM_SETTINGS_DIR")]
    settings_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record encoded streams into a new session, then convert them to MP4.
    Record {
        /// Directory receiving the `record_*` session directories.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Raw H.264 stream of the left mono camera (file or FIFO).
        #[arg(long)]
        mono1: Option<PathBuf>,

        /// Raw H.264 stream of the right mono camera (file or FIFO).
        #[arg(long)]
        mono2: Option<PathBuf>,

        /// Raw H.265 stream of the color camera (file or FIFO).
        #[arg(long)]
        color: Option<PathBuf>,

        /// Leave the raw streams unconverted.
        #[arg(long)]
        no_transcode: bool,

        #[command(flatten)]
        transcode: TranscodeArgs,
    },

    /// Adjust exposure, ISO and focus from the keyboard.
    Controls,

    /// Convert the raw streams of a recording directory to MP4.
    Transcode {
        /// Recording directory (`record_YYYYmmdd_HH.MM.SS`).
        dir: PathBuf,

        #[command(flatten)]
        transcode: TranscodeArgs,
    },
}

#[derive(Debug, Args)]
struct TranscodeArgs {
    /// ffmpeg executable.
    #[arg(long, default_value = DEFAULT_FFMPEG, env = "OAKCAM_FFMPEG")]
    ffmpeg: PathBuf,

    /// Input frame rate passed to ffmpeg.
    #[arg(long, default_value_t = DEFAULT_FRAMERATE)]
    framerate: u32,

    /// Keep the raw .h264/.h265 files after converting.
    #[arg(long)]
    keep_raw: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Record {
            output_dir,
            mono1,
            mono2,
            color,
            no_transcode,
            transcode,
        } => {
            let streams = [
                (StreamKind::MonoLeft, mono1),
                (StreamKind::MonoRight, mono2),
                (StreamKind::Color, color),
            ];
            let session = run_record(&cli.settings_dir, &output_dir, streams).await?;
            if no_transcode {
                info!("raw streams kept in {}", session.dir().display());
                return Ok(());
            }
            run_transcode(&session, &transcode).await
        }
        Command::Controls => run_controls(cli.settings_dir).await,
        Command::Transcode { dir, transcode } => {
            run_transcode(&RecordingSession::from_dir(dir), &transcode).await
        }
    }
}

async fn run_record(
    settings_dir: &Path,
    output_dir: &Path,
    streams: [(StreamKind, Option<PathBuf>); 3],
) -> anyhow::Result<RecordingSession> {
    let inputs: Vec<(StreamKind, Box<dyn PacketSource>)> = streams
        .into_iter()
        .filter_map(|(kind, path)| {
            path.map(|path| (kind, Box::new(PipePacketSource::new(path)) as Box<dyn PacketSource>))
        })
        .collect();
    if inputs.is_empty() {
        anyhow::bail!("no streams to record; pass --mono1, --mono2 and/or --color");
    }

    let grey_path = settings_dir.join("grey.yaml");
    let color_path = settings_dir.join("color.yaml");
    let grey = SettingsStore::open(&grey_path)
        .with_context(|| format!("opening {}", grey_path.display()))?;
    let color = SettingsStore::open(&color_path)
        .with_context(|| format!("opening {}", color_path.display()))?;
    apply_settings(&grey, &color, &LogControlSink).context("applying saved settings")?;

    info!("recording {} stream(s).  Press Ctrl-C to stop.", inputs.len());
    let started_at = chrono::Local::now().naive_local();
    let recorded = record_session(output_dir, started_at, inputs, shutdown_signal())
        .await
        .context("recording failed")?;

    for stats in &recorded.streams {
        info!("{}: {} bytes", stats.kind, stats.bytes);
    }
    Ok(recorded.session)
}

async fn run_transcode(session: &RecordingSession, args: &TranscodeArgs) -> anyhow::Result<()> {
    let transcoder = FfmpegTranscoder::new(args.ffmpeg.clone(), args.framerate);
    let options = FinalizeOptions {
        keep_raw: args.keep_raw,
    };
    let report = finalize_session(session, &transcoder, options).await;
    info!(
        "converted {} stream(s), {} failed, {} missing",
        report.converted.len(),
        report.failed.len(),
        report.missing.len()
    );
    if !report.is_success() {
        anyhow::bail!("some streams could not be converted; raw files were kept");
    }
    Ok(())
}

/// Resolves on Ctrl-C.  Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

async fn run_controls(settings_dir: PathBuf) -> anyhow::Result<()> {
    let grey_path = settings_dir.join("grey.yaml");
    let color_path = settings_dir.join("color.yaml");

    // Reading stdin blocks, so the whole loop runs off the async workers.
    let summary = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let mut grey = SettingsStore::open(&grey_path)
            .with_context(|| format!("opening {}", grey_path.display()))?;
        let color = SettingsStore::open(&color_path)
            .with_context(|| format!("opening {}", color_path.display()))?;

        let sink = LogControlSink;
        apply_settings(&grey, &color, &sink).context("applying saved settings")?;

        let mut controls = ManualControls::from_settings(&grey);
        info!(
            "manual controls: exposure {} us, iso {}, lens {}",
            controls.exposure_us(),
            controls.iso(),
            controls.lens_position()
        );
        info!("keys: I/O exposure, K/L iso, ,/. focus, C capture, T/F autofocus, E autoexposure, Q quit");

        let stdin = std::io::stdin();
        let summary = run_control_loop(stdin.lock(), &mut controls, &mut grey, &sink)?;
        Ok(summary)
    })
    .await
    .context("control loop panicked")??;

    if !summary.quit_requested {
        warn!("input closed before quit");
    }
    info!("sent {} command(s)", summary.commands_sent);
    Ok(())
}
