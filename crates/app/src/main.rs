mod signal;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use soundmesh_core::{
    AnalysisEngine, AppConfig, DataSource, EffectRegistry, EffectType, FrameAction, FrameStats,
    RenderGraph,
};
use tracing_subscriber::EnvFilter;

use crate::signal::TestSignal;

fn main() -> soundmesh_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Effects => {
            for kind in EffectType::ALL {
                println!("{kind}");
            }
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> soundmesh_core::Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(name) = &args.effect {
        config.visualiser.effect = name.parse()?;
    }
    if let Some(source) = args.source {
        config.visualiser.source = source.into();
    }
    tracing::info!(
        effect = %config.visualiser.effect,
        frames = args.frames,
        detail = config.visualiser.detail_level,
        "starting run"
    );

    let mut analysis = AnalysisEngine::from_config(&config.audio);
    let mut signal = TestSignal::new(config.audio.sample_rate, config.visualiser.bpm);
    let mut graph = RenderGraph::new();
    let mut registry = EffectRegistry::new();
    let mut effect = config.visualiser.effect;
    let mut stats = FrameStats::default();

    for frame in 0..args.frames {
        if let Some(every) = args.switch_every.filter(|every| *every > 0) {
            if frame > 0 && frame % every == 0 {
                effect = effect.next();
            }
        }

        let block = signal.next_block(config.audio.block_size);
        let analysed = analysis.process_block(&block)?;
        let audio_data = match config.visualiser.source {
            DataSource::Waveform => analysed.waveform,
            DataSource::Spectrum => analysed.spectrum,
        };

        let mut props = config.visualiser.props(audio_data);
        props.effect_type = effect;
        if let Some(tempo) = analysis.summary().tempo_bpm {
            props.bpm = tempo;
        }

        if let FrameAction::Activated(kind) = registry.frame(&mut graph, &props)? {
            tracing::info!(effect = %kind, frame, "effect activated");
        }
        stats = graph.draw()?;
    }

    tracing::info!(
        meshes = stats.meshes,
        vertices = stats.vertices,
        primitives = stats.primitives,
        allocated = stats.store.allocated,
        released = stats.store.released,
        tempo = ?analysis.summary().tempo_bpm,
        "run finished"
    );

    if let Some(path) = &args.dump {
        let report = json!({
            "frames": args.frames,
            "effect": effect,
            "tempo_bpm": analysis.summary().tempo_bpm,
            "stats": stats,
        });
        std::fs::write(path, serde_json::to_vec_pretty(&report)?)?;
        tracing::info!(?path, "wrote run report");
    }

    registry.deactivate(&mut graph);
    let leaked = graph.store().live_count();
    if leaked > 0 {
        tracing::warn!(leaked, "geometry buffers still live after shutdown");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive mesh effects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the effects from a synthetic signal and report what was drawn.
    Run(RunArgs),
    /// List the available effect names.
    Effects,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Effect to start with; overrides the config file.
    #[arg(short, long)]
    effect: Option<String>,
    /// Number of frames to render.
    #[arg(short, long, default_value_t = 300)]
    frames: u64,
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Move to the next effect every N frames.
    #[arg(long)]
    switch_every: Option<u64>,
    /// Which analysis output feeds the effects.
    #[arg(long, value_enum)]
    source: Option<SourceArg>,
    /// Write the final frame statistics to this path as JSON.
    #[arg(long)]
    dump: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    Waveform,
    Spectrum,
}

impl From<SourceArg> for DataSource {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Waveform => DataSource::Waveform,
            SourceArg::Spectrum => DataSource::Spectrum,
        }
    }
}
