use std::path::{Path, PathBuf};
use std::{fs, process};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

use chase_replay::{
    ReplayConfig,
    engine::Replay,
    player::Player,
    renderer::{ArtifactFormat, Recorder},
    scene::Scene,
    types::PlayablePresentation,
    viewer::Viewer,
};

#[derive(Parser, Debug)]
#[command(name = "chase-replay", version, about = "Replay a two-agent pursuit on a graph")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Config file (defaults to ~/.config/chase-replay/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record every frame and write a standalone artifact.
    Export(ExportArgs),
    /// Replay live in the terminal.
    Watch(WatchArgs),
    /// Play back a previously exported JSON artifact.
    Play {
        /// Artifact written by `export --format json`.
        artifact: PathBuf,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Graph document with adjacency, positions and metadata.
    #[arg(long, default_value = "graph_with_metadata.json")]
    graph: PathBuf,

    /// Simulation step log.
    #[arg(long, default_value = "simulation.json")]
    history: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Args, Debug)]
struct Overrides {
    /// Canvas width in cells.
    #[arg(long)]
    width: Option<u16>,

    /// Canvas height in cells.
    #[arg(long)]
    height: Option<u16>,

    #[arg(long)]
    padding: Option<u16>,

    /// Milliseconds between frames.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Delay of agent B when the history does not carry one.
    #[arg(long)]
    delay: Option<u32>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output artifact path.
    #[arg(long)]
    out: PathBuf,

    /// Artifact format; defaults from the output extension.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Html,
    Json,
}

impl From<FormatChoice> for ArtifactFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Html => ArtifactFormat::Html,
            FormatChoice::Json => ArtifactFormat::Json,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ReplayConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    match cli.cmd {
        Command::Export(args) => export(args, config),
        Command::Watch(args) => watch(args, config),
        Command::Play { artifact } => play(&artifact, config),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn resolve(mut config: ReplayConfig, overrides: &Overrides) -> Result<ReplayConfig> {
    if let Some(width) = overrides.width {
        config.width = width;
    }
    if let Some(height) = overrides.height {
        config.height = height;
    }
    if let Some(padding) = overrides.padding {
        config.padding = padding;
    }
    if let Some(tick_ms) = overrides.tick_ms {
        config.tick_ms = tick_ms;
    }
    if let Some(delay) = overrides.delay {
        config.default_delay = delay;
    }
    config.validate()?;
    Ok(config)
}

fn load_replay(input: &InputArgs, config: &ReplayConfig) -> Result<Replay> {
    Replay::load(&input.graph, &input.history, config).with_context(|| {
        format!(
            "Failed to load {} and {}",
            input.graph.display(),
            input.history.display()
        )
    })
}

fn export(args: ExportArgs, config: ReplayConfig) -> Result<()> {
    let config = resolve(config, &args.input.overrides)?;
    let replay = load_replay(&args.input, &config)?;
    let scene = Scene::new(&replay, &config);
    let recording = Recorder::record(&replay, &scene, config.tick_ms);

    let format = args
        .format
        .map(ArtifactFormat::from)
        .unwrap_or_else(|| ArtifactFormat::from_path(&args.out));
    recording.write(&args.out, format)?;

    eprintln!(
        "Exported {} frames -> {}",
        recording.frames.len(),
        args.out.display(),
    );
    Ok(())
}

fn watch(args: WatchArgs, config: ReplayConfig) -> Result<()> {
    let config = resolve(config, &args.input.overrides)?;
    let replay = load_replay(&args.input, &config)?;
    let scene = Scene::new(&replay, &config);
    let mut viewer = Viewer::new(&replay, scene, config.key_bindings.clone(), config.tick_ms);
    viewer.run()
}

fn play(path: &Path, config: ReplayConfig) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let presentation: PlayablePresentation = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut player = Player::new(presentation, config.key_bindings);
    player.play()
}
