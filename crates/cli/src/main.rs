use anyhow::{bail, Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use timeline::{Clip, LayoutConfig, MediaKind, ResolutionResolver, Timeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sector-cli")]
#[command(about = "Lay out imported clips on per-day camera and audio tracks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Layout config (track labels, day offset, sector names)
    #[arg(short, long, global = true, default_value = "layout.json")]
    config: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a clip manifest into a project
    Import {
        /// JSON array of clips
        #[arg(short, long)]
        manifest: PathBuf,

        /// Project file, created if missing
        #[arg(short, long)]
        project: PathBuf,

        /// Seed for synthetic camera ids
        #[arg(long)]
        seed: Option<u64>,

        /// Report the layout without writing the project
        #[arg(long)]
        dry_run: bool,
    },

    /// Check a project for overlapping clips, duplicate indices and stale caches
    Check {
        project: PathBuf,
    },

    /// Print sectors and tracks of a project
    Summary {
        project: PathBuf,
    },

    /// Write the default layout config
    InitConfig {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Import {
            manifest,
            project,
            seed,
            dry_run,
        } => import_command(&cli.config, manifest, project, seed, dry_run),
        Commands::Check { project } => check_command(&cli.config, project),
        Commands::Summary { project } => summary_command(project),
        Commands::InitConfig { path, force } => init_config_command(path, force),
    }
}

fn import_command(
    config_path: &Path,
    manifest: PathBuf,
    project_path: PathBuf,
    seed: Option<u64>,
    dry_run: bool,
) -> Result<()> {
    let config = LayoutConfig::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let raw = std::fs::read(&manifest)
        .with_context(|| format!("reading manifest {}", manifest.display()))?;
    let clips: Vec<Clip> = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing manifest {}", manifest.display()))?;
    info!("Importing {} clips from {:?}", clips.len(), manifest);

    let untimed = clips.iter().filter(|c| !c.has_timing()).count();
    if untimed > 0 {
        warn!("{} clips have no start time or duration and will be laid out at zero", untimed);
    }

    let mut timeline = if project_path.exists() {
        load_project(&project_path)?
    } else {
        info!("Creating new project: {:?}", project_path);
        Timeline::new()
    };

    let resolver = match seed {
        Some(seed) => ResolutionResolver::with_seed(config.labels.clone(), seed),
        None => ResolutionResolver::new(config.labels.clone()),
    };
    let report = timeline.import_clips(clips, &config, &resolver)?;

    for placement in &report.placements {
        info!(
            "  {} -> {}{}",
            placement.clip_id,
            placement.track_name,
            if placement.created { " (new)" } else { "" }
        );
    }
    info!(
        "Placed {} clips; {} new sectors, {} new tracks",
        report.placements.len(),
        report.sectors_created,
        report.tracks_created
    );

    if dry_run {
        info!("Dry run, project not written");
        return Ok(());
    }
    save_project(&project_path, &timeline)?;
    info!("Project saved: {:?}", project_path);
    Ok(())
}

fn check_command(config_path: &Path, project_path: PathBuf) -> Result<()> {
    let config = LayoutConfig::load(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let timeline = load_project(&project_path)?;
    let resolver = ResolutionResolver::new(config.labels.clone());
    let violations = timeline.violations(&resolver);
    if violations.is_empty() {
        info!(
            "{:?}: {} sectors, {} tracks, {} clips, no problems found",
            project_path,
            timeline.sectors.len(),
            timeline.track_count(),
            timeline.clip_count()
        );
        return Ok(());
    }
    for violation in &violations {
        println!("{}", violation);
    }
    bail!("{} problems found in {:?}", violations.len(), project_path)
}

fn summary_command(project_path: PathBuf) -> Result<()> {
    let timeline = load_project(&project_path)?;
    for sector in &timeline.sectors {
        println!(
            "{}  {} .. {}  ({} tracks, {} clips)",
            sector.name,
            format_time(sector.start_time),
            format_time(sector.end_time),
            sector.tracks.len(),
            sector.clip_count()
        );
        for kind in [MediaKind::Video, MediaKind::Audio] {
            let mut tracks: Vec<_> = sector.tracks_of(kind).collect();
            tracks.sort_by_key(|t| t.index);
            for track in tracks {
                println!(
                    "  [{} {}] {:<12} {:>3} clips  {:>9.1}s  {}",
                    kind,
                    track.index,
                    track.name,
                    track.clips.len(),
                    track.combined_duration,
                    track.camera_id.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn init_config_command(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{:?} already exists, use --force to overwrite", path);
    }
    LayoutConfig::default()
        .save(&path)
        .with_context(|| format!("writing config {}", path.display()))?;
    info!("Default config written: {:?}", path);
    Ok(())
}

fn load_project(path: &Path) -> Result<Timeline> {
    let raw = std::fs::read(path).with_context(|| format!("reading project {}", path.display()))?;
    let timeline = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing project {}", path.display()))?;
    Ok(timeline)
}

fn save_project(path: &Path, timeline: &Timeline) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating project dir {}", dir.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(timeline)?;
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("writing project {}", path.display()))?;
    Ok(())
}

fn format_time(seconds: f64) -> String {
    DateTime::from_timestamp(seconds.floor() as i64, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{seconds:.0}s"))
}
