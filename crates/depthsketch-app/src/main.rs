//! Main application entry point.

use depthsketch_app::{AppError, AppResult, Session, ShortcutRegistry, Summary, layer_panel, object_panel};
use depthsketch_core::CanvasConfig;
use std::fs;
use std::path::{Path, PathBuf};

const USAGE: &str = "depthsketch [--config <config.json>] [--summary <out.json>] [--shortcuts] <session.json>";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    summary: Option<PathBuf>,
    shortcuts: bool,
    session: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> AppResult<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(next_path(&mut args, "--config")?),
            "--summary" => parsed.summary = Some(next_path(&mut args, "--summary")?),
            "--shortcuts" => parsed.shortcuts = true,
            flag if flag.starts_with("--") => {
                return Err(AppError::Usage(format!("unknown option {flag}\n{USAGE}")));
            }
            _ => parsed.session = Some(PathBuf::from(arg)),
        }
    }
    Ok(parsed)
}

fn next_path(args: &mut impl Iterator<Item = String>, flag: &str) -> AppResult<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| AppError::Usage(format!("{flag} needs a path\n{USAGE}")))
}

fn load_config(path: &Path) -> AppResult<CanvasConfig> {
    let json = fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    CanvasConfig::from_json(&json).map_err(|e| {
        AppError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn run() -> AppResult<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.shortcuts {
        ShortcutRegistry::print_all();
        if args.session.is_none() {
            return Ok(());
        }
    }
    let Some(session_path) = args.session else {
        return Err(AppError::Usage(USAGE.to_string()));
    };

    let config = args.config.as_deref().map(load_config).transpose()?;
    let session = Session::load(&session_path)?;
    log::info!(
        "Loaded {} events from {}",
        session.events.len(),
        session_path.display()
    );

    let mut canvas = session.canvas(config);
    session.replay(&mut canvas);

    print!("{}", layer_panel(&canvas));
    for index in 0..canvas.layers().len() {
        if let Some(panel) = object_panel(&canvas, index) {
            print!("\n{panel}");
        }
    }

    let summary = Summary::of(&canvas);
    log::info!(
        "{} strokes, {} redoable, {} scene nodes",
        summary.strokes,
        summary.redo,
        summary.scene_nodes
    );
    if let Some(path) = args.summary {
        summary.save(&path)?;
        log::info!("Wrote summary to {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Starting DepthSketch");

    if let Err(err) = run() {
        log::error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
