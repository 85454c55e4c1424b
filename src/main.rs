//! `coreflow-viewer [preset|config.json] [--seed N]`
//!
//! Opens a window and plays one scene. Set `RUST_LOG=coreflow_fx=debug` for
//! per-frame diagnostics.

use std::process::ExitCode;

use coreflow_fx::config::SceneConfig;
use coreflow_fx::error::{ConfigError, ViewerError};
use coreflow_fx::presets::PRESET_NAMES;
use coreflow_fx::scene::Scene;
use coreflow_fx::window::App;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

struct Args {
    scene: String,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args, ConfigError> {
    let mut args = Args {
        scene: PRESET_NAMES[0].to_string(),
        seed: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| ConfigError::Invalid("--seed needs a value".into()))?;
                let seed = value
                    .parse()
                    .map_err(|_| ConfigError::Invalid(format!("bad seed '{}'", value)))?;
                args.seed = Some(seed);
            }
            "-h" | "--help" => {
                println!("usage: coreflow-viewer [preset|config.json] [--seed N]");
                println!("presets: {}", PRESET_NAMES.join(", "));
                std::process::exit(0);
            }
            other => args.scene = other.to_string(),
        }
    }
    Ok(args)
}

fn load_scene(args: &Args) -> Result<Scene, ConfigError> {
    if args.scene.ends_with(".json") {
        let mut config = SceneConfig::load(&args.scene)?;
        if args.seed.is_some() {
            config.seed = args.seed;
        }
        Scene::mount(config)
    } else {
        Scene::preset(&args.scene, args.seed)
    }
}

fn run() -> Result<(), ViewerError> {
    let args = parse_args()?;
    let scene = load_scene(&args)?;
    tracing::info!(scene = %scene.config().name, seed = scene.seed(), "starting viewer");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("coreflow_fx=info,coreflow_viewer=info")
        }))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
