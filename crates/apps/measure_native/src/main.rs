//! Replays a JSON script of toolbar presses and mouse events against the
//! synthetic ellipsoid globe and prints the resulting measurement log.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use foundation::math::Vec2;
use measure::engine::{FlatTerrain, Viewport};
use measure::toolbar::ButtonId;
use measure::{EllipsoidEngine, GroupId, InputEvent, MeasureConfig, MeasureToolbox, Tool};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to replay.
    script: PathBuf,
    /// Toolbox config (JSON). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print every emitted event as a JSON line before the log.
    #[arg(short, long)]
    events: bool,
    /// Degrees per screen pixel of the synthetic viewport.
    #[arg(long, default_value_t = 1.0e-5)]
    deg_per_px: f64,
    /// Constant terrain height in meters.
    #[arg(long, default_value_t = 0.0)]
    terrain_m: f64,
}

/// One script step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    /// Presses a toolbar button by key, e.g. `tool-distance` or `clear`.
    Press { button: String },
    Activate { tool: Tool },
    Deactivate,
    Input { event: InputEvent },
    /// Mouse down, up and click at one spot.
    Click { x: f64, y: f64 },
    Drag { from: Vec2, to: Vec2 },
    Finish { x: f64, y: f64 },
    Select { group: GroupId },
    Delete { group: GroupId },
    Visible { group: GroupId, visible: bool },
    /// Replaces the summary label text of `group`.
    Label { group: GroupId, text: String },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Script {
    steps: Vec<Step>,
}

fn apply(toolbox: &mut MeasureToolbox<EllipsoidEngine>, step: Step) -> Result<()> {
    debug!(?step, "applying step");
    match step {
        Step::Press { button } => {
            let id =
                ButtonId::from_key(&button).ok_or_else(|| anyhow!("unknown button {button:?}"))?;
            toolbox.press(id);
        }
        Step::Activate { tool } => toolbox.activate(tool),
        Step::Deactivate => toolbox.deactivate(),
        Step::Input { event } => toolbox.handle_input(event),
        Step::Click { x, y } => {
            toolbox.handle_input(InputEvent::left_down(x, y));
            toolbox.handle_input(InputEvent::left_up(x, y));
            toolbox.handle_input(InputEvent::left_click(x, y));
        }
        Step::Drag { from, to } => {
            toolbox.handle_input(InputEvent::left_down(from.x, from.y));
            toolbox.handle_input(InputEvent::mouse_move(to.x, to.y));
            toolbox.handle_input(InputEvent::left_up(to.x, to.y));
            toolbox.handle_input(InputEvent::left_click(to.x, to.y));
        }
        Step::Finish { x, y } => toolbox.handle_input(InputEvent::right_click(x, y)),
        Step::Select { group } => toolbox.select(group)?,
        Step::Delete { group } => toolbox.delete_annotation(group)?,
        Step::Visible { group, visible } => toolbox.set_annotation_visible(group, visible)?,
        Step::Label { group, text } => {
            let entity = toolbox
                .summary_label(group)
                .ok_or_else(|| anyhow!("annotation {group} has no summary label"))?;
            toolbox.set_label_text(entity, text)?;
        }
        Step::Clear => toolbox.clear(),
    }
    Ok(())
}

fn replay(
    script: Script,
    config: MeasureConfig,
    engine: EllipsoidEngine,
) -> Result<MeasureToolbox<EllipsoidEngine>> {
    let mut toolbox = MeasureToolbox::new(engine, config);
    for (index, step) in script.steps.into_iter().enumerate() {
        apply(&mut toolbox, step).with_context(|| format!("step {index}"))?;
    }
    Ok(toolbox)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => MeasureConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MeasureConfig::default(),
    };
    let json = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&json).context("parsing script")?;
    info!(steps = script.steps.len(), "replaying script");

    let viewport = Viewport {
        deg_per_px: args.deg_per_px,
        ..Viewport::default()
    };
    let engine = EllipsoidEngine::new(viewport).with_terrain(FlatTerrain(args.terrain_m));
    let mut toolbox = replay(script, config, engine)?;

    if args.events {
        for event in toolbox.take_events() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    println!("{}", toolbox.log().to_json()?);
    info!(
        measurements = toolbox.log().len(),
        frames = toolbox.engine().frames_rendered(),
        "done"
    );
    Ok(())
}
