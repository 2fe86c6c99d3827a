use std::{fs, path::PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use serde::Serialize;

use hollow_engine::host::{RecordingScriptHost, RecordingStage, ScriptEvent, StageEvent};
use hollow_engine::{Context, Scene, SceneView, VariableStore};
use hollow_formats::decode_hotspot_list;

/// Minimal host that decodes a hotspot record list, builds the scene runtime
/// around it, and drives ticks with recording collaborators.
#[derive(Parser, Debug)]
#[command(
    about = "Prototype host that loads a hotspot record list and drives the scene runtime",
    version
)]
struct Args {
    /// Path to a binary hotspot record list
    #[arg(long)]
    records: PathBuf,

    /// Scene index used in reports
    #[arg(long, default_value_t = 0)]
    scene: u16,

    /// Unconditional background image id for the scene view
    #[arg(long, default_value_t = 0)]
    main_image: u16,

    /// Compute entity enablement for shortcut-mode navigation
    #[arg(long)]
    shortcut_mode: bool,

    /// Number of tick/draw frames to drive after loading
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Path to write the decoded record tree as JSON
    #[arg(long)]
    dump_json: Option<PathBuf>,

    /// Path to write recorded stage and script events as JSON
    #[arg(long)]
    events_json: Option<PathBuf>,

    /// Path to write the final variable snapshot as JSON
    #[arg(long)]
    vars_json: Option<PathBuf>,

    /// Raise log verbosity to debug
    #[arg(long)]
    verbose: bool,
}

#[derive(Serialize)]
struct EventReport {
    stage: Vec<StageEvent>,
    scripts: Vec<ScriptEvent>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let data = fs::read(&args.records)
        .with_context(|| format!("reading {}", args.records.display()))?;
    let records = decode_hotspot_list(&mut data.as_slice())
        .with_context(|| format!("decoding {}", args.records.display()))?;
    println!(
        "Decoded {} hotspot records from {}",
        records.len(),
        args.records.display()
    );

    if let Some(path) = args.dump_json.as_ref() {
        let json =
            serde_json::to_string_pretty(&records).context("serializing record tree to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing record tree to {}", path.display()))?;
        println!("Saved record tree to {}", path.display());
    }

    let view = SceneView {
        main_image: args.main_image,
        conditional_images: Vec::new(),
    };
    let mut scene = Scene::from_records(args.scene, view, records, args.shortcut_mode);
    println!(
        "Scene {} holds {} top-level entities",
        scene.index(),
        scene.entity_count()
    );

    let mut vars = VariableStore::new();
    let scripts = RecordingScriptHost::new();
    let stage = RecordingStage::new();
    {
        let mut script_host = scripts.clone();
        let mut stage_host = stage.clone();
        let mut ctx = Context::new(&mut vars, &mut script_host, &mut stage_host);
        for _ in 0..args.ticks {
            scene.tick(&mut ctx);
            scene.draw(&mut ctx);
        }
    }
    if args.ticks > 0 {
        println!(
            "Drove {} frames: {} stage calls, {} script calls",
            args.ticks,
            stage.events().len(),
            scripts.events().len()
        );
    }

    if let Some(path) = args.events_json.as_ref() {
        let report = EventReport {
            stage: stage.events(),
            scripts: scripts.events(),
        };
        let json =
            serde_json::to_string_pretty(&report).context("serializing event log to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing event log to {}", path.display()))?;
        println!("Saved event log to {}", path.display());
    }

    if let Some(path) = args.vars_json.as_ref() {
        let json = serde_json::to_string_pretty(&vars.snapshot())
            .context("serializing variable snapshot to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing variable snapshot to {}", path.display()))?;
        println!("Saved variable snapshot to {}", path.display());
    }

    Ok(())
}
