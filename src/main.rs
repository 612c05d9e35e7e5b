use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solar3d::io::{load_scene, read_stl_scene, scene_to_bim, write_bim};
use solar3d::{Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate shading and PV potential of a building")]
struct Args {
    /// Scene file (.bim or .stl)
    scene: PathBuf,

    /// Name of the building to analyse (defaults to the file stem for .stl)
    #[arg(long)]
    building: Option<String>,

    /// Local date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,

    /// Minutes since local midnight (0-1440)
    #[arg(long)]
    time: f64,

    /// JSON file with location, light and PV settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Global horizontal irradiance
    #[arg(long)]
    ghi: Option<f64>,

    /// Shadow rays per face
    #[arg(long)]
    samples: Option<usize>,

    /// Seed for repeatable results
    #[arg(long)]
    seed: Option<u64>,

    /// The scene file is Z-up
    #[arg(long)]
    z_up: bool,

    /// Write the scene with per-face PV colors to this .bim file
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let is_stl = args
        .scene
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"));
    let (mut session, name) = if is_stl {
        let name = match &args.building {
            Some(name) => name.clone(),
            None => args
                .scene
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    anyhow!("Cannot derive a building name from {}", args.scene.display())
                })?,
        };
        let scene = read_stl_scene(&args.scene, &name, args.z_up)?;
        (Session::from_scene(scene, config), name)
    } else {
        let name = args
            .building
            .clone()
            .ok_or_else(|| anyhow!("--building is required for .bim scenes"))?;
        let (scene, buildings) = load_scene(&args.scene, args.z_up)?;
        (Session::new(scene, buildings, config), name)
    };

    let sun = session.set_datetime(Some(args.date), Some(args.time))?;
    info!(
        "Sun azimuth {:.2}°, altitude {:.2}°",
        sun.azimuth.to_degrees(),
        sun.altitude.to_degrees()
    );

    let report = session.select_building(&name)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = &args.export {
        let bim = scene_to_bim(session.scene(), session.buildings(), args.z_up)?;
        write_bim(path, &bim)?;
        info!("Exported {}", path.display());
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            SessionConfig::from_json(&text)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        }
        None => SessionConfig::default(),
    };
    if let Some(ghi) = args.ghi {
        config.pv.ghi = ghi;
    }
    if let Some(samples) = args.samples {
        config.pv.sample_count = samples;
    }
    if args.seed.is_some() {
        config.pv.seed = args.seed;
    }
    Ok(config)
}
