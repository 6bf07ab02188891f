use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use vista::{RegionLoader, Scene, Space};
use vista_collide::{ClosestTerrain, HitRecorder};
use vista_geom::Vec3;
use vista_lighting::{LightContainer, LightKind};
use vista_world::{CollisionAssets, SpaceConfig};

#[derive(Parser, Debug)]
#[command(name = "vista", about = "Sweep and lighting queries over a region scene")]
struct Cli {
    /// Space configuration (TOML); overrides the scene's own [config]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Worker threads used to prepare regions
    #[arg(long, global = true, default_value_t = 2)]
    workers: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cast a ray and list every hit in distance order
    Sweep {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        from: Vec3,
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        to: Vec3,
        /// Report only the closest terrain hit
        #[arg(long)]
        terrain_only: bool,
    },
    /// Find the first surface below a point
    Drop {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        at: Vec3,
        #[arg(long, default_value_t = 1000.0)]
        max_drop: f32,
    },
    /// Print own and aggregated lights per region
    Lights {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        region: Option<String>,
    },
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z, got '{}'", s));
    }
    let mut v = [0.0f32; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("bad coordinate '{}': {}", part, e))?;
    }
    Ok(Vec3::from_array(v))
}

fn open_space(cli: &Cli, scene_path: &Path) -> Result<Space, Box<dyn Error>> {
    let scene = Scene::load_from_path(scene_path)?;
    let config = match &cli.config {
        Some(path) => SpaceConfig::load_from_path(path)?,
        None => scene.config.clone().unwrap_or_default(),
    };
    let assets = CollisionAssets::from_records(&scene.assets)?;
    let mut space = Space::new(config, assets);
    let loader = RegionLoader::for_space(&space, cli.workers);
    for entry in scene.regions {
        loader.request(entry);
    }
    let failed = loader
        .finish_into(&mut space)
        .into_iter()
        .filter(Result::is_err)
        .count();
    if failed > 0 {
        log::warn!("{} regions failed to load", failed);
    }
    log::info!(
        "scene {} ready: {} regions, {} columns",
        scene_path.display(),
        space.world().region_count(),
        space.world().grid().column_count()
    );
    Ok(space)
}

fn describe(c: &LightContainer) -> String {
    let mut parts = Vec::new();
    for light in c.iter() {
        let text = match light.kind() {
            LightKind::Directional { direction } => {
                format!("directional({:.2},{:.2},{:.2})", direction.x, direction.y, direction.z)
            }
            LightKind::Omni {
                position,
                outer_radius,
                ..
            } => format!(
                "omni@({:.2},{:.2},{:.2}) r={:.2}",
                position.x, position.y, position.z, outer_radius
            ),
            LightKind::Spot {
                position,
                outer_radius,
                ..
            } => format!(
                "spot@({:.2},{:.2},{:.2}) r={:.2}",
                position.x, position.y, position.z, outer_radius
            ),
        };
        parts.push(text);
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Command::Sweep {
            scene,
            from,
            to,
            terrain_only,
        } => {
            let space = open_space(&cli, scene)?;
            if *terrain_only {
                let mut v = ClosestTerrain::default();
                space.world().collide_ray(*from, *to, &mut v);
                match v.distance {
                    Some(d) => println!("terrain at {:.3}", d),
                    None => println!("no terrain"),
                }
            } else {
                let mut v = HitRecorder::default();
                let closest = space.world().collide_ray(*from, *to, &mut v);
                for hit in &v.hits {
                    println!("{:>10.3}  {}/{}", hit.distance, hit.region, hit.item);
                }
                if closest < 0.0 {
                    println!("no hit");
                } else {
                    println!("closest {:.3}", closest);
                }
            }
        }
        Command::Drop { scene, at, max_drop } => {
            let space = open_space(&cli, scene)?;
            match space.world().find_drop_point(*at, *max_drop) {
                Some(p) => println!("ground at y={:.3}", p.y),
                None => println!("nothing below within {:.1}", max_drop),
            }
        }
        Command::Lights { scene, region } => {
            let mut space = open_space(&cli, scene)?;
            let mut regions: Vec<_> = space
                .world()
                .regions()
                .filter(|(_, r)| region.as_deref().is_none_or(|want| r.name == want))
                .map(|(id, r)| (id, r.name.clone()))
                .collect();
            if let (true, Some(name)) = (regions.is_empty(), region) {
                return Err(format!("no region named {}", name).into());
            }
            regions.sort_by(|a, b| a.1.cmp(&b.1));
            for (id, name) in regions {
                let own = space.own_lights(id).map(describe).unwrap_or_default();
                let all = space.all_lights(id).map(describe).unwrap_or_default();
                println!("{}\n  own: {}\n  all: {}", name, own, all);
            }
        }
    }
    Ok(())
}
