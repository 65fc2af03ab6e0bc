//! meshcast CLI - cast a ray at a generated mesh and print the nearest hit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use meshcast::{
    ComputeBackend, GeometryCache, LogSink, MeshRaycastResult, ParallelBackend, Ray,
    RaycastConfig, SequentialBackend, TriangleMesh,
};
use meshcast_math::{Point3, Transform, Vec3};

#[derive(Parser)]
#[command(name = "meshcast")]
#[command(about = "Nearest-hit ray casting against triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the nearest hit
    Cast {
        #[command(flatten)]
        scene: SceneArgs,
        /// Execution strategy
        #[arg(short, long, value_enum, default_value_t = BackendKind::Parallel)]
        backend: BackendKind,
        /// Number of times to repeat the query against the staged mesh
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Trace triangles in order, logging every intermediate primitive
    /// (run with RUST_LOG=debug) and listing every hit
    Trace {
        #[command(flatten)]
        scene: SceneArgs,
    },
}

#[derive(Args)]
struct SceneArgs {
    /// Mesh to generate
    #[arg(long, value_enum, default_value_t = Shape::Quad)]
    shape: Shape,
    /// Quads per side for `grid`
    #[arg(long, default_value_t = 16)]
    segments: u32,
    /// Half extent of the shape (full side length for `grid`)
    #[arg(long, default_value_t = 1.0)]
    size: f64,
    /// Ray origin as x,y,z
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,1", allow_hyphen_values = true)]
    origin: Vec3,
    /// Ray direction as x,y,z (not normalized)
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,-1", allow_hyphen_values = true)]
    direction: Vec3,
    /// Mesh translation as x,y,z
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,0", allow_hyphen_values = true)]
    translate: Vec3,
    /// Mesh rotation as roll,pitch,yaw in radians
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,0", allow_hyphen_values = true)]
    rotate: Vec3,
    /// TOML file with ray cast settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Quad,
    Cuboid,
    Grid,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    Parallel,
    Sequential,
    Gpu,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("`{p}`: {e}")))
        .collect::<Result<_, _>>()?;
    if let Some(bad) = parts.iter().find(|c| !c.is_finite()) {
        return Err(format!("`{bad}` is not a finite number"));
    }
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got {} components", parts.len())),
    }
}

impl SceneArgs {
    fn mesh(&self) -> TriangleMesh {
        match self.shape {
            Shape::Quad => TriangleMesh::quad(self.size),
            Shape::Cuboid => TriangleMesh::cuboid(Vec3::repeat(self.size)),
            Shape::Grid => TriangleMesh::grid(self.segments, self.size),
        }
    }

    fn transform(&self) -> Transform {
        Transform::translation(self.translate)
            .then(&Transform::rotation(self.rotate.x, self.rotate.y, self.rotate.z))
    }

    fn ray(&self) -> Ray {
        Ray::new(Point3::from(self.origin), self.direction)
    }

    fn config(&self) -> Result<RaycastConfig> {
        match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Ok(RaycastConfig::from_toml_str(&text)?)
            }
            None => Ok(RaycastConfig::default()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Cast {
            scene,
            backend,
            repeat,
        } => {
            let config = scene.config()?;
            let result = match backend {
                BackendKind::Parallel => {
                    cast(ParallelBackend::from_config(&config), config, &scene, repeat)?
                }
                BackendKind::Sequential => cast(SequentialBackend, config, &scene, repeat)?,
                BackendKind::Gpu => cast_gpu(config, &scene, repeat)?,
            };
            print_result(&result);
        }
        Commands::Trace { scene } => {
            let config = scene.config()?;
            let mut cache = GeometryCache::new(SequentialBackend, config);
            let hits =
                cache.trace_debug(&scene.ray(), &scene.mesh(), &scene.transform(), &mut LogSink)?;
            println!("{} hit(s)", hits.len());
            for hit in hits {
                println!(
                    "  triangle {:>6}  distance {:.6}  point {}  normal {}",
                    hit.triangle,
                    hit.distance,
                    fmt_vec(&hit.point.coords),
                    fmt_vec(&hit.normal)
                );
            }
        }
    }

    Ok(())
}

fn cast<B: ComputeBackend>(
    backend: B,
    config: RaycastConfig,
    scene: &SceneArgs,
    repeat: u32,
) -> Result<MeshRaycastResult> {
    let mesh = scene.mesh();
    let transform = scene.transform();
    let ray = scene.ray();
    let mut cache = GeometryCache::new(backend, config);

    let mut result = MeshRaycastResult::miss();
    let started = std::time::Instant::now();
    for _ in 0..repeat.max(1) {
        result = cache.raycast(&ray, &mesh, &transform)?;
    }
    log::info!(
        "{} {} queries over {} triangles in {:?}",
        cache.backend().name(),
        repeat.max(1),
        mesh.num_triangles(),
        started.elapsed()
    );
    Ok(result)
}

#[cfg(feature = "gpu")]
fn cast_gpu(config: RaycastConfig, scene: &SceneArgs, repeat: u32) -> Result<MeshRaycastResult> {
    use meshcast::gpu::{GpuBackend, GpuContext};

    let ctx = GpuContext::new_blocking()?;
    let backend = GpuBackend::new(std::sync::Arc::new(ctx))?;
    cast(backend, config, scene, repeat)
}

#[cfg(not(feature = "gpu"))]
fn cast_gpu(_: RaycastConfig, _: &SceneArgs, _: u32) -> Result<MeshRaycastResult> {
    anyhow::bail!("GPU backend not enabled. Rebuild with --features gpu")
}

fn print_result(result: &MeshRaycastResult) {
    println!("hit:      {}", result.hit);
    if result.hit {
        println!("position: {}", fmt_vec(&result.position.coords));
        println!("normal:   {}", fmt_vec(&result.normal));
        println!("distance: {:.6}", result.distance);
    }
}

fn fmt_vec(v: &Vec3) -> String {
    format!("({:.6}, {:.6}, {:.6})", v.x, v.y, v.z)
}
