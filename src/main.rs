//! Particle field runner.
//!
//! Usage:
//!
//! ```text
//! particle-field [config.json]
//! particle-field [config.json] --snapshot out.png [--frames 120] [--size 1280x720]
//! ```
//!
//! Without `--snapshot` a window opens and animates until closed. With it, the
//! field is rendered headlessly for the given number of frames and the last
//! frame is written as a PNG. Set `RUST_LOG=debug` for per-frame statistics.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use particle_field::prelude::*;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };

    match args.snapshot {
        Some(path) => {
            let (width, height) = args.size;
            let mut scheduler = ManualScheduler::new();
            let mut field = ParticleField::new(RasterSurface::new(width, height), config)?;
            field.initialize(&mut scheduler)?;
            let mut connections = 0;
            for _ in 0..args.frames {
                if !scheduler.fire() {
                    break;
                }
                connections = field.frame(&mut scheduler).connections;
            }
            field.stop(&mut scheduler);
            field.into_surface().save_png(&path)?;
            tracing::info!(path = %path, frames = args.frames, connections, "snapshot written");
        }
        None => particle_field::window::run(config)?,
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
struct Args {
    config: Option<String>,
    snapshot: Option<String>,
    frames: u32,
    size: (u32, u32),
}

#[cfg(not(target_arch = "wasm32"))]
impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args {
            config: None,
            snapshot: None,
            frames: 120,
            size: (1280, 720),
        };

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| args.next().ok_or_else(|| format!("{} needs a value", flag));
            match arg.as_str() {
                "--snapshot" => parsed.snapshot = Some(value("--snapshot")?),
                "--frames" => {
                    let v = value("--frames")?;
                    parsed.frames = v.parse().map_err(|_| format!("invalid frame count `{}`", v))?;
                }
                "--size" => {
                    let v = value("--size")?;
                    parsed.size = v
                        .split_once('x')
                        .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
                        .ok_or_else(|| format!("invalid size `{}`, expected WIDTHxHEIGHT", v))?;
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option `{}`", flag)),
                path => parsed.config = Some(path.to_string()),
            }
        }
        Ok(parsed)
    }
}
