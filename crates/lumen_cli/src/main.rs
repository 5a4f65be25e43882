//! lumen - render a scene description to an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{Bitmap, RenderConfig, SceneDescription};
use lumen_renderer::{build_scene, RayTracer};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Recursive ray tracer", long_about = None)]
struct Cli {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Maximum recursion depth
    #[arg(short, long)]
    depth: Option<u32>,

    /// Per-channel intensity below which bounces are pruned
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Supersample grid size per axis (0 disables)
    #[arg(short, long)]
    supersample: Option<u32>,

    /// Jitter supersamples within their sub-cell
    #[arg(long)]
    jitter: bool,

    /// Background image for rays that leave the scene
    #[arg(long)]
    background: Option<PathBuf>,

    /// Height map to add as terrain
    #[arg(long)]
    height_map: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels (default: from the camera aspect ratio)
    #[arg(long)]
    height: Option<u32>,

    /// Seed for supersample jitter
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Cli {
    /// Settings from the scene file, overridden by explicit flags.
    fn render_config(&self, base: Option<RenderConfig>) -> RenderConfig {
        let mut config = base.unwrap_or_default();
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(supersample) = self.supersample {
            config.supersample = supersample;
        }
        if self.jitter {
            config.jitter = true;
        }
        if self.background.is_some() {
            config.background_enabled = true;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let description = SceneDescription::load(&cli.scene)
        .with_context(|| format!("Failed to load scene {}", cli.scene.display()))?;
    let mut scene = build_scene(&description)
        .with_context(|| format!("Failed to build scene {}", cli.scene.display()))?;

    if let Some(path) = &cli.height_map {
        match Bitmap::load(path) {
            Ok(bitmap) => {
                scene
                    .load_height_map(&bitmap)
                    .with_context(|| format!("Invalid height map {}", path.display()))?;
            }
            Err(err) => log::warn!("Height map skipped: {}", err),
        }
    }

    let config = cli.render_config(description.render.clone());
    let mut tracer = RayTracer::new(scene, config);
    if let Some(path) = &cli.background {
        tracer.load_background(path);
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let start = std::time::Instant::now();
    tracer.render(&mut rng);
    log::info!("Rendered in {:.2?}", start.elapsed());

    tracer
        .buffer()
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_scene_settings() {
        let cli = Cli::parse_from(["lumen", "scene.json", "--depth", "3", "--jitter", "--width", "64"]);
        let base = RenderConfig {
            max_depth: 1,
            threshold: 0.25,
            supersample: 2,
            ..Default::default()
        };

        let config = cli.render_config(Some(base));
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.threshold, 0.25);
        assert_eq!(config.supersample, 2);
        assert!(config.jitter);
        assert!(!config.background_enabled);
        assert_eq!(config.width, 64);
        assert_eq!(config.height, None);
    }

    #[test]
    fn test_background_flag_enables_background() {
        let cli = Cli::parse_from(["lumen", "scene.json", "--background", "sky.png", "-o", "a.png"]);
        let config = cli.render_config(None);
        assert!(config.background_enabled);
        assert_eq!(cli.output, PathBuf::from("a.png"));
        assert_eq!(config, RenderConfig {
            background_enabled: true,
            ..Default::default()
        });
    }
}
