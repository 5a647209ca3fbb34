use std::path::PathBuf;

use clap::ArgMatches;
use volvis_lib::{
    render::{Capabilities, TechniqueKind},
    volumetric::NormalizationPolicy,
};

use super::defaults;

/// App configuration
/// Built from args parsed by `clap`, missing values come from [`defaults`]
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub volume_path: PathBuf,
    pub landscape_path: Option<PathBuf>,
    /// Rendered in this order
    pub techniques: Vec<TechniqueKind>,
    pub width: usize,
    pub height: usize,
    pub frames: usize,
    pub output_dir: PathBuf,
    pub policy: NormalizationPolicy,
    /// Landscape node to select before rendering
    pub select: Option<usize>,
    pub brightness: Option<f32>,
    pub capabilities: Capabilities,
    pub surface_visible: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            volume_path: defaults::VOLUME_PATH.into(),
            landscape_path: None,
            techniques: vec![defaults::TECHNIQUE],
            width: defaults::RENDER_WIDTH,
            height: defaults::RENDER_HEIGHT,
            frames: defaults::FRAMES,
            output_dir: defaults::OUTPUT_DIR.into(),
            policy: NormalizationPolicy::default(),
            select: None,
            brightness: None,
            capabilities: Capabilities::default(),
            surface_visible: true,
        }
    }
}

fn parse_optional<T: std::str::FromStr>(args: &ArgMatches, key: &str) -> Result<Option<T>, String> {
    args.value_of(key)
        .map(|raw| {
            raw.parse()
                .map_err(|_| format!("cannot parse --{key} value {raw:?}"))
        })
        .transpose()
}

impl AppConfig {
    pub fn from_args(args: &ArgMatches) -> Result<AppConfig, String> {
        let mut cfg = AppConfig::default();

        if let Some(path) = args.value_of("volume") {
            cfg.volume_path = path.into();
        }
        cfg.landscape_path = args.value_of("landscape").map(PathBuf::from);

        cfg.techniques = match args.value_of("technique") {
            None | Some("all") => TechniqueKind::ALL.to_vec(),
            Some(name) => vec![name.parse()?],
        };

        if let Some(values) = args.values_of("size") {
            let size = values
                .map(|v| v.parse::<usize>().map_err(|e| e.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            if let [width, height] = size[..] {
                cfg.width = width;
                cfg.height = height;
            }
        }

        if let Some(frames) = parse_optional(args, "frames")? {
            cfg.frames = frames;
        }
        if let Some(dir) = args.value_of("output-dir") {
            cfg.output_dir = dir.into();
        }

        cfg.policy = match args.value_of("policy") {
            Some("clamp") => NormalizationPolicy::Clamp,
            _ => NormalizationPolicy::LinearRescale,
        };
        cfg.select = parse_optional(args, "select")?;
        cfg.brightness = parse_optional(args, "brightness")?;
        if args.is_present("no-3d") {
            cfg.capabilities = Capabilities::without_3d();
        }
        cfg.surface_visible = !args.is_present("hide-surface");

        Ok(cfg)
    }
}
