//! Launch configuration: clap arguments merged over an optional
//! `settings.toml` manifest, with compiled-in defaults underneath.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

const DEFAULT_FIELD_WIDTH: u32 = 30;
const DEFAULT_FIELD_HEIGHT: u32 = 30;
const DEFAULT_WANDERERS: u32 = 6;
const DEFAULT_SENTINELS: u32 = 2;
const DEFAULT_SEED: u64 = 7;
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 800;

/// Command-line arguments accepted by the Tilescape binary.
#[derive(Debug, Parser)]
#[command(name = "tilescape", about = "Isometric scene runtime")]
pub(crate) struct Args {
    /// Path to the optional settings manifest.
    #[arg(long, default_value = "settings.toml")]
    pub(crate) settings: PathBuf,

    /// Field width in tiles; overrides the manifest.
    #[arg(long)]
    pub(crate) width: Option<u32>,

    /// Field height in tiles; overrides the manifest.
    #[arg(long)]
    pub(crate) height: Option<u32>,

    /// Number of wandering objects seeded at launch.
    #[arg(long)]
    pub(crate) wanderers: Option<u32>,

    /// Number of stationary objects seeded at launch.
    #[arg(long)]
    pub(crate) sentinels: Option<u32>,

    /// Seed for deterministic object placement and behavior.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Window width in pixels; overrides the manifest.
    #[arg(long)]
    pub(crate) window_width: Option<u32>,

    /// Window height in pixels; overrides the manifest.
    #[arg(long)]
    pub(crate) window_height: Option<u32>,

    /// Start in fullscreen mode.
    #[arg(long)]
    pub(crate) fullscreen: bool,

    /// Disable vertical sync.
    #[arg(long)]
    pub(crate) no_vsync: bool,

    /// Log frame timing metrics once per second.
    #[arg(long)]
    pub(crate) show_fps: bool,
}

/// Optional manifest mirroring the command-line surface.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    #[serde(default)]
    display: DisplaySettings,
    #[serde(default)]
    field: FieldSettings,
    #[serde(default)]
    objects: ObjectSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplaySettings {
    width: Option<u32>,
    height: Option<u32>,
    fullscreen: Option<bool>,
    vsync: Option<bool>,
    show_fps: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldSettings {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectSettings {
    wanderers: Option<u32>,
    sentinels: Option<u32>,
    seed: Option<u64>,
}

impl Settings {
    /// Loads the manifest when it exists; a missing file is not an error.
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Fully resolved launch configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) field_width: u32,
    pub(crate) field_height: u32,
    pub(crate) wanderers: u32,
    pub(crate) sentinels: u32,
    pub(crate) seed: u64,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) fullscreen: bool,
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
}

impl Config {
    /// Resolves the effective configuration: arguments override the
    /// manifest, the manifest overrides compiled-in defaults.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let settings = Settings::load(&args.settings)?;
        Ok(Self::merge(args, &settings))
    }

    fn merge(args: &Args, settings: &Settings) -> Self {
        Self {
            field_width: args
                .width
                .or(settings.field.width)
                .unwrap_or(DEFAULT_FIELD_WIDTH),
            field_height: args
                .height
                .or(settings.field.height)
                .unwrap_or(DEFAULT_FIELD_HEIGHT),
            wanderers: args
                .wanderers
                .or(settings.objects.wanderers)
                .unwrap_or(DEFAULT_WANDERERS),
            sentinels: args
                .sentinels
                .or(settings.objects.sentinels)
                .unwrap_or(DEFAULT_SENTINELS),
            seed: args.seed.or(settings.objects.seed).unwrap_or(DEFAULT_SEED),
            window_width: args
                .window_width
                .or(settings.display.width)
                .unwrap_or(DEFAULT_WINDOW_WIDTH),
            window_height: args
                .window_height
                .or(settings.display.height)
                .unwrap_or(DEFAULT_WINDOW_HEIGHT),
            fullscreen: args.fullscreen || settings.display.fullscreen.unwrap_or(false),
            vsync: if args.no_vsync {
                false
            } else {
                settings.display.vsync.unwrap_or(true)
            },
            show_fps: args.show_fps || settings.display.show_fps.unwrap_or(false),
        }
    }
}
