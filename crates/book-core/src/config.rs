//! Book configuration
//!
//! Every field has a default, so an empty JSON object is a valid config
//! and a partial file only overrides what it names.

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

use crate::error::{BookError, Result};

/// Environment variable naming the config file to load
pub const CONFIG_ENV_VAR: &str = "STORYBOOK_CONFIG";

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "storybook.json";

/// Top-level configuration for a book
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Title printed on the cover
    pub title: String,

    /// Page faces, in reading order
    pub pages: Vec<PageContent>,

    /// Transition durations
    pub timing: TimingConfig,

    /// Finale particle effects
    pub fireworks: FireworksConfig,

    /// Background star layers
    pub stars: Vec<StarLayerConfig>,

    /// Background music
    pub music: MusicConfig,

    /// Initial window size
    pub window: WindowConfig,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: "The Emerald Night".to_string(),
            pages: default_pages(),
            timing: TimingConfig::default(),
            fireworks: FireworksConfig::default(),
            stars: vec![
                StarLayerConfig { count: 14, band: [0.0, 0.5] },
                StarLayerConfig { count: 10, band: [0.5, 1.0] },
            ],
            music: MusicConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

/// Text shown on one page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageContent {
    pub title: String,

    #[serde(default)]
    pub body: String,
}

impl PageContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

fn default_pages() -> Vec<PageContent> {
    vec![
        PageContent::new(
            "Once, under green stars",
            "A small witch lived at the edge of the moor, where the sky was never fully dark.",
        ),
        PageContent::new(
            "The lantern",
            "Every night she lit a lantern and counted the sparks that drifted up from the chimney.",
        ),
        PageContent::new(
            "A missing spark",
            "One evening the count came up short. Somewhere above the clouds, a spark had wandered off.",
        ),
        PageContent::new(
            "The climb",
            "She followed it past the owls, past the bell tower, all the way to where the wind goes quiet.",
        ),
        PageContent::new(
            "Home again",
            "The spark had only gone to find its friends. Tonight, they all came back together.",
        ),
    ]
}

/// Transition durations, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long a page keeps its curl flag after turning
    pub curl_ms: u64,

    /// Delay between a cover starting to close and resting closed
    pub cover_close_ms: u64,

    /// Interval between page flips while reversing to the first page
    pub reverse_step_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            curl_ms: 750,
            cover_close_ms: 1100,
            reverse_step_ms: 360,
        }
    }
}

/// Fireworks tuning. Ranges are half-open `[min, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    /// Period of the frequent small trigger
    pub small_interval_ms: u64,

    /// Bursts per small trigger
    pub small_amount: usize,

    /// Period of the infrequent big trigger, drawn once per start
    pub big_interval_ms: [u64; 2],

    /// Bursts per big trigger
    pub big_amount: usize,

    /// Burst colours (RGB)
    pub palette: Vec<[u8; 3]>,

    /// Sparks per burst
    pub spark_count: [usize; 2],

    /// Initial spark speed, points per frame
    pub speed: [f32; 2],

    /// Spark lifetime, frames
    pub lifetime: [u32; 2],

    /// Downward acceleration, points per frame squared
    pub gravity: f32,

    /// Drawn spark radius
    pub spark_radius: f32,

    /// Vertical band (fractions of viewport height) bursts originate in
    pub sky_band: [f32; 2],
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            small_interval_ms: 700,
            small_amount: 3,
            big_interval_ms: [6000, 10000],
            big_amount: 10,
            palette: vec![
                [0x8c, 0xff, 0xc9], // emerald glow
                [0x32, 0xff, 0x7e], // bright green
                [0xa2, 0x59, 0xff], // witchy purple
                [0xf8, 0xd7, 0x77], // warm gold
                [0xff, 0xff, 0xff], // white spark
            ],
            spark_count: [60, 85],
            speed: [1.5, 5.5],
            lifetime: [40, 100],
            gravity: 0.02,
            spark_radius: 2.0,
            sky_band: [0.05, 0.5],
        }
    }
}

/// One container of background stars
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarLayerConfig {
    /// Number of stars in the layer
    #[serde(default = "default_star_count")]
    pub count: usize,

    /// Vertical band (fractions of viewport height) the stars drift through
    #[serde(default = "default_star_band")]
    pub band: [f32; 2],
}

fn default_star_count() -> usize {
    10
}

fn default_star_band() -> [f32; 2] {
    [0.0, 1.0]
}

/// Background music settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// Audio file; no music when unset
    pub path: Option<PathBuf>,

    pub volume: f32,

    pub looped: bool,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            path: None,
            volume: 1.0,
            looped: true,
        }
    }
}

/// Window size in points
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl BookConfig {
    /// Parse and validate a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Resolve the config the app should start with.
    ///
    /// Looks at `STORYBOOK_CONFIG` first, then `storybook.json` in the
    /// working directory. Returns the defaults and `None` when neither
    /// exists.
    pub fn discover() -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Ok((Self::load(&local)?, Some(local)));
        }

        Ok((Self::default(), None))
    }

    /// Reject configs the book or the particle engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(invalid("a book needs at least one page"));
        }

        let t = &self.timing;
        if t.curl_ms == 0 || t.cover_close_ms == 0 || t.reverse_step_ms == 0 {
            return Err(invalid("timing values must be non-zero"));
        }

        let fw = &self.fireworks;
        if fw.palette.is_empty() {
            return Err(invalid("fireworks palette is empty"));
        }
        if fw.small_interval_ms == 0 {
            return Err(invalid("fireworks.small_interval_ms must be non-zero"));
        }
        check_range("fireworks.big_interval_ms", fw.big_interval_ms[0] as f64, fw.big_interval_ms[1] as f64)?;
        if fw.big_interval_ms[0] == 0 {
            return Err(invalid("fireworks.big_interval_ms must be non-zero"));
        }
        check_range("fireworks.spark_count", fw.spark_count[0] as f64, fw.spark_count[1] as f64)?;
        check_range("fireworks.speed", fw.speed[0] as f64, fw.speed[1] as f64)?;
        check_range("fireworks.lifetime", fw.lifetime[0] as f64, fw.lifetime[1] as f64)?;
        if fw.lifetime[0] == 0 {
            return Err(invalid("sparks must live at least one frame"));
        }
        check_band("fireworks.sky_band", fw.sky_band)?;

        for (i, layer) in self.stars.iter().enumerate() {
            check_band(&format!("stars[{}].band", i), layer.band)?;
        }

        if !(0.0..=1.0).contains(&self.music.volume) {
            return Err(invalid("music.volume must be within 0.0..=1.0"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> BookError {
    BookError::InvalidConfig(message.into())
}

fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    if min < max {
        Ok(())
    } else {
        Err(invalid(format!("{} must have min < max (got {}..{})", name, min, max)))
    }
}

fn check_band(name: &str, band: [f32; 2]) -> Result<()> {
    let [top, bottom] = band;
    if (0.0..=1.0).contains(&top) && (0.0..=1.0).contains(&bottom) && top < bottom {
        Ok(())
    } else {
        Err(invalid(format!("{} must be an increasing pair within 0..1 (got {:?})", name, band)))
    }
}
