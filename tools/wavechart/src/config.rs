//! Configuration loading for wavechart.
//!
//! Reads `wavechart.toml` (explicit `--config`, else the current directory,
//! else built-in defaults) and applies command-line overrides on top.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use wave_perf::WaveRange;

use crate::cli::GlobalArgs;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "wavechart.toml";

/// Top-level configuration loaded from `wavechart.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub waves: WavesConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[paths]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir", rename = "data-dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_graph_dir", rename = "graph-dir")]
    pub graph_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            graph_dir: default_graph_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("../data")
}
fn default_graph_dir() -> PathBuf {
    PathBuf::from("../graphs")
}

/// `[waves]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WavesConfig {
    #[serde(default = "default_first")]
    pub first: u32,
    #[serde(default = "default_last")]
    pub last: u32,
}

impl Default for WavesConfig {
    fn default() -> Self {
        Self {
            first: default_first(),
            last: default_last(),
        }
    }
}

fn default_first() -> u32 {
    1
}
fn default_last() -> u32 {
    8
}

/// `[render]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// TTF used for chart text; system fonts are searched when absent.
    #[serde(default)]
    pub font: Option<PathBuf>,
}

/// Configuration after file and command-line merging.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Where the configuration came from, if a file was used.
    pub source: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub graph_dir: PathBuf,
    pub waves: WaveRange,
    pub font: Option<PathBuf>,
}

/// Load the configuration file (if any) and apply command-line overrides.
///
/// Relative paths in a config file are resolved against the file's directory.
pub fn load_config(args: &GlobalArgs, cwd: &Path) -> Result<ResolvedConfig> {
    let source = match &args.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            Some(path.clone())
        }
        None => Some(cwd.join(CONFIG_FILE)).filter(|p| p.exists()),
    };

    let (file, base) = match &source {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file = parse_config(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
            (file, base)
        }
        None => (FileConfig::default(), cwd.to_path_buf()),
    };

    resolve(file, &base, args, source)
}

/// Parse `wavechart.toml` contents.
pub fn parse_config(contents: &str) -> Result<FileConfig> {
    Ok(toml::from_str(contents)?)
}

/// Merge a parsed file with command-line overrides. Flags win.
fn resolve(
    file: FileConfig,
    base: &Path,
    args: &GlobalArgs,
    source: Option<PathBuf>,
) -> Result<ResolvedConfig> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| base.join(&file.paths.data_dir));
    let graph_dir = args
        .graph_dir
        .clone()
        .unwrap_or_else(|| base.join(&file.paths.graph_dir));
    let font = args
        .font
        .clone()
        .or_else(|| file.render.font.map(|f| base.join(f)));

    let first = args.first.unwrap_or(file.waves.first);
    let last = args.last.unwrap_or(file.waves.last);
    let waves = WaveRange::new(first, last).context("invalid wave range")?;

    Ok(ResolvedConfig {
        source,
        data_dir,
        graph_dir,
        waves,
        font,
    })
}

/// Print resolved config to stdout for debugging.
pub fn print_resolved(config: &ResolvedConfig) {
    match &config.source {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Config: built-in defaults"),
    }
    println!("  data-dir: {}", config.data_dir.display());
    println!("  graph-dir: {}", config.graph_dir.display());
    println!("  waves: {}", config.waves);
    if let Some(ref font) = config.font {
        println!("  font: {}", font.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_flags() -> GlobalArgs {
        GlobalArgs::default()
    }

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&no_flags(), dir.path()).unwrap();
        assert!(config.source.is_none());
        assert_eq!(config.data_dir, dir.path().join("../data"));
        assert_eq!(config.graph_dir, dir.path().join("../graphs"));
        assert_eq!(config.waves, WaveRange::new(1, 8).unwrap());
        assert!(config.font.is_none());
    }

    #[test]
    fn file_values_are_relative_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[paths]\ndata-dir = \"results\"\n\n[waves]\nfirst = 2\nlast = 4\n\n[render]\nfont = \"fonts/a.ttf\"\n",
        )
        .unwrap();

        let config = load_config(&no_flags(), dir.path()).unwrap();
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE)));
        assert_eq!(config.data_dir, dir.path().join("results"));
        assert_eq!(config.graph_dir, dir.path().join("../graphs"));
        assert_eq!(config.waves, WaveRange::new(2, 4).unwrap());
        assert_eq!(config.font, Some(dir.path().join("fonts/a.ttf")));
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[waves]\nfirst = 2\nlast = 4\n",
        )
        .unwrap();

        let args = GlobalArgs {
            data_dir: Some(PathBuf::from("/srv/data")),
            last: Some(6),
            ..GlobalArgs::default()
        };
        let config = load_config(&args, dir.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.waves, WaveRange::new(2, 6).unwrap());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("[paths]\ndata_dir = \"x\"\n").is_err());
        assert!(parse_config("[plot]\nwidth = 10\n").is_err());
    }

    #[test]
    fn zero_first_wave_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = GlobalArgs {
            first: Some(0),
            ..GlobalArgs::default()
        };
        let err = load_config(&args, dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid wave range"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = GlobalArgs {
            config: Some(dir.path().join("absent.toml")),
            ..GlobalArgs::default()
        };
        assert!(load_config(&args, dir.path()).is_err());
    }
}
