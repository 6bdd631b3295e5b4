/// Command line arguments
///
/// Positional source, destination and aspect ratio, plus optional overrides
/// for values otherwise read from the config file.
use clap::Parser;
use std::path::PathBuf;

use crate::state::config::Config;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "wallcrop",
    version,
    about = "Browse a directory of images and crop each one to a fixed aspect ratio"
)]
pub struct Cli {
    /// Directory containing the images to crop
    #[arg(value_parser = existing_dir)]
    pub source: PathBuf,

    /// Directory the crops are written to
    #[arg(value_parser = existing_dir)]
    pub destination: PathBuf,

    /// Target aspect ratio as width / height (e.g. 1.6 for 16:10)
    #[arg(value_parser = parse_aspect)]
    pub aspect: f64,

    /// Copy each original here before saving its crop
    #[arg(long, value_parser = existing_dir)]
    pub archive: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose logging and selection traces
    #[arg(long)]
    pub debug: bool,

    /// Resize step as a fraction (0.05 = 5%)
    #[arg(long)]
    pub size_step: Option<f64>,

    /// Move step as a fraction of the image side
    #[arg(long)]
    pub position_step: Option<f64>,
}

impl Cli {
    /// Apply command line overrides on top of a loaded config
    pub fn apply(&self, config: &mut Config) {
        if self.debug {
            config.debug = true;
        }
        if let Some(step) = self.size_step {
            config.size_step = step;
        }
        if let Some(step) = self.position_step {
            config.position_step = step;
        }
    }
}

/// Positive, finite aspect ratio
pub fn parse_aspect(value: &str) -> Result<f64, String> {
    let aspect: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;

    if aspect.is_finite() && aspect > 0.0 {
        Ok(aspect)
    } else {
        Err(format!("aspect ratio must be positive, got {}", value))
    }
}

/// Existing directory, trailing slashes tolerated
pub fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let trimmed = value.trim_end_matches('/');
    let path = PathBuf::from(if trimmed.is_empty() { "/" } else { trimmed });

    if !path.is_dir() {
        return Err(format!("'{}' is not a directory", value));
    }
    path.canonicalize()
        .map_err(|e| format!("cannot resolve '{}': {}", value, e))
}
