use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AlongTrack - points of interest along a GPS track
#[derive(Parser, Debug)]
#[command(name = "alongtrack")]
#[command(about = "Find points of interest along a GPS track", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without querying or writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to ./alongtrack.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Presets file overriding the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub presets_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for points of interest along a track
    Run(RunArgs),

    /// List available filter presets
    Presets,

    /// Show effective settings and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the GPX track
    pub gpx: PathBuf,

    /// Project name, also used for the output file names
    #[arg(long)]
    pub project_name: Option<String>,

    /// Directory receiving the GeoJSON and HTML outputs
    #[arg(long, value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// Search radius around the track in kilometers
    #[arg(long)]
    pub radius_km: Option<f64>,

    /// Distance between query centers in kilometers (default 0.6 x radius)
    #[arg(long)]
    pub step_km: Option<f64>,

    /// Track span covered by one Overpass request in kilometers
    #[arg(long)]
    pub batch_km: Option<f64>,

    /// Attempts per Overpass endpoint
    #[arg(long)]
    pub retries: Option<u32>,

    /// Preset to apply (repeatable)
    #[arg(long = "preset", value_name = "NAME")]
    pub presets: Vec<String>,

    /// Inclusion filter "key=value" (repeatable)
    #[arg(long, value_name = "KEY=VALUE")]
    pub include: Vec<String>,

    /// Exclusion filter "key=value" (repeatable)
    #[arg(long, value_name = "KEY=VALUE")]
    pub exclude: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_collects_repeated_filters() {
        let cli = Cli::try_parse_from([
            "alongtrack",
            "run",
            "ride.gpx",
            "--preset",
            "camping",
            "--include",
            "amenity=drinking_water",
            "--include",
            "shop=bakery",
            "--radius-km",
            "3",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.presets, vec!["camping"]);
        assert_eq!(args.include.len(), 2);
        assert_eq!(args.radius_km, Some(3.0));
        assert!(args.step_km.is_none());
    }
}
