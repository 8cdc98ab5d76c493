//! Command-line interface definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skypol", version, about = "Skylight polarization toolkit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the default scene parameters as JSON
    Params,

    /// Simulate the polarization pattern a configured camera would capture
    Simulate(SimulateArgs),

    /// Decode a raw capture into false-color polarization images
    Render(RenderArgs),

    /// Estimate camera orientation from raw captures
    Estimate(EstimateArgs),
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Scene parameter JSON file; built-in defaults when omitted
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Directory for rendered outputs
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Display ceiling for degree-of-polarization renders
    #[arg(long, default_value_t = 0.8)]
    pub dop_max: f64,

    /// Also write gnuplot data files and scripts
    #[arg(long)]
    pub plots: bool,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Raw polarizer-mosaic capture, 8-bit grayscale
    pub input: PathBuf,

    /// Directory for rendered outputs
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Display ceiling for degree-of-polarization renders
    #[arg(long, default_value_t = 0.8)]
    pub dop_max: f64,

    /// Keep angles in the sensor frame instead of rotating to the meridian
    /// frame
    #[arg(long)]
    pub sensor_frame: bool,
}

#[derive(Args)]
pub struct EstimateArgs {
    /// Raw captures to process, in sequence order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Scene parameter JSON file; built-in defaults when omitted
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Method::Hough)]
    pub method: Method,

    /// CSV output path; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Hough accumulator bin width in degrees
    #[arg(long, default_value_t = 1.0)]
    pub resolution: f64,

    /// How close to +/-90 degrees an angle must be to vote, in degrees
    #[arg(long, default_value_t = 1.0)]
    pub aop_threshold: f64,

    /// Ignore measurements below this degree of polarization
    #[arg(long, default_value_t = 0.3)]
    pub dop_min: f64,

    /// Yaw step of the pattern-match candidate sweep, in degrees
    #[arg(long, default_value_t = 5.0)]
    pub yaw_step: f64,

    /// Write the Hough vote histogram as gnuplot data and script files
    #[arg(long)]
    pub histogram: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Vote for the solar meridian line angle
    Hough,

    /// Match measurements against simulated candidate skies
    Pattern,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn estimate_requires_an_input() {
        assert!(Cli::try_parse_from(["skypol", "estimate"]).is_err());
        assert!(Cli::try_parse_from(["skypol", "estimate", "frame.png"]).is_ok());
    }

    #[test]
    fn method_defaults_to_hough() {
        let cli = Cli::try_parse_from(["skypol", "estimate", "frame.png"]).unwrap();
        match cli.command {
            Command::Estimate(args) => assert_eq!(args.method, Method::Hough),
            _ => panic!("expected the estimate subcommand"),
        }
    }
}
