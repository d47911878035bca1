//! Command-line surface.
//!
//! ```text
//! intersector [--verbose] [--quiet] [--config FILE] intersect --in-step PATH --in-plane "x,y,z:nx,ny,nz"
//! ```
//!
//! The result is always written to `intersection.stp` in the working
//! directory.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;

use crate::backend::GeometryBackend;
use crate::error::IntersectError;
use crate::workflow::{self, IntersectRequest, Outcome};

/// Section a solid model with a plane and export the resulting edges.
#[derive(Parser, Debug)]
#[command(name = "intersector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the intersection between a 3D shape and a plane.
    ///
    /// Loads the shape, sections it with the plane given in point-normal
    /// form, writes the result to `intersection.stp` and shows both shapes.
    ///
    /// Example: intersector intersect --in-step box.stl --in-plane "0,0,0:0,0,1"
    Intersect(IntersectArgs),
}

/// Arguments of the `intersect` subcommand.
#[derive(Args, Debug)]
pub struct IntersectArgs {
    /// Path to the input shape file.
    #[arg(long = "in-step", value_name = "PATH")]
    pub in_step: PathBuf,

    /// Plane definition in point-normal form 'x,y,z:nx,ny,nz'.
    #[arg(long = "in-plane", value_name = "PLANE", allow_hyphen_values = true)]
    pub in_plane: String,
}

impl IntersectArgs {
    /// Workflow request for these arguments.
    #[must_use]
    pub fn to_request(&self) -> IntersectRequest {
        IntersectRequest::new(&self.in_step, &self.in_plane)
    }
}

/// Runs `command` against `backend`.
///
/// Progress goes to `stdout`.
///
/// # Errors
///
/// Returns the workflow error that ended the run.
pub fn execute<B: GeometryBackend, W: Write>(
    backend: &B,
    command: &Command,
    stdout: &mut W,
) -> Result<Outcome, IntersectError> {
    match command {
        Command::Intersect(args) => {
            let request = args.to_request();
            info!(
                input = %request.input.display(),
                plane = %request.plane,
                "Running intersect"
            );
            workflow::run(backend, &request, stdout)
        }
    }
}

/// Prints the failure message (if any) to `stderr` and maps the result to a
/// process exit code. "No intersection" exits with success.
pub fn report<W: Write>(result: &Result<Outcome, IntersectError>, stderr: &mut W) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // Nothing better to do if stderr itself is gone.
            let _ = writeln!(stderr, "Error: {e}");
            ExitCode::from(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_intersect() {
        let cli = Cli::try_parse_from([
            "intersector",
            "--verbose",
            "intersect",
            "--in-step",
            "box.stl",
            "--in-plane",
            "0,0,100:0,0,1",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Intersect(args) = cli.command;
        assert_eq!(args.in_step, PathBuf::from("box.stl"));
        assert_eq!(args.in_plane, "0,0,100:0,0,1");
    }

    #[test]
    fn plane_may_start_with_minus() {
        let cli = Cli::try_parse_from([
            "intersector",
            "intersect",
            "--in-step",
            "box.stl",
            "--in-plane",
            "-1,0,0:1,0,0",
        ])
        .unwrap();
        let Command::Intersect(args) = cli.command;
        assert_eq!(args.in_plane, "-1,0,0:1,0,0");
    }

    #[test]
    fn both_inputs_are_required() {
        assert!(Cli::try_parse_from(["intersector", "intersect", "--in-step", "a.stl"]).is_err());
        assert!(
            Cli::try_parse_from(["intersector", "intersect", "--in-plane", "0,0,0:0,0,1"]).is_err()
        );
    }

    #[test]
    fn request_uses_fixed_output() {
        let args = IntersectArgs {
            in_step: PathBuf::from("part.stl"),
            in_plane: "0,0,0:0,0,1".to_string(),
        };
        assert_eq!(
            args.to_request().output,
            PathBuf::from(workflow::OUTPUT_FILE_NAME)
        );
    }

    #[test]
    fn report_prints_error_message() {
        let mut stderr = Vec::new();
        let result = Err(IntersectError::Export {
            path: PathBuf::from("intersection.stp"),
        });
        let _ = report(&result, &mut stderr);
        let text = String::from_utf8(stderr).unwrap();
        assert_eq!(text, "Error: Failed to export intersection result.\n");
    }

    #[test]
    fn report_is_silent_on_success() {
        let mut stderr = Vec::new();
        let _ = report(&Ok(Outcome::NoIntersection), &mut stderr);
        assert!(stderr.is_empty());
    }
}
