//! Command-line argument definitions using clap derive macros.

use clap::Parser;
use std::env;
use std::path::PathBuf;

/// Converts .mat data files to .hdf5 format.
///
/// mat2hdf5 reads MATLAB Level 5 .mat files and writes one HDF5 file per
/// source. Variables become datasets named after the variable with any
/// trailing digits removed.
#[derive(Parser, Debug)]
#[command(name = "mat2hdf5")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Args {
    /// The source directory or file
    ///
    /// A directory is scanned for files named songNN_Imputed.mat. Defaults
    /// to the current directory.
    #[arg(short, long, visible_alias = "src", value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// The destination directory for .hdf5 files
    ///
    /// Created if it does not exist. Defaults to a 'hdf5' directory in the
    /// current working directory.
    #[arg(short, long, visible_alias = "dst", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    // ========================================================================
    // Output Control
    // ========================================================================
    /// Show per-file details
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Source path, defaulting to the current directory.
    pub fn source_path(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| current_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Destination directory, defaulting to `<cwd>/hdf5`.
    pub fn destination_dir(&self) -> PathBuf {
        self.destination.clone().unwrap_or_else(|| {
            current_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hdf5")
        })
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

fn current_dir() -> Option<PathBuf> {
    env::current_dir().ok()
}

/// Example usage shown in --help.
const EXAMPLES: &str = r#"
EXAMPLES:
    # Convert every songNN_Imputed.mat in the current directory to ./hdf5
    mat2hdf5

    # Convert a directory of recordings
    mat2hdf5 --source recordings --destination converted

    # Convert a single file
    mat2hdf5 -s recordings/song01_Imputed.mat

    # Show per-file details
    mat2hdf5 -v -s recordings

    # Debug logging
    RUST_LOG=debug mat2hdf5 -s recordings
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["mat2hdf5"]).unwrap();
        assert!(args.source.is_none());
        assert_eq!(args.destination_dir().file_name().unwrap(), "hdf5");
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_aliases() {
        let args =
            Args::try_parse_from(["mat2hdf5", "--src", "in", "--dst", "out", "-v"]).unwrap();
        assert_eq!(args.source_path(), PathBuf::from("in"));
        assert_eq!(args.destination_dir(), PathBuf::from("out"));
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        assert!(Args::try_parse_from(["mat2hdf5", "-q", "-v"]).is_err());
    }
}
