use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Capture a directory subtree into a new gzip-compressed archive.
    #[command(alias = "p")]
    Pack {
        /// Root directory the archived paths are recorded relative to.
        #[arg(required = true)]
        root: PathBuf,

        /// Subpath under the root to capture. Defaults to the whole root.
        #[arg(default_value = ".")]
        subpath: PathBuf,

        /// The path for the output archive file (e.g. pkg.tar.gz). Must not already exist.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Unpack an archive under a destination root without overwriting anything.
    #[command(alias = "i")]
    Install {
        /// Destination root the archive is installed under. Created if absent.
        dest_root: PathBuf,

        /// The archive file to install.
        archive: PathBuf,
    },

    /// Delete everything a previous install of this archive created.
    #[command(alias = "r")]
    Remove {
        /// Destination root a previous install used.
        dest_root: PathBuf,

        /// The archive file that was installed.
        archive: PathBuf,
    },

    /// List the contents of an archive without extracting it.
    #[command(alias = "l")]
    List {
        /// The archive file to list contents of.
        #[arg(required = true)]
        archive: PathBuf,
    },

    /// Print shell exports that activate an isolated package environment.
    ///
    /// Meant to be evaluated by the wrapper function from `shell-init`, not
    /// run directly.
    Activate {
        /// Path to the project directory. Created if absent.
        project: PathBuf,
    },

    /// Print the shell wrapper function to eval in your profile.
    ShellInit,
}

/// Parses command-line arguments using `clap` and returns the command to
/// execute.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
