//! Main entry point for the treepack CLI app

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use treepack::cli::{self, Commands};
use treepack::{archive, env, extract, remove};

fn main() -> ExitCode {
    // Log to stderr so `activate` output stays evalable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;

    match &command {
        Commands::Pack {
            root,
            subpath,
            output,
        } => {
            archive::archive(root, subpath, output)?;
        }
        Commands::Install { dest_root, archive } => {
            fs::create_dir_all(dest_root)?;
            extract::unpack(dest_root, archive)?;
        }
        Commands::Remove { dest_root, archive } => {
            remove::remove(dest_root, archive)?;
        }
        Commands::List { archive } => {
            extract::list_files(archive)?;
        }
        Commands::Activate { project } => {
            activate(project)?;
        }
        Commands::ShellInit => {
            let bin = std::env::current_exe()?;
            let shell = env::Shell::from_shell_var(std::env::var_os("SHELL").as_deref())?;
            print!("{}", env::shell_function(shell, &bin)?);
        }
    }

    Ok(())
}

/// Builds the export context for a project environment and prints it for the
/// calling shell to eval.
fn activate(project: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os(env::ENV_VAR).is_some() {
        return Err("already in an active environment, run `deactivate` first".into());
    }
    fs::create_dir_all(project)?;
    let project = fs::canonicalize(project)?;
    let venv = project.join("venv");
    fs::create_dir_all(&venv)?;

    let shell = env::Shell::from_shell_var(std::env::var_os("SHELL").as_deref())?;
    let mut ctx = env::Context::new(shell);
    ctx.add_search_path(&project);
    ctx.add_search_path(&venv);

    let mut path = format!(
        "{}:{}",
        project.join("bin").display(),
        venv.join("bin").display()
    );
    if let Ok(existing) = std::env::var("PATH") {
        path.push(':');
        path.push_str(&existing);
    }
    ctx.export("PATH", path);
    ctx.export(env::ENV_VAR, venv.display().to_string());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    ctx.write_all(|name| std::env::var(name).ok(), &mut out)?;
    out.flush()?;
    Ok(())
}
