//! The `ecdar` command line.
//!
//! Every command takes the file system it works on, so the same code runs
//! against the local disk and the in-memory file system in tests.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;

use ecdar_core::{CoreError, DocumentAdapter, FileSystem, Project};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a project directory and check every invariant
    Validate { dir: PathBuf },
    /// Write a project directory as a single JSON document
    Export {
        dir: PathBuf,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Unpack a single JSON document into a project directory
    Import { file: PathBuf, dir: PathBuf },
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Short description of a loaded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub name: String,
    pub components: usize,
    pub systems: usize,
    pub queries: usize,
}

impl Summary {
    fn of(project: &Project) -> Self {
        Self {
            name: project.name().to_string(),
            components: project.components().len(),
            systems: project.systems().len(),
            queries: project.queries().len(),
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} components, {} systems, {} queries",
            self.name, self.components, self.systems, self.queries
        )
    }
}

/// Load a project directory and run the whole-project invariant check.
pub fn validate_project<F>(
    adapter: &mut DocumentAdapter,
    fs: &F,
    dir: &Path,
) -> Result<Summary, CoreError>
where
    F: FileSystem + ?Sized,
{
    let project = adapter.load(fs, dir)?;
    project.validate()?;
    Ok(Summary::of(&project))
}

/// Load a project directory and return it as one document.
pub fn export_project<F>(
    adapter: &mut DocumentAdapter,
    fs: &F,
    dir: &Path,
) -> Result<String, CoreError>
where
    F: FileSystem + ?Sized,
{
    let project = adapter.load(fs, dir)?;
    project.validate()?;
    adapter.export(&project)
}

/// Read a single-document project and save it as a project directory.
///
/// The directory is only written once the whole document has been accepted.
pub fn import_document<F>(
    adapter: &mut DocumentAdapter,
    fs: &F,
    file: &Path,
    dir: &Path,
) -> Result<Summary, CoreError>
where
    F: FileSystem + ?Sized,
{
    let json = fs
        .read_file(file)
        .map_err(|e| CoreError::from(e).in_file(file))?;
    let project = adapter
        .import(&json)
        .map_err(|e| e.in_file(file))?;
    project.validate()?;
    adapter.save(fs, dir, &project)?;
    Ok(Summary::of(&project))
}

/// Run one parsed command, printing its result to `out`.
pub fn run<F, W>(
    command: Commands,
    adapter: &mut DocumentAdapter,
    fs: &F,
    out: &mut W,
) -> Result<(), CommandError>
where
    F: FileSystem + ?Sized,
    W: std::io::Write,
{
    match command {
        Commands::Validate { dir } => {
            let summary = validate_project(adapter, fs, &dir)?;
            writeln!(out, "{summary}: ok")?;
        }
        Commands::Export { dir, output } => {
            let json = export_project(adapter, fs, &dir)?;
            match output {
                Some(path) => {
                    fs.write_file(&path, &json)
                        .map_err(|e| CoreError::from(e).in_file(&path))?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => writeln!(out, "{json}")?,
            }
        }
        Commands::Import { file, dir } => {
            let summary = import_document(adapter, fs, &file, &dir)?;
            writeln!(out, "{summary}: saved to {}", dir.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["ecdar", "validate", "projects/University"]).unwrap();
        assert!(matches!(cli.command, Commands::Validate { dir } if dir == Path::new("projects/University")));

        let cli = Cli::try_parse_from(["ecdar", "export", "p", "--output", "p.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export { output: Some(ref out), .. } if out == Path::new("p.json")
        ));

        let cli = Cli::try_parse_from(["ecdar", "import", "p.json", "p"]).unwrap();
        assert!(matches!(cli.command, Commands::Import { .. }));

        assert!(Cli::try_parse_from(["ecdar", "import", "p.json"]).is_err());
    }

    #[test]
    fn test_summary_display() {
        let summary = Summary {
            name: "University".to_string(),
            components: 3,
            systems: 1,
            queries: 2,
        };
        assert_eq!(
            summary.to_string(),
            "University: 3 components, 1 systems, 2 queries"
        );
    }
}
