//! Import and export of whole projects.
//!
//! A project is persisted either as one JSON document ([`RawProject`]) or as
//! a project directory:
//!
//! ```text
//! <dir>/GlobalDeclarations.json
//! <dir>/Queries.json
//! <dir>/Components/<component name>.json
//! <dir>/Systems/<system name>.json
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::fs::FileSystem;
use crate::id::{IdNamespace, ProjectId};
use crate::model::HasRaw;
use crate::project::{Project, ProjectContext, ProjectPolicy};
use crate::raw::{RawComponent, RawDeclaration, RawEntity, RawProject, RawQuery, RawSystem};
use crate::schema;

pub const GLOBAL_DECLARATIONS_FILE: &str = "GlobalDeclarations.json";
pub const QUERIES_FILE: &str = "Queries.json";
pub const COMPONENTS_DIR: &str = "Components";
pub const SYSTEMS_DIR: &str = "Systems";

/// Entry point for turning documents into projects and back.
///
/// Owns the namespace project ids are drawn from, so projects opened through
/// the same adapter never share an id.
#[derive(Debug, Clone)]
pub struct DocumentAdapter {
    project_ids: IdNamespace,
    policy: ProjectPolicy,
}

impl DocumentAdapter {
    pub fn new(policy: ProjectPolicy) -> Self {
        Self {
            project_ids: IdNamespace::new("projects"),
            policy,
        }
    }

    pub fn policy(&self) -> ProjectPolicy {
        self.policy
    }

    /// Start an empty project.
    pub fn new_project(&mut self, name: impl Into<String>) -> Result<Project, CoreError> {
        let name = name.into();
        let id = ProjectId(self.project_ids.get_new_id_from_raw(&name)?);
        Ok(Project::new(id, name, self.policy))
    }

    /// Validate a single-document project and build it.
    pub fn import(&mut self, json: &str) -> Result<Project, CoreError> {
        let raw: RawProject = schema::parse(json)?;
        self.build(raw)
    }

    /// Serialize a project as a single document.
    pub fn export(&self, project: &Project) -> Result<String, CoreError> {
        let json = schema::serialize(&project.to_raw())?;
        tracing::info!("Exported {} ({} bytes)", project.id(), json.len());
        Ok(json)
    }

    /// Read a project directory. The project is named after the directory.
    pub fn load<F>(&mut self, fs: &F, dir: &Path) -> Result<Project, CoreError>
    where
        F: FileSystem + ?Sized,
    {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let global_declarations: RawDeclaration =
            read_record(fs, &dir.join(GLOBAL_DECLARATIONS_FILE))?;

        let queries_path = dir.join(QUERIES_FILE);
        let queries: Vec<RawQuery> = if fs.exists(&queries_path) {
            let json = fs
                .read_file(&queries_path)
                .map_err(|e| CoreError::from(e).in_file(&queries_path))?;
            schema::parse_list(&json).map_err(|e| e.in_file(&queries_path))?
        } else {
            Vec::new()
        };

        let components: Vec<RawComponent> = read_records(fs, &dir.join(COMPONENTS_DIR))?;
        let systems: Vec<RawSystem> = read_records(fs, &dir.join(SYSTEMS_DIR))?;

        let project = self
            .build(RawProject {
                name,
                global_declarations,
                components,
                systems,
                queries,
            })
            .map_err(|e| e.in_file(dir))?;

        tracing::info!(
            "Loaded {} from {}: {} components, {} systems, {} queries",
            project.id(),
            dir.display(),
            project.components().len(),
            project.systems().len(),
            project.queries().len()
        );
        Ok(project)
    }

    /// Write a project directory, removing component and system files that
    /// no longer belong to the project.
    pub fn save<F>(&self, fs: &F, dir: &Path, project: &Project) -> Result<(), CoreError>
    where
        F: FileSystem + ?Sized,
    {
        let raw = project.to_raw();

        write(
            fs,
            &dir.join(GLOBAL_DECLARATIONS_FILE),
            &schema::serialize(&raw.global_declarations)?,
        )?;
        write(fs, &dir.join(QUERIES_FILE), &schema::serialize_list(&raw.queries)?)?;

        let components_dir = dir.join(COMPONENTS_DIR);
        let mut written = HashSet::new();
        for component in &raw.components {
            let path = components_dir.join(format!("{}.json", component.name));
            write(fs, &path, &schema::serialize(component)?)?;
            written.insert(path);
        }

        let systems_dir = dir.join(SYSTEMS_DIR);
        for system in &raw.systems {
            let path = systems_dir.join(format!("{}.json", system.name));
            write(fs, &path, &schema::serialize(system)?)?;
            written.insert(path);
        }

        for stale_dir in [&components_dir, &systems_dir] {
            for stale in json_files(fs, stale_dir)? {
                if !written.contains(&stale) {
                    tracing::debug!("Removing stale file {}", stale.display());
                    fs.remove_file(&stale)
                        .map_err(|e| CoreError::from(e).in_file(&stale))?;
                }
            }
        }

        tracing::info!("Saved {} to {}", project.id(), dir.display());
        Ok(())
    }

    fn build(&mut self, raw: RawProject) -> Result<Project, CoreError> {
        let mut project_ids = self.project_ids.clone();
        let id = ProjectId(project_ids.get_new_id_from_raw(&raw.name)?);
        let project = Project::from_raw(
            raw,
            ProjectContext {
                id,
                policy: self.policy,
            },
        )?;
        self.project_ids = project_ids;
        tracing::info!("Imported {} ({})", project.name(), id);
        Ok(project)
    }
}

impl Default for DocumentAdapter {
    fn default() -> Self {
        Self::new(ProjectPolicy::default())
    }
}

fn read_record<F, R>(fs: &F, path: &Path) -> Result<R, CoreError>
where
    F: FileSystem + ?Sized,
    R: RawEntity,
{
    let json = fs
        .read_file(path)
        .map_err(|e| CoreError::from(e).in_file(path))?;
    schema::parse(&json).map_err(|e| e.in_file(path))
}

fn read_records<F, R>(fs: &F, dir: &Path) -> Result<Vec<R>, CoreError>
where
    F: FileSystem + ?Sized,
    R: RawEntity,
{
    json_files(fs, dir)?
        .iter()
        .map(|path| read_record(fs, path))
        .collect()
}

/// `.json` files in `dir`, sorted. A missing directory has none.
fn json_files<F>(fs: &F, dir: &Path) -> Result<Vec<PathBuf>, CoreError>
where
    F: FileSystem + ?Sized,
{
    if !fs.exists(dir) {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = fs
        .read_dir(dir)
        .map_err(|e| CoreError::from(e).in_file(dir))?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}

fn write<F>(fs: &F, path: &Path, content: &str) -> Result<(), CoreError>
where
    F: FileSystem + ?Sized,
{
    fs.write_file(path, content)
        .map_err(|e| CoreError::from(e).in_file(path))
}
