use super::error::SaveError;
use super::format::{decompress_and_deserialize, from_json, serialize_and_compress, to_json, Project};
use super::migration::migrate_project;

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    /// `.json`: pretty-printed, meant to be edited and diffed
    Json,
    /// `.pulje`: compressed snapshot with a checksum
    Snapshot,
}

impl ProjectFormat {
    pub fn from_path(path: &Path) -> Result<Self, SaveError> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Ok(ProjectFormat::Json),
            Some("pulje") => Ok(ProjectFormat::Snapshot),
            _ => Err(SaveError::UnsupportedFormat { path: path.display().to_string() }),
        }
    }
}

pub struct ProjectStore;

impl ProjectStore {
    /// Validates and writes the project. The file is replaced atomically.
    pub fn save(path: &Path, project: &Project) -> Result<(), SaveError> {
        let format = ProjectFormat::from_path(path)?;
        project.validate()?;

        let data = match format {
            ProjectFormat::Json => to_json(project)?.into_bytes(),
            ProjectFormat::Snapshot => serialize_and_compress(project)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, path)?;

        log::info!("Saved project ({} rows) to {:?}", project.rows.len(), path);
        log::debug!("Wrote {} bytes as {:?}", data.len(), format);
        Ok(())
    }

    /// Reads, migrates and validates a project.
    pub fn load(path: &Path) -> Result<Project, SaveError> {
        let format = ProjectFormat::from_path(path)?;
        if !path.exists() {
            return Err(SaveError::FileNotFound { path: path.display().to_string() });
        }

        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let project = match format {
            ProjectFormat::Json => {
                let text = String::from_utf8(data).map_err(|_| SaveError::Corrupted)?;
                from_json(&text)?
            }
            ProjectFormat::Snapshot => decompress_and_deserialize(&data)?,
        };
        let project = migrate_project(project)?;
        project.validate()?;

        log::info!("Loaded project ({} rows) from {:?}", project.rows.len(), path);
        Ok(project)
    }
}
