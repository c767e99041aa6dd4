use super::{StageRouter, Stream, TransactionMarkers};
use crate::constants::SINGLE_STAGE_FILE_SUFFIX;
use crate::error::{DiffError, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

struct Target {
    path: PathBuf,
    /// `None` means every stream, concatenated.
    stream: Option<Stream>,
    file: File,
}

/// Output files, created up front so I/O failures surface before any diff work.
pub struct OutputFiles {
    targets: Vec<Target>,
}

impl OutputFiles {
    /// One file per stream: `<prefix>_upgrade_stageN_*.sql`.
    pub fn open_staged(directory: &Path, prefix: &str) -> Result<Self> {
        let mut targets = Vec::new();
        for stream in Stream::ALL {
            let path = directory.join(format!("{}_{}.sql", prefix, stream.file_suffix()));
            targets.push(Target {
                file: create(&path)?,
                path,
                stream: Some(stream),
            });
        }
        Ok(Self { targets })
    }

    /// One file holding every stream, `<prefix>_<suffix>.sql`.
    pub fn open_single(directory: &Path, prefix: &str, suffix: Option<&str>) -> Result<Self> {
        let suffix = suffix.unwrap_or(SINGLE_STAGE_FILE_SUFFIX);
        let path = directory.join(format!("{prefix}_{suffix}.sql"));
        Ok(Self {
            targets: vec![Target {
                file: create(&path)?,
                path,
                stream: None,
            }],
        })
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.targets.iter().map(|t| t.path.as_path()).collect()
    }

    pub fn write(
        self,
        router: &StageRouter,
        markers: Option<TransactionMarkers>,
        header: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for mut target in self.targets {
            let mut text = String::new();
            if header {
                text.push_str(&header_line(&target.path));
            }
            text.push_str(&match target.stream {
                Some(stream) => router.render_stream(stream, markers),
                None => router.render_single_stage(markers),
            });
            target
                .file
                .write_all(text.as_bytes())
                .map_err(|e| DiffError::io(&target.path, e))?;
            debug!("Wrote {} bytes to {}", text.len(), target.path.display());
            written.push(target.path);
        }
        info!("Wrote {} output file(s)", written.len());
        Ok(written)
    }
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| DiffError::io(parent, e))?;
    }
    File::create(path).map_err(|e| DiffError::io(path, e))
}

fn header_line(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "-- {} generated by dbdiff {} at {}\n",
        name,
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}
