use crate::error::VcfError;
use crate::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub trait VcfSource {
    fn source_name(&self) -> &str;
    fn fetch_vcf(&self) -> Result<String>;
}

/// Reads a whole `.vcf` file into memory.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl VcfSource for FileSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn fetch_vcf(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => VcfError::MissingInput(self.path.clone()),
            _ => VcfError::Read {
                path: self.path.clone(),
                source,
            },
        })
    }
}
