use std::path::{Path, PathBuf};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// A file handed over by a picker, before it has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: String,
    pub path: PathBuf,
}

impl FileCandidate {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            path: path.into(),
        }
    }

    /// Builds a candidate the way a native picker declares it: display name
    /// from the file name, media type from the extension. Performs no IO.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        let media_type = if is_pdf {
            PDF_MEDIA_TYPE
        } else {
            OCTET_STREAM_MEDIA_TYPE
        };
        Self::new(name, media_type, path)
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

/// A candidate that passed validation. Only the core can create one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    media_type: String,
    path: PathBuf,
}

impl SelectedFile {
    pub(crate) fn accept(candidate: FileCandidate) -> Option<Self> {
        if !candidate.is_pdf() {
            return None;
        }
        Some(Self {
            name: candidate.name,
            media_type: candidate.media_type,
            path: candidate.path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
