use std::path::{Path, PathBuf};

use serde_json::json;
use tera::Tera;
use tracing::info;

use crate::error::ExportError;
use crate::manifest::RunManifest;
use crate::render::{self, NARRATIVE_TEMPLATE, PLACEHOLDER_TEMPLATE};

pub const MANIFEST_FILE: &str = "narratives.json";
pub const SUMMARY_FILE: &str = "_03-00_sirf_text.qmd";

/// Writes narrative text files where the report renderer includes them.
pub struct NarrativeWriter {
    output_dir: PathBuf,
    tera: Tera,
}

impl NarrativeWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        Ok(Self {
            output_dir: output_dir.into(),
            tera: render::builtin_templates()?,
        })
    }

    /// Replace the built-in narrative layout with `content` (tera syntax).
    /// The template sees the generated text as `text`.
    pub fn with_narrative_template(mut self, content: &str) -> Result<Self, ExportError> {
        self.tera
            .add_raw_template(NARRATIVE_TEMPLATE, content)
            .map_err(|e| ExportError::TemplateParse(e.to_string()))?;
        Ok(self)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn write_narrative(&self, file_name: &str, text: &str) -> Result<PathBuf, ExportError> {
        let rendered = render::render(&self.tera, NARRATIVE_TEMPLATE, &json!({ "text": text }))?;
        let path = self.write(file_name, &rendered)?;
        info!(path = %path.display(), "wrote narrative");
        Ok(path)
    }

    pub fn write_placeholder(
        &self,
        file_name: &str,
        title: &str,
        failures: &[String],
    ) -> Result<PathBuf, ExportError> {
        let rendered = render::render(
            &self.tera,
            PLACEHOLDER_TEMPLATE,
            &json!({ "title": title, "failures": failures }),
        )?;
        let path = self.write(file_name, &rendered)?;
        info!(path = %path.display(), "wrote manual-narrative placeholder");
        Ok(path)
    }

    pub fn write_manifest(&self, manifest: &RunManifest) -> Result<PathBuf, ExportError> {
        let json = serde_json::to_string_pretty(manifest)?;
        self.write(MANIFEST_FILE, &json)
    }

    /// Write via a temp file and rename so the renderer never sees a
    /// partial file.
    fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ExportError::Io { path, source }
        };

        std::fs::create_dir_all(&self.output_dir).map_err(io_err(&self.output_dir))?;

        let path = self.output_dir.join(file_name);
        let tmp_path = self.output_dir.join(format!("{file_name}.tmp"));
        std::fs::write(&tmp_path, contents.as_bytes()).map_err(io_err(&tmp_path))?;
        std::fs::rename(&tmp_path, &path).map_err(io_err(&path))?;
        Ok(path)
    }
}
