use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One prelude file inside a combined [`ShaderSource`].
#[derive(Debug, Clone)]
struct Segment {
    path: PathBuf,
    start: usize,
}

/// WGSL text handed to the compiler, with enough bookkeeping to point
/// diagnostics at the file a span came from.
///
/// The input comes first so its line numbers are unchanged; prelude files
/// follow it. Module-scope WGSL declarations are order independent, so the
/// input may still use anything a prelude declares.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    text: String,
    path: Option<PathBuf>,
    prelude: Vec<Segment>,
}

impl ShaderSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            path: None,
            prelude: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name shown in diagnostics; `wgsl` when the source has no path.
    pub fn label(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "wgsl".to_string(), |p| p.display().to_string())
    }

    fn push_prelude(&mut self, path: &Path, src: &str) {
        if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.prelude.push(Segment {
            path: path.to_path_buf(),
            start: self.text.len(),
        });
        self.text.push_str(src);
    }

    /// Map a byte offset that falls inside a prelude file to that file and a
    /// 1-based line and column. `None` for offsets inside the input.
    pub fn prelude_location(&self, offset: usize) -> Option<(&Path, usize, usize)> {
        let segment = self.prelude.iter().rev().find(|s| s.start <= offset)?;
        let before = self.text.get(segment.start..offset)?;
        let line = before.matches('\n').count() + 1;
        let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
        Some((segment.path.as_path(), line, column))
    }
}

impl From<&str> for ShaderSource {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Reads WGSL inputs and appends the configured prelude files.
pub struct SourceLoader {
    prelude_files: Vec<PathBuf>,
    prelude: Vec<String>,
}

impl SourceLoader {
    pub fn new(prelude_files: &[PathBuf]) -> Result<Self> {
        let mut loader = Self {
            prelude_files: prelude_files.to_vec(),
            prelude: Vec::new(),
        };
        loader.reload_prelude()?;
        Ok(loader)
    }

    pub fn prelude_files(&self) -> &[PathBuf] {
        &self.prelude_files
    }

    /// Re-read prelude sources from disk (called when one of them changes).
    pub fn reload_prelude(&mut self) -> Result<()> {
        let mut prelude = Vec::with_capacity(self.prelude_files.len());
        for path in &self.prelude_files {
            let src = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read prelude {}", path.display()))?;
            prelude.push(src);
        }
        if !self.prelude_files.is_empty() {
            log::info!("Loaded {} prelude file(s)", self.prelude_files.len());
        }
        self.prelude = prelude;
        Ok(())
    }

    pub fn load(&self, path: &Path) -> Result<ShaderSource> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(self.combine(ShaderSource::new(source).with_path(path)))
    }

    pub fn combine(&self, mut source: ShaderSource) -> ShaderSource {
        for (path, src) in self.prelude_files.iter().zip(&self.prelude) {
            source.push_prelude(path, src);
        }
        source
    }
}
