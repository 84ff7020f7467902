use naga::back::glsl;

use super::ShaderStage;
use crate::config::GlslTarget;
use crate::source::ShaderSource;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// WGSL front end rejected the source. `message` is the rendered diagnostic.
    #[error("Could not parse WGSL\n{message}")]
    Parse { message: String },
    #[error("WGSL validation failed\n{message}")]
    Validation { message: String },
    #[error("failed to write GLSL for {stage} entry point '{entry_point}': {source}")]
    Backend {
        entry_point: String,
        stage: ShaderStage,
        #[source]
        source: glsl::Error,
    },
    #[error("entry point '{name}' not found (available: {})", .available.join(", "))]
    EntryPointNotFound {
        name: String,
        available: Vec<String>,
    },
    #[error("unsupported GLSL target {0}")]
    UnsupportedTarget(GlslTarget),
}

impl CompileError {
    pub fn parse(error: &naga::front::wgsl::ParseError, source: &ShaderSource) -> Self {
        let label = source.label();
        let mut message = error.emit_to_string_with_path(source.text(), label.as_str());
        let offset = error.location(source.text()).map(|loc| loc.offset as usize);
        append_prelude_note(&mut message, source, offset);
        Self::Parse { message }
    }

    pub fn validation(
        error: &naga::WithSpan<naga::valid::ValidationError>,
        source: &ShaderSource,
    ) -> Self {
        let label = source.label();
        let mut message = error.emit_to_string_with_path(source.text(), label.as_str());
        let offset = error.location(source.text()).map(|loc| loc.offset as usize);
        append_prelude_note(&mut message, source, offset);
        Self::Validation { message }
    }
}

/// Diagnostics are rendered against the combined text, so spans inside a
/// prelude file get their real file and line added.
fn append_prelude_note(message: &mut String, source: &ShaderSource, offset: Option<usize>) {
    if let Some((path, line, column)) = offset.and_then(|o| source.prelude_location(o)) {
        if !message.ends_with('\n') {
            message.push('\n');
        }
        message.push_str(&format!(
            "note: error is in prelude {}:{line}:{column}",
            path.display()
        ));
    }
}
