use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::compiler::{CompileResult, ShaderStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn extension(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vert",
        ShaderStage::Fragment => "frag",
        ShaderStage::Compute => "comp",
    }
}

/// Write `<stem>.<entry>.<ext>` for every entry point into `dir`.
pub fn write_to_dir(result: &CompileResult, stem: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(result.entry_points.len());
    for ep in &result.entry_points {
        let path = dir.join(format!("{stem}.{}.{}", ep.name, extension(ep.stage)));
        std::fs::write(&path, &ep.glsl)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Wrote {} shader '{}' to {}", ep.stage, ep.name, path.display());
        written.push(path);
    }
    Ok(written)
}

/// Stage-labelled listing: vertex first, then fragment, then compute.
pub fn render_text(result: &CompileResult) -> String {
    let mut out = String::new();
    for stage in ShaderStage::ALL {
        for ep in result.entry_points.iter().filter(|ep| ep.stage == stage) {
            let _ = writeln!(out, "// ---- {} shader: {} ----", ep.stage, ep.name);
            out.push_str(&ep.glsl);
            if !ep.glsl.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out
}

pub fn render_json(result: &CompileResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn render(result: &CompileResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result)),
        OutputFormat::Json => render_json(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{EntryPointOutput, Reflection};

    fn entry(name: &str, stage: ShaderStage, glsl: &str) -> EntryPointOutput {
        EntryPointOutput {
            name: name.into(),
            stage,
            glsl: glsl.into(),
            reflection: Reflection::default(),
        }
    }

    fn sample() -> CompileResult {
        CompileResult {
            vertex_shader: Some("void main() { vs(); }\n".into()),
            fragment_shader: Some("void main() { fs(); }".into()),
            compute_shader: None,
            entry_points: vec![
                entry("frag_main", ShaderStage::Fragment, "void main() { fs(); }"),
                entry("vtx_main", ShaderStage::Vertex, "void main() { vs(); }\n"),
            ],
        }
    }

    #[test]
    fn extensions_per_stage() {
        assert_eq!(extension(ShaderStage::Vertex), "vert");
        assert_eq!(extension(ShaderStage::Fragment), "frag");
        assert_eq!(extension(ShaderStage::Compute), "comp");
    }

    #[test]
    fn text_lists_vertex_before_fragment() {
        let text = render_text(&sample());
        let vs = text.find("vertex shader: vtx_main").unwrap();
        let fs = text.find("fragment shader: frag_main").unwrap();
        assert!(vs < fs);
        assert!(text.ends_with("fs(); }\n"));
    }

    #[test]
    fn json_has_stage_fields() {
        let json = render_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vertexShader"], "void main() { vs(); }\n");
        assert!(value["computeShader"].is_null());
        assert_eq!(value["entryPoints"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn writes_one_file_per_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let written = write_to_dir(&sample(), "triangle", &out_dir).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(out_dir.join("triangle.vtx_main.vert")).unwrap(),
            "void main() { vs(); }\n"
        );
        assert!(out_dir.join("triangle.frag_main.frag").exists());
    }

    #[test]
    fn empty_result_renders_nothing() {
        assert!(render(&CompileResult::default(), OutputFormat::Text).unwrap().is_empty());
    }
}
