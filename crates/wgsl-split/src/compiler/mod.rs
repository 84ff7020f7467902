mod error;
mod reflect;

use std::fmt;

use naga::back::glsl;
use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use naga::{EntryPoint, Module};
use serde::Serialize;

use crate::config::CompilerConfig;
use crate::source::ShaderSource;

pub use error::CompileError;
pub use reflect::{Reflection, TextureBinding, UniformBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 3] = [Self::Vertex, Self::Fragment, Self::Compute];

    /// Stages the GLSL back end can emit; task and mesh stages map to `None`.
    fn from_naga(stage: naga::ShaderStage) -> Option<Self> {
        match stage {
            naga::ShaderStage::Vertex => Some(Self::Vertex),
            naga::ShaderStage::Fragment => Some(Self::Fragment),
            naga::ShaderStage::Compute => Some(Self::Compute),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
            Self::Compute => naga::ShaderStage::Compute,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One standalone GLSL program, generated from a single WGSL entry point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPointOutput {
    pub name: String,
    pub stage: ShaderStage,
    pub glsl: String,
    pub reflection: Reflection,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub vertex_shader: Option<String>,
    pub fragment_shader: Option<String>,
    pub compute_shader: Option<String>,
    /// Every compiled entry point in declaration order.
    pub entry_points: Vec<EntryPointOutput>,
}

impl CompileResult {
    /// Later entry points of the same stage replace earlier ones in the
    /// per-stage fields; `entry_points` keeps all of them.
    pub fn push(&mut self, output: EntryPointOutput) {
        let slot = match output.stage {
            ShaderStage::Vertex => &mut self.vertex_shader,
            ShaderStage::Fragment => &mut self.fragment_shader,
            ShaderStage::Compute => &mut self.compute_shader,
        };
        *slot = Some(output.glsl.clone());
        self.entry_points.push(output);
    }

    pub fn get(&self, name: &str) -> Option<&EntryPointOutput> {
        self.entry_points.iter().find(|ep| ep.name == name)
    }

    pub fn stage(&self, stage: ShaderStage) -> Option<&str> {
        match stage {
            ShaderStage::Vertex => self.vertex_shader.as_deref(),
            ShaderStage::Fragment => self.fragment_shader.as_deref(),
            ShaderStage::Compute => self.compute_shader.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry_points.is_empty()
    }
}

/// Compile every entry point of `source` with the default configuration
/// (GLSL ES 300).
pub fn compile_wgsl(source: &str) -> Result<CompileResult, CompileError> {
    Compiler::default().compile(source)
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Result<Self, CompileError> {
        config.glsl.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, source: &str) -> Result<CompileResult, CompileError> {
        self.compile_source(&ShaderSource::new(source))
    }

    /// Like [`Compiler::compile`], with diagnostics labelled by the source's
    /// path and prelude files.
    pub fn compile_source(&self, source: &ShaderSource) -> Result<CompileResult, CompileError> {
        let (module, info) = parse_and_validate(source)?;
        let mut result = CompileResult::default();

        for entry in &module.entry_points {
            let Some(stage) = ShaderStage::from_naga(entry.stage) else {
                log::warn!(
                    "Skipping entry point '{}': {:?} stage has no GLSL equivalent",
                    entry.name,
                    entry.stage
                );
                continue;
            };
            if stage == ShaderStage::Compute
                && !self.config.glsl.supports_compute()
                && self.config.skip_unsupported_stages
            {
                log::warn!(
                    "Skipping compute entry point '{}': GLSL {} has no compute shaders",
                    entry.name,
                    self.config.glsl
                );
                continue;
            }
            result.push(self.write_entry_point(&module, &info, entry, stage)?);
        }

        log::debug!("Compiled {} entry points", result.entry_points.len());
        Ok(result)
    }

    /// Compile only the entry point called `name`.
    pub fn compile_entry_point(
        &self,
        source: &str,
        name: &str,
    ) -> Result<EntryPointOutput, CompileError> {
        self.compile_entry_point_source(&ShaderSource::new(source), name)
    }

    pub fn compile_entry_point_source(
        &self,
        source: &ShaderSource,
        name: &str,
    ) -> Result<EntryPointOutput, CompileError> {
        let (module, info) = parse_and_validate(source)?;

        let found = module
            .entry_points
            .iter()
            .filter_map(|ep| ShaderStage::from_naga(ep.stage).map(|stage| (ep, stage)))
            .find(|(ep, _)| ep.name == name);

        match found {
            Some((entry, stage)) => self.write_entry_point(&module, &info, entry, stage),
            None => Err(CompileError::EntryPointNotFound {
                name: name.to_string(),
                available: module
                    .entry_points
                    .iter()
                    .filter(|ep| ShaderStage::from_naga(ep.stage).is_some())
                    .map(|ep| ep.name.clone())
                    .collect(),
            }),
        }
    }

    fn write_entry_point(
        &self,
        module: &Module,
        info: &ModuleInfo,
        entry: &EntryPoint,
        stage: ShaderStage,
    ) -> Result<EntryPointOutput, CompileError> {
        let backend_error = |source: glsl::Error| CompileError::Backend {
            entry_point: entry.name.clone(),
            stage,
            source,
        };

        let options = self.config.glsl_options();
        let pipeline_options = glsl::PipelineOptions {
            shader_stage: stage.to_naga(),
            entry_point: entry.name.clone(),
            multiview: None,
        };

        let mut buffer = String::new();
        let mut writer = glsl::Writer::new(
            &mut buffer,
            module,
            info,
            &options,
            &pipeline_options,
            self.config.bounds_check_policies(),
        )
        .map_err(backend_error)?;
        let reflection_info = writer.write().map_err(backend_error)?;
        let reflection = Reflection::from_naga(module, &reflection_info);
        drop(writer);

        Ok(EntryPointOutput {
            name: entry.name.clone(),
            stage,
            glsl: buffer,
            reflection,
        })
    }
}

fn parse_and_validate(source: &ShaderSource) -> Result<(Module, ModuleInfo), CompileError> {
    let module = naga::front::wgsl::parse_str(source.text())
        .map_err(|e| CompileError::parse(&e, source))?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| CompileError::validation(&e, source))?;

    Ok((module, info))
}
