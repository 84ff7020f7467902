use naga::back::glsl::ReflectionInfo;
use naga::{GlobalVariable, Handle, Module};
use serde::Serialize;

/// Uniform or storage block emitted for a WGSL global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniformBlock {
    pub wgsl_name: String,
    pub glsl_name: String,
    pub group: Option<u32>,
    pub binding: Option<u32>,
}

/// Combined GLSL sampler and the WGSL texture/sampler pair it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureBinding {
    pub glsl_name: String,
    pub texture: String,
    pub sampler: Option<String>,
}

/// Name mapping between the WGSL resources and the GLSL program
/// the caller has to bind against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reflection {
    pub uniforms: Vec<UniformBlock>,
    pub textures: Vec<TextureBinding>,
}

impl Reflection {
    pub fn from_naga(module: &Module, info: &ReflectionInfo) -> Self {
        let mut uniforms: Vec<UniformBlock> = info
            .uniforms
            .iter()
            .map(|(&handle, glsl_name)| {
                let var = &module.global_variables[handle];
                UniformBlock {
                    wgsl_name: global_name(module, handle),
                    glsl_name: glsl_name.clone(),
                    group: var.binding.as_ref().map(|b| b.group),
                    binding: var.binding.as_ref().map(|b| b.binding),
                }
            })
            .collect();
        uniforms.sort_by(|a, b| {
            (a.group, a.binding, &a.glsl_name).cmp(&(b.group, b.binding, &b.glsl_name))
        });

        let mut textures: Vec<TextureBinding> = info
            .texture_mapping
            .iter()
            .map(|(glsl_name, mapping)| TextureBinding {
                glsl_name: glsl_name.clone(),
                texture: global_name(module, mapping.texture),
                sampler: mapping.sampler.map(|s| global_name(module, s)),
            })
            .collect();
        textures.sort_by(|a, b| a.glsl_name.cmp(&b.glsl_name));

        Self { uniforms, textures }
    }

    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty() && self.textures.is_empty()
    }

    pub fn uniform(&self, wgsl_name: &str) -> Option<&UniformBlock> {
        self.uniforms.iter().find(|u| u.wgsl_name == wgsl_name)
    }
}

fn global_name(module: &Module, handle: Handle<GlobalVariable>) -> String {
    let var: &GlobalVariable = &module.global_variables[handle];
    var.name
        .clone()
        .unwrap_or_else(|| format!("global_{}", handle.index()))
}
