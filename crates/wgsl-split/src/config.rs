use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use naga::back::glsl;
use naga::proc::{BoundsCheckPolicies, BoundsCheckPolicy};
use serde::{Deserialize, Serialize};

use crate::compiler::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlslProfile {
    /// OpenGL ES / WebGL.
    Es,
    /// Desktop OpenGL core profile.
    Core,
}

/// GLSL dialect and `#version` the back end emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlslTarget {
    pub profile: GlslProfile,
    pub version: u16,
}

impl Default for GlslTarget {
    fn default() -> Self {
        Self::ES_300
    }
}

impl GlslTarget {
    pub const ES_300: Self = Self {
        profile: GlslProfile::Es,
        version: 300,
    };

    pub fn es(version: u16) -> Self {
        Self {
            profile: GlslProfile::Es,
            version,
        }
    }

    pub fn core(version: u16) -> Self {
        Self {
            profile: GlslProfile::Core,
            version,
        }
    }

    /// Reject versions the GLSL writer cannot target.
    pub fn validate(self) -> Result<Self, CompileError> {
        let ok = match self.profile {
            GlslProfile::Es => matches!(self.version, 300 | 310 | 320),
            GlslProfile::Core => matches!(
                self.version,
                330 | 400 | 410 | 420 | 430 | 440 | 450 | 460
            ),
        };
        if ok {
            Ok(self)
        } else {
            Err(CompileError::UnsupportedTarget(self))
        }
    }

    pub fn supports_compute(self) -> bool {
        match self.profile {
            GlslProfile::Es => self.version >= 310,
            GlslProfile::Core => self.version >= 420,
        }
    }

    pub fn to_naga(self) -> glsl::Version {
        match self.profile {
            GlslProfile::Es => glsl::Version::new_gles(self.version),
            GlslProfile::Core => glsl::Version::Desktop(self.version),
        }
    }
}

impl fmt::Display for GlslTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.profile {
            GlslProfile::Es => write!(f, "es{}", self.version),
            GlslProfile::Core => write!(f, "{}", self.version),
        }
    }
}

impl FromStr for GlslTarget {
    type Err = String;

    /// Accepts `es300`, `300es`, `core330` or a bare desktop version like `450`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (profile, digits) = if let Some(rest) = s.strip_prefix("es") {
            (GlslProfile::Es, rest.trim_start())
        } else if let Some(rest) = s.strip_suffix("es") {
            (GlslProfile::Es, rest.trim_end())
        } else if let Some(rest) = s.strip_prefix("core") {
            (GlslProfile::Core, rest.trim_start())
        } else {
            (GlslProfile::Core, s.as_str())
        };
        let version: u16 = digits
            .parse()
            .map_err(|_| format!("invalid GLSL version '{s}'"))?;
        Self { profile, version }
            .validate()
            .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsCheck {
    #[default]
    Unchecked,
    Restrict,
    ReadZeroSkipWrite,
}

impl From<BoundsCheck> for BoundsCheckPolicy {
    fn from(check: BoundsCheck) -> Self {
        match check {
            BoundsCheck::Unchecked => BoundsCheckPolicy::Unchecked,
            BoundsCheck::Restrict => BoundsCheckPolicy::Restrict,
            BoundsCheck::ReadZeroSkipWrite => BoundsCheckPolicy::ReadZeroSkipWrite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundsChecks {
    #[serde(default)]
    pub index: BoundsCheck,
    #[serde(default)]
    pub buffer: BoundsCheck,
    #[serde(default)]
    pub image_load: BoundsCheck,
    #[serde(default = "default_binding_array")]
    pub binding_array: BoundsCheck,
}

fn default_binding_array() -> BoundsCheck {
    BoundsCheck::Restrict
}

impl Default for BoundsChecks {
    fn default() -> Self {
        Self {
            index: BoundsCheck::Unchecked,
            buffer: BoundsCheck::Unchecked,
            image_load: BoundsCheck::Unchecked,
            binding_array: BoundsCheck::Restrict,
        }
    }
}

/// Persisted compiler settings (~/.config/wgsl-split/config.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub glsl: GlslTarget,
    #[serde(default)]
    pub bounds_checks: BoundsChecks,
    #[serde(default = "default_true")]
    pub adjust_coordinate_space: bool,
    #[serde(default)]
    pub force_point_size: bool,
    /// Skip entry points the target cannot express instead of failing.
    #[serde(default)]
    pub skip_unsupported_stages: bool,
    /// WGSL files appended to every input, in order.
    #[serde(default)]
    pub prelude: Vec<PathBuf>,
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            glsl: GlslTarget::default(),
            bounds_checks: BoundsChecks::default(),
            adjust_coordinate_space: true,
            force_point_size: false,
            skip_unsupported_stages: false,
            prelude: Vec::new(),
        }
    }
}

impl CompilerConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wgsl-split").join("config.json"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    /// Strict load. Relative prelude paths resolve against the config file's
    /// directory.
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.glsl.validate()?;
        if let Some(base) = path.parent() {
            config.resolve_prelude(base);
        }
        Ok(config)
    }

    pub fn resolve_prelude(&mut self, base: &Path) {
        for file in &mut self.prelude {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn glsl_options(&self) -> glsl::Options {
        let mut writer_flags = glsl::WriterFlags::empty();
        if self.adjust_coordinate_space {
            writer_flags |= glsl::WriterFlags::ADJUST_COORDINATE_SPACE;
        }
        if self.force_point_size {
            writer_flags |= glsl::WriterFlags::FORCE_POINT_SIZE;
        }
        glsl::Options {
            version: self.glsl.to_naga(),
            writer_flags,
            ..glsl::Options::default()
        }
    }

    pub fn bounds_check_policies(&self) -> BoundsCheckPolicies {
        BoundsCheckPolicies {
            index: self.bounds_checks.index.into(),
            buffer: self.bounds_checks.buffer.into(),
            image_load: self.bounds_checks.image_load.into(),
            binding_array: self.bounds_checks.binding_array.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_gles_300() {
        let config = CompilerConfig::default();
        assert_eq!(config.glsl, GlslTarget::ES_300);
        assert_eq!(config.bounds_checks.binding_array, BoundsCheck::Restrict);
        assert_eq!(config.bounds_checks.index, BoundsCheck::Unchecked);
        assert!(config.adjust_coordinate_space);
        assert!(!config.skip_unsupported_stages);
    }

    #[test]
    fn serde_empty_object_uses_defaults() {
        let config: CompilerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn serde_partial_config() {
        let json = r#"{"glsl":{"profile":"core","version":450},"bounds_checks":{"index":"restrict"}}"#;
        let config: CompilerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.glsl, GlslTarget::core(450));
        assert_eq!(config.bounds_checks.index, BoundsCheck::Restrict);
        assert_eq!(config.bounds_checks.binding_array, BoundsCheck::Restrict);
        assert!(config.adjust_coordinate_space);
    }

    #[test]
    fn target_from_str_variants() {
        assert_eq!("es300".parse::<GlslTarget>().unwrap(), GlslTarget::es(300));
        assert_eq!("310es".parse::<GlslTarget>().unwrap(), GlslTarget::es(310));
        assert_eq!("320 es".parse::<GlslTarget>().unwrap(), GlslTarget::es(320));
        assert_eq!("es 310".parse::<GlslTarget>().unwrap(), GlslTarget::es(310));
        assert_eq!("core 450".parse::<GlslTarget>().unwrap(), GlslTarget::core(450));
        assert_eq!("core330".parse::<GlslTarget>().unwrap(), GlslTarget::core(330));
        assert_eq!("460".parse::<GlslTarget>().unwrap(), GlslTarget::core(460));
    }

    #[test]
    fn target_from_str_rejects_unknown() {
        assert!("es200".parse::<GlslTarget>().is_err());
        assert!("120".parse::<GlslTarget>().is_err());
        assert!("glsl".parse::<GlslTarget>().is_err());
    }

    #[test]
    fn target_display_round_trips() {
        for target in [GlslTarget::es(310), GlslTarget::core(430)] {
            assert_eq!(target.to_string().parse::<GlslTarget>().unwrap(), target);
        }
    }

    #[test]
    fn compute_support_by_version() {
        assert!(!GlslTarget::es(300).supports_compute());
        assert!(GlslTarget::es(310).supports_compute());
        assert!(!GlslTarget::core(410).supports_compute());
        assert!(GlslTarget::core(420).supports_compute());
    }

    #[test]
    fn glsl_options_respect_flags() {
        let mut config = CompilerConfig::default();
        config.adjust_coordinate_space = false;
        config.force_point_size = true;
        let options = config.glsl_options();
        assert!(!options.writer_flags.contains(glsl::WriterFlags::ADJUST_COORDINATE_SPACE));
        assert!(options.writer_flags.contains(glsl::WriterFlags::FORCE_POINT_SIZE));
        assert_eq!(options.version, glsl::Version::new_gles(300));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = CompilerConfig::default();
        config.glsl = GlslTarget::es(310);
        config.save_to(&path).unwrap();
        assert_eq!(CompilerConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn relative_prelude_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let absolute = dir.path().join("abs.wgsl");
        let json = serde_json::json!({ "prelude": ["shaders/common.wgsl", absolute.to_str().unwrap()] });
        std::fs::write(&path, json.to_string()).unwrap();

        let config = CompilerConfig::load_from(&path).unwrap();
        assert_eq!(
            config.prelude,
            [dir.path().join("shaders").join("common.wgsl"), absolute]
        );
    }

    #[test]
    fn load_from_rejects_bad_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"glsl":{"profile":"es","version":100}}"#).unwrap();
        assert!(CompilerConfig::load_from(&path).is_err());
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CompilerConfig::load_from(&dir.path().join("nope.json")).is_err());
    }
}
