//! Split a WGSL module into one standalone GLSL program per entry point.
//!
//! ```
//! let result = wgsl_split::compile_wgsl(
//!     r"
//! @vertex
//! fn vs() -> @builtin(position) vec4<f32> { return vec4(0.0, 0.0, 0.0, 1.0); }
//!
//! @fragment
//! fn fs() -> @location(0) vec4<f32> { return vec4(1.0); }
//! ",
//! )?;
//! assert!(result.vertex_shader.is_some());
//! assert!(result.fragment_shader.is_some());
//! # Ok::<(), wgsl_split::CompileError>(())
//! ```

pub mod compiler;
pub mod config;
pub mod output;
pub mod source;
pub mod watch;

pub use compiler::{
    CompileError, CompileResult, Compiler, EntryPointOutput, ShaderStage, compile_wgsl,
};
pub use config::{CompilerConfig, GlslTarget};
pub use source::ShaderSource;
