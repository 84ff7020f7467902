use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use wgsl_split::output::{self, OutputFormat};
use wgsl_split::source::SourceLoader;
use wgsl_split::watch::SourceWatcher;
use wgsl_split::{CompileResult, Compiler, CompilerConfig};

use crate::cli::CliArgs;

pub struct App {
    compiler: Compiler,
    loader: SourceLoader,
    input: PathBuf,
    entry: Option<String>,
    out_dir: Option<PathBuf>,
    format: OutputFormat,
}

impl App {
    pub fn new(args: CliArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => CompilerConfig::load_from(path)?,
            None => CompilerConfig::load(),
        };
        if let Some(target) = args.glsl {
            config.glsl = target;
        }
        if args.skip_unsupported {
            config.skip_unsupported_stages = true;
        }
        log::debug!("Targeting GLSL {}", config.glsl);

        let loader = SourceLoader::new(&config.prelude)?;
        let compiler = Compiler::new(config)?;

        Ok(Self {
            compiler,
            loader,
            input: args.input,
            entry: args.entry,
            out_dir: args.out_dir,
            format: if args.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
        })
    }

    pub fn compile(&self) -> Result<CompileResult> {
        let source = self.loader.load(&self.input)?;
        let result = match &self.entry {
            Some(name) => {
                let mut result = CompileResult::default();
                result.push(self.compiler.compile_entry_point_source(&source, name)?);
                result
            }
            None => self.compiler.compile_source(&source)?,
        };
        if result.is_empty() {
            log::warn!("{} has no entry points to compile", self.input.display());
        }
        Ok(result)
    }

    pub fn emit(&self, result: &CompileResult) -> Result<()> {
        match &self.out_dir {
            Some(dir) => {
                let stem = self
                    .input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("shader");
                output::write_to_dir(result, stem, dir)?;
            }
            None => print!("{}", output::render(result, self.format)?),
        }
        Ok(())
    }

    pub fn run_once(&self) -> Result<()> {
        let result = self.compile()?;
        self.emit(&result)
    }

    /// Compile, then recompile on every change until the process is killed.
    /// Errors are logged instead of ending the loop.
    pub fn run_watch(&mut self) -> Result<()> {
        let mut files = vec![self.input.clone()];
        files.extend(self.loader.prelude_files().iter().cloned());
        let watcher = SourceWatcher::new(&files)?;

        if let Err(e) = self.run_once() {
            log::error!("{e:#}");
        }

        loop {
            let Some(first) = watcher.wait_for_change(Duration::from_millis(500)) else {
                continue;
            };
            let mut changed = vec![first];
            changed.extend(watcher.drain_changes());
            for path in &changed {
                log::info!("Changed: {}", path.display());
            }

            if !self.loader.prelude_files().is_empty() {
                if let Err(e) = self.loader.reload_prelude() {
                    log::error!("{e:#}");
                    continue;
                }
            }

            match self.run_once() {
                Ok(()) => log::info!("Recompiled {}", self.input.display()),
                Err(e) => log::error!("{e:#}"),
            }
        }
    }
}
