use std::path::PathBuf;

use clap::{Args, Parser};
use wgsl_split::GlslTarget;

fn clap_styles() -> clap::builder::Styles {
    use clap::builder::styling::{AnsiColor, Style};
    let heading = Style::new().bold().fg_color(Some(AnsiColor::Cyan.into()));
    clap::builder::Styles::styled()
        .header(heading)
        .usage(heading)
        .literal(Style::new().fg_color(Some(AnsiColor::Yellow.into())))
        .placeholder(Style::new().italic())
        .error(Style::new().bold().fg_color(Some(AnsiColor::Red.into())))
}

#[derive(Debug, Args)]
pub struct CliArgs {
    /// WGSL file to compile.
    pub input: PathBuf,
    /// Write one file per entry point into this directory instead of printing.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
    /// Only compile this entry point.
    #[arg(short, long)]
    pub entry: Option<String>,
    /// Config file (defaults to the user config directory).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// GLSL target, e.g. `es300`, `es310`, `330`, `450`.
    #[arg(long)]
    pub glsl: Option<GlslTarget>,
    /// Skip entry points the GLSL target cannot express.
    #[arg(long)]
    pub skip_unsupported: bool,
    /// Recompile whenever the input or a prelude file changes.
    #[arg(short, long)]
    pub watch: bool,
}

/// wgsl-split: WGSL to per-entry-point GLSL
#[derive(Debug, Parser)]
#[command(name = "wgsl-split", version)]
#[command(styles = clap_styles())]
pub struct Cli {
    #[command(flatten)]
    pub args: CliArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "wgsl-split",
            "shader.wgsl",
            "--glsl",
            "es310",
            "-o",
            "out",
            "-e",
            "vtx_main",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.args.input, PathBuf::from("shader.wgsl"));
        assert_eq!(cli.args.glsl, Some(GlslTarget::es(310)));
        assert_eq!(cli.args.out_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.args.entry.as_deref(), Some("vtx_main"));
        assert!(cli.args.json);
        assert!(!cli.args.watch);
    }

    #[test]
    fn help_headings_are_styled() {
        use clap::builder::styling::Effects;
        let cmd = Cli::command();
        let styles = cmd.get_styles();
        assert!(styles.get_header().get_effects().contains(Effects::BOLD));
        assert_eq!(styles.get_header(), styles.get_usage());
    }

    #[test]
    fn rejects_bad_glsl_target() {
        assert!(Cli::try_parse_from(["wgsl-split", "a.wgsl", "--glsl", "es100"]).is_err());
    }
}
