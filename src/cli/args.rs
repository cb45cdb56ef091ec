use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about,
    help_template(
        "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
    )
)]
pub struct Args {
    /// Path to configuration file (TOML, or JSON if it ends in `.json`).
    #[arg(short, long, default_value = "fakeram.toml")]
    pub config: PathBuf,

    /// Directory to which output files should be saved.
    ///
    /// Each memory gets its own subdirectory.
    #[arg(short, long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Directory containing the CACTI binary. Defaults to `$CACTI_BUILD_DIR`.
    #[arg(long)]
    pub cacti_dir: Option<PathBuf>,

    /// Generate LEF (used in place and route).
    #[arg(long)]
    pub lef: bool,

    /// Generate LIB (setup, hold, and delay timing information).
    #[arg(long)]
    pub lib: bool,

    /// Generate the Verilog behavioral model.
    #[arg(long)]
    pub verilog: bool,

    /// Generate all views. The default when no view is selected.
    #[arg(short, long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["fakeram"]);
        assert_eq!(args.config, PathBuf::from("fakeram.toml"));
        assert_eq!(args.output_dir, PathBuf::from("results"));
        assert!(args.cacti_dir.is_none());
        assert!(!args.lef && !args.lib && !args.verilog && !args.all);
    }

    #[test]
    fn test_view_args() {
        let args = Args::parse_from(["fakeram", "-c", "srams.json", "--lef", "--cacti-dir", "/opt/cacti"]);
        assert_eq!(args.config, PathBuf::from("srams.json"));
        assert_eq!(args.cacti_dir, Some(PathBuf::from("/opt/cacti")));
        assert!(args.lef);
        assert!(!args.lib);
    }
}
