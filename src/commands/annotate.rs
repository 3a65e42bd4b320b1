//! Annotate command implementation.
//!
//! The annotate command:
//! 1. Parses the callgrind profile
//! 2. Renders the call tree from the root function
//! 3. Writes the report to stdout or a file

use crate::output::{print_report, write_report};
use crate::parser::parse_profile;
use crate::report::render_report;
use crate::utils::config::AnnotateConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Deepest `--max-depth` accepted
pub const MAX_DEPTH_LIMIT: usize = 256;

/// Arguments for the annotate command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct AnnotateArgs {
    /// Callgrind profile to read
    pub input: PathBuf,

    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,

    /// Rendering and tracing settings
    pub config: AnnotateConfig,
}

/// Execute the annotate command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input cannot be read or is malformed (carries path and line)
/// * Profile has no blocks to render
/// * Report file cannot be written
pub fn execute_annotate(args: &AnnotateArgs) -> Result<()> {
    let start_time = Instant::now();

    let report = annotate_file(args)?;

    match &args.output {
        Some(path) => {
            write_report(&report, path).context("Failed to write report")?;
            info!("✓ Report written to: {}", path.display());
        }
        None => print_report(&report).context("Failed to print report")?,
    }

    let elapsed = start_time.elapsed();
    debug!("Annotate completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Parse and render a profile without writing it anywhere
///
/// **Public** - returns the full report text
pub fn annotate_file(args: &AnnotateArgs) -> Result<String> {
    let profile = parse_profile(&args.input, &args.config)
        .with_context(|| format!("Failed to parse profile {}", args.input.display()))?;

    debug!(
        "Parsed profile: {} headers, {} blocks, {} functions",
        profile.metadata.len(),
        profile.contexts.len(),
        profile.functions.len()
    );

    let report = render_report(&profile, &args.config).context("Failed to render call tree")?;
    Ok(report)
}

/// Validate annotate arguments
///
/// **Public** - can be called before execute_annotate for early validation
pub fn validate_args(args: &AnnotateArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.config.max_depth == 0 {
        anyhow::bail!("max depth must be greater than 0");
    }

    if args.config.max_depth > MAX_DEPTH_LIMIT {
        anyhow::bail!("max depth is too large (max {})", MAX_DEPTH_LIMIT);
    }

    if args.config.root_function.trim().is_empty() {
        anyhow::bail!("Root function cannot be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn profile_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_args_valid() {
        let file = profile_file("events: Ir\n");
        let args = AnnotateArgs {
            input: file.path().to_path_buf(),
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_empty_input() {
        assert!(validate_args(&AnnotateArgs::default()).is_err());
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = AnnotateArgs {
            input: PathBuf::from("/nonexistent/callgrind.out.1"),
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_max_depth_bounds() {
        let file = profile_file("events: Ir\n");

        let zero = AnnotateArgs {
            input: file.path().to_path_buf(),
            config: AnnotateConfig::default().with_max_depth(0),
            ..Default::default()
        };
        assert!(validate_args(&zero).is_err());

        let huge = AnnotateArgs {
            input: file.path().to_path_buf(),
            config: AnnotateConfig::default().with_max_depth(MAX_DEPTH_LIMIT + 1),
            ..Default::default()
        };
        assert!(validate_args(&huge).is_err());
    }

    #[test]
    fn test_validate_args_empty_root() {
        let file = profile_file("events: Ir\n");
        let args = AnnotateArgs {
            input: file.path().to_path_buf(),
            config: AnnotateConfig::default().with_root(" "),
            ..Default::default()
        };

        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_annotate_file_error_keeps_position() {
        let file = profile_file("events: Ir\nfn=main\nbogus=1\n");
        let args = AnnotateArgs {
            input: file.path().to_path_buf(),
            ..Default::default()
        };

        let err = annotate_file(&args).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains(":3 Error key [bogus] unknown"));
    }

    #[test]
    fn test_execute_annotate_writes_output() {
        let file = profile_file("events: Ir\nfn=main\n1 7\n");
        let out_dir = tempfile::tempdir().unwrap();
        let out_path = out_dir.path().join("report.txt");

        let args = AnnotateArgs {
            input: file.path().to_path_buf(),
            output: Some(out_path.clone()),
            ..Default::default()
        };
        execute_annotate(&args).unwrap();

        let report = std::fs::read_to_string(out_path).unwrap();
        assert!(report.contains("Call stack:\n       7 |  + main()\n"));
    }
}
