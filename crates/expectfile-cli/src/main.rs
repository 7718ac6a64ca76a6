//! `expectfile` command-line entry point.

mod cli;
mod walk;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use expectfile_core::{
    run_stage, EngineError, Manifest, RealFilesystem, Reconciler, RunReport, TracingLogger,
};

use crate::cli::{CheckArgs, Cli, Command, OutputFormat};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => check(&args),
        Command::Validate { manifest } => validate(&manifest),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            if let Some(EngineError::Failed { .. }) = err.downcast_ref::<EngineError>() {
                tracing::error!("{}", err);
                return ExitCode::FAILURE;
            }
            tracing::error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

fn check(args: &CheckArgs) -> Result<ExitCode> {
    let manifest = Manifest::from_file(&args.manifest)
        .with_context(|| format!("loading manifest {}", args.manifest.display()))?;
    let config = args.apply(manifest.options);
    let set = manifest.expectations().context("building expectations")?;

    tracing::debug!(
        manifest = %args.manifest.display(),
        root = %args.root.display(),
        expectations = set.len(),
        real_files = args.real,
        "Starting check"
    );

    let logger = Arc::new(TracingLogger);
    let report = if args.real {
        let mut reconciler =
            Reconciler::real_files(set, config, logger, args.root.clone(), RealFilesystem);
        reconciler.finalize()?
    } else {
        let paths = walk::collect_files(&args.root)
            .with_context(|| format!("walking {}", args.root.display()))?;
        let files = walk::observed_files(&args.root, paths, Some(args.manifest.as_path()));
        let reconciler = Reconciler::new(set, config, logger);
        run_stage(reconciler, files, drop)?
    };

    print_report(&report, args.format)?;

    Ok(if report.verdict.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {}
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
    }
    Ok(())
}

fn validate(path: &std::path::Path) -> Result<ExitCode> {
    let manifest = Manifest::from_file(path)
        .with_context(|| format!("loading manifest {}", path.display()))?;
    let set = manifest.expectations().context("building expectations")?;

    println!("{}: valid, {} expectations", path.display(), set.len());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn check_args(manifest: &std::path::Path, root: &std::path::Path) -> CheckArgs {
        CheckArgs {
            manifest: manifest.to_path_buf(),
            root: root.to_path_buf(),
            real: false,
            verbose: false,
            silent: true,
            allow_unexpected: false,
            allow_missing: false,
            error_on_failure: false,
            format: OutputFormat::Text,
        }
    }

    fn fixture(manifest: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/app.js"), "'use strict';\nmain();").unwrap();
        fs::write(dir.path().join("dist/robots.txt"), "User-agent: *").unwrap();
        fs::write(dir.path().join("expect.yaml"), manifest).unwrap();
        dir
    }

    #[test]
    fn test_check_passes() {
        let dir = fixture(
            r#"
expect:
  "dist/app.js": "use strict"
  "dist/robots.txt": null
"#,
        );
        let args = check_args(&dir.path().join("expect.yaml"), dir.path());
        assert_eq!(check(&args).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_check_fails_on_content_mismatch() {
        let dir = fixture(
            r#"
expect:
  "dist/app.js": "/^export/m"
  "dist/robots.txt": null
"#,
        );
        let args = check_args(&dir.path().join("expect.yaml"), dir.path());
        assert_eq!(check(&args).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn test_check_error_on_failure() {
        let dir = fixture("expect: [dist/app.js]\n");
        let mut args = check_args(&dir.path().join("expect.yaml"), dir.path());
        args.error_on_failure = true;

        let err = check(&args).unwrap_err();
        assert_eq!(err.to_string(), "Failed 1 expectations");
    }

    #[test]
    fn test_check_real_files() {
        let dir = fixture("expect: [dist/app.js, dist/*.txt, dist/gone.js]\n");
        let mut args = check_args(&dir.path().join("expect.yaml"), dir.path());
        args.real = true;
        assert_eq!(check(&args).unwrap(), ExitCode::FAILURE);

        args.allow_missing = true;
        assert_eq!(check(&args).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_validate() {
        let dir = fixture("expect: [a.txt, b.txt]\n");
        assert_eq!(
            validate(&dir.path().join("expect.yaml")).unwrap(),
            ExitCode::SUCCESS
        );

        fs::write(dir.path().join("bad.yaml"), "expect: 3\n").unwrap();
        assert!(validate(&dir.path().join("bad.yaml")).is_err());

        // Real-file mode is chosen with --real, never by the manifest
        let real = "options: {checkRealFiles: true}\nexpect: [a.txt]\n";
        fs::write(dir.path().join("real.yaml"), real).unwrap();
        assert!(validate(&dir.path().join("real.yaml")).is_err());
    }
}
