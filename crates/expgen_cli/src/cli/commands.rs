//! Command implementations
//!
//! Every command returns the process exit code. Diagnostics go to the
//! given writer (stdout in production) so they can be piped.

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use expgen_core::results::{export_csv, is_experiment_trial, load_records};
use expgen_core::{
    CompileOptions, CompileReport, CompileStatus, ExpgenConfig, ExportOptions, ImportMode, Severity,
};
use log::info;
use serde_json::json;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Loads configuration, starts logging and runs the selected command.
pub fn run_command(cli: Cli, out: &mut dyn Write) -> CliResult<i32> {
    let config = ExpgenConfig::load(cli.config.as_deref())?;
    start_logging(&cli, &config)?;

    match cli.command {
        Command::Compile {
            source,
            target,
            local_imports,
            local_imports_dir,
        } => compile(&config, &source, &target, local_imports, local_imports_dir, out),
        Command::Check { source, dump_json } => check(&config, &source, dump_json, out),
        Command::ExportResults {
            data,
            output,
            time0,
            all,
            keep,
        } => export_results(&data, &output, time0, all, &keep, out),
    }
}

fn start_logging(cli: &Cli, config: &ExpgenConfig) -> CliResult<()> {
    let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
    let dir: Option<PathBuf> = cli.log_dir.clone().or_else(|| config.log.dir.clone());
    expgen_core::init_logging(level, dir.as_deref()).map_err(CliError::logging_error)
}

fn compile_options(config: &ExpgenConfig) -> CompileOptions {
    CompileOptions {
        parse: config.parse_config(),
        generator: config.generator_options(),
    }
}

/// `expgen compile`
pub fn compile(
    config: &ExpgenConfig,
    source: &Path,
    target: &Path,
    local_imports: bool,
    local_imports_dir: Option<String>,
    out: &mut dyn Write,
) -> CliResult<i32> {
    let mut options = compile_options(config);
    if local_imports {
        options.generator.import_mode = ImportMode::Local;
    }
    if let Some(dir) = local_imports_dir {
        options.generator.local_imports_dir = dir;
    }

    let report = expgen_core::compile(source, target, &options)?;
    print_diagnostics(&report, out)?;
    match report.status {
        CompileStatus::Failed => writeln!(
            out,
            "compilation failed; `{}` was not written",
            target.display()
        )?,
        _ => writeln!(out, "wrote {}", target.display())?,
    }
    Ok(report.status.exit_code())
}

/// `expgen check`
pub fn check(
    config: &ExpgenConfig,
    source: &Path,
    dump_json: bool,
    out: &mut dyn Write,
) -> CliResult<i32> {
    let report = expgen_core::check(source, &compile_options(config))?;
    if dump_json {
        let dump = json!({
            "status": report.status.as_str(),
            "diagnostics": &report.diagnostics,
            "experiment": &report.experiment,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&dump)?)?;
    } else {
        print_diagnostics(&report, out)?;
    }
    Ok(report.status.exit_code())
}

/// `expgen export-results`
pub fn export_results(
    data: &Path,
    output: &Path,
    time0: f64,
    all: bool,
    keep: &[String],
    out: &mut dyn Write,
) -> CliResult<i32> {
    let file = File::open(data)
        .map_err(|e| CliError::io_error(format!("cannot open `{}`: {e}", data.display())))?;
    let records = load_records(BufReader::new(file))?;

    let options = keep
        .iter()
        .fold(ExportOptions { time0, ..ExportOptions::default() }, |options, field| {
            options.keep_field(field)
        });

    let target = File::create(output)
        .map_err(|e| CliError::io_error(format!("cannot create `{}`: {e}", output.display())))?;
    let exported = if all {
        export_csv(&records, |_| true, &options, BufWriter::new(target))?
    } else {
        export_csv(&records, is_experiment_trial, &options, BufWriter::new(target))?
    };

    info!(
        "event=export_results module=cli status=ok data={} output={} exported={}",
        data.display(),
        output.display(),
        exported
    );
    writeln!(
        out,
        "exported {exported} of {} trials to {}",
        records.len(),
        output.display()
    )?;
    Ok(0)
}

fn print_diagnostics(report: &CompileReport, out: &mut dyn Write) -> CliResult<()> {
    for diagnostic in &report.diagnostics {
        writeln!(out, "{diagnostic}")?;
    }
    writeln!(
        out,
        "{} error(s), {} warning(s)",
        report.diagnostics.count(Severity::Error),
        report.diagnostics.count(Severity::Warning)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::export_results;
    use std::fs;

    #[test]
    fn export_results_writes_experiment_trials_only() {
        let dir = tempfile::tempdir().expect("temp dir");
        let data = dir.path().join("data.json");
        let output = dir.path().join("results.csv");
        fs::write(
            &data,
            r#"[
  {"trial_type": "fullscreen", "rt": 10, "internal_node_id": "0.0-0.0"},
  {"trial_type": "html-keyboard-response", "rt": 1500, "expgen_trial": true, "response_value": "left"}
]"#,
        )
        .expect("write data");

        let mut out = Vec::new();
        let code = export_results(&data, &output, 500.0, false, &[], &mut out).expect("export runs");

        assert_eq!(code, 0);
        let csv = fs::read_to_string(&output).expect("csv written");
        assert_eq!(
            csv,
            "\"rt\",\"expgen_trial\",\"response_value\"\r\n\"1000\",\"true\",\"left\"\r\n"
        );
        let printed = String::from_utf8(out).expect("utf8 output");
        assert!(printed.starts_with("exported 1 of 2 trials"));
    }

    #[test]
    fn export_results_can_keep_default_dropped_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let data = dir.path().join("data.json");
        let output = dir.path().join("results.csv");
        fs::write(&data, r#"[{"trial_type": "x", "rt": 3}]"#).expect("write data");

        let mut out = Vec::new();
        export_results(&data, &output, 0.0, true, &["trial_type".to_string()], &mut out)
            .expect("export runs");

        let csv = fs::read_to_string(&output).expect("csv written");
        assert_eq!(csv, "\"trial_type\",\"rt\"\r\n\"x\",\"3\"\r\n");
    }
}
