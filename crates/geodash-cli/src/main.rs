// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use geodash_app::DashboardState;
use geodash_data::DataSource;
use runtime::SourceRuntime;
use std::env;
use std::path::PathBuf;
use time::{Date, OffsetDateTime};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `geodash --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let source = config.data_source(options.data_path.as_deref(), options.demo)?;
    let dashboard_config = config.dashboard_config()?;
    let load_delay = config.load_delay()?;

    if options.check_only {
        print!("{}", check_report(&source, OffsetDateTime::now_utc().date())?);
        return Ok(());
    }

    let log_path = config.log_path()?;
    let _log_guard = logging::init(&log_path, config.log_level())?;
    tracing::info!(
        source = %source.describe(),
        config = %options.config_path.display(),
        "starting dashboard"
    );

    let mut state = DashboardState::new(dashboard_config);
    let mut runtime = SourceRuntime::new(source, load_delay);
    geodash_tui::run_app(&mut state, &mut runtime)
}

/// One summary line, then one indented line per record problem.
fn check_report(source: &DataSource, today: Date) -> Result<String> {
    let report = source.load(today).with_context(|| {
        format!(
            "load records from {} -- set [data].path, --data or GEODASH_DATA_PATH",
            source.describe()
        )
    })?;
    let mut out = format!(
        "{}: {} records, {} problems, {} dropped\n",
        source.describe(),
        report.records.len(),
        report.problems.len(),
        report.dropped()
    );
    for problem in &report.problems {
        out.push_str(&format!("  {problem}\n"));
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_path: Option<PathBuf>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_path: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--data requires a JSON file path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("geodash: geo project dashboard");
    println!("  --config <path>          Use a specific config path");
    println!("  --data <path>            Load projects from a JSON file");
    println!("  --demo                   Use generated demo projects");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Load config and records, report problems, exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{check_report, parse_cli_args};
    use anyhow::Result;
    use geodash_data::DataSource;
    use geodash_testkit::temp_data_file;
    use std::path::PathBuf;
    use time::macros::date;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/geodash-config.toml")
    }

    #[test]
    fn data_flag_and_demo_flag_are_both_recorded() -> Result<()> {
        let options = parse_cli_args(
            vec!["--data", "/srv/projects.json", "--demo", "--check"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, default_options_path());
        assert_eq!(options.data_path, Some(PathBuf::from("/srv/projects.json")));
        assert!(options.demo);
        assert!(options.check_only);
        Ok(())
    }

    #[test]
    fn flags_missing_their_value_fail() {
        for flag in ["--config", "--data"] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains(&format!("{flag} requires")));
        }
    }

    #[test]
    fn unknown_argument_points_at_help() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        assert!(error.to_string().contains("--help"));
    }

    #[test]
    fn check_report_lists_each_problem() -> Result<()> {
        let (_dir, path) = temp_data_file(
            r#"[{"id":"a","name":"Alpha","latitude":95.0,"longitude":1.0,
                 "status":"Active","lastUpdated":"2023-01-01"},
                {"id":"a","name":"Alpha Copy","latitude":1.0,"longitude":1.0,
                 "status":"Active","lastUpdated":"2023-01-01"}]"#,
        )?;
        let report = check_report(&DataSource::File(path), date!(2024 - 01 - 01))?;
        let lines = report.lines().collect::<Vec<_>>();
        assert!(lines[0].ends_with("1 records, 2 problems, 1 dropped"));
        assert_eq!(lines.len(), 3);
        assert!(lines[1..].iter().all(|line| line.starts_with("  record ")));
        Ok(())
    }

    #[test]
    fn check_report_failure_names_the_fix() {
        let source = DataSource::File(PathBuf::from("/nonexistent/geodash/projects.json"));
        let error =
            check_report(&source, date!(2024 - 01 - 01)).expect_err("missing file should fail");
        assert!(format!("{error:#}").contains("GEODASH_DATA_PATH"));
    }
}
