// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod catalogue;
mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use catalogue::CatalogueSource;
use config::Config;
use runtime::{OutputRuntime, OutputTarget};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use swanform_app::{Catalogue, ProjectForm, ProjectOptions};
use swanform_tui::DialogOutcome;
use tracing::info;

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
            "load config {}; run `swanform --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init(&config.log_dir()?, config.log_filter())?;

    let source = CatalogueSource::resolve(
        options.catalogue_path.as_deref(),
        config.catalogue_path(),
        options.demo,
    );
    let catalogue = source.load()?;
    let mut form = prepare_form(&options, &config, catalogue)?;
    if options.check_only {
        info!("check passed");
        return Ok(());
    }

    let mut runtime = OutputRuntime::new(OutputTarget::from_flag(options.output_path));
    match swanform_tui::run_dialog(&mut form, &mut runtime)? {
        DialogOutcome::Confirmed => info!("project confirmed"),
        DialogOutcome::Dismissed => info!("project dialog closed"),
    }
    Ok(())
}

fn prepare_form(options: &CliOptions, config: &Config, catalogue: Catalogue) -> Result<ProjectForm> {
    let project = initial_options(options, catalogue)?;
    ProjectForm::with_default_stack(project, config.default_stack()).context(
        "prepare project form -- pass --stack with a catalogue stack or fix [form].default_stack",
    )
}

fn initial_options(options: &CliOptions, catalogue: Catalogue) -> Result<ProjectOptions> {
    let mut project = ProjectOptions::new(Arc::new(catalogue));
    if let Some(name) = &options.name {
        project = project.with_name(name.as_str());
    }
    if let Some(stack) = &options.stack {
        project = project.with_stack(stack.as_str());
    }
    if let Some(path) = &options.script_path {
        let script = fs::read_to_string(path)
            .with_context(|| format!("read user script {}", path.display()))?;
        project = project.with_user_script(script);
    }
    Ok(project)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    catalogue_path: Option<PathBuf>,
    name: Option<String>,
    stack: Option<String>,
    script_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
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
        catalogue_path: None,
        name: None,
        stack: None,
        script_path: None,
        output_path: None,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                options.config_path = PathBuf::from(flag_value(&mut iter, "--config", "a file path")?);
            }
            "--catalogue" => {
                options.catalogue_path =
                    Some(PathBuf::from(flag_value(&mut iter, "--catalogue", "a file path")?));
            }
            "--name" => {
                options.name = Some(flag_value(&mut iter, "--name", "a project name")?);
            }
            "--stack" => {
                options.stack = Some(flag_value(&mut iter, "--stack", "a stack name")?);
            }
            "--script" => {
                options.script_path =
                    Some(PathBuf::from(flag_value(&mut iter, "--script", "a file path")?));
            }
            "--output" => {
                options.output_path =
                    Some(PathBuf::from(flag_value(&mut iter, "--output", "a file path")?));
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
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn flag_value<I, S>(iter: &mut I, flag: &str, what: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn print_help() {
    println!("swanform: create a SWAN project request");
    println!("  --config <path>          Use a specific config path");
    println!("  --catalogue <path>       Load stacks/releases/platforms from a JSON file");
    println!("  --name <text>            Prefill the project name");
    println!("  --stack <name>           Preselect a software stack");
    println!("  --script <path>          Prefill the user script from a file");
    println!("  --output <path>          Write the confirmed request here instead of stdout");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Use the built-in catalogue");
    println!("  --check                  Validate config, catalogue and initial options");
    println!("  --help                   Show this help");
}
