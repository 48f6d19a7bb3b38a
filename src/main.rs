mod cli;

use ofsextract::{config, extract, report};

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::Cli;
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // RUST_LOG wins over the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ofsextract=debug,ofsextract_mvc=trace".to_string()
        } else {
            "ofsextract=info,ofsextract_mvc=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.license {
        println!("{}", cli::LICENSE_TEXT);
        return Ok(());
    }

    let Some(input) = cli.input.clone() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if !extract::is_supported_input(&input) {
        anyhow::bail!(
            "'{}': Is not a supported file extension.",
            extract::input_extension(&input)
        );
    }
    cli.check()?;

    let config = config::load_config_or_default(cli.config.as_deref())?;

    if let Some(fps) = cli.fps {
        println!("OFS frame rate will now be: {}", fps);
    }
    if cli.dropframe {
        println!("'drop_frame_flag' will be set in OFS.");
    }

    let options = extract::ExtractOptions {
        input,
        output_dir: cli.output_dir.clone(),
        frame_rate: cli.fps,
        drop_frame: cli.dropframe,
        show_progress: std::io::stderr().is_terminal(),
    };
    let extraction = extract::run(&config, &options)?;

    if cli.json {
        println!("{}", report::render_json(&extraction)?);
    } else {
        print!("{}", report::render_text(&extraction));
    }

    Ok(())
}
