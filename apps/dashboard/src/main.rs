use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_config, BackendCommand, DashboardController, UiAction, UiEvent};
use crossbeam_channel::{bounded, select};
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod orchestration;
mod ui;

use orchestration::dispatch_backend_commands;
use ui::input::{parse_line, spawn_stdin_reader, Input, HELP};

#[derive(Parser, Debug)]
#[command(about = "Terminal dashboard for EduCloud study tools")]
struct Args {
    /// TOML config file; defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    let (line_tx, line_rx) = bounded::<String>(64);
    backend_bridge::runtime::launch(config.clone(), cmd_rx, ui_tx);
    spawn_stdin_reader(line_tx);

    let mut controller = DashboardController::new(config.upload_refresh_delay);
    let mut status = String::new();
    dispatch_backend_commands(&cmd_tx, controller.handle_action(UiAction::Load), &mut status);
    println!("{}", ui::render::render(&controller, "Checking session... (type `help`)"));

    loop {
        select! {
            recv(ui_rx) -> event => {
                let Ok(event) = event else {
                    tracing::error!("backend worker exited");
                    break;
                };
                let commands = controller.apply_event(event);
                dispatch_backend_commands(&cmd_tx, commands, &mut status);
            }
            recv(line_rx) -> line => {
                let Ok(line) = line else { break };
                status.clear();
                match parse_line(&line, controller.screen().kind(), controller.dashboard()) {
                    Ok(Input::Action(action)) => {
                        let commands = controller.handle_action(action);
                        dispatch_backend_commands(&cmd_tx, commands, &mut status);
                    }
                    Ok(Input::Help) => status = HELP.to_string(),
                    Ok(Input::Quit) => break,
                    Ok(Input::Nothing) => {}
                    Err(message) => status = message,
                }
            }
        }
        println!("{}", ui::render::render(&controller, &status));
    }

    Ok(())
}
