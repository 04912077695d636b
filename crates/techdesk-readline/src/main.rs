use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;

use techdesk_application::ManualSession;
use techdesk_core::error::TechdeskError;
use techdesk_core::prompts::SUGGESTED_QUERIES;
use techdesk_core::session::ActiveView;
use techdesk_infrastructure::logging::init_tracing;
use techdesk_infrastructure::{ConfigService, SecretServiceImpl, TechdeskPaths};
use techdesk_interaction::{GeminiApiClient, InputMode, PromptAssembler};

mod command;
mod display;
mod helper;
mod render;

use command::Command;
use helper::CliHelper;
use render::LineRenderer;

#[derive(Parser)]
#[command(name = "techdesk")]
#[command(about = "Ask questions about equipment manuals from the terminal", long_about = None)]
struct Cli {
    /// Manuals to load at startup (PDF, PNG, JPEG, WEBP)
    files: Vec<PathBuf>,

    /// Directory holding config.toml, secret.json and logs
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Backend Initialization =====
    let paths = TechdeskPaths::new(cli.config_dir.as_deref())?;
    let _log_guard = init_tracing(&paths.logs_dir())?;
    let secret_path = paths.ensure_secret_file()?;

    let config = ConfigService::new(&paths).get_config();
    let secrets = SecretServiceImpl::new(&paths);
    let client = match GeminiApiClient::from_secrets(&secrets, &config.model).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!(
                "{}",
                format!(
                    "{e}. Set GEMINI_API_KEY or add a key to {}",
                    secret_path.display()
                )
                .red()
            );
            return Err(e.into());
        }
    };
    tracing::info!(model = client.chat_model(), "Starting techdesk");

    let workspace = ManualSession::new(Arc::new(client), PromptAssembler::from_config(&config));

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    display::print_banner();
    if !cli.files.is_empty() {
        upload(&workspace, &cli.files).await;
    }

    let mut mode = InputMode::Normal;

    // ===== Main REPL Loop =====
    loop {
        let prompt = match mode {
            InputMode::Normal => ">> ",
            InputMode::ErrorCode => "code> ",
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.as_str());

                match command {
                    Command::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Command::Upload(files) if files.is_empty() => {
                        println!("{}", "Usage: /upload <file> [file...]".yellow());
                    }
                    Command::Upload(files) => upload(&workspace, &files).await,
                    Command::Chat => {
                        if switch_view(&workspace, ActiveView::Chat).await {
                            display::print_conversation(&workspace.snapshot().await);
                        }
                    }
                    Command::Dashboard => {
                        if switch_view(&workspace, ActiveView::Dashboard).await {
                            display::print_dashboard(&workspace.dashboard().await);
                        }
                    }
                    Command::Code(None) => {
                        mode = InputMode::ErrorCode;
                        println!("{}", "Enter the fault code shown on the machine.".bright_black());
                    }
                    Command::Code(Some(code)) => send(&workspace, &code, InputMode::ErrorCode).await,
                    Command::Suggest(None) => display::print_suggestions(),
                    Command::Suggest(Some(n)) => match n.checked_sub(1).and_then(|i| SUGGESTED_QUERIES.get(i)) {
                        Some(query) => {
                            println!("{}", format!("> {query}").green());
                            send(&workspace, query, InputMode::Normal).await;
                        }
                        None => println!(
                            "{}",
                            format!("Pick a query between 1 and {}.", SUGGESTED_QUERIES.len()).yellow()
                        ),
                    },
                    Command::Reset => {
                        workspace.reset().await;
                        mode = InputMode::Normal;
                        println!("{}", "Session cleared. Upload a manual to begin.".bright_green());
                    }
                    Command::Files => display::print_files(&workspace.snapshot().await),
                    Command::Help => display::print_help(),
                    Command::Message(text) => {
                        let turn_mode = std::mem::take(&mut mode);
                        send(&workspace, &text, turn_mode).await;
                    }
                    Command::Unknown(name) => {
                        println!("{}", format!("Unknown command: {name}").bright_black());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

/// Encodes and loads manuals; extraction keeps running in the background.
async fn upload(workspace: &ManualSession, files: &[PathBuf]) {
    println!("{}", format!("Processing {} file(s)...", files.len()).bright_black());
    match workspace.upload(files).await {
        Ok(_extraction) => {
            let session = workspace.snapshot().await;
            display::print_conversation(&session);
            if session.shows_suggestions() {
                display::print_suggestions();
            }
        }
        Err(e) => eprintln!("{}", format!("Upload failed: {e}").red()),
    }
}

/// Runs one chat turn, printing rendered lines as fragments arrive.
async fn send(workspace: &ManualSession, text: &str, mode: InputMode) {
    let mut turn = match workspace.submit_turn(text, mode).await {
        Ok(turn) => turn,
        Err(TechdeskError::NoActiveManual) => {
            println!("{}", "Load a manual first with /upload.".yellow());
            return;
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            return;
        }
    };

    let mut renderer = LineRenderer::new();
    while let Some(fragment) = turn.next_fragment().await {
        for line in renderer.push(&fragment) {
            println!("{line}");
        }
    }
    if let Some(line) = renderer.finish() {
        println!("{line}");
    }
    println!();
}

async fn switch_view(workspace: &ManualSession, view: ActiveView) -> bool {
    match workspace.set_view(view).await {
        Ok(()) => true,
        Err(_) => {
            println!("{}", "Load a manual first with /upload.".yellow());
            false
        }
    }
}
