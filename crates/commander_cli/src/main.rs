//! Commander CLI
//!
//! Runs one repository operation against the configured backend and prints
//! the result as JSON. Backend and database settings come from the
//! environment (`COMMANDER_BACKEND`, `CommanderConnection`, `DBServer`, ...).

use clap::{Args, Parser, Subcommand};
use commander_core::{
    init_logging, CommandBackend, CommandId, CommandRepository, CommanderConfig, NewCommand,
    RepoResult,
};
use log::info;
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(name = "commander")]
#[command(about = "Commander - command line snippet catalogue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every stored command
    List,
    /// Show one command
    Get {
        id: CommandId,
    },
    /// Store a new command
    Create(FieldArgs),
    /// Replace every field of an existing command
    Update {
        id: CommandId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Remove a command
    Delete {
        id: CommandId,
    },
}

#[derive(Debug, Args)]
struct FieldArgs {
    /// Short description of the action
    #[arg(long)]
    how_to: String,
    /// The command line itself
    #[arg(long)]
    line: String,
    /// Platform or context the command applies to
    #[arg(long)]
    platform: String,
}

impl From<FieldArgs> for NewCommand {
    fn from(args: FieldArgs) -> Self {
        NewCommand::new(args.how_to, args.line, args.platform)
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CommanderConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let backend = CommandBackend::bootstrap(&config)?;
    let output = backend.with_repository(|repo| execute(repo, cli.command))?;
    info!(
        "event=cli_command module=cli status=ok backend={}",
        backend.kind().as_str()
    );

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn execute(repo: &mut dyn CommandRepository, command: Commands) -> RepoResult<Value> {
    match command {
        Commands::List => Ok(json!(repo.get_all_commands()?)),
        Commands::Get { id } => Ok(json!(repo.get_command_by_id(id)?)),
        Commands::Create(fields) => {
            repo.create_command(fields.into())?;
            let summary = repo.save_changes()?;
            match summary.inserted_ids.first() {
                Some(&id) => Ok(json!(repo.get_command_by_id(id)?)),
                None => Ok(json!({ "persisted": summary.persisted() })),
            }
        }
        Commands::Update { id, fields } => {
            let mut existing = repo.get_command_by_id(id)?;
            existing.how_to = fields.how_to;
            existing.line = fields.line;
            existing.platform = fields.platform;
            repo.update_command(&existing)?;
            repo.save_changes()?;
            Ok(json!(existing))
        }
        Commands::Delete { id } => {
            let existing = repo.get_command_by_id(id)?;
            repo.delete_command(&existing)?;
            let summary = repo.save_changes()?;
            Ok(json!({ "id": id, "persisted": summary.persisted() }))
        }
    }
}
