use clap::{Parser, Subcommand};
use leadsync::{
  app::{self, Config},
  db::{self, LeadStore},
  extract::{markup, text},
  models::message::raw_message::{ContentType, RawMessage},
  pipeline, util,
};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "leadsync", version, about = "Turn form notification emails into leads")]
struct Cli {
  /// Database URL (overrides LEADSYNC_DATABASE)
  #[arg(long, global = true)]
  database: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Run the HTTP API and SMTP intake (default)
  Serve {
    /// HTTP listen address (overrides LEADSYNC_ADDR)
    #[arg(long)]
    addr: Option<String>,
    /// SMTP listen address (overrides LEADSYNC_SMTP_ADDR)
    #[arg(long)]
    smtp_addr: Option<String>,
  },
  /// Extract leads from .eml files and print them as JSON
  Parse {
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Store accepted leads as well
    #[arg(long)]
    save: bool,
  },
  /// Show the label/value pairs each extraction strategy sees
  Debug { file: PathBuf },
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  util::init_tracing();

  let mut config = Config::from_env();
  if let Some(url) = cli.database {
    config.database_url = url;
  }

  let result = match cli.command.unwrap_or(Command::Serve {
    addr: None,
    smtp_addr: None,
  }) {
    Command::Serve { addr, smtp_addr } => {
      if let Some(addr) = addr {
        config.http_addr = addr;
      }
      if let Some(addr) = smtp_addr {
        config.smtp_addr = addr;
      }
      app::run(config).await
    }
    Command::Parse { files, save } => parse_files(&config, &files, save).await,
    Command::Debug { file } => debug_file(&file),
  };

  if let Err(e) = result {
    eprintln!("error: {e}");
    std::process::exit(1);
  }
}

fn load(path: &PathBuf) -> Result<RawMessage, BoxError> {
  let raw = std::fs::read(path)?;
  Ok(util::raw_message_from_eml(&raw)?)
}

async fn parse_files(config: &Config, files: &[PathBuf], save: bool) -> Result<(), BoxError> {
  let mut messages = Vec::new();
  for path in files {
    match load(path) {
      Ok(message) => {
        let preview = pipeline::preview(&message);
        println!("{}", serde_json::to_string_pretty(&preview)?);
        messages.push(message);
      }
      Err(e) => error!("failed reading {}: {e}", path.display()),
    }
  }

  if save {
    let pool = db::connect(&config.database_url).await?;
    let report = pipeline::ingest_batch(&LeadStore::new(pool.clone()), messages).await;
    pool.close().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
  }
  Ok(())
}

fn debug_file(path: &PathBuf) -> Result<(), BoxError> {
  let message = load(path)?;
  println!("From:    {}", message.sender);
  println!("Subject: {}", message.subject);
  println!("Date:    {:?}", message.received_at);

  match message.content_type {
    ContentType::Html => {
      for (heuristic, label, value) in markup::debug_pairs(&message.body) {
        println!("[{heuristic}] {label} => {value}");
      }
    }
    ContentType::Text => {
      for (key, value) in text::extract_from_text(&message.body).iter() {
        println!("[text] {} => {value}", key.as_str());
      }
    }
  }
  Ok(())
}
