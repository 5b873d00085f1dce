//! `urna`: command-line front end for the campus voting core.
//!
//! # Usage
//!
//! ```
//! urna init --admin rector
//! urna --user rector enroll --national-id 0102030405 --name Ana --surname Quispe \
//!   --age 20 --program Derecho --enrollment-id D-001 --username ana_q
//! urna --user ana_q vote 3 --category Reina
//! ```
//!
//! Passwords not given on the command line or in `URNA_PASSWORD` are read from
//! stdin.

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "urna", author, version, about = "Campus election identity and voting")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "urna.toml")]
  config: PathBuf,

  #[command(flatten)]
  credentials: Credentials,

  #[command(subcommand)]
  command: Command,
}

/// Who is running the command. Used by every subcommand that needs a session.
#[derive(Args, Debug)]
struct Credentials {
  /// Username to authenticate as.
  #[arg(long, global = true, env = "URNA_USER")]
  user: Option<String>,

  /// Password for `--user` (plaintext).
  #[arg(long, global = true, env = "URNA_PASSWORD", hide_env_values = true)]
  password: Option<String>,
}

#[derive(Args, Debug)]
struct PersonArgs {
  #[arg(long)]
  national_id: String,
  #[arg(long)]
  name:        String,
  #[arg(long)]
  surname:     String,
  #[arg(long)]
  age:         u8,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the database schema and seed the built-in roles.
  Init {
    /// Also create the first administrator, with the password from
    /// `--password` or stdin. Ignored once an administrator exists.
    #[arg(long, value_name = "USERNAME")]
    admin: Option<String>,
  },

  /// Print the argon2 hash for a password entered on stdin.
  HashPassword,

  /// Create an account, optionally with a personal profile. Roles other than
  /// `student` need `--user` to be an administrator.
  Register {
    username: String,
    /// Password for the new account; read from stdin when absent.
    #[arg(long)]
    new_password: Option<String>,
    #[arg(long, default_value = "student")]
    role: String,
    /// Treat the password as temporary; it must be replaced at first login.
    #[arg(long)]
    forced_change: bool,
    /// Profile fields; all four must be given together.
    #[arg(long, requires_all = ["name", "surname", "age"])]
    national_id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    surname: Option<String>,
    #[arg(long)]
    age: Option<u8>,
  },

  /// Check credentials and show the resulting session.
  Login,

  /// Replace the current password.
  ChangePassword {
    #[arg(long)]
    new: String,
  },

  /// Replace a temporary password after the first login.
  FirstLogin {
    #[arg(long)]
    new: String,
  },

  /// Register a student (admin only).
  Enroll {
    #[command(flatten)]
    person: PersonArgs,
    #[arg(long)]
    program: String,
    #[arg(long)]
    enrollment_id: String,
    /// Also create a login; the temporary password is the national id.
    #[arg(long)]
    username: Option<String>,
  },

  /// Nominate an enrolled student as a candidate (admin only).
  Nominate {
    student_id: i64,
    #[arg(long)]
    category: String,
    #[arg(long)]
    photo: Option<String>,
    #[arg(long = "interest")]
    interests: Vec<String>,
    #[arg(long = "talent")]
    talents: Vec<String>,
    #[arg(long = "goal")]
    goals: Vec<String>,
  },

  /// Open or close a candidate to new votes (admin only).
  SetCandidateActive {
    candidate_id: i64,
    #[arg(long, action = clap::ArgAction::Set)]
    active: bool,
  },

  /// Open or close an account (admin only).
  SetAccountActive {
    account_id: i64,
    #[arg(long, action = clap::ArgAction::Set)]
    active: bool,
  },

  /// Give an account a temporary password (admin only).
  ResetPassword {
    account_id: i64,
    #[arg(long)]
    temporary: String,
  },

  /// List the active candidates of a category.
  Ballot {
    #[arg(long)]
    category: String,
  },

  /// Cast a vote as the authenticated student.
  Vote {
    candidate_id: i64,
    #[arg(long)]
    category: String,
  },

  /// Show the votes cast by the authenticated student.
  History,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  match cli.command {
    Command::HashPassword => commands::hash_password(&settings),
    command => {
      let app = commands::App::open(&settings)
        .await
        .with_context(|| format!("failed to open store at {:?}", settings.database_path))?;
      commands::run(&app, cli.credentials, command).await
    }
  }
}

/// Read a password from stdin.
fn read_password(prompt: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("{prompt}: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read password")?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
