//! # BK Harness CLI (`bkh`)
//!
//! Drives the BK document/knowledge-base API from the terminal. Each command
//! maps to one view of the harness and issues one backend call.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bkh status` | Show the signed-in user and the available views |
//! | `bkh login` | Log in and store the session token |
//! | `bkh register` | Create an account, then log in |
//! | `bkh logout` | Clear the stored session token |
//! | `bkh upload <file>` | Upload a document |
//! | `bkh docs` | List documents, optionally filtered by filename |
//! | `bkh doc <id>` | Show one document with a text preview |
//! | `bkh delete <id>` | Delete a document |
//! | `bkh search "<query>"` | Hybrid semantic search |
//! | `bkh ask "<question>"` | Retrieval-augmented question answering |
//! | `bkh health` | Probe the backend |
//!
//! ## Examples
//!
//! ```bash
//! bkh register --email demo@example.com --password demo1234
//! bkh upload ./menu.pdf
//! bkh search latte --k 5 --min-score 0.25
//! bkh ask "Who is the barista?" --provider ollama --model phi3:3.8b
//! BKH_API_BASE=http://kb.internal:8001 bkh docs --filter menu
//! ```

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

use bk_harness::api::ApiClient;
use bk_harness::config;
use bk_harness::controller::{AuthState, Controller};
use bk_harness::session::FileSessionStore;
use bk_harness::views::{
    run_view, AskForm, AuthForm, AuthMode, DeleteForm, DocsForm, DocumentForm, HealthView,
    SearchForm, UploadForm, View, ViewState,
};

const DEFAULT_CONFIG: &str = "./config/bkh.toml";

/// BK Harness: a command-line test client for the BK document and
/// knowledge-base API.
#[derive(Parser)]
#[command(
    name = "bkh",
    about = "BK Harness: a command-line test client for the BK document and knowledge-base API",
    version,
    long_about = "BK Harness exercises a remote document/knowledge-base API: authentication, \
    file upload, document listing, hybrid semantic search, and retrieval-augmented question \
    answering. Responses are rendered as text or, with --json, as raw JSON."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/bkh.toml`; when that file does not exist the
    /// built-in defaults are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL. Overrides `api.base_url` and `BKH_API_BASE`.
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Print the raw response payload as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log requests and state transitions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is signed in and which views are available.
    ///
    /// Fetches the profile when a token is stored. An invalid or expired
    /// token is cleared and reported.
    Status,

    /// Log in and store the session token.
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Register a new account, then log in.
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Clear the stored session token.
    Logout,

    /// Upload a document (PDF, DOCX, TXT, MD).
    Upload {
        /// Path of the file to upload.
        file: PathBuf,
    },

    /// List documents.
    Docs {
        /// Only documents whose filename contains this substring.
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one document with a text preview.
    Doc {
        /// Document id.
        id: i64,
    },

    /// Delete a document.
    Delete {
        /// Document id.
        id: i64,
    },

    /// Hybrid search (vector similarity + keyword gate).
    Search {
        /// Query text. Defaults to the configured example query.
        query: Option<String>,

        /// Number of results.
        #[arg(long)]
        k: Option<u32>,

        /// Minimum similarity score in [0, 1].
        #[arg(long, value_parser = parse_min_score)]
        min_score: Option<f64>,

        /// Require a query word in each hit (`true`/`false`).
        #[arg(long)]
        keyword_filter: Option<bool>,

        /// Maximum chunks per document.
        #[arg(long)]
        per_doc: Option<u32>,

        /// Require every query word in each hit (`true`/`false`).
        #[arg(long)]
        require_all_terms: Option<bool>,

        /// Maximum number of documents returned.
        #[arg(long)]
        doc_limit: Option<u32>,

        /// Top chunks shown per document.
        #[arg(long)]
        chunks_per_doc: Option<u32>,
    },

    /// Ask a question answered from the uploaded documents.
    Ask {
        /// Question text. Defaults to the configured example question.
        question: Option<String>,

        /// Chunks passed to the model.
        #[arg(long)]
        k: Option<u32>,

        #[arg(long)]
        max_context_tokens: Option<u32>,

        /// LLM provider: `ollama`, `openai`, or `hf`.
        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Require every question word in kept chunks (`true`/`false`).
        #[arg(long)]
        require_all_terms: Option<bool>,

        /// Phrase that must appear verbatim in kept chunks.
        #[arg(long)]
        phrase: Option<String>,

        /// Minimum similarity score in [0, 1].
        #[arg(long, value_parser = parse_min_score)]
        min_score: Option<f64>,

        #[arg(long)]
        per_file: Option<u32>,

        /// Trim the answer to this many characters.
        #[arg(long)]
        max_answer_chars: Option<u32>,
    },

    /// Probe the backend's health endpoint.
    Health,

    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "bkh", &mut std::io::stdout());
        return Ok(());
    }

    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path, true)?,
        None => config::load_config(&PathBuf::from(DEFAULT_CONFIG), false)?,
    };
    if let Some(ref base) = cli.api_base {
        cfg = cfg.with_base_url(base)?;
    }

    let session = Arc::new(FileSessionStore::new(cfg.session.path.clone()));
    let api = ApiClient::new(&cfg.api.base_url, session)?;
    let mut controller = Controller::new(api);
    let json = cli.json;

    match cli.command {
        Commands::Status => {
            controller.mount().await;
            print_status(&controller, json)?;
        }
        Commands::Login { email, password } => {
            let defaults = AuthForm::default();
            let form = AuthForm {
                mode: AuthMode::Login,
                email: email.unwrap_or(defaults.email),
                password: password.unwrap_or(defaults.password),
                name: defaults.name,
            };
            authenticate(&mut controller, &form, json).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            let defaults = AuthForm::default();
            let form = AuthForm {
                mode: AuthMode::Register,
                email: email.unwrap_or(defaults.email),
                password: password.unwrap_or(defaults.password),
                name: name.unwrap_or(defaults.name),
            };
            authenticate(&mut controller, &form, json).await?;
        }
        Commands::Logout => {
            controller.logout()?;
            println!("Signed out.");
        }
        Commands::Health => {
            submit(&mut controller, &HealthView, json).await?;
        }
        Commands::Upload { file } => {
            require_session(&mut controller).await?;
            submit(&mut controller, &UploadForm::new(file), json).await?;
        }
        Commands::Docs { filter } => {
            require_session(&mut controller).await?;
            let form = DocsForm {
                filter: filter.unwrap_or_default(),
            };
            submit(&mut controller, &form, json).await?;
        }
        Commands::Doc { id } => {
            require_session(&mut controller).await?;
            submit(&mut controller, &DocumentForm { id }, json).await?;
        }
        Commands::Delete { id } => {
            require_session(&mut controller).await?;
            submit(&mut controller, &DeleteForm { id }, json).await?;
        }
        Commands::Search {
            query,
            k,
            min_score,
            keyword_filter,
            per_doc,
            require_all_terms,
            doc_limit,
            chunks_per_doc,
        } => {
            let mut form = SearchForm::from_defaults(&cfg.search);
            if let Some(q) = query {
                form.q = q;
            }
            form.k = k.unwrap_or(form.k);
            form.min_score = min_score.unwrap_or(form.min_score);
            form.keyword_filter = keyword_filter.unwrap_or(form.keyword_filter);
            form.per_doc = per_doc.unwrap_or(form.per_doc);
            form.require_all_terms = require_all_terms;
            form.doc_limit = doc_limit;
            form.chunks_per_doc = chunks_per_doc;

            require_session(&mut controller).await?;
            submit(&mut controller, &form, json).await?;
        }
        Commands::Ask {
            question,
            k,
            max_context_tokens,
            provider,
            model,
            require_all_terms,
            phrase,
            min_score,
            per_file,
            max_answer_chars,
        } => {
            let mut form = AskForm::from_defaults(&cfg.ask);
            if let Some(q) = question {
                form.question = q;
            }
            form.k = k.unwrap_or(form.k);
            form.max_context_tokens = max_context_tokens.unwrap_or(form.max_context_tokens);
            if let Some(p) = provider {
                form.provider = p;
            }
            if let Some(m) = model {
                form.model = m;
            }
            form.require_all_terms = require_all_terms.unwrap_or(form.require_all_terms);
            form.phrase = phrase;
            form.min_score = min_score.unwrap_or(form.min_score);
            form.per_file = per_file.unwrap_or(form.per_file);
            form.max_answer_chars = max_answer_chars.unwrap_or(form.max_answer_chars);

            require_session(&mut controller).await?;
            submit(&mut controller, &form, json).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}

fn parse_min_score(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    config::check_min_score("min_score", value).map_err(|e| e.to_string())?;
    Ok(value)
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Mount the controller and refuse to continue unless signed in.
async fn require_session(controller: &mut Controller) -> Result<()> {
    match controller.mount().await {
        AuthState::Authenticated(_) => Ok(()),
        AuthState::Unauthenticated { error: Some(e) } => bail!("{}", e),
        _ => bail!("Not signed in. Run `bkh login` first."),
    }
}

async fn authenticate(controller: &mut Controller, form: &AuthForm, json: bool) -> Result<()> {
    match run_view(form, controller.api()).await {
        ViewState::Done(out) => {
            if !json {
                println!("{}", out.text);
            }
        }
        ViewState::Failed(e) => return Err(e),
        ViewState::Idle => {}
    }

    controller.on_authed().await;
    print_status(controller, json)?;
    if !controller.is_authenticated() {
        bail!("login succeeded but the profile could not be loaded");
    }
    Ok(())
}

async fn submit(controller: &mut Controller, view: &dyn View, json: bool) -> Result<()> {
    let state = run_view(view, controller.api()).await;
    controller.observe(&state);

    match state {
        ViewState::Done(out) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&out.json)?);
            } else {
                println!("{}", out.text);
            }
            Ok(())
        }
        ViewState::Failed(e) => Err(e),
        ViewState::Idle => Ok(()),
    }
}

fn print_status(controller: &Controller, json: bool) -> Result<()> {
    let views = controller.visible_views();

    if json {
        let value = json!({
            "signed_in": controller.is_authenticated(),
            "profile": controller.profile(),
            "error": match controller.state() {
                AuthState::Unauthenticated { error } => error.clone(),
                _ => None,
            },
            "views": views,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", controller.header());
    if let Some(banner) = controller.banner() {
        println!("{}", banner);
    }
    let names: Vec<String> = views
        .iter()
        .map(|v| format!("{:?}", v).to_lowercase())
        .collect();
    println!("views: {}", names.join(", "));
    Ok(())
}
