//! Process configuration
//!
//! Command line flags (each with an environment fallback) are parsed once in
//! the server binary and turned into an explicit [`Config`] that is handed to
//! every component that needs it.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MENU_TOP_K: usize = 25;
pub const DEFAULT_RESEARCH_TOP_K: usize = 2;
pub const DEFAULT_FOOD_COLLECTION: &str = "Food";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

#[derive(Parser, Debug, Clone)]
#[command(name = "growmood_server")]
#[command(about = "Grow Mood recommendation REST server")]
#[command(version)]
pub struct ServerArgs {
  /// Server bind address
  #[arg(long, env = "GROWMOOD_BIND", default_value = "127.0.0.1:8000")]
  pub bind: SocketAddr,

  /// API key for the embedding and chat endpoints
  #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
  pub openai_api_key: String,

  /// Base URL for OpenAI-compatible endpoints
  #[arg(long, env = "GROWMOOD_OPENAI_BASE", default_value = DEFAULT_OPENAI_BASE)]
  pub openai_base_url: String,

  /// Embedding model; must match the model the corpora were embedded with
  #[arg(long, env = "GROWMOOD_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
  pub embedding_model: String,

  /// Optional embedding dimension override
  #[arg(long, env = "GROWMOOD_EMBEDDING_DIMENSIONS")]
  pub embedding_dimensions: Option<usize>,

  /// Chat model used for generation
  #[arg(long, env = "GROWMOOD_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
  pub chat_model: String,

  /// Pre-embedded menu corpus (JSON Lines)
  #[arg(long, env = "GROWMOOD_MENU_CORPUS", default_value = "data/menu-embeddings.json")]
  pub menu_corpus: PathBuf,

  /// Pre-embedded research corpus (JSON Lines)
  #[arg(long, env = "GROWMOOD_RESEARCH_CORPUS", default_value = "data/research-embeddings.json")]
  pub research_corpus: PathBuf,

  /// Menu chunks retrieved per request
  #[arg(long, env = "GROWMOOD_MENU_TOP_K", default_value_t = DEFAULT_MENU_TOP_K)]
  pub menu_top_k: usize,

  /// Research chunks retrieved per request
  #[arg(long, env = "GROWMOOD_RESEARCH_TOP_K", default_value_t = DEFAULT_RESEARCH_TOP_K)]
  pub research_top_k: usize,

  /// Collection holding the food records
  #[arg(long, env = "GROWMOOD_FOOD_COLLECTION", default_value = DEFAULT_FOOD_COLLECTION)]
  pub food_collection: String,

  /// Serve records from a local JSON fixture instead of Firestore
  #[arg(long, env = "GROWMOOD_STORE_FIXTURE")]
  pub store_fixture: Option<PathBuf>,

  /// Firestore project holding the food records
  #[arg(long, env = "FIRESTORE_PROJECT_ID")]
  pub firestore_project: Option<String>,

  /// OAuth access token for the Firestore REST API
  #[arg(long, env = "FIRESTORE_ACCESS_TOKEN", hide_env_values = true)]
  pub firestore_token: Option<String>,

  /// Base URL for the Firestore REST API
  #[arg(long, env = "FIRESTORE_BASE_URL", default_value = DEFAULT_FIRESTORE_BASE)]
  pub firestore_base_url: String,

  /// Seconds before embedding and store requests time out
  #[arg(long, env = "GROWMOOD_HTTP_TIMEOUT_SECS", default_value_t = 30)]
  pub http_timeout_secs: u64,

  /// Seconds before a generation call is abandoned
  #[arg(long, env = "GROWMOOD_GENERATION_TIMEOUT_SECS", default_value_t = 120)]
  pub generation_timeout_secs: u64,

  /// Enable verbose logging
  #[arg(short, long)]
  pub verbose: bool,
}

/// Where food records are read from
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
  Fixture(PathBuf),
  Firestore { base_url: String, project: String, token: String },
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
  pub api_key: String,
  pub base_url: String,
  pub embedding_model: String,
  pub embedding_dimensions: Option<usize>,
  pub chat_model: String,
}

/// Retrieval and generation policy for a single request
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
  pub menu_corpus: PathBuf,
  pub research_corpus: PathBuf,
  pub menu_top_k: usize,
  pub research_top_k: usize,
  pub food_collection: String,
  pub generation_timeout: Duration,
}

impl Default for RetrievalSettings {
  fn default() -> Self {
    Self {
      menu_corpus: PathBuf::from("data/menu-embeddings.json"),
      research_corpus: PathBuf::from("data/research-embeddings.json"),
      menu_top_k: DEFAULT_MENU_TOP_K,
      research_top_k: DEFAULT_RESEARCH_TOP_K,
      food_collection: DEFAULT_FOOD_COLLECTION.to_string(),
      generation_timeout: Duration::from_secs(120),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub bind: SocketAddr,
  pub openai: OpenAiConfig,
  pub retrieval: RetrievalSettings,
  pub store: StoreConfig,
  pub http_timeout: Duration,
  pub verbose: bool,
}

impl Config {
  pub fn from_args(args: ServerArgs) -> Result<Self> {
    let store = resolve_store(&args)?;

    let config = Self {
      bind: args.bind,
      openai: OpenAiConfig {
        api_key: args.openai_api_key,
        base_url: args.openai_base_url,
        embedding_model: args.embedding_model,
        embedding_dimensions: args.embedding_dimensions,
        chat_model: args.chat_model,
      },
      retrieval: RetrievalSettings {
        menu_corpus: args.menu_corpus,
        research_corpus: args.research_corpus,
        menu_top_k: args.menu_top_k,
        research_top_k: args.research_top_k,
        food_collection: args.food_collection,
        generation_timeout: Duration::from_secs(args.generation_timeout_secs),
      },
      store,
      http_timeout: Duration::from_secs(args.http_timeout_secs),
      verbose: args.verbose,
    };

    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    anyhow::ensure!(!self.openai.api_key.trim().is_empty(), "missing OpenAI API key");
    anyhow::ensure!(!self.openai.chat_model.trim().is_empty(), "missing chat model name");
    anyhow::ensure!(!self.openai.embedding_model.trim().is_empty(), "missing embedding model name");
    anyhow::ensure!(self.retrieval.menu_top_k > 0, "menu top-k must be at least 1");
    anyhow::ensure!(self.retrieval.research_top_k > 0, "research top-k must be at least 1");
    anyhow::ensure!(!self.retrieval.food_collection.is_empty(), "missing food collection name");
    anyhow::ensure!(!self.http_timeout.is_zero(), "HTTP timeout must be non-zero");
    anyhow::ensure!(
      !self.retrieval.generation_timeout.is_zero(),
      "generation timeout must be non-zero"
    );
    Ok(())
  }
}

fn resolve_store(args: &ServerArgs) -> Result<StoreConfig> {
  if let Some(path) = &args.store_fixture {
    return Ok(StoreConfig::Fixture(path.clone()));
  }

  match (&args.firestore_project, &args.firestore_token) {
    (Some(project), Some(token)) => Ok(StoreConfig::Firestore {
      base_url: args.firestore_base_url.clone(),
      project: project.clone(),
      token: token.clone(),
    }),
    _ => Err(anyhow!(
      "no record store configured: pass --store-fixture or both --firestore-project and --firestore-token"
    )),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  fn parse(extra: &[&str]) -> ServerArgs {
    let mut argv = vec!["growmood_server", "--openai-api-key", "sk-test"];
    argv.extend_from_slice(extra);
    ServerArgs::try_parse_from(argv).unwrap()
  }

  #[test]
  #[serial]
  fn test_defaults_follow_retrieval_policy() {
    let config = Config::from_args(parse(&["--store-fixture", "fixtures/food.json"])).unwrap();
    assert_eq!(config.retrieval.menu_top_k, 25);
    assert_eq!(config.retrieval.research_top_k, 2);
    assert_eq!(config.retrieval.food_collection, "Food");
    assert_eq!(config.openai.chat_model, "gpt-4o");
    assert_eq!(config.store, StoreConfig::Fixture(PathBuf::from("fixtures/food.json")));
  }

  #[test]
  #[serial]
  fn test_fixture_takes_precedence_over_firestore() {
    let config = Config::from_args(parse(&[
      "--store-fixture",
      "food.json",
      "--firestore-project",
      "grow-mood",
      "--firestore-token",
      "token",
    ]))
    .unwrap();
    assert!(matches!(config.store, StoreConfig::Fixture(_)));
  }

  #[test]
  #[serial]
  fn test_firestore_requires_project_and_token() {
    let result = Config::from_args(parse(&["--firestore-project", "grow-mood"]));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("no record store configured"));

    let config = Config::from_args(parse(&[
      "--firestore-project",
      "grow-mood",
      "--firestore-token",
      "token",
    ]))
    .unwrap();
    assert!(matches!(config.store, StoreConfig::Firestore { ref project, .. } if project == "grow-mood"));
  }

  #[test]
  #[serial]
  fn test_validate_rejects_zero_top_k() {
    let result = Config::from_args(parse(&["--store-fixture", "food.json", "--menu-top-k", "0"]));
    assert!(result.unwrap_err().to_string().contains("menu top-k"));
  }

  #[test]
  #[serial]
  fn test_environment_fallback() {
    std::env::set_var("GROWMOOD_MENU_TOP_K", "7");
    std::env::set_var("GROWMOOD_FOOD_COLLECTION", "Menu");
    let config = Config::from_args(parse(&["--store-fixture", "food.json"]));
    std::env::remove_var("GROWMOOD_MENU_TOP_K");
    std::env::remove_var("GROWMOOD_FOOD_COLLECTION");

    let config = config.unwrap();
    assert_eq!(config.retrieval.menu_top_k, 7);
    assert_eq!(config.retrieval.food_collection, "Menu");
  }

  #[test]
  #[serial]
  fn test_validate_rejects_blank_api_key() {
    let args = ServerArgs::try_parse_from([
      "growmood_server",
      "--openai-api-key",
      "  ",
      "--store-fixture",
      "food.json",
    ])
    .unwrap();
    assert!(Config::from_args(args).is_err());
  }
}
