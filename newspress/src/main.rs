/*
newspress - command line entry point.
Loads an environment's configuration, builds the configured AI agent and runs prompt tasks.
*/

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use common::{ConfigLoader, Configuration, EnvironmentTag};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newspress::llm::{AiFactory, EngineKind};
use newspress::processing::run_task;
use newspress::prompts::PromptManager;

/// Deployment variable naming the environment when `--env` is not given.
const ENV_VAR: &str = "NEWSPRESS_ENV";

#[derive(Parser, Debug)]
#[command(name = "newspress", about = "Newspress configuration and AI task runner")]
struct Args {
    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct ConfigArgs {
    /// Path to config.<env>.json
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Environment tag; wins over NEWSPRESS_ENV and the file name
    #[arg(long, value_name = "TAG")]
    env: Option<String>,

    /// Key store document (default: api_keys.json next to the config)
    #[arg(long, value_name = "FILE")]
    key_store: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ContentArgs {
    /// Content given inline
    #[arg(long, conflicts_with = "file")]
    content: Option<String>,

    /// Read content from a file (stdin when neither is given)
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a configuration
    Check(ConfigArgs),
    /// Print the environment inferred from a config file name
    Env { path: String },
    /// List available prompt tasks
    Tasks,
    /// Print the rendered prompt for a task
    Prompt {
        task: String,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Run a task through the configured AI engine
    Run {
        task: String,
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        content: ContentArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(e) = dispatch(args.command).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Check(config_args) => {
            let config = load(&config_args).await?;
            print_summary(&config);
        }
        Command::Env { path } => {
            let env = common::infer_environment(&path)?;
            println!("{}", env);
        }
        Command::Tasks => {
            let prompts = PromptManager::global();
            for task in prompts.available_tasks() {
                println!("{:<18} {}", task, prompts.task_description(task)?);
            }
        }
        Command::Prompt { task, content } => {
            let content = read_content(&content).await?;
            println!("{}", PromptManager::global().prompt(&task, &content)?);
        }
        Command::Run {
            task,
            config,
            content,
        } => {
            let cfg = load(&config).await?;
            let agent = AiFactory::get_agent(&cfg)?.with_context(|| {
                format!("AI is disabled in {}", cfg.source().display())
            })?;
            let content = read_content(&content).await?;
            let output = run_task(&agent, PromptManager::global(), &task, &content).await?;
            info!(task = %output.task, engine = %output.engine, "task completed");
            println!("{}", output.text);
        }
    }
    Ok(())
}

/// Explicit `--env` wins, then the deployment variable, then the file name.
fn resolve_environment(explicit: Option<&str>) -> Result<Option<EnvironmentTag>> {
    let from_var = std::env::var(ENV_VAR).ok().filter(|v| !v.trim().is_empty());
    explicit
        .map(str::to_string)
        .or(from_var)
        .map(|tag| tag.trim().parse::<EnvironmentTag>())
        .transpose()
        .context("invalid environment tag")
}

async fn load(args: &ConfigArgs) -> Result<Arc<Configuration>> {
    let mut loader = ConfigLoader::new(&args.config);
    if let Some(env) = resolve_environment(args.env.as_deref())? {
        loader = loader.environment(env);
    }
    if let Some(key_store) = &args.key_store {
        loader = loader.key_store(key_store);
    }
    let config = loader
        .load()
        .await
        .with_context(|| format!("failed to load configuration {}", args.config.display()))?;
    Ok(config)
}

async fn read_content(args: &ContentArgs) -> Result<String> {
    if let Some(content) = &args.content {
        return Ok(content.clone());
    }
    if let Some(path) = &args.file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read content file: {}", path.display()));
    }
    let mut content = String::new();
    tokio::io::stdin()
        .read_to_string(&mut content)
        .await
        .context("Failed to read content from stdin")?;
    Ok(content)
}

fn print_summary(config: &Configuration) {
    println!("config:      {}", config.source().display());
    println!("environment: {}", config.environment());
    println!("ai enabled:  {}", config.ai.enabled);
    println!("engine:      {}", config.ai.active_engine());
    for (name, engine) in &config.ai.engines {
        let kind = engine
            .provider
            .as_deref()
            .unwrap_or(name)
            .parse::<EngineKind>()
            .map(|k| k.to_string())
            .unwrap_or_else(|_| "unsupported".to_string());
        println!(
            "  - {:<12} {:<10} model={}",
            name,
            kind,
            engine.model.as_deref().unwrap_or("(default)")
        );
    }
    println!(
        "publishing:  {}",
        if config.wordpress.enabled { "enabled" } else { "disabled" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_run_command() {
        let args = Args::try_parse_from([
            "newspress",
            "run",
            "summarize",
            "--config",
            "config/config.remote-230.json",
            "--env",
            "remote-aliyun",
            "--content",
            "Body",
        ])
        .unwrap();
        match args.command {
            Command::Run { task, config, content } => {
                assert_eq!(task, "summarize");
                assert_eq!(config.env.as_deref(), Some("remote-aliyun"));
                assert_eq!(content.content.as_deref(), Some("Body"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn content_and_file_conflict() {
        let res = Args::try_parse_from([
            "newspress", "prompt", "summarize", "--content", "x", "--file", "a.txt",
        ]);
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn content_comes_from_flag_or_file() {
        let inline = ContentArgs {
            content: Some("Inline body".into()),
            file: None,
        };
        assert_eq!(read_content(&inline).await.unwrap(), "Inline body");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("article.txt");
        std::fs::write(&path, "File body").unwrap();
        let from_file = ContentArgs {
            content: None,
            file: Some(path),
        };
        assert_eq!(read_content(&from_file).await.unwrap(), "File body");
    }

    #[test]
    fn explicit_environment_is_validated() {
        assert_eq!(
            resolve_environment(Some("remote-230")).unwrap().unwrap().as_str(),
            "remote-230"
        );
        assert!(resolve_environment(Some("nowhere")).is_err());
    }
}
