//! CLI commands for neuralterm using clap.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::config::{load_settings, Settings, API_URL_ENV};
use crate::providers::audit::{AuditEvent, FactCheckStats, Verdict, DEFAULT_SOURCE_FILTER};
use crate::providers::{create_backend, create_chat_backend, HttpBackend};
use crate::shell::{run_shell, Renderer};
use crate::terminal::{Navigator, NoopNavigator, Submission, Terminal};

/// neuralterm - the terminal behind peterguan.dev.
#[derive(Parser)]
#[command(name = "neuralterm")]
#[command(version = "0.1.0")]
#[command(about = "neuralterm - Peter Guan's portfolio terminal", long_about = None)]
pub struct Commands {
    /// Backend base URL (overrides settings.json)
    #[arg(long, global = true, env = API_URL_ENV)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open the interactive terminal
    Shell,

    /// Run a single command or question and print the transcript
    Send {
        /// Input line, exactly as typed in the terminal
        #[arg(required = true)]
        message: Vec<String>,

        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },

    /// Audit the citations in a text
    Audit {
        /// Text to audit (reads --file when omitted)
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Fact-check a claim, or every line of stdin when none is given
    Factcheck {
        /// The claim
        text: Vec<String>,

        /// Source filter passed to the backend
        #[arg(long, default_value = DEFAULT_SOURCE_FILTER)]
        source: String,
    },

    /// Wake the backend up
    Wake,

    /// Show resolved settings
    Config,
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        let settings = self.settings()?;
        match &self.command {
            Command::Shell => cmd_shell(&settings).await,
            Command::Send { message, json } => cmd_send(&settings, &message.join(" "), *json).await,
            Command::Audit { text, file } => cmd_audit(&settings, text.as_deref(), file.as_deref()).await,
            Command::Factcheck { text, source } => cmd_factcheck(&settings, &text.join(" "), source).await,
            Command::Wake => cmd_wake(&settings).await,
            Command::Config => cmd_config(&settings),
        }
    }

    fn settings(&self) -> Result<Settings> {
        let settings = load_settings()?;
        match &self.api_url {
            Some(url) => Ok(settings.with_api_url(url)?),
            None => Ok(settings),
        }
    }
}

// Command implementations

/// Navigator for the shell: there are no pages to switch to, so show where
/// the site would go.
fn site_navigator(site_url: &str) -> Arc<dyn Navigator> {
    let site_url = site_url.to_string();
    Arc::new(move |path: &str| println!("-> {}{}", site_url, path))
}

async fn cmd_shell(settings: &Settings) -> Result<()> {
    let backend = create_chat_backend(settings)?;
    tracing::info!("Opening shell against {}", settings.api_url);

    let terminal = Terminal::with_timings(
        true,
        backend,
        site_navigator(&settings.site_url),
        settings.terminal_timings(),
    );
    run_shell(terminal).await
}

async fn cmd_send(settings: &Settings, message: &str, json: bool) -> Result<()> {
    let backend = create_chat_backend(settings)?;
    // One-shot: no boot, no page to move to.
    let terminal = Terminal::with_timings(
        false,
        backend,
        Arc::new(NoopNavigator),
        settings.terminal_timings(),
    );

    let submission = terminal.submit(message).await;
    let history = terminal.history();

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        let mut renderer = Renderer::transcript();
        print!("{}", renderer.render(&history));
        print!("{}", renderer.finish());
    }

    if submission == Submission::Failed {
        bail!("Backend at {} did not answer", settings.api_url);
    }
    Ok(())
}

async fn cmd_audit(settings: &Settings, text: Option<&str>, file: Option<&std::path::Path>) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?,
        (None, None) => bail!("Pass the text to audit or --file"),
    };
    if text.trim().is_empty() {
        bail!("Nothing to audit");
    }

    let backend = create_backend(settings)?;
    println!("Initializing Neural Audit Engine...");

    let report = backend
        .audit(&text, |event| match event {
            AuditEvent::Info(info) => println!("  .. {}", info),
            AuditEvent::Error(error) => println!("  !! {}", error),
            AuditEvent::Item(item) => {
                println!(
                    "[{:?}] \"{}\" ({:.0}% via {})",
                    item.status,
                    item.citation_text,
                    item.confidence * 100.0,
                    item.source
                );
                if !item.message.is_empty() {
                    println!("    {}", item.message);
                }
            }
        })
        .await?;

    println!();
    println!("Citations checked: {}", report.items.len());
    println!("Integrity score:   {}%", report.score());
    Ok(())
}

async fn cmd_factcheck(settings: &Settings, text: &str, source: &str) -> Result<()> {
    let backend = create_backend(settings)?;
    let mut stdout = std::io::stdout();

    let stats = if text.trim().is_empty() {
        eprintln!("Reading claims from stdin, one per line (Ctrl-D to finish)");
        check_claims(&backend, BufReader::new(tokio::io::stdin()), source, &mut stdout).await?
    } else {
        check_claims(&backend, text.as_bytes(), source, &mut stdout).await?
    };

    tracing::info!("Fact-check session finished: {:?}", stats);
    Ok(())
}

/// Fact-check every non-blank line of `claims`, printing each verdict and
/// the running tallies, then the totals.
async fn check_claims<R, W>(
    backend: &HttpBackend,
    claims: R,
    source: &str,
    out: &mut W,
) -> Result<FactCheckStats>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut stats = FactCheckStats::default();
    let mut lines = claims.lines();

    while let Some(line) = lines.next_line().await? {
        let claim = line.trim();
        if claim.is_empty() {
            continue;
        }

        match backend.fact_check(claim, source).await {
            Ok(check) => {
                stats.record(check.verdict);
                writeln!(
                    out,
                    "[{}] {:?}: {}",
                    check.checked_at.format("%H:%M:%S"),
                    check.verdict,
                    check.text
                )?;
                writeln!(out, "    {}", check.evidence)?;
                if let Some(source) = &check.source {
                    writeln!(out, "    Source: {}", source)?;
                }
            }
            Err(e) => {
                tracing::warn!("Fact-check failed for '{}': {}", claim, e);
                stats.record(Verdict::Error);
                writeln!(out, "[!] Error: {}: {}", claim, e)?;
            }
        }
        writeln!(
            out,
            "    claims {} | zaps {} | truth rate {}%",
            stats.total_claims,
            stats.total_zaps,
            stats.truth_rate()
        )?;
    }

    writeln!(
        out,
        "Claims: {}  True: {}  False: {}  Unverifiable: {}  Zaps: {}  Truth rate: {}%",
        stats.total_claims,
        stats.true_count,
        stats.false_count,
        stats.unverifiable_count,
        stats.total_zaps,
        stats.truth_rate()
    )?;
    Ok(stats)
}

async fn cmd_wake(settings: &Settings) -> Result<()> {
    let backend = create_backend(settings)?;
    match backend.wake().await {
        Ok(()) => println!("Backend at {} is awake", settings.api_url),
        Err(e) => {
            // Even a failed request starts a sleeping host.
            tracing::warn!("Wake-up request failed: {}", e);
            println!("Wake-up signal sent to {} ({})", settings.api_url, e);
        }
    }
    Ok(())
}

fn cmd_config(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Commands::command().debug_assert();
    }

    #[test]
    fn send_joins_words() {
        let args = Commands::try_parse_from(["neuralterm", "send", "cowsay", "hi", "--json"]).unwrap();
        match args.command {
            Command::Send { message, json } => {
                assert_eq!(message.join(" "), "cowsay hi");
                assert!(json);
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn factcheck_defaults_to_all_sources() {
        let args = Commands::try_parse_from(["neuralterm", "factcheck", "water", "is", "wet"]).unwrap();
        match args.command {
            Command::Factcheck { source, .. } => assert_eq!(source, "all"),
            _ => panic!("expected factcheck"),
        }

        let args = Commands::try_parse_from(["neuralterm", "factcheck"]).unwrap();
        match args.command {
            Command::Factcheck { text, .. } => assert!(text.is_empty()),
            _ => panic!("expected factcheck"),
        }
    }

    #[tokio::test]
    async fn factcheck_session_keeps_running_totals() {
        use crate::providers::http::tests::spawn_server;
        use axum::http::StatusCode;
        use axum::response::IntoResponse;
        use axum::routing::post;
        use axum::{Json, Router};

        let router = Router::new().route(
            "/api/realibuddy/audit",
            post(|Json(body): Json<serde_json::Value>| async move {
                let verdict = match body["text"].as_str().unwrap_or_default() {
                    "water is wet" => "True",
                    "the moon is cheese" => "False",
                    "aliens built it" => "Unverifiable",
                    _ => return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
                };
                Json(serde_json::json!({
                    "verdict": verdict,
                    "evidence": "checked",
                    "source": null
                }))
                .into_response()
            }),
        );
        let backend = HttpBackend::with_base_url(spawn_server(router).await);

        let claims = "water is wet\n\n  the moon is cheese\naliens built it\nwater is wet\nunknown\n";
        let mut out = Vec::new();
        let stats = check_claims(&backend, claims.as_bytes(), "all", &mut out)
            .await
            .unwrap();

        assert_eq!(stats.total_claims, 5);
        assert_eq!(stats.true_count, 2);
        assert_eq!(stats.total_zaps, 1);
        assert_eq!(stats.unverifiable_count, 1);
        assert_eq!(stats.truth_rate(), 40);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("False: the moon is cheese"));
        assert!(out.contains("claims 3 | zaps 1 | truth rate 33%"));
        assert!(out.contains("[!] Error: unknown"));
        assert!(out.ends_with("Claims: 5  True: 2  False: 1  Unverifiable: 1  Zaps: 1  Truth rate: 40%\n"));
    }
}
