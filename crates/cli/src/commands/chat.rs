//! `tensive chat`: interactive or single-message conversation.

use std::io::Write;
use std::sync::Arc;
use tensive_agent::footer::{self, SAFETY};
use tensive_agent::{ChatSession, ChoiceOption, NormalizedResponse, Orchestrator, Utterance};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    image: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    TENSIVE_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY  = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", tensive_config::AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = tensive_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let knowledge = Arc::new(super::load_knowledge(&config)?);
    let topic_count = knowledge.len();
    let orchestrator = Arc::new(Orchestrator::from_config(&config, provider, knowledge));
    let session = ChatSession::new(orchestrator);
    tracing::debug!(session = %session.id(), "Chat session started");

    if message.is_some() || image.is_some() {
        let utterance = Utterance::new(message, image)?;
        eprint!("  Thinking...");
        let response = session.process_message(utterance).await;
        eprint!("\r              \r");
        println!("{}", render(&response));
        return Ok(());
    }

    println!();
    println!("  Tensive Repair Assistant");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.effective_model());
    println!("  Topics:    {topic_count} knowledge base entries");
    println!();
    println!("  Type your question and press Enter.");
    println!("  /estimate  guided material estimate");
    println!("  /clear     start over");
    println!("  exit       quit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Vec<ChoiceOption> = Vec::new();
    let mut guided = false;

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt()?;
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        // A bare number picks one of the options offered last turn.
        let input = match line.parse::<usize>() {
            Ok(n) if n >= 1 && n <= pending.len() => {
                let choice = &pending[n - 1];
                choice.value.clone().unwrap_or_else(|| choice.label.clone())
            }
            _ => line.to_string(),
        };

        let response = match input.as_str() {
            "/clear" => {
                session.clear_history().await;
                guided = false;
                pending.clear();
                println!("  Conversation cleared.\n");
                prompt()?;
                continue;
            }
            "/estimate" => {
                guided = true;
                session.advance_calculator("").await
            }
            _ if guided => session.advance_calculator(&input).await,
            _ => {
                eprint!("  ...");
                let response = session.process_message(Utterance::text(input.clone())?).await;
                eprint!("\r     \r");
                response
            }
        };

        guided = matches!(response, NormalizedResponse::Question { .. });
        pending = match &response {
            NormalizedResponse::Text { options, .. }
            | NormalizedResponse::Question { options, .. } => options.clone(),
            NormalizedResponse::CalculationResult { .. } => Vec::new(),
        };

        println!();
        for line in render(&response).lines() {
            println!("  Assistant > {line}");
        }
        println!();
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

/// Plain-text rendering of one response for the terminal.
pub fn render(response: &NormalizedResponse) -> String {
    let mut out = String::new();
    match response {
        NormalizedResponse::Text {
            text,
            options,
            assets,
        } => {
            let tagged = footer::parse(text);
            out.push_str(&tagged.body);
            push_options(&mut out, options);
            if let Some(assets) = assets {
                for (kind, link) in [
                    ("PDF", &assets.pdf),
                    ("Video", &assets.video),
                    ("Image", &assets.image),
                ] {
                    if let Some(link) = link {
                        out.push_str(&format!("\n{kind}: {link}"));
                    }
                }
            }
            for note in tagged.payloads(SAFETY) {
                out.push_str(&format!("\n\nSafety: {note}"));
            }
        }
        NormalizedResponse::CalculationResult { text, data } => {
            out.push_str(text);
            out.push_str(&format!("\nTotal area: {} sq ft", data.total_area));
            for line in &data.materials {
                out.push_str(&format!("\n  {:<28} {:>4} {}", line.name, line.quantity, line.unit));
            }
        }
        NormalizedResponse::Question { text, options, .. } => {
            out.push_str(text);
            push_options(&mut out, options);
        }
    }
    out
}

fn push_options(out: &mut String, options: &[ChoiceOption]) {
    if options.is_empty() {
        return;
    }
    out.push('\n');
    for (i, option) in options.iter().enumerate() {
        out.push_str(&format!("\n  [{}] {}", i + 1, option.label));
    }
}
