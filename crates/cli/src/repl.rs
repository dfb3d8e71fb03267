//! Interactive chat loop over stdin/stdout.
//!
//! Local commands (`help`, `review`, `restart`, `upload`, `exit`) are
//! handled here; everything else is a conversation turn for the agent.

use std::io::Write as _;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use adpilot_agent::{CampaignAgent, LlmClient};
use adpilot_api::AdsApi;
use adpilot_core::CampaignState;

pub async fn run<L, A>(llm: L, api: A) -> Result<()>
where
    L: LlmClient,
    A: AdsApi,
{
    let mut agent = CampaignAgent::new(llm, api);

    println!("{}", agent.greeting());
    println!("\nType \"help\" for commands, \"exit\" to leave.\n");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim().to_string();
        if input.is_empty() {
            prompt()?;
            continue;
        }

        match input.as_str() {
            "exit" | "quit" => {
                println!("Goodbye!");
                return Ok(());
            }
            "help" => println!("\n{}\n", help_text()),
            "review" => println!("\n{}\n", render_review(agent.state())),
            "restart" => {
                agent.reset();
                println!("\nStarting over.\n\n{}\n", agent.greeting());
            }
            _ => {
                let answer = if let Some(file) = input.strip_prefix("upload ") {
                    agent.handle_music_upload(file.trim()).await
                } else {
                    agent.process_message(&input).await
                };
                println!("\nAssistant: {answer}\n");
            }
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> Result<()> {
    let mut out = std::io::stdout();
    write!(out, "You: ")?;
    out.flush()?;
    Ok(())
}

fn help_text() -> String {
    "Commands:\n\
       help             show this message\n\
       review           show the campaign collected so far\n\
       restart          discard everything and start a new campaign\n\
       upload <file>    upload a custom music file\n\
       exit / quit      leave the assistant\n\n\
     Anything else is sent to the assistant as part of the conversation."
        .to_string()
}

fn render_review(state: &CampaignState) -> String {
    let snapshot = state.snapshot();
    let mut lines = vec!["Campaign so far:".to_string()];
    for (field, value) in [
        ("Campaign name", snapshot.campaign_name.as_deref()),
        ("Objective", snapshot.objective.as_deref()),
        ("Ad text", snapshot.ad_text.as_deref()),
        ("CTA", snapshot.cta.as_deref()),
        ("Music id", snapshot.music_id.as_deref()),
    ] {
        match value {
            Some(value) => lines.push(format!("  [x] {field}: {value}")),
            None => lines.push(format!("  [ ] {field}: (not set)")),
        }
    }
    lines.push(format!("  Music plan: {}", state.music_plan.describe()));
    if !state.validation_errors.is_empty() {
        lines.push("  Outstanding issues:".to_string());
        for error in &state.validation_errors {
            lines.push(format!("    - {error}"));
        }
    }
    lines.join("\n")
}
