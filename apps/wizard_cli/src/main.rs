use std::io::Write as _;

use anyhow::Result;
use clap::Parser;
use client_core::{BooksClient, SaveStatus, WizardSaver};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use wizard::{
    export::{export_json, summary},
    AnswerOutcome, AnswerValue, InputKind, Step, StepId, Validator, WizardSession,
};

mod input;
mod render;

use input::{parse_line, Command};
use render::{prompt, render_step, render_summary};

type StdinLines = Lines<BufReader<Stdin>>;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let saver = WizardSaver::new(BooksClient::new(&args.server_url)?);
    let mut session = WizardSession::book_wizard()?;
    session.start();
    info!(server_url = %args.server_url, "book wizard started");
    println!("Type :back to undo the last answer, :reset to start over, :quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let step = session.current_step_data().clone();
        session.set_writing(matches!(step.input, InputKind::Text | InputKind::List));
        print!("{}", render_step(&session));
        if session.is_complete() {
            print!("{}", render_summary(&summary(&session)));
        }

        let command = if step.input == InputKind::List {
            read_list(&mut lines, &mut session).await?
        } else {
            read_command(&mut lines, &mut session, &step).await?
        };
        session.set_writing(false);
        let Some(command) = command else {
            break;
        };

        match command {
            Command::Quit => break,
            Command::Back => {
                if !session.go_to_previous_step() {
                    println!("Nothing to go back to.");
                }
            }
            Command::Reset => {
                session.reset();
                saver.reset().await;
            }
            Command::Answer(value) if session.is_complete() => {
                complete_action(&saver, &session, &value).await?;
            }
            Command::Answer(value) => {
                if let AnswerOutcome::Rejected { .. } = session.answer(value) {
                    println!("{}", rejection_hint(&step));
                }
            }
        }
    }

    Ok(())
}

async fn read_line(lines: &mut StdinLines, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

/// Reads until a line parses. `None` means stdin closed. Typed text stays
/// in the session as a draft until the step accepts it.
async fn read_command(
    lines: &mut StdinLines,
    session: &mut WizardSession,
    step: &Step,
) -> Result<Option<Command>> {
    loop {
        let Some(line) = read_line(lines, prompt(step.input)).await? else {
            return Ok(None);
        };
        if step.input == InputKind::Text && !line.trim_start().starts_with(':') {
            session.set_temp_input(line.trim());
        }
        match parse_line(step, &line) {
            Ok(command) => return Ok(Some(command)),
            Err(err) => println!("{err}"),
        }
    }
}

/// One prompt per chapter, as many as the chapter count answer asked for.
async fn read_list(lines: &mut StdinLines, session: &mut WizardSession) -> Result<Option<Command>> {
    let count = session
        .answer_for(StepId::ChapterCount)
        .and_then(AnswerValue::as_number)
        .unwrap_or(1);
    let mut names = Vec::new();

    while (names.len() as i64) < count {
        let label = format!("chapter {}> ", names.len() + 1);
        let Some(line) = read_line(lines, &label).await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.starts_with(':') {
            match parse_line(session.current_step_data(), line) {
                Ok(command) => return Ok(Some(command)),
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            }
        }
        if line.is_empty() {
            println!("Every chapter needs a name.");
            continue;
        }
        names.push(line.to_string());
        session.set_temp_input(names.join(", "));
    }

    Ok(Some(Command::Answer(AnswerValue::List(names))))
}

async fn complete_action(
    saver: &WizardSaver<BooksClient>,
    session: &WizardSession,
    action: &AnswerValue,
) -> Result<()> {
    match action.as_text() {
        Some("save") => {
            println!("Saving...");
            match saver.save(session).await {
                Ok(book_id) => println!("Saved as book #{book_id}."),
                Err(err) => println!("{err}"),
            }
            if let SaveStatus::Failed(_) = saver.status().await {
                println!("Choose save again to retry.");
            }
        }
        Some("export") => println!("{}", export_json(session)?),
        _ => println!("Choose save or export."),
    }
    Ok(())
}

fn rejection_hint(step: &Step) -> String {
    match &step.validator {
        Some(Validator::MinChars { min }) => format!("Please use at least {min} characters."),
        Some(Validator::IntRange { min, max }) => {
            format!("Please pick a number from {min} to {max}.")
        }
        Some(Validator::Selection { min, max, .. }) => {
            format!("Please pick {min} to {max} different options.")
        }
        Some(Validator::NonBlankItems) => "Every entry needs a name.".to_string(),
        None => "That answer was not accepted.".to_string(),
    }
}
