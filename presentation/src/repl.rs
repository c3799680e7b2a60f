//! Interactive discussion REPL.
//!
//! Reads user messages, runs one round per message, and renders the
//! event stream live through [`ConsolePresenter`]. Ctrl+C during a
//! round cancels it at the next participant boundary; the partial round
//! is discarded, not persisted.

use crate::ConsolePresenter;
use colored::Colorize;
use roundtable_application::{
    ModelBackend, ModelRegistry, RoundEventTx, RunRoundError, RunRoundInput, RunRoundUseCase,
    SessionStore, TranscriptExporter,
};
use roundtable_domain::Session;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Interactive multi-model discussion REPL
pub struct DiscussionRepl {
    use_case: RunRoundUseCase,
    registry: Arc<ModelRegistry>,
    store: Arc<dyn SessionStore>,
    transcript: Arc<dyn TranscriptExporter>,
    session: Session,
}

impl DiscussionRepl {
    pub fn new(
        registry: Arc<ModelRegistry>,
        store: Arc<dyn SessionStore>,
        transcript: Arc<dyn TranscriptExporter>,
        session: Session,
        recent_rounds_cap: usize,
    ) -> Self {
        Self {
            use_case: RunRoundUseCase::new(Arc::clone(&registry), recent_rounds_cap),
            registry,
            store,
            transcript,
            session,
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("roundtable").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    self.process_round(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            Roundtable - 多模型讨论           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Session: {} ({})", self.session.title, self.session.id);
        println!(
            "Models: {}",
            self.registry
                .default_order()
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
        println!("Commands:");
        println!("  /help     - Show this help");
        println!("  /models   - Show configured models");
        println!("  /record   - Show the current discussion record");
        println!("  /export   - Print the Markdown transcript");
        println!("  /quit     - Exit");
        println!();
        println!("Control commands: @all @深入 @挑战 @总结 @跳过 <model> @<model> <msg>");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&self, cmd: &str) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?   - Show this help");
                println!("  /models         - Show configured models");
                println!("  /record         - Show the current discussion record");
                println!("  /export         - Print the Markdown transcript");
                println!("  /quit, /exit, /q - Exit");
                println!();
                false
            }
            "/models" => {
                println!();
                println!("Speaking order:");
                for id in self.registry.default_order() {
                    match self.registry.get(id) {
                        Some(backend) => println!("  - {} ({})", id, backend.display_name()),
                        None => println!("  - {} (not configured)", id),
                    }
                }
                println!();
                false
            }
            "/record" => {
                match serde_json::to_string_pretty(&self.session.record) {
                    Ok(json) => println!("\n{json}\n"),
                    Err(e) => eprintln!("Error: {e}"),
                }
                false
            }
            "/export" => {
                match self.transcript.read(&self.session.id).await {
                    Ok(content) if content.is_empty() => println!("(no transcript yet)"),
                    Ok(content) => println!("\n{content}"),
                    Err(e) => eprintln!("Error: {e}"),
                }
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    /// Run one round for a user message and persist the outcome.
    async fn process_round(&mut self, message: &str) {
        let (tx, rx) = RoundEventTx::channel(64);
        let presenter = tokio::spawn(ConsolePresenter::run(rx));
        let cancel = CancellationToken::new();

        let input = RunRoundInput {
            message: message.to_string(),
            record: self.session.record.clone(),
            current_round: self.session.current_round,
        };

        // Ctrl+C cancels the round; the future still has to run to
        // completion so the cancellation path emits its error event.
        let result = {
            let exec = self.use_case.execute(input, &tx, &cancel);
            tokio::pin!(exec);
            loop {
                tokio::select! {
                    result = &mut exec => break result,
                    _ = tokio::signal::ctrl_c() => {
                        println!();
                        println!("{}", "Cancelling after the current participant...".yellow());
                        cancel.cancel();
                    }
                }
            }
        };

        drop(tx);
        let _ = presenter.await;
        println!();

        match result {
            Ok(outcome) => {
                self.session.record = outcome.record.clone();
                self.session.current_round = outcome.round_number;
                if let Err(e) = self.store.update(&self.session).await {
                    warn!(error = %e, "failed to persist session");
                    eprintln!("{}", format!("Failed to save session: {e}").red());
                }
                if let Err(e) = self
                    .transcript
                    .append_round(
                        &self.session.id,
                        outcome.round_number,
                        &outcome.messages,
                        &outcome.record,
                    )
                    .await
                {
                    warn!(error = %e, "failed to append transcript");
                }
            }
            Err(RunRoundError::Cancelled) => {
                println!("{}", "Round cancelled; nothing was saved.".yellow());
            }
        }
    }
}
