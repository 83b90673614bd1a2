//! Line-driven search modal (`gsearch interactive`).
//!
//! Each stdin line is either new input text or a `:`-prefixed command that
//! stands in for a key or control of the modal:
//!
//! | Line | Effect |
//! |------|--------|
//! | `text` | replace the input (debounced search) |
//! | `:down` / `:up` | move the selection |
//! | `:enter` / `:new` | open the selection (same tab / new tab) |
//! | `:esc` | close and reset the modal |
//! | `:scope <s>` | switch scope, re-running the search |
//! | `:recent <n>` | re-run the n-th recent search |
//! | `:toggle` | open or close the modal |
//! | `:clear` | forget history and recent items |
//! | `:quit` | exit |
//!
//! Searches run on spawned tasks and report back over a channel, so input
//! keeps flowing while a request is in flight; stale outcomes are dropped
//! by the controller.

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use global_search_core::clock::{Clock, SystemClock};
use global_search_core::controller::{OpenTarget, SearchController, SearchOutcome, SearchTicket};
use global_search_core::models::Scope;
use global_search_core::navigator::NavKey;
use global_search_core::pipeline::SearchPipeline;

use crate::config::Config;
use crate::session;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(String),
    Key(NavKey),
    Scope(Scope),
    Recent(usize),
    Toggle,
    Clear,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Input(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();

    Ok(match (name, arg) {
        ("down", None) => Command::Key(NavKey::ArrowDown),
        ("up", None) => Command::Key(NavKey::ArrowUp),
        ("enter", None) => Command::Key(NavKey::Enter { new_tab: false }),
        ("new", None) => Command::Key(NavKey::Enter { new_tab: true }),
        ("esc", None) => Command::Key(NavKey::Escape),
        ("scope", Some(scope)) => Command::Scope(scope.parse()?),
        ("recent", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Recent(n),
            _ => bail!("Usage: :recent <n> (n starts at 1)"),
        },
        ("toggle", None) => Command::Toggle,
        ("clear", None) => Command::Clear,
        ("quit", None) | ("q", None) => Command::Quit,
        _ => bail!("Unknown command: ':{}'", rest),
    })
}

/// The modal plus what to print after each step.
pub struct Interactive {
    controller: SearchController,
    config: Config,
}

/// What a command produced: an optional search to start and text to show.
#[derive(Debug, Default)]
pub struct Reaction {
    pub ticket: Option<SearchTicket>,
    pub output: String,
}

impl Interactive {
    pub fn new(controller: SearchController, config: Config) -> Self {
        Self { controller, config }
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn handle(&mut self, command: Command) -> Reaction {
        let mut reaction = Reaction::default();
        match command {
            Command::Input(text) => {
                if !self.controller.is_open() {
                    self.controller.open();
                }
                self.controller.handle_input(&text);
                if text.trim().is_empty() {
                    reaction.output = self.screen();
                }
            }
            Command::Key(key) => {
                if let Some(activation) = self.controller.handle_key(key) {
                    let target = match activation.target {
                        OpenTarget::SameTab => "",
                        OpenTarget::NewTab => " (new tab)",
                    };
                    reaction.output = format!(
                        "Opening {} • {}: {}{}\n",
                        activation.kind,
                        activation.title,
                        session::absolute_url(&self.config, &activation.url),
                        target
                    );
                } else {
                    reaction.output = self.screen();
                }
            }
            Command::Scope(scope) => {
                reaction.ticket = self.controller.set_scope(scope);
                reaction.output = format!("Scope: {}\n", scope.display_name());
            }
            Command::Recent(n) => {
                match self.controller.history().get(n - 1).map(|e| e.query.clone()) {
                    Some(query) => {
                        if !self.controller.is_open() {
                            self.controller.open();
                        }
                        reaction.ticket = self.controller.execute_recent_search(&query);
                    }
                    None => reaction.output = format!("No recent search #{}\n", n),
                }
            }
            Command::Toggle => {
                self.controller.toggle();
                reaction.output = self.screen();
            }
            Command::Clear => {
                self.controller.clear_history();
                reaction.output = self.screen();
            }
            Command::Quit => {}
        }
        reaction
    }

    /// Start the debounced search if it is due.
    pub fn poll(&mut self) -> Option<SearchTicket> {
        self.controller.poll_debounce()
    }

    /// Install a finished search; returns the screen when it was current.
    pub fn complete(&mut self, outcome: SearchOutcome) -> Option<String> {
        self.controller.apply(outcome).then(|| self.screen())
    }

    /// Time left until the pending debounce fires.
    pub fn until_deadline(&self) -> Option<Duration> {
        self.controller.next_deadline().map(|due| {
            let left = (due - SystemClock.now_millis()).max(0);
            Duration::from_millis(left as u64)
        })
    }

    pub fn screen(&self) -> String {
        if !self.controller.is_open() {
            return "(search closed, :toggle to open)\n".to_string();
        }
        format!(
            "── {} ── {}\n{}",
            self.controller.scope().display_name(),
            self.controller.placeholder(),
            self.controller.render()
        )
    }
}

fn spawn_search(
    pipeline: &Arc<SearchPipeline>,
    tx: &mpsc::UnboundedSender<SearchOutcome>,
    ticket: SearchTicket,
) {
    let pipeline = Arc::clone(pipeline);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = pipeline.execute(ticket).await;
        // The receiver is gone only once the loop exited.
        let _ = tx.send(outcome);
    });
}

async fn sleep_until(deadline: Option<Duration>) {
    match deadline {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

pub async fn run_interactive(config: &Config) -> Result<()> {
    let mut controller = session::controller(config)?;
    controller.open();
    let pipeline = controller.pipeline();
    let mut modal = Interactive::new(controller, config.clone());

    let (tx, mut rx) = mpsc::unbounded_channel::<SearchOutcome>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", modal.screen());

    loop {
        let deadline = modal.until_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(line.trim_end()) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        let reaction = modal.handle(command);
                        print!("{}", reaction.output);
                        if let Some(ticket) = reaction.ticket {
                            print!("{}", modal.screen());
                            spawn_search(&pipeline, &tx, ticket);
                        }
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }
            _ = sleep_until(deadline) => {
                if let Some(ticket) = modal.poll() {
                    print!("{}", modal.screen());
                    spawn_search(&pipeline, &tx, ticket);
                }
            }
            Some(outcome) = rx.recv() => {
                if let Some(screen) = modal.complete(outcome) {
                    print!("{}", screen);
                }
            }
        }
    }

    Ok(())
}
