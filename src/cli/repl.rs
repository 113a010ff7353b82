// Interactive REPL - type queries, see how they would be routed

use anyhow::Result;
use crossterm::style::Stylize;

use super::display::{render_decision, render_stats};
use super::input::InputHandler;
use crate::errors::EscalationError;
use crate::router::{EscalationEngine, QueryContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Stats,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/help" => Some(Command::Help),
            "/quit" | "/exit" => Some(Command::Quit),
            "/stats" => Some(Command::Stats),
            _ => None,
        }
    }
}

const HELP: &str = "\nCommands:\n  \
    /stats - Show cost savings statistics\n  \
    /quit  - Exit interactive mode\n  \
    /help  - Show this help\n\n\
    Just type any question to test routing.\n";

pub struct Repl {
    engine: EscalationEngine,
    input: InputHandler,
    show_response: bool,
}

impl Repl {
    pub fn new(engine: EscalationEngine, input: InputHandler, show_response: bool) -> Self {
        Self {
            engine,
            input,
            show_response,
        }
    }

    /// Read queries until EOF, Ctrl-C or /quit
    pub async fn run(mut self) -> Result<()> {
        println!("{}", "Smart Escalation Testing - Interactive Mode".bold());
        println!("Type queries to test routing. Commands: /stats /quit /help\n");

        let context = QueryContext::default();
        loop {
            let line = match self.input.read_line("> ")? {
                Some(line) => line,
                None => break,
            };
            if line.is_empty() {
                continue;
            }

            match Command::parse(&line) {
                Some(Command::Quit) => break,
                Some(Command::Stats) => {
                    println!("{}", render_stats(self.engine.stats()));
                    continue;
                }
                Some(Command::Help) => {
                    println!("{}", HELP);
                    continue;
                }
                None => {}
            }

            match self.engine.route_query(&line, &context).await {
                Ok(decision) => println!("{}", render_decision(&line, &decision, self.show_response)),
                Err(EscalationError::InvalidQuery(msg)) => {
                    println!("{} {}", "Invalid query:".red(), msg)
                }
                Err(e) => println!("{} {}", "Error:".red(), e),
            }
        }

        if let Err(e) = self.input.save_history() {
            tracing::warn!("Could not save history: {}", e);
        }
        Ok(())
    }
}
