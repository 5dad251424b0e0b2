//! "Code" screen: input/output paths, run action, and a scrolling log.
//!
//! The pipeline runs as a task on the shared tokio runtime. It reports back
//! through an unbounded channel that the event loop drains every tick.

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info};
use transcoder_classifier::AzureOpenAiClient;
use transcoder_core::pipeline::{
    CodeTranscriptConfig, CodeTranscriptResult, CodingOptions, ProgressReporter, code_transcript,
    default_output_path,
};
use transcoder_shared::{AppConfig, resolve_service_config};

use crate::widgets::input_field;

/// Lines kept in the log pane.
const LOG_CAPACITY: usize = 500;

/// Which row is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Input,
    Output,
    Action,
}

/// Messages from the background run to the screen.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    Log(String),
    Finished(Result<CodeTranscriptResult, String>),
}

/// Progress reporter that forwards pipeline events over a channel.
struct ChannelProgress {
    tx: UnboundedSender<WorkerEvent>,
}

impl ChannelProgress {
    fn send(&self, line: String) {
        // The receiver is gone only when the screen is shutting down.
        let _ = self.tx.send(WorkerEvent::Log(line));
    }
}

impl ProgressReporter for ChannelProgress {
    fn phase(&self, name: &str) {
        self.send(format!("{name}..."));
    }

    fn chunk_started(&self, current: usize, total: usize, chars: usize) {
        self.send(format!("Coding chunk {current}/{total} with {chars} characters..."));
    }

    fn chunk_coded(&self, _current: usize, _total: usize, matches: usize) {
        self.send(format!("Received {matches} matches."));
    }

    fn done(&self, result: &CodeTranscriptResult) {
        self.send(format!("Applied {} highlight(s).", result.summary.applied));
    }
}

/// An in-flight pipeline run.
struct Running {
    /// Aborted on shutdown.
    task: JoinHandle<()>,
    events: UnboundedReceiver<WorkerEvent>,
}

pub(crate) struct CodeScreen {
    input: String,
    output: String,
    focused: Field,
    editing: bool,
    status: String,
    log: Vec<String>,
    running: Option<Running>,
    config: AppConfig,
    runtime: Handle,
}

impl CodeScreen {
    pub(crate) fn new(runtime: Handle, config: AppConfig) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            focused: Field::Input,
            editing: false,
            status: "Choose a transcript (.docx) and press Ctrl-R to code it.".to_string(),
            log: Vec::new(),
            running: None,
            config,
            runtime,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Input
                Constraint::Length(3), // Output
                Constraint::Length(3), // Action
                Constraint::Length(1), // Hint
                Constraint::Min(1),    // Log
            ])
            .split(area);

        f.render_widget(
            input_field(
                "Transcript (.docx)",
                &self.input,
                self.focused == Field::Input,
                self.editing,
            ),
            chunks[0],
        );
        f.render_widget(
            input_field(
                "Save coded copy as",
                &self.output,
                self.focused == Field::Output,
                self.editing,
            ),
            chunks[1],
        );

        // Action row
        let (label, label_style) = if self.is_running() {
            ("Processing...", Style::default().fg(Color::DarkGray))
        } else if self.focused == Field::Action {
            (
                "▸ Process",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("  Process", Style::default())
        };
        let action_border = if self.focused == Field::Action {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let action = Paragraph::new(label).style(label_style).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(action_border),
        );
        f.render_widget(action, chunks[2]);

        let hint = if self.editing {
            "Type to edit · Esc to stop editing · Tab to next field"
        } else {
            "Enter to edit · Tab to next field · Ctrl-R to process"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[3]);

        // Log pane, tail-anchored
        let visible = chunks[4].height.saturating_sub(2) as usize;
        let start = self.log.len().saturating_sub(visible);
        let items: Vec<ListItem> = self.log[start..]
            .iter()
            .map(|line| ListItem::new(line.as_str()))
            .collect();
        let log = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", self.status)),
        );
        f.render_widget(log, chunks[4]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('r') && modifiers.contains(KeyModifiers::CONTROL) {
            self.editing = false;
            self.start();
            return;
        }

        if self.editing {
            match code {
                KeyCode::Esc | KeyCode::Enter => self.stop_editing(),
                KeyCode::Tab => {
                    self.stop_editing();
                    self.next_field();
                }
                KeyCode::Backspace => {
                    if let Some(field) = self.current_field_mut() {
                        field.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(field) = self.current_field_mut() {
                        field.push(c);
                    }
                }
                _ => {}
            }
        } else {
            match code {
                KeyCode::Enter => {
                    if self.focused == Field::Action {
                        self.start();
                    } else {
                        self.editing = true;
                    }
                }
                KeyCode::Tab | KeyCode::Down => self.next_field(),
                KeyCode::BackTab | KeyCode::Up => self.prev_field(),
                _ => {}
            }
        }
    }

    fn current_field_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            Field::Input => Some(&mut self.input),
            Field::Output => Some(&mut self.output),
            Field::Action => None,
        }
    }

    /// Leaving the input field suggests a destination if none was given.
    fn stop_editing(&mut self) {
        self.editing = false;
        if self.focused == Field::Input && self.output.trim().is_empty() {
            let input = self.input.trim();
            if !input.is_empty() {
                self.output = default_output_path(Path::new(input), &self.config.defaults.output_suffix)
                    .display()
                    .to_string();
            }
        }
    }

    fn next_field(&mut self) {
        self.focused = match self.focused {
            Field::Input => Field::Output,
            Field::Output => Field::Action,
            Field::Action => Field::Input,
        };
    }

    fn prev_field(&mut self) {
        self.focused = match self.focused {
            Field::Input => Field::Action,
            Field::Output => Field::Input,
            Field::Action => Field::Output,
        };
    }

    fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    /// Check paths and service settings, then spawn the run.
    fn start(&mut self) {
        if self.is_running() {
            self.status = "A transcript is already being coded.".to_string();
            return;
        }

        let input = self.input.trim();
        let output = self.output.trim();
        if input.is_empty() {
            self.status = "Please choose a transcript to code.".to_string();
            return;
        }
        if output.is_empty() {
            self.status = "Please choose where to save the coded transcript.".to_string();
            return;
        }
        let input = PathBuf::from(input);
        let output = PathBuf::from(output);
        if !input.is_file() {
            self.status = format!("Transcript not found: {}", input.display());
            return;
        }

        let client = match resolve_service_config(&self.config)
            .and_then(|service| AzureOpenAiClient::new(&service))
        {
            Ok(client) => client,
            Err(e) => {
                self.status = "Azure OpenAI is not configured.".to_string();
                self.push_log(format!("Error: {e}"));
                return;
            }
        };

        let config = CodeTranscriptConfig {
            input,
            output,
            options: CodingOptions {
                max_chunk_chars: self.config.defaults.max_chunk_chars,
            },
        };

        self.log.clear();
        self.push_log(format!("Reading {}", config.input.display()));
        self.status = "Processing...".to_string();
        info!(input = %config.input.display(), output = %config.output.display(), "starting run");

        let (tx, events) = mpsc::unbounded_channel();
        let task = self.runtime.spawn(async move {
            let progress = ChannelProgress { tx: tx.clone() };
            let result = code_transcript(&config, &client, &progress)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(WorkerEvent::Finished(result));
        });

        self.running = Some(Running { task, events });
    }

    /// Drain worker events without blocking.
    pub(crate) fn poll_worker(&mut self) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let mut drained = Vec::new();
        let mut disconnected = false;
        loop {
            match running.events.try_recv() {
                Ok(event) => drained.push(event),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        for event in drained {
            match event {
                WorkerEvent::Log(line) => self.push_log(line),
                WorkerEvent::Finished(Ok(result)) => {
                    self.running = None;
                    self.push_log(format!(
                        "Saved coded transcript to {}",
                        result.output.display()
                    ));
                    self.status = format!(
                        "Done: {} highlight(s) in {:.1}s",
                        result.summary.applied,
                        result.elapsed.as_secs_f64()
                    );
                }
                WorkerEvent::Finished(Err(message)) => {
                    self.running = None;
                    error!(error = %message, "run failed");
                    self.push_log(format!("Error: {message}"));
                    self.status = "Coding failed; see log.".to_string();
                }
            }
        }

        if disconnected && self.running.is_some() {
            self.running = None;
            self.push_log("Error: background run stopped unexpectedly");
            self.status = "Coding failed; see log.".to_string();
        }
    }

    /// Abort the in-flight run, if any.
    pub(crate) fn cancel(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}
