use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use scrape_core::{update, AppState, AppViewModel, FlowState, Msg, ScreenView};
use scrape_engine::EngineHandle;
use scrape_logging::{scrape_info, scrape_warn};

use super::cli::{Cli, Command};
use super::effects::EffectRunner;
use super::logging;
use super::settings::{self, AppSettings};
use super::ui::constants::{
    CANCEL_KEYWORD, CODE_PROMPT, EMAIL_PROMPT, PASSWORD_PROMPT, RETRY_PROMPT,
};
use super::ui::{self, Terminal};

/// Poll interval while a request or timer is outstanding.
const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = settings::load(&cli.config);
    let mut app_settings = match &loaded {
        Ok(Some(found)) => found.clone(),
        Ok(None) | Err(_) => AppSettings::default(),
    };
    if let Some(url) = &cli.api_url {
        app_settings.api_base_url = url.clone();
    }
    if let Some(destination) = cli.log {
        app_settings.log_destination = destination;
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(app_settings.log_destination, level);
    match &loaded {
        Ok(Some(_)) => scrape_info!("Loaded settings from {:?}", cli.config),
        Ok(None) => scrape_info!("No settings at {:?}; using defaults", cli.config),
        Err(err) => scrape_warn!("{}; using defaults", err),
    }
    scrape_info!("Backend base URL {}", app_settings.api_base_url);

    let engine = EngineHandle::new(app_settings.api_settings())
        .context("failed to start the request engine")?;
    let stdin = io::stdin();
    let mut session = Session::new(
        EffectRunner::new(engine),
        Terminal::new(stdin.lock(), io::stdout()),
    );

    let outcome = match cli.command.unwrap_or(Command::Scrape) {
        Command::Scrape => session.run_scrape(cli.credentials.email, cli.credentials.password),
        Command::Feed { username } => session.run_feed(username),
    };
    outcome.context("terminal I/O failed")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AskCredentials,
    AskCode,
    AskRetry,
    Wait,
    Done,
}

fn next_step(view: &AppViewModel) -> Step {
    match &view.screen {
        ScreenView::Feed(feed) if feed.loading => Step::Wait,
        ScreenView::Feed(_) => Step::Done,
        ScreenView::Credentials(form) => match &form.flow {
            FlowState::Idle => Step::AskCredentials,
            FlowState::Submitting | FlowState::VerifyingCode => Step::Wait,
            FlowState::AwaitingVerification => Step::AskCode,
            FlowState::Succeeded { .. } if form.navigating => Step::Wait,
            FlowState::Succeeded { .. } => Step::Done,
            FlowState::Failed(_) => Step::AskRetry,
        },
    }
}

/// Drives one interactive session: prompts feed messages into `update`,
/// effects go to the engine, and engine events come back as messages.
pub(crate) struct Session<R, W> {
    state: AppState,
    runner: EffectRunner,
    terminal: Terminal<R, W>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub(crate) fn new(runner: EffectRunner, terminal: Terminal<R, W>) -> Self {
        Self {
            state: AppState::new(),
            runner,
            terminal,
        }
    }

    /// Preset credentials are used for the first attempt only.
    pub(crate) fn run_scrape(
        &mut self,
        mut email: Option<String>,
        mut password: Option<String>,
    ) -> io::Result<()> {
        loop {
            match next_step(&self.state.view()) {
                Step::AskCredentials => {
                    if !self.submit_credentials(email.take(), password.take())? {
                        return Ok(());
                    }
                }
                Step::AskCode => match self.terminal.ask(CODE_PROMPT)? {
                    None => {
                        self.dispatch(Msg::VerificationCancelled)?;
                        return Ok(());
                    }
                    Some(answer) if answer.trim().eq_ignore_ascii_case(CANCEL_KEYWORD) => {
                        self.dispatch(Msg::VerificationCancelled)?;
                    }
                    Some(code) => {
                        self.dispatch(Msg::CodeChanged(code))?;
                        self.dispatch(Msg::CodeSubmitted)?;
                    }
                },
                Step::AskRetry => {
                    let retry = self
                        .terminal
                        .ask(RETRY_PROMPT)?
                        .is_some_and(|answer| wants_retry(&answer));
                    if !retry || !self.submit_credentials(None, None)? {
                        return Ok(());
                    }
                }
                Step::Wait => self.pump()?,
                Step::Done => return Ok(()),
            }
        }
    }

    pub(crate) fn run_feed(&mut self, username: String) -> io::Result<()> {
        self.dispatch(Msg::FeedRequested { username })?;
        loop {
            match next_step(&self.state.view()) {
                Step::Wait => self.pump()?,
                _ => return Ok(()),
            }
        }
    }

    /// Returns `false` when input ended before both fields were read.
    fn submit_credentials(
        &mut self,
        email: Option<String>,
        password: Option<String>,
    ) -> io::Result<bool> {
        let Some(email) = self.field(email, EMAIL_PROMPT)? else {
            return Ok(false);
        };
        let Some(password) = self.field(password, PASSWORD_PROMPT)? else {
            return Ok(false);
        };
        self.dispatch(Msg::EmailChanged(email))?;
        self.dispatch(Msg::PasswordChanged(password))?;
        self.dispatch(Msg::ScrapeSubmitted)?;
        Ok(true)
    }

    fn field(&mut self, preset: Option<String>, label: &str) -> io::Result<Option<String>> {
        match preset {
            Some(value) => Ok(Some(value)),
            None => self.terminal.ask(label),
        }
    }

    fn pump(&mut self) -> io::Result<()> {
        let msg = self.runner.next_msg(TICK).unwrap_or(Msg::Tick);
        self.dispatch(msg)
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let (mut state, effects) = update(std::mem::take(&mut self.state), msg);
        let dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        if dirty {
            self.terminal.show(ui::render::render(&self.state.view()))?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.terminal.into_output()
    }
}

fn wants_retry(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
