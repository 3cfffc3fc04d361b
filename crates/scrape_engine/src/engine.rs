use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use scrape_logging::scrape_debug;

use crate::client::{ApiSettings, ReqwestApi, ScrapeApi};
use crate::{EngineCommand, EngineError, EngineEvent};

/// Runs backend calls and timers on a background runtime. Every command
/// yields exactly one event.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineError> {
        Self::with_api(Arc::new(ReqwestApi::new(settings)))
    }

    pub fn with_api(api: Arc<dyn ScrapeApi>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn ScrapeApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Scrape {
            request_id,
            credentials,
        } => EngineEvent::ScrapeCompleted {
            request_id,
            result: api.scrape(&credentials).await,
        },
        EngineCommand::SubmitVerification {
            request_id,
            credentials,
            code,
        } => EngineEvent::VerificationCompleted {
            request_id,
            result: api.submit_verification(&credentials, &code).await,
        },
        EngineCommand::FetchPosts {
            request_id,
            username,
        } => EngineEvent::PostsLoaded {
            request_id,
            result: api.fetch_posts(&username).await,
        },
        EngineCommand::StartTimer { ticket, delay } => {
            tokio::time::sleep(delay).await;
            EngineEvent::TimerElapsed { ticket }
        }
    };
    if event_tx.send(event).is_err() {
        scrape_debug!("Engine event dropped; receiver gone");
    }
}
