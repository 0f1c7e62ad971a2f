//! Request/response channel between outer surfaces (toolbar action, shortcut,
//! popup) and the page-side engine.
//!
//! Messages keep the `{"action": ...}` wire shape so a host can forward raw
//! extension messages through [`CommandClient::send_json`].

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::PipError;
use crate::window_manager::FloatingWindowManager;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Command {
    #[serde(rename = "togglePIP")]
    TogglePip,
    #[serde(rename = "getStatus")]
    GetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Ack {
        success: bool,
    },
    Status {
        #[serde(rename = "isInPIP")]
        is_in_pip: bool,
    },
}

struct Envelope {
    command: Command,
    reply: oneshot::Sender<CommandResponse>,
}

/// Sending half, cheap to clone.
#[derive(Clone)]
pub struct CommandClient {
    tx: mpsc::Sender<Envelope>,
}

impl CommandClient {
    pub async fn send(&self, command: Command) -> Result<CommandResponse, PipError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope { command, reply })
            .await
            .map_err(|_| PipError::ChannelDelivery("no receiver on the page".to_string()))?;
        response
            .await
            .map_err(|_| PipError::ChannelDelivery("receiver dropped the request".to_string()))
    }

    /// Forward a raw message. Anything unrecognised is answered with
    /// `{"success": false}` instead of an error.
    pub async fn send_json(&self, raw: &str) -> Result<String, PipError> {
        let response = match serde_json::from_str::<Command>(raw) {
            Ok(command) => self.send(command).await?,
            Err(err) => {
                log::debug!("Ignoring unrecognised command {}: {}", raw, err);
                CommandResponse::Ack { success: false }
            }
        };
        Ok(serde_json::to_string(&response)?)
    }
}

/// Page-side receiver, bound to one window manager.
pub struct CommandChannel {
    client: CommandClient,
    task: JoinHandle<()>,
}

impl CommandChannel {
    pub fn spawn(manager: FloatingWindowManager) -> Self {
        let (tx, mut rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);

        let task = tokio::spawn(async move {
            while let Some(Envelope { command, reply }) = rx.recv().await {
                let response = handle(&manager, command);
                if reply.send(response).is_err() {
                    log::debug!("Sender went away before the {:?} reply", command);
                }
            }
            log::debug!("Command channel closed");
        });

        Self {
            client: CommandClient { tx },
            task,
        }
    }

    pub fn client(&self) -> CommandClient {
        self.client.clone()
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

fn handle(manager: &FloatingWindowManager, command: Command) -> CommandResponse {
    match command {
        Command::TogglePip => {
            // Acknowledge receipt only; the outcome is observable through getStatus.
            let manager = manager.clone();
            tokio::spawn(async move {
                if let Err(err) = manager.toggle().await {
                    log::warn!("togglePIP failed: {}", err);
                }
            });
            CommandResponse::Ack { success: true }
        }
        Command::GetStatus => CommandResponse::Status {
            is_in_pip: manager.is_active(),
        },
    }
}
