//! Outer controller surfaces: toolbar action, keyboard shortcut and popup.
//!
//! These run outside the page and only reach the engine through the command
//! channel, addressed to a browser tab by the host's [`TabMessenger`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::channel::{Command, CommandResponse};
use crate::config::PipConfig;
use crate::error::PipError;

/// Name of the keyboard command bound to toggling.
pub const TOGGLE_SHORTCUT: &str = "toggle-pip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: u64,
    pub url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TabMessenger: Send + Sync {
    async fn active_tab(&self) -> Option<TabInfo>;
    async fn send_command(&self, tab_id: u64, command: Command) -> Result<CommandResponse, PipError>;
    async fn open_tab(&self, url: &str) -> Result<(), PipError>;
    fn notify_user(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Toggled,
    /// The page did not answer; usually the engine is not attached yet.
    DeliveryFailed,
    OpenedPlayer,
    Ignored,
}

/// What the popup shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupStatus {
    pub on_player_tab: bool,
    pub is_in_pip: bool,
}

pub struct ToolbarController {
    messenger: Arc<dyn TabMessenger>,
    player_url: String,
    player_host: String,
    reload_notice: String,
}

impl ToolbarController {
    pub fn new(messenger: Arc<dyn TabMessenger>, config: &PipConfig) -> Self {
        Self {
            messenger,
            player_url: config.player_url.clone(),
            player_host: host_of(&config.player_url).to_string(),
            reload_notice: config.labels.reload_required.clone(),
        }
    }

    pub fn is_player_tab(&self, tab: &TabInfo) -> bool {
        tab.url
            .as_deref()
            .is_some_and(|url| url.contains(&self.player_host))
    }

    /// Toolbar icon clicked while `tab` is focused.
    pub async fn on_action_clicked(&self, tab: &TabInfo) -> Result<ActionOutcome, PipError> {
        if self.is_player_tab(tab) {
            Ok(self.send_toggle(tab).await)
        } else {
            log::info!("Tab {} is not the player, opening {}", tab.id, self.player_url);
            self.messenger.open_tab(&self.player_url).await?;
            Ok(ActionOutcome::OpenedPlayer)
        }
    }

    /// Keyboard command. Only acts on a focused player tab.
    pub async fn on_shortcut(&self, command: &str) -> ActionOutcome {
        if command != TOGGLE_SHORTCUT {
            log::debug!("Ignoring unknown shortcut `{}`", command);
            return ActionOutcome::Ignored;
        }
        match self.messenger.active_tab().await {
            Some(tab) if self.is_player_tab(&tab) => self.send_toggle(&tab).await,
            _ => ActionOutcome::Ignored,
        }
    }

    /// Status for the popup. Any delivery failure reads as not active.
    pub async fn popup_status(&self) -> PopupStatus {
        let Some(tab) = self.messenger.active_tab().await else {
            return PopupStatus::default();
        };
        if !self.is_player_tab(&tab) {
            return PopupStatus::default();
        }

        let is_in_pip = match self.messenger.send_command(tab.id, Command::GetStatus).await {
            Ok(CommandResponse::Status { is_in_pip }) => is_in_pip,
            Ok(other) => {
                log::debug!("Unexpected getStatus reply {:?}", other);
                false
            }
            Err(err) => {
                // The page script may not be loaded yet.
                log::debug!("getStatus failed for tab {}: {}", tab.id, err);
                false
            }
        };

        PopupStatus {
            on_player_tab: true,
            is_in_pip,
        }
    }

    /// Popup toggle button. A failed delivery asks the user to reload the page.
    pub async fn popup_toggle(&self) -> Result<(), PipError> {
        let tab = self
            .messenger
            .active_tab()
            .await
            .ok_or_else(|| PipError::ChannelDelivery("no active tab".to_string()))?;

        if let Err(err) = self.messenger.send_command(tab.id, Command::TogglePip).await {
            log::error!("togglePIP delivery to tab {} failed: {}", tab.id, err);
            self.messenger.notify_user(&self.reload_notice);
            return Err(err);
        }
        Ok(())
    }

    pub async fn popup_open_player(&self) -> Result<(), PipError> {
        self.messenger.open_tab(&self.player_url).await
    }

    async fn send_toggle(&self, tab: &TabInfo) -> ActionOutcome {
        match self.messenger.send_command(tab.id, Command::TogglePip).await {
            Ok(_) => ActionOutcome::Toggled,
            Err(err) => {
                log::error!("togglePIP delivery to tab {} failed: {}", tab.id, err);
                ActionOutcome::DeliveryFailed
            }
        }
    }
}

fn host_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}
