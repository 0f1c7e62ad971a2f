//! Page-side entry point.
//!
//! The hosting layer constructs one engine per page and keeps it for the page's
//! lifetime; nothing here is global.

use std::sync::Arc;

use crate::channel::{CommandChannel, CommandClient};
use crate::config::PipConfig;
use crate::dom::{HostDocument, LauncherButton};
use crate::error::PipError;
use crate::locator::locate;
use crate::surface::markup::LAUNCHER_ICON;
use crate::surface::FloatingSurfaceHost;
use crate::utils::logger::log_async_operation;
use crate::window_manager::{FloatingWindowManager, WeakWindowManager};

pub struct PipEngine {
    document: Arc<dyn HostDocument>,
    manager: FloatingWindowManager,
    channel: CommandChannel,
    /// Class of the launcher this engine inserted, if it inserted one.
    launcher: Option<String>,
}

impl PipEngine {
    /// Wait for the player to mount, install the launcher and start serving
    /// commands. Must be called from within a tokio runtime.
    pub async fn attach(
        document: Arc<dyn HostDocument>,
        surfaces: Arc<dyn FloatingSurfaceHost>,
        config: PipConfig,
    ) -> Result<Self, PipError> {
        log_async_operation("engine.attach", || async move {
            config.validate()?;
            locate(
                document.as_ref(),
                &config.selectors.player_bar,
                config.locator_timeout(),
            )
            .await?;

            let manager = FloatingWindowManager::new(document.clone(), surfaces, config.clone());
            let launcher = install_launcher(document.as_ref(), &config, manager.downgrade())
                .then(|| config.selectors.launcher_class.clone());
            let channel = CommandChannel::spawn(manager.clone());

            Ok::<_, PipError>(Self {
                document,
                manager,
                channel,
                launcher,
            })
        })
        .await
    }

    pub fn manager(&self) -> &FloatingWindowManager {
        &self.manager
    }

    pub fn commands(&self) -> CommandClient {
        self.channel.client()
    }

    /// Close any open session, remove the launcher and stop answering commands.
    ///
    /// The launcher's click handler holds only a weak manager, so the button
    /// leaves the page together with the engine.
    pub async fn detach(self) {
        self.manager.close().await;
        if let Some(class_name) = &self.launcher {
            if !self.document.remove_button(class_name) {
                log::warn!("Launcher `.{}` was already gone at detach", class_name);
            }
        }
        self.channel.shutdown();
        log::info!("Engine detached");
    }
}

/// Returns whether a new launcher was inserted.
fn install_launcher(document: &dyn HostDocument, config: &PipConfig, manager: WeakWindowManager) -> bool {
    let selectors = &config.selectors;
    if document
        .query_selector(&format!(".{}", selectors.launcher_class))
        .is_some()
    {
        log::debug!("Launcher already present, not adding another");
        return false;
    }

    let button = LauncherButton {
        class_name: selectors.launcher_class.clone(),
        title: config.labels.launcher_title.clone(),
        icon_svg: LAUNCHER_ICON.to_string(),
    };

    // Clicks arrive on the host's event thread, outside any runtime context.
    let runtime = tokio::runtime::Handle::current();
    let installed = document.prepend_button(
        &selectors.launcher_container,
        &button,
        Arc::new(move || {
            let Some(manager) = manager.upgrade() else {
                return;
            };
            runtime.spawn(async move {
                if let Err(err) = manager.toggle().await {
                    log::warn!("Launcher toggle failed: {}", err);
                }
            });
        }),
    );

    if installed {
        log::info!("Launcher installed in `{}`", selectors.launcher_container);
    } else {
        log::warn!(
            "Launcher container `{}` missing, toggling only via commands",
            selectors.launcher_container
        );
    }
    installed
}
