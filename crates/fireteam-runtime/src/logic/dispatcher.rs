//! Effect dispatcher
//!
//! Executes [`Effect`]s against the collaborators one at a time, in the order
//! the core logic task emitted them. A failing collaborator is logged and the
//! next effect proceeds.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use fireteam_core::FireteamResult;

use crate::channel::Effect;
use crate::collaborators::Collaborators;

pub struct EffectDispatcher {
    collaborators: Collaborators,
    effect_receiver: mpsc::Receiver<Effect>,
}

impl EffectDispatcher {
    pub fn new(collaborators: Collaborators, effect_receiver: mpsc::Receiver<Effect>) -> Self {
        Self {
            collaborators,
            effect_receiver,
        }
    }

    /// Run until the core logic task drops its sender, draining what is queued
    pub async fn run(mut self) {
        while let Some(effect) = self.effect_receiver.recv().await {
            let label = effect_label(&effect);
            match self.execute(effect).await {
                Ok(()) => {}
                Err(e) if e.is_transient() => {
                    warn!(effect = label, error = %e, "effect failed");
                }
                Err(e) => error!(effect = label, error = %e, "effect failed"),
            }
        }
        info!("Effect dispatcher stopped");
    }

    async fn execute(&self, effect: Effect) -> FireteamResult<()> {
        match effect {
            Effect::PresentAlert { sender } => {
                self.collaborators.presentation.present_alert(&sender).await
            }
            Effect::PresentDismiss => self.collaborators.presentation.present_dismiss().await,
            Effect::Pulse => self.collaborators.presentation.pulse().await,
            Effect::Notify(notification) => {
                debug!(body = %notification.body, "scheduling notification");
                self.collaborators
                    .notifications
                    .schedule_notification(&notification.title, &notification.body)
                    .await
            }
            Effect::SaveIdentity { name } => {
                self.collaborators.identity.save_identity(&name).await
            }
        }
    }
}

fn effect_label(effect: &Effect) -> &'static str {
    match effect {
        Effect::PresentAlert { .. } => "present_alert",
        Effect::PresentDismiss => "present_dismiss",
        Effect::Pulse => "pulse",
        Effect::Notify(_) => "notify",
        Effect::SaveIdentity { .. } => "save_identity",
    }
}
