use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::platforms::PlatformConnection;
use crate::types::ChatEvent;

pub mod commands;
pub mod cooldown;
pub mod fortune;
pub mod list_store;
pub mod meal_commands;
pub mod queue;
pub mod queue_commands;
pub mod router;
pub mod storage;

use router::{CommandRouter, ResponseSender};

/// Core bot engine: pulls events off the platform one at a time and sends replies back
pub struct ChatBot {
    connection: Arc<RwLock<Box<dyn PlatformConnection>>>,
    router: CommandRouter,
    events: Option<broadcast::Receiver<ChatEvent>>,
    response_tx: Option<ResponseSender>,
    response_task: Option<JoinHandle<()>>,
}

impl ChatBot {
    pub fn new(connection: Box<dyn PlatformConnection>, router: CommandRouter) -> Self {
        Self {
            connection: Arc::new(RwLock::new(connection)),
            router,
            events: None,
            response_tx: None,
            response_task: None,
        }
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_connected().await
    }

    /// Connect the platform and start the reply sender
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting chat bot...");

        let receiver = {
            let mut connection = self.connection.write().await;
            connection.connect().await.context("Failed to connect")?;
            info!("Joined channels: {}", connection.get_channels().join(", "));
            connection
                .get_event_receiver()
                .ok_or_else(|| anyhow::anyhow!("{} connection has no event stream", connection.platform_name()))?
        };
        self.events = Some(receiver);

        // Response handler that sends messages back to the platform
        let (response_tx, mut response_rx) = mpsc::channel::<(String, String)>(100);
        let connection = Arc::clone(&self.connection);
        self.response_task = Some(tokio::spawn(async move {
            while let Some((channel, text)) = response_rx.recv().await {
                let connection = connection.read().await;
                if let Err(e) = connection.send_message(&channel, &text).await {
                    error!("Failed to send response to #{}: {:#}", channel, e);
                } else {
                    debug!("Sent response to #{}: {}", channel, text);
                }
            }
        }));
        self.response_tx = Some(response_tx);

        info!("Chat bot started successfully");
        Ok(())
    }

    /// Process events until the platform's stream closes. Each event is
    /// handled to completion before the next one is read.
    pub async fn run(&mut self) -> Result<()> {
        let mut events = self
            .events
            .take()
            .ok_or_else(|| anyhow::anyhow!("Chat bot was not started"))?;
        let response_tx = self
            .response_tx
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Chat bot was not started"))?;

        loop {
            match events.recv().await {
                Ok(event) => self.handle_event(event, &response_tx).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event receiver lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Event stream closed");
                    break;
                }
            }
        }

        Ok(())
    }

    /// React to a single inbound event
    pub async fn handle_event(&mut self, event: ChatEvent, response_tx: &ResponseSender) {
        let reply = match event {
            ChatEvent::Message(message) => {
                info!("[#{}] {}: {}", message.channel, message.display_name(), message.content);
                self.router.process_message(&message, response_tx).await;
                return;
            }
            ChatEvent::Cheer { channel, display_name, bits, message } => {
                info!("[CHEER] {}: {} ({} bits)", display_name, message, bits);
                (channel, format!("Thanks for the {} bits, @{}! 💜", bits, display_name))
            }
            ChatEvent::Subscription { channel, display_name, plan } => {
                info!("[SUB] {} subscribed with {}", display_name, plan);
                (channel, format!("Thanks for subscribing, @{}! 💜", display_name))
            }
        };

        if let Err(e) = response_tx.send(reply).await {
            error!("Failed to queue thank-you message: {}", e);
        }
    }

    /// Flush pending replies and disconnect
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down chat bot...");

        self.response_tx = None;
        if let Some(task) = self.response_task.take() {
            if let Err(e) = task.await {
                error!("Response sender task failed: {}", e);
            }
        }

        let mut connection = self.connection.write().await;
        if !connection.is_connected().await {
            warn!("{} connection was already lost", connection.platform_name());
        }
        if let Err(e) = connection.disconnect().await {
            error!("Error disconnecting: {}", e);
        }

        info!("Chat bot shutdown complete");
        Ok(())
    }
}
