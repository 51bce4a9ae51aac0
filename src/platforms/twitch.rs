use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::platforms::PlatformConnection;
use crate::types::{ChatEvent, ChatMessage, SubscriptionPlan};

// Type aliases for cleaner code
type WebSocketWriter = Arc<RwLock<futures_util::stream::SplitSink<tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>, Message>>>;

const TWITCH_IRC_URL: &str = "wss://irc-ws.chat.twitch.tv:443";
const REQUIRED_ENV: [&str; 3] = ["TWITCH_USERNAME", "TWITCH_OAUTH_TOKEN", "TWITCH_CHANNELS"];

/// Configuration for Twitch connection
#[derive(Debug, Clone)]
pub struct TwitchConfig {
    pub username: String,
    pub oauth_token: String, // oauth:your_token_here
    pub channels: Vec<String>,
}

impl TwitchConfig {
    /// Load Twitch configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Every missing variable is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_ENV
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(anyhow::anyhow!(
                "Missing required environment variables: {}. Create a .env file with the required values.",
                missing.join(", ")
            ));
        }

        let username = value("TWITCH_USERNAME").unwrap_or_default().trim().to_string();
        let mut oauth_token = value("TWITCH_OAUTH_TOKEN").unwrap_or_default().trim().to_string();
        let channels_str = value("TWITCH_CHANNELS").unwrap_or_default();

        // Parse comma-separated channel list
        let channels: Vec<String> = channels_str
            .split(',')
            .map(|s| s.trim().trim_start_matches('#').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if channels.is_empty() {
            return Err(anyhow::anyhow!("No channels specified in TWITCH_CHANNELS"));
        }

        if !oauth_token.starts_with("oauth:") {
            debug!("Adding missing 'oauth:' prefix to token");
            oauth_token = format!("oauth:{}", oauth_token);
        }

        info!("Loaded Twitch config for user '{}' with {} channels", username, channels.len());
        debug!("Channels: {:?}", channels);

        Ok(Self {
            username,
            oauth_token,
            channels,
        })
    }
}

/// Twitch IRC connection implementation
pub struct TwitchConnection {
    config: TwitchConfig,
    event_sender: Option<broadcast::Sender<ChatEvent>>,
    websocket_writer: Option<WebSocketWriter>,
    is_connected: Arc<RwLock<bool>>,
}

impl TwitchConnection {
    pub fn new(config: TwitchConfig) -> Self {
        Self {
            config,
            event_sender: None,
            websocket_writer: None,
            is_connected: Arc::new(RwLock::new(false)),
        }
    }

    /// Parse one websocket frame (possibly several IRC lines) into chat events,
    /// dropping anything the bot itself said.
    pub fn parse_frame(raw: &str, bot_login: &str) -> Vec<ChatEvent> {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .flat_map(Self::parse_line)
            .filter(|event| match event {
                ChatEvent::Message(message) => !message.username.eq_ignore_ascii_case(bot_login),
                _ => true,
            })
            .collect()
    }

    // Format: @tags :user!user@user.tmi.twitch.tv COMMAND #channel :message
    fn parse_line(line: &str) -> Vec<ChatEvent> {
        let (raw_tags, rest) = match line.strip_prefix('@') {
            Some(tagged) => match tagged.split_once(' ') {
                Some(parts) => parts,
                None => return Vec::new(),
            },
            None => ("", line),
        };
        let tags = parse_tags(raw_tags);

        let rest = rest.trim_start();
        let (prefix, rest) = match rest.strip_prefix(':') {
            Some(prefixed) => prefixed.split_once(' ').unwrap_or((prefixed, "")),
            None => ("", rest),
        };
        let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));
        let (target, trailing) = match params.split_once(" :") {
            Some((target, trailing)) => (target, trailing),
            None => (params, ""),
        };
        let channel = target.trim().trim_start_matches('#').to_string();

        match command {
            "PRIVMSG" => Self::parse_privmsg(&tags, prefix, channel, trailing).into_iter().collect(),
            "USERNOTICE" => Self::parse_usernotice(&tags, channel).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// A message carrying bits is a cheer only, its text is never routed as a command
    fn parse_privmsg(tags: &HashMap<String, String>, prefix: &str, channel: String, content: &str) -> Option<ChatEvent> {
        let username = prefix.split('!').next().unwrap_or_default().to_string();
        if username.is_empty() {
            debug!("PRIVMSG without a sender: {}", content);
            return None;
        }

        let display_name = tags.get("display-name").filter(|d| !d.is_empty()).cloned();
        let is_mod = tags.get("mod").map(|m| m == "1").unwrap_or(false);
        let is_owner = match (tags.get("room-id"), tags.get("user-id")) {
            (Some(room), Some(user)) => !room.is_empty() && room == user,
            _ => false,
        };
        let is_broadcaster = tags
            .get("badges")
            .map(|badges| badges.split(',').any(|b| b.starts_with("broadcaster/")))
            .unwrap_or(false);

        let message = ChatMessage {
            platform: "twitch".to_string(),
            channel,
            username,
            display_name,
            content: content.to_string(),
            timestamp: chrono::Utc::now(),
            is_privileged: is_mod || is_owner || is_broadcaster,
        };

        match tags.get("bits").and_then(|b| b.parse::<u64>().ok()) {
            Some(bits) => Some(ChatEvent::Cheer {
                display_name: message.display_name().to_string(),
                channel: message.channel,
                bits,
                message: message.content,
            }),
            None => Some(ChatEvent::Message(message)),
        }
    }

    fn parse_usernotice(tags: &HashMap<String, String>, channel: String) -> Option<ChatEvent> {
        if tags.get("msg-id").map(String::as_str) != Some("sub") {
            return None;
        }

        let display_name = tags
            .get("display-name")
            .or_else(|| tags.get("login"))
            .filter(|d| !d.is_empty())?
            .clone();

        let plan = match tags.get("msg-param-sub-plan").map(String::as_str) {
            Some("Prime") => SubscriptionPlan::Prime,
            other => SubscriptionPlan::Tier(
                tags.get("msg-param-sub-plan-name")
                    .cloned()
                    .or_else(|| other.map(str::to_string))
                    .unwrap_or_else(|| "a subscription".to_string()),
            ),
        };

        Some(ChatEvent::Subscription {
            channel,
            display_name,
            plan,
        })
    }
}

/// Split `a=1;b=2` into a map, undoing IRCv3 tag escapes
fn parse_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|tag| tag.split_once('='))
        .map(|(key, value)| (key.to_string(), unescape_tag(value)))
        .collect()
}

fn unescape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some(':') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[async_trait]
impl PlatformConnection for TwitchConnection {
    async fn connect(&mut self) -> Result<()> {
        info!("Connecting to Twitch IRC...");

        let url = Url::parse(TWITCH_IRC_URL)
            .context("Failed to parse Twitch WebSocket URL")?;

        let (ws_stream, _) = connect_async(url)
            .await
            .context("Failed to connect to Twitch WebSocket")?;

        let (write, read) = ws_stream.split();

        // Store writer for sending messages
        let writer_arc = Arc::new(RwLock::new(write));
        let writer_for_pong = Arc::clone(&writer_arc);
        self.websocket_writer = Some(writer_arc);

        // Authenticate with Twitch
        let pass_msg = format!("PASS {}\r\n", self.config.oauth_token);
        let nick_msg = format!("NICK {}\r\n", self.config.username.to_lowercase());

        writer_for_pong.write().await.send(Message::Text(pass_msg)).await
            .context("Failed to send PASS command")?;
        writer_for_pong.write().await.send(Message::Text(nick_msg)).await
            .context("Failed to send NICK command")?;

        // Tags carry mod/room-id/bits, commands carry USERNOTICE
        writer_for_pong.write().await.send(Message::Text("CAP REQ :twitch.tv/tags twitch.tv/commands\r\n".to_string())).await
            .context("Failed to request capabilities")?;

        for channel in &self.config.channels {
            let join_msg = format!("JOIN #{}\r\n", channel);
            writer_for_pong.write().await.send(Message::Text(join_msg)).await
                .with_context(|| format!("Failed to join channel: {}", channel))?;
            info!("Joined channel: #{}", channel);
        }

        let (tx, _) = broadcast::channel(1000);
        self.event_sender = Some(tx.clone());

        *self.is_connected.write().await = true;

        let event_sender = tx;
        let is_connected = Arc::clone(&self.is_connected);
        let bot_login = self.config.username.clone();

        tokio::spawn(async move {
            let mut read = read;
            info!("Twitch message reader started");

            loop {
                match read.next().await {
                    Some(Ok(Message::Text(text))) => {
                        debug!("Received: {}", text);

                        // Handle PING/PONG to keep connection alive
                        if text.starts_with("PING") {
                            debug!("Responding to PING");
                            let pong_msg = text.replace("PING", "PONG");
                            if let Err(e) = writer_for_pong.write().await.send(Message::Text(pong_msg)).await {
                                error!("Failed to send PONG: {}", e);
                            }
                            continue;
                        }

                        for event in TwitchConnection::parse_frame(&text, &bot_login) {
                            if let Err(e) = event_sender.send(event) {
                                warn!("Failed to broadcast chat event: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        debug!("Received ping, sending pong");
                        if let Err(e) = writer_for_pong.write().await.send(Message::Pong(payload)).await {
                            error!("Failed to send pong: {}", e);
                        }
                    }
                    Some(Ok(Message::Close(close_frame))) => {
                        info!("WebSocket connection closed: {:?}", close_frame);
                        break;
                    }
                    Some(Ok(_)) => {
                        debug!("Ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        warn!("WebSocket stream ended");
                        break;
                    }
                }
            }

            *is_connected.write().await = false;
            warn!("Twitch connection handler exited");
        });

        info!("Successfully connected to Twitch IRC");
        Ok(())
    }

    async fn send_message(&self, channel: &str, message: &str) -> Result<()> {
        let writer_arc = self
            .websocket_writer
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Not connected to Twitch"))?;

        let privmsg = format!("PRIVMSG #{} :{}\r\n", channel, message);
        writer_arc
            .write()
            .await
            .send(Message::Text(privmsg))
            .await
            .with_context(|| format!("Failed to send message to #{}", channel))?;

        debug!("Sent message to #{}: {}", channel, message);
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "twitch"
    }

    async fn is_connected(&self) -> bool {
        *self.is_connected.read().await
    }

    fn get_event_receiver(&self) -> Option<broadcast::Receiver<ChatEvent>> {
        self.event_sender.as_ref().map(|sender| sender.subscribe())
    }

    fn get_channels(&self) -> Vec<String> {
        self.config.channels.clone()
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(writer_arc) = self.websocket_writer.take() {
            if let Err(e) = writer_arc.write().await.close().await {
                debug!("Error closing Twitch socket: {}", e);
            }
        }
        *self.is_connected.write().await = false;
        self.event_sender = None;
        info!("Disconnected from Twitch");
        Ok(())
    }
}
