use log::info;
use rand::Rng;

use super::cooldown::{CooldownGate, CooldownStatus};
use crate::types::ChatMessage;

/// Daily fortune tiers, worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fortune {
    GreatCurse,
    Curse,
    SmallBlessing,
    Blessing,
    GreatBlessing,
}

impl Fortune {
    /// Ten equally likely slots: 1 great curse, 3 curse, 3 small blessing, 2 blessing, 1 great blessing
    pub fn from_slot(slot: u8) -> Self {
        match slot {
            0 => Fortune::GreatCurse,
            1..=3 => Fortune::Curse,
            4..=6 => Fortune::SmallBlessing,
            7..=8 => Fortune::Blessing,
            _ => Fortune::GreatBlessing,
        }
    }

    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        Self::from_slot(rng.random_range(0..10))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Fortune::GreatCurse => "大凶",
            Fortune::Curse => "凶",
            Fortune::SmallBlessing => "小吉",
            Fortune::Blessing => "吉",
            Fortune::GreatBlessing => "大吉",
        }
    }
}

impl std::fmt::Display for Fortune {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `!fortune`, limited to one draw per window for regular viewers
pub struct FortuneCommands {
    cooldowns: CooldownGate,
}

impl FortuneCommands {
    pub fn new(cooldowns: CooldownGate) -> Self {
        Self { cooldowns }
    }

    pub fn cooldowns(&self) -> &CooldownGate {
        &self.cooldowns
    }

    pub fn handle_fortune(&mut self, message: &ChatMessage) -> String {
        self.handle_fortune_with(message, &mut rand::rng())
    }

    pub fn handle_fortune_with<R: Rng>(&mut self, message: &ChatMessage, rng: &mut R) -> String {
        let name = message.display_name();
        let now = message.timestamp;

        let status = self.cooldowns.try_use(name, now, message.is_privileged);
        if let CooldownStatus::Waiting(remaining) = status {
            return format!("@{}, you can use !fortune again in {}.", name, remaining);
        }

        let fortune = Fortune::draw(rng);
        info!("Drew {:?} for {}", fortune, name);

        if status == CooldownStatus::Ready {
            self.cooldowns.record(name, now);
        }

        format!("@{}, 今日運勢: {}", name, fortune)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn commands(dir: &std::path::Path) -> FortuneCommands {
        FortuneCommands::new(CooldownGate::load(dir.join("fortune_last.json"), Duration::minutes(10)))
    }

    #[test]
    fn test_slot_distribution() {
        let tiers: Vec<Fortune> = (0..10).map(Fortune::from_slot).collect();
        let count = |f: Fortune| tiers.iter().filter(|t| **t == f).count();
        assert_eq!(count(Fortune::GreatCurse), 1);
        assert_eq!(count(Fortune::Curse), 3);
        assert_eq!(count(Fortune::SmallBlessing), 3);
        assert_eq!(count(Fortune::Blessing), 2);
        assert_eq!(count(Fortune::GreatBlessing), 1);
    }

    #[test]
    fn test_viewer_gets_fortune_then_cooldown() {
        let dir = tempdir().unwrap();
        let mut fortunes = commands(dir.path());
        let mut rng = StdRng::seed_from_u64(7);

        let mut message = ChatMessage::new("chan", "Alice", "!fortune", false);
        let reply = fortunes.handle_fortune_with(&message, &mut rng);
        assert!(reply.starts_with("@Alice, 今日運勢: "));

        message.timestamp = message.timestamp + Duration::seconds(30);
        let reply = fortunes.handle_fortune_with(&message, &mut rng);
        assert_eq!(reply, "@Alice, you can use !fortune again in 9m 30s.");
    }

    #[test]
    fn test_privileged_draws_do_not_touch_ledger() {
        let dir = tempdir().unwrap();
        let mut fortunes = commands(dir.path());
        let mut rng = StdRng::seed_from_u64(1);

        let message = ChatMessage::new("chan", "Streamer", "!fortune", true);
        for _ in 0..3 {
            let reply = fortunes.handle_fortune_with(&message, &mut rng);
            assert!(reply.starts_with("@Streamer, 今日運勢: "));
        }
        assert_eq!(fortunes.cooldowns().last_use("streamer"), None);
        assert!(!dir.path().join("fortune_last.json").exists());
    }
}
