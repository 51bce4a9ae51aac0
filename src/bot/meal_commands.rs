use log::{debug, info};

use super::list_store::ListStore;
use super::router::CommandInvocation;
use crate::config::CommandSettings;
use crate::types::ChatMessage;

/// `!meal`, `!addmeal`, `!removemeal` and `!listmeals` on top of a [`ListStore`]
pub struct MealCommands {
    meals: ListStore,
    max_picks: usize,
    list_default: usize,
    list_max: usize,
}

impl MealCommands {
    pub fn new(meals: ListStore, settings: &CommandSettings) -> Self {
        Self {
            meals,
            max_picks: settings.meal_max_picks,
            list_default: settings.meal_list_default,
            list_max: settings.meal_list_max,
        }
    }

    pub fn meals(&self) -> &ListStore {
        &self.meals
    }

    /// Returns the reply when the command belongs to this feature and the caller may use it
    pub fn process_command(&mut self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> Option<String> {
        if invocation.name == "meal" {
            return Some(self.handle_meal(invocation, message));
        }

        if !message.is_privileged {
            return None;
        }

        match invocation.name.as_str() {
            "addmeal" => Some(self.handle_add(invocation.rest)),
            "removemeal" => Some(self.handle_remove(invocation.rest)),
            "listmeals" => Some(self.handle_list(invocation.args.first().copied())),
            _ => None,
        }
    }

    fn handle_meal(&self, invocation: &CommandInvocation<'_>, message: &ChatMessage) -> String {
        let name = message.display_name();
        let count = invocation
            .args
            .first()
            .and_then(|arg| leading_int(arg))
            .map(|n| n.clamp(1, self.max_picks as i64) as usize)
            .unwrap_or(1);

        if self.meals.is_empty() {
            return format!("@{}, meal list is empty.", name);
        }

        let picks = self.meals.pick_random(count);
        if picks.len() == 1 {
            format!("@{}, how about: {}? 🍽️", name, picks[0])
        } else {
            let options = picks
                .iter()
                .enumerate()
                .map(|(i, meal)| format!("{}. {}", i + 1, meal))
                .collect::<Vec<_>>()
                .join(" | ");
            format!("@{}, here are {} meal options: {} 🍽️", name, picks.len(), options)
        }
    }

    fn handle_add(&mut self, meal: &str) -> String {
        if meal.is_empty() {
            return "Usage: !addmeal <meal name>".to_string();
        }
        match self.meals.add(meal) {
            Ok(total) => {
                info!("Added meal '{}'", meal);
                format!("{} added to meals list. Total: {}", meal, total)
            }
            Err(e) => e.to_string(),
        }
    }

    fn handle_remove(&mut self, meal: &str) -> String {
        if meal.is_empty() {
            return "Usage: !removemeal <meal name>".to_string();
        }
        match self.meals.remove(meal) {
            Ok(removed) => {
                info!("Removed meal '{}'", removed);
                format!("{} removed. Total: {}", meal, self.meals.len())
            }
            Err(e) => e.to_string(),
        }
    }

    fn handle_list(&self, arg: Option<&str>) -> String {
        // 0 and garbage fall back to the default
        let count = match arg.and_then(leading_int) {
            Some(n) if n != 0 => n.clamp(1, self.list_max as i64) as usize,
            _ => self.list_default,
        };
        debug!("Listing up to {} meals", count);

        let page = self.meals.list(count);
        format!(
            "Meals ({} total): {}{}",
            page.total,
            page.items.join(" | "),
            if page.truncated { " | ..." } else { "" }
        )
    }
}

/// Integer read from the leading digits of `arg`, so "3abc" is 3 and "2.5" is 2.
/// Out-of-range digit runs saturate.
fn leading_int(arg: &str) -> Option<i64> {
    let (negative, unsigned) = match arg.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, arg.strip_prefix('+').unwrap_or(arg)),
    };
    let end = unsigned.find(|c: char| !c.is_ascii_digit()).unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn setup(items: &[&str]) -> (TempDir, MealCommands) {
        let dir = tempdir().unwrap();
        let mut store = ListStore::load(dir.path().join("meals.json"));
        for item in items {
            store.add(item).unwrap();
        }
        (dir, MealCommands::new(store, &CommandSettings::default()))
    }

    fn run(commands: &mut MealCommands, text: &str, privileged: bool) -> Option<String> {
        let message = ChatMessage::new("chan", "Alice", text, privileged);
        let invocation = CommandInvocation::parse(&message.content, "!")?;
        commands.process_command(&invocation, &message)
    }

    #[test]
    fn test_meal_on_empty_list() {
        let (_dir, mut commands) = setup(&[]);
        assert_eq!(run(&mut commands, "!meal", false).unwrap(), "@Alice, meal list is empty.");
    }

    #[test]
    fn test_single_and_multiple_picks() {
        let (_dir, mut commands) = setup(&["Tacos"]);
        assert_eq!(run(&mut commands, "!meal", false).unwrap(), "@Alice, how about: Tacos? 🍽️");

        let (_dir, mut commands) = setup(&["Tacos", "Ramen", "Pho"]);
        let reply = run(&mut commands, "!meal 2", false).unwrap();
        assert!(reply.starts_with("@Alice, here are 2 meal options: 1. "));
        assert!(reply.contains(" | 2. "));
        assert!(reply.ends_with(" 🍽️"));
    }

    #[test]
    fn test_pick_count_is_clamped() {
        let (_dir, mut commands) = setup(&["a", "b", "c", "d", "e", "f", "g"]);
        let reply = run(&mut commands, "!meal 50", false).unwrap();
        assert!(reply.contains("here are 5 meal options"));

        let reply = run(&mut commands, "!meal soup", false).unwrap();
        assert!(reply.contains("how about: "));
    }

    #[test]
    fn test_management_requires_privilege() {
        let (_dir, mut commands) = setup(&[]);
        assert_eq!(run(&mut commands, "!addmeal Tacos", false), None);
        assert_eq!(run(&mut commands, "!listmeals", false), None);
        assert!(commands.meals().is_empty());
    }

    #[test]
    fn test_add_and_remove_multi_word_names() {
        let (_dir, mut commands) = setup(&[]);
        assert_eq!(
            run(&mut commands, "!addmeal  Pad Thai ", true).unwrap(),
            "Pad Thai added to meals list. Total: 1"
        );
        assert_eq!(
            run(&mut commands, "!addmeal pad thai", true).unwrap(),
            "pad thai is already in the meal list."
        );
        assert_eq!(run(&mut commands, "!removemeal PAD THAI", true).unwrap(), "PAD THAI removed. Total: 0");
        assert_eq!(run(&mut commands, "!removemeal Pho", true).unwrap(), "Pho not found in meal list.");
        assert_eq!(run(&mut commands, "!addmeal", true).unwrap(), "Usage: !addmeal <meal name>");
        assert_eq!(run(&mut commands, "!removemeal   ", true).unwrap(), "Usage: !removemeal <meal name>");
    }

    #[test]
    fn test_listmeals_limits() {
        let (_dir, mut commands) = setup(&["a", "b", "c"]);
        assert_eq!(run(&mut commands, "!listmeals", true).unwrap(), "Meals (3 total): a | b | c");
        assert_eq!(run(&mut commands, "!listmeals 2", true).unwrap(), "Meals (3 total): a | b | ...");
        assert_eq!(run(&mut commands, "!listmeals -4", true).unwrap(), "Meals (3 total): a | ...");
        assert_eq!(run(&mut commands, "!listmeals 0", true).unwrap(), "Meals (3 total): a | b | c");
        assert_eq!(run(&mut commands, "!listmeals junk", true).unwrap(), "Meals (3 total): a | b | c");
    }

    #[test]
    fn test_counts_read_leading_digits() {
        let (_dir, mut commands) = setup(&["a", "b", "c", "d"]);
        assert_eq!(run(&mut commands, "!listmeals 2.5", true).unwrap(), "Meals (4 total): a | b | ...");
        assert_eq!(
            run(&mut commands, "!listmeals 99999999999999999999", true).unwrap(),
            "Meals (4 total): a | b | c | d"
        );

        let reply = run(&mut commands, "!meal 3abc", false).unwrap();
        assert!(reply.contains("here are 3 meal options"));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("3abc"), Some(3));
        assert_eq!(leading_int("2.5"), Some(2));
        assert_eq!(leading_int("-4x"), Some(-4));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("abc3"), None);
        assert_eq!(leading_int("-"), None);
    }
}
