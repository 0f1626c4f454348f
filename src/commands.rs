use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use crate::store::{BlocklistOutcome, ConfigStore};
use crate::telegram::InboundMessage;
use crate::utils::error::WatchError;

/// The operator command grammar. Numeric arguments stay raw here and are
/// parsed by the handler, so a bad value produces a reply instead of a
/// parse miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check,
    SetMin(String),
    SetMax(String),
    AddScammer(String),
    RemoveScammer(String),
    Scammers,
    Settings,
}

/// Matches `prefix` as a whole command word: the text is the prefix alone,
/// or the prefix followed by whitespace and an argument. "/checkfoo"
/// matches nothing.
fn strip_command<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("")
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Parse a single line of operator input. Unrecognized text is None, which
/// the dispatcher treats as silence, not an error.
pub fn parse(text: &str) -> Option<Command> {
    let text = text.trim();

    // Longest prefix first, so no command can shadow a longer one.
    if let Some(arg) = strip_command(text, "/removescammer") {
        return Some(Command::RemoveScammer(arg.to_string()));
    }
    if let Some(arg) = strip_command(text, "/addscammer") {
        return Some(Command::AddScammer(arg.to_string()));
    }
    if strip_command(text, "/scammers").is_some() {
        return Some(Command::Scammers);
    }
    if strip_command(text, "/settings").is_some() {
        return Some(Command::Settings);
    }
    if let Some(arg) = strip_command(text, "/setmin") {
        return Some(Command::SetMin(arg.to_string()));
    }
    if let Some(arg) = strip_command(text, "/setmax") {
        return Some(Command::SetMax(arg.to_string()));
    }
    if strip_command(text, "/check").is_some() {
        return Some(Command::Check);
    }
    None
}

/// What the scheduler should do with a handled update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to do: unauthorized sender or unrecognized text.
    Ignored,
    Reply(String),
    /// Run an immediate report-regardless scan.
    TriggerScan,
}

pub struct CommandDispatcher {
    store: Arc<ConfigStore>,
    operator_id: i64,
}

impl CommandDispatcher {
    pub fn new(store: Arc<ConfigStore>, operator_id: i64) -> Self {
        Self { store, operator_id }
    }

    /// Handle one inbound update. Anything from a sender other than the
    /// configured operator is discarded without acknowledgment.
    pub async fn dispatch(&self, message: &InboundMessage) -> Dispatch {
        if message.sender_id != self.operator_id {
            tracing::debug!(
                "discarding update {} from non-operator sender {}",
                message.id,
                message.sender_id
            );
            return Dispatch::Ignored;
        }

        let Some(command) = parse(&message.text) else {
            return Dispatch::Ignored;
        };

        tracing::info!("operator command: {:?}", command);
        self.execute(command).await
    }

    async fn execute(&self, command: Command) -> Dispatch {
        match command {
            Command::Check => Dispatch::TriggerScan,
            Command::SetMin(arg) => self.set_min(&arg).await,
            Command::SetMax(arg) => self.set_max(&arg).await,
            Command::AddScammer(arg) => self.add_scammer(&arg).await,
            Command::RemoveScammer(arg) => self.remove_scammer(&arg).await,
            Command::Scammers => self.list_scammers().await,
            Command::Settings => self.settings().await,
        }
    }

    async fn set_min(&self, arg: &str) -> Dispatch {
        let Ok(price) = Decimal::from_str(arg) else {
            return Dispatch::Reply(format!("'{}' is not a number. Usage: /setmin <number>", arg));
        };
        match self.store.set_min(self.operator_id, price).await {
            Ok(change) => Dispatch::Reply(format!(
                "Minimum price set to {} ₽ (was {})",
                change.new, change.old
            )),
            Err(e) => Dispatch::Reply(rejection(e)),
        }
    }

    async fn set_max(&self, arg: &str) -> Dispatch {
        let Ok(price) = Decimal::from_str(arg) else {
            return Dispatch::Reply(format!("'{}' is not a number. Usage: /setmax <number>", arg));
        };
        match self.store.set_max(self.operator_id, price).await {
            Ok(change) => Dispatch::Reply(format!(
                "Maximum price set to {} ₽ (was {})",
                change.new, change.old
            )),
            Err(e) => Dispatch::Reply(rejection(e)),
        }
    }

    async fn add_scammer(&self, arg: &str) -> Dispatch {
        let name = arg.trim();
        if name.is_empty() {
            return Dispatch::Reply("Usage: /addscammer <name>".to_string());
        }
        match self.store.add_scammer(self.operator_id, name).await {
            BlocklistOutcome::Added => Dispatch::Reply(format!("Added to blocklist: {}", name)),
            BlocklistOutcome::AlreadyPresent => {
                Dispatch::Reply(format!("{} is already on the blocklist", name))
            }
            _ => Dispatch::Ignored,
        }
    }

    async fn remove_scammer(&self, arg: &str) -> Dispatch {
        let name = arg.trim();
        if name.is_empty() {
            return Dispatch::Reply("Usage: /removescammer <name>".to_string());
        }
        match self.store.remove_scammer(self.operator_id, name).await {
            BlocklistOutcome::Removed => {
                Dispatch::Reply(format!("Removed from blocklist: {}", name))
            }
            BlocklistOutcome::NotFound => {
                Dispatch::Reply(format!("{} is not on the blocklist", name))
            }
            _ => Dispatch::Ignored,
        }
    }

    async fn list_scammers(&self) -> Dispatch {
        let config = self.store.get(self.operator_id).await;
        if config.scammers.is_empty() {
            return Dispatch::Reply("The blocklist is empty.".to_string());
        }

        let lines: Vec<String> = config
            .scammers
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {}", i + 1, name))
            .collect();
        Dispatch::Reply(format!("Blocklisted sellers:\n{}", lines.join("\n")))
    }

    async fn settings(&self) -> Dispatch {
        let config = self.store.get(self.operator_id).await;
        Dispatch::Reply(format!(
            "Window: {}-{} ₽\nBlocklist: {} seller(s)\n\n\
             Commands:\n\
             /check - run a scan now\n\
             /setmin <num> - set window minimum\n\
             /setmax <num> - set window maximum\n\
             /addscammer <name> - blocklist a seller\n\
             /removescammer <name> - unblock a seller\n\
             /scammers - show the blocklist\n\
             /settings - show this summary",
            config.min_price,
            config.max_price,
            config.scammers.len()
        ))
    }
}

fn rejection(error: WatchError) -> String {
    match error {
        WatchError::Validation(message) => format!("Rejected: {}", message),
        other => format!("Rejected: {}", other),
    }
}
