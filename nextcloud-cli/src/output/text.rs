//! Text output formatting with colors.

use chrono::Local;
use nextcloud_core::LoginCredentials;
use nextcloud_store::Settings;
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Section heading with a rule underneath.
    pub fn heading(&self, title: &str) -> String {
        format!("{}\n{}", self.paint(BOLD, title), "─".repeat(40))
    }

    /// A `label: value` line.
    pub fn field(&self, label: &str, value: &str) -> String {
        let label = format!("{label}:");
        format!("{} {value}", self.paint(DIM, &format!("{label:<16}")))
    }

    /// Green check line.
    pub fn success(&self, message: &str) -> String {
        format!("{} {message}", self.paint(GREEN, "✓"))
    }

    /// Yellow warning line.
    pub fn warning(&self, message: &str) -> String {
        format!("{} {message}", self.paint(YELLOW, "!"))
    }

    /// Red cross line.
    pub fn failure(&self, message: &str) -> String {
        format!("{} {message}", self.paint(RED, "✗"))
    }

    /// Login URL prompt.
    pub fn format_login_prompt(&self, login_url: &str) -> String {
        format!(
            "Open this URL in a browser and approve the login:\n\n  {}\n\nWaiting for confirmation (Ctrl-C to abort)...",
            self.paint(CYAN, login_url)
        )
    }

    /// Confirmed login credentials. The app password is shown once here.
    pub fn format_credentials(&self, credentials: &LoginCredentials) -> String {
        [
            self.success(&format!("Logged in as {}", credentials.login_name)),
            String::new(),
            self.field("Server", &credentials.server),
            self.field("Login name", &credentials.login_name),
            self.field("App password", &self.paint(BOLD, &credentials.app_password)),
            String::new(),
            "The app password is not saved. Pass it with --password or NEXTCLOUD_PASSWORD."
                .to_string(),
        ]
        .join("\n")
    }

    /// Capability values: scalars as is, lists one per line, objects as JSON.
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| format!("  • {}", self.format_scalar(item)))
                .collect::<Vec<_>>()
                .join("\n"),
            Value::Object(_) => serde_json::to_string_pretty(value).unwrap_or_default(),
            other => other.to_string(),
        }
    }

    fn format_scalar(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Summary of a conversation returned by avatar calls.
    pub fn format_room(&self, room: &Value) -> String {
        let mut lines = Vec::new();
        let name = room
            .get("displayName")
            .or_else(|| room.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("(unnamed)");
        lines.push(self.success(&format!("Updated {name}")));

        if let Some(token) = room.get("token").and_then(Value::as_str) {
            lines.push(self.field("Token", token));
        }
        if let Some(version) = room.get("avatarVersion").and_then(Value::as_str) {
            lines.push(self.field("Avatar version", version));
        }
        if let Some(custom) = room.get("isCustomAvatar").and_then(Value::as_bool) {
            lines.push(self.field("Custom avatar", if custom { "yes" } else { "no" }));
        }
        lines.join("\n")
    }

    /// Current settings.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let unset = self.paint(DIM, "(not set)");
        let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| unset.clone());

        let last_login = settings.last_login_at.map_or_else(
            || unset.clone(),
            |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        );

        [
            self.heading("ncctl Configuration"),
            String::new(),
            self.field("Server", &or_unset(&settings.server)),
            self.field("Username", &or_unset(&settings.username)),
            self.field("User agent", &or_unset(&settings.user_agent)),
            self.field("Login timeout", &format!("{}s", settings.login_timeout_secs)),
            self.field("Poll interval", &format!("{}s", settings.poll_interval_secs)),
            self.field("Talk API", &format!("v{}", settings.talk_api_version)),
            self.field("Log level", &settings.log_level.to_string()),
            self.field("Last login", &last_login),
        ]
        .join("\n")
    }
}
