//! Subscription and method catalogue.
//!
//! Names and parameter shapes were taken from observed chat service
//! traffic.
//!
//! # Subscriptions
//!
//! | Variant | Name | Params |
//! |---------|------|--------|
//! | `ClientVersions` | `meteor_autoupdate_clientVersions` | `[]` |
//! | `LoginServiceConfiguration` | `meteor.loginServiceConfiguration` | `[]` |
//! | `IntercomHash` | `intercomHash` | `[]` |
//! | `I18n` | `i18n` | `[lang]` |
//! | `LatestUniverseChats` | `latestUniversChats` | `[]` |
//! | `LatestTellChats` | `latestTellChats` | `[]` |
//! | `LatestGuildChats` | `latestGuildChats` | `[guildId]` |
//! | `NextEvents` | `nextEvents` | `[]` |
//! | `DocumentsUnlocked` | `documentsUnlocked` | `[lang, null]` |
//! | `Documents` | `documents` | `[]` |
//! | `DocumentsUnlocking` | `documentsUnlocking` | `[]` |
//! | `Globals` | `globals` | `[]` |
//! | `Ladders` | `ladders` | `[]` |
//! | `LaddersMine` | `laddersMine` | `[]` |
//! | `UserData` | `userData` | `[]` |
//!
//! # Methods
//!
//! | Variant | Name | Params |
//! |---------|------|--------|
//! | `Login` | `login` | `[{ryzom, username, password, lang}]` |
//! | `Logout` | `logout` | `[]` |
//! | `Chat` | `chat` | `[channel, text]` |
//! | `UserStatusIdle` | `user-status-idle` | `[timestamp]` |
//! | `UserStatusActive` | `user-status-active` | `[timestamp]` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Value, json};

// ============================================================================
// Chat
// ============================================================================

/// Channel identifier used for private tells.
pub const CHAT_TELL: &str = "tell";

/// Public chat channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chat {
    /// Universe chat.
    Universe,
    /// English chat.
    English,
    /// German chat.
    German,
    /// French chat.
    French,
}

impl Chat {
    /// Returns the protocol channel identifier.
    #[inline]
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Universe => "all",
            Self::English => "en",
            Self::German => "de",
            Self::French => "fr",
        }
    }
}

impl fmt::Display for Chat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Server feeds the client can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// Client build versions.
    ClientVersions,
    /// Login service configuration.
    LoginServiceConfiguration,
    /// Support widget hash.
    IntercomHash,
    /// Translations for a language.
    I18n {
        /// Language code.
        lang: String,
    },
    /// Universe chat history.
    LatestUniverseChats,
    /// Private tell history.
    LatestTellChats,
    /// Guild chat history.
    LatestGuildChats {
        /// Guild to follow.
        guild_id: i64,
    },
    /// Upcoming in-game events.
    NextEvents,
    /// Unlocked documents for a language.
    DocumentsUnlocked {
        /// Language code.
        lang: String,
    },
    /// Documents.
    Documents,
    /// Documents being unlocked.
    DocumentsUnlocking,
    /// Global server values.
    Globals,
    /// Ladder rankings.
    Ladders,
    /// Own ladder entries.
    LaddersMine,
    /// Account data of the logged in user.
    UserData,
}

impl Subscription {
    /// Returns the subscription name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ClientVersions => "meteor_autoupdate_clientVersions",
            Self::LoginServiceConfiguration => "meteor.loginServiceConfiguration",
            Self::IntercomHash => "intercomHash",
            Self::I18n { .. } => "i18n",
            Self::LatestUniverseChats => "latestUniversChats",
            Self::LatestTellChats => "latestTellChats",
            Self::LatestGuildChats { .. } => "latestGuildChats",
            Self::NextEvents => "nextEvents",
            Self::DocumentsUnlocked { .. } => "documentsUnlocked",
            Self::Documents => "documents",
            Self::DocumentsUnlocking => "documentsUnlocking",
            Self::Globals => "globals",
            Self::Ladders => "ladders",
            Self::LaddersMine => "laddersMine",
            Self::UserData => "userData",
        }
    }

    /// Returns the subscription parameters.
    #[must_use]
    pub fn params(&self) -> Vec<Value> {
        match self {
            Self::I18n { lang } => vec![json!(lang)],
            Self::LatestGuildChats { guild_id } => vec![json!(guild_id)],
            Self::DocumentsUnlocked { lang } => vec![json!(lang), Value::Null],
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Method
// ============================================================================

/// Remote methods the client can call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// Authenticate a game account.
    Login {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
        /// Interface language.
        lang: String,
    },
    /// End the authenticated session.
    Logout,
    /// Post to a chat channel.
    Chat {
        /// Channel identifier.
        channel: String,
        /// Message text.
        text: String,
    },
    /// Mark the user idle.
    UserStatusIdle {
        /// Connection timestamp in epoch milliseconds.
        timestamp: u64,
    },
    /// Mark the user active.
    UserStatusActive {
        /// Connection timestamp in epoch milliseconds.
        timestamp: u64,
    },
}

impl Method {
    /// Returns the method name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Chat { .. } => "chat",
            Self::UserStatusIdle { .. } => "user-status-idle",
            Self::UserStatusActive { .. } => "user-status-active",
        }
    }

    /// Returns the method parameters.
    #[must_use]
    pub fn params(&self) -> Vec<Value> {
        match self {
            Self::Login {
                username,
                password,
                lang,
            } => vec![json!({
                "ryzom": true,
                "username": username,
                "password": password,
                "lang": lang,
            })],
            Self::Logout => Vec::new(),
            Self::Chat { channel, text } => vec![json!(channel), json!(text)],
            Self::UserStatusIdle { timestamp } | Self::UserStatusActive { timestamp } => {
                vec![json!(timestamp)]
            }
        }
    }
}

// Credentials stay out of logs.
impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_ids() {
        assert_eq!(Chat::Universe.id(), "all");
        assert_eq!(Chat::English.id(), "en");
        assert_eq!(Chat::German.id(), "de");
        assert_eq!(Chat::French.id(), "fr");
        assert_eq!(Chat::German.to_string(), "de");
    }

    #[test]
    fn test_subscription_params() {
        assert!(Subscription::UserData.params().is_empty());
        assert_eq!(
            Subscription::LatestGuildChats { guild_id: 0 }.params(),
            vec![json!(0)]
        );
        assert_eq!(
            Subscription::DocumentsUnlocked { lang: "en".into() }.params(),
            vec![json!("en"), Value::Null]
        );
    }

    #[test]
    fn test_login_params() {
        let method = Method::Login {
            username: "the-user-name".into(),
            password: "the-user-passwd".into(),
            lang: "en".into(),
        };
        assert_eq!(method.name(), "login");
        assert_eq!(
            method.params(),
            vec![json!({
                "ryzom": true,
                "username": "the-user-name",
                "password": "the-user-passwd",
                "lang": "en"
            })]
        );
        assert_eq!(method.to_string(), "login");
    }

    #[test]
    fn test_chat_params() {
        let method = Method::Chat {
            channel: CHAT_TELL.into(),
            text: "Kopeas bubu".into(),
        };
        assert_eq!(method.params(), vec![json!("tell"), json!("Kopeas bubu")]);
    }

    #[test]
    fn test_status_params() {
        let method = Method::UserStatusActive {
            timestamp: 1436980809850,
        };
        assert_eq!(method.name(), "user-status-active");
        assert_eq!(method.params(), vec![json!(1436980809850u64)]);
    }
}
