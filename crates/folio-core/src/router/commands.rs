//! Prefix commands answered without touching the review pipeline.

pub const PONG: &str = "Pong! Bot is alive.";

const HELP_TEXT: &str = "\
**How to use this bot**\n\
\n\
📄 **Résumé or portfolio PDF**: upload the file in this channel and I will read it, \
work out whether it is a résumé or a portfolio, and reply with feedback.\n\
🔗 **Portfolio website**: paste a link (`https://...`) and I will screenshot the page \
and review its visual presentation.\n\
\n\
**Commands**\n\
`{prefix}ping` checks that the bot is online.\n\
`{prefix}help` shows this message.\n\
\n\
Reactions show progress: 👀 received, ⚙️ reading, 📸 capturing, 🔍 classifying, \
🤔 reviewing, ✅ done.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Help,
}

impl Command {
    /// Recognise `{prefix}ping` or `{prefix}help` (first word, case-insensitive).
    #[must_use]
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let rest = content.trim().strip_prefix(prefix)?;
        let name = rest.split_whitespace().next()?;
        match name.to_ascii_lowercase().as_str() {
            "ping" => Some(Self::Ping),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    #[must_use]
    pub fn response(self, prefix: &str) -> String {
        match self {
            Self::Ping => PONG.to_owned(),
            Self::Help => HELP_TEXT.replace("{prefix}", prefix),
        }
    }
}
