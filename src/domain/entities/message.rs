use super::User;

/// Something the protocol client observed on the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occurrence {
    /// A text message sent to a channel or to the bot directly
    Message { sender: User, target: String, text: String },
    /// A `/me` action
    Action { sender: User, target: String, text: String },
    /// Someone (possibly the bot) joined a channel
    Joined { user: User, channel: String },
    /// Someone changed their nick
    NickChanged { old: String, new: String },
}

impl Occurrence {
    pub fn message(sender: User, target: impl Into<String>, text: impl Into<String>) -> Self {
        Occurrence::Message {
            sender,
            target: target.into(),
            text: text.into(),
        }
    }

    pub fn action(sender: User, target: impl Into<String>, text: impl Into<String>) -> Self {
        Occurrence::Action {
            sender,
            target: target.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Occurrence::Message { .. } => "message",
            Occurrence::Action { .. } => "action",
            Occurrence::Joined { .. } => "joined",
            Occurrence::NickChanged { .. } => "nick",
        }
    }
}

/// Arguments handed to every handler body.
///
/// Commands receive the words after the alias, events their payload
/// (the message text for `msg`), tasks nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub nick: String,
    pub host: String,
    pub target: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(nick: impl Into<String>, host: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            host: host.into(),
            target: target.into(),
            args: Vec::new(),
        }
    }

    pub fn from_user(user: &User, target: impl Into<String>) -> Self {
        Self::new(user.nick.clone(), user.host.clone(), target)
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Positional argument, if present
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.args.get(n).map(String::as_str)
    }

    /// All arguments joined back with single spaces
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}
