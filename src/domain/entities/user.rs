use std::fmt;

/// A chat participant as seen on the wire: `nick!host`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub nick: String,
    pub host: String,
}

impl User {
    pub fn new(nick: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            host: host.into(),
        }
    }

    /// Split a `nick!host` prefix. A prefix without `!` is treated as a bare
    /// nick with an empty host.
    pub fn parse(prefix: &str) -> Self {
        match prefix.split_once('!') {
            Some((nick, host)) => Self::new(nick, host),
            None => Self::new(prefix, ""),
        }
    }

    /// The composite `nick!host` identifier used by role tables
    pub fn mask(&self) -> String {
        format!("{}!{}", self.nick, self.host)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_prefix() {
        let user = User::parse("zk!is@whatit.is");
        assert_eq!(user.nick, "zk");
        assert_eq!(user.host, "is@whatit.is");
        assert_eq!(user.mask(), "zk!is@whatit.is");
    }

    #[test]
    fn bare_nick_has_empty_host() {
        let user = User::parse("zk");
        assert_eq!(user.nick, "zk");
        assert!(user.host.is_empty());
    }
}
