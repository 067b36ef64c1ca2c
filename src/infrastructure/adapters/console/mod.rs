//! Console adapter for development/testing
//!
//! Stands in for the chat protocol client: stdin lines become occurrences,
//! outbound messages are printed.
//!
//! Input lines:
//! - `text` : message to the console channel
//! - `/me text` : action in the console channel
//! - `/msg text` : private message to the bot
//! - `/as nick!host text` : message to the channel from someone else
//! - `/join #channel`, `/nick newnick`

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::domain::entities::{Occurrence, User};
use crate::domain::traits::{EventSource, Outbound};
use crate::infrastructure::config::Config;

/// Prints outbound traffic to stdout and the activity log via `tracing`
pub struct ConsoleOutbound {
    nickname: String,
}

impl ConsoleOutbound {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
        }
    }
}

impl Outbound for ConsoleOutbound {
    fn send_message(&self, target: &str, text: &str) {
        println!("[{}] <{}> {}", target, self.nickname, text);
    }

    fn send_action(&self, target: &str, text: &str) {
        println!("[{}] * {} {}", target, self.nickname, text);
    }

    fn log_line(&self, text: &str) {
        tracing::info!(target: "activity", "{}", text);
    }
}

/// Reads occurrences from a line-oriented reader
pub struct ConsoleSource<R> {
    lines: Lines<R>,
    user: User,
    channel: String,
    nickname: String,
}

impl ConsoleSource<BufReader<Stdin>> {
    pub fn stdin(config: &Config) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), config)
    }
}

impl<R: AsyncBufRead + Unpin> ConsoleSource<R> {
    pub fn new(reader: R, config: &Config) -> Self {
        Self {
            lines: reader.lines(),
            user: User::new(config.console.nick.clone(), config.console.host.clone()),
            channel: config.console.channel.clone(),
            nickname: config.bot.nickname.clone(),
        }
    }

    fn parse_line(&mut self, line: &str) -> Option<Occurrence> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (verb, rest) = match line.strip_prefix('/') {
            Some(cmd) => cmd.split_once(' ').unwrap_or((cmd, "")),
            None => return Some(Occurrence::message(self.user.clone(), self.channel.clone(), line)),
        };
        let rest = rest.trim();

        match verb {
            "me" => Some(Occurrence::action(self.user.clone(), self.channel.clone(), rest)),
            "msg" => Some(Occurrence::message(self.user.clone(), self.nickname.clone(), rest)),
            "as" => {
                let (mask, text) = rest.split_once(' ')?;
                Some(Occurrence::message(User::parse(mask), self.channel.clone(), text.trim()))
            }
            "join" if !rest.is_empty() => {
                self.channel = rest.to_string();
                Some(Occurrence::Joined {
                    user: self.user.clone(),
                    channel: self.channel.clone(),
                })
            }
            "nick" if !rest.is_empty() => {
                let old = std::mem::replace(&mut self.user.nick, rest.to_string());
                Some(Occurrence::NickChanged {
                    old,
                    new: self.user.nick.clone(),
                })
            }
            _ => {
                tracing::warn!("Unknown console command: /{}", verb);
                None
            }
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for ConsoleSource<R> {
    async fn next_occurrence(&mut self) -> Option<Occurrence> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(occurrence) = self.parse_line(&line) {
                        return Some(occurrence);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!("Console read failed: {}", e);
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn activity_lines_carry_their_target() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            ConsoleOutbound::new("chii").log_line("<zk> .say hi");
        });

        let out = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("activity: <zk> .say hi"), "{}", out);
    }

    async fn drain(input: &'static str) -> Vec<Occurrence> {
        let mut source = ConsoleSource::new(input.as_bytes(), &Config::default());
        let mut out = Vec::new();
        while let Some(occurrence) = source.next_occurrence().await {
            out.push(occurrence);
        }
        out
    }

    #[tokio::test]
    async fn plain_lines_go_to_the_channel() {
        let got = drain("hello there\n\n").await;
        assert_eq!(
            got,
            vec![Occurrence::message(
                User::new("console", "console@localhost"),
                "#console",
                "hello there"
            )]
        );
    }

    #[tokio::test]
    async fn slash_commands() {
        let got = drain("/me waves\n/msg .help\n/as zk!is@whatit.is .reload\n/join #chii\n/nick zk2\n/bogus\n").await;
        let kinds: Vec<_> = got.iter().map(Occurrence::kind).collect();
        assert_eq!(kinds, vec!["action", "message", "message", "joined", "nick"]);

        assert!(matches!(&got[1], Occurrence::Message { target, .. } if target == "chii"));
        assert!(matches!(&got[2], Occurrence::Message { sender, .. } if sender.nick == "zk"));
        assert!(matches!(&got[4], Occurrence::NickChanged { old, new } if old == "console" && new == "zk2"));
    }
}
