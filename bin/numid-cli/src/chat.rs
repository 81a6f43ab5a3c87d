//! Interactive chat loop over the locally stored sessions.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use numid_session::{KeyValueStorage, SessionList, SessionStore};
use numid_types::{Attachment, Message, Role, Session};

use crate::attach;
use crate::client::ApiClient;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Message(String),
    New,
    List,
    Switch(String),
    Delete(String),
    Attach(PathBuf),
    Help,
    Quit,
    Empty,
    /// A `/command` that is unknown or missing its argument.
    Invalid(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_owned());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("new", _) => Input::New,
        ("list", _) => Input::List,
        ("quit" | "exit", _) => Input::Quit,
        ("help", _) => Input::Help,
        ("switch", id) if !id.is_empty() => Input::Switch(id.to_owned()),
        ("delete", id) if !id.is_empty() => Input::Delete(id.to_owned()),
        ("attach", path) if !path.is_empty() => Input::Attach(PathBuf::from(path)),
        _ => Input::Invalid(line.to_owned()),
    }
}

const HELP: &str = "/new  /list  /switch <id>  /delete <id>  /attach <image>  /quit";

pub struct ChatLoop<S> {
    client: ApiClient,
    store: SessionStore<S>,
    list: SessionList,
    pending: Option<Attachment>,
}

impl<S: KeyValueStorage> ChatLoop<S> {
    pub fn new(client: ApiClient, store: SessionStore<S>) -> Self {
        let list = SessionList::open(store.load());
        store.save(list.sessions());
        Self { client, store, list, pending: None }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        println!("{}", format!("numid chat · model {}", self.client.model()).cyan().bold());
        println!("{}", HELP.dimmed());
        if let Some(session) = self.list.active() {
            print_transcript(session);
        }

        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("{} ", "You:".cyan().bold());
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!();
                break;
            }

            match parse_input(&line) {
                Input::Empty => {}
                Input::Quit => break,
                Input::Help => println!("{}", HELP.dimmed()),
                Input::New => {
                    let id = self.list.new_session().id.clone();
                    self.save();
                    println!("{}", format!("started session {id}").dimmed());
                }
                Input::List => print_sessions(&self.list),
                Input::Switch(id) => {
                    if self.list.select(&id) {
                        if let Some(session) = self.list.active() {
                            print_transcript(session);
                        }
                    } else {
                        println!("{}", format!("no session {id}").red());
                    }
                }
                Input::Delete(id) => {
                    if self.list.delete(&id) {
                        self.save();
                        println!("{}", format!("deleted session {id}").dimmed());
                    } else {
                        println!("{}", format!("no session {id}").red());
                    }
                }
                Input::Attach(path) => match attach::load(&path) {
                    Ok(attachment) => {
                        self.pending = Some(attachment);
                        println!("{}", format!("attached {} to the next message", path.display()).dimmed());
                    }
                    Err(e) => println!("{}", format!("{e:#}").red()),
                },
                Input::Invalid(text) => println!("{}", format!("unknown command: {text}  ({HELP})").red()),
                Input::Message(text) => self.turn(text).await?,
            }
        }

        Ok(())
    }

    /// Send one user message and record the reply, or the error, as the
    /// assistant's answer.
    async fn turn(&mut self, text: String) -> io::Result<()> {
        let mut message = Message::user(text);
        if let Some(attachment) = self.pending.take() {
            message = message.with_attachment(attachment);
        }
        self.list.push(message);
        self.save();

        let messages = self.list.active().map(|s| s.messages.clone()).unwrap_or_default();

        println!("{}", "Assistant:".green().bold());
        let mut streamed = false;
        let result = self
            .client
            .send(&messages, |fragment| {
                streamed = true;
                print!("{fragment}");
                let _ = io::stdout().flush();
            })
            .await;

        match result {
            Ok(reply) => {
                if !streamed {
                    print!("{reply}");
                }
                println!();
                self.list.set_reply(reply);
            }
            Err(e) => {
                if streamed {
                    println!();
                }
                println!("{}", format!("Error: {e}").red());
                self.list.set_reply(format!("Error: {e}"));
            }
        }
        println!();
        self.save();
        io::stdout().flush()
    }

    fn save(&self) {
        self.store.save(self.list.sessions());
    }
}

pub fn print_sessions(list: &SessionList) {
    let active = list.active_id();
    for session in list.sessions() {
        let marker = if Some(session.id.as_str()) == active { "*" } else { " " };
        println!(
            "{marker} {}  {}  {}",
            session.id.yellow(),
            session.title,
            format!("({} messages)", session.messages.len()).dimmed()
        );
    }
}

fn print_transcript(session: &Session) {
    println!("{}", format!("── {} ({})", session.title, session.id).dimmed());
    for message in &session.messages {
        let label = match message.role {
            Role::User => "You:".cyan().bold(),
            Role::Assistant => "Assistant:".green().bold(),
            Role::System | Role::Function => message.role.as_str().dimmed(),
        };
        let attached = if message.attachment.is_some() { " [image]" } else { "" };
        println!("{label} {}{}", message.content, attached.dimmed());
    }
}
