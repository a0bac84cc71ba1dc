// Interactive terminal chat. Same routing as the Web UI, with the map
// rendered as coordinates plus an OpenStreetMap link.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::info;

use crate::constants;
use crate::router::{AssistantReply, IntentRouter};
use crate::transcript::Transcript;

const QUIT_COMMAND: &str = "/quit";

/// Ask for the API key on stdin. Input is masked when stdin is a terminal.
pub fn prompt_credential() -> Result<String> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", constants::CREDENTIAL_PROMPT)?;
    stdout.flush()?;

    if !stdin.is_terminal() {
        let mut line = String::new();
        stdin.read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    terminal::enable_raw_mode().context("Failed to enable raw terminal mode")?;
    let secret = read_masked(&mut stdout);
    terminal::disable_raw_mode().context("Failed to restore terminal mode")?;
    writeln!(stdout)?;
    secret
}

fn read_masked(out: &mut impl Write) -> Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => break,
            (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                secret.clear();
                break;
            }
            (KeyCode::Backspace, _) => {
                if secret.pop().is_some() {
                    write!(out, "\x08 \x08")?;
                }
            }
            (KeyCode::Char(c), _) => {
                secret.push(c);
                write!(out, "*")?;
            }
            _ => {}
        }
        out.flush()?;
    }
    Ok(secret)
}

/// Format a reply for the terminal, including the map as text when present.
pub fn render_reply(reply: &AssistantReply) -> String {
    let mut rendered = reply.display();
    if let Some(map) = &reply.map {
        rendered.push_str(&format!(
            "\n🗺️  {} ({:.4}, {:.4}) {}",
            map.marker.label,
            map.center.latitude,
            map.center.longitude,
            map.openstreetmap_url()
        ));
    }
    rendered
}

/// Run a chat session until EOF or `/quit`, returning the session transcript.
///
/// An empty credential ends the session immediately with an info message and
/// no requests made.
pub async fn run_session<R: BufRead, W: Write>(
    router: &IntentRouter,
    credential: &str,
    mut input: R,
    mut output: W,
) -> Result<Transcript> {
    let mut transcript = Transcript::new();

    if credential.is_empty() {
        writeln!(output, "🔐 {}", constants::MISSING_CREDENTIAL_INFO)?;
        return Ok(transcript);
    }

    writeln!(output, "{}", constants::APP_TITLE)?;
    writeln!(output, "{} (type {} to exit)", constants::CHAT_PLACEHOLDER, QUIT_COMMAND)?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim_end_matches(['\r', '\n']);
        if message.trim().is_empty() {
            continue;
        }
        if message.trim() == QUIT_COMMAND {
            break;
        }

        let reply = router.handle_turn(&mut transcript, message, credential).await?;
        writeln!(output, "{}\n", render_reply(&reply))?;
    }

    info!(turns = transcript.len() / 2, "Chat session finished");
    Ok(transcript)
}
