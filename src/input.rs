use crate::app::UiEvent;
use crate::errors::CommandError;
use crate::models::{PairSource, TradingMode, Venue};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use tokio::sync::mpsc;

pub const HELP: &str = "type a command and press Enter (Esc clears, Ctrl+C quits): symbol <PAIR> | pick <term> | \
search [term] | mode mx|lbank|toggle | pairs common|custom | custom mx|lbank <PAIR> | retry | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ui(UiEvent),
    Help,
    /// The terminal was resized.
    Redraw,
    Quit,
}

/// Parses one submitted command line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let ui = |ev: UiEvent| Ok(Some(Command::Ui(ev)));

    match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("quit" | "exit" | "q", []) => Ok(Some(Command::Quit)),
        ("help" | "?", []) => Ok(Some(Command::Help)),
        ("symbol", [pair]) => ui(UiEvent::SymbolRequested {
            symbol: pair.to_uppercase(),
        }),
        ("symbol", _) => Err(CommandError::Usage("symbol <PAIR>")),
        ("pick", [term]) => ui(UiEvent::PickFirstMatch {
            term: term.to_string(),
        }),
        ("pick", _) => Err(CommandError::Usage("pick <term>")),
        ("search", []) => ui(UiEvent::SearchChanged { term: String::new() }),
        ("search", [term]) => ui(UiEvent::SearchChanged {
            term: term.to_string(),
        }),
        ("search", _) => Err(CommandError::Usage("search [term]")),
        ("mode", ["toggle"]) => ui(UiEvent::ModeToggled),
        ("mode", [m]) => match TradingMode::parse(m) {
            Some(mode) => ui(UiEvent::ModeChanged { mode }),
            None => Err(CommandError::Usage("mode mx|lbank|toggle")),
        },
        ("mode", _) => Err(CommandError::Usage("mode mx|lbank|toggle")),
        ("pairs", ["common"]) => ui(UiEvent::PairSourceChanged {
            source: PairSource::Common,
        }),
        ("pairs", ["custom"]) => ui(UiEvent::PairSourceChanged {
            source: PairSource::Custom,
        }),
        ("pairs", _) => Err(CommandError::Usage("pairs common|custom")),
        ("custom", [venue, pair]) => {
            let venue = match venue.to_ascii_lowercase().as_str() {
                "mx" => Venue::Mx,
                "lbank" => Venue::Lbank,
                _ => return Err(CommandError::Usage("custom mx|lbank <PAIR>")),
            };
            ui(UiEvent::CustomSymbolPicked {
                venue,
                symbol: pair.to_string(),
            })
        }
        ("custom", _) => Err(CommandError::Usage("custom mx|lbank <PAIR>")),
        ("retry", []) => ui(UiEvent::RetryCustomLists),
        _ => Err(CommandError::Unknown(line.trim().to_string())),
    }
}

/// The line being typed at the bottom of the dashboard.
#[derive(Debug, Default)]
pub struct CommandLine {
    text: String,
}

impl CommandLine {
    /// Applies one key press. Edits echo the new text; Enter submits it.
    pub fn on_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => vec![Command::Quit],
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.text);
                let mut commands = vec![self.edited()];
                match parse_command(&line) {
                    Ok(Some(command)) => commands.push(command),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("[input] {e}");
                        commands.push(Command::Ui(UiEvent::Notice { text: e.to_string() }));
                    }
                }
                commands
            }
            KeyCode::Backspace => match self.text.pop() {
                Some(_) => vec![self.edited()],
                None => Vec::new(),
            },
            KeyCode::Esc => {
                if self.text.is_empty() {
                    return Vec::new();
                }
                self.text.clear();
                vec![self.edited()]
            }
            KeyCode::Char(c) if !ctrl => {
                self.text.push(c);
                vec![self.edited()]
            }
            _ => Vec::new(),
        }
    }

    fn edited(&self) -> Command {
        Command::Ui(UiEvent::CommandLineEdited {
            text: self.text.clone(),
        })
    }
}

/// Turns terminal key and resize events into commands until the runtime
/// stops listening.
pub fn spawn_key_reader(commands: mpsc::Sender<Command>) {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        let mut line = CommandLine::default();

        while let Some(event) = events.next().await {
            let batch = match event {
                Ok(Event::Key(key)) => line.on_key(key),
                Ok(Event::Resize(..)) => vec![Command::Redraw],
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("[input] failed to read terminal events: {e}");
                    break;
                }
            };

            for command in batch {
                if commands.send(command).await.is_err() {
                    return;
                }
            }
        }
        tracing::debug!("[input] key reader stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui(line: &str) -> UiEvent {
        match parse_command(line) {
            Ok(Some(Command::Ui(ev))) => ev,
            other => panic!("{line:?} parsed as {other:?}"),
        }
    }

    #[test]
    fn parses_selection_commands() {
        assert_eq!(
            ui("symbol eth/usdt"),
            UiEvent::SymbolRequested { symbol: "ETH/USDT".into() }
        );
        assert_eq!(ui("pick sol"), UiEvent::PickFirstMatch { term: "sol".into() });
        assert_eq!(ui("mode toggle"), UiEvent::ModeToggled);
        assert_eq!(
            ui("mode lbank"),
            UiEvent::ModeChanged { mode: TradingMode::LbankBuyMxSell }
        );
        assert_eq!(ui("search"), UiEvent::SearchChanged { term: String::new() });
    }

    #[test]
    fn parses_custom_pair_commands() {
        assert_eq!(
            ui("pairs custom"),
            UiEvent::PairSourceChanged { source: PairSource::Custom }
        );
        assert_eq!(
            ui("custom LBank btc_usdt"),
            UiEvent::CustomSymbolPicked { venue: Venue::Lbank, symbol: "btc_usdt".into() }
        );
        assert_eq!(ui("retry"), UiEvent::RetryCustomLists);
    }

    #[test]
    fn control_commands_and_blanks() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("help"), Ok(Some(Command::Help)));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_command("symbol"), Err(CommandError::Usage("symbol <PAIR>")));
        assert_eq!(parse_command("mode up"), Err(CommandError::Usage("mode mx|lbank|toggle")));
        assert_eq!(parse_command("custom okx BTC"), Err(CommandError::Usage("custom mx|lbank <PAIR>")));
        assert!(matches!(parse_command("dance"), Err(CommandError::Unknown(_))));
    }

    fn press(line: &mut CommandLine, code: KeyCode) -> Vec<Command> {
        line.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn edited(text: &str) -> Command {
        Command::Ui(UiEvent::CommandLineEdited { text: text.to_string() })
    }

    #[test]
    fn typing_echoes_and_enter_submits() {
        let mut line = CommandLine::default();
        let mut echoed = Vec::new();
        for c in "mode toggle".chars() {
            echoed.extend(press(&mut line, KeyCode::Char(c)));
        }
        assert_eq!(echoed.last(), Some(&edited("mode toggle")));

        assert_eq!(
            press(&mut line, KeyCode::Enter),
            vec![edited(""), Command::Ui(UiEvent::ModeToggled)]
        );
        // Nothing left to submit
        assert_eq!(press(&mut line, KeyCode::Enter), vec![edited("")]);
    }

    #[test]
    fn editing_keys() {
        let mut line = CommandLine::default();
        assert!(press(&mut line, KeyCode::Backspace).is_empty());
        assert!(press(&mut line, KeyCode::Esc).is_empty());

        press(&mut line, KeyCode::Char('q'));
        press(&mut line, KeyCode::Char('x'));
        assert_eq!(press(&mut line, KeyCode::Backspace), vec![edited("q")]);
        assert_eq!(press(&mut line, KeyCode::Esc), vec![edited("")]);
        assert!(press(&mut line, KeyCode::Left).is_empty());
    }

    #[test]
    fn bad_command_becomes_notice() {
        let mut line = CommandLine::default();
        for c in "dance".chars() {
            press(&mut line, KeyCode::Char(c));
        }
        let out = press(&mut line, KeyCode::Enter);
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[1], Command::Ui(UiEvent::Notice { text }) if text.contains("unknown command")));
    }

    #[test]
    fn ctrl_c_quits_and_releases_are_ignored() {
        let mut line = CommandLine::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(line.on_key(ctrl_c), vec![Command::Quit]);

        let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(line.on_key(release).is_empty());
    }
}
