//! Line-driven interactive session.
//!
//! Each plain input line replaces the search text. Lines starting with `:`
//! are widget events; `::` escapes a literal leading colon.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use lookup_search::{Key, SearchWidget, WidgetEvent};

use crate::presenter::{render_list, ResultPresenter};

pub const HELP: &str = "\
Type a name to search. Commands:
  :down / :up     move the highlight
  :enter          select the highlighted name, or submit the text
  :esc            hide suggestions
  :pick N         select suggestion N (1-based)
  :submit         look up the current text exactly
  :help           show this help
  :quit           leave
";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(WidgetEvent),
    Help,
    Quit,
}

/// Parse a line of interactive input.
pub fn parse_line(line: &str) -> Result<Command, String> {
    if let Some(text) = line.strip_prefix("::") {
        return Ok(Command::Event(WidgetEvent::TextChanged(format!(":{text}"))));
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Command::Event(WidgetEvent::TextChanged(line.to_string())));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let command = match name {
        "down" => Command::Event(WidgetEvent::Key(Key::ArrowDown)),
        "up" => Command::Event(WidgetEvent::Key(Key::ArrowUp)),
        "enter" => Command::Event(WidgetEvent::Key(Key::Enter)),
        "esc" => Command::Event(WidgetEvent::Key(Key::Escape)),
        "submit" => Command::Event(WidgetEvent::Submit),
        "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        "pick" => {
            let n: usize = parts
                .next()
                .ok_or_else(|| "Usage: :pick N".to_string())?
                .parse()
                .map_err(|_| "Usage: :pick N".to_string())?;
            if n == 0 {
                return Err("Suggestions are numbered from 1".to_string());
            }
            Command::Event(WidgetEvent::Activate(n - 1))
        }
        other => return Err(format!("Unknown command :{other} (try :help)")),
    };
    Ok(command)
}

/// Drive `widget` from `input` until EOF or `:quit`, writing to `output`.
pub async fn run_interactive<R, W>(
    widget: SearchWidget,
    presenter: &ResultPresenter,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut list_rx = widget.suggestions();
    let mut result_rx = widget.results();

    output.write_all(HELP.as_bytes()).await?;
    output.flush().await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => output.write_all(HELP.as_bytes()).await?,
                    Ok(Command::Event(event)) => widget.send(event)?,
                    Err(message) => output.write_all(format!("{message}\n").as_bytes()).await?,
                }
            }
            changed = list_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = list_rx.borrow_and_update().clone();
                let rendered = render_list(&state);
                if !rendered.is_empty() {
                    output.write_all(rendered.as_bytes()).await?;
                }
            }
            changed = result_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let result = result_rx.borrow_and_update().clone();
                let shown = presenter.present(&result).await;
                output.write_all(format!("{shown}\n").as_bytes()).await?;
            }
        }
        output.flush().await?;
    }

    debug!("Interactive session ended");
    widget.unmount().await;
    Ok(())
}
