//! Line-oriented commands for driving a page from a terminal.

use anyhow::{Context, Result, bail};
use page_model::Surface;

use crate::events::PageInput;

pub const HELP: &str = "\
commands:
  next | n            show the next slide
  prev | p            show the previous slide
  dot N               jump to slide N (1-based, as on the counter)
  swipe DX            touch drag of DX pixels (negative = left)
  scroll Y            scroll the page to Y pixels
  click SELECTOR      click the first element matching SELECTOR
  help                print this list
  quit                stop the page";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand<E> {
    Inputs(Vec<PageInput<E>>),
    Help,
    Quit,
}

/// Parses one console line. Blank lines yield `None`.
pub fn parse_line<S: Surface>(line: &str, surface: &S) -> Result<Option<ConsoleCommand<S::Element>>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let inputs = match word.to_ascii_lowercase().as_str() {
        "next" | "n" => vec![PageInput::Next],
        "prev" | "previous" | "p" => vec![PageInput::Previous],
        "dot" => {
            let n: usize = rest
                .parse()
                .with_context(|| format!("`dot` expects a slide number, got {rest:?}"))?;
            if n == 0 {
                bail!("slide numbers start at 1");
            }
            vec![PageInput::GoTo(n - 1)]
        }
        "swipe" => {
            let dx: f64 = rest
                .parse()
                .with_context(|| format!("`swipe` expects a pixel distance, got {rest:?}"))?;
            vec![
                PageInput::TouchStart { screen_x: 0.0 },
                PageInput::TouchEnd { screen_x: dx },
            ]
        }
        "scroll" => {
            let scroll_y: f64 = rest
                .parse()
                .with_context(|| format!("`scroll` expects a pixel offset, got {rest:?}"))?;
            vec![PageInput::Scroll { scroll_y }]
        }
        "click" => {
            if rest.is_empty() {
                bail!("`click` expects a selector");
            }
            match surface.query(None, rest) {
                Some(target) => vec![PageInput::Click(target)],
                None => bail!("no element matches {rest:?}"),
            }
        }
        "help" | "?" => return Ok(Some(ConsoleCommand::Help)),
        "quit" | "exit" | "q" => return Ok(Some(ConsoleCommand::Quit)),
        other => bail!("unknown command {other:?}; try `help`"),
    };
    Ok(Some(ConsoleCommand::Inputs(inputs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::{Document, PageDescription};

    fn doc() -> Document {
        PageDescription::default().build()
    }

    #[test]
    fn parses_navigation_commands() {
        let doc = doc();
        assert_eq!(
            parse_line("next", &doc).unwrap(),
            Some(ConsoleCommand::Inputs(vec![PageInput::Next]))
        );
        assert_eq!(
            parse_line("  PREV ", &doc).unwrap(),
            Some(ConsoleCommand::Inputs(vec![PageInput::Previous]))
        );
        assert_eq!(
            parse_line("dot 3", &doc).unwrap(),
            Some(ConsoleCommand::Inputs(vec![PageInput::GoTo(2)]))
        );
        assert_eq!(parse_line("", &doc).unwrap(), None);
        assert_eq!(parse_line("quit", &doc).unwrap(), Some(ConsoleCommand::Quit));
    }

    #[test]
    fn swipe_expands_to_touch_pair() {
        let doc = doc();
        assert_eq!(
            parse_line("swipe -60", &doc).unwrap(),
            Some(ConsoleCommand::Inputs(vec![
                PageInput::TouchStart { screen_x: 0.0 },
                PageInput::TouchEnd { screen_x: -60.0 },
            ]))
        );
    }

    #[test]
    fn click_resolves_selector() {
        let doc = doc();
        let toggle = doc.query(None, ".mobile-menu-toggle").unwrap();
        assert_eq!(
            parse_line("click .mobile-menu-toggle", &doc).unwrap(),
            Some(ConsoleCommand::Inputs(vec![PageInput::Click(toggle)]))
        );
        assert!(parse_line("click .does-not-exist", &doc).is_err());
        assert!(parse_line("click", &doc).is_err());
    }

    #[test]
    fn rejects_malformed_lines() {
        let doc = doc();
        for line in ["dot", "dot 0", "dot two", "swipe far", "scroll", "jump 3"] {
            assert!(parse_line(line, &doc).is_err(), "{line} should be rejected");
        }
    }
}
