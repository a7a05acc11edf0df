use chrono::{DateTime, Utc};
use crossterm::style::Stylize;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use thiserror::Error;

use crate::news::Article;
use crate::util::{single_line, strip_control_chars};

/// Message shown for any unparseable or unknown choice.
pub const INVALID: &str = "Invalid input.";

const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum MenuError {
    /// Standard input reached end-of-file
    #[error("Input closed")]
    InputClosed,
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Line-oriented terminal front end: styled output, prompts, menus.
///
/// Built either on the process's stdin/stdout or on arbitrary reader/writer
/// pairs (scripted sessions in tests). Colors and hidden password entry only
/// apply to the real terminal.
pub struct Console {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    color: bool,
    hide_passwords: bool,
    width: usize,
}

impl Console {
    /// Console on the process's standard streams.
    pub fn stdio(color: bool) -> Self {
        let interactive = io::stdin().is_terminal();
        let width = crossterm::terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(DEFAULT_WIDTH);
        Self {
            input: Box::new(BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
            color: color && io::stdout().is_terminal(),
            hide_passwords: interactive,
            width,
        }
    }

    /// Console reading lines from `input` and writing plain text to `output`.
    pub fn scripted(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            color: false,
            hide_passwords: false,
            width: DEFAULT_WIDTH,
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    pub fn greeting(&mut self) -> Result<(), MenuError> {
        let banner = "|*********************************|\n\
                      | WELCOME TO THE TOP NEWS SEARCH! |\n\
                      |_________________________________|";
        if self.color {
            for line in banner.lines() {
                writeln!(self.output, "{}", line.yellow().on_cyan().bold())?;
            }
        } else {
            writeln!(self.output, "{banner}")?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    pub fn success(&mut self, msg: &str) -> Result<(), MenuError> {
        writeln!(self.output)?;
        if self.color {
            writeln!(self.output, "{}", msg.white().on_green().bold())?;
        } else {
            writeln!(self.output, "{msg}")?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    pub fn error(&mut self, msg: &str) -> Result<(), MenuError> {
        writeln!(self.output)?;
        if self.color {
            writeln!(self.output, "{}", msg.white().on_red().bold())?;
        } else {
            writeln!(self.output, "{msg}")?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    pub fn info(&mut self, msg: &str) -> Result<(), MenuError> {
        writeln!(self.output, "{msg}")?;
        Ok(())
    }

    pub fn highlight(&mut self, msg: &str) -> Result<(), MenuError> {
        writeln!(self.output)?;
        if self.color {
            writeln!(self.output, "{}", msg.yellow().bold())?;
        } else {
            writeln!(self.output, "{msg}")?;
        }
        Ok(())
    }

    /// Print `[1] first`, `[2] second`, ... one row each, cut to the terminal width.
    pub fn numbered<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> Result<(), MenuError> {
        for (i, item) in items.into_iter().enumerate() {
            let label = format!("[{}] ", i + 1);
            let room = self.width.saturating_sub(label.len());
            writeln!(self.output, "{label}{}", single_line(item, room))?;
        }
        Ok(())
    }

    /// Full view of one article.
    pub fn article_details(&mut self, article: &Article) -> Result<(), MenuError> {
        let date = article.published_at.as_deref().map(format_published);
        let fields = [
            ("SOURCE", Some(strip_control_chars(&article.source.name).into_owned())),
            ("TITLE", Some(strip_control_chars(&article.title).into_owned())),
            ("DESCRIPTION", article.description.as_deref().map(|v| strip_control_chars(v).into_owned())),
            ("URL", Some(strip_control_chars(&article.url).into_owned())),
            ("DATE", date),
            ("CONTENT", article.content.as_deref().map(|v| strip_control_chars(v).into_owned())),
        ];
        for (label, value) in fields {
            let value = value.unwrap_or_else(|| "(none)".to_string());
            if self.color {
                writeln!(self.output, "{}: {value}", label.underlined())?;
            } else {
                writeln!(self.output, "{label}: {value}")?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Show a titled menu and return the number of a listed option.
    ///
    /// Anything that is not one of the listed numbers prints [`INVALID`] and
    /// shows the menu again.
    pub fn menu(&mut self, title: &str, options: &[(u32, &str)]) -> Result<u32, MenuError> {
        let entries: Vec<(u32, &str, u32)> = options
            .iter()
            .map(|&(number, label)| (number, label, number))
            .collect();
        self.choose(title, &entries)
    }

    /// Like [`Console::menu`], but returns the value paired with the chosen entry.
    pub fn choose<T: Copy>(&mut self, title: &str, options: &[(u32, &str, T)]) -> Result<T, MenuError> {
        loop {
            writeln!(self.output)?;
            let header = format!(":---------- {title} ----------:");
            if self.color {
                writeln!(self.output, "{}", header.yellow().on_cyan().bold())?;
            } else {
                writeln!(self.output, "{header}")?;
            }
            writeln!(self.output)?;
            for (number, label, _) in options {
                let line = format!("[{number}] {label}");
                if self.color {
                    writeln!(self.output, "{}", line.reverse())?;
                } else {
                    writeln!(self.output, "{line}")?;
                }
            }

            let answer = self.prompt("Choose option")?;
            let picked = answer
                .parse::<u32>()
                .ok()
                .and_then(|choice| options.iter().find(|(n, _, _)| *n == choice));
            match picked {
                Some(&(_, _, value)) => return Ok(value),
                None => self.error(INVALID)?,
            }
        }
    }

    /// Ask for one line of input, trimmed.
    pub fn prompt(&mut self, label: &str) -> Result<String, MenuError> {
        self.write_prompt(label)?;
        Ok(self.read_line()?.trim().to_string())
    }

    /// Ask until a non-blank answer is given.
    pub fn prompt_non_empty(&mut self, label: &str) -> Result<String, MenuError> {
        loop {
            let answer = self.prompt(label)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }

    /// Ask for a password, without echo when attached to a terminal.
    ///
    /// Only the line terminator is removed; surrounding spaces are part of
    /// the password.
    pub fn prompt_password(&mut self, label: &str) -> Result<String, MenuError> {
        if self.hide_passwords {
            self.output.flush()?;
            return match rpassword::prompt_password(format!("{label}: ")) {
                Ok(password) => Ok(password),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(MenuError::InputClosed),
                Err(e) => Err(e.into()),
            };
        }
        self.write_prompt(label)?;
        self.read_line()
    }

    fn write_prompt(&mut self, label: &str) -> Result<(), MenuError> {
        if self.color {
            write!(self.output, "{}", format!("{label}: ").yellow().bold())?;
        } else {
            write!(self.output, "{label}: ")?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, MenuError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MenuError::InputClosed);
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(line)
    }
}

/// `2024-01-15T10:30:00Z` → `2024-01-15 10:30 UTC`; anything unparseable is
/// shown as received.
pub(crate) fn format_published(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(_) => strip_control_chars(raw).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::ArticleSource;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn scripted(input: &str) -> (Console, Captured) {
        let out = Captured::default();
        let console = Console::scripted(Cursor::new(input.to_string()), out.clone());
        (console, out)
    }

    #[test]
    fn test_menu_returns_listed_choice() {
        let (mut console, out) = scripted("2\n");
        let choice = console.menu("MENU", &[(1, "One"), (2, "Two"), (0, "Quit")]).unwrap();
        assert_eq!(choice, 2);
        let text = out.text();
        assert!(text.contains(":---------- MENU ----------:"));
        assert!(text.contains("[2] Two"));
    }

    #[test]
    fn test_menu_reprompts_on_bad_input() {
        let (mut console, out) = scripted("abc\n7\n\n 0 \n");
        let choice = console.menu("MENU", &[(1, "One"), (0, "Quit")]).unwrap();
        assert_eq!(choice, 0);
        assert_eq!(out.text().matches(INVALID).count(), 3);
    }

    #[test]
    fn test_choose_returns_paired_value() {
        let (mut console, out) = scripted("3\n2\n");
        let picked = console
            .choose("MENU", &[(1, "One", 'a'), (2, "Two", 'b'), (0, "Quit", 'q')])
            .unwrap();
        assert_eq!(picked, 'b');
        assert_eq!(out.text().matches(INVALID).count(), 1);
    }

    #[test]
    fn test_eof_is_input_closed() {
        let (mut empty, _) = scripted("");
        assert!(matches!(empty.prompt("x"), Err(MenuError::InputClosed)));
        let (mut junk, _) = scripted("junk\n");
        assert!(matches!(
            junk.menu("M", &[(0, "Quit")]),
            Err(MenuError::InputClosed)
        ));
    }

    #[test]
    fn test_prompt_non_empty_skips_blank_lines() {
        let (mut console, _) = scripted("\n   \nbitcoin\n");
        assert_eq!(console.prompt_non_empty("Enter a term").unwrap(), "bitcoin");
    }

    #[test]
    fn test_password_keeps_spaces() {
        let (mut console, _) = scripted(" pass word \r\n");
        assert_eq!(console.prompt_password("Enter password").unwrap(), " pass word ");
    }

    #[test]
    fn test_numbered_list() {
        let (mut console, out) = scripted("");
        console.numbered(["First", "Second\nline"]).unwrap();
        assert_eq!(out.text(), "[1] First\n[2] Second line\n");
    }

    #[test]
    fn test_article_details() {
        let article = Article {
            source: ArticleSource { id: None, name: "Wire".to_string() },
            title: "Evil \x1b]0;title\x07headline".to_string(),
            description: None,
            url: "https://example.com/a".to_string(),
            published_at: Some("2024-01-15T10:30:00+02:00".to_string()),
            content: Some("Body".to_string()),
            extra: Default::default(),
        };
        let (mut console, out) = scripted("");
        console.article_details(&article).unwrap();
        let text = out.text();
        assert!(text.contains("SOURCE: Wire\n"));
        assert!(text.contains("TITLE: Evil headline\n"));
        assert!(text.contains("DESCRIPTION: (none)\n"));
        assert!(text.contains("DATE: 2024-01-15 08:30 UTC\n"));
        assert!(text.contains("URL: https://example.com/a\n"));
        assert!(text.contains("CONTENT: Body\n"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_format_published_fallback() {
        assert_eq!(format_published("2024-01-15T10:30:00Z"), "2024-01-15 10:30 UTC");
        assert_eq!(format_published("yesterday"), "yesterday");
    }
}
