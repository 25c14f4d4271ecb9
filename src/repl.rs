use crate::engine::Engine;
use crate::parser::display_width;
use crate::runtime::constants::{LANGUAGE_VERSION, WORD_BITS};

use std::io::{self, stdin, stdout, Write};

use termion::event::{Event, Key};
use termion::input::TermRead;
use termion::raw::IntoRawMode;
use unicode_segmentation::UnicodeSegmentation;

const PROMPT: &str = "> ";

fn interpret_input(engine: &Engine, input: &str) {
    let trace = match engine.run_source(input) {
        Ok(trace) => trace,
        Err(err) => {
            eprint!("{}", err.render_colored(input));
            return;
        }
    };

    for line in trace.output.iter() {
        println!("{}", line);
    }

    if !trace.status.is_halted() {
        eprintln!("{}", trace.status);
    }
}

/// Line being edited plus the history of submitted lines.
///
/// The cursor is a byte offset that always sits on a grapheme boundary, so
/// one arrow press moves over a whole emoji.
#[derive(Debug, Default)]
struct LineEditor {
    input: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
}

impl LineEditor {
    fn insert(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.snap_cursor();
    }

    fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.input.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    fn left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    fn right(&mut self) {
        if let Some(g) = self.input[self.cursor..].graphemes(true).next() {
            self.cursor += g.len();
        }
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.input.len();
    }

    fn history_up(&mut self) {
        let idx = match self.history_index {
            Some(0) => return,
            Some(idx) => idx - 1,
            None if self.history.is_empty() => return,
            None => self.history.len() - 1,
        };

        self.history_index = Some(idx);
        self.input = self.history[idx].clone();
        self.end();
    }

    fn history_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };

        if idx + 1 < self.history.len() {
            self.history_index = Some(idx + 1);
            self.input = self.history[idx + 1].clone();
        } else {
            self.history_index = None;
            self.input.clear();
        }

        self.end();
    }

    /// Takes the current line, recording it in the history.
    fn submit(&mut self) -> String {
        let line = std::mem::take(&mut self.input);

        self.cursor = 0;
        self.history_index = None;
        self.history.push(line.clone());

        line
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.input[..self.cursor]
            .graphemes(true)
            .next_back()
            .map(|g| self.cursor - g.len())
    }

    // a typed variation selector joins the grapheme before it
    fn snap_cursor(&mut self) {
        let mut pos = 0;

        for g in self.input.graphemes(true) {
            if pos + g.len() > self.cursor {
                break;
            }
            pos += g.len();
        }

        if pos < self.cursor && self.input.is_char_boundary(self.cursor) {
            self.cursor = pos + self.input[pos..].graphemes(true).next().map_or(0, str::len);
        }
    }

    /// Display columns between the cursor and the end of the line.
    fn tail_width(&self) -> usize {
        display_width(&self.input[self.cursor..])
    }
}

fn redraw(stdout: &mut impl Write, editor: &LineEditor) -> io::Result<()> {
    write!(
        stdout,
        "\r{}{}{}",
        termion::clear::CurrentLine,
        PROMPT,
        editor.input
    )?;

    let tail = editor.tail_width();
    if tail > 0 {
        write!(stdout, "{}", termion::cursor::Left(tail as u16))?;
    }

    Ok(())
}

pub fn run_repl(engine: Engine) -> io::Result<()> {
    println!("EmojiASM v{} ({}-bit words)", LANGUAGE_VERSION, WORD_BITS);
    println!("one program per line, ctrl-d to exit");

    let stdin = stdin();
    let mut stdout = stdout().into_raw_mode()?;
    let mut editor = LineEditor::default();

    write!(stdout, "{}", PROMPT)?;
    stdout.flush()?;

    for evt in stdin.events() {
        match evt? {
            Event::Key(Key::Char('\n')) if editor.input.trim().is_empty() => {
                editor.input.clear();
                editor.home();
                write!(stdout, "\r\n{}", PROMPT)?;
            }
            Event::Key(Key::Char('\n')) => {
                write!(stdout, "\r\n")?;
                stdout.flush()?;

                let line = editor.submit();

                stdout.suspend_raw_mode()?;
                interpret_input(&engine, line.as_str());
                stdout.activate_raw_mode()?;

                write!(stdout, "\r\n{}", PROMPT)?;
            }
            Event::Key(Key::Ctrl('c')) | Event::Key(Key::Ctrl('d')) => {
                write!(stdout, "\r\nExiting REPL\r\n")?;
                break;
            }
            Event::Key(key) => {
                match key {
                    Key::Up => editor.history_up(),
                    Key::Down => editor.history_down(),
                    Key::Left => editor.left(),
                    Key::Right => editor.right(),
                    Key::Home | Key::Ctrl('a') => editor.home(),
                    Key::End | Key::Ctrl('e') => editor.end(),
                    Key::Backspace => editor.backspace(),
                    Key::Char(c) => editor.insert(c),
                    _ => continue,
                }

                redraw(&mut stdout, &editor)?;
            }
            _ => {}
        }

        stdout.flush()?;
    }

    Ok(())
}
