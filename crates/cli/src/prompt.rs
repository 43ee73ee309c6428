use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

use decomprove_core::InteractiveCaller;

use crate::clipboard::{ClipboardSink, SystemClipboard};

/// Line-oriented dialog over any reader/writer pair (stdin/stdout in the
/// binary, in-memory buffers in tests).
///
/// End of input counts as declining the current prompt.
pub struct TerminalCaller<R, W> {
    input: R,
    output: W,
    clipboard: Box<dyn ClipboardSink>,
}

impl<R: BufRead, W: Write> TerminalCaller<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self::with_clipboard(input, output, Box::new(SystemClipboard::new()))
    }

    pub fn with_clipboard(input: R, output: W, clipboard: Box<dyn ClipboardSink>) -> Self {
        Self { input, output, clipboard }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, args: fmt::Arguments<'_>) {
        // The dialog has nowhere else to report a broken terminal.
        if let Err(e) = self.output.write_fmt(args).and_then(|_| self.output.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    /// Read one line without its line ending; `None` at end of input.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read from terminal");
                None
            }
        }
    }

    fn ask(&mut self, prompt: fmt::Arguments<'_>) -> Option<String> {
        self.say(prompt);
        self.read_line()
    }
}

impl<R: BufRead, W: Write> InteractiveCaller for TerminalCaller<R, W> {
    fn ask_output_folder(&mut self, default_folder: &Path) -> Option<String> {
        self.ask(format_args!(
            "Enter the folder path to save improved code (default: {}): ",
            default_folder.display()
        ))
    }

    fn choose_function(&mut self, choices: &[String]) -> Option<String> {
        self.say(format_args!("Choose a function to improve:\n"));
        for (idx, choice) in choices.iter().enumerate() {
            self.say(format_args!("  {:>3}. {}\n", idx + 1, choice));
        }
        loop {
            let answer = self.ask(format_args!("Selection [1, q to cancel]: "))?;
            let answer = answer.trim();
            if answer.is_empty() {
                return choices.first().cloned();
            }
            if answer.eq_ignore_ascii_case("q") {
                return None;
            }
            if let Some(choice) = pick_choice(choices, answer) {
                return Some(choice.clone());
            }
            self.say(format_args!("Unknown selection '{answer}'.\n"));
        }
    }

    fn confirm_add_comments(&mut self) -> bool {
        self.ask(format_args!("Do you want to add comments to explain the code? [y/N]: "))
            .map(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn ask_file_name(&mut self, default_name: &str) -> Option<String> {
        self.ask(format_args!("Enter a file name or use the default name [{default_name}]: "))
    }

    fn present(&mut self, code: &str) {
        self.say(format_args!("\n===== Improved Code =====\n{code}\n=========================\n"));
        loop {
            let Some(answer) = self.ask(format_args!("[c] Copy  [Enter] Close: ")) else {
                return;
            };
            if !answer.trim().eq_ignore_ascii_case("c") {
                return;
            }
            match self.clipboard.copy(code) {
                Ok(()) => {
                    tracing::info!("code copied to clipboard");
                    self.say(format_args!("Code copied to clipboard.\n"));
                }
                Err(e) => self.say(format_args!("Copy failed: {e:#}\n")),
            }
        }
    }

    fn report_error(&mut self, message: &str) {
        self.say(format_args!("Error: {message}\n"));
    }
}

/// Match a 1-based index, a full label, or a bare function name.
fn pick_choice<'a>(choices: &'a [String], answer: &str) -> Option<&'a String> {
    if let Ok(idx) = answer.parse::<usize>() {
        return idx.checked_sub(1).and_then(|i| choices.get(i));
    }
    choices.iter().find(|c| c.as_str() == answer).or_else(|| {
        choices.iter().find(|c| c.rsplit_once(" @ ").map(|(name, _)| name) == Some(answer))
    })
}
