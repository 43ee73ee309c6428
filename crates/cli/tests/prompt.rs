use std::cell::RefCell;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use decomprove::clipboard::{ClipboardSink, SystemClipboard};
use decomprove::TerminalCaller;
use decomprove_core::InteractiveCaller;

#[derive(Clone, Default)]
struct RecordingClipboard {
    copied: Rc<RefCell<Vec<String>>>,
    fail: bool,
}

impl ClipboardSink for RecordingClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("no clipboard here"));
        }
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }
}

fn caller(input: &str) -> TerminalCaller<Cursor<Vec<u8>>, Vec<u8>> {
    TerminalCaller::with_clipboard(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
        Box::new(RecordingClipboard::default()),
    )
}

fn choices() -> Vec<String> {
    vec!["alpha @ 0x100".to_string(), "beta @ 0x200".to_string()]
}

#[test]
fn folder_prompt_returns_line_without_newline() {
    let mut c = caller("/tmp/out\r\n");
    assert_eq!(c.ask_output_folder(Path::new("/default")), Some("/tmp/out".to_string()));
    let shown = String::from_utf8(c.into_output()).unwrap();
    assert!(shown.contains("(default: /default)"));
}

#[test]
fn end_of_input_declines() {
    let mut c = caller("");
    assert_eq!(c.ask_output_folder(Path::new("/default")), None);
    assert_eq!(c.choose_function(&choices()), None);
    assert!(!c.confirm_add_comments());
    assert_eq!(c.ask_file_name("alpha_123456789_imp.c"), None);
}

#[test]
fn choice_accepts_index_name_or_default() {
    assert_eq!(caller("2\n").choose_function(&choices()), Some("beta @ 0x200".into()));
    assert_eq!(caller("alpha\n").choose_function(&choices()), Some("alpha @ 0x100".into()));
    assert_eq!(
        caller("beta @ 0x200\n").choose_function(&choices()),
        Some("beta @ 0x200".into())
    );
    assert_eq!(caller("\n").choose_function(&choices()), Some("alpha @ 0x100".into()));
    assert_eq!(caller("q\n").choose_function(&choices()), None);
}

#[test]
fn invalid_choice_reprompts() {
    let mut c = caller("7\nnope\n1\n");
    assert_eq!(c.choose_function(&choices()), Some("alpha @ 0x100".into()));
    let shown = String::from_utf8(c.into_output()).unwrap();
    assert!(shown.contains("  1. alpha @ 0x100"));
    assert!(shown.contains("Unknown selection '7'"));
    assert!(shown.contains("Unknown selection 'nope'"));
}

#[test]
fn comments_confirmation_defaults_to_no() {
    assert!(caller("y\n").confirm_add_comments());
    assert!(caller("YES\n").confirm_add_comments());
    assert!(!caller("\n").confirm_add_comments());
    assert!(!caller("n\n").confirm_add_comments());
}

#[test]
fn present_copies_until_closed() {
    let clipboard = RecordingClipboard::default();
    let copied = clipboard.copied.clone();
    let mut c = TerminalCaller::with_clipboard(
        Cursor::new(b"c\nc\n\nignored\n".to_vec()),
        Vec::new(),
        Box::new(clipboard),
    );
    c.present("int x;");
    assert_eq!(*copied.borrow(), vec!["int x;".to_string(), "int x;".to_string()]);
    let shown = String::from_utf8(c.into_output()).unwrap();
    assert!(shown.contains("===== Improved Code =====\nint x;\n"));
    assert!(shown.contains("Code copied to clipboard."));
}

#[test]
fn present_reports_copy_failure() {
    let mut c = TerminalCaller::with_clipboard(
        Cursor::new(b"c\n".to_vec()),
        Vec::new(),
        Box::new(RecordingClipboard { fail: true, ..Default::default() }),
    );
    c.present("int x;");
    let shown = String::from_utf8(c.into_output()).unwrap();
    assert!(shown.contains("Copy failed: no clipboard here"));
}

#[test]
fn errors_are_printed() {
    let mut c = caller("");
    c.report_error("No function selected.");
    let shown = String::from_utf8(c.into_output()).unwrap();
    assert!(shown.contains("Error: No function selected."));
}

#[test]
fn bare_name_containing_separator_is_matched() {
    let choices = vec!["operator @ weird @ 0x20".to_string(), "alpha @ 0x100".to_string()];
    assert_eq!(
        caller("operator @ weird\n").choose_function(&choices),
        Some("operator @ weird @ 0x20".into())
    );
}

#[test]
fn closing_viewer_without_copy_leaves_system_clipboard_alone() {
    let mut c = TerminalCaller::new(Cursor::new(b"\n".to_vec()), Vec::new());
    c.present("int x;");
    let shown = String::from_utf8(c.into_output()).unwrap();
    assert!(!shown.contains("Copy failed"));
    assert!(!shown.contains("Code copied"));
}

#[test]
fn system_clipboard_copies_or_reports_why_not() {
    // Headless machines have no clipboard; that must surface as an error.
    match SystemClipboard::new().copy("int x;") {
        Ok(()) => {}
        Err(e) => assert!(format!("{e:#}").contains("system clipboard"), "got {e:#}"),
    }
}
