use std::path::Path;

/// Dialog surface the pipeline talks to.
///
/// A terminal prompt, a GUI binding, or a scripted test double can all
/// implement this. `None` from any prompt means the caller declined.
pub trait InteractiveCaller {
    /// Folder to save into; `None` or blank selects `default_folder`.
    fn ask_output_folder(&mut self, default_folder: &Path) -> Option<String>;

    /// Pick one of `choices` (sorted `"{name} @ {address}"` labels; the first is
    /// the default). Returns the chosen label.
    fn choose_function(&mut self, choices: &[String]) -> Option<String>;

    /// Whether the model should also add explanatory comments.
    fn confirm_add_comments(&mut self) -> bool;

    /// File name to save under; `None` or blank keeps `default_name`.
    fn ask_file_name(&mut self, default_name: &str) -> Option<String>;

    /// Show the final code read-only, with copy and close actions.
    fn present(&mut self, code: &str);

    /// Visible error notice for a run that stopped early.
    fn report_error(&mut self, message: &str);
}
