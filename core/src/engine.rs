//! The plugin controller.
//!
//! `Engine` owns the dictionary, settings, capture flow and overlay, and
//! routes host events to them: keystrokes, pastes, change notifications and
//! user commands. All state is passed down explicitly; nothing reaches
//! for a global.

use crate::capture::{CaptureFlow, CaptureOutcome, CaptureState, DefinitionRequest, PromptResponse};
use crate::decoration::{Decoration, DecorationBuilder, DocumentView, Overlay, RefreshTrigger};
use crate::dictionary::{Definition, Dictionary, WordMapping};
use crate::error::UsageError;
use crate::host::{HostEditor, HostUi};
use crate::translator::Translator;
use crate::Settings;

/// Key events the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Word boundary
    Space,
    /// Any other character
    Char(char),
}

/// Result of processing a key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// Let the host apply the key normally
    PassThrough,
    /// Apply the key, then show a definition prompt
    RequestDefinition(DefinitionRequest),
}

/// Result of a paste event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteResult {
    /// The engine inserted a translation; suppress the default paste
    Handled,
    /// Let the host paste normally
    Default,
}

/// User-facing commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowDictionary,
    ToggleAutoTranslate,
    TranslateSelection,
    AddSelectionToDictionary,
    RemoveWord(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Done,
    /// Entries sorted for display
    Listing(Vec<WordMapping>),
    /// The host should show a definition prompt
    RequestDefinition(DefinitionRequest),
    /// The command was refused; a notice has been shown
    Rejected(UsageError),
}

/// Controller between a host editor and the dictionary.
///
/// Owns the dictionary, the settings, the capture flow and the decoration
/// overlay. Host collaborators are passed into each call.
pub struct Engine {
    dictionary: Dictionary,
    settings: Settings,
    capture: CaptureFlow,
    overlay: Overlay,
}

impl Engine {
    pub fn new(dictionary: Dictionary, settings: Settings) -> Self {
        Self {
            dictionary,
            settings,
            capture: CaptureFlow::new(),
            overlay: Overlay::new(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings and recompute decorations.
    pub fn set_settings(&mut self, settings: Settings, editor: &dyn HostEditor) {
        self.settings = settings;
        self.refresh(RefreshTrigger::ForceRefresh, editor);
    }

    pub fn capture_state(&self) -> &CaptureState {
        self.capture.state()
    }

    /// Current decorations from the last refresh.
    pub fn decorations(&self) -> &[Decoration] {
        self.overlay.decorations()
    }

    /// Recompute decorations for the editor's visible lines.
    pub fn refresh(&mut self, trigger: RefreshTrigger, editor: &dyn HostEditor) -> &[Decoration] {
        let builder = DecorationBuilder::new(&self.dictionary, &self.settings);
        let view = DocumentView::visible(editor);
        self.overlay.refresh(trigger, &builder, &view, editor.caret())
    }

    /// Process a keystroke before the host applies it.
    pub fn process_key(&mut self, key: KeyEvent, editor: &dyn HostEditor) -> KeyResult {
        if key != KeyEvent::Space {
            return KeyResult::PassThrough;
        }
        let caret = editor.caret();
        let index = editor.line_at(caret);
        let (Some(line), Some(start)) = (editor.line(index), editor.line_start(index)) else {
            return KeyResult::PassThrough;
        };
        match self
            .capture
            .on_word_boundary(line, caret.saturating_sub(start), &self.dictionary)
        {
            Some(request) => KeyResult::RequestDefinition(request),
            None => KeyResult::PassThrough,
        }
    }

    /// Apply the user's answer to an open definition prompt.
    ///
    /// A stored definition recomputes the decorations for `editor`.
    pub fn resolve_definition(
        &mut self,
        response: PromptResponse,
        editor: &dyn HostEditor,
        ui: &mut dyn HostUi,
    ) -> CaptureOutcome {
        let outcome = self.capture.resolve(response, &mut self.dictionary);
        match &outcome {
            CaptureOutcome::Defined {
                word,
                translation,
                definition,
            } => {
                let verb = match definition {
                    Definition::Added => "Added",
                    Definition::Updated => "Updated",
                };
                ui.notify(&format!("{verb}: {word} → {translation}"));
                self.refresh(RefreshTrigger::ForceRefresh, editor);
            }
            CaptureOutcome::Empty => ui.notify(&UsageError::EmptyDefinition.to_string()),
            CaptureOutcome::Cancelled | CaptureOutcome::NotAwaiting => {}
        }
        outcome
    }

    /// Handle a paste. With translate-on-paste enabled, Latin text that
    /// contains at least one known word is inserted translated.
    pub fn handle_paste(
        &mut self,
        text: &str,
        editor: &mut dyn HostEditor,
        ui: &mut dyn HostUi,
    ) -> PasteResult {
        if !self.settings.auto_translate_on_paste || text.trim().is_empty() {
            return PasteResult::Default;
        }
        let translation = match Translator::new(&self.dictionary).translate(text) {
            Ok(t) if t.translated_words > 0 => t,
            _ => return PasteResult::Default,
        };
        editor.replace_selection(&translation.output);
        if translation.has_untranslated {
            ui.notify("Pasted with some words left untranslated");
        }
        self.refresh(RefreshTrigger::DocumentChanged, &*editor);
        PasteResult::Handled
    }

    /// Run a user command.
    pub fn run_command(
        &mut self,
        command: Command,
        editor: &mut dyn HostEditor,
        ui: &mut dyn HostUi,
    ) -> CommandResult {
        let result = match command {
            Command::ShowDictionary => Ok(self.show_dictionary(ui)),
            Command::ToggleAutoTranslate => {
                self.settings.toggle_auto_translate();
                let state = if self.settings.auto_translate_enabled { "on" } else { "off" };
                ui.notify(&format!("Auto-translate {state}"));
                self.refresh(RefreshTrigger::ForceRefresh, &*editor);
                Ok(CommandResult::Done)
            }
            Command::TranslateSelection => self.translate_selection(editor, ui),
            Command::AddSelectionToDictionary => {
                let selection = editor.selection().unwrap_or_default();
                if selection.trim().is_empty() {
                    Err(UsageError::NoSelection)
                } else {
                    self.capture
                        .request_for_selection(selection, &self.dictionary)
                        .map(CommandResult::RequestDefinition)
                }
            }
            Command::RemoveWord(word) => {
                match self.dictionary.remove(&word) {
                    Some(m) => ui.notify(&format!("Removed: {} → {}", m.script, m.translation)),
                    None => ui.notify(&format!("{word} is not in the dictionary")),
                }
                self.refresh(RefreshTrigger::ForceRefresh, &*editor);
                Ok(CommandResult::Done)
            }
        };

        result.unwrap_or_else(|e| {
            ui.notify(&e.to_string());
            CommandResult::Rejected(e)
        })
    }

    fn show_dictionary(&self, ui: &mut dyn HostUi) -> CommandResult {
        if self.dictionary.is_empty() {
            ui.notify("Your dictionary is empty");
        }
        CommandResult::Listing(self.dictionary.entries_sorted().into_iter().cloned().collect())
    }

    fn translate_selection(
        &mut self,
        editor: &mut dyn HostEditor,
        ui: &mut dyn HostUi,
    ) -> Result<CommandResult, UsageError> {
        let selection = match editor.selection() {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Err(UsageError::NoSelection),
        };
        let translation = Translator::new(&self.dictionary).translate(selection)?;
        if translation.translated_words == 0 {
            return Err(UsageError::NothingTranslated);
        }
        editor.replace_selection(&translation.output);
        if translation.has_untranslated {
            ui.notify("Some words have no translation yet and were left as they are");
        } else {
            ui.notify(&format!("Translated {} words", translation.translated_words));
        }
        self.refresh(RefreshTrigger::DocumentChanged, &*editor);
        Ok(CommandResult::Done)
    }

    /// Save the dictionary and wait for pending writes.
    pub fn deactivate(&self) {
        self.dictionary.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use crate::host::NoticeLog;

    const HELLO: &str = "𐑣𐑧𐑤𐑴";
    const FRIEND: &str = "𐑓𐑮𐑧𐑯𐑛";

    fn engine() -> Engine {
        let mut dict = Dictionary::in_memory();
        dict.define(HELLO, "hello").unwrap();
        Engine::new(dict, Settings::default())
    }

    #[test]
    fn space_after_unknown_word_requests_definition() {
        let mut engine = engine();
        let mut ui = NoticeLog::new();
        let mut buffer = TextBuffer::from_text(&format!("first line\n{HELLO} {FRIEND}"));

        let KeyResult::RequestDefinition(req) = engine.process_key(KeyEvent::Space, &buffer) else {
            panic!("expected a definition request");
        };
        assert_eq!(req.word, FRIEND);

        // the guard holds while the prompt is open
        buffer.insert_char(' ');
        buffer.insert_str(FRIEND);
        assert_eq!(engine.process_key(KeyEvent::Space, &buffer), KeyResult::PassThrough);

        let outcome = engine.resolve_definition(PromptResponse::Confirmed("friend".into()), &buffer, &mut ui);
        assert!(matches!(outcome, CaptureOutcome::Defined { .. }));
        assert_eq!(ui.last(), Some(format!("Added: {FRIEND} → friend").as_str()));
        assert_eq!(engine.process_key(KeyEvent::Space, &buffer), KeyResult::PassThrough);
        assert_eq!(engine.process_key(KeyEvent::Char('a'), &buffer), KeyResult::PassThrough);
    }

    #[test]
    fn confirmed_definition_refreshes_overlay() {
        let mut engine = engine();
        let mut ui = NoticeLog::new();
        let mut buffer = TextBuffer::from_text(FRIEND);
        assert!(engine.refresh(RefreshTrigger::DocumentChanged, &buffer).is_empty());

        assert!(matches!(
            engine.process_key(KeyEvent::Space, &buffer),
            KeyResult::RequestDefinition(_)
        ));
        buffer.insert_char(' ');
        buffer.insert_char('x');

        engine.resolve_definition(PromptResponse::Confirmed("friend".into()), &buffer, &mut ui);
        let decorations = engine.decorations();
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].rendered_text, "friend");

        // a cancelled prompt leaves the overlay as it was
        let mut buffer = TextBuffer::from_text(&format!("{FRIEND} 𐑚𐑳𐑯"));
        assert!(matches!(
            engine.process_key(KeyEvent::Space, &buffer),
            KeyResult::RequestDefinition(_)
        ));
        buffer.insert_char(' ');
        engine.resolve_definition(PromptResponse::Cancelled, &buffer, &mut ui);
        assert_eq!(engine.decorations().len(), 1);
    }

    #[test]
    fn refresh_sees_latest_definition() {
        let mut engine = engine();
        let mut ui = NoticeLog::new();
        let mut buffer = TextBuffer::from_text(&format!("{FRIEND} x"));

        assert!(engine.refresh(RefreshTrigger::DocumentChanged, &buffer).is_empty());
        buffer.set_caret(0);
        let _ = engine.run_command(Command::AddSelectionToDictionary, &mut buffer, &mut ui);
        assert_eq!(ui.last(), Some(UsageError::NoSelection.to_string().as_str()));

        buffer.select(0..FRIEND.len());
        let CommandResult::RequestDefinition(req) =
            engine.run_command(Command::AddSelectionToDictionary, &mut buffer, &mut ui)
        else {
            panic!("expected a definition request");
        };
        assert_eq!(req.word, FRIEND);
        engine.resolve_definition(PromptResponse::Confirmed("friend".into()), &buffer, &mut ui);

        buffer.move_to_end();
        let decorations = engine.refresh(RefreshTrigger::SelectionChanged, &buffer);
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].rendered_text, "friend");
    }

    #[test]
    fn toggle_auto_translate_forces_refresh() {
        let mut engine = engine();
        let mut ui = NoticeLog::new();
        let mut buffer = TextBuffer::from_text(&format!("{HELLO} "));
        assert_eq!(engine.refresh(RefreshTrigger::DocumentChanged, &buffer).len(), 1);

        engine.run_command(Command::ToggleAutoTranslate, &mut buffer, &mut ui);
        assert!(!engine.settings().auto_translate_enabled);
        assert!(engine.decorations().is_empty());
        assert_eq!(ui.last(), Some("Auto-translate off"));
    }

    #[test]
    fn translate_selection_outcomes() {
        let mut engine = engine();
        let mut ui = NoticeLog::new();

        let mut buffer = TextBuffer::from_text("Hello world");
        buffer.select_all();
        assert_eq!(
            engine.run_command(Command::TranslateSelection, &mut buffer, &mut ui),
            CommandResult::Done
        );
        assert_eq!(buffer.text(), format!("·{HELLO} world"));

        let mut buffer = TextBuffer::from_text(HELLO);
        buffer.select_all();
        assert_eq!(
            engine.run_command(Command::TranslateSelection, &mut buffer, &mut ui),
            CommandResult::Rejected(UsageError::AlreadyScript)
        );
        assert_eq!(buffer.text(), HELLO);

        let mut buffer = TextBuffer::from_text("nothing known");
        buffer.select_all();
        assert_eq!(
            engine.run_command(Command::TranslateSelection, &mut buffer, &mut ui),
            CommandResult::Rejected(UsageError::NothingTranslated)
        );
        assert_eq!(buffer.text(), "nothing known");
    }

    #[test]
    fn paste_translation_is_gated() {
        let mut engine = engine();
        let mut ui = NoticeLog::new();
        let mut buffer = TextBuffer::new();

        assert_eq!(engine.handle_paste("hello", &mut buffer, &mut ui), PasteResult::Handled);
        assert_eq!(buffer.text(), HELLO);

        assert_eq!(engine.handle_paste("unknown", &mut buffer, &mut ui), PasteResult::Default);
        assert_eq!(engine.handle_paste(FRIEND, &mut buffer, &mut ui), PasteResult::Default);

        let settings = Settings {
            auto_translate_on_paste: false,
            ..Settings::default()
        };
        engine.set_settings(settings, &buffer);
        assert_eq!(engine.handle_paste("hello", &mut buffer, &mut ui), PasteResult::Default);
    }

    #[test]
    fn listing_and_removal() {
        let mut engine = engine();
        let mut ui = NoticeLog::new();
        let mut buffer = TextBuffer::new();
        engine.dictionary_mut().define(FRIEND, "Able").unwrap();

        let CommandResult::Listing(entries) =
            engine.run_command(Command::ShowDictionary, &mut buffer, &mut ui)
        else {
            panic!("expected a listing");
        };
        let words: Vec<_> = entries.iter().map(|m| m.translation.as_str()).collect();
        assert_eq!(words, vec!["Able", "hello"]);

        engine.run_command(Command::RemoveWord(FRIEND.into()), &mut buffer, &mut ui);
        assert_eq!(ui.last(), Some(format!("Removed: {FRIEND} → Able").as_str()));
        engine.run_command(Command::RemoveWord(FRIEND.into()), &mut buffer, &mut ui);
        assert_eq!(engine.dictionary().len(), 1);
    }
}
