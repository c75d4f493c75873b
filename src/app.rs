//! Application state and core logic

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use form_store::{
    validators, FieldDescriptor, FieldGroup, FieldValues, FormEvent, FormStore, ScalarValue,
    SubmitOutcome, ValueKind,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The form shown when the config does not provide one
pub fn default_field_group() -> FieldGroup {
    FieldGroup::new()
        .field(
            "name",
            FieldDescriptor::new("").validator(validators::min_length(3)),
        )
        .group(
            "postalOffice",
            FieldGroup::new().field(
                "address",
                FieldDescriptor::new("").validator(validators::Required {
                    message: "Address must not be empty".to_string(),
                }),
            ),
        )
}

/// A successful submit
#[derive(Debug, Clone)]
pub struct Submission {
    pub values: FieldValues,
    pub submitted_at: DateTime<Utc>,
}

/// Main application struct
pub struct App {
    /// The form being edited
    pub form: FormStore,
    /// Raw text typed into each field, in field order
    pub drafts: Vec<String>,
    /// Focused row; `form.len()` is the submit button
    pub active_field: usize,
    /// Status line message
    pub status_message: Option<String>,
    /// Successful submits, oldest first
    pub submissions: Vec<Submission>,
    /// Whether the app should quit
    quit: bool,
    /// Set by the form subscription and by focus changes
    redraw: Arc<AtomicBool>,
}

impl App {
    /// Create a new App around a form
    pub fn new(mut form: FormStore) -> Self {
        let drafts = form
            .fields()
            .map(|field| field.value().coerce_string())
            .collect();

        let redraw = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&redraw);
        form.subscribe(move |event| {
            if let FormEvent::FieldUpdated { name } = event {
                tracing::trace!("Field {name} updated");
            }
            flag.store(true, Ordering::Relaxed);
        });

        Self {
            form,
            drafts,
            active_field: 0,
            status_message: None,
            submissions: Vec::new(),
            quit: false,
            redraw,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Whether the screen changed since the last call
    pub fn take_redraw(&self) -> bool {
        self.redraw.swap(false, Ordering::Relaxed)
    }

    pub fn request_redraw(&self) {
        self.redraw.store(true, Ordering::Relaxed);
    }

    /// Returns true if the submit button is focused
    pub fn is_submit_active(&self) -> bool {
        self.active_field == self.form.len()
    }

    fn active_name(&self) -> Option<String> {
        self.form.field_names().nth(self.active_field).map(str::to_string)
    }

    fn active_kind(&self) -> Option<ValueKind> {
        self.form.fields().nth(self.active_field).map(|f| f.kind())
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let submit_shortcut = key.code == KeyCode::Char('s')
            && (key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(crate::platform::SUBMIT_MODIFIER));
        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => self.quit = true,
            _ if submit_shortcut => self.submit()?,
            KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.accept_suggestion()?
            }
            KeyCode::Tab | KeyCode::Down => self.next_field()?,
            KeyCode::BackTab | KeyCode::Up => self.prev_field()?,
            KeyCode::Enter if self.is_submit_active() => self.submit()?,
            KeyCode::Enter => self.next_field()?,
            KeyCode::Char(c) if !chord => self.input_char(c)?,
            KeyCode::Backspace => self.backspace()?,
            _ => {}
        }
        Ok(())
    }

    /// Commit the focused field and move to the next row (wraps around)
    pub fn next_field(&mut self) -> Result<()> {
        self.blur_active()?;
        self.active_field = (self.active_field + 1) % (self.form.len() + 1);
        self.request_redraw();
        Ok(())
    }

    /// Commit the focused field and move to the previous row (wraps around)
    pub fn prev_field(&mut self) -> Result<()> {
        self.blur_active()?;
        if self.active_field == 0 {
            self.active_field = self.form.len();
        } else {
            self.active_field -= 1;
        }
        self.request_redraw();
        Ok(())
    }

    fn blur_active(&mut self) -> Result<()> {
        let Some(name) = self.active_name() else {
            return Ok(());
        };
        let raw = match self.active_kind() {
            Some(ValueKind::Bool) => self
                .form
                .get_field(&name)
                .map(|f| f.value().clone())
                .unwrap_or_default(),
            _ => ScalarValue::from(self.drafts[self.active_field].clone()),
        };
        self.form.on_blur(&name, raw)?;
        Ok(())
    }

    fn input_char(&mut self, c: char) -> Result<()> {
        let Some(name) = self.active_name() else {
            return Ok(());
        };

        if self.active_kind() == Some(ValueKind::Bool) {
            if c == ' ' {
                let current = self
                    .form
                    .get_field(&name)
                    .is_some_and(|f| f.value().coerce_bool());
                self.drafts[self.active_field] = (!current).to_string();
                self.form.on_change(&name, !current)?;
            }
            return Ok(());
        }

        self.drafts[self.active_field].push(c);
        let raw = self.drafts[self.active_field].clone();
        self.form.on_change(&name, raw)?;
        Ok(())
    }

    fn backspace(&mut self) -> Result<()> {
        let Some(name) = self.active_name() else {
            return Ok(());
        };
        if self.active_kind() == Some(ValueKind::Bool) {
            return Ok(());
        }

        self.drafts[self.active_field].pop();
        let raw = self.drafts[self.active_field].clone();
        self.form.on_change(&name, raw)?;
        Ok(())
    }

    /// Replace the focused field with its suggested correction
    pub fn accept_suggestion(&mut self) -> Result<()> {
        let Some(name) = self.active_name() else {
            return Ok(());
        };
        let Some(closest) = self
            .form
            .get_field(&name)
            .and_then(|f| f.closest_valid_value().cloned())
        else {
            return Ok(());
        };

        self.drafts[self.active_field] = closest.coerce_string();
        self.form.on_blur(&name, closest)?;
        Ok(())
    }

    /// Commit the focused field and run the submit protocol
    pub fn submit(&mut self) -> Result<()> {
        self.blur_active()?;

        let submissions = &mut self.submissions;
        let outcome = self.form.submit_with(|values| {
            submissions.push(Submission {
                values: values.clone(),
                submitted_at: Utc::now(),
            });
        });

        self.status_message = Some(match outcome {
            SubmitOutcome::Submitted(_) => {
                let at = self
                    .submissions
                    .last()
                    .map(|s| s.submitted_at.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                format!("Submitted at {at}")
            }
            SubmitOutcome::Rejected { invalid_fields } => {
                format!("Cannot submit: {} invalid field(s)", invalid_fields.len())
            }
        });
        self.request_redraw();
        Ok(())
    }

    pub fn last_submission(&self) -> Option<&Submission> {
        self.submissions.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_store::FormOptions;
    use pretty_assertions::assert_eq;

    fn create_test_app() -> App {
        App::new(FormStore::new(default_field_group(), FormOptions::default()).unwrap())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_new_app_defaults() {
        let app = create_test_app();
        assert_eq!(app.active_field, 0);
        assert_eq!(app.drafts, vec![String::new(), String::new()]);
        assert!(!app.should_quit());
        assert!(app.take_redraw());
        assert!(!app.take_redraw());
    }

    #[test]
    fn test_typing_changes_without_dirtying() {
        let mut app = create_test_app();
        type_text(&mut app, "ab");

        let field = app.form.get_field("name").unwrap();
        assert_eq!(field.value(), &ScalarValue::from("ab"));
        assert!(!field.is_dirty());
        assert!(field.error().is_none());
        assert!(app.take_redraw());
    }

    #[test]
    fn test_tab_commits_field() {
        let mut app = create_test_app();
        type_text(&mut app, "ab");
        press(&mut app, KeyCode::Tab);

        let field = app.form.get_field("name").unwrap();
        assert!(field.is_dirty());
        assert_eq!(field.error(), Some("Please enter at least 3 symbols"));
        assert_eq!(app.active_field, 1);
    }

    #[test]
    fn test_backspace_edits_draft() {
        let mut app = create_test_app();
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.drafts[0], "ab");
        assert_eq!(app.form.get_field("name").unwrap().value(), &ScalarValue::from("ab"));
    }

    #[test]
    fn test_modifier_chords_do_not_type() {
        let mut app = create_test_app();
        type_text(&mut app, "ab");
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL))
            .unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT))
            .unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT))
            .unwrap();

        assert_eq!(app.drafts[0], "abC");
        assert_eq!(app.form.get_field("name").unwrap().value(), &ScalarValue::from("abC"));
    }

    #[test]
    fn test_focus_wraps_through_submit_button() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::BackTab);
        assert!(app.is_submit_active());
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_field, 0);
    }

    #[test]
    fn test_rejected_submit() {
        let mut app = create_test_app();
        type_text(&mut app, "abc");
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();

        assert!(app.submissions.is_empty());
        assert!(!app.form.is_submitted());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Cannot submit: 1 invalid field(s)")
        );
        assert_eq!(
            app.form.get_field("postalOffice.address").unwrap().error(),
            Some("Address must not be empty")
        );
    }

    #[test]
    fn test_successful_submit_via_button() {
        let mut app = create_test_app();
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Main St 1");
        press(&mut app, KeyCode::Tab);
        assert!(app.is_submit_active());
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_submitted());
        let submission = app.last_submission().unwrap();
        assert_eq!(
            submission.values.get("postalOffice.address"),
            Some(&ScalarValue::from("Main St 1"))
        );
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Submitted at")));
    }

    #[test]
    fn test_accept_suggestion() {
        let group = FieldGroup::new().field(
            "age",
            FieldDescriptor::new(0).validator(validators::range(0.0, 130.0)),
        );
        let mut app = App::new(FormStore::new(group, FormOptions::default()).unwrap());
        type_text(&mut app, "200");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_field, 0);

        app.handle_key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL))
            .unwrap();
        let field = app.form.get_field("age").unwrap();
        assert_eq!(field.value(), &ScalarValue::Num(130.0));
        assert!(field.error().is_none());
        assert_eq!(app.drafts[0], "130");
    }

    #[test]
    fn test_bool_field_toggles_with_space() {
        let group = FieldGroup::new().field("agree", FieldDescriptor::new(false));
        let mut app = App::new(FormStore::new(group, FormOptions::default()).unwrap());

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.form.get_field("agree").unwrap().value(), &ScalarValue::Bool(false));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.form.get_field("agree").unwrap().value(), &ScalarValue::Bool(true));
        assert_eq!(app.drafts[0], "true");
    }

    #[test]
    fn test_esc_quits() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }
}
