use anyhow::Result;
use strum::IntoEnumIterator;

use crate::app::form::{self, ValidationError};
use crate::app::input::InputState;
use crate::config::AppConfig;
use crate::identity::{Sex, UserIdentity};
use crate::storage::{self, Category, Record, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Identify,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Name,
    Sex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// One user session. Every transition is a plain method on this struct so
/// the whole flow is testable without a terminal; the event loop only maps
/// key presses onto these calls.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub view: View,
    pub sidebar_hidden: bool,

    // Identity drafts persist across view round trips without submitting.
    pub name_input: InputState,
    pub sex: Sex,
    pub identity_focus: IdentityField,

    pub user: Option<UserIdentity>,
    pub records: Vec<Record>,

    pub title_input: InputState,
    pub category: Category,
    pub notes_input: InputState,
    pub form_focus: FormField,

    pub status: Option<StatusMessage>,
    default_category: Category,
}

impl SessionState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            view: View::Identify,
            sidebar_hidden: false,
            name_input: InputState::default(),
            sex: Sex::default(),
            identity_focus: IdentityField::Name,
            user: None,
            records: Vec::new(),
            title_input: InputState::default(),
            category: config.default_category,
            notes_input: InputState::default(),
            form_focus: FormField::Title,
            status: None,
            default_category: config.default_category,
        }
    }

    pub fn set_info<S: Into<String>>(&mut self, text: S) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    pub fn set_error<S: Into<String>>(&mut self, text: S) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn toggle_identity_focus(&mut self) {
        self.identity_focus = match self.identity_focus {
            IdentityField::Name => IdentityField::Sex,
            IdentityField::Sex => IdentityField::Name,
        };
    }

    pub fn cycle_form_focus(&mut self) {
        self.form_focus = match self.form_focus {
            FormField::Title => FormField::Category,
            FormField::Category => FormField::Notes,
            FormField::Notes => FormField::Title,
        };
    }

    pub fn toggle_sex(&mut self) {
        self.sex = self.sex.toggled();
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let all: Vec<Category> = Category::iter().collect();
        let current = all
            .iter()
            .position(|category| *category == self.category)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % all.len()
        } else {
            (current + all.len() - 1) % all.len()
        };
        self.category = all[next];
    }

    /// The field currently receiving typed characters, if any.
    pub fn active_input_mut(&mut self) -> Option<&mut InputState> {
        match self.view {
            View::Identify => match self.identity_focus {
                IdentityField::Name => Some(&mut self.name_input),
                IdentityField::Sex => None,
            },
            View::Main => match self.form_focus {
                FormField::Title => Some(&mut self.title_input),
                FormField::Notes => Some(&mut self.notes_input),
                FormField::Category => None,
            },
        }
    }

    /// Identify → Main. A blank name is rejected inline and nothing is
    /// loaded or created on disk.
    pub fn submit_identity(&mut self, store: &RecordStore) -> Result<()> {
        let Some(identity) = UserIdentity::resolve(self.name_input.text(), self.sex) else {
            self.set_error(ValidationError::EmptyName.to_string());
            return Ok(());
        };
        self.records = store.load(&identity.key)?;
        self.user = Some(identity);
        self.view = View::Main;
        self.sidebar_hidden = true;
        self.form_focus = FormField::Title;
        self.clear_status();
        Ok(())
    }

    /// Main → Identify. Identity drafts survive the round trip; the entry
    /// form and loaded table do not.
    pub fn return_to_identify(&mut self) {
        self.view = View::Identify;
        self.sidebar_hidden = false;
        self.user = None;
        self.records.clear();
        self.reset_form();
        self.clear_status();
    }

    /// One form submission: validate, stamp, append, persist. A failed
    /// validation keeps the draft; a successful save resets it.
    pub fn submit_record(&mut self, store: &RecordStore) -> Result<()> {
        let Some(user) = self.user.clone() else {
            return Ok(());
        };
        let created_at = storage::current_timestamp()?;
        match form::build_record(
            self.title_input.text(),
            self.category,
            self.notes_input.text(),
            &self.records,
            created_at,
        ) {
            Err(err) => {
                self.set_error(err.to_string());
            }
            Ok(record) => {
                let id = record.id;
                self.records.push(record);
                store.save(&user.key, &self.records)?;
                self.reset_form();
                self.set_info(format!("record #{id} saved"));
                tracing::debug!(id, user = %user.key, "record saved");
            }
        }
        Ok(())
    }

    pub fn reset_form(&mut self) {
        self.title_input.clear();
        self.notes_input.clear();
        self.category = self.default_category;
        self.form_focus = FormField::Title;
    }

    /// Rows for the main-view table, newest first.
    pub fn display_records(&self) -> Vec<Record> {
        storage::sorted_newest_first(&self.records)
    }
}
