use strum::Display;

/// Sex options offered on the identity screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub fn toggled(self) -> Self {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

/// Identity resolved from the sidebar inputs once the name passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub name: String,
    pub sex: Sex,
    pub key: String,
}

impl UserIdentity {
    pub fn resolve(name: &str, sex: Sex) -> Option<Self> {
        let key = derive_key(name)?;
        Some(Self {
            name: name.trim().to_string(),
            sex,
            key,
        })
    }

    pub fn file_name(&self) -> String {
        records_file_name(&self.key)
    }
}

/// Derives a filesystem-safe key from a free-text name.
///
/// The name is trimmed first; a name that is empty after trimming yields
/// `None`. Every character outside letters, digits, `_`, `-` and `.` is
/// replaced with an underscore. Distinct raw names can normalize to the same
/// key; the caller gets whatever file that key points at.
pub fn derive_key(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    let key = trimmed
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    Some(key)
}

pub fn records_file_name(key: &str) -> String {
    format!("{key}_records.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_names_pass_through_trimmed() {
        assert_eq!(derive_key("Ann").as_deref(), Some("Ann"));
        assert_eq!(derive_key("  li-wei.03 ").as_deref(), Some("li-wei.03"));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(derive_key(""), None);
        assert_eq!(derive_key("   "), None);
        assert_eq!(derive_key("\t\n"), None);
    }

    #[test]
    fn special_characters_become_underscores() {
        assert_eq!(derive_key("a/b:c").as_deref(), Some("a_b_c"));
        assert_eq!(derive_key("o'brien jr").as_deref(), Some("o_brien_jr"));
    }

    #[test]
    fn output_alphabet_is_filesystem_safe() {
        for raw in ["x y/z", "??!", "über täst", "名前 (仮)"] {
            let key = derive_key(raw).expect("non-blank name");
            assert!(
                key.chars()
                    .all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')),
                "unsafe character in key {key:?}"
            );
        }
    }

    #[test]
    fn colliding_names_share_a_key() {
        assert_eq!(derive_key("a/b"), derive_key("a:b"));
    }

    #[test]
    fn resolve_keeps_display_name_and_key_apart() {
        let identity = UserIdentity::resolve(" Ann O'Hara ", Sex::Female).expect("identity");
        assert_eq!(identity.name, "Ann O'Hara");
        assert_eq!(identity.key, "Ann_O_Hara");
        assert_eq!(identity.file_name(), "Ann_O_Hara_records.csv");
    }
}
