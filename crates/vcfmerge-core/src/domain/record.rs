use crate::error::CoreError;

pub const FORMATTED_NAME: &str = "FN";
pub const TELEPHONE: &str = "TEL";
pub const EMAIL: &str = "EMAIL";
pub const BIRTHDAY: &str = "BDAY";

/// A single vCard content line.
///
/// `value` holds the raw, still escaped text so properties the merge never
/// touches are written back exactly as they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub group: Option<String>,
    pub name: String,
    pub params: Vec<String>,
    pub value: String,
}

impl Property {
    /// Builds an ungrouped, parameterless property from an unescaped text value.
    pub fn text(name: &str, text: &str) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
            return Err(CoreError::InvalidPropertyName(name.to_string()));
        }
        Ok(Self {
            group: None,
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            value: escape_text(text),
        })
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn text_value(&self) -> String {
        unescape_text(&self.value)
    }

    pub fn set_text_value(&mut self, text: &str) {
        self.value = escape_text(text);
    }
}

/// One contact card: an ordered list of properties.
///
/// `FN` and `BDAY` are treated as scalars (the first occurrence counts);
/// `TEL` and `EMAIL` are repeatable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    properties: Vec<Property>,
}

impl ContactRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn push(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn first(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.is(name))
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties.iter().filter(move |property| property.is(name))
    }

    pub fn all_mut<'a>(&'a mut self, name: &'a str) -> impl Iterator<Item = &'a mut Property> + 'a {
        self.properties
            .iter_mut()
            .filter(move |property| property.is(name))
    }

    pub fn formatted_name(&self) -> Option<String> {
        self.first(FORMATTED_NAME).map(Property::text_value)
    }

    /// Trimmed `FN`, or `None` when it is missing or blank.
    pub fn name_key(&self) -> Option<String> {
        let name = self.formatted_name()?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }

    pub fn birthday(&self) -> Option<&Property> {
        self.first(BIRTHDAY)
    }

    pub fn phones(&self) -> impl Iterator<Item = &Property> + '_ {
        self.all(TELEPHONE)
    }

    pub fn phones_mut(&mut self) -> impl Iterator<Item = &mut Property> + '_ {
        self.all_mut(TELEPHONE)
    }

    pub fn emails(&self) -> impl Iterator<Item = &Property> + '_ {
        self.all(EMAIL)
    }

    /// Appends `property` right after the last property of the same name, or
    /// at the end of the card when there is none.
    pub fn add(&mut self, property: Property) {
        let position = self
            .properties
            .iter()
            .rposition(|existing| existing.is(&property.name));
        match position {
            Some(index) => self.properties.insert(index + 1, property),
            None => self.properties.push(property),
        }
    }
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                if matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                out.push_str("\\n");
            }
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') | Some('N') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
