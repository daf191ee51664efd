use crate::error::CoreError;
use phonenumber::country;
use phonenumber::metadata::{Descriptor, Descriptors, DATABASE};
use phonenumber::{Mode, PhoneNumber};
use std::fmt;
use std::str::FromStr;

/// Default numbering-plan context for numbers written without a `+` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: country::Id,
    code: String,
}

impl Region {
    pub fn id(&self) -> country::Id {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != 2 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(CoreError::UnknownRegion(raw.to_string()));
        }
        let id = code
            .parse::<country::Id>()
            .map_err(|_| CoreError::UnknownRegion(raw.to_string()))?;
        Ok(Self { id, code })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Normalizes a phone number to E.164.
///
/// A leading `+` means the number carries its own country code and the
/// region is ignored. Numbers the phone library cannot parse, or parses to a
/// length no number type of that country uses, degrade to their ASCII digits
/// with the leading `+` kept when the input had one. Without a region only
/// `+`-prefixed numbers can be parsed. This never fails: an empty string is a
/// valid result.
pub fn normalize_phone(raw: &str, region: Option<&Region>) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let region = if raw.trim_start().starts_with('+') {
        None
    } else {
        region.map(Region::id)
    };
    if let Ok(number) = phonenumber::parse(region, raw) {
        if is_possible(&number) {
            return number.format().mode(Mode::E164).to_string();
        }
    }

    strip_to_digits(raw)
}

/// Length-only plausibility: the national number has a length some number
/// type of its country calling code can have, dialled in full or locally.
fn is_possible(number: &PhoneNumber) -> bool {
    let Some(candidates) = DATABASE.by_code(&number.code().value()) else {
        return false;
    };
    let Ok(length) = u16::try_from(number.national().to_string().len()) else {
        return false;
    };
    candidates
        .iter()
        .flat_map(|meta| typed_descriptors(meta.descriptors()))
        .any(|descriptor| {
            descriptor.possible_length().contains(&length)
                || descriptor.possible_local_length().contains(&length)
        })
}

fn typed_descriptors(descriptors: &Descriptors) -> impl Iterator<Item = &Descriptor> {
    [
        descriptors.fixed_line(),
        descriptors.mobile(),
        descriptors.toll_free(),
        descriptors.premium_rate(),
        descriptors.shared_cost(),
        descriptors.personal_number(),
        descriptors.voip(),
        descriptors.pager(),
        descriptors.uan(),
        descriptors.voicemail(),
    ]
    .into_iter()
    .flatten()
}

fn strip_to_digits(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    if raw.starts_with('+') {
        out.push('+');
    }
    out.extend(raw.chars().filter(char::is_ascii_digit));
    out
}
