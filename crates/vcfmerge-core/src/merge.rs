use crate::domain::email::email_match_key;
use crate::domain::phone::{normalize_phone, Region};
use crate::domain::record::{ContactRecord, Property, EMAIL, TELEPHONE};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Merged records keyed by trimmed display name, in first-seen order.
#[derive(Debug, Default)]
pub struct MergedSet {
    index: HashMap<String, usize>,
    entries: Vec<(String, ContactRecord)>,
}

impl MergedSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ContactRecord> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn records(&self) -> impl Iterator<Item = &ContactRecord> + '_ {
        self.entries.iter().map(|(_, record)| record)
    }

    pub fn into_records(self) -> Vec<ContactRecord> {
        self.entries.into_iter().map(|(_, record)| record).collect()
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ContactRecord> {
        let slot = *self.index.get(name)?;
        Some(&mut self.entries[slot].1)
    }

    fn insert(&mut self, name: String, record: ContactRecord) {
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, record));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub records_read: usize,
    pub skipped_nameless: usize,
    pub duplicates_merged: usize,
    pub unique_contacts: usize,
    pub phones_added: usize,
    pub emails_added: usize,
    pub birthdays_filled: usize,
}

/// Single-pass, name-keyed merge.
///
/// The first record seen for a name becomes the anchor and owns the name for
/// the rest of the run. Later records with the same trimmed `FN` are folded
/// into it and dropped. There is no secondary key: two different people who
/// share a display name end up in one card.
#[derive(Debug)]
pub struct MergeEngine {
    region: Option<Region>,
    merged: MergedSet,
    report: MergeReport,
}

impl MergeEngine {
    pub fn new(region: Option<Region>) -> Self {
        Self {
            region,
            merged: MergedSet::default(),
            report: MergeReport::default(),
        }
    }

    pub fn ingest(&mut self, mut record: ContactRecord) {
        self.report.records_read += 1;
        let Some(name) = record.name_key() else {
            self.report.skipped_nameless += 1;
            return;
        };

        let region = self.region.as_ref();
        match self.merged.get_mut(&name) {
            None => {
                for phone in record.phones_mut() {
                    let normalized = normalize_phone(&phone.text_value(), region);
                    phone.set_text_value(&normalized);
                }
                self.merged.insert(name, record);
            }
            Some(anchor) => {
                self.report.duplicates_merged += 1;
                fold_phones(anchor, &record, region, &mut self.report);
                fold_emails(anchor, &record, &mut self.report);
                fold_birthday(anchor, record, &mut self.report);
            }
        }
    }

    pub fn finish(self) -> (MergedSet, MergeReport) {
        let mut report = self.report;
        report.unique_contacts = self.merged.len();
        (self.merged, report)
    }
}

pub fn merge_records<I>(records: I, region: Option<Region>) -> (MergedSet, MergeReport)
where
    I: IntoIterator<Item = ContactRecord>,
{
    let mut engine = MergeEngine::new(region);
    for record in records {
        engine.ingest(record);
    }
    engine.finish()
}

fn fold_phones(
    anchor: &mut ContactRecord,
    incoming: &ContactRecord,
    region: Option<&Region>,
    report: &mut MergeReport,
) {
    // Anchor values are already normalized; compare them as they are.
    let mut existing: HashSet<String> = anchor.phones().map(Property::text_value).collect();
    for phone in incoming.phones() {
        let normalized = normalize_phone(&phone.text_value(), region);
        if normalized.is_empty() || existing.contains(&normalized) {
            continue;
        }
        anchor.add(carried_over(phone, TELEPHONE, &normalized));
        existing.insert(normalized);
        report.phones_added += 1;
    }
}

fn fold_emails(anchor: &mut ContactRecord, incoming: &ContactRecord, report: &mut MergeReport) {
    let mut existing: HashSet<String> = anchor
        .emails()
        .map(|email| email_match_key(&email.text_value()))
        .collect();
    for email in incoming.emails() {
        let text = email.text_value();
        let key = email_match_key(&text);
        if existing.contains(&key) {
            continue;
        }
        anchor.add(carried_over(email, EMAIL, text.trim()));
        existing.insert(key);
        report.emails_added += 1;
    }
}

fn fold_birthday(anchor: &mut ContactRecord, incoming: ContactRecord, report: &mut MergeReport) {
    if anchor.birthday().is_some() {
        return;
    }
    if let Some(birthday) = incoming.birthday() {
        let mut birthday = birthday.clone();
        birthday.group = None;
        anchor.add(birthday);
        report.birthdays_filled += 1;
    }
}

/// Copies an incoming entry onto the anchor with a new value. Parameters such
/// as `TYPE=CELL` travel with it; the group does not, since group labels only
/// make sense within the card they came from.
fn carried_over(source: &Property, name: &str, text: &str) -> Property {
    let mut property = Property {
        group: None,
        name: name.to_string(),
        params: source.params.clone(),
        value: String::new(),
    };
    property.set_text_value(text);
    property
}
