//! In-memory gazetteer index

use map_intent_types::GazetteerRecord;
use std::collections::HashMap;

/// Case-insensitive place lookup over the loaded gazetteer records
#[derive(Debug, Default)]
pub struct Gazetteer {
    records: Vec<GazetteerRecord>,
    by_name: HashMap<String, usize>,
    by_region: HashMap<String, usize>,
}

fn key(s: &str) -> String {
    s.trim().to_lowercase()
}

impl Gazetteer {
    pub fn new(records: Vec<GazetteerRecord>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_region = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            // first record wins on duplicates
            by_name.entry(key(&record.name)).or_insert(idx);
            by_region.entry(key(&record.region)).or_insert(idx);
        }
        Self {
            records,
            by_name,
            by_region,
        }
    }

    /// Exact place-name match, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&GazetteerRecord> {
        self.by_name.get(&key(name)).map(|&idx| &self.records[idx])
    }

    /// First record located in `region`, ignoring case
    pub fn find_by_region(&self, region: &str) -> Option<&GazetteerRecord> {
        self.by_region.get(&key(region)).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
