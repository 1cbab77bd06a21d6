use std::collections::BTreeMap;

use dashmap::DashMap;
use log::debug;

/// Findings collected while scanning many sources, possibly from several
/// threads at once. Freeze it with [`ScanAccumulator::into_plan`] before
/// editing anything.
pub struct ScanAccumulator<T> {
    entries: DashMap<String, Vec<T>>,
}

impl<T> Default for ScanAccumulator<T> {
    fn default() -> Self {
        ScanAccumulator {
            entries: DashMap::new(),
        }
    }
}

impl<T> ScanAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items recorded for one source keep their recording order.
    pub fn record(&self, source_path: impl Into<String>, item: T) {
        self.entries.entry(source_path.into()).or_default().push(item);
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_plan(self) -> TransformPlan<T> {
        let entries: BTreeMap<String, Vec<T>> = self.entries.into_iter().collect();
        debug!("Scan recorded findings for {} sources", entries.len());
        TransformPlan { entries }
    }
}

/// Read-only view of everything a scan recorded, ordered by source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPlan<T> {
    entries: BTreeMap<String, Vec<T>>,
}

impl<T> TransformPlan<T> {
    pub fn get(&self, source_path: &str) -> &[T] {
        self.entries
            .get(source_path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(source, items)| (source.as_str(), items.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
