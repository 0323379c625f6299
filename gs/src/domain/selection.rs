//! Keep/hide selection over detected yard features

use std::collections::HashSet;

/// Detected features in detection order, plus the subset to preserve
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSelection {
    detected: Vec<String>,
    selected: HashSet<String>,
}

impl FeatureSelection {
    /// Build from detector output with every feature kept
    ///
    /// Blank labels are dropped and duplicates collapse to their first
    /// occurrence.
    pub fn from_detected<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut detected: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into().trim().to_string();
            if !label.is_empty() && !detected.contains(&label) {
                detected.push(label);
            }
        }
        let selected = detected.iter().cloned().collect();
        Self { detected, selected }
    }

    /// Flip whether `label` is kept
    ///
    /// Returns the new membership, or `None` if `label` was never detected.
    pub fn toggle(&mut self, label: &str) -> Option<bool> {
        if !self.detected.iter().any(|d| d == label) {
            return None;
        }
        if self.selected.remove(label) {
            Some(false)
        } else {
            self.selected.insert(label.to_string());
            Some(true)
        }
    }

    /// Keep only the detected features matching `labels` (case-insensitive)
    ///
    /// Returns the labels that matched nothing.
    pub fn keep_only(&mut self, labels: &[String]) -> Vec<String> {
        let mut unmatched = Vec::new();
        let mut selected = HashSet::new();
        for wanted in labels {
            match self.detected.iter().find(|d| d.eq_ignore_ascii_case(wanted.trim())) {
                Some(found) => {
                    selected.insert(found.clone());
                }
                None => unmatched.push(wanted.clone()),
            }
        }
        self.selected = selected;
        unmatched
    }

    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.contains(label)
    }

    pub fn detected(&self) -> &[String] {
        &self.detected
    }

    /// Kept features in detection order
    pub fn kept(&self) -> Vec<String> {
        self.detected
            .iter()
            .filter(|d| self.selected.contains(*d))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.detected.is_empty()
    }
}
