//! Label grouping and summary statistics over an email snapshot

use std::collections::HashMap;

use super::types::Email;

/// Emails sharing one predicted label, in listing order
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGroup {
    pub label: String,
    pub emails: Vec<Email>,
}

impl LabelGroup {
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Aggregate numbers shown above the inbox
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MailStats {
    pub total: usize,
    pub spam_count: usize,
    pub business_count: usize,
    /// Mean confidence as a percentage, one decimal place
    pub avg_confidence_percent: f64,
}

/// Group emails by label, keeping groups in order of first appearance.
///
/// Labels are compared exactly as stored, so "Business" and "business"
/// form separate groups.
pub fn group_by_label(emails: &[Email]) -> Vec<LabelGroup> {
    let mut groups: Vec<LabelGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for email in emails {
        let label = email.label();
        match index.get(label) {
            Some(&i) => groups[i].emails.push(email.clone()),
            None => {
                index.insert(label, groups.len());
                groups.push(LabelGroup {
                    label: label.to_string(),
                    emails: vec![email.clone()],
                });
            }
        }
    }

    groups
}

pub fn compute_stats(emails: &[Email]) -> MailStats {
    if emails.is_empty() {
        return MailStats::default();
    }

    let count_label = |label: &str| {
        emails
            .iter()
            .filter(|e| e.predicted_label.as_deref() == Some(label))
            .count()
    };

    let sum: f64 = emails.iter().map(Email::confidence_or_zero).sum();
    let mean_percent = sum / emails.len() as f64 * 100.0;

    MailStats {
        total: emails.len(),
        spam_count: count_label("spam"),
        business_count: count_label("business"),
        avg_confidence_percent: (mean_percent * 10.0).round() / 10.0,
    }
}

/// Capitalize the first character of a label for display
pub fn display_label(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::fixtures::{email, labeled};

    #[test]
    fn test_groups_follow_first_appearance() {
        let emails = vec![
            labeled("1", Some("social"), 0.8),
            labeled("2", Some("business"), 0.9),
            labeled("3", None, 0.5),
            labeled("4", Some("social"), 0.7),
            labeled("5", Some("business"), 0.6),
        ];

        let groups = group_by_label(&emails);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["social", "business", "Unknown"]);

        let social: Vec<&str> = groups[0]
            .emails
            .iter()
            .map(|e| e.message_id.as_str())
            .collect();
        assert_eq!(social, vec!["1", "4"]);

        let total: usize = groups.iter().map(LabelGroup::len).sum();
        assert_eq!(total, emails.len());
    }

    #[test]
    fn test_group_keys_are_case_preserving() {
        let emails = vec![
            labeled("1", Some("Business"), 0.8),
            labeled("2", Some("business"), 0.8),
        ];
        let groups = group_by_label(&emails);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Business");
    }

    #[test]
    fn test_group_empty_input() {
        assert!(group_by_label(&[]).is_empty());
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(
            compute_stats(&[]),
            MailStats {
                total: 0,
                spam_count: 0,
                business_count: 0,
                avg_confidence_percent: 0.0,
            }
        );
    }

    #[test]
    fn test_stats_counts_and_average() {
        let emails = vec![
            labeled("1", Some("spam"), 0.9),
            labeled("2", Some("business"), 0.8),
            labeled("3", Some("Spam"), 0.7),
            email("4"),
        ];

        let stats = compute_stats(&emails);
        assert_eq!(stats.total, 4);
        // Exact matches only
        assert_eq!(stats.spam_count, 1);
        assert_eq!(stats.business_count, 1);
        // (0.9 + 0.8 + 0.7 + 0) / 4 = 0.6
        assert_eq!(stats.avg_confidence_percent, 60.0);
    }

    #[test]
    fn test_stats_rounds_to_one_decimal() {
        let emails = vec![
            labeled("1", Some("ham"), 0.9),
            labeled("2", Some("ham"), 0.8),
            labeled("3", Some("ham"), 0.8),
        ];
        // 83.333... -> 83.3
        assert_eq!(compute_stats(&emails).avg_confidence_percent, 83.3);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("business"), "Business");
        assert_eq!(display_label("Unknown"), "Unknown");
        assert_eq!(display_label(""), "");
    }
}
