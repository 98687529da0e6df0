use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

/// A journaling prompt row from the `questions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub category: String,
}

/// A user-authored answer row from the `responses` table.
///
/// `question_id` must always reference an existing question; maintenance
/// tooling repoints responses but never deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: i64,
    pub question_id: i64,
    pub user_id: Uuid,
    pub response_text: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub word_count: i64,
    pub is_draft: bool,
}

/// One record of the JSON seed/export format.
///
/// The on-disk field is `question`, not `question_text`, because the seed
/// files predate the database schema. Exports reuse this shape so they can
/// be re-imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub id: i64,
    pub question: String,
    pub category: String,
}

impl SeedRecord {
    pub fn from_question(q: &Question) -> Self {
        Self {
            id: q.id,
            question: q.question_text.clone(),
            category: q.category.clone(),
        }
    }
}

impl From<SeedRecord> for Question {
    fn from(record: SeedRecord) -> Self {
        Question {
            id: record.id,
            question_text: record.question,
            category: record.category,
        }
    }
}

/// One group of questions sharing the same text under a normalization
/// policy. `ids` is ascending, so `ids[0]` is the canonical (oldest) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub text: String,
    pub count: usize,
    pub ids: Vec<i64>,
}

impl DuplicateGroup {
    /// The row that survives deduplication: the minimum id in the group.
    pub fn canonical_id(&self) -> i64 {
        self.ids[0]
    }

    /// The rows deduplication would delete.
    pub fn duplicate_ids(&self) -> &[i64] {
        &self.ids[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_record_round_trips_through_question() {
        let record = SeedRecord {
            id: 7,
            question: "What is courage?".to_string(),
            category: "philosophy".to_string(),
        };
        let question: Question = record.clone().into();
        assert_eq!(SeedRecord::from_question(&question), record);
    }

    #[test]
    fn test_seed_record_json_field_names() {
        let record = SeedRecord {
            id: 1,
            question: "How do you approach first dates?".to_string(),
            category: "dating".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["question"], "How do you approach first dates?");
        assert_eq!(json["category"], "dating");
    }

    #[test]
    fn test_duplicate_group_canonical_is_first_id() {
        let group = DuplicateGroup {
            text: "What is courage?".to_string(),
            count: 3,
            ids: vec![2, 9, 14],
        };
        assert_eq!(group.canonical_id(), 2);
        assert_eq!(group.duplicate_ids(), &[9, 14]);
    }
}
