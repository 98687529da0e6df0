/// SQL schema for the Daybook journaling database
/// Creates both tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Journaling prompts, seeded in bulk from JSON and occasionally hand-edited
CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY,
    question_text TEXT NOT NULL,
    category TEXT NOT NULL
);

-- User answers; question_id must always reference a live question
CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY,
    question_id INTEGER NOT NULL,
    user_id TEXT NOT NULL,
    response_text TEXT NOT NULL,
    created_at TEXT NOT NULL,
    word_count INTEGER NOT NULL DEFAULT 0,
    is_draft INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (question_id) REFERENCES questions(id)
);

-- Indexes for efficient lookups
CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
CREATE INDEX IF NOT EXISTS idx_responses_question_id ON responses(question_id);
CREATE INDEX IF NOT EXISTS idx_responses_user_id ON responses(user_id);
"#;

/// Small fixture set used by tests and local smoke runs. Contains two
/// duplicate groups (one exact, one differing only by case/whitespace) and
/// responses hanging off the non-canonical rows.
pub const TEST_DATA: &str = r#"
INSERT OR IGNORE INTO questions (id, question_text, category) VALUES
    (1, 'How do you approach first dates?', 'dating'),
    (5, 'How do you approach first dates?', 'dating'),
    (9, 'What is courage?', 'philosophy'),
    (12, 'what is courage?  ', 'philosophy'),
    (14, 'What does home mean to you?', 'identity');

INSERT OR IGNORE INTO responses (id, question_id, user_id, response_text, created_at, word_count, is_draft) VALUES
    (50, 5, '0c6f2f6e-8f4a-4bb1-9f6e-2a1f1f0e9d01', 'Slowly, with coffee.', '2024-03-01T09:30:00Z', 3, 0),
    (51, 9, '0c6f2f6e-8f4a-4bb1-9f6e-2a1f1f0e9d01', 'Acting despite fear.', '2024-03-02T21:10:00Z', 3, 0),
    (52, 12, '7d8e5a20-1b3c-4f7d-8e9a-5c6b7a8d9e02', 'Still drafting this one.', '2024-03-04T08:00:00Z', 4, 1);
"#;
