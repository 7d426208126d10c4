//! SQLite schema definitions and SQL query constants.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Accounts table
CREATE TABLE IF NOT EXISTS accounts (
    number TEXT PRIMARY KEY,
    profile_name TEXT,
    access_key BLOB,
    devices TEXT NOT NULL DEFAULT '[]'
);
"#;

pub const INSERT_ACCOUNT: &str = r#"
INSERT INTO accounts (number, profile_name, access_key, devices)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const SELECT_ACCOUNT_BY_NUMBER: &str = r#"
SELECT number, profile_name, access_key, devices
FROM accounts
WHERE number = ?1
"#;
