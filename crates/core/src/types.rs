/// Primary key of every table (`BIGSERIAL`).
pub type DbId = i64;

pub type Timestamp = chrono::DateTime<chrono::Utc>;
