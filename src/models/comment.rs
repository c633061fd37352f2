use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

fn anonymous() -> String {
    ANONYMOUS_AUTHOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i64,
    pub body: String,
    pub created_at: String,
    #[serde(default = "anonymous")]
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
}

impl Comment {
    pub fn is_placeholder(&self) -> bool {
        self.id < 0
    }
}

#[derive(Debug, Error)]
#[error("invalid timestamp '{0}'")]
pub struct InvalidTimestamp(pub String);

impl TryFrom<CommentDto> for Comment {
    type Error = InvalidTimestamp;

    fn try_from(dto: CommentDto) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&dto.created_at)
            .ok_or_else(|| InvalidTimestamp(dto.created_at.clone()))?;

        Ok(Self {
            id: dto.id,
            body: dto.body,
            created_at,
            author_name: dto.author_name,
        })
    }
}

// The backend writes naive timestamps; those are UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Serialize)]
pub struct CreateComment {
    pub body: String,
}
