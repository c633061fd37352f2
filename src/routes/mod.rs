#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    PaperDetail { id: i64 },
    NotFound,
}

impl Route {
    // A leading `#`, the query string and a trailing slash are ignored.
    pub fn resolve(path: &str) -> Self {
        let path = path.trim().trim_start_matches('#');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["", ""] => Self::List,
            ["", "paper", id] => id
                .parse::<i64>()
                .map(|id| Self::PaperDetail { id })
                .unwrap_or(Self::NotFound),
            _ => Self::NotFound,
        }
    }

    pub fn path(&self) -> Option<String> {
        match self {
            Self::List => Some("/".to_string()),
            Self::PaperDetail { id } => Some(format!("/paper/{}", id)),
            Self::NotFound => None,
        }
    }
}
