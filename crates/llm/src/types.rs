//! Completion mode selection.

/// How completions are requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteMode {
    /// REST inference endpoint (server-sent events)
    Api,
    /// `SNOWFLAKE.CORTEX.COMPLETE` through the SQL API
    Sql,
}

impl CompleteMode {
    /// Parse a mode from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "api" | "rest" => Some(Self::Api),
            "sql" => Some(Self::Sql),
            _ => None,
        }
    }

    /// Get the canonical mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Sql => "sql",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(CompleteMode::parse("API"), Some(CompleteMode::Api));
        assert_eq!(CompleteMode::parse("rest"), Some(CompleteMode::Api));
        assert_eq!(CompleteMode::parse(" sql "), Some(CompleteMode::Sql));
        assert_eq!(CompleteMode::parse("grpc"), None);
    }

    #[test]
    fn test_mode_round_trip() {
        for mode in [CompleteMode::Api, CompleteMode::Sql] {
            assert_eq!(CompleteMode::parse(mode.as_str()), Some(mode));
        }
    }
}
