use chrono::{ Local, NaiveDateTime };
use serde::{ Serialize, Deserialize };
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "You")]
    User,
    #[serde(rename = "Bot")]
    Bot,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "Bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One logged turn of the conversation. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub timestamp: String,
    pub role: Role,
    pub text: String,
}

impl MessageRecord {
    /// Stamps the record with the current local time.
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        Self::at(Local::now().naive_local(), role, text)
    }

    pub fn at(time: NaiveDateTime, role: Role, text: impl Into<String>) -> Self {
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            role,
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<MessageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_record_uses_fixed_timestamp_format() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        let record = MessageRecord::at(time, Role::User, "Hello");
        assert_eq!(record.timestamp, "2024-03-09 07:05:01");
    }

    #[test]
    fn test_role_serializes_as_display_label() {
        let record = MessageRecord {
            timestamp: "2024-03-09 07:05:01".to_string(),
            role: Role::Bot,
            text: "Hi there!".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["role"], "Bot");
        assert_eq!(json["text"], "Hi there!");

        let user: Role = serde_json::from_str("\"You\"").unwrap();
        assert_eq!(user, Role::User);
    }
}
