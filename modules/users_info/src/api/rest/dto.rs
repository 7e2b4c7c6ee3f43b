use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::contract::model::{AgeRanges, User, UserStats};

/// REST representation of a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub age: u32,
    #[serde(with = "crate::time_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::time_format")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeRangesDto {
    #[serde(rename = "18-25")]
    pub from_18_to_25: usize,
    #[serde(rename = "26-35")]
    pub from_26_to_35: usize,
    #[serde(rename = "36-50")]
    pub from_36_to_50: usize,
    #[serde(rename = "50+")]
    pub over_50: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_users: usize,
    pub average_age: u32,
    pub age_ranges: AgeRangesDto,
    pub recent_users: Vec<UserDto>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<AgeRanges> for AgeRangesDto {
    fn from(r: AgeRanges) -> Self {
        Self {
            from_18_to_25: r.from_18_to_25,
            from_26_to_35: r.from_26_to_35,
            from_36_to_50: r.from_36_to_50,
            over_50: r.over_50,
        }
    }
}

impl From<UserStats> for StatsDto {
    fn from(s: UserStats) -> Self {
        Self {
            total_users: s.total_users,
            average_age: s.average_age,
            age_ranges: s.age_ranges.into(),
            recent_users: s.recent_users.into_iter().map(UserDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn user_dto_is_camel_case_with_millis() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let dto = UserDto::from(User {
            id: 1,
            name: "Ana".into(),
            email: "ana@x.com".into(),
            age: 28,
            created_at: at,
            updated_at: at,
        });
        assert_eq!(
            serde_json::to_value(dto).unwrap(),
            json!({
                "id": 1,
                "name": "Ana",
                "email": "ana@x.com",
                "age": 28,
                "createdAt": "2024-01-02T03:04:05.000Z",
                "updatedAt": "2024-01-02T03:04:05.000Z"
            })
        );
    }

    #[test]
    fn stats_dto_uses_range_labels() {
        let dto = StatsDto::from(UserStats {
            total_users: 2,
            average_age: 40,
            age_ranges: AgeRanges {
                from_18_to_25: 0,
                from_26_to_35: 1,
                from_36_to_50: 0,
                over_50: 1,
            },
            recent_users: vec![],
        });
        assert_eq!(
            serde_json::to_value(dto).unwrap(),
            json!({
                "totalUsers": 2,
                "averageAge": 40,
                "ageRanges": { "18-25": 0, "26-35": 1, "36-50": 0, "50+": 1 },
                "recentUsers": []
            })
        );
    }
}
