use crate::contract::model::{AgeRanges, User, UserStats};

/// How many users `recent_users` carries.
pub const RECENT_USERS_LIMIT: usize = 5;

pub fn compute(users: &[User]) -> UserStats {
    let mut ranges = AgeRanges::default();
    for u in users {
        match u.age {
            18..=25 => ranges.from_18_to_25 += 1,
            26..=35 => ranges.from_26_to_35 += 1,
            36..=50 => ranges.from_36_to_50 += 1,
            51..=u32::MAX => ranges.over_50 += 1,
            _ => {}
        }
    }

    // sort_by is stable: equal timestamps keep insertion order
    let mut recent = users.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_USERS_LIMIT);

    UserStats {
        total_users: users.len(),
        average_age: average_age(users),
        age_ranges: ranges,
        recent_users: recent,
    }
}

/// Mean age rounded half up, 0 for an empty slice.
fn average_age(users: &[User]) -> u32 {
    if users.is_empty() {
        return 0;
    }
    let n = users.len() as u64;
    let sum: u64 = users.iter().map(|u| u64::from(u.age)).sum();
    ((2 * sum + n) / (2 * n)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn users_aged(ages: &[u32]) -> Vec<User> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ages.iter()
            .enumerate()
            .map(|(i, &age)| {
                let at = base + Duration::minutes(i as i64);
                User {
                    id: i as u64 + 1,
                    name: format!("User {i}"),
                    email: format!("user{i}@example.com"),
                    age,
                    created_at: at,
                    updated_at: at,
                }
            })
            .collect()
    }

    #[test]
    fn buckets_and_average() {
        let stats = compute(&users_aged(&[20, 30, 50, 51]));
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.average_age, 38);
        assert_eq!(
            stats.age_ranges,
            AgeRanges {
                from_18_to_25: 1,
                from_26_to_35: 1,
                from_36_to_50: 1,
                over_50: 1,
            }
        );
    }

    #[test]
    fn bucket_edges() {
        let stats = compute(&users_aged(&[17, 18, 25, 26, 35, 36, 50, 51, 120]));
        assert_eq!(stats.age_ranges.from_18_to_25, 2);
        assert_eq!(stats.age_ranges.from_26_to_35, 2);
        assert_eq!(stats.age_ranges.from_36_to_50, 2);
        assert_eq!(stats.age_ranges.over_50, 2);
    }

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(compute(&users_aged(&[20, 21])).average_age, 21);
        assert_eq!(compute(&users_aged(&[20, 20, 21])).average_age, 20);
    }

    #[test]
    fn empty_collection() {
        let stats = compute(&[]);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.average_age, 0);
        assert_eq!(stats.age_ranges, AgeRanges::default());
        assert!(stats.recent_users.is_empty());
    }

    #[test]
    fn recent_users_newest_first_capped() {
        let stats = compute(&users_aged(&[20, 21, 22, 23, 24, 25, 26]));
        let ids: Vec<u64> = stats.recent_users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn recent_users_ties_keep_insertion_order() {
        let mut users = users_aged(&[30, 31, 32]);
        let at = users[0].created_at;
        for u in &mut users {
            u.created_at = at;
        }
        let ids: Vec<u64> = compute(&users).recent_users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
