//! VK data shapes the bot works with.

use serde::Deserialize;

use crate::database::Sex;

/// City reference as VK embeds it in a profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct City {
    pub id: i64,
    pub title: String,
}

/// Result of `users.get`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub city: Option<City>,
    /// `d.m.yyyy`, `d.m` or absent depending on privacy settings.
    #[serde(default)]
    pub bdate: Option<String>,
    #[serde(default = "closed_by_default")]
    pub is_closed: bool,
    #[serde(default)]
    pub domain: Option<String>,
    /// `deleted` or `banned`.
    #[serde(default)]
    pub deactivated: Option<String>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    pub fn link(&self) -> String {
        profile_link(self.id, self.domain.as_deref())
    }
}

/// A search hit offered to the requester.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub sex: Sex,
    /// Closed profiles are never offered.
    #[serde(default = "closed_by_default")]
    pub is_closed: bool,
    #[serde(default)]
    pub domain: Option<String>,
    /// Filled by the matcher once the candidate is chosen.
    #[serde(skip)]
    pub photos: Vec<String>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    pub fn link(&self) -> String {
        profile_link(self.id, self.domain.as_deref())
    }
}

/// Parameters of one `users.search` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// `Sex::Unknown` searches both.
    pub sex: Sex,
    pub age_from: u32,
    pub age_to: u32,
    pub city_id: i64,
    pub offset: u32,
    pub count: u32,
}

/// Entry of `photos.get` with `extended=1`.
#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub likes: Likes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Likes {
    #[serde(default)]
    pub count: u64,
}

impl Photo {
    /// Attachment reference for `messages.send`.
    pub fn attachment(&self) -> String {
        format!("photo{}_{}", self.owner_id, self.id)
    }
}

/// Most liked first, truncated to `count`. Ties keep VK's order.
pub fn rank_photos(mut photos: Vec<Photo>, count: usize) -> Vec<String> {
    photos.sort_by(|a, b| b.likes.count.cmp(&a.likes.count));
    photos.iter().take(count).map(Photo::attachment).collect()
}

// A missing flag means we could not see the profile.
fn closed_by_default() -> bool {
    true
}

fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_string()
}

fn profile_link(id: i64, domain: Option<&str>) -> String {
    match domain.filter(|d| !d.is_empty()) {
        Some(domain) => format!("https://vk.com/{}", domain),
        None => format!("https://vk.com/id{}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: i64, likes: u64) -> Photo {
        Photo {
            id,
            owner_id: 42,
            likes: Likes { count: likes },
        }
    }

    #[test]
    fn test_rank_photos_by_likes() {
        let ranked = rank_photos(vec![photo(1, 5), photo(2, 50), photo(3, 0), photo(4, 20)], 3);
        assert_eq!(ranked, vec!["photo42_2", "photo42_4", "photo42_1"]);
    }

    #[test]
    fn test_rank_photos_fewer_than_requested() {
        assert_eq!(rank_photos(vec![photo(9, 1)], 3), vec!["photo42_9"]);
        assert!(rank_photos(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_candidate_from_search_item() {
        let raw = r#"{"id": 7, "first_name": "Анна", "last_name": "К", "sex": 1,
                      "is_closed": false, "domain": "anna", "can_access_closed": true}"#;
        let candidate: Candidate = serde_json::from_str(raw).unwrap();
        assert_eq!(candidate.sex, Sex::Female);
        assert!(!candidate.is_closed);
        assert_eq!(candidate.link(), "https://vk.com/anna");
        assert!(candidate.photos.is_empty());
    }

    #[test]
    fn test_missing_visibility_counts_as_closed() {
        let candidate: Candidate = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert!(candidate.is_closed);
        assert_eq!(candidate.link(), "https://vk.com/id7");
    }

    #[test]
    fn test_profile_with_city_and_birth_date() {
        let raw = r#"{"id": 1, "first_name": "Иван", "last_name": "П", "sex": 2,
                      "city": {"id": 2, "title": "Санкт-Петербург"}, "bdate": "14.3.1996",
                      "is_closed": false}"#;
        let profile: Profile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.city.as_ref().map(|c| c.id), Some(2));
        assert_eq!(profile.bdate.as_deref(), Some("14.3.1996"));
        assert_eq!(profile.full_name(), "Иван П");
    }
}
