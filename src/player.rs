use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::lookup::LookupError;

pub const DEFAULT_NUMBER: &str = "0";
pub const DEFAULT_ID: &str = "N/A";
pub const DEFAULT_TEXT: &str = "None";

/// A single scalar value from the lookup API, kept in its rendered form.
///
/// The API is loose about types (ids come back as numbers or strings), so any
/// JSON scalar is accepted. Nested arrays or objects are kept as compact JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar(String);

impl Scalar {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let rendered = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(Scalar(rendered))
    }
}

/// Renders an optional field, falling back to `default` when absent.
pub fn field<'a>(value: &'a Option<Scalar>, default: &'a str) -> &'a str {
    value.as_ref().map(Scalar::as_str).unwrap_or(default)
}

fn is_present(value: &Option<Scalar>) -> bool {
    value.as_ref().is_some_and(|v| !v.as_str().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicInfo {
    pub nickname: Option<Scalar>,
    pub account_id: Option<Scalar>,
    pub region: Option<Scalar>,
    pub level: Option<Scalar>,
    pub liked: Option<Scalar>,
    pub exp: Option<Scalar>,
    pub br_rank: Option<Scalar>,
    pub cs_rank: Option<Scalar>,
    pub br_max_rank: Option<Scalar>,
    pub cs_max_rank: Option<Scalar>,
    pub title: Option<Scalar>,
    pub banner_id: Option<Scalar>,
    pub head_pic: Option<Scalar>,
    pub release_version: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClanInfo {
    pub clan_name: Option<Scalar>,
    pub clan_id: Option<Scalar>,
    pub clan_level: Option<Scalar>,
    pub member_num: Option<Scalar>,
    pub capacity: Option<Scalar>,
    pub captain_id: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptainInfo {
    pub nickname: Option<Scalar>,
    pub account_id: Option<Scalar>,
    pub region: Option<Scalar>,
    pub level: Option<Scalar>,
    pub liked: Option<Scalar>,
    pub br_rank: Option<Scalar>,
    pub cs_rank: Option<Scalar>,
    pub br_ranking_points: Option<Scalar>,
    pub cs_ranking_points: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PetInfo {
    pub id: Option<Scalar>,
    pub level: Option<Scalar>,
    pub exp: Option<Scalar>,
    pub skin_id: Option<Scalar>,
    pub selected_skill_id: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreditScoreInfo {
    pub credit_score: Option<Scalar>,
    pub periodic_summary_start_time: Option<Scalar>,
    pub periodic_summary_end_time: Option<Scalar>,
    pub reward_state: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialInfo {
    pub br_rank_show: Option<Scalar>,
    pub cs_rank_show: Option<Scalar>,
    pub signature: Option<Scalar>,
}

/// Parsed lookup API response.
///
/// Optional sections are `None` when missing, not an object, or lacking the
/// field that marks them as populated (clan id, captain account id, pet id,
/// credit score).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub basic: BasicInfo,
    pub clan: Option<ClanInfo>,
    pub captain: Option<CaptainInfo>,
    pub pet: Option<PetInfo>,
    pub credit: Option<CreditScoreInfo>,
    pub social: SocialInfo,
}

impl PlayerRecord {
    /// Validates the shape of a decoded response body and extracts every section.
    ///
    /// A body that is not an object is `InvalidFormat`; an object without a
    /// non-empty `basicInfo` object means the player does not exist.
    pub fn from_value(value: Value) -> Result<Self, LookupError> {
        let Value::Object(map) = value else {
            return Err(LookupError::InvalidFormat);
        };

        let basic = match map.get("basicInfo") {
            Some(Value::Object(obj)) if !obj.is_empty() => {
                section::<BasicInfo>(&map, "basicInfo").ok_or(LookupError::InvalidFormat)?
            }
            _ => return Err(LookupError::NotFound),
        };

        Ok(Self {
            basic,
            clan: section::<ClanInfo>(&map, "clanBasicInfo").filter(|c| is_present(&c.clan_id)),
            captain: section::<CaptainInfo>(&map, "captainBasicInfo")
                .filter(|c| is_present(&c.account_id)),
            pet: section::<PetInfo>(&map, "petInfo").filter(|p| is_present(&p.id)),
            credit: section::<CreditScoreInfo>(&map, "creditScoreInfo")
                .filter(|c| is_present(&c.credit_score)),
            social: section::<SocialInfo>(&map, "socialInfo").unwrap_or_default(),
        })
    }
}

fn section<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    match map.get(key) {
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_body_is_invalid_format() {
        let err = PlayerRecord::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, LookupError::InvalidFormat));
    }

    #[test]
    fn test_missing_basic_info_is_not_found() {
        let err = PlayerRecord::from_value(json!({ "error": "bad uid" })).unwrap_err();
        assert!(matches!(err, LookupError::NotFound));

        let err = PlayerRecord::from_value(json!({ "basicInfo": {} })).unwrap_err();
        assert!(matches!(err, LookupError::NotFound));

        let err = PlayerRecord::from_value(json!({ "basicInfo": null })).unwrap_err();
        assert!(matches!(err, LookupError::NotFound));
    }

    #[test]
    fn test_scalars_accept_mixed_types() {
        let record = PlayerRecord::from_value(json!({
            "basicInfo": {
                "nickname": "Foo",
                "accountId": 10000001,
                "level": 65,
                "title": null,
                "headPic": ["a", 1]
            },
            "socialInfo": { "brRankShow": true }
        }))
        .unwrap();

        assert_eq!(field(&record.basic.nickname, DEFAULT_ID), "Foo");
        assert_eq!(field(&record.basic.account_id, DEFAULT_ID), "10000001");
        assert_eq!(field(&record.basic.level, DEFAULT_NUMBER), "65");
        assert_eq!(field(&record.basic.title, DEFAULT_ID), "N/A");
        assert_eq!(field(&record.basic.head_pic, DEFAULT_ID), r#"["a",1]"#);
        assert_eq!(field(&record.social.br_rank_show, DEFAULT_ID), "true");
    }

    #[test]
    fn test_optional_sections_need_presence_field() {
        let record = PlayerRecord::from_value(json!({
            "basicInfo": { "nickname": "Foo" },
            "clanBasicInfo": { "clanName": "" },
            "captainBasicInfo": { "accountId": 555 },
            "petInfo": "not an object",
            "creditScoreInfo": { "creditScore": 100 }
        }))
        .unwrap();

        assert!(record.clan.is_none());
        assert!(record.captain.is_some());
        assert!(record.pet.is_none());
        assert!(record.credit.is_some());
        assert_eq!(record.social, SocialInfo::default());
    }

    #[test]
    fn test_missing_social_section_uses_defaults() {
        let record = PlayerRecord::from_value(json!({ "basicInfo": { "level": 1 } })).unwrap();
        assert_eq!(field(&record.social.signature, DEFAULT_TEXT), "None");
    }
}
