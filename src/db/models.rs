/// Data models for database entities
///
/// Row types map to database tables and use sqlx for type-safe queries.
/// View types are the plain-data exports handed back to callers.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row in the users table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    #[sqlx(rename = "nameOfStudent")]
    pub name_of_student: String,
    #[sqlx(rename = "nameOfClass")]
    pub name_of_class: String,
    #[sqlx(rename = "nameOfHomework")]
    pub name_of_homework: String,
    #[sqlx(rename = "dateDue")]
    pub date_due: String,
}

/// A row in the posts table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct PostRow {
    pub id: i64,
    pub note: String,
    pub image: Option<String>,
    #[sqlx(rename = "userID")]
    pub user_id: i64,
}

/// The writable columns of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFields {
    pub name_of_student: String,
    pub name_of_class: String,
    pub name_of_homework: String,
    pub date_due: String,
}

/// Input for inserting a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostInput {
    pub note: String,
    pub image: Option<String>,
}

/// Exported view of a user: the four named fields, no id and no posts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub name_of_student: String,
    pub name_of_class: String,
    pub name_of_homework: String,
    pub date_due: String,
}

/// Exported view of a post, image bytes included as base64 text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostView {
    pub id: Option<i64>,
    #[serde(rename = "userID")]
    pub user_id: Option<i64>,
    pub note: String,
    pub image: Option<String>,
    pub base64: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_view_keys() {
        let view = UserView {
            name_of_student: "Ellie P".to_string(),
            name_of_class: "AP Bio".to_string(),
            name_of_homework: "Portfolio".to_string(),
            date_due: "1/23/23".to_string(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["nameOfStudent"], "Ellie P");
        assert_eq!(json["nameOfClass"], "AP Bio");
        assert_eq!(json["nameOfHomework"], "Portfolio");
        assert_eq!(json["dateDue"], "1/23/23");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_post_view_keys() {
        let view = PostView {
            id: Some(3),
            user_id: Some(1),
            note: "read ch. 4".to_string(),
            image: None,
            base64: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userID"], 1);
        assert!(json["base64"].is_null());
    }
}
