/// Homework records
///
/// A user is one homework assignment for one student: the class, the
/// assignment and its due date. Class, homework and due date are each unique
/// across all users. Users own their posts; deleting a user deletes them.

use crate::core::Post;
use crate::db::{Database, UserFields, UserRow, UserView};
use crate::error::{NotesError, Result};
use chrono::NaiveDate;
use std::fmt;

/// Due dates are written like 1/22/23
const DUE_DATE_FORMAT: &str = "%m/%d/%y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Option<i64>,
    name_of_student: String,
    name_of_class: String,
    name_of_homework: String,
    date_due: String,
    posts: Vec<Post>,
}

/// Field changes for [`User::update`]
///
/// Empty strings mean "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name_of_student: String,
    pub name_of_class: String,
    pub name_of_homework: String,
    pub date_due: String,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name_of_student.is_empty()
            && self.name_of_class.is_empty()
            && self.name_of_homework.is_empty()
            && self.date_due.is_empty()
    }

    fn apply(&self, current: &UserFields) -> UserFields {
        let pick = |new: &String, old: &String| {
            if new.is_empty() {
                old.clone()
            } else {
                new.clone()
            }
        };

        UserFields {
            name_of_student: pick(&self.name_of_student, &current.name_of_student),
            name_of_class: pick(&self.name_of_class, &current.name_of_class),
            name_of_homework: pick(&self.name_of_homework, &current.name_of_homework),
            date_due: pick(&self.date_due, &current.date_due),
        }
    }
}

impl User {
    pub fn new(
        name_of_student: impl Into<String>,
        name_of_class: impl Into<String>,
        name_of_homework: impl Into<String>,
        date_due: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name_of_student: name_of_student.into(),
            name_of_class: name_of_class.into(),
            name_of_homework: name_of_homework.into(),
            date_due: date_due.into(),
            posts: Vec::new(),
        }
    }

    fn from_row(row: UserRow, posts: Vec<Post>) -> Self {
        Self {
            id: Some(row.id),
            name_of_student: row.name_of_student,
            name_of_class: row.name_of_class,
            name_of_homework: row.name_of_homework,
            date_due: row.date_due,
            posts,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name_of_student(&self) -> &str {
        &self.name_of_student
    }

    pub fn set_name_of_student(&mut self, name_of_student: impl Into<String>) {
        self.name_of_student = name_of_student.into();
    }

    pub fn name_of_class(&self) -> &str {
        &self.name_of_class
    }

    pub fn set_name_of_class(&mut self, name_of_class: impl Into<String>) {
        self.name_of_class = name_of_class.into();
    }

    pub fn name_of_homework(&self) -> &str {
        &self.name_of_homework
    }

    pub fn set_name_of_homework(&mut self, name_of_homework: impl Into<String>) {
        self.name_of_homework = name_of_homework.into();
    }

    pub fn date_due(&self) -> &str {
        &self.date_due
    }

    pub fn set_date_due(&mut self, date_due: impl Into<String>) {
        self.date_due = date_due.into();
    }

    /// Parse `date_due` as a calendar date, if it looks like 1/22/23
    pub fn due_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_due.trim(), DUE_DATE_FORMAT).ok()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Stage a note to be written together with the user by [`User::create`].
    ///
    /// Only useful before the first `create`; a saved user refuses to be
    /// created again. Use [`User::attach_post`] on saved users.
    pub fn add_post(&mut self, note: impl Into<String>, image: Option<String>) {
        self.posts.push(Post::draft(self.id, note.into(), image));
    }

    /// Write a new note for a saved user right away
    pub async fn attach_post(
        &mut self,
        db: &Database,
        note: impl Into<String>,
        image: Option<String>,
    ) -> Result<&Post> {
        let id = self.id.ok_or(NotesError::NotPersisted("User"))?;
        let post = Post::new(id, note, image).create(db).await?;
        self.posts.push(post);
        Ok(&self.posts[self.posts.len() - 1])
    }

    fn fields(&self) -> UserFields {
        UserFields {
            name_of_student: self.name_of_student.clone(),
            name_of_class: self.name_of_class.clone(),
            name_of_homework: self.name_of_homework.clone(),
            date_due: self.date_due.clone(),
        }
    }

    /// Insert this user and its attached posts in one transaction
    ///
    /// # Returns
    /// * `Ok(User)` - The user with ids filled in
    /// * `Err(NotesError::ConstraintViolation)` - Class, homework or due date
    ///   already taken. Nothing was written.
    /// * `Err(NotesError::AlreadyCreated)` - This user is already saved
    pub async fn create(mut self, db: &Database) -> Result<Self> {
        if self.id.is_some() {
            return Err(NotesError::AlreadyCreated("User"));
        }

        let inputs: Vec<_> = self.posts.iter().map(Post::input).collect();
        let (id, post_ids) = db.insert_user(&self.fields(), &inputs).await?;

        self.id = Some(id);
        for (post, post_id) in self.posts.iter_mut().zip(post_ids) {
            post.mark_created(post_id, id);
        }

        Ok(self)
    }

    /// Export the four named fields
    pub fn read(&self) -> UserView {
        UserView {
            name_of_student: self.name_of_student.clone(),
            name_of_class: self.name_of_class.clone(),
            name_of_homework: self.name_of_homework.clone(),
            date_due: self.date_due.clone(),
        }
    }

    /// Overwrite every non-empty field of `changes` and commit
    ///
    /// On error the record in memory is left as it was.
    pub async fn update(&mut self, db: &Database, changes: UserUpdate) -> Result<&Self> {
        let id = self.id.ok_or(NotesError::NotPersisted("User"))?;
        let fields = changes.apply(&self.fields());

        if !db.update_user(id, &fields).await? {
            return Err(NotesError::UserNotFound(id));
        }

        self.name_of_student = fields.name_of_student;
        self.name_of_class = fields.name_of_class;
        self.name_of_homework = fields.name_of_homework;
        self.date_due = fields.date_due;

        Ok(self)
    }

    /// Delete this user and, by cascade, all of its posts
    pub async fn delete(self, db: &Database) -> Result<()> {
        let id = self.id.ok_or(NotesError::NotPersisted("User"))?;

        if !db.delete_user(id).await? {
            return Err(NotesError::UserNotFound(id));
        }

        Ok(())
    }

    /// Load a user and its posts
    pub async fn find(db: &Database, id: i64) -> Result<Self> {
        let row = db
            .get_user_by_id(id)
            .await?
            .ok_or(NotesError::UserNotFound(id))?;
        let posts = Post::for_user(db, id).await?;

        Ok(Self::from_row(row, posts))
    }

    /// Load every user with its posts
    pub async fn all(db: &Database) -> Result<Vec<Self>> {
        let rows = db.get_all_users().await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let posts = Post::for_user(db, row.id).await?;
            users.push(Self::from_row(row, posts));
        }

        Ok(users)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.read()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sean() -> User {
        User::new("Sean Y", "APCSP", "Make A Table", "1/22/23")
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let db = Database::new_test().await.unwrap();

        let user = sean().create(&db).await.unwrap();
        assert!(user.id().is_some());

        let loaded = User::find(&db, user.id().unwrap()).await.unwrap();
        let view = loaded.read();
        assert_eq!(view.name_of_student, "Sean Y");
        assert_eq!(view.name_of_class, "APCSP");
        assert_eq!(view.name_of_homework, "Make A Table");
        assert_eq!(view.date_due, "1/22/23");
    }

    #[tokio::test]
    async fn test_duplicate_class_rejected() {
        let db = Database::new_test().await.unwrap();
        sean().create(&db).await.unwrap();

        let result = User::new("Kaylee H", "APCSP", "API", "1/25/23")
            .create(&db)
            .await;

        assert!(result.unwrap_err().is_constraint_violation());
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_homework_and_due_rejected() {
        let db = Database::new_test().await.unwrap();
        sean().create(&db).await.unwrap();

        let same_homework = User::new("Ellie P", "AP Bio", "Make A Table", "1/23/23");
        assert!(same_homework
            .create(&db)
            .await
            .unwrap_err()
            .is_constraint_violation());

        let same_due = User::new("Ellie P", "AP Bio", "Portfolio", "1/22/23");
        assert!(same_due
            .create(&db)
            .await
            .unwrap_err()
            .is_constraint_violation());

        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_with_posts() {
        let db = Database::new_test().await.unwrap();

        let mut user = sean();
        user.add_post("first", Some("ncs_logo.png".to_string()));
        user.add_post("second", None);
        let user = user.create(&db).await.unwrap();

        let id = user.id().unwrap();
        assert!(user.posts().iter().all(|p| p.user_id() == Some(id)));
        assert!(user.posts().iter().all(|p| p.id().is_some()));

        let loaded = User::find(&db, id).await.unwrap();
        assert_eq!(loaded.posts().len(), 2);
        assert_eq!(loaded.posts()[1].note(), "second");
    }

    #[tokio::test]
    async fn test_delete_cascades_to_posts() {
        let db = Database::new_test().await.unwrap();

        let mut user = sean();
        user.add_post("a", None);
        user.add_post("b", None);
        let user = user.create(&db).await.unwrap();
        let id = user.id().unwrap();

        let mut other = User::new("Ellie P", "AP Bio", "Portfolio", "1/23/23");
        other.add_post("keep me", None);
        let other = other.create(&db).await.unwrap();

        user.delete(&db).await.unwrap();

        assert!(Post::for_user(&db, id).await.unwrap().is_empty());
        assert!(matches!(
            User::find(&db, id).await,
            Err(NotesError::UserNotFound(_))
        ));
        assert_eq!(
            Post::for_user(&db, other.id().unwrap()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_with_nothing_changes_nothing() {
        let db = Database::new_test().await.unwrap();
        let mut user = sean().create(&db).await.unwrap();
        let before = user.read();

        user.update(&db, UserUpdate::default()).await.unwrap();

        assert_eq!(user.read(), before);
        let loaded = User::find(&db, user.id().unwrap()).await.unwrap();
        assert_eq!(loaded.read(), before);
    }

    #[tokio::test]
    async fn test_update_single_field() {
        let original = sean().read();

        let cases: Vec<(UserUpdate, UserView)> = vec![
            (
                UserUpdate {
                    name_of_student: "Sean Yeung".to_string(),
                    ..Default::default()
                },
                UserView {
                    name_of_student: "Sean Yeung".to_string(),
                    ..original.clone()
                },
            ),
            (
                UserUpdate {
                    name_of_class: "CSA".to_string(),
                    ..Default::default()
                },
                UserView {
                    name_of_class: "CSA".to_string(),
                    ..original.clone()
                },
            ),
            (
                UserUpdate {
                    name_of_homework: "Make Two Tables".to_string(),
                    ..Default::default()
                },
                UserView {
                    name_of_homework: "Make Two Tables".to_string(),
                    ..original.clone()
                },
            ),
            (
                UserUpdate {
                    date_due: "2/1/23".to_string(),
                    ..Default::default()
                },
                UserView {
                    date_due: "2/1/23".to_string(),
                    ..original.clone()
                },
            ),
        ];

        for (changes, expected) in cases {
            let db = Database::new_test().await.unwrap();
            let mut user = sean().create(&db).await.unwrap();

            user.update(&db, changes.clone()).await.unwrap();
            assert_eq!(user.read(), expected, "in memory after {:?}", changes);

            let loaded = User::find(&db, user.id().unwrap()).await.unwrap();
            assert_eq!(loaded.read(), expected, "stored after {:?}", changes);
        }
    }

    #[tokio::test]
    async fn test_create_saved_user_rejected() {
        let db = Database::new_test().await.unwrap();
        let id = sean().create(&db).await.unwrap().id().unwrap();

        let mut loaded = User::find(&db, id).await.unwrap();
        loaded.add_post("later", None);
        let result = loaded.create(&db).await;

        assert!(matches!(result, Err(NotesError::AlreadyCreated("User"))));
        assert_eq!(db.count_users().await.unwrap(), 1);
        assert!(Post::for_user(&db, id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_after_setters_does_not_duplicate() {
        let db = Database::new_test().await.unwrap();
        let mut user = sean().create(&db).await.unwrap();

        user.set_name_of_class("CSA");
        user.set_name_of_homework("Linked Lists");
        user.set_date_due("2/1/23");
        let result = user.create(&db).await;

        assert!(matches!(result, Err(NotesError::AlreadyCreated("User"))));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_attach_post_to_saved_user() {
        let db = Database::new_test().await.unwrap();
        let id = sean().create(&db).await.unwrap().id().unwrap();

        let mut loaded = User::find(&db, id).await.unwrap();
        let post_id = loaded
            .attach_post(&db, "later", Some("ncs_logo.png".to_string()))
            .await
            .unwrap()
            .id();

        assert!(post_id.is_some());
        assert_eq!(loaded.posts().len(), 1);
        let stored = Post::for_user(&db, id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].note(), "later");
        assert_eq!(stored[0].id(), post_id);
    }

    #[tokio::test]
    async fn test_attach_post_before_create() {
        let db = Database::new_test().await.unwrap();
        let mut user = sean();

        let result = user.attach_post(&db, "too early", None).await;
        assert!(matches!(result, Err(NotesError::NotPersisted("User"))));
    }

    #[tokio::test]
    async fn test_update_clash_keeps_record() {
        let db = Database::new_test().await.unwrap();
        User::new("Ellie P", "AP Bio", "Portfolio", "1/23/23")
            .create(&db)
            .await
            .unwrap();
        let mut user = sean().create(&db).await.unwrap();

        let result = user
            .update(
                &db,
                UserUpdate {
                    name_of_class: "AP Bio".to_string(),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.unwrap_err().is_constraint_violation());
        assert_eq!(user.name_of_class(), "APCSP");
    }

    #[tokio::test]
    async fn test_update_before_create() {
        let db = Database::new_test().await.unwrap();
        let mut user = sean();

        let result = user.update(&db, UserUpdate::default()).await;
        assert!(matches!(result, Err(NotesError::NotPersisted("User"))));
    }

    #[test]
    fn test_setters() {
        let mut user = sean();
        user.set_name_of_student("Sean Yeung");
        user.set_name_of_class("CSA");
        user.set_name_of_homework("Linked Lists");
        user.set_date_due("2/1/23");

        assert_eq!(user.name_of_student(), "Sean Yeung");
        assert_eq!(user.name_of_class(), "CSA");
        assert_eq!(user.name_of_homework(), "Linked Lists");
        assert_eq!(user.date_due(), "2/1/23");
    }

    #[test]
    fn test_due_date() {
        assert_eq!(
            sean().due_date(),
            NaiveDate::from_ymd_opt(2023, 1, 22)
        );

        let mut user = sean();
        user.set_date_due("next week");
        assert!(user.due_date().is_none());
    }

    #[test]
    fn test_display_is_json() {
        let json: serde_json::Value = serde_json::from_str(&sean().to_string()).unwrap();
        assert_eq!(json["nameOfClass"], "APCSP");
    }
}
