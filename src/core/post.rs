// Notes attached to a homework record
//
// A post belongs to exactly one user. No update or delete: posts only go
// away when their owner is deleted.

use crate::db::{Database, PostInput, PostRow, PostView};
use crate::error::{NotesError, Result};
use base64::{engine::general_purpose, Engine as _};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: Option<i64>,
    user_id: Option<i64>,
    note: String,
    image: Option<String>,
}

impl Post {
    pub fn new(user_id: i64, note: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: None,
            user_id: Some(user_id),
            note: note.into(),
            image,
        }
    }

    // Owner gets filled in when the user is created
    pub(crate) fn draft(user_id: Option<i64>, note: String, image: Option<String>) -> Self {
        Self {
            id: None,
            user_id,
            note,
            image,
        }
    }

    pub(crate) fn from_row(row: PostRow) -> Self {
        Self {
            id: Some(row.id),
            user_id: Some(row.user_id),
            note: row.note,
            image: row.image,
        }
    }

    pub(crate) fn input(&self) -> PostInput {
        PostInput {
            note: self.note.clone(),
            image: self.image.clone(),
        }
    }

    pub(crate) fn mark_created(&mut self, id: i64, user_id: i64) {
        self.id = Some(id);
        self.user_id = Some(user_id);
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Insert this post. Returns it with its generated id.
    ///
    /// A missing owner or a foreign key clash comes back as an error and
    /// nothing is written.
    pub async fn create(mut self, db: &Database) -> Result<Self> {
        let user_id = self.user_id.ok_or(NotesError::MissingOwner)?;
        let id = db.insert_post(user_id, &self.input()).await?;
        self.id = Some(id);
        Ok(self)
    }

    /// Export the post, with the image file's bytes as base64
    ///
    /// The image is read from `upload_folder`. A missing or unreadable file
    /// is an error, and so is an image name that would leave the folder
    /// (absolute, or with `..`). Posts without an image get `base64: None`.
    pub async fn read(&self, upload_folder: &Path) -> Result<PostView> {
        let base64 = match &self.image {
            Some(image) => {
                let bytes = tokio::fs::read(image_path(upload_folder, image)?).await?;
                Some(general_purpose::STANDARD.encode(bytes))
            }
            None => None,
        };

        Ok(PostView {
            id: self.id,
            user_id: self.user_id,
            note: self.note.clone(),
            image: self.image.clone(),
            base64,
        })
    }

    pub async fn find(db: &Database, id: i64) -> Result<Self> {
        db.get_post_by_id(id)
            .await?
            .map(Self::from_row)
            .ok_or(NotesError::PostNotFound(id))
    }

    /// All posts owned by a user, oldest first
    pub async fn for_user(db: &Database, user_id: i64) -> Result<Vec<Self>> {
        let rows = db.get_posts_for_user(user_id).await?;
        Ok(rows.into_iter().map(Self::from_row).collect())
    }
}

// Image names are plain relative paths inside the upload folder
fn image_path(upload_folder: &Path, image: &str) -> Result<PathBuf> {
    let name = Path::new(image);
    let inside = !image.is_empty()
        && name
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if !inside {
        return Err(NotesError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("image name '{}' points outside the upload folder", image),
        )));
    }

    Ok(upload_folder.join(name))
}

fn or_none(value: Option<i64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Notes({},{},{})",
            or_none(self.id),
            self.note,
            or_none(self.user_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::User;

    async fn setup() -> (Database, i64) {
        let db = Database::new_test().await.unwrap();
        let user = User::new("Ellie P", "AP Bio", "Portfolio", "1/23/23")
            .create(&db)
            .await
            .unwrap();
        let id = user.id().unwrap();
        (db, id)
    }

    #[tokio::test]
    async fn test_create_post() {
        let (db, user_id) = setup().await;

        let post = Post::new(user_id, "cell diagrams", Some("cells.png".to_string()))
            .create(&db)
            .await
            .unwrap();

        assert!(post.id().is_some());
        let loaded = Post::find(&db, post.id().unwrap()).await.unwrap();
        assert_eq!(loaded, post);
    }

    #[tokio::test]
    async fn test_create_post_without_owner() {
        let (db, _) = setup().await;

        let result = Post::draft(None, "floating".to_string(), None).create(&db).await;
        assert!(matches!(result, Err(NotesError::MissingOwner)));
    }

    #[tokio::test]
    async fn test_create_post_unknown_owner() {
        let (db, user_id) = setup().await;

        let result = Post::new(user_id + 100, "lost", None).create(&db).await;
        assert!(result.unwrap_err().is_constraint_violation());
    }

    #[tokio::test]
    async fn test_read_encodes_image() {
        let (db, user_id) = setup().await;
        let uploads = tempfile::tempdir().unwrap();
        let bytes: Vec<u8> = (0u8..=255).collect();
        std::fs::write(uploads.path().join("ncs_logo.png"), &bytes).unwrap();

        let post = Post::new(user_id, "logo", Some("ncs_logo.png".to_string()))
            .create(&db)
            .await
            .unwrap();
        let view = post.read(uploads.path()).await.unwrap();

        assert_eq!(view.user_id, Some(user_id));
        assert_eq!(view.image.as_deref(), Some("ncs_logo.png"));
        let decoded = general_purpose::STANDARD
            .decode(view.base64.unwrap())
            .unwrap();
        assert_eq!(decoded, bytes);
    }

    #[tokio::test]
    async fn test_read_missing_image_fails() {
        let (db, user_id) = setup().await;
        let uploads = tempfile::tempdir().unwrap();

        let post = Post::new(user_id, "ghost", Some("nope.png".to_string()))
            .create(&db)
            .await
            .unwrap();

        let result = post.read(uploads.path()).await;
        assert!(matches!(result, Err(NotesError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_rejects_paths_outside_uploads() {
        let (_, user_id) = setup().await;
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std::fs::create_dir(&uploads).unwrap();
        let secret = root.path().join("secret.txt");
        std::fs::write(&secret, b"secret").unwrap();

        let names = [
            secret.display().to_string(),
            "../secret.txt".to_string(),
            "sub/../../secret.txt".to_string(),
            String::new(),
        ];
        for name in names {
            let post = Post::new(user_id, "sneaky", Some(name.clone()));
            match post.read(&uploads).await {
                Err(NotesError::Io(e)) => {
                    assert_eq!(e.kind(), io::ErrorKind::InvalidInput, "{}", name)
                }
                other => panic!("expected InvalidInput for '{}', got {:?}", name, other),
            }
        }
    }

    #[tokio::test]
    async fn test_read_image_in_subfolder() {
        let (_, user_id) = setup().await;
        let uploads = tempfile::tempdir().unwrap();
        std::fs::create_dir(uploads.path().join("week1")).unwrap();
        std::fs::write(uploads.path().join("week1").join("a.png"), b"png").unwrap();

        let view = Post::new(user_id, "nested", Some("week1/a.png".to_string()))
            .read(uploads.path())
            .await
            .unwrap();
        assert_eq!(view.base64.as_deref(), Some("cG5n"));
    }

    #[tokio::test]
    async fn test_read_without_image() {
        let (_, user_id) = setup().await;
        let uploads = tempfile::tempdir().unwrap();

        let view = Post::new(user_id, "text only", None)
            .read(uploads.path())
            .await
            .unwrap();
        assert!(view.base64.is_none());
        assert!(view.id.is_none());
    }

    #[test]
    fn test_display() {
        let post = Post::new(7, "hello", None);
        assert_eq!(post.to_string(), "Notes(None,hello,7)");
    }
}
