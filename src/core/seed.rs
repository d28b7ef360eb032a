// Sample data for trying things out
//
// Four students, each with 1 to 3 generated notes. Safe to run repeatedly:
// students that already exist are skipped and logged.

use crate::core::User;
use crate::db::Database;
use crate::error::Result;
use rand::Rng;
use tracing::info;

/// Placeholder image attached to every generated note
pub const SAMPLE_IMAGE: &str = "ncs_logo.png";

const MIN_POSTS: usize = 1;
const MAX_POSTS: usize = 3;

// (student, class, homework, due)
const SAMPLE_USERS: &[(&str, &str, &str, &str)] = &[
    ("Sean Y", "APCSP", "Make A Table", "1/22/23"),
    ("Ellie P", "AP Bio", "Portfolio", "1/23/23"),
    ("Kaylee H", "AP Physics", "API", "1/25/23"),
    ("Theo H", "AP Calc", "Pg 123, #1, 2, 3", "1/20/23"),
];

/// What a seed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Build the sample users with their notes attached, not yet persisted
pub fn sample_users<R: Rng>(rng: &mut R) -> Vec<User> {
    SAMPLE_USERS
        .iter()
        .map(|(student, class, homework, due)| {
            let mut user = User::new(*student, *class, *homework, *due);
            for num in 0..rng.gen_range(MIN_POSTS..=MAX_POSTS) {
                let note = format!("#### {} note {}. \n Generated by test data.", student, num);
                user.add_post(note, Some(SAMPLE_IMAGE.to_string()));
            }
            user
        })
        .collect()
}

/// Make sure the tables exist, then insert the sample users
///
/// A user that clashes with existing data is rolled back and skipped; the
/// rest still go in. Any other database error stops the run.
pub async fn init_users(db: &Database) -> Result<SeedReport> {
    db.initialize_schema().await?;

    let users = sample_users(&mut rand::thread_rng());
    let mut report = SeedReport::default();

    for user in users {
        let student = user.name_of_student().to_string();
        match user.create(db).await {
            Ok(created) => {
                info!(student = %student, posts = created.posts().len(), "seeded user");
                report.created.push(student);
            }
            Err(e) if e.is_constraint_violation() => {
                info!("Records exist, duplicate email, or error: {}", student);
                report.skipped.push(student);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
