// homework-notes - homework assignments and the notes that go with them
//
// This is the main entry point. Parses CLI args and dispatches to handlers.

use anyhow::{anyhow, bail, Context};
use homework_notes_lib::{
    core::SeedReport, init_users, logging, Config, Database, Post, User, UserUpdate,
};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = env::args().collect();

    // --debug can go anywhere
    let debug = args.iter().any(|a| a == "--debug");
    args.retain(|a| a != "--debug");
    logging::init_tracing(debug)?;

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let command = &args[1];

    match command.as_str() {
        "init" => handle_init().await,
        "users" => handle_users().await,
        "user" => handle_user(&args[2..]).await,
        "add-user" => handle_add_user(&args[2..]).await,
        "update-user" => handle_update_user(&args[2..]).await,
        "delete-user" => handle_delete_user(&args[2..]).await,
        "add-post" => handle_add_post(&args[2..]).await,
        "post" => handle_post(&args[2..]).await,
        "status" => handle_status().await,
        "version" | "-v" | "--version" => {
            println!("homework-notes v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            Ok(())
        }
    }
}

async fn handle_init() -> anyhow::Result<()> {
    let (db, _) = open().await?;
    let SeedReport { created, skipped } = init_users(&db).await?;

    println!("Created {} user(s), skipped {}.", created.len(), skipped.len());
    for name in &skipped {
        println!("  already present: {}", name);
    }

    Ok(())
}

async fn handle_users() -> anyhow::Result<()> {
    let (db, _) = open().await?;
    let mut users = User::all(&db).await?;

    if users.is_empty() {
        println!("No users yet. Run 'homework-notes init' for sample data.");
        return Ok(());
    }

    // Soonest due first; dates we can't parse go last in id order
    users.sort_by_key(|u| (u.due_date().is_none(), u.due_date(), u.id()));

    println!("\nHomework:");
    println!("{}", "=".repeat(60));
    for user in &users {
        println!(
            "{:>4}  {:<10} {:<12} {:<20} due {} ({} note(s))",
            user.id().unwrap_or_default(),
            user.name_of_student(),
            user.name_of_class(),
            user.name_of_homework(),
            user.date_due(),
            user.posts().len()
        );
    }
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn handle_user(args: &[String]) -> anyhow::Result<()> {
    let id = parse_id(args.first(), "user id")?;
    let (db, _) = open().await?;

    let user = User::find(&db, id).await?;
    println!("{}", user);
    for post in user.posts() {
        println!("  {}", post);
    }

    Ok(())
}

async fn handle_add_user(args: &[String]) -> anyhow::Result<()> {
    let [student, class, homework, due] = args else {
        bail!("usage: homework-notes add-user <student> <class> <homework> <due>");
    };

    let (db, _) = open().await?;
    match User::new(student, class, homework, due).create(&db).await {
        Ok(user) => {
            println!("Created user {}: {}", user.id().unwrap_or_default(), user);
            Ok(())
        }
        Err(e) if e.is_constraint_violation() => {
            eprintln!("{}", e.user_message());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_update_user(args: &[String]) -> anyhow::Result<()> {
    let id = parse_id(args.first(), "user id")?;

    let mut changes = UserUpdate::default();
    let mut i = 1;
    while i < args.len() {
        let value = args
            .get(i + 1)
            .cloned()
            .ok_or_else(|| anyhow!("missing value for {}", args[i]))?;
        match args[i].as_str() {
            "--student" => changes.name_of_student = value,
            "--class" => changes.name_of_class = value,
            "--homework" => changes.name_of_homework = value,
            "--due" => changes.date_due = value,
            other => bail!("unknown option: {}", other),
        }
        i += 2;
    }

    if changes.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    let (db, _) = open().await?;
    let mut user = User::find(&db, id).await?;
    match user.update(&db, changes).await {
        Ok(updated) => {
            println!("Updated user {}: {}", id, updated);
            Ok(())
        }
        Err(e) if e.is_constraint_violation() => {
            eprintln!("{}", e.user_message());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_delete_user(args: &[String]) -> anyhow::Result<()> {
    let id = parse_id(args.first(), "user id")?;
    let (db, _) = open().await?;

    let user = User::find(&db, id).await?;
    let notes = user.posts().len();
    user.delete(&db).await?;

    println!("Deleted user {} and {} note(s).", id, notes);
    Ok(())
}

async fn handle_add_post(args: &[String]) -> anyhow::Result<()> {
    let user_id = parse_id(args.first(), "user id")?;
    let note = args
        .get(1)
        .ok_or_else(|| anyhow!("usage: homework-notes add-post <user-id> <note> [image]"))?;
    let image = args.get(2).cloned();

    let (db, _) = open().await?;
    let post = Post::new(user_id, note.as_str(), image).create(&db).await?;

    println!("Created {}", post);
    Ok(())
}

async fn handle_post(args: &[String]) -> anyhow::Result<()> {
    let id = parse_id(args.first(), "post id")?;
    let (db, config) = open().await?;

    let post = Post::find(&db, id).await?;
    let view = post
        .read(&config.upload_folder)
        .await
        .with_context(|| format!("reading image for post {}", id))?;

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn handle_status() -> anyhow::Result<()> {
    let (db, config) = open().await?;
    let stats = db.stats().await?;

    println!("\nhomework-notes Status");
    println!("{}", "=".repeat(60));
    println!("  Database:      {}", db.path().display());
    println!("  Upload folder: {}", config.upload_folder.display());
    println!("\nDatabase Statistics:");
    println!("  Users:  {}", stats.total_users);
    println!("  Notes:  {}", stats.total_posts);
    println!(
        "  Pool:   {} connection(s), {} idle",
        stats.pool_size, stats.idle_connections
    );
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn open() -> anyhow::Result<(Database, Config)> {
    let config = Config::from_env()?;
    let db = Database::new(&config.database_path)
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    Ok((db, config))
}

fn parse_id(arg: Option<&String>, what: &str) -> anyhow::Result<i64> {
    let raw = arg.ok_or_else(|| anyhow!("missing {}", what))?;
    raw.parse()
        .with_context(|| format!("{} must be a number, got '{}'", what, raw))
}

fn print_usage() {
    println!(
        r#"homework-notes v{} - homework assignments and their notes

USAGE:
    homework-notes [--debug] <COMMAND> [ARGS]

COMMANDS:
    init                                        Create tables and sample data
    users                                       List homework, soonest due first
    user <id>                                   Show one user and its notes
    add-user <student> <class> <homework> <due> Add a homework record
    update-user <id> [--student S] [--class C] [--homework H] [--due D]
                                                Change the given fields
    delete-user <id>                            Delete a user and its notes
    add-post <user-id> <note> [image]           Attach a note
    post <id>                                   Show a note with its image as base64
    status                                      Show paths and counts
    version                                     Show version
    help                                        Show this help

ENVIRONMENT:
    HOMEWORK_NOTES_DB        Database file (default: ~/.homework-notes/notes.db)
    HOMEWORK_NOTES_UPLOADS   Image folder (default: ~/.homework-notes/uploads)
    RUST_LOG                 Log filter (default: info)
"#,
        env!("CARGO_PKG_VERSION")
    );
}
