use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// References between tables are deliberately unenforced: a post keeps its
/// author id after the user record goes away, and the feed substitutes a
/// placeholder author instead of failing.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            contact     TEXT NOT NULL,
            role        TEXT NOT NULL CHECK (role IN ('student', 'faculty', 'admin')),
            photo_url   TEXT,
            bio         TEXT NOT NULL DEFAULT '',
            skills      TEXT NOT NULL DEFAULT '[]',
            campus      TEXT NOT NULL,
            student_id  TEXT,
            department  TEXT,
            year        TEXT,
            employee_id TEXT,
            designation TEXT,
            permissions TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          TEXT PRIMARY KEY,
            author_id   TEXT NOT NULL,
            content     TEXT NOT NULL,
            image_url   TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_posts_created
            ON posts(created_at);

        CREATE TABLE IF NOT EXISTS likes (
            post_id     TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            PRIMARY KEY (post_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            post_id     TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            user_name   TEXT NOT NULL,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
