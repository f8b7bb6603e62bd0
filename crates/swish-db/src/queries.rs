use crate::Database;
use crate::models::{AuthorRow, CommentRow, LikeRow, PostRow, ProfileUpdate, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

const USER_COLUMNS: &str = "id, name, email, password, contact, role, photo_url, bio, skills, \
     campus, student_id, department, year, employee_id, designation, permissions, \
     created_at, updated_at";

impl Database {
    // -- Users --

    /// Insert a new user. Returns false when the email is already taken
    /// (unique constraint), which callers surface as a duplicate-email
    /// failure rather than an internal error.
    pub fn create_user(&self, user: &UserRow) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, name, email, password, contact, role, photo_url, bio, \
                 skills, campus, student_id, department, year, employee_id, designation, \
                 permissions, created_at, updated_at) \
                 VALUES (:id, :name, :email, :password, :contact, :role, :photo_url, :bio, \
                 :skills, :campus, :student_id, :department, :year, :employee_id, :designation, \
                 :permissions, :created_at, :updated_at)",
                rusqlite::named_params! {
                    ":id": user.id,
                    ":name": user.name,
                    ":email": user.email,
                    ":password": user.password,
                    ":contact": user.contact,
                    ":role": user.role,
                    ":photo_url": user.photo_url,
                    ":bio": user.bio,
                    ":skills": user.skills,
                    ":campus": user.campus,
                    ":student_id": user.student_id,
                    ":department": user.department,
                    ":year": user.year,
                    ":employee_id": user.employee_id,
                    ":designation": user.designation,
                    ":permissions": user.permissions,
                    ":created_at": user.created_at,
                    ":updated_at": user.updated_at,
                },
            );

            match inserted {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Apply a partial profile update in a single statement; absent fields
    /// keep their stored value. Returns false when no such user exists.
    pub fn update_profile(
        &self,
        id: &str,
        fields: &ProfileUpdate,
        updated_at: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET \
                 name        = COALESCE(?2, name), \
                 contact     = COALESCE(?3, contact), \
                 bio         = COALESCE(?4, bio), \
                 skills      = COALESCE(?5, skills), \
                 student_id  = COALESCE(?6, student_id), \
                 department  = COALESCE(?7, department), \
                 year        = COALESCE(?8, year), \
                 employee_id = COALESCE(?9, employee_id), \
                 designation = COALESCE(?10, designation), \
                 updated_at  = ?11 \
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    fields.name,
                    fields.contact,
                    fields.bio,
                    fields.skills,
                    fields.student_id,
                    fields.department,
                    fields.year,
                    fields.employee_id,
                    fields.designation,
                    updated_at,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Batch-fetch the public author projection for a set of user IDs.
    pub fn get_authors_by_ids(&self, user_ids: &[String]) -> Result<Vec<AuthorRow>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, name, photo_url, role, department FROM users WHERE id IN ({})",
                in_placeholders(user_ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(to_sql_params(user_ids).as_slice(), |row| {
                    Ok(AuthorRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        photo_url: row.get(2)?,
                        role: row.get(3)?,
                        department: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
        })
    }

    // -- Posts --

    pub fn insert_post(
        &self,
        id: &str,
        author_id: &str,
        content: &str,
        image_url: Option<&str>,
        created_at: &str,
        updated_at: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (id, author_id, content, image_url, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, author_id, content, image_url, created_at, updated_at],
            )?;
            Ok(())
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, author_id, content, image_url, created_at, updated_at \
                     FROM posts WHERE id = ?1",
                    [id],
                    map_post,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Full scan, newest first. Rowid breaks ties between posts stamped in
    /// the same instant.
    pub fn get_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, author_id, content, image_url, created_at, updated_at \
                 FROM posts ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map([], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_posts(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?)
        })
    }

    // -- Likes --

    /// Toggle a like: removes if present, inserts if not. The check and the
    /// write run under one lock acquisition, so concurrent toggles by the
    /// same user serialize instead of double-counting.
    /// Returns None when the post does not exist, otherwise Some(liked).
    pub fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
        created_at: &str,
    ) -> Result<Option<bool>> {
        self.with_conn_mut(|conn| {
            let post: Option<String> = conn
                .query_row("SELECT id FROM posts WHERE id = ?1", [post_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if post.is_none() {
                return Ok(None);
            }

            let existing: Option<String> = conn
                .query_row(
                    "SELECT user_id FROM likes WHERE post_id = ?1 AND user_id = ?2",
                    [post_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                conn.execute(
                    "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
                    [post_id, user_id],
                )?;
                Ok(Some(false))
            } else {
                conn.execute(
                    "INSERT INTO likes (post_id, user_id, created_at) VALUES (?1, ?2, ?3)",
                    [post_id, user_id, created_at],
                )?;
                Ok(Some(true))
            }
        })
    }

    /// Batch-fetch likes for a set of post IDs.
    pub fn get_likes_for_posts(&self, post_ids: &[String]) -> Result<Vec<LikeRow>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT post_id, user_id FROM likes WHERE post_id IN ({}) ORDER BY rowid",
                in_placeholders(post_ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(to_sql_params(post_ids).as_slice(), |row| {
                    Ok(LikeRow {
                        post_id: row.get(0)?,
                        user_id: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Comments --

    /// Append a comment. Returns false when the post does not exist.
    /// Comments are append-only; nothing ever edits or deletes them.
    pub fn add_comment(
        &self,
        id: &str,
        post_id: &str,
        user_id: &str,
        user_name: &str,
        content: &str,
        created_at: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let post: Option<String> = conn
                .query_row("SELECT id FROM posts WHERE id = ?1", [post_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if post.is_none() {
                return Ok(false);
            }

            conn.execute(
                "INSERT INTO comments (id, post_id, user_id, user_name, content, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, post_id, user_id, user_name, content, created_at],
            )?;
            Ok(true)
        })
    }

    /// Batch-fetch comments for a set of post IDs, in append (rowid) order.
    pub fn get_comments_for_posts(&self, post_ids: &[String]) -> Result<Vec<CommentRow>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, post_id, user_id, user_name, content, created_at \
                 FROM comments WHERE post_id IN ({}) ORDER BY rowid",
                in_placeholders(post_ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(to_sql_params(post_ids).as_slice(), |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        user_id: row.get(2)?,
                        user_name: row.get(3)?,
                        content: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is one of two fixed identifiers, never caller input.
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let row = conn.query_row(&sql, [value], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        contact: row.get(4)?,
        role: row.get(5)?,
        photo_url: row.get(6)?,
        bio: row.get(7)?,
        skills: row.get(8)?,
        campus: row.get(9)?,
        student_id: row.get(10)?,
        department: row.get(11)?,
        year: row.get(12)?,
        employee_id: row.get(13)?,
        designation: row.get(14)?,
        permissions: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

fn map_post(row: &rusqlite::Row) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn in_placeholders(len: usize) -> String {
    (1..=len)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql_params(values: &[String]) -> Vec<&dyn rusqlite::types::ToSql> {
    values
        .iter()
        .map(|v| v as &dyn rusqlite::types::ToSql)
        .collect()
}
