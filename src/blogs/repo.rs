use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Blog, BlogChanges, BlogFilter, BlogListItem, BlogListRow, NewBlog};

/// Blog persistence. Every method is a single-statement write or read.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Newest first, each entry populated with its owner.
    async fn list(&self, filter: &BlogFilter) -> anyhow::Result<Vec<BlogListItem>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Blog>>;

    async fn create(&self, new: NewBlog) -> anyhow::Result<Blog>;

    /// Applies `changes` only if the blog exists and belongs to `owner`.
    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &BlogChanges,
    ) -> anyhow::Result<Option<Blog>>;

    /// Deletes only if the blog exists and belongs to `owner`.
    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool>;
}

const BLOG_COLUMNS: &str =
    "b.id, b.title, b.category, b.content, b.image, b.author, b.user_id, b.created_at, b.updated_at";

pub struct PgBlogStore {
    db: PgPool,
}

impl PgBlogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlogStore for PgBlogStore {
    async fn list(&self, filter: &BlogFilter) -> anyhow::Result<Vec<BlogListItem>> {
        let sql = format!(
            r#"
            SELECT {BLOG_COLUMNS}, u.name AS owner_name, u.email AS owner_email
            FROM blogs b
            LEFT JOIN users u ON u.id = b.user_id
            WHERE ($1::text IS NULL OR b.category = $1)
              AND ($2::text IS NULL OR b.author = $2)
            ORDER BY b.created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, BlogListRow>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.author.as_deref())
            .fetch_all(&self.db)
            .await
            .context("list blogs")?;
        Ok(rows.into_iter().map(BlogListItem::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs b WHERE b.id = $1");
        let blog = sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find blog by id")?;
        Ok(blog)
    }

    async fn create(&self, new: NewBlog) -> anyhow::Result<Blog> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (id, user_id, author, title, category, content, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, category, content, image, author, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.author)
        .bind(&new.title)
        .bind(&new.category)
        .bind(&new.content)
        .bind(&new.image)
        .fetch_one(&self.db)
        .await
        .context("insert blog")?;
        Ok(blog)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &BlogChanges,
    ) -> anyhow::Result<Option<Blog>> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
               SET title = COALESCE($3, title),
                   category = COALESCE($4, category),
                   content = COALESCE($5, content),
                   image = COALESCE($6, image),
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING id, title, category, content, image, author, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(changes.title.as_deref())
        .bind(changes.category.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.image.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update blog")?;
        Ok(blog)
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM blogs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete blog")?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
pub use memory::MemoryBlogStore;

#[cfg(test)]
mod memory {
    use std::sync::{Arc, Mutex};

    use time::OffsetDateTime;

    use super::*;
    use crate::auth::repo::{MemoryUserStore, UserStore};
    use crate::blogs::repo_types::BlogOwner;

    /// Keeps blogs in insertion order; reads the user store to populate owners.
    pub struct MemoryBlogStore {
        blogs: Mutex<Vec<Blog>>,
        users: Arc<MemoryUserStore>,
    }

    impl MemoryBlogStore {
        pub fn new(users: Arc<MemoryUserStore>) -> Self {
            Self {
                blogs: Mutex::new(Vec::new()),
                users,
            }
        }

        pub fn get(&self, id: Uuid) -> Option<Blog> {
            self.blogs.lock().unwrap().iter().find(|b| b.id == id).cloned()
        }

        pub fn count(&self) -> usize {
            self.blogs.lock().unwrap().len()
        }
    }

    fn filter_matches(filter: &BlogFilter, blog: &Blog) -> bool {
        filter.category.as_deref().map_or(true, |c| blog.category == c)
            && filter.author.as_deref().map_or(true, |a| blog.author == a)
    }

    fn apply(changes: &BlogChanges, blog: &mut Blog) {
        if let Some(v) = &changes.title {
            blog.title = v.clone();
        }
        if let Some(v) = &changes.category {
            blog.category = v.clone();
        }
        if let Some(v) = &changes.content {
            blog.content = v.clone();
        }
        if let Some(v) = &changes.image {
            blog.image = Some(v.clone());
        }
        blog.updated_at = OffsetDateTime::now_utc();
    }

    #[async_trait]
    impl BlogStore for MemoryBlogStore {
        async fn list(&self, filter: &BlogFilter) -> anyhow::Result<Vec<BlogListItem>> {
            let mut matching: Vec<Blog> = self
                .blogs
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|b| filter_matches(filter, b))
                .cloned()
                .collect();
            // stable sort keeps later inserts first on equal timestamps
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let mut out = Vec::with_capacity(matching.len());
            for blog in matching {
                let user = self.users.find_by_id(blog.user_id).await?.map(|u| BlogOwner {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                });
                out.push(BlogListItem { blog, user });
            }
            Ok(out)
        }

        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Blog>> {
            Ok(self.get(id))
        }

        async fn create(&self, new: NewBlog) -> anyhow::Result<Blog> {
            let now = OffsetDateTime::now_utc();
            let blog = Blog {
                id: Uuid::new_v4(),
                title: new.title,
                category: new.category,
                content: new.content,
                image: new.image,
                author: new.author,
                user_id: new.user_id,
                created_at: now,
                updated_at: now,
            };
            self.blogs.lock().unwrap().push(blog.clone());
            Ok(blog)
        }

        async fn update_owned(
            &self,
            id: Uuid,
            owner: Uuid,
            changes: &BlogChanges,
        ) -> anyhow::Result<Option<Blog>> {
            let mut blogs = self.blogs.lock().unwrap();
            let Some(blog) = blogs.iter_mut().find(|b| b.id == id && b.user_id == owner) else {
                return Ok(None);
            };
            apply(changes, blog);
            Ok(Some(blog.clone()))
        }

        async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
            let mut blogs = self.blogs.lock().unwrap();
            let before = blogs.len();
            blogs.retain(|b| !(b.id == id && b.user_id == owner));
            Ok(blogs.len() < before)
        }
    }

    fn new_blog(owner: Uuid, author: &str, category: &str) -> NewBlog {
        NewBlog {
            user_id: owner,
            author: author.into(),
            title: "T".into(),
            category: category.into(),
            content: "C".into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn writes_are_scoped_to_owner() {
        let store = MemoryBlogStore::new(Arc::new(MemoryUserStore::default()));
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let blog = store.create(new_blog(owner, "Ann", "Tech")).await.unwrap();

        let changes = BlogChanges {
            title: Some("hijacked".into()),
            ..Default::default()
        };
        assert!(store.update_owned(blog.id, other, &changes).await.unwrap().is_none());
        assert!(!store.delete_owned(blog.id, other).await.unwrap());
        assert_eq!(store.get(blog.id).unwrap(), blog);

        let updated = store.update_owned(blog.id, owner, &changes).await.unwrap().unwrap();
        assert_eq!(updated.title, "hijacked");
        assert_eq!(updated.user_id, owner);
        assert!(store.delete_owned(blog.id, owner).await.unwrap());
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let store = MemoryBlogStore::new(Arc::new(MemoryUserStore::default()));
        let owner = Uuid::new_v4();
        let first = store.create(new_blog(owner, "Ann", "Tech")).await.unwrap();
        let second = store.create(new_blog(owner, "Ann", "Food")).await.unwrap();

        let all = store.list(&BlogFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].blog.id, second.id);
        assert_eq!(all[1].blog.id, first.id);
        // owner record not in the user store
        assert!(all[0].user.is_none());

        let tech = BlogFilter {
            category: Some("Tech".into()),
            author: None,
        };
        let only = store.list(&tech).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].blog.id, first.id);
    }
}
