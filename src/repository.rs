use crate::errors::{PersistenceError, ValidationError};
use crate::slug::{slugify, unique_slug};
use crate::store::PostStore;
use crate::types::{Post, PostId, PostInput, Status};
use chrono::{Local, Utc};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Hands out post ids. Ids follow the clock (unix seconds) so they stay
/// compatible with existing collections, but never repeat or go backwards.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    last: Option<i64>,
}

impl IdAllocator {
    pub fn starting_after(last: Option<PostId>) -> IdAllocator {
        IdAllocator {
            last: last.map(|id| id.0),
        }
    }

    /// `None` once the id space is used up.
    pub fn next(&mut self, now: i64) -> Option<PostId> {
        let id = match self.last {
            Some(last) => now.max(last.checked_add(1)?),
            None => now,
        };
        self.last = Some(id);
        Some(PostId(id))
    }
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// In-memory view of the post collection loaded from a [`PostStore`].
/// Mutations only reach the store on [`PostRepository::save`].
pub struct PostRepository<S> {
    store: S,
    posts: BTreeMap<PostId, Post>,
    ids: IdAllocator,
    clock: fn() -> i64,
}

impl<S: PostStore> PostRepository<S> {
    pub fn open(store: S) -> Result<PostRepository<S>, PersistenceError> {
        let mut posts = BTreeMap::new();
        for post in store.load()? {
            if posts.contains_key(&post.id) {
                warn!(id = %post.id, slug = %post.slug, "skipping post with duplicate id");
                continue;
            }
            posts.insert(post.id, post);
        }
        let ids = IdAllocator::starting_after(posts.keys().next_back().copied());
        Ok(PostRepository {
            store,
            posts,
            ids,
            clock: unix_now,
        })
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> PostRepository<S> {
        self.clock = clock;
        self
    }

    pub fn save(&self) -> Result<(), PersistenceError> {
        let posts = self.posts.values().cloned().collect::<Vec<_>>();
        self.store.save(&posts)
    }

    pub fn create(&mut self, input: PostInput) -> Result<&Post, ValidationError> {
        let id = self
            .ids
            .next((self.clock)())
            .ok_or(ValidationError::NoIdsLeft)?;
        let post = self.resolve(id, input, None)?;
        info!(id = %post.id, slug = %post.slug, status = %post.status, "created post");
        Ok(&*self.posts.entry(id).or_insert(post))
    }

    /// Overwrite every mutable field of post `id`. Unknown ids are ignored.
    pub fn update(
        &mut self,
        id: PostId,
        input: PostInput,
    ) -> Result<Option<&Post>, ValidationError> {
        let post = self.resolve(id, input, Some(id))?;
        match self.posts.get_mut(&id) {
            Some(existing) => {
                *existing = post;
                info!(id = %id, slug = %existing.slug, status = %existing.status, "updated post");
                Ok(Some(&*existing))
            }
            None => Ok(None),
        }
    }

    pub fn delete(&mut self, id: PostId) -> bool {
        let removed = self.posts.remove(&id).is_some();
        if removed {
            info!(id = %id, "deleted post");
        }
        removed
    }

    pub fn find_by_id(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn find_published(&self, slug: &str) -> Option<&Post> {
        self.posts
            .values()
            .find(|p| p.is_published() && p.slug == slug)
    }

    /// Published posts, optionally newest first. Dates compare as strings
    /// and posts sharing a date keep their collection order.
    pub fn list_published(&self, sorted: bool) -> Vec<&Post> {
        let mut published = self
            .posts
            .values()
            .filter(|p| p.is_published())
            .collect::<Vec<_>>();
        if sorted {
            published.sort_by(|a, b| b.date.cmp(&a.date));
        }
        published
    }

    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn resolve(
        &self,
        id: PostId,
        input: PostInput,
        own: Option<PostId>,
    ) -> Result<Post, ValidationError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let requested = input
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let slug = slugify(requested.unwrap_or(title));
        if slug.is_empty() {
            return Err(ValidationError::EmptySlug);
        }
        let slug = unique_slug(&slug, |candidate| {
            self.posts
                .values()
                .any(|p| p.slug == candidate && Some(p.id) != own)
        });
        let date = input
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(today, str::to_owned);

        Ok(Post {
            id,
            title: title.to_owned(),
            slug,
            date,
            content: input.content,
            status: input.status.unwrap_or(Status::Draft),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn input(title: &str, date: &str, status: Status) -> PostInput {
        PostInput {
            title: title.to_owned(),
            slug: None,
            date: Some(date.to_owned()),
            content: format!("# {title}"),
            status: Some(status),
        }
    }

    fn fixed_clock() -> i64 {
        1_700_000_000
    }

    fn repo(store: &MemoryStore) -> PostRepository<&MemoryStore> {
        PostRepository::open(store).unwrap().with_clock(fixed_clock)
    }

    #[test]
    fn allocator_never_repeats() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next(10), Some(PostId(10)));
        assert_eq!(ids.next(10), Some(PostId(11)));
        assert_eq!(ids.next(5), Some(PostId(12)));
        assert_eq!(ids.next(100), Some(PostId(100)));
    }

    #[test]
    fn allocator_continues_after_existing_ids() {
        let mut ids = IdAllocator::starting_after(Some(PostId(50)));
        assert_eq!(ids.next(10), Some(PostId(51)));
    }

    #[test]
    fn allocator_stops_at_largest_id() {
        let mut ids = IdAllocator::starting_after(Some(PostId(i64::MAX - 1)));
        assert_eq!(ids.next(10), Some(PostId(i64::MAX)));
        assert_eq!(ids.next(10), None);
        assert_eq!(ids.next(i64::MAX), None);
    }

    #[test]
    fn create_fails_when_no_ids_are_left() {
        let store = MemoryStore::with_posts(vec![Post {
            id: PostId(i64::MAX),
            title: "Last".to_owned(),
            slug: "last".to_owned(),
            date: "2024-01-01".to_owned(),
            content: String::new(),
            status: Status::Published,
        }]);
        let mut repo = repo(&store);
        let result = repo.create(input("One more", "2024-01-02", Status::Draft));
        assert_eq!(result.err(), Some(ValidationError::NoIdsLeft));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn create_then_find() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let id = repo
            .create(PostInput {
                title: "  Hello World ".to_owned(),
                slug: None,
                date: Some("2024-03-01".to_owned()),
                content: "Some *markdown*".to_owned(),
                status: Some(Status::Published),
            })
            .unwrap()
            .id;
        let post = repo.find_by_id(id).unwrap();
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.date, "2024-03-01");
        assert_eq!(post.content, "Some *markdown*");
        assert_eq!(post.status, Status::Published);
    }

    #[test]
    fn create_defaults_status_and_date() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let post = repo
            .create(PostInput {
                title: "Untitled".to_owned(),
                ..PostInput::default()
            })
            .unwrap();
        assert_eq!(post.status, Status::Draft);
        assert_eq!(post.date, today());
    }

    #[test]
    fn explicit_slug_is_normalized() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let post = repo
            .create(PostInput {
                title: "Title".to_owned(),
                slug: Some("My Custom Slug!".to_owned()),
                ..PostInput::default()
            })
            .unwrap();
        assert_eq!(post.slug, "my-custom-slug");
    }

    #[test]
    fn create_rejects_empty_title() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let result = repo.create(PostInput {
            title: "   ".to_owned(),
            content: "body".to_owned(),
            ..PostInput::default()
        });
        assert_eq!(result.err(), Some(ValidationError::EmptyTitle));
        assert!(repo.is_empty());
    }

    #[test]
    fn create_rejects_slug_without_alphanumerics() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let result = repo.create(PostInput {
            title: "Fine title".to_owned(),
            slug: Some("?!".to_owned()),
            ..PostInput::default()
        });
        assert_eq!(result.err(), Some(ValidationError::EmptySlug));
        assert!(repo.is_empty());
    }

    #[test]
    fn rapid_creates_get_distinct_ids() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let a = repo.create(input("One", "2024-01-01", Status::Draft)).unwrap().id;
        let b = repo.create(input("Two", "2024-01-01", Status::Draft)).unwrap().id;
        let c = repo.create(input("Three", "2024-01-01", Status::Draft)).unwrap().id;
        assert!(a < b && b < c);
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn colliding_slugs_are_suffixed() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        repo.create(input("Hello", "2024-01-01", Status::Published)).unwrap();
        let second = repo
            .create(input("Hello!", "2024-01-02", Status::Published))
            .unwrap();
        assert_eq!(second.slug, "hello-2");
    }

    #[test]
    fn update_keeps_own_slug() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let id = repo.create(input("Hello", "2024-01-01", Status::Draft)).unwrap().id;
        let updated = repo
            .update(id, input("Hello", "2024-02-02", Status::Published))
            .unwrap()
            .unwrap();
        assert_eq!(updated.slug, "hello");
        assert_eq!(updated.date, "2024-02-02");
        assert_eq!(updated.status, Status::Published);
    }

    #[test]
    fn update_to_taken_slug_is_suffixed() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        repo.create(input("Hello", "2024-01-01", Status::Published)).unwrap();
        let other = repo.create(input("Other", "2024-01-02", Status::Published)).unwrap().id;
        let updated = repo
            .update(
                other,
                PostInput {
                    slug: Some("hello".to_owned()),
                    ..input("Other", "2024-01-02", Status::Published)
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.slug, "hello-2");
        assert_eq!(repo.find_published("hello-2").map(|p| p.id), Some(other));
        assert_eq!(repo.find_published("hello").map(|p| p.title.as_str()), Some("Hello"));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        repo.create(input("Hello", "2024-01-01", Status::Draft)).unwrap();
        let before = repo.posts().cloned().collect::<Vec<_>>();
        let result = repo
            .update(PostId(42), input("Other", "2024-01-01", Status::Published))
            .unwrap();
        assert!(result.is_none());
        assert_eq!(repo.posts().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        let id = repo.create(input("Gone", "2024-01-01", Status::Draft)).unwrap().id;
        repo.create(input("Stays", "2024-01-01", Status::Draft)).unwrap();
        assert!(repo.delete(id));
        let once = repo.posts().cloned().collect::<Vec<_>>();
        assert!(!repo.delete(id));
        assert_eq!(repo.posts().cloned().collect::<Vec<_>>(), once);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn list_published_sorted_newest_first() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        repo.create(input("Old", "2024-01-01", Status::Published)).unwrap();
        repo.create(input("Hidden", "2024-12-01", Status::Draft)).unwrap();
        repo.create(input("New", "2024-06-01", Status::Published)).unwrap();
        repo.create(input("Also new", "2024-06-01", Status::Published)).unwrap();

        let titles = repo
            .list_published(true)
            .into_iter()
            .map(|p| p.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, ["New", "Also new", "Old"]);

        let unsorted = repo.list_published(false);
        assert_eq!(unsorted.len(), 3);
        assert!(unsorted.iter().all(|p| p.is_published()));
    }

    #[test]
    fn save_round_trips_through_store() {
        let store = MemoryStore::new();
        let mut repo = repo(&store);
        repo.create(input("Persisted", "2024-01-01", Status::Published)).unwrap();
        repo.save().unwrap();

        let reloaded = PostRepository::open(&store).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.find_published("persisted").is_some());
    }

    #[test]
    fn collection_is_kept_in_id_order() {
        let post = |id: i64, slug: &str| Post {
            id: PostId(id),
            title: slug.to_owned(),
            slug: slug.to_owned(),
            date: "2024-01-01".to_owned(),
            content: String::new(),
            status: Status::Published,
        };
        let store = MemoryStore::with_posts(vec![post(3, "c"), post(1, "a"), post(2, "b")]);
        let repo = PostRepository::open(&store).unwrap();
        let slugs = repo
            .list_published(true)
            .into_iter()
            .map(|p| p.slug.as_str())
            .collect::<Vec<_>>();
        assert_eq!(slugs, ["a", "b", "c"]);

        repo.save().unwrap();
        let saved = store.load().unwrap();
        let ids = saved.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, [PostId(1), PostId(2), PostId(3)]);
    }

    #[test]
    fn open_skips_duplicate_ids() {
        let post = Post {
            id: PostId(1),
            title: "First".to_owned(),
            slug: "first".to_owned(),
            date: "2024-01-01".to_owned(),
            content: String::new(),
            status: Status::Published,
        };
        let duplicate = Post {
            title: "Second".to_owned(),
            slug: "second".to_owned(),
            ..post.clone()
        };
        let store = MemoryStore::with_posts(vec![post, duplicate]);
        let repo = PostRepository::open(&store).unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find_by_id(PostId(1)).unwrap().title, "First");
    }
}
