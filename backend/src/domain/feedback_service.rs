//! Feedback service: list, create, update, delete and vote toggling over
//! the post, vote and taxonomy repository ports.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::Pagination;
use tracing::info;

use super::error::Error;
use super::feedback::{
    FeedbackItem, FeedbackListQuery, FeedbackPage, HydratedPost, PostDraft, PostId,
    VoteOutcome,
};
use super::ports::{
    FeedbackService, PersistenceError, PostRepository, TaxonomyRepository, VoteRepository,
    map_persistence_error,
};
use super::user::UserId;

const POST_NOT_FOUND: &str = "feedback not found";

/// Default implementation of [`FeedbackService`].
#[derive(Clone)]
pub struct FeedbackServiceImpl {
    posts: Arc<dyn PostRepository>,
    votes: Arc<dyn VoteRepository>,
    taxonomy: Arc<dyn TaxonomyRepository>,
}

impl FeedbackServiceImpl {
    /// Create a service over the given ports.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        votes: Arc<dyn VoteRepository>,
        taxonomy: Arc<dyn TaxonomyRepository>,
    ) -> Self {
        Self {
            posts,
            votes,
            taxonomy,
        }
    }

    /// Reject drafts whose category or status id does not resolve.
    async fn check_draft_references(&self, draft: &PostDraft) -> Result<(), Error> {
        let category = self
            .taxonomy
            .find_category(draft.category_id)
            .await
            .map_err(map_persistence_error)?;
        if category.is_none() {
            return Err(
                Error::invalid_request("validation error").with_details("category not found")
            );
        }

        let status = self
            .taxonomy
            .find_status(draft.status_id)
            .await
            .map_err(map_persistence_error)?;
        if status.is_none() {
            return Err(
                Error::invalid_request("validation error").with_details("status not found")
            );
        }

        Ok(())
    }

    /// Load the post and enforce that `requester` authored it.
    async fn find_owned(&self, requester: UserId, post_id: PostId) -> Result<(), Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(POST_NOT_FOUND))?;
        if post.author_id != requester {
            return Err(Error::forbidden("not the author of this feedback"));
        }
        Ok(())
    }

    async fn hydrate(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
    ) -> Result<FeedbackItem, Error> {
        let entry = self
            .posts
            .find_hydrated(post_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(POST_NOT_FOUND))?;
        let has_voted = match viewer {
            Some(user_id) => !self
                .votes
                .voted_post_ids(user_id, &[post_id])
                .await
                .map_err(map_persistence_error)?
                .is_empty(),
            None => false,
        };
        Ok(FeedbackItem { entry, has_voted })
    }
}

#[async_trait]
impl FeedbackService for FeedbackServiceImpl {
    async fn list(
        &self,
        query: FeedbackListQuery,
        requester: Option<UserId>,
    ) -> Result<FeedbackPage, Error> {
        let page = self
            .posts
            .list(query.filter, query.sort, query.page)
            .await
            .map_err(map_persistence_error)?;

        let voted: HashSet<PostId> = match requester {
            Some(user_id) if !page.items.is_empty() => {
                let ids: Vec<PostId> =
                    page.items.iter().map(|item| item.post.id).collect();
                self.votes
                    .voted_post_ids(user_id, &ids)
                    .await
                    .map_err(map_persistence_error)?
                    .into_iter()
                    .collect()
            }
            _ => HashSet::new(),
        };

        let pagination = Pagination::for_total(page.total, query.page);
        let items = page
            .items
            .into_iter()
            .map(|entry: HydratedPost| {
                let has_voted = voted.contains(&entry.post.id);
                FeedbackItem { entry, has_voted }
            })
            .collect();

        Ok(FeedbackPage { items, pagination })
    }

    async fn create(
        &self,
        author_id: UserId,
        draft: PostDraft,
    ) -> Result<FeedbackItem, Error> {
        self.check_draft_references(&draft).await?;
        let post = self
            .posts
            .insert(author_id, &draft)
            .await
            .map_err(map_persistence_error)?;
        info!(post_id = %post.id, author_id = %author_id, "feedback created");
        self.hydrate(post.id, Some(author_id)).await
    }

    async fn update(
        &self,
        requester: UserId,
        post_id: PostId,
        draft: PostDraft,
    ) -> Result<FeedbackItem, Error> {
        self.find_owned(requester, post_id).await?;
        self.check_draft_references(&draft).await?;
        let replaced = self
            .posts
            .replace(post_id, &draft)
            .await
            .map_err(map_persistence_error)?;
        if replaced.is_none() {
            return Err(Error::not_found(POST_NOT_FOUND));
        }
        self.hydrate(post_id, Some(requester)).await
    }

    async fn delete(&self, requester: UserId, post_id: PostId) -> Result<(), Error> {
        self.find_owned(requester, post_id).await?;
        let removed = self
            .posts
            .delete(post_id)
            .await
            .map_err(map_persistence_error)?;
        if !removed {
            return Err(Error::not_found(POST_NOT_FOUND));
        }
        info!(post_id = %post_id, "feedback deleted");
        Ok(())
    }

    async fn toggle_vote(
        &self,
        requester: UserId,
        post_id: PostId,
    ) -> Result<VoteOutcome, Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_persistence_error)?;
        if post.is_none() {
            return Err(Error::not_found(POST_NOT_FOUND));
        }

        let inserted = match self.votes.insert_if_absent(requester, post_id).await {
            Ok(inserted) => inserted,
            // The post vanished between the check and the insert; report it
            // the same way as the up-front check.
            Err(PersistenceError::Conflict { .. }) => {
                return Err(Error::not_found(POST_NOT_FOUND));
            }
            Err(other) => return Err(map_persistence_error(other)),
        };
        if inserted {
            return Ok(VoteOutcome { voted: true });
        }

        // A vote already existed: this toggle removes it. If a concurrent
        // request removed it first, the caller still observes the applied
        // state.
        let _removed = self
            .votes
            .remove(requester, post_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(VoteOutcome { voted: false })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Mutex;

    use super::*;
    use crate::domain::feedback::{
        AuthorSummary, ListFilter, Post, PostDescription, PostTitle, SortKey,
    };
    use crate::domain::ports::PostPage;
    use crate::domain::taxonomy::{
        Category, CategoryId, CategoryName, Status, StatusId,
    };
    use crate::domain::user::EmailAddress;
    use crate::domain::ErrorCode;
    use chrono::Utc;
    use pagination::PageRequest;
    use rstest::rstest;

    struct StubTaxonomy;

    #[async_trait]
    impl TaxonomyRepository for StubTaxonomy {
        async fn categories(&self) -> Result<Vec<Category>, PersistenceError> {
            Ok(vec![Category {
                id: CategoryId::new(1),
                name: "Bug".to_owned(),
            }])
        }

        async fn statuses(&self) -> Result<Vec<Status>, PersistenceError> {
            Ok(vec![Status {
                id: StatusId::new(1),
                name: "Idea".to_owned(),
            }])
        }

        async fn find_category(
            &self,
            id: CategoryId,
        ) -> Result<Option<Category>, PersistenceError> {
            Ok((id.get() == 1).then(|| Category {
                id,
                name: "Bug".to_owned(),
            }))
        }

        async fn find_status(
            &self,
            id: StatusId,
        ) -> Result<Option<Status>, PersistenceError> {
            Ok((id.get() == 1).then(|| Status {
                id,
                name: "Idea".to_owned(),
            }))
        }

        async fn insert_category(
            &self,
            name: &CategoryName,
        ) -> Result<Category, PersistenceError> {
            Ok(Category {
                id: CategoryId::new(9),
                name: name.as_ref().to_owned(),
            })
        }
    }

    #[derive(Default)]
    struct StubPostState {
        posts: Vec<Post>,
        next_id: i32,
    }

    #[derive(Default)]
    struct StubPostRepository {
        state: Mutex<StubPostState>,
        votes: Mutex<Vec<(UserId, PostId)>>,
    }

    impl StubPostRepository {
        fn vote_count(&self, post_id: PostId) -> u64 {
            let votes = self.votes.lock().expect("votes lock");
            votes.iter().filter(|(_, p)| *p == post_id).count() as u64
        }

        fn author_summary(author_id: UserId) -> AuthorSummary {
            AuthorSummary {
                id: author_id,
                email: EmailAddress::new("a@x.com").expect("valid email"),
                display_name: None,
                avatar: None,
            }
        }

        fn hydrate(&self, post: &Post) -> HydratedPost {
            HydratedPost {
                post: post.clone(),
                author: Self::author_summary(post.author_id),
                category: Category {
                    id: post.category_id,
                    name: "Bug".to_owned(),
                },
                status: Status {
                    id: post.status_id,
                    name: "Idea".to_owned(),
                },
                vote_count: self.vote_count(post.id),
            }
        }
    }

    #[async_trait]
    impl PostRepository for StubPostRepository {
        async fn insert(
            &self,
            author_id: UserId,
            draft: &PostDraft,
        ) -> Result<Post, PersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            state.next_id += 1;
            let now = Utc::now();
            let post = Post {
                id: PostId::new(state.next_id),
                title: draft.title.clone(),
                description: draft.description.clone(),
                author_id,
                category_id: draft.category_id,
                status_id: draft.status_id,
                created_at: now,
                updated_at: now,
            };
            state.posts.push(post.clone());
            Ok(post)
        }

        async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.posts.iter().find(|post| post.id == id).cloned())
        }

        async fn find_hydrated(
            &self,
            id: PostId,
        ) -> Result<Option<HydratedPost>, PersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state
                .posts
                .iter()
                .find(|post| post.id == id)
                .map(|post| self.hydrate(post)))
        }

        async fn replace(
            &self,
            id: PostId,
            draft: &PostDraft,
        ) -> Result<Option<Post>, PersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            let Some(post) = state.posts.iter_mut().find(|post| post.id == id) else {
                return Ok(None);
            };
            post.title = draft.title.clone();
            post.description = draft.description.clone();
            post.category_id = draft.category_id;
            post.status_id = draft.status_id;
            post.updated_at = Utc::now();
            Ok(Some(post.clone()))
        }

        async fn delete(&self, id: PostId) -> Result<bool, PersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            let before = state.posts.len();
            state.posts.retain(|post| post.id != id);
            let removed = state.posts.len() < before;
            if removed {
                self.votes
                    .lock()
                    .expect("votes lock")
                    .retain(|(_, post_id)| *post_id != id);
            }
            Ok(removed)
        }

        async fn list(
            &self,
            filter: ListFilter,
            sort: SortKey,
            page: PageRequest,
        ) -> Result<PostPage, PersistenceError> {
            let state = self.state.lock().expect("state lock");
            let mut matching: Vec<HydratedPost> = state
                .posts
                .iter()
                .filter(|post| {
                    filter
                        .category_id
                        .is_none_or(|category| post.category_id == category)
                        && filter.status_id.is_none_or(|status| post.status_id == status)
                })
                .map(|post| self.hydrate(post))
                .collect();
            match sort {
                SortKey::Recent => matching.sort_by(|a, b| {
                    (b.post.created_at, b.post.id.get())
                        .cmp(&(a.post.created_at, a.post.id.get()))
                }),
                SortKey::Votes => matching.sort_by(|a, b| {
                    (b.vote_count, a.post.id.get()).cmp(&(a.vote_count, b.post.id.get()))
                }),
            }
            let total = matching.len() as u64;
            let items = matching
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap_or(0))
                .take(usize::try_from(page.limit()).unwrap_or(0))
                .collect();
            Ok(PostPage { items, total })
        }
    }

    struct StubVoteRepository {
        inner: Arc<StubPostRepository>,
    }

    #[async_trait]
    impl VoteRepository for StubVoteRepository {
        async fn insert_if_absent(
            &self,
            user_id: UserId,
            post_id: PostId,
        ) -> Result<bool, PersistenceError> {
            let mut votes = self.inner.votes.lock().expect("votes lock");
            if votes.contains(&(user_id, post_id)) {
                return Ok(false);
            }
            votes.push((user_id, post_id));
            Ok(true)
        }

        async fn remove(
            &self,
            user_id: UserId,
            post_id: PostId,
        ) -> Result<bool, PersistenceError> {
            let mut votes = self.inner.votes.lock().expect("votes lock");
            let before = votes.len();
            votes.retain(|entry| *entry != (user_id, post_id));
            Ok(votes.len() < before)
        }

        async fn voted_post_ids(
            &self,
            user_id: UserId,
            post_ids: &[PostId],
        ) -> Result<Vec<PostId>, PersistenceError> {
            let votes = self.inner.votes.lock().expect("votes lock");
            Ok(votes
                .iter()
                .filter(|(voter, post)| *voter == user_id && post_ids.contains(post))
                .map(|(_, post)| *post)
                .collect())
        }
    }

    fn service() -> (FeedbackServiceImpl, Arc<StubPostRepository>) {
        let posts = Arc::new(StubPostRepository::default());
        let votes = Arc::new(StubVoteRepository {
            inner: posts.clone(),
        });
        let svc = FeedbackServiceImpl::new(posts.clone(), votes, Arc::new(StubTaxonomy));
        (svc, posts)
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: PostTitle::new(title).expect("valid title"),
            description: PostDescription::new("some description").expect("valid description"),
            category_id: CategoryId::new(1),
            status_id: StatusId::new(1),
        }
    }

    #[tokio::test]
    async fn create_returns_hydrated_item_with_zero_votes() {
        let (svc, _) = service();
        let item = svc
            .create(UserId::new(1), draft("Add dark mode"))
            .await
            .expect("create succeeds");
        assert_eq!(item.entry.post.title.as_ref(), "Add dark mode");
        assert_eq!(item.entry.vote_count, 0);
        assert!(!item.has_voted);
    }

    #[rstest]
    #[case(CategoryId::new(99), StatusId::new(1), "category not found")]
    #[case(CategoryId::new(1), StatusId::new(99), "status not found")]
    #[tokio::test]
    async fn create_rejects_unresolvable_references(
        #[case] category_id: CategoryId,
        #[case] status_id: StatusId,
        #[case] details: &str,
    ) {
        let (svc, _) = service();
        let bad_draft = PostDraft {
            category_id,
            status_id,
            ..draft("Add dark mode")
        };
        let err = svc
            .create(UserId::new(1), bad_draft)
            .await
            .expect_err("unresolvable reference must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details(), Some(details));
    }

    #[tokio::test]
    async fn toggle_vote_is_involutive() {
        let (svc, _) = service();
        let item = svc
            .create(UserId::new(1), draft("Add dark mode"))
            .await
            .expect("create succeeds");
        let post_id = item.entry.post.id;
        let voter = UserId::new(2);

        let first = svc.toggle_vote(voter, post_id).await.expect("first toggle");
        assert!(first.voted);
        let hydrated = svc
            .hydrate(post_id, Some(voter))
            .await
            .expect("hydrate succeeds");
        assert_eq!(hydrated.entry.vote_count, 1);
        assert!(hydrated.has_voted);

        let second = svc.toggle_vote(voter, post_id).await.expect("second toggle");
        assert!(!second.voted);
        let after = svc
            .hydrate(post_id, Some(voter))
            .await
            .expect("hydrate succeeds");
        assert_eq!(after.entry.vote_count, 0);
        assert!(!after.has_voted);
    }

    #[tokio::test]
    async fn vote_flags_are_per_viewer() {
        let (svc, _) = service();
        let item = svc
            .create(UserId::new(1), draft("Add dark mode"))
            .await
            .expect("create succeeds");
        let post_id = item.entry.post.id;

        svc.toggle_vote(UserId::new(2), post_id)
            .await
            .expect("vote as user 2");

        let as_user_2 = svc
            .hydrate(post_id, Some(UserId::new(2)))
            .await
            .expect("hydrate");
        let as_user_3 = svc
            .hydrate(post_id, Some(UserId::new(3)))
            .await
            .expect("hydrate");
        assert!(as_user_2.has_voted);
        assert!(!as_user_3.has_voted);
        assert_eq!(as_user_3.entry.vote_count, 1);
    }

    #[tokio::test]
    async fn toggle_vote_on_missing_post_is_not_found() {
        let (svc, _) = service();
        let err = svc
            .toggle_vote(UserId::new(1), PostId::new(404))
            .await
            .expect_err("missing post must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_by_non_author_is_forbidden_and_leaves_post_unchanged() {
        let (svc, posts) = service();
        let item = svc
            .create(UserId::new(1), draft("Original title"))
            .await
            .expect("create succeeds");
        let post_id = item.entry.post.id;

        let err = svc
            .update(UserId::new(2), post_id, draft("Hijacked title"))
            .await
            .expect_err("non-author must be rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let unchanged = posts
            .find_by_id(post_id)
            .await
            .expect("lookup succeeds")
            .expect("post still present");
        assert_eq!(unchanged.title.as_ref(), "Original title");
    }

    #[tokio::test]
    async fn delete_by_non_author_is_forbidden() {
        let (svc, posts) = service();
        let item = svc
            .create(UserId::new(1), draft("Keep me"))
            .await
            .expect("create succeeds");

        let err = svc
            .delete(UserId::new(2), item.entry.post.id)
            .await
            .expect_err("non-author must be rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(
            posts
                .find_by_id(item.entry.post.id)
                .await
                .expect("lookup succeeds")
                .is_some()
        );
    }

    #[tokio::test]
    async fn list_paginates_and_flags_votes() {
        let (svc, _) = service();
        for index in 0..15 {
            svc.create(UserId::new(1), draft(&format!("Post {index}")))
                .await
                .expect("create succeeds");
        }
        svc.toggle_vote(UserId::new(2), PostId::new(3))
            .await
            .expect("vote");

        let query = FeedbackListQuery {
            page: PageRequest::from_raw(Some(1), Some(10)).expect("valid page"),
            ..FeedbackListQuery::default()
        };
        let page_one = svc
            .list(query, Some(UserId::new(2)))
            .await
            .expect("list succeeds");
        assert_eq!(page_one.items.len(), 10);
        assert_eq!(page_one.pagination.total, 15);
        assert_eq!(page_one.pagination.pages, 2);
        assert_eq!(page_one.pagination.current_page, 1);

        let second_query = FeedbackListQuery {
            page: PageRequest::from_raw(Some(2), Some(10)).expect("valid page"),
            ..FeedbackListQuery::default()
        };
        let page_two = svc
            .list(second_query, Some(UserId::new(2)))
            .await
            .expect("list succeeds");
        assert_eq!(page_two.items.len(), 5);
        let voted_item = page_two
            .items
            .iter()
            .find(|item| item.entry.post.id == PostId::new(3))
            .expect("post 3 on page two under recent sort");
        assert!(voted_item.has_voted);
    }

    #[tokio::test]
    async fn list_sorted_by_votes_is_non_increasing() {
        let (svc, _) = service();
        for index in 0..3 {
            svc.create(UserId::new(1), draft(&format!("Post {index}")))
                .await
                .expect("create succeeds");
        }
        // Post 2 gets two votes, post 3 one, post 1 none.
        svc.toggle_vote(UserId::new(10), PostId::new(2))
            .await
            .expect("vote");
        svc.toggle_vote(UserId::new(11), PostId::new(2))
            .await
            .expect("vote");
        svc.toggle_vote(UserId::new(10), PostId::new(3))
            .await
            .expect("vote");

        let query = FeedbackListQuery {
            sort: SortKey::Votes,
            ..FeedbackListQuery::default()
        };
        let page = svc.list(query, None).await.expect("list succeeds");
        let counts: Vec<u64> = page.items.iter().map(|item| item.entry.vote_count).collect();
        assert_eq!(counts, vec![2, 1, 0]);
        assert!(page.items.iter().all(|item| !item.has_voted));
    }
}
