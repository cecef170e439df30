use curalink_catalog::forum::{ForumBoard, NewPost, filter_posts};
use curalink_common::{AccountType, CuralinkError};
use curalink_store::JsonStore;

fn draft() -> NewPost {
    NewPost {
        title: "Looking for DBS trial partners".into(),
        category: "Collaboration Opportunities".into(),
        content: "Our lab is recruiting collaborators.".into(),
    }
}

#[tokio::test]
async fn new_post_is_listed_first() {
    let board = ForumBoard::new(JsonStore::memory());
    let post = board
        .create_post(draft(), Some(("Dr. Jane Smith", AccountType::Researcher)))
        .await
        .unwrap();
    assert_eq!(post.replies, 0);
    assert_eq!(post.author_type, AccountType::Researcher);
    assert_eq!(post.date.len(), "2025-01-10".len());

    let posts = board.posts().await.unwrap();
    assert_eq!(posts.len(), 5);
    assert_eq!(posts[0], post);

    let hits = filter_posts(&posts, "recruiting", Some("Collaboration Opportunities"));
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn anonymous_author_without_profile() {
    let board = ForumBoard::new(JsonStore::memory());
    let post = board.create_post(draft(), None).await.unwrap();
    assert_eq!(post.author, "Anonymous");
    assert_eq!(post.author_type, AccountType::Patient);
}

#[tokio::test]
async fn incomplete_draft_is_rejected() {
    let board = ForumBoard::new(JsonStore::memory());
    let err = board
        .create_post(
            NewPost {
                content: " ".into(),
                ..draft()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CuralinkError::Validation(ref m) if m == &vec!["content".to_string()]));
    assert_eq!(board.posts().await.unwrap().len(), 4);
}

#[tokio::test]
async fn post_is_found_with_the_category_spelling_used_to_create_it() {
    let board = ForumBoard::new(JsonStore::memory());
    let post = board
        .create_post(
            NewPost {
                category: "clinical trials".into(),
                ..draft()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(post.category, "Clinical Trials");

    let posts = board.posts().await.unwrap();
    let hits = filter_posts(&posts, "", Some("clinical trials"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, post.id);
}
