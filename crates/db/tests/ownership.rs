//! Integration tests for the ownership coordinator and the mirror invariant
//! between `users.chat_ids` and the `conversations` table.

use assert_matches::assert_matches;
use parley_core::conversation::{Message, MessageRole};
use parley_db::models::user::{CreateUser, User};
use parley_db::ownership::{OwnershipCoordinator, OwnershipError};
use parley_db::repositories::{ConversationRepo, UserRepo};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a test user directly through the repository.
async fn create_test_user(pool: &PgPool, username: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        password_hash: "$argon2id$fake-hash-for-tests".to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Assert that a user's `chat_ids` mirror equals the set of conversation ids
/// the conversation table reports for them, in both directions.
async fn assert_mirror_consistent(pool: &PgPool, user_id: Uuid) {
    let user = UserRepo::find_by_id(pool, user_id)
        .await
        .expect("lookup should succeed")
        .expect("user should exist");
    let conversations = ConversationRepo::list_for_owner(pool, user_id)
        .await
        .expect("list should succeed");

    let mut mirrored: Vec<Uuid> = user.chat_ids.0.clone();
    let mut actual: Vec<Uuid> = conversations.iter().map(|c| c.chat_id).collect();
    mirrored.sort();
    actual.sort();
    assert_eq!(mirrored, actual, "chat_ids mirror must match the row set");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_conversation_updates_both_sides(pool: PgPool) {
    let user = create_test_user(&pool, "12345678901").await;
    let chat_id = Uuid::now_v7();

    let conversation = OwnershipCoordinator::create_conversation(&pool, user.id, chat_id)
        .await
        .expect("creation should succeed");

    assert_eq!(conversation.chat_id, chat_id);
    assert_eq!(conversation.owner_id, user.id);
    assert!(conversation.content.0.is_empty(), "new conversation starts empty");

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.chat_ids.0, vec![chat_id]);
    assert_mirror_consistent(&pool, user.id).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_chat_id_rejected(pool: PgPool) {
    let user = create_test_user(&pool, "12345678901").await;
    let chat_id = Uuid::now_v7();

    OwnershipCoordinator::create_conversation(&pool, user.id, chat_id)
        .await
        .expect("first creation should succeed");

    let result = OwnershipCoordinator::create_conversation(&pool, user.id, chat_id).await;
    assert_matches!(result, Err(OwnershipError::DuplicateChat { .. }));

    // The failed attempt must not disturb the mirror.
    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.chat_ids.0.len(), 1);
    assert_mirror_consistent(&pool, user.id).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_same_chat_id_allowed_for_different_owners(pool: PgPool) {
    let alice = create_test_user(&pool, "11111111111").await;
    let bob = create_test_user(&pool, "22222222222").await;
    let chat_id = Uuid::now_v7();

    OwnershipCoordinator::create_conversation(&pool, alice.id, chat_id)
        .await
        .expect("creation for alice should succeed");
    OwnershipCoordinator::create_conversation(&pool, bob.id, chat_id)
        .await
        .expect("uniqueness is scoped per owner");

    assert_mirror_consistent(&pool, alice.id).await;
    assert_mirror_consistent(&pool, bob.id).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_for_unknown_user_fails(pool: PgPool) {
    let result =
        OwnershipCoordinator::create_conversation(&pool, Uuid::now_v7(), Uuid::now_v7()).await;
    assert_matches!(result, Err(OwnershipError::UnknownUser(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_conversation_updates_both_sides(pool: PgPool) {
    let user = create_test_user(&pool, "12345678901").await;
    let chat_id = Uuid::now_v7();

    OwnershipCoordinator::create_conversation(&pool, user.id, chat_id)
        .await
        .expect("creation should succeed");
    OwnershipCoordinator::delete_conversation(&pool, user.id, chat_id)
        .await
        .expect("deletion should succeed");

    let found = ConversationRepo::get_by_id_for_owner(&pool, chat_id, user.id)
        .await
        .unwrap();
    assert!(found.is_none(), "deleted conversation must be gone");

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(reloaded.chat_ids.0.is_empty(), "mirror must be emptied");

    // Deleting again reports not-owned.
    let result = OwnershipCoordinator::delete_conversation(&pool, user.id, chat_id).await;
    assert_matches!(result, Err(OwnershipError::NotOwned { .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cross_user_access_is_invisible(pool: PgPool) {
    let alice = create_test_user(&pool, "11111111111").await;
    let bob = create_test_user(&pool, "22222222222").await;
    let chat_id = Uuid::now_v7();

    OwnershipCoordinator::create_conversation(&pool, alice.id, chat_id)
        .await
        .expect("creation should succeed");

    // Bob cannot see or delete Alice's conversation; both look like absence.
    let found = ConversationRepo::get_by_id_for_owner(&pool, chat_id, bob.id)
        .await
        .unwrap();
    assert!(found.is_none());

    let result = OwnershipCoordinator::delete_conversation(&pool, bob.id, chat_id).await;
    assert_matches!(result, Err(OwnershipError::NotOwned { .. }));

    // Alice's conversation is untouched.
    assert_mirror_consistent(&pool, alice.id).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_append_preserves_order(pool: PgPool) {
    let user = create_test_user(&pool, "12345678901").await;
    let chat_id = Uuid::now_v7();
    OwnershipCoordinator::create_conversation(&pool, user.id, chat_id)
        .await
        .expect("creation should succeed");

    let first = Message {
        role: MessageRole::User,
        content: "hello".to_string(),
    };
    let second = Message {
        role: MessageRole::Assistant,
        content: "hi there".to_string(),
    };

    let after_first = ConversationRepo::append_message(&pool, chat_id, user.id, &first)
        .await
        .unwrap()
        .expect("append should find the conversation");
    assert_eq!(after_first.content.0, vec![first.clone()]);

    // The returned row reflects this append, without a separate read.
    let after_second = ConversationRepo::append_message(&pool, chat_id, user.id, &second)
        .await
        .unwrap()
        .expect("append should find the conversation");
    assert_eq!(after_second.content.0, vec![first.clone(), second.clone()]);

    let conversation = ConversationRepo::get_by_id_for_owner(&pool, chat_id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversation.content.0, vec![first, second]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_append_to_missing_conversation_returns_none(pool: PgPool) {
    let user = create_test_user(&pool, "12345678901").await;
    let message = Message {
        role: MessageRole::User,
        content: "into the void".to_string(),
    };

    let appended = ConversationRepo::append_message(&pool, Uuid::now_v7(), user.id, &message)
        .await
        .unwrap();
    assert!(appended.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_most_recent_first(pool: PgPool) {
    let user = create_test_user(&pool, "12345678901").await;
    let older = Uuid::now_v7();
    let newer = Uuid::now_v7();

    OwnershipCoordinator::create_conversation(&pool, user.id, older)
        .await
        .unwrap();
    OwnershipCoordinator::create_conversation(&pool, user.id, newer)
        .await
        .unwrap();

    let listed = ConversationRepo::list_for_owner(&pool, user.id).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|c| c.chat_id).collect();
    assert_eq!(ids, vec![newer, older]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_user_cascades_to_conversations(pool: PgPool) {
    let user = create_test_user(&pool, "12345678901").await;
    let chat_id = Uuid::now_v7();
    OwnershipCoordinator::create_conversation(&pool, user.id, chat_id)
        .await
        .unwrap();

    let deleted = OwnershipCoordinator::delete_user(&pool, user.id)
        .await
        .expect("deletion should succeed");
    assert!(deleted);

    // The conversation is gone for every caller, including the former owner.
    let found = ConversationRepo::get_by_id_for_owner(&pool, chat_id, user.id)
        .await
        .unwrap();
    assert!(found.is_none(), "cascade must remove owned conversations");
}
