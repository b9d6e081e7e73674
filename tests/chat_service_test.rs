// ABOUTME: Integration tests for property chats run through the chat service
// ABOUTME: Verifies prompt substitution, rating extraction and persistence of every choice
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{create_test_database, test_settings, ScriptedClient, ScriptedReply};
use honing_inn::chat::ChatService;
use honing_inn::database::{ChatStore, Database, SearchStore};
use honing_inn::errors::ErrorCode;
use honing_inn::models::{ChatType, Home, MessageRole, NewChatType, NewHome, NewTheme, Theme};

async fn fixtures(database: &Arc<Database>) -> (Home, Theme, ChatType) {
    let theme = database
        .create_theme(&NewTheme {
            name: "Family".into(),
            ..NewTheme::default()
        })
        .await
        .unwrap();
    let home = database
        .create_home(&NewHome {
            title: "For sale | 12 Example Street homes.co.nz".into(),
            url: Some("https://example.com/listing/12".into()),
            clean_address: "12 Example Street".into(),
            clean_suburb: "Riccarton".into(),
            lat: -43.53,
            lng: 172.6,
        })
        .await
        .unwrap();
    let chat_type = database
        .create_chat_type(&NewChatType {
            theme_id: theme.id.clone(),
            name: "Schools".into(),
            prompt: "How good are the {topic} near {address}, {suburb}?".into(),
            address_type: "address".into(),
            start_system_prompt_override: None,
        })
        .await
        .unwrap();
    (home, theme, chat_type)
}

#[tokio::test]
async fn test_run_chat_stores_rating_and_choices() {
    let database = create_test_database().await.unwrap();
    let (home, theme, chat_type) = fixtures(&database).await;
    let client = ScriptedClient::new([ScriptedReply::Choices(vec![
        "Draft answer".into(),
        "Several good schools nearby.\nRating: 4".into(),
    ])]);
    let service = ChatService::new(database.clone(), client.clone(), test_settings());

    let chat = service.run_chat(&home, &chat_type, &theme).await.unwrap();

    assert_eq!(chat.rating, 4);
    assert_eq!(chat.home_id, home.id);
    assert_eq!(chat.chat_type_id, chat_type.id);
    assert_eq!(chat.chat_type_title, "Schools");
    assert_eq!(chat.theme_id, theme.id);
    assert_eq!(
        chat.prompt,
        "How good are the Schools near 12 Example Street, Riccarton?"
    );
    assert_eq!(chat.results.len(), 2);
    assert_eq!(chat.results[1].role, MessageRole::Assistant);

    let prompt = &client.prompts()[0];
    assert_eq!(prompt.messages.len(), 2);
    assert_eq!(prompt.messages[0].role, MessageRole::System);
    assert!(prompt.messages[0].content.contains("by researching Schools"));
    assert!(!prompt.messages[0].content.contains("{topic}"));

    let stored = database.list_chats(&home.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], chat);
}

#[tokio::test]
async fn test_chat_type_override_wins_over_theme_prompt() {
    let database = create_test_database().await.unwrap();
    let theme = database
        .create_theme(&NewTheme {
            name: "Quiet".into(),
            start_geo_system_prompt: None,
            start_system_prompt: Some("Theme prompt for {address}".into()),
        })
        .await
        .unwrap();
    let (home, _, _) = fixtures(&database).await;
    let with_override = database
        .create_chat_type(&NewChatType {
            theme_id: theme.id.clone(),
            name: "Noise".into(),
            prompt: "Is {address} noisy?".into(),
            address_type: "address".into(),
            start_system_prompt_override: Some("Override for {topic}".into()),
        })
        .await
        .unwrap();
    let client = ScriptedClient::new([ScriptedReply::text("Rating: 2")]);
    let service = ChatService::new(database.clone(), client.clone(), test_settings());

    service.run_chat(&home, &with_override, &theme).await.unwrap();

    assert_eq!(client.prompts()[0].messages[0].content, "Override for Noise");
}

#[tokio::test]
async fn test_missing_rating_is_stored_as_negative_one() {
    let database = create_test_database().await.unwrap();
    let (home, theme, chat_type) = fixtures(&database).await;
    let client = ScriptedClient::new([ScriptedReply::text("No opinion.")]);
    let service = ChatService::new(database.clone(), client, test_settings());

    let chat = service.run_chat(&home, &chat_type, &theme).await.unwrap();
    assert_eq!(chat.rating, -1);
}

#[tokio::test]
async fn test_zero_choices_fails_without_storing() {
    let database = create_test_database().await.unwrap();
    let (home, theme, chat_type) = fixtures(&database).await;
    let client = ScriptedClient::new([ScriptedReply::empty()]);
    let service = ChatService::new(database.clone(), client, test_settings());

    let error = service
        .run_chat(&home, &chat_type, &theme)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::EmptyCompletion);
    assert!(database.list_chats(&home.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_all_chats_covers_every_chat_type() {
    let database = create_test_database().await.unwrap();
    let (home, theme, _) = fixtures(&database).await;
    database
        .create_chat_type(&NewChatType {
            theme_id: theme.id.clone(),
            name: "Parks".into(),
            prompt: "Parks near {address}?".into(),
            address_type: "address".into(),
            start_system_prompt_override: None,
        })
        .await
        .unwrap();
    let client = ScriptedClient::new([
        ScriptedReply::text("Rating: 5"),
        ScriptedReply::text("Rating: 1"),
    ]);
    let service = ChatService::new(database.clone(), client, test_settings());

    let chats = service.run_all_chats(&home, &theme).await.unwrap();

    let summary: Vec<(&str, i32)> = chats
        .iter()
        .map(|c| (c.chat_type_title.as_str(), c.rating))
        .collect();
    assert_eq!(summary, vec![("Schools", 5), ("Parks", 1)]);
    assert_eq!(database.list_chats(&home.id).await.unwrap().len(), 2);
}
