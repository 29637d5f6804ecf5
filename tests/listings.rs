mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};

async fn seeded() -> TestApp {
    let app = TestApp::spawn().await;
    let author = app.create_user("test_name1").await;
    let group = app.create_group("test_group1", "test_slug1").await;
    for n in 0..13 {
        app.create_post(author, &format!("Тестовый пост {}", n), Some(group))
            .await;
    }
    app
}

const LISTINGS: [&str; 3] = ["/", "/group/test_slug1/", "/profile/test_name1/"];

#[tokio::test]
async fn first_page_contains_ten_posts() {
    let app = seeded().await;
    for uri in LISTINGS {
        let body = body_json(app.get(uri, None).await).await;
        assert_eq!(
            body["data"]["page"]["items"].as_array().unwrap().len(),
            10,
            "{}",
            uri
        );
    }
}

#[tokio::test]
async fn second_page_contains_three_posts() {
    let app = seeded().await;
    for uri in LISTINGS {
        let body = body_json(app.get(&format!("{}?page=2", uri), None).await).await;
        assert_eq!(
            body["data"]["page"]["items"].as_array().unwrap().len(),
            3,
            "{}",
            uri
        );
    }
}

#[tokio::test]
async fn out_of_range_page_clamps_to_last() {
    let app = seeded().await;
    let body = body_json(app.get("/group/test_slug1/?page=40", None).await).await;
    assert_eq!(body["data"]["page"]["number"], 2);
    assert_eq!(body["data"]["page"]["items"].as_array().unwrap().len(), 3);

    let body = body_json(app.get("/group/test_slug1/?page=abc", None).await).await;
    assert_eq!(body["data"]["page"]["number"], 1);
}

#[tokio::test]
async fn listings_are_newest_first() {
    let app = seeded().await;
    let body = body_json(app.get("/profile/test_name1/", None).await).await;
    let items = body["data"]["page"]["items"].as_array().unwrap();
    assert_eq!(items[0]["text"], "Тестовый пост 12");
    assert_eq!(items[9]["text"], "Тестовый пост 3");
    assert_eq!(body["data"]["posts_count"], 13);
}

#[tokio::test]
async fn public_pages_are_ok_for_guests() {
    let app = TestApp::spawn().await;
    let author = app.create_user("test_user").await;
    let group = app.create_group("группа", "one_group").await;
    let post_id = app.create_post(author, "Тестовый текст", Some(group)).await;

    let detail = format!("/posts/{}/", post_id);
    for uri in ["/", "/group/one_group/", "/profile/test_user/", detail.as_str()] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn unknown_page_is_not_found() {
    let app = TestApp::spawn().await;
    let response = app.get("/unexisting_page/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_group_user_and_post_are_not_found() {
    let app = TestApp::spawn().await;
    for uri in [
        "/group/nope/",
        "/profile/nobody/",
        "/posts/12/",
        "/posts/abc/",
        "/posts/-1/",
        "/posts/99999999999999999999/",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

        let body = body_json(response).await;
        assert_eq!(body["success"], false, "{}", uri);
    }
}

#[tokio::test]
async fn group_page_carries_group_and_only_its_posts() {
    let app = TestApp::spawn().await;
    let author = app.create_user("test_name").await;
    let group = app.create_group("test_group", "test_slug").await;
    let other = app.create_group("other_group", "other_slug").await;
    app.create_post(author, "in group", Some(group)).await;
    app.create_post(author, "elsewhere", Some(other)).await;

    let body = body_json(app.get("/group/test_slug/", None).await).await;
    assert_eq!(body["data"]["group"]["title"], "test_group");
    let items = body["data"]["page"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "in group");
    assert_eq!(items[0]["group"]["slug"], "test_slug");
}

#[tokio::test]
async fn detail_page_shows_post_and_author_count() {
    let app = TestApp::spawn().await;
    let author = app.create_user("test_name").await;
    let group = app.create_group("test_group", "test_slug").await;
    let post_id = app.create_post(author, "Тестовый текст", Some(group)).await;
    app.create_post(author, "another", None).await;

    let body = body_json(app.get(&format!("/posts/{}/", post_id), None).await).await;
    assert_eq!(body["data"]["post"]["author"]["username"], "test_name");
    assert_eq!(body["data"]["post"]["text"], "Тестовый текст");
    assert_eq!(body["data"]["post"]["group"]["slug"], "test_slug");
    assert_eq!(body["data"]["posts_count"], 2);
    assert_eq!(body["data"]["form"]["text"], "");
    assert!(body["data"]["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_group_keeps_its_posts() {
    let app = TestApp::spawn().await;
    let author = app.create_user("test_name").await;
    let group = app.create_group("test_group", "test_slug").await;
    let post_id = app.create_post(author, "survivor", Some(group)).await;

    sqlx::query("DELETE FROM post_groups WHERE id = ?")
        .bind(group)
        .execute(&app.pool)
        .await
        .unwrap();

    let body = body_json(app.get(&format!("/posts/{}/", post_id), None).await).await;
    assert!(body["data"]["post"]["group"].is_null());
}

#[tokio::test]
async fn deleting_post_removes_its_comments() {
    let app = TestApp::spawn().await;
    let author = app.create_user("test_name").await;
    let post_id = app.create_post(author, "doomed", None).await;
    let kept_id = app.create_post(author, "kept", None).await;
    for id in [post_id, kept_id] {
        sqlx::query("INSERT INTO comments (text, author_id, post_id) VALUES ('hi', ?, ?)")
            .bind(author)
            .bind(id)
            .execute(&app.pool)
            .await
            .unwrap();
    }

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(post_id)
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(app.count("posts").await, 1);
    assert_eq!(app.count("comments").await, 1);
}

#[tokio::test]
async fn deleting_user_removes_their_posts_comments_and_follows() {
    let app = TestApp::spawn().await;
    let author = app.create_user("leaving").await;
    let reader = app.create_user("staying").await;
    let own_post = app.create_post(author, "by leaving", None).await;
    let other_post = app.create_post(reader, "by staying", None).await;

    // The author's comment on someone else's post, and a comment on the author's post.
    for (comment_author, post_id) in [(author, other_post), (reader, own_post)] {
        sqlx::query("INSERT INTO comments (text, author_id, post_id) VALUES ('hi', ?, ?)")
            .bind(comment_author)
            .bind(post_id)
            .execute(&app.pool)
            .await
            .unwrap();
    }
    for (user_id, author_id) in [(author, reader), (reader, author)] {
        sqlx::query("INSERT INTO follows (user_id, author_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(author_id)
            .execute(&app.pool)
            .await
            .unwrap();
    }

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(author)
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(app.count("users").await, 1);
    assert_eq!(app.count("posts").await, 1);
    assert_eq!(app.count("comments").await, 0);
    assert_eq!(app.count("follows").await, 0);

    let response = app.get(&format!("/posts/{}/", own_post), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
