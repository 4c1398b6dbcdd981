mod common;

use common::{ALICE, BOB, GAMING, add_member, insert_server, seeded};
use server_directory::middleware::auth::CurrentUser;
use server_directory::models::server::{FilterRequest, ShapedServer};
use server_directory::services::server_list::list_servers;
use server_directory::utils::error::AppError;

fn ids(servers: &[ShapedServer]) -> Vec<i64> {
    servers.iter().map(|s| s.server().id).collect()
}

fn as_user(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("user{}", id),
    }
}

/// An empty request returns every server without member counts.
#[tokio::test]
async fn returns_everything_without_filters() {
    let state = seeded().await;

    let servers = list_servers(&state.db, &FilterRequest::default(), None)
        .await
        .unwrap();

    assert_eq!(ids(&servers), vec![1, 2, 3]);
    assert!(servers.iter().all(|s| s.num_members().is_none()));
}

/// Channels are nested under their own server, ordered by id.
#[tokio::test]
async fn nests_channels_per_server() {
    let state = seeded().await;

    let servers = list_servers(&state.db, &FilterRequest::default(), None)
        .await
        .unwrap();

    let names: Vec<Vec<&str>> = servers
        .iter()
        .map(|s| {
            s.server()
                .channel_server
                .iter()
                .map(|c| c.name.as_str())
                .collect()
        })
        .collect();
    assert_eq!(names, vec![vec!["general", "clips"], vec!["lobby"], vec![]]);
    assert!(
        servers
            .iter()
            .all(|s| s.server().channel_server.iter().all(|c| c.server == s.server().id))
    );
}

/// Category plus member count keeps gaming servers and counts one member each.
#[tokio::test]
async fn filters_by_category_with_member_count() {
    let state = seeded().await;
    let request = FilterRequest {
        category: Some("gaming".to_string()),
        with_member_count: true,
        ..FilterRequest::default()
    };

    let servers = list_servers(&state.db, &request, None).await.unwrap();

    assert_eq!(ids(&servers), vec![1, 3]);
    assert_eq!(
        servers.iter().map(|s| s.num_members()).collect::<Vec<_>>(),
        vec![Some(1), Some(1)]
    );
    assert!(servers.iter().all(|s| s.server().category == GAMING));
}

/// Category matching is exact and case-sensitive; a miss is an empty list.
#[tokio::test]
async fn category_match_is_case_sensitive() {
    let state = seeded().await;
    let request = FilterRequest {
        category: Some("Gaming".to_string()),
        ..FilterRequest::default()
    };

    let servers = list_servers(&state.db, &request, None).await.unwrap();
    assert!(servers.is_empty());
}

/// Membership filtering keeps only servers the caller belongs to.
#[tokio::test]
async fn filters_by_current_user() {
    let state = seeded().await;
    let request = FilterRequest {
        by_current_user: true,
        ..FilterRequest::default()
    };
    let bob = as_user(BOB);

    let servers = list_servers(&state.db, &request, Some(&bob)).await.unwrap();
    assert_eq!(ids(&servers), vec![2, 3]);

    let alice = as_user(ALICE);
    let servers = list_servers(&state.db, &request, Some(&alice)).await.unwrap();
    assert_eq!(ids(&servers), vec![1, 2]);
}

/// Member counts reflect the whole member set, not just the caller.
#[tokio::test]
async fn counts_all_members_when_filtering_by_user() {
    let state = seeded().await;
    let request = FilterRequest {
        by_current_user: true,
        with_member_count: true,
        ..FilterRequest::default()
    };
    let bob = as_user(BOB);

    let servers = list_servers(&state.db, &request, Some(&bob)).await.unwrap();

    assert_eq!(
        servers.iter().map(|s| s.num_members()).collect::<Vec<_>>(),
        vec![Some(2), Some(1)]
    );
}

/// A server with no members is counted as zero.
#[tokio::test]
async fn counts_empty_member_set_as_zero() {
    let state = seeded().await;
    insert_server(&state.db, 4, "Ghost Town", GAMING, ALICE).await;
    let request = FilterRequest {
        with_member_count: true,
        ..FilterRequest::default()
    };

    let servers = list_servers(&state.db, &request, None).await.unwrap();

    assert_eq!(servers.last().unwrap().num_members(), Some(0));
}

/// `qty` yields min(N, M) servers from the front of the id order.
#[tokio::test]
async fn truncates_to_first_n() {
    let state = seeded().await;

    for (qty, expected) in [("0", Vec::<i64>::new()), ("2", vec![1, 2]), ("10", vec![1, 2, 3])] {
        let request = FilterRequest {
            limit: Some(qty.to_string()),
            ..FilterRequest::default()
        };
        let servers = list_servers(&state.db, &request, None).await.unwrap();
        assert_eq!(ids(&servers), expected, "qty={}", qty);
    }
}

/// Truncation happens after category filtering.
#[tokio::test]
async fn truncates_the_filtered_set() {
    let state = seeded().await;
    let request = FilterRequest {
        category: Some("gaming".to_string()),
        limit: Some("1".to_string()),
        ..FilterRequest::default()
    };

    let servers = list_servers(&state.db, &request, None).await.unwrap();
    assert_eq!(ids(&servers), vec![1]);
}

/// Looking up an existing id returns just that server.
#[tokio::test]
async fn looks_up_by_server_id() {
    let state = seeded().await;
    let request = FilterRequest {
        server_id: Some("2".to_string()),
        with_member_count: true,
        ..FilterRequest::default()
    };
    let alice = as_user(ALICE);

    let servers = list_servers(&state.db, &request, Some(&alice)).await.unwrap();

    assert_eq!(ids(&servers), vec![2]);
    assert_eq!(servers[0].num_members(), Some(2));
}

/// An unknown id is reported as not found.
#[tokio::test]
async fn unknown_server_id_is_not_found() {
    let state = seeded().await;
    let request = FilterRequest {
        server_id: Some("99".to_string()),
        ..FilterRequest::default()
    };
    let alice = as_user(ALICE);

    match list_servers(&state.db, &request, Some(&alice)).await {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, "Server with id 99 not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

/// Category and id filters combine; an id outside the category is not found.
#[tokio::test]
async fn server_id_combines_with_category() {
    let state = seeded().await;
    let alice = as_user(ALICE);
    let request = FilterRequest {
        category: Some("music".to_string()),
        server_id: Some("1".to_string()),
        ..FilterRequest::default()
    };

    assert!(matches!(
        list_servers(&state.db, &request, Some(&alice)).await,
        Err(AppError::NotFound(_))
    ));
}

/// The id lookup only sees servers that survived truncation.
#[tokio::test]
async fn server_id_applies_after_truncation() {
    let state = seeded().await;
    let alice = as_user(ALICE);

    let beyond = FilterRequest {
        limit: Some("1".to_string()),
        server_id: Some("2".to_string()),
        ..FilterRequest::default()
    };
    assert!(matches!(
        list_servers(&state.db, &beyond, Some(&alice)).await,
        Err(AppError::NotFound(_))
    ));

    let within = FilterRequest {
        limit: Some("2".to_string()),
        server_id: Some("2".to_string()),
        ..FilterRequest::default()
    };
    let servers = list_servers(&state.db, &within, Some(&alice)).await.unwrap();
    assert_eq!(ids(&servers), vec![2]);
}

/// Membership cannot be recorded twice for the same user.
#[tokio::test]
async fn membership_is_a_set() {
    let state = seeded().await;

    assert!(add_member(&state.db, 1, ALICE).await.is_err());
}
