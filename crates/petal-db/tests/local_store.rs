//! Integration tests for the SQLite-backed store: round trips, public-only
//! listing, newest-first pagination, and file-backed reopen.

use chrono::{Duration, Timelike, Utc};

use petal_db::{BouquetStore, ListOptions, LocalStore, StoreError};
use petal_types::catalog;
use petal_types::{BouquetId, Cursor, DeliveryType, NewBouquet, PageOrdering};

fn bouquet(delivery_type: DeliveryType, message: &str) -> NewBouquet {
    NewBouquet {
        flower: catalog::lookup_by_slug("lavender").unwrap().clone(),
        recipient_name: "Mira".into(),
        message: Some(message.into()),
        delivery_type,
        delivery_date: None,
    }
}

#[tokio::test]
async fn get_returns_what_create_stored() {
    let store = LocalStore::in_memory().unwrap();
    let data = NewBouquet {
        delivery_date: (Utc::now() + Duration::days(3)).with_nanosecond(123_456_789),
        ..bouquet(DeliveryType::Timed, "Open me on your birthday")
    };

    let before = Utc::now() - Duration::seconds(1);
    let id = store.create(data.clone()).await.unwrap();
    let stored = store.get(&id).await.unwrap().expect("bouquet exists");

    assert_eq!(stored.id, id);
    assert_eq!(stored.flower, data.flower);
    assert_eq!(stored.recipient_name, data.recipient_name);
    assert_eq!(stored.message, data.message);
    assert_eq!(stored.delivery_type, data.delivery_type);
    assert_eq!(stored.delivery_date, data.delivery_date);
    assert!(stored.created_at >= before);
}

#[tokio::test]
async fn optional_fields_round_trip_empty() {
    let store = LocalStore::in_memory().unwrap();
    let data = NewBouquet {
        recipient_name: String::new(),
        message: None,
        ..bouquet(DeliveryType::Private, "")
    };

    let id = store.create(data).await.unwrap();
    let stored = store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.recipient_name, "");
    assert_eq!(stored.message, None);
}

#[tokio::test]
async fn unknown_id_is_not_found_not_error() {
    let store = LocalStore::in_memory().unwrap();
    let found = store.get(&BouquetId::new("does-not-exist")).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let store = LocalStore::in_memory().unwrap();
    let id = store.create(bouquet(DeliveryType::Public, "Same every time")).await.unwrap();

    let first = store.get(&id).await.unwrap();
    let second = store.get(&id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn newest_public_bouquet_comes_first() {
    let store = LocalStore::in_memory().unwrap();
    store.create(bouquet(DeliveryType::Public, "An older note")).await.unwrap();
    let id = store.create(bouquet(DeliveryType::Public, "Thinking of you")).await.unwrap();

    let page = store.list_public(ListOptions::first(1)).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, id);
    assert_eq!(page.items[0].message.as_deref(), Some("Thinking of you"));
    assert_eq!(page.ordering, PageOrdering::Global);
}

#[tokio::test]
async fn private_and_timed_never_listed() {
    let store = LocalStore::in_memory().unwrap();
    let mut hidden = Vec::new();
    for i in 0..7 {
        store.create(bouquet(DeliveryType::Public, &format!("public {}", i))).await.unwrap();
        hidden.push(store.create(bouquet(DeliveryType::Private, "just for you")).await.unwrap());
    }
    hidden.push(
        store
            .create(NewBouquet {
                delivery_date: Some(Utc::now() + Duration::days(1)),
                ..bouquet(DeliveryType::Timed, "tomorrow")
            })
            .await
            .unwrap(),
    );

    for count in [1, 2, 3, 10] {
        let mut cursor: Option<Cursor> = None;
        let mut seen = 0;
        loop {
            let page = store
                .list_public(ListOptions { count: Some(count), cursor: cursor.clone() })
                .await
                .unwrap();
            assert!(page.items.len() <= count as usize);
            for item in &page.items {
                assert_eq!(item.delivery_type, DeliveryType::Public);
                assert!(!hidden.contains(&item.id));
            }
            seen += page.items.len();
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(seen, 7, "page size {}", count);
    }
}

#[tokio::test]
async fn pages_walk_newest_to_oldest_without_overlap() {
    let store = LocalStore::in_memory().unwrap();
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(store.create(bouquet(DeliveryType::Public, &format!("note {}", i))).await.unwrap());
    }
    ids.reverse();

    let first = store.list_public(ListOptions::first(2)).await.unwrap();
    let second = store
        .list_public(ListOptions::after(2, first.next_cursor.clone().unwrap()))
        .await
        .unwrap();
    let third = store
        .list_public(ListOptions::after(2, second.next_cursor.clone().unwrap()))
        .await
        .unwrap();

    let walked: Vec<_> = first
        .items
        .iter()
        .chain(&second.items)
        .chain(&third.items)
        .map(|b| b.id.clone())
        .collect();
    assert_eq!(walked, ids);
    // Short final page ends the feed
    assert_eq!(third.items.len(), 1);
    assert!(third.next_cursor.is_none());

    let created: Vec<_> = first.items.iter().chain(&second.items).map(|b| b.created_at).collect();
    assert!(created.windows(2).all(|w| w[0] > w[1]));
}

#[tokio::test]
async fn default_page_size_is_ten() {
    let store = LocalStore::in_memory().unwrap();
    for i in 0..12 {
        store.create(bouquet(DeliveryType::Public, &format!("note {}", i))).await.unwrap();
    }

    let page = store.list_public(ListOptions::default()).await.unwrap();
    assert_eq!(page.items.len(), 10);
    assert!(page.next_cursor.is_some());
}

#[tokio::test]
async fn zero_count_returns_empty_page() {
    let store = LocalStore::in_memory().unwrap();
    store.create(bouquet(DeliveryType::Public, "hi")).await.unwrap();

    let page = store.list_public(ListOptions::first(0)).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
    let store = LocalStore::in_memory().unwrap();
    let result = store
        .list_public(ListOptions::after(3, Cursor::new("%%%")))
        .await;
    assert!(matches!(result, Err(StoreError::InvalidCursor)));
}

#[tokio::test]
async fn malformed_cursor_is_rejected_even_for_empty_page() {
    let store = LocalStore::in_memory().unwrap();
    let result = store
        .list_public(ListOptions::after(0, Cursor::new("%%%")))
        .await;
    assert!(matches!(result, Err(StoreError::InvalidCursor)));
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("petal.db");

    let id = {
        let store = LocalStore::open(&path).unwrap();
        store.create(bouquet(DeliveryType::Public, "Still here")).await.unwrap()
    };

    let store = LocalStore::open(&path).unwrap();
    let stored = store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.message.as_deref(), Some("Still here"));

    let later = store.create(bouquet(DeliveryType::Public, "Newer")).await.unwrap();
    let page = store.list_public(ListOptions::first(2)).await.unwrap();
    assert_eq!(page.items[0].id, later);
    assert!(page.items[0].created_at > page.items[1].created_at);
}
