// Listing client tests against mock listing pages

use mockito::Matcher;
use std::time::Duration;
use store_locator::models::CoordinateField;
use store_locator::services::{ListingClient, ListingError};

fn listing_page(current: usize, total: usize, items: &[(&str, &str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(address, latitude, longitude)| {
            format!(
                r#"<div role="listitem" nj-locator-element="list-item" class="w-dyn-item">
                     <p nj-locator-element="address">{address}</p>
                     <p nj-locator-element="latitude">{latitude}</p>
                     <p nj-locator-element="longitude">{longitude}</p>
                   </div>"#
            )
        })
        .collect();

    format!(
        r#"<html><body>
           <div nj-locator-element="list" class="location-list w-dyn-items">{items}</div>
           <div role="navigation" class="w-pagination-wrapper">
             <div class="w-page-count">{current} / {total}</div>
           </div>
           </body></html>"#
    )
}

#[tokio::test]
async fn test_single_page_listing() {
    let mut server = mockito::Server::new_async().await;
    let html = r#"<div nj-locator-element="list">
        <div nj-locator-element="list-item"><p nj-locator-element="address">Storgata 1</p>
        <p nj-locator-element="latitude">59.915</p><p nj-locator-element="longitude">10.755</p></div>
    </div>"#;
    server
        .mock("GET", "/stores")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(html)
        .create_async()
        .await;

    let client = ListingClient::new(format!("{}/stores", server.url()), 2, Duration::from_secs(5)).unwrap();
    let records = client.fetch_all_records().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_deref(), Some("1-0"));
    assert_eq!(records[0].address.as_deref(), Some("Storgata 1"));
}

#[tokio::test]
async fn test_paginated_listing_merges_pages_in_order() {
    let mut server = mockito::Server::new_async().await;

    let first = server
        .mock("GET", "/stores")
        .match_query(Matcher::Exact("lang=nb".into()))
        .with_status(200)
        .with_body(listing_page(1, 3, &[("A", "59.91", "10.75"), ("B", "59.92", "10.76")]))
        .create_async()
        .await;
    let second = server
        .mock("GET", "/stores")
        .match_query(Matcher::Exact("lang=nb&page=2".into()))
        .with_status(200)
        .with_body(listing_page(2, 3, &[("C", "60.39", "5.32")]))
        .create_async()
        .await;
    let third = server
        .mock("GET", "/stores")
        .match_query(Matcher::Exact("lang=nb&page=3".into()))
        .with_status(200)
        .with_body(listing_page(3, 3, &[("D", "", "10.0")]))
        .create_async()
        .await;

    let client = ListingClient::new(format!("{}/stores?lang=nb", server.url()), 2, Duration::from_secs(5)).unwrap();
    let records = client.fetch_all_records().await.unwrap();

    let ids: Vec<_> = records.iter().filter_map(|r| r.id.as_deref()).collect();
    assert_eq!(ids, vec!["1-0", "1-1", "2-0", "3-0"]);
    assert_eq!(records[2].latitude, Some(CoordinateField::Text("60.39".into())));
    // Blank coordinates are left for the ranking pass to report
    assert_eq!(records[3].latitude, None);

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;
}

#[tokio::test]
async fn test_listing_page_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stores")
        .with_status(500)
        .create_async()
        .await;

    let client = ListingClient::new(format!("{}/stores", server.url()), 2, Duration::from_secs(5)).unwrap();
    let result = client.fetch_all_records().await;

    assert!(matches!(result, Err(ListingError::ApiError(_))));
}

#[tokio::test]
async fn test_listing_without_items() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stores")
        .with_status(200)
        .with_body(r#"<div nj-locator-element="list"></div>"#)
        .create_async()
        .await;

    let client = ListingClient::new(format!("{}/stores", server.url()), 2, Duration::from_secs(5)).unwrap();
    let result = client.fetch_all_records().await;

    assert!(matches!(result, Err(ListingError::NoItems(_))));
}

#[tokio::test]
async fn test_listing_page_count_over_limit() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stores")
        .match_query(Matcher::Exact("lang=nb".into()))
        .with_status(200)
        .with_body(listing_page(1, 1_000_000, &[("A", "59.91", "10.75")]))
        .create_async()
        .await;
    let second = server
        .mock("GET", "/stores")
        .match_query(Matcher::Exact("lang=nb&page=2".into()))
        .with_status(200)
        .with_body(listing_page(2, 1_000_000, &[("B", "59.92", "10.76")]))
        .expect(0)
        .create_async()
        .await;

    let client = ListingClient::new(format!("{}/stores?lang=nb", server.url()), 2, Duration::from_secs(5))
        .unwrap()
        .with_max_pages(10);
    let result = client.fetch_all_records().await;

    assert!(matches!(result, Err(ListingError::PageCount(_))));
    second.assert_async().await;
}

#[tokio::test]
async fn test_listing_page_count_within_limit() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stores")
        .match_query(Matcher::Exact("lang=nb".into()))
        .with_status(200)
        .with_body(listing_page(1, 2, &[("A", "59.91", "10.75")]))
        .create_async()
        .await;
    server
        .mock("GET", "/stores")
        .match_query(Matcher::Exact("lang=nb&page=2".into()))
        .with_status(200)
        .with_body(listing_page(2, 2, &[("B", "59.92", "10.76")]))
        .create_async()
        .await;

    let client = ListingClient::new(format!("{}/stores?lang=nb", server.url()), 2, Duration::from_secs(5))
        .unwrap()
        .with_max_pages(2);
    let records = client.fetch_all_records().await.unwrap();

    assert_eq!(records.len(), 2);
}
