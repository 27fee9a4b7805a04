// Unit tests for Store Locator

use store_locator::core::{
    distance::{compute_distance, format_distance, haversine_distance},
    ranking::{rank_by_distance, rank_with_options, RankOptions},
};
use store_locator::models::{GeoCoordinate, LocationRecord, SkipReason};

fn sample_points() -> Vec<GeoCoordinate> {
    vec![
        GeoCoordinate::new(59.9139, 10.7522),   // Oslo
        GeoCoordinate::new(60.3913, 5.3221),    // Bergen
        GeoCoordinate::new(63.4305, 10.3951),   // Trondheim
        GeoCoordinate::new(0.0, 0.0),
        GeoCoordinate::new(-33.8688, 151.2093), // Sydney
        GeoCoordinate::new(40.7128, -74.0060),  // New York
        GeoCoordinate::new(89.9, 179.9),
        GeoCoordinate::new(-89.9, -179.9),
    ]
}

#[test]
fn test_distance_to_self_is_zero() {
    for point in sample_points() {
        assert!(compute_distance(point, point).abs() < 1e-9, "{:?}", point);
    }
}

#[test]
fn test_distance_is_symmetric() {
    let points = sample_points();
    for a in &points {
        for b in &points {
            let ab = compute_distance(*a, *b);
            let ba = compute_distance(*b, *a);
            assert!((ab - ba).abs() < 1e-9, "{:?} {:?}: {} vs {}", a, b, ab, ba);
        }
    }
}

#[test]
fn test_triangle_inequality() {
    let points = sample_points();
    for a in &points {
        for b in &points {
            for c in &points {
                let direct = compute_distance(*a, *c);
                let via = compute_distance(*a, *b) + compute_distance(*b, *c);
                assert!(direct <= via + 1e-6, "{:?} -> {:?} -> {:?}", a, b, c);
            }
        }
    }
}

#[test]
fn test_oslo_city_center_fixtures() {
    let center = GeoCoordinate::new(59.9139, 10.7522);
    let nearby = GeoCoordinate::new(59.9207, 10.7274);
    let distance = compute_distance(center, nearby);
    assert!(distance > 1.4 && distance < 2.1, "got {}", distance);

    let distance = haversine_distance(59.9087433, 10.7546471, 59.9206802, 10.7273792);
    assert!(distance > 1.9 && distance < 2.1, "got {}", distance);
}

#[test]
fn test_antipodal_distance_is_half_circumference() {
    let distance = haversine_distance(0.0, 0.0, 0.0, 180.0);
    assert!((distance - std::f64::consts::PI * 6371.0).abs() < 1e-6);
}

#[test]
fn test_ranking_is_non_decreasing() {
    let records: Vec<LocationRecord> = sample_points()
        .into_iter()
        .enumerate()
        .map(|(i, p)| LocationRecord::new(i.to_string(), p.latitude, p.longitude))
        .collect();

    let ranking = rank_by_distance(GeoCoordinate::new(48.8566, 2.3522), records);

    assert_eq!(ranking.ranked.len(), 8);
    for pair in ranking.ranked.windows(2) {
        assert!(pair[0].distance_km <= pair[1].distance_km);
    }
}

#[test]
fn test_ranking_reports_missing_without_failing() {
    let mut missing = LocationRecord::new("missing", 59.92, 10.76);
    missing.latitude = None;

    let records = vec![
        missing,
        LocationRecord::new("kept", "59.92", "10.76").with_address("Storgata 1"),
    ];

    let ranking = rank_by_distance(GeoCoordinate::new(59.9139, 10.7522), records);

    assert_eq!(ranking.ranked.len(), 1);
    assert_eq!(ranking.ranked[0].record.address.as_deref(), Some("Storgata 1"));
    assert_eq!(ranking.skipped.len(), 1);
    assert_eq!(ranking.skipped[0].index, 0);
    assert_eq!(ranking.skipped[0].reason, SkipReason::MissingCoordinate);
}

#[test]
fn test_ranking_bare_coordinates() {
    let reference = GeoCoordinate::new(59.9139, 10.7522);
    let points = vec![
        GeoCoordinate::new(60.3913, 5.3221),
        GeoCoordinate::new(59.92, 10.76),
    ];

    let ranking = rank_by_distance(reference, points);

    assert_eq!(ranking.ranked[0].record, GeoCoordinate::new(59.92, 10.76));
    assert_eq!(format_distance(ranking.ranked[0].distance_km), "0.81 km");
}

#[test]
fn test_radius_keeps_everything_inside() {
    let options = RankOptions {
        max_distance_km: Some(1000.0),
        ..RankOptions::default()
    };

    let ranking = rank_with_options(GeoCoordinate::new(59.9139, 10.7522), sample_points(), &options).unwrap();

    // Oslo, Bergen and Trondheim
    assert_eq!(ranking.ranked.len(), 3);
    assert_eq!(ranking.total_records, 8);
}
