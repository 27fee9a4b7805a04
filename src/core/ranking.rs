use std::cmp::Ordering;

use crate::core::distance::{compute_distance, CoordinateError};
use crate::models::{GeoCoordinate, LocationRecord, SkipReason, SkippedRecord};

/// Anything the ranking engine can place on the map
pub trait Locatable {
    /// Resolve the record's coordinate, or explain why it has none
    fn coordinate(&self) -> Result<GeoCoordinate, SkipReason>;

    /// Identifier reported when the record is skipped
    fn record_id(&self) -> Option<&str> {
        None
    }
}

impl Locatable for GeoCoordinate {
    fn coordinate(&self) -> Result<GeoCoordinate, SkipReason> {
        Ok(*self)
    }
}

impl Locatable for LocationRecord {
    fn coordinate(&self) -> Result<GeoCoordinate, SkipReason> {
        let latitude = self
            .latitude
            .as_ref()
            .ok_or(SkipReason::MissingCoordinate)?
            .degrees()?;
        let longitude = self
            .longitude
            .as_ref()
            .ok_or(SkipReason::MissingCoordinate)?
            .degrees()?;

        Ok(GeoCoordinate::new(latitude, longitude))
    }

    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// A record paired with its distance from the reference point
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord<T> {
    pub record: T,
    pub coordinate: GeoCoordinate,
    pub distance_km: f64,
}

/// Result of a ranking pass
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<T> {
    /// Records in non-decreasing distance order, non-finite distances last
    pub ranked: Vec<RankedRecord<T>>,
    pub skipped: Vec<SkippedRecord>,
    /// How many ranked entries carry a NaN or infinite distance
    pub non_finite: usize,
    pub total_records: usize,
}

/// Per-call ranking knobs
#[derive(Debug, Clone, Copy, Default)]
pub struct RankOptions {
    /// Reject coordinates outside ±90/±180 instead of ranking them
    pub strict: bool,
    pub max_distance_km: Option<f64>,
    pub limit: Option<usize>,
}

/// Rank records by great-circle distance from `reference`
///
/// Records without a usable coordinate are reported in `skipped` rather
/// than failing the pass. Equal distances keep their input order.
pub fn rank_by_distance<T, I>(reference: GeoCoordinate, records: I) -> Ranking<T>
where
    T: Locatable,
    I: IntoIterator<Item = T>,
{
    rank_records(reference, records, false)
}

/// Rank records with strict validation, a radius and a result limit
///
/// # Errors
/// Returns [`CoordinateError`] when `options.strict` is set and the
/// reference point itself is out of range.
pub fn rank_with_options<T, I>(
    reference: GeoCoordinate,
    records: I,
    options: &RankOptions,
) -> Result<Ranking<T>, CoordinateError>
where
    T: Locatable,
    I: IntoIterator<Item = T>,
{
    if options.strict {
        reference.validate()?;
    }

    let mut ranking = rank_records(reference, records, options.strict);

    if let Some(max_distance_km) = options.max_distance_km {
        ranking
            .ranked
            .retain(|entry| entry.distance_km <= max_distance_km || entry.distance_km.is_nan());
    }

    if let Some(limit) = options.limit {
        ranking.ranked.truncate(limit);
    }

    ranking.non_finite = count_non_finite(&ranking.ranked);

    Ok(ranking)
}

fn rank_records<T, I>(reference: GeoCoordinate, records: I, strict: bool) -> Ranking<T>
where
    T: Locatable,
    I: IntoIterator<Item = T>,
{
    let mut ranked = Vec::new();
    let mut skipped = Vec::new();
    let mut total_records = 0;

    for (index, record) in records.into_iter().enumerate() {
        total_records += 1;

        let coordinate = match record.coordinate() {
            Ok(coordinate) => coordinate,
            Err(reason) => {
                skipped.push(skip(index, &record, reason));
                continue;
            }
        };

        if strict && matches!(coordinate.validate(), Err(CoordinateError::InvalidCoordinate { .. })) {
            skipped.push(skip(index, &record, SkipReason::OutOfRange));
            continue;
        }

        let distance_km = compute_distance(reference, coordinate);
        ranked.push(RankedRecord {
            record,
            coordinate,
            distance_km,
        });
    }

    // Vec::sort_by is stable, so ties keep their input order
    ranked.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));

    let non_finite = count_non_finite(&ranked);
    if non_finite > 0 {
        tracing::warn!(
            "{} of {} ranked records have a non-finite distance from ({}, {})",
            non_finite,
            ranked.len(),
            reference.latitude,
            reference.longitude
        );
    }

    if !skipped.is_empty() {
        tracing::debug!("Skipped {} of {} records without a usable coordinate", skipped.len(), total_records);
    }

    Ranking {
        ranked,
        skipped,
        non_finite,
        total_records,
    }
}

fn skip<T: Locatable>(index: usize, record: &T, reason: SkipReason) -> SkippedRecord {
    tracing::warn!("Skipping record {} ({:?}): {}", index, record.record_id(), reason);
    SkippedRecord {
        index,
        id: record.record_id().map(str::to_string),
        reason,
    }
}

/// Ascending by distance with NaN after everything else
fn compare_distance(a: f64, b: f64) -> Ordering {
    a.is_nan()
        .cmp(&b.is_nan())
        .then_with(|| a.partial_cmp(&b).unwrap_or(Ordering::Equal))
}

fn count_non_finite<T>(ranked: &[RankedRecord<T>]) -> usize {
    ranked.iter().filter(|entry| !entry.distance_km.is_finite()).count()
}

/// Ranking defaults taken from configuration
#[derive(Debug, Clone)]
pub struct Ranker {
    strict: bool,
    default_limit: Option<usize>,
    max_limit: usize,
}

impl Ranker {
    pub fn new(strict: bool, default_limit: Option<usize>, max_limit: usize) -> Self {
        Self {
            strict,
            default_limit,
            max_limit,
        }
    }

    /// Rank records, applying the configured strictness and limit caps
    ///
    /// A requested `limit` overrides the default and is capped at the
    /// configured maximum.
    pub fn rank<T, I>(
        &self,
        reference: GeoCoordinate,
        records: I,
        limit: Option<usize>,
        max_distance_km: Option<f64>,
    ) -> Result<Ranking<T>, CoordinateError>
    where
        T: Locatable,
        I: IntoIterator<Item = T>,
    {
        let limit = limit
            .or(self.default_limit)
            .map(|limit| limit.min(self.max_limit));

        let options = RankOptions {
            strict: self.strict,
            max_distance_km,
            limit,
        };

        rank_with_options(reference, records, &options)
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(false, None, 500)
    }
}
