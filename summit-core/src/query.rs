//! The per-query summit ranking pipeline.
//!
//! A query runs strictly sequential stages: resolve the start point, apply
//! the elevation/cross filter, optionally keep only summits near an
//! acceptable via ferrata, rank by distance from the start and finally
//! select either the nearest summits or the most isolated of the nearest.
//! Any stage that leaves no candidates ends the query with an empty
//! [`Ranking`].

use geo::Coord;
use log::info;
use rayon::prelude::*;
use thiserror::Error;

use crate::distance::{METRES_PER_KM, distance_m};
use crate::dominance::dominance_m;
use crate::{DatasetStore, ReachabilityFilter, RouteSegmentSource, SegmentVertexIndex, Summit};

/// Number of summits reported when ranking by proximity.
pub const NEAREST_LIMIT: usize = 10;
/// Number of nearest summits re-ranked when dominance is requested.
pub const DOMINANCE_LIMIT: usize = 20;

/// Error raised by an injected collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A resolved starting coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl StartPoint {
    /// Construct a start point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// The start point as a `Coord` (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn location(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Resolves a country and postal code to a [`StartPoint`].
pub trait PostalCodeResolver {
    /// Error raised when the lookup itself fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return the coordinate for `postal_code` in `country`.
    ///
    /// `Ok(None)` means the lookup worked but found nothing.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the lookup data cannot be read.
    fn resolve(&self, country: &str, postal_code: &str) -> Result<Option<StartPoint>, Self::Error>;
}

/// Elevation, cross and ranking options shared by every query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummitFilter {
    /// Minimum elevation in metres, inclusive.
    pub min_elevation: f64,
    /// Keep only summits with a cross.
    pub cross_only: bool,
    /// Rank the nearest summits by dominance instead of distance.
    pub dominance: bool,
}

impl Default for SummitFilter {
    fn default() -> Self {
        Self {
            min_elevation: 0.0,
            cross_only: false,
            dominance: false,
        }
    }
}

impl SummitFilter {
    /// Returns true when `summit` passes the elevation and cross conditions.
    #[must_use]
    pub fn matches(&self, summit: &Summit) -> bool {
        summit.elevation >= self.min_elevation && (!self.cross_only || summit.has_cross)
    }
}

/// Everything a single query needs before the start point is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    /// ISO country code of the start postal code.
    pub country: String,
    /// Postal code of the start.
    pub postal_code: String,
    /// Elevation, cross and ranking options.
    pub filter: SummitFilter,
    /// Via ferrata constraints, present only when reachability was requested.
    pub reachability: Option<ReachabilityFilter>,
}

/// Sort key of a [`Ranking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RankingOrder {
    /// Ascending distance from the start.
    Proximity,
    /// Descending dominance, infinite dominance first.
    Dominance,
}

/// One ranked summit.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult<'a> {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// The ranked summit.
    pub summit: &'a Summit,
    /// Geodesic distance from the start in metres.
    pub distance_m: f64,
    /// Dominance in metres when it was requested; may be infinite.
    pub dominance_m: Option<f64>,
}

impl RankedResult<'_> {
    /// Distance from the start in kilometres.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "unit conversion")]
    pub fn distance_km(&self) -> f64 {
        self.distance_m / METRES_PER_KM
    }

    /// Dominance in kilometres when it was requested.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "unit conversion")]
    pub fn dominance_km(&self) -> Option<f64> {
        self.dominance_m.map(|metres| metres / METRES_PER_KM)
    }
}

/// Candidate counts after each filtering stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageCounts {
    /// Summits passing the elevation/cross filter.
    pub base_filter: usize,
    /// Summits passing the reachability filter, when it ran.
    pub reachable: Option<usize>,
}

/// Outcome of a query: ordered results plus per-stage counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<'a> {
    /// The resolved start point.
    pub start: StartPoint,
    /// How `results` are ordered.
    pub order: RankingOrder,
    /// Candidate counts per stage.
    pub stages: StageCounts,
    /// Ranked summits, possibly empty.
    pub results: Vec<RankedResult<'a>>,
}

impl Ranking<'_> {
    const fn empty(start: StartPoint, order: RankingOrder, stages: StageCounts) -> Self {
        Self {
            start,
            order,
            stages,
            results: Vec::new(),
        }
    }

    /// Returns true when no summit survived the filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Errors returned by [`QueryPipeline`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// The postal code is unknown to the resolver.
    #[error("postal code {postal_code} in {country} was not found")]
    StartNotFound {
        /// Requested country.
        country: String,
        /// Requested postal code.
        postal_code: String,
    },
    /// The resolver failed to look up the postal code.
    #[error("failed to resolve postal code {postal_code} in {country}: {source}")]
    Resolve {
        /// Requested country.
        country: String,
        /// Requested postal code.
        postal_code: String,
        /// Resolver error.
        #[source]
        source: CollaboratorError,
    },
    /// Loading the route segments failed.
    #[error("failed to load via ferrata segments: {source}")]
    LoadSegments {
        /// Segment source error.
        #[source]
        source: CollaboratorError,
    },
}

impl QueryError {
    /// Returns true when only the current query failed and the dataset
    /// remains usable for the next one.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::LoadSegments { .. })
    }
}

/// Runs queries against a [`DatasetStore`].
///
/// # Examples
/// ```
/// use std::convert::Infallible;
/// use geo::Coord;
/// use summit_core::{
///     DatasetStore, QueryPipeline, RouteSegment, RouteSegmentSource, StartPoint, Summit,
///     SummitFilter,
/// };
///
/// struct NoSegments;
///
/// impl RouteSegmentSource for NoSegments {
///     type Error = Infallible;
///
///     fn load_route_segments(&self) -> Result<Vec<RouteSegment>, Infallible> {
///         Ok(Vec::new())
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let summits = vec![
///     Summit::new(1, Coord { x: 11.0, y: 47.0 }, 2000.0)?,
///     Summit::new(2, Coord { x: 12.0, y: 47.0 }, 2500.0)?,
/// ];
/// let store = DatasetStore::new(summits, NoSegments);
/// let pipeline = QueryPipeline::new(&store);
/// let ranking = pipeline.rank(StartPoint::new(47.0, 11.9), &SummitFilter::default(), None)?;
/// assert_eq!(ranking.results[0].summit.id, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QueryPipeline<'a, S> {
    store: &'a DatasetStore<S>,
}

impl<'a, S: RouteSegmentSource> QueryPipeline<'a, S> {
    /// Create a pipeline over `store`.
    #[must_use]
    pub const fn new(store: &'a DatasetStore<S>) -> Self {
        Self { store }
    }

    /// Resolve the start point through `resolver`, then [`Self::rank`].
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StartNotFound`] or [`QueryError::Resolve`] when
    /// the start cannot be resolved and [`QueryError::LoadSegments`] when the
    /// segment source fails.
    pub fn execute<R>(
        &self,
        params: &QueryParameters,
        resolver: &R,
    ) -> Result<Ranking<'a>, QueryError>
    where
        R: PostalCodeResolver + ?Sized,
    {
        let start = resolve_start(resolver, &params.country, &params.postal_code)?;
        info!("Start coordinates: {:.5}, {:.5}", start.lat, start.lon);
        self.rank(start, &params.filter, params.reachability.as_ref())
    }

    /// Filter and rank the dataset's summits relative to `start`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::LoadSegments`] when reachability is requested
    /// and the segments cannot be loaded.
    pub fn rank(
        &self,
        start: StartPoint,
        filter: &SummitFilter,
        reachability: Option<&ReachabilityFilter>,
    ) -> Result<Ranking<'a>, QueryError> {
        let all = self.store.summits();
        let order = if filter.dominance {
            RankingOrder::Dominance
        } else {
            RankingOrder::Proximity
        };

        let mut candidates = base_filter(all, filter);
        let mut stages = StageCounts {
            base_filter: candidates.len(),
            reachable: None,
        };
        info!(
            "Elevation/cross filter kept {} of {} summits",
            candidates.len(),
            all.len()
        );
        if candidates.is_empty() {
            return Ok(Ranking::empty(start, order, stages));
        }

        if let Some(constraints) = reachability {
            let segments = self.store.route_segments().map_err(segment_load_error)?;
            let before = candidates.len();
            candidates = filter_reachable(candidates, segments.index(), constraints);
            stages.reachable = Some(candidates.len());
            info!(
                "Via ferrata filter kept {} of {before} summits",
                candidates.len()
            );
            if candidates.is_empty() {
                return Ok(Ranking::empty(start, order, stages));
            }
        }

        let by_distance = rank_by_proximity(start.location(), candidates);
        let results = match order {
            RankingOrder::Proximity => select_nearest(by_distance),
            RankingOrder::Dominance => select_most_isolated(by_distance, all),
        };
        Ok(Ranking {
            start,
            order,
            stages,
            results,
        })
    }
}

fn resolve_start<R>(
    resolver: &R,
    country: &str,
    postal_code: &str,
) -> Result<StartPoint, QueryError>
where
    R: PostalCodeResolver + ?Sized,
{
    match resolver.resolve(country, postal_code) {
        Ok(Some(start)) => Ok(start),
        Ok(None) => Err(QueryError::StartNotFound {
            country: country.to_owned(),
            postal_code: postal_code.to_owned(),
        }),
        Err(source) => Err(QueryError::Resolve {
            country: country.to_owned(),
            postal_code: postal_code.to_owned(),
            source: Box::new(source),
        }),
    }
}

fn segment_load_error<E>(source: E) -> QueryError
where
    E: std::error::Error + Send + Sync + 'static,
{
    QueryError::LoadSegments {
        source: Box::new(source),
    }
}

/// Summits passing `filter`, in dataset order.
#[must_use]
pub fn base_filter<'s>(summits: &'s [Summit], filter: &SummitFilter) -> Vec<&'s Summit> {
    summits
        .iter()
        .filter(|summit| filter.matches(summit))
        .collect()
}

/// Candidates reachable under `filter`, evaluated in parallel.
///
/// The output keeps the input order and is always a subset of it.
#[must_use]
pub fn filter_reachable<'s>(
    candidates: Vec<&'s Summit>,
    index: &SegmentVertexIndex,
    filter: &ReachabilityFilter,
) -> Vec<&'s Summit> {
    candidates
        .into_par_iter()
        .filter(|summit| index.is_reachable(summit, filter))
        .collect()
}

/// Pair each candidate with its distance from `start` and sort ascending.
///
/// The sort is stable, so equidistant summits keep their input order.
#[must_use]
pub fn rank_by_proximity(start: Coord<f64>, candidates: Vec<&Summit>) -> Vec<(&Summit, f64)> {
    let mut ranked: Vec<(&Summit, f64)> = candidates
        .into_par_iter()
        .map(|summit| (summit, distance_m(start, summit.location)))
        .collect();
    ranked.sort_by(|(_, lhs), (_, rhs)| lhs.total_cmp(rhs));
    ranked
}

fn select_nearest<'s>(by_distance: Vec<(&'s Summit, f64)>) -> Vec<RankedResult<'s>> {
    by_distance
        .into_iter()
        .take(NEAREST_LIMIT)
        .enumerate()
        .map(|(index, (summit, distance_m))| RankedResult {
            rank: index + 1,
            summit,
            distance_m,
            dominance_m: None,
        })
        .collect()
}

fn select_most_isolated<'s>(
    by_distance: Vec<(&'s Summit, f64)>,
    all: &[Summit],
) -> Vec<RankedResult<'s>> {
    let nearest: Vec<(&Summit, f64)> = by_distance.into_iter().take(DOMINANCE_LIMIT).collect();
    let mut isolated: Vec<(&Summit, f64, f64)> = nearest
        .into_par_iter()
        .map(|(summit, distance_m)| (summit, distance_m, dominance_m(summit, all)))
        .collect();
    isolated.sort_by(|(_, _, lhs), (_, _, rhs)| rhs.total_cmp(lhs));
    isolated
        .into_iter()
        .enumerate()
        .map(|(index, (summit, distance_m, dominance))| RankedResult {
            rank: index + 1,
            summit,
            distance_m,
            dominance_m: Some(dominance),
        })
        .collect()
}
