//! The once-loaded dataset shared by every query.
//!
//! Summits are loaded eagerly when the [`DatasetStore`] is built and never
//! change afterwards. Route segments are expensive to extract and only needed
//! by reachability queries, so they sit behind a [`SegmentCache`] that reads
//! its source at most once.

use log::info;
use once_cell::sync::OnceCell;

use crate::{RouteSegment, SegmentVertexIndex, Summit};

/// Yields the summit collection from a map extract.
pub trait SummitSource {
    /// Error raised when the source cannot be read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every valid summit.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the source cannot be opened or decoded.
    fn load_summits(&self) -> Result<Vec<Summit>, Self::Error>;
}

/// Yields the via ferrata segments from a map extract.
pub trait RouteSegmentSource {
    /// Error raised when the source cannot be read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every route segment with at least one resolved vertex.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the source cannot be opened or decoded.
    fn load_route_segments(&self) -> Result<Vec<RouteSegment>, Self::Error>;
}

impl<T: RouteSegmentSource + ?Sized> RouteSegmentSource for &T {
    type Error = T::Error;

    fn load_route_segments(&self) -> Result<Vec<RouteSegment>, Self::Error> {
        (**self).load_route_segments()
    }
}

/// Loaded route segments together with their vertex index.
#[derive(Debug)]
pub struct SegmentSet {
    segments: Vec<RouteSegment>,
    index: SegmentVertexIndex,
}

impl SegmentSet {
    /// Index `segments` for proximity lookups.
    #[must_use]
    pub fn new(segments: Vec<RouteSegment>) -> Self {
        let index = SegmentVertexIndex::build(&segments);
        Self { segments, index }
    }

    /// The loaded segments in source order.
    #[must_use]
    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    /// The vertex index built over [`Self::segments`].
    #[must_use]
    pub const fn index(&self) -> &SegmentVertexIndex {
        &self.index
    }
}

/// Lazily loaded, initialise-once route-segment collection.
///
/// Concurrent callers of [`SegmentCache::get_or_load`] observe a single call
/// to the underlying source; every later call returns the cached set. A
/// failed load leaves the cache empty so the next caller retries.
///
/// # Examples
/// ```
/// use std::convert::Infallible;
/// use summit_core::{RouteSegment, RouteSegmentSource, SegmentCache};
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
/// let cache = SegmentCache::new(NoSegments);
/// assert!(!cache.is_loaded());
/// let loaded = cache.get_or_load()?;
/// assert!(loaded.segments().is_empty());
/// assert!(cache.is_loaded());
/// # Ok::<(), Infallible>(())
/// ```
#[derive(Debug)]
pub struct SegmentCache<S> {
    source: S,
    loaded: OnceCell<SegmentSet>,
}

impl<S: RouteSegmentSource> SegmentCache<S> {
    /// Wrap `source` without reading it.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            loaded: OnceCell::new(),
        }
    }

    /// Return the cached segments, loading them on first use.
    ///
    /// # Errors
    ///
    /// Propagates the source error when the first load fails.
    pub fn get_or_load(&self) -> Result<&SegmentSet, S::Error> {
        self.loaded.get_or_try_init(|| {
            let segments = self.source.load_route_segments()?;
            info!("Cached {} via ferrata segments", segments.len());
            Ok(SegmentSet::new(segments))
        })
    }

    /// Return the segments when they have already been loaded.
    #[must_use]
    pub fn get(&self) -> Option<&SegmentSet> {
        self.loaded.get()
    }

    /// Returns true once a load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }
}

/// Immutable summits plus the lazily loaded route segments.
#[derive(Debug)]
pub struct DatasetStore<S> {
    summits: Vec<Summit>,
    segments: SegmentCache<S>,
}

impl<S: RouteSegmentSource> DatasetStore<S> {
    /// Build a store from already loaded summits.
    #[must_use]
    pub const fn new(summits: Vec<Summit>, segment_source: S) -> Self {
        Self {
            summits,
            segments: SegmentCache::new(segment_source),
        }
    }

    /// Load summits from `summit_source` and defer segments to `segment_source`.
    ///
    /// # Errors
    ///
    /// Returns the summit source error; without summits there is nothing to
    /// query.
    pub fn load<L>(summit_source: &L, segment_source: S) -> Result<Self, L::Error>
    where
        L: SummitSource + ?Sized,
    {
        let summits = summit_source.load_summits()?;
        info!("Dataset holds {} summits", summits.len());
        Ok(Self::new(summits, segment_source))
    }

    /// Every summit in the dataset, in source order.
    #[must_use]
    pub fn summits(&self) -> &[Summit] {
        &self.summits
    }

    /// Route segments, loaded on first use and cached afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the segment source error when the first load fails.
    pub fn route_segments(&self) -> Result<&SegmentSet, S::Error> {
        self.segments.get_or_load()
    }

    /// Load route segments now instead of on the first reachability query.
    ///
    /// Returns the number of cached segments.
    ///
    /// # Errors
    ///
    /// Propagates the segment source error.
    pub fn preload_route_segments(&self) -> Result<usize, S::Error> {
        self.route_segments().map(|set| set.segments().len())
    }

    /// Returns true once route segments have been loaded.
    #[must_use]
    pub fn route_segments_loaded(&self) -> bool {
        self.segments.is_loaded()
    }
}
