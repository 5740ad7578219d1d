//! Accumulates via ferrata ways and resolves their node references.
//!
//! Ways reference nodes that may sit in any block of the file. The parallel
//! scan therefore only collects the via ferrata ways and the node ids they
//! need; a second sequential scan looks up those coordinates.

use std::collections::{HashMap, HashSet};

use geo::Coord;
use osmpbf::Element;
use summit_core::RouteSegment;

use super::ids::{OsmElementKind, encode_element_id};
use super::tags::{is_via_ferrata, via_ferrata_scale};
use super::{OsmScanSummary, RouteSegmentReport, validated_coord};

/// Per-block state of the parallel way scan.
#[derive(Debug, Default)]
pub(super) struct SegmentAccumulator {
    summary: OsmScanSummary,
    pending_way_nodes: HashSet<u64>,
    candidates: Vec<WayCandidate>,
}

#[derive(Debug)]
struct WayCandidate {
    id: u64,
    node_refs: Vec<u64>,
    difficulty: Option<i32>,
}

impl SegmentAccumulator {
    pub(super) fn process_element(&mut self, element: Element<'_>) {
        match element {
            Element::Node(_) | Element::DenseNode(_) => self.summary.record_node(),
            Element::Way(way) => self.process_way(&way),
            Element::Relation(_) => {}
        }
    }

    fn process_way(&mut self, way: &osmpbf::Way<'_>) {
        self.summary.record_way();
        if !is_via_ferrata(way.tags()) {
            return;
        }
        let Some(id) = encode_element_id(OsmElementKind::Way, way.id()) else {
            return;
        };
        let node_refs: Vec<u64> = way
            .refs()
            .filter_map(|node_id| encode_element_id(OsmElementKind::Node, node_id))
            .collect();
        self.pending_way_nodes.extend(node_refs.iter().copied());
        self.candidates.push(WayCandidate {
            id,
            node_refs,
            difficulty: via_ferrata_scale(way.tags()),
        });
    }

    pub(super) fn combine(mut self, other: Self) -> Self {
        self.summary = self.summary.combine(other.summary);
        self.candidates.extend(other.candidates);
        self.pending_way_nodes.extend(other.pending_way_nodes);
        self
    }

    /// Hand the collected ways over to the sequential coordinate pass.
    pub(super) fn into_node_resolver(self) -> NodeResolver {
        NodeResolver {
            summary: self.summary,
            candidates: self.candidates,
            pending: self.pending_way_nodes,
            nodes: HashMap::new(),
        }
    }
}

/// Sequential pass that looks up coordinates for referenced nodes.
#[derive(Debug)]
pub(super) struct NodeResolver {
    summary: OsmScanSummary,
    candidates: Vec<WayCandidate>,
    pending: HashSet<u64>,
    nodes: HashMap<u64, Coord<f64>>,
}

impl NodeResolver {
    pub(super) fn has_pending_nodes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(super) fn pending_node_count(&self) -> usize {
        self.pending.len()
    }

    pub(super) fn resolve(&mut self, raw_id: i64, lon: f64, lat: f64) {
        let Some(id) = encode_element_id(OsmElementKind::Node, raw_id) else {
            return;
        };
        if !self.pending.remove(&id) {
            return;
        }
        if let Some(location) = validated_coord(lon, lat) {
            self.nodes.insert(id, location);
        }
    }

    pub(super) fn into_report(self) -> RouteSegmentReport {
        let mut segments = Vec::with_capacity(self.candidates.len());
        let mut dropped_ways = 0_u64;
        for candidate in self.candidates {
            let points: Vec<Coord<f64>> = candidate
                .node_refs
                .iter()
                .filter_map(|node_id| self.nodes.get(node_id).copied())
                .collect();
            match RouteSegment::new(candidate.id, points, candidate.difficulty) {
                Ok(segment) => segments.push(segment),
                Err(_) => dropped_ways += 1,
            }
        }
        segments.sort_by_key(|segment| segment.id);
        RouteSegmentReport {
            summary: self.summary,
            segments,
            dropped_ways,
            unresolved_nodes: self.pending.len(),
        }
    }
}
