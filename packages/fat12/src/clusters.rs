use alloc::{string::String, vec::Vec};
use core::ops::RangeInclusive;

use crate::{error::Fat12Error, geometry::Geometry, table::FAT12_EOC};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterRange {
    pub low: u16,
    pub high: u16,
}

impl ClusterRange {
    pub fn count(&self) -> usize {
        (self.high - self.low) as usize + 1
    }

    pub fn clusters(&self) -> RangeInclusive<u16> {
        self.low..=self.high
    }
}

fn range_error(raw: &str, reason: &'static str) -> Fat12Error {
    Fat12Error::InvalidClusterRange {
        range: String::from(raw),
        reason,
    }
}

/// Parses one `low-high` pair and checks it against the data-cluster bounds.
pub fn parse_range(raw: &str, geometry: &Geometry) -> Result<ClusterRange, Fat12Error> {
    let (low, high) = raw
        .split_once('-')
        .ok_or_else(|| range_error(raw, "expected `low-high`"))?;
    let low = low
        .parse::<u32>()
        .map_err(|_| range_error(raw, "low bound is not an integer"))?;
    let high = high
        .parse::<u32>()
        .map_err(|_| range_error(raw, "high bound is not an integer"))?;

    if low < geometry.low_data_cluster() {
        return Err(range_error(raw, "low bound is below the data area"));
    }
    if high > geometry.high_data_cluster() {
        return Err(range_error(raw, "high bound is past the data area"));
    }
    if low > high {
        return Err(range_error(raw, "low bound is greater than high bound"));
    }

    if high >= FAT12_EOC as u32 {
        return Err(range_error(raw, "high bound does not fit a FAT12 entry"));
    }

    Ok(ClusterRange {
        low: low as u16,
        high: high as u16,
    })
}

/// Parses a comma-separated list such as `"33-143, 1300-1704"`.
///
/// All-or-nothing: one bad range rejects the whole list. Ranges that share a cluster
/// are rejected too, since the chain would loop back on itself.
pub fn parse_ranges(raw: &str, geometry: &Geometry) -> Result<Vec<ClusterRange>, Fat12Error> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(range_error(raw, "no cluster ranges given"));
    }

    let ranges = compact
        .split(',')
        .map(|part| parse_range(part, geometry))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sorted = ranges.clone();
    sorted.sort_unstable_by_key(|range| range.low);
    if sorted.windows(2).any(|pair| pair[1].low <= pair[0].high) {
        return Err(range_error(raw, "ranges overlap"));
    }

    Ok(ranges)
}

pub fn cluster_count(ranges: &[ClusterRange]) -> usize {
    ranges.iter().map(ClusterRange::count).sum()
}

/// Clusters in on-disk traversal order: each range ascending, ranges in input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterChain {
    clusters: Vec<u16>,
}

impl ClusterChain {
    pub fn build(ranges: &[ClusterRange]) -> Self {
        let mut clusters = Vec::with_capacity(cluster_count(ranges));
        for range in ranges {
            clusters.extend(range.clusters());
        }
        Self { clusters }
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.clusters
    }

    pub fn first(&self) -> Option<u16> {
        self.clusters.first().copied()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// `(cluster, successor)` pairs; the last cluster's successor is [`FAT12_EOC`].
    pub fn links(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.clusters.iter().enumerate().map(|(idx, &cluster)| {
            let next = self.clusters.get(idx + 1).copied().unwrap_or(FAT12_EOC);
            (cluster, next)
        })
    }

    pub fn size_bytes(&self, geometry: &Geometry) -> u32 {
        self.clusters.len() as u32 * geometry.cluster_size()
    }
}
