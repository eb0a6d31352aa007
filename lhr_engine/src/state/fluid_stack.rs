//! LIFO model of what is inside a pipette tip.

use serde::{Deserialize, Serialize};

use super::update::FluidKind;
use lhr_common::consts::VOLUME_EPSILON;

/// One contiguous segment of a single fluid kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidSegment {
    pub kind: FluidKind,
    pub volume: f64,
}

/// Ordered fluid segments, bottom of the tip first.
///
/// Adjacent segments never share a kind, and no segment is empty, so the
/// total volume is always ≥ 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FluidStack {
    segments: Vec<FluidSegment>,
}

impl FluidStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn segments(&self) -> &[FluidSegment] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_volume(&self) -> f64 {
        self.segments.iter().map(|s| s.volume).sum()
    }

    /// Volume of the given kind anywhere in the stack.
    pub fn volume_of(&self, kind: FluidKind) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.volume)
            .sum()
    }

    /// Push a segment, merging into the top one if the kind matches.
    pub fn add(&mut self, kind: FluidKind, volume: f64) {
        if volume <= VOLUME_EPSILON {
            return;
        }
        match self.segments.last_mut() {
            Some(top) if top.kind == kind => top.volume += volume,
            _ => self.segments.push(FluidSegment { kind, volume }),
        }
    }

    /// Pop `volume` from the top. Removing more than is held empties the
    /// stack.
    pub fn remove(&mut self, volume: f64) {
        let mut remaining = volume;
        while remaining > VOLUME_EPSILON {
            let Some(top) = self.segments.last_mut() else {
                break;
            };
            if top.volume > remaining + VOLUME_EPSILON {
                top.volume -= remaining;
                return;
            }
            remaining -= top.volume;
            self.segments.pop();
        }
    }

    /// Volumes that `remove(volume)` would take off, by kind.
    pub fn removal_breakdown(&self, volume: f64) -> Vec<FluidSegment> {
        let mut remaining = volume;
        let mut taken = Vec::new();
        for segment in self.segments.iter().rev() {
            if remaining <= VOLUME_EPSILON {
                break;
            }
            let amount = segment.volume.min(remaining);
            taken.push(FluidSegment {
                kind: segment.kind,
                volume: amount,
            });
            remaining -= amount;
        }
        taken
    }

    /// Liquid that leaves the tip when `volume` is ejected.
    pub fn liquid_ejected_by(&self, volume: f64) -> f64 {
        self.removal_breakdown(volume)
            .iter()
            .filter(|s| s.kind == FluidKind::Liquid)
            .map(|s| s.volume)
            .sum()
    }
}
