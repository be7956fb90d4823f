//! Container-level statistics.

use crate::container::{Container, Kind};

/// How a bitmap's values are spread across container representations.
///
/// Byte counts are payload estimates (what the serialized form spends on
/// each container's values), not allocator capacity; see `heap_bytes` on
/// the bitmaps for the latter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Number of containers.
    pub n_containers: u64,
    /// Number of array containers.
    pub n_array_containers: u64,
    /// Number of run containers.
    pub n_run_containers: u64,
    /// Number of bitmap containers.
    pub n_bitset_containers: u64,
    /// Values held in array containers.
    pub n_values_array_containers: u64,
    /// Values held in run containers.
    pub n_values_run_containers: u64,
    /// Values held in bitmap containers.
    pub n_values_bitset_containers: u64,
    /// Payload bytes of array containers.
    pub n_bytes_array_containers: u64,
    /// Payload bytes of run containers.
    pub n_bytes_run_containers: u64,
    /// Payload bytes of bitmap containers.
    pub n_bytes_bitset_containers: u64,
    /// Smallest value, if any.
    pub min_value: Option<u64>,
    /// Largest value, if any.
    pub max_value: Option<u64>,
    /// Total number of values.
    pub cardinality: u64,
}

impl Statistics {
    pub(crate) fn record(&mut self, c: &Container) {
        let values = c.len() as u64;
        let bytes = c.payload_bytes() as u64;
        self.n_containers += 1;
        self.cardinality += values;
        match c.kind() {
            Kind::Array => {
                self.n_array_containers += 1;
                self.n_values_array_containers += values;
                self.n_bytes_array_containers += bytes;
            }
            Kind::Run => {
                self.n_run_containers += 1;
                self.n_values_run_containers += values;
                self.n_bytes_run_containers += bytes;
            }
            Kind::Bitmap => {
                self.n_bitset_containers += 1;
                self.n_values_bitset_containers += values;
                self.n_bytes_bitset_containers += bytes;
            }
        }
    }

    /// Add the container counts of `other`; min/max are left to the caller.
    pub(crate) fn absorb(&mut self, other: &Statistics) {
        self.n_containers += other.n_containers;
        self.n_array_containers += other.n_array_containers;
        self.n_run_containers += other.n_run_containers;
        self.n_bitset_containers += other.n_bitset_containers;
        self.n_values_array_containers += other.n_values_array_containers;
        self.n_values_run_containers += other.n_values_run_containers;
        self.n_values_bitset_containers += other.n_values_bitset_containers;
        self.n_bytes_array_containers += other.n_bytes_array_containers;
        self.n_bytes_run_containers += other.n_bytes_run_containers;
        self.n_bytes_bitset_containers += other.n_bytes_bitset_containers;
        self.cardinality += other.cardinality;
    }

    /// Total payload bytes across all representations.
    pub fn payload_bytes(&self) -> u64 {
        self.n_bytes_array_containers + self.n_bytes_run_containers + self.n_bytes_bitset_containers
    }
}
