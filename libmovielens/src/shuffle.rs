//! Grouping of map output by key.
//!
//! Keys come out in ascending order. Within a key, values are ordered by the order in which their
//! sources were added, then by the order in which each source emitted them. A reducer that keeps
//! the last title it sees therefore picks the last title of the last source that had one.

use std::collections::BTreeMap;

use serde::Serialize;

use errors::*;
use intermediate::IntermediateInputKV;
use partition::Partition;
use serialise::{IntermediateOutputObject, IntermediateOutputPair};

/// `Shuffle` collects the output of every mapped source and groups it by key.
pub struct Shuffle<K, V> {
    groups: BTreeMap<K, Vec<V>>,
    sources: usize,
    pairs: u64,
}

impl<K: Ord, V> Default for Shuffle<K, V> {
    fn default() -> Self {
        Shuffle {
            groups: BTreeMap::new(),
            sources: 0,
            pairs: 0,
        }
    }
}

impl<K: Ord, V> Shuffle<K, V> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends the output of one source. Sources must be added in their registration order.
    pub fn add_source<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.groups.entry(key).or_insert_with(Vec::new).push(value);
            self.pairs += 1;
        }
        self.sources += 1;
    }

    pub fn source_count(&self) -> usize {
        self.sources
    }

    pub fn pair_count(&self) -> u64 {
        self.pairs
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Splits the groups into `partitioner.partition_count()` partitions. Each partition keeps its
    /// keys in ascending order.
    pub fn into_partitions<P>(self, partitioner: &P) -> Result<Vec<Vec<IntermediateInputKV<K, V>>>>
    where
        P: Partition<K>,
    {
        let partition_count = partitioner.partition_count();
        if partition_count == 0 {
            return Err("Cannot shuffle into zero partitions.".into());
        }

        let mut partitions: Vec<Vec<IntermediateInputKV<K, V>>> =
            (0..partition_count).map(|_| Vec::new()).collect();
        for (key, values) in self.groups {
            let partition = partitioner
                .partition(&key)
                .chain_err(|| "Error partitioning shuffle output.")?;
            let bucket = partitions.get_mut(partition as usize).chain_err(|| {
                format!(
                    "Partition {} is out of range for {} partitions.",
                    partition,
                    partition_count
                )
            })?;
            bucket.push(IntermediateInputKV::new(key, values));
        }

        Ok(partitions)
    }
}

/// `partition_pairs` routes the pairs emitted by one map operation to their reduce partitions,
/// keeping emission order within every partition.
pub fn partition_pairs<K, V, P>(
    pairs: Vec<(K, V)>,
    partitioner: &P,
) -> Result<IntermediateOutputObject<K, V>>
where
    K: Serialize,
    V: Serialize,
    P: Partition<K>,
{
    let mut output = IntermediateOutputObject::new();
    for (key, value) in pairs {
        let partition = partitioner
            .partition(&key)
            .chain_err(|| "Error partitioning map output.")?;
        output
            .partitions
            .entry(partition)
            .or_insert_with(Vec::new)
            .push(IntermediateOutputPair { key, value });
    }
    Ok(output)
}
