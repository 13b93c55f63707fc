use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::Write;

use serde::Serialize;

use errors::*;

/// `IntermediateOutputPair` is a struct representing an intermediate key-value pair as outputted
/// from a map operation.
#[derive(Debug, Serialize, PartialEq)]
pub struct IntermediateOutputPair<K: Serialize, V: Serialize> {
    pub key: K,
    pub value: V,
}

/// `IntermediateOutputObject` is a struct comprising a collection of `IntermediateOutputPair`s
/// keyed by reduce partition, representing the entire output of a map operation, ready to be
/// serialised to JSON.
#[derive(Debug, Serialize, PartialEq)]
pub struct IntermediateOutputObject<K: Serialize, V: Serialize> {
    pub partitions: BTreeMap<u64, Vec<IntermediateOutputPair<K, V>>>,
}

impl<K: Serialize, V: Serialize> IntermediateOutputObject<K, V> {
    pub fn new() -> Self {
        IntermediateOutputObject {
            partitions: BTreeMap::new(),
        }
    }
}

/// `FinalOutputObject` is a struct holding the output of one reduce operation: the key that was
/// reduced and the zero or one aggregate emitted for it.
#[derive(Debug, Serialize, PartialEq)]
pub struct FinalOutputObject<K: Serialize, V: Serialize> {
    pub key: K,
    pub values: Vec<V>,
}

/// `write_output_lines` writes one line per aggregate using its `Display` format.
pub fn write_output_lines<W, V>(sink: &mut W, values: &[V]) -> Result<()>
where
    W: Write,
    V: Display,
{
    for value in values {
        writeln!(sink, "{}", value).chain_err(|| "Error writing output line.")?;
    }
    Ok(())
}
