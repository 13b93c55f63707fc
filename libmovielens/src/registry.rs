use std::path::{Path, PathBuf};

use errors::*;
use mapper::{DynMap, Map};
use partition::Partition;
use reducer::Reduce;

/// `MapperBinding` ties one input path to the mapper that reads it.
pub struct MapperBinding<'a, K: 'a, V: 'a> {
    pub path: PathBuf,
    pub mapper: &'a (dyn DynMap<K, V> + Sync),
}

/// `UserImplRegistry` tracks the inputs, mappers, reducer and partitioner of one job.
///
/// Inputs keep the order in which they were added, which is also the order their values reach
/// the reducer. The user should use the `UserImplRegistryBuilder` to create this.
pub struct UserImplRegistry<'a, K: 'a, V: 'a, R: 'a, P: 'a> {
    inputs: Vec<MapperBinding<'a, K, V>>,
    reducer: &'a R,
    partitioner: &'a P,
    output: PathBuf,
}

impl<'a, K, V, R, P> UserImplRegistry<'a, K, V, R, P>
where
    R: Reduce<K, V> + 'a,
    P: Partition<K> + 'a,
{
    pub fn inputs(&self) -> &[MapperBinding<'a, K, V>] {
        &self.inputs
    }

    pub fn reducer(&self) -> &'a R {
        self.reducer
    }

    pub fn partitioner(&self) -> &'a P {
        self.partitioner
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// `UserImplRegistryBuilder` is used to create a `UserImplRegistry`.
pub struct UserImplRegistryBuilder<'a, K: 'a, V: 'a, R: 'a, P: 'a> {
    inputs: Vec<MapperBinding<'a, K, V>>,
    reducer: Option<&'a R>,
    partitioner: Option<&'a P>,
    output: Option<PathBuf>,
}

impl<'a, K, V, R, P> Default for UserImplRegistryBuilder<'a, K, V, R, P>
where
    R: Reduce<K, V> + 'a,
    P: Partition<K> + 'a,
{
    fn default() -> UserImplRegistryBuilder<'a, K, V, R, P> {
        UserImplRegistryBuilder {
            inputs: Vec::new(),
            reducer: None,
            partitioner: None,
            output: None,
        }
    }
}

impl<'a, K, V, R, P> UserImplRegistryBuilder<'a, K, V, R, P>
where
    R: Reduce<K, V> + 'a,
    P: Partition<K> + 'a,
{
    pub fn new() -> UserImplRegistryBuilder<'a, K, V, R, P> {
        Default::default()
    }

    /// Binds an input path to a mapper. May be called more than once for multi-source jobs.
    pub fn input<S, M>(mut self, path: S, mapper: &'a M) -> UserImplRegistryBuilder<'a, K, V, R, P>
    where
        S: Into<PathBuf>,
        M: Map<Key = K, Value = V> + Sync,
    {
        self.inputs.push(MapperBinding {
            path: path.into(),
            mapper,
        });
        self
    }

    pub fn reducer(mut self, reducer: &'a R) -> UserImplRegistryBuilder<'a, K, V, R, P> {
        self.reducer = Some(reducer);
        self
    }

    pub fn partitioner(mut self, partitioner: &'a P) -> UserImplRegistryBuilder<'a, K, V, R, P> {
        self.partitioner = Some(partitioner);
        self
    }

    pub fn output<S: Into<PathBuf>>(mut self, path: S) -> UserImplRegistryBuilder<'a, K, V, R, P> {
        self.output = Some(path.into());
        self
    }

    pub fn build(self) -> Result<UserImplRegistry<'a, K, V, R, P>> {
        if self.inputs.is_empty() {
            return Err("Error building UserImplRegistry: No input provided".into());
        }
        let reducer = self.reducer
            .chain_err(|| "Error building UserImplRegistry: No Reducer provided")?;
        let partitioner = self.partitioner
            .chain_err(|| "Error building UserImplRegistry: No Partitioner provided")?;
        let output = self.output
            .chain_err(|| "Error building UserImplRegistry: No output path provided")?;

        Ok(UserImplRegistry {
            inputs: self.inputs,
            reducer,
            partitioner,
            output,
        })
    }
}
