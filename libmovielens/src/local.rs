//! In-process execution of a configured job.
//!
//! Every input is mapped on its own thread, the output is shuffled, and every reduce partition is
//! reduced on its own thread. Output is only written once every map and reduce operation has
//! succeeded, so a failed job leaves no output directory behind.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::thread;

use emitter::FinalVecEmitter;
use errors::*;
use intermediate::IntermediateInputKV;
use mapper::{MapInputKV, NamedRatingMapper, RatingMapper, TitleMapper};
use partition::{HashPartitioner, Partition};
use reducer::{AverageReducer, JoinAverageReducer, Reduce};
use registry::{MapperBinding, UserImplRegistry, UserImplRegistryBuilder};
use serialise::write_output_lines;
use shuffle::Shuffle;

const SUCCESS_MARKER: &str = "_SUCCESS";

/// Counters collected while running a job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub pairs_emitted: u64,
    pub groups_reduced: u64,
    pub empty_groups: u64,
    pub records_written: u64,
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "lines_read={} lines_skipped={} pairs_emitted={} groups_reduced={} empty_groups={} \
             records_written={}",
            self.lines_read,
            self.lines_skipped,
            self.pairs_emitted,
            self.groups_reduced,
            self.empty_groups,
            self.records_written
        )
    }
}

struct MappedInput<K, V> {
    pairs: Vec<(K, V)>,
    lines_read: u64,
    lines_skipped: u64,
}

struct ReducedPartition<O> {
    records: Vec<O>,
    groups: u64,
    empty_groups: u64,
}

fn map_input<K, V>(binding: &MapperBinding<K, V>) -> Result<MappedInput<K, V>> {
    let path = &binding.path;
    let file = File::open(path).chain_err(|| format!("Error opening input {}.", path.display()))?;

    let mut mapped = MappedInput {
        pairs: Vec::new(),
        lines_read: 0,
        lines_skipped: 0,
    };
    for (ordinal, line) in BufReader::new(file).lines().enumerate() {
        let line = line.chain_err(|| format!("Error reading input {}.", path.display()))?;
        let emitted_before = mapped.pairs.len();

        binding
            .mapper
            .map_into(MapInputKV::new(ordinal as u64, line), &mut mapped.pairs)
            .chain_err(|| format!("Error mapping line {} of {}.", ordinal, path.display()))?;

        mapped.lines_read += 1;
        if mapped.pairs.len() == emitted_before {
            mapped.lines_skipped += 1;
        }
    }

    debug!(
        "Mapped input {}. lines={} pairs={}",
        path.display(),
        mapped.lines_read,
        mapped.pairs.len()
    );
    Ok(mapped)
}

fn map_inputs<K, V>(inputs: &[MapperBinding<K, V>]) -> Result<Vec<MappedInput<K, V>>>
where
    K: Send,
    V: Send,
{
    thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|binding| scope.spawn(move || map_input(binding)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err("Map operation thread panicked.".into()))
            })
            .collect()
    })
}

fn reduce_partition<K, V, R>(
    reducer: &R,
    groups: Vec<IntermediateInputKV<K, V>>,
) -> Result<ReducedPartition<R::Output>>
where
    R: Reduce<K, V>,
{
    let mut reduced = ReducedPartition {
        records: Vec::new(),
        groups: 0,
        empty_groups: 0,
    };
    for group in groups {
        let emitted_before = reduced.records.len();

        reducer
            .reduce(group, FinalVecEmitter::new(&mut reduced.records))
            .chain_err(|| "Error running reduce operation.")?;

        reduced.groups += 1;
        if reduced.records.len() == emitted_before {
            reduced.empty_groups += 1;
        }
    }
    Ok(reduced)
}

fn reduce_partitions<K, V, R>(
    reducer: &R,
    partitions: Vec<Vec<IntermediateInputKV<K, V>>>,
) -> Result<Vec<ReducedPartition<R::Output>>>
where
    K: Send,
    V: Send,
    R: Reduce<K, V> + Sync,
    R::Output: Send,
{
    thread::scope(|scope| {
        let handles: Vec<_> = partitions
            .into_iter()
            .map(|groups| scope.spawn(move || reduce_partition(reducer, groups)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err("Reduce operation thread panicked.".into()))
            })
            .collect()
    })
}

fn write_output<O: fmt::Display>(output: &Path, partitions: &[ReducedPartition<O>]) -> Result<()> {
    fs::create_dir_all(output)
        .chain_err(|| format!("Error creating output directory {}.", output.display()))?;

    for (index, partition) in partitions.iter().enumerate() {
        let path = output.join(format!("part-r-{:05}", index));
        let file = File::create(&path)
            .chain_err(|| format!("Error creating output file {}.", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_output_lines(&mut writer, &partition.records)
            .chain_err(|| format!("Error writing output file {}.", path.display()))?;
        writer
            .flush()
            .chain_err(|| format!("Error writing output file {}.", path.display()))?;
    }

    File::create(output.join(SUCCESS_MARKER)).chain_err(|| "Error creating success marker.")?;
    Ok(())
}

/// `run_job` runs the job described by `registry` and writes its output.
///
/// The job fails without writing anything if its output directory already exists, or if any map
/// or reduce operation fails.
pub fn run_job<'a, K, V, R, P>(registry: &UserImplRegistry<'a, K, V, R, P>) -> Result<JobSummary>
where
    K: Ord + Send,
    V: Send,
    R: Reduce<K, V> + Sync + 'a,
    R::Output: fmt::Display + Send,
    P: Partition<K> + 'a,
{
    let output = registry.output();
    if output.exists() {
        return Err(format!("Output directory {} already exists.", output.display()).into());
    }

    info!(
        "Starting job. inputs={} output={}",
        registry.inputs().len(),
        output.display()
    );

    let mut summary = JobSummary::default();
    let mut shuffle = Shuffle::new();
    for mapped in map_inputs(registry.inputs())? {
        summary.lines_read += mapped.lines_read;
        summary.lines_skipped += mapped.lines_skipped;
        shuffle.add_source(mapped.pairs);
    }
    summary.pairs_emitted = shuffle.pair_count();
    debug!(
        "Shuffled map output. sources={} pairs={} groups={}",
        shuffle.source_count(),
        shuffle.pair_count(),
        shuffle.group_count()
    );

    let partitions = shuffle
        .into_partitions(registry.partitioner())
        .chain_err(|| "Error shuffling map output.")?;
    let reduced = reduce_partitions(registry.reducer(), partitions)?;
    for partition in &reduced {
        summary.groups_reduced += partition.groups;
        summary.empty_groups += partition.empty_groups;
        summary.records_written += partition.records.len() as u64;
    }

    write_output(output, &reduced)?;

    info!("Job complete. {}", summary);
    Ok(summary)
}

/// Runs the average rating job: ratings file in, `movieId\taverage` lines out.
pub fn run_average_job(ratings: &Path, output: &Path, partitions: u64) -> Result<JobSummary> {
    let partitioner = HashPartitioner::new(partitions);
    let registry = UserImplRegistryBuilder::new()
        .input(ratings, &RatingMapper)
        .reducer(&AverageReducer)
        .partitioner(&partitioner)
        .output(output)
        .build()
        .chain_err(|| "Error building UserImplRegistry.")?;

    run_job(&registry)
}

/// Runs the average rating by title job: ratings and movies files in,
/// `movieId\ttitle\taverage` lines out.
pub fn run_join_job(
    ratings: &Path,
    titles: &Path,
    output: &Path,
    partitions: u64,
) -> Result<JobSummary> {
    let partitioner = HashPartitioner::new(partitions);
    let registry = UserImplRegistryBuilder::new()
        .input(ratings, &NamedRatingMapper)
        .input(titles, &TitleMapper)
        .reducer(&JoinAverageReducer)
        .partitioner(&partitioner)
        .output(output)
        .build()
        .chain_err(|| "Error building UserImplRegistry.")?;

    run_job(&registry)
}
