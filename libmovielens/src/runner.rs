use std::io::{stdin, stdout, Read, Write};
use std::path::Path;

use chrono::prelude::*;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use emitter::{FinalVecEmitter, IntermediateVecEmitter};
use errors::*;
use io::*;
use local::{run_average_job, run_join_job};
use mapper::{Map, NamedRatingMapper, RatingMapper, TitleMapper};
use partition::{HashPartitioner, Partition};
use record::RecordSource;
use reducer::{AverageReducer, JoinAverageReducer, Reduce};
use serialise::FinalOutputObject;
use shuffle::partition_pairs;
use value::{MovieId, TaggedValue};
use super::VERSION;

const DEFAULT_PARTITIONS: &str = "1";

/// The two jobs a payload can take part in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JobKind {
    /// Ratings only.
    Average,
    /// Ratings joined with titles.
    Join,
}

fn job_kind(matches: &ArgMatches) -> Result<JobKind> {
    match matches.value_of("job") {
        Some("average") => Ok(JobKind::Average),
        Some("join") => Ok(JobKind::Join),
        Some(other) => Err(format!("Unknown job '{}'.", other).into()),
        None => Err("No job provided.".into()),
    }
}

fn partition_count(matches: &ArgMatches) -> Result<u64> {
    let raw = matches.value_of("partitions").unwrap_or(DEFAULT_PARTITIONS);
    let partitions: u64 = raw.parse()
        .chain_err(|| format!("Invalid partition count '{}'.", raw))?;
    if partitions == 0 {
        return Err("Partition count must be at least 1.".into());
    }
    Ok(partitions)
}

fn job_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("job")
        .long("job")
        .short("j")
        .help("The job this operation belongs to")
        .takes_value(true)
        .possible_values(&["average", "join"])
        .required(true)
}

fn partitions_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("partitions")
        .long("partitions")
        .short("p")
        .help("Number of reduce partitions")
        .takes_value(true)
        .default_value(DEFAULT_PARTITIONS)
}

fn build_app<'a, 'b>() -> App<'a, 'b> {
    let current_time = Utc::now();
    let id = Uuid::new_v4();
    let payload_name = format!("{}_{}", current_time.format("%+"), id);
    App::new(payload_name)
        .version(VERSION.unwrap_or("unknown"))
        .about("Average movie ratings, optionally joined with movie titles")
        .subcommand(
            SubCommand::with_name("map")
                .about("Map a JSON input split read from stdin")
                .arg(job_arg())
                .arg(
                    Arg::with_name("source")
                        .long("source")
                        .short("s")
                        .help("The file the input split was read from")
                        .takes_value(true)
                        .possible_values(&["ratings", "titles"])
                        .required(true),
                )
                .arg(partitions_arg()),
        )
        .subcommand(
            SubCommand::with_name("reduce")
                .about("Reduce a JSON array of groups read from stdin")
                .arg(job_arg()),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Run a whole job locally")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("average")
                        .about("Average rating per movie")
                        .arg(
                            Arg::with_name("ratings")
                                .help("Ratings input path")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::with_name("output")
                                .help("Output directory, must not exist")
                                .required(true)
                                .index(2),
                        )
                        .arg(partitions_arg()),
                )
                .subcommand(
                    SubCommand::with_name("join")
                        .about("Average rating per movie with its title")
                        .arg(
                            Arg::with_name("ratings")
                                .help("Ratings input path")
                                .required(true)
                                .index(1),
                        )
                        .arg(
                            Arg::with_name("titles")
                                .help("Movies input path")
                                .required(true)
                                .index(2),
                        )
                        .arg(
                            Arg::with_name("output")
                                .help("Output directory, must not exist")
                                .required(true)
                                .index(3),
                        )
                        .arg(partitions_arg()),
                ),
        )
        .subcommand(SubCommand::with_name("sanity-check"))
}

/// `parse_command_line` uses `clap` to parse the command-line arguments passed to the payload.
///
/// The output of this function is required by the `run` function, to decide what subcommand to
/// run.
pub fn parse_command_line<'a>() -> ArgMatches<'a> {
    build_app().get_matches()
}

/// `run` begins the primary operations of the payload, and delegates to sub-functions.
///
/// # Arguments
///
/// `matches` - The output of the `parse_command_line` function.
pub fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("map", Some(sub)) => run_map(sub),
        ("reduce", Some(sub)) => run_reduce(sub),
        ("run", Some(sub)) => run_local(sub),
        ("sanity-check", _) => {
            run_sanity_check();
            Ok(())
        }
        _ => {
            eprintln!("{}", matches.usage());
            Ok(())
        }
    }
}

fn run_map(matches: &ArgMatches) -> Result<()> {
    let job = job_kind(matches)?;
    let source: RecordSource = matches
        .value_of("source")
        .chain_err(|| "No input source provided.")?
        .parse()?;
    let partitioner = HashPartitioner::new(partition_count(matches)?);

    let split = read_input_split(&mut stdin()).chain_err(|| "Error getting input to map.")?;
    info!(
        "Performing map operation. job={:?} source={} start={}",
        job,
        source,
        split.start
    );

    let mut sink = stdout();
    match (job, source) {
        (JobKind::Average, RecordSource::Ratings) => {
            map_split(&RatingMapper, &split, &partitioner, &mut sink)
        }
        (JobKind::Average, RecordSource::Titles) => {
            Err("The average job does not read a titles input.".into())
        }
        (JobKind::Join, RecordSource::Ratings) => {
            map_split(&NamedRatingMapper, &split, &partitioner, &mut sink)
        }
        (JobKind::Join, RecordSource::Titles) => {
            map_split(&TitleMapper, &split, &partitioner, &mut sink)
        }
    }
}

fn map_split<M, P, W>(mapper: &M, split: &InputSplit, partitioner: &P, sink: &mut W) -> Result<()>
where
    M: Map,
    P: Partition<M::Key>,
    W: Write,
{
    let mut pairs: Vec<(M::Key, M::Value)> = Vec::new();
    for input in split.records() {
        let ordinal = input.key;
        mapper
            .map(input, IntermediateVecEmitter::new(&mut pairs))
            .chain_err(|| format!("Error running map operation on line {}.", ordinal))?;
    }

    let output = partition_pairs(pairs, partitioner).chain_err(|| "Error partitioning map output")?;

    write_map_output(sink, &output).chain_err(|| "Error writing map output to stdout.")?;
    sink.flush().chain_err(|| "Error flushing map output.")?;
    Ok(())
}

fn run_reduce(matches: &ArgMatches) -> Result<()> {
    let job = job_kind(matches)?;
    info!("Performing reduce operation. job={:?}", job);

    let mut source = stdin();
    let mut sink = stdout();
    match job {
        JobKind::Average => {
            reduce_groups::<MovieId, f64, _, _, _>(&AverageReducer, &mut source, &mut sink)
        }
        JobKind::Join => reduce_groups::<MovieId, TaggedValue, _, _, _>(
            &JoinAverageReducer,
            &mut source,
            &mut sink,
        ),
    }
}

fn reduce_groups<K, V, R, S, W>(reducer: &R, source: &mut S, sink: &mut W) -> Result<()>
where
    K: Clone + Serialize + DeserializeOwned,
    V: DeserializeOwned,
    R: Reduce<K, V>,
    S: Read,
    W: Write,
{
    let groups = read_reduce_input::<K, V, S>(source).chain_err(|| "Error getting input to reduce.")?;

    let mut output = Vec::with_capacity(groups.len());
    for group in groups {
        let key = group.key().clone();
        let mut values = Vec::new();
        reducer
            .reduce(group, FinalVecEmitter::new(&mut values))
            .chain_err(|| "Error running reduce operation.")?;
        output.push(FinalOutputObject { key, values });
    }

    write_reduce_output(sink, &output).chain_err(|| "Error writing reduce output to stdout.")?;
    sink.flush().chain_err(|| "Error flushing reduce output.")?;
    Ok(())
}

fn run_local(matches: &ArgMatches) -> Result<()> {
    let summary = match matches.subcommand() {
        ("average", Some(sub)) => {
            let ratings = sub.value_of("ratings").chain_err(|| "No ratings path provided.")?;
            let output = sub.value_of("output").chain_err(|| "No output path provided.")?;
            run_average_job(Path::new(ratings), Path::new(output), partition_count(sub)?)
                .chain_err(|| "Error running average rating job.")?
        }
        ("join", Some(sub)) => {
            let ratings = sub.value_of("ratings").chain_err(|| "No ratings path provided.")?;
            let titles = sub.value_of("titles").chain_err(|| "No titles path provided.")?;
            let output = sub.value_of("output").chain_err(|| "No output path provided.")?;
            run_join_job(
                Path::new(ratings),
                Path::new(titles),
                Path::new(output),
                partition_count(sub)?,
            ).chain_err(|| "Error running average rating by title job.")?
        }
        _ => return Err("Unknown job, expected `average` or `join`.".into()),
    };

    println!("{}", summary);
    Ok(())
}

fn run_sanity_check() {
    println!("sanity located");
}
