use std::str::FromStr;

use serde::Serialize;

use emitter::{EmitIntermediate, IntermediateVecEmitter};
use errors::*;
use record::{ParsedLine, RawRecord, RecordSource};
use value::{MovieId, TaggedValue};

/// The `MapInputKV` is a struct for passing one input line to a `Map`.
///
/// `key` is the ordinal of the line within its source, `value` is the line itself without its
/// terminator.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapInputKV {
    pub key: u64,
    pub value: String,
}

impl MapInputKV {
    pub fn new<S: Into<String>>(key: u64, value: S) -> Self {
        MapInputKV {
            key,
            value: value.into(),
        }
    }
}

/// The `Map` trait defines a function for performing a map operation.
///
/// The output types are decided by the implementation of this trait.
///
/// # Arguments
///
/// * `input` - A `MapInputKV` containing the input line for the map operation.
/// * `emitter` - A struct implementing the `EmitIntermediate` trait, provided by the map runner.
///
/// # Outputs
///
/// An empty result used for returning an error. Outputs of the map operation are sent out through
/// the `emitter`. A mapper emits at most one pair per line.
pub trait Map {
    type Key: Serialize;
    type Value: Serialize;
    fn map<E>(&self, input: MapInputKV, emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>;
}

/// `DynMap` is an object safe view of a `Map`.
///
/// It lets one job bind mappers of different types to its inputs, as long as they emit the same
/// key and value types.
pub trait DynMap<K, V> {
    fn map_into(&self, input: MapInputKV, sink: &mut Vec<(K, V)>) -> Result<()>;
}

impl<M> DynMap<M::Key, M::Value> for M
where
    M: Map,
{
    fn map_into(&self, input: MapInputKV, sink: &mut Vec<(M::Key, M::Value)>) -> Result<()> {
        self.map(input, IntermediateVecEmitter::new(sink))
    }
}

fn read_record(source: RecordSource, input: &MapInputKV) -> Option<RawRecord> {
    match source.parse(input.key, &input.value) {
        ParsedLine::Record(record) => Some(record),
        ParsedLine::Skip(reason) => {
            debug!("Skipping {} line {}: {}", source, input.key, reason);
            None
        }
    }
}

fn parse_field<T: FromStr>(record: &RawRecord, index: usize, name: &'static str) -> Result<T> {
    let raw = record
        .field(index)
        .ok_or_else(|| Error::from(ErrorKind::MissingField(name, record.to_line())))?;

    raw.parse()
        .map_err(|_| ErrorKind::MalformedField(name, raw.to_owned()).into())
}

/// Extracts `(movieId, rating)` from a `userId,movieId,rating,timestamp` record.
fn extract_rating(record: &RawRecord) -> Result<(MovieId, f64)> {
    let movie_id: MovieId = parse_field(record, 1, "movieId")?;

    let raw_rating = record
        .field(2)
        .ok_or_else(|| Error::from(ErrorKind::MissingField("rating", record.to_line())))?;
    let rating: f64 = raw_rating
        .trim()
        .parse()
        .map_err(|_| Error::from(ErrorKind::MalformedField("rating", raw_rating.to_owned())))?;
    if !rating.is_finite() {
        return Err(ErrorKind::MalformedField("rating", raw_rating.to_owned()).into());
    }

    Ok((movie_id, rating))
}

/// Extracts `(movieId, title)` from a `movieId,title,genres` record. Genres are ignored.
fn extract_title(record: &RawRecord) -> Result<(MovieId, String)> {
    let movie_id: MovieId = parse_field(record, 0, "movieId")?;
    let title = record
        .field(1)
        .ok_or_else(|| Error::from(ErrorKind::MissingField("title", record.to_line())))?;

    Ok((movie_id, title.to_owned()))
}

/// `RatingMapper` emits `(movieId, rating)` for every line of the ratings file.
pub struct RatingMapper;
impl Map for RatingMapper {
    type Key = MovieId;
    type Value = f64;
    fn map<E>(&self, input: MapInputKV, mut emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>,
    {
        if let Some(record) = read_record(RecordSource::Ratings, &input) {
            let (movie_id, rating) = extract_rating(&record)?;
            emitter
                .emit(movie_id, rating)
                .chain_err(|| "Error emitting map key-value pair.")?;
        }
        Ok(())
    }
}

/// `NamedRatingMapper` is the `RatingMapper` of the ratings and titles job. Its ratings are tagged
/// so they can share a reduce stage with the output of `TitleMapper`.
pub struct NamedRatingMapper;
impl Map for NamedRatingMapper {
    type Key = MovieId;
    type Value = TaggedValue;
    fn map<E>(&self, input: MapInputKV, mut emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>,
    {
        if let Some(record) = read_record(RecordSource::Ratings, &input) {
            let (movie_id, rating) = extract_rating(&record)?;
            emitter
                .emit(movie_id, TaggedValue::Rating(rating))
                .chain_err(|| "Error emitting map key-value pair.")?;
        }
        Ok(())
    }
}

/// `TitleMapper` emits `(movieId, title)` for every line of the movies file.
pub struct TitleMapper;
impl Map for TitleMapper {
    type Key = MovieId;
    type Value = TaggedValue;
    fn map<E>(&self, input: MapInputKV, mut emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>,
    {
        if let Some(record) = read_record(RecordSource::Titles, &input) {
            let (movie_id, title) = extract_title(&record)?;
            emitter
                .emit(movie_id, TaggedValue::Title(title))
                .chain_err(|| "Error emitting map key-value pair.")?;
        }
        Ok(())
    }
}
