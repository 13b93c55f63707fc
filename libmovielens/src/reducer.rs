use serde::Serialize;

use emitter::EmitFinal;
use errors::*;
use intermediate::IntermediateInputKV;
use value::{AverageRating, MovieId, TaggedValue, TitledAverage};

/// The `Reduce` trait defines a function for performing a reduce operation.
///
/// The output types are decided by the implementation of this trait.
///
/// # Arguments
///
/// * `input` - A `IntermediateInputKV` containing the group to reduce.
/// * `emitter` - A struct implementing the `EmitFinal` trait, provided by the reduce runner.
///
/// # Outputs
///
/// An empty result used for returning an error. Outputs of the reduce operation are sent out
/// through the `emitter`.
pub trait Reduce<K, V> {
    type Output: Serialize;
    fn reduce<E>(&self, input: IntermediateInputKV<K, V>, emitter: E) -> Result<()>
    where
        E: EmitFinal<Self::Output>;
}

/// Running sum and count of the ratings of one group.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RatingAccumulator {
    sum: f64,
    count: u64,
}

impl RatingAccumulator {
    pub fn add(&mut self, rating: f64) {
        self.sum += rating;
        self.count += 1;
    }

    /// Returns `None` when no rating was added.
    ///
    /// Every rating is finite, but their sum can still overflow, in which case the average is an
    /// error rather than `inf`.
    pub fn average(&self) -> Result<Option<f64>> {
        if self.count == 0 {
            return Ok(None);
        }

        let average = self.sum / self.count as f64;
        if !average.is_finite() {
            return Err(ErrorKind::NonFiniteAverage(self.count).into());
        }
        Ok(Some(average))
    }
}

/// `AverageReducer` averages the ratings of one movie.
pub struct AverageReducer;
impl Reduce<MovieId, f64> for AverageReducer {
    type Output = AverageRating;
    fn reduce<E>(&self, input: IntermediateInputKV<MovieId, f64>, mut emitter: E) -> Result<()>
    where
        E: EmitFinal<Self::Output>,
    {
        let (movie_id, values) = input.into_parts();
        let mut ratings = RatingAccumulator::default();
        for rating in values {
            ratings.add(rating);
        }

        let average = ratings
            .average()
            .chain_err(|| format!("Error averaging ratings of movie {}.", movie_id))?;
        match average {
            Some(average) => emitter
                .emit(AverageRating { movie_id, average })
                .chain_err(|| format!("Error emitting average for movie {}.", movie_id)),
            None => {
                warn!("Movie {} has no ratings, no average emitted.", movie_id);
                Ok(())
            }
        }
    }
}

/// `JoinAverageReducer` averages the ratings of one movie and attaches its title.
///
/// If a group holds several titles the last one in grouping order is kept. A movie without a title
/// gets an empty one.
pub struct JoinAverageReducer;
impl Reduce<MovieId, TaggedValue> for JoinAverageReducer {
    type Output = TitledAverage;
    fn reduce<E>(&self, input: IntermediateInputKV<MovieId, TaggedValue>, mut emitter: E) -> Result<()>
    where
        E: EmitFinal<Self::Output>,
    {
        let (movie_id, values) = input.into_parts();
        let mut ratings = RatingAccumulator::default();
        let mut title: Option<String> = None;
        for value in values {
            match value {
                TaggedValue::Rating(rating) => ratings.add(rating),
                TaggedValue::Title(text) => {
                    if let Some(ref previous) = title {
                        debug!(
                            "Movie {} has more than one title, replacing '{}' with '{}'.",
                            movie_id,
                            previous,
                            text
                        );
                    }
                    title = Some(text);
                }
            }
        }

        let average = ratings
            .average()
            .chain_err(|| format!("Error averaging ratings of movie {}.", movie_id))?;
        match average {
            Some(average) => emitter
                .emit(TitledAverage {
                    movie_id,
                    title: title.unwrap_or_default(),
                    average,
                })
                .chain_err(|| format!("Error emitting average for movie {}.", movie_id)),
            None => {
                warn!(
                    "Movie {} ({}) has no ratings, no average emitted.",
                    movie_id,
                    title.unwrap_or_default()
                );
                Ok(())
            }
        }
    }
}
