//! Average movie ratings over the MovieLens datasets, expressed as MapReduce mappers and reducers.
//!
//! The mappers and reducers only depend on the `Map`, `Reduce` and `Partition` contracts, so they
//! can be driven by an external substrate through the JSON payload protocol (`runner`) or
//! in-process through the `local` substrate.

#![recursion_limit = "1024"]

extern crate chrono;
extern crate clap;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate uuid;

pub mod errors {
    error_chain! {
        foreign_links {
            Io(::std::io::Error);
            Json(::serde_json::Error);
        }

        errors {
            MalformedField(field: &'static str, value: String) {
                description("malformed numeric field")
                display("field `{}` is not a valid number: '{}'", field, value)
            }
            MissingField(field: &'static str, line: String) {
                description("missing field")
                display("field `{}` is missing from line: '{}'", field, line)
            }
            NonFiniteAverage(count: u64) {
                description("average is not a finite number")
                display("the average of {} ratings is not a finite number", count)
            }
        }
    }
}

pub mod emitter;
pub mod intermediate;
pub mod io;
pub mod local;
pub mod mapper;
pub mod partition;
pub mod record;
pub mod reducer;
pub mod registry;
pub mod runner;
pub mod serialise;
pub mod shuffle;
pub mod value;

const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

// Public interface
pub use errors::*;
pub use emitter::{EmitFinal, EmitIntermediate, FinalVecEmitter, IntermediateVecEmitter};
pub use intermediate::IntermediateInputKV;
pub use local::{run_average_job, run_job, run_join_job, JobSummary};
pub use mapper::{DynMap, Map, MapInputKV, NamedRatingMapper, RatingMapper, TitleMapper};
pub use partition::{HashPartitioner, Partition};
pub use record::{HeaderPolicy, ParsedLine, RawRecord, RecordSource, SkipReason};
pub use reducer::{AverageReducer, JoinAverageReducer, RatingAccumulator, Reduce};
pub use registry::{MapperBinding, UserImplRegistry, UserImplRegistryBuilder};
pub use runner::{parse_command_line, run};
pub use shuffle::Shuffle;
pub use value::{AverageRating, MovieId, TaggedValue, TitledAverage};
