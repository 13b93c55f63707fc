use std::fmt;

/// The join and group key of both datasets.
pub type MovieId = i32;

/// `TaggedValue` carries the source of a value emitted into a multi-source job, so a reducer can
/// tell rating contributions from title contributions that share a key.
///
/// Serialised as `{"rating":4.0}` or `{"title":"Toy Story (1995)"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggedValue {
    Rating(f64),
    Title(String),
}

/// Output of the ratings-only job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageRating {
    pub movie_id: MovieId,
    pub average: f64,
}

/// Output of the ratings and titles job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitledAverage {
    pub movie_id: MovieId,
    pub title: String,
    pub average: f64,
}

/// Formats an average with at least one decimal place, so `4` prints as `4.0`.
pub fn format_average(average: f64) -> String {
    if average.fract() == 0.0 {
        format!("{:.1}", average)
    } else {
        format!("{}", average)
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", self.movie_id, format_average(self.average))
    }
}

impl fmt::Display for TitledAverage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}",
            self.movie_id,
            self.title,
            format_average(self.average)
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json;
    use super::*;

    #[test]
    fn average_rating_output_line() {
        let result = AverageRating {
            movie_id: 1,
            average: 4.0,
        };

        assert_eq!("1\t4.0", result.to_string());
    }

    #[test]
    fn titled_average_output_line() {
        let result = TitledAverage {
            movie_id: 1,
            title: "Toy Story (1995)".to_owned(),
            average: 4.5,
        };

        assert_eq!("1\tToy Story (1995)\t4.5", result.to_string());
    }

    #[test]
    fn format_average_keeps_full_precision() {
        assert_eq!("3.3333333333333335", format_average(10.0 / 3.0));
        assert_eq!("2.0", format_average(2.0));
    }

    #[test]
    fn tagged_value_json_format() {
        let rating = serde_json::to_string(&TaggedValue::Rating(4.0)).unwrap();
        let title = serde_json::to_string(&TaggedValue::Title("Heat (1995)".to_owned())).unwrap();

        assert_eq!(r#"{"rating":4.0}"#, rating);
        assert_eq!(r#"{"title":"Heat (1995)"}"#, title);
    }

    #[test]
    fn tagged_value_from_json() {
        let value: TaggedValue = serde_json::from_str(r#"{"title":"Heat (1995)"}"#).unwrap();

        assert_eq!(TaggedValue::Title("Heat (1995)".to_owned()), value);
    }
}
