use std::fmt;
use std::str::FromStr;

use errors::*;

/// The fewest fields a line can have and still reach a mapper.
pub const MIN_FIELDS: usize = 2;

const FIELD_DELIMITER: char = ',';

/// `HeaderPolicy` decides whether a line is a CSV header that should be skipped.
///
/// Only the first line of a source is checked, and it is treated as a header when it contains the
/// token anywhere in the line. A data row on line 0 that happens to contain the token is skipped
/// as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderPolicy {
    token: &'static str,
}

impl HeaderPolicy {
    pub const fn first_line_contains(token: &'static str) -> Self {
        HeaderPolicy { token }
    }

    pub fn token(&self) -> &'static str {
        self.token
    }

    pub fn is_header(&self, ordinal: u64, line: &str) -> bool {
        ordinal == 0 && line.contains(self.token)
    }
}

/// `RecordSource` identifies which of the two MovieLens files a line was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// `userId,movieId,rating,timestamp`
    Ratings,
    /// `movieId,title,genres`
    Titles,
}

impl RecordSource {
    pub fn header_policy(&self) -> HeaderPolicy {
        match *self {
            RecordSource::Ratings => HeaderPolicy::first_line_contains("userId"),
            RecordSource::Titles => HeaderPolicy::first_line_contains("movieId"),
        }
    }

    pub fn parse(&self, ordinal: u64, line: &str) -> ParsedLine {
        parse_line(ordinal, line, self.header_policy())
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RecordSource::Ratings => write!(f, "ratings"),
            RecordSource::Titles => write!(f, "titles"),
        }
    }
}

impl FromStr for RecordSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ratings" => Ok(RecordSource::Ratings),
            "titles" => Ok(RecordSource::Titles),
            _ => Err(format!("Unknown input source '{}'.", s).into()),
        }
    }
}

/// `RawRecord` is one input line split into its comma separated fields.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    fields: Vec<String>,
}

impl RawRecord {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rebuilds the line the record was split from, for error messages.
    pub fn to_line(&self) -> String {
        self.fields.join(",")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Header,
    TooFewFields(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SkipReason::Header => write!(f, "header line"),
            SkipReason::TooFewFields(count) => write!(
                f,
                "expected at least {} fields, found {}",
                MIN_FIELDS,
                count
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedLine {
    Record(RawRecord),
    Skip(SkipReason),
}

/// `parse_line` splits a line on commas, or signals that it should be skipped.
///
/// There is no quoting support, so a title containing a comma is split across several fields.
/// Trailing empty fields are dropped, which means `"5,"` has a single field.
///
/// # Arguments
///
/// * `ordinal` - The position of the line within its source, starting at 0.
/// * `line` - The line without its terminator.
/// * `policy` - The `HeaderPolicy` of the source the line came from.
pub fn parse_line(ordinal: u64, line: &str, policy: HeaderPolicy) -> ParsedLine {
    if policy.is_header(ordinal, line) {
        return ParsedLine::Skip(SkipReason::Header);
    }

    let mut fields: Vec<String> = line.split(FIELD_DELIMITER).map(str::to_owned).collect();
    while fields.last().map_or(false, |field| field.is_empty()) {
        fields.pop();
    }

    if fields.len() < MIN_FIELDS {
        return ParsedLine::Skip(SkipReason::TooFewFields(fields.len()));
    }

    ParsedLine::Record(RawRecord { fields })
}
