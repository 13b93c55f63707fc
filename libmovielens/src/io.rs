use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json;

use errors::*;
use intermediate::IntermediateInputKV;
use mapper::MapInputKV;
use serialise::{FinalOutputObject, IntermediateOutputObject};

/// `InputSplit` is a contiguous run of lines from one source, as handed to a map operation by the
/// substrate.
///
/// `start` is the ordinal of the first line of `text` within its source, so that only the split
/// at the start of a file can contain its header.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct InputSplit {
    pub start: u64,
    pub text: String,
}

impl InputSplit {
    /// Returns one `MapInputKV` per line, keyed by the line's ordinal within the source.
    pub fn records<'a>(&'a self) -> Box<dyn Iterator<Item = MapInputKV> + 'a> {
        let start = self.start;
        Box::new(
            self.text
                .lines()
                .enumerate()
                .map(move |(index, line)| MapInputKV::new(start + index as u64, line)),
        )
    }
}

/// `read_input_split` reads a string from a source and returns an `InputSplit`.
///
/// It attempts to parse the string from the input source as JSON and returns an `errors::Error` if
/// the attempt fails.
pub fn read_input_split<R: Read>(source: &mut R) -> Result<InputSplit> {
    let mut input_string = String::new();
    let bytes_read = source
        .read_to_string(&mut input_string)
        .chain_err(|| "Error reading from source.")?;
    if bytes_read == 0 {
        warn!("bytes_read is 0");
    }
    let result = serde_json::from_str(input_string.as_str())
        .chain_err(|| "Error parsing input JSON to InputSplit.")?;
    Ok(result)
}

/// `read_reduce_input` reads a string from a source and returns the groups to reduce.
///
/// It attempts to parse the string from the input source as a JSON array of
/// `{"key":..,"values":[..]}` objects and returns an `errors::Error` if the attempt fails.
pub fn read_reduce_input<K, V, R>(source: &mut R) -> Result<Vec<IntermediateInputKV<K, V>>>
where
    K: DeserializeOwned,
    V: DeserializeOwned,
    R: Read,
{
    let mut input_string = String::new();
    let bytes_read = source
        .read_to_string(&mut input_string)
        .chain_err(|| "Error reading from source.")?;
    if bytes_read == 0 {
        warn!("bytes_read is 0");
    }
    let result = serde_json::from_str(input_string.as_str())
        .chain_err(|| "Error parsing input JSON to IntermediateInputKV.")?;
    Ok(result)
}

pub fn write_map_output<W, K, V>(sink: &mut W, output: &IntermediateOutputObject<K, V>) -> Result<()>
where
    W: Write,
    K: Serialize,
    V: Serialize,
{
    serde_json::to_writer(sink, output).chain_err(|| "Error writing map output.")?;
    Ok(())
}

pub fn write_reduce_output<W, K, V>(sink: &mut W, output: &[FinalOutputObject<K, V>]) -> Result<()>
where
    W: Write,
    K: Serialize,
    V: Serialize,
{
    serde_json::to_writer(sink, output).chain_err(|| "Error writing reduce output.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use super::*;
    use value::TaggedValue;

    #[test]
    fn read_valid_input_split() {
        let test_string = r#"{"start":0,"text":"userId,movieId,rating,timestamp\n1,31,2.5,0\n"}"#;
        let mut cursor = Cursor::new(test_string);
        let expected_result = InputSplit {
            start: 0,
            text: "userId,movieId,rating,timestamp\n1,31,2.5,0\n".to_owned(),
        };

        let result = read_input_split(&mut cursor).unwrap();

        assert_eq!(expected_result, result);
    }

    #[test]
    #[should_panic]
    fn read_invalid_input_split() {
        let test_string = "";
        let mut cursor = Cursor::new(test_string);

        read_input_split(&mut cursor).unwrap();
    }

    #[test]
    fn split_records_continue_from_start() {
        let split = InputSplit {
            start: 10,
            text: "1,31,2.5,0\r\n1,1029,3.0,0".to_owned(),
        };

        let records: Vec<MapInputKV> = split.records().collect();

        assert_eq!(
            vec![
                MapInputKV::new(10, "1,31,2.5,0"),
                MapInputKV::new(11, "1,1029,3.0,0"),
            ],
            records
        );
    }

    #[test]
    fn read_valid_reduce_input() {
        let test_string = r#"[{"key":1,"values":[{"rating":4.0},{"title":"Heat (1995)"}]}]"#;
        let mut cursor = Cursor::new(test_string);
        let expected_result = vec![
            IntermediateInputKV::new(
                1,
                vec![
                    TaggedValue::Rating(4.0),
                    TaggedValue::Title("Heat (1995)".to_owned()),
                ],
            ),
        ];

        let result: Vec<IntermediateInputKV<i32, TaggedValue>> =
            read_reduce_input(&mut cursor).unwrap();

        assert_eq!(expected_result, result);
    }

    #[test]
    #[should_panic]
    fn read_invalid_reduce_input() {
        let test_string = "";
        let mut cursor = Cursor::new(test_string);

        let _: Vec<IntermediateInputKV<i32, f64>> = read_reduce_input(&mut cursor).unwrap();
    }

    #[test]
    fn write_reduce_output_as_json_array() {
        let mut sink: Vec<u8> = Vec::new();
        let output = vec![
            FinalOutputObject {
                key: 9,
                values: Vec::<f64>::new(),
            },
        ];

        write_reduce_output(&mut sink, &output).unwrap();

        assert_eq!(r#"[{"key":9,"values":[]}]"#, String::from_utf8(sink).unwrap());
    }
}
