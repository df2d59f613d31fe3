use crate::commands::command_error::CommandError;
use crate::commands::stream_utils::encode_stream_entries;
use crate::resp::RespValue;
use crate::store::{Keyspace, StreamId};

pub struct XrangeArguments {
    key: String,
    start: StreamId,
    end: StreamId,
}

impl XrangeArguments {
    /// Parses `XRANGE key start end`. `-` is the lowest possible ID and `+`
    /// the highest; bounds missing a sequence part cover the whole
    /// millisecond.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::WrongNumberOfArguments("xrange"));
        }

        Ok(Self {
            key: arguments[0].clone(),
            start: StreamId::parse_range_start(&arguments[1])?,
            end: StreamId::parse_range_end(&arguments[2])?,
        })
    }
}

pub async fn xrange(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let xrange_arguments = XrangeArguments::parse(arguments)?;

    let entries = keyspace
        .xrange(
            &xrange_arguments.key,
            xrange_arguments.start,
            xrange_arguments.end,
        )
        .await;

    Ok(encode_stream_entries(&entries))
}
