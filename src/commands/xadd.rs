use std::collections::BTreeMap;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::{IdSpec, Keyspace};

pub struct XaddArguments {
    key: String,
    spec: IdSpec,
    fields: BTreeMap<String, String>,
}

impl XaddArguments {
    /// Parses `XADD key id field value [field value ...]`. The id may be an
    /// explicit `ms-seq`, `ms-*` for an auto sequence, or `*` for a fully
    /// auto-generated ID.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 4 || (arguments.len() - 2) % 2 != 0 {
            return Err(CommandError::WrongNumberOfArguments("xadd"));
        }

        let spec = IdSpec::parse(&arguments[1])?;
        let mut fields = BTreeMap::new();

        for pair in arguments[2..].chunks(2) {
            fields.insert(pair[0].clone(), pair[1].clone());
        }

        Ok(Self {
            key: arguments[0].clone(),
            spec,
            fields,
        })
    }
}

/// Handles XADD. The resolved entry ID must be strictly greater than the
/// stream's current top item; the reply is the resolved ID as a bulk string.
pub async fn xadd(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;

    let id = keyspace
        .xadd(
            &xadd_arguments.key,
            xadd_arguments.spec,
            xadd_arguments.fields,
        )
        .await?;

    Ok(RespValue::BulkString(id.to_string()))
}
