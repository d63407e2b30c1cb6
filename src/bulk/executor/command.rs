use bson;

use coll::Collection;
use common::WriteConcern;
use Error::CommandError;
use Result;

use bulk::batch::Batch;
use bulk::results::BatchResult;
use bulk::translate::{integer, truthy};
use super::BatchExecutor;

/// Sends each batch as one insert, update or delete write command.
pub struct CommandExecutor;

impl BatchExecutor for CommandExecutor {
    fn name(&self) -> &'static str {
        "command"
    }

    fn execute(&self,
               collection: &dyn Collection,
               batch: &Batch,
               ordered: bool,
               write_concern: &WriteConcern)
               -> Result<BatchResult> {

        let documents = batch.operations()
            .iter()
            .map(|operation| bson::Document::from(operation.clone()))
            .collect();

        let reply = collection.run_write_command(batch.write_type(),
                                                 documents,
                                                 ordered,
                                                 write_concern)?;

        // The command itself failed; no operation of the batch was attempted.
        if !truthy(reply.get("ok")) {
            let code = integer(reply.get("code")).unwrap_or(0) as i32;
            let message = reply.get_str("errmsg").unwrap_or("Unknown error executing command");
            return Err(CommandError(code, message.to_owned()));
        }

        BatchResult::from_command_reply(batch, &reply)
    }
}
