//! `lattice comment add|edit|delete` — spec §4's comment verbs.

use clap::{Args, Subcommand};
use lattice_engine::TaskService;

use crate::commands::CommonOpts;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub command: CommentCommand,
}

#[derive(Subcommand, Debug)]
pub enum CommentCommand {
    /// Add a comment, optionally bearing a completion-policy role
    Add {
        /// Task ULID or short-ID alias
        id: String,
        /// Comment body
        body: String,
        /// Role this comment satisfies, e.g. `review`
        #[arg(long)]
        role: Option<String>,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Edit an existing comment's body
    Edit {
        /// Task ULID or short-ID alias
        id: String,
        /// Comment id
        comment_id: String,
        /// New body
        body: String,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Soft-delete a comment
    Delete {
        /// Task ULID or short-ID alias
        id: String,
        /// Comment id
        comment_id: String,
        #[command(flatten)]
        common: CommonOpts,
    },
}

pub fn run(service: &TaskService, args: CommentArgs, format: OutputFormat) -> i32 {
    let result = (|| match args.command {
        CommentCommand::Add { id, body, role, common } => {
            let config = service.config()?;
            let id = service.resolve_id(&config, &id)?;
            service.comment_add(&id, body, role, common.into())
        }
        CommentCommand::Edit {
            id,
            comment_id,
            body,
            common,
        } => {
            let config = service.config()?;
            let id = service.resolve_id(&config, &id)?;
            service.comment_edit(&id, &comment_id, body, common.into())
        }
        CommentCommand::Delete { id, comment_id, common } => {
            let config = service.config()?;
            let id = service.resolve_id(&config, &id)?;
            service.comment_delete(&id, &comment_id, common.into())
        }
    })();

    crate::output::render(format, result, crate::fmt::print_task_detail)
}
