//! One module per verb group (spec §6's CLI surface section).

pub mod archive;
pub mod artifact;
pub mod assign;
pub mod comment;
pub mod create;
pub mod doctor;
pub mod emit;
pub mod init;
pub mod link;
pub mod next;
pub mod rebuild;
pub mod show;
pub mod status;
pub mod update;

use lattice_engine::CallOptions;

/// Shared provenance/actor flags every mutating verb accepts (spec §6).
#[derive(clap::Args, Debug, Clone)]
pub struct CommonOpts {
    /// Acting identity, e.g. `human:alice` (falls back to LATTICE_ACTOR, then config.default_actor)
    #[arg(long)]
    pub actor: Option<String>,

    /// Caller-supplied idempotency id; retrying the same verb with the same id and payload is a no-op
    #[arg(long = "idempotency-id")]
    pub idempotency_id: Option<String>,

    /// Who/what triggered this call, for provenance
    #[arg(long = "triggered-by")]
    pub triggered_by: Option<String>,

    /// Identity this call is being made on behalf of, for provenance
    #[arg(long = "on-behalf-of")]
    pub on_behalf_of: Option<String>,

    /// Required alongside --force; also recorded as provenance on non-forced calls
    #[arg(long)]
    pub reason: Option<String>,
}

impl From<CommonOpts> for CallOptions {
    fn from(opts: CommonOpts) -> Self {
        CallOptions {
            idempotency_id: opts.idempotency_id,
            actor: opts.actor,
            triggered_by: opts.triggered_by,
            on_behalf_of: opts.on_behalf_of,
            reason: opts.reason,
            telemetry: None,
        }
    }
}
