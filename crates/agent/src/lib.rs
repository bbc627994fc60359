//! The Tensive conversation orchestrator.
//!
//! One user turn flows through:
//!
//! 1. **Retrieve**: rank the knowledge store against the utterance and
//!    render the see-also list plus any strongly matching entry
//! 2. **Record**: append the user turn to the session's bounded history
//! 3. **Ask**: send system framing, context and history to the model with
//!    the tool schemas, exactly once
//! 4. **Dispatch**: act on the first tool call, if any, through the
//!    deterministic tools
//! 5. **Normalize**: return a [`NormalizedResponse`] for the renderer
//!
//! Failures in steps 3 and 4 never reach the caller; they become fixed
//! text responses.

pub mod context;
pub mod footer;
pub mod orchestrator;
pub mod prompt;
pub mod reply;
pub mod response;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use footer::{FooterTag, TaggedText};
pub use orchestrator::{ChatSession, Orchestrator};
pub use reply::{ModelReply, Utterance};
pub use response::{ChoiceOption, NormalizedResponse};
pub use session::{Mode, SessionState};
