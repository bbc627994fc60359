//! Knowledge store and retrieval scoring for Tensive.
//!
//! The store is a static, ordered list of repair topics loaded once at
//! startup. The scorer ranks every topic against a user utterance with a
//! deterministic keyword heuristic, and the policy decides how much of the
//! ranking reaches the prompt and the caller.

pub mod policy;
pub mod scorer;
pub mod store;

pub use policy::{Grounding, Retrieval, RetrievalPolicy};
pub use scorer::{ScoredMatch, score, score_entry};
pub use store::KnowledgeStore;
