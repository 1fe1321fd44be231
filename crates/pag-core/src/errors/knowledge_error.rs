/// Background-knowledge errors.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("edge {from} --> {to} is both required and forbidden")]
    Contradiction { from: String, to: String },

    #[error("knowledge edge {name} --> {name} references a single variable")]
    SelfReference { name: String },

    #[error("invalid tier {tier}: {reason}")]
    InvalidTier { tier: usize, reason: String },
}
