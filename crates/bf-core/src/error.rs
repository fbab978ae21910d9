use thiserror::Error;

pub type BfResult<T> = Result<T, BfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = BfError::IndexOob {
            what: "pin",
            index: 7,
            len: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("pin"), "unexpected message: {msg}");
        assert!(msg.contains("index=7"));
    }
}
