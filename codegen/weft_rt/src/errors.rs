use thiserror::Error;

/// Runtime errors raised while parsing or executing codec programs.
///
/// Deliberately narrow: unknown wire fields are handled by the generated
/// `default skip` branch and never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("parse error at line {line}: {detail}")]
    Parse { line: usize, detail: String },

    #[error("unknown procedure `{0}`")]
    UnknownProcedure(String),

    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),

    #[error("variable `{0}` is not bound")]
    MissingVariable(String),

    #[error("{op}: {detail}")]
    Mismatch { op: String, detail: String },

    #[error("shape `{shape}`: unknown union variant tag `{tag}`")]
    UnknownUnionVariant { shape: String, tag: String },
}

impl RuntimeError {
    pub(crate) fn mismatch(op: &str, detail: impl Into<String>) -> Self {
        Self::Mismatch {
            op: op.to_owned(),
            detail: detail.into(),
        }
    }
}
