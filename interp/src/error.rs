use crate::{lexer::SyntaxError, object::ObjectValueError, object::Name, resources::ResourceKind};

/// Errors reported while interpreting content streams.
///
/// Fatal errors abort the innermost running stream, the caller one level up
/// logs them and continues. Others skip the current operator only.
#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("stack overflow in content stream")]
    StackOverflow,
    #[error("aborting potentially infinite recursion")]
    RecursionLimit,
    #[error("syntax error in content stream: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("cannot run null content stream")]
    NullContent,

    #[error("cannot find {kind} resource '{name}'")]
    ResourceNotFound { kind: ResourceKind, name: Name },
    #[error("cannot find {0} resource dictionary")]
    MissingResourceDict(ResourceKind),
    #[error("color incompatible with material")]
    ColorIncompatible,
    #[error("cannot set color in mask objects")]
    NoColorInMask,
    #[error("cannot set color in shade objects")]
    NoColorInShading,
    #[error("unknown pattern type: {0}")]
    UnknownPatternType(i32),
    #[error("unknown XObject subtype: {0}")]
    UnknownXObjectSubtype(Name),
    #[error("no XObject subtype specified")]
    MissingXObjectSubtype,
    #[error("cannot draw text since font and size not set")]
    FontNotSet,
    #[error("malformed ExtGState dictionary")]
    MalformedExtGState,
    #[error(transparent)]
    ObjectValue(#[from] ObjectValueError),
    #[error(transparent)]
    Load(#[from] anyhow::Error),
}

impl InterpretError {
    /// Return true if the error aborts the running content stream.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StackOverflow | Self::RecursionLimit | Self::Syntax(_) | Self::NullContent
        )
    }
}

pub type InterpretResult<T> = Result<T, InterpretError>;
