//! Error types for descriptor definition and value conversion.
//!
//! The two classes never mix. A [`DefinitionError`] is a schema-authoring bug:
//! it is raised immediately and aborts the operation. A
//! [`ConversionFailure`] is caused by data: failures are collected across
//! every sibling field and element and reported together in
//! [`ConvertError::Failed`].

use std::fmt;

use thiserror::Error;

/// Schema-authoring errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// An option key that the descriptor kind does not recognize.
    #[error("unrecognized option `{option}` for {kind}")]
    UnknownOption { kind: String, option: String },
    /// A recognized option with a value of the wrong shape.
    #[error("option `{option}` for {kind} must be {expected}")]
    InvalidOption {
        kind: String,
        option: String,
        expected: &'static str,
    },
    /// A kind that needs an option (e.g. `items` for arrays) was given none.
    #[error("{kind} requires option `{option}`")]
    MissingOption { kind: String, option: String },
    /// A definition with an unknown `type`.
    #[error("unknown descriptor type: {0}")]
    UnknownKind(String),
    /// A definition with neither `type` nor `ref`.
    #[error("descriptor definition must declare `type` or `ref`")]
    MissingKind,
    /// A definition that is not a JSON object.
    #[error("descriptor definition must be an object")]
    NotAnObject,
    /// A reference to a provider name that is not registered.
    #[error("schema provider not registered: {0}")]
    UnknownProvider(String),
    /// A provider refused to resolve with the given options.
    #[error("schema provider `{provider}` rejected its options: {reason}")]
    ProviderRejected { provider: String, reason: String },
}

/// One step of a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// Position of a value inside the converted input.
///
/// Displayed as an RFC 6901 JSON pointer; the root is the empty pointer.
///
/// # Examples
///
/// ```
/// use jsonshape_core::Location;
///
/// let location = Location::root().field("items").index(2).field("a/b");
/// assert_eq!(location.to_string(), "/items/2/a~1b");
/// assert_eq!(Location::root().to_string(), "");
/// assert_eq!(Location::root().field("").to_string(), "/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location(Vec<Segment>);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns the location of a field below this one.
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(name.to_string()));
        Self(segments)
    }

    /// Returns the location of an array element below this one.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                Segment::Field(name) => {
                    write!(f, "/{}", name.replace('~', "~0").replace('/', "~1"))?
                }
                Segment::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}

/// A single data-driven conversion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionFailure {
    /// The mapping at `location` holds a key it does not declare.
    #[error("{location}: unknown field `{field}`")]
    UnknownField { location: Location, field: String },
    /// A mapping descriptor met a non-object value.
    #[error("{location}: expected an object, found {found}")]
    ExpectedMapping {
        location: Location,
        found: &'static str,
    },
    /// An array descriptor met a non-array value.
    #[error("{location}: expected an array, found {found}")]
    ExpectedArray {
        location: Location,
        found: &'static str,
    },
    /// A schema provider refused the value.
    #[error("{location}: {provider}: {reason}")]
    Provider {
        location: Location,
        provider: String,
        reason: String,
    },
}

impl ConversionFailure {
    /// Returns where in the input the failure occurred.
    pub fn location(&self) -> &Location {
        match self {
            ConversionFailure::UnknownField { location, .. }
            | ConversionFailure::ExpectedMapping { location, .. }
            | ConversionFailure::ExpectedArray { location, .. }
            | ConversionFailure::Provider { location, .. } => location,
        }
    }
}

/// Error returned by [`convert`](crate::convert).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The descriptor itself is broken; no value is produced.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// Every failure found in the input, in iteration order.
    #[error("conversion failed with {} error(s)", .0.len())]
    Failed(Vec<ConversionFailure>),
}

impl ConvertError {
    /// Returns the collected conversion failures (empty for definition errors).
    pub fn failures(&self) -> &[ConversionFailure] {
        match self {
            ConvertError::Definition(_) => &[],
            ConvertError::Failed(failures) => failures,
        }
    }
}
