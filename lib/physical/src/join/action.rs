use rdf_federation_common::{BindingsStream, MetadataAccessor};
use std::fmt::{Debug, Display, Formatter};

/// The logical type of a join.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    /// Left outer join (`OPTIONAL`).
    Optional,
    Minus,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "inner",
            JoinType::Optional => "optional",
            JoinType::Minus => "minus",
        })
    }
}

/// An input of a join: a bindings stream together with its metadata.
pub struct JoinEntry {
    pub stream: BindingsStream,
    pub metadata: MetadataAccessor,
}

impl JoinEntry {
    /// Creates a new [JoinEntry].
    pub fn new(stream: BindingsStream, metadata: MetadataAccessor) -> Self {
        Self { stream, metadata }
    }
}

impl Debug for JoinEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinEntry")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// A request for joining the streams of all `entries`.
#[derive(Debug)]
pub struct JoinAction {
    pub join_type: JoinType,
    pub entries: Vec<JoinEntry>,
}

impl JoinAction {
    /// Creates a new [JoinAction].
    pub fn new(join_type: JoinType, entries: Vec<JoinEntry>) -> Self {
        Self { join_type, entries }
    }

    /// Creates a new inner [JoinAction].
    pub fn inner(entries: Vec<JoinEntry>) -> Self {
        Self::new(JoinType::Inner, entries)
    }

    /// Returns the part of the action that is needed for testing join actors.
    pub fn metadata(&self) -> JoinActionMetadata {
        JoinActionMetadata {
            join_type: self.join_type,
            entries: self
                .entries
                .iter()
                .map(|entry| entry.metadata.clone())
                .collect(),
        }
    }
}

/// The join type and the entry metadata of a [JoinAction].
///
/// Unlike the action, it can be shared between threads as it does not contain any streams.
#[derive(Debug, Clone)]
pub struct JoinActionMetadata {
    pub join_type: JoinType,
    pub entries: Vec<MetadataAccessor>,
}

/// The result of a join.
pub struct JoinOutput {
    pub stream: BindingsStream,
    pub metadata: MetadataAccessor,
}

impl Debug for JoinOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinOutput")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
