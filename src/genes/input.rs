use std::rc::Rc;
use std::sync::Arc;

use crate::genes::GeneId;

/// Adapter for gene objects that carry a canonical [`GeneId`]
///
/// Implement this trait once for every gene type that should be used
/// as [`GeneInput::Bundle`]. The enrichment analysis only relies on this
/// trait and never on the concrete type.
pub trait HasGeneId {
    /// Returns the canonical gene id, or `None` if the object has no gene assigned
    fn gene_id(&self) -> Option<GeneId>;
}

impl<T: HasGeneId> HasGeneId for Rc<T> {
    fn gene_id(&self) -> Option<GeneId> {
        self.as_ref().gene_id()
    }
}

impl<T: HasGeneId> HasGeneId for Arc<T> {
    fn gene_id(&self) -> Option<GeneId> {
        self.as_ref().gene_id()
    }
}

/// A single item of an input gene list
///
/// # Examples
///
/// ```
/// use integrator::{ExpressedGene, GeneId, GeneInput};
///
/// let genes: Vec<GeneInput<ExpressedGene>> = vec![
///     GeneInput::from(GeneId::from(7157)),
///     GeneInput::from("TP53"),
///     GeneInput::Bundle(ExpressedGene::new(GeneId::from(672), "BRCA1", -1.5)),
/// ];
/// assert!(matches!(genes[1], GeneInput::Identifier(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeneInput<T> {
    /// A canonical gene id
    Gene(GeneId),
    /// An object with a gene id and further data that should be kept in the results
    Bundle(T),
    /// A raw identifier that must be mapped to a gene id
    Identifier(String),
}

impl<T> From<GeneId> for GeneInput<T> {
    fn from(id: GeneId) -> Self {
        GeneInput::Gene(id)
    }
}

impl<T> From<&str> for GeneInput<T> {
    fn from(identifier: &str) -> Self {
        GeneInput::Identifier(identifier.to_string())
    }
}

impl<T> From<String> for GeneInput<T> {
    fn from(identifier: String) -> Self {
        GeneInput::Identifier(identifier)
    }
}

/// A gene of the input list that is part of an enrichment class
///
/// If the gene was submitted as a [`GeneInput::Bundle`], the bundle is kept,
/// otherwise only the [`GeneId`] is reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member<T> {
    /// A bare gene id
    Gene(GeneId),
    /// The original object from the input list
    Bundle(T),
}

impl<T: HasGeneId> Member<T> {
    /// The canonical gene id of the member
    pub fn gene_id(&self) -> Option<GeneId> {
        match self {
            Member::Gene(id) => Some(*id),
            Member::Bundle(item) => item.gene_id(),
        }
    }
}

impl<T> Member<T> {
    /// Returns the bundled object, if any
    pub fn bundle(&self) -> Option<&T> {
        match self {
            Member::Gene(_) => None,
            Member::Bundle(item) => Some(item),
        }
    }

    /// Returns `true` if the member keeps an object from the input list
    pub fn is_bundle(&self) -> bool {
        matches!(self, Member::Bundle(_))
    }
}
