//! Genes as they enter and leave an enrichment analysis
//!
//! All gene identifiers are eventually translated into a canonical, numeric
//! [`GeneId`]. Input lists are made up of [`GeneInput`] items, which are either
//! - a canonical [`GeneId`],
//! - a richer object implementing [`HasGeneId`] (e.g. an [`ExpressedGene`]),
//!   which is preserved in the results, or
//! - a raw identifier string of some [`IdentifierType`] that must be translated first.
//!
//! The genes that an enrichment class contains are reported as [`Member`]s.

mod gene;
mod identifier;
mod input;

pub use gene::{ExpressedGene, GeneId};
pub use identifier::{IdentifierType, Species};
pub use input::{GeneInput, HasGeneId, Member};
