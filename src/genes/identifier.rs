use std::fmt::Display;

use crate::{IntegratorError, IntegratorResult};

/// The kinds of gene identifiers that can be translated into [`GeneId`](crate::GeneId)s
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdentifierType {
    /// NCBI Entrez Gene ID, the canonical identifier
    NcbiGeneId,
    /// Official gene symbol, e.g. `TP53`
    GeneSymbol,
    /// RefSeq accession, e.g. `NM_000546`
    RefSeq,
    /// Ensembl gene id, e.g. `ENSG00000141510`
    Ensembl,
    /// Affymetrix probe set id
    Affymetrix,
    /// KEGG genes identifier, e.g. `hsa:7157`
    KeggGenes,
    /// UniProt accession
    UniProt,
}

impl IdentifierType {
    /// Identifiers of this type are canonical gene ids and need no translation
    pub fn is_canonical(&self) -> bool {
        matches!(self, IdentifierType::NcbiGeneId)
    }
}

impl Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IdentifierType::NcbiGeneId => "NCBI Gene ID",
            IdentifierType::GeneSymbol => "Gene symbol",
            IdentifierType::RefSeq => "RefSeq ID",
            IdentifierType::Ensembl => "Ensembl ID",
            IdentifierType::Affymetrix => "Affymetrix probe ID",
            IdentifierType::KeggGenes => "KEGG genes ID",
            IdentifierType::UniProt => "UniProt ID",
        };
        write!(f, "{name}")
    }
}

impl TryFrom<&str> for IdentifierType {
    type Error = IntegratorError;
    fn try_from(value: &str) -> IntegratorResult<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "ncbigeneid" | "entrez" | "entrezgeneid" | "geneid" => Ok(IdentifierType::NcbiGeneId),
            "genesymbol" | "symbol" => Ok(IdentifierType::GeneSymbol),
            "refseq" | "refseqid" => Ok(IdentifierType::RefSeq),
            "ensembl" | "ensemblid" | "ensemblgeneid" => Ok(IdentifierType::Ensembl),
            "affymetrix" | "affymetrixprobeid" | "probeid" => Ok(IdentifierType::Affymetrix),
            "kegg" | "kegggenes" | "kegggenesid" => Ok(IdentifierType::KeggGenes),
            "uniprot" | "uniprotid" => Ok(IdentifierType::UniProt),
            _ => Err(IntegratorError::InvalidIdentifierType(value.to_string())),
        }
    }
}

/// An organism that mappings are built for
///
/// Mappings of genes, enrichment classes and identifiers only fit together
/// if they are built for the same `Species`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Species {
    name: String,
    kegg_abbr: String,
    ncbi_tax_id: u32,
}

impl Species {
    /// Creates a new `Species`
    pub fn new(name: &str, kegg_abbr: &str, ncbi_tax_id: u32) -> Self {
        Self {
            name: name.to_string(),
            kegg_abbr: kegg_abbr.to_string(),
            ncbi_tax_id,
        }
    }

    /// Homo sapiens
    pub fn human() -> Self {
        Self::new("Homo sapiens", "hsa", 9606)
    }

    /// Mus musculus
    pub fn mouse() -> Self {
        Self::new("Mus musculus", "mmu", 10090)
    }

    /// Rattus norvegicus
    pub fn rat() -> Self {
        Self::new("Rattus norvegicus", "rno", 10116)
    }

    /// The scientific name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The three letter KEGG organism code
    pub fn kegg_abbr(&self) -> &str {
        &self.kegg_abbr
    }

    /// The NCBI taxonomy id
    pub fn ncbi_tax_id(&self) -> u32 {
        self.ncbi_tax_id
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
