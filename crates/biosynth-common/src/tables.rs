//! Static lookup tables: codon usage, genomic hotspots, fallback off-target
//! sites, insertion loci, and trait → gene associations.
//!
//! Organism-specific data is reached through `impl Organism`, one exhaustive
//! `match` per table.

use crate::entities::Impact;
use crate::organism::Organism;

// ── Codon usage ───────────────────────────────────────────────────────────────

/// Relative codon frequencies for one amino acid (one-letter code, `*` = stop).
#[derive(Debug)]
pub struct CodonUsage {
    pub amino_acid: char,
    pub codons: &'static [(&'static str, f64)],
}

/// Per-organism codon table: organism-specific rows shadow the base rows.
#[derive(Debug, Clone, Copy)]
pub struct CodonTable {
    pub overrides: &'static [CodonUsage],
    pub base: &'static [CodonUsage],
}

impl CodonTable {
    pub fn lookup(&self, amino_acid: char) -> Option<&'static [(&'static str, f64)]> {
        self.overrides
            .iter()
            .chain(self.base.iter())
            .find(|u| u.amino_acid == amino_acid)
            .map(|u| u.codons)
    }

    /// Most frequent codon for `amino_acid`. Ties resolve to the codon listed first.
    pub fn preferred_codon(&self, amino_acid: char) -> Option<&'static str> {
        let codons = self.lookup(amino_acid)?;
        let mut best: Option<(&'static str, f64)> = None;
        for &(codon, freq) in codons {
            match best {
                Some((_, f)) if freq <= f => {}
                _ => best = Some((codon, freq)),
            }
        }
        best.map(|(c, _)| c)
    }
}

const HUMAN_CODON_USAGE: &[CodonUsage] = &[
    CodonUsage { amino_acid: 'A', codons: &[("GCT", 0.26), ("GCC", 0.40), ("GCA", 0.23), ("GCG", 0.11)] },
    CodonUsage { amino_acid: 'R', codons: &[("CGT", 0.08), ("CGC", 0.19), ("CGA", 0.11), ("CGG", 0.21), ("AGA", 0.20), ("AGG", 0.20)] },
    CodonUsage { amino_acid: 'N', codons: &[("AAT", 0.46), ("AAC", 0.54)] },
    CodonUsage { amino_acid: 'D', codons: &[("GAT", 0.46), ("GAC", 0.54)] },
    CodonUsage { amino_acid: 'C', codons: &[("TGT", 0.45), ("TGC", 0.55)] },
    CodonUsage { amino_acid: 'Q', codons: &[("CAA", 0.25), ("CAG", 0.75)] },
    CodonUsage { amino_acid: 'E', codons: &[("GAA", 0.42), ("GAG", 0.58)] },
    CodonUsage { amino_acid: 'G', codons: &[("GGT", 0.16), ("GGC", 0.34), ("GGA", 0.25), ("GGG", 0.25)] },
    CodonUsage { amino_acid: 'H', codons: &[("CAT", 0.41), ("CAC", 0.59)] },
    CodonUsage { amino_acid: 'I', codons: &[("ATT", 0.36), ("ATC", 0.48), ("ATA", 0.16)] },
    CodonUsage { amino_acid: 'L', codons: &[("TTA", 0.07), ("TTG", 0.13), ("CTT", 0.13), ("CTC", 0.20), ("CTA", 0.07), ("CTG", 0.41)] },
    CodonUsage { amino_acid: 'K', codons: &[("AAA", 0.42), ("AAG", 0.58)] },
    CodonUsage { amino_acid: 'M', codons: &[("ATG", 1.00)] },
    CodonUsage { amino_acid: 'F', codons: &[("TTT", 0.45), ("TTC", 0.55)] },
    CodonUsage { amino_acid: 'P', codons: &[("CCT", 0.28), ("CCC", 0.33), ("CCA", 0.27), ("CCG", 0.11)] },
    CodonUsage { amino_acid: 'S', codons: &[("TCT", 0.18), ("TCC", 0.22), ("TCA", 0.15), ("TCG", 0.06), ("AGT", 0.15), ("AGC", 0.24)] },
    CodonUsage { amino_acid: 'T', codons: &[("ACT", 0.24), ("ACC", 0.36), ("ACA", 0.28), ("ACG", 0.12)] },
    CodonUsage { amino_acid: 'W', codons: &[("TGG", 1.00)] },
    CodonUsage { amino_acid: 'Y', codons: &[("TAT", 0.43), ("TAC", 0.57)] },
    CodonUsage { amino_acid: 'V', codons: &[("GTT", 0.18), ("GTC", 0.24), ("GTA", 0.11), ("GTG", 0.47)] },
    CodonUsage { amino_acid: '*', codons: &[("TAA", 0.28), ("TAG", 0.20), ("TGA", 0.52)] },
];

const MOUSE_CODON_OVERRIDES: &[CodonUsage] = &[
    CodonUsage { amino_acid: 'A', codons: &[("GCT", 0.27), ("GCC", 0.41), ("GCA", 0.21), ("GCG", 0.11)] },
    CodonUsage { amino_acid: 'R', codons: &[("CGT", 0.09), ("CGC", 0.18), ("CGA", 0.10), ("CGG", 0.22), ("AGA", 0.21), ("AGG", 0.20)] },
    CodonUsage { amino_acid: 'L', codons: &[("TTA", 0.08), ("TTG", 0.14), ("CTT", 0.12), ("CTC", 0.19), ("CTA", 0.06), ("CTG", 0.42)] },
];

const ECOLI_CODON_OVERRIDES: &[CodonUsage] = &[
    CodonUsage { amino_acid: 'A', codons: &[("GCT", 0.18), ("GCC", 0.26), ("GCA", 0.21), ("GCG", 0.35)] },
    CodonUsage { amino_acid: 'R', codons: &[("CGT", 0.36), ("CGC", 0.36), ("CGA", 0.07), ("CGG", 0.11), ("AGA", 0.07), ("AGG", 0.04)] },
    CodonUsage { amino_acid: 'L', codons: &[("TTA", 0.14), ("TTG", 0.13), ("CTT", 0.12), ("CTC", 0.10), ("CTA", 0.04), ("CTG", 0.47)] },
];

// ── Genomic hotspots ─────────────────────────────────────────────────────────

/// Genomic context of a hotspot region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionContext {
    GeneCluster,
    RegulatoryRegion,
    Intergenic,
    HlaComplex,
    Lrp5Locus,
    Brca1Region,
    Aavs1SafeHarbor,
    F8Locus,
    EssentialGenes,
    MetabolicCluster,
}

impl RegionContext {
    /// Context-dependent prior that an arbitrary guide cross-reacts here.
    pub fn base_similarity(self) -> f64 {
        match self {
            RegionContext::GeneCluster => 0.75,
            RegionContext::RegulatoryRegion => 0.65,
            RegionContext::HlaComplex => 0.80,
            RegionContext::Brca1Region => 0.70,
            RegionContext::EssentialGenes => 0.85,
            RegionContext::MetabolicCluster => 0.60,
            RegionContext::Intergenic => 0.45,
            RegionContext::Aavs1SafeHarbor => 0.30,
            RegionContext::Lrp5Locus => 0.55,
            RegionContext::F8Locus => 0.60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RegionContext::GeneCluster => "gene_cluster",
            RegionContext::RegulatoryRegion => "regulatory_region",
            RegionContext::Intergenic => "intergenic",
            RegionContext::HlaComplex => "HLA_complex",
            RegionContext::Lrp5Locus => "LRP5_locus",
            RegionContext::Brca1Region => "BRCA1_region",
            RegionContext::Aavs1SafeHarbor => "AAVS1_safe_harbor",
            RegionContext::F8Locus => "F8_locus",
            RegionContext::EssentialGenes => "essential_genes",
            RegionContext::MetabolicCluster => "metabolic_cluster",
        }
    }
}

/// Expected GC% of sequences that bind in a region of the given risk tier.
pub fn expected_gc(tier: Impact) -> f64 {
    match tier {
        Impact::High => 60.0,
        Impact::Medium => 45.0,
        Impact::Low => 40.0,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HotspotRegion {
    pub chromosome: &'static str,
    pub start: u64,
    pub end: u64,
    pub context: RegionContext,
    pub tier: Impact,
}

const fn region(chromosome: &'static str, start: u64, end: u64, context: RegionContext, tier: Impact) -> HotspotRegion {
    HotspotRegion { chromosome, start, end, context, tier }
}

const HUMAN_HOTSPOTS: &[HotspotRegion] = &[
    region("Chr1", 1_000_000, 5_000_000, RegionContext::GeneCluster, Impact::High),
    region("Chr2", 10_000_000, 15_000_000, RegionContext::RegulatoryRegion, Impact::Medium),
    region("Chr3", 20_000_000, 25_000_000, RegionContext::Intergenic, Impact::Low),
    region("Chr6", 28_000_000, 33_000_000, RegionContext::HlaComplex, Impact::High),
    region("Chr11", 68_000_000, 69_000_000, RegionContext::Lrp5Locus, Impact::Medium),
    region("Chr17", 43_000_000, 44_000_000, RegionContext::Brca1Region, Impact::High),
    region("Chr19", 55_115_756, 55_115_856, RegionContext::Aavs1SafeHarbor, Impact::Low),
    region("ChrX", 153_000_000, 154_000_000, RegionContext::F8Locus, Impact::Medium),
];

const MOUSE_HOTSPOTS: &[HotspotRegion] = &[
    region("Chr1", 3_000_000, 8_000_000, RegionContext::GeneCluster, Impact::High),
    region("Chr2", 12_000_000, 17_000_000, RegionContext::RegulatoryRegion, Impact::Medium),
    region("Chr7", 45_000_000, 50_000_000, RegionContext::Intergenic, Impact::Low),
];

const ECOLI_HOTSPOTS: &[HotspotRegion] = &[
    region("Chromosome", 100_000, 200_000, RegionContext::EssentialGenes, Impact::High),
    region("Chromosome", 500_000, 600_000, RegionContext::MetabolicCluster, Impact::Medium),
    region("Chromosome", 1_000_000, 1_100_000, RegionContext::Intergenic, Impact::Low),
];

// ── Minimal fallback sites ───────────────────────────────────────────────────

/// Real-coordinate site used when the full off-target model cannot run.
#[derive(Debug, Clone, Copy)]
pub struct FallbackSite {
    pub chromosome: &'static str,
    pub position: u64,
    pub context: &'static str,
    pub tier: Impact,
}

const HUMAN_FALLBACK_SITES: &[FallbackSite] = &[
    FallbackSite { chromosome: "Chr19", position: 55_115_756, context: "AAVS1_safe_harbor", tier: Impact::Low },
    FallbackSite { chromosome: "Chr11", position: 68_200_000, context: "LRP5_region", tier: Impact::Medium },
];

const MOUSE_FALLBACK_SITES: &[FallbackSite] = &[
    FallbackSite { chromosome: "Chr7", position: 45_000_000, context: "Rosa26_locus", tier: Impact::Low },
    FallbackSite { chromosome: "Chr2", position: 12_500_000, context: "regulatory_region", tier: Impact::Medium },
];

const ECOLI_FALLBACK_SITES: &[FallbackSite] = &[
    FallbackSite { chromosome: "Chromosome", position: 500_000, context: "lac_operon_region", tier: Impact::Low },
    FallbackSite { chromosome: "Chromosome", position: 1_200_000, context: "essential_region", tier: Impact::High },
];

// ── Insertion loci ───────────────────────────────────────────────────────────

/// Named genomic locus, e.g. `("AAVS1", "Chr19:55115756")`.
pub type NamedLocus = (&'static str, &'static str);

const HUMAN_SAFE_HARBORS: &[NamedLocus] = &[
    ("AAVS1", "Chr19:55115756"),
    ("CCR5", "Chr3:46414943"),
    ("ROSA26", "Chr6:113072530"),
    ("HPRT1", "ChrX:134460000"),
];

const MOUSE_SAFE_HARBORS: &[NamedLocus] = &[
    ("Rosa26", "Chr6:113012944"),
    ("H11", "Chr11:95397000"),
    ("Hprt", "ChrX:53269000"),
];

const RAT_SAFE_HARBORS: &[NamedLocus] = &[
    ("Rosa26", "Chr1:220500000"),
    ("Hprt1", "ChrX:137000000"),
];

const ECOLI_SAFE_HARBORS: &[NamedLocus] = &[
    ("attB", "Position:4361000"),
    ("lacZ", "Position:365000"),
];

const HUMAN_GENE_LOCI: &[NamedLocus] = &[
    ("LRP5", "Chr11:68200000"),
    ("COL1A1", "Chr17:50190000"),
    ("MYOSTATIN", "Chr2:190430000"),
    ("EPO", "Chr7:100720000"),
    ("VEGF", "Chr6:43737000"),
    ("INSULIN", "Chr11:2160000"),
    ("DYSTROPHIN", "ChrX:31200000"),
    ("CFTR", "Chr7:117120000"),
    ("TP53", "Chr17:7670000"),
    ("BRCA1", "Chr17:43044000"),
];

const MOUSE_GENE_LOCI: &[NamedLocus] = &[
    ("Lrp5", "Chr19:3400000"),
    ("Col1a1", "Chr11:94940000"),
    ("Mstn", "Chr1:53060000"),
];

/// Used when a host has neither a gene-specific nor a safe-harbor locus.
pub const GENERIC_INSERTION_LOCUS: &str = "Chr1:100000000";

// ── Organism accessors ───────────────────────────────────────────────────────

impl Organism {
    /// Rat shares the mouse table; zebrafish and fruitfly use the human base table.
    pub fn codon_table(self) -> CodonTable {
        match self {
            Organism::Human | Organism::Zebrafish | Organism::Fruitfly => {
                CodonTable { overrides: &[], base: HUMAN_CODON_USAGE }
            }
            Organism::Mouse | Organism::Rat => {
                CodonTable { overrides: MOUSE_CODON_OVERRIDES, base: HUMAN_CODON_USAGE }
            }
            Organism::EColi => CodonTable { overrides: ECOLI_CODON_OVERRIDES, base: HUMAN_CODON_USAGE },
        }
    }

    pub fn hotspots(self) -> &'static [HotspotRegion] {
        match self {
            Organism::Human | Organism::Rat | Organism::Zebrafish | Organism::Fruitfly => HUMAN_HOTSPOTS,
            Organism::Mouse => MOUSE_HOTSPOTS,
            Organism::EColi => ECOLI_HOTSPOTS,
        }
    }

    pub fn fallback_sites(self) -> &'static [FallbackSite] {
        match self {
            Organism::Human | Organism::Rat | Organism::Zebrafish | Organism::Fruitfly => HUMAN_FALLBACK_SITES,
            Organism::Mouse => MOUSE_FALLBACK_SITES,
            Organism::EColi => ECOLI_FALLBACK_SITES,
        }
    }

    pub fn safe_harbors(self) -> &'static [NamedLocus] {
        match self {
            Organism::Human => HUMAN_SAFE_HARBORS,
            Organism::Mouse => MOUSE_SAFE_HARBORS,
            Organism::Rat => RAT_SAFE_HARBORS,
            Organism::EColi => ECOLI_SAFE_HARBORS,
            Organism::Zebrafish | Organism::Fruitfly => &[],
        }
    }

    pub fn gene_loci(self) -> &'static [NamedLocus] {
        match self {
            Organism::Human => HUMAN_GENE_LOCI,
            Organism::Mouse => MOUSE_GENE_LOCI,
            Organism::Rat | Organism::Zebrafish | Organism::Fruitfly | Organism::EColi => &[],
        }
    }
}

// ── Trait → gene ─────────────────────────────────────────────────────────────

/// Gene known to confer a trait, and the species it is sourced from.
#[derive(Debug, Clone, Copy)]
pub struct TraitGene {
    pub trait_name: &'static str,
    pub gene: &'static str,
    pub species: &'static str,
}

pub const TRAIT_GENES: &[TraitGene] = &[
    TraitGene { trait_name: "high bone density", gene: "LRP5", species: "Ursus maritimus" },
    TraitGene { trait_name: "uv radiation tolerance", gene: "XP-V", species: "Deinococcus radiodurans" },
    TraitGene { trait_name: "drought resistance", gene: "AREB1", species: "Arabidopsis thaliana" },
    TraitGene { trait_name: "cold tolerance", gene: "CBF", species: "Arabidopsis thaliana" },
    TraitGene { trait_name: "disease resistance", gene: "NLR", species: "Oryza sativa" },
    TraitGene { trait_name: "insulin production", gene: "INS", species: "Homo sapiens" },
];

/// Fully realized gene record served when the genomic database has nothing.
#[derive(Debug, Clone, Copy)]
pub struct StaticGene {
    pub trait_name: &'static str,
    pub name: &'static str,
    pub species: &'static str,
    pub external_id: &'static str,
    pub sequence: &'static str,
    pub description: &'static str,
}

pub const STATIC_GENES: &[StaticGene] = &[
    StaticGene {
        trait_name: "high bone density",
        name: "LRP5",
        species: "Ursus maritimus",
        external_id: "101885918",
        sequence: "ATGGGCTCTCTGGTGCTGCTGCTGGTGCTGCTGGTGCTGCTGGTGCTGCTGGTGCTGCTGGTGCTGCTGGTG",
        description: "Low-density lipoprotein receptor-related protein 5, linked to unusually high bone density in polar bears.",
    },
    StaticGene {
        trait_name: "uv radiation tolerance",
        name: "XP-V",
        species: "Deinococcus radiodurans",
        external_id: "100385918",
        sequence: "ATGGCCTCTCTGGTGCTGCTGCTGGTGCTGCTGGTGCTGCTGGTGCTGCTGGTGCTGCTGGTGCTGCTGGTG",
        description: "Xeroderma pigmentosum variant protein, involved in DNA repair mechanisms against radiation damage.",
    },
    StaticGene {
        trait_name: "pain insensitivity",
        name: "SCN9A",
        species: "Heterocephalus glaber",
        external_id: "101704257",
        sequence: "ATGGATTACAACACGCTGGCCAACACGCTGGCCAACACGCTGGCCAACACGCTGGCCAACACGCTGGCCA",
        description: "Sodium voltage-gated channel alpha subunit 9, mutations are linked to insensitivity to certain types of pain in naked mole-rats.",
    },
    StaticGene {
        trait_name: "hypoxia tolerance",
        name: "HIF1A",
        species: "Heterocephalus glaber",
        external_id: "101706691",
        sequence: "ATGCCTAGAGGTGCTCATGGTGCTCATGGTGCTCATGGTGCTCATGGTGCTCATGGTGCTCATGGTGCTCA",
        description: "Hypoxia-inducible factor 1-alpha, a key regulator for survival in low-oxygen environments.",
    },
    StaticGene {
        trait_name: "freeze tolerance",
        name: "AFGP",
        species: "Boreogadus saida",
        external_id: "101149420",
        sequence: "ATGACAGCACTAGCCACATTGGCCACATTGGCCACATTGGCCACATTGGCCACATTGGCCACATTGGCCA",
        description: "Antifreeze glycoprotein, prevents ice crystal growth in the blood of polar cod.",
    },
    StaticGene {
        trait_name: "toxin resistance",
        name: "SCN4A",
        species: "Thamnophis sirtalis",
        external_id: "102914589",
        sequence: "ATGTCCGATTCGGATGAGCGGATGAGCGGATGAGCGGATGAGCGGATGAGCGGATGAGCGGATGAGCGGA",
        description: "Sodium voltage-gated channel alpha subunit 4, mutations provide resistance to tetrodotoxin in garter snakes.",
    },
];

pub fn trait_gene(normalized_trait: &str) -> Option<&'static TraitGene> {
    TRAIT_GENES.iter().find(|t| t.trait_name == normalized_trait)
}

pub fn static_gene(normalized_trait: &str) -> Option<&'static StaticGene> {
    STATIC_GENES.iter().find(|g| g.trait_name == normalized_trait)
}
