// Reaction type bookkeeping: names, parsing and subshell conversions
use crate::error::CollisionError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Atomic subshells, identified by their ENDF designators.
///
/// `Invalid` is returned by reactions that do not interact with a specific
/// subshell; `Unknown` marks data that names a designator this enum lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subshell {
    Invalid,
    Unknown,
    K,
    L1,
    L2,
    L3,
    M1,
    M2,
    M3,
    M4,
    M5,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    N7,
    O1,
    O2,
    O3,
    O4,
    O5,
    O6,
    O7,
    O8,
    O9,
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
    P8,
    P9,
    P10,
    P11,
    Q1,
    Q2,
    Q3,
}

// (subshell, name, ENDF designator)
const SUBSHELL_TABLE: [(Subshell, &str, u32); 39] = [
    (Subshell::K, "K", 1),
    (Subshell::L1, "L1", 3),
    (Subshell::L2, "L2", 5),
    (Subshell::L3, "L3", 6),
    (Subshell::M1, "M1", 8),
    (Subshell::M2, "M2", 10),
    (Subshell::M3, "M3", 11),
    (Subshell::M4, "M4", 13),
    (Subshell::M5, "M5", 14),
    (Subshell::N1, "N1", 16),
    (Subshell::N2, "N2", 18),
    (Subshell::N3, "N3", 19),
    (Subshell::N4, "N4", 21),
    (Subshell::N5, "N5", 22),
    (Subshell::N6, "N6", 24),
    (Subshell::N7, "N7", 25),
    (Subshell::O1, "O1", 27),
    (Subshell::O2, "O2", 29),
    (Subshell::O3, "O3", 30),
    (Subshell::O4, "O4", 32),
    (Subshell::O5, "O5", 33),
    (Subshell::O6, "O6", 35),
    (Subshell::O7, "O7", 36),
    (Subshell::O8, "O8", 38),
    (Subshell::O9, "O9", 39),
    (Subshell::P1, "P1", 41),
    (Subshell::P2, "P2", 43),
    (Subshell::P3, "P3", 44),
    (Subshell::P4, "P4", 46),
    (Subshell::P5, "P5", 47),
    (Subshell::P6, "P6", 49),
    (Subshell::P7, "P7", 50),
    (Subshell::P8, "P8", 52),
    (Subshell::P9, "P9", 53),
    (Subshell::P10, "P10", 55),
    (Subshell::P11, "P11", 56),
    (Subshell::Q1, "Q1", 58),
    (Subshell::Q2, "Q2", 60),
    (Subshell::Q3, "Q3", 61),
];

impl Subshell {
    /// Every physical subshell, innermost first.
    pub fn all() -> impl Iterator<Item = Subshell> {
        SUBSHELL_TABLE.iter().map(|(subshell, _, _)| *subshell)
    }

    pub fn is_physical(self) -> bool {
        !matches!(self, Subshell::Invalid | Subshell::Unknown)
    }

    pub fn name(self) -> &'static str {
        match self {
            Subshell::Invalid => "Invalid",
            Subshell::Unknown => "Unknown",
            other => SUBSHELL_TABLE
                .iter()
                .find(|(subshell, _, _)| *subshell == other)
                .map(|(_, name, _)| *name)
                .unwrap_or("Unknown"),
        }
    }

    /// ENDF designator of a physical subshell.
    pub fn endf_designator(self) -> Option<u32> {
        SUBSHELL_TABLE
            .iter()
            .find(|(subshell, _, _)| *subshell == self)
            .map(|(_, _, designator)| *designator)
    }

    /// Subshell for an ENDF designator; unlisted designators are `Unknown`.
    pub fn from_endf_designator(designator: u32) -> Subshell {
        SUBSHELL_TABLE
            .iter()
            .find(|(_, _, d)| *d == designator)
            .map(|(subshell, _, _)| *subshell)
            .unwrap_or(Subshell::Unknown)
    }
}

impl fmt::Display for Subshell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Subshell {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUBSHELL_TABLE
            .iter()
            .find(|(_, name, _)| *name == s.trim())
            .map(|(subshell, _, _)| *subshell)
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "subshell",
                name: s.to_string(),
            })
    }
}

/// Builds the name-to-variant lookup used by the `FromStr` impls.
fn build_lookup<T: Copy + fmt::Display>(all: impl Iterator<Item = T>) -> HashMap<String, T> {
    all.map(|reaction| (reaction.to_string(), reaction)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElectroatomicReactionType {
    Total,
    TotalAbsorption,
    CoupledElastic,
    HybridElastic,
    DecoupledElastic,
    CutoffElastic,
    ScreenedRutherfordElastic,
    MomentPreservingElastic,
    Bremsstrahlung,
    PositronAnnihilation,
    AtomicExcitation,
    TotalElectroionization,
    SubshellElectroionization(Subshell),
}

const ELECTROATOMIC_NAMES: [(ElectroatomicReactionType, &str); 12] = [
    (ElectroatomicReactionType::Total, "Total Electro-atomic Reaction"),
    (ElectroatomicReactionType::TotalAbsorption, "Total Absorption Electro-atomic Reaction"),
    (ElectroatomicReactionType::CoupledElastic, "Coupled Elastic Electro-atomic Reaction"),
    (ElectroatomicReactionType::HybridElastic, "Hybrid Elastic Electro-atomic Reaction"),
    (ElectroatomicReactionType::DecoupledElastic, "Decoupled Elastic Electro-atomic Reaction"),
    (ElectroatomicReactionType::CutoffElastic, "Cutoff Elastic Electro-atomic Reaction"),
    (
        ElectroatomicReactionType::ScreenedRutherfordElastic,
        "Screened Rutherford Elastic Electro-atomic Reaction",
    ),
    (
        ElectroatomicReactionType::MomentPreservingElastic,
        "Moment Preserving Elastic Electro-atomic Reaction",
    ),
    (ElectroatomicReactionType::Bremsstrahlung, "Bremsstrahlung Electro-atomic Reaction"),
    (
        ElectroatomicReactionType::PositronAnnihilation,
        "Positron Annihilation Electro-atomic Reaction",
    ),
    (ElectroatomicReactionType::AtomicExcitation, "Atomic Excitation Electro-atomic Reaction"),
    (
        ElectroatomicReactionType::TotalElectroionization,
        "Total Electro-ionization Electro-atomic Reaction",
    ),
];

static ELECTROATOMIC_LOOKUP: Lazy<HashMap<String, ElectroatomicReactionType>> =
    Lazy::new(|| build_lookup(ElectroatomicReactionType::all()));

impl ElectroatomicReactionType {
    pub fn all() -> impl Iterator<Item = ElectroatomicReactionType> {
        ELECTROATOMIC_NAMES
            .iter()
            .map(|(reaction, _)| *reaction)
            .chain(Subshell::all().map(ElectroatomicReactionType::SubshellElectroionization))
    }

    /// Electro-ionization reaction for a physical subshell.
    pub fn from_subshell(subshell: Subshell) -> Result<Self, CollisionError> {
        if subshell.is_physical() {
            Ok(ElectroatomicReactionType::SubshellElectroionization(subshell))
        } else {
            Err(CollisionError::UnmappedSubshell(subshell.to_string()))
        }
    }

    /// Subshell of an electro-ionization subshell reaction.
    pub fn subshell(self) -> Option<Subshell> {
        match self {
            ElectroatomicReactionType::SubshellElectroionization(subshell) => Some(subshell),
            _ => None,
        }
    }
}

impl fmt::Display for ElectroatomicReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let ElectroatomicReactionType::SubshellElectroionization(subshell) = self {
            return write!(f, "{} Subshell Electro-ionization Electro-atomic Reaction", subshell);
        }
        let name = ELECTROATOMIC_NAMES
            .iter()
            .find(|(reaction, _)| reaction == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown Electro-atomic Reaction");
        write!(f, "{}", name)
    }
}

impl FromStr for ElectroatomicReactionType {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ELECTROATOMIC_LOOKUP
            .get(s.trim())
            .copied()
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "electroatomic reaction",
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositronatomicReactionType {
    Total,
    TotalAbsorption,
    CoupledElastic,
    HybridElastic,
    DecoupledElastic,
    CutoffElastic,
    ScreenedRutherfordElastic,
    MomentPreservingElastic,
    Bremsstrahlung,
    PositronAnnihilation,
    AtomicExcitation,
    TotalPositronionization,
    SubshellPositronionization(Subshell),
}

const POSITRONATOMIC_NAMES: [(PositronatomicReactionType, &str); 12] = [
    (PositronatomicReactionType::Total, "Total Positron-atomic Reaction"),
    (PositronatomicReactionType::TotalAbsorption, "Total Absorption Positron-atomic Reaction"),
    (PositronatomicReactionType::CoupledElastic, "Coupled Elastic Positron-atomic Reaction"),
    (PositronatomicReactionType::HybridElastic, "Hybrid Elastic Positron-atomic Reaction"),
    (PositronatomicReactionType::DecoupledElastic, "Decoupled Elastic Positron-atomic Reaction"),
    (PositronatomicReactionType::CutoffElastic, "Cutoff Elastic Positron-atomic Reaction"),
    (
        PositronatomicReactionType::ScreenedRutherfordElastic,
        "Screened Rutherford Elastic Positron-atomic Reaction",
    ),
    (
        PositronatomicReactionType::MomentPreservingElastic,
        "Moment Preserving Elastic Positron-atomic Reaction",
    ),
    (PositronatomicReactionType::Bremsstrahlung, "Bremsstrahlung Positron-atomic Reaction"),
    (
        PositronatomicReactionType::PositronAnnihilation,
        "Positron Annihilation Positron-atomic Reaction",
    ),
    (PositronatomicReactionType::AtomicExcitation, "Atomic Excitation Positron-atomic Reaction"),
    (
        PositronatomicReactionType::TotalPositronionization,
        "Total Positron-ionization Positron-atomic Reaction",
    ),
];

static POSITRONATOMIC_LOOKUP: Lazy<HashMap<String, PositronatomicReactionType>> =
    Lazy::new(|| build_lookup(PositronatomicReactionType::all()));

impl PositronatomicReactionType {
    pub fn all() -> impl Iterator<Item = PositronatomicReactionType> {
        POSITRONATOMIC_NAMES
            .iter()
            .map(|(reaction, _)| *reaction)
            .chain(Subshell::all().map(PositronatomicReactionType::SubshellPositronionization))
    }

    /// Positron-ionization reaction for a physical subshell.
    pub fn from_subshell(subshell: Subshell) -> Result<Self, CollisionError> {
        if subshell.is_physical() {
            Ok(PositronatomicReactionType::SubshellPositronionization(subshell))
        } else {
            Err(CollisionError::UnmappedSubshell(subshell.to_string()))
        }
    }

    pub fn subshell(self) -> Option<Subshell> {
        match self {
            PositronatomicReactionType::SubshellPositronionization(subshell) => Some(subshell),
            _ => None,
        }
    }
}

impl fmt::Display for PositronatomicReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let PositronatomicReactionType::SubshellPositronionization(subshell) = self {
            return write!(f, "{} Subshell Positron-ionization Positron-atomic Reaction", subshell);
        }
        let name = POSITRONATOMIC_NAMES
            .iter()
            .find(|(reaction, _)| reaction == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown Positron-atomic Reaction");
        write!(f, "{}", name)
    }
}

impl FromStr for PositronatomicReactionType {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        POSITRONATOMIC_LOOKUP
            .get(s.trim())
            .copied()
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "positronatomic reaction",
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjointPhotoatomicReactionType {
    Total,
    TotalAbsorption,
    TotalIncoherent,
    SubshellIncoherent(Subshell),
    Coherent,
    PairProduction,
    TripletProduction,
}

const ADJOINT_PHOTOATOMIC_NAMES: [(AdjointPhotoatomicReactionType, &str); 6] = [
    (AdjointPhotoatomicReactionType::Total, "Total Adjoint Photoatomic Reaction"),
    (
        AdjointPhotoatomicReactionType::TotalAbsorption,
        "Total Absorption Adjoint Photoatomic Reaction",
    ),
    (
        AdjointPhotoatomicReactionType::TotalIncoherent,
        "Total Incoherent Adjoint Photoatomic Reaction",
    ),
    (AdjointPhotoatomicReactionType::Coherent, "Coherent Adjoint Photoatomic Reaction"),
    (
        AdjointPhotoatomicReactionType::PairProduction,
        "Pair Production Adjoint Photoatomic Reaction",
    ),
    (
        AdjointPhotoatomicReactionType::TripletProduction,
        "Triplet Production Adjoint Photoatomic Reaction",
    ),
];

static ADJOINT_PHOTOATOMIC_LOOKUP: Lazy<HashMap<String, AdjointPhotoatomicReactionType>> =
    Lazy::new(|| build_lookup(AdjointPhotoatomicReactionType::all()));

impl AdjointPhotoatomicReactionType {
    pub fn all() -> impl Iterator<Item = AdjointPhotoatomicReactionType> {
        ADJOINT_PHOTOATOMIC_NAMES
            .iter()
            .map(|(reaction, _)| *reaction)
            .chain(Subshell::all().map(AdjointPhotoatomicReactionType::SubshellIncoherent))
    }

    /// Incoherent adjoint reaction for a physical subshell.
    pub fn from_subshell(subshell: Subshell) -> Result<Self, CollisionError> {
        if subshell.is_physical() {
            Ok(AdjointPhotoatomicReactionType::SubshellIncoherent(subshell))
        } else {
            Err(CollisionError::UnmappedSubshell(subshell.to_string()))
        }
    }

    pub fn subshell(self) -> Option<Subshell> {
        match self {
            AdjointPhotoatomicReactionType::SubshellIncoherent(subshell) => Some(subshell),
            _ => None,
        }
    }
}

impl fmt::Display for AdjointPhotoatomicReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let AdjointPhotoatomicReactionType::SubshellIncoherent(subshell) = self {
            return write!(f, "{} Subshell Incoherent Adjoint Photoatomic Reaction", subshell);
        }
        let name = ADJOINT_PHOTOATOMIC_NAMES
            .iter()
            .find(|(reaction, _)| reaction == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown Adjoint Photoatomic Reaction");
        write!(f, "{}", name)
    }
}

impl FromStr for AdjointPhotoatomicReactionType {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ADJOINT_PHOTOATOMIC_LOOKUP
            .get(s.trim())
            .copied()
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "adjoint photoatomic reaction",
                name: s.to_string(),
            })
    }
}

/// Reaction type of any reaction family handled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    Electroatomic(ElectroatomicReactionType),
    Positronatomic(PositronatomicReactionType),
    AdjointPhotoatomic(AdjointPhotoatomicReactionType),
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionType::Electroatomic(reaction) => fmt::Display::fmt(reaction, f),
            ReactionType::Positronatomic(reaction) => fmt::Display::fmt(reaction, f),
            ReactionType::AdjointPhotoatomic(reaction) => fmt::Display::fmt(reaction, f),
        }
    }
}

impl From<ElectroatomicReactionType> for ReactionType {
    fn from(reaction: ElectroatomicReactionType) -> Self {
        ReactionType::Electroatomic(reaction)
    }
}

impl From<PositronatomicReactionType> for ReactionType {
    fn from(reaction: PositronatomicReactionType) -> Self {
        ReactionType::Positronatomic(reaction)
    }
}

impl From<AdjointPhotoatomicReactionType> for ReactionType {
    fn from(reaction: AdjointPhotoatomicReactionType) -> Self {
        ReactionType::AdjointPhotoatomic(reaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subshell_designators() {
        assert_eq!(Subshell::all().count(), 39);
        assert_eq!(Subshell::K.endf_designator(), Some(1));
        assert_eq!(Subshell::L3.endf_designator(), Some(6));
        assert_eq!(Subshell::Q3.endf_designator(), Some(61));
        assert_eq!(Subshell::from_endf_designator(14), Subshell::M5);
        assert_eq!(Subshell::from_endf_designator(2), Subshell::Unknown);
        assert_eq!(Subshell::Invalid.endf_designator(), None);
        assert_eq!("P10".parse::<Subshell>().unwrap(), Subshell::P10);
    }

    #[test]
    fn test_electroatomic_names() {
        assert_eq!(
            ElectroatomicReactionType::CutoffElastic.to_string(),
            "Cutoff Elastic Electro-atomic Reaction"
        );
        assert_eq!(
            ElectroatomicReactionType::SubshellElectroionization(Subshell::L3).to_string(),
            "L3 Subshell Electro-ionization Electro-atomic Reaction"
        );
        assert_eq!(
            "Moment Preserving Elastic Electro-atomic Reaction"
                .parse::<ElectroatomicReactionType>()
                .unwrap(),
            ElectroatomicReactionType::MomentPreservingElastic
        );
        assert_eq!(
            "M1 Subshell Electro-ionization Electro-atomic Reaction"
                .parse::<ElectroatomicReactionType>()
                .unwrap(),
            ElectroatomicReactionType::SubshellElectroionization(Subshell::M1)
        );
        assert!("Elastic Reaction".parse::<ElectroatomicReactionType>().is_err());
    }

    #[test]
    fn test_positronatomic_names() {
        assert_eq!(
            PositronatomicReactionType::PositronAnnihilation.to_string(),
            "Positron Annihilation Positron-atomic Reaction"
        );
        assert_eq!(
            PositronatomicReactionType::SubshellPositronionization(Subshell::N2).to_string(),
            "N2 Subshell Positron-ionization Positron-atomic Reaction"
        );
        assert_eq!(
            PositronatomicReactionType::TotalPositronionization.to_string(),
            "Total Positron-ionization Positron-atomic Reaction"
        );
    }

    #[test]
    fn test_adjoint_photoatomic_names() {
        assert_eq!(
            AdjointPhotoatomicReactionType::Coherent.to_string(),
            "Coherent Adjoint Photoatomic Reaction"
        );
        assert_eq!(
            AdjointPhotoatomicReactionType::SubshellIncoherent(Subshell::N3).to_string(),
            "N3 Subshell Incoherent Adjoint Photoatomic Reaction"
        );
        assert_eq!(
            "Triplet Production Adjoint Photoatomic Reaction"
                .parse::<AdjointPhotoatomicReactionType>()
                .unwrap(),
            AdjointPhotoatomicReactionType::TripletProduction
        );
    }

    #[test]
    fn test_every_name_round_trips() {
        for reaction in ElectroatomicReactionType::all() {
            assert_eq!(reaction.to_string().parse::<ElectroatomicReactionType>().unwrap(), reaction);
        }
        for reaction in PositronatomicReactionType::all() {
            assert_eq!(reaction.to_string().parse::<PositronatomicReactionType>().unwrap(), reaction);
        }
        for reaction in AdjointPhotoatomicReactionType::all() {
            assert_eq!(
                reaction.to_string().parse::<AdjointPhotoatomicReactionType>().unwrap(),
                reaction
            );
        }
    }

    #[test]
    fn test_subshell_conversion() {
        assert_eq!(
            ElectroatomicReactionType::from_subshell(Subshell::K).unwrap(),
            ElectroatomicReactionType::SubshellElectroionization(Subshell::K)
        );
        assert_eq!(
            AdjointPhotoatomicReactionType::from_subshell(Subshell::Q1).unwrap().subshell(),
            Some(Subshell::Q1)
        );
        assert!(matches!(
            ElectroatomicReactionType::from_subshell(Subshell::Invalid),
            Err(CollisionError::UnmappedSubshell(_))
        ));
        assert!(PositronatomicReactionType::from_subshell(Subshell::Unknown).is_err());
        assert!(AdjointPhotoatomicReactionType::from_subshell(Subshell::Invalid).is_err());
    }

    #[test]
    fn test_reaction_type_wrapper_display() {
        let reaction: ReactionType = AdjointPhotoatomicReactionType::PairProduction.into();
        assert_eq!(reaction.to_string(), "Pair Production Adjoint Photoatomic Reaction");
    }
}
