use std::fmt::Display;
use std::str::FromStr;

/// The fixed set of field names every [`CanonicalRecord`](crate::CanonicalRecord) is
/// expressed in. Anything that cannot be mapped onto one of these is dropped during
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CanonicalKey {
    Filename,
    Predicted,
    Splash,
    SpectrumId,
    Resolution,
    Synon,
    Ionization,
    MsLevel,
    FragmentationMode,
    Name,
    PrecursorMz,
    ExactMass,
    AverageMass,
    PrecursorType,
    InstrumentType,
    Instrument,
    Smiles,
    Inchi,
    InchiKey,
    CollisionEnergy,
    Formula,
    RetentionTime,
    IonMode,
    Comment,
    Entropy,
    ClassyfireSuperclass,
    ClassyfireClass,
    ClassyfireSubclass,
    NpclassPathway,
    NpclassSuperclass,
    NpclassClass,
    NumPeaks,
    PeaksList,
}

impl CanonicalKey {
    /// Every key, in the column order used for export
    pub const ALL: [CanonicalKey; 33] = [
        Self::Filename,
        Self::Predicted,
        Self::Splash,
        Self::SpectrumId,
        Self::Resolution,
        Self::Synon,
        Self::Ionization,
        Self::MsLevel,
        Self::FragmentationMode,
        Self::Name,
        Self::PrecursorMz,
        Self::ExactMass,
        Self::AverageMass,
        Self::PrecursorType,
        Self::InstrumentType,
        Self::Instrument,
        Self::Smiles,
        Self::Inchi,
        Self::InchiKey,
        Self::CollisionEnergy,
        Self::Formula,
        Self::RetentionTime,
        Self::IonMode,
        Self::Comment,
        Self::Entropy,
        Self::ClassyfireSuperclass,
        Self::ClassyfireClass,
        Self::ClassyfireSubclass,
        Self::NpclassPathway,
        Self::NpclassSuperclass,
        Self::NpclassClass,
        Self::NumPeaks,
        Self::PeaksList,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Filename => "FILENAME",
            Self::Predicted => "PREDICTED",
            Self::Splash => "SPLASH",
            Self::SpectrumId => "SPECTRUMID",
            Self::Resolution => "RESOLUTION",
            Self::Synon => "SYNON",
            Self::Ionization => "IONIZATION",
            Self::MsLevel => "MSLEVEL",
            Self::FragmentationMode => "FRAGMENTATIONMODE",
            Self::Name => "NAME",
            Self::PrecursorMz => "PRECURSORMZ",
            Self::ExactMass => "EXACTMASS",
            Self::AverageMass => "AVERAGEMASS",
            Self::PrecursorType => "PRECURSORTYPE",
            Self::InstrumentType => "INSTRUMENTTYPE",
            Self::Instrument => "INSTRUMENT",
            Self::Smiles => "SMILES",
            Self::Inchi => "INCHI",
            Self::InchiKey => "INCHIKEY",
            Self::CollisionEnergy => "COLLISIONENERGY",
            Self::Formula => "FORMULA",
            Self::RetentionTime => "RT",
            Self::IonMode => "IONMODE",
            Self::Comment => "COMMENT",
            Self::Entropy => "ENTROPY",
            Self::ClassyfireSuperclass => "CLASSYFIRE_SUPERCLASS",
            Self::ClassyfireClass => "CLASSYFIRE_CLASS",
            Self::ClassyfireSubclass => "CLASSYFIRE_SUBCLASS",
            Self::NpclassPathway => "NPCLASS_PATHWAY",
            Self::NpclassSuperclass => "NPCLASS_SUPERCLASS",
            Self::NpclassClass => "NPCLASS_CLASS",
            Self::NumPeaks => "NUM PEAKS",
            Self::PeaksList => "PEAKS_LIST",
        }
    }

    /// Whether this key's value is free text that may carry an in-silico annotation
    pub const fn is_descriptive(&self) -> bool {
        matches!(
            self,
            Self::Comment | Self::Name | Self::Synon | Self::Filename | Self::SpectrumId
        )
    }
}

impl Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCanonicalKey(pub String);

impl Display for UnknownCanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not a canonical field name", self.0)
    }
}

impl std::error::Error for UnknownCanonicalKey {}

impl FromStr for CanonicalKey {
    type Err = UnknownCanonicalKey;

    /// Parse the exact canonical spelling, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownCanonicalKey(s.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for key in CanonicalKey::ALL {
            assert_eq!(key.as_str().parse::<CanonicalKey>().unwrap(), key);
        }
        assert_eq!("num peaks".parse::<CanonicalKey>().unwrap(), CanonicalKey::NumPeaks);
        assert!("DELETION_REASON".parse::<CanonicalKey>().is_err());
    }
}
