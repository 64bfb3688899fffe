use crate::record::{CanonicalKey, IonMode};

use super::{AdductTables, InstrumentTree, KeySynonyms};

const KEY_SYNONYMS: &[(&str, CanonicalKey)] = &[
    ("filename", CanonicalKey::Filename),
    ("file name", CanonicalKey::Filename),
    ("predicted", CanonicalKey::Predicted),
    ("splash", CanonicalKey::Splash),
    ("spectrum_id", CanonicalKey::SpectrumId),
    ("spectrum id", CanonicalKey::SpectrumId),
    ("spectrumid", CanonicalKey::SpectrumId),
    ("db#", CanonicalKey::SpectrumId),
    ("accession", CanonicalKey::SpectrumId),
    ("scans", CanonicalKey::SpectrumId),
    ("resolution", CanonicalKey::Resolution),
    ("synonym", CanonicalKey::Synon),
    ("synonyms", CanonicalKey::Synon),
    ("ionization", CanonicalKey::Ionization),
    ("ionisation", CanonicalKey::Ionization),
    ("ion source", CanonicalKey::Ionization),
    ("source_instrument", CanonicalKey::Ionization),
    ("ms level", CanonicalKey::MsLevel),
    ("ms_level", CanonicalKey::MsLevel),
    ("mstype", CanonicalKey::MsLevel),
    ("spectrumtype", CanonicalKey::MsLevel),
    ("fragmentation mode", CanonicalKey::FragmentationMode),
    ("fragmentation_mode", CanonicalKey::FragmentationMode),
    ("fragmentation method", CanonicalKey::FragmentationMode),
    ("compound_name", CanonicalKey::Name),
    ("compound name", CanonicalKey::Name),
    ("title", CanonicalKey::Name),
    ("precursor m/z", CanonicalKey::PrecursorMz),
    ("precursor_mz", CanonicalKey::PrecursorMz),
    ("precursor mz", CanonicalKey::PrecursorMz),
    ("pepmass", CanonicalKey::PrecursorMz),
    ("selected ion m/z", CanonicalKey::PrecursorMz),
    ("exact mass", CanonicalKey::ExactMass),
    ("exact_mass", CanonicalKey::ExactMass),
    ("exactmass", CanonicalKey::ExactMass),
    ("monoisotopic mass", CanonicalKey::ExactMass),
    ("average mass", CanonicalKey::AverageMass),
    ("mw", CanonicalKey::AverageMass),
    ("precursor type", CanonicalKey::PrecursorType),
    ("precursor_type", CanonicalKey::PrecursorType),
    ("adduct", CanonicalKey::PrecursorType),
    ("ion type", CanonicalKey::PrecursorType),
    ("instrument type", CanonicalKey::InstrumentType),
    ("instrument_type", CanonicalKey::InstrumentType),
    ("instrument", CanonicalKey::Instrument),
    ("instrument name", CanonicalKey::Instrument),
    ("smiles", CanonicalKey::Smiles),
    ("computed smiles", CanonicalKey::Smiles),
    ("inchi", CanonicalKey::Inchi),
    ("computed inchi", CanonicalKey::Inchi),
    ("inchikey", CanonicalKey::InchiKey),
    ("inchi key", CanonicalKey::InchiKey),
    ("inchi_key", CanonicalKey::InchiKey),
    ("collision energy", CanonicalKey::CollisionEnergy),
    ("collision_energy", CanonicalKey::CollisionEnergy),
    ("collisionenergy", CanonicalKey::CollisionEnergy),
    ("molecular formula", CanonicalKey::Formula),
    ("formula", CanonicalKey::Formula),
    ("retention time", CanonicalKey::RetentionTime),
    ("retention_time", CanonicalKey::RetentionTime),
    ("retentiontime", CanonicalKey::RetentionTime),
    ("rettime", CanonicalKey::RetentionTime),
    ("ionization mode", CanonicalKey::IonMode),
    ("ion_mode", CanonicalKey::IonMode),
    ("ion mode", CanonicalKey::IonMode),
    ("polarity", CanonicalKey::IonMode),
    ("comments", CanonicalKey::Comment),
    ("spectral entropy", CanonicalKey::Entropy),
    ("num peaks", CanonicalKey::NumPeaks),
    ("num_peaks", CanonicalKey::NumPeaks),
    ("numpeaks", CanonicalKey::NumPeaks),
    ("peaks", CanonicalKey::PeaksList),
    ("peaks_json", CanonicalKey::PeaksList),
    ("spectrum", CanonicalKey::PeaksList),
];

/// (ion mode, known spelling, canonical adduct, mass difference)
const ADDUCTS: &[(IonMode, &str, &str, f64)] = &[
    (IonMode::Positive, "M+H", "[M+H]+", 1.007276),
    (IonMode::Positive, "M+Na", "[M+Na]+", 22.989218),
    (IonMode::Positive, "M+NH4", "[M+NH4]+", 18.033823),
    (IonMode::Positive, "M+K", "[M+K]+", 38.963158),
    (IonMode::Positive, "M+2H", "[M+2H]2+", 1.007276),
    (IonMode::Positive, "M+H-H2O", "[M+H-H2O]+", -17.003289),
    (IonMode::Positive, "M-H2O+H", "[M+H-H2O]+", -17.003289),
    (IonMode::Positive, "M+", "[M]+", -0.000549),
    (IonMode::Positive, "M", "[M]+", -0.000549),
    (IonMode::Negative, "M-H", "[M-H]-", -1.007276),
    (IonMode::Negative, "M+Cl", "[M+Cl]-", 34.969402),
    (IonMode::Negative, "M+HCOO", "[M+HCOO]-", 44.998201),
    (IonMode::Negative, "M+FA-H", "[M+HCOO]-", 44.998201),
    (IonMode::Negative, "M+CH3COO", "[M+CH3COO]-", 59.013851),
    (IonMode::Negative, "M+OAc", "[M+CH3COO]-", 59.013851),
    (IonMode::Negative, "M-H-H2O", "[M-H-H2O]-", -19.01839),
    (IonMode::Negative, "M-2H", "[M-2H]2-", -1.007276),
    (IonMode::Negative, "M-", "[M]-", 0.000549),
    (IonMode::Negative, "M", "[M]-", 0.000549),
];

/// (name fragment, category), most specific first
const INSTRUMENTS: &[(&str, &str)] = &[
    ("q exactive", "LC-ESI-ITFT"),
    ("orbitrap", "LC-ESI-ITFT"),
    ("ltq", "LC-ESI-ITFT"),
    ("itft", "LC-ESI-ITFT"),
    ("qtof", "LC-ESI-QTOF"),
    ("q-tof", "LC-ESI-QTOF"),
    ("maxis", "LC-ESI-QTOF"),
    ("impact", "LC-ESI-QTOF"),
    ("tripletof", "LC-ESI-QTOF"),
    ("synapt", "LC-ESI-QTOF"),
    ("qtrap", "LC-ESI-QQQ"),
    ("qqq", "LC-ESI-QQQ"),
    ("tsq", "LC-ESI-QQQ"),
    ("triple quad", "LC-ESI-QQQ"),
    ("solarix", "LC-ESI-FT"),
    ("ft-icr", "LC-ESI-FT"),
    ("fticr", "LC-ESI-FT"),
    ("gc-ei", "GC-EI-TOF"),
    ("ei-b", "GC-EI-B"),
];

pub(super) fn key_synonyms() -> KeySynonyms {
    KEY_SYNONYMS.iter().copied().collect()
}

pub(super) fn adduct_tables() -> AdductTables {
    let mut tables = AdductTables::default();
    for (mode, known, canonical, delta) in ADDUCTS.iter().copied() {
        tables.insert(mode, known, canonical, Some(delta));
    }
    tables
}

pub(super) fn instrument_tree() -> InstrumentTree {
    let mut tree = InstrumentTree::new();
    for (fragment, category) in INSTRUMENTS {
        tree.insert(fragment, *category);
    }
    tree
}
