//! Region label normalization.
//!
//! The venue table labels regions in an administrative style
//! (`"AUVERGNE / RHONE-ALPES"`), while boundary datasets use the official
//! hyphenated names (`"Auvergne-Rhône-Alpes"`). This module maps one onto
//! the other.

/// Display label for any region label that is missing or not in [`REGION_NAMES`].
pub const UNKNOWN_REGION: &str = "unknown";

/// Administrative label to official region name, for the 13 metropolitan regions.
pub const REGION_NAMES: [(&str, &str); 13] = [
    ("AUVERGNE / RHONE-ALPES", "Auvergne-Rhône-Alpes"),
    ("BOURGOGNE / FRANCHE-COMTE", "Bourgogne-Franche-Comté"),
    ("BRETAGNE", "Bretagne"),
    ("CENTRE-VAL DE LOIRE", "Centre-Val de Loire"),
    ("CORSE", "Corse"),
    ("GRAND EST", "Grand Est"),
    ("HAUTS DE FRANCE", "Hauts-de-France"),
    ("ILE-DE-FRANCE", "Île-de-France"),
    ("NORMANDIE", "Normandie"),
    ("NOUVELLE AQUITAINE", "Nouvelle-Aquitaine"),
    ("OCCITANIE", "Occitanie"),
    ("PAYS DE LA LOIRE", "Pays de la Loire"),
    ("PROVENCE-ALPES-COTE D'AZUR", "Provence-Alpes-Côte d'Azur"),
];

/// Normalize a raw region label to its official name.
///
/// Total: anything outside the table, including a missing label,
/// yields [`UNKNOWN_REGION`].
pub fn normalize_region(raw: Option<&str>) -> &'static str {
    raw.and_then(|label| {
        REGION_NAMES
            .iter()
            .find(|(admin, _)| *admin == label)
            .map(|(_, official)| *official)
    })
    .unwrap_or(UNKNOWN_REGION)
}

/// Whether a display label is the unknown sentinel.
pub fn is_unknown(display_label: &str) -> bool {
    display_label == UNKNOWN_REGION
}
