use super::domain::{Partner, QualificationRank, Region};
use serde::Deserialize;
use std::io::Read;

/// Raised while ingesting a partner-roster CSV.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Read(#[from] csv::Error),
    #[error("row {row}: unknown qualification code '{code}'")]
    UnknownQualification { row: usize, code: String },
    #[error("row {row}: unknown region code '{code}'")]
    UnknownRegion { row: usize, code: String },
    #[error("row {row}: volume must be non-negative (got {volume})")]
    NegativeVolume { row: usize, volume: f64 },
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    volume: f64,
    #[serde(default)]
    qualification: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    region: Option<String>,
}

/// Parses a partner roster from CSV with a `volume,qualification,active,region`
/// header. Qualification and region fall back to `NONE` and the default
/// region when the columns are empty; `active` defaults to true.
pub fn partners_from_reader<R: Read>(reader: R) -> Result<Vec<Partner>, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut partners = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = index + 1;
        let parsed = record?;

        if !parsed.volume.is_finite() || parsed.volume < 0.0 {
            return Err(RosterError::NegativeVolume {
                row,
                volume: parsed.volume,
            });
        }

        let qualification = match parsed.qualification.as_deref() {
            Some(code) => QualificationRank::from_code(code).ok_or_else(|| {
                RosterError::UnknownQualification {
                    row,
                    code: code.to_string(),
                }
            })?,
            None => QualificationRank::None,
        };

        let region = match parsed.region.as_deref().filter(|code| !code.is_empty()) {
            Some(code) => Region::from_code(code).ok_or_else(|| RosterError::UnknownRegion {
                row,
                code: code.to_string(),
            })?,
            None => Region::default(),
        };

        partners.push(Partner {
            volume: parsed.volume,
            qualification,
            active: parsed.active.unwrap_or(true),
            region,
        });
    }

    Ok(partners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_a_full_roster() {
        let csv = "volume,qualification,active,region\n\
                   1200,M3,true,RU\n\
                   800,m1,false,KZ\n\
                   300,,,\n";
        let partners = partners_from_reader(Cursor::new(csv)).expect("roster parses");

        assert_eq!(partners.len(), 3);
        assert_eq!(partners[0].qualification, QualificationRank::M3);
        assert!(!partners[1].active);
        assert_eq!(partners[1].region, Region::Kz);
        assert_eq!(partners[2].qualification, QualificationRank::None);
        assert!(partners[2].active);
    }

    #[test]
    fn rejects_unknown_codes() {
        let csv = "volume,qualification,active,region\n100,Q9,true,RU\n";
        let err = partners_from_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, RosterError::UnknownQualification { row: 1, .. }));
    }

    #[test]
    fn rejects_negative_volume() {
        let csv = "volume,qualification,active,region\n-5,M1,true,RU\n";
        let err = partners_from_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, RosterError::NegativeVolume { row: 1, .. }));
    }
}
