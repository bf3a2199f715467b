// CSV sheet import

use std::io::Read;
use std::path::Path;

use billgrid_recon::{load_csv_table, BillInput, ReconError, Table};

/// Load one headerless CSV export as a sheet table.
pub fn load_csv_sheet(path: &Path) -> Result<Table, ReconError> {
    let content = read_file_as_utf8(path)?;
    load_csv_table(&content)
}

/// Load several CSV exports, one per named sheet.
pub fn load_csv_sheets<P: AsRef<Path>>(sheets: &[(&str, P)]) -> Result<BillInput, ReconError> {
    let mut input = BillInput::default();
    for (name, path) in sheets {
        let table = load_csv_sheet(path.as_ref())?;
        input.sheets.insert(name.to_string(), table);
    }
    Ok(input)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, ReconError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReconError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel on Windows exports CSV as Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billgrid_recon::Cell;

    #[test]
    fn loads_named_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let wo = dir.path().join("wo.csv");
        let bq = dir.path().join("bq.csv");
        std::fs::write(&wo, "1,Excavation,cum,100,50,5000,BSR1\n").unwrap();
        std::fs::write(&bq, "1,Excavation,cum,80,50,4000,BSR1\n").unwrap();

        let input = load_csv_sheets(&[("Work Order", &wo), ("Bill Quantity", &bq)]).unwrap();
        assert_eq!(input.sheets.len(), 2);
        assert_eq!(input.sheets["Bill Quantity"][0][3], Cell::Text("80".into()));
    }

    #[test]
    fn windows_1252_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Caf\xe9" is not valid UTF-8
        std::fs::write(&path, b"1,Caf\xe9 flooring,sqm,10,20,200,K1\n").unwrap();

        let table = load_csv_sheet(&path).unwrap();
        assert_eq!(table[0][1], Cell::Text("Café flooring".into()));
    }

    #[test]
    fn missing_file() {
        let err = load_csv_sheet(Path::new("/nonexistent/wo.csv")).unwrap_err();
        assert!(err.to_string().starts_with("IO error: cannot open"));
    }
}
