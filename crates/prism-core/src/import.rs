//! Bulk prompt import from CSV.
//!
//! Files have no header row and any shape: every cell of every row is taken
//! in reading order, trimmed, and blanks are dropped.

use crate::error::ImportError;
use std::io::Read;
use std::path::Path;

/// Read prompts from a CSV file.
///
/// Returns [`ImportError::Empty`] when the file holds no non-blank cell.
pub fn read_prompts_from_path(path: &Path) -> Result<Vec<String>, ImportError> {
    let file = std::fs::File::open(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let prompts = read_prompts(file)?;
    if prompts.is_empty() {
        return Err(ImportError::Empty(path.to_path_buf()));
    }
    tracing::info!("Imported {} prompt(s) from {:?}", prompts.len(), path);
    Ok(prompts)
}

/// Parse prompts from CSV text. An empty result is not an error here.
pub fn parse_prompts(text: &str) -> Result<Vec<String>, ImportError> {
    read_prompts(text.as_bytes())
}

fn read_prompts<R: Read>(reader: R) -> Result<Vec<String>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut prompts = Vec::new();
    for record in reader.records() {
        let record = record?;
        prompts.extend(
            record
                .iter()
                .filter(|cell| !cell.is_empty())
                .map(str::to_string),
        );
    }
    Ok(prompts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_one_prompt_per_line() {
        let prompts = parse_prompts("a red fox\na blue whale\n").unwrap();
        assert_eq!(prompts, vec!["a red fox", "a blue whale"]);
    }

    #[test]
    fn test_cells_are_flattened_in_order() {
        let prompts = parse_prompts("a,b,c\nd\ne,f").unwrap();
        assert_eq!(prompts, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_blank_cells_and_lines_dropped() {
        let prompts = parse_prompts("a, ,b\n\n  \n,c,").unwrap();
        assert_eq!(prompts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_cells_keep_commas() {
        let prompts =
            parse_prompts("\"a castle, at night\",\"  padded  \"\n").unwrap();
        assert_eq!(prompts, vec!["a castle, at night", "padded"]);
    }

    #[test]
    fn test_first_row_is_not_a_header() {
        let prompts = parse_prompts("prompt\nsunset over dunes").unwrap();
        assert_eq!(prompts, vec!["prompt", "sunset over dunes"]);
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a lighthouse,a harbor").unwrap();
        writeln!(file, "a storm").unwrap();

        let prompts = read_prompts_from_path(file.path()).unwrap();
        assert_eq!(prompts, vec!["a lighthouse", "a harbor", "a storm"]);
    }

    #[test]
    fn test_empty_file_is_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_prompts_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::Empty(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_prompts_from_path(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, ImportError::Read { .. }));
    }
}
