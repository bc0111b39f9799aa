//! Interactive file selection.
//!
//! Validation is a pure function; the prompt loop only does I/O around it.

use std::io::{BufRead, Write};

use crate::domain::{AppError, RemoteFileRef, Result};

/// Parses `input` as an index into a list of `bound` entries.
///
/// # Errors
/// Returns `InvalidSelection` for non-numeric input or an index outside
/// `[0, bound)`.
pub fn validate_selection(input: &str, bound: usize) -> Result<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(index) if index < bound => Ok(index),
        _ => Err(AppError::InvalidSelection {
            input: trimmed.to_string(),
            bound,
        }),
    }
}

/// Writes the numbered listing: `[index] name - id`.
///
/// # Errors
/// Returns error if the output cannot be written.
pub fn print_listing<W: Write>(files: &[RemoteFileRef], output: &mut W) -> Result<()> {
    for (index, file) in files.iter().enumerate() {
        writeln!(output, "[{index}] {} - {}", file.name, file.id)
            .map_err(|e| AppError::io("Failed to print file list", e))?;
    }
    Ok(())
}

/// Lists `files` and asks until a valid index is entered.
///
/// There is no retry limit; only end of input stops the loop.
///
/// # Errors
/// Returns error if input is closed or cannot be read.
pub fn prompt_selection<R: BufRead, W: Write>(
    files: &[RemoteFileRef],
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    print_listing(files, output)?;

    loop {
        write!(output, "Select a file index: ")
            .and_then(|()| output.flush())
            .map_err(|e| AppError::io("Failed to write prompt", e))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| AppError::io("Failed to read selection", e))?;
        if read == 0 {
            return Err(AppError::Io {
                message: "input closed before a file was selected".into(),
                source: None,
            });
        }

        match validate_selection(&line, files.len()) {
            Ok(index) => return Ok(index),
            Err(e) if e.is_recoverable() => {
                tracing::debug!("{}", e);
                writeln!(output, "Invalid index supplied. Try again")
                    .map_err(|e| AppError::io("Failed to write prompt", e))?;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn files(n: usize) -> Vec<RemoteFileRef> {
        (0..n)
            .map(|i| RemoteFileRef {
                id: format!("id-{i}"),
                name: format!("Sheet {i}"),
                mime_type: None,
                export_links: std::collections::HashMap::new(),
            })
            .collect()
    }

    #[test]
    fn test_every_index_in_range_is_accepted() {
        for bound in 1..5 {
            for i in 0..bound {
                assert_eq!(validate_selection(&format!("{i}\n"), bound).unwrap(), i);
            }
        }
    }

    #[test]
    fn test_out_of_range_and_garbage_rejected() {
        for input in ["3", "42", "-1", "abc", "", " ", "1.5"] {
            assert!(
                matches!(
                    validate_selection(input, 3),
                    Err(AppError::InvalidSelection { .. })
                ),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_list_rejects_everything() {
        assert!(validate_selection("0", 0).is_err());
    }

    #[test]
    fn test_prompt_retries_until_valid() {
        let mut input = Cursor::new("nope\n7\n1\n");
        let mut output = Vec::new();

        let index = prompt_selection(&files(3), &mut input, &mut output).unwrap();
        assert_eq!(index, 1);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with("[0] Sheet 0 - id-0\n[1] Sheet 1 - id-1\n[2] Sheet 2 - id-2\n"));
        assert_eq!(printed.matches("Invalid index supplied. Try again").count(), 2);
        assert_eq!(printed.matches("Select a file index: ").count(), 3);
    }

    #[test]
    fn test_prompt_stops_at_end_of_input() {
        let mut input = Cursor::new("9\n");
        let mut output = Vec::new();

        let err = prompt_selection(&files(2), &mut input, &mut output).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
