use std::path::Path;

use crate::error::IoError;

/// Parse the text form of a convolution kernel.
///
/// Each line is one kernel row of comma separated numbers. Whitespace around
/// the whole text and around every value is ignored.
///
/// # Arguments
///
/// * `text` - The kernel text.
///
/// # Returns
///
/// The kernel rows, top to bottom.
///
/// # Errors
///
/// [`IoError::InvalidKernelData`] for the first value that is not a number,
/// and [`IoError::InvalidKernelShape`] if a row length differs from the first row.
///
/// # Examples
///
/// ```
/// use convmask_io::parse_kernel;
///
/// let rows = parse_kernel("0, 1, 0\n1, -4, 1\n0, 1, 0\n").unwrap();
/// assert_eq!(rows[1], vec![1.0, -4.0, 1.0]);
/// ```
pub fn parse_kernel(text: &str) -> Result<Vec<Vec<f64>>, IoError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (row_idx, line) in text.trim().split('\n').enumerate() {
        let row = line
            .split(',')
            .enumerate()
            .map(|(col_idx, cell)| {
                let cell = cell.trim();
                cell.parse::<f64>().map_err(|_| IoError::InvalidKernelData {
                    row: row_idx + 1,
                    column: col_idx + 1,
                    value: cell.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(IoError::InvalidKernelShape {
                    row: row_idx + 1,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }

        rows.push(row);
    }

    Ok(rows)
}

/// Read and parse a kernel file, see [`parse_kernel`].
///
/// # Arguments
///
/// * `file_path` - The path to the kernel file.
pub fn read_kernel_file(file_path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let text = std::fs::read_to_string(file_path)?;
    let rows = parse_kernel(&text)?;
    log::debug!(
        "loaded {} kernel rows from {}",
        rows.len(),
        file_path.display()
    );
    Ok(rows)
}
