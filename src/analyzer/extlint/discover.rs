//! Chart discovery.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::debug;
use walkdir::WalkDir;

use crate::analyzer::extlint::helm::stage::is_chart_archive;
use crate::error::{ExtlintError, Result};

/// Collect the charts to lint.
///
/// Roots always come first, in input order. With `with_subcharts`, each
/// root's `charts/` directory is walked in file-name order and every
/// directory holding a Chart.yaml, and every `.tgz`/`.tar.gz` file, is
/// appended. Duplicates are kept.
pub fn discover_charts(roots: &[PathBuf], with_subcharts: bool) -> Result<Vec<PathBuf>> {
    let mut charts = roots.to_vec();
    if !with_subcharts {
        return Ok(charts);
    }

    for root in roots {
        let charts_dir = root.join("charts");
        for entry in WalkDir::new(&charts_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 && is_not_found(&e) => {
                    debug!("{} has no charts directory", root.display());
                    break;
                }
                Err(source) => {
                    return Err(ExtlintError::Walk {
                        path: charts_dir,
                        source,
                    });
                }
            };

            let path = entry.path();
            if entry.file_type().is_file() {
                if entry.file_name() == "Chart.yaml" {
                    if let Some(dir) = path.parent() {
                        debug!("Found subchart {}", dir.display());
                        charts.push(dir.to_path_buf());
                    }
                } else if is_chart_archive(path) {
                    debug!("Found packaged subchart {}", path.display());
                    charts.push(path.to_path_buf());
                }
            }
        }
    }

    Ok(charts)
}

fn is_not_found(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|e| e.kind() == ErrorKind::NotFound)
}
