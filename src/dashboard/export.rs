//! Static export of a dashboard view

use super::Dashboard;
use crate::render::{RenderConfig, RenderError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors writing an export bundle
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SummaryExport<'a> {
    metric: &'a str,
    values: std::collections::BTreeMap<String, f64>,
    top: &'a [crate::aggregate::RankedEntry],
}

fn write(dir: &Path, name: &str, body: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(name);
    std::fs::write(&path, body).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Write `map.svg`, `bars.svg`, `lines.svg`, `index.html` and `summary.json`
///
/// The page references nothing external, so the directory can be opened
/// straight from disk. Returns the written paths.
pub fn export_static(
    dashboard: &Dashboard,
    config: &RenderConfig,
    dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let summary = SummaryExport {
        metric: dashboard.summary().metric(),
        values: dashboard.summary().to_map(),
        top: dashboard.ranking(),
    };

    let written = vec![
        write(dir, "map.svg", &dashboard.render_map(config)?)?,
        write(dir, "bars.svg", &dashboard.render_bars(config)?)?,
        write(dir, "lines.svg", &dashboard.render_lines(config)?)?,
        write(dir, "index.html", &dashboard.render_page(config)?)?,
        write(dir, "summary.json", &serde_json::to_string_pretty(&summary)?)?,
    ];

    tracing::info!(dir = ?dir, files = written.len(), "Static dashboard written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::JoinAliases;
    use crate::config::DashboardConfig;
    use crate::dataset::{CaseRecord, DashboardData};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn dashboard() -> Dashboard {
        let day = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let data = DashboardData::new(
            vec![
                CaseRecord::new("India", day).metric("total_cases", 43_000_000.0),
                CaseRecord::new("Brazil", day).metric("total_cases", 31_000_000.0),
            ],
            vec!["total_cases".to_string()],
            Vec::new(),
        );
        Dashboard::new(Arc::new(data), JoinAliases::empty(), &DashboardConfig::default())
    }

    #[test]
    fn test_writes_bundle() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("site");
        let written = export_static(&dashboard(), &RenderConfig::default(), &out).unwrap();

        assert_eq!(written.len(), 5);
        for path in &written {
            assert!(path.exists(), "{:?} missing", path);
        }

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["metric"], "total_cases");
        assert_eq!(summary["values"]["India"], 43_000_000.0);
        assert_eq!(summary["top"][0]["country"], "India");

        let page = std::fs::read_to_string(out.join("index.html")).unwrap();
        assert!(page.contains("Top 2 by Total Cases"));
    }

    #[test]
    fn test_unwritable_target() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = export_static(&dashboard(), &RenderConfig::default(), &blocker).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
