use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Subscriber;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes all subscribers to a tabular file and returns where it was
/// written. Stateless; failures are reported to the caller, who still owes
/// the requester an answer.
#[async_trait]
pub trait ReportExporter: Send + Sync {
    async fn export(&self, subscribers: &[Subscriber]) -> Result<PathBuf, ReportError>;
}

pub struct CsvFileExporter {
    path: PathBuf,
}

impl CsvFileExporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

#[async_trait]
impl ReportExporter for CsvFileExporter {
    async fn export(&self, subscribers: &[Subscriber]) -> Result<PathBuf, ReportError> {
        let mut out =
            String::from("phone,nombre,cedula,plan,consumos,consulta_gratis,afiliado_desde\n");
        for s in subscribers {
            let row = [
                csv_field(&s.phone),
                csv_field(&s.nombre),
                csv_field(&s.cedula),
                csv_field(s.plan.map(|p| p.label()).unwrap_or("")),
                s.consumos.to_string(),
                s.consulta_gratis.to_string(),
                s.afiliado_desde.to_rfc3339(),
            ];
            out.push_str(&row.join(","));
            out.push('\n');
        }
        tokio::fs::write(&self.path, out).await?;
        Ok(self.path.clone())
    }
}

/// Quotes a field when it contains a comma, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
