//! Adviser vector store
//!
//! Loads the adviser dataset once and keeps both embedding kinds stacked as
//! row-major matrices for bulk comparison. The store is immutable after
//! construction and is either fully loaded or not built at all.
//!
//! # Dataset format
//!
//! CSV with a header row. Required columns:
//!
//! | column                            | content                         |
//! |-----------------------------------|---------------------------------|
//! | `name`                            | adviser display name            |
//! | `area_of_expertise_description`   | expertise text                  |
//! | `past_thesis_topics_supervised`   | supervised thesis topics        |
//! | `expertise_embeddings`            | numeric array literal, `[a, b]` |
//! | `past_thesis_embeddings`          | numeric array literal, `[a, b]` |
//!
//! Other columns are ignored.

use serde::Deserialize;
use std::io;
use std::path::Path;

use super::embedding::Embedder;
use crate::core::adviser::Adviser;
use crate::error::{AdvisifyError, Result};

pub const EXPERTISE_COLUMN: &str = "expertise_embeddings";
pub const PAST_THESIS_COLUMN: &str = "past_thesis_embeddings";

/// N×D matrix stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dimension: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Stack rows that are all `dimension` long
    pub fn from_rows<'a, I>(dimension: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut data = Vec::new();
        for row in rows {
            debug_assert_eq!(row.len(), dimension);
            data.extend_from_slice(row);
        }
        Self { dimension, data }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dimension.max(1))
    }
}

/// Raw dataset row before embedding parsing
#[derive(Debug, Deserialize)]
struct AdviserRow {
    name: String,
    area_of_expertise_description: String,
    past_thesis_topics_supervised: String,
    expertise_embeddings: String,
    past_thesis_embeddings: String,
}

/// Dataset row without embeddings, as fed to [`VectorStore::embed_from_reader`]
#[derive(Debug, Deserialize)]
struct AdviserTextRow {
    name: String,
    area_of_expertise_description: String,
    past_thesis_topics_supervised: String,
}

/// Immutable adviser catalog with stacked embeddings
#[derive(Debug, Clone)]
pub struct VectorStore {
    advisers: Vec<Adviser>,
    expertise: EmbeddingMatrix,
    past_thesis: EmbeddingMatrix,
}

impl VectorStore {
    /// Load a dataset file
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            advisers = store.len(),
            dimension = store.dimension(),
            "loaded adviser dataset"
        );

        Ok(store)
    }

    /// Parse a CSV dataset; any bad row fails the whole load
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut advisers = Vec::new();

        for (index, result) in reader.deserialize::<AdviserRow>().enumerate() {
            // Header is line 1
            let fallback_line = index as u64 + 2;
            let row = result.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                AdvisifyError::data_format(line, "record", e.to_string())
            })?;

            let expertise_embedding = parse_embedding_literal(&row.expertise_embeddings)
                .map_err(|msg| AdvisifyError::data_format(fallback_line, EXPERTISE_COLUMN, msg))?;
            let past_thesis_embedding = parse_embedding_literal(&row.past_thesis_embeddings)
                .map_err(|msg| AdvisifyError::data_format(fallback_line, PAST_THESIS_COLUMN, msg))?;

            advisers.push(Adviser {
                name: row.name,
                expertise_description: row.area_of_expertise_description,
                past_thesis_topics: row.past_thesis_topics_supervised,
                expertise_embedding,
                past_thesis_embedding,
            });
        }

        Self::from_advisers(advisers)
    }

    /// Compute both embeddings for a CSV holding only the text columns
    ///
    /// Expertise vectors come from `area_of_expertise_description`, past
    /// thesis vectors from `past_thesis_topics_supervised`. Existing embedding
    /// columns are ignored and recomputed.
    pub fn embed_from_reader<R, E>(reader: R, embedder: &E) -> Result<Self>
    where
        R: io::Read,
        E: Embedder + ?Sized,
    {
        let mut reader = csv::Reader::from_reader(reader);
        let mut advisers = Vec::new();

        for (index, result) in reader.deserialize::<AdviserTextRow>().enumerate() {
            let row = result.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(index as u64 + 2);
                AdvisifyError::data_format(line, "record", e.to_string())
            })?;

            let expertise_embedding = embedder.encode(&row.area_of_expertise_description)?;
            let past_thesis_embedding = embedder.encode(&row.past_thesis_topics_supervised)?;
            tracing::debug!(adviser = %row.name, "embedded adviser profile");

            advisers.push(Adviser {
                name: row.name,
                expertise_description: row.area_of_expertise_description,
                past_thesis_topics: row.past_thesis_topics_supervised,
                expertise_embedding,
                past_thesis_embedding,
            });
        }

        Self::from_advisers(advisers)
    }

    /// Build from in-memory advisers, checking every invariant
    ///
    /// Row `i` of both matrices belongs to `advisers[i]`.
    pub fn from_advisers(advisers: Vec<Adviser>) -> Result<Self> {
        let first = advisers
            .first()
            .ok_or_else(|| AdvisifyError::data_format(1, "dataset", "no advisers found"))?;
        let dimension = first.expertise_embedding.len();

        for (index, adviser) in advisers.iter().enumerate() {
            let line = index as u64 + 2;

            if adviser.name.trim().is_empty() {
                return Err(AdvisifyError::data_format(line, "name", "adviser name is empty"));
            }

            for (column, embedding) in [
                (EXPERTISE_COLUMN, &adviser.expertise_embedding),
                (PAST_THESIS_COLUMN, &adviser.past_thesis_embedding),
            ] {
                if embedding.is_empty() {
                    return Err(AdvisifyError::data_format(line, column, "embedding is empty"));
                }
                if embedding.len() != dimension {
                    return Err(AdvisifyError::dimension_mismatch(
                        format!("{} of '{}' (line {})", column, adviser.name, line),
                        dimension,
                        embedding.len(),
                    ));
                }
                if embedding.iter().any(|v| !v.is_finite()) {
                    return Err(AdvisifyError::data_format(
                        line,
                        column,
                        "embedding contains a non-finite value",
                    ));
                }
            }
        }

        let expertise = EmbeddingMatrix::from_rows(
            dimension,
            advisers.iter().map(|a| a.expertise_embedding.as_slice()),
        );
        let past_thesis = EmbeddingMatrix::from_rows(
            dimension,
            advisers.iter().map(|a| a.past_thesis_embedding.as_slice()),
        );

        Ok(Self {
            advisers,
            expertise,
            past_thesis,
        })
    }

    pub fn len(&self) -> usize {
        self.advisers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advisers.is_empty()
    }

    /// Embedding length D shared by every adviser
    pub fn dimension(&self) -> usize {
        self.expertise.dimension()
    }

    /// Advisers in load order
    pub fn advisers(&self) -> &[Adviser] {
        &self.advisers
    }

    pub fn get(&self, index: usize) -> Option<&Adviser> {
        self.advisers.get(index)
    }

    pub fn expertise_matrix(&self) -> &EmbeddingMatrix {
        &self.expertise
    }

    pub fn past_thesis_matrix(&self) -> &EmbeddingMatrix {
        &self.past_thesis
    }

    /// Write the store back in dataset format
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        write_dataset(writer, &self.advisers)
    }
}

/// Write advisers as a dataset CSV
pub fn write_dataset<W: io::Write>(writer: W, advisers: &[Adviser]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([
        "name",
        "area_of_expertise_description",
        "past_thesis_topics_supervised",
        EXPERTISE_COLUMN,
        PAST_THESIS_COLUMN,
    ])?;

    for adviser in advisers {
        let expertise = format_embedding_literal(&adviser.expertise_embedding);
        let past_thesis = format_embedding_literal(&adviser.past_thesis_embedding);
        writer.write_record([
            adviser.name.as_str(),
            adviser.expertise_description.as_str(),
            adviser.past_thesis_topics.as_str(),
            expertise.as_str(),
            past_thesis.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Parse a numeric array literal such as `[0.1, -2e-3, 4]`
///
/// Values are read as JSON numbers; anything else, including values that
/// overflow `f32`, is rejected with a message.
pub fn parse_embedding_literal(text: &str) -> std::result::Result<Vec<f32>, String> {
    let values: Vec<f64> = serde_json::from_str(text.trim())
        .map_err(|e| format!("not a numeric array literal: {}", e))?;

    values
        .into_iter()
        .map(|v| {
            let narrowed = v as f32;
            if narrowed.is_finite() {
                Ok(narrowed)
            } else {
                Err(format!("value {} is out of range", v))
            }
        })
        .collect()
}

/// Format an embedding as `[a, b, ...]`; round-trips through the parser
pub fn format_embedding_literal(embedding: &[f32]) -> String {
    let parts: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,area_of_expertise_description,past_thesis_topics_supervised,expertise_embeddings,past_thesis_embeddings\n";

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_parse_embedding_literal() {
        assert_eq!(parse_embedding_literal("[0.1, 0.2, -3]").unwrap(), vec![0.1, 0.2, -3.0]);
        assert_eq!(parse_embedding_literal(" [1e-2,2] ").unwrap(), vec![0.01, 2.0]);
        assert!(parse_embedding_literal("[]").unwrap().is_empty());

        assert!(parse_embedding_literal("0.1, 0.2").is_err());
        assert!(parse_embedding_literal("[0.1, 'a']").is_err());
        assert!(parse_embedding_literal("[1e300]").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let embedding = vec![0.1, -0.25, 3.0e-7, 1.0];
        let literal = format_embedding_literal(&embedding);
        assert!(literal.starts_with("[0.1, -0.25"));
        assert_eq!(parse_embedding_literal(&literal).unwrap(), embedding);
    }

    #[test]
    fn test_load_from_reader() -> Result<()> {
        let data = csv(&[
            r#"Dr. Cruz,Machine learning,Crop yield models,"[1.0, 0.0]","[0.5, 0.5]""#,
            r#"Dr. Reyes,Networks,"Intrusion detection, VPNs","[0.0, 1.0]","[0.2, 0.8]""#,
        ]);

        let store = VectorStore::from_reader(data.as_bytes())?;
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), 2);
        assert_eq!(store.get(1).unwrap().past_thesis_topics, "Intrusion detection, VPNs");
        assert_eq!(store.expertise_matrix().row(0), Some(&[1.0f32, 0.0][..]));
        assert_eq!(store.past_thesis_matrix().row(1), Some(&[0.2f32, 0.8][..]));
        assert_eq!(store.expertise_matrix().len(), 2);
        assert_eq!(store.expertise_matrix().row(2), None);
        assert_eq!(store.expertise_matrix().row(usize::MAX), None);
        // start fits in usize, start + dimension does not
        assert_eq!(store.expertise_matrix().row(usize::MAX / 2), None);
        Ok(())
    }

    #[test]
    fn test_extra_columns_ignored() -> Result<()> {
        let data = "idx,name,area_of_expertise_description,past_thesis_topics_supervised,expertise_embeddings,past_thesis_embeddings\n\
                    0,Dr. Cruz,ML,Crops,\"[1, 0]\",\"[0, 1]\"\n";
        let store = VectorStore::from_reader(data.as_bytes())?;
        assert_eq!(store.advisers()[0].name, "Dr. Cruz");
        Ok(())
    }

    #[test]
    fn test_unparseable_embedding_fails_load() {
        let data = csv(&[
            r#"Dr. Cruz,ML,Crops,"[1.0, 0.0]","[0.5, 0.5]""#,
            r#"Dr. Reyes,Networks,VPNs,"[0.0, oops]","[0.2, 0.8]""#,
        ]);

        match VectorStore::from_reader(data.as_bytes()) {
            Err(AdvisifyError::DataFormat { line, field, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(field, EXPERTISE_COLUMN);
            }
            other => panic!("expected DataFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_dimension_mismatch_across_advisers() {
        let data = csv(&[
            r#"Dr. Cruz,ML,Crops,"[1.0, 0.0]","[0.5, 0.5]""#,
            r#"Dr. Reyes,Networks,VPNs,"[0.0, 1.0, 0.0]","[0.2, 0.8, 0.0]""#,
        ]);

        match VectorStore::from_reader(data.as_bytes()) {
            Err(AdvisifyError::DimensionMismatch { expected, found, .. }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_dimension_mismatch_within_adviser() {
        let data = csv(&[r#"Dr. Cruz,ML,Crops,"[1.0, 0.0]","[0.5]""#]);
        assert!(matches!(
            VectorStore::from_reader(data.as_bytes()),
            Err(AdvisifyError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_column_fails_load() {
        let data = "name,expertise_embeddings\nDr. Cruz,\"[1.0]\"\n";
        assert!(matches!(
            VectorStore::from_reader(data.as_bytes()),
            Err(AdvisifyError::DataFormat { .. })
        ));
    }

    #[test]
    fn test_empty_name_and_empty_dataset() {
        let data = csv(&[r#"  ,ML,Crops,"[1.0]","[0.5]""#]);
        assert!(matches!(
            VectorStore::from_reader(data.as_bytes()),
            Err(AdvisifyError::DataFormat { .. })
        ));

        assert!(matches!(
            VectorStore::from_reader(HEADER.as_bytes()),
            Err(AdvisifyError::DataFormat { .. })
        ));
    }

    #[test]
    fn test_empty_embedding_rejected() {
        let data = csv(&[r#"Dr. Cruz,ML,Crops,[],[]"#]);
        assert!(matches!(
            VectorStore::from_reader(data.as_bytes()),
            Err(AdvisifyError::DataFormat { .. })
        ));
    }

    #[test]
    fn test_embed_from_reader() -> Result<()> {
        use crate::search::embedding::{HtpEmbedder, HTP_DIM};

        let data = "name,area_of_expertise_description,past_thesis_topics_supervised\n\
                    Dr. Cruz,Machine learning,Crop yield prediction\n\
                    Dr. Reyes,Computer networks,\"Intrusion detection, VPNs\"\n";
        let embedder = HtpEmbedder::new();

        let store = VectorStore::embed_from_reader(data.as_bytes(), &embedder)?;
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), HTP_DIM);
        assert_eq!(
            store.expertise_matrix().row(0).unwrap(),
            embedder.encode("Machine learning")?.as_slice()
        );
        assert_eq!(
            store.past_thesis_matrix().row(1).unwrap(),
            embedder.encode("Intrusion detection, VPNs")?.as_slice()
        );
        Ok(())
    }

    #[test]
    fn test_write_then_load_file() -> Result<()> {
        let advisers = vec![
            Adviser::new("Dr. Cruz", "ML", "Crops, yields", vec![0.6, 0.8], vec![1.0, 0.0]),
            Adviser::new("Dr. Reyes", "Networks", "VPNs", vec![0.0, 1.0], vec![0.3, -0.1]),
        ];
        let store = VectorStore::from_advisers(advisers.clone())?;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("advisers.csv");
        store.write_csv(std::fs::File::create(&path)?)?;

        let loaded = VectorStore::load(&path)?;
        assert_eq!(loaded.advisers(), advisers.as_slice());
        assert_eq!(loaded.expertise_matrix(), store.expertise_matrix());
        Ok(())
    }
}
