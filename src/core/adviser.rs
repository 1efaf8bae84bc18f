use serde::Serialize;

/// One adviser from the catalog
///
/// Display fields are serialized for output; the two embeddings stay internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adviser {
    pub name: String,
    pub expertise_description: String,
    pub past_thesis_topics: String,
    #[serde(skip)]
    pub expertise_embedding: Vec<f32>,
    #[serde(skip)]
    pub past_thesis_embedding: Vec<f32>,
}

impl Adviser {
    pub fn new(
        name: impl Into<String>,
        expertise_description: impl Into<String>,
        past_thesis_topics: impl Into<String>,
        expertise_embedding: Vec<f32>,
        past_thesis_embedding: Vec<f32>,
    ) -> Self {
        Self {
            name: name.into(),
            expertise_description: expertise_description.into(),
            past_thesis_topics: past_thesis_topics.into(),
            expertise_embedding,
            past_thesis_embedding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_skips_embeddings() {
        let adviser = Adviser::new(
            "Dr. Santos",
            "Machine learning",
            "Crop yield prediction",
            vec![0.1, 0.2],
            vec![0.3, 0.4],
        );

        let json = serde_json::to_value(&adviser).unwrap();
        assert_eq!(json["name"], "Dr. Santos");
        assert_eq!(json["expertise_description"], "Machine learning");
        assert!(json.get("expertise_embedding").is_none());
        assert!(json.get("past_thesis_embedding").is_none());
    }
}
