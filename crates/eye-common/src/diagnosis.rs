use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::json_extract::extract_json;

/// Structured result of one eye image analysis.
///
/// Every field is required: a model reply missing any of them does not deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub diagnosis: String,
    pub description: String,
    pub symptoms: String,
    pub home_remedies: Vec<String>,
    pub medicines: Vec<String>,
    pub disclaimer: String,
}

impl DiagnosticRecord {
    /// Parse a record out of raw model output, tolerating prose around the JSON object.
    pub fn from_model_output(text: &str) -> Result<Self, ExtractError> {
        extract_json(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
  "diagnosis": "Conjunctivitis",
  "description": "Inflammation of the conjunctiva.",
  "symptoms": "Redness, itching, discharge",
  "home_remedies": ["Warm compress", "Avoid touching eyes"],
  "medicines": ["Artificial tears", "Antibiotic drops"],
  "disclaimer": "Consult an ophthalmologist."
}"#;

    #[test]
    fn parses_documented_schema() {
        let record = DiagnosticRecord::from_model_output(REPLY).unwrap();
        assert_eq!(record.diagnosis, "Conjunctivitis");
        assert_eq!(record.description, "Inflammation of the conjunctiva.");
        assert_eq!(record.symptoms, "Redness, itching, discharge");
        assert_eq!(record.home_remedies, vec!["Warm compress", "Avoid touching eyes"]);
        assert_eq!(record.medicines, vec!["Artificial tears", "Antibiotic drops"]);
        assert_eq!(record.disclaimer, "Consult an ophthalmologist.");
    }

    #[test]
    fn ignores_unknown_fields() {
        let text = r#"{"diagnosis":"a","description":"b","symptoms":"c",
            "home_remedies":[],"medicines":[],"disclaimer":"d","confidence":0.7}"#;
        let record = DiagnosticRecord::from_model_output(text).unwrap();
        assert_eq!(record.diagnosis, "a");
        assert!(record.home_remedies.is_empty());
    }

    #[test]
    fn rejects_missing_field() {
        let text = r#"{"diagnosis":"a","description":"b","symptoms":"c",
            "home_remedies":[],"medicines":[]}"#;
        let err = DiagnosticRecord::from_model_output(text).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidJson(_)));
        assert!(err.to_string().contains("disclaimer"));
    }

    #[test]
    fn rejects_remedies_given_as_string() {
        let text = r#"{"diagnosis":"a","description":"b","symptoms":"c",
            "home_remedies":"rest","medicines":[],"disclaimer":"d"}"#;
        assert!(DiagnosticRecord::from_model_output(text).is_err());
    }
}
