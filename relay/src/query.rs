use crate::errors::RelayError;
use serde::{Deserialize, Serialize};

/// A single form submission.
///
/// Missing fields decode as empty strings so they fail validation the same
/// way empty fields do.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineQuery {
    #[serde(default)]
    pub medicine_name: String,
    #[serde(default)]
    pub disease: String,
}

impl MedicineQuery {
    pub fn new(medicine_name: impl Into<String>, disease: impl Into<String>) -> Self {
        MedicineQuery {
            medicine_name: medicine_name.into(),
            disease: disease.into(),
        }
    }

    /// Both fields must contain something other than whitespace.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.medicine_name.trim().is_empty() || self.disease.trim().is_empty() {
            return Err(RelayError::Validation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names() {
        let query = MedicineQuery::new("Paracetamol", "Fever");
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"medicineName": "Paracetamol", "disease": "Fever"})
        );
    }

    #[test]
    fn test_missing_fields_decode_empty() {
        let query: MedicineQuery = serde_json::from_value(json!({"disease": "Fever"})).unwrap();
        assert_eq!(query, MedicineQuery::new("", "Fever"));
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(MedicineQuery::new("Paracetamol", "Fever").validate().is_ok());
        assert!(MedicineQuery::new(" Paracetamol ", "Fever\n").validate().is_ok());
        assert!(matches!(
            MedicineQuery::new("", "x").validate(),
            Err(RelayError::Validation)
        ));
        assert!(matches!(
            MedicineQuery::new("x", "").validate(),
            Err(RelayError::Validation)
        ));
        assert!(matches!(
            MedicineQuery::new("   ", "x").validate(),
            Err(RelayError::Validation)
        ));
    }
}
