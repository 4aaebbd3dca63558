use serde::{Deserialize, Serialize};

use super::ids::{new_uuid, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Property,
    Operation,
    Port,
    ProvidedInterface,
    RequiredInterface,
    /// Auto-managed: exists exactly while the owner is bound into a scenario diagram
    Lifeline,
}

impl FeatureType {
    pub const ALL: [FeatureType; 6] = [
        FeatureType::Property,
        FeatureType::Operation,
        FeatureType::Port,
        FeatureType::ProvidedInterface,
        FeatureType::RequiredInterface,
        FeatureType::Lifeline,
    ];

    pub fn code(self) -> i32 {
        match self {
            FeatureType::Property => 0,
            FeatureType::Operation => 1,
            FeatureType::Port => 2,
            FeatureType::ProvidedInterface => 3,
            FeatureType::RequiredInterface => 4,
            FeatureType::Lifeline => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// Feature - a property, operation, port, interface or lifeline of a classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: RowId,
    /// Owning classifier
    pub classifier_id: RowId,
    pub main_type: FeatureType,
    pub key: String,
    pub value: String,
    pub description: String,
    pub list_order: i32,
    pub uuid: String,
}

impl Feature {
    /// Create a draft feature; the store assigns the id on insert
    pub fn new(classifier_id: RowId, main_type: FeatureType, key: impl Into<String>) -> Self {
        Self {
            id: RowId::VOID,
            classifier_id,
            main_type,
            key: key.into(),
            value: String::new(),
            description: String::new(),
            list_order: 0,
            uuid: new_uuid(),
        }
    }

    pub fn is_lifeline(&self) -> bool {
        self.main_type == FeatureType::Lifeline
    }
}
