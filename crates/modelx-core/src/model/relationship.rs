use serde::{Deserialize, Serialize};

use super::ids::{new_uuid, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Dependency,
    Association,
    Aggregation,
    Composition,
    Generalization,
    Realization,
    AsyncCall,
    SyncCall,
    ReturnCall,
    CommunicationPath,
    ControlFlow,
    ObjectFlow,
    Deploy,
    Manifest,
    Extend,
    Include,
    Containment,
    Refine,
    Trace,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 19] = [
        RelationshipType::Dependency,
        RelationshipType::Association,
        RelationshipType::Aggregation,
        RelationshipType::Composition,
        RelationshipType::Generalization,
        RelationshipType::Realization,
        RelationshipType::AsyncCall,
        RelationshipType::SyncCall,
        RelationshipType::ReturnCall,
        RelationshipType::CommunicationPath,
        RelationshipType::ControlFlow,
        RelationshipType::ObjectFlow,
        RelationshipType::Deploy,
        RelationshipType::Manifest,
        RelationshipType::Extend,
        RelationshipType::Include,
        RelationshipType::Containment,
        RelationshipType::Refine,
        RelationshipType::Trace,
    ];

    pub fn code(self) -> i32 {
        match self {
            RelationshipType::Dependency => 0x01,
            RelationshipType::Association => 0x02,
            RelationshipType::Aggregation => 0x03,
            RelationshipType::Composition => 0x04,
            RelationshipType::Generalization => 0x05,
            RelationshipType::Realization => 0x06,
            RelationshipType::AsyncCall => 0x11,
            RelationshipType::SyncCall => 0x12,
            RelationshipType::ReturnCall => 0x13,
            RelationshipType::CommunicationPath => 0x14,
            RelationshipType::ControlFlow => 0x21,
            RelationshipType::ObjectFlow => 0x22,
            RelationshipType::Deploy => 0x31,
            RelationshipType::Manifest => 0x32,
            RelationshipType::Extend => 0x41,
            RelationshipType::Include => 0x42,
            RelationshipType::Containment => 0x51,
            RelationshipType::Refine => 0x52,
            RelationshipType::Trace => 0x53,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// Relationship - a directed edge between two classifiers, optionally
/// anchored at a feature on either end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RowId,
    pub main_type: RelationshipType,
    pub from_classifier_id: RowId,
    pub from_feature_id: Option<RowId>,
    pub to_classifier_id: RowId,
    pub to_feature_id: Option<RowId>,
    pub name: String,
    pub description: String,
    pub list_order: i32,
    pub uuid: String,
}

impl Relationship {
    /// Create a draft relationship between two classifiers
    pub fn new(main_type: RelationshipType, from_classifier_id: RowId, to_classifier_id: RowId) -> Self {
        Self {
            id: RowId::VOID,
            main_type,
            from_classifier_id,
            from_feature_id: None,
            to_classifier_id,
            to_feature_id: None,
            name: String::new(),
            description: String::new(),
            list_order: 0,
            uuid: new_uuid(),
        }
    }

    /// True if either end is the given classifier
    pub fn touches_classifier(&self, classifier_id: RowId) -> bool {
        self.from_classifier_id == classifier_id || self.to_classifier_id == classifier_id
    }

    /// True if either end is anchored at the given feature
    pub fn touches_feature(&self, feature_id: RowId) -> bool {
        self.from_feature_id == Some(feature_id) || self.to_feature_id == Some(feature_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for t in RelationshipType::ALL {
            assert_eq!(RelationshipType::from_code(t.code()), Some(t));
        }
    }

    #[test]
    fn test_touches() {
        let mut r = Relationship::new(RelationshipType::SyncCall, RowId::new(1), RowId::new(2));
        r.to_feature_id = Some(RowId::new(9));
        assert!(r.touches_classifier(RowId::new(1)));
        assert!(r.touches_classifier(RowId::new(2)));
        assert!(!r.touches_classifier(RowId::new(3)));
        assert!(r.touches_feature(RowId::new(9)));
        assert!(!r.touches_feature(RowId::new(1)));
    }
}
