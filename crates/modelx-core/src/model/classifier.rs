use serde::{Deserialize, Serialize};

use super::ids::{new_uuid, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierType {
    Block,
    ConstraintBlock,
    Requirement,
    UmlActor,
    UmlUseCase,
    UmlSystemBoundary,
    UmlActivity,
    UmlState,
    UmlDiagramReference,
    UmlNode,
    UmlComponent,
    UmlPart,
    UmlInterface,
    UmlPackage,
    UmlClass,
    UmlObject,
    UmlArtifact,
    Comment,
}

impl ClassifierType {
    pub const ALL: [ClassifierType; 18] = [
        ClassifierType::Block,
        ClassifierType::ConstraintBlock,
        ClassifierType::Requirement,
        ClassifierType::UmlActor,
        ClassifierType::UmlUseCase,
        ClassifierType::UmlSystemBoundary,
        ClassifierType::UmlActivity,
        ClassifierType::UmlState,
        ClassifierType::UmlDiagramReference,
        ClassifierType::UmlNode,
        ClassifierType::UmlComponent,
        ClassifierType::UmlPart,
        ClassifierType::UmlInterface,
        ClassifierType::UmlPackage,
        ClassifierType::UmlClass,
        ClassifierType::UmlObject,
        ClassifierType::UmlArtifact,
        ClassifierType::Comment,
    ];

    pub fn code(self) -> i32 {
        match self {
            ClassifierType::Block => 0x01,
            ClassifierType::ConstraintBlock => 0x02,
            ClassifierType::Requirement => 0x03,
            ClassifierType::UmlActor => 0x11,
            ClassifierType::UmlUseCase => 0x12,
            ClassifierType::UmlSystemBoundary => 0x13,
            ClassifierType::UmlActivity => 0x21,
            ClassifierType::UmlState => 0x22,
            ClassifierType::UmlDiagramReference => 0x23,
            ClassifierType::UmlNode => 0x31,
            ClassifierType::UmlComponent => 0x32,
            ClassifierType::UmlPart => 0x33,
            ClassifierType::UmlInterface => 0x34,
            ClassifierType::UmlPackage => 0x35,
            ClassifierType::UmlClass => 0x36,
            ClassifierType::UmlObject => 0x37,
            ClassifierType::UmlArtifact => 0x38,
            ClassifierType::Comment => 0x41,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// Classifier - a named model element that diagrams can show
///
/// Names are unique within a model; the controllers enforce this on
/// create and rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    pub id: RowId,
    pub main_type: ClassifierType,
    pub stereotype: String,
    pub name: String,
    pub description: String,
    pub x_order: i32,
    pub y_order: i32,
    pub list_order: i32,
    pub uuid: String,
}

impl Classifier {
    /// Create a draft classifier; the store assigns the id on insert
    pub fn new(main_type: ClassifierType, name: impl Into<String>) -> Self {
        Self {
            id: RowId::VOID,
            main_type,
            stereotype: String::new(),
            name: name.into(),
            description: String::new(),
            x_order: 0,
            y_order: 0,
            list_order: 0,
            uuid: new_uuid(),
        }
    }
}
