use serde::{Deserialize, Serialize};

use super::ids::{new_uuid, RowId};

/// Kind of a diagram
///
/// The numeric codes are persisted by the store and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    List,
    BoxDiagram,
    SysmlBlockDefinition,
    SysmlInternalBlock,
    SysmlParametric,
    SysmlRequirements,
    UmlDeployment,
    UmlComponent,
    UmlClass,
    UmlProfile,
    UmlPackage,
    UmlCompositeStructure,
    UmlActivity,
    UmlStateMachine,
    UmlUseCase,
    UmlInteractionOverview,
    UmlSequence,
    UmlCommunication,
    UmlTiming,
}

impl DiagramType {
    pub const ALL: [DiagramType; 19] = [
        DiagramType::List,
        DiagramType::BoxDiagram,
        DiagramType::SysmlBlockDefinition,
        DiagramType::SysmlInternalBlock,
        DiagramType::SysmlParametric,
        DiagramType::SysmlRequirements,
        DiagramType::UmlDeployment,
        DiagramType::UmlComponent,
        DiagramType::UmlClass,
        DiagramType::UmlProfile,
        DiagramType::UmlPackage,
        DiagramType::UmlCompositeStructure,
        DiagramType::UmlActivity,
        DiagramType::UmlStateMachine,
        DiagramType::UmlUseCase,
        DiagramType::UmlInteractionOverview,
        DiagramType::UmlSequence,
        DiagramType::UmlCommunication,
        DiagramType::UmlTiming,
    ];

    /// Stable storage code
    pub fn code(self) -> i32 {
        match self {
            DiagramType::List => 0x01,
            DiagramType::BoxDiagram => 0x02,
            DiagramType::SysmlBlockDefinition => 0x11,
            DiagramType::SysmlInternalBlock => 0x12,
            DiagramType::SysmlParametric => 0x13,
            DiagramType::SysmlRequirements => 0x14,
            DiagramType::UmlDeployment => 0x21,
            DiagramType::UmlComponent => 0x22,
            DiagramType::UmlClass => 0x23,
            DiagramType::UmlProfile => 0x24,
            DiagramType::UmlPackage => 0x25,
            DiagramType::UmlCompositeStructure => 0x26,
            DiagramType::UmlActivity => 0x31,
            DiagramType::UmlStateMachine => 0x32,
            DiagramType::UmlUseCase => 0x33,
            DiagramType::UmlInteractionOverview => 0x41,
            DiagramType::UmlSequence => 0x42,
            DiagramType::UmlCommunication => 0x43,
            DiagramType::UmlTiming => 0x44,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Scenario diagrams show interactions over time and need a lifeline
    /// for every classifier they bind.
    pub fn is_scenario(self) -> bool {
        matches!(
            self,
            DiagramType::UmlSequence | DiagramType::UmlCommunication | DiagramType::UmlTiming
        )
    }
}

/// Diagram - a view onto part of the model, arranged in a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: RowId,

    /// Parent diagram (None for a root diagram)
    pub parent_id: Option<RowId>,

    pub diagram_type: DiagramType,

    pub name: String,

    pub description: String,

    /// Sparse sibling ordering; negative values are allowed
    pub list_order: i32,

    pub flags: u32,

    pub uuid: String,
}

impl Diagram {
    /// Create a draft diagram; the store assigns the id on insert
    pub fn new(parent_id: Option<RowId>, diagram_type: DiagramType, name: impl Into<String>) -> Self {
        Self {
            id: RowId::VOID,
            parent_id,
            diagram_type,
            name: name.into(),
            description: String::new(),
            list_order: 0,
            flags: 0,
            uuid: new_uuid(),
        }
    }

    pub fn is_scenario(&self) -> bool {
        self.diagram_type.is_scenario()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
