use serde::{Deserialize, Serialize};

use super::ids::{new_uuid, RowId};

/// Display flag bits of a diagram element
pub mod display_flags {
    pub const NONE: u32 = 0x0000;
    pub const EMPHASIS: u32 = 0x0001;
    pub const HIGHLIGHT: u32 = 0x0002;
    pub const GRAY_OUT: u32 = 0x0004;
    pub const INSTANCE: u32 = 0x0100;
    pub const ANONYMOUS_INSTANCE: u32 = 0x0200;
}

/// DiagramElement - binds a classifier into a diagram
///
/// In scenario diagrams `focused_feature_id` points at the classifier's
/// lifeline; elsewhere it is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramElement {
    pub id: RowId,
    pub diagram_id: RowId,
    pub classifier_id: RowId,
    pub display_flags: u32,
    pub focused_feature_id: Option<RowId>,
    pub uuid: String,
}

impl DiagramElement {
    /// Create a draft element binding `classifier_id` into `diagram_id`
    pub fn new(diagram_id: RowId, classifier_id: RowId) -> Self {
        Self {
            id: RowId::VOID,
            diagram_id,
            classifier_id,
            display_flags: display_flags::NONE,
            focused_feature_id: None,
            uuid: new_uuid(),
        }
    }

    /// Copy of this element with the focus replaced
    pub fn with_focus(&self, focused_feature_id: Option<RowId>) -> Self {
        Self {
            focused_feature_id,
            ..self.clone()
        }
    }
}
