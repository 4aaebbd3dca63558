pub mod classifier;
pub mod diagram;
pub mod diagramelement;
pub mod feature;
pub mod ids;
pub mod relationship;
pub mod row;

pub use classifier::{Classifier, ClassifierType};
pub use diagram::{Diagram, DiagramType};
pub use diagramelement::{display_flags, DiagramElement};
pub use feature::{Feature, FeatureType};
pub use ids::RowId;
pub use relationship::{Relationship, RelationshipType};
pub use row::{Row, Table};
