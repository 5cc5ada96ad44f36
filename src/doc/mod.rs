mod index;
mod load;
mod model;

pub use index::{GraphIndex, PlanIndex};
pub use load::{
    DocSlot, DocumentBundle, LoadedDocument, classify_document, load_bundle, load_document,
};
pub use model::{
    ClusterCost, EdgeRecord, GraphDoc, KIND_ROWS, NodeKind, NodeMeta, NodeRecord, PlanDoc,
    PlanEntry, PlanSummary, Reasoning, SummaryMap,
};
