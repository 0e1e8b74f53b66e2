pub mod overall;
pub mod report;
pub mod types;

pub use overall::OverallReport;
pub use report::{
    Criteria, DocumentInfo, ForensicReport, RescanSection, ScoreSummary, SectionReport,
};
pub use types::{DocumentNature, ParseNatureError, SignalResult, Verdict};
