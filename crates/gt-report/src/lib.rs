//! Views over the dataset and a single prediction.
//!
//! Every view is a pure function of its inputs: the [`Overview`] of a
//! dataset, personal analytics and [`Recommendation`]s for a prediction, and
//! the exportable [`PatientReport`].

pub mod analytics;
pub mod error;
pub mod export;
pub mod overview;
pub mod recommendation;
pub mod stats;

pub use analytics::{
    FeatureComparison, ImpactTest, adjustment_range, compare_with_classes, feature_impact,
    radar_profile, risk_bar,
};
pub use error::{ReportError, Result};
pub use export::{
    AttributionRow, DEFAULT_FOOTER, DEFAULT_ORGANIZATION, LineStyle, PatientIdentity,
    PatientReport, ReportFormat, ReportLine, ReportOptions,
};
pub use overview::{GroupRate, Overview, RateGrid};
pub use recommendation::{
    ANALYTICS_DISCLAIMER, RECOMMENDATION_DISCLAIMER, Recommendation, class_advice,
    report_recommendation,
};
pub use stats::{Describe, wilson_interval};
