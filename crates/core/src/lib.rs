pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod errors;
pub mod taxonomy;

pub use catalog::{
    AggregationReport, ClassificationThresholds, LowestPrice, PlanAggregator, PlanCache,
    PlanCatalog, PlanNormalizer, PlanSource, PlanStatistics, SkippedRecord, SourceError,
    SourceStatus,
};
pub use checkout::{CheckoutError, CheckoutLinkBuilder, CheckoutRedirect, CheckoutSummary};
pub use domain::plan::{
    CheckoutPriceId, CountryCode, Plan, PlanCollection, PlanId, PlanOrigin, PlanType, Price,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use taxonomy::{Region, RegionInfo, REGIONS};
