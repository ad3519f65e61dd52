pub mod api;
pub mod channels;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod merge;
pub mod naming;
pub mod package;
pub mod paths;
pub mod reconcile;
pub mod registry;
pub mod schema;
pub mod sidecar;
pub mod spec;
pub mod tsv;
pub mod validator;

pub use api::{DryRunApi, PackageApi};
#[cfg(any(test, feature = "test-util"))]
pub use api::MemoryApi;
pub use config::{PathConfig, SidecarOptions};
pub use error::{ApiError, Result, SidecarError};
pub use package::Package;
pub use paths::{resolve_path, PackageIndex};
pub use reconcile::{cleanup_duplicates, duplicate_name, original_name, ReconcileSummary};
pub use registry::SIDECAR_REGISTRY;
pub use sidecar::{
    build_sidecar, ChannelsSidecar, CoordSystemSidecar, DatasetDescriptionSidecar, EegSidecar,
    ElectrodesSidecar, EventsSidecar, IeegSidecar, JsonSidecar, ParticipantsSidecar,
    ParticipantsTsvSidecar, SessionsSidecar, Sidecar, TsvSidecar,
};
pub use spec::{Record, Severity, SidecarFormat, SidecarKind, SidecarSpec};
pub use validator::{FieldValidator, ValidationReport};
